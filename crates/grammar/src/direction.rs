//! Direction canonicalization helpers shared by the game grammars.
//!
//! Canonical convention: degrees in [0,360), 0 = front, 90 = left,
//! 180 = back, 270 = right (relative to player facing).

/// Wraps any angle into [0,360).
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle % 360.0;
    if a < 0.0 { a + 360.0 } else { a }
}

/// Converts a game-space direction vector to a canonical angle.
///
/// Convention of the source logs: +z toward the player's front, +x to the
/// player's right. The vertical component does not affect the angle. A zero
/// planar vector maps to front.
pub fn vector_to_angle(x: f64, z: f64) -> f64 {
    if x == 0.0 && z == 0.0 {
        return 0.0;
    }
    // -x is left; atan2(left, front) sweeps 0 -> 90 from front to left.
    normalize_angle((-x).atan2(z).to_degrees())
}

/// Converts a direction word (as found in melee combat logs) to an angle.
///
/// Unknown words fall back to front rather than failing the event.
pub fn word_to_angle(word: &str) -> f64 {
    match word.to_ascii_uppercase().as_str() {
        "LEFT" => 90.0,
        "BACK" => 180.0,
        "RIGHT" => 270.0,
        // TOP is an overhead strike; the vest has no vertical axis, so it
        // lands on the front like FRONT does.
        "TOP" | "FRONT" => 0.0,
        _ => 0.0,
    }
}

/// Parses the first unsigned integer found in `s`, if any.
pub fn first_uint(s: &str) -> Option<u64> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let digits: String = s[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
