use serde::{Deserialize, Serialize};

/// Highest intensity the device accepts (0 = off).
pub const MAX_INTENSITY: u8 = 10;

/// Longest single activation the dispatcher will honor.
pub const MAX_DURATION_MS: u32 = 5_000;

/// Shortest activation that is physically perceptible.
pub const MIN_DURATION_MS: u32 = 20;

/// Default pulse length for one-shot effects.
pub const DEFAULT_PULSE_MS: u32 = 150;

/// One validated-at-dispatch instruction for the vest.
///
/// A value object: produced by the mapper, consumed by the dispatcher,
/// owned by nobody afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HapticCommand {
    /// Actuator cells to drive (device layout indices, 0–7).
    pub cells: Vec<u8>,
    /// Vibration intensity, 0–10.
    pub intensity: u8,
    /// How long to hold the cells active.
    pub duration_ms: u32,
    /// Sustained effect (heartbeat): re-pulses while nothing newer arrives.
    #[serde(default)]
    pub repeat: bool,
}

impl HapticCommand {
    /// One-shot pulse with the default duration.
    pub fn pulse(cells: impl Into<Vec<u8>>, intensity: u8) -> Self {
        Self {
            cells: cells.into(),
            intensity,
            duration_ms: DEFAULT_PULSE_MS,
            repeat: false,
        }
    }

    pub fn with_duration(mut self, duration_ms: u32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn repeating(mut self) -> Self {
        self.repeat = true;
        self
    }
}
