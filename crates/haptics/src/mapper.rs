//! Deterministic event-to-haptic mapping.
//!
//! Direction convention: 0° front, 90° left, 180° back, 270° right. The
//! circle is partitioned into four half-open buckets, so every angle lands
//! in exactly one.

use vestlink_grammar::GameEvent;
use vestlink_protocol::GameId;

use crate::command::HapticCommand;
use crate::layout::{
    ALL_CELLS, BACK_CELLS, BACK_UPPER, FRONT_CELLS, FRONT_UPPER, LEFT_SIDE, RIGHT_SIDE, cell,
};

/// Directional bucket on the vest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    Front,
    Left,
    Back,
    Right,
}

/// Buckets an angle. Boundaries are half-open: 45 is Left, 135 is Back,
/// 225 is Right, 315 is Front.
pub fn directional_bucket(angle: f64) -> Quadrant {
    let a = angle.rem_euclid(360.0);
    if !(45.0..315.0).contains(&a) {
        Quadrant::Front
    } else if a < 135.0 {
        Quadrant::Left
    } else if a < 225.0 {
        Quadrant::Back
    } else {
        Quadrant::Right
    }
}

/// Cells for a directional bucket.
///
/// Frontal hits land on the upper chest pair; side and back hits cover the
/// whole side so they are unmistakable without looking.
pub fn quadrant_cells(quadrant: Quadrant) -> &'static [u8] {
    match quadrant {
        Quadrant::Front => &FRONT_UPPER,
        Quadrant::Left => &LEFT_SIDE,
        Quadrant::Back => &BACK_CELLS,
        Quadrant::Right => &RIGHT_SIDE,
    }
}

/// Convenience: angle straight to cells.
pub fn directional_cells(angle: f64) -> &'static [u8] {
    quadrant_cells(directional_bucket(angle))
}

/// Damage magnitude to intensity. Total, monotonic, saturating at the
/// device maximum.
pub fn damage_intensity(amount: u64) -> u8 {
    match amount {
        0 => 0,
        1..=10 => 3,
        11..=25 => 5,
        26..=50 => 7,
        51..=75 => 8,
        _ => 10,
    }
}

/// Cell coverage grows with the damage tier.
pub fn damage_cells(amount: u64) -> &'static [u8] {
    const MEDIUM_HEAVY: [u8; 6] = [
        cell::FRONT_UPPER_LEFT,
        cell::FRONT_UPPER_RIGHT,
        cell::FRONT_LOWER_LEFT,
        cell::FRONT_LOWER_RIGHT,
        cell::BACK_UPPER_LEFT,
        cell::BACK_UPPER_RIGHT,
    ];
    match amount {
        0..=25 => &FRONT_UPPER,
        26..=50 => &FRONT_CELLS,
        51..=75 => &MEDIUM_HEAVY,
        _ => &ALL_CELLS,
    }
}

/// Maps a canonical event to zero or more haptic commands.
///
/// Event types without a table entry produce nothing; that includes types
/// the grammars never emit (defense in depth, not an error path).
pub fn map_event(event: &GameEvent) -> Vec<HapticCommand> {
    match event.game {
        GameId::Alyx => map_alyx(event),
        GameId::Hl2dm => map_hl2dm(event),
        GameId::StarCitizen => map_star_citizen(event),
        GameId::ForHonor => map_for_honor(event),
    }
}

fn pulse(cells: &[u8], intensity: u8) -> Vec<HapticCommand> {
    vec![HapticCommand::pulse(cells.to_vec(), intensity)]
}

fn map_alyx(event: &GameEvent) -> Vec<HapticCommand> {
    match event.event_type.as_str() {
        "PlayerHurt" => {
            let angle = event.angle().unwrap_or(0.0);
            let health = event.u64_param("health").unwrap_or(100);
            // Lower remaining health means an already-hurt player: stronger.
            let intensity = if health < 30 {
                8
            } else if health < 60 {
                6
            } else {
                5
            };
            pulse(directional_cells(angle), intensity)
        }
        "PlayerDeath" => vec![HapticCommand::pulse(ALL_CELLS.to_vec(), 10).with_duration(400)],
        "PlayerShootWeapon" => {
            let weapon = event.str_param("weapon").unwrap_or("").to_ascii_lowercase();
            let intensity = if weapon.contains("shotgun") {
                7
            } else if weapon.contains("rapidfire") || weapon.contains("smg") {
                4
            } else {
                5
            };
            vec![HapticCommand::pulse(FRONT_UPPER.to_vec(), intensity).with_duration(80)]
        }
        "PlayerHealth" => {
            let health = event.u64_param("health").unwrap_or(100);
            if health <= 30 {
                // Sustained low-health heartbeat over the heart.
                vec![
                    HapticCommand::pulse(
                        vec![cell::FRONT_UPPER_LEFT, cell::FRONT_LOWER_LEFT],
                        3,
                    )
                    .with_duration(500)
                    .repeating(),
                ]
            } else {
                Vec::new()
            }
        }
        "PlayerHeal" | "PlayerUsingHealthstation" => pulse(&FRONT_CELLS, 2),
        "PlayerGrabbityPull" | "PlayerGrabbityLockStart" | "PlayerGrabbityLockStop"
        | "GrabbityGloveCatch" => {
            let intensity = match event.event_type.as_str() {
                "GrabbityGloveCatch" => 4,
                "PlayerGrabbityLockStop" => 2,
                _ => 3,
            };
            // Primary hand is the right hand on a default setup.
            let left = !event.bool_param("is_primary_hand").unwrap_or(true);
            let cells = if left {
                vec![cell::FRONT_UPPER_LEFT, cell::FRONT_LOWER_LEFT]
            } else {
                vec![cell::FRONT_UPPER_RIGHT, cell::FRONT_LOWER_RIGHT]
            };
            vec![HapticCommand::pulse(cells, intensity).with_duration(80)]
        }
        "PlayerGrabbedByBarnacle" => pulse(&BACK_UPPER, 8),
        "PlayerReleasedByBarnacle" => pulse(&BACK_UPPER, 4),
        "PlayerCoughStart" => pulse(&FRONT_CELLS, 2),
        "PlayerCoughEnd" => pulse(&[cell::FRONT_LOWER_LEFT, cell::FRONT_LOWER_RIGHT], 1),
        "TwoHandStart" => pulse(&FRONT_UPPER, 2),
        "TwoHandEnd" => pulse(&FRONT_UPPER, 1),
        "Reset" => pulse(&ALL_CELLS, 3),
        "PlayerDropAmmoInBackpack"
        | "PlayerDropResinInBackpack"
        | "PlayerRetrievedBackpackClip"
        | "PlayerStoredItemInItemholder"
        | "PlayerRemovedItemFromItemholder" => {
            let cell = if event.bool_param("left_side").unwrap_or(false) {
                cell::BACK_UPPER_LEFT
            } else {
                cell::BACK_UPPER_RIGHT
            };
            let intensity = if event.event_type == "PlayerRetrievedBackpackClip" {
                4
            } else {
                3
            };
            vec![HapticCommand::pulse(vec![cell], intensity).with_duration(80)]
        }
        "ItemPickup" => {
            let cell = if event.bool_param("left_shoulder").unwrap_or(false) {
                cell::BACK_UPPER_LEFT
            } else {
                cell::BACK_UPPER_RIGHT
            };
            vec![HapticCommand::pulse(vec![cell], 3).with_duration(80)]
        }
        "ItemReleased" => {
            let cell = if event.bool_param("left_hand_used").unwrap_or(false) {
                cell::FRONT_LOWER_LEFT
            } else {
                cell::FRONT_LOWER_RIGHT
            };
            vec![HapticCommand::pulse(vec![cell], 2).with_duration(60)]
        }
        "PlayerPistolClipInserted" => pulse(&FRONT_UPPER, 3),
        "PlayerPistolChamberedRound" => pulse(&FRONT_UPPER, 2),
        "PlayerShotgunShellLoaded" | "PlayerShotgunLoadedShells" => pulse(&FRONT_UPPER, 4),
        "PlayerShotgunUpgradeGrenadeLauncherState" => {
            let armed = event.u64_param("state").unwrap_or(0) != 0;
            pulse(
                &[cell::FRONT_LOWER_LEFT, cell::FRONT_LOWER_RIGHT],
                if armed { 5 } else { 3 },
            )
        }
        _ => Vec::new(),
    }
}

fn map_hl2dm(event: &GameEvent) -> Vec<HapticCommand> {
    match event.event_type.as_str() {
        "player_death" => vec![HapticCommand::pulse(ALL_CELLS.to_vec(), 10).with_duration(400)],
        "player_damage" => {
            let amount = event.u64_param("amount").unwrap_or(0);
            if amount == 0 {
                return Vec::new();
            }
            pulse(damage_cells(amount), damage_intensity(amount))
        }
        "player_kill" => vec![HapticCommand::pulse(FRONT_UPPER.to_vec(), 4).with_duration(100)],
        "respawn" => pulse(&ALL_CELLS, 3),
        _ => Vec::new(),
    }
}

fn map_star_citizen(event: &GameEvent) -> Vec<HapticCommand> {
    let angle = event.angle().unwrap_or(0.0);
    match event.event_type.as_str() {
        "player_death" => {
            let damage_type = event
                .str_param("damage_type")
                .unwrap_or("")
                .to_ascii_lowercase();
            let intensity = if damage_type.contains("explosive") {
                10
            } else if damage_type.contains("ballistic") {
                9
            } else if damage_type.contains("energy") {
                8
            } else {
                7
            };
            vec![
                HapticCommand::pulse(directional_cells(angle).to_vec(), intensity)
                    .with_duration(400),
            ]
        }
        "player_kill" => vec![HapticCommand::pulse(FRONT_UPPER.to_vec(), 6).with_duration(100)],
        "npc_death" => {
            // Bystander kill nearby: a single-cell tap on the impact side.
            let cells = directional_cells(angle);
            vec![HapticCommand::pulse(vec![cells[0]], 4).with_duration(80)]
        }
        "suicide" => pulse(&ALL_CELLS, 6),
        "ship_hit" => {
            let intensity = if event.bool_param("is_npc_attacker").unwrap_or(false) {
                8
            } else {
                6
            };
            // Whole-ship impact: frontal hits shake the full chest.
            let cells: &[u8] = match directional_bucket(angle) {
                Quadrant::Front => &FRONT_CELLS,
                other => quadrant_cells(other),
            };
            vec![HapticCommand::pulse(cells.to_vec(), intensity).with_duration(250)]
        }
        "death" => pulse(directional_cells(angle), 5),
        _ => Vec::new(),
    }
}

fn map_for_honor(event: &GameEvent) -> Vec<HapticCommand> {
    let angle = event.angle().unwrap_or(0.0);
    match event.event_type.as_str() {
        "damage" => {
            let amount = event.u64_param("amount").unwrap_or(0);
            // Melee hits read in three weights.
            let intensity = if amount < 16 {
                4
            } else if amount < 31 {
                6
            } else {
                8
            };
            pulse(directional_cells(angle), intensity)
        }
        "block" => vec![HapticCommand::pulse(directional_cells(angle).to_vec(), 2).with_duration(60)],
        "guard_break" => pulse(&FRONT_CELLS, 6),
        "death" => vec![HapticCommand::pulse(ALL_CELLS.to_vec(), 10).with_duration(400)],
        "kill" => vec![HapticCommand::pulse(FRONT_UPPER.to_vec(), 4).with_duration(100)],
        "ledge_kill" => pulse(&ALL_CELLS, 7),
        "revenge" => pulse(&ALL_CELLS, 4),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vestlink_grammar::Grammar;
    use vestlink_protocol::GameId;

    #[test]
    fn buckets_partition_the_full_circle() {
        // Every angle lands in exactly one bucket with a non-empty cell set.
        let mut tenths = 0;
        while tenths < 3600 {
            let angle = tenths as f64 / 10.0;
            let cells = directional_cells(angle);
            assert!(!cells.is_empty(), "no cells at {angle}");
            tenths += 1;
        }
    }

    #[test]
    fn bucket_boundaries_belong_to_one_side() {
        assert_eq!(directional_bucket(0.0), Quadrant::Front);
        assert_eq!(directional_bucket(44.999), Quadrant::Front);
        assert_eq!(directional_bucket(45.0), Quadrant::Left);
        assert_eq!(directional_bucket(134.999), Quadrant::Left);
        assert_eq!(directional_bucket(135.0), Quadrant::Back);
        assert_eq!(directional_bucket(225.0), Quadrant::Right);
        assert_eq!(directional_bucket(314.999), Quadrant::Right);
        assert_eq!(directional_bucket(315.0), Quadrant::Front);
        assert_eq!(directional_bucket(359.999), Quadrant::Front);
        // Out-of-range inputs are wrapped, not rejected.
        assert_eq!(directional_bucket(360.0), Quadrant::Front);
        assert_eq!(directional_bucket(-45.0), Quadrant::Front);
        assert_eq!(directional_bucket(450.0), Quadrant::Left);
    }

    #[test]
    fn intensity_is_monotonic_and_saturates() {
        let mut prev = 0;
        for amount in 0..300u64 {
            let intensity = damage_intensity(amount);
            assert!(intensity >= prev, "dip at {amount}");
            assert!(intensity <= crate::MAX_INTENSITY);
            prev = intensity;
        }
        assert_eq!(damage_intensity(u64::MAX), crate::MAX_INTENSITY);
    }

    #[test]
    fn scenario_alyx_player_hurt_from_left() {
        // [Tactsuit] {PlayerHurt|80|npc_combine|90|Combine Soldier|combine}
        // health 80 is the light-damage case; angle 90 is the left side.
        let mut grammar = Grammar::for_game(GameId::Alyx, None);
        let event = grammar
            .parse("[Tactsuit] {PlayerHurt|80|npc_combine|90|Combine Soldier|combine}")
            .expect("tag should parse");

        let commands = map_event(&event);
        assert_eq!(commands.len(), 1);
        let cmd = &commands[0];
        assert_eq!(cmd.cells, LEFT_SIDE.to_vec());
        assert_eq!(cmd.intensity, 5);
        assert!(cmd.duration_ms > 0);
    }

    #[test]
    fn scenario_hl2dm_medium_heavy_damage() {
        // "Alice" took 60 damage from "Bob", the 51-75 tier.
        let mut grammar = Grammar::for_game(GameId::Hl2dm, None);
        let event = grammar
            .parse(r#""Alice" took 60 damage from "Bob""#)
            .expect("damage line should parse");
        assert_eq!(event.u64_param("amount"), Some(60));

        let commands = map_event(&event);
        assert_eq!(commands.len(), 1);
        let cmd = &commands[0];
        assert_eq!(cmd.intensity, 8);
        assert_eq!(cmd.cells, damage_cells(60).to_vec());
        assert!(cmd.cells.contains(&cell::BACK_UPPER_LEFT));
        assert!(cmd.cells.contains(&cell::FRONT_LOWER_RIGHT));
    }

    #[test]
    fn zero_damage_maps_to_nothing() {
        let mut grammar = Grammar::for_game(GameId::Hl2dm, None);
        let event = grammar.parse(r#""Alice" took 0 damage from "Bob""#).unwrap();
        assert!(map_event(&event).is_empty());
    }

    #[test]
    fn alyx_death_is_full_vest_max() {
        let mut grammar = Grammar::for_game(GameId::Alyx, None);
        let event = grammar.parse("[Tactsuit] {PlayerDeath|16}").unwrap();
        let commands = map_event(&event);
        assert_eq!(commands[0].cells, ALL_CELLS.to_vec());
        assert_eq!(commands[0].intensity, 10);
    }

    #[test]
    fn low_health_heartbeat_repeats() {
        let mut grammar = Grammar::for_game(GameId::Alyx, None);
        let event = grammar.parse("[Tactsuit] {PlayerHealth|25}").unwrap();
        let commands = map_event(&event);
        assert_eq!(commands.len(), 1);
        assert!(commands[0].repeat);
        assert_eq!(commands[0].intensity, 3);

        let event = grammar.parse("[Tactsuit] {PlayerHealth|90}").unwrap();
        assert!(map_event(&event).is_empty());
    }

    #[test]
    fn star_citizen_damage_type_scales_intensity() {
        let mut grammar = Grammar::for_game(GameId::StarCitizen, Some("Alice".into()));
        let line = "<ts> [Notice] <Actor Death> CActor::Kill: 'Alice' [1] in zone 'Ship' \
             killed by 'Bandit' [2] using 'Launcher' [Class x] with damage type 'Explosive' \
             from direction x: 0.0, y: 0.0, z: 1.0 [Team_ActorTech][Actor]";
        let event = grammar.parse(line).unwrap();
        let commands = map_event(&event);
        assert_eq!(commands[0].intensity, 10);
        assert_eq!(commands[0].cells, FRONT_UPPER.to_vec());
    }

    #[test]
    fn for_honor_block_is_light_and_directional() {
        let mut grammar = Grammar::for_game(GameId::ForHonor, None);
        let event = grammar.parse("Player blocked attack from RIGHT").unwrap();
        let commands = map_event(&event);
        assert_eq!(commands[0].cells, RIGHT_SIDE.to_vec());
        assert_eq!(commands[0].intensity, 2);
    }

    #[test]
    fn unknown_event_type_maps_to_nothing() {
        let mut grammar = Grammar::for_game(GameId::Alyx, None);
        let event = grammar.parse("[Tactsuit] {SomeFutureEvent|1}").unwrap();
        assert!(map_event(&event).is_empty());
    }
}
