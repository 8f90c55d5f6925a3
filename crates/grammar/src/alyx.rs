//! Half-Life: Alyx grammar.
//!
//! The game's Lua mod writes tag lines to console.log (launched with
//! `-condebug`): `[Tactsuit] {EventType|param1|param2|...}`. The tag body is
//! `|`-separated with the event type first; parameter layout depends on the
//! event type. Unknown event types inside a well-formed tag still produce an
//! event with empty params; which effects they drive is the mapper's call.

use crate::direction::normalize_angle;
use crate::event::ParsedEvent;
use crate::{Rule, RuleCtx};

pub static RULES: &[Rule] = &[Rule {
    name: "tactsuit_tag",
    parse: parse_tactsuit,
}];

const TAG: &str = "[Tactsuit]";

/// Hand-relative pickup/stow events sharing the `left_side` flag layout.
const SIDE_FLAG_EVENTS: &[&str] = &[
    "PlayerDropAmmoInBackpack",
    "PlayerDropResinInBackpack",
    "PlayerRetrievedBackpackClip",
    "PlayerStoredItemInItemholder",
    "PlayerRemovedItemFromItemholder",
    "PlayerUsingHealthstation",
];

/// Grabbity-glove events sharing the `is_primary_hand` flag layout.
const HAND_FLAG_EVENTS: &[&str] = &[
    "PlayerGrabbityPull",
    "PlayerGrabbityLockStart",
    "PlayerGrabbityLockStop",
    "GrabbityGloveCatch",
];

fn parse_tactsuit(line: &str, _ctx: &RuleCtx<'_>) -> Option<ParsedEvent> {
    let rest = &line[line.find(TAG)? + TAG.len()..];
    let open = rest.find('{')?;
    let close = rest[open + 1..].find('}')?;
    let body = &rest[open + 1..open + 1 + close];

    let mut parts = body.split('|');
    let event_type = parts.next()?.trim();
    if event_type.is_empty() {
        return None;
    }
    let args: Vec<&str> = parts.collect();

    let mut event = ParsedEvent::new(event_type);
    match event_type {
        "PlayerHurt" if args.len() >= 5 => {
            event = event
                .param("health", args[0].parse::<u64>().unwrap_or(100))
                .param("enemy_class", args[1])
                .param(
                    "angle",
                    normalize_angle(args[2].parse::<f64>().unwrap_or(0.0)),
                )
                .param("enemy_name", args[3])
                .param("enemy_debug_name", args[4]);
        }
        "PlayerShootWeapon" if !args.is_empty() => {
            event = event.param("weapon", args[0]);
        }
        "PlayerDeath" if !args.is_empty() => {
            event = event.param("damagebits", args[0].parse::<u64>().unwrap_or(0));
        }
        "PlayerHealth" if !args.is_empty() => {
            event = event.param("health", args[0].parse::<u64>().unwrap_or(100));
        }
        "PlayerHeal" if !args.is_empty() => {
            event = event.param(
                "angle",
                normalize_angle(args[0].parse::<f64>().unwrap_or(0.0)),
            );
        }
        "PrimaryHandChanged" if !args.is_empty() => {
            event = event.param("is_primary_left", args[0].eq_ignore_ascii_case("true"));
        }
        "ItemPickup" if args.len() >= 2 => {
            event = event
                .param("item", args[0])
                .param("left_shoulder", args[1] == "1");
        }
        "ItemReleased" if args.len() >= 2 => {
            event = event
                .param("item", args[0])
                .param("left_hand_used", args[1] == "1");
        }
        "PlayerShotgunUpgradeGrenadeLauncherState" if !args.is_empty() => {
            event = event.param("state", args[0].parse::<u64>().unwrap_or(0));
        }
        t if HAND_FLAG_EVENTS.contains(&t) && !args.is_empty() => {
            event = event.param("is_primary_hand", args[0].eq_ignore_ascii_case("true"));
        }
        t if SIDE_FLAG_EVENTS.contains(&t) && !args.is_empty() => {
            event = event.param("left_side", args[0] == "1");
        }
        // Parameterless events (Reset, barnacle grabs, cough, reloads, ...)
        // and anything with too few fields fall through with empty params.
        _ => {}
    }

    Some(event)
}
