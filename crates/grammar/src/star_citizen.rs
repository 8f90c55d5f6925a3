//! Star Citizen grammar.
//!
//! Game.log actor-death lines carry the full kill context plus a 3D
//! direction vector, which is canonicalized to an angle here:
//!
//! ```text
//! <ts> [Notice] <Actor Death> CActor::Kill: 'victim' [id] in zone 'ship'
//!   killed by 'killer' [id] using 'weapon' [Class x] with damage type
//!   'Ballistic' from direction x: -0.5, y: 0.1, z: 0.8 [Team_ActorTech][Actor]
//! ```
//!
//! Vehicle hits (`[OnHandleHit] Hit FROM <attacker> TO <ship>. Being sent to
//! child <player>`) carry no direction of their own; the rule recovers one
//! from a recent direction-bearing line in the lookback buffer when present
//! and otherwise lands the impact on the front. The log exposes no shield or
//! hull damage magnitudes, so hit events carry none; nothing is inferred.

use crate::direction::vector_to_angle;
use crate::event::ParsedEvent;
use crate::{Rule, RuleCtx};

pub static RULES: &[Rule] = &[
    Rule {
        name: "actor_death",
        parse: parse_actor_death,
    },
    Rule {
        name: "ship_hit",
        parse: parse_ship_hit,
    },
];

const DEATH_MARKER: &str = "<Actor Death> CActor::Kill:";
const HIT_MARKER: &str = "[OnHandleHit]";
const DIRECTION_KEY: &str = "from direction x:";

/// Contents of single-quoted segments, in order of appearance.
fn quoted(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = s;
    while let Some(open) = rest.find('\'') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('\'') else { break };
        out.push(&after[..close]);
        rest = &after[close + 1..];
    }
    out
}

/// Parses the float following `key`, e.g. `float_after("x: -0.5, ...", "x:")`.
fn float_after(s: &str, key: &str) -> Option<f64> {
    let idx = s.find(key)?;
    let rest = s[idx + key.len()..].trim_start();
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')))
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

/// Direction vector from a line containing `from direction x: ..., y: ..., z: ...`.
fn parse_direction(line: &str) -> Option<(f64, f64, f64)> {
    let idx = line.find(DIRECTION_KEY)?;
    let tail = &line[idx + DIRECTION_KEY.len() - 2..]; // keep "x:" for float_after
    Some((
        float_after(tail, "x:")?,
        float_after(tail, "y:")?,
        float_after(tail, "z:")?,
    ))
}

fn looks_npc(name: &str) -> bool {
    name.starts_with("PU_")
        || name.to_ascii_uppercase().contains("NPC")
        || name.contains("Vanduul")
        || name.contains("Pirate")
}

fn contains_ci(hay: &str, needle: &str) -> bool {
    hay.to_ascii_lowercase().contains(&needle.to_ascii_lowercase())
}

fn parse_actor_death(line: &str, ctx: &RuleCtx<'_>) -> Option<ParsedEvent> {
    let idx = line.find(DEATH_MARKER)?;
    let tail = &line[idx + DEATH_MARKER.len()..];

    let names = quoted(tail);
    if names.len() < 5 {
        return None;
    }
    let (victim, ship, killer, weapon, damage_type) =
        (names[0], names[1], names[2], names[3], names[4]);

    // A malformed vector degrades to a frontal impact, it does not drop the
    // kill event.
    let (x, y, z) = parse_direction(tail).unwrap_or((0.0, 0.0, 0.0));
    let angle = vector_to_angle(x, z);

    let is_npc = looks_npc(victim) || looks_npc(killer);
    let is_suicide = victim == killer;

    let (is_player_victim, is_player_killer) = match ctx.player {
        Some(player) => (contains_ci(victim, player), contains_ci(killer, player)),
        None => (!is_npc, false),
    };

    let event_type = if is_suicide {
        "suicide"
    } else if is_player_victim {
        "player_death"
    } else if is_player_killer {
        "player_kill"
    } else if is_npc {
        "npc_death"
    } else {
        "death"
    };

    let direction = serde_json::json!({ "x": x, "y": y, "z": z });
    Some(
        ParsedEvent::new(event_type)
            .param("victim_name", victim)
            .param("killer_name", killer)
            .param("weapon", weapon)
            .param("ship", ship)
            .param("damage_type", damage_type)
            .param("direction", direction)
            .param("angle", angle)
            .param("is_npc", is_npc)
            .param("is_suicide", is_suicide)
            .subject(victim),
    )
}

fn parse_ship_hit(line: &str, ctx: &RuleCtx<'_>) -> Option<ParsedEvent> {
    let idx = line.find(HIT_MARKER)?;
    let tail = &line[idx + HIT_MARKER.len()..];

    let from = tail.find("Hit FROM ")?;
    let after_from = &tail[from + "Hit FROM ".len()..];
    let to = after_from.find(" TO ")?;
    let attacker = after_from[..to].trim();

    let after_to = &after_from[to + " TO ".len()..];
    let dot = after_to.find('.')?;
    let ship = after_to[..dot].trim();

    let child = after_to.find("child ")?;
    let player = after_to[child + "child ".len()..]
        .split_whitespace()
        .next()?;

    if attacker.is_empty() || ship.is_empty() {
        return None;
    }

    // The hit line itself has no direction; a death or impact line moments
    // earlier may. Bounded lookback, newest first; frontal otherwise.
    let angle = ctx
        .lookback
        .find(|l| l.contains(DIRECTION_KEY))
        .and_then(parse_direction)
        .map(|(x, _, z)| vector_to_angle(x, z))
        .unwrap_or(0.0);

    Some(
        ParsedEvent::new("ship_hit")
            .param("attacker", attacker)
            .param("ship", ship)
            .param("player", player)
            .param("is_npc_attacker", looks_npc(attacker))
            .param("angle", angle)
            .subject(player),
    )
}
