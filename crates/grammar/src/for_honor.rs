//! For Honor grammar.
//!
//! Melee combat log lines with attack directions as words:
//!
//! ```text
//! Player took 30 damage from LEFT
//! Hit received: 30
//! Player blocked attack from RIGHT
//! Guard break on player
//! Player died
//! ```
//!
//! Bare `Hit received: N` lines carry no direction; the rule recovers the
//! direction from the most recent `... from <DIR>` line in the lookback
//! buffer and otherwise defaults to a frontal hit.

use crate::direction::{first_uint, word_to_angle};
use crate::event::ParsedEvent;
use crate::{Rule, RuleCtx};

pub static RULES: &[Rule] = &[
    Rule {
        name: "damage_directional",
        parse: parse_damage_directional,
    },
    Rule {
        name: "damage_bare",
        parse: parse_damage_bare,
    },
    Rule {
        name: "block",
        parse: parse_block,
    },
    Rule {
        name: "guard_break",
        parse: parse_guard_break,
    },
    Rule {
        name: "death",
        parse: parse_death,
    },
    Rule {
        name: "kill",
        parse: parse_kill,
    },
    Rule {
        name: "revenge",
        parse: parse_revenge,
    },
];

const DIRECTION_WORDS: [&str; 4] = ["LEFT", "RIGHT", "TOP", "BACK"];

fn contains_ci(hay: &str, needle: &str) -> bool {
    hay.to_ascii_lowercase().contains(&needle.to_ascii_lowercase())
}

/// Trailing direction word after `from`, e.g. `... from LEFT`.
fn direction_after_from(line: &str) -> Option<&'static str> {
    let idx = line.to_ascii_lowercase().rfind(" from ")?;
    let word = line[idx + " from ".len()..].split_whitespace().next()?;
    DIRECTION_WORDS
        .iter()
        .find(|d| word.eq_ignore_ascii_case(d))
        .copied()
}

fn parse_damage_directional(line: &str, _ctx: &RuleCtx<'_>) -> Option<ParsedEvent> {
    if !contains_ci(line, "player ") {
        return None;
    }
    if !(contains_ci(line, " took ") || contains_ci(line, " received ")) {
        return None;
    }
    if !contains_ci(line, " damage") {
        return None;
    }
    let direction = direction_after_from(line)?;
    let amount = first_uint(line).unwrap_or(0);

    Some(
        ParsedEvent::new("damage")
            .param("amount", amount)
            .param("direction", direction)
            .param("angle", word_to_angle(direction)),
    )
}

fn parse_damage_bare(line: &str, ctx: &RuleCtx<'_>) -> Option<ParsedEvent> {
    let idx = ["hit received:", "damage taken:", "damage received:"]
        .iter()
        .find_map(|kw| line.to_ascii_lowercase().find(*kw).map(|i| i + kw.len()))?;
    let amount = first_uint(&line[idx..])?;

    // Direction may trail the amount, or sit on a recent preceding line.
    let direction = direction_after_from(line)
        .or_else(|| ctx.lookback.find(|l| direction_after_from(l).is_some())
            .and_then(direction_after_from))
        .unwrap_or("FRONT");

    Some(
        ParsedEvent::new("damage")
            .param("amount", amount)
            .param("direction", direction)
            .param("angle", word_to_angle(direction)),
    )
}

fn parse_block(line: &str, _ctx: &RuleCtx<'_>) -> Option<ParsedEvent> {
    let blocked = contains_ci(line, "player blocked") || contains_ci(line, "player parried");
    let confirm = contains_ci(line, "block successful") || contains_ci(line, "parry successful");
    if !blocked && !confirm {
        return None;
    }
    let direction = direction_after_from(line).unwrap_or("TOP");
    Some(
        ParsedEvent::new("block")
            .param("direction", direction)
            .param("angle", word_to_angle(direction)),
    )
}

fn parse_guard_break(line: &str, _ctx: &RuleCtx<'_>) -> Option<ParsedEvent> {
    (contains_ci(line, "guard break") && contains_ci(line, "player"))
        .then(|| ParsedEvent::new("guard_break"))
}

fn parse_death(line: &str, _ctx: &RuleCtx<'_>) -> Option<ParsedEvent> {
    (contains_ci(line, "player died")
        || contains_ci(line, "player killed")
        || contains_ci(line, "player eliminated")
        || contains_ci(line, "player being executed"))
    .then(|| ParsedEvent::new("death"))
}

fn parse_kill(line: &str, _ctx: &RuleCtx<'_>) -> Option<ParsedEvent> {
    ((contains_ci(line, "player killed enemy") || contains_ci(line, "player executed enemy"))
        || contains_ci(line, "ledge kill"))
    .then(|| {
        if contains_ci(line, "ledge kill") {
            ParsedEvent::new("ledge_kill")
        } else {
            ParsedEvent::new("kill")
        }
    })
}

fn parse_revenge(line: &str, _ctx: &RuleCtx<'_>) -> Option<ParsedEvent> {
    (contains_ci(line, "revenge") && contains_ci(line, "activated"))
        .then(|| ParsedEvent::new("revenge"))
}
