//! Half-Life 2: Deathmatch grammar.
//!
//! Source engine console.log kill-feed lines (game launched with
//! `-condebug`). Names appear bare, quoted, or with a `<userid><steamid>`
//! suffix; lines may carry an `L MM/DD/YYYY - HH:MM:SS:` prefix. Forms:
//!
//! ```text
//! "Attacker" killed "Victim" with weapon_357
//! "Player" suicided
//! "Victim" was killed
//! "Alice" took 60 damage from "Bob"
//! PlayerName entered the game
//! ```
//!
//! Kill lines are classified from the session player's perspective when a
//! player name is configured (death when the player is the victim, kill when
//! the attacker); without one every kill reports as a death, which is what
//! single-vest testing wants.

use crate::direction::first_uint;
use crate::event::ParsedEvent;
use crate::{Rule, RuleCtx};

pub static RULES: &[Rule] = &[
    Rule {
        name: "kill",
        parse: parse_kill,
    },
    Rule {
        name: "suicide",
        parse: parse_suicide,
    },
    Rule {
        name: "death",
        parse: parse_death,
    },
    Rule {
        name: "damage",
        parse: parse_damage,
    },
    Rule {
        name: "spawn",
        parse: parse_spawn,
    },
];

/// Case-insensitive substring search. ASCII-only needles, so byte offsets
/// into the original string stay valid.
fn find_ci(hay: &str, needle: &str) -> Option<usize> {
    hay.to_ascii_lowercase().find(needle)
}

/// Strips the Source dedicated-server timestamp prefix, if present.
///
/// `L MM/DD/YYYY - HH:MM:SS: message`; the terminating `": "` is the first
/// one at or after the seconds field.
fn strip_timestamp(line: &str) -> &str {
    if line.starts_with("L ") && line.len() > 20 {
        if let Some(colon) = line[20..].find(": ") {
            return line[20 + colon + 2..].trim();
        }
    }
    line
}

/// Cleans a raw name fragment: quotes off, `<userid><steamid><>` suffix off.
fn clean_name(raw: &str) -> String {
    let s = raw.trim().trim_matches('"');
    let s = match s.find('<') {
        Some(idx) => &s[..idx],
        None => s,
    };
    s.trim().trim_matches('"').to_string()
}

fn eq_ci(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

fn parse_kill(line: &str, ctx: &RuleCtx<'_>) -> Option<ParsedEvent> {
    let line = strip_timestamp(line);
    let idx = find_ci(line, " killed ")?;

    // `"X" was killed by ...` belongs to the death rule.
    if find_ci(&line[..idx], " was").is_some_and(|w| w + 4 == idx) {
        return None;
    }

    let attacker = clean_name(&line[..idx]);
    let after = &line[idx + " killed ".len()..];
    let (victim_raw, weapon) = match find_ci(after, " with ") {
        Some(w) => (
            &after[..w],
            clean_name(&after[w + " with ".len()..]),
        ),
        None => (after, "unknown".to_string()),
    };
    let victim = clean_name(victim_raw);
    if attacker.is_empty() || victim.is_empty() {
        return None;
    }

    let event_type = match ctx.player {
        Some(player) if eq_ci(&attacker, player) => "player_kill",
        // Victim-is-player and no-filter both report the death side.
        _ => "player_death",
    };

    Some(
        ParsedEvent::new(event_type)
            .param("attacker", attacker.clone())
            .param("victim", victim.clone())
            .param("weapon", weapon)
            .subject(if event_type == "player_kill" {
                attacker
            } else {
                victim
            }),
    )
}

fn parse_suicide(line: &str, _ctx: &RuleCtx<'_>) -> Option<ParsedEvent> {
    let line = strip_timestamp(line);
    let idx = find_ci(line, " suicided").or_else(|| find_ci(line, " committed suicide"))?;
    let player = clean_name(&line[..idx]);
    if player.is_empty() {
        return None;
    }
    Some(
        ParsedEvent::new("player_death")
            .param("victim", player.clone())
            .param("attacker", "self")
            .param("weapon", "suicide")
            .subject(player),
    )
}

fn parse_death(line: &str, _ctx: &RuleCtx<'_>) -> Option<ParsedEvent> {
    let line = strip_timestamp(line);
    let idx = find_ci(line, " died").or_else(|| find_ci(line, " was killed"))?;
    let victim = clean_name(&line[..idx]);
    if victim.is_empty() {
        return None;
    }
    Some(
        ParsedEvent::new("player_death")
            .param("victim", victim.clone())
            .param("attacker", "unknown")
            .subject(victim),
    )
}

fn parse_damage(line: &str, _ctx: &RuleCtx<'_>) -> Option<ParsedEvent> {
    let line = strip_timestamp(line);
    let (idx, kw_len) = find_ci(line, " took ")
        .map(|i| (i, " took ".len()))
        .or_else(|| find_ci(line, " received ").map(|i| (i, " received ".len())))?;

    let victim = clean_name(&line[..idx]);
    let after = &line[idx + kw_len..];
    let dmg = find_ci(after, " damage")?;
    if victim.is_empty() {
        return None;
    }

    // Unparsable amounts fall back to 0 rather than dropping the event.
    let amount = first_uint(&after[..dmg]).unwrap_or(0);
    let attacker = find_ci(after, " from ")
        .map(|i| clean_name(&after[i + " from ".len()..]))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    Some(
        ParsedEvent::new("player_damage")
            .param("victim", victim.clone())
            .param("amount", amount)
            .param("attacker", attacker)
            .subject(victim),
    )
}

fn parse_spawn(line: &str, _ctx: &RuleCtx<'_>) -> Option<ParsedEvent> {
    let line = strip_timestamp(line);
    let idx = find_ci(line, " entered the game")
        .or_else(|| find_ci(line, " respawned"))
        .or_else(|| find_ci(line, " spawned"))?;
    let player = clean_name(&line[..idx]);
    if player.is_empty() {
        return None;
    }
    Some(
        ParsedEvent::new("respawn")
            .param("player", player.clone())
            .subject(player),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Grammar, Lookback};
    use vestlink_protocol::GameId;

    fn ctx_with<'a>(lookback: &'a Lookback, player: Option<&'a str>) -> RuleCtx<'a> {
        RuleCtx { lookback, player }
    }

    #[test]
    fn damage_line_with_quoted_names() {
        let lb = Lookback::new(4);
        let event = parse_damage(r#""Alice" took 60 damage from "Bob""#, &ctx_with(&lb, None))
            .expect("should match");
        assert_eq!(event.event_type, "player_damage");
        assert_eq!(event.params["amount"], 60);
        assert_eq!(event.params["victim"], "Alice");
        assert_eq!(event.params["attacker"], "Bob");
        assert_eq!(event.subject.as_deref(), Some("Alice"));
    }

    #[test]
    fn damage_line_with_steamid_suffix() {
        let lb = Lookback::new(4);
        let event = parse_damage(
            r#"L 03/04/2025 - 10:15:32: "Alice<123><STEAM_0:1:12345><>" took 25 damage"#,
            &ctx_with(&lb, None),
        )
        .unwrap();
        assert_eq!(event.params["victim"], "Alice");
        assert_eq!(event.params["amount"], 25);
        assert_eq!(event.params["attacker"], "unknown");
    }

    #[test]
    fn damage_without_amount_defaults_to_zero() {
        let lb = Lookback::new(4);
        let event = parse_damage("Alice took some damage", &ctx_with(&lb, None)).unwrap();
        assert_eq!(event.params["amount"], 0);
    }

    #[test]
    fn kill_without_filter_reports_death() {
        let lb = Lookback::new(4);
        let event = parse_kill(
            r#""Bob" killed "Alice" with weapon_357"#,
            &ctx_with(&lb, None),
        )
        .unwrap();
        assert_eq!(event.event_type, "player_death");
        assert_eq!(event.params["weapon"], "weapon_357");
        assert_eq!(event.subject.as_deref(), Some("Alice"));
    }

    #[test]
    fn kill_by_filtered_player_is_a_kill() {
        let lb = Lookback::new(4);
        let event = parse_kill(
            r#""Alice" killed "Bob" with weapon_crossbow"#,
            &ctx_with(&lb, Some("Alice")),
        )
        .unwrap();
        assert_eq!(event.event_type, "player_kill");
        assert_eq!(event.subject.as_deref(), Some("Alice"));
    }

    #[test]
    fn was_killed_is_not_a_kill_line() {
        let lb = Lookback::new(4);
        assert!(parse_kill(r#""Bob" was killed"#, &ctx_with(&lb, None)).is_none());
        let event = parse_death(r#""Bob" was killed"#, &ctx_with(&lb, None)).unwrap();
        assert_eq!(event.event_type, "player_death");
        assert_eq!(event.params["victim"], "Bob");
    }

    #[test]
    fn suicide_and_spawn() {
        let lb = Lookback::new(4);
        let event = parse_suicide(r#""Carol" suicided"#, &ctx_with(&lb, None)).unwrap();
        assert_eq!(event.params["attacker"], "self");

        let event = parse_spawn("Carol entered the game", &ctx_with(&lb, None)).unwrap();
        assert_eq!(event.event_type, "respawn");
        assert_eq!(event.params["player"], "Carol");
    }

    #[test]
    fn rule_order_kill_beats_damage() {
        // Through the full grammar: a kill line must not fall into the
        // damage or death rules.
        let mut grammar = Grammar::for_game(GameId::Hl2dm, None);
        let event = grammar
            .parse(r#""Bob" killed "Alice" with weapon_shotgun"#)
            .unwrap();
        assert_eq!(event.event_type, "player_death");
        assert_eq!(event.params["weapon"], "weapon_shotgun");
    }

    #[test]
    fn chatter_does_not_match() {
        let mut grammar = Grammar::for_game(GameId::Hl2dm, None);
        assert!(grammar.parse("Executing listen server config file").is_none());
        assert!(grammar.parse("maxplayers set to 16").is_none());
    }
}
