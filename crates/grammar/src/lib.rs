//! Per-game log grammars.
//!
//! A grammar is plain data: an ordered list of match/extract rules for one
//! game, selected by [`GameId`]. Rules are pure functions over a single raw
//! line (plus a bounded lookback buffer for the few formats that correlate
//! two lines) and produce zero or one canonical [`GameEvent`]. First match
//! wins; a line matching no rule is silently discarded.
//!
//! Canonicalization happens here: directional damage is normalized to an
//! angle in degrees [0,360) (0 front, 90 left, 180 back, 270 right) no
//! matter whether the source log carries a raw angle, a 3D direction
//! vector, or a direction word. What an event *means* haptically is not this
//! crate's business; enumerated sub-types (weapon classes, death-cause
//! bitmasks) pass through as opaque parameters.

mod alyx;
mod direction;
mod event;
mod for_honor;
mod hl2dm;
mod lookback;
mod star_citizen;

pub use event::{GameEvent, ParsedEvent};
pub use lookback::Lookback;

use vestlink_protocol::GameId;

/// Context handed to every rule: recent preceding lines plus the session's
/// configured player name (used by kill-feed grammars to classify lines
/// from the player's perspective; suppression itself is the session's job).
pub struct RuleCtx<'a> {
    pub lookback: &'a Lookback,
    pub player: Option<&'a str>,
}

/// One match/extract pair. `parse` returns `None` for a non-matching line.
pub struct Rule {
    pub name: &'static str,
    pub parse: fn(&str, &RuleCtx<'_>) -> Option<ParsedEvent>,
}

/// Number of preceding raw lines kept for cross-line correlation.
///
/// Deliberately small: formats needing context only ever reference a line a
/// few entries back, and the buffer must stay bounded regardless of log
/// volume.
pub const LOOKBACK_LINES: usize = 8;

/// The ordered rule set for one game, plus per-session parse state.
pub struct Grammar {
    game: GameId,
    rules: &'static [Rule],
    player: Option<String>,
    lookback: Lookback,
}

impl Grammar {
    /// Builds the grammar for `game`, optionally scoped to a player name.
    pub fn for_game(game: GameId, player: Option<String>) -> Self {
        let rules: &'static [Rule] = match game {
            GameId::Alyx => alyx::RULES,
            GameId::Hl2dm => hl2dm::RULES,
            GameId::StarCitizen => star_citizen::RULES,
            GameId::ForHonor => for_honor::RULES,
        };
        Self {
            game,
            rules,
            player,
            lookback: Lookback::new(LOOKBACK_LINES),
        }
    }

    pub fn game(&self) -> GameId {
        self.game
    }

    /// Runs the line through the rule list; first match wins.
    ///
    /// Every line, matching or not, enters the lookback buffer so later
    /// lines can refer back to it.
    pub fn parse(&mut self, line: &str) -> Option<GameEvent> {
        let trimmed = line.trim();
        let mut result = None;

        if !trimmed.is_empty() {
            let ctx = RuleCtx {
                lookback: &self.lookback,
                player: self.player.as_deref(),
            };
            for rule in self.rules {
                if let Some(parsed) = (rule.parse)(trimmed, &ctx) {
                    tracing::trace!(game = %self.game, rule = rule.name, "line matched");
                    result = Some(parsed.into_event(self.game));
                    break;
                }
            }
            self.lookback.push(trimmed);
        }

        result
    }
}
