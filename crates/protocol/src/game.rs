use serde::{Deserialize, Serialize};

/// Identifier for a supported game integration.
///
/// The string form is the prefix used in command and event names on the wire
/// (`alyx_start`, `starcitizen_game_event`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameId {
    /// Half-Life: Alyx: `[Tactsuit] {...}` tags in console.log.
    #[serde(rename = "alyx")]
    Alyx,
    /// Half-Life 2: Deathmatch: Source engine kill feed in console.log.
    #[serde(rename = "hl2dm")]
    Hl2dm,
    /// Star Citizen: actor death and vehicle hit lines in Game.log.
    #[serde(rename = "starcitizen")]
    StarCitizen,
    /// For Honor: directional combat lines in the game's combat log.
    #[serde(rename = "forhonor")]
    ForHonor,
}

impl GameId {
    /// All supported games, in registry order.
    pub const ALL: [GameId; 4] = [
        GameId::Alyx,
        GameId::Hl2dm,
        GameId::StarCitizen,
        GameId::ForHonor,
    ];

    /// The wire prefix for this game (`"alyx"`, `"hl2dm"`, ...).
    pub fn prefix(&self) -> &'static str {
        match self {
            GameId::Alyx => "alyx",
            GameId::Hl2dm => "hl2dm",
            GameId::StarCitizen => "starcitizen",
            GameId::ForHonor => "forhonor",
        }
    }

    /// Parses a wire prefix back into a game id.
    pub fn from_prefix(prefix: &str) -> Option<GameId> {
        GameId::ALL.iter().copied().find(|g| g.prefix() == prefix)
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}
