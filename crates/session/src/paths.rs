//! Platform default log locations per game.
//!
//! Used when a `<game>_start` request does not name a log path. Candidates
//! are tried in order: an existing file wins; failing that, a path whose
//! parent directory exists (game installed, log not written yet).

use std::path::PathBuf;

use vestlink_protocol::GameId;

#[cfg(windows)]
pub fn default_log_paths(game: GameId) -> Vec<PathBuf> {
    let program_files = std::env::var("ProgramFiles(x86)")
        .unwrap_or_else(|_| "C:/Program Files (x86)".into());
    let documents = std::env::var("USERPROFILE")
        .map(|p| format!("{p}/Documents"))
        .unwrap_or_else(|_| "C:/Users/Default/Documents".into());

    match game {
        GameId::Alyx => vec![PathBuf::from(format!(
            "{program_files}/Steam/steamapps/common/Half-Life Alyx/game/hlvr/console.log"
        ))],
        GameId::Hl2dm => vec![PathBuf::from(format!(
            "{program_files}/Steam/steamapps/common/Half-Life 2 Deathmatch/hl2mp/console.log"
        ))],
        GameId::StarCitizen => vec![
            PathBuf::from("C:/Program Files/Roberts Space Industries/StarCitizen/LIVE/Game.log"),
            PathBuf::from(format!(
                "{program_files}/Steam/steamapps/common/StarCitizen/Game.log"
            )),
        ],
        GameId::ForHonor => vec![PathBuf::from(format!(
            "{documents}/My Games/For Honor/combat.log"
        ))],
    }
}

#[cfg(not(windows))]
pub fn default_log_paths(game: GameId) -> Vec<PathBuf> {
    let home = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".into()));
    let steam_common = home.join(".steam/steam/steamapps/common");

    match game {
        GameId::Alyx => vec![steam_common.join("Half-Life Alyx/game/hlvr/console.log")],
        GameId::Hl2dm => {
            vec![steam_common.join("Half-Life 2 Deathmatch/hl2mp/console.log")]
        }
        GameId::StarCitizen => vec![steam_common.join("StarCitizen/Game.log")],
        GameId::ForHonor => vec![
            home.join(".local/share/forhonor/combat.log"),
            steam_common.join("For Honor/combat.log"),
        ],
    }
}

/// Picks the best default log path for `game`, or `None` if the game does
/// not appear to be installed.
pub fn auto_detect_log_path(game: GameId) -> Option<PathBuf> {
    let candidates = default_log_paths(game);

    if let Some(path) = candidates.iter().find(|p| p.is_file()) {
        return Some(path.clone());
    }
    candidates
        .into_iter()
        .find(|p| p.parent().is_some_and(|parent| parent.is_dir()))
}
