use serde::{Deserialize, Serialize};

use crate::game::GameId;

/// A request from a client, as it appears on the wire.
///
/// `cmd` selects the operation; the remaining fields are operation-specific
/// parameters and are simply absent when unused.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Request {
    pub cmd: String,

    /// Echoed back in the response so clients can correlate replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub req_id: Option<String>,

    /// Explicit log file path for `<game>_start` (auto-detected if absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<String>,

    /// Player-name filter for multiplayer games on `<game>_start`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Target cell for a manual `trigger`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell: Option<u8>,

    /// Intensity for a manual `trigger`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<u8>,
}

/// Session lifecycle operation carried by a `<game>_*` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionVerb {
    Start,
    Stop,
    Status,
}

/// The decoded meaning of a request's `cmd` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Daemon liveness check.
    Ping,
    /// Device/dispatcher status.
    DeviceStatus,
    /// Manually fire one actuator cell.
    Trigger,
    /// Stop all actuators.
    StopAll,
    /// Start/stop/query a game integration session.
    Session(GameId, SessionVerb),
    /// Static mod-install metadata for a game.
    ModInfo(GameId),
    /// Unrecognized command; answered with a structured error.
    Unknown,
}

impl Request {
    /// Parses a request from one line of input.
    pub fn from_json(line: &str) -> Result<Request, serde_json::Error> {
        serde_json::from_str(line.trim())
    }

    /// Decodes the `cmd` string into a [`RequestKind`].
    pub fn kind(&self) -> RequestKind {
        match self.cmd.as_str() {
            "ping" => return RequestKind::Ping,
            "status" => return RequestKind::DeviceStatus,
            "trigger" => return RequestKind::Trigger,
            "stop" => return RequestKind::StopAll,
            _ => {}
        }

        // Game-scoped commands: `<prefix>_<verb>`.
        if let Some((prefix, verb)) = self.cmd.split_once('_') {
            if let Some(game) = GameId::from_prefix(prefix) {
                return match verb {
                    "start" => RequestKind::Session(game, SessionVerb::Start),
                    "stop" => RequestKind::Session(game, SessionVerb::Stop),
                    "status" => RequestKind::Session(game, SessionVerb::Status),
                    "mod_info" => RequestKind::ModInfo(game),
                    _ => RequestKind::Unknown,
                };
            }
        }

        RequestKind::Unknown
    }
}
