use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::game::GameId;
use crate::now_ms;

/// An event pushed to every connected client.
///
/// Event names are game-prefixed strings (`alyx_started`, ...) rather than a
/// closed enum, so the payload is a tagged map built by the factory
/// functions below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Broadcast {
    pub event: String,
    /// Milliseconds since the Unix epoch.
    pub ts: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Broadcast {
    fn new(event: String) -> Self {
        Self {
            event,
            ts: now_ms(),
            fields: Map::new(),
        }
    }

    fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// `<game>_started`: a session began watching a log.
    pub fn session_started(game: GameId, log_path: &str) -> Self {
        Broadcast::new(format!("{}_started", game.prefix())).with("log_path", log_path)
    }

    /// `<game>_stopped`: a session ended.
    pub fn session_stopped(game: GameId) -> Self {
        Broadcast::new(format!("{}_stopped", game.prefix()))
    }

    /// `<game>_game_event`: a recognized gameplay event.
    pub fn game_event(game: GameId, event_type: &str, params: Map<String, Value>) -> Self {
        Broadcast::new(format!("{}_game_event", game.prefix()))
            .with("event_type", event_type)
            .with("params", Value::Object(params))
    }

    /// `effect_triggered`: a haptic command reached the device.
    pub fn effect_triggered(cells: &[u8], intensity: u8) -> Self {
        let cells: Vec<Value> = cells.iter().map(|c| Value::from(*c)).collect();
        Broadcast::new("effect_triggered".into())
            .with("cells", Value::Array(cells))
            .with("intensity", intensity)
    }

    /// `client_connected` / `client_disconnected`: peer lifecycle.
    pub fn client_connected(client_id: &str) -> Self {
        Broadcast::new("client_connected".into()).with("client_id", client_id)
    }

    pub fn client_disconnected(client_id: &str) -> Self {
        Broadcast::new("client_disconnected".into()).with("client_id", client_id)
    }

    /// `error`: a daemon-side fault worth surfacing to observers.
    pub fn error(message: &str) -> Self {
        Broadcast::new("error".into()).with("message", message)
    }

    /// Serializes to a single JSON line, newline-terminated.
    pub fn to_json_line(&self) -> String {
        let mut line = serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"event":"error","ts":0,"message":"serialization failure"}"#.into());
        line.push('\n');
        line
    }
}
