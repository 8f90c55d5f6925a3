use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use vestlink_protocol::GameId;

/// Canonical representation of one recognized log line.
///
/// Immutable once produced. Parameter keys are canonical across games where
/// the concept is shared: directional damage always carries `angle` (degrees
/// [0,360), 0 front / 90 left), magnitudes are non-negative integers.
#[derive(Debug, Clone, PartialEq)]
pub struct GameEvent {
    pub game: GameId,
    /// Event type from the game's closed rule set.
    pub event_type: String,
    pub params: Map<String, Value>,
    /// Arrival time; the supported logs carry no usable source timestamps.
    pub timestamp: DateTime<Utc>,
    /// The player name this event is about, when the format identifies one.
    /// Used by session-level player filtering.
    pub subject: Option<String>,
}

impl GameEvent {
    /// Canonical direction angle, if this event is directional.
    pub fn angle(&self) -> Option<f64> {
        self.f64_param("angle")
    }

    pub fn f64_param(&self, key: &str) -> Option<f64> {
        self.params.get(key).and_then(Value::as_f64)
    }

    pub fn u64_param(&self, key: &str) -> Option<u64> {
        self.params.get(key).and_then(Value::as_u64)
    }

    pub fn str_param(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    pub fn bool_param(&self, key: &str) -> Option<bool> {
        self.params.get(key).and_then(Value::as_bool)
    }
}

/// Rule output before the grammar stamps on game id and arrival time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedEvent {
    pub event_type: String,
    pub params: Map<String, Value>,
    pub subject: Option<String>,
}

impl ParsedEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            ..Self::default()
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn subject(mut self, name: impl Into<String>) -> Self {
        self.subject = Some(name.into());
        self
    }

    /// Stamps on the game id and arrival time, producing the final event.
    pub fn into_event(self, game: GameId) -> GameEvent {
        GameEvent {
            game,
            event_type: self.event_type,
            params: self.params,
            timestamp: Utc::now(),
            subject: self.subject,
        }
    }
}
