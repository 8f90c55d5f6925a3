use serde::{Deserialize, Serialize};

/// A reply sent to the requesting client only.
///
/// Existing UI clients key on the `response` tag, so field names and
/// nullability are load-bearing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "response", rename_all = "snake_case")]
pub enum Response {
    Ok {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        req_id: Option<String>,
    },
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        req_id: Option<String>,
        message: String,
    },
    Ping {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        req_id: Option<String>,
        alive: bool,
        client_count: usize,
    },
    /// Session status for one game.
    Status {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        req_id: Option<String>,
        #[serde(flatten)]
        status: SessionStatus,
    },
    /// Dispatcher/device health.
    DeviceStatus {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        req_id: Option<String>,
        delivered: u64,
        dropped: u64,
        failures: u64,
        #[serde(default)]
        last_error: Option<String>,
    },
    ModInfo {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        req_id: Option<String>,
        info: ModInfo,
    },
}

/// Snapshot of one integration session's externally visible state.
///
/// `last_event_time` is milliseconds since the Unix epoch, or null if no
/// event has been seen; it is always present in the JSON, never omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub running: bool,
    pub events_received: u64,
    pub last_event_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<String>,
    /// Set when transient I/O errors have persisted past the retry threshold.
    #[serde(default)]
    pub degraded: bool,
}

impl SessionStatus {
    /// Status for a game whose session has never been started.
    pub fn stopped() -> Self {
        Self {
            running: false,
            events_received: 0,
            last_event_time: None,
            log_path: None,
            degraded: false,
        }
    }
}

/// Static descriptive data about the in-game mod a game integration needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModInfo {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    pub install_instructions: Vec<String>,
}

impl Response {
    pub fn ok(req_id: Option<String>) -> Self {
        Response::Ok { req_id }
    }

    pub fn error(message: impl Into<String>, req_id: Option<String>) -> Self {
        Response::Error {
            req_id,
            message: message.into(),
        }
    }

    /// Serializes to a single JSON line, newline-terminated.
    pub fn to_json_line(&self) -> String {
        let mut line = serde_json::to_string(self).unwrap_or_else(|_| {
            // Responses contain only serializable leaf types; this path is
            // unreachable but must not take the daemon down.
            r#"{"response":"error","message":"internal serialization failure"}"#.into()
        });
        line.push('\n');
        line
    }
}
