//! Integration sessions.
//!
//! An [`IntegrationSession`] owns one game's log-watching lifecycle: it
//! resolves the log path, runs the poll-parse-filter-forward loop on its own
//! task, and keeps status counters readable without blocking that loop. The
//! [`SessionRegistry`] enforces the one-running-session-per-game rule and
//! fans recognized events out through a single sink callback.

mod paths;
mod registry;
mod session;
mod state;
mod stats;

pub use paths::{auto_detect_log_path, default_log_paths};
pub use registry::{EventSink, SessionRegistry};
pub use session::{DEGRADED_THRESHOLD, IntegrationSession};
pub use state::SessionState;
pub use stats::SessionStats;

use vestlink_protocol::GameId;

/// Errors from session lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A session for this game is already active; not a restart.
    #[error("{0} integration already running")]
    AlreadyActive(GameId),

    /// Log path missing, undetectable, or unreadable at start.
    #[error("{0}")]
    Config(String),
}
