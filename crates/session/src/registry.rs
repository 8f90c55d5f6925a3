use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use vestlink_grammar::GameEvent;
use vestlink_protocol::{GameId, SessionStatus};

use crate::session::IntegrationSession;
use crate::SessionError;

/// Receives every event that survives parsing and filtering, across all
/// sessions. The daemon wires this to broadcasting and the haptic mapper.
pub type EventSink = Arc<dyn Fn(&GameEvent) + Send + Sync>;

/// Owns at most one session per game and routes lifecycle requests to them.
///
/// Sessions are created lazily and kept after stopping so status queries
/// for a stopped game report its last counters instead of an error.
pub struct SessionRegistry {
    sessions: StdMutex<HashMap<GameId, Arc<IntegrationSession>>>,
    poll_interval: Duration,
    sink: EventSink,
    /// Configured per-game log paths, consulted when a start request names
    /// none (before platform auto-detection).
    log_overrides: HashMap<GameId, PathBuf>,
}

impl SessionRegistry {
    pub fn new(poll_interval: Duration, sink: EventSink) -> Self {
        Self {
            sessions: StdMutex::new(HashMap::new()),
            poll_interval,
            sink,
            log_overrides: HashMap::new(),
        }
    }

    pub fn with_log_overrides(mut self, overrides: HashMap<GameId, PathBuf>) -> Self {
        self.log_overrides = overrides;
        self
    }

    fn session(&self, game: GameId) -> Arc<IntegrationSession> {
        let mut sessions = self.sessions.lock().expect("registry lock");
        Arc::clone(
            sessions
                .entry(game)
                .or_insert_with(|| Arc::new(IntegrationSession::new(game, self.poll_interval))),
        )
    }

    /// Starts a session. Rejects with [`SessionError::AlreadyActive`] when
    /// one is running for this game; it is not restarted.
    pub fn start(
        &self,
        game: GameId,
        log_path: Option<PathBuf>,
        player_filter: Option<String>,
    ) -> Result<PathBuf, SessionError> {
        let log_path = log_path.or_else(|| self.log_overrides.get(&game).cloned());
        self.session(game)
            .start(log_path, player_filter, Arc::clone(&self.sink))
    }

    /// Stops a session. Returns `false` when none was running.
    pub async fn stop(&self, game: GameId) -> bool {
        self.session(game).stop().await
    }

    pub fn status(&self, game: GameId) -> SessionStatus {
        let existing = {
            let sessions = self.sessions.lock().expect("registry lock");
            sessions.get(&game).cloned()
        };
        match existing {
            Some(session) => session.status(),
            None => SessionStatus::stopped(),
        }
    }

    /// Stops every running session; used at daemon shutdown.
    pub async fn stop_all(&self) {
        let sessions: Vec<Arc<IntegrationSession>> = {
            let map = self.sessions.lock().expect("registry lock");
            map.values().cloned().collect()
        };
        for session in sessions {
            session.stop().await;
        }
    }
}
