use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use vestlink_grammar::{GameEvent, Grammar};
use vestlink_log_watch::LogReader;
use vestlink_protocol::{GameId, SessionStatus};

use crate::registry::EventSink;
use crate::state::{SessionState, StateCell};
use crate::stats::SessionStats;
use crate::{SessionError, paths};

/// Consecutive failed polls before status reports `degraded` (~1 s at the
/// default 50 ms interval). Lock contention from the game writer clears
/// well under this.
pub const DEGRADED_THRESHOLD: u32 = 20;

#[derive(Default)]
struct Lifecycle {
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
    log_path: Option<PathBuf>,
}

/// One game's log-watching session.
///
/// The poll loop runs on its own task; lifecycle operations and status
/// queries touch only atomics and a small lifecycle mutex that is never
/// held across an await.
pub struct IntegrationSession {
    game: GameId,
    poll_interval: Duration,
    state: StateCell,
    stats: Arc<SessionStats>,
    lifecycle: StdMutex<Lifecycle>,
}

impl IntegrationSession {
    pub fn new(game: GameId, poll_interval: Duration) -> Self {
        Self {
            game,
            poll_interval,
            state: StateCell::default(),
            stats: Arc::new(SessionStats::default()),
            lifecycle: StdMutex::new(Lifecycle::default()),
        }
    }

    pub fn game(&self) -> GameId {
        self.game
    }

    pub fn state(&self) -> SessionState {
        self.state.load()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Externally visible status snapshot. Never blocks the loop.
    pub fn status(&self) -> SessionStatus {
        let running = matches!(
            self.state.load(),
            SessionState::Starting | SessionState::Running
        );
        let log_path = self
            .lifecycle
            .lock()
            .expect("lifecycle lock")
            .log_path
            .as_ref()
            .map(|p| p.display().to_string());
        SessionStatus {
            running,
            events_received: self.stats.events_received(),
            last_event_time: self.stats.last_event_time(),
            log_path,
            degraded: self.stats.is_degraded(),
        }
    }

    /// Starts watching. Resolves the log path (explicit or auto-detected),
    /// validates it, and spawns the poll loop.
    ///
    /// Only lines appended after this call produce events; a session never
    /// replays the log it attaches to.
    pub fn start(
        &self,
        log_path: Option<PathBuf>,
        player_filter: Option<String>,
        sink: EventSink,
    ) -> Result<PathBuf, SessionError> {
        {
            let state = self.state.load();
            if matches!(state, SessionState::Starting | SessionState::Running) {
                return Err(SessionError::AlreadyActive(self.game));
            }
        }
        self.state.store(SessionState::Starting);

        let path = match log_path.or_else(|| paths::auto_detect_log_path(self.game)) {
            Some(path) => path,
            None => {
                self.state.store(SessionState::Error);
                return Err(SessionError::Config(format!(
                    "could not find a log file for {}; pass log_path explicitly",
                    self.game
                )));
            }
        };

        // The file itself may not exist yet, but its directory must.
        if !path.is_file() && !path.parent().is_some_and(|p| p.is_dir()) {
            self.state.store(SessionState::Error);
            return Err(SessionError::Config(format!(
                "log directory does not exist: {}",
                path.display()
            )));
        }

        let mut reader = LogReader::open(&path);
        if let Err(e) = reader.seek_to_end() {
            self.state.store(SessionState::Error);
            return Err(SessionError::Config(format!(
                "cannot read {}: {e}",
                path.display()
            )));
        }

        self.stats.reset();

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_loop(
            reader,
            Grammar::for_game(self.game, player_filter.clone()),
            player_filter,
            sink,
            Arc::clone(&self.stats),
            cancel.clone(),
            self.poll_interval,
        ));

        {
            let mut lifecycle = self.lifecycle.lock().expect("lifecycle lock");
            lifecycle.cancel = Some(cancel);
            lifecycle.task = Some(task);
            lifecycle.log_path = Some(path.clone());
        }
        self.state.store(SessionState::Running);
        tracing::info!(game = %self.game, path = %path.display(), "session started");
        Ok(path)
    }

    /// Stops the session cooperatively: the loop observes the cancel token
    /// at its next poll boundary and releases the file before `Stopped` is
    /// reported. Returns `false` if nothing was running.
    pub async fn stop(&self) -> bool {
        let (cancel, task) = {
            let state = self.state.load();
            if !matches!(state, SessionState::Starting | SessionState::Running) {
                return false;
            }
            self.state.store(SessionState::Stopping);
            let mut lifecycle = self.lifecycle.lock().expect("lifecycle lock");
            (lifecycle.cancel.take(), lifecycle.task.take())
        };

        if let Some(cancel) = cancel {
            cancel.cancel();
        }
        if let Some(task) = task {
            let _ = task.await;
        }

        self.state.store(SessionState::Stopped);
        tracing::info!(game = %self.game, "session stopped");
        true
    }
}

/// Player filter: an event passes when no filter is set, when the format
/// attributes the event to nobody, or when any attributed name matches.
fn passes_filter(event: &GameEvent, filter: Option<&str>) -> bool {
    let Some(filter) = filter else { return true };

    let mut names = Vec::with_capacity(3);
    if let Some(subject) = event.subject.as_deref() {
        names.push(subject);
    }
    for key in ["attacker", "killer_name"] {
        if let Some(name) = event.str_param(key) {
            names.push(name);
        }
    }
    if names.is_empty() {
        return true;
    }
    names.iter().any(|name| name.eq_ignore_ascii_case(filter))
}

async fn run_loop(
    mut reader: LogReader,
    mut grammar: Grammar,
    player_filter: Option<String>,
    sink: EventSink,
    stats: Arc<SessionStats>,
    cancel: CancellationToken,
    poll_interval: Duration,
) {
    let game = grammar.game();
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut consecutive_errors: u32 = 0;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                match reader.poll() {
                    Ok(lines) => {
                        if consecutive_errors > 0 {
                            consecutive_errors = 0;
                            stats.set_degraded(false);
                        }
                        for line in lines {
                            match grammar.parse(&line) {
                                Some(event) => {
                                    if passes_filter(&event, player_filter.as_deref()) {
                                        stats.record_event(event.timestamp.timestamp_millis());
                                        sink(&event);
                                    } else {
                                        stats.record_filtered();
                                    }
                                }
                                None => stats.record_ignored(),
                            }
                        }
                    }
                    Err(e) => {
                        // Writer lock or transient unavailability: retry on
                        // the next tick. Only a persistent run of failures
                        // surfaces as a degraded flag.
                        consecutive_errors += 1;
                        if consecutive_errors == DEGRADED_THRESHOLD {
                            stats.set_degraded(true);
                            tracing::warn!(game = %game, "log reads failing persistently: {e}");
                        } else {
                            tracing::debug!(game = %game, "transient log read error: {e}");
                        }
                    }
                }
            }
        }
    }
    // Reader (and with it the file handle, if any) drops here.
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    const TICK: Duration = Duration::from_millis(10);
    const SETTLE: Duration = Duration::from_millis(120);

    fn collecting_sink() -> (EventSink, Arc<Mutex<Vec<GameEvent>>>) {
        let seen: Arc<Mutex<Vec<GameEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let seen2 = Arc::clone(&seen);
        let sink: EventSink = Arc::new(move |event: &GameEvent| {
            seen2.lock().unwrap().push(event.clone());
        });
        (sink, seen)
    }

    fn append(path: &std::path::Path, text: &str) {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .unwrap();
        file.write_all(text.as_bytes()).unwrap();
    }

    #[tokio::test]
    async fn session_parses_appended_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("console.log");
        append(&path, "preexisting content is skipped\n");

        let session = IntegrationSession::new(GameId::Alyx, TICK);
        let (sink, seen) = collecting_sink();
        let resolved = session.start(Some(path.clone()), None, sink).unwrap();
        assert_eq!(resolved, path);
        assert_eq!(session.state(), SessionState::Running);

        append(&path, "[Tactsuit] {PlayerDeath|4}\nnoise line\n[Tactsuit] {Reset}\n");
        tokio::time::sleep(SETTLE).await;

        assert_eq!(session.stats().events_received(), 2);
        assert_eq!(session.stats().lines_ignored(), 1);
        assert!(session.stats().last_event_time().is_some());
        assert_eq!(seen.lock().unwrap().len(), 2);

        assert!(session.stop().await);
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[tokio::test]
    async fn duplicate_start_is_rejected_and_harmless() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("console.log");

        let session = IntegrationSession::new(GameId::Alyx, TICK);
        let (sink, _) = collecting_sink();
        session.start(Some(path.clone()), None, sink.clone()).unwrap();

        append(&path, "[Tactsuit] {Reset}\n");
        tokio::time::sleep(SETTLE).await;
        let before = session.stats().events_received();
        assert_eq!(before, 1);

        let err = session.start(Some(path.clone()), None, sink).unwrap_err();
        assert!(matches!(err, SessionError::AlreadyActive(GameId::Alyx)));
        // The original session keeps running with its counters intact.
        assert_eq!(session.stats().events_received(), before);
        assert_eq!(session.state(), SessionState::Running);

        session.stop().await;
    }

    #[tokio::test]
    async fn player_filter_suppresses_and_does_not_count() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("console.log");

        let session = IntegrationSession::new(GameId::Hl2dm, TICK);
        let (sink, seen) = collecting_sink();
        session
            .start(Some(path.clone()), Some("Alice".into()), sink)
            .unwrap();

        append(&path, "\"Bob\" took 30 damage from \"Carol\"\n");
        append(&path, "\"Alice\" took 60 damage from \"Bob\"\n");
        tokio::time::sleep(SETTLE).await;

        // Bob's event parsed but suppressed; only Alice's reached the sink.
        assert_eq!(session.stats().events_received(), 1);
        assert_eq!(session.stats().filtered_out(), 1);
        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].subject.as_deref(), Some("Alice"));

        drop(events);
        session.stop().await;
    }

    #[tokio::test]
    async fn truncation_mid_session_recovers() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("console.log");

        let session = IntegrationSession::new(GameId::Alyx, TICK);
        let (sink, _) = collecting_sink();
        session.start(Some(path.clone()), None, sink).unwrap();

        append(&path, "[Tactsuit] {Reset}\n[Tactsuit] {Reset}\n");
        tokio::time::sleep(SETTLE).await;
        assert_eq!(session.stats().events_received(), 2);

        // Game clears its log.
        std::fs::write(&path, "").unwrap();
        tokio::time::sleep(SETTLE).await;

        append(&path, "[Tactsuit] {PlayerDeath|0}\n");
        tokio::time::sleep(SETTLE).await;

        assert_eq!(session.stats().events_received(), 3);
        assert_eq!(session.state(), SessionState::Running);

        session.stop().await;
    }

    #[tokio::test]
    async fn session_can_start_before_log_exists() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("console.log");

        let session = IntegrationSession::new(GameId::Alyx, TICK);
        let (sink, _) = collecting_sink();
        session.start(Some(path.clone()), None, sink).unwrap();
        assert_eq!(session.state(), SessionState::Running);

        // The game starts later and creates its log.
        append(&path, "[Tactsuit] {Reset}\n");
        tokio::time::sleep(SETTLE).await;
        assert_eq!(session.stats().events_received(), 1);

        session.stop().await;
    }

    #[tokio::test]
    async fn missing_parent_directory_is_a_config_error() {
        let session = IntegrationSession::new(GameId::Alyx, TICK);
        let (sink, _) = collecting_sink();
        let err = session
            .start(
                Some(PathBuf::from("/nonexistent-root-dir/sub/console.log")),
                None,
                sink,
            )
            .unwrap_err();
        assert!(matches!(err, SessionError::Config(_)));
        assert_eq!(session.state(), SessionState::Error);
        assert!(!session.status().running);
    }

    #[tokio::test]
    async fn restart_after_stop_resets_counters() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("console.log");

        let session = IntegrationSession::new(GameId::Alyx, TICK);
        let (sink, _) = collecting_sink();
        session.start(Some(path.clone()), None, sink.clone()).unwrap();
        append(&path, "[Tactsuit] {Reset}\n");
        tokio::time::sleep(SETTLE).await;
        session.stop().await;
        assert_eq!(session.stats().events_received(), 1);

        session.start(Some(path.clone()), None, sink).unwrap();
        assert_eq!(session.stats().events_received(), 0);
        session.stop().await;
    }

    #[test]
    fn filter_matches_subject_or_attacker() {
        use vestlink_grammar::ParsedEvent;

        let event = ParsedEvent::new("player_damage")
            .param("attacker", "Bob")
            .subject("Alice")
            .into_event(GameId::Hl2dm);

        assert!(passes_filter(&event, None));
        assert!(passes_filter(&event, Some("alice")));
        assert!(passes_filter(&event, Some("BOB")));
        assert!(!passes_filter(&event, Some("Mallory")));

        // Events attributed to nobody always pass.
        let anon = ParsedEvent::new("Reset").into_event(GameId::Alyx);
        assert!(passes_filter(&anon, Some("Alice")));
    }
}
