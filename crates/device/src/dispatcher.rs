use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use vestlink_haptics::{
    HapticCommand, MAX_DURATION_MS, MAX_INTENSITY, MIN_DURATION_MS, NUM_CELLS,
};

use crate::VestDevice;

/// Command queue depth.
///
/// Event bursts (a grenade hitting several times in one tick) must not queue
/// unboundedly: once the queue is full, newer commands of the burst are
/// dropped latest-wins, since they would only replay the same sensation
/// late.
pub const QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct DispatchStats {
    delivered: AtomicU64,
    dropped: AtomicU64,
    rejected: AtomicU64,
    failures: AtomicU64,
    last_error: StdMutex<Option<String>>,
}

impl DispatchStats {
    fn record_failure(&self, error: impl std::fmt::Display) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        *self.last_error.lock().expect("stats lock") = Some(error.to_string());
    }
}

/// Snapshot of dispatcher health for status reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherStatus {
    /// Commands fully executed on the device.
    pub delivered: u64,
    /// Commands dropped because the queue was full or flushed by a stop.
    pub dropped: u64,
    /// Commands rejected during validation (no valid cells).
    pub rejected: u64,
    /// Device write failures.
    pub failures: u64,
    pub last_error: Option<String>,
}

/// Outcome of a single activate-hold-release cycle.
enum Pulse {
    Completed,
    /// A stop-all request arrived mid-hold.
    Stopped,
    /// Device failure or dispatcher shutdown.
    Aborted,
}

/// Owns the single outbound channel to the physical device.
///
/// All sessions enqueue through [`dispatch`](Dispatcher::dispatch); one
/// drain task performs the actual writes, so two physical writes can never
/// race. Stop requests travel on a separate control channel that preempts
/// both the queue and an in-flight hold. Device failures are recorded in
/// [`status`](Dispatcher::status) and never propagate back to event
/// detection.
pub struct Dispatcher {
    tx: mpsc::Sender<HapticCommand>,
    ctrl: mpsc::Sender<()>,
    stats: Arc<DispatchStats>,
    cancel: CancellationToken,
}

impl Dispatcher {
    /// Starts the drain task over `device` and returns the shared handle.
    pub fn spawn(device: impl VestDevice) -> Arc<Self> {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let (ctrl, ctrl_rx) = mpsc::channel(1);
        let stats = Arc::new(DispatchStats::default());
        let cancel = CancellationToken::new();

        let loop_stats = Arc::clone(&stats);
        let loop_cancel = cancel.clone();
        tokio::spawn(async move {
            drain_loop(device, rx, ctrl_rx, loop_stats, loop_cancel).await;
        });

        Arc::new(Self {
            tx,
            ctrl,
            stats,
            cancel,
        })
    }

    /// Validates and enqueues a command. Returns `false` if it was rejected
    /// or dropped; callers do not need to care, but tests do.
    pub fn dispatch(&self, command: HapticCommand) -> bool {
        let Some(command) = sanitize(command) else {
            self.stats.rejected.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("rejected command with no valid cells");
            return false;
        };

        match self.tx.try_send(command) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("device queue full, dropping burst command");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("device drain task gone, command discarded");
                false
            }
        }
    }

    /// Discards queued commands, interrupts any in-flight hold, and
    /// switches every actuator off. Unlike [`dispatch`](Dispatcher::dispatch)
    /// a stop is never dropped.
    pub async fn stop_all(&self) {
        if self.ctrl.send(()).await.is_err() {
            tracing::warn!("device drain task gone, stop_all ignored");
        }
    }

    pub fn status(&self) -> DispatcherStatus {
        DispatcherStatus {
            delivered: self.stats.delivered.load(Ordering::Relaxed),
            dropped: self.stats.dropped.load(Ordering::Relaxed),
            rejected: self.stats.rejected.load(Ordering::Relaxed),
            failures: self.stats.failures.load(Ordering::Relaxed),
            last_error: self.stats.last_error.lock().expect("stats lock").clone(),
        }
    }

    /// Stops the drain task; in-flight holds end early and the device is
    /// cleared on the way out.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// Device-safety validation: out-of-range cells are discarded, duplicates
/// collapsed, intensity and duration clamped. A command left without cells
/// is rejected entirely.
pub fn sanitize(mut command: HapticCommand) -> Option<HapticCommand> {
    command.cells.retain(|&cell| cell < NUM_CELLS);
    command.cells.sort_unstable();
    command.cells.dedup();
    if command.cells.is_empty() {
        return None;
    }
    command.intensity = command.intensity.min(MAX_INTENSITY);
    command.duration_ms = command.duration_ms.clamp(MIN_DURATION_MS, MAX_DURATION_MS);
    Some(command)
}

async fn drain_loop(
    mut device: impl VestDevice,
    mut rx: mpsc::Receiver<HapticCommand>,
    mut ctrl_rx: mpsc::Receiver<()>,
    stats: Arc<DispatchStats>,
    cancel: CancellationToken,
) {
    loop {
        let command = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            stop = ctrl_rx.recv() => {
                if stop.is_none() {
                    break;
                }
                flush_and_clear(&mut device, &mut rx, &stats);
                continue;
            }
            cmd = rx.recv() => match cmd {
                Some(cmd) => cmd,
                None => break,
            },
        };

        // A repeating command keeps pulsing only while nothing newer waits,
        // so sustained effects yield immediately to fresh events.
        loop {
            match run_pulse(&mut device, &command, &stats, &cancel, &mut ctrl_rx).await {
                Pulse::Completed => {
                    if !command.repeat || !rx.is_empty() || cancel.is_cancelled() {
                        break;
                    }
                }
                Pulse::Stopped => {
                    flush_and_clear(&mut device, &mut rx, &stats);
                    break;
                }
                Pulse::Aborted => break,
            }
        }
    }

    if let Err(e) = device.clear() {
        tracing::warn!("failed to clear device on shutdown: {e}");
    }
}

fn flush_and_clear(
    device: &mut impl VestDevice,
    rx: &mut mpsc::Receiver<HapticCommand>,
    stats: &DispatchStats,
) {
    let mut flushed = 0u64;
    while rx.try_recv().is_ok() {
        flushed += 1;
    }
    if flushed > 0 {
        stats.dropped.fetch_add(flushed, Ordering::Relaxed);
    }
    if let Err(e) = device.clear() {
        stats.record_failure(&e);
        tracing::warn!("device clear failed: {e}");
    }
}

/// One activate-hold-release cycle.
async fn run_pulse(
    device: &mut impl VestDevice,
    command: &HapticCommand,
    stats: &DispatchStats,
    cancel: &CancellationToken,
    ctrl_rx: &mut mpsc::Receiver<()>,
) -> Pulse {
    for &cell in &command.cells {
        if let Err(e) = device.activate(cell, command.intensity) {
            stats.record_failure(&e);
            tracing::warn!(cell, "device write failed: {e}");
            return Pulse::Aborted;
        }
    }

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => Pulse::Aborted,
        stop = ctrl_rx.recv() => {
            if stop.is_some() { Pulse::Stopped } else { Pulse::Aborted }
        }
        _ = tokio::time::sleep(Duration::from_millis(command.duration_ms as u64)) => {
            Pulse::Completed
        }
    };

    for &cell in &command.cells {
        // Intensity 0 releases the cell; failures here are counted but do
        // not abort the release of the remaining cells.
        if let Err(e) = device.activate(cell, 0) {
            stats.record_failure(&e);
        }
    }

    if matches!(outcome, Pulse::Completed) {
        stats.delivered.fetch_add(1, Ordering::Relaxed);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockVest;

    fn short_pulse(cells: &[u8], intensity: u8) -> HapticCommand {
        HapticCommand::pulse(cells.to_vec(), intensity).with_duration(MIN_DURATION_MS)
    }

    #[test]
    fn sanitize_drops_invalid_cells_and_clamps() {
        let cmd = HapticCommand {
            cells: vec![3, 9, 3, 250, 0],
            intensity: 99,
            duration_ms: 60_000,
            repeat: false,
        };
        let clean = sanitize(cmd).unwrap();
        assert_eq!(clean.cells, vec![0, 3]);
        assert_eq!(clean.intensity, MAX_INTENSITY);
        assert_eq!(clean.duration_ms, MAX_DURATION_MS);
    }

    #[test]
    fn sanitize_rejects_empty_cell_set() {
        assert!(sanitize(HapticCommand::pulse(vec![8u8, 200], 5)).is_none());
        assert!(sanitize(HapticCommand::pulse(Vec::new(), 5)).is_none());
    }

    #[test]
    fn sanitize_raises_subperceptible_durations() {
        let clean = sanitize(HapticCommand::pulse(vec![1u8], 5).with_duration(1)).unwrap();
        assert_eq!(clean.duration_ms, MIN_DURATION_MS);
    }

    #[tokio::test]
    async fn dispatch_activates_then_releases() {
        let vest = MockVest::new();
        let dispatcher = Dispatcher::spawn(vest.clone());

        assert!(dispatcher.dispatch(short_pulse(&[2, 5], 7)));
        tokio::time::sleep(Duration::from_millis(150)).await;

        let writes = vest.writes();
        assert_eq!(writes[..2], [(2, 7), (5, 7)]);
        assert!(writes.contains(&(2, 0)));
        assert!(writes.contains(&(5, 0)));
        assert_eq!(dispatcher.status().delivered, 1);

        dispatcher.shutdown();
    }

    #[tokio::test]
    async fn commands_from_bursts_are_dropped_not_queued_forever() {
        let vest = MockVest::new();
        let dispatcher = Dispatcher::spawn(vest.clone());

        // One long command occupies the device; flood well past capacity.
        dispatcher.dispatch(HapticCommand::pulse(vec![0u8], 5).with_duration(500));
        let mut sent = 0;
        for _ in 0..(QUEUE_CAPACITY * 2) {
            if dispatcher.dispatch(short_pulse(&[1], 3)) {
                sent += 1;
            }
        }

        assert!(sent <= QUEUE_CAPACITY + 1);
        assert!(dispatcher.status().dropped > 0);

        dispatcher.shutdown();
    }

    #[tokio::test]
    async fn invalid_command_is_rejected_and_counted() {
        let vest = MockVest::new();
        let dispatcher = Dispatcher::spawn(vest.clone());

        assert!(!dispatcher.dispatch(HapticCommand::pulse(vec![42u8], 5)));
        assert_eq!(dispatcher.status().rejected, 1);
        assert!(vest.writes().is_empty());

        dispatcher.shutdown();
    }

    #[tokio::test]
    async fn device_failure_is_reported_not_fatal() {
        let vest = MockVest::new();
        let dispatcher = Dispatcher::spawn(vest.clone());

        vest.fail_next();
        dispatcher.dispatch(short_pulse(&[3], 6));
        tokio::time::sleep(Duration::from_millis(100)).await;

        let status = dispatcher.status();
        assert!(status.failures >= 1);
        assert!(status.last_error.is_some());

        // The dispatcher keeps working afterwards.
        dispatcher.dispatch(short_pulse(&[3], 6));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(dispatcher.status().delivered, 1);

        dispatcher.shutdown();
    }

    #[tokio::test]
    async fn repeating_command_pulses_until_superseded() {
        let vest = MockVest::new();
        let dispatcher = Dispatcher::spawn(vest.clone());

        dispatcher.dispatch(short_pulse(&[2], 3).repeating());
        tokio::time::sleep(Duration::from_millis(120)).await;

        // Several heartbeat cycles by now.
        let heartbeat_writes = vest.activations().len();
        assert!(heartbeat_writes >= 2, "got {heartbeat_writes}");

        // A newer command ends the loop.
        dispatcher.dispatch(short_pulse(&[7], 9));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(vest.activations().contains(&(7, 9)));

        dispatcher.shutdown();
    }

    #[tokio::test]
    async fn stop_all_preempts_queue_and_hold() {
        let vest = MockVest::new();
        let dispatcher = Dispatcher::spawn(vest.clone());

        // A long hold plus a queue of pending pulses.
        dispatcher.dispatch(HapticCommand::pulse(vec![0u8], 5).with_duration(2_000));
        for _ in 0..10 {
            dispatcher.dispatch(short_pulse(&[1], 3));
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        dispatcher.stop_all().await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Queued pulses were flushed, not played, and the device cleared.
        assert!(vest.clear_count() >= 1);
        assert!(!vest.activations().contains(&(1, 3)));
        assert!(dispatcher.status().dropped >= 10);

        dispatcher.shutdown();
    }

    #[tokio::test]
    async fn shutdown_clears_the_device() {
        let vest = MockVest::new();
        let dispatcher = Dispatcher::spawn(vest.clone());

        dispatcher.dispatch(HapticCommand::pulse(vec![1u8], 5).with_duration(2_000));
        tokio::time::sleep(Duration::from_millis(50)).await;

        dispatcher.shutdown();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(vest.clear_count(), 1);
    }
}
