use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

/// Per-session counters.
///
/// Written only by the session's own loop; read by concurrent status
/// queries. Atomics give readers a consistent snapshot without ever
/// blocking the loop.
#[derive(Debug, Default)]
pub struct SessionStats {
    events_received: AtomicU64,
    /// Milliseconds since the Unix epoch; 0 means no event yet.
    last_event_ms: AtomicI64,
    /// Lines that matched no grammar rule (diagnostic only).
    lines_ignored: AtomicU64,
    /// Parsed events suppressed by the player filter.
    filtered_out: AtomicU64,
    /// Transient I/O errors have persisted past the retry threshold.
    degraded: AtomicBool,
}

impl SessionStats {
    pub fn record_event(&self, timestamp_ms: i64) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
        self.last_event_ms.store(timestamp_ms, Ordering::Relaxed);
    }

    pub fn record_ignored(&self) {
        self.lines_ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_filtered(&self) {
        self.filtered_out.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_degraded(&self, degraded: bool) {
        self.degraded.store(degraded, Ordering::Relaxed);
    }

    pub fn events_received(&self) -> u64 {
        self.events_received.load(Ordering::Relaxed)
    }

    pub fn last_event_time(&self) -> Option<i64> {
        match self.last_event_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => Some(ms),
        }
    }

    pub fn lines_ignored(&self) -> u64 {
        self.lines_ignored.load(Ordering::Relaxed)
    }

    pub fn filtered_out(&self) -> u64 {
        self.filtered_out.load(Ordering::Relaxed)
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    /// Fresh counters for a new run.
    pub fn reset(&self) {
        self.events_received.store(0, Ordering::Relaxed);
        self.last_event_ms.store(0, Ordering::Relaxed);
        self.lines_ignored.store(0, Ordering::Relaxed);
        self.filtered_out.store(0, Ordering::Relaxed);
        self.degraded.store(false, Ordering::Relaxed);
    }
}
