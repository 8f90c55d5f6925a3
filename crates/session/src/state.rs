use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of an integration session.
///
/// `Stopped → Starting → Running → Stopping → Stopped`, with
/// `Running → Error → Stopped` on unrecoverable startup/config failure.
/// Transient per-poll I/O errors never change the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Stopped,
    Starting,
    Running,
    Stopping,
    Error,
}

impl SessionState {
    fn from_u8(value: u8) -> SessionState {
        match value {
            1 => SessionState::Starting,
            2 => SessionState::Running,
            3 => SessionState::Stopping,
            4 => SessionState::Error,
            _ => SessionState::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            SessionState::Stopped => 0,
            SessionState::Starting => 1,
            SessionState::Running => 2,
            SessionState::Stopping => 3,
            SessionState::Error => 4,
        }
    }
}

/// Lock-free state cell: written by lifecycle operations, read by status
/// queries and the loop.
#[derive(Debug, Default)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub fn load(&self) -> SessionState {
        SessionState::from_u8(self.0.load(Ordering::SeqCst))
    }

    pub fn store(&self, state: SessionState) {
        self.0.store(state.as_u8(), Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_through_cell() {
        let cell = StateCell::default();
        assert_eq!(cell.load(), SessionState::Stopped);
        for state in [
            SessionState::Starting,
            SessionState::Running,
            SessionState::Stopping,
            SessionState::Error,
            SessionState::Stopped,
        ] {
            cell.store(state);
            assert_eq!(cell.load(), state);
        }
    }
}
