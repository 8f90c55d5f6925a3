//! The vest device boundary and the command dispatcher that owns it.
//!
//! Exactly one physical device exists, so all sessions funnel commands into
//! one [`Dispatcher`]; its internal queue is the only cross-session
//! serialization point in the system. The transport itself sits behind the
//! [`VestDevice`] trait; USB driver code is out of scope here.

mod dispatcher;
mod mock;

pub use dispatcher::{Dispatcher, DispatcherStatus, QUEUE_CAPACITY, sanitize};
pub use mock::MockVest;

/// Errors surfaced by a device transport.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("device I/O error: {0}")]
    Io(String),

    #[error("device disconnected")]
    Disconnected,
}

/// One haptic vest.
///
/// `activate(cell, 0)` turns a cell off; `clear` turns everything off.
/// Implementations are driven from a single task and need no internal
/// locking.
pub trait VestDevice: Send + 'static {
    fn activate(&mut self, cell: u8, intensity: u8) -> Result<(), DeviceError>;

    fn clear(&mut self) -> Result<(), DeviceError>;
}
