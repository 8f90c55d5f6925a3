use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::{DeviceError, VestDevice};

/// In-memory vest for tests and for running the daemon without hardware.
///
/// Records every actuator write; cloning shares the recording.
#[derive(Debug, Clone, Default)]
pub struct MockVest {
    writes: Arc<Mutex<Vec<(u8, u8)>>>,
    clears: Arc<AtomicU64>,
    fail_next: Arc<AtomicBool>,
}

impl MockVest {
    pub fn new() -> Self {
        Self::default()
    }

    /// All `(cell, intensity)` writes seen so far, in order.
    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.writes.lock().expect("mock vest lock").clone()
    }

    /// Writes with a non-zero intensity (activations only).
    pub fn activations(&self) -> Vec<(u8, u8)> {
        self.writes()
            .into_iter()
            .filter(|&(_, intensity)| intensity > 0)
            .collect()
    }

    pub fn clear_count(&self) -> u64 {
        self.clears.load(Ordering::SeqCst)
    }

    /// Makes the next `activate` call fail, simulating a USB fault.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl VestDevice for MockVest {
    fn activate(&mut self, cell: u8, intensity: u8) -> Result<(), DeviceError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(DeviceError::Io("simulated write failure".into()));
        }
        self.writes
            .lock()
            .expect("mock vest lock")
            .push((cell, intensity));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DeviceError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
