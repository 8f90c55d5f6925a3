/// Read position inside a watched log file.
///
/// Invariant: `offset <= last_size`. A file size below `last_size` means the
/// writer truncated or rotated the log; the cursor resets to the start and
/// no previously consumed content is replayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogCursor {
    /// Bytes consumed so far.
    pub offset: u64,
    /// File size observed at the last poll.
    pub last_size: u64,
}

impl LogCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the current file size, resetting on truncation.
    ///
    /// Returns `true` when a shrink was detected and the cursor was reset.
    pub fn observe(&mut self, size: u64) -> bool {
        if size < self.last_size {
            self.offset = 0;
            self.last_size = size;
            return true;
        }
        self.last_size = size;
        false
    }

    /// Advances past `consumed` bytes just read.
    pub fn advance(&mut self, consumed: u64) {
        self.offset += consumed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_without_reset() {
        let mut cursor = LogCursor::new();
        assert!(!cursor.observe(100));
        cursor.advance(100);
        assert!(!cursor.observe(250));
        assert_eq!(cursor.offset, 100);
        assert_eq!(cursor.last_size, 250);
    }

    #[test]
    fn shrink_resets_to_start() {
        let mut cursor = LogCursor::new();
        cursor.observe(500);
        cursor.advance(500);

        assert!(cursor.observe(80));
        assert_eq!(cursor.offset, 0);
        assert_eq!(cursor.last_size, 80);
    }

    #[test]
    fn same_size_is_not_truncation() {
        let mut cursor = LogCursor::new();
        cursor.observe(300);
        cursor.advance(120);
        assert!(!cursor.observe(300));
        assert_eq!(cursor.offset, 120);
    }

    #[test]
    fn shrink_to_zero() {
        let mut cursor = LogCursor::new();
        cursor.observe(64);
        cursor.advance(64);
        assert!(cursor.observe(0));
        assert_eq!(cursor.offset, 0);
    }
}
