//! Polling log reader for game console/debug logs.
//!
//! Game logs grow while the game holds them open, get truncated on restart,
//! and may be briefly locked by the writer. [`LogReader`] turns that into a
//! lazy sequence of complete lines: each [`LogReader::poll`] returns only
//! bytes appended since the last poll, detects truncation by size shrink,
//! and surfaces transient I/O errors to the caller for retry on the next
//! tick.
//!
//! Polling is deliberate: filesystem notification is unreliable for the
//! append-while-open pattern game engines use for their logs.

mod cursor;
mod reader;

pub use cursor::LogCursor;
pub use reader::LogReader;
