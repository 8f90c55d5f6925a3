use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::cursor::LogCursor;

/// Incremental reader over a single growing log file.
///
/// Opening is lazy: the file may not exist yet (a session can start before
/// the game creates its log) and is reopened on every poll so a writer
/// replacing the file is picked up without holding a handle across ticks.
#[derive(Debug)]
pub struct LogReader {
    path: PathBuf,
    cursor: LogCursor,
    /// Bytes of a trailing line not yet terminated by `\n`.
    partial: Vec<u8>,
    truncations: u64,
}

impl LogReader {
    /// Creates a reader for `path`. No filesystem access happens here.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cursor: LogCursor::new(),
            partial: Vec::new(),
            truncations: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cursor(&self) -> LogCursor {
        self.cursor
    }

    /// Number of truncations observed since this reader was created.
    pub fn truncations(&self) -> u64 {
        self.truncations
    }

    /// Skips everything currently in the file, so only lines appended after
    /// this call are returned. Missing file is treated as empty.
    pub fn seek_to_end(&mut self) -> io::Result<()> {
        let size = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e),
        };
        self.cursor = LogCursor {
            offset: size,
            last_size: size,
        };
        self.partial.clear();
        Ok(())
    }

    /// Returns complete lines appended since the last poll.
    ///
    /// - Missing file: `Ok(vec![])`: the game just hasn't created it yet.
    /// - Size shrink: truncation; the cursor resets to 0 and reading resumes
    ///   from the start of the new content. No stale fragments are replayed.
    /// - Other I/O errors (writer lock, transient unavailability) are
    ///   returned for the caller to retry on its next tick; the cursor is
    ///   left unchanged so no data is lost.
    ///
    /// Undecodable bytes are replaced rather than treated as errors; a
    /// trailing unterminated line is held back until its newline arrives.
    pub fn poll(&mut self) -> io::Result<Vec<String>> {
        let size = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        if self.cursor.observe(size) {
            self.truncations += 1;
            self.partial.clear();
            tracing::info!(path = %self.path.display(), "log truncated, resetting cursor");
        }

        if size <= self.cursor.offset {
            return Ok(Vec::new());
        }

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(self.cursor.offset))?;

        // Read at most the bytes present at stat time; anything the writer
        // appends mid-read is picked up by the next poll.
        let mut buf = Vec::new();
        file.take(size - self.cursor.offset).read_to_end(&mut buf)?;
        self.cursor.advance(buf.len() as u64);

        Ok(self.split_lines(buf))
    }

    /// Appends `buf` to any held-back partial line and emits complete lines.
    fn split_lines(&mut self, buf: Vec<u8>) -> Vec<String> {
        self.partial.extend_from_slice(&buf);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(pos) = self.partial[start..].iter().position(|&b| b == b'\n') {
            let end = start + pos;
            let raw = &self.partial[start..end];
            let text = String::from_utf8_lossy(raw);
            let text = text.trim_end_matches('\r');
            if !text.is_empty() {
                lines.push(text.to_string());
            }
            start = end + 1;
        }
        self.partial.drain(..start);
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn append(path: &Path, text: &str) {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .unwrap();
        file.write_all(text.as_bytes()).unwrap();
    }

    #[test]
    fn missing_file_yields_no_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let mut reader = LogReader::open(tmp.path().join("console.log"));
        assert!(reader.poll().unwrap().is_empty());
        assert!(reader.poll().unwrap().is_empty());
    }

    #[test]
    fn reads_only_appended_lines_once() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("console.log");
        let mut reader = LogReader::open(&path);

        append(&path, "first\nsecond\n");
        assert_eq!(reader.poll().unwrap(), vec!["first", "second"]);
        assert!(reader.poll().unwrap().is_empty());

        append(&path, "third\n");
        assert_eq!(reader.poll().unwrap(), vec!["third"]);
    }

    #[test]
    fn partial_line_held_until_complete() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("console.log");
        let mut reader = LogReader::open(&path);

        append(&path, "incompl");
        assert!(reader.poll().unwrap().is_empty());

        append(&path, "ete line\nnext\n");
        assert_eq!(reader.poll().unwrap(), vec!["incomplete line", "next"]);
    }

    #[test]
    fn truncation_resets_and_resumes_from_start() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Game.log");
        let mut reader = LogReader::open(&path);

        append(&path, "old content line\n");
        assert_eq!(reader.poll().unwrap().len(), 1);

        // Game restart: log is recreated smaller.
        std::fs::write(&path, "fresh\n").unwrap();
        let lines = reader.poll().unwrap();
        assert_eq!(lines, vec!["fresh"]);
        assert_eq!(reader.truncations(), 1);
    }

    #[test]
    fn truncation_discards_partial_fragment() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Game.log");
        let mut reader = LogReader::open(&path);

        append(&path, "a complete line\ndangling fragm");
        assert_eq!(reader.poll().unwrap().len(), 1);

        std::fs::write(&path, "clean\n").unwrap();
        // The stale fragment must not be glued onto the new content.
        assert_eq!(reader.poll().unwrap(), vec!["clean"]);
    }

    #[test]
    fn crlf_and_blank_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("console.log");
        let mut reader = LogReader::open(&path);

        append(&path, "windows line\r\n\r\nplain line\n");
        assert_eq!(reader.poll().unwrap(), vec!["windows line", "plain line"]);
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("console.log");
        let mut reader = LogReader::open(&path);

        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"bad \xff\xfe bytes\n").unwrap();
        drop(file);

        let lines = reader.poll().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("bad "));
        assert!(lines[0].contains('\u{FFFD}'));
    }

    #[test]
    fn seek_to_end_skips_existing_content() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("console.log");
        append(&path, "history\n");

        let mut reader = LogReader::open(&path);
        reader.seek_to_end().unwrap();
        assert!(reader.poll().unwrap().is_empty());

        append(&path, "live\n");
        assert_eq!(reader.poll().unwrap(), vec!["live"]);
    }

    #[test]
    fn seek_to_end_on_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut reader = LogReader::open(tmp.path().join("nope.log"));
        reader.seek_to_end().unwrap();
        assert_eq!(reader.cursor().offset, 0);
    }
}
