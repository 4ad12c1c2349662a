//! Incremental reads of appended file content.

use crate::error::Result;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncSeekExt, BufReader, Take};
use tracing::warn;

/// Read position within the tailed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TailCursor {
    position: u64,
    /// The file was absent at the last check.
    missing: bool,
}

/// Result of opening the tailed file for one poll.
#[derive(Debug)]
pub(crate) enum ReadOutcome {
    /// The file does not exist.
    Missing,
    /// Content appended since the previous poll, read on demand.
    Appended(AppendedLines),
}

impl TailCursor {
    /// Places the cursor at the current end of `file_path` so existing content is skipped.
    ///
    /// A file that does not exist yet is read from its first byte once it appears.
    pub(crate) async fn at_end_of(file_path: &Path) -> Result<Self> {
        match tokio::fs::metadata(file_path).await {
            Ok(metadata) => Ok(Self {
                position: metadata.len(),
                missing: false,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self {
                position: 0,
                missing: true,
            }),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn position(&self) -> u64 {
        self.position
    }

    #[cfg(test)]
    pub(crate) fn at(position: u64) -> Self {
        Self {
            position,
            missing: false,
        }
    }
}

/// The bytes appended past a cursor, handed out one line at a time.
///
/// Only the current line is held in memory, so a large append waits on disk
/// while the consumer is slow.
#[derive(Debug)]
pub(crate) struct AppendedLines {
    reader: BufReader<Take<File>>,
    buf: Vec<u8>,
}

impl AppendedLines {
    /// Reads the next complete line and advances `cursor` past it.
    ///
    /// Returns `None` at the end of the appended range. A trailing fragment
    /// without a terminator is left unread until the terminator arrives.
    pub(crate) async fn next_line(&mut self, cursor: &mut TailCursor) -> Result<Option<String>> {
        self.buf.clear();
        let read = self.reader.read_until(b'\n', &mut self.buf).await?;
        if read == 0 || self.buf.last() != Some(&b'\n') {
            return Ok(None);
        }

        cursor.position += read as u64;
        Ok(Some(decode_line(strip_terminator(&self.buf))))
    }
}

/// Opens `file_path` for the content appended since `cursor`.
///
/// A file that shrank or was recreated is read again from the start.
pub(crate) async fn open_appended(file_path: &Path, cursor: &mut TailCursor) -> Result<ReadOutcome> {
    let mut file = match File::open(file_path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            cursor.missing = true;
            return Ok(ReadOutcome::Missing);
        }
        Err(e) => return Err(e.into()),
    };

    if cursor.missing {
        cursor.missing = false;
        cursor.position = 0;
    }

    let current_size = file.metadata().await?.len();

    // Handle file truncation
    if detect_file_truncation(current_size, cursor.position) {
        cursor.position = 0;
    }

    let bytes_to_read = calculate_bytes_to_read(current_size, cursor.position).unwrap_or(0);

    file.seek(std::io::SeekFrom::Start(cursor.position)).await?;

    Ok(ReadOutcome::Appended(AppendedLines {
        reader: BufReader::new(file.take(bytes_to_read)),
        buf: Vec::new(),
    }))
}

/// Drops a trailing `\n` or `\r\n`.
fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn decode_line(bytes: &[u8]) -> String {
    match String::from_utf8(bytes.to_vec()) {
        Ok(line) => line,
        Err(e) => {
            let line = String::from_utf8_lossy(e.as_bytes()).into_owned();
            warn!(error = %e, "Replacing invalid UTF-8 in log line");
            line
        }
    }
}

/// Detect if the file was truncated by comparing current size with last position
fn detect_file_truncation(current_size: u64, last_position: u64) -> bool {
    current_size < last_position
}

/// Calculate bytes to read based on current size and last position
fn calculate_bytes_to_read(current_size: u64, last_position: u64) -> Option<u64> {
    if current_size <= last_position {
        None
    } else {
        Some(current_size - last_position)
    }
}
