//! Byte-offset line index for random row access.
//!
//! One forward pass over the file records where every data row starts, so a
//! cell read is one seek plus one line read. The header line is skipped and
//! never indexed.
//!
//! ## Limits
//!
//! - Files over [`MAX_FILE_SIZE`] are rejected before scanning
//! - At most [`MAX_ROW_COUNT`] rows
//! - Index memory at most [`MAX_INDEX_MEMORY`] bytes

use crate::constants::{INDEX_ENTRY_SIZE, MAX_FILE_SIZE, MAX_INDEX_MEMORY, MAX_ROW_COUNT};
use crate::data::error::{ResourceLimit, TimelineError, TimelineResult};
use std::io::BufRead;

/// Immutable row-number to byte-offset map
#[derive(Clone, Debug, Default)]
pub struct LineIndex {
    offsets: Vec<u64>,
    header_len: u64,
}

impl LineIndex {
    /// Scan `reader` from its current position (the start of the file).
    ///
    /// `file_len` is the size reported by the filesystem and is checked
    /// before any byte is read. A final line without a trailing newline is
    /// indexed like any other.
    pub fn build<R: BufRead>(mut reader: R, file_len: u64) -> TimelineResult<Self> {
        if file_len > MAX_FILE_SIZE {
            return Err(TimelineError::limit(
                ResourceLimit::FileSize,
                file_len,
                MAX_FILE_SIZE,
            ));
        }

        let start = std::time::Instant::now();

        let header_len = skip_line(&mut reader)?;
        if header_len == 0 {
            return Err(TimelineError::CorruptFile(
                "missing header line".to_string(),
            ));
        }

        let mut offsets = Vec::new();
        let mut offset = header_len;

        loop {
            let read = skip_line(&mut reader)?;
            if read == 0 {
                break;
            }

            if offsets.len() >= MAX_ROW_COUNT {
                return Err(TimelineError::limit(
                    ResourceLimit::RowCount,
                    offsets.len() + 1,
                    MAX_ROW_COUNT,
                ));
            }

            let projected = (offsets.len() as u64 + 1) * INDEX_ENTRY_SIZE;
            if projected > MAX_INDEX_MEMORY {
                return Err(TimelineError::limit(
                    ResourceLimit::IndexMemory,
                    projected,
                    MAX_INDEX_MEMORY,
                ));
            }

            offsets.push(offset);
            offset += read;
        }

        offsets.shrink_to_fit();

        tracing::debug!(
            rows = offsets.len(),
            index_bytes = offsets.len() as u64 * INDEX_ENTRY_SIZE,
            elapsed = ?start.elapsed(),
            "Indexed timeline"
        );

        Ok(Self {
            offsets,
            header_len,
        })
    }

    /// Byte offset where data row `row` starts
    pub fn offset(&self, row: usize) -> Option<u64> {
        self.offsets.get(row).copied()
    }

    /// Number of indexed data rows
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Byte length of the header line, including its terminator
    pub fn header_len(&self) -> u64 {
        self.header_len
    }
}

/// Consume one line including its `\n`, returning its byte length.
///
/// Lines are never buffered whole, so a file without newlines costs no
/// more memory than the reader's buffer.
fn skip_line<R: BufRead>(reader: &mut R) -> std::io::Result<u64> {
    let mut total = 0u64;
    loop {
        let (found, used) = {
            let buf = match reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if buf.is_empty() {
                return Ok(total);
            }
            match buf.iter().position(|&b| b == b'\n') {
                Some(i) => (true, i + 1),
                None => (false, buf.len()),
            }
        };
        reader.consume(used);
        total += used as u64;
        if found {
            return Ok(total);
        }
    }
}
