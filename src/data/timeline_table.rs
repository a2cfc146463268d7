//! File-backed virtual table over a timeline export.
//!
//! A `TimelineTable` never holds the file contents. Opening it detects the
//! schema, builds a [`LineIndex`] and loads the tag overlay; each cell read
//! then seeks to the row's offset and decodes that single line.
//!
//! ## Concurrency
//!
//! One shared file handle sits behind a mutex that spans every seek+read, so
//! cell reads are serialized against each other. The overlay has its own
//! lock and never waits on file I/O.
//!
//! ## Events
//!
//! Tag mutations and saves are published to every receiver handed out by
//! [`TimelineTable::subscribe`]. Callers that prefer polling can read
//! [`TimelineTable::is_dirty`] after each mutating call.

use crate::config::TableConfig;
use crate::constants::MAX_FILE_SIZE;
use crate::data::error::{TimelineError, TimelineResult};
use crate::data::format::{TimelineType, detect_format};
use crate::data::line_index::LineIndex;
use crate::data::record::{parse_line, read_raw_line, trim_line_ending};
use crate::data::sniffer::format_if_applicable;
use crate::data::tag_store::{TagChange, TagStore};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Value of one cell as presented to callers
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    /// Tag checkbox state (super timeline tag column only)
    Tag(bool),
    /// Out of range, missing field or undecodable line
    Empty,
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Tag(true) => f.write_str("[x]"),
            Cell::Tag(false) => f.write_str("[ ]"),
            Cell::Empty => Ok(()),
        }
    }
}

/// Notification published after an effective state change
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableEvent {
    /// A row's tag flipped; `dirty` is the overlay state afterwards
    TagChanged { row: usize, tagged: bool, dirty: bool },
    /// The overlay was written to disk and is clean again
    Saved,
}

impl From<TagChange> for TableEvent {
    fn from(change: TagChange) -> Self {
        TableEvent::TagChanged {
            row: change.row,
            tagged: change.tagged,
            dirty: change.dirty,
        }
    }
}

/// A read-only timeline file exposed as a random-access, taggable table
pub struct TimelineTable {
    path: PathBuf,
    timeline_type: TimelineType,
    columns: Vec<String>,
    index: LineIndex,
    file: Mutex<Option<BufReader<File>>>,
    tags: RwLock<TagStore>,
    subscribers: Mutex<Vec<mpsc::Sender<TableEvent>>>,
}

impl fmt::Debug for TimelineTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimelineTable")
            .field("path", &self.path)
            .field("timeline_type", &self.timeline_type)
            .field("rows", &self.index.len())
            .field("columns", &self.columns.len())
            .finish()
    }
}

impl TimelineTable {
    /// Open a timeline with the default app-data directory
    pub fn open(path: impl AsRef<Path>) -> TimelineResult<Self> {
        Self::open_with(path, &TableConfig::default())
    }

    /// Open a timeline.
    ///
    /// Any failure is fatal: no partially constructed table is ever
    /// returned.
    pub fn open_with(path: impl AsRef<Path>, config: &TableConfig) -> TimelineResult<Self> {
        let path = path.as_ref().to_path_buf();
        let start = std::time::Instant::now();

        let file_len = check_source(&path)?;
        let file = File::open(&path)
            .map_err(|e| TimelineError::file_access(&path, format!("not readable: {}", e)))?;
        let mut reader = BufReader::new(file);

        let columns = read_header(&mut reader)?;
        let timeline_type = detect_format(&columns);

        reader.seek(SeekFrom::Start(0))?;
        let index = LineIndex::build(&mut reader, file_len)?;

        let tags = TagStore::load(config.data_dir(), &path, index.len());

        tracing::debug!(
            "Opened {} timeline {} with {} rows x {} cols in {:?}",
            timeline_type.label(),
            path.display(),
            index.len(),
            columns.len(),
            start.elapsed()
        );

        Ok(Self {
            path,
            timeline_type,
            columns,
            index,
            file: Mutex::new(Some(reader)),
            tags: RwLock::new(tags),
            subscribers: Mutex::new(Vec::new()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name for display, e.g. tab titles
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn timeline_type(&self) -> TimelineType {
        self.timeline_type
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Header names in file order
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn column_name(&self, col: usize) -> Option<&str> {
        self.columns.get(col).map(String::as_str)
    }

    /// Position of the first column named exactly `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Column rendered as a tag checkbox, if this schema has one
    pub fn tag_column(&self) -> Option<usize> {
        self.timeline_type.tag_column()
    }

    /// Column routed through the content sniffer, if this schema has one
    pub fn message_column(&self) -> Option<usize> {
        self.timeline_type.message_column()
    }

    /// Cell value for display.
    ///
    /// Out-of-range coordinates and undecodable lines yield [`Cell::Empty`].
    pub fn get_cell(&self, row: usize, col: usize) -> Cell {
        if row >= self.row_count() || col >= self.column_count() {
            return Cell::Empty;
        }

        if self.tag_column() == Some(col) {
            return Cell::Tag(self.is_tagged(row));
        }

        let Some(mut fields) = self.record(row) else {
            return Cell::Empty;
        };
        if col >= fields.len() {
            return Cell::Empty;
        }
        let field = fields.swap_remove(col);

        if self.message_column() == Some(col) {
            Cell::Text(format_if_applicable(&field))
        } else {
            Cell::Text(field)
        }
    }

    /// Decoded raw fields of one row, without any display formatting
    pub fn record(&self, row: usize) -> Option<Vec<String>> {
        let offset = self.index.offset(row)?;

        let mut guard = self.file.lock();
        let reader = self.ensure_open(&mut guard)?;

        if let Err(e) = reader.seek(SeekFrom::Start(offset)) {
            tracing::warn!(row, "Failed to seek to row: {}", e);
            return None;
        }

        let mut buf = Vec::new();
        if let Err(e) = read_raw_line(reader, &mut buf) {
            tracing::warn!(row, "Failed to read row: {}", e);
            return None;
        }
        drop(guard);

        decode_row(row, &buf)
    }

    /// Visit every decodable row in order while holding the file lock once.
    ///
    /// Rows that fail to decode are skipped.
    pub fn for_each_record<F>(&self, mut visit: F)
    where
        F: FnMut(usize, &[String]),
    {
        let Some(first) = self.index.offset(0) else {
            return;
        };

        let mut guard = self.file.lock();
        let Some(reader) = self.ensure_open(&mut guard) else {
            return;
        };
        if let Err(e) = reader.seek(SeekFrom::Start(first)) {
            tracing::warn!("Failed to seek to first row: {}", e);
            return;
        }

        let mut buf = Vec::new();
        for row in 0..self.row_count() {
            match read_raw_line(reader, &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    // The reader position is unknown now; resync on the next row
                    tracing::warn!(row, "Failed to read row: {}", e);
                    let resynced = match self.index.offset(row + 1) {
                        Some(next) => reader.seek(SeekFrom::Start(next)).is_ok(),
                        None => false,
                    };
                    if resynced {
                        continue;
                    }
                    break;
                }
            }
            if let Some(fields) = decode_row(row, &buf) {
                visit(row, &fields);
            }
        }
    }

    fn ensure_open<'a>(
        &self,
        slot: &'a mut Option<BufReader<File>>,
    ) -> Option<&'a mut BufReader<File>> {
        if slot.is_none() {
            match File::open(&self.path) {
                Ok(file) => *slot = Some(BufReader::new(file)),
                Err(e) => {
                    tracing::warn!("Failed to reopen {}: {}", self.path.display(), e);
                    return None;
                }
            }
        }
        slot.as_mut()
    }

    /// Close the shared handle; the next read reopens it
    pub fn release_handle(&self) {
        self.file.lock().take();
    }

    pub fn is_tagged(&self, row: usize) -> bool {
        self.tags.read().is_tagged(row)
    }

    /// Tag or untag one row. Returns whether anything changed.
    ///
    /// The event is published before the overlay lock is released, so
    /// subscribers see changes and saves in the order they took effect.
    pub fn set_tag(&self, row: usize, tagged: bool) -> bool {
        let mut tags = self.tags.write();
        match tags.toggle(row, tagged) {
            Some(change) => {
                self.publish(change.into());
                true
            }
            None => false,
        }
    }

    /// Tagged rows in ascending order
    pub fn tagged_rows(&self) -> Vec<usize> {
        self.tags.read().tagged_rows()
    }

    /// True iff tags changed since they were last loaded or saved
    pub fn is_dirty(&self) -> bool {
        self.tags.read().is_dirty()
    }

    /// Location of this table's sidecar tag file
    pub fn tag_path(&self) -> PathBuf {
        self.tags.read().path()
    }

    /// Persist the tag overlay. Failure leaves the table usable and dirty.
    pub fn save(&self) -> TimelineResult<()> {
        let mut tags = self.tags.write();
        tags.save()?;
        self.publish(TableEvent::Saved);
        Ok(())
    }

    /// Receive every future [`TableEvent`] of this table
    pub fn subscribe(&self) -> mpsc::Receiver<TableEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.lock().push(tx);
        rx
    }

    fn publish(&self, event: TableEvent) {
        self.subscribers.lock().retain(|tx| tx.send(event).is_ok());
    }
}

/// Validate the source before opening it; returns its size
fn check_source(path: &Path) -> TimelineResult<u64> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TimelineError::file_access(path, "file does not exist")
        } else {
            TimelineError::file_access(path, format!("cannot stat: {}", e))
        }
    })?;

    if !metadata.is_file() {
        return Err(TimelineError::file_access(path, "not a regular file"));
    }
    if metadata.len() == 0 {
        return Err(TimelineError::file_access(path, "file is empty"));
    }
    if metadata.len() > MAX_FILE_SIZE {
        return Err(TimelineError::file_access(
            path,
            format!("file size {} exceeds the 2 GiB limit", metadata.len()),
        ));
    }

    Ok(metadata.len())
}

fn read_header(reader: &mut BufReader<File>) -> TimelineResult<Vec<String>> {
    let mut buf = Vec::new();
    if read_raw_line(reader, &mut buf)? == 0 {
        return Err(TimelineError::CorruptFile("missing header line".to_string()));
    }

    let raw = trim_line_ending(&buf);
    let raw = raw.strip_prefix(UTF8_BOM).unwrap_or(raw);
    let line = std::str::from_utf8(raw)
        .map_err(|e| TimelineError::CorruptFile(format!("header is not valid UTF-8: {}", e)))?;

    parse_line(line)
}

fn decode_row(row: usize, raw: &[u8]) -> Option<Vec<String>> {
    let line = match std::str::from_utf8(trim_line_ending(raw)) {
        Ok(line) => line,
        Err(e) => {
            tracing::warn!(row, "Row is not valid UTF-8: {}", e);
            return None;
        }
    };

    match parse_line(line) {
        Ok(fields) => Some(fields),
        Err(e) => {
            tracing::warn!(row, "Error parsing row: {}", e);
            None
        }
    }
}
