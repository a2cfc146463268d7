//! Row tag overlay with sidecar persistence.
//!
//! Tags never touch the source file. They live in
//! `<data_dir>/<sanitized base name>.tags`, one decimal row number per line.
//! Loading is forgiving: anything malformed or out of range is logged and
//! dropped, and a missing or unreadable sidecar yields an empty overlay.

use crate::constants::{
    FALLBACK_TAG_NAME, MAX_TAG_LINE_LENGTH, MAX_TAG_LINES, MAX_TAG_NAME_LENGTH,
    TAG_FILE_EXTENSION,
};
use crate::data::error::{TimelineError, TimelineResult};
use std::collections::HashSet;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// An effective change to the overlay
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagChange {
    pub row: usize,
    pub tagged: bool,
    /// Dirty state after the change (always true)
    pub dirty: bool,
}

/// Set of tagged data rows for one table
#[derive(Debug)]
pub struct TagStore {
    data_dir: PathBuf,
    file_name: String,
    rows: HashSet<usize>,
    row_count: usize,
    dirty: bool,
}

impl TagStore {
    /// Empty overlay for `source` without touching the disk
    pub fn new(data_dir: impl Into<PathBuf>, source: &Path, row_count: usize) -> Self {
        let base = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            data_dir: data_dir.into(),
            file_name: format!("{}.{}", sanitize_file_name(&base), TAG_FILE_EXTENSION),
            rows: HashSet::new(),
            row_count,
            dirty: false,
        }
    }

    /// Overlay for `source`, populated from its sidecar if one exists
    pub fn load(data_dir: impl Into<PathBuf>, source: &Path, row_count: usize) -> Self {
        let mut store = Self::new(data_dir, source, row_count);
        store.read_sidecar();
        store
    }

    /// Where the sidecar lives (it may not exist yet)
    pub fn path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }

    fn read_sidecar(&mut self) {
        let path = self.path();
        let file = match std::fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
            Err(e) => {
                tracing::warn!("Failed to open tag file {}: {}", path.display(), e);
                return;
            }
        };

        let mut skipped = 0usize;
        for (line_no, line) in BufReader::new(file)
            .split(b'\n')
            .take(MAX_TAG_LINES)
            .enumerate()
        {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!("Error reading tag file {}: {}", path.display(), e);
                    break;
                }
            };
            match self.parse_tag_line(&line) {
                Ok(Some(row)) => {
                    self.rows.insert(row);
                }
                Ok(None) => {}
                Err(reason) => {
                    skipped += 1;
                    tracing::warn!(line = line_no + 1, "Skipping tag entry: {}", reason);
                }
            }
        }

        tracing::debug!(
            tagged = self.rows.len(),
            skipped,
            "Loaded tags from {}",
            path.display()
        );
    }

    /// `Ok(None)` for blank lines, `Err` for anything that must be dropped
    fn parse_tag_line(&self, raw: &[u8]) -> Result<Option<usize>, &'static str> {
        let text = std::str::from_utf8(raw).map_err(|_| "not valid UTF-8")?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        if text.chars().count() > MAX_TAG_LINE_LENGTH {
            return Err("line too long");
        }
        let row: i64 = text.parse().map_err(|_| "not an integer")?;
        match usize::try_from(row) {
            Ok(row) if row < self.row_count => Ok(Some(row)),
            _ => Err("row out of range"),
        }
    }

    /// Set one row's membership.
    ///
    /// Returns `None` when nothing changed (membership already matches, or
    /// the row does not exist).
    pub fn toggle(&mut self, row: usize, tagged: bool) -> Option<TagChange> {
        if row >= self.row_count {
            tracing::warn!(row, rows = self.row_count, "Ignoring tag for nonexistent row");
            return None;
        }

        let changed = if tagged {
            self.rows.insert(row)
        } else {
            self.rows.remove(&row)
        };
        if !changed {
            return None;
        }

        self.dirty = true;
        Some(TagChange {
            row,
            tagged,
            dirty: self.dirty,
        })
    }

    pub fn is_tagged(&self, row: usize) -> bool {
        self.rows.contains(&row)
    }

    /// True iff the overlay changed since the last load or save
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Tagged rows in ascending order
    pub fn tagged_rows(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self.rows.iter().copied().collect();
        rows.sort_unstable();
        rows
    }

    /// Write the whole overlay to the sidecar, replacing it atomically.
    ///
    /// Failure leaves the overlay and its dirty flag untouched.
    pub fn save(&mut self) -> TimelineResult<()> {
        std::fs::create_dir_all(&self.data_dir).map_err(|e| {
            TimelineError::PersistenceFailure(format!(
                "cannot create {}: {}",
                self.data_dir.display(),
                e
            ))
        })?;

        let path = self.path();
        let persist_err = |e: std::io::Error| {
            TimelineError::PersistenceFailure(format!("cannot write {}: {}", path.display(), e))
        };

        let mut tmp = tempfile::NamedTempFile::new_in(&self.data_dir).map_err(persist_err)?;
        {
            let mut out = std::io::BufWriter::new(tmp.as_file_mut());
            for row in self.tagged_rows() {
                writeln!(out, "{}", row).map_err(persist_err)?;
            }
            out.flush().map_err(persist_err)?;
        }
        tmp.persist(&path).map_err(|e| persist_err(e.error))?;

        self.dirty = false;
        tracing::info!(tagged = self.rows.len(), "Saved tags to {}", path.display());
        Ok(())
    }
}

/// Make a source base name safe to use as a file name in the data dir.
///
/// Strips `..` runs, path separators, characters invalid on common
/// filesystems and control characters, then truncates. Never empty.
pub fn sanitize_file_name(name: &str) -> String {
    let mut cleaned = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '.' && chars.peek() == Some(&'.') {
            while chars.peek() == Some(&'.') {
                chars.next();
            }
            continue;
        }
        if matches!(c, '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*') || c.is_control() {
            continue;
        }
        cleaned.push(c);
    }

    let truncated: String = cleaned.chars().take(MAX_TAG_NAME_LENGTH).collect();
    if truncated.trim().is_empty() {
        FALLBACK_TAG_NAME.to_string()
    } else {
        truncated
    }
}
