//! Error types for timeline operations
//!
//! Construction failures (`FileAccess`, `ResourceLimitExceeded`,
//! `CorruptFile`) are fatal to a table. `PersistenceFailure` only ever
//! concerns the sidecar tag file and never invalidates an open table.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The resource cap that was hit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceLimit {
    FileSize,
    RowCount,
    IndexMemory,
    LineLength,
    FieldLength,
    FieldCount,
}

impl fmt::Display for ResourceLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceLimit::FileSize => "file size",
            ResourceLimit::RowCount => "row count",
            ResourceLimit::IndexMemory => "index memory",
            ResourceLimit::LineLength => "line length",
            ResourceLimit::FieldLength => "field length",
            ResourceLimit::FieldCount => "field count",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while opening or operating on a timeline
#[derive(Error, Debug)]
pub enum TimelineError {
    /// Source file is missing, unreadable, empty or too large
    #[error("Cannot access {}: {reason}", path.display())]
    FileAccess { path: PathBuf, reason: String },

    /// A size, count or length cap was exceeded
    #[error("Resource limit exceeded: {limit} {actual} (max {max})")]
    ResourceLimitExceeded {
        limit: ResourceLimit,
        actual: u64,
        max: u64,
    },

    /// Missing header or undecodable content at open time
    #[error("Corrupt file: {0}")]
    CorruptFile(String),

    /// Sidecar tag file could not be written or read
    #[error("Tag persistence failed: {0}")]
    PersistenceFailure(String),

    /// IO error from std::io
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TimelineError {
    pub(crate) fn file_access(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        TimelineError::FileAccess {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn limit(
        limit: ResourceLimit,
        actual: impl TryInto<u64>,
        max: impl TryInto<u64>,
    ) -> Self {
        TimelineError::ResourceLimitExceeded {
            limit,
            actual: actual.try_into().unwrap_or(u64::MAX),
            max: max.try_into().unwrap_or(u64::MAX),
        }
    }

    /// The exceeded cap, if this is a resource error
    pub fn resource_limit(&self) -> Option<ResourceLimit> {
        match self {
            TimelineError::ResourceLimitExceeded { limit, .. } => Some(*limit),
            _ => None,
        }
    }
}

/// Result type alias for timeline operations
pub type TimelineResult<T> = Result<T, TimelineError>;
