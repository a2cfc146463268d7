//! Table configuration.
//!
//! The only persistent state the viewer writes is the sidecar tag file, so
//! configuration boils down to where the app-data directory lives.

use crate::constants::{APP_DIR_NAME, DATA_DIR_ENV};
use std::path::{Path, PathBuf};

/// Settings shared by every table opened with it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableConfig {
    /// Directory holding sidecar `.tags` files
    pub data_dir: PathBuf,
}

impl TableConfig {
    /// Use an explicit app-data directory
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl Default for TableConfig {
    /// `$TIMELINE_VIEWER_DATA_DIR`, else the platform data dir, else temp
    fn default() -> Self {
        Self::with_data_dir(default_data_dir())
    }
}

/// Resolve the default app-data directory without creating it
pub fn default_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }

    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}
