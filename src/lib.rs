//! Timeline Viewer
//!
//! Browse, tag and search large forensic timeline exports (filesystem
//! listings, super timelines) as a table without loading them into memory.
//!
//! ```ignore
//! use timeline_viewer::{TableConfig, TimelineTable};
//!
//! let table = TimelineTable::open_with("case.csv", &TableConfig::default())?;
//! let message = table.get_cell(0, 4);
//! table.set_tag(0, true);
//! table.save()?;
//! ```

pub mod config;
pub mod constants;
pub mod data;
pub mod workspace;

pub use config::TableConfig;
pub use data::{
    Cell, FilterColumn, FilterOutcome, RowFilter, TableEvent, TimelineError, TimelineResult,
    TimelineTable, TimelineType,
};
pub use workspace::Workspace;
