//! Timeline engine
//!
//! Everything needed to browse a timeline export as a table without loading
//! it into memory.
//!
//! ## Pipeline
//!
//! Opening a [`TimelineTable`] runs, in order:
//! - [`detect_format`] on the decoded header row
//! - [`LineIndex::build`], one sequential pass recording row offsets
//! - [`TagStore::load`], reading the sidecar tag overlay
//!
//! Cell reads seek to one row, decode it with [`parse_line`] and, for the
//! super timeline message column, pretty-print it with
//! [`format_if_applicable`].
//!
//! ## Error Handling
//!
//! Fallible operations return `TimelineResult<T>`. Open-time errors are
//! fatal to the table; per-cell problems degrade to [`Cell::Empty`].

mod error;
mod filter;
mod format;
mod line_index;
mod record;
mod sniffer;
mod tag_store;
mod timeline_table;

pub use error::*;
pub use filter::*;
pub use format::*;
pub use line_index::*;
pub use record::*;
pub use sniffer::*;
pub use tag_store::*;
pub use timeline_table::*;
