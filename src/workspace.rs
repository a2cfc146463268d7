//! A set of open timelines, one per tab.
//!
//! The workspace only ever holds tables that opened successfully, so every
//! entry is fully usable. Search and save operations fan out over all of
//! them and report per-table results.

use crate::config::TableConfig;
use crate::constants::APP_TITLE;
use crate::data::{FilterOutcome, RowFilter, TimelineError, TimelineResult, TimelineTable};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Result of running one filter across every table
#[derive(Debug, Default)]
pub struct SearchReport {
    /// One outcome per table, in workspace order
    pub outcomes: Vec<FilterOutcome>,
    /// First table that had at least one match
    pub first_match: Option<usize>,
}

impl SearchReport {
    /// Number of tables with at least one match
    pub fn tables_matched(&self) -> usize {
        self.outcomes.iter().filter(|o| o.matched()).count()
    }
}

/// Open timelines sharing one configuration
#[derive(Debug, Default)]
pub struct Workspace {
    config: TableConfig,
    tables: Vec<TimelineTable>,
}

impl Workspace {
    pub fn new(config: TableConfig) -> Self {
        Self {
            config,
            tables: Vec::new(),
        }
    }

    /// Open `path` and append it; nothing is added on failure
    pub fn open(&mut self, path: impl AsRef<Path>) -> TimelineResult<usize> {
        let table = TimelineTable::open_with(path.as_ref(), &self.config)?;
        self.tables.push(table);
        Ok(self.tables.len() - 1)
    }

    pub fn close(&mut self, index: usize) -> Option<TimelineTable> {
        (index < self.tables.len()).then(|| self.tables.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&TimelineTable> {
        self.tables.get(index)
    }

    pub fn tables(&self) -> &[TimelineTable] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Run `filter` over every table
    pub fn search_all(&self, filter: &RowFilter) -> SearchReport {
        let outcomes: Vec<FilterOutcome> = self.tables.iter().map(|t| filter.apply(t)).collect();
        let first_match = outcomes.iter().position(FilterOutcome::matched);
        SearchReport {
            outcomes,
            first_match,
        }
    }

    /// Sorted, de-duplicated column names across all tables
    pub fn column_union(&self) -> Vec<String> {
        self.tables
            .iter()
            .flat_map(|t| t.column_names())
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Indices of tables with unsaved tag changes
    pub fn unsaved(&self) -> Vec<usize> {
        self.tables
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_dirty())
            .map(|(i, _)| i)
            .collect()
    }

    /// Save every dirty table, continuing past failures
    pub fn save_all(&self) -> Vec<(PathBuf, TimelineError)> {
        let mut failures = Vec::new();
        for table in self.tables.iter().filter(|t| t.is_dirty()) {
            if let Err(e) = table.save() {
                tracing::error!("Failed to save tags for {}: {}", table.file_name(), e);
                failures.push((table.path().to_path_buf(), e));
            }
        }
        failures
    }

    /// Window title for the table at `index`, marked when it has unsaved tags
    pub fn title(&self, index: usize) -> String {
        match self.tables.get(index) {
            Some(table) if table.is_dirty() => {
                format!("{} - {} *", APP_TITLE, table.file_name())
            }
            Some(table) => format!("{} - {}", APP_TITLE, table.file_name()),
            None => APP_TITLE.to_string(),
        }
    }
}
