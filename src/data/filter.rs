//! Substring row filter.
//!
//! A display-level search: it reports which rows match without touching the
//! table. Matching is a case-insensitive fixed substring over the decoded
//! raw fields; the tag column never matches.

use crate::data::timeline_table::TimelineTable;

/// Which columns a filter looks at
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum FilterColumn {
    #[default]
    All,
    /// A single column, by exact header name
    Named(String),
}

impl FilterColumn {
    /// Parse a column picker value; `"All Columns"` or empty means all
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("all columns") {
            FilterColumn::All
        } else {
            FilterColumn::Named(name.to_string())
        }
    }
}

/// A search term restricted to some columns
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RowFilter {
    pub column: FilterColumn,
    pub term: String,
}

/// Rows matched by one filter run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Matching data rows in ascending order
    pub rows: Vec<usize>,
}

impl FilterOutcome {
    /// Whether at least one row matched
    pub fn matched(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl RowFilter {
    pub fn new(column: FilterColumn, term: impl Into<String>) -> Self {
        Self {
            column,
            term: term.into(),
        }
    }

    /// Match `term` anywhere in a row
    pub fn any_column(term: impl Into<String>) -> Self {
        Self::new(FilterColumn::All, term)
    }

    /// An empty term clears filtering rather than matching everything
    pub fn is_clear(&self) -> bool {
        self.term.is_empty()
    }

    /// Run the filter over every row of `table`
    pub fn apply(&self, table: &TimelineTable) -> FilterOutcome {
        if self.is_clear() {
            return FilterOutcome::default();
        }

        let target = match &self.column {
            FilterColumn::All => None,
            FilterColumn::Named(name) => match table.column_index(name) {
                Some(col) => Some(col),
                None => {
                    tracing::debug!("Filter column {} not in {}", name, table.file_name());
                    return FilterOutcome::default();
                }
            },
        };
        let tag_column = table.tag_column();
        if target.is_some() && target == tag_column {
            return FilterOutcome::default();
        }

        let needle = self.term.to_lowercase();
        let mut rows = Vec::new();

        table.for_each_record(|row, fields| {
            let hit = match target {
                Some(col) => fields.get(col).is_some_and(|f| contains_folded(f, &needle)),
                None => fields
                    .iter()
                    .enumerate()
                    .filter(|(col, _)| Some(*col) != tag_column)
                    .any(|(_, f)| contains_folded(f, &needle)),
            };
            if hit {
                rows.push(row);
            }
        });

        tracing::debug!(
            matches = rows.len(),
            "Filtered {} for {:?}",
            table.file_name(),
            self.term
        );

        FilterOutcome { rows }
    }
}

fn contains_folded(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}
