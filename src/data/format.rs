//! Timeline schema detection
//!
//! A header row is classified by exact, order-sensitive equality against a
//! small table of known schemas. Reordered, partial or extended headers are
//! [`TimelineType::Unknown`].

use serde::Serialize;

/// Known timeline layouts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineType {
    /// Filesystem metadata listing (bodyfile/mactime style)
    Filesystem,
    /// Aggregated event log with a freeform message and a tag column
    Super,
    /// Any other header; loads with generic columns
    Unknown,
}

/// A known schema: its canonical header and special columns
#[derive(Debug)]
pub struct Schema {
    pub kind: TimelineType,
    pub name: &'static str,
    pub header: &'static [&'static str],
    /// Column whose content is routed through the content sniffer
    pub message_column: Option<usize>,
    /// Column exposed as a tag checkbox instead of text
    pub tag_column: Option<usize>,
}

/// Every recognized schema. Add new layouts here.
pub const SCHEMAS: &[Schema] = &[
    Schema {
        kind: TimelineType::Filesystem,
        name: "filesystem",
        header: &[
            "Date", "Size", "Type", "Mode", "UID", "GID", "Meta", "File Name",
        ],
        message_column: None,
        tag_column: None,
    },
    Schema {
        kind: TimelineType::Super,
        name: "super",
        header: &[
            "datetime",
            "timestamp_desc",
            "source",
            "source_long",
            "message",
            "parser",
            "display_name",
            "tag",
        ],
        message_column: Some(4),
        tag_column: Some(7),
    },
];

impl TimelineType {
    /// The schema entry for this type, `None` for `Unknown`
    pub fn schema(self) -> Option<&'static Schema> {
        SCHEMAS.iter().find(|s| s.kind == self)
    }

    pub fn message_column(self) -> Option<usize> {
        self.schema().and_then(|s| s.message_column)
    }

    pub fn tag_column(self) -> Option<usize> {
        self.schema().and_then(|s| s.tag_column)
    }

    pub fn label(self) -> &'static str {
        self.schema().map(|s| s.name).unwrap_or("unknown")
    }
}

/// Classify a decoded header row
pub fn detect_format<S: AsRef<str>>(header_fields: &[S]) -> TimelineType {
    SCHEMAS
        .iter()
        .find(|schema| {
            schema.header.len() == header_fields.len()
                && schema
                    .header
                    .iter()
                    .zip(header_fields)
                    .all(|(expected, actual)| *expected == actual.as_ref())
        })
        .map(|schema| schema.kind)
        .unwrap_or(TimelineType::Unknown)
}
