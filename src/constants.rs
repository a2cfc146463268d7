//! Application-wide constants.
//!
//! Centralizes the resource limits and fixed names used by the timeline
//! engine. The numeric limits are safety caps: changing them changes which
//! files open and which cells render.

// ============================================================================
// Source File Limits
// ============================================================================

/// Maximum size of a timeline file in bytes (2 GiB)
pub const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Maximum number of data rows in one timeline
pub const MAX_ROW_COUNT: usize = 10_000_000;

/// Maximum memory the line index may occupy in bytes (500 MiB)
pub const MAX_INDEX_MEMORY: u64 = 500 * 1024 * 1024;

/// Bytes used by one line index entry
pub const INDEX_ENTRY_SIZE: u64 = std::mem::size_of::<u64>() as u64;

// ============================================================================
// Record Decoding
// ============================================================================

/// Maximum length of one line in characters
pub const MAX_LINE_LENGTH: usize = 1_048_576;

/// Maximum length of one field in characters
pub const MAX_FIELD_LENGTH: usize = 65_536;

/// Maximum number of fields in one line
pub const MAX_FIELDS_PER_LINE: usize = 256;

// ============================================================================
// Content Sniffing
// ============================================================================

/// Inputs longer than this (in characters) are never parsed (1 MiB)
pub const MAX_PARSE_SIZE: usize = 1024 * 1024;

/// Pretty-printed output longer than this is discarded (2 MiB)
pub const MAX_FORMATTED_SIZE: usize = 2 * MAX_PARSE_SIZE;

/// Maximum running `<` nesting before content is treated as hostile
pub const MAX_XML_DEPTH: usize = 100;

/// Indentation width for pretty-printed XML
pub const XML_INDENT: usize = 2;

// ============================================================================
// Tag Persistence
// ============================================================================

/// Maximum number of tag lines read from a sidecar file
pub const MAX_TAG_LINES: usize = 1_000_000;

/// Tag lines longer than this are discarded on load
pub const MAX_TAG_LINE_LENGTH: usize = 20;

/// Sanitized sidecar base names are truncated to this many characters
pub const MAX_TAG_NAME_LENGTH: usize = 200;

/// Base name used when sanitization leaves nothing behind
pub const FALLBACK_TAG_NAME: &str = "timeline";

/// Extension of sidecar tag files
pub const TAG_FILE_EXTENSION: &str = "tags";

// ============================================================================
// Application Identity
// ============================================================================

/// Directory name under the platform data dir
pub const APP_DIR_NAME: &str = "timeline-viewer";

/// Environment variable overriding the app-data directory
pub const DATA_DIR_ENV: &str = "TIMELINE_VIEWER_DATA_DIR";

/// Window/title prefix used by the workspace
pub const APP_TITLE: &str = "Linux Timeline Viewer";
