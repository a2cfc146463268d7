//! Structured content detection for message fields
//!
//! Messages in super timelines often embed JSON documents or XML fragments.
//! [`format_if_applicable`] pretty-prints them for display and otherwise
//! returns the text untouched. It never fails outward.
//!
//! ## Guards
//!
//! Before any parser sees the input it must pass [`is_safe_to_parse`]:
//! - at most [`MAX_PARSE_SIZE`] characters
//! - no `<!ENTITY` or `<!DOCTYPE` declarations (any case)
//! - running `<` nesting never above [`MAX_XML_DEPTH`]
//!
//! Pretty-printed output larger than [`MAX_FORMATTED_SIZE`] is discarded.

use crate::constants::{MAX_FORMATTED_SIZE, MAX_PARSE_SIZE, MAX_XML_DEPTH, XML_INDENT};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::Event;
use serde_json::Value;

/// Pretty-print embedded JSON or XML, or return `text` unchanged
pub fn format_if_applicable(text: &str) -> String {
    if !is_safe_to_parse(text) {
        tracing::debug!(
            len = text.len(),
            "Content too large or potentially hostile, returning as-is"
        );
        return text.to_string();
    }

    if let Some(formatted) = pretty_json(text) {
        return within_output_limit(formatted, text, "JSON");
    }

    if let Some(formatted) = pretty_xml(text) {
        return within_output_limit(formatted, text, "XML");
    }

    text.to_string()
}

fn within_output_limit(formatted: String, original: &str, kind: &str) -> String {
    if formatted.chars().count() > MAX_FORMATTED_SIZE {
        tracing::debug!("Formatted {} too large, returning original", kind);
        original.to_string()
    } else {
        formatted
    }
}

/// Cheap pre-parse checks against oversized and entity-expansion input
pub fn is_safe_to_parse(text: &str) -> bool {
    if text.len() > MAX_PARSE_SIZE && text.chars().count() > MAX_PARSE_SIZE {
        return false;
    }

    if contains_ignore_ascii_case(text, "<!ENTITY") || contains_ignore_ascii_case(text, "<!DOCTYPE")
    {
        return false;
    }

    let mut depth = 0usize;
    for b in text.bytes() {
        match b {
            b'<' => {
                depth += 1;
                if depth > MAX_XML_DEPTH {
                    return false;
                }
            }
            b'>' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    true
}

fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}

/// Strict JSON: only a complete object or array document
fn pretty_json(text: &str) -> Option<String> {
    let trimmed = text.trim_start();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return None;
    }
    let value: Value = serde_json::from_str(text).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

/// Well-formed XML with exactly one root element, re-indented.
///
/// Namespaces are not interpreted and only the predefined entities are
/// accepted; a DTD anywhere rejects the document. Whitespace-only text
/// between elements is replaced by indentation, all other text is written
/// back exactly as read.
fn pretty_xml(text: &str) -> Option<String> {
    let mut reader = Reader::from_str(text);

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', XML_INDENT);
    let mut depth = 0usize;
    let mut roots = 0usize;

    loop {
        let event = reader.read_event().ok()?;
        match &event {
            Event::Eof => break,
            Event::DocType(_) => return None,
            Event::Start(_) => {
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
            }
            Event::End(_) => {
                depth = depth.checked_sub(1)?;
            }
            Event::Empty(_) => {
                if depth == 0 {
                    roots += 1;
                }
            }
            Event::Text(t) => {
                // Rejects undefined entity references
                let unescaped = t.unescape().ok()?;
                if unescaped.trim().is_empty() {
                    continue;
                }
                if depth == 0 {
                    return None;
                }
            }
            Event::CData(_) if depth == 0 => return None,
            _ => {}
        }
        writer.write_event(event).ok()?;
    }

    if depth != 0 || roots != 1 {
        return None;
    }

    String::from_utf8(writer.into_inner()).ok()
}
