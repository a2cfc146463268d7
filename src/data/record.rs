//! Record decoding for timeline lines
//!
//! Timeline exports use a comma-separated dialect where a backslash escapes
//! the next character and double quotes only toggle quoting. Quote
//! characters are stripped, never preserved, and doubled quotes carry no
//! special meaning. This is not RFC 4180.
//!
//! ## Bounds
//!
//! - Lines longer than [`MAX_LINE_LENGTH`] characters are rejected unscanned
//! - Fields longer than [`MAX_FIELD_LENGTH`] characters fail early
//! - Lines with more than [`MAX_FIELDS_PER_LINE`] fields fail

use crate::constants::{MAX_FIELD_LENGTH, MAX_FIELDS_PER_LINE, MAX_LINE_LENGTH};
use crate::data::error::{ResourceLimit, TimelineError, TimelineResult};
use std::io::{BufRead, Read};

/// Most bytes a line within [`MAX_LINE_LENGTH`] can occupy, plus `\r\n`
pub const MAX_LINE_BYTES: u64 = MAX_LINE_LENGTH as u64 * 4 + 2;

/// Split one line into its fields.
///
/// The trailing field is always emitted, so `""` yields `[""]` and `"a,"`
/// yields `["a", ""]`. An unterminated quote is not an error.
pub fn parse_line(line: &str) -> TimelineResult<Vec<String>> {
    // Byte length bounds the char count, so only count when it could matter
    if line.len() > MAX_LINE_LENGTH {
        let chars = line.chars().count();
        if chars > MAX_LINE_LENGTH {
            return Err(TimelineError::limit(
                ResourceLimit::LineLength,
                chars,
                MAX_LINE_LENGTH,
            ));
        }
    }

    let mut fields = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    let mut in_quotes = false;
    let mut escape_next = false;

    for c in line.chars() {
        if escape_next {
            escape_next = false;
            push_char(&mut current, &mut current_len, c)?;
        } else if c == '\\' {
            escape_next = true;
        } else if c == '"' {
            in_quotes = !in_quotes;
        } else if c == ',' && !in_quotes {
            fields.push(std::mem::take(&mut current));
            current_len = 0;
            // At least one more field always follows a separator
            if fields.len() >= MAX_FIELDS_PER_LINE {
                return Err(TimelineError::limit(
                    ResourceLimit::FieldCount,
                    fields.len() + 1,
                    MAX_FIELDS_PER_LINE,
                ));
            }
        } else {
            push_char(&mut current, &mut current_len, c)?;
        }
    }

    fields.push(current);
    Ok(fields)
}

fn push_char(field: &mut String, len: &mut usize, c: char) -> TimelineResult<()> {
    if *len >= MAX_FIELD_LENGTH {
        return Err(TimelineError::limit(
            ResourceLimit::FieldLength,
            *len + 1,
            MAX_FIELD_LENGTH,
        ));
    }
    field.push(c);
    *len += 1;
    Ok(())
}

/// Read one raw line (terminator included) into `buf`, reading at most
/// [`MAX_LINE_BYTES`].
///
/// Returns the number of bytes read; fails with `LineLength` when the line
/// does not end within the bound.
pub fn read_raw_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> TimelineResult<usize> {
    buf.clear();
    let read = reader.by_ref().take(MAX_LINE_BYTES).read_until(b'\n', buf)?;
    if read as u64 == MAX_LINE_BYTES && !buf.ends_with(b"\n") {
        return Err(TimelineError::limit(
            ResourceLimit::LineLength,
            read,
            MAX_LINE_LENGTH,
        ));
    }
    Ok(read)
}

/// Strip the line terminator (`\n` or `\r\n`) from raw line bytes
pub fn trim_line_ending(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}
