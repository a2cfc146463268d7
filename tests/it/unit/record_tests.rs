//! Unit tests for the backslash-escape record decoder.

use timeline_viewer::constants::{MAX_FIELD_LENGTH, MAX_FIELDS_PER_LINE, MAX_LINE_LENGTH};
use timeline_viewer::data::{ResourceLimit, TimelineError, parse_line};

#[test]
fn test_documented_examples() {
    assert_eq!(parse_line("a,b,c").unwrap(), vec!["a", "b", "c"]);
    assert_eq!(parse_line("a,\"b,c\",d").unwrap(), vec!["a", "b,c", "d"]);
    assert_eq!(parse_line("a\\,b,c").unwrap(), vec!["a,b", "c"]);
}

#[test]
fn test_escape_takes_priority_over_quote_toggle() {
    // The escaped quote is literal and does not open a quoted section
    assert_eq!(parse_line("a\\\",b").unwrap(), vec!["a\"", "b"]);
}

#[test]
fn test_quotes_mid_field_toggle() {
    assert_eq!(parse_line("ab\"c,d\"e,f").unwrap(), vec!["abc,de", "f"]);
}

#[test]
fn test_field_over_limit_fails() {
    let line = format!("ok,{}", "z".repeat(MAX_FIELD_LENGTH + 1));
    match parse_line(&line) {
        Err(TimelineError::ResourceLimitExceeded { limit, max, .. }) => {
            assert_eq!(limit, ResourceLimit::FieldLength);
            assert_eq!(max, MAX_FIELD_LENGTH as u64);
        }
        other => panic!("Expected FieldLength error, got {:?}", other),
    }
}

#[test]
fn test_257_fields_fail() {
    let line = vec![""; MAX_FIELDS_PER_LINE + 1].join(",");
    let err = parse_line(&line).unwrap_err();
    assert_eq!(err.resource_limit(), Some(ResourceLimit::FieldCount));
}

#[test]
fn test_256_empty_fields_ok() {
    let line = ",".repeat(MAX_FIELDS_PER_LINE - 1);
    assert_eq!(parse_line(&line).unwrap().len(), MAX_FIELDS_PER_LINE);
}

#[test]
fn test_line_at_limit_is_scanned() {
    // 16 fields of 65,536 chars each is exactly the line cap
    let field = "y".repeat(MAX_FIELD_LENGTH);
    let line = vec![field.as_str(); 16].join("");
    assert_eq!(line.len(), MAX_LINE_LENGTH);
    // One giant field: the field cap trips, not the line cap
    let err = parse_line(&line).unwrap_err();
    assert_eq!(err.resource_limit(), Some(ResourceLimit::FieldLength));
}

#[test]
fn test_error_message_names_limit() {
    let err = parse_line(&"q".repeat(MAX_LINE_LENGTH + 1)).unwrap_err();
    assert!(err.to_string().contains("line length"));
}
