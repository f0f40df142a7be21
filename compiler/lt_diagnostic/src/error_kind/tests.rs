use super::*;
use pretty_assertions::assert_eq;

#[test]
fn codes_are_grouped_by_stage() {
    assert!(ErrorKind::Indentation.code().starts_with("E0"));
    assert!(ErrorKind::UnknownToken.code().starts_with("E0"));
    assert!(ErrorKind::UnexpectedEnd.code().starts_with("E1"));
    assert!(ErrorKind::Resolution.code().starts_with("E2"));
}

#[test]
fn display_names_kind_and_code() {
    assert_eq!(ErrorKind::Syntax.to_string(), "Syntax[E1003]");
}

#[test]
fn only_resolution_is_fatal() {
    assert!(ErrorKind::UnexpectedToken.is_recoverable());
    assert!(!ErrorKind::Resolution.is_recoverable());
}
