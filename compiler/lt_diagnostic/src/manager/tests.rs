use super::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn at(file: &str, line: i32, column: i32) -> Position {
    Position::new(Arc::from(file), line, column)
}

#[test]
fn collects_when_not_fast_fail() {
    let errors = ErrorManager::new(false);
    assert!(errors.unexpected_end(at("a.lt", 1, 3)).is_ok());
    assert!(errors.syntax("bad", at("a.lt", 2, 1)).is_ok());
    assert_eq!(errors.error_count(), 2);
    let kinds: Vec<_> = errors.errors().iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![ErrorKind::UnexpectedEnd, ErrorKind::Syntax]);
}

#[test]
fn fast_fail_returns_first_error() {
    let errors = ErrorManager::new(true);
    let err = errors
        .unknown_token("?", at("a.lt", 1, 3))
        .expect_err("fast fail must raise");
    assert_eq!(err.kind, ErrorKind::UnknownToken);
    assert_eq!((err.line(), err.column()), (1, 3));
    assert!(errors.has_errors());
}

#[test]
fn sorted_errors_group_by_file_and_keep_order() {
    let errors = ErrorManager::new(false);
    errors.syntax("b1", at("b.lt", 5, 1)).ok();
    errors.syntax("a1", at("a.lt", 9, 1)).ok();
    errors.syntax("b2", at("b.lt", 1, 1)).ok();
    let messages: Vec<_> = errors
        .sorted_errors()
        .into_iter()
        .map(|e| e.message)
        .collect();
    assert_eq!(messages, vec!["a1", "b1", "b2"]);
}

#[test]
fn take_errors_empties_the_sink() {
    let errors = ErrorManager::default();
    errors.unexpected_end(at("a.lt", 1, 1)).ok();
    assert_eq!(errors.take_errors().len(), 1);
    assert!(!errors.has_errors());
}
