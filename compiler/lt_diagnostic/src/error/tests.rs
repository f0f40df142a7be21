use std::sync::Arc;

use lt_ir::Position;
use pretty_assertions::assert_eq;

use super::*;

fn unknown_at(line: i32, column: i32) -> CompileError {
    CompileError::new(
        ErrorKind::UnknownToken,
        Position::new(Arc::from("a.lt"), line, column),
        "unknown token ?",
    )
}

#[test]
fn render_points_at_column() {
    assert_eq!(
        unknown_at(2, 3).render("x = 1\na ? = 1", 0, 0),
        "a.lt:2:3 UnknownToken[E0002]: unknown token ?\na ? = 1\n  ^"
    );
}

#[test]
fn render_undoes_the_scan_offsets() {
    assert_eq!(
        unknown_at(12, 23).render("a ? = 1", 10, 20),
        "a.lt:12:23 UnknownToken[E0002]: unknown token ?\na ? = 1\n  ^"
    );
}

#[test]
fn render_without_the_line_is_the_message() {
    assert_eq!(
        unknown_at(9, 1).render("a", 0, 0),
        "a.lt:9:1 UnknownToken[E0002]: unknown token ?"
    );
}
