use super::*;
use pretty_assertions::assert_eq;

fn pos(line: i32, column: i32) -> Position {
    Position::new(Arc::from("test.lt"), line, column)
}

#[test]
fn display_uses_file_line_column() {
    assert_eq!(pos(3, 7).to_string(), "test.lt:3:7");
    assert_eq!(Position::synthetic().to_string(), "<synthetic>");
}

#[test]
fn shifted_keeps_file_and_line() {
    assert_eq!(pos(1, 2).shifted(1), pos(1, 3));
}

#[test]
fn loc_never_affects_equality() {
    assert_eq!(Loc(pos(1, 1)), Loc(pos(9, 9)));
    assert_eq!(Loc(pos(1, 1)), Loc::synthetic());
    assert!(Loc::synthetic().position().is_synthetic());
}
