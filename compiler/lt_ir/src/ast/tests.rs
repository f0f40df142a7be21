use super::*;
use crate::{Loc, Position};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[test]
fn equality_ignores_positions() {
    let placed = Expr::Binary(BinaryOperation {
        op: BinaryOp::Add,
        left: Box::new(Expr::Number(Literal {
            text: "1".into(),
            loc: Loc(Position::new(Arc::from("a.lt"), 1, 1)),
        })),
        right: Box::new(Expr::number("2")),
        loc: Loc(Position::new(Arc::from("a.lt"), 1, 2)),
    });
    assert_eq!(
        placed,
        Expr::binary(BinaryOp::Add, Expr::number("1"), Expr::number("2"))
    );
}

#[test]
fn operator_symbols_round_trip() {
    for op in BinaryOp::ALL {
        assert_eq!(BinaryOp::from_symbol(op.as_symbol()), Some(op));
    }
    assert_eq!(BinaryOp::from_symbol("and"), Some(BinaryOp::And));
    assert_eq!(BinaryOp::from_symbol("="), None);
}

#[test]
fn precedence_follows_arithmetic_convention() {
    assert!(BinaryOp::Mul.precedence() > BinaryOp::Add.precedence());
    assert!(BinaryOp::Add.precedence() > BinaryOp::Shl.precedence());
    assert!(BinaryOp::Shl.precedence() > BinaryOp::Lt.precedence());
    assert!(BinaryOp::Lt.precedence() > BinaryOp::Eq.precedence());
    assert!(BinaryOp::Eq.precedence() > BinaryOp::BitAnd.precedence());
    assert!(BinaryOp::BitAnd.precedence() > BinaryOp::BitXor.precedence());
    assert!(BinaryOp::BitXor.precedence() > BinaryOp::BitOr.precedence());
    assert!(BinaryOp::BitOr.precedence() > BinaryOp::And.precedence());
    assert!(BinaryOp::And.precedence() > BinaryOp::Or.precedence());
}

#[test]
fn assignment_operators() {
    assert_eq!(BinaryOp::assignment("="), Some(None));
    assert_eq!(BinaryOp::assignment(":="), Some(None));
    assert_eq!(BinaryOp::assignment("+="), Some(Some(BinaryOp::Add)));
    assert_eq!(BinaryOp::assignment(">>>="), Some(Some(BinaryOp::UShr)));
    assert_eq!(BinaryOp::assignment("<="), None);
    assert_eq!(BinaryOp::assignment("=="), None);
}

#[test]
fn array_type_access() {
    let ty = Access::member(Expr::name("int"), "[]");
    assert!(ty.is_array_type());
    assert!(!Access::name("int").is_array_type());
}
