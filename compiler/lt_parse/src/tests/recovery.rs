use std::sync::Arc;

use lt_diagnostic::{ErrorKind, ErrorManager};
use lt_ir::ast::VariableDef;
use lt_ir::{BinaryOp, Expr, Stmt};
use lt_lexer::{scan, ScanConfig};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::parse_with_errors;
use crate::parse;

fn kinds_and_positions(source: &str) -> Vec<(ErrorKind, i32, i32)> {
    parse_with_errors(source)
        .1
        .iter()
        .map(|e| (e.kind, e.line(), e.column()))
        .collect()
}

#[test]
fn dangling_operator_drops_statement() {
    let (statements, errors) = parse_with_errors("1+");
    assert_eq!(statements, vec![]);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::UnexpectedEnd);
    assert_eq!((errors[0].line(), errors[0].column()), (1, 3));
}

#[test]
fn operator_before_comma_resumes_after_it() {
    let (statements, errors) = parse_with_errors("1+,2");
    assert_eq!(
        statements,
        vec![Stmt::Expr(Expr::binary(
            BinaryOp::Add,
            Expr::number("1"),
            Expr::number("2")
        ))]
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::UnexpectedEnd);
    assert_eq!((errors[0].line(), errors[0].column()), (1, 3));
}

#[test]
fn unexpected_end_is_reported_at_the_separator() {
    let (statements, errors) = parse_with_errors("1 + , 2");
    assert_eq!(
        statements,
        vec![Stmt::Expr(Expr::binary(
            BinaryOp::Add,
            Expr::number("1"),
            Expr::number("2")
        ))]
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::UnexpectedEnd);
    assert_eq!((errors[0].line(), errors[0].column()), (1, 5));
}

#[test]
fn missing_bodies_are_empty() {
    let (statements, errors) = parse_with_errors("while true");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::UnexpectedToken);
    assert_eq!((errors[0].line(), errors[0].column()), (1, 11));
    let Stmt::While(while_stmt) = &statements[0] else {
        panic!("expected while");
    };
    assert!(while_stmt.body.is_empty());

    assert_eq!(
        kinds_and_positions("if a"),
        vec![(ErrorKind::UnexpectedToken, 1, 5)]
    );
    assert_eq!(
        kinds_and_positions("for x in xs"),
        vec![(ErrorKind::UnexpectedToken, 1, 12)]
    );
    assert_eq!(
        kinds_and_positions("try\nfinally"),
        vec![
            (ErrorKind::UnexpectedToken, 1, 4),
            (ErrorKind::UnexpectedToken, 2, 8)
        ]
    );
    assert_eq!(
        kinds_and_positions("static"),
        vec![(ErrorKind::UnexpectedToken, 1, 7)]
    );
}

#[test]
fn missing_else_body_keeps_earlier_branches() {
    let (statements, errors) = parse_with_errors("if a\n    b\nelse");
    assert_eq!(errors.len(), 1);
    assert_eq!((errors[0].line(), errors[0].column()), (3, 5));
    let Stmt::If(if_stmt) = &statements[0] else {
        panic!("expected if");
    };
    assert_eq!(if_stmt.branches.len(), 2);
    assert!(if_stmt.branches[1].body.is_empty());
}

#[test]
fn default_params_must_be_trailing() {
    let (statements, errors) = parse_with_errors("class A(a = 1, b)");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Syntax);
    assert_eq!((errors[0].line(), errors[0].column()), (1, 16));
    let Stmt::ClassDef(class) = &statements[0] else {
        panic!("expected class");
    };
    assert_eq!(class.params.len(), 2);
}

#[test]
fn non_variable_param_is_dropped() {
    let (statements, errors) = parse_with_errors("class A(1, b)");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Syntax);
    assert_eq!((errors[0].line(), errors[0].column()), (1, 9));
    let Stmt::ClassDef(class) = &statements[0] else {
        panic!("expected class");
    };
    assert_eq!(class.params, vec![VariableDef::new("b")]);
}

#[test]
fn second_parent_invocation_is_dropped() {
    let (statements, errors) = parse_with_errors("class A:B(), C()");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Syntax);
    assert_eq!((errors[0].line(), errors[0].column()), (1, 14));
    let Stmt::ClassDef(class) = &statements[0] else {
        panic!("expected class");
    };
    assert_eq!(
        class.super_invocation.as_ref().map(|i| i.target.name.as_str()),
        Some("B")
    );
    assert!(class.super_types.is_empty());
}

#[test]
fn elseif_after_else_is_rejected() {
    let (statements, errors) = parse_with_errors("if a\n    b\nelse\n    c\nelseif d\n    e");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Syntax);
    assert_eq!((errors[0].line(), errors[0].column()), (5, 1));
    let Stmt::If(if_stmt) = &statements[0] else {
        panic!("expected if");
    };
    assert_eq!(if_stmt.branches.len(), 2);
}

#[test]
fn bad_statement_leaves_neighbours_alone() {
    let (statements, errors) = parse_with_errors("a = 1\nb = new 5\nc = 2");
    assert_eq!(statements.len(), 2);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::UnexpectedToken);
    assert_eq!((errors[0].line(), errors[0].column()), (2, 9));
}

#[test]
fn trailing_tokens_drop_statement() {
    let (statements, errors) = parse_with_errors("a b\nc");
    assert_eq!(statements, vec![Stmt::Expr(Expr::name("c"))]);
    assert_eq!(errors.len(), 1);
    assert_eq!((errors[0].line(), errors[0].column()), (1, 3));
}

#[test]
fn modifiers_need_a_definition() {
    let (statements, errors) = parse_with_errors("public 1 + 2");
    assert_eq!(statements.len(), 1);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Syntax);

    let (_, errors) = parse_with_errors("@Deprecated");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Syntax);
}

#[test]
fn conflicting_modifiers() {
    assert_eq!(
        kinds_and_positions("val var x = 1"),
        vec![(ErrorKind::Syntax, 1, 5)]
    );
}

#[test]
fn errors_follow_file_order() {
    let positions: Vec<i32> = parse_with_errors("1+\nwhile a\nx = (")
        .1
        .iter()
        .map(|e| e.line())
        .collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
}

#[test]
fn object_parameters_are_reported_and_dropped() {
    let (statements, errors) = parse_with_errors("object O(x)\n    y = 1");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Syntax);
    assert_eq!((errors[0].line(), errors[0].column()), (1, 9));
    let [Stmt::ObjectDef(object)] = statements.as_slice() else {
        panic!("expected one object, got {statements:?}");
    };
    assert_eq!(object.body.len(), 1);
}

#[test]
fn fun_with_invoked_or_several_parents_is_reported() {
    assert_eq!(
        kinds_and_positions("fun F:Base(1)"),
        vec![(ErrorKind::Syntax, 1, 1)]
    );
    assert_eq!(
        kinds_and_positions("fun G:A, B"),
        vec![(ErrorKind::Syntax, 1, 1)]
    );
    assert_eq!(
        kinds_and_positions("public fun H"),
        vec![(ErrorKind::Syntax, 1, 8)]
    );
}

#[test]
fn match_is_reserved() {
    let (statements, errors) = parse_with_errors("match x\ny = 1");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::UnexpectedToken);
    assert_eq!((errors[0].line(), errors[0].column()), (1, 1));
    assert_eq!(statements.len(), 1);
}

#[test]
fn fast_fail_returns_first_error() {
    let errors = ErrorManager::new(true);
    let tree = scan(Arc::from("t.lt"), "1+,2\nwhile a", &ScanConfig::default(), &errors).unwrap();
    let error = parse(&tree, &errors).unwrap_err();
    assert_eq!(error.kind, ErrorKind::UnexpectedEnd);
    assert_eq!(errors.error_count(), 1);
}

proptest! {
    #[test]
    fn parsing_is_deterministic(source in "[a-c1-3 ()+=:,\\n]{0,40}") {
        let first = parse_with_errors(&source);
        let second = parse_with_errors(&source);
        prop_assert_eq!(first, second);
    }
}
