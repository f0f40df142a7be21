//! Parser tests.
//!
//! - `expr`: operators, literals, lambdas and definitions by assignment
//! - `stmt`: control flow statements
//! - `item`: classes, objects, functions, interfaces, annotations, methods
//!   and imports
//! - `recovery`: error positions and what survives a bad statement

mod recovery;
mod stmt;

use std::sync::Arc;

use lt_diagnostic::{CompileError, ErrorManager};
use lt_ir::{Expr, Stmt};
use lt_lexer::{scan, ScanConfig};

use crate::parse;

pub(super) fn parse_with_errors(source: &str) -> (Vec<Stmt>, Vec<CompileError>) {
    let errors = ErrorManager::default();
    let tree = scan(Arc::from("test.lt"), source, &ScanConfig::default(), &errors).unwrap();
    let statements = parse(&tree, &errors).unwrap();
    (statements, errors.errors())
}

/// Parse input that must be error free.
pub(super) fn parse_ok(source: &str) -> Vec<Stmt> {
    let (statements, errors) = parse_with_errors(source);
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    statements
}

pub(super) fn parse_expr(source: &str) -> Expr {
    match parse_ok(source).pop() {
        Some(Stmt::Expr(expr)) => expr,
        other => panic!("expected an expression, got {other:?}"),
    }
}
