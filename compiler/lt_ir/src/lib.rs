//! Latte IR - positions, modifiers and the syntax tree.
//!
//! This crate holds the data shared by every stage of the front end:
//! - [`Position`] locates a token or node in a logical source file
//! - [`Loc`] wraps a position so it never takes part in AST equality
//! - [`Modifiers`] is the modifier set written in front of definitions
//! - [`ast`] is the statement/expression tree produced by the parser
//!
//! AST equality is structural: two trees parsed from differently laid out
//! sources compare equal when they describe the same program.

pub mod ast;
mod modifier;
mod position;

pub use ast::{BinaryOp, Expr, Stmt, UnaryOp};
pub use modifier::{Modifier, Modifiers};
pub use position::{FileName, Loc, Position};
