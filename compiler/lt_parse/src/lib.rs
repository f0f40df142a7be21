//! Recursive descent parser over the lexer's [`LayerTree`].
//!
//! Each layer is parsed as a list of statements separated by endings.
//! Nested layers (bodies, argument lists, literals) are parsed by a nested
//! statement loop that inherits the enclosing name scope. Expressions use
//! precedence climbing over [`BinaryOp::precedence`](lt_ir::BinaryOp).
//!
//! # Recovery
//!
//! Errors are reported to the [`ErrorManager`] and parsing continues:
//! - a missing operand reports `UnexpectedEnd` and resumes after the ending
//!   (or drops the statement when nothing follows)
//! - a missing control body yields an empty body
//! - a malformed header clause is dropped on its own
//! - anything else drops the statement and resumes at the next ending

mod cursor;
mod grammar;
mod halt;

use lt_diagnostic::{CompileError, ErrorManager};
use lt_ir::ast::Anno;
use lt_ir::{Modifiers, Position, Stmt};
use lt_lexer::{LayerTree, NodeId};
use lt_stack::ensure_sufficient_stack;
use rustc_hash::FxHashSet;

use cursor::Cursor;
use halt::{Halt, PResult};

/// Parse a scanned file into statements.
///
/// # Errors
///
/// Returns the first error when `errors` is in fast-fail mode; otherwise
/// errors are collected in `errors` and the recovered statements returned.
#[tracing::instrument(level = "debug", skip_all)]
pub fn parse(tree: &LayerTree, errors: &ErrorManager) -> Result<Vec<Stmt>, CompileError> {
    let mut parser = Parser::new(tree, errors);
    let statements = parser.statements()?;
    tracing::debug!(statements = statements.len(), "parsed");
    Ok(statements)
}

/// Modifiers and annotations read ahead of the statement they belong to.
#[derive(Default)]
struct Pending {
    modifiers: Modifiers,
    annos: Vec<Anno>,
    position: Option<Position>,
}

impl Pending {
    fn is_empty(&self) -> bool {
        self.modifiers.is_empty() && self.annos.is_empty()
    }
}

pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    errors: &'a ErrorManager,
    /// Names defined so far, innermost layer last.
    scopes: Vec<FxHashSet<String>>,
    pending: Pending,
    /// Set while parsing a map key, where `:` separates key and value.
    in_map_key: bool,
}

impl<'a> Parser<'a> {
    fn new(tree: &'a LayerTree, errors: &'a ErrorManager) -> Self {
        Parser {
            cursor: Cursor::new(tree),
            errors,
            scopes: vec![FxHashSet::default()],
            pending: Pending::default(),
            in_map_key: false,
        }
    }

    fn is_defined(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.contains(name))
    }

    fn define(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_owned());
        }
    }

    /// Parse statements until the current layer's chain is exhausted.
    fn statements(&mut self) -> Result<Vec<Stmt>, CompileError> {
        let mut statements = Vec::new();
        while let Some(id) = self.cursor.peek() {
            if self.cursor.tree().ending(id).is_some() {
                self.cursor.bump();
                continue;
            }
            match self.statement() {
                Ok(Some(stmt)) if self.cursor.at_statement_end() => statements.push(stmt),
                Ok(Some(_)) => {
                    self.errors.unexpected_token(
                        "end of statement",
                        &self.cursor.describe(),
                        self.cursor.here(),
                    )?;
                    self.cursor.skip_to_ending();
                }
                Ok(None) => {}
                Err(Halt::Skip) => {
                    tracing::debug!(at = %self.cursor.here(), "statement dropped");
                    self.cursor.skip_to_ending();
                }
                Err(Halt::Fatal(error)) => return Err(error),
            }
        }
        if let Some(position) = self.pending.position.take() {
            if !self.pending.is_empty() {
                self.errors
                    .syntax("modifiers or annotations without a definition", position)?;
            }
            self.pending = Pending::default();
        }
        Ok(statements)
    }

    /// Parse a nested layer as statements, with `names` defined in its
    /// scope. The cursor is left where it was.
    fn block(&mut self, layer: NodeId, names: &[String]) -> PResult<Vec<Stmt>> {
        ensure_sufficient_stack(|| {
            let saved = (self.cursor.pos, self.cursor.last);
            let pending = std::mem::take(&mut self.pending);
            let in_map_key = std::mem::replace(&mut self.in_map_key, false);
            self.cursor.pos = self.cursor.tree().first_child(layer);
            self.scopes.push(names.iter().cloned().collect());

            let result = self.statements();

            self.scopes.pop();
            self.in_map_key = in_map_key;
            self.pending = pending;
            (self.cursor.pos, self.cursor.last) = saved;
            result.map_err(Halt::Fatal)
        })
    }
}

#[cfg(test)]
mod tests;
