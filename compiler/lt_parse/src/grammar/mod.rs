//! Grammar productions, one `impl Parser` block per category.

mod expr;
mod item;
mod stmt;
mod ty;

use lt_ir::ast::{Access, Anno, Assignment, Expr, VariableDef};
use lt_ir::{Modifier, Modifiers, Position, Stmt};
use lt_lexer::{NodeId, TokenKind};

use crate::halt::{Halt, PResult};
use crate::{Parser, Pending};

/// Name of a receiver-less access.
fn bare_name(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Access(Access { exp: None, name, .. }) => Some(name),
        _ => None,
    }
}

/// Turn `name = value` into a definition of `name`.
fn assignment_to_def(assignment: Assignment) -> Result<VariableDef, Assignment> {
    let Some(name) = bare_name(&assignment.target).map(str::to_owned) else {
        return Err(assignment);
    };
    if assignment.op.is_some() {
        return Err(assignment);
    }
    Ok(VariableDef {
        name,
        modifiers: Modifiers::empty(),
        annos: Vec::new(),
        ty: None,
        init: Some(assignment.value),
        loc: assignment.target.loc().clone(),
    })
}

impl Parser<'_> {
    /// One statement, or `None` when only modifiers or annotations were
    /// read (they stay pending for the next statement).
    pub(crate) fn statement(&mut self) -> PResult<Option<Stmt>> {
        loop {
            let Some(id) = self.cursor.peek() else {
                return Ok(None);
            };
            if self.cursor.tree().ending(id).is_some() {
                return Ok(None);
            }
            if self.cursor.at("@") {
                self.mark_pending(id);
                let anno = self.annotation()?;
                self.pending.annos.push(anno);
            } else if self.cursor.peek_kind() == Some(TokenKind::Modifier)
                && !self.at_synchronized_block()
            {
                self.mark_pending(id);
                self.modifier(id)?;
            } else {
                break;
            }
        }
        let stmt = self.statement_body()?;
        self.attach_pending(stmt).map(Some)
    }

    fn statement_body(&mut self) -> PResult<Stmt> {
        let Some(id) = self.cursor.peek() else {
            return Err(Halt::Skip);
        };
        let position = self.cursor.position(id);
        match self.cursor.text(id) {
            "if" => self.if_stmt(),
            "while" => self.while_stmt(),
            "do" => self.do_while(),
            "for" => self.for_stmt(),
            "try" => self.try_stmt(),
            "throw" => self.throw_stmt(),
            "return" => self.return_stmt(),
            "static" => self.static_scope(),
            "class" => self.class_def(),
            "object" => self.object_def(),
            "fun" => self.fun_def(),
            "interface" => self.interface_def(),
            "annotation" => self.annotation_def(),
            "package" => self.package_declare(),
            "import" => self.import(),
            "synchronized" => self.synchronized(),
            "break" => {
                self.cursor.bump();
                Ok(Stmt::Break(position.into()))
            }
            "continue" => {
                self.cursor.bump();
                Ok(Stmt::Continue(position.into()))
            }
            "..." => {
                self.cursor.bump();
                Ok(Stmt::Pass(position.into()))
            }
            _ if self.at_method_def() => self.method_def(),
            _ => self.expression().map(Stmt::Expr),
        }
    }

    fn mark_pending(&mut self, id: NodeId) {
        if self.pending.position.is_none() {
            self.pending.position = Some(self.cursor.position(id));
        }
    }

    fn modifier(&mut self, id: NodeId) -> PResult<()> {
        self.cursor.bump();
        let text = self.cursor.text(id);
        match Modifier::from_keyword(text) {
            Some(modifier) if self.pending.modifiers.try_insert(modifier) => Ok(()),
            _ => {
                self.errors
                    .syntax(format!("illegal modifier {text}"), self.cursor.position(id))?;
                Ok(())
            }
        }
    }

    /// Modifiers and annotations for a definition being built.
    pub(super) fn take_pending(&mut self) -> (Modifiers, Vec<Anno>) {
        let pending = std::mem::take(&mut self.pending);
        (pending.modifiers, pending.annos)
    }

    fn attach_pending(&mut self, stmt: Stmt) -> PResult<Stmt> {
        let Pending {
            modifiers,
            annos,
            position,
        } = std::mem::take(&mut self.pending);
        let Some(position) = position else {
            return Ok(stmt);
        };
        let def = match stmt {
            Stmt::Expr(Expr::VariableDef(def)) => def,
            Stmt::Expr(Expr::Assignment(assignment)) if !modifiers.is_empty() => {
                match assignment_to_def(assignment) {
                    Ok(def) => def,
                    Err(assignment) => {
                        return self.reject_pending(Stmt::Expr(Expr::Assignment(assignment)), position)
                    }
                }
            }
            Stmt::Expr(Expr::Access(access)) if access.exp.is_none() && !modifiers.is_empty() => {
                VariableDef {
                    loc: access.loc,
                    ..VariableDef::new(&access.name)
                }
            }
            other => return self.reject_pending(other, position),
        };
        self.define(&def.name);
        Ok(Stmt::Expr(Expr::VariableDef(VariableDef {
            modifiers: def.modifiers | modifiers,
            annos: annos.into_iter().chain(def.annos).collect(),
            ..def
        })))
    }

    fn reject_pending(&mut self, stmt: Stmt, position: Position) -> PResult<Stmt> {
        self.errors
            .syntax("modifiers and annotations are only allowed on definitions", position)?;
        Ok(stmt)
    }

    fn at_synchronized_block(&self) -> bool {
        self.cursor.at("synchronized")
            && self
                .cursor
                .peek_next()
                .is_some_and(|id| self.cursor.tree().is_text(id, "("))
    }

    /// `name(params)` followed by `:`, `=` or a body layer, or written
    /// bare after modifiers (`abstract run()`).
    fn at_method_def(&self) -> bool {
        if self.cursor.peek_kind() != Some(TokenKind::Name) {
            return false;
        }
        let tree = self.cursor.tree();
        let Some(open) = self.cursor.peek_next().filter(|&id| tree.is_text(id, "(")) else {
            return false;
        };
        let Some(close) = self.cursor.pair_close(open) else {
            return false;
        };
        match tree.next(close) {
            Some(id) if tree.is_layer(id) || tree.is_text(id, ":") || tree.is_text(id, "=") => true,
            Some(id) if tree.ending(id).is_none() => false,
            _ => !self.pending.modifiers.is_empty(),
        }
    }

    pub(super) fn expect(&mut self, text: &str) -> PResult<()> {
        if self.cursor.eat(text) {
            return Ok(());
        }
        self.errors
            .unexpected_token(text, &self.cursor.describe(), self.cursor.here())?;
        Err(Halt::Skip)
    }

    pub(super) fn expect_name(&mut self) -> PResult<String> {
        match self.cursor.peek() {
            Some(id) if self.cursor.tree().token_kind(id) == Some(TokenKind::Name) => {
                self.cursor.bump();
                Ok(self.cursor.text(id).to_owned())
            }
            _ => {
                self.errors
                    .unexpected_token("name", &self.cursor.describe(), self.cursor.here())?;
                Err(Halt::Skip)
            }
        }
    }

    /// Parse a nested layer, scoping `names` to it, when one follows.
    pub(super) fn optional_body(&mut self, names: &[String]) -> PResult<Vec<Stmt>> {
        match self.cursor.peek_layer() {
            Some(layer) => {
                self.cursor.bump();
                self.block(layer, names)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Body of a control construct; a missing body is reported just past
    /// the header and replaced by an empty one.
    pub(super) fn required_body(&mut self, names: &[String]) -> PResult<Vec<Stmt>> {
        if self.cursor.peek_layer().is_some() {
            return self.optional_body(names);
        }
        self.errors.unexpected_token(
            "an indented body",
            &self.cursor.describe(),
            self.cursor.end_position(),
        )?;
        Ok(Vec::new())
    }
}
