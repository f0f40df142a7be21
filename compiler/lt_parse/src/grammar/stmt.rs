//! Control flow statements.

use lt_ir::ast::{For, If, IfPair, Return, StaticScope, Synchronized, Throw, Try, While};
use lt_ir::Stmt;

use crate::halt::{Halt, PResult};
use crate::Parser;

impl Parser<'_> {
    pub(super) fn if_stmt(&mut self) -> PResult<Stmt> {
        let position = self.cursor.here();
        self.cursor.bump();
        let condition = self.expression()?;
        let body = self.required_body(&[])?;
        let mut branches = vec![IfPair {
            condition: Some(condition),
            body,
            loc: position.clone().into(),
        }];
        let mut has_else = false;

        loop {
            if self.cursor.after_ending_is("elseif") {
                self.cursor.bump();
                let branch_position = self.cursor.here();
                self.cursor.bump();
                let condition = self.expression()?;
                let body = self.required_body(&[])?;
                if has_else {
                    self.errors
                        .syntax("elseif after else", branch_position)?;
                } else {
                    branches.push(IfPair {
                        condition: Some(condition),
                        body,
                        loc: branch_position.into(),
                    });
                }
            } else if self.cursor.after_ending_is("else") {
                self.cursor.bump();
                let branch_position = self.cursor.here();
                self.cursor.bump();
                let condition = if self.cursor.eat("if") {
                    Some(self.expression()?)
                } else {
                    None
                };
                let is_else = condition.is_none();
                let body = self.required_body(&[])?;
                if has_else {
                    self.errors
                        .syntax("if statement already has an else branch", branch_position)?;
                } else {
                    has_else = is_else;
                    branches.push(IfPair {
                        condition,
                        body,
                        loc: branch_position.into(),
                    });
                }
            } else {
                break;
            }
        }

        Ok(Stmt::If(If {
            branches,
            loc: position.into(),
        }))
    }

    pub(super) fn while_stmt(&mut self) -> PResult<Stmt> {
        let position = self.cursor.here();
        self.cursor.bump();
        let condition = self.expression()?;
        let body = self.required_body(&[])?;
        Ok(Stmt::While(While {
            condition,
            body,
            do_while: false,
            loc: position.into(),
        }))
    }

    pub(super) fn do_while(&mut self) -> PResult<Stmt> {
        let position = self.cursor.here();
        self.cursor.bump();
        let body = self.required_body(&[])?;
        if self.cursor.after_ending_is("while") {
            self.cursor.bump();
        }
        if !self.cursor.eat("while") {
            self.errors
                .syntax("do statement needs a while condition", self.cursor.end_position())?;
            return Err(Halt::Skip);
        }
        self.cursor.require(self.errors)?;
        let condition = self.expression()?;
        Ok(Stmt::While(While {
            condition,
            body,
            do_while: true,
            loc: position.into(),
        }))
    }

    pub(super) fn for_stmt(&mut self) -> PResult<Stmt> {
        let position = self.cursor.here();
        self.cursor.bump();
        let name = self.expect_name()?;
        self.expect("in")?;
        self.cursor.require(self.errors)?;
        let exp = self.expression()?;
        let body = self.required_body(std::slice::from_ref(&name))?;
        Ok(Stmt::For(For {
            name,
            exp,
            body,
            loc: position.into(),
        }))
    }

    pub(super) fn try_stmt(&mut self) -> PResult<Stmt> {
        let position = self.cursor.here();
        self.cursor.bump();
        let body = self.required_body(&[])?;

        let mut catch_var = None;
        let mut catch_body = Vec::new();
        if self.cursor.after_ending_is("catch") || self.cursor.at("catch") {
            if !self.cursor.at("catch") {
                self.cursor.bump();
            }
            self.cursor.bump();
            let name = self.expect_name()?;
            catch_body = self.required_body(std::slice::from_ref(&name))?;
            catch_var = Some(name);
        }

        let mut finally_body = Vec::new();
        if self.cursor.after_ending_is("finally") || self.cursor.at("finally") {
            if !self.cursor.at("finally") {
                self.cursor.bump();
            }
            self.cursor.bump();
            finally_body = self.required_body(&[])?;
        }

        Ok(Stmt::Try(Try {
            body,
            catch_var,
            catch_body,
            finally_body,
            loc: position.into(),
        }))
    }

    pub(super) fn synchronized(&mut self) -> PResult<Stmt> {
        let position = self.cursor.here();
        self.cursor.bump();
        self.expect("(")?;
        let locks = self.arguments()?;
        let body = self.required_body(&[])?;
        Ok(Stmt::Synchronized(Synchronized {
            locks,
            body,
            loc: position.into(),
        }))
    }

    pub(super) fn throw_stmt(&mut self) -> PResult<Stmt> {
        let position = self.cursor.here();
        self.cursor.bump();
        self.cursor.require(self.errors)?;
        let exp = self.expression()?;
        Ok(Stmt::Throw(Throw {
            exp,
            loc: position.into(),
        }))
    }

    pub(super) fn return_stmt(&mut self) -> PResult<Stmt> {
        let position = self.cursor.here();
        self.cursor.bump();
        let exp = if self.cursor.at_statement_end() || self.cursor.peek_layer().is_some() {
            None
        } else {
            Some(self.expression()?)
        };
        Ok(Stmt::Return(Return {
            exp,
            loc: position.into(),
        }))
    }

    /// `static` followed by a body layer, or by a single statement.
    pub(super) fn static_scope(&mut self) -> PResult<Stmt> {
        let position = self.cursor.here();
        self.cursor.bump();
        let body = if self.cursor.at_statement_end() || self.cursor.peek_layer().is_some() {
            self.required_body(&[])?
        } else {
            self.statement()?.into_iter().collect()
        };
        Ok(Stmt::StaticScope(StaticScope {
            body,
            loc: position.into(),
        }))
    }
}
