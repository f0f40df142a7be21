//! Expressions: precedence climbing over binary operators, then unary,
//! postfix and primary forms.

use lt_ir::ast::{
    Access, ArrayExp, AsType, Assignment, BinaryOperation, Index, Invocation, Lambda, Literal,
    MapExp, New, TypeOf, UnaryOperation, VariableDef,
};
use lt_ir::{BinaryOp, Expr, Position, Stmt, UnaryOp};
use lt_lexer::{NodeId, TokenKind};
use lt_stack::ensure_sufficient_stack;

use super::bare_name;
use crate::halt::{Halt, PResult};
use crate::Parser;

impl Parser<'_> {
    pub(crate) fn expression(&mut self) -> PResult<Expr> {
        ensure_sufficient_stack(|| self.assignment())
    }

    /// Assignment is right associative and binds loosest.
    fn assignment(&mut self) -> PResult<Expr> {
        let target = self.binary(1)?;
        let Some(op) = self
            .cursor
            .peek_text()
            .filter(|_| self.cursor.peek_kind() == Some(TokenKind::Symbol))
            .and_then(BinaryOp::assignment)
        else {
            return Ok(target);
        };
        let position = self.cursor.here();
        self.cursor.bump();
        self.cursor.require(self.errors)?;
        let value = self.expression()?;
        self.assign(target, op, value, position)
    }

    /// Build an assignment; `name = value` with a name not yet defined in
    /// scope defines it.
    fn assign(
        &mut self,
        target: Expr,
        op: Option<BinaryOp>,
        value: Expr,
        position: Position,
    ) -> PResult<Expr> {
        match target {
            Expr::VariableDef(mut def) if op.is_none() && def.init.is_none() => {
                def.init = Some(Box::new(value));
                Ok(Expr::VariableDef(def))
            }
            Expr::Access(access)
                if op.is_none() && access.exp.is_none() && !self.is_defined(&access.name) =>
            {
                self.define(&access.name);
                Ok(Expr::VariableDef(VariableDef {
                    loc: access.loc,
                    ..VariableDef::new(&access.name).with_init(value)
                }))
            }
            target @ (Expr::Access(_) | Expr::Index(_)) => Ok(Expr::Assignment(Assignment {
                target: Box::new(target),
                op,
                value: Box::new(value),
                loc: position.into(),
            })),
            _ => {
                self.errors
                    .syntax("cannot assign to this expression", position)?;
                Err(Halt::Skip)
            }
        }
    }

    fn binary(&mut self, min_precedence: u8) -> PResult<Expr> {
        let mut left = self.unary()?;
        while let Some(op) = self.binary_op() {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            let position = self.cursor.here();
            self.cursor.bump();
            self.cursor.require(self.errors)?;
            let right = ensure_sufficient_stack(|| self.binary(precedence + 1))?;
            left = Expr::Binary(BinaryOperation {
                op,
                left: Box::new(left),
                right: Box::new(right),
                loc: position.into(),
            });
        }
        Ok(left)
    }

    fn binary_op(&self) -> Option<BinaryOp> {
        match self.cursor.peek_kind()? {
            TokenKind::Symbol | TokenKind::Keyword | TokenKind::Name => {
                BinaryOp::from_symbol(self.cursor.peek_text()?)
            }
            _ => None,
        }
    }

    fn unary(&mut self) -> PResult<Expr> {
        let prefix = self
            .cursor
            .peek_text()
            .filter(|_| self.cursor.peek_kind() == Some(TokenKind::Symbol))
            .and_then(UnaryOp::prefix);
        let Some(op) = prefix else {
            return self.postfix();
        };
        let position = self.cursor.here();
        self.cursor.bump();
        self.cursor.require(self.errors)?;
        let operand = ensure_sufficient_stack(|| self.unary())?;
        Ok(Expr::Unary(UnaryOperation {
            op,
            operand: Box::new(operand),
            loc: position.into(),
        }))
    }

    fn postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            let Some(text) = self.cursor.peek_text() else {
                break;
            };
            let symbol = self.cursor.peek_kind() == Some(TokenKind::Symbol);
            let position = self.cursor.here();
            expr = match text {
                "." if symbol => {
                    self.cursor.bump();
                    self.cursor.require(self.errors)?;
                    let name = self.member_name()?;
                    let access = Access {
                        exp: Some(Box::new(expr)),
                        name,
                        loc: position.clone().into(),
                    };
                    if self.cursor.eat("(") {
                        let args = self.arguments()?;
                        Expr::Invocation(Invocation {
                            target: access,
                            args,
                            loc: position.into(),
                        })
                    } else {
                        Expr::Access(access)
                    }
                }
                "(" if symbol && bare_name(&expr).is_some() => {
                    let Expr::Access(target) = expr else {
                        return Err(Halt::Skip);
                    };
                    self.cursor.bump();
                    let args = self.arguments()?;
                    let loc = target.loc.clone();
                    Expr::Invocation(Invocation { target, args, loc })
                }
                "[" if symbol => {
                    self.cursor.bump();
                    let args = match self.cursor.peek_layer() {
                        Some(layer) => {
                            self.cursor.bump();
                            self.expressions(layer)?
                        }
                        None => Vec::new(),
                    };
                    self.expect("]")?;
                    if args.is_empty() {
                        self.errors.syntax("index expects arguments", position)?;
                        return Err(Halt::Skip);
                    }
                    Expr::Index(Index {
                        exp: Box::new(expr),
                        args,
                        loc: position.into(),
                    })
                }
                "++" | "--" if symbol => {
                    self.cursor.bump();
                    let op = UnaryOp::postfix(text).unwrap_or(UnaryOp::PostInc);
                    Expr::Unary(UnaryOperation {
                        op,
                        operand: Box::new(expr),
                        loc: position.into(),
                    })
                }
                ":" if symbol && !self.in_map_key && bare_name(&expr).is_some() => {
                    let Expr::Access(access) = expr else {
                        return Err(Halt::Skip);
                    };
                    self.cursor.bump();
                    self.cursor.require(self.errors)?;
                    let ty = self.type_spec()?;
                    self.define(&access.name);
                    Expr::VariableDef(VariableDef {
                        loc: access.loc,
                        ..VariableDef::new(&access.name).with_type(ty)
                    })
                }
                "as" => {
                    self.cursor.bump();
                    self.cursor.require(self.errors)?;
                    let ty = self.type_spec()?;
                    Expr::AsType(AsType {
                        exp: Box::new(expr),
                        ty,
                        loc: position.into(),
                    })
                }
                _ => break,
            };
        }
        Ok(expr)
    }

    fn member_name(&mut self) -> PResult<String> {
        match self.cursor.peek_kind() {
            Some(TokenKind::Name | TokenKind::Keyword | TokenKind::Modifier) => {
                let text = self.cursor.peek_text().unwrap_or_default();
                self.cursor.bump();
                Ok(text.to_owned())
            }
            _ => {
                self.errors
                    .unexpected_token("member name", &self.cursor.describe(), self.cursor.here())?;
                Err(Halt::Skip)
            }
        }
    }

    fn primary(&mut self) -> PResult<Expr> {
        let id = self.cursor.require(self.errors)?;
        let tree = self.cursor.tree();
        let text = self.cursor.text(id);
        let position = self.cursor.position(id);
        let next_is = |expected: &str| tree.next(id).is_some_and(|n| tree.is_text(n, expected));

        match tree.token_kind(id) {
            Some(TokenKind::Number) => {
                self.cursor.bump();
                Ok(Expr::Number(Literal {
                    text: text.to_owned(),
                    loc: position.into(),
                }))
            }
            Some(TokenKind::String) => {
                self.cursor.bump();
                let text = self.unescape(text, &position)?;
                Ok(Expr::Str(Literal {
                    text,
                    loc: position.into(),
                }))
            }
            Some(TokenKind::Bool) => {
                self.cursor.bump();
                Ok(Expr::Bool(Literal {
                    text: text.to_owned(),
                    loc: position.into(),
                }))
            }
            Some(TokenKind::Keyword) if text == "null" => {
                self.cursor.bump();
                Ok(Expr::Null(position.into()))
            }
            Some(TokenKind::Keyword) if text == "new" => self.new_expr(),
            Some(TokenKind::Keyword) if text == "type" => {
                self.cursor.bump();
                self.cursor.require(self.errors)?;
                let ty = self.type_spec()?;
                Ok(Expr::TypeOf(TypeOf {
                    ty,
                    loc: position.into(),
                }))
            }
            Some(TokenKind::Name) if next_is("->") => {
                self.cursor.bump();
                self.cursor.bump();
                let params = vec![VariableDef {
                    loc: position.clone().into(),
                    ..VariableDef::new(text)
                }];
                self.lambda(params, position)
            }
            Some(TokenKind::Name) if next_is("::") => {
                let access = self.type_spec()?;
                Ok(Expr::Access(access))
            }
            Some(TokenKind::Name) => {
                self.cursor.bump();
                Ok(Expr::Access(Access {
                    exp: None,
                    name: text.to_owned(),
                    loc: position.into(),
                }))
            }
            Some(TokenKind::Symbol) => match text {
                "(" if self
                    .cursor
                    .pair_close(id)
                    .and_then(|close| tree.next(close))
                    .is_some_and(|n| tree.is_text(n, "->")) =>
                {
                    self.cursor.bump();
                    let params = self.parameters()?;
                    self.cursor.bump();
                    self.lambda(params, position)
                }
                "(" => self.parenthesized(position),
                "[" => {
                    self.cursor.bump();
                    let items = self.enclosed("]")?;
                    Ok(Expr::Array(ArrayExp {
                        items,
                        loc: position.into(),
                    }))
                }
                "{" => self.map(position),
                "->" => {
                    self.cursor.bump();
                    self.lambda(Vec::new(), position)
                }
                _ => self.unexpected_expression(),
            },
            _ => self.unexpected_expression(),
        }
    }

    fn unexpected_expression<T>(&mut self) -> PResult<T> {
        self.errors
            .unexpected_token("expression", &self.cursor.describe(), self.cursor.here())?;
        Err(Halt::Skip)
    }

    /// Body after `->`: the following layer, if any.
    fn lambda(&mut self, params: Vec<VariableDef>, position: Position) -> PResult<Expr> {
        let names: Vec<String> = params.iter().map(|p| p.name.clone()).collect();
        let body = self.optional_body(&names)?;
        Ok(Expr::Lambda(Lambda {
            params,
            body,
            loc: position.into(),
        }))
    }

    fn parenthesized(&mut self, position: Position) -> PResult<Expr> {
        self.cursor.bump();
        let mut items = self.enclosed(")")?;
        match items.pop() {
            Some(item) if items.is_empty() => Ok(item),
            _ => {
                self.errors
                    .syntax("parentheses must contain exactly one expression", position)?;
                Err(Halt::Skip)
            }
        }
    }

    fn new_expr(&mut self) -> PResult<Expr> {
        let position = self.cursor.here();
        self.cursor.bump();
        self.cursor.require(self.errors)?;
        let ty = self.type_spec()?;
        let args = if self.cursor.eat("(") {
            self.arguments()?
        } else {
            Vec::new()
        };
        Ok(Expr::New(New {
            ty,
            args,
            loc: position.into(),
        }))
    }

    /// Arguments after `(`, up to and including `)`.
    pub(super) fn arguments(&mut self) -> PResult<Vec<Expr>> {
        self.enclosed(")")
    }

    /// Expressions of an optional layer followed by `close`.
    fn enclosed(&mut self, close: &str) -> PResult<Vec<Expr>> {
        let items = match self.cursor.peek_layer() {
            Some(layer) => {
                self.cursor.bump();
                self.expressions(layer)?
            }
            None => Vec::new(),
        };
        self.expect(close)?;
        Ok(items)
    }

    /// Statements of a layer that must all be expressions.
    fn expressions(&mut self, layer: NodeId) -> PResult<Vec<Expr>> {
        let mut items = Vec::new();
        for stmt in self.block(layer, &[])? {
            match stmt {
                Stmt::Expr(expr) => items.push(expr),
                other => self
                    .errors
                    .syntax("expecting an expression", other.loc().position().clone())?,
            }
        }
        Ok(items)
    }

    /// `{k: v, ...}`
    fn map(&mut self, position: Position) -> PResult<Expr> {
        self.cursor.bump();
        let mut entries = Vec::new();
        if let Some(layer) = self.cursor.peek_layer() {
            self.cursor.bump();
            let saved = (self.cursor.pos, self.cursor.last);
            self.cursor.pos = self.cursor.tree().first_child(layer);
            let result = ensure_sufficient_stack(|| self.map_entries(&mut entries));
            (self.cursor.pos, self.cursor.last) = saved;
            result?;
        }
        self.expect("}")?;
        Ok(Expr::Map(MapExp {
            entries,
            loc: position.into(),
        }))
    }

    fn map_entries(&mut self, entries: &mut Vec<(Expr, Expr)>) -> PResult<()> {
        loop {
            while self
                .cursor
                .peek()
                .is_some_and(|id| self.cursor.tree().ending(id).is_some())
            {
                self.cursor.bump();
            }
            if self.cursor.peek().is_none() {
                return Ok(());
            }
            let in_map_key = std::mem::replace(&mut self.in_map_key, true);
            let key = self.expression();
            self.in_map_key = in_map_key;
            let key = key?;
            self.expect(":")?;
            self.cursor.require(self.errors)?;
            let value = self.expression()?;
            entries.push((key, value));
            if !self.cursor.at_statement_end() {
                self.errors.unexpected_token(
                    "end of map entry",
                    &self.cursor.describe(),
                    self.cursor.here(),
                )?;
                return Err(Halt::Skip);
            }
        }
    }

    /// Content of a string literal with escapes resolved.
    fn unescape(&self, raw: &str, position: &Position) -> PResult<String> {
        let inner = raw
            .get(1..raw.len().saturating_sub(1))
            .unwrap_or_default();
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            let escaped = match chars.next() {
                Some('n') => Some('\n'),
                Some('t') => Some('\t'),
                Some('r') => Some('\r'),
                Some('b') => Some('\u{8}'),
                Some('f') => Some('\u{c}'),
                Some('0') => Some('\0'),
                Some(c @ ('\\' | '\'' | '"')) => Some(c),
                Some('u') => {
                    let hex: String = chars.by_ref().take(4).collect();
                    u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
                }
                _ => None,
            };
            match escaped {
                Some(c) => out.push(c),
                None => self
                    .errors
                    .syntax("illegal escape sequence", position.clone())?,
            }
        }
        Ok(out)
    }
}
