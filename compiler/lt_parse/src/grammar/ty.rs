//! Type specifications: `int`, `a::b::C`, `T[]`.

use lt_ir::ast::{Access, Expr, PackageRef};
use lt_lexer::TokenKind;

use crate::halt::{Halt, PResult};
use crate::Parser;

/// Keywords that name a type.
const PRIMITIVE_TYPES: &[&str] = &[
    "int", "long", "short", "byte", "char", "float", "double", "boolean", "bool", "void",
];

impl Parser<'_> {
    pub(super) fn type_spec(&mut self) -> PResult<Access> {
        let position = self.cursor.here();
        let first = match (self.cursor.peek_kind(), self.cursor.peek_text()) {
            (Some(TokenKind::Name), Some(text)) => text,
            (Some(TokenKind::Keyword), Some(text)) if PRIMITIVE_TYPES.contains(&text) => text,
            _ => {
                self.errors
                    .unexpected_token("type", &self.cursor.describe(), position)?;
                return Err(Halt::Skip);
            }
        };
        self.cursor.bump();

        let mut segments = vec![first.to_owned()];
        while self.cursor.eat("::") {
            self.cursor.require(self.errors)?;
            segments.push(self.expect_name()?);
        }
        let name = segments.pop().unwrap_or_default();
        let mut access = if segments.is_empty() {
            Access {
                exp: None,
                name,
                loc: position.clone().into(),
            }
        } else {
            Access {
                exp: Some(Box::new(Expr::PackageRef(PackageRef {
                    pkg: segments.join("."),
                    loc: position.clone().into(),
                }))),
                name,
                loc: position.clone().into(),
            }
        };

        while self.at_empty_brackets() {
            self.cursor.bump();
            self.cursor.bump();
            access = Access {
                exp: Some(Box::new(Expr::Access(access))),
                name: "[]".to_owned(),
                loc: position.clone().into(),
            };
        }
        Ok(access)
    }

    fn at_empty_brackets(&self) -> bool {
        self.cursor.at("[")
            && self
                .cursor
                .peek_next()
                .is_some_and(|id| self.cursor.tree().is_text(id, "]"))
    }
}

#[cfg(test)]
mod tests {
    use super::PRIMITIVE_TYPES;

    #[test]
    fn primitive_names_are_keywords() {
        for name in PRIMITIVE_TYPES {
            assert!(!lt_lexer::is_valid_name(name), "{name}");
        }
    }
}
