//! Binary and unary operators with their precedence.

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Concat,
    Pow,
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Shl,
    Shr,
    UShr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    RefEq,
    RefNe,
    Is,
    Not,
    In,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Or,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 26] = [
        BinaryOp::Concat,
        BinaryOp::Pow,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Rem,
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Shl,
        BinaryOp::Shr,
        BinaryOp::UShr,
        BinaryOp::Lt,
        BinaryOp::Gt,
        BinaryOp::Le,
        BinaryOp::Ge,
        BinaryOp::Eq,
        BinaryOp::Ne,
        BinaryOp::RefEq,
        BinaryOp::RefNe,
        BinaryOp::Is,
        BinaryOp::Not,
        BinaryOp::In,
        BinaryOp::BitAnd,
        BinaryOp::BitXor,
        BinaryOp::BitOr,
        BinaryOp::And,
        BinaryOp::Or,
    ];

    /// Returns the source-level symbol for this operator.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Concat => ":::",
            BinaryOp::Pow => "^^",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::RefEq => "===",
            BinaryOp::RefNe => "!==",
            BinaryOp::Is => "is",
            BinaryOp::Not => "not",
            BinaryOp::In => "in",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Operator for a source token. `and`/`or` are spellings of `&&`/`||`.
    pub fn from_symbol(text: &str) -> Option<BinaryOp> {
        match text {
            "and" => Some(BinaryOp::And),
            "or" => Some(BinaryOp::Or),
            _ => BinaryOp::ALL.into_iter().find(|op| op.as_symbol() == text),
        }
    }

    /// Binding strength; higher binds tighter. Every binary operator is
    /// left associative.
    ///
    /// - 12: `:::`
    /// - 11: `^^`
    /// - 10: `*` `/` `%`
    /// - 9: `+` `-`
    /// - 8: `<<` `>>` `>>>`
    /// - 7: `<` `>` `<=` `>=`
    /// - 6: `==` `!=` `===` `!==` `is` `not` `in`
    /// - 5: `&`
    /// - 4: `^`
    /// - 3: `|`
    /// - 2: `&&`
    /// - 1: `||`
    pub const fn precedence(self) -> u8 {
        match self {
            BinaryOp::Concat => 12,
            BinaryOp::Pow => 11,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 10,
            BinaryOp::Add | BinaryOp::Sub => 9,
            BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => 8,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => 7,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::RefEq
            | BinaryOp::RefNe
            | BinaryOp::Is
            | BinaryOp::Not
            | BinaryOp::In => 6,
            BinaryOp::BitAnd => 5,
            BinaryOp::BitXor => 4,
            BinaryOp::BitOr => 3,
            BinaryOp::And => 2,
            BinaryOp::Or => 1,
        }
    }

    /// Operators that may be combined with `=` (`+=`, `<<=`, ...).
    pub const fn is_compound_assignable(self) -> bool {
        matches!(
            self,
            BinaryOp::Add
                | BinaryOp::Sub
                | BinaryOp::Mul
                | BinaryOp::Div
                | BinaryOp::Rem
                | BinaryOp::Shl
                | BinaryOp::Shr
                | BinaryOp::UShr
                | BinaryOp::BitAnd
                | BinaryOp::BitXor
                | BinaryOp::BitOr
        )
    }

    /// Parses an assignment operator: `=` and `:=` give `Some(None)`,
    /// `+=` gives `Some(Some(Add))`.
    pub fn assignment(text: &str) -> Option<Option<BinaryOp>> {
        if text == "=" || text == ":=" {
            return Some(None);
        }
        let op = BinaryOp::from_symbol(text.strip_suffix('=')?)?;
        op.is_compound_assignable().then_some(Some(op))
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Not,
    BitNot,
    Neg,
    Plus,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnaryOp {
    pub fn prefix(text: &str) -> Option<UnaryOp> {
        match text {
            "!" => Some(UnaryOp::Not),
            "~" => Some(UnaryOp::BitNot),
            "-" => Some(UnaryOp::Neg),
            "+" => Some(UnaryOp::Plus),
            "++" => Some(UnaryOp::PreInc),
            "--" => Some(UnaryOp::PreDec),
            _ => None,
        }
    }

    pub fn postfix(text: &str) -> Option<UnaryOp> {
        match text {
            "++" => Some(UnaryOp::PostInc),
            "--" => Some(UnaryOp::PostDec),
            _ => None,
        }
    }

    pub const fn as_symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::PreInc | UnaryOp::PostInc => "++",
            UnaryOp::PreDec | UnaryOp::PostDec => "--",
        }
    }

    pub const fn is_increment(self) -> bool {
        matches!(
            self,
            UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec
        )
    }
}
