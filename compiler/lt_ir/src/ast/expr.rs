//! Expression nodes.

use super::{Anno, BinaryOp, Stmt, UnaryOp};
use crate::{Loc, Modifiers};

/// Expressions. Every variant may also stand alone as a statement.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Expr {
    Number(Literal),
    /// String literal; `text` holds the unescaped content without quotes.
    Str(Literal),
    Bool(Literal),
    Null(Loc),
    Access(Access),
    PackageRef(PackageRef),
    Index(Index),
    Invocation(Invocation),
    Assignment(Assignment),
    VariableDef(VariableDef),
    Unary(UnaryOperation),
    Binary(BinaryOperation),
    Lambda(Lambda),
    Array(ArrayExp),
    Map(MapExp),
    New(New),
    AsType(AsType),
    TypeOf(TypeOf),
}

impl Expr {
    pub fn loc(&self) -> &Loc {
        match self {
            Expr::Number(e) | Expr::Str(e) | Expr::Bool(e) => &e.loc,
            Expr::Null(loc) => loc,
            Expr::Access(e) => &e.loc,
            Expr::PackageRef(e) => &e.loc,
            Expr::Index(e) => &e.loc,
            Expr::Invocation(e) => &e.loc,
            Expr::Assignment(e) => &e.loc,
            Expr::VariableDef(e) => &e.loc,
            Expr::Unary(e) => &e.loc,
            Expr::Binary(e) => &e.loc,
            Expr::Lambda(e) => &e.loc,
            Expr::Array(e) => &e.loc,
            Expr::Map(e) => &e.loc,
            Expr::New(e) => &e.loc,
            Expr::AsType(e) => &e.loc,
            Expr::TypeOf(e) => &e.loc,
        }
    }

    pub fn number(text: &str) -> Expr {
        Expr::Number(Literal::new(text))
    }

    pub fn string(text: &str) -> Expr {
        Expr::Str(Literal::new(text))
    }

    pub fn name(name: &str) -> Expr {
        Expr::Access(Access::name(name))
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary(BinaryOperation {
            op,
            left: Box::new(left),
            right: Box::new(right),
            loc: Loc::synthetic(),
        })
    }
}

/// Number, string or boolean literal.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Literal {
    pub text: String,
    pub loc: Loc,
}

impl Literal {
    pub fn new(text: &str) -> Self {
        Literal {
            text: text.to_owned(),
            loc: Loc::synthetic(),
        }
    }
}

/// `name` or `exp.name`. Also used for type specifications: `int`,
/// `java::util::List` (with a [`PackageRef`] receiver) and `T[]` (name
/// `"[]"` with the element type as receiver).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Access {
    pub exp: Option<Box<Expr>>,
    pub name: String,
    pub loc: Loc,
}

impl Access {
    pub fn name(name: &str) -> Self {
        Access {
            exp: None,
            name: name.to_owned(),
            loc: Loc::synthetic(),
        }
    }

    pub fn member(exp: Expr, name: &str) -> Self {
        Access {
            exp: Some(Box::new(exp)),
            name: name.to_owned(),
            loc: Loc::synthetic(),
        }
    }

    pub fn is_array_type(&self) -> bool {
        self.name == "[]"
    }
}

/// Package path in dotted form (`java::util` is stored as `java.util`).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct PackageRef {
    pub pkg: String,
    pub loc: Loc,
}

/// `exp[args]`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Index {
    pub exp: Box<Expr>,
    pub args: Vec<Expr>,
    pub loc: Loc,
}

/// `target(args)`; `target.exp` is the receiver when present.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Invocation {
    pub target: Access,
    pub args: Vec<Expr>,
    pub loc: Loc,
}

/// `target = value` or a compound form such as `target += value`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Assignment {
    pub target: Box<Expr>,
    /// `None` for plain assignment.
    pub op: Option<BinaryOp>,
    pub value: Box<Expr>,
    pub loc: Loc,
}

/// Variable, field or parameter definition.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct VariableDef {
    pub name: String,
    pub modifiers: Modifiers,
    pub annos: Vec<Anno>,
    pub ty: Option<Access>,
    pub init: Option<Box<Expr>>,
    pub loc: Loc,
}

impl VariableDef {
    pub fn new(name: &str) -> Self {
        VariableDef {
            name: name.to_owned(),
            modifiers: Modifiers::empty(),
            annos: Vec::new(),
            ty: None,
            init: None,
            loc: Loc::synthetic(),
        }
    }

    #[must_use]
    pub fn with_type(mut self, ty: Access) -> Self {
        self.ty = Some(ty);
        self
    }

    #[must_use]
    pub fn with_init(mut self, init: Expr) -> Self {
        self.init = Some(Box::new(init));
        self
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct UnaryOperation {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    pub loc: Loc,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct BinaryOperation {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub loc: Loc,
}

/// `(params)->body`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Lambda {
    pub params: Vec<VariableDef>,
    pub body: Vec<Stmt>,
    pub loc: Loc,
}

/// `[a, b, c]`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ArrayExp {
    pub items: Vec<Expr>,
    pub loc: Loc,
}

/// `{k: v, ...}`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MapExp {
    pub entries: Vec<(Expr, Expr)>,
    pub loc: Loc,
}

/// `new T(args)`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct New {
    pub ty: Access,
    pub args: Vec<Expr>,
    pub loc: Loc,
}

/// `exp as T`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct AsType {
    pub exp: Box<Expr>,
    pub ty: Access,
    pub loc: Loc,
}

/// `type T`, the class object of `T`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeOf {
    pub ty: Access,
    pub loc: Loc,
}
