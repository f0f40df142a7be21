//! Statement nodes and definitions.

use super::{Access, Expr, Invocation, VariableDef};
use crate::{Loc, Modifiers};

/// Statements. Expressions are a sub-kind ([`Stmt::Expr`]).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Stmt {
    Expr(Expr),
    If(If),
    While(While),
    For(For),
    Try(Try),
    Synchronized(Synchronized),
    Throw(Throw),
    Return(Return),
    ClassDef(ClassDef),
    InterfaceDef(InterfaceDef),
    AnnotationDef(AnnotationDef),
    ObjectDef(ObjectDef),
    FunDef(FunDef),
    MethodDef(MethodDef),
    Import(Import),
    PackageDeclare(PackageDeclare),
    StaticScope(StaticScope),
    Pass(Loc),
    Break(Loc),
    Continue(Loc),
}

impl Stmt {
    pub fn loc(&self) -> &Loc {
        match self {
            Stmt::Expr(e) => e.loc(),
            Stmt::If(s) => &s.loc,
            Stmt::While(s) => &s.loc,
            Stmt::For(s) => &s.loc,
            Stmt::Try(s) => &s.loc,
            Stmt::Synchronized(s) => &s.loc,
            Stmt::Throw(s) => &s.loc,
            Stmt::Return(s) => &s.loc,
            Stmt::ClassDef(s) => &s.loc,
            Stmt::InterfaceDef(s) => &s.loc,
            Stmt::AnnotationDef(s) => &s.loc,
            Stmt::ObjectDef(s) => &s.loc,
            Stmt::FunDef(s) => &s.loc,
            Stmt::MethodDef(s) => &s.loc,
            Stmt::Import(s) => &s.loc,
            Stmt::PackageDeclare(s) => &s.loc,
            Stmt::StaticScope(s) => &s.loc,
            Stmt::Pass(loc) | Stmt::Break(loc) | Stmt::Continue(loc) => loc,
        }
    }
}

/// `if`/`elseif`/`else` chain.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct If {
    pub branches: Vec<IfPair>,
    pub loc: Loc,
}

/// One branch of an [`If`]; `condition` is `None` for `else`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct IfPair {
    pub condition: Option<Expr>,
    pub body: Vec<Stmt>,
    pub loc: Loc,
}

/// `while cond` or `do ... while cond`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct While {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub do_while: bool,
    pub loc: Loc,
}

/// `for name in exp`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct For {
    pub name: String,
    pub exp: Expr,
    pub body: Vec<Stmt>,
    pub loc: Loc,
}

/// `try` / `catch name` / `finally`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Try {
    pub body: Vec<Stmt>,
    pub catch_var: Option<String>,
    pub catch_body: Vec<Stmt>,
    pub finally_body: Vec<Stmt>,
    pub loc: Loc,
}

/// `synchronized(a, b)`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Synchronized {
    pub locks: Vec<Expr>,
    pub body: Vec<Stmt>,
    pub loc: Loc,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Throw {
    pub exp: Expr,
    pub loc: Loc,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Return {
    pub exp: Option<Expr>,
    pub loc: Loc,
}

/// Annotation use: `@Name`, `@Name(v)` or `@Name(k=v, ...)`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Anno {
    pub anno_type: Access,
    pub args: Vec<AnnoArg>,
    pub loc: Loc,
}

/// `name = value` inside an annotation; a lone value is named `value`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct AnnoArg {
    pub name: String,
    pub value: Expr,
}

/// `class Name(params):Super(args), I1, I2`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ClassDef {
    pub name: String,
    pub modifiers: Modifiers,
    pub annos: Vec<Anno>,
    pub params: Vec<VariableDef>,
    /// Parent written with constructor arguments.
    pub super_invocation: Option<Invocation>,
    /// Parents written without arguments (super class or interfaces).
    pub super_types: Vec<Access>,
    pub body: Vec<Stmt>,
    pub loc: Loc,
}

/// `interface Name:I1, I2`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct InterfaceDef {
    pub name: String,
    pub modifiers: Modifiers,
    pub annos: Vec<Anno>,
    pub super_interfaces: Vec<Access>,
    pub body: Vec<Stmt>,
    pub loc: Loc,
}

/// `annotation Name` with `element:Type = default` members.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct AnnotationDef {
    pub name: String,
    pub modifiers: Modifiers,
    pub annos: Vec<Anno>,
    pub elements: Vec<VariableDef>,
    pub loc: Loc,
}

/// `object Name:Super(args), I1` defines a class with exactly one
/// instance.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ObjectDef {
    pub name: String,
    pub modifiers: Modifiers,
    pub annos: Vec<Anno>,
    pub super_invocation: Option<Invocation>,
    pub super_types: Vec<Access>,
    pub body: Vec<Stmt>,
    pub loc: Loc,
}

/// `fun Name(params):Functional` defines a class implementing the single
/// abstract method of `Functional` with the body.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunDef {
    pub name: String,
    pub annos: Vec<Anno>,
    pub params: Vec<VariableDef>,
    /// `None` stands for `lt::lang::function::FunctionN`, N the arity.
    pub super_type: Option<Access>,
    pub body: Vec<Stmt>,
    pub loc: Loc,
}

/// Method definition in any of its header forms.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MethodDef {
    pub name: String,
    pub modifiers: Modifiers,
    pub annos: Vec<Anno>,
    pub params: Vec<VariableDef>,
    pub return_type: Option<Access>,
    pub body: Vec<Stmt>,
    pub loc: Loc,
}

/// `import pkg::Type` or `import pkg::_`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Import {
    pub target: ImportTarget,
    pub loc: Loc,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ImportTarget {
    /// Every type of a package (`import java::util::_`).
    Package(String),
    /// One type (`import java::util::List`).
    Type { pkg: Option<String>, name: String },
}

/// `package a::b`, stored dotted.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct PackageDeclare {
    pub pkg: String,
    pub loc: Loc,
}

/// Members declared under `static`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct StaticScope {
    pub body: Vec<Stmt>,
    pub loc: Loc,
}
