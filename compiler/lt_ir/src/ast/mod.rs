//! Abstract syntax tree.
//!
//! Nodes own their children (`Box`/`Vec`); the tree is short lived, produced
//! by the parser and consumed once by the resolver. Every node carries a
//! [`Loc`](crate::Loc), which is ignored by equality.

mod expr;
mod operators;
mod stmt;

pub use expr::{
    Access, ArrayExp, AsType, Assignment, BinaryOperation, Expr, Index, Invocation, Lambda, Literal,
    MapExp, New, PackageRef, TypeOf, UnaryOperation, VariableDef,
};
pub use operators::{BinaryOp, UnaryOp};
pub use stmt::{
    Anno, AnnoArg, AnnotationDef, ClassDef, For, FunDef, If, IfPair, Import, ImportTarget,
    InterfaceDef, MethodDef, ObjectDef, PackageDeclare, Return, StaticScope, Stmt, Synchronized,
    Throw, Try, While,
};

#[cfg(test)]
mod tests;
