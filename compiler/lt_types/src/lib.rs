//! Type definitions and semantic resolution for Latte.
//!
//! [`resolve`] takes the parsed files of one compilation unit together with
//! a [`Classpath`] and produces a [`ResolvedUnit`]: a [`TypeTable`] in which
//! every type the unit defines carries its fields, methods and constructors,
//! and every method body is lowered into [`Instruction`]s over typed
//! [`Value`]s. Names, overloads and operators are all resolved; closures
//! have their captures analyzed and every local has its slot.
//!
//! # Type ids
//!
//! Types are handles into the [`TypeTable`]. Primitives, `void` and the
//! null type have fixed ids ([`TypeId::INT`] and friends). Arrays and
//! pointer (boxed local) types are interned on first use.

mod annotation;
mod classpath;
mod config;
mod def;
mod id;
mod lattice;
mod primitive;
mod resolver;
mod table;
mod value;

pub mod capture;
pub mod slots;

pub use annotation::{query_annotation_targets, query_retention, Retention, TargetSet};
pub use classpath::{
    AnnotationSignature, AnnotationValue, ClassKind, ClassSignature, Classpath, FieldSignature,
    MemoryClasspath, MethodSignature, FUNCTION_ARITY, FUNCTION_PACKAGE,
};
pub use config::ResolverConfig;
pub use def::{AnnoInfo, CaptureInfo, FieldInfo, LeftValue, MethodInfo, ObjectType, TypeDef, TypeOrigin};
pub use id::{FieldRef, Label, MethodKind, MethodRef, TypeId, Var};
pub use lattice::OBJECT;
pub use primitive::Primitive;
pub use resolver::{ResolvedUnit, Stage};
pub use table::TypeTable;
pub use value::{
    ArrayValue, CastKind, Constant, ExceptionEntry, Instruction, Invoke, InvokeKind, LambdaValue,
    NewObject, PrimOp, UnaryPrimOp, Value, ValuePack,
};

use lt_diagnostic::CompileError;
use lt_ir::{FileName, Stmt};

/// Resolve the files of one compilation unit.
///
/// # Errors
///
/// Returns the first semantic error. Resolution does not recover: a unit
/// with an error produces no output.
#[tracing::instrument(level = "debug", skip_all, fields(files = files.len()))]
pub fn resolve(
    files: Vec<(FileName, Vec<Stmt>)>,
    classpath: &dyn Classpath,
    config: &ResolverConfig,
) -> Result<ResolvedUnit, CompileError> {
    resolver::Resolver::new(classpath, config).run(files)
}

#[cfg(test)]
mod tests;
