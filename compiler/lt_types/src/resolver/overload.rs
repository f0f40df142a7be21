//! Member lookup and overload selection.
//!
//! Selection runs in two phases. The first only accepts arguments whose
//! types are assignable to the parameters along the lattice; the second
//! also lets a primitive argument box to its wrapper class. Within a phase
//! the most specific applicable candidate wins: the one whose parameter
//! types are all assignable to the corresponding parameters of every other
//! applicable candidate. No winner is an ambiguity.

use lt_diagnostic::CompileError;
use lt_ir::ast::Lambda;
use lt_ir::{Expr, Position};
use smallvec::SmallVec;

use super::context::MethodContext;
use super::Resolver;
use crate::{lattice, FieldRef, InvokeKind, MethodKind, MethodRef, Primitive, TypeDef, TypeId, Value};

/// Call argument. Lambdas are lowered only once the parameter they are
/// passed to is known.
pub(crate) enum Arg<'e> {
    Value(Value),
    Lambda(&'e Lambda),
}

impl Arg<'_> {
    fn describe(&self, table: &crate::TypeTable) -> String {
        match self {
            Arg::Value(value) => table.name(value.ty()),
            Arg::Lambda(lambda) => format!("lambda/{}", lambda.params.len()),
        }
    }
}

type Signature = SmallVec<[TypeId; 4]>;

impl Resolver<'_> {
    pub(super) fn lower_args<'e>(
        &mut self,
        cx: &mut MethodContext,
        args: &'e [Expr],
    ) -> Result<Vec<Arg<'e>>, CompileError> {
        let mut lowered = Vec::with_capacity(args.len());
        for arg in args {
            lowered.push(match arg {
                Expr::Lambda(lambda) => Arg::Lambda(lambda),
                other => Arg::Value(self.lower_expr(cx, other, None)?),
            });
        }
        Ok(lowered)
    }

    /// Methods named `name` visible on `ty`: its own first, then those of
    /// its super types. A method overridden further down hides the
    /// inherited one. Interfaces and arrays also see `java.lang.Object`.
    pub(super) fn methods_of(&mut self, ty: TypeId, name: &str) -> Result<Vec<MethodRef>, CompileError> {
        let mut owners = Vec::new();
        if self.table.object(ty).is_some() {
            owners.push(ty);
            owners.extend(self.table.supertypes(ty));
        }
        let needs_object = match self.table.get(ty) {
            TypeDef::Interface(_) | TypeDef::Annotation(_) | TypeDef::Array { .. } => true,
            _ => false,
        };
        if needs_object {
            let object = self.object_type(&Position::synthetic())?;
            if !owners.contains(&object) {
                owners.push(object);
            }
        }
        let mut seen: Vec<Signature> = Vec::new();
        let mut found = Vec::new();
        for owner in owners {
            for method in self.table.methods_named(owner, name) {
                let Some(info) = self.table.method(method) else {
                    continue;
                };
                let signature = info.param_types();
                if !seen.contains(&signature) {
                    seen.push(signature);
                    found.push(method);
                }
            }
        }
        Ok(found)
    }

    pub(super) fn constructors_of(&self, ty: TypeId) -> Vec<MethodRef> {
        let count = self.table.object(ty).map_or(0, |o| o.constructors.len());
        (0..count)
            .map(|index| MethodRef {
                owner: ty,
                kind: MethodKind::Constructor,
                index: crate::id::to_u32(index),
            })
            .collect()
    }

    /// Field `name` of `ty` or of its nearest super type declaring one.
    pub(super) fn find_field(&self, ty: TypeId, name: &str) -> Option<FieldRef> {
        std::iter::once(ty)
            .chain(self.table.supertypes(ty))
            .find_map(|owner| self.own_field(owner, name))
    }

    pub(super) fn own_field(&self, owner: TypeId, name: &str) -> Option<FieldRef> {
        let index = self.table.object(owner)?.fields.iter().position(|f| f.name == name)?;
        Some(FieldRef {
            owner,
            index: crate::id::to_u32(index),
        })
    }

    /// The single abstract method of a functional interface. Abstract
    /// redeclarations of `java.lang.Object` methods do not count.
    pub(super) fn functional_method(&self, ty: TypeId) -> Option<MethodRef> {
        if !matches!(self.table.get(ty), TypeDef::Interface(_)) {
            return None;
        }
        let object = self.table.lookup(lattice::OBJECT);
        let mut found: Vec<(MethodRef, String, Signature)> = Vec::new();
        for owner in std::iter::once(ty).chain(self.table.supertypes(ty)) {
            let Some(info) = self.table.object(owner) else {
                continue;
            };
            for (index, method) in info.methods.iter().enumerate() {
                if !method.is_abstract() || method.is_static() {
                    continue;
                }
                let signature = method.param_types();
                let from_object = object.is_some_and(|object| {
                    self.table
                        .object(object)
                        .is_some_and(|o| o.methods.iter().any(|m| m.name == method.name && m.param_types() == signature))
                });
                let duplicate = found.iter().any(|(_, n, s)| *n == method.name && *s == signature);
                if !from_object && !duplicate {
                    found.push((
                        MethodRef {
                            owner,
                            kind: MethodKind::Method,
                            index: crate::id::to_u32(index),
                        },
                        method.name.clone(),
                        signature,
                    ));
                }
            }
        }
        match found.as_slice() {
            [(method, _, _)] => Some(*method),
            _ => None,
        }
    }

    /// Wrapper class `source` boxes to when that wrapper is assignable to
    /// `target`.
    pub(super) fn boxed_type(&mut self, source: TypeId, target: TypeId) -> Result<Option<TypeId>, CompileError> {
        let Some(primitive) = Primitive::from_id(source) else {
            return Ok(None);
        };
        if !self.table.is_reference(target) {
            return Ok(None);
        }
        let Some(wrapper) = self.load_type(primitive.wrapper())? else {
            return Ok(None);
        };
        Ok(self.table.is_assignable_from(target, wrapper).then_some(wrapper))
    }

    fn arg_fits(&mut self, param: TypeId, arg: &Arg<'_>, boxing: bool) -> Result<bool, CompileError> {
        match arg {
            Arg::Value(value) => {
                let source = value.ty();
                if self.table.is_assignable_from(param, source) {
                    return Ok(true);
                }
                Ok(boxing && self.boxed_type(source, param)?.is_some())
            }
            Arg::Lambda(lambda) => Ok(self.table.is_object_root(param)
                || self
                    .functional_method(param)
                    .and_then(|m| self.table.method(m))
                    .is_some_and(|m| m.params.len() == lambda.params.len())),
        }
    }

    pub(super) fn select_overload(
        &mut self,
        candidates: &[MethodRef],
        args: &[Arg<'_>],
        name: &str,
        position: &Position,
    ) -> Result<MethodRef, CompileError> {
        for boxing in [false, true] {
            let mut applicable: Vec<(MethodRef, Signature)> = Vec::new();
            for &candidate in candidates {
                let Some(signature) = self.table.method(candidate).map(crate::MethodInfo::param_types) else {
                    continue;
                };
                if signature.len() != args.len() {
                    continue;
                }
                let mut fits = true;
                for (param, arg) in signature.iter().zip(args) {
                    if !self.arg_fits(*param, arg, boxing)? {
                        fits = false;
                        break;
                    }
                }
                if fits {
                    applicable.push((candidate, signature));
                }
            }
            if applicable.is_empty() {
                continue;
            }
            let best: Vec<MethodRef> = applicable
                .iter()
                .filter(|(candidate, signature)| {
                    applicable.iter().all(|(other, other_signature)| {
                        other == candidate
                            || other_signature
                                .iter()
                                .zip(signature)
                                .all(|(o, c)| self.table.is_assignable_from(*o, *c))
                    })
                })
                .map(|(candidate, _)| *candidate)
                .collect();
            tracing::trace!(name, boxing, applicable = applicable.len(), "overload candidates");
            return match best.as_slice() {
                [winner] => Ok(*winner),
                _ => Err(CompileError::resolution(
                    position.clone(),
                    format!("ambiguous call to {name}({})", self.describe_args(args)),
                )),
            };
        }
        Err(CompileError::resolution(
            position.clone(),
            format!("no applicable overload for {name}({})", self.describe_args(args)),
        ))
    }

    fn describe_args(&self, args: &[Arg<'_>]) -> String {
        args.iter()
            .map(|arg| arg.describe(&self.table))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Convert arguments to the selected method's parameter types; lambdas
    /// are lowered against their parameter type here.
    pub(super) fn finish_args(
        &mut self,
        cx: &mut MethodContext,
        method: MethodRef,
        args: Vec<Arg<'_>>,
        position: &Position,
    ) -> Result<Vec<Value>, CompileError> {
        let params = self
            .table
            .method(method)
            .map(crate::MethodInfo::param_types)
            .unwrap_or_default();
        let mut values = Vec::with_capacity(args.len());
        for (param, arg) in params.into_iter().zip(args) {
            let value = match arg {
                Arg::Value(value) => value,
                Arg::Lambda(lambda) => self.lower_lambda(cx, lambda, Some(param))?,
            };
            values.push(self.convert(value, param, position)?);
        }
        Ok(values)
    }

    pub(super) fn dispatch_kind(&self, owner: TypeId) -> InvokeKind {
        if self.table.get(owner).is_interface() {
            InvokeKind::Interface
        } else {
            InvokeKind::Virtual
        }
    }

    /// Assignment conversion: identity, primitive widening (folded for
    /// constants), reference widening, or boxing to a wrapper `target`
    /// accepts.
    pub(super) fn convert(&mut self, value: Value, target: TypeId, position: &Position) -> Result<Value, CompileError> {
        let source = value.ty();
        if source == target {
            return Ok(value);
        }
        if let (Value::Const(constant), Some(primitive)) = (&value, Primitive::from_id(target)) {
            if let Some(coerced) = constant.coerce(primitive) {
                return Ok(Value::Const(coerced));
            }
        }
        if self.table.is_assignable_from(target, source) {
            return Ok(if source.is_primitive() {
                Value::Cast {
                    kind: crate::CastKind::Widen,
                    value: Box::new(value),
                    ty: target,
                }
            } else {
                value
            });
        }
        if let Some(wrapper) = self.boxed_type(source, target)? {
            return Ok(Value::Cast {
                kind: crate::CastKind::Box,
                value: Box::new(value),
                ty: wrapper,
            });
        }
        Err(CompileError::resolution(
            position.clone(),
            format!(
                "cannot convert {} to {}",
                self.table.name(source),
                self.table.name(target)
            ),
        ))
    }
}
