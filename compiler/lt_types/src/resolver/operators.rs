//! Operators, assignment targets and compound assignment.
//!
//! Operators on primitives use binary numeric promotion. `+` with a
//! `String` operand concatenates. Every other operator on a reference
//! operand is a call of the method it stands for (`a - b` is
//! `a.subtract(b)`), which is how user types overload operators.

use lt_diagnostic::CompileError;
use lt_ir::ast::{Assignment, BinaryOperation, UnaryOperation};
use lt_ir::{BinaryOp, Expr, Position, UnaryOp};

use super::context::MethodContext;
use super::expr::Target;
use super::overload::Arg;
use super::Resolver;
use crate::{
    CastKind, Constant, FieldRef, Instruction, Invoke, InvokeKind, PrimOp, Primitive, TypeId, UnaryPrimOp, Value,
    ValuePack, Var,
};

/// Something a value can be stored into.
#[derive(Clone, Debug)]
pub(super) enum Place {
    Var {
        var: Var,
        ty: TypeId,
    },
    Field {
        target: Option<Value>,
        field: FieldRef,
        ty: TypeId,
    },
    Element {
        array: Value,
        index: Value,
        ty: TypeId,
    },
    /// `target[args]` on a non-array: `get` to read, `set`/`put` to write.
    Indexed {
        target: Value,
        args: Vec<Value>,
        ty: TypeId,
    },
}

impl Place {
    fn ty(&self) -> TypeId {
        match self {
            Place::Var { ty, .. }
            | Place::Field { ty, .. }
            | Place::Element { ty, .. }
            | Place::Indexed { ty, .. } => *ty,
        }
    }
}

/// Method an operator on a reference operand calls.
fn operator_method(op: BinaryOp) -> Option<&'static str> {
    Some(match op {
        BinaryOp::Add => "add",
        BinaryOp::Sub => "subtract",
        BinaryOp::Mul => "multiply",
        BinaryOp::Div => "divide",
        BinaryOp::Rem => "remainder",
        BinaryOp::Shl => "shiftLeft",
        BinaryOp::Shr => "shiftRight",
        BinaryOp::UShr => "unsignedShiftRight",
        BinaryOp::BitAnd => "and",
        BinaryOp::BitOr => "or",
        BinaryOp::BitXor => "xor",
        BinaryOp::Concat => "concat",
        BinaryOp::Pow => "pow",
        BinaryOp::Lt => "lt",
        BinaryOp::Gt => "gt",
        BinaryOp::Le => "le",
        BinaryOp::Ge => "ge",
        _ => return None,
    })
}

fn prim_op(op: BinaryOp) -> Option<PrimOp> {
    Some(match op {
        BinaryOp::Add => PrimOp::Add,
        BinaryOp::Sub => PrimOp::Sub,
        BinaryOp::Mul => PrimOp::Mul,
        BinaryOp::Div => PrimOp::Div,
        BinaryOp::Rem => PrimOp::Rem,
        BinaryOp::Shl => PrimOp::Shl,
        BinaryOp::Shr => PrimOp::Shr,
        BinaryOp::UShr => PrimOp::UShr,
        BinaryOp::BitAnd => PrimOp::And,
        BinaryOp::BitOr => PrimOp::Or,
        BinaryOp::BitXor => PrimOp::Xor,
        BinaryOp::Lt => PrimOp::Lt,
        BinaryOp::Gt => PrimOp::Gt,
        BinaryOp::Le => PrimOp::Le,
        BinaryOp::Ge => PrimOp::Ge,
        BinaryOp::Eq | BinaryOp::RefEq | BinaryOp::Is => PrimOp::Eq,
        BinaryOp::Ne | BinaryOp::RefNe | BinaryOp::Not => PrimOp::Ne,
        _ => return None,
    })
}

/// `value` as a `ty` primitive; constants are folded.
fn widen(value: Value, to: Primitive) -> Value {
    if value.ty() == to.id() {
        return value;
    }
    if let Value::Const(constant) = &value {
        if let Some(coerced) = constant.coerce(to) {
            return Value::Const(coerced);
        }
    }
    Value::Cast {
        kind: CastKind::Widen,
        value: Box::new(value),
        ty: to.id(),
    }
}

fn negate(value: Value) -> Value {
    Value::Unary {
        op: UnaryPrimOp::Not,
        operand: Box::new(value),
        ty: TypeId::BOOL,
    }
}

impl Resolver<'_> {
    fn operator_error(&self, op: &str, left: TypeId, right: TypeId, position: &Position) -> CompileError {
        CompileError::resolution(
            position.clone(),
            format!(
                "operator {op} cannot be applied to {} and {}",
                self.table.name(left),
                self.table.name(right)
            ),
        )
    }

    pub(super) fn lower_unary(&mut self, cx: &mut MethodContext, unary: &UnaryOperation) -> Result<Value, CompileError> {
        let position = unary.loc.position();
        if unary.op.is_increment() {
            return self
                .lower_increment(cx, &unary.operand, unary.op, true)?
                .ok_or_else(|| CompileError::resolution(position.clone(), "increment has no value"));
        }
        let operand = self.lower_expr(cx, &unary.operand, None)?;
        let ty = operand.ty();
        let symbol = unary.op.as_symbol();
        let Some(primitive) = Primitive::from_id(ty) else {
            return Err(CompileError::resolution(
                position.clone(),
                format!("operator {symbol} cannot be applied to {}", self.table.name(ty)),
            ));
        };
        let mismatch = || {
            CompileError::resolution(
                position.clone(),
                format!("operator {symbol} cannot be applied to {}", primitive.name()),
            )
        };
        match unary.op {
            UnaryOp::Not if primitive == Primitive::Bool => Ok(negate(operand)),
            UnaryOp::BitNot if primitive.is_integral() => {
                let promoted = primitive.promote(primitive).ok_or_else(mismatch)?;
                Ok(Value::Unary {
                    op: UnaryPrimOp::BitNot,
                    operand: Box::new(widen(operand, promoted)),
                    ty: promoted.id(),
                })
            }
            UnaryOp::Neg => {
                let promoted = primitive.promote(primitive).ok_or_else(mismatch)?;
                Ok(match widen(operand, promoted) {
                    Value::Const(constant) => Value::Const(match constant {
                        Constant::Int(v) => Constant::Int(v.wrapping_neg()),
                        Constant::Long(v) => Constant::Long(v.wrapping_neg()),
                        Constant::Float(v) => Constant::Float(-v),
                        Constant::Double(v) => Constant::Double(-v),
                        other => other,
                    }),
                    operand => Value::Unary {
                        op: UnaryPrimOp::Neg,
                        operand: Box::new(operand),
                        ty: promoted.id(),
                    },
                })
            }
            UnaryOp::Plus => {
                let promoted = primitive.promote(primitive).ok_or_else(mismatch)?;
                Ok(widen(operand, promoted))
            }
            _ => Err(mismatch()),
        }
    }

    pub(super) fn lower_binary(&mut self, cx: &mut MethodContext, binary: &BinaryOperation) -> Result<Value, CompileError> {
        let position = binary.loc.position();
        let left = self.lower_expr(cx, &binary.left, None)?;
        if matches!(binary.op, BinaryOp::Is | BinaryOp::Not) {
            if let Expr::Access(access) = binary.right.as_ref() {
                let target = self.access_target(cx, access)?;
                return match target {
                    Target::Type(ty) => {
                        if !self.table.is_reference(left.ty()) {
                            return Err(self.operator_error(binary.op.as_symbol(), left.ty(), ty, position));
                        }
                        Ok(Value::InstanceOf {
                            value: Box::new(left),
                            target: ty,
                            negate: binary.op == BinaryOp::Not,
                        })
                    }
                    Target::Value(right) => self.binary_values(cx, binary.op, left, right, position),
                    Target::Package(pkg) => Err(CompileError::resolution(
                        position.clone(),
                        format!("package {pkg} used as a value"),
                    )),
                };
            }
        }
        let right = self.lower_expr(cx, &binary.right, None)?;
        self.binary_values(cx, binary.op, left, right, position)
    }

    /// Combine two lowered operands.
    pub(super) fn binary_values(
        &mut self,
        cx: &mut MethodContext,
        op: BinaryOp,
        left: Value,
        right: Value,
        position: &Position,
    ) -> Result<Value, CompileError> {
        let (lt, rt) = (left.ty(), right.ty());
        let (lp, rp) = (Primitive::from_id(lt), Primitive::from_id(rt));
        match op {
            BinaryOp::And | BinaryOp::Or => {
                if lt != TypeId::BOOL || rt != TypeId::BOOL {
                    return Err(self.operator_error(op.as_symbol(), lt, rt, position));
                }
                Ok(Value::Logical {
                    and: op == BinaryOp::And,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            BinaryOp::In => self.invoke_named(cx, right, "contains", vec![left], position),
            BinaryOp::RefEq | BinaryOp::RefNe if lp.is_none() && rp.is_none() => Ok(Value::Identity {
                negate: op == BinaryOp::RefNe,
                left: Box::new(left),
                right: Box::new(right),
            }),
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Is | BinaryOp::Not | BinaryOp::RefEq | BinaryOp::RefNe => {
                let negated = matches!(op, BinaryOp::Ne | BinaryOp::Not | BinaryOp::RefNe);
                if let (Some(l), Some(r)) = (lp, rp) {
                    return self.primitive_binary(op, left, l, right, r, position);
                }
                if matches!(left, Value::Null) || matches!(right, Value::Null) {
                    return Ok(Value::Identity {
                        negate: negated,
                        left: Box::new(left),
                        right: Box::new(right),
                    });
                }
                // A primitive compared with a reference is boxed first.
                let object = self.object_type(position)?;
                let left = self.convert(left, object, position)?;
                let right = self.convert(right, object, position)?;
                let equals = self.invoke_named(cx, left, "equals", vec![right], position)?;
                Ok(if negated { negate(equals) } else { equals })
            }
            BinaryOp::Add if self.is_string(lt) || self.is_string(rt) => {
                let ty = if self.is_string(lt) { lt } else { rt };
                let mut parts = Vec::new();
                for part in [left, right] {
                    match part {
                        Value::Concat { parts: inner, .. } => parts.extend(inner),
                        other => parts.push(other),
                    }
                }
                Ok(Value::Concat { parts, ty })
            }
            _ => match (lp, rp) {
                (Some(l), Some(r)) => self.primitive_binary(op, left, l, right, r, position),
                (None, _) if self.table.is_reference(lt) && lt != TypeId::NULL => {
                    let Some(method) = operator_method(op) else {
                        return Err(self.operator_error(op.as_symbol(), lt, rt, position));
                    };
                    self.invoke_named(cx, left, method, vec![right], position)
                }
                _ => Err(self.operator_error(op.as_symbol(), lt, rt, position)),
            },
        }
    }

    fn is_string(&self, ty: TypeId) -> bool {
        self.table.object(ty).is_some_and(|o| o.name == "java.lang.String")
    }

    fn primitive_binary(
        &mut self,
        op: BinaryOp,
        left: Value,
        l: Primitive,
        right: Value,
        r: Primitive,
        position: &Position,
    ) -> Result<Value, CompileError> {
        if op == BinaryOp::Pow {
            if !l.is_numeric() || !r.is_numeric() {
                return Err(self.operator_error(op.as_symbol(), l.id(), r.id(), position));
            }
            return self.lower_pow(widen(left, Primitive::Double), widen(right, Primitive::Double), position);
        }
        let error = || self.operator_error(op.as_symbol(), l.id(), r.id(), position);
        let Some(prim) = prim_op(op) else {
            return Err(error());
        };
        let both_bool = l == Primitive::Bool && r == Primitive::Bool;
        let (operand_ty, result_ty) = match prim {
            PrimOp::And | PrimOp::Or | PrimOp::Xor if both_bool => (Primitive::Bool, Primitive::Bool),
            PrimOp::Eq | PrimOp::Ne if both_bool => (Primitive::Bool, Primitive::Bool),
            PrimOp::And | PrimOp::Or | PrimOp::Xor => {
                if !l.is_integral() || !r.is_integral() {
                    return Err(error());
                }
                let promoted = l.promote(r).ok_or_else(error)?;
                (promoted, promoted)
            }
            PrimOp::Shl | PrimOp::Shr | PrimOp::UShr => {
                if !l.is_integral() || !r.is_integral() {
                    return Err(error());
                }
                let promoted = l.promote(l).ok_or_else(error)?;
                let distance = r.promote(r).ok_or_else(error)?;
                return Ok(Value::Binary {
                    op: prim,
                    left: Box::new(widen(left, promoted)),
                    right: Box::new(widen(right, distance)),
                    ty: promoted.id(),
                });
            }
            _ if prim.is_comparison() => (l.promote(r).ok_or_else(error)?, Primitive::Bool),
            _ => {
                let promoted = l.promote(r).ok_or_else(error)?;
                (promoted, promoted)
            }
        };
        Ok(Value::Binary {
            op: prim,
            left: Box::new(widen(left, operand_ty)),
            right: Box::new(widen(right, operand_ty)),
            ty: result_ty.id(),
        })
    }

    /// `a ^^ b` on primitives is `Math.pow(a, b)`.
    fn lower_pow(&mut self, left: Value, right: Value, position: &Position) -> Result<Value, CompileError> {
        let math = self.require_type("java.lang.Math", position)?;
        let candidates = self.table.methods_named(math, "pow");
        let args = [Arg::Value(left.clone()), Arg::Value(right.clone())];
        let method = self.select_overload(&candidates, &args, "pow", position)?;
        Ok(Value::Invoke(Box::new(Invoke {
            kind: InvokeKind::Static,
            target: None,
            method,
            args: vec![left, right],
            ty: TypeId::DOUBLE,
        })))
    }

    /// Resolve an assignment target.
    pub(super) fn lower_place(&mut self, cx: &mut MethodContext, expr: &Expr) -> Result<Place, CompileError> {
        let position = expr.loc().position();
        match expr {
            Expr::Access(access) => {
                let name = access.name.as_str();
                let Some(receiver) = access.exp.as_deref() else {
                    if let Some(var) = cx.lookup(name) {
                        let ty = self.var_type(cx, var);
                        return Ok(Place::Var { var, ty });
                    }
                    let owner = cx.owner();
                    if let Some(field) = self.find_field(owner, name) {
                        let target = self.field_receiver(cx, None, field, position)?;
                        let ty = self.table.field(field).map_or(TypeId::VOID, |f| f.ty);
                        return Ok(Place::Field { target, field, ty });
                    }
                    return Err(CompileError::resolution(
                        position.clone(),
                        format!("cannot resolve variable {name}"),
                    ));
                };
                let (target, owner) = match self.target_of(cx, receiver)? {
                    Target::Value(value) => {
                        let ty = value.ty();
                        (Some(value), ty)
                    }
                    Target::Type(ty) => (None, ty),
                    Target::Package(pkg) => {
                        return Err(CompileError::resolution(
                            position.clone(),
                            format!("cannot assign to package {pkg}"),
                        ));
                    }
                };
                let Some(field) = self.find_field(owner, name) else {
                    return Err(CompileError::resolution(
                        position.clone(),
                        format!("no field {name} in {}", self.table.name(owner)),
                    ));
                };
                let is_static = self.table.field(field).is_some_and(crate::FieldInfo::is_static);
                if target.is_none() && !is_static {
                    return Err(CompileError::resolution(
                        position.clone(),
                        format!("field {name} of {} is not static", self.table.name(owner)),
                    ));
                }
                let target = self.field_receiver(cx, target, field, position)?;
                let ty = self.table.field(field).map_or(TypeId::VOID, |f| f.ty);
                Ok(Place::Field { target, field, ty })
            }
            Expr::Index(index) => {
                let target = self.lower_expr(cx, &index.exp, None)?;
                let ty = target.ty();
                if self.table.is_array(ty) {
                    let [subscript] = index.args.as_slice() else {
                        return Err(CompileError::resolution(position.clone(), "arrays take exactly one index"));
                    };
                    let subscript = self.lower_expr(cx, subscript, Some(TypeId::INT))?;
                    let subscript = self.convert(subscript, TypeId::INT, position)?;
                    let element = self.table.component_of(ty).unwrap_or(TypeId::VOID);
                    return Ok(Place::Element {
                        array: target,
                        index: subscript,
                        ty: element,
                    });
                }
                let mut args = Vec::with_capacity(index.args.len());
                for arg in &index.args {
                    args.push(self.lower_expr(cx, arg, None)?);
                }
                let object = self.object_type(position)?;
                Ok(Place::Indexed {
                    target,
                    args,
                    ty: object,
                })
            }
            _ => Err(CompileError::resolution(position.clone(), "cannot assign to this expression")),
        }
    }

    /// Move receivers and indices that are not trivially re-evaluable into
    /// temporaries, so the place can be read and then written.
    fn stabilize(cx: &mut MethodContext, place: Place) -> Place {
        let keep = |value: Value, cx: &mut MethodContext| {
            if value.is_simple() {
                return value;
            }
            let ty = value.ty();
            let temp = cx.temp(ty);
            cx.emit(Instruction::Store { var: temp, value });
            Value::Load { var: temp, ty }
        };
        match place {
            Place::Field {
                target: Some(target),
                field,
                ty,
            } => Place::Field {
                target: Some(keep(target, cx)),
                field,
                ty,
            },
            Place::Element { array, index, ty } => {
                let array = keep(array, cx);
                let index = keep(index, cx);
                Place::Element { array, index, ty }
            }
            Place::Indexed { target, args, ty } => {
                let target = keep(target, cx);
                let args = args.into_iter().map(|arg| keep(arg, cx)).collect();
                Place::Indexed { target, args, ty }
            }
            other => other,
        }
    }

    fn read_place(&mut self, cx: &mut MethodContext, place: &Place, position: &Position) -> Result<Value, CompileError> {
        Ok(match place {
            Place::Var { var, .. } => self.load_var(cx, *var),
            Place::Field { target, field, ty } => Value::GetField {
                target: target.clone().map(Box::new),
                field: *field,
                ty: *ty,
            },
            Place::Element { array, index, ty } => Value::ArrayLoad {
                array: Box::new(array.clone()),
                index: Box::new(index.clone()),
                ty: *ty,
            },
            Place::Indexed { target, args, .. } => {
                self.invoke_named(cx, target.clone(), "get", args.clone(), position)?
            }
        })
    }

    /// Store `value` into `place` after assignment conversion.
    pub(super) fn write_place(
        &mut self,
        cx: &mut MethodContext,
        place: &Place,
        value: Value,
        position: &Position,
    ) -> Result<Instruction, CompileError> {
        match place {
            Place::Var { var, ty } => {
                let value = self.convert(value, *ty, position)?;
                let frame = cx.current();
                let Some(left) = cx.left_value_mut(*var) else {
                    return Err(CompileError::resolution(position.clone(), "unknown variable"));
                };
                if !left.can_change && left.already_assigned {
                    return Err(CompileError::resolution(
                        position.clone(),
                        format!("cannot assign twice to val {}", left.name),
                    ));
                }
                left.already_assigned = true;
                left.used = true;
                cx.tracker.on_assign(frame, *var);
                Ok(Instruction::Store { var: *var, value })
            }
            Place::Field { target, field, ty } => {
                let value = self.convert(value, *ty, position)?;
                self.check_field_writable(cx, *field, position)?;
                Ok(match target {
                    Some(target) => Instruction::PutField {
                        target: target.clone(),
                        field: *field,
                        value,
                    },
                    None => Instruction::PutStatic { field: *field, value },
                })
            }
            Place::Element { array, index, ty } => {
                let value = self.convert(value, *ty, position)?;
                Ok(Instruction::ArrayStore {
                    array: array.clone(),
                    index: index.clone(),
                    value,
                })
            }
            Place::Indexed { target, args, .. } => {
                let object = self.object_type(position)?;
                let value = self.convert(value, object, position)?;
                let mut call_args = args.clone();
                call_args.push(value);
                let setter = if self.methods_of(target.ty(), "set")?.is_empty() {
                    "put"
                } else {
                    "set"
                };
                let call = self.invoke_named(cx, target.clone(), setter, call_args, position)?;
                Ok(Instruction::Eval(call))
            }
        }
    }

    /// `val` fields are written only by the initializers of their class.
    fn check_field_writable(&self, cx: &MethodContext, field: FieldRef, position: &Position) -> Result<(), CompileError> {
        let Some(info) = self.table.field(field) else {
            return Ok(());
        };
        if info.can_change() {
            return Ok(());
        }
        let initializer = if info.is_static() { "<clinit>" } else { "<init>" };
        let in_initializer = cx.current() == 0 && cx.owner() == field.owner && cx.frame().method.name == initializer;
        if in_initializer {
            Ok(())
        } else {
            Err(CompileError::resolution(
                position.clone(),
                format!("cannot assign to val field {}", info.name),
            ))
        }
    }

    /// Lower `target = value` or `target op= value`. With `want_value` the
    /// stored value is also the result, as a value pack.
    pub(super) fn lower_assignment(
        &mut self,
        cx: &mut MethodContext,
        assignment: &Assignment,
        want_value: bool,
    ) -> Result<Option<Value>, CompileError> {
        let position = assignment.loc.position();
        let saved = cx.begin_pack();
        let place = self.lower_place(cx, &assignment.target)?;
        let place_ty = place.ty();
        let (place, value) = match assignment.op {
            None => {
                let value = self.lower_expr(cx, &assignment.value, Some(place_ty))?;
                (place, value)
            }
            Some(op) => {
                let place = Self::stabilize(cx, place);
                let current = self.read_place(cx, &place, position)?;
                let operand = self.lower_expr(cx, &assignment.value, None)?;
                let combined = self.binary_values(cx, op, current, operand, position)?;
                let combined = self.narrow(combined, place_ty);
                (place, combined)
            }
        };
        let result = if want_value {
            let value = self.convert(value, place_ty, position)?;
            let temp = cx.temp(place_ty);
            cx.emit(Instruction::Store { var: temp, value });
            let store = self.write_place(cx, &place, Value::Load { var: temp, ty: place_ty }, position)?;
            cx.emit(store);
            Some(Value::Load { var: temp, ty: place_ty })
        } else {
            let store = self.write_place(cx, &place, value, position)?;
            cx.emit(store);
            None
        };
        let instructions = cx.end_pack(saved);
        match result {
            Some(result) => Ok(Some(Value::Pack(Box::new(ValuePack { instructions, result })))),
            None => {
                for instruction in instructions {
                    cx.emit(instruction);
                }
                Ok(None)
            }
        }
    }

    /// Compound assignment narrows a promoted primitive result back to the
    /// target type.
    fn narrow(&self, value: Value, to: TypeId) -> Value {
        let from = value.ty();
        match (Primitive::from_id(from), Primitive::from_id(to)) {
            (Some(f), Some(t)) if f != t && !f.widens_to(t) && f != Primitive::Bool && t != Primitive::Bool => {
                Value::Cast {
                    kind: CastKind::Convert,
                    value: Box::new(value),
                    ty: to,
                }
            }
            _ => value,
        }
    }

    /// `++`/`--` in prefix or postfix form.
    pub(super) fn lower_increment(
        &mut self,
        cx: &mut MethodContext,
        operand: &Expr,
        op: UnaryOp,
        want_value: bool,
    ) -> Result<Option<Value>, CompileError> {
        let position = operand.loc().position();
        let saved = cx.begin_pack();
        let place = self.lower_place(cx, operand)?;
        let place = Self::stabilize(cx, place);
        let ty = place.ty();
        let Some(primitive) = Primitive::from_id(ty).filter(|p| p.is_numeric()) else {
            return Err(CompileError::resolution(
                position.clone(),
                format!("operator {} cannot be applied to {}", op.as_symbol(), self.table.name(ty)),
            ));
        };
        let promoted = primitive.promote(primitive).unwrap_or(primitive);
        let step = |current: Value| {
            let one = Constant::Int(1).coerce(promoted).unwrap_or(Constant::Int(1));
            Value::Binary {
                op: if matches!(op, UnaryOp::PreInc | UnaryOp::PostInc) {
                    PrimOp::Add
                } else {
                    PrimOp::Sub
                },
                left: Box::new(widen(current, promoted)),
                right: Box::new(Value::Const(one)),
                ty: promoted.id(),
            }
        };
        let current = self.read_place(cx, &place, position)?;
        let result = match op {
            UnaryOp::PostInc | UnaryOp::PostDec if want_value => {
                let temp = cx.temp(ty);
                cx.emit(Instruction::Store { var: temp, value: current });
                let next = self.narrow(step(Value::Load { var: temp, ty }), ty);
                let store = self.write_place(cx, &place, next, position)?;
                cx.emit(store);
                Some(Value::Load { var: temp, ty })
            }
            _ => {
                let next = self.narrow(step(current), ty);
                let store = self.write_place(cx, &place, next, position)?;
                cx.emit(store);
                if want_value {
                    Some(self.read_place(cx, &place, position)?)
                } else {
                    None
                }
            }
        };
        let instructions = cx.end_pack(saved);
        match result {
            Some(result) => Ok(Some(Value::Pack(Box::new(ValuePack { instructions, result })))),
            None => {
                for instruction in instructions {
                    cx.emit(instruction);
                }
                Ok(None)
            }
        }
    }
}
