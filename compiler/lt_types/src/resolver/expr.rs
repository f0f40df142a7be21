//! Expression lowering: names, member access, calls, construction,
//! casts, aggregate literals and lambdas.

use lt_diagnostic::CompileError;
use lt_ir::ast::{Access, ArrayExp, AsType, Index, Invocation, Lambda, MapExp, New};
use lt_ir::{Expr, Modifiers, Position, Stmt};
use lt_stack::ensure_sufficient_stack;

use super::context::{Frame, MethodContext};
use super::overload::Arg;
use super::scope::qualify;
use super::Resolver;
use crate::classpath::{FUNCTION_ARITY, FUNCTION_PACKAGE};
use crate::{
    ArrayValue, CastKind, Constant, FieldRef, Instruction, InvokeKind, LambdaValue, LeftValue,
    MethodInfo, MethodKind, MethodRef, NewObject, Primitive, TypeDef, TypeId, Value, ValuePack,
    Var,
};

/// What a name or member access denotes.
pub(super) enum Target {
    Value(Value),
    Type(TypeId),
    Package(String),
}

impl Resolver<'_> {
    pub(super) fn lower_expr(
        &mut self,
        cx: &mut MethodContext,
        expr: &Expr,
        expected: Option<TypeId>,
    ) -> Result<Value, CompileError> {
        ensure_sufficient_stack(|| self.lower_expr_inner(cx, expr, expected))
    }

    fn lower_expr_inner(
        &mut self,
        cx: &mut MethodContext,
        expr: &Expr,
        expected: Option<TypeId>,
    ) -> Result<Value, CompileError> {
        let position = expr.loc().position();
        match expr {
            Expr::Number(literal) => Constant::parse_number(&literal.text)
                .map(Value::Const)
                .ok_or_else(|| CompileError::syntax(position.clone(), format!("malformed number {}", literal.text))),
            Expr::Bool(literal) => Constant::parse_bool(&literal.text)
                .map(Value::Const)
                .ok_or_else(|| CompileError::syntax(position.clone(), format!("malformed boolean {}", literal.text))),
            Expr::Str(literal) => self.string_value(&literal.text, expected, position),
            Expr::Null(_) => Ok(Value::Null),
            Expr::Access(access) => match self.access_target(cx, access)? {
                Target::Value(value) => Ok(value),
                Target::Type(ty) => Err(CompileError::resolution(
                    position.clone(),
                    format!("type {} used as a value", self.table.name(ty)),
                )),
                Target::Package(pkg) => Err(CompileError::resolution(
                    position.clone(),
                    format!("package {pkg} used as a value"),
                )),
            },
            Expr::PackageRef(pkg) => Err(CompileError::resolution(
                position.clone(),
                format!("package {} used as a value", pkg.pkg),
            )),
            Expr::Index(index) => self.lower_index(cx, index),
            Expr::Invocation(invocation) => self.lower_invocation(cx, invocation),
            Expr::Assignment(assignment) => self
                .lower_assignment(cx, assignment, true)?
                .ok_or_else(|| CompileError::resolution(position.clone(), "assignment has no value")),
            Expr::VariableDef(def) if self.reassigns(cx, def) => self
                .lower_assignment(cx, &super::stmt::reassignment(def), true)?
                .ok_or_else(|| CompileError::resolution(position.clone(), "assignment has no value")),
            Expr::VariableDef(def) => {
                let saved = cx.begin_pack();
                let var = self.define_local(cx, def)?;
                let instructions = cx.end_pack(saved);
                let result = self.load_var(cx, var);
                Ok(Value::Pack(Box::new(ValuePack { instructions, result })))
            }
            Expr::Unary(unary) => self.lower_unary(cx, unary),
            Expr::Binary(binary) => self.lower_binary(cx, binary),
            Expr::Lambda(lambda) => self.lower_lambda(cx, lambda, expected),
            Expr::Array(array) => self.lower_array(cx, array, expected),
            Expr::Map(map) => self.lower_map(cx, map),
            Expr::New(new) => self.lower_new(cx, new),
            Expr::AsType(cast) => self.lower_cast(cx, cast),
            Expr::TypeOf(type_of) => {
                let target = self.resolve_type_spec(cx.file, &type_of.ty)?;
                let ty = self.require_type("java.lang.Class", position)?;
                Ok(Value::ClassLit { target, ty })
            }
        }
    }

    /// A one-character string literal is a `char` where a `char` is
    /// expected.
    fn string_value(&mut self, text: &str, expected: Option<TypeId>, position: &Position) -> Result<Value, CompileError> {
        let mut chars = text.encode_utf16();
        if let (Some(TypeId::CHAR), Some(unit), None) = (expected, chars.next(), chars.next()) {
            return Ok(Value::Const(Constant::Char(unit)));
        }
        Ok(Value::Str {
            text: text.to_owned(),
            ty: self.require_type("java.lang.String", position)?,
        })
    }

    /// Type of the value stored in `var`; a boxed variable holds its
    /// pointee.
    pub(super) fn var_type(&self, cx: &MethodContext, var: Var) -> TypeId {
        let ty = cx.left_value(var).map_or(TypeId::VOID, |v| v.ty);
        self.table.pointee(ty).unwrap_or(ty)
    }

    pub(super) fn load_var(&self, cx: &mut MethodContext, var: Var) -> Value {
        let ty = self.var_type(cx, var);
        if let Some(value) = cx.left_value_mut(var) {
            value.used = true;
        }
        Value::Load { var, ty }
    }

    /// Evaluate a receiver: names may denote types or packages as well as
    /// values.
    pub(super) fn target_of(&mut self, cx: &mut MethodContext, expr: &Expr) -> Result<Target, CompileError> {
        match expr {
            Expr::Access(access) => self.access_target(cx, access),
            Expr::PackageRef(pkg) => Ok(Target::Package(pkg.pkg.clone())),
            other => self.lower_expr(cx, other, None).map(Target::Value),
        }
    }

    /// Resolve `name` or `exp.name`: local, then field, then type.
    pub(super) fn access_target(&mut self, cx: &mut MethodContext, access: &Access) -> Result<Target, CompileError> {
        let position = access.loc.position();
        let name = access.name.as_str();
        let Some(receiver) = access.exp.as_deref() else {
            if name == "this" {
                return self.this_value(cx, position).map(Target::Value);
            }
            if let Some(var) = cx.lookup(name) {
                return Ok(Target::Value(self.load_var(cx, var)));
            }
            let owner = cx.owner();
            if let Some(field) = self.find_field(owner, name) {
                return self.read_field(cx, None, field, position).map(Target::Value);
            }
            if let Some(ty) = self.find_type(cx.file, name)? {
                return Ok(Target::Type(ty));
            }
            return Err(CompileError::resolution(
                position.clone(),
                format!("cannot resolve {name}"),
            ));
        };
        match self.target_of(cx, receiver)? {
            Target::Package(pkg) => {
                let full = qualify(&pkg, name);
                Ok(match self.load_type(&full)? {
                    Some(ty) => Target::Type(ty),
                    None => Target::Package(full),
                })
            }
            Target::Type(ty) => {
                let field = self.find_field(ty, name).ok_or_else(|| {
                    CompileError::resolution(
                        position.clone(),
                        format!("no static field {name} in {}", self.table.name(ty)),
                    )
                })?;
                if !self.table.field(field).is_some_and(crate::FieldInfo::is_static) {
                    return Err(CompileError::resolution(
                        position.clone(),
                        format!("field {name} of {} is not static", self.table.name(ty)),
                    ));
                }
                self.read_field(cx, None, field, position).map(Target::Value)
            }
            Target::Value(value) => {
                let ty = value.ty();
                if self.table.is_array(ty) && name == "length" {
                    return Ok(Target::Value(Value::ArrayLength(Box::new(value))));
                }
                let field = self.find_field(ty, name).ok_or_else(|| {
                    CompileError::resolution(
                        position.clone(),
                        format!("no field {name} in {}", self.table.name(ty)),
                    )
                })?;
                self.read_field(cx, Some(value), field, position).map(Target::Value)
            }
        }
    }

    pub(super) fn this_value(&self, cx: &MethodContext, position: &Position) -> Result<Value, CompileError> {
        if cx.is_static() {
            return Err(CompileError::resolution(
                position.clone(),
                "this cannot be used in a static context",
            ));
        }
        Ok(Value::This { ty: cx.owner() })
    }

    /// Field read. `target` is the receiver written in source; an
    /// unqualified instance field reads from `this`.
    pub(super) fn read_field(
        &self,
        cx: &MethodContext,
        target: Option<Value>,
        field: FieldRef,
        position: &Position,
    ) -> Result<Value, CompileError> {
        let target = self.field_receiver(cx, target, field, position)?;
        let ty = self.table.field(field).map_or(TypeId::VOID, |f| f.ty);
        Ok(Value::GetField {
            target: target.map(Box::new),
            field,
            ty,
        })
    }

    /// Receiver a field access uses: none for static fields.
    pub(super) fn field_receiver(
        &self,
        cx: &MethodContext,
        target: Option<Value>,
        field: FieldRef,
        position: &Position,
    ) -> Result<Option<Value>, CompileError> {
        let Some(info) = self.table.field(field) else {
            return Ok(None);
        };
        if info.is_static() {
            return Ok(None);
        }
        match target {
            Some(target) => Ok(Some(target)),
            None if cx.is_static() => Err(CompileError::resolution(
                position.clone(),
                format!("instance field {} cannot be used in a static context", info.name),
            )),
            None => Ok(Some(Value::This { ty: cx.owner() })),
        }
    }

    fn lower_index(&mut self, cx: &mut MethodContext, index: &Index) -> Result<Value, CompileError> {
        let position = index.loc.position();
        let target = self.lower_expr(cx, &index.exp, None)?;
        let ty = target.ty();
        if self.table.is_array(ty) {
            let [subscript] = index.args.as_slice() else {
                return Err(CompileError::resolution(position.clone(), "arrays take exactly one index"));
            };
            let subscript = self.lower_expr(cx, subscript, Some(TypeId::INT))?;
            let subscript = self.convert(subscript, TypeId::INT, position)?;
            let element = self.table.component_of(ty).unwrap_or(TypeId::VOID);
            return Ok(Value::ArrayLoad {
                array: Box::new(target),
                index: Box::new(subscript),
                ty: element,
            });
        }
        let mut args = Vec::with_capacity(index.args.len());
        for arg in &index.args {
            args.push(self.lower_expr(cx, arg, None)?);
        }
        self.invoke_named(cx, target, "get", args, position)
    }

    fn lower_invocation(&mut self, cx: &mut MethodContext, invocation: &Invocation) -> Result<Value, CompileError> {
        let position = invocation.loc.position();
        let name = invocation.target.name.as_str();
        let args = &invocation.args;
        let Some(receiver) = invocation.target.exp.as_deref() else {
            return self.invoke_unqualified(cx, name, args, position);
        };
        match self.target_of(cx, receiver)? {
            Target::Type(ty) => {
                let candidates = self.methods_of(ty, name)?;
                if candidates.is_empty() {
                    return Err(CompileError::resolution(
                        position.clone(),
                        format!("no method {name} in {}", self.table.name(ty)),
                    ));
                }
                let args = self.lower_args(cx, args)?;
                let method = self.select_overload(&candidates, &args, name, position)?;
                if !self.table.method(method).is_some_and(MethodInfo::is_static) {
                    return Err(CompileError::resolution(
                        position.clone(),
                        format!("method {name} of {} is not static", self.table.name(ty)),
                    ));
                }
                self.make_invoke(cx, None, method, args, position)
            }
            Target::Package(pkg) => {
                let full = qualify(&pkg, name);
                match self.load_type(&full)? {
                    Some(ty) => self.construct(cx, ty, args, position),
                    None => Err(CompileError::resolution(position.clone(), format!("cannot resolve {full}"))),
                }
            }
            Target::Value(value) => self.invoke_on(cx, value, name, args, position),
        }
    }

    fn invoke_unqualified(
        &mut self,
        cx: &mut MethodContext,
        name: &str,
        args: &[Expr],
        position: &Position,
    ) -> Result<Value, CompileError> {
        if let Some(var) = cx.lookup(name) {
            let function = self.load_var(cx, var);
            return self.invoke_functional(cx, function, args, position);
        }
        let owner = cx.owner();
        let candidates = self.methods_of(owner, name)?;
        if !candidates.is_empty() {
            let args = self.lower_args(cx, args)?;
            let method = self.select_overload(&candidates, &args, name, position)?;
            let is_static = self.table.method(method).is_some_and(MethodInfo::is_static);
            let target = if is_static {
                None
            } else if cx.is_static() {
                return Err(CompileError::resolution(
                    position.clone(),
                    format!("instance method {name} cannot be called from a static context"),
                ));
            } else {
                Some(Value::This { ty: owner })
            };
            return self.make_invoke(cx, target, method, args, position);
        }
        if let Some(field) = self.find_field(owner, name) {
            let function = self.read_field(cx, None, field, position)?;
            return self.invoke_functional(cx, function, args, position);
        }
        if let Some(ty) = self.find_type(cx.file, name)? {
            return self.construct(cx, ty, args, position);
        }
        Err(CompileError::resolution(
            position.clone(),
            format!("cannot resolve method {name}"),
        ))
    }

    fn invoke_on(
        &mut self,
        cx: &mut MethodContext,
        target: Value,
        name: &str,
        args: &[Expr],
        position: &Position,
    ) -> Result<Value, CompileError> {
        let ty = target.ty();
        if !self.table.is_reference(ty) || ty == TypeId::NULL {
            return Err(CompileError::resolution(
                position.clone(),
                format!("cannot invoke {name} on {}", self.table.name(ty)),
            ));
        }
        let candidates = self.methods_of(ty, name)?;
        if candidates.is_empty() {
            if let Some(field) = self.find_field(ty, name) {
                let function = self.read_field(cx, Some(target), field, position)?;
                return self.invoke_functional(cx, function, args, position);
            }
            return Err(CompileError::resolution(
                position.clone(),
                format!("no method {name} in {}", self.table.name(ty)),
            ));
        }
        let args = self.lower_args(cx, args)?;
        let method = self.select_overload(&candidates, &args, name, position)?;
        self.make_invoke(cx, Some(target), method, args, position)
    }

    /// Call a method on an already lowered receiver with lowered
    /// arguments; used by operators.
    pub(super) fn invoke_named(
        &mut self,
        cx: &mut MethodContext,
        target: Value,
        name: &str,
        args: Vec<Value>,
        position: &Position,
    ) -> Result<Value, CompileError> {
        let ty = target.ty();
        let candidates = if self.table.is_reference(ty) && ty != TypeId::NULL {
            self.methods_of(ty, name)?
        } else {
            Vec::new()
        };
        let args: Vec<Arg<'_>> = args.into_iter().map(Arg::Value).collect();
        if candidates.is_empty() {
            return Err(CompileError::resolution(
                position.clone(),
                format!("no method {name} in {}", self.table.name(ty)),
            ));
        }
        let method = self.select_overload(&candidates, &args, name, position)?;
        self.make_invoke(cx, Some(target), method, args, position)
    }

    /// Call the functional method of a function-typed value.
    fn invoke_functional(
        &mut self,
        cx: &mut MethodContext,
        function: Value,
        args: &[Expr],
        position: &Position,
    ) -> Result<Value, CompileError> {
        let ty = function.ty();
        let Some(method) = self.functional_method(ty) else {
            return Err(CompileError::resolution(
                position.clone(),
                format!("{} is not callable", self.table.name(ty)),
            ));
        };
        let args = self.lower_args(cx, args)?;
        let name = self.table.method(method).map(|m| m.name.clone()).unwrap_or_default();
        let method = self.select_overload(&[method], &args, &name, position)?;
        self.make_invoke(cx, Some(function), method, args, position)
    }

    pub(super) fn make_invoke(
        &mut self,
        cx: &mut MethodContext,
        target: Option<Value>,
        method: MethodRef,
        args: Vec<Arg<'_>>,
        position: &Position,
    ) -> Result<Value, CompileError> {
        let (is_static, ty) = self
            .table
            .method(method)
            .map_or((false, TypeId::VOID), |m| (m.is_static(), m.return_type));
        let args = self.finish_args(cx, method, args, position)?;
        let (kind, target) = if is_static {
            (InvokeKind::Static, None)
        } else {
            (self.dispatch_kind(method.owner), target)
        };
        Ok(Value::Invoke(Box::new(crate::Invoke {
            kind,
            target,
            method,
            args,
            ty,
        })))
    }

    fn lower_new(&mut self, cx: &mut MethodContext, new: &New) -> Result<Value, CompileError> {
        let position = new.loc.position();
        let ty = self.resolve_type_spec(cx.file, &new.ty)?;
        self.construct(cx, ty, &new.args, position)
    }

    /// `T(args)`: instantiate a concrete class through its best
    /// constructor.
    pub(super) fn construct(
        &mut self,
        cx: &mut MethodContext,
        ty: TypeId,
        args: &[Expr],
        position: &Position,
    ) -> Result<Value, CompileError> {
        let name = self.table.name(ty);
        match self.table.get(ty) {
            TypeDef::Class(object) if object.is_abstract() => {
                return Err(CompileError::resolution(
                    position.clone(),
                    format!("cannot instantiate abstract class {name}"),
                ));
            }
            TypeDef::Class(_) => {}
            _ => {
                return Err(CompileError::resolution(
                    position.clone(),
                    format!("cannot instantiate {name}"),
                ));
            }
        }
        let candidates = self.constructors_of(ty);
        let args = self.lower_args(cx, args)?;
        let constructor = self.select_overload(&candidates, &args, &format!("constructor of {name}"), position)?;
        let args = self.finish_args(cx, constructor, args, position)?;
        Ok(Value::New(Box::new(NewObject {
            ty,
            constructor,
            args,
        })))
    }

    fn lower_cast(&mut self, cx: &mut MethodContext, cast: &AsType) -> Result<Value, CompileError> {
        let position = cast.loc.position();
        let target = self.resolve_type_spec(cx.file, &cast.ty)?;
        let value = self.lower_expr(cx, &cast.exp, Some(target))?;
        let source = value.ty();
        if source == target {
            return Ok(value);
        }
        let fail = |table: &crate::TypeTable| {
            CompileError::resolution(
                position.clone(),
                format!("cannot cast {} to {}", table.name(source), table.name(target)),
            )
        };
        match (Primitive::from_id(source), Primitive::from_id(target)) {
            (Some(from), Some(to)) => {
                if from == Primitive::Bool || to == Primitive::Bool {
                    return Err(fail(&self.table));
                }
                let kind = if from.widens_to(to) {
                    CastKind::Widen
                } else {
                    CastKind::Convert
                };
                Ok(Value::Cast {
                    kind,
                    value: Box::new(value),
                    ty: target,
                })
            }
            (Some(_), None) => self.convert(value, target, position),
            (None, Some(to)) => self.unbox(cx, value, to, position),
            (None, None) => {
                if !self.table.is_reference(source) || !self.table.is_reference(target) {
                    return Err(fail(&self.table));
                }
                let related = self.table.is_assignable_from(target, source)
                    || self.table.is_assignable_from(source, target)
                    || self.table.get(source).is_interface()
                    || self.table.get(target).is_interface();
                if !related {
                    return Err(fail(&self.table));
                }
                Ok(Value::Cast {
                    kind: CastKind::Check,
                    value: Box::new(value),
                    ty: target,
                })
            }
        }
    }

    /// `ref as int`: check the wrapper type when needed, then call its
    /// `<primitive>Value` accessor.
    fn unbox(
        &mut self,
        cx: &mut MethodContext,
        value: Value,
        to: Primitive,
        position: &Position,
    ) -> Result<Value, CompileError> {
        let source = value.ty();
        let wrapper = self.require_type(to.wrapper(), position)?;
        let numeric = self.load_type("java.lang.Number")?;
        let direct = self.table.is_assignable_from(wrapper, source)
            || (to.is_numeric() && numeric.is_some_and(|n| self.table.is_assignable_from(n, source)));
        let holder = if direct {
            value
        } else if self.table.is_assignable_from(source, wrapper) {
            Value::Cast {
                kind: CastKind::Check,
                value: Box::new(value),
                ty: wrapper,
            }
        } else {
            return Err(CompileError::resolution(
                position.clone(),
                format!("cannot cast {} to {}", self.table.name(source), to.name()),
            ));
        };
        self.invoke_named(cx, holder, &format!("{}Value", to.name()), Vec::new(), position)
    }

    fn lower_array(
        &mut self,
        cx: &mut MethodContext,
        array: &ArrayExp,
        expected: Option<TypeId>,
    ) -> Result<Value, CompileError> {
        let position = array.loc.position();
        let expected_component = match expected {
            Some(ty) if self.table.is_array(ty) => self.table.component_of(ty),
            _ => None,
        };
        let mut items = Vec::with_capacity(array.items.len());
        for item in &array.items {
            items.push(self.lower_expr(cx, item, expected_component)?);
        }
        let component = match expected_component {
            Some(component) => component,
            None => self.common_type(&items, position)?,
        };
        let mut elements = Vec::with_capacity(items.len());
        for item in items {
            elements.push(self.convert(item, component, position)?);
        }
        let ty = self.table.array_of(component, 1);
        let (element, dims) = match self.table.get(ty) {
            TypeDef::Array { element, dims } => (*element, *dims),
            _ => (component, 1),
        };
        Ok(Value::Array(Box::new(ArrayValue {
            ty,
            element,
            dims,
            elements,
        })))
    }

    /// Element type of an array literal without an expected type: the
    /// shared type of every item, the widest numeric type when all items
    /// are numeric, and `java.lang.Object` otherwise.
    fn common_type(&mut self, items: &[Value], position: &Position) -> Result<TypeId, CompileError> {
        let types: Vec<TypeId> = items.iter().map(Value::ty).collect();
        match types.first() {
            Some(&first) if first != TypeId::NULL && first != TypeId::VOID && types.iter().all(|&t| t == first) => {
                return Ok(first);
            }
            None => return self.object_type(position),
            Some(_) => {}
        }
        let primitives: Option<Vec<Primitive>> = types.iter().map(|&t| Primitive::from_id(t)).collect();
        if let Some(primitives) = primitives {
            if let Some(widest) = primitives
                .iter()
                .copied()
                .find(|&candidate| primitives.iter().all(|p| p.widens_to(candidate)))
            {
                return Ok(widest.id());
            }
            if let Some(promoted) = primitives.iter().try_fold(Primitive::Int, |acc, p| acc.promote(*p)) {
                return Ok(promoted.id());
            }
        }
        self.object_type(position)
    }

    /// `{k: v}`: a fresh `java.util.LinkedHashMap` filled with `put` calls.
    fn lower_map(&mut self, cx: &mut MethodContext, map: &MapExp) -> Result<Value, CompileError> {
        let position = map.loc.position();
        let map_ty = self.require_type("java.util.LinkedHashMap", position)?;
        let object = self.object_type(position)?;
        let saved = cx.begin_pack();
        let created = self.construct(cx, map_ty, &[], position)?;
        let holder = cx.temp(map_ty);
        cx.emit(Instruction::Store {
            var: holder,
            value: created,
        });
        for (key, value) in &map.entries {
            let key = self.lower_expr(cx, key, None)?;
            let key = self.convert(key, object, position)?;
            let value = self.lower_expr(cx, value, None)?;
            let value = self.convert(value, object, position)?;
            let target = Value::Load { var: holder, ty: map_ty };
            let put = self.invoke_named(cx, target, "put", vec![key, value], position)?;
            cx.emit(Instruction::Eval(put));
        }
        let instructions = cx.end_pack(saved);
        Ok(Value::Pack(Box::new(ValuePack {
            instructions,
            result: Value::Load { var: holder, ty: map_ty },
        })))
    }

    /// Lower a lambda into a synthetic method of the enclosing class.
    ///
    /// The method's leading parameters are seeded from every variable
    /// visible at the lambda; its remaining parameters follow the
    /// functional method being implemented: the expected functional
    /// interface, or `FunctionN` when there is none.
    pub(super) fn lower_lambda(
        &mut self,
        cx: &mut MethodContext,
        lambda: &Lambda,
        expected: Option<TypeId>,
    ) -> Result<Value, CompileError> {
        let position = lambda.loc.position();
        let arity = lambda.params.len();
        let interface = match expected.filter(|&t| self.functional_method(t).is_some()) {
            Some(interface) => interface,
            None => {
                if arity > FUNCTION_ARITY {
                    return Err(CompileError::resolution(
                        position.clone(),
                        format!("lambdas take at most {FUNCTION_ARITY} parameters"),
                    ));
                }
                self.require_type(&format!("{FUNCTION_PACKAGE}.Function{arity}"), position)?
            }
        };
        let Some(implements) = self.functional_method(interface) else {
            return Err(CompileError::resolution(
                position.clone(),
                format!("{} is not a functional interface", self.table.name(interface)),
            ));
        };
        let Some(abstract_method) = self.table.method(implements).cloned() else {
            return Ok(Value::Null);
        };
        if abstract_method.params.len() != arity {
            return Err(CompileError::resolution(
                position.clone(),
                format!(
                    "lambda takes {arity} parameters but {}.{} takes {}",
                    self.table.name(interface),
                    abstract_method.name,
                    abstract_method.params.len()
                ),
            ));
        }

        let owner = cx.owner();
        let is_static = cx.is_static();
        let visible = cx.visible();
        let lambda_count = self
            .table
            .object(owner)
            .map_or(0, |o| o.methods.iter().filter(|m| m.name.starts_with("lambda$")).count());
        let mut info = MethodInfo::new(
            format!("lambda${}${lambda_count}", cx.lambda_stem),
            abstract_method.return_type,
            position.clone(),
        );
        info.modifiers = if is_static {
            Modifiers::PRIVATE | Modifiers::STATIC
        } else {
            Modifiers::PRIVATE
        };
        info.synthetic = true;
        for (name, var) in &visible {
            let (ty, can_change) = cx.left_value(*var).map_or((TypeId::VOID, false), |v| (v.ty, v.can_change));
            let mut param = LeftValue::new(name.clone(), ty, can_change, position.clone());
            param.captured = true;
            param.origin = Some(*var);
            param.already_assigned = true;
            info.params.push(param);
        }
        for (def, declared) in lambda.params.iter().zip(&abstract_method.params) {
            let def_position = def.loc.position();
            if visible.iter().any(|(name, _)| *name == def.name) {
                return Err(CompileError::resolution(
                    def_position.clone(),
                    format!("variable {} is already defined", def.name),
                ));
            }
            if let Some(spec) = &def.ty {
                let written = self.resolve_type_spec(cx.file, spec)?;
                if written != declared.ty {
                    return Err(CompileError::resolution(
                        def_position.clone(),
                        format!(
                            "lambda parameter {} must be {}",
                            def.name,
                            self.table.name(declared.ty)
                        ),
                    ));
                }
            }
            let can_change = !def.modifiers.contains(Modifiers::VAL);
            info.params.push(LeftValue::new(def.name.clone(), declared.ty, can_change, def_position.clone()));
        }

        let method = self.reserve_method(owner, info.clone());
        let parent = cx.current();
        let frame = cx.push_frame(Frame::new(info, method));
        for (index, (name, var)) in visible.iter().enumerate() {
            let param = crate::id::to_u32(index);
            cx.tracker.record_origin(frame, param, *var);
            cx.bind(name, Var::Param(param));
        }
        self.open_params(cx);
        let lowered = self.lower_lambda_body(cx, &lambda.body, position);
        cx.pop_frame();
        lowered?;

        let used: Vec<Var> = cx.frames[frame].method.params[..visible.len()]
            .iter()
            .filter(|p| p.used)
            .filter_map(|p| p.origin)
            .collect();
        for origin in used {
            cx.tracker.mark_captured(parent, origin);
            if let Some(value) = cx.left_value_mut(origin) {
                value.used = true;
            }
        }
        tracing::trace!(lambda = ?method, captured = visible.len(), "lowered lambda");
        Ok(Value::Lambda(Box::new(LambdaValue {
            method,
            implements,
            captured: visible.into_iter().map(|(_, var)| var).collect(),
            this: (!is_static).then_some(Value::This { ty: owner }),
            ty: interface,
        })))
    }

    /// A non-void lambda returns its last expression statement.
    fn lower_lambda_body(&mut self, cx: &mut MethodContext, body: &[Stmt], position: &Position) -> Result<(), CompileError> {
        let return_type = cx.return_type();
        if return_type != TypeId::VOID {
            if let Some((Stmt::Expr(last), init)) = body.split_last() {
                if !matches!(last, Expr::Assignment(_) | Expr::VariableDef(_)) {
                    cx.push_scope();
                    for stmt in init {
                        self.lower_stmt(cx, stmt)?;
                    }
                    let value = self.lower_expr(cx, last, Some(return_type))?;
                    if value.ty() == TypeId::VOID && self.table.is_reference(return_type) {
                        cx.emit(Instruction::Eval(value));
                        cx.emit(Instruction::Return(Some(Value::Null)));
                    } else {
                        let value = self.convert(value, return_type, last.loc().position())?;
                        cx.emit(Instruction::Return(Some(value)));
                    }
                    cx.pop_scope();
                    return Ok(());
                }
            }
        }
        self.lower_block(cx, body)?;
        if super::stmt::terminates(body) {
            return Ok(());
        }
        if return_type == TypeId::VOID {
            cx.emit(Instruction::Return(None));
        } else if self.table.is_reference(return_type) {
            cx.emit(Instruction::Return(Some(Value::Null)));
        } else {
            return Err(CompileError::resolution(
                position.clone(),
                "missing return value in lambda",
            ));
        }
        Ok(())
    }

    /// Append a placeholder for a synthetic method to `owner`; the lowered
    /// method replaces it when its group is closed.
    fn reserve_method(&mut self, owner: TypeId, info: MethodInfo) -> MethodRef {
        let index = match self.table.object_mut(owner) {
            Some(object) => {
                object.methods.push(info);
                object.methods.len() - 1
            }
            None => 0,
        };
        MethodRef {
            owner,
            kind: MethodKind::Method,
            index: crate::id::to_u32(index),
        }
    }
}
