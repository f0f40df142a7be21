//! Type definitions: registration, super types, members and annotations.

use lt_diagnostic::CompileError;
use lt_ir::ast::{
    Access, Anno, ClassDef, FunDef, InterfaceDef, Invocation, MethodDef, New, ObjectDef, StaticScope,
    VariableDef,
};
use lt_ir::{Expr, Modifiers, Position, Stmt, UnaryOp};

use super::body::PendingBody;
use super::scope::{public_unless_restricted, qualify};
use super::stmt::{has_valued_return, reassignment};
use super::{DefNode, Definition, Resolver};
use crate::annotation::{query_annotation_targets, query_retention, Retention, TargetSet};
use crate::classpath::{FUNCTION_ARITY, FUNCTION_PACKAGE};
use crate::{
    AnnoInfo, ArrayValue, Constant, FieldInfo, LeftValue, MethodInfo, MethodKind, MethodRef,
    ObjectType, Primitive, TypeDef, TypeId, TypeOrigin, Value,
};

const ANNOTATION: &str = "java.lang.annotation.Annotation";

/// Static field holding the one instance of an `object`.
const SINGLETON_FIELD: &str = "singletonInstance";

/// Members of a class or interface body, sorted by where they end up.
#[derive(Default)]
struct Members {
    /// Statements of the primary constructor, field initializers included.
    instance: Vec<Stmt>,
    /// Statements of `<clinit>`.
    statics: Vec<Stmt>,
}

/// Parameter list of a method or primary constructor.
struct Params {
    values: Vec<LeftValue>,
    /// Default expressions of the trailing parameters that have one.
    defaults: Vec<Expr>,
}

impl Resolver<'_> {
    pub(super) fn register(&mut self, file: usize, node: &DefNode) -> Result<TypeId, CompileError> {
        let (name, modifiers, position) = match node {
            DefNode::Class(def) => (&def.name, def.modifiers, def.loc.position()),
            DefNode::Object(def) => (&def.name, def.modifiers, def.loc.position()),
            DefNode::Fun(def) => (&def.name, Modifiers::empty(), def.loc.position()),
            DefNode::Interface(def) => (&def.name, def.modifiers, def.loc.position()),
            DefNode::Annotation(def) => (&def.name, def.modifiers, def.loc.position()),
        };
        let full = qualify(&self.files[file].imports.package, name);
        if self.table.lookup(&full).is_some() {
            return Err(CompileError::resolution(
                position.clone(),
                format!("duplicate type {full}"),
            ));
        }
        let mut object = ObjectType::new(full.clone(), TypeOrigin::Source(position.clone()));
        object.modifiers = public_unless_restricted(modifiers);
        let def = match node {
            DefNode::Class(_) => TypeDef::Class(object),
            DefNode::Object(_) | DefNode::Fun(_) => {
                object.modifiers |= Modifiers::VAL;
                TypeDef::Class(object)
            }
            DefNode::Interface(_) => {
                object.modifiers |= Modifiers::ABSTRACT;
                TypeDef::Interface(object)
            }
            DefNode::Annotation(_) => {
                object.modifiers |= Modifiers::ABSTRACT;
                TypeDef::Annotation(object)
            }
        };
        let id = self.table.declare(def);
        tracing::trace!(name = %full, ?id, "registered type");
        Ok(id)
    }

    pub(super) fn resolve_supers(&mut self, definition: &Definition) -> Result<(), CompileError> {
        let file = definition.file;
        let id = definition.id;
        let (super_class, interfaces) = match &definition.node {
            DefNode::Class(def) => {
                self.class_supers(file, id, def.super_invocation.as_ref(), &def.super_types, def.loc.position())?
            }
            DefNode::Object(def) => {
                self.class_supers(file, id, def.super_invocation.as_ref(), &def.super_types, def.loc.position())?
            }
            DefNode::Fun(def) => {
                let functional = self.fun_parent(file, def)?;
                (Some(self.object_type(def.loc.position())?), vec![functional])
            }
            DefNode::Interface(def) => {
                let mut interfaces = Vec::with_capacity(def.super_interfaces.len());
                for spec in &def.super_interfaces {
                    let parent = self.resolve_type_spec(file, spec)?;
                    if !matches!(self.table.get(parent), TypeDef::Interface(_)) {
                        return Err(CompileError::resolution(
                            spec.loc.position().clone(),
                            format!(
                                "interface {} can only extend interfaces, not {}",
                                self.table.name(id),
                                self.table.name(parent)
                            ),
                        ));
                    }
                    self.push_interface(&mut interfaces, parent, spec.loc.position())?;
                }
                (None, interfaces)
            }
            DefNode::Annotation(def) => {
                let annotation = self.require_type(ANNOTATION, def.loc.position())?;
                (None, vec![annotation])
            }
        };
        if let Some(object) = self.table.object_mut(id) {
            object.super_class = super_class;
            object.interfaces = interfaces;
        }
        Ok(())
    }

    /// Super class (written with constructor arguments, or the one class
    /// among the plain parents) and interfaces of a class or object.
    fn class_supers(
        &mut self,
        file: usize,
        id: TypeId,
        super_invocation: Option<&Invocation>,
        super_types: &[Access],
        position: &Position,
    ) -> Result<(Option<TypeId>, Vec<TypeId>), CompileError> {
        let mut super_class = None;
        if let Some(invocation) = super_invocation {
            let parent = self.resolve_type_spec(file, &invocation.target)?;
            self.check_extensible(id, parent, invocation.loc.position())?;
            super_class = Some(parent);
        }
        let mut interfaces = Vec::new();
        for spec in super_types {
            let position = spec.loc.position();
            let parent = self.resolve_type_spec(file, spec)?;
            match self.table.get(parent) {
                TypeDef::Interface(_) | TypeDef::Annotation(_) => {
                    self.push_interface(&mut interfaces, parent, position)?;
                }
                TypeDef::Class(_) => {
                    if super_class.is_some() {
                        return Err(CompileError::resolution(
                            position.clone(),
                            format!("class {} cannot extend more than one class", self.table.name(id)),
                        ));
                    }
                    self.check_extensible(id, parent, position)?;
                    super_class = Some(parent);
                }
                _ => {
                    return Err(CompileError::resolution(
                        position.clone(),
                        format!("cannot inherit from {}", self.table.name(parent)),
                    ));
                }
            }
        }
        let super_class = match super_class {
            Some(parent) => parent,
            None => self.object_type(position)?,
        };
        Ok((Some(super_class), interfaces))
    }

    /// The interface a `fun` implements: the written one, or `FunctionN`
    /// for N parameters.
    fn fun_parent(&mut self, file: usize, def: &FunDef) -> Result<TypeId, CompileError> {
        let position = def.loc.position();
        let parent = match &def.super_type {
            Some(spec) => self.resolve_type_spec(file, spec)?,
            None => {
                let arity = def.params.len();
                if arity > FUNCTION_ARITY {
                    return Err(CompileError::resolution(
                        position.clone(),
                        format!("functions take at most {FUNCTION_ARITY} parameters"),
                    ));
                }
                self.require_type(&format!("{FUNCTION_PACKAGE}.Function{arity}"), position)?
            }
        };
        if !matches!(self.table.get(parent), TypeDef::Interface(_)) {
            return Err(CompileError::resolution(
                position.clone(),
                format!(
                    "fun {} must implement a functional interface, not {}",
                    def.name,
                    self.table.name(parent)
                ),
            ));
        }
        Ok(parent)
    }

    fn check_extensible(&self, id: TypeId, parent: TypeId, position: &Position) -> Result<(), CompileError> {
        let message = match self.table.get(parent) {
            TypeDef::Class(object) if object.is_final() => {
                format!("class {} cannot extend final class {}", self.table.name(id), object.name)
            }
            TypeDef::Class(_) => return Ok(()),
            _ => format!(
                "class {} cannot extend {}, which is not a class",
                self.table.name(id),
                self.table.name(parent)
            ),
        };
        Err(CompileError::resolution(position.clone(), message))
    }

    fn push_interface(&self, interfaces: &mut Vec<TypeId>, parent: TypeId, position: &Position) -> Result<(), CompileError> {
        if interfaces.contains(&parent) {
            return Err(CompileError::resolution(
                position.clone(),
                format!("{} is inherited twice", self.table.name(parent)),
            ));
        }
        interfaces.push(parent);
        Ok(())
    }

    /// Elements and meta-annotations of an annotation defined by the unit.
    pub(super) fn declare_annotation_meta(&mut self, definition: &Definition) -> Result<(), CompileError> {
        let DefNode::Annotation(def) = &definition.node else {
            return Ok(());
        };
        let (file, id) = (definition.file, definition.id);
        let mut elements: Vec<MethodInfo> = Vec::with_capacity(def.elements.len());
        for element in &def.elements {
            let position = element.loc.position();
            if elements.iter().any(|e| e.name == element.name) {
                return Err(CompileError::resolution(
                    position.clone(),
                    format!("duplicate element {} in annotation {}", element.name, def.name),
                ));
            }
            let Some(spec) = &element.ty else {
                return Err(CompileError::resolution(
                    position.clone(),
                    format!("annotation element {} needs a type", element.name),
                ));
            };
            let ty = self.resolve_type_spec(file, spec)?;
            if !self.is_element_type(ty) {
                return Err(CompileError::resolution(
                    position.clone(),
                    format!("{} cannot be the type of an annotation element", self.table.name(ty)),
                ));
            }
            let mut info = MethodInfo::new(element.name.clone(), ty, position.clone());
            info.modifiers = Modifiers::PUBLIC | Modifiers::ABSTRACT;
            info.default = match element.init.as_deref() {
                Some(init) => Some(self.annotation_value(file, init, ty)?),
                None => None,
            };
            elements.push(info);
        }
        if let Some(object) = self.table.object_mut(id) {
            object.methods = elements;
        }
        let annos = self.annotations(file, &def.annos, TargetSet::TYPE | TargetSet::ANNOTATION_TYPE)?;
        if let Some(object) = self.table.object_mut(id) {
            object.annos = annos;
        }
        Ok(())
    }

    /// Primitives, `String`, `Class`, enums, and one-dimensional arrays of
    /// those.
    fn is_element_type(&self, ty: TypeId) -> bool {
        let base = match self.table.get(ty) {
            TypeDef::Array { element, dims: 1 } => *element,
            TypeDef::Array { .. } => return false,
            _ => ty,
        };
        if Primitive::from_id(base).is_some() {
            return true;
        }
        self.table.object(base).is_some_and(|o| {
            o.is_enum || o.name == "java.lang.String" || o.name == "java.lang.Class"
        })
    }

    pub(super) fn declare_members(&mut self, definition: Definition) -> Result<(), CompileError> {
        let Definition { id, file, node } = definition;
        match node {
            DefNode::Class(def) => self.declare_class(id, file, def).map(drop),
            DefNode::Object(def) => self.declare_object(id, file, def),
            DefNode::Fun(def) => self.declare_fun(id, file, def),
            DefNode::Interface(def) => self.declare_interface(id, file, def),
            DefNode::Annotation(_) => Ok(()),
        }
    }

    /// Members of a class; returns its primary constructor.
    fn declare_class(&mut self, id: TypeId, file: usize, def: ClassDef) -> Result<MethodRef, CompileError> {
        let position = def.loc.position().clone();
        let annos = self.annotations(file, &def.annos, TargetSet::TYPE)?;
        if let Some(object) = self.table.object_mut(id) {
            object.annos = annos;
        }

        let params = self.params(file, &def.params, TargetSet::FIELD | TargetSet::PARAMETER)?;
        for (param, written) in params.values.iter().zip(&def.params) {
            let mut modifiers = public_unless_restricted(written.modifiers);
            if !param.can_change {
                modifiers |= Modifiers::VAL;
            }
            let field = FieldInfo {
                name: param.name.clone(),
                ty: param.ty,
                modifiers,
                annos: self.annotations(file, &written.annos, TargetSet::FIELD | TargetSet::PARAMETER)?,
                position: param.position.clone(),
            };
            self.add_field(id, field)?;
        }

        let is_abstract = self.table.object(id).is_some_and(ObjectType::is_abstract);
        let mut members = Members::default();
        for stmt in def.body {
            self.declare_class_member(id, file, stmt, false, is_abstract, &mut members)?;
        }

        let mut constructor = MethodInfo::new("<init>", TypeId::VOID, position.clone());
        constructor.modifiers = Modifiers::PUBLIC;
        constructor.params = params.values;
        let full = self.push_method(id, MethodKind::Constructor, constructor)?;
        let super_call = def
            .super_invocation
            .map(|invocation| (invocation.args, invocation.loc.position().clone()));
        self.pending.push(PendingBody::Constructor {
            method: full,
            file,
            super_call,
            body: members.instance,
        });
        self.forward_defaults(full, file, params.defaults)?;
        self.declare_static_init(id, file, members.statics, &position)?;
        Ok(full)
    }

    /// An object is a final class with a private constructor. Its one
    /// instance is created last in `<clinit>` and kept in a static field.
    fn declare_object(&mut self, id: TypeId, file: usize, def: ObjectDef) -> Result<(), CompileError> {
        if def.modifiers.contains(Modifiers::ABSTRACT) {
            return Err(CompileError::resolution(
                def.loc.position().clone(),
                format!("object {} cannot be abstract", def.name),
            ));
        }
        let ty = Access {
            loc: def.loc.clone(),
            ..Access::name(&def.name)
        };
        let instance = VariableDef {
            modifiers: Modifiers::VAL,
            ty: Some(ty.clone()),
            init: Some(Box::new(Expr::New(New {
                ty,
                args: Vec::new(),
                loc: def.loc.clone(),
            }))),
            loc: def.loc.clone(),
            ..VariableDef::new(SINGLETON_FIELD)
        };
        let mut body = def.body;
        body.push(Stmt::StaticScope(StaticScope {
            body: vec![Stmt::Expr(Expr::VariableDef(instance))],
            loc: def.loc.clone(),
        }));
        let class = ClassDef {
            name: def.name,
            modifiers: def.modifiers,
            annos: def.annos,
            params: Vec::new(),
            super_invocation: def.super_invocation,
            super_types: def.super_types,
            body,
            loc: def.loc,
        };
        let constructor = self.declare_class(id, file, class)?;
        if let Some(info) = self.table.method_mut(constructor) {
            info.modifiers = Modifiers::PRIVATE;
        }
        Ok(())
    }

    /// A `fun` is a final class with a no-argument constructor whose one
    /// method implements the functional method of its interface.
    fn declare_fun(&mut self, id: TypeId, file: usize, def: FunDef) -> Result<(), CompileError> {
        let position = def.loc.position().clone();
        let annos = self.annotations(file, &def.annos, TargetSet::TYPE)?;
        if let Some(object) = self.table.object_mut(id) {
            object.annos = annos;
        }
        let implemented = self
            .table
            .object(id)
            .and_then(|o| o.interfaces.first().copied())
            .and_then(|interface| self.functional_method(interface).map(|m| (interface, m)));
        let Some((interface, implements)) = implemented else {
            return Err(CompileError::resolution(
                position,
                format!("fun {} must implement a functional interface", def.name),
            ));
        };
        let Some(abstract_method) = self.table.method(implements).cloned() else {
            return Ok(());
        };
        if abstract_method.params.len() != def.params.len() {
            return Err(CompileError::resolution(
                position,
                format!(
                    "fun {} takes {} parameters but {}.{} takes {}",
                    def.name,
                    def.params.len(),
                    self.table.name(interface),
                    abstract_method.name,
                    abstract_method.params.len()
                ),
            ));
        }

        let mut params: Vec<LeftValue> = Vec::with_capacity(def.params.len());
        for (written, declared) in def.params.iter().zip(&abstract_method.params) {
            let at = written.loc.position();
            let problem = if params.iter().any(|p| p.name == written.name) {
                Some(format!("duplicate parameter {}", written.name))
            } else if written.init.is_some() {
                Some(format!("parameter {} of fun {} cannot have a default", written.name, def.name))
            } else {
                None
            };
            if let Some(problem) = problem {
                return Err(CompileError::resolution(at.clone(), problem));
            }
            if let Some(spec) = &written.ty {
                if self.resolve_type_spec(file, spec)? != declared.ty {
                    return Err(CompileError::resolution(
                        at.clone(),
                        format!("parameter {} must be {}", written.name, self.table.name(declared.ty)),
                    ));
                }
            }
            self.annotations(file, &written.annos, TargetSet::PARAMETER)?;
            let can_change = !written.modifiers.contains(Modifiers::VAL);
            let mut value = LeftValue::new(written.name.clone(), declared.ty, can_change, at.clone());
            value.already_assigned = true;
            params.push(value);
        }

        let mut info = MethodInfo::new(abstract_method.name, abstract_method.return_type, position.clone());
        info.modifiers = Modifiers::PUBLIC;
        info.params = params;
        let method = self.push_method(id, MethodKind::Method, info)?;
        self.pending.push(PendingBody::Method {
            method,
            file,
            body: def.body,
        });

        let mut constructor = MethodInfo::new("<init>", TypeId::VOID, position);
        constructor.modifiers = Modifiers::PUBLIC;
        let constructor = self.push_method(id, MethodKind::Constructor, constructor)?;
        self.pending.push(PendingBody::Constructor {
            method: constructor,
            file,
            super_call: None,
            body: Vec::new(),
        });
        tracing::trace!(name = %self.table.name(id), ?interface, "declared fun");
        Ok(())
    }

    /// Sort one statement of a class body (or of a `static` scope in it).
    fn declare_class_member(
        &mut self,
        id: TypeId,
        file: usize,
        stmt: Stmt,
        in_static: bool,
        is_abstract: bool,
        members: &mut Members,
    ) -> Result<(), CompileError> {
        let position = stmt.loc().position().clone();
        match stmt {
            Stmt::Expr(Expr::VariableDef(def)) if self.redefines_field(id, &def) => {
                let assignment = Stmt::Expr(Expr::Assignment(reassignment(&def)));
                if in_static {
                    members.statics.push(assignment);
                } else {
                    members.instance.push(assignment);
                }
            }
            Stmt::Expr(Expr::VariableDef(def)) => {
                let mut modifiers = public_unless_restricted(def.modifiers);
                if in_static {
                    modifiers |= Modifiers::STATIC;
                }
                let field = FieldInfo {
                    name: def.name.clone(),
                    ty: self.field_type(file, &def)?,
                    modifiers,
                    annos: self.annotations(file, &def.annos, TargetSet::FIELD)?,
                    position,
                };
                self.add_field(id, field)?;
                let init = Stmt::Expr(Expr::VariableDef(def));
                if in_static {
                    members.statics.push(init);
                } else {
                    members.instance.push(init);
                }
            }
            Stmt::MethodDef(def) => self.declare_method(id, file, def, in_static, is_abstract, false)?,
            Stmt::StaticScope(scope) => {
                if in_static {
                    return Err(CompileError::resolution(position, "static scopes cannot be nested"));
                }
                for inner in scope.body {
                    self.declare_class_member(id, file, inner, true, is_abstract, members)?;
                }
            }
            Stmt::ClassDef(_)
            | Stmt::InterfaceDef(_)
            | Stmt::AnnotationDef(_)
            | Stmt::ObjectDef(_)
            | Stmt::FunDef(_) => {
                return Err(CompileError::resolution(
                    position,
                    "type definitions are only allowed at top level",
                ));
            }
            Stmt::Import(_) | Stmt::PackageDeclare(_) => {
                return Err(CompileError::resolution(
                    position,
                    "package and import statements are only allowed at top level",
                ));
            }
            other if in_static => members.statics.push(other),
            other => members.instance.push(other),
        }
        Ok(())
    }

    fn redefines_field(&self, id: TypeId, def: &VariableDef) -> bool {
        def.ty.is_none()
            && def.modifiers.is_empty()
            && def.annos.is_empty()
            && def.init.is_some()
            && self.find_field(id, &def.name).is_some()
    }

    fn declare_interface(&mut self, id: TypeId, file: usize, def: InterfaceDef) -> Result<(), CompileError> {
        let position = def.loc.position().clone();
        let annos = self.annotations(file, &def.annos, TargetSet::TYPE)?;
        if let Some(object) = self.table.object_mut(id) {
            object.annos = annos;
        }
        let mut constants = Vec::new();
        for stmt in def.body {
            self.declare_interface_member(id, file, stmt, false, &mut constants)?;
        }
        self.declare_static_init(id, file, constants, &position)
    }

    fn declare_interface_member(
        &mut self,
        id: TypeId,
        file: usize,
        stmt: Stmt,
        in_static: bool,
        constants: &mut Vec<Stmt>,
    ) -> Result<(), CompileError> {
        let position = stmt.loc().position().clone();
        match stmt {
            Stmt::Expr(Expr::VariableDef(def)) => {
                if def.init.is_none() {
                    return Err(CompileError::resolution(
                        position,
                        format!("interface constant {} needs a value", def.name),
                    ));
                }
                let field = FieldInfo {
                    name: def.name.clone(),
                    ty: self.field_type(file, &def)?,
                    modifiers: Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::VAL,
                    annos: self.annotations(file, &def.annos, TargetSet::FIELD)?,
                    position,
                };
                self.add_field(id, field)?;
                constants.push(Stmt::Expr(Expr::VariableDef(def)));
            }
            Stmt::MethodDef(def) => self.declare_method(id, file, def, in_static, true, true)?,
            Stmt::StaticScope(scope) if !in_static => {
                for inner in scope.body {
                    self.declare_interface_member(id, file, inner, true, constants)?;
                }
            }
            Stmt::Pass(_) => {}
            _ => {
                return Err(CompileError::resolution(
                    position,
                    "interfaces can only contain constants and methods",
                ));
            }
        }
        Ok(())
    }

    /// `<clinit>` for static field initializers and static statements.
    fn declare_static_init(
        &mut self,
        id: TypeId,
        file: usize,
        body: Vec<Stmt>,
        position: &Position,
    ) -> Result<(), CompileError> {
        if body.is_empty() {
            return Ok(());
        }
        let mut info = MethodInfo::new("<clinit>", TypeId::VOID, position.clone());
        info.modifiers = Modifiers::STATIC;
        info.synthetic = true;
        let method = self.push_method(id, MethodKind::Method, info)?;
        self.pending.push(PendingBody::StaticInit { method, file, body });
        Ok(())
    }

    /// Declared type of a field; without one, the type of a literal
    /// initializer, and `java.lang.Object` otherwise.
    fn field_type(&mut self, file: usize, def: &VariableDef) -> Result<TypeId, CompileError> {
        if let Some(spec) = &def.ty {
            let ty = self.resolve_type_spec(file, spec)?;
            if ty == TypeId::VOID {
                return Err(CompileError::resolution(
                    def.loc.position().clone(),
                    format!("field {} cannot be void", def.name),
                ));
            }
            return Ok(ty);
        }
        let position = def.loc.position();
        match def.init.as_deref() {
            Some(Expr::Number(literal)) => match Constant::parse_number(&literal.text) {
                Some(constant) => Ok(constant.ty()),
                None => Err(CompileError::syntax(position.clone(), format!("malformed number {}", literal.text))),
            },
            Some(Expr::Bool(_)) => Ok(TypeId::BOOL),
            Some(Expr::Str(_)) => self.require_type("java.lang.String", position),
            _ => self.object_type(position),
        }
    }

    fn add_field(&mut self, id: TypeId, field: FieldInfo) -> Result<(), CompileError> {
        let Some(object) = self.table.object_mut(id) else {
            return Ok(());
        };
        if object.fields.iter().any(|f| f.name == field.name) {
            let message = format!("duplicate field {} in {}", field.name, object.name);
            return Err(CompileError::resolution(field.position, message));
        }
        object.fields.push(field);
        Ok(())
    }

    /// Parameters with their types and trailing defaults.
    fn params(&mut self, file: usize, defs: &[VariableDef], target: TargetSet) -> Result<Params, CompileError> {
        let mut values: Vec<LeftValue> = Vec::with_capacity(defs.len());
        let mut defaults = Vec::new();
        for def in defs {
            let position = def.loc.position();
            if values.iter().any(|v| v.name == def.name) {
                return Err(CompileError::resolution(
                    position.clone(),
                    format!("duplicate parameter {}", def.name),
                ));
            }
            self.annotations(file, &def.annos, target)?;
            let ty = match &def.ty {
                Some(spec) => self.resolve_type_spec(file, spec)?,
                None => self.object_type(position)?,
            };
            if ty == TypeId::VOID {
                return Err(CompileError::resolution(
                    position.clone(),
                    format!("parameter {} cannot be void", def.name),
                ));
            }
            match def.init.as_deref() {
                Some(default) => defaults.push(default.clone()),
                None if !defaults.is_empty() => {
                    return Err(CompileError::resolution(
                        position.clone(),
                        format!("parameter {} without a default follows one with a default", def.name),
                    ));
                }
                None => {}
            }
            let can_change = !def.modifiers.contains(Modifiers::VAL);
            let mut value = LeftValue::new(def.name.clone(), ty, can_change, position.clone());
            value.already_assigned = true;
            values.push(value);
        }
        Ok(Params { values, defaults })
    }

    fn declare_method(
        &mut self,
        id: TypeId,
        file: usize,
        def: MethodDef,
        in_static: bool,
        abstract_allowed: bool,
        in_interface: bool,
    ) -> Result<(), CompileError> {
        let position = def.loc.position().clone();
        let params = self.params(file, &def.params, TargetSet::PARAMETER)?;
        let return_type = match &def.return_type {
            Some(spec) => self.resolve_type_spec(file, spec)?,
            None if has_valued_return(&def.body) => self.object_type(&position)?,
            None => TypeId::VOID,
        };
        let mut modifiers = public_unless_restricted(def.modifiers);
        if in_static {
            modifiers |= Modifiers::STATIC;
        }
        if in_interface && def.body.is_empty() && !in_static {
            modifiers |= Modifiers::ABSTRACT;
        }
        if modifiers.contains(Modifiers::ABSTRACT) {
            let problem = if !abstract_allowed {
                Some("is abstract but its class is not")
            } else if !def.body.is_empty() {
                Some("is abstract but has a body")
            } else if in_static {
                Some("cannot be both abstract and static")
            } else {
                None
            };
            if let Some(problem) = problem {
                return Err(CompileError::resolution(
                    position,
                    format!("method {} {problem}", def.name),
                ));
            }
        }
        let mut info = MethodInfo::new(def.name.clone(), return_type, position);
        info.modifiers = modifiers;
        info.params = params.values;
        info.annos = self.annotations(file, &def.annos, TargetSet::METHOD)?;
        let is_abstract = info.is_abstract();
        let method = self.push_method(id, MethodKind::Method, info)?;
        if !is_abstract {
            self.pending.push(PendingBody::Method {
                method,
                file,
                body: def.body,
            });
        }
        self.forward_defaults(method, file, params.defaults)
    }

    /// One shorter overload per trailing default, each calling `full`.
    fn forward_defaults(&mut self, full: MethodRef, file: usize, defaults: Vec<Expr>) -> Result<(), CompileError> {
        let Some(info) = self.table.method(full).cloned() else {
            return Ok(());
        };
        let required = info.params.len() - defaults.len();
        for given in (required..info.params.len()).rev() {
            let mut forward = MethodInfo::new(info.name.clone(), info.return_type, info.position.clone());
            forward.modifiers = info.modifiers - Modifiers::ABSTRACT;
            forward.params = info.params[..given].to_vec();
            let method = self.push_method(full.owner, full.kind, forward)?;
            self.pending.push(PendingBody::Forward {
                method,
                file,
                target: full,
                defaults: defaults[given - required..].to_vec(),
            });
        }
        Ok(())
    }

    /// Append a method or constructor, rejecting a second one with the same
    /// name and parameter types.
    fn push_method(&mut self, owner: TypeId, kind: MethodKind, info: MethodInfo) -> Result<MethodRef, CompileError> {
        let signature = info.param_types();
        let type_name = self.table.name(owner);
        let Some(object) = self.table.object_mut(owner) else {
            return Err(CompileError::resolution(info.position, format!("{type_name} cannot have members")));
        };
        let list = match kind {
            MethodKind::Method => &mut object.methods,
            MethodKind::Constructor => &mut object.constructors,
        };
        if list.iter().any(|m| m.name == info.name && m.param_types() == signature) {
            let message = format!("method {} is already defined in {type_name} with the same parameters", info.name);
            return Err(CompileError::resolution(info.position, message));
        }
        list.push(info);
        Ok(MethodRef {
            owner,
            kind,
            index: crate::id::to_u32(list.len() - 1),
        })
    }

    /// A concrete class must implement every abstract method it inherits.
    pub(super) fn check_implemented(&self, id: TypeId) -> Result<(), CompileError> {
        let Some(object) = self.table.object(id) else {
            return Ok(());
        };
        if !self.table.get(id).is_class() || object.is_abstract() {
            return Ok(());
        }
        let mut owners = vec![id];
        owners.extend(self.table.supertypes(id));
        for &owner in &owners[1..] {
            let Some(parent) = self.table.object(owner) else {
                continue;
            };
            for method in parent.methods.iter().filter(|m| m.is_abstract()) {
                let signature = method.param_types();
                let implemented = owners.iter().any(|&candidate| {
                    self.table.object(candidate).is_some_and(|o| {
                        o.methods.iter().any(|m| {
                            !m.is_abstract() && !m.is_static() && m.name == method.name && m.param_types() == signature
                        })
                    })
                });
                if !implemented {
                    let params: Vec<String> = signature.iter().map(|&t| self.table.name(t)).collect();
                    return Err(CompileError::resolution(
                        self.type_position(id),
                        format!(
                            "class {} must implement {}.{}({})",
                            self.table.name(id),
                            parent.name,
                            method.name,
                            params.join(", ")
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Check annotations placed on an element of kind `target` and return
    /// the ones kept on the definition. `SOURCE`-retained annotations are
    /// checked and then dropped.
    pub(super) fn annotations(&mut self, file: usize, annos: &[Anno], target: TargetSet) -> Result<Vec<AnnoInfo>, CompileError> {
        let mut kept = Vec::with_capacity(annos.len());
        let mut seen: Vec<TypeId> = Vec::with_capacity(annos.len());
        for anno in annos {
            let position = anno.loc.position();
            let ty = self.resolve_type_spec(file, &anno.anno_type)?;
            if !matches!(self.table.get(ty), TypeDef::Annotation(_)) {
                return Err(CompileError::resolution(
                    position.clone(),
                    format!("{} is not an annotation type", self.table.name(ty)),
                ));
            }
            if seen.contains(&ty) {
                return Err(CompileError::resolution(
                    position.clone(),
                    format!("duplicate annotation @{}", self.table.name(ty)),
                ));
            }
            seen.push(ty);
            if !query_annotation_targets(&self.table, ty).intersects(target) {
                return Err(CompileError::resolution(
                    position.clone(),
                    format!("annotation @{} is not applicable here", self.table.name(ty)),
                ));
            }
            let elements: Vec<(String, TypeId, bool)> = self
                .table
                .object(ty)
                .map(|o| {
                    o.methods
                        .iter()
                        .filter(|m| m.params.is_empty() && !m.is_static())
                        .map(|m| (m.name.clone(), m.return_type, m.default.is_some()))
                        .collect()
                })
                .unwrap_or_default();
            let mut args: Vec<(String, Value)> = Vec::with_capacity(anno.args.len());
            for arg in &anno.args {
                let Some((_, element_ty, _)) = elements.iter().find(|(name, _, _)| *name == arg.name) else {
                    return Err(CompileError::resolution(
                        position.clone(),
                        format!("annotation @{} has no element {}", self.table.name(ty), arg.name),
                    ));
                };
                if args.iter().any(|(name, _)| *name == arg.name) {
                    return Err(CompileError::resolution(
                        position.clone(),
                        format!("element {} is given twice", arg.name),
                    ));
                }
                let value = self.annotation_value(file, &arg.value, *element_ty)?;
                args.push((arg.name.clone(), value));
            }
            if let Some((missing, _, _)) = elements
                .iter()
                .find(|(name, _, has_default)| !has_default && !args.iter().any(|(given, _)| given == name))
            {
                return Err(CompileError::resolution(
                    position.clone(),
                    format!("annotation @{} is missing element {missing}", self.table.name(ty)),
                ));
            }
            if query_retention(&self.table, ty) == Retention::Source {
                tracing::trace!(annotation = %self.table.name(ty), "source retention, dropped");
                continue;
            }
            kept.push(AnnoInfo { ty, args });
        }
        Ok(kept)
    }

    /// Constant of type `expected` written as an annotation argument or
    /// element default.
    fn annotation_value(&mut self, file: usize, expr: &Expr, expected: TypeId) -> Result<Value, CompileError> {
        let position = expr.loc().position();
        let mismatch = |table: &crate::TypeTable| {
            CompileError::resolution(
                position.clone(),
                format!("annotation value must be a constant of type {}", table.name(expected)),
            )
        };
        if let TypeDef::Array { element, dims } = *self.table.get(expected) {
            let component = self.table.component_of(expected).unwrap_or(element);
            let items: Vec<&Expr> = match expr {
                Expr::Array(array) => array.items.iter().collect(),
                single => vec![single],
            };
            let mut elements = Vec::with_capacity(items.len());
            for item in items {
                elements.push(self.annotation_value(file, item, component)?);
            }
            return Ok(Value::Array(Box::new(ArrayValue {
                ty: expected,
                element,
                dims,
                elements,
            })));
        }
        if let Some(primitive) = Primitive::from_id(expected) {
            let constant = match expr {
                Expr::Number(literal) => Constant::parse_number(&literal.text),
                Expr::Unary(unary) if unary.op == UnaryOp::Neg => match unary.operand.as_ref() {
                    Expr::Number(literal) => Constant::parse_number(&format!("-{}", literal.text)),
                    _ => None,
                },
                Expr::Bool(literal) => Constant::parse_bool(&literal.text),
                Expr::Str(literal) if primitive == Primitive::Char => {
                    let mut units = literal.text.encode_utf16();
                    match (units.next(), units.next()) {
                        (Some(unit), None) => Some(Constant::Char(unit)),
                        _ => None,
                    }
                }
                _ => None,
            };
            return constant
                .and_then(|c| c.coerce(primitive))
                .map(Value::Const)
                .ok_or_else(|| mismatch(&self.table));
        }
        let Some((name, is_enum)) = self.table.object(expected).map(|o| (o.name.clone(), o.is_enum)) else {
            return Err(mismatch(&self.table));
        };
        match name.as_str() {
            "java.lang.String" => match expr {
                Expr::Str(literal) => Ok(Value::Str {
                    text: literal.text.clone(),
                    ty: expected,
                }),
                _ => Err(mismatch(&self.table)),
            },
            "java.lang.Class" => match expr {
                Expr::Access(spec) => Ok(Value::ClassLit {
                    target: self.resolve_type_spec(file, spec)?,
                    ty: expected,
                }),
                _ => Err(mismatch(&self.table)),
            },
            _ if is_enum => {
                let name = match expr {
                    Expr::Access(access) => match access.exp.as_deref() {
                        None => access.name.as_str(),
                        Some(Expr::Access(owner)) if self.resolve_type_spec(file, owner)? == expected => {
                            access.name.as_str()
                        }
                        Some(_) => return Err(mismatch(&self.table)),
                    },
                    _ => return Err(mismatch(&self.table)),
                };
                let known = self
                    .table
                    .object(expected)
                    .is_some_and(|o| o.fields.iter().any(|f| f.name == name && f.is_static()));
                if !known {
                    return Err(CompileError::resolution(
                        position.clone(),
                        format!("{} has no constant {name}", self.table.name(expected)),
                    ));
                }
                Ok(Value::EnumConst {
                    ty: expected,
                    name: name.to_owned(),
                })
            }
            _ => Err(mismatch(&self.table)),
        }
    }
}
