//! Type names: per-file import tables and on-demand classpath imports.

use lt_diagnostic::CompileError;
use lt_ir::ast::Access;
use lt_ir::{Expr, Modifiers, Position};

use super::Resolver;
use crate::classpath::{AnnotationValue, ClassKind, ClassSignature, MethodSignature};
use crate::{
    AnnoInfo, ArrayValue, FieldInfo, MethodInfo, ObjectType, Primitive, TypeDef, TypeId,
    TypeOrigin, Value, LeftValue,
};

/// Names visible in one file.
#[derive(Clone, Debug, Default)]
pub(crate) struct ImportTable {
    /// Package of the file, dotted; empty for the default package.
    pub package: String,
    /// `(simple name, qualified name, import position)` of single-type
    /// imports.
    pub types: Vec<(String, String, Position)>,
    /// Package imports followed by the configured auto imports.
    pub packages: Vec<String>,
}

pub(super) fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_owned()
    } else {
        format!("{package}.{name}")
    }
}

impl Resolver<'_> {
    /// Declared type with qualified `name`, importing it from the classpath
    /// on first use.
    pub(crate) fn load_type(&mut self, name: &str) -> Result<Option<TypeId>, CompileError> {
        if let Some(id) = self.table.lookup(name) {
            return Ok(Some(id));
        }
        match self.classpath.resolve_classpath_symbol(name) {
            Some(signature) => self.import_signature(signature).map(Some),
            None => Ok(None),
        }
    }

    /// Like [`load_type`](Self::load_type) for types the resolver itself
    /// depends on (`java.lang.String`, `java.lang.Object`, ...).
    pub(crate) fn require_type(&mut self, name: &str, position: &Position) -> Result<TypeId, CompileError> {
        self.load_type(name)?.ok_or_else(|| {
            CompileError::resolution(position.clone(), format!("cannot find type {name} on the classpath"))
        })
    }

    /// Resolve a simple type name as seen from `file`: single-type imports,
    /// then the file's own package, then package and auto imports.
    pub(crate) fn find_type(&mut self, file: usize, name: &str) -> Result<Option<TypeId>, CompileError> {
        let imports = &self.files[file].imports;
        let explicit = imports
            .types
            .iter()
            .find(|(simple, _, _)| simple == name)
            .map(|(_, full, _)| full.clone());
        let mut candidates: Vec<String> = explicit.into_iter().collect();
        candidates.push(qualify(&imports.package, name));
        candidates.extend(imports.packages.iter().map(|pkg| qualify(pkg, name)));
        for candidate in candidates {
            if let Some(id) = self.load_type(&candidate)? {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    /// Resolve a type specification: primitives, `void`, `T[]`, simple
    /// names and `pkg::Type`.
    pub(crate) fn resolve_type_spec(&mut self, file: usize, spec: &Access) -> Result<TypeId, CompileError> {
        let position = spec.loc.position();
        if spec.is_array_type() {
            let Some(element) = spec.exp.as_deref() else {
                return Err(CompileError::syntax(position.clone(), "array type without element type"));
            };
            let Expr::Access(element) = element else {
                return Err(CompileError::syntax(position.clone(), "malformed array type"));
            };
            let element = self.resolve_type_spec(file, element)?;
            if element == TypeId::VOID {
                return Err(CompileError::resolution(position.clone(), "array of void"));
            }
            return Ok(self.table.array_of(element, 1));
        }
        match spec.exp.as_deref() {
            None => {
                if let Some(primitive) = Primitive::from_name(&spec.name) {
                    return Ok(primitive.id());
                }
                if spec.name == "void" || spec.name == "Unit" {
                    return Ok(TypeId::VOID);
                }
                self.find_type(file, &spec.name)?.ok_or_else(|| {
                    CompileError::resolution(position.clone(), format!("cannot resolve type {}", spec.name))
                })
            }
            Some(Expr::PackageRef(pkg)) => {
                let name = qualify(&pkg.pkg, &spec.name);
                self.load_type(&name)?.ok_or_else(|| {
                    CompileError::resolution(position.clone(), format!("cannot resolve type {name}"))
                })
            }
            Some(_) => Err(CompileError::syntax(position.clone(), "malformed type")),
        }
    }

    /// Type spelled in a classpath signature: `int`, `void`, `a.b.C`,
    /// `a.b.C[]`.
    fn signature_type(&mut self, name: &str, owner: &str) -> Result<TypeId, CompileError> {
        let mut base = name;
        let mut dims = 0;
        while let Some(stripped) = base.strip_suffix("[]") {
            base = stripped;
            dims += 1;
        }
        let element = if let Some(primitive) = Primitive::from_name(base) {
            primitive.id()
        } else if base == "void" {
            TypeId::VOID
        } else {
            self.load_type(base)?.ok_or_else(|| {
                CompileError::resolution(
                    Position::synthetic(),
                    format!("cannot find type {base} referenced by {owner}"),
                )
            })?
        };
        Ok(if dims == 0 {
            element
        } else {
            self.table.array_of(element, dims)
        })
    }

    /// Copy a classpath signature into the table. The type is registered
    /// before its members are resolved so self references and cycles
    /// through other classpath types find it.
    fn import_signature(&mut self, signature: ClassSignature) -> Result<TypeId, CompileError> {
        tracing::trace!(name = %signature.name, "importing from classpath");
        let mut object = ObjectType::new(signature.name.clone(), TypeOrigin::Classpath);
        object.modifiers = signature.modifiers;
        object.is_enum = signature.kind == ClassKind::Enum;
        let id = self.table.declare(match signature.kind {
            ClassKind::Class | ClassKind::Enum => TypeDef::Class(object),
            ClassKind::Interface => TypeDef::Interface(object),
            ClassKind::Annotation => TypeDef::Annotation(object),
        });

        let owner = signature.name.as_str();
        let super_class = match &signature.super_class {
            Some(name) => Some(self.signature_type(name, owner)?),
            None => None,
        };
        let mut interfaces = Vec::with_capacity(signature.interfaces.len());
        for name in &signature.interfaces {
            interfaces.push(self.signature_type(name, owner)?);
        }
        let mut fields = Vec::with_capacity(signature.fields.len());
        for field in &signature.fields {
            fields.push(FieldInfo {
                name: field.name.clone(),
                ty: self.signature_type(&field.ty, owner)?,
                modifiers: field.modifiers,
                annos: Vec::new(),
                position: Position::synthetic(),
            });
        }
        let mut methods = Vec::with_capacity(signature.methods.len());
        for method in &signature.methods {
            methods.push(self.signature_method(method, owner)?);
        }
        let mut constructors = Vec::with_capacity(signature.constructors.len());
        for constructor in &signature.constructors {
            constructors.push(self.signature_method(constructor, owner)?);
        }
        let mut annos = Vec::with_capacity(signature.annotations.len());
        for annotation in &signature.annotations {
            let ty = self.signature_type(&annotation.ty, owner)?;
            let mut args = Vec::with_capacity(annotation.args.len());
            for (name, value) in &annotation.args {
                args.push((name.clone(), self.signature_value(value, owner)?));
            }
            annos.push(AnnoInfo { ty, args });
        }

        if let Some(object) = self.table.object_mut(id) {
            object.super_class = super_class;
            object.interfaces = interfaces;
            object.fields = fields;
            object.methods = methods;
            object.constructors = constructors;
            object.annos = annos;
        }
        Ok(id)
    }

    fn signature_method(&mut self, method: &MethodSignature, owner: &str) -> Result<MethodInfo, CompileError> {
        let return_type = self.signature_type(&method.return_type, owner)?;
        let mut info = MethodInfo::new(method.name.clone(), return_type, Position::synthetic());
        info.modifiers = method.modifiers;
        for (index, param) in method.params.iter().enumerate() {
            let ty = self.signature_type(param, owner)?;
            info.params
                .push(LeftValue::new(format!("arg{index}"), ty, true, Position::synthetic()));
        }
        info.default = match &method.default {
            Some(value) => Some(self.signature_value(value, owner)?),
            None => None,
        };
        Ok(info)
    }

    fn signature_value(&mut self, value: &AnnotationValue, owner: &str) -> Result<Value, CompileError> {
        Ok(match value {
            AnnotationValue::Const(constant) => Value::Const(*constant),
            AnnotationValue::Str(text) => Value::Str {
                text: text.clone(),
                ty: self.signature_type("java.lang.String", owner)?,
            },
            AnnotationValue::Enum { ty, name } => Value::EnumConst {
                ty: self.signature_type(ty, owner)?,
                name: name.clone(),
            },
            AnnotationValue::Class(name) => Value::ClassLit {
                target: self.signature_type(name, owner)?,
                ty: self.signature_type("java.lang.Class", owner)?,
            },
            AnnotationValue::Array(items) => {
                let mut elements = Vec::with_capacity(items.len());
                for item in items {
                    elements.push(self.signature_value(item, owner)?);
                }
                let element = match elements.first() {
                    Some(first) => first.ty(),
                    None => self.signature_type(crate::lattice::OBJECT, owner)?,
                };
                Value::Array(Box::new(ArrayValue {
                    ty: self.table.array_of(element, 1),
                    element,
                    dims: 1,
                    elements,
                }))
            }
        })
    }
}

/// Modifiers a classpath-free definition gets when none are written.
pub(crate) fn public_unless_restricted(modifiers: Modifiers) -> Modifiers {
    if modifiers.intersects(Modifiers::ACCESS) {
        modifiers
    } else {
        modifiers | Modifiers::PUBLIC
    }
}
