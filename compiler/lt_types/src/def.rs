//! Typed definitions stored in the [`TypeTable`](crate::TypeTable).

use lt_ir::{Modifiers, Position};
use smallvec::SmallVec;

use crate::{ExceptionEntry, Instruction, Primitive, TypeId, Value};

#[derive(Clone, PartialEq, Debug)]
pub enum TypeDef {
    Primitive(Primitive),
    Void,
    Null,
    /// `element` is never itself an array; `dims >= 1`.
    Array { element: TypeId, dims: u32 },
    Class(ObjectType),
    Interface(ObjectType),
    Annotation(ObjectType),
    /// Boxed reference cell holding a captured local.
    Pointer { pointee: TypeId },
}

impl TypeDef {
    pub fn object(&self) -> Option<&ObjectType> {
        match self {
            TypeDef::Class(o) | TypeDef::Interface(o) | TypeDef::Annotation(o) => Some(o),
            _ => None,
        }
    }

    pub(crate) fn object_mut(&mut self) -> Option<&mut ObjectType> {
        match self {
            TypeDef::Class(o) | TypeDef::Interface(o) | TypeDef::Annotation(o) => Some(o),
            _ => None,
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self, TypeDef::Class(_))
    }

    /// Interfaces and annotations.
    pub fn is_interface(&self) -> bool {
        matches!(self, TypeDef::Interface(_) | TypeDef::Annotation(_))
    }
}

/// Where a declared type comes from.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeOrigin {
    /// Defined by the compilation unit.
    Source(Position),
    /// Imported from the classpath.
    Classpath,
}

/// Class, interface or annotation.
#[derive(Clone, PartialEq, Debug)]
pub struct ObjectType {
    /// Fully qualified, dotted.
    pub name: String,
    pub modifiers: Modifiers,
    pub is_enum: bool,
    pub super_class: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub constructors: Vec<MethodInfo>,
    pub annos: Vec<AnnoInfo>,
    pub origin: TypeOrigin,
}

impl ObjectType {
    pub fn new(name: impl Into<String>, origin: TypeOrigin) -> Self {
        ObjectType {
            name: name.into(),
            modifiers: Modifiers::empty(),
            is_enum: false,
            super_class: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            annos: Vec::new(),
            origin,
        }
    }

    /// Name without the package.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Package part of the name; empty for the default package.
    pub fn package(&self) -> &str {
        self.name.rsplit_once('.').map_or("", |(pkg, _)| pkg)
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(Modifiers::ABSTRACT)
    }

    /// `val class` cannot be extended.
    pub fn is_final(&self) -> bool {
        self.modifiers.contains(Modifiers::VAL)
    }

    pub fn position(&self) -> Position {
        match &self.origin {
            TypeOrigin::Source(position) => position.clone(),
            TypeOrigin::Classpath => Position::synthetic(),
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct FieldInfo {
    pub name: String,
    pub ty: TypeId,
    pub modifiers: Modifiers,
    pub annos: Vec<AnnoInfo>,
    pub position: Position,
}

impl FieldInfo {
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    pub fn can_change(&self) -> bool {
        !self.modifiers.contains(Modifiers::VAL)
    }
}

/// Method, constructor, static initializer or synthetic lambda method.
#[derive(Clone, PartialEq, Debug)]
pub struct MethodInfo {
    pub name: String,
    pub modifiers: Modifiers,
    pub params: Vec<LeftValue>,
    pub return_type: TypeId,
    /// Locals in declaration order.
    pub locals: Vec<LeftValue>,
    pub body: Vec<Instruction>,
    pub exception_table: Vec<ExceptionEntry>,
    pub capture: CaptureInfo,
    pub annos: Vec<AnnoInfo>,
    /// Default value of an annotation element.
    pub default: Option<Value>,
    pub synthetic: bool,
    pub position: Position,
}

impl MethodInfo {
    pub fn new(name: impl Into<String>, return_type: TypeId, position: Position) -> Self {
        MethodInfo {
            name: name.into(),
            modifiers: Modifiers::empty(),
            params: Vec::new(),
            return_type,
            locals: Vec::new(),
            body: Vec::new(),
            exception_table: Vec::new(),
            capture: CaptureInfo::default(),
            annos: Vec::new(),
            default: None,
            synthetic: false,
            position,
        }
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(Modifiers::ABSTRACT)
    }

    pub fn param_types(&self) -> SmallVec<[TypeId; 4]> {
        self.params.iter().map(|p| p.ty).collect()
    }

    pub fn left_value(&self, var: crate::Var) -> Option<&LeftValue> {
        match var {
            crate::Var::Param(i) => self.params.get(i as usize),
            crate::Var::Local(i) => self.locals.get(i as usize),
        }
    }
}

/// Assignable storage: a parameter or a local variable.
#[derive(Clone, PartialEq, Debug)]
pub struct LeftValue {
    pub name: String,
    pub ty: TypeId,
    pub can_change: bool,
    pub already_assigned: bool,
    pub used: bool,
    /// Leading parameter of a lambda method, seeded from an enclosing local.
    pub captured: bool,
    /// Local boxing the parameter at this index.
    pub wrapping_param: Option<u32>,
    /// The enclosing frame's variable a captured parameter was seeded from.
    pub origin: Option<crate::Var>,
    /// Boxed local turned back into a plain local by capture analysis.
    pub deboxed: bool,
    /// First local slot; `None` when the value takes no slot.
    pub slot: Option<u32>,
    pub position: Position,
}

impl LeftValue {
    pub fn new(name: impl Into<String>, ty: TypeId, can_change: bool, position: Position) -> Self {
        LeftValue {
            name: name.into(),
            ty,
            can_change,
            already_assigned: false,
            used: false,
            captured: false,
            wrapping_param: None,
            origin: None,
            deboxed: false,
            slot: None,
            position,
        }
    }
}

/// Outcome of capture analysis for one method.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct CaptureInfo {
    /// Locals captured by a lambda and reassigned after the capture; they
    /// stay boxed. Sorted local indices.
    pub pointer_locals: Vec<u32>,
    /// Number of leading captured parameters.
    pub captured_params: u32,
    /// Slots used by `this`, parameters and locals.
    pub max_slots: u32,
}

/// Annotation kept on a definition.
#[derive(Clone, PartialEq, Debug)]
pub struct AnnoInfo {
    pub ty: TypeId,
    pub args: Vec<(String, Value)>,
}

impl AnnoInfo {
    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}
