//! Already-compiled types.
//!
//! The resolver asks a [`Classpath`] for every qualified name it cannot find
//! among the unit's own definitions. A [`ClassSignature`] describes a type by
//! name only (types of members are spelled as qualified names); the resolver
//! imports it into its table on first use.

use lt_ir::Modifiers;
use rustc_hash::FxHashMap;

use crate::Constant;

pub trait Classpath {
    /// Signature of the type with the given dotted qualified name.
    fn resolve_classpath_symbol(&self, name: &str) -> Option<ClassSignature>;
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ClassKind {
    Class,
    Interface,
    Annotation,
    Enum,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ClassSignature {
    pub name: String,
    pub kind: ClassKind,
    pub modifiers: Modifiers,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldSignature>,
    pub methods: Vec<MethodSignature>,
    pub constructors: Vec<MethodSignature>,
    pub annotations: Vec<AnnotationSignature>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct FieldSignature {
    pub name: String,
    pub ty: String,
    pub modifiers: Modifiers,
}

#[derive(Clone, PartialEq, Debug)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<String>,
    pub return_type: String,
    pub modifiers: Modifiers,
    /// Default of an annotation element.
    pub default: Option<AnnotationValue>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct AnnotationSignature {
    pub ty: String,
    pub args: Vec<(String, AnnotationValue)>,
}

impl AnnotationSignature {
    pub fn new(ty: &str) -> Self {
        AnnotationSignature {
            ty: ty.to_owned(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, name: &str, value: AnnotationValue) -> Self {
        self.args.push((name.to_owned(), value));
        self
    }
}

/// Constant usable as an annotation argument.
#[derive(Clone, PartialEq, Debug)]
pub enum AnnotationValue {
    Const(Constant),
    Str(String),
    Enum { ty: String, name: String },
    Class(String),
    Array(Vec<AnnotationValue>),
}

impl AnnotationValue {
    pub fn enum_const(ty: &str, name: &str) -> Self {
        AnnotationValue::Enum {
            ty: ty.to_owned(),
            name: name.to_owned(),
        }
    }
}

const OBJECT: &str = "java.lang.Object";

impl ClassSignature {
    fn new(name: &str, kind: ClassKind) -> Self {
        ClassSignature {
            name: name.to_owned(),
            kind,
            modifiers: Modifiers::PUBLIC,
            super_class: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Class extending `java.lang.Object`.
    pub fn class(name: &str) -> Self {
        let mut class = ClassSignature::new(name, ClassKind::Class);
        if name != OBJECT {
            class.super_class = Some(OBJECT.to_owned());
        }
        class
    }

    pub fn interface(name: &str) -> Self {
        ClassSignature::new(name, ClassKind::Interface)
    }

    pub fn annotation(name: &str) -> Self {
        let mut annotation = ClassSignature::new(name, ClassKind::Annotation);
        annotation
            .interfaces
            .push("java.lang.annotation.Annotation".to_owned());
        annotation
    }

    /// Enum whose constants are static fields of the enum type itself.
    pub fn enumeration(name: &str, constants: &[&str]) -> Self {
        let mut enumeration = ClassSignature::new(name, ClassKind::Enum);
        enumeration.modifiers |= Modifiers::VAL;
        enumeration.super_class = Some("java.lang.Enum".to_owned());
        for constant in constants {
            enumeration.fields.push(FieldSignature {
                name: (*constant).to_owned(),
                ty: name.to_owned(),
                modifiers: Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::VAL,
            });
        }
        enumeration
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    #[must_use]
    pub fn extends(mut self, name: &str) -> Self {
        self.super_class = Some(name.to_owned());
        self
    }

    #[must_use]
    pub fn implements(mut self, name: &str) -> Self {
        self.interfaces.push(name.to_owned());
        self
    }

    #[must_use]
    pub fn field(mut self, name: &str, ty: &str) -> Self {
        self.fields.push(FieldSignature {
            name: name.to_owned(),
            ty: ty.to_owned(),
            modifiers: Modifiers::PUBLIC,
        });
        self
    }

    #[must_use]
    pub fn static_field(mut self, name: &str, ty: &str) -> Self {
        self.fields.push(FieldSignature {
            name: name.to_owned(),
            ty: ty.to_owned(),
            modifiers: Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::VAL,
        });
        self
    }

    fn push_method(mut self, name: &str, params: &[&str], ret: &str, modifiers: Modifiers) -> Self {
        self.methods.push(MethodSignature {
            name: name.to_owned(),
            params: params.iter().map(|p| (*p).to_owned()).collect(),
            return_type: ret.to_owned(),
            modifiers,
            default: None,
        });
        self
    }

    /// Instance method; abstract when the type is an interface.
    #[must_use]
    pub fn method(self, name: &str, params: &[&str], ret: &str) -> Self {
        let modifiers = if self.kind == ClassKind::Class || self.kind == ClassKind::Enum {
            Modifiers::PUBLIC
        } else {
            Modifiers::PUBLIC | Modifiers::ABSTRACT
        };
        self.push_method(name, params, ret, modifiers)
    }

    #[must_use]
    pub fn abstract_method(self, name: &str, params: &[&str], ret: &str) -> Self {
        self.push_method(name, params, ret, Modifiers::PUBLIC | Modifiers::ABSTRACT)
    }

    #[must_use]
    pub fn static_method(self, name: &str, params: &[&str], ret: &str) -> Self {
        self.push_method(name, params, ret, Modifiers::PUBLIC | Modifiers::STATIC)
    }

    #[must_use]
    pub fn constructor(mut self, params: &[&str]) -> Self {
        self.constructors.push(MethodSignature {
            name: "<init>".to_owned(),
            params: params.iter().map(|p| (*p).to_owned()).collect(),
            return_type: "void".to_owned(),
            modifiers: Modifiers::PUBLIC,
            default: None,
        });
        self
    }

    /// Annotation element.
    #[must_use]
    pub fn element(mut self, name: &str, ty: &str, default: Option<AnnotationValue>) -> Self {
        self.methods.push(MethodSignature {
            name: name.to_owned(),
            params: Vec::new(),
            return_type: ty.to_owned(),
            modifiers: Modifiers::PUBLIC | Modifiers::ABSTRACT,
            default,
        });
        self
    }

    #[must_use]
    pub fn annotated(mut self, annotation: AnnotationSignature) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// Classpath held in memory.
#[derive(Clone, Default, Debug)]
pub struct MemoryClasspath {
    classes: FxHashMap<String, ClassSignature>,
}

impl MemoryClasspath {
    pub fn new() -> Self {
        MemoryClasspath::default()
    }

    pub fn insert(&mut self, class: ClassSignature) {
        self.classes.insert(class.name.clone(), class);
    }

    #[must_use]
    pub fn with(mut self, class: ClassSignature) -> Self {
        self.insert(class);
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// The core library surface the front end relies on: `java.lang`
    /// basics and wrappers, the annotation meta-types, the collection
    /// interfaces used by `for` and map literals, and the
    /// `lt.lang.function.FunctionN` interfaces lambdas default to.
    pub fn bootstrap() -> Self {
        let mut classpath = MemoryClasspath::new();
        for class in lang() {
            classpath.insert(class);
        }
        for class in annotations() {
            classpath.insert(class);
        }
        for class in collections() {
            classpath.insert(class);
        }
        for arity in 0..=FUNCTION_ARITY {
            classpath.insert(function(arity));
        }
        classpath
    }
}

impl Classpath for MemoryClasspath {
    fn resolve_classpath_symbol(&self, name: &str) -> Option<ClassSignature> {
        self.classes.get(name).cloned()
    }
}

/// Largest `N` of the bootstrap `FunctionN` interfaces.
pub const FUNCTION_ARITY: usize = 7;

pub const FUNCTION_PACKAGE: &str = "lt.lang.function";

fn function(arity: usize) -> ClassSignature {
    let params = vec![OBJECT; arity];
    ClassSignature::interface(&format!("{FUNCTION_PACKAGE}.Function{arity}"))
        .method("apply", &params, OBJECT)
        .annotated(AnnotationSignature::new("java.lang.FunctionalInterface"))
}

const STRING: &str = "java.lang.String";

fn wrapper(name: &str, primitive: &str, numeric: bool) -> ClassSignature {
    let class = if numeric {
        ClassSignature::class(name).extends("java.lang.Number")
    } else {
        ClassSignature::class(name)
    };
    class
        .with_modifiers(Modifiers::VAL)
        .constructor(&[primitive])
        .static_method("valueOf", &[primitive], name)
        .method(&format!("{primitive}Value"), &[], primitive)
}

fn lang() -> Vec<ClassSignature> {
    vec![
        ClassSignature::class(OBJECT)
            .constructor(&[])
            .method("equals", &[OBJECT], "bool")
            .method("hashCode", &[], "int")
            .method("toString", &[], STRING)
            .method("getClass", &[], "java.lang.Class"),
        ClassSignature::class("java.lang.Class").with_modifiers(Modifiers::VAL),
        ClassSignature::interface("java.lang.CharSequence")
            .method("length", &[], "int")
            .method("charAt", &["int"], "char"),
        ClassSignature::interface("java.lang.Comparable").method("compareTo", &[OBJECT], "int"),
        ClassSignature::class(STRING)
            .with_modifiers(Modifiers::VAL)
            .implements("java.lang.CharSequence")
            .implements("java.lang.Comparable")
            .constructor(&[])
            .method("length", &[], "int")
            .method("charAt", &["int"], "char")
            .method("isEmpty", &[], "bool")
            .method("concat", &[STRING], STRING)
            .method("contains", &["java.lang.CharSequence"], "bool")
            .method("substring", &["int"], STRING)
            .method("substring", &["int", "int"], STRING)
            .method("compareTo", &[OBJECT], "int")
            .static_method("valueOf", &[OBJECT], STRING),
        ClassSignature::interface("java.lang.Runnable").method("run", &[], "void"),
        ClassSignature::interface("java.lang.Iterable").method("iterator", &[], "java.util.Iterator"),
        ClassSignature::class("java.lang.Throwable")
            .constructor(&[])
            .constructor(&[STRING])
            .method("getMessage", &[], STRING),
        ClassSignature::class("java.lang.Exception")
            .extends("java.lang.Throwable")
            .constructor(&[])
            .constructor(&[STRING]),
        ClassSignature::class("java.lang.RuntimeException")
            .extends("java.lang.Exception")
            .constructor(&[])
            .constructor(&[STRING]),
        ClassSignature::class("java.lang.Error")
            .extends("java.lang.Throwable")
            .constructor(&[])
            .constructor(&[STRING]),
        ClassSignature::class("java.lang.Enum")
            .with_modifiers(Modifiers::ABSTRACT)
            .method("name", &[], STRING)
            .method("ordinal", &[], "int"),
        ClassSignature::class("java.lang.Number")
            .with_modifiers(Modifiers::ABSTRACT)
            .constructor(&[])
            .abstract_method("intValue", &[], "int")
            .abstract_method("longValue", &[], "long")
            .abstract_method("floatValue", &[], "float")
            .abstract_method("doubleValue", &[], "double"),
        wrapper("java.lang.Boolean", "bool", false),
        wrapper("java.lang.Character", "char", false),
        wrapper("java.lang.Byte", "byte", true),
        wrapper("java.lang.Short", "short", true),
        wrapper("java.lang.Integer", "int", true),
        wrapper("java.lang.Long", "long", true),
        wrapper("java.lang.Float", "float", true),
        wrapper("java.lang.Double", "double", true),
        ClassSignature::class("java.lang.Math")
            .with_modifiers(Modifiers::VAL)
            .static_method("pow", &["double", "double"], "double")
            .static_method("abs", &["int"], "int")
            .static_method("abs", &["long"], "long")
            .static_method("abs", &["double"], "double")
            .static_method("max", &["int", "int"], "int")
            .static_method("max", &["long", "long"], "long")
            .static_method("max", &["double", "double"], "double"),
    ]
}

const ELEMENT_TYPE: &str = "java.lang.annotation.ElementType";
const RETENTION_POLICY: &str = "java.lang.annotation.RetentionPolicy";

fn target(elements: &[&str]) -> AnnotationSignature {
    AnnotationSignature::new("java.lang.annotation.Target").arg(
        "value",
        AnnotationValue::Array(
            elements
                .iter()
                .map(|e| AnnotationValue::enum_const(ELEMENT_TYPE, e))
                .collect(),
        ),
    )
}

fn retention(policy: &str) -> AnnotationSignature {
    AnnotationSignature::new("java.lang.annotation.Retention")
        .arg("value", AnnotationValue::enum_const(RETENTION_POLICY, policy))
}

fn annotations() -> Vec<ClassSignature> {
    vec![
        ClassSignature::interface("java.lang.annotation.Annotation"),
        ClassSignature::enumeration(
            ELEMENT_TYPE,
            &[
                "TYPE",
                "FIELD",
                "METHOD",
                "PARAMETER",
                "CONSTRUCTOR",
                "LOCAL_VARIABLE",
                "ANNOTATION_TYPE",
                "PACKAGE",
                "TYPE_PARAMETER",
                "TYPE_USE",
            ],
        ),
        ClassSignature::enumeration(RETENTION_POLICY, &["SOURCE", "CLASS", "RUNTIME"]),
        ClassSignature::annotation("java.lang.annotation.Target")
            .element("value", &format!("{ELEMENT_TYPE}[]"), None)
            .annotated(target(&["ANNOTATION_TYPE"]))
            .annotated(retention("RUNTIME")),
        ClassSignature::annotation("java.lang.annotation.Retention")
            .element("value", RETENTION_POLICY, None)
            .annotated(target(&["ANNOTATION_TYPE"]))
            .annotated(retention("RUNTIME")),
        ClassSignature::annotation("java.lang.Override")
            .annotated(target(&["METHOD"]))
            .annotated(retention("SOURCE")),
        ClassSignature::annotation("java.lang.Deprecated").annotated(retention("RUNTIME")),
        ClassSignature::annotation("java.lang.FunctionalInterface")
            .annotated(target(&["TYPE"]))
            .annotated(retention("RUNTIME")),
    ]
}

fn collections() -> Vec<ClassSignature> {
    vec![
        ClassSignature::interface("java.util.Iterator")
            .method("hasNext", &[], "bool")
            .method("next", &[], OBJECT),
        ClassSignature::interface("java.util.Collection")
            .implements("java.lang.Iterable")
            .method("size", &[], "int")
            .method("isEmpty", &[], "bool")
            .method("contains", &[OBJECT], "bool")
            .method("add", &[OBJECT], "bool"),
        ClassSignature::interface("java.util.List")
            .implements("java.util.Collection")
            .method("get", &["int"], OBJECT)
            .method("set", &["int", OBJECT], OBJECT),
        ClassSignature::class("java.util.ArrayList")
            .implements("java.util.List")
            .constructor(&[])
            .constructor(&["int"])
            .method("size", &[], "int")
            .method("isEmpty", &[], "bool")
            .method("contains", &[OBJECT], "bool")
            .method("add", &[OBJECT], "bool")
            .method("get", &["int"], OBJECT)
            .method("set", &["int", OBJECT], OBJECT)
            .method("iterator", &[], "java.util.Iterator"),
        ClassSignature::interface("java.util.Map")
            .method("size", &[], "int")
            .method("get", &[OBJECT], OBJECT)
            .method("put", &[OBJECT, OBJECT], OBJECT)
            .method("containsKey", &[OBJECT], "bool"),
        ClassSignature::class("java.util.HashMap")
            .implements("java.util.Map")
            .constructor(&[])
            .method("size", &[], "int")
            .method("get", &[OBJECT], OBJECT)
            .method("put", &[OBJECT, OBJECT], OBJECT)
            .method("containsKey", &[OBJECT], "bool"),
        ClassSignature::class("java.util.LinkedHashMap")
            .extends("java.util.HashMap")
            .constructor(&[]),
    ]
}

#[cfg(test)]
mod tests;
