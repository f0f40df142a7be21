//! Annotation applicability and retention.
//!
//! Both questions are answered from the annotation type's own meta
//! annotations as stored in the [`TypeTable`]. Classpath annotations carry
//! them from their signature and annotations defined by the unit carry
//! them from their definition, so the two are handled the same way.

use bitflags::bitflags;

use crate::{TypeId, TypeTable, Value};

pub const TARGET: &str = "java.lang.annotation.Target";
pub const RETENTION: &str = "java.lang.annotation.Retention";

bitflags! {
    /// Program elements an annotation may be placed on.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct TargetSet: u16 {
        const TYPE = 1 << 0;
        const FIELD = 1 << 1;
        const METHOD = 1 << 2;
        const PARAMETER = 1 << 3;
        const CONSTRUCTOR = 1 << 4;
        const LOCAL_VARIABLE = 1 << 5;
        const ANNOTATION_TYPE = 1 << 6;
        const PACKAGE = 1 << 7;
        const TYPE_PARAMETER = 1 << 8;
        const TYPE_USE = 1 << 9;
    }
}

impl TargetSet {
    /// Target named by an `ElementType` constant.
    pub fn from_element_type(name: &str) -> Option<TargetSet> {
        TargetSet::from_name(name)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Retention {
    /// Discarded by the compiler.
    Source,
    Class,
    Runtime,
}

impl Retention {
    pub fn from_policy(name: &str) -> Option<Retention> {
        match name {
            "SOURCE" => Some(Retention::Source),
            "CLASS" => Some(Retention::Class),
            "RUNTIME" => Some(Retention::Runtime),
            _ => None,
        }
    }
}

fn meta_argument<'t>(table: &'t TypeTable, annotation: TypeId, meta: &str) -> Option<&'t Value> {
    table
        .object(annotation)?
        .annos
        .iter()
        .find(|anno| table.object(anno.ty).is_some_and(|o| o.name == meta))?
        .arg("value")
}

/// Elements `annotation` may be placed on. An annotation type without a
/// `@Target` may be placed anywhere.
pub fn query_annotation_targets(table: &TypeTable, annotation: TypeId) -> TargetSet {
    let Some(value) = meta_argument(table, annotation, TARGET) else {
        return TargetSet::all();
    };
    let elements = match value {
        Value::Array(array) => array.elements.as_slice(),
        single => std::slice::from_ref(single),
    };
    elements
        .iter()
        .filter_map(|element| match element {
            Value::EnumConst { name, .. } => TargetSet::from_element_type(name),
            _ => None,
        })
        .fold(TargetSet::empty(), |set, target| set | target)
}

/// Retention policy of `annotation`; `CLASS` when none is declared.
pub fn query_retention(table: &TypeTable, annotation: TypeId) -> Retention {
    match meta_argument(table, annotation, RETENTION) {
        Some(Value::EnumConst { name, .. }) => {
            Retention::from_policy(name).unwrap_or(Retention::Class)
        }
        _ => Retention::Class,
    }
}

#[cfg(test)]
mod tests;
