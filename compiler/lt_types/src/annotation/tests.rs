use pretty_assertions::assert_eq;

use super::*;
use crate::{AnnoInfo, ArrayValue, ObjectType, TypeDef, TypeOrigin};

struct Meta {
    table: TypeTable,
    element_type: TypeId,
    policy: TypeId,
    target: TypeId,
    retention: TypeId,
}

fn meta() -> Meta {
    let mut table = TypeTable::new();
    let mut declare = |name: &str, def: fn(ObjectType) -> TypeDef| {
        table.declare(def(ObjectType::new(name, TypeOrigin::Classpath)))
    };
    let element_type = declare("java.lang.annotation.ElementType", TypeDef::Class);
    let policy = declare("java.lang.annotation.RetentionPolicy", TypeDef::Class);
    let target = declare(TARGET, TypeDef::Annotation);
    let retention = declare(RETENTION, TypeDef::Annotation);
    Meta {
        table,
        element_type,
        policy,
        target,
        retention,
    }
}

fn constant(ty: TypeId, name: &str) -> Value {
    Value::EnumConst {
        ty,
        name: name.to_owned(),
    }
}

fn annotation(meta: &mut Meta, annos: Vec<AnnoInfo>) -> TypeId {
    let mut object = ObjectType::new("my.Marker", TypeOrigin::Classpath);
    object.annos = annos;
    meta.table.declare(TypeDef::Annotation(object))
}

#[test]
fn no_target_allows_everything() {
    let mut meta = meta();
    let marker = annotation(&mut meta, vec![]);
    assert_eq!(query_annotation_targets(&meta.table, marker), TargetSet::all());
}

#[test]
fn single_target() {
    let mut meta = meta();
    let anno = AnnoInfo {
        ty: meta.target,
        args: vec![("value".to_owned(), constant(meta.element_type, "METHOD"))],
    };
    let marker = annotation(&mut meta, vec![anno]);
    assert_eq!(query_annotation_targets(&meta.table, marker), TargetSet::METHOD);
}

#[test]
fn target_array() {
    let mut meta = meta();
    let array_ty = meta.table.array_of(meta.element_type, 1);
    let anno = AnnoInfo {
        ty: meta.target,
        args: vec![(
            "value".to_owned(),
            Value::Array(Box::new(ArrayValue {
                ty: array_ty,
                element: meta.element_type,
                dims: 1,
                elements: vec![
                    constant(meta.element_type, "TYPE"),
                    constant(meta.element_type, "FIELD"),
                ],
            })),
        )],
    };
    let marker = annotation(&mut meta, vec![anno]);
    assert_eq!(
        query_annotation_targets(&meta.table, marker),
        TargetSet::TYPE | TargetSet::FIELD
    );
}

#[test]
fn retention_defaults_to_class() {
    let mut meta = meta();
    let marker = annotation(&mut meta, vec![]);
    assert_eq!(query_retention(&meta.table, marker), Retention::Class);
}

#[test]
fn declared_retention() {
    let mut meta = meta();
    let anno = AnnoInfo {
        ty: meta.retention,
        args: vec![("value".to_owned(), constant(meta.policy, "SOURCE"))],
    };
    let marker = annotation(&mut meta, vec![anno]);
    assert_eq!(query_retention(&meta.table, marker), Retention::Source);
}

#[test]
fn element_type_names() {
    assert_eq!(
        TargetSet::from_element_type("LOCAL_VARIABLE"),
        Some(TargetSet::LOCAL_VARIABLE)
    );
    assert_eq!(TargetSet::from_element_type("EVERYWHERE"), None);
    assert_eq!(Retention::from_policy("RUNTIME"), Some(Retention::Runtime));
}
