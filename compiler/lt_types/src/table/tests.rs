use lt_ir::Position;
use pretty_assertions::assert_eq;

use super::*;
use crate::TypeOrigin;

#[test]
fn primitives_are_preinterned() {
    let table = TypeTable::new();
    for primitive in Primitive::ALL {
        assert_eq!(table.get(primitive.id()), &TypeDef::Primitive(primitive));
        assert_eq!(table.primitive(primitive.id()), Some(primitive));
    }
    assert_eq!(table.get(TypeId::VOID), &TypeDef::Void);
    assert_eq!(table.get(TypeId::NULL), &TypeDef::Null);
    assert_eq!(table.len(), TypeId::FIRST_DYNAMIC as usize);
}

#[test]
fn arrays_are_interned_and_flattened() {
    let mut table = TypeTable::new();
    let ints = table.array_of(TypeId::INT, 1);
    assert_eq!(table.array_of(TypeId::INT, 1), ints);
    let matrix = table.array_of(ints, 1);
    assert_eq!(
        table.get(matrix),
        &TypeDef::Array {
            element: TypeId::INT,
            dims: 2
        }
    );
    assert_eq!(table.array_of(TypeId::INT, 2), matrix);
    assert_eq!(table.component_of(matrix), Some(ints));
    assert_eq!(table.component_of(ints), Some(TypeId::INT));
    assert_eq!(table.component_of(TypeId::INT), None);
    assert_eq!(table.name(matrix), "int[][]");
}

#[test]
fn pointers_are_interned() {
    let mut table = TypeTable::new();
    let pointer = table.pointer_to(TypeId::LONG);
    assert_eq!(table.pointer_to(TypeId::LONG), pointer);
    assert_eq!(table.pointee(pointer), Some(TypeId::LONG));
    assert_eq!(table.pointee(TypeId::LONG), None);
    assert!(!table.is_reference(pointer));
}

#[test]
fn slot_widths() {
    let mut table = TypeTable::new();
    assert_eq!(table.slots_of(TypeId::LONG), 2);
    assert_eq!(table.slots_of(TypeId::DOUBLE), 2);
    assert_eq!(table.slots_of(TypeId::INT), 1);
    let longs = table.array_of(TypeId::LONG, 1);
    assert_eq!(table.slots_of(longs), 1);
    let pointer = table.pointer_to(TypeId::DOUBLE);
    assert_eq!(table.slots_of(pointer), 1);
}

#[test]
fn declared_types_are_found_by_name() {
    let mut table = TypeTable::new();
    let id = table.declare(TypeDef::Class(ObjectType::new(
        "my.app.User",
        TypeOrigin::Source(Position::synthetic()),
    )));
    assert_eq!(table.lookup("my.app.User"), Some(id));
    assert_eq!(table.lookup("User"), None);
    let object = table.object(id).unwrap();
    assert_eq!(object.simple_name(), "User");
    assert_eq!(object.package(), "my.app");
    assert_eq!(table.declared().count(), 1);
}

#[test]
fn methods_by_name() {
    let mut table = TypeTable::new();
    let mut object = ObjectType::new("A", TypeOrigin::Classpath);
    object
        .methods
        .push(MethodInfo::new("f", TypeId::VOID, Position::synthetic()));
    object
        .methods
        .push(MethodInfo::new("g", TypeId::VOID, Position::synthetic()));
    object
        .methods
        .push(MethodInfo::new("f", TypeId::INT, Position::synthetic()));
    let id = table.declare(TypeDef::Class(object));
    let found = table.methods_named(id, "f");
    assert_eq!(found.len(), 2);
    assert_eq!(found[1].index, 2);
    assert_eq!(table.method(found[1]).unwrap().return_type, TypeId::INT);
}
