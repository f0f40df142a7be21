use pretty_assertions::assert_eq;

use super::*;
use crate::{ObjectType, Primitive, TypeOrigin};

fn declare(table: &mut TypeTable, name: &str, interface: bool, parents: &[TypeId]) -> TypeId {
    let mut object = ObjectType::new(name, TypeOrigin::Classpath);
    let object_id = table.lookup(OBJECT);
    if interface {
        object.interfaces = parents.to_vec();
        table.declare(TypeDef::Interface(object))
    } else {
        object.super_class = parents.first().copied().or(object_id);
        object.interfaces = parents.iter().skip(1).copied().collect();
        table.declare(TypeDef::Class(object))
    }
}

fn hierarchy() -> (TypeTable, [TypeId; 6]) {
    let mut table = TypeTable::new();
    let object = table.declare(TypeDef::Class(ObjectType::new(OBJECT, TypeOrigin::Classpath)));
    let named = declare(&mut table, "Named", true, &[]);
    let sized = declare(&mut table, "Sized", true, &[named]);
    let shape = declare(&mut table, "Shape", true, &[named, sized]);
    let base = declare(&mut table, "Base", false, &[object, shape]);
    let circle = declare(&mut table, "Circle", false, &[base]);
    (table, [object, named, sized, shape, base, circle])
}

#[test]
fn primitive_widening() {
    let table = TypeTable::new();
    let assignable = |t: Primitive, s: Primitive| table.is_assignable_from(t.id(), s.id());
    assert!(assignable(Primitive::Int, Primitive::Byte));
    assert!(assignable(Primitive::Int, Primitive::Short));
    assert!(assignable(Primitive::Int, Primitive::Char));
    assert!(assignable(Primitive::Long, Primitive::Int));
    assert!(assignable(Primitive::Float, Primitive::Long));
    assert!(assignable(Primitive::Double, Primitive::Byte));
    assert!(!assignable(Primitive::Int, Primitive::Long));
    assert!(!assignable(Primitive::Float, Primitive::Double));
    assert!(!assignable(Primitive::Int, Primitive::Bool));
    assert!(!assignable(Primitive::Bool, Primitive::Int));
}

#[test]
fn small_integers_are_not_mutually_assignable() {
    let table = TypeTable::new();
    for (a, b) in [
        (TypeId::BYTE, TypeId::SHORT),
        (TypeId::SHORT, TypeId::BYTE),
        (TypeId::CHAR, TypeId::BYTE),
        (TypeId::BYTE, TypeId::CHAR),
        (TypeId::SHORT, TypeId::CHAR),
        (TypeId::CHAR, TypeId::SHORT),
    ] {
        assert!(!table.is_assignable_from(a, b), "{a:?} <- {b:?}");
    }
}

#[test]
fn widening_is_a_partial_order() {
    let table = TypeTable::new();
    for a in Primitive::ALL {
        assert!(table.is_assignable_from(a.id(), a.id()));
        for b in Primitive::ALL {
            if a != b && table.is_assignable_from(a.id(), b.id()) {
                assert!(!table.is_assignable_from(b.id(), a.id()));
            }
            for c in Primitive::ALL {
                if table.is_assignable_from(a.id(), b.id())
                    && table.is_assignable_from(b.id(), c.id())
                {
                    assert!(table.is_assignable_from(a.id(), c.id()));
                }
            }
        }
    }
}

#[test]
fn null_is_assignable_to_references_only() {
    let (mut table, [object, _, _, shape, _, circle]) = hierarchy();
    let ints = table.array_of(TypeId::INT, 1);
    for target in [object, shape, circle, ints] {
        assert!(table.is_assignable_from(target, TypeId::NULL));
    }
    for primitive in Primitive::ALL {
        assert!(!table.is_assignable_from(primitive.id(), TypeId::NULL));
    }
}

#[test]
fn references_follow_the_hierarchy() {
    let (table, [object, named, sized, shape, base, circle]) = hierarchy();
    assert!(table.is_assignable_from(base, circle));
    assert!(table.is_assignable_from(shape, circle));
    assert!(table.is_assignable_from(named, circle));
    assert!(table.is_assignable_from(sized, shape));
    assert!(table.is_assignable_from(object, named));
    assert!(!table.is_assignable_from(circle, base));
    assert!(!table.is_assignable_from(shape, named));
    assert!(!table.is_assignable_from(TypeId::INT, circle));
    assert!(!table.is_assignable_from(object, TypeId::INT));
}

#[test]
fn diamond_supertypes_are_visited_once() {
    let (table, [object, named, sized, shape, base, circle]) = hierarchy();
    assert_eq!(
        table.supertypes(circle),
        vec![base, object, shape, named, sized]
    );
    assert!(!table.inherits_from_itself(circle));
}

#[test]
fn cycles_terminate() {
    let (mut table, [_, named, sized, ..]) = hierarchy();
    if let Some(object) = table.object_mut(named) {
        object.interfaces.push(sized);
    }
    assert!(table.inherits_from_itself(named));
    assert!(table.inherits_from_itself(sized));
    assert_eq!(table.supertypes(named), vec![sized]);
}

#[test]
fn arrays() {
    let (mut table, [object, _, _, shape, _, circle]) = hierarchy();
    let ints = table.array_of(TypeId::INT, 1);
    let longs = table.array_of(TypeId::LONG, 1);
    let circles = table.array_of(circle, 1);
    let shapes = table.array_of(shape, 1);
    let objects = table.array_of(object, 1);
    let matrix = table.array_of(TypeId::INT, 2);
    assert!(table.is_assignable_from(object, ints));
    assert!(table.is_assignable_from(shapes, circles));
    assert!(!table.is_assignable_from(circles, shapes));
    assert!(!table.is_assignable_from(longs, ints));
    assert!(table.is_assignable_from(objects, matrix));
    assert!(!table.is_assignable_from(objects, ints));
    assert!(!table.is_assignable_from(shape, circles));
}
