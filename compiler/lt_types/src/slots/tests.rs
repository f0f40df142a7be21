use lt_ir::{Modifiers, Position};
use pretty_assertions::assert_eq;

use super::*;
use crate::{LeftValue, TypeId};

fn value(name: &str, ty: TypeId) -> LeftValue {
    LeftValue::new(name, ty, true, Position::synthetic())
}

fn slots(method: &MethodInfo) -> (Vec<Option<u32>>, Vec<Option<u32>>) {
    (
        method.params.iter().map(|p| p.slot).collect(),
        method.locals.iter().map(|l| l.slot).collect(),
    )
}

#[test]
fn instance_method_reserves_this() {
    let table = TypeTable::new();
    let mut method = MethodInfo::new("f", TypeId::VOID, Position::synthetic());
    method.params = vec![value("a", TypeId::LONG), value("b", TypeId::INT)];
    allocate_slots(&table, &mut method);
    assert_eq!(slots(&method).0, vec![Some(1), Some(3)]);
    assert_eq!(method.capture.max_slots, 4);
}

#[test]
fn static_method_starts_at_zero() {
    let table = TypeTable::new();
    let mut method = MethodInfo::new("f", TypeId::VOID, Position::synthetic());
    method.modifiers = Modifiers::STATIC;
    method.params = vec![value("a", TypeId::DOUBLE), value("b", TypeId::BOOL)];
    method.locals = vec![value("c", TypeId::LONG)];
    allocate_slots(&table, &mut method);
    assert_eq!(slots(&method), (vec![Some(0), Some(2)], vec![Some(3)]));
    assert_eq!(method.capture.max_slots, 5);
}

#[test]
fn unused_captured_parameter_takes_no_slot() {
    let table = TypeTable::new();
    let mut method = MethodInfo::new("lambda$f$0", TypeId::VOID, Position::synthetic());
    let mut a = value("a", TypeId::LONG);
    a.captured = true;
    a.used = true;
    let mut b = value("b", TypeId::INT);
    b.captured = true;
    method.params = vec![a, b];
    allocate_slots(&table, &mut method);
    assert_eq!(slots(&method).0, vec![Some(1), None]);
    assert_eq!(method.capture.max_slots, 3);
}

#[test]
fn deboxed_wrapping_local_shares_the_parameter_slot() {
    let mut table = TypeTable::new();
    let mut method = MethodInfo::new("f", TypeId::VOID, Position::synthetic());
    method.params = vec![value("a", TypeId::LONG)];
    let mut wrap = value("a", table.pointer_to(TypeId::LONG));
    wrap.wrapping_param = Some(0);
    let mut after = value("c", TypeId::INT);
    after.used = true;
    method.locals = vec![wrap, after];
    crate::capture::debox(&table, &mut method, &[]);
    allocate_slots(&table, &mut method);
    assert_eq!(slots(&method), (vec![Some(1)], vec![Some(1), Some(3)]));
}

#[test]
fn boxed_wrapping_local_takes_its_own_slot() {
    let mut table = TypeTable::new();
    let mut method = MethodInfo::new("f", TypeId::VOID, Position::synthetic());
    method.params = vec![value("a", TypeId::LONG)];
    let mut wrap = value("a", table.pointer_to(TypeId::LONG));
    wrap.wrapping_param = Some(0);
    method.locals = vec![wrap];
    crate::capture::debox(&table, &mut method, &[0]);
    allocate_slots(&table, &mut method);
    assert_eq!(slots(&method), (vec![Some(1)], vec![Some(3)]));
    assert_eq!(method.capture.max_slots, 4);
}

#[test]
fn deboxed_local_is_sized_by_its_pointee() {
    let mut table = TypeTable::new();
    let mut method = MethodInfo::new("f", TypeId::VOID, Position::synthetic());
    method.modifiers = Modifiers::STATIC;
    let longs = table.array_of(TypeId::LONG, 1);
    method.locals = vec![
        value("d", table.pointer_to(TypeId::DOUBLE)),
        value("xs", table.pointer_to(longs)),
        value("kept", table.pointer_to(TypeId::LONG)),
        value("i", TypeId::INT),
    ];
    crate::capture::debox(&table, &mut method, &[2]);
    allocate_slots(&table, &mut method);
    assert_eq!(
        slots(&method).1,
        vec![Some(0), Some(2), Some(3), Some(4)]
    );
    assert_eq!(method.locals[1].ty, longs);
    assert!(!method.locals[2].deboxed);
}
