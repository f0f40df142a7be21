use lt_ir::Position;
use pretty_assertions::assert_eq;

use super::*;
use crate::{LeftValue, TypeId};

#[test]
fn assignment_before_capture_keeps_no_box() {
    let mut tracker = CaptureTracker::new();
    let method = tracker.push_frame(None);
    tracker.on_assign(method, Var::Local(0));
    tracker.mark_captured(method, Var::Local(0));
    assert_eq!(tracker.pointer_locals(method), Vec::<u32>::new());
}

#[test]
fn assignment_after_capture_keeps_the_box() {
    let mut tracker = CaptureTracker::new();
    let method = tracker.push_frame(None);
    tracker.mark_captured(method, Var::Local(1));
    tracker.on_assign(method, Var::Local(0));
    tracker.on_assign(method, Var::Local(1));
    assert_eq!(tracker.pointer_locals(method), vec![1]);
}

#[test]
fn assignment_inside_a_lambda_boxes_the_root() {
    let mut tracker = CaptureTracker::new();
    let method = tracker.push_frame(None);
    let lambda = tracker.push_frame(Some(method));
    tracker.record_origin(lambda, 0, Var::Local(2));
    tracker.on_assign(lambda, Var::Param(0));
    assert_eq!(tracker.pointer_locals(method), vec![2]);
    assert_eq!(tracker.pointer_locals(lambda), Vec::<u32>::new());
}

#[test]
fn nested_lambdas_propagate_to_the_root() {
    let mut tracker = CaptureTracker::new();
    let method = tracker.push_frame(None);
    let outer = tracker.push_frame(Some(method));
    tracker.record_origin(outer, 0, Var::Local(0));
    let inner = tracker.push_frame(Some(outer));
    tracker.record_origin(inner, 1, Var::Param(0));
    assert_eq!(tracker.root(inner, Var::Param(1)), (method, Var::Local(0)));
    tracker.on_assign(inner, Var::Param(1));
    assert_eq!(tracker.pointer_locals(method), vec![0]);
    assert_eq!(tracker.frame_count(), 3);
}

#[test]
fn lambda_local_captured_by_nested_lambda() {
    let mut tracker = CaptureTracker::new();
    let method = tracker.push_frame(None);
    let outer = tracker.push_frame(Some(method));
    let inner = tracker.push_frame(Some(outer));
    tracker.record_origin(inner, 0, Var::Local(3));
    tracker.on_assign(inner, Var::Param(0));
    assert_eq!(tracker.pointer_locals(outer), vec![3]);
    assert_eq!(tracker.pointer_locals(method), Vec::<u32>::new());
}

fn local(name: &str, ty: TypeId) -> LeftValue {
    LeftValue::new(name, ty, true, Position::synthetic())
}

#[test]
fn finalize_deboxes_and_retypes_captured_parameters() {
    let mut table = TypeTable::new();
    let boxed_int = table.pointer_to(TypeId::INT);
    let boxed_long = table.pointer_to(TypeId::LONG);

    let mut tracker = CaptureTracker::new();
    let outer = tracker.push_frame(None);
    let lambda = tracker.push_frame(Some(outer));
    tracker.record_origin(lambda, 0, Var::Local(0));
    tracker.record_origin(lambda, 1, Var::Local(1));
    tracker.mark_captured(outer, Var::Local(0));
    tracker.mark_captured(outer, Var::Local(1));
    tracker.on_assign(outer, Var::Local(1));

    let mut method = MethodInfo::new("f", TypeId::VOID, Position::synthetic());
    method.locals = vec![local("a", boxed_int), local("b", boxed_long)];
    let mut synthetic = MethodInfo::new("lambda$f$0", TypeId::VOID, Position::synthetic());
    let mut a = local("a", boxed_int);
    a.captured = true;
    let mut b = local("b", boxed_long);
    b.captured = true;
    synthetic.params = vec![a, b];

    let mut methods = vec![method, synthetic];
    finalize(&table, &tracker, &mut methods);

    assert_eq!(methods[0].locals[0].ty, TypeId::INT);
    assert!(methods[0].locals[0].deboxed);
    assert_eq!(methods[0].locals[1].ty, boxed_long);
    assert_eq!(methods[0].capture.pointer_locals, vec![1]);
    assert_eq!(methods[1].params[0].ty, TypeId::INT);
    assert_eq!(methods[1].params[1].ty, boxed_long);
}

#[test]
fn assignment_earlier_in_a_loop_keeps_the_box() {
    let mut tracker = CaptureTracker::new();
    let method = tracker.push_frame(None);
    tracker.enter_loop(method, 1);
    tracker.on_assign(method, Var::Local(0));
    tracker.mark_captured(method, Var::Local(0));
    assert_eq!(tracker.pointer_locals(method), Vec::<u32>::new());
    tracker.exit_loop();
    assert_eq!(tracker.pointer_locals(method), vec![0]);
}

#[test]
fn locals_declared_inside_a_loop_are_fresh_each_iteration() {
    let mut tracker = CaptureTracker::new();
    let method = tracker.push_frame(None);
    tracker.enter_loop(method, 1);
    tracker.on_assign(method, Var::Local(1));
    tracker.mark_captured(method, Var::Local(1));
    tracker.exit_loop();
    assert_eq!(tracker.pointer_locals(method), Vec::<u32>::new());
}

#[test]
fn inner_loop_assignments_replay_in_the_outer_loop() {
    let mut tracker = CaptureTracker::new();
    let method = tracker.push_frame(None);
    tracker.enter_loop(method, 1);
    tracker.enter_loop(method, 1);
    tracker.on_assign(method, Var::Local(0));
    tracker.exit_loop();
    tracker.mark_captured(method, Var::Local(0));
    tracker.exit_loop();
    assert_eq!(tracker.pointer_locals(method), vec![0]);
}
