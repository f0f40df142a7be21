//! Resolution of whole sources: scanned, parsed and resolved against the
//! bootstrap classpath.

use std::sync::Arc;

use lt_diagnostic::{CompileError, ErrorKind, ErrorManager};
use lt_ir::Modifiers;
use lt_lexer::{scan, ScanConfig};
use lt_parse::parse;
use pretty_assertions::assert_eq;

use crate::{
    resolve, CastKind, Instruction, MemoryClasspath, MethodInfo, MethodRef, ResolvedUnit, ResolverConfig, TypeDef,
    TypeId, Value,
};

fn resolve_source(source: &str) -> Result<ResolvedUnit, CompileError> {
    let errors = ErrorManager::new(true);
    let tree = scan(Arc::from("test.lt"), source, &ScanConfig::default(), &errors)?;
    let statements = parse(&tree, &errors)?;
    resolve(
        vec![(Arc::from("test.lt"), statements)],
        &MemoryClasspath::bootstrap(),
        &ResolverConfig::default(),
    )
}

fn resolve_ok(source: &str) -> ResolvedUnit {
    match resolve_source(source) {
        Ok(unit) => unit,
        Err(error) => panic!("unexpected error: {error}"),
    }
}

fn resolve_err(source: &str) -> CompileError {
    match resolve_source(source) {
        Ok(_) => panic!("expected an error for:\n{source}"),
        Err(error) => error,
    }
}

fn class_id(unit: &ResolvedUnit, name: &str) -> TypeId {
    unit.table.lookup(name).unwrap_or_else(|| panic!("no type {name}"))
}

fn methods<'u>(unit: &'u ResolvedUnit, class: &str, name: &str) -> Vec<&'u MethodInfo> {
    let id = class_id(unit, class);
    unit.table
        .object(id)
        .map(|o| o.methods.iter().filter(|m| m.name == name).collect())
        .unwrap_or_default()
}

fn method<'u>(unit: &'u ResolvedUnit, class: &str, name: &str) -> &'u MethodInfo {
    match methods(unit, class, name).as_slice() {
        [single] => single,
        other => panic!("expected one method {name}, found {}", other.len()),
    }
}

/// Top-level calls of a body: evaluated or returned invocations.
fn calls(method: &MethodInfo) -> Vec<&crate::Invoke> {
    method
        .body
        .iter()
        .filter_map(|instruction| match instruction {
            Instruction::Eval(Value::Invoke(invoke)) | Instruction::Return(Some(Value::Invoke(invoke))) => {
                Some(invoke.as_ref())
            }
            _ => None,
        })
        .collect()
}

fn param_types(unit: &ResolvedUnit, method: MethodRef) -> Vec<TypeId> {
    unit.table
        .method(method)
        .map(|m| m.param_types().to_vec())
        .unwrap_or_default()
}

#[test]
fn defined_types_in_declaration_order() {
    let unit = resolve_ok("package app\nclass A\ninterface I\nclass B:A, I");
    let names: Vec<String> = unit.defined.iter().map(|&id| unit.table.name(id)).collect();
    assert_eq!(names, ["app.A", "app.I", "app.B"]);
    let b = unit.table.object(class_id(&unit, "app.B")).unwrap();
    assert_eq!(b.super_class, Some(class_id(&unit, "app.A")));
    assert_eq!(b.interfaces, vec![class_id(&unit, "app.I")]);
}

#[test]
fn overload_picks_nearest_widening() {
    let unit = resolve_ok(
        "class A\n    f(x:int):int = 1\n    f(x:long):int = 2\n    g(b:byte):int = f(b)",
    );
    let g = method(&unit, "A", "g");
    let call = calls(g)[0];
    assert_eq!(param_types(&unit, call.method), vec![TypeId::INT]);
}

#[test]
fn overload_boxes_only_when_nothing_else_applies() {
    let unit = resolve_ok("class A\n    f(x:Object):int = 1\n    g():int = f(1)");
    let g = method(&unit, "A", "g");
    let call = calls(g)[0];
    assert!(matches!(
        call.args.as_slice(),
        [Value::Cast {
            kind: CastKind::Box,
            ..
        }]
    ));
}

#[test]
fn overload_never_narrows() {
    let error = resolve_err("class A\n    f(x:int):int = 1\n    g():int = f(1.5)");
    assert_eq!(error.kind, ErrorKind::Resolution);
    assert!(error.message.contains("no applicable overload"), "{error}");
}

#[test]
fn overload_ambiguity_is_an_error() {
    let error = resolve_err(
        "class A\n    f(a:int, b:long):int = 1\n    f(a:long, b:int):int = 2\n    g():int = f(1, 1)",
    );
    assert!(error.message.contains("ambiguous call to f"), "{error}");
}

#[test]
fn class_params_become_fields_and_constructor_params() {
    let unit = resolve_ok("class Point(x:int, y:long)");
    let point = unit.table.object(class_id(&unit, "Point")).unwrap();
    let fields: Vec<(&str, TypeId)> = point.fields.iter().map(|f| (f.name.as_str(), f.ty)).collect();
    assert_eq!(fields, [("x", TypeId::INT), ("y", TypeId::LONG)]);
    assert_eq!(point.constructors.len(), 1);
    let slots: Vec<Option<u32>> = point.constructors[0].params.iter().map(|p| p.slot).collect();
    assert_eq!(slots, [Some(1), Some(2)]);
}

#[test]
fn default_params_generate_shorter_overloads() {
    let unit = resolve_ok("class A\n    f(a:int, b:int = 2):int = a + b");
    let mut arities: Vec<usize> = methods(&unit, "A", "f").iter().map(|m| m.params.len()).collect();
    arities.sort_unstable();
    assert_eq!(arities, [1, 2]);
}

#[test]
fn long_params_take_two_slots() {
    let unit = resolve_ok("class A\n    f(a:long, b:int):int\n        return b");
    let f = method(&unit, "A", "f");
    let slots: Vec<Option<u32>> = f.params.iter().map(|p| p.slot).collect();
    assert_eq!(slots, [Some(1), Some(3)]);
}

#[test]
fn captured_local_without_later_assignment_is_deboxed() {
    let unit = resolve_ok("class A\n    f():int\n        x = 1\n        g = ()->x\n        return x");
    let f = method(&unit, "A", "f");
    let x = f.locals.iter().find(|l| l.name == "x").unwrap();
    assert_eq!(x.ty, TypeId::INT);
    assert!(x.deboxed);
    assert!(f.capture.pointer_locals.is_empty());
}

#[test]
fn captured_local_assigned_after_capture_keeps_its_box() {
    let unit = resolve_ok(
        "class A\n    f():int\n        x = 1\n        g = ()->x\n        x = 2\n        return x",
    );
    let f = method(&unit, "A", "f");
    let index = f.locals.iter().position(|l| l.name == "x").unwrap();
    let x = &f.locals[index];
    assert_eq!(unit.table.pointee(x.ty), Some(TypeId::INT));
    assert!(!x.deboxed);
    assert_eq!(f.capture.pointer_locals, vec![u32::try_from(index).unwrap()]);
}

#[test]
fn captured_local_assigned_earlier_in_a_loop_keeps_its_box() {
    let unit = resolve_ok(
        "class A\n    f():int\n        x = 0\n        while x < 3\n            x = x + 1\n            g = ()->x\n        return x",
    );
    let f = method(&unit, "A", "f");
    let index = f.locals.iter().position(|l| l.name == "x").unwrap();
    let x = &f.locals[index];
    assert_eq!(unit.table.pointee(x.ty), Some(TypeId::INT));
    assert!(!x.deboxed);
    assert_eq!(f.capture.pointer_locals, vec![u32::try_from(index).unwrap()]);
}

#[test]
fn local_declared_in_a_loop_body_is_still_deboxed() {
    let unit = resolve_ok(
        "class A\n    f():int\n        n = 0\n        while n < 3\n            y = n\n            g = ()->y\n            n = n + 1\n        return n",
    );
    let f = method(&unit, "A", "f");
    let y = f.locals.iter().find(|l| l.name == "y").unwrap();
    assert_eq!(y.ty, TypeId::INT);
    assert!(y.deboxed);
    assert!(f.capture.pointer_locals.is_empty());
}

#[test]
fn unused_captured_params_take_no_slot() {
    let unit = resolve_ok(
        "class A\n    f():int\n        a = 1\n        b = 2\n        g = ()->b\n        return a",
    );
    let lambdas: Vec<&MethodInfo> = unit
        .table
        .object(class_id(&unit, "A"))
        .unwrap()
        .methods
        .iter()
        .filter(|m| m.name.starts_with("lambda$"))
        .collect();
    assert_eq!(lambdas.len(), 1);
    let lambda = lambdas[0];
    assert!(lambda.synthetic);
    assert_eq!(lambda.capture.captured_params, 2);
    let a = lambda.params.iter().find(|p| p.name == "a").unwrap();
    let b = lambda.params.iter().find(|p| p.name == "b").unwrap();
    assert_eq!(a.slot, None);
    assert_eq!(b.slot, Some(1));
}

#[test]
fn annotation_outside_its_targets_is_rejected() {
    let error = resolve_err("@Override\nclass A");
    assert_eq!(error.kind, ErrorKind::Resolution);
    assert!(error.message.contains("not applicable"), "{error}");
}

#[test]
fn source_retention_annotations_are_dropped() {
    let unit = resolve_ok("class A\n    @Override\n    toString():String = 'a'\n    @Deprecated\n    old() = ...");
    assert!(method(&unit, "A", "toString").annos.is_empty());
    assert_eq!(method(&unit, "A", "old").annos.len(), 1);
}

#[test]
fn unit_annotation_meta_annotations_are_honored() {
    let source = "import java::lang::annotation::_\n\
                  @Target([ElementType.METHOD])\n\
                  @Retention(RetentionPolicy.RUNTIME)\n\
                  annotation Marker\n    level:int = 1\n\
                  class A\n    @Marker(level = 2)\n    f() = ...";
    let unit = resolve_ok(source);
    let marker = class_id(&unit, "Marker");
    assert!(matches!(unit.table.get(marker), TypeDef::Annotation(_)));
    let annos = &method(&unit, "A", "f").annos;
    assert_eq!(annos.len(), 1);
    assert_eq!(annos[0].ty, marker);
    assert_eq!(annos[0].args, vec![("level".to_owned(), Value::Const(crate::Constant::Int(2)))]);

    let misplaced = source.replace("class A\n    @Marker(level = 2)\n    f() = ...", "@Marker\nclass A");
    assert!(resolve_err(&misplaced).message.contains("not applicable"));
}

#[test]
fn unknown_annotation_element_is_rejected() {
    let error = resolve_err("class A\n    @Deprecated(since = 1)\n    f() = ...");
    assert!(error.message.contains("has no element since"), "{error}");
}

#[test]
fn cyclic_inheritance_is_rejected() {
    let error = resolve_err("class A:B\nclass B:A");
    assert!(error.message.contains("cyclic inheritance"), "{error}");
}

#[test]
fn interfaces_extend_only_interfaces() {
    let error = resolve_err("class A\ninterface I:A");
    assert!(error.message.contains("can only extend interfaces"), "{error}");
}

#[test]
fn concrete_class_must_implement_abstract_methods() {
    let error = resolve_err("interface Shape\n    area():double\nclass Square:Shape");
    assert!(error.message.contains("must implement Shape.area()"), "{error}");

    resolve_ok("interface Shape\n    area():double\nclass Square:Shape\n    area():double = 1.0");
}

#[test]
fn abstract_method_needs_abstract_class() {
    let error = resolve_err("class A\n    abstract f():int");
    assert!(error.message.contains("is abstract but its class is not"), "{error}");
}

#[test]
fn duplicate_types_are_rejected() {
    let error = resolve_err("class A\nclass A");
    assert!(error.message.contains("duplicate type A"), "{error}");
}

#[test]
fn unresolved_name_is_a_resolution_error() {
    let error = resolve_err("class A\n    f():int = missing");
    assert_eq!(error.kind, ErrorKind::Resolution);
}

#[test]
fn single_type_import_needs_a_package() {
    let error = resolve_err("import List\nclass A");
    assert_eq!(error.kind, ErrorKind::Syntax);
}

#[test]
fn top_level_statements_are_rejected() {
    let error = resolve_err("x = 1");
    assert_eq!(error.kind, ErrorKind::Resolution);
}

#[test]
fn type_of_is_a_class_literal() {
    let unit = resolve_ok("class A\n    f():Class = type String");
    let f = method(&unit, "A", "f");
    let literal = f.body.iter().find_map(|instruction| match instruction {
        Instruction::Return(Some(Value::ClassLit { target, ty })) => Some((*target, *ty)),
        _ => None,
    });
    assert_eq!(
        literal,
        Some((class_id(&unit, "java.lang.String"), class_id(&unit, "java.lang.Class")))
    );
}

#[test]
fn object_is_a_final_class_with_one_instance() {
    let unit = resolve_ok("object Config\n    port = 80");
    let id = class_id(&unit, "Config");
    let object = unit.table.object(id).unwrap();
    assert!(object.is_final());
    assert_eq!(object.constructors.len(), 1);
    assert_eq!(object.constructors[0].modifiers, Modifiers::PRIVATE);

    let singleton = object.fields.iter().find(|f| f.name == "singletonInstance").unwrap();
    assert_eq!(singleton.ty, id);
    assert!(singleton.modifiers.contains(Modifiers::STATIC | Modifiers::VAL | Modifiers::PUBLIC));

    let clinit = method(&unit, "Config", "<clinit>");
    assert!(clinit.body.iter().any(|instruction| matches!(
        instruction,
        Instruction::PutStatic { field, value: Value::New(_) } if field.owner == id
    )));
}

#[test]
fn object_cannot_be_abstract() {
    let error = resolve_err("abstract object O");
    assert!(error.message.contains("object O cannot be abstract"), "{error}");
}

#[test]
fn fun_without_parent_implements_function_n() {
    let unit = resolve_ok("fun Inc(x)\n    return x");
    let id = class_id(&unit, "Inc");
    let object = unit.table.object(id).unwrap();
    assert!(object.is_final());
    assert_eq!(object.interfaces, vec![class_id(&unit, "lt.lang.function.Function1")]);
    assert_eq!(object.constructors.len(), 1);
    assert!(object.constructors[0].params.is_empty());

    let apply = method(&unit, "Inc", "apply");
    let object_type = class_id(&unit, "java.lang.Object");
    assert_eq!(apply.return_type, object_type);
    assert_eq!(&apply.param_types()[..], [object_type]);
    assert!(!apply.is_abstract());
}

#[test]
fn fun_implements_an_interface_declared_later() {
    let unit = resolve_ok(
        "fun Greet(name:String):Greeter\n    return name\ninterface Greeter\n    greet(name:String):String",
    );
    let greet = method(&unit, "Greet", "greet");
    assert_eq!(&greet.param_types()[..], [class_id(&unit, "java.lang.String")]);
}

#[test]
fn fun_must_match_its_functional_method() {
    let error = resolve_err("fun Bad(a, b):Runnable\n    ...");
    assert!(error.message.contains("fun Bad takes 2 parameters but java.lang.Runnable.run takes 0"), "{error}");

    let error = resolve_err("class Base\nfun F:Base");
    assert!(error.message.contains("must implement a functional interface, not Base"), "{error}");
}
