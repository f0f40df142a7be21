use pretty_assertions::assert_eq;

use super::*;

#[test]
fn bootstrap_provides_the_core_surface() {
    let classpath = MemoryClasspath::bootstrap();
    for name in [
        "java.lang.Object",
        "java.lang.String",
        "java.lang.Throwable",
        "java.lang.RuntimeException",
        "java.lang.Iterable",
        "java.util.Iterator",
        "java.util.LinkedHashMap",
        "java.lang.annotation.Target",
        "java.lang.annotation.ElementType",
        "lt.lang.function.Function0",
        "lt.lang.function.Function7",
    ] {
        assert!(
            classpath.resolve_classpath_symbol(name).is_some(),
            "{name} missing"
        );
    }
    assert_eq!(classpath.resolve_classpath_symbol("java.lang.Missing"), None);
}

#[test]
fn object_has_no_super_class() {
    let classpath = MemoryClasspath::bootstrap();
    let object = classpath.resolve_classpath_symbol("java.lang.Object").unwrap();
    assert_eq!(object.super_class, None);
    let string = classpath.resolve_classpath_symbol("java.lang.String").unwrap();
    assert_eq!(string.super_class.as_deref(), Some("java.lang.Object"));
}

#[test]
fn interface_methods_are_abstract() {
    let classpath = MemoryClasspath::bootstrap();
    let function = classpath
        .resolve_classpath_symbol("lt.lang.function.Function2")
        .unwrap();
    assert_eq!(function.kind, ClassKind::Interface);
    assert_eq!(function.methods.len(), 1);
    let apply = &function.methods[0];
    assert_eq!(apply.params.len(), 2);
    assert!(apply.modifiers.contains(Modifiers::ABSTRACT));
}

#[test]
fn enum_constants_are_static_fields() {
    let classpath = MemoryClasspath::bootstrap();
    let policy = classpath
        .resolve_classpath_symbol("java.lang.annotation.RetentionPolicy")
        .unwrap();
    assert_eq!(policy.kind, ClassKind::Enum);
    let names: Vec<&str> = policy.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["SOURCE", "CLASS", "RUNTIME"]);
    assert!(policy.fields[0].modifiers.contains(Modifiers::STATIC));
}

#[test]
fn custom_entries() {
    let classpath = MemoryClasspath::new().with(
        ClassSignature::class("my.Lib")
            .constructor(&["int"])
            .static_method("make", &[], "my.Lib"),
    );
    assert_eq!(classpath.len(), 1);
    let lib = classpath.resolve_classpath_symbol("my.Lib").unwrap();
    assert_eq!(lib.constructors[0].params, vec!["int".to_owned()]);
    assert!(lib.methods[0].modifiers.contains(Modifiers::STATIC));
}
