//! End-to-end runs of the driver over small units.

use lt_diagnostic::{ErrorKind, ErrorManager};
use lt_lexer::ScanConfig;
use lt_types::MemoryClasspath;
use ltc::{CompileFailure, Compiler, CompilerConfig, Source};
use pretty_assertions::assert_eq;

fn over_indented(name: &str) -> Source {
    Source::new(&format!("{name}.lt"), format!("class {name}\n   id = 1"))
}

#[test]
fn unit_resolves_across_files() {
    let classpath = MemoryClasspath::bootstrap();
    let compiler = Compiler::new(CompilerConfig::default(), &classpath);
    let sources = [
        Source::new("shape.lt", "package geo\ninterface Shape\n    area():double"),
        Source::new(
            "square.lt",
            "package geo\nclass Square(side:double):Shape\n    area():double = side * side",
        ),
    ];
    let unit = match compiler.compile(&sources) {
        Ok(unit) => unit,
        Err(failure) => panic!("unexpected failure: {failure:?}"),
    };
    let names: Vec<String> = unit.defined.iter().map(|&id| unit.table.name(id)).collect();
    assert_eq!(names, ["geo.Shape", "geo.Square"]);
}

#[test]
fn collects_every_syntax_error_without_fast_fail() {
    let classpath = MemoryClasspath::bootstrap();
    let compiler = Compiler::new(CompilerConfig::default().with_fast_fail(false), &classpath);
    let failure = compiler
        .compile(&[over_indented("A"), over_indented("B")])
        .unwrap_err();
    let CompileFailure::Collected(errors) = &failure else {
        panic!("expected collected errors, got {failure:?}");
    };
    let found: Vec<(&str, ErrorKind, i32, i32)> = errors
        .iter()
        .map(|e| (&*e.position.file, e.kind, e.line(), e.column()))
        .collect();
    assert_eq!(
        found,
        [
            ("A.lt", ErrorKind::Indentation, 2, 4),
            ("B.lt", ErrorKind::Indentation, 2, 4),
        ]
    );
    assert_eq!(failure.errors().len(), 2);
}

#[test]
fn fast_fail_returns_the_first_error_alone() {
    let classpath = MemoryClasspath::bootstrap();
    let compiler = Compiler::new(CompilerConfig::default(), &classpath);
    let failure = compiler.compile(&[over_indented("A")]).unwrap_err();
    let CompileFailure::Failed(error) = &failure else {
        panic!("expected a single error, got {failure:?}");
    };
    assert_eq!(error.kind, ErrorKind::Indentation);
}

#[test]
fn resolution_errors_fail_the_unit() {
    let classpath = MemoryClasspath::bootstrap();
    let compiler = Compiler::new(CompilerConfig::default().with_fast_fail(false), &classpath);
    let failure = compiler
        .compile(&[Source::new("a.lt", "class A:Missing")])
        .unwrap_err();
    let errors = failure.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Resolution);
}

#[test]
fn parse_output_does_not_depend_on_thread_count() {
    let classpath = MemoryClasspath::bootstrap();
    let sources: Vec<Source> = (0..16)
        .map(|i| {
            Source::new(
                &format!("f{i}.lt"),
                format!("class C{i}\n    f(x:int):int\n        if x > {i}\n            return x\n        return {i}"),
            )
        })
        .collect();
    let single = Compiler::new(CompilerConfig::default().with_threads(1, 1), &classpath);
    let many = Compiler::new(CompilerConfig::default().with_threads(4, 3), &classpath);
    let errors = ErrorManager::new(true);
    let expected = single.parse(&sources, &errors).unwrap();
    let actual = many.parse(&sources, &errors).unwrap();
    assert_eq!(actual, expected);
    assert!(!errors.has_errors());
}

#[test]
fn errors_render_against_their_own_file() {
    let classpath = MemoryClasspath::bootstrap();
    let config = CompilerConfig::default()
        .with_fast_fail(false)
        .with_scan(ScanConfig::default().with_bases(10, 4));
    let compiler = Compiler::new(config, &classpath);
    let sources = [
        Source::new("ok.lt", "class Ok"),
        Source::new("bad.lt", "class Bad\n   id = 1"),
    ];
    let failure = compiler.compile(&sources).unwrap_err();
    let [error] = failure.errors() else {
        panic!("expected one error, got {failure:?}");
    };
    assert_eq!((error.line(), error.column()), (12, 8));
    let rendered = compiler.render(error, &sources);
    assert!(rendered.ends_with("\n   id = 1\n   ^"), "{rendered}");
}

#[test]
fn tracing_setup_can_run_twice() {
    ltc::tracing_setup::init();
    ltc::tracing_setup::init();
}
