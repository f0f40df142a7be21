use lt_ir::ast::{
    Access, For, If, IfPair, Invocation, Return, StaticScope, Synchronized, Throw, Try, VariableDef,
    While,
};
use lt_ir::{BinaryOp, Expr, Loc, Stmt};
use pretty_assertions::assert_eq;

use super::parse_ok;

fn name(text: &str) -> Stmt {
    Stmt::Expr(Expr::name(text))
}

fn branch(condition: Option<&str>, body: &str) -> IfPair {
    IfPair {
        condition: condition.map(Expr::name),
        body: vec![name(body)],
        loc: Loc::synthetic(),
    }
}

#[test]
fn if_elseif_else() {
    assert_eq!(
        parse_ok("if a\n    b\nelseif c\n    d\nelse\n    e"),
        vec![Stmt::If(If {
            branches: vec![
                branch(Some("a"), "b"),
                branch(Some("c"), "d"),
                branch(None, "e")
            ],
            loc: Loc::synthetic(),
        })]
    );
}

#[test]
fn else_if_on_one_line() {
    assert_eq!(
        parse_ok("if a\n    b\nelse if c\n    d"),
        vec![Stmt::If(If {
            branches: vec![branch(Some("a"), "b"), branch(Some("c"), "d")],
            loc: Loc::synthetic(),
        })]
    );
}

#[test]
fn if_followed_by_statement() {
    let statements = parse_ok("if a\n    b\nc");
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[1], name("c"));
}

#[test]
fn while_and_do_while() {
    assert_eq!(
        parse_ok("while a\n    b"),
        vec![Stmt::While(While {
            condition: Expr::name("a"),
            body: vec![name("b")],
            do_while: false,
            loc: Loc::synthetic(),
        })]
    );
    assert_eq!(
        parse_ok("do\n    b\nwhile a"),
        vec![Stmt::While(While {
            condition: Expr::name("a"),
            body: vec![name("b")],
            do_while: true,
            loc: Loc::synthetic(),
        })]
    );
}

#[test]
fn for_in() {
    assert_eq!(
        parse_ok("for x in xs\n    x"),
        vec![Stmt::For(For {
            name: "x".to_owned(),
            exp: Expr::name("xs"),
            body: vec![name("x")],
            loc: Loc::synthetic(),
        })]
    );
}

#[test]
fn for_variable_is_in_scope() {
    let statements = parse_ok("for x in xs\n    x = 1");
    let Stmt::For(for_stmt) = &statements[0] else {
        panic!("expected for");
    };
    assert!(matches!(for_stmt.body[0], Stmt::Expr(Expr::Assignment(_))));
}

#[test]
fn try_catch_finally() {
    assert_eq!(
        parse_ok("try\n    a\ncatch e\n    b\nfinally\n    c"),
        vec![Stmt::Try(Try {
            body: vec![name("a")],
            catch_var: Some("e".to_owned()),
            catch_body: vec![name("b")],
            finally_body: vec![name("c")],
            loc: Loc::synthetic(),
        })]
    );
}

#[test]
fn synchronized_block() {
    assert_eq!(
        parse_ok("synchronized(lock, other)\n    a"),
        vec![Stmt::Synchronized(Synchronized {
            locks: vec![Expr::name("lock"), Expr::name("other")],
            body: vec![name("a")],
            loc: Loc::synthetic(),
        })]
    );
}

#[test]
fn jumps() {
    assert_eq!(
        parse_ok("throw e\nreturn\nreturn a + 1\nbreak\ncontinue\n..."),
        vec![
            Stmt::Throw(Throw {
                exp: Expr::name("e"),
                loc: Loc::synthetic(),
            }),
            Stmt::Return(Return {
                exp: None,
                loc: Loc::synthetic(),
            }),
            Stmt::Return(Return {
                exp: Some(Expr::binary(
                    BinaryOp::Add,
                    Expr::name("a"),
                    Expr::number("1")
                )),
                loc: Loc::synthetic(),
            }),
            Stmt::Break(Loc::synthetic()),
            Stmt::Continue(Loc::synthetic()),
            Stmt::Pass(Loc::synthetic()),
        ]
    );
}

#[test]
fn static_scope_forms() {
    let expected = vec![Stmt::StaticScope(StaticScope {
        body: vec![Stmt::Expr(Expr::VariableDef(
            VariableDef::new("count").with_init(Expr::number("0")),
        ))],
        loc: Loc::synthetic(),
    })];
    assert_eq!(parse_ok("static\n    count = 0"), expected);
    assert_eq!(parse_ok("static count = 0"), expected);
}

#[test]
fn statements_separated_by_commas() {
    assert_eq!(
        parse_ok("f(a), g(b)"),
        vec![
            Stmt::Expr(Expr::Invocation(Invocation {
                target: Access::name("f"),
                args: vec![Expr::name("a")],
                loc: Loc::synthetic(),
            })),
            Stmt::Expr(Expr::Invocation(Invocation {
                target: Access::name("g"),
                args: vec![Expr::name("b")],
                loc: Loc::synthetic(),
            })),
        ]
    );
}
