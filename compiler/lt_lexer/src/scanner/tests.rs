use std::sync::Arc;

use lt_diagnostic::{CompileError, ErrorKind, ErrorManager};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::{scan, EndingKind, LayerTree, ScanConfig, TokenKind};

fn scan_str(source: &str) -> (LayerTree, Vec<CompileError>) {
    let errors = ErrorManager::default();
    let tree = scan(
        Arc::from("test.lt"),
        source,
        &ScanConfig::default(),
        &errors,
    )
    .unwrap();
    (tree, errors.errors())
}

fn rendered(source: &str) -> String {
    let (tree, errors) = scan_str(source);
    assert_eq!(errors, vec![]);
    tree.to_string()
}

#[test]
fn indented_block_becomes_layer() {
    assert_eq!(rendered("class User\n    id = 1"), "class User [id = 1]");
}

#[test]
fn dedent_appends_weak_ending() {
    assert_eq!(rendered("if a\n    b\nc"), "if a [b] / c");
}

#[test]
fn over_indent_reports_once() {
    let (tree, errors) = scan_str("class User\n   id = 1");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Indentation);
    assert_eq!((errors[0].line(), errors[0].column()), (2, 4));
    assert_eq!(tree.to_string(), "class User [id = 1]");
}

#[test]
fn misindented_block_stays_one_layer() {
    let (tree, errors) = scan_str("class User\n   id = 1\n   name = 2\nx = 3");
    assert_eq!(errors.len(), 1);
    assert_eq!((errors[0].line(), errors[0].column()), (2, 4));
    assert_eq!(tree.to_string(), "class User [id = 1 / name = 2] / x = 3");
}

#[test]
fn too_deep_indent_opens_one_layer() {
    let (tree, errors) = scan_str("a\n        b\n        c");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Indentation);
    assert_eq!((errors[0].line(), errors[0].column()), (2, 9));
    assert_eq!(tree.to_string(), "a [b / c]");
}

#[test]
fn dedent_to_unknown_level() {
    let (tree, errors) = scan_str("a\n    b\n        c\n  d");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Indentation);
    assert_eq!((errors[0].line(), errors[0].column()), (4, 3));
    assert_eq!(tree.to_string(), "a [b [c]] / d");
}

#[test]
fn root_indent_comes_from_first_line() {
    assert_eq!(rendered("  a\n  b"), "a / b");
}

#[test]
fn mismatched_close_is_replaced() {
    let (tree, errors) = scan_str("{'id':1]");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::UnexpectedToken);
    assert_eq!((errors[0].line(), errors[0].column()), (1, 8));
    assert_eq!(tree.to_string(), "{ ['id' : 1] }");
}

#[test]
fn stray_close_is_kept() {
    let (tree, errors) = scan_str("a)");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::UnexpectedToken);
    assert_eq!((errors[0].line(), errors[0].column()), (1, 2));
    assert_eq!(tree.to_string(), "a )");
}

#[test]
fn unknown_token_is_skipped() {
    let (tree, errors) = scan_str("a ? = 1");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::UnknownToken);
    assert_eq!((errors[0].line(), errors[0].column()), (1, 3));
    assert_eq!(tree.to_string(), "a = 1");
}

#[test]
fn pairs_ignore_indentation() {
    assert_eq!(rendered("foo(\n  a,\n      b\n)"), "foo ( [a , b] )");
}

#[test]
fn empty_pair_has_no_layer() {
    assert_eq!(rendered("f()"), "f ( )");
}

#[test]
fn arrow_opens_layer() {
    assert_eq!(rendered("f = x->x+1"), "f = x -> [x + 1]");
    assert_eq!(rendered("map(x->x*2)"), "map ( [x -> [x * 2]] )");
    assert_eq!(rendered("f = ->\n    1\ng"), "f = -> [1] / g");
}

#[test]
fn separators_are_strong_endings() {
    let (tree, _) = scan_str("a, b; c");
    assert_eq!(tree.to_string(), "a , b , c");
    let endings: Vec<_> = tree
        .chain(tree.root())
        .filter_map(|id| tree.ending(id))
        .collect();
    assert_eq!(endings, vec![EndingKind::Strong, EndingKind::Strong]);
}

#[test]
fn numbers_are_joined() {
    let (tree, _) = scan_str("a = 1.5");
    let last = tree.chain(tree.root()).last().unwrap();
    assert_eq!(tree.text(last), Some("1.5"));
    assert_eq!(tree.token_kind(last), Some(TokenKind::Number));
    assert_eq!(rendered("1.toString()"), "1 . toString ( )");
}

#[test]
fn classifies_elements() {
    let (tree, _) = scan_str("val x:int = yes");
    let kinds: Vec<_> = tree
        .chain(tree.root())
        .filter_map(|id| tree.token_kind(id))
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Modifier,
            TokenKind::Name,
            TokenKind::Symbol,
            TokenKind::Keyword,
            TokenKind::Symbol,
            TokenKind::Bool
        ]
    );
}

#[test]
fn back_quoted_names_are_stripped() {
    let (tree, _) = scan_str("`is` = 1");
    let first = tree.chain(tree.root()).next().unwrap();
    assert_eq!(tree.text(first), Some("is"));
    assert_eq!(tree.token_kind(first), Some(TokenKind::Name));
}

#[test]
fn comments_are_dropped() {
    assert_eq!(rendered("a // b\n// c\nd"), "a / d");
    assert_eq!(rendered("a /* b */ c"), "a c");
}

#[test]
fn block_comment_before_line_end_keeps_the_ending() {
    assert_eq!(rendered("x = 1 /* note */\ny = 2"), "x = 1 / y = 2");
    assert_eq!(rendered("x = 1 /* a */ /* b */\ny = 2"), "x = 1 / y = 2");
}

#[test]
fn comment_only_lines_do_not_affect_layout() {
    assert_eq!(
        rendered("class A\n    /* doc */\n    x = 1\n/* open\n  still comment\n*/\ny = 2"),
        "class A [x = 1] / y = 2"
    );
}

#[test]
fn block_comment_across_lines() {
    let (tree, errors) = scan_str("a /* x\ny */ b");
    assert_eq!(errors, vec![]);
    assert_eq!(tree.to_string(), "a b");
    let b = tree.chain(tree.root()).last().unwrap();
    assert_eq!(tree.position(b).column, 6);
}

#[test]
fn unterminated_string_is_closed() {
    let (tree, errors) = scan_str("a = 'x");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Syntax);
    assert_eq!(tree.to_string(), "a = 'x'");
}

#[test]
fn define_and_undef() {
    assert_eq!(
        rendered("define \"X\" as \"1\"\na = X // X\nundef \"X\"\nb = X"),
        "a = 1 / b = X"
    );
}

#[test]
fn bad_define_is_syntax_error() {
    let (_, errors) = scan_str("define \"X\" \"1\"");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Syntax);
}

#[test]
fn bases_shift_positions() {
    let errors = ErrorManager::default();
    let config = ScanConfig::default().with_bases(10, 4);
    let tree = scan(Arc::from("t.lt"), "a", &config, &errors).unwrap();
    let a = tree.chain(tree.root()).next().unwrap();
    assert_eq!((tree.position(a).line, tree.position(a).column), (11, 5));
}

#[test]
fn custom_indent_step() {
    let errors = ErrorManager::default();
    let config = ScanConfig::default().with_indent_step(2);
    let tree = scan(Arc::from("t.lt"), "a\n  b", &config, &errors).unwrap();
    assert!(!errors.has_errors());
    assert_eq!(tree.to_string(), "a [b]");
}

#[test]
fn fast_fail_stops_at_first_error() {
    let errors = ErrorManager::new(true);
    let result = scan(
        Arc::from("t.lt"),
        "a ?\nb ?",
        &ScanConfig::default(),
        &errors,
    );
    let error = result.unwrap_err();
    assert_eq!(error.kind, ErrorKind::UnknownToken);
    assert_eq!(errors.error_count(), 1);
}

#[test]
fn empty_source_is_empty_tree() {
    let (tree, errors) = scan_str("\n   \n");
    assert!(errors.is_empty());
    assert!(tree.is_empty());
}

fn indented_source() -> impl Strategy<Value = String> {
    proptest::collection::vec((any::<bool>(), 0usize..8), 1..40).prop_map(|steps| {
        let mut depth = 0usize;
        let mut lines = Vec::new();
        for (index, (deeper, back)) in steps.into_iter().enumerate() {
            if index > 0 {
                depth = if deeper { depth + 1 } else { back % (depth + 1) };
            }
            lines.push(format!("{}a{index}", " ".repeat(depth * 4)));
        }
        lines.join("\n")
    })
}

proptest! {
    #[test]
    fn consistent_indentation_never_errors(source in indented_source()) {
        let (_, errors) = scan_str(&source);
        prop_assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn scanning_is_deterministic(source in "[a-z(){}\\[\\] =,+\\n]{0,60}") {
        let (first, first_errors) = scan_str(&source);
        let (second, second_errors) = scan_str(&source);
        prop_assert_eq!(first.to_string(), second.to_string());
        prop_assert_eq!(first_errors, second_errors);
    }
}
