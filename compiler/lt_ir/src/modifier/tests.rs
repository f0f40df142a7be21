use super::*;
use pretty_assertions::assert_eq;

#[test]
fn keywords_round_trip() {
    for modifier in Modifier::ALL {
        assert_eq!(Modifier::from_keyword(modifier.keyword()), Some(modifier));
    }
    assert_eq!(Modifier::from_keyword("static"), None);
}

#[test]
fn rejects_second_access_modifier() {
    let mut set = Modifiers::empty();
    assert!(set.try_insert(Modifier::Public));
    assert!(!set.try_insert(Modifier::Private));
    assert!(!set.try_insert(Modifier::Public));
    assert!(set.has(Modifier::Public));
}

#[test]
fn rejects_val_with_var_or_abstract() {
    let mut set = Modifiers::empty();
    assert!(set.try_insert(Modifier::Val));
    assert!(!set.accepts(Modifier::Var));
    assert!(!set.accepts(Modifier::Abstract));
    assert!(set.accepts(Modifier::Data));

    let mut abstract_first = Modifiers::empty();
    assert!(abstract_first.try_insert(Modifier::Abstract));
    assert!(!abstract_first.accepts(Modifier::Val));
}
