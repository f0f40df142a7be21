use super::*;
use pretty_assertions::assert_eq;

#[test]
fn classification_order() {
    assert_eq!(classify_word("yes"), Some(TokenKind::Bool));
    assert_eq!(classify_word("abstract"), Some(TokenKind::Modifier));
    assert_eq!(classify_word("synchronized"), Some(TokenKind::Modifier));
    assert_eq!(classify_word("12"), Some(TokenKind::Number));
    assert_eq!(classify_word("1e5"), Some(TokenKind::Number));
    assert_eq!(classify_word("2f"), Some(TokenKind::Number));
    assert_eq!(classify_word("class"), Some(TokenKind::Keyword));
    assert_eq!(classify_word("int"), Some(TokenKind::Keyword));
    assert_eq!(classify_word("$user_1"), Some(TokenKind::Name));
    assert_eq!(classify_word("?"), None);
    assert_eq!(classify_word("1a"), None);
    assert_eq!(classify_word("nan"), Some(TokenKind::Name));
}

#[test]
fn back_quotes_allow_latte_keywords_only() {
    assert_eq!(back_quoted_name("`is`"), Some("is"));
    assert_eq!(back_quoted_name("`class`"), None);
    assert_eq!(back_quoted_name("`a b`"), None);
    assert_eq!(back_quoted_name("`open"), None);
}
