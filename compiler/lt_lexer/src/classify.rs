//! Classification of word tokens.

use crate::TokenKind;

/// Latte keywords plus the Java keywords that cannot be used as names.
const KEYWORDS: &[&str] = &[
    "is", "not", "bool", "yes", "no", "type", "as", "in", "elseif", "package", "import", "break",
    "continue", "return", "fun", "require", "new", "object", "implicit", "match", "case",
    "annotation", "abstract", "assert", "boolean", "byte", "catch", "char", "class", "const",
    "default", "do", "double", "else", "enum", "extends", "final", "finally", "float", "for", "if",
    "implements", "instanceof", "int", "interface", "long", "native", "null", "private",
    "protected", "public", "short", "static", "strictfp", "throw", "try", "while", "void",
];

/// Words Java itself reserves; these stay invalid even when back-quoted.
const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "if", "implements", "import", "instanceof", "int", "interface", "long", "native", "new",
    "null", "package", "private", "protected", "public", "return", "short", "static", "strictfp",
    "throw", "try", "while", "void",
];

const MODIFIERS: &[&str] = &[
    "public", "protected", "private", "internal", "abstract", "val", "native", "synchronized",
    "transient", "volatile", "strictfp", "data", "var", "def", "nonnull", "nonempty", "implicit",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word) || MODIFIERS.contains(&word)
}

pub fn is_modifier(word: &str) -> bool {
    MODIFIERS.contains(&word)
}

pub fn is_bool(word: &str) -> bool {
    matches!(word, "true" | "false" | "yes" | "no")
}

/// Decimal number, optionally with an exponent and a `f`/`d` suffix.
pub fn is_number(word: &str) -> bool {
    let body = word
        .strip_suffix(['f', 'F', 'd', 'D'])
        .filter(|b| !b.is_empty())
        .unwrap_or(word);
    body.starts_with(|c: char| c.is_ascii_digit()) && body.parse::<f64>().is_ok()
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '$' || c == '_'
}

fn is_java_name(word: &str) -> bool {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    is_name_start(first)
        && chars.all(|c| is_name_start(c) || c.is_ascii_digit())
        && !JAVA_KEYWORDS.contains(&word)
}

/// Identifier usable as a name without back-quotes.
pub fn is_valid_name(word: &str) -> bool {
    is_java_name(word) && !is_keyword(word)
}

/// Content of a back-quoted identifier when it is valid.
pub(crate) fn back_quoted_name(token: &str) -> Option<&str> {
    let inner = token.strip_prefix('`')?.strip_suffix('`')?;
    is_java_name(inner).then_some(inner)
}

/// Kind of a bare word, or `None` when it matches no token grammar.
pub(crate) fn classify_word(word: &str) -> Option<TokenKind> {
    if is_bool(word) {
        Some(TokenKind::Bool)
    } else if is_modifier(word) {
        Some(TokenKind::Modifier)
    } else if is_number(word) {
        Some(TokenKind::Number)
    } else if is_keyword(word) {
        Some(TokenKind::Keyword)
    } else if is_valid_name(word) {
        Some(TokenKind::Name)
    } else {
        None
    }
}

#[cfg(test)]
mod tests;
