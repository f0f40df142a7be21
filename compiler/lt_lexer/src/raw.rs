//! Raw tokens of one line, produced by logos.
//!
//! Layout (indentation, layers, pairs) is handled by the scanner; this
//! tokenizer only splits a line's text into pieces.

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t]+")]
pub(crate) enum RawToken {
    #[regex(r"//[^\n]*")]
    LineComment,

    /// Start of a block comment. The scanner looks for the matching `*/`
    /// itself, on this line or a later one.
    #[token("/*")]
    BlockOpen,

    /// Double-quoted string, possibly missing its closing quote.
    #[regex(r#""([^"\\]|\\.)*"?"#)]
    DoubleQuoted,

    /// Single-quoted string, possibly missing its closing quote.
    #[regex(r"'([^'\\]|\\.)*'?")]
    SingleQuoted,

    #[regex(r"`[^`]*`?")]
    BackQuoted,

    #[token("(")]
    #[token("[")]
    #[token("{")]
    Open,

    #[token(")")]
    #[token("]")]
    #[token("}")]
    Close,

    #[token(",")]
    #[token(";")]
    Separator,

    #[token("->")]
    Arrow,

    #[token(".")]
    #[token("...")]
    #[token(":")]
    #[token("::")]
    #[token(":::")]
    #[token(":=")]
    #[token("=")]
    #[token("==")]
    #[token("===")]
    #[token("!")]
    #[token("!=")]
    #[token("!==")]
    #[token("&&")]
    #[token("||")]
    #[token("^^")]
    #[token("<")]
    #[token(">")]
    #[token("<=")]
    #[token(">=")]
    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("%")]
    #[token("++")]
    #[token("--")]
    #[token("<<")]
    #[token(">>")]
    #[token(">>>")]
    #[token("&")]
    #[token("^")]
    #[token("|")]
    #[token("~")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("<<=")]
    #[token(">>=")]
    #[token(">>>=")]
    #[token("&=")]
    #[token("^=")]
    #[token("|=")]
    #[token("@")]
    #[token("#")]
    Symbol,

    /// Any run of characters that cannot start a symbol, string or
    /// separator; classified afterwards.
    #[regex(r#"[^ \t'"`.:=^!&|<>+\-*/%@#~,;()\[\]{}]+"#)]
    Word,
}

/// Closing delimiter for an opening one.
pub(crate) fn closing_of(open: &str) -> &'static str {
    match open {
        "(" => ")",
        "[" => "]",
        _ => "}",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(line: &str) -> Vec<(RawToken, &str)> {
        let mut lexer = RawToken::lexer(line);
        let mut out = Vec::new();
        while let Some(token) = lexer.next() {
            if let Ok(token) = token {
                out.push((token, lexer.slice()));
            }
        }
        out
    }

    #[test]
    fn symbols_take_longest_match() {
        assert_eq!(
            kinds("a>>>=b"),
            vec![
                (RawToken::Word, "a"),
                (RawToken::Symbol, ">>>="),
                (RawToken::Word, "b")
            ]
        );
        assert_eq!(kinds("x->y")[1], (RawToken::Arrow, "->"));
    }

    #[test]
    fn strings_keep_escapes() {
        assert_eq!(
            kinds(r#""a\"b" 'c'"#),
            vec![
                (RawToken::DoubleQuoted, r#""a\"b""#),
                (RawToken::SingleQuoted, "'c'")
            ]
        );
        assert_eq!(kinds("'open"), vec![(RawToken::SingleQuoted, "'open")]);
    }

    #[test]
    fn comments() {
        assert_eq!(kinds("a // b"), vec![(RawToken::Word, "a"), (RawToken::LineComment, "// b")]);
        assert_eq!(kinds("a /* b")[..2], [(RawToken::Word, "a"), (RawToken::BlockOpen, "/*")]);
        assert_eq!(kinds("a / b")[1], (RawToken::Symbol, "/"));
    }

    #[test]
    fn question_mark_is_part_of_a_word() {
        assert_eq!(kinds("a ?"), vec![(RawToken::Word, "a"), (RawToken::Word, "?")]);
    }
}
