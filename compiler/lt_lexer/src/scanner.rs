//! Line-oriented scanner building the [`LayerTree`].
//!
//! Each physical line goes through three steps: preprocessor directives
//! and macro replacement, indentation (opening or closing layers), and
//! tokenization of the remaining text. Paired delimiters open flexible
//! layers in which indentation is ignored until the pair closes.

use std::borrow::Cow;

use logos::Logos;
use lt_diagnostic::{CompileError, ErrorManager};
use lt_ir::{FileName, Position};

use crate::classify::{back_quoted_name, classify_word};
use crate::raw::{closing_of, RawToken};
use crate::tree::{EndingKind, Indent, LayerTree, NodeId, NodeKind, TokenKind};
use crate::ScanConfig;

struct OpenLayer {
    node: NodeId,
    indent: Indent,
    /// Indentation of the line that opened the layer when it was not the
    /// layer's own indent. Later lines indented the same way stay in it.
    opened_at: Option<u32>,
}

struct OpenPair {
    close: &'static str,
    /// Index in the layer stack of the layer this pair opened.
    depth: usize,
}

pub(crate) struct Scanner<'a> {
    file: FileName,
    config: &'a ScanConfig,
    errors: &'a ErrorManager,
    tree: LayerTree,
    layers: Vec<OpenLayer>,
    pairs: Vec<OpenPair>,
    previous: Option<NodeId>,
    /// `define` replacements in declaration order.
    defines: Vec<(String, String)>,
    in_block_comment: bool,
    root_indent: Option<u32>,
    line: i32,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(file: FileName, config: &'a ScanConfig, errors: &'a ErrorManager) -> Self {
        let tree = LayerTree::new(Position::new(file.clone(), config.line_base + 1, 1));
        let root = tree.root();
        Scanner {
            file,
            config,
            errors,
            tree,
            layers: vec![OpenLayer {
                node: root,
                indent: Indent::Column(0),
                opened_at: None,
            }],
            pairs: Vec::new(),
            previous: None,
            defines: Vec::new(),
            in_block_comment: false,
            root_indent: None,
            line: config.line_base,
        }
    }

    pub(crate) fn scan(mut self, source: &str) -> Result<LayerTree, CompileError> {
        for (index, text) in source.lines().enumerate() {
            self.line = self.config.line_base + i32::try_from(index + 1).unwrap_or(i32::MAX);
            self.scan_line(text)?;
        }
        let root = self.tree.root();
        self.final_check(root);
        tracing::debug!(
            file = %self.file,
            nodes = self.tree.node_count(),
            "layer tree built"
        );
        Ok(self.tree)
    }

    fn position(&self, column: usize) -> Position {
        let column = i32::try_from(column).unwrap_or(i32::MAX);
        Position::new(self.file.clone(), self.line, self.config.col_base + column)
    }

    fn scan_line(&mut self, text: &str) -> Result<(), CompileError> {
        if self.in_block_comment {
            let Some(end) = text.find("*/") else {
                return Ok(());
            };
            self.in_block_comment = false;
            let rest = &text[end + 2..];
            let column = text[..end + 2].chars().count() + 1;
            self.tokenize(rest, column)?;
            self.end_line(text);
            return Ok(());
        }

        if let Some(rest) = directive(text, "define") {
            return self.define(rest);
        }
        if let Some(rest) = directive(text, "undef") {
            return self.undef(rest);
        }

        let text = self.apply_defines(text);
        let spaces = text.len() - text.trim_start_matches(' ').len();
        let content = &text[spaces..];
        if content.trim().is_empty() || content.starts_with("//") {
            return Ok(());
        }
        if let Some(comment) = content.strip_prefix("/*") {
            match comment.find("*/") {
                None => {
                    self.in_block_comment = true;
                    return Ok(());
                }
                Some(end) if comment[end + 2..].trim().is_empty() => return Ok(()),
                Some(_) => {}
            }
        }

        self.layout(spaces)?;
        self.tokenize(content, spaces + 1)?;
        self.end_line(&text);
        Ok(())
    }

    /// Open or close layers according to the line's indentation.
    fn layout(&mut self, spaces: usize) -> Result<(), CompileError> {
        if !self.pairs.is_empty() {
            return Ok(());
        }
        let position = self.position(spaces + 1);
        let spaces = u32::try_from(spaces).unwrap_or(u32::MAX);
        let root = *self.root_indent.get_or_insert(spaces);
        let indent = spaces.saturating_sub(root);
        let step = self.config.indent_step.max(1);
        let top = self.top_indent();
        tracing::trace!(line = self.line, indent, top, "layout");

        if indent == top || self.top_opened_at() == Some(indent) {
            return Ok(());
        }
        if indent > top {
            // A deeper line is taken as indented by whole steps, rounding
            // up; one layer is opened whatever the depth.
            let rounded = indent.div_ceil(step).saturating_mul(step);
            if rounded != top + step || rounded != indent {
                self.errors.indentation(step, position.clone())?;
            }
            let opened_at = (rounded != indent).then_some(indent);
            self.open_layer_at(Indent::Column(rounded), opened_at, position);
            return Ok(());
        }

        while self.layers.len() > 1 && self.top_indent() > indent && self.top_opened_at() != Some(indent) {
            self.close_layer();
        }
        if self.top_indent() != indent && self.top_opened_at() != Some(indent) {
            self.errors.indentation(step, position.clone())?;
        }
        self.append(NodeKind::Ending(EndingKind::Weak), position);
        Ok(())
    }

    fn tokenize(&mut self, text: &str, start_column: usize) -> Result<(), CompileError> {
        let mut lexer = RawToken::lexer(text);
        while let Some(token) = lexer.next() {
            let slice = lexer.slice();
            let column = start_column + text[..lexer.span().start].chars().count();
            let position = self.position(column);
            match token {
                Ok(RawToken::LineComment) => break,
                Ok(RawToken::BlockOpen) => match lexer.remainder().find("*/") {
                    Some(end) => lexer.bump(end + 2),
                    None => {
                        self.in_block_comment = true;
                        break;
                    }
                },
                Ok(RawToken::DoubleQuoted) => self.string(slice, '"', position)?,
                Ok(RawToken::SingleQuoted) => self.string(slice, '\'', position)?,
                Ok(RawToken::BackQuoted) => match back_quoted_name(slice) {
                    Some(name) => self.element(name, TokenKind::Name, position),
                    None => self.errors.unknown_token(slice, position)?,
                },
                Ok(RawToken::Open) => {
                    self.element(slice, TokenKind::Symbol, position.clone());
                    self.open_layer(Indent::Flex, position);
                    self.pairs.push(OpenPair {
                        close: closing_of(slice),
                        depth: self.layers.len() - 1,
                    });
                }
                Ok(RawToken::Close) => self.close_pair(slice, position)?,
                Ok(RawToken::Separator) => {
                    if self.previous_is_element() {
                        self.append(NodeKind::Ending(EndingKind::Strong), position);
                    }
                }
                Ok(RawToken::Arrow) => {
                    self.element(slice, TokenKind::Symbol, position.clone());
                    let indent = if self.pairs.is_empty() {
                        Indent::Column(self.top_indent() + self.config.indent_step.max(1))
                    } else {
                        Indent::Flex
                    };
                    self.open_layer(indent, position);
                }
                Ok(RawToken::Symbol) => self.element(slice, TokenKind::Symbol, position),
                Ok(RawToken::Word) => match classify_word(slice) {
                    Some(kind) => self.element(slice, kind, position),
                    None => self.errors.unknown_token(slice, position)?,
                },
                Err(()) => self.errors.unknown_token(slice, position)?,
            }
        }
        Ok(())
    }

    fn string(&mut self, slice: &str, quote: char, position: Position) -> Result<(), CompileError> {
        if slice.len() >= 2 && slice.ends_with(quote) {
            self.element(slice, TokenKind::String, position);
        } else {
            self.errors
                .syntax("end of string not found", position.clone())?;
            let mut closed = slice.to_owned();
            closed.push(quote);
            self.element(&closed, TokenKind::String, position);
        }
        Ok(())
    }

    fn close_pair(&mut self, text: &str, position: Position) -> Result<(), CompileError> {
        let Some(pair) = self.pairs.pop() else {
            self.errors
                .unexpected_token("an opening delimiter before it", text, position.clone())?;
            self.element(text, TokenKind::Symbol, position);
            return Ok(());
        };
        if pair.close != text {
            self.errors
                .unexpected_token(pair.close, text, position.clone())?;
        }
        while self.layers.len() > pair.depth {
            self.close_layer();
        }
        self.element(pair.close, TokenKind::Symbol, position);
        Ok(())
    }

    fn end_line(&mut self, text: &str) {
        if !self.in_block_comment && self.previous_is_element() {
            let position = self.position(text.chars().count() + 1);
            self.append(NodeKind::Ending(EndingKind::Weak), position);
        }
    }

    fn define(&mut self, rest: &str) -> Result<(), CompileError> {
        let position = self.position(1);
        let parsed = quoted(rest).and_then(|(target, rest)| {
            let rest = rest.trim_start().strip_prefix("as")?;
            let (replacement, rest) = quoted(rest)?;
            rest.trim().is_empty().then_some((target, replacement))
        });
        match parsed {
            Some((target, _)) if target.is_empty() => {
                self.errors.syntax("define target is empty", position)
            }
            Some((target, replacement)) => {
                self.defines.retain(|(t, _)| t != target);
                self.defines.push((target.to_owned(), replacement.to_owned()));
                Ok(())
            }
            None => self.errors.syntax(
                "illegal define command (define \"target\" as \"replacement\")",
                position,
            ),
        }
    }

    fn undef(&mut self, rest: &str) -> Result<(), CompileError> {
        let position = self.position(1);
        match quoted(rest) {
            Some((target, rest)) if rest.trim().is_empty() => {
                self.defines.retain(|(t, _)| t != target);
                Ok(())
            }
            _ => self
                .errors
                .syntax("illegal undef command (undef \"target\")", position),
        }
    }

    /// Apply `define` replacements to the text before any `//` comment.
    fn apply_defines<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if self.defines.is_empty() {
            return Cow::Borrowed(text);
        }
        let split = text.find("//").unwrap_or(text.len());
        let (code, comment) = text.split_at(split);
        let mut code = code.to_owned();
        for (target, replacement) in &self.defines {
            code = code.replace(target.as_str(), replacement);
        }
        code.push_str(comment);
        Cow::Owned(code)
    }

    fn top_indent(&self) -> u32 {
        match self.layers.last().map(|l| l.indent) {
            Some(Indent::Column(n)) => n,
            _ => 0,
        }
    }

    fn top_opened_at(&self) -> Option<u32> {
        self.layers.last().and_then(|l| l.opened_at)
    }

    fn current_layer(&self) -> NodeId {
        self.layers.last().map_or(self.tree.root(), |l| l.node)
    }

    fn previous_is_element(&self) -> bool {
        self.previous.is_some_and(|p| self.tree.is_element(p))
    }

    fn append(&mut self, kind: NodeKind, position: Position) -> NodeId {
        let layer = self.current_layer();
        let id = self.tree.alloc(kind, position, layer);
        self.tree.link_after(layer, self.previous, id);
        self.previous = Some(id);
        id
    }

    fn element(&mut self, text: &str, kind: TokenKind, position: Position) {
        self.append(
            NodeKind::Element {
                text: text.to_owned(),
                kind,
            },
            position,
        );
    }

    fn open_layer(&mut self, indent: Indent, position: Position) {
        self.open_layer_at(indent, None, position);
    }

    fn open_layer_at(&mut self, indent: Indent, opened_at: Option<u32>, position: Position) {
        let node = self.append(NodeKind::Layer { indent, first: None }, position);
        self.layers.push(OpenLayer { node, indent, opened_at });
        self.previous = None;
    }

    fn close_layer(&mut self) {
        if self.layers.len() > 1 {
            if let Some(layer) = self.layers.pop() {
                self.previous = Some(layer.node);
            }
        }
    }

    /// Normalize a finished layer: drop empty layers and redundant
    /// endings, join `1 . 5` into `1.5`, and end layers that are followed
    /// by more tokens on the same chain.
    fn final_check(&mut self, layer: NodeId) {
        let children: Vec<NodeId> = self.tree.chain(layer).collect();
        for &id in &children {
            if self.tree.is_layer(id) {
                self.final_check(id);
                if self.tree.first_child(id).is_none() {
                    self.tree.unlink(id);
                }
            }
        }

        self.join_numbers(layer);

        let mut cursor = self.tree.first_child(layer);
        while let Some(id) = cursor {
            cursor = self.tree.next(id);
            if self.tree.ending(id).is_some() {
                let leading = self.tree.prev(id).is_none();
                let dangling = cursor.map_or(true, |n| !self.tree.is_element(n));
                if leading || dangling {
                    self.tree.unlink(id);
                }
            }
        }

        let layers: Vec<NodeId> = self
            .tree
            .chain(layer)
            .filter(|&id| self.tree.is_layer(id))
            .collect();
        for id in layers {
            let Some(next) = self.tree.next(id) else {
                continue;
            };
            let closes = [")", "]", "}"].iter().any(|c| self.tree.is_text(next, c));
            if self.tree.is_element(next) && !closes {
                let position = self.tree.position(next).clone();
                let ending = self
                    .tree
                    .alloc(NodeKind::Ending(EndingKind::Synthetic), position, layer);
                self.tree.link_after(layer, Some(id), ending);
            }
        }
    }

    fn join_numbers(&mut self, layer: NodeId) {
        let mut cursor = self.tree.first_child(layer);
        while let Some(id) = cursor {
            cursor = self.tree.next(id);
            let Some(dot) = cursor.filter(|&d| self.tree.is_text(d, ".")) else {
                continue;
            };
            let Some(fraction) = self.tree.next(dot) else {
                continue;
            };
            let (Some(whole_text), Some(fraction_text)) =
                (self.plain_integer(id), self.plain_integer(fraction))
            else {
                continue;
            };
            let text = format!("{whole_text}.{fraction_text}");
            self.tree.replace_kind(
                id,
                NodeKind::Element {
                    text,
                    kind: TokenKind::Number,
                },
            );
            cursor = self.tree.next(fraction);
            self.tree.unlink(dot);
            self.tree.unlink(fraction);
        }
    }

    fn plain_integer(&self, id: NodeId) -> Option<String> {
        let text = self.tree.text(id)?;
        (self.tree.token_kind(id) == Some(TokenKind::Number) && !text.contains('.'))
            .then(|| text.to_owned())
    }
}

/// Text following a directive keyword at the very start of a line.
fn directive<'t>(text: &'t str, keyword: &str) -> Option<&'t str> {
    let rest = text.strip_prefix(keyword)?;
    rest.starts_with([' ', '"', '\'']).then_some(rest)
}

/// Leading quoted literal (after optional spaces) and the text after it.
fn quoted(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    let quote = text.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let body = &text[1..];
    let end = body.find(quote)?;
    let content = &body[..end];
    (!content.contains('\\')).then_some((content, &body[end + 1..]))
}

#[cfg(test)]
mod tests;
