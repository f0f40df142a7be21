//! Navigation over one layer's chain.
//!
//! `pos` is the next unconsumed node and `last` the most recently consumed
//! one; positions "just past" a token are computed from `last`.

use lt_diagnostic::ErrorManager;
use lt_ir::Position;
use lt_lexer::{EndingKind, LayerTree, NodeId, TokenKind};

use crate::halt::{Halt, PResult};

pub(crate) struct Cursor<'a> {
    tree: &'a LayerTree,
    pub(crate) pos: Option<NodeId>,
    pub(crate) last: Option<NodeId>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(tree: &'a LayerTree) -> Self {
        Cursor {
            tree,
            pos: tree.first_child(tree.root()),
            last: None,
        }
    }

    #[inline]
    pub(crate) fn tree(&self) -> &'a LayerTree {
        self.tree
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<NodeId> {
        self.pos
    }

    /// Node after the current one, endings included.
    pub(crate) fn peek_next(&self) -> Option<NodeId> {
        self.pos.and_then(|id| self.tree.next(id))
    }

    pub(crate) fn bump(&mut self) -> Option<NodeId> {
        let id = self.pos?;
        self.last = Some(id);
        self.pos = self.tree.next(id);
        Some(id)
    }

    pub(crate) fn text(&self, id: NodeId) -> &'a str {
        self.tree.text(id).unwrap_or("")
    }

    pub(crate) fn peek_text(&self) -> Option<&'a str> {
        self.pos.and_then(|id| self.tree.text(id))
    }

    pub(crate) fn peek_kind(&self) -> Option<TokenKind> {
        self.pos.and_then(|id| self.tree.token_kind(id))
    }

    pub(crate) fn at(&self, text: &str) -> bool {
        self.pos.is_some_and(|id| self.tree.is_text(id, text))
    }

    pub(crate) fn eat(&mut self, text: &str) -> bool {
        if self.at(text) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Current node when it is a layer.
    pub(crate) fn peek_layer(&self) -> Option<NodeId> {
        self.pos.filter(|&id| self.tree.is_layer(id))
    }

    /// Whether the statement is over: no node left or an ending.
    pub(crate) fn at_statement_end(&self) -> bool {
        self.pos.map_or(true, |id| self.tree.ending(id).is_some())
    }

    /// Element following the current ending, used for `elseif`, `catch`
    /// and similar continuations on the next line.
    pub(crate) fn after_ending_is(&self, text: &str) -> bool {
        self.pos
            .filter(|&id| self.tree.ending(id).is_some())
            .and_then(|id| self.tree.next(id))
            .is_some_and(|id| self.tree.is_text(id, text))
    }

    pub(crate) fn position(&self, id: NodeId) -> Position {
        self.tree.position(id).clone()
    }

    /// Position of the current node, or just past the last one at the end.
    pub(crate) fn here(&self) -> Position {
        match self.pos {
            Some(id) => self.position(id),
            None => self.end_position(),
        }
    }

    /// Position just past the last consumed token.
    pub(crate) fn end_position(&self) -> Position {
        match self.last {
            Some(id) => self.tree.position(id).shifted(self.tree.width(id)),
            None => self.tree.position(self.tree.root()).clone(),
        }
    }

    /// Human description of the current node for error messages.
    pub(crate) fn describe(&self) -> String {
        match self.pos {
            None => "end of layer".to_owned(),
            Some(id) if self.tree.is_layer(id) => "indented block".to_owned(),
            Some(id) if self.tree.ending(id).is_some() => "end of statement".to_owned(),
            Some(id) => self.text(id).to_owned(),
        }
    }

    /// Move to the next node a sub-expression must start at.
    ///
    /// Line endings are skipped. A missing node reports `UnexpectedEnd` just
    /// past the last token and drops the statement. A strong ending reports
    /// it at the separator; parsing then resumes after the separator, or the
    /// statement is dropped when nothing follows.
    pub(crate) fn require(&mut self, errors: &ErrorManager) -> PResult<NodeId> {
        loop {
            match self.pos {
                None => {
                    errors.unexpected_end(self.end_position())?;
                    return Err(Halt::Skip);
                }
                Some(id) => match self.tree.ending(id) {
                    Some(EndingKind::Strong) => {
                        errors.unexpected_end(self.tree.position(id).clone())?;
                        let Some(next) = self.tree.next(id) else {
                            return Err(Halt::Skip);
                        };
                        self.pos = Some(next);
                        return Ok(next);
                    }
                    Some(EndingKind::Weak | EndingKind::Synthetic) => {
                        self.pos = self.tree.next(id);
                    }
                    None => return Ok(id),
                },
            }
        }
    }

    /// Closing delimiter of the pair opened at `open`.
    pub(crate) fn pair_close(&self, open: NodeId) -> Option<NodeId> {
        let mut close = self.tree.next(open)?;
        if self.tree.is_layer(close) {
            close = self.tree.next(close)?;
        }
        [")", "]", "}"]
            .iter()
            .any(|c| self.tree.is_text(close, c))
            .then_some(close)
    }

    /// Skip the rest of a statement.
    pub(crate) fn skip_to_ending(&mut self) {
        while !self.at_statement_end() {
            self.bump();
        }
    }
}
