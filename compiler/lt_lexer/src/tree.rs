//! Layer tree arena.
//!
//! The scanner's output is a chain of nodes per layer. Nodes live in one
//! `Vec` and refer to each other by [`NodeId`]; a layer node sits in its
//! parent's chain and points at the first node of its own chain.
//!
//! ```text
//! class User
//!     id = 1
//!
//! root: [class] -> [User] -> <layer>
//!                              └─ [id] -> [=] -> [1]
//! ```

use std::fmt;

use lt_ir::Position;

/// Index of a node in a [`LayerTree`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Classification of an element's text.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    String,
    Number,
    Bool,
    /// Valid identifier (back-quotes already stripped).
    Name,
    Modifier,
    Keyword,
    Symbol,
}

/// How an ending node came to be.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum EndingKind {
    /// Explicit `,` or `;`.
    Strong,
    /// End of a physical line.
    Weak,
    /// Inserted after a layer followed by more tokens on the same chain.
    Synthetic,
}

/// Indentation of a layer.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Indent {
    Column(u32),
    /// Layer opened inside a paired delimiter; indentation is not checked.
    Flex,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum NodeKind {
    Element { text: String, kind: TokenKind },
    Ending(EndingKind),
    Layer { indent: Indent, first: Option<NodeId> },
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub position: Position,
    pub next: Option<NodeId>,
    pub prev: Option<NodeId>,
    /// Layer whose chain contains this node; `None` only for the root.
    pub parent: Option<NodeId>,
}

/// Arena of lexical nodes with one root layer.
#[derive(Clone, Debug)]
pub struct LayerTree {
    nodes: Vec<Node>,
}

impl LayerTree {
    pub(crate) fn new(position: Position) -> Self {
        LayerTree {
            nodes: vec![Node {
                kind: NodeKind::Layer {
                    indent: Indent::Column(0),
                    first: None,
                },
                position,
                next: None,
                prev: None,
                parent: None,
            }],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next
    }

    #[inline]
    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev
    }

    #[inline]
    pub fn position(&self, id: NodeId) -> &Position {
        &self.node(id).position
    }

    /// First node of a layer's chain; `None` for empty layers and non-layers.
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        match self.node(id).kind {
            NodeKind::Layer { first, .. } => first,
            _ => None,
        }
    }

    /// Element text, `None` for endings and layers.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn token_kind(&self, id: NodeId) -> Option<TokenKind> {
        match self.node(id).kind {
            NodeKind::Element { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node(id).kind, NodeKind::Element { .. })
    }

    pub fn is_layer(&self, id: NodeId) -> bool {
        matches!(self.node(id).kind, NodeKind::Layer { .. })
    }

    pub fn ending(&self, id: NodeId) -> Option<EndingKind> {
        match self.node(id).kind {
            NodeKind::Ending(kind) => Some(kind),
            _ => None,
        }
    }

    /// Whether `id` is an element with exactly this text.
    pub fn is_text(&self, id: NodeId, expected: &str) -> bool {
        self.text(id) == Some(expected)
    }

    /// Width of a node's text in columns (0 for endings and layers).
    pub fn width(&self, id: NodeId) -> i32 {
        self.text(id)
            .map_or(0, |t| i32::try_from(t.chars().count()).unwrap_or(i32::MAX))
    }

    /// Nodes of a layer's chain in order.
    pub fn chain(&self, layer: NodeId) -> Chain<'_> {
        Chain {
            tree: self,
            cursor: self.first_child(layer),
        }
    }

    /// Number of allocated nodes, including unlinked ones.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_child(self.root()).is_none()
    }

    pub(crate) fn alloc(&mut self, kind: NodeKind, position: Position, parent: NodeId) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node {
            kind,
            position,
            next: None,
            prev: None,
            parent: Some(parent),
        });
        id
    }

    /// Append `id` after `prev` in `layer`'s chain (at the front when
    /// `prev` is `None`).
    pub(crate) fn link_after(&mut self, layer: NodeId, prev: Option<NodeId>, id: NodeId) {
        self.nodes[id.index()].prev = prev;
        match prev {
            Some(p) => {
                let old_next = self.nodes[p.index()].next;
                self.nodes[p.index()].next = Some(id);
                self.nodes[id.index()].next = old_next;
                if let Some(n) = old_next {
                    self.nodes[n.index()].prev = Some(id);
                }
            }
            None => {
                let old_first = self.first_child(layer);
                self.set_first(layer, Some(id));
                self.nodes[id.index()].next = old_first;
                if let Some(n) = old_first {
                    self.nodes[n.index()].prev = Some(id);
                }
            }
        }
    }

    /// Remove `id` from its chain.
    pub(crate) fn unlink(&mut self, id: NodeId) {
        let node = &self.nodes[id.index()];
        let (prev, next, parent) = (node.prev, node.next, node.parent);
        match prev {
            Some(p) => self.nodes[p.index()].next = next,
            None => {
                if let Some(layer) = parent {
                    self.set_first(layer, next);
                }
            }
        }
        if let Some(n) = next {
            self.nodes[n.index()].prev = prev;
        }
        self.nodes[id.index()].prev = None;
        self.nodes[id.index()].next = None;
    }

    pub(crate) fn replace_kind(&mut self, id: NodeId, kind: NodeKind) {
        self.nodes[id.index()].kind = kind;
    }

    fn set_first(&mut self, layer: NodeId, value: Option<NodeId>) {
        if let NodeKind::Layer { first, .. } = &mut self.nodes[layer.index()].kind {
            *first = value;
        }
    }

    fn fmt_chain(&self, layer: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for id in self.chain(layer) {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            match &self.node(id).kind {
                NodeKind::Element { text, .. } => f.write_str(text)?,
                NodeKind::Ending(EndingKind::Strong) => f.write_str(",")?,
                NodeKind::Ending(EndingKind::Weak) => f.write_str("/")?,
                NodeKind::Ending(EndingKind::Synthetic) => f.write_str("~")?,
                NodeKind::Layer { .. } => {
                    f.write_str("[")?;
                    self.fmt_chain(id, f)?;
                    f.write_str("]")?;
                }
            }
        }
        Ok(())
    }
}

/// Compact rendering used in tests and trace output: elements by text,
/// `,` strong / `/` weak / `~` synthetic endings, `[...]` layers.
impl fmt::Display for LayerTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_chain(self.root(), f)
    }
}

/// Iterator over one layer's chain.
pub struct Chain<'a> {
    tree: &'a LayerTree,
    cursor: Option<NodeId>,
}

impl Iterator for Chain<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.cursor?;
        self.cursor = self.tree.next(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests;
