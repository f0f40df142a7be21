//! Source positions.
//!
//! Positions are `(file, line, column)` triples. Lines and columns start at 1
//! and are shifted by the configured line/column base before they reach a
//! [`Position`]. Synthetic nodes carry [`Position::synthetic`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Logical file name (not necessarily a filesystem path).
pub type FileName = Arc<str>;

/// Location of a token or node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Position {
    pub file: FileName,
    pub line: i32,
    pub column: i32,
}

impl Position {
    pub fn new(file: FileName, line: i32, column: i32) -> Self {
        Position { file, line, column }
    }

    /// Sentinel used by nodes that do not originate from source text.
    pub fn synthetic() -> Self {
        Position {
            file: Arc::from(""),
            line: 0,
            column: 0,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.file.is_empty() && self.line == 0 && self.column == 0
    }

    /// The same line, `columns` further to the right.
    #[must_use]
    pub fn shifted(&self, columns: i32) -> Self {
        Position {
            file: Arc::clone(&self.file),
            line: self.line,
            column: self.column + columns,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::synthetic()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_synthetic() {
            write!(f, "<synthetic>")
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        }
    }
}

/// Position attached to an AST node.
///
/// `Loc` compares equal to every other `Loc` and hashes to nothing, so
/// deriving `PartialEq`/`Hash` on a node yields structural equality.
#[derive(Clone, Debug, Default)]
pub struct Loc(pub Position);

impl Loc {
    pub fn synthetic() -> Self {
        Loc(Position::synthetic())
    }

    pub fn position(&self) -> &Position {
        &self.0
    }
}

impl From<Position> for Loc {
    fn from(position: Position) -> Self {
        Loc(position)
    }
}

impl PartialEq for Loc {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl Eq for Loc {}

impl Hash for Loc {
    fn hash<H: Hasher>(&self, _: &mut H) {}
}

#[cfg(test)]
mod tests;
