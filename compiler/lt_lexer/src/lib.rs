//! Layout-sensitive lexer for Latte.
//!
//! [`scan`] turns source text into a [`LayerTree`]: a chain of elements and
//! endings per layer, where layers come from indentation, paired delimiters
//! and `->`. Lexical problems are reported to the [`ErrorManager`] and the
//! offending text is skipped, so a tree is produced for any input unless the
//! manager is in fast-fail mode.

mod classify;
mod config;
mod raw;
mod scanner;
mod tree;

pub use classify::is_valid_name;
pub use config::ScanConfig;
pub use tree::{Chain, EndingKind, Indent, LayerTree, Node, NodeId, NodeKind, TokenKind};

use lt_diagnostic::{CompileError, ErrorManager};
use lt_ir::FileName;

/// Scan one source file.
///
/// # Errors
///
/// Returns the first error when `errors` is in fast-fail mode; otherwise
/// errors are collected in `errors` and a tree is always returned.
#[tracing::instrument(level = "debug", skip_all, fields(file = %file))]
pub fn scan(
    file: FileName,
    source: &str,
    config: &ScanConfig,
    errors: &ErrorManager,
) -> Result<LayerTree, CompileError> {
    scanner::Scanner::new(file, config, errors).scan(source)
}
