//! Early exit from a statement.

use lt_diagnostic::CompileError;

/// Why a grammar routine stopped before producing a node.
#[derive(Debug)]
pub(crate) enum Halt {
    /// The error is already reported; drop the statement and resume at the
    /// next ending.
    Skip,
    /// Fast-fail mode: abort the whole parse.
    Fatal(CompileError),
}

impl From<CompileError> for Halt {
    fn from(error: CompileError) -> Self {
        Halt::Fatal(error)
    }
}

pub(crate) type PResult<T> = Result<T, Halt>;
