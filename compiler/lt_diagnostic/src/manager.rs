//! Thread-safe error sink.
//!
//! One `ErrorManager` is shared by every lexer and parser of a compilation
//! unit. Reports are appended under a lock; within one file they keep the
//! order in which they were reported.

use lt_ir::Position;
use parking_lot::Mutex;

use crate::{CompileError, ErrorKind};

pub struct ErrorManager {
    fast_fail: bool,
    errors: Mutex<Vec<CompileError>>,
}

impl ErrorManager {
    pub fn new(fast_fail: bool) -> Self {
        ErrorManager {
            fast_fail,
            errors: Mutex::new(Vec::new()),
        }
    }

    pub fn fast_fail(&self) -> bool {
        self.fast_fail
    }

    /// Record an error. In fast-fail mode the error is also returned as
    /// `Err` so the reporting stage stops immediately.
    pub fn report(
        &self,
        kind: ErrorKind,
        position: Position,
        message: impl Into<String>,
    ) -> Result<(), CompileError> {
        let error = CompileError::new(kind, position, message);
        tracing::debug!(%error, "compile error reported");
        self.errors.lock().push(error.clone());
        if self.fast_fail {
            Err(error)
        } else {
            Ok(())
        }
    }

    pub fn unexpected_token(
        &self,
        expected: &str,
        found: &str,
        position: Position,
    ) -> Result<(), CompileError> {
        self.report(
            ErrorKind::UnexpectedToken,
            position,
            format!("expecting {expected}, but got {found}"),
        )
    }

    pub fn unexpected_end(&self, position: Position) -> Result<(), CompileError> {
        self.report(ErrorKind::UnexpectedEnd, position, "unexpected end")
    }

    pub fn unknown_token(&self, text: &str, position: Position) -> Result<(), CompileError> {
        self.report(
            ErrorKind::UnknownToken,
            position,
            format!("unknown token {text}"),
        )
    }

    pub fn indentation(&self, step: u32, position: Position) -> Result<(), CompileError> {
        self.report(
            ErrorKind::Indentation,
            position,
            format!("the indentation should be a multiple of {step} spaces"),
        )
    }

    pub fn syntax(&self, message: impl Into<String>, position: Position) -> Result<(), CompileError> {
        self.report(ErrorKind::Syntax, position, message)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.lock().is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.lock().len()
    }

    /// Snapshot of the errors reported so far, in report order.
    pub fn errors(&self) -> Vec<CompileError> {
        self.errors.lock().clone()
    }

    /// Errors grouped by file name; report order is kept within a file.
    pub fn sorted_errors(&self) -> Vec<CompileError> {
        let mut errors = self.errors();
        errors.sort_by(|a, b| a.position.file.cmp(&b.position.file));
        errors
    }

    pub fn take_errors(&self) -> Vec<CompileError> {
        std::mem::take(&mut *self.errors.lock())
    }
}

impl Default for ErrorManager {
    fn default() -> Self {
        ErrorManager::new(false)
    }
}

#[cfg(test)]
mod tests;
