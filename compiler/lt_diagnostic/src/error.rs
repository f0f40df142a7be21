use lt_ir::Position;

use crate::ErrorKind;

/// One compile error: what went wrong and where.
#[derive(Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
#[error("{position} {kind}: {message}")]
pub struct CompileError {
    pub kind: ErrorKind,
    pub message: String,
    pub position: Position,
}

impl CompileError {
    #[cold]
    pub fn new(kind: ErrorKind, position: Position, message: impl Into<String>) -> Self {
        CompileError {
            kind,
            message: message.into(),
            position,
        }
    }

    #[cold]
    pub fn resolution(position: Position, message: impl Into<String>) -> Self {
        CompileError::new(ErrorKind::Resolution, position, message)
    }

    #[cold]
    pub fn syntax(position: Position, message: impl Into<String>) -> Self {
        CompileError::new(ErrorKind::Syntax, position, message)
    }

    pub fn line(&self) -> i32 {
        self.position.line
    }

    pub fn column(&self) -> i32 {
        self.position.column
    }

    /// The error, its source line and a caret under the column. `line_base`
    /// and `col_base` are the offsets `source` was scanned with.
    pub fn render(&self, source: &str, line_base: i32, col_base: i32) -> String {
        let mut out = self.to_string();
        let text = usize::try_from(self.position.line - line_base - 1)
            .ok()
            .and_then(|index| source.lines().nth(index));
        if let Some(text) = text {
            let pad = usize::try_from(self.position.column - col_base - 1).unwrap_or(0);
            out.push('\n');
            out.push_str(text);
            out.push('\n');
            out.push_str(&" ".repeat(pad));
            out.push('^');
        }
        out
    }
}

#[cfg(test)]
mod tests;
