//! Error kinds, grouped by the stage that reports them.
//!
//! - E0xxx: lexer
//! - E1xxx: parser
//! - E2xxx: resolver

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorKind {
    /// Line indented by something other than the configured step, or
    /// dedented to an indentation that was never opened.
    Indentation,
    /// Text matching no token grammar.
    UnknownToken,
    /// Token that cannot appear where it was found.
    UnexpectedToken,
    /// Input ended (or hit a separator) where more was required.
    UnexpectedEnd,
    /// Malformed construct.
    Syntax,
    /// Name, type, overload or placement that cannot be resolved.
    Resolution,
}

impl ErrorKind {
    pub const fn code(self) -> &'static str {
        match self {
            ErrorKind::Indentation => "E0001",
            ErrorKind::UnknownToken => "E0002",
            ErrorKind::UnexpectedToken => "E1001",
            ErrorKind::UnexpectedEnd => "E1002",
            ErrorKind::Syntax => "E1003",
            ErrorKind::Resolution => "E2001",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Indentation => "Indentation",
            ErrorKind::UnknownToken => "UnknownToken",
            ErrorKind::UnexpectedToken => "UnexpectedToken",
            ErrorKind::UnexpectedEnd => "UnexpectedEnd",
            ErrorKind::Syntax => "Syntax",
            ErrorKind::Resolution => "Resolution",
        }
    }

    /// Kinds reported by the recovering stages (lexer and parser).
    pub const fn is_recoverable(self) -> bool {
        !matches!(self, ErrorKind::Resolution)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.as_str(), self.code())
    }
}

#[cfg(test)]
mod tests;
