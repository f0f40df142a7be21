//! Compile errors and the error sink shared by every stage.
//!
//! Lexing and parsing recover: they report into an [`ErrorManager`] and keep
//! going. Resolution fails fast and returns a [`CompileError`] directly.
//!
//! The manager's `fast_fail` flag turns every report into an immediate
//! `Err`, which the recovering stages propagate with `?`:
//!
//! ```text
//! errors.report(ErrorKind::UnexpectedEnd, position, "unexpected end")?;
//! // only reached when fast_fail is off
//! ```

mod error;
mod error_kind;
mod manager;

pub use error::CompileError;
pub use error_kind::ErrorKind;
pub use manager::ErrorManager;
