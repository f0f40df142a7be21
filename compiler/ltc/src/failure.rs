use lt_diagnostic::CompileError;

/// Why a unit did not compile.
#[derive(Debug, thiserror::Error)]
pub enum CompileFailure {
    /// The first error, in fast-fail mode or from resolution.
    #[error(transparent)]
    Failed(#[from] CompileError),
    /// Every lexical and syntax error of the unit, sorted by position.
    #[error("{} errors", .0.len())]
    Collected(Vec<CompileError>),
    #[error("cannot start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl CompileFailure {
    /// The errors carried, in report order.
    pub fn errors(&self) -> &[CompileError] {
        match self {
            CompileFailure::Failed(error) => std::slice::from_ref(error),
            CompileFailure::Collected(errors) => errors,
            CompileFailure::Pool(_) => &[],
        }
    }
}
