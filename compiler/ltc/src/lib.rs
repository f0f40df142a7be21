//! Driver for the Latte front end.
//!
//! A unit of source files goes through three stages:
//!
//! 1. every file is scanned into a layer tree, in parallel
//! 2. every tree is parsed into statements, in parallel
//! 3. the whole unit is resolved, on the calling thread
//!
//! Scanning and parsing share one [`ErrorManager`]. In fast-fail mode the
//! first error stops the stage and no further files are scheduled; otherwise
//! every lexical and syntax error is collected and resolution is skipped
//! when there was any.

mod config;
mod failure;
pub mod tracing_setup;

pub use config::CompilerConfig;
pub use failure::CompileFailure;

use lt_diagnostic::{CompileError, ErrorManager};
use lt_ir::{FileName, Stmt};
use lt_lexer::LayerTree;
use lt_types::{Classpath, ResolvedUnit};
use rayon::prelude::*;

/// One source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Source {
    pub name: FileName,
    pub text: String,
}

impl Source {
    pub fn new(name: &str, text: impl Into<String>) -> Self {
        Source {
            name: FileName::from(name),
            text: text.into(),
        }
    }
}

pub struct Compiler<'a> {
    config: CompilerConfig,
    classpath: &'a dyn Classpath,
}

impl<'a> Compiler<'a> {
    pub fn new(config: CompilerConfig, classpath: &'a dyn Classpath) -> Self {
        Compiler { config, classpath }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// `error` with the source line it points at, when `sources` has it.
    pub fn render(&self, error: &CompileError, sources: &[Source]) -> String {
        let scan = &self.config.scan;
        match sources.iter().find(|s| s.name == error.position.file) {
            Some(source) => error.render(&source.text, scan.line_base, scan.col_base),
            None => error.to_string(),
        }
    }

    /// Scan, parse and resolve a unit.
    #[tracing::instrument(level = "debug", skip_all, fields(files = sources.len()))]
    pub fn compile(&self, sources: &[Source]) -> Result<ResolvedUnit, CompileFailure> {
        let errors = ErrorManager::new(self.config.fast_fail);
        let files = self.parse(sources, &errors)?;
        if errors.has_errors() {
            return Err(CompileFailure::Collected(errors.sorted_errors()));
        }
        Ok(lt_types::resolve(files, self.classpath, &self.config.resolver)?)
    }

    /// Scan and parse every file, reporting to `errors`. The statements of
    /// every file are returned, recovered ones included, unless the run
    /// stopped at a fast-fail error.
    pub fn parse(
        &self,
        sources: &[Source],
        errors: &ErrorManager,
    ) -> Result<Vec<(FileName, Vec<Stmt>)>, CompileFailure> {
        // The classpath need not be `Sync`; workers only see the config.
        let config = &self.config;
        let trees: Vec<LayerTree> = pool(config.scanner_threads, "lt-scan")?.install(|| {
            sources
                .par_iter()
                .map(|source| {
                    tracing::trace!(file = %source.name, "scanning");
                    lt_lexer::scan(source.name.clone(), &source.text, &config.scan, errors)
                })
                .collect::<Result<_, CompileError>>()
        })?;
        let statements: Vec<Vec<Stmt>> = pool(config.parser_threads, "lt-parse")?.install(|| {
            trees
                .par_iter()
                .map(|tree| lt_parse::parse(tree, errors))
                .collect::<Result<_, CompileError>>()
        })?;
        tracing::debug!(errors = errors.error_count(), "scanned and parsed");
        Ok(sources
            .iter()
            .map(|source| source.name.clone())
            .zip(statements)
            .collect())
    }
}

fn pool(threads: usize, name: &'static str) -> Result<rayon::ThreadPool, CompileFailure> {
    Ok(rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(move |index| format!("{name}-{index}"))
        .build()?)
}
