//! Compiler configuration.

use lt_lexer::ScanConfig;
use lt_types::ResolverConfig;

/// Settings for one [`Compiler`](crate::Compiler).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilerConfig {
    pub scan: ScanConfig,
    /// Stop at the first error instead of collecting every lexical and
    /// syntax error of the unit.
    pub fast_fail: bool,
    /// Worker threads for scanning; 0 lets rayon decide.
    pub scanner_threads: usize,
    /// Worker threads for parsing; 0 lets rayon decide.
    pub parser_threads: usize,
    pub resolver: ResolverConfig,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            scan: ScanConfig::default(),
            fast_fail: true,
            scanner_threads: 0,
            parser_threads: 0,
            resolver: ResolverConfig::default(),
        }
    }
}

impl CompilerConfig {
    #[must_use]
    pub fn with_scan(mut self, scan: ScanConfig) -> Self {
        self.scan = scan;
        self
    }

    #[must_use]
    pub fn with_fast_fail(mut self, fast_fail: bool) -> Self {
        self.fast_fail = fast_fail;
        self
    }

    #[must_use]
    pub fn with_threads(mut self, scanner_threads: usize, parser_threads: usize) -> Self {
        self.scanner_threads = scanner_threads;
        self.parser_threads = parser_threads;
        self
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }
}
