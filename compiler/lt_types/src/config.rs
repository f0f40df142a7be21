//! Resolver configuration.

/// Settings that apply to a whole compilation unit.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ResolverConfig {
    /// Packages imported into every file, after the file's own imports.
    pub auto_imports: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            auto_imports: vec!["java.lang".to_owned()],
        }
    }
}

impl ResolverConfig {
    #[must_use]
    pub fn with_auto_import(mut self, package: impl Into<String>) -> Self {
        self.auto_imports.push(package.into());
        self
    }
}
