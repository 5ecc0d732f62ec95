//! Executable resolver backed by a fixed table.

use std::collections::BTreeMap;

use camino::Utf8PathBuf;
use ninju::ExecutableResolver;

/// Resolves names from a fixed table; anything absent is reported missing.
#[derive(Clone, Debug, Default)]
pub struct StaticResolver {
    table: BTreeMap<String, Utf8PathBuf>,
}

impl StaticResolver {
    /// Resolver mapping each name to `/usr/bin/<name>`.
    pub fn usr_bin(names: &[&str]) -> Self {
        names.iter().fold(Self::default(), |resolver, name| {
            resolver.with(name, format!("/usr/bin/{name}"))
        })
    }

    /// Add a mapping.
    #[must_use]
    pub fn with(mut self, name: &str, path: impl Into<Utf8PathBuf>) -> Self {
        self.table.insert(name.to_owned(), path.into());
        self
    }
}

impl ExecutableResolver for StaticResolver {
    fn resolve(&self, executable: &str) -> Option<Utf8PathBuf> {
        self.table.get(executable).cloned()
    }
}
