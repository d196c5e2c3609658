//! Per-invocation session settings.

use camino::Utf8PathBuf;
use placebook_vault::KeySource;

use crate::query::KeyedQuery;

/// Everything one session run needs, built once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Where the key comes from.
    pub key: KeySource,
    /// Encrypted store to load first. A missing file means an empty store.
    pub input: Option<Utf8PathBuf>,
    /// Where to write the combined store. Nothing is written when unset.
    pub output: Option<Utf8PathBuf>,
    /// Search queries, in order.
    pub searches: Vec<KeyedQuery>,
    /// Lookup ids, in order.
    pub lookups: Vec<KeyedQuery>,
}

impl SessionConfig {
    /// A session with no input, output or queries.
    #[must_use]
    pub const fn new(key: KeySource) -> Self {
        Self {
            key,
            input: None,
            output: None,
            searches: Vec::new(),
            lookups: Vec::new(),
        }
    }

    /// Load the store at `path` before resolving.
    #[must_use]
    pub fn with_input(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }

    /// Write the combined store to `path`.
    #[must_use]
    pub fn with_output(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Append a search query.
    #[must_use]
    pub fn with_search(mut self, query: KeyedQuery) -> Self {
        self.searches.push(query);
        self
    }

    /// Append a lookup.
    #[must_use]
    pub fn with_lookup(mut self, query: KeyedQuery) -> Self {
        self.lookups.push(query);
        self
    }
}
