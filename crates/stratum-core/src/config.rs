//! Explicit store configuration.
//!
//! Mirrors the teacher's `Storage::new(path: Option<PathBuf>)` shape: a
//! small struct the caller builds and hands to the constructor, rather than
//! global or environment-read state.

/// Tier capacity defaults for a [`crate::GraphStore`].
///
/// `None` in either field means that tier has no default limit —
/// [`crate::GraphStore::prune_to_config`] becomes a no-op for it, and a
/// caller must call [`crate::GraphStore::prune`] with explicit limits to
/// demote anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreConfig {
    pub default_runtime_limit: Option<usize>,
    pub default_warm_limit: Option<usize>,
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_runtime_limit(mut self, limit: usize) -> Self {
        self.default_runtime_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_warm_limit(mut self, limit: usize) -> Self {
        self.default_warm_limit = Some(limit);
        self
    }
}
