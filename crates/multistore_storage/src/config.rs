//! Configuration for a [`MultiStore`](crate::MultiStore).

/// Default bound on ancestor walks.
pub const DEFAULT_MAX_ANCESTOR_DEPTH: usize = 100;

/// Tunables for a store.
///
/// Controls hierarchy walk bounds, id reuse, and reference auditing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum number of parent hops an ancestor walk takes before giving up.
    ///
    /// The walk logs a warning and returns what it collected so far.
    pub max_ancestor_depth: usize,

    /// Whether ids of removed entities may be registered again.
    pub recycle_ids: bool,

    /// Whether `validate_store` reports cross-references (such as a pet's
    /// breed) that point at unregistered entities.
    pub check_references: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_ancestor_depth: DEFAULT_MAX_ANCESTOR_DEPTH,
            recycle_ids: false,
            check_references: true,
        }
    }
}

impl StoreConfig {
    /// Creates a configuration with a tight walk bound, suited to stores whose
    /// hierarchy is known to be shallow.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            max_ancestor_depth: 32,
            recycle_ids: false,
            check_references: true,
        }
    }

    /// Creates a configuration that tolerates id reuse and skips reference
    /// auditing.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            max_ancestor_depth: DEFAULT_MAX_ANCESTOR_DEPTH,
            recycle_ids: true,
            check_references: false,
        }
    }

    /// Builder method to set the ancestor walk bound.
    #[must_use]
    pub fn with_max_ancestor_depth(mut self, depth: usize) -> Self {
        self.max_ancestor_depth = depth;
        self
    }

    /// Builder method to allow or forbid id reuse.
    #[must_use]
    pub fn with_recycle_ids(mut self, recycle: bool) -> Self {
        self.recycle_ids = recycle;
        self
    }

    /// Builder method to enable or disable reference auditing.
    #[must_use]
    pub fn with_check_references(mut self, check: bool) -> Self {
        self.check_references = check;
        self
    }
}
