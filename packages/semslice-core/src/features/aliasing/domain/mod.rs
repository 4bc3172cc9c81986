//! Aliasing domain models

use rustc_hash::{FxHashMap, FxHashSet};

/// May-alias table: pointer name → names it may denote
pub type AliasTable = FxHashMap<String, FxHashSet<String>>;

/// Propagation statistics
#[derive(Debug, Clone, Default)]
pub struct AliasStats {
    pub direct_edges: usize,
    pub iterations: usize,
    /// True when the iteration cap was reached and the unresolved classes
    /// were merged into one equivalence class
    pub widened: bool,
}
