//! Slicing domain models

use crate::features::aliasing::infrastructure::DEFAULT_MAX_ITERATIONS;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Slice configuration
#[derive(Debug, Clone)]
pub struct SliceConfig {
    /// Cross call boundaries through callee effect summaries
    pub interprocedural: bool,
    /// Call-depth bound for interprocedural tracking
    pub max_call_depth: usize,
    /// Iteration cap for the alias fixpoint
    pub alias_max_iterations: usize,
}

impl Default for SliceConfig {
    fn default() -> Self {
        SliceConfig {
            interprocedural: true,
            max_call_depth: 1,
            alias_max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SliceConfig {
    /// Intraprocedural-only configuration
    pub fn intraprocedural() -> Self {
        SliceConfig {
            interprocedural: false,
            ..Default::default()
        }
    }
}

/// Slice result for one (file, line) query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliceResult {
    pub target_file: String,
    pub target_line: u32,
    /// Seed identifiers; never empty (a sentinel stands in when extraction
    /// finds nothing)
    pub anchors: BTreeSet<String>,
    /// Always contains the target line
    pub slice_lines: BTreeSet<u32>,
    /// Line → owning function, for every slice line inside a function
    pub function_map: BTreeMap<u32, String>,
}

impl SliceResult {
    /// Slice lines belonging to the given function, in order
    pub fn lines_of(&self, function: &str) -> Vec<u32> {
        self.function_map
            .iter()
            .filter(|(_, name)| name.as_str() == function)
            .map(|(line, _)| *line)
            .collect()
    }

    /// Functions involved in this slice
    pub fn functions(&self) -> BTreeSet<&str> {
        self.function_map.values().map(String::as_str).collect()
    }
}
