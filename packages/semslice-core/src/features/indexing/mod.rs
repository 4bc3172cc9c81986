//! Per-file program indexing
//!
//! Builds scope tables, struct field tables, the type table, per-function
//! signatures and effects, the call graph, and recursion flags. One
//! `ProgramIndex` per file; rebuilt, never merged.

pub mod domain;
pub mod infrastructure;

pub use domain::{FunctionInfo, FunctionScope, ProgramIndex};
pub use infrastructure::ProgramIndexer;
