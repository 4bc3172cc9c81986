//! Translation-unit parsing
//!
//! Wraps tree-sitter with the C and C++ grammars. One `SourceUnit` per file,
//! immutable after parse, owned by the analysis session.

pub mod domain;
pub mod infrastructure;

pub use domain::{Dialect, SourceUnit};
pub use infrastructure::TranslationUnitParser;
