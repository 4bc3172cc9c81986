//! Shared utilities

pub mod declarators;
pub mod tree_sitter;
