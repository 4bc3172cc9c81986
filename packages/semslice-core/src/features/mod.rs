//! Feature modules (pipeline stages)
//!
//! parsing → indexing → statements → aliasing → slicing → reconstruction

pub mod aliasing;
pub mod indexing;
pub mod parsing;
pub mod reconstruction;
pub mod slicing;
pub mod statements;
