//! Slice-to-code reconstruction
//!
//! Consumes a slice result plus the raw source text and produces one
//! syntactically self-consistent unit: an include preamble, a conservative
//! global-declaration block, and one emitted block per involved function.
//! The output is a best-effort syntactic approximation; it is not required
//! to compile or to preserve behavior.

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{FunctionSkeleton, VariableDeclaration};
pub use infrastructure::{reconstruct, SliceReconstructor};
