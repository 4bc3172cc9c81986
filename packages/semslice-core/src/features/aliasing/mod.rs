//! Pointer alias propagation
//!
//! Builds direct points-to edges from the extracted alias facts and
//! propagates transitivity to a fixpoint, bounded by an iteration cap.

pub mod domain;
pub mod infrastructure;

pub use domain::{AliasStats, AliasTable};
pub use infrastructure::AliasPropagator;
