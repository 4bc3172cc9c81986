//! Bidirectional semantic slicing
//!
//! Anchor extraction seeds a relevant-identifier set for the target line;
//! two worklist passes (backward and forward) collect the slice under scope
//! and alias constraints, optionally crossing call boundaries.

pub mod domain;
pub mod infrastructure;

pub use domain::{SliceConfig, SliceResult};
pub use infrastructure::{AnchorExtractor, SlicingEngine};
