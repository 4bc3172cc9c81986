//! Slicing infrastructure

mod anchors;
mod engine;

pub use anchors::{AnchorExtractor, FALLBACK_ANCHOR};
pub use engine::SlicingEngine;
