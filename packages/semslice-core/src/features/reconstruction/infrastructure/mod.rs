//! Reconstruction infrastructure

mod filters;
mod reconstructor;
mod recovery;

pub use reconstructor::{reconstruct, SliceReconstructor};
pub use recovery::{BodyScanStrategy, HeaderPatternStrategy, SliceLocalScanStrategy, VoidFallbackStrategy};
