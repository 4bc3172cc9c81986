//! Aliasing infrastructure

mod propagator;

pub use propagator::{AliasPropagator, DEFAULT_MAX_ITERATIONS};
