//! Asynchronous asset loading boundary
//!
//! The page loads the model and environment; it reports progress, completion
//! and failure here, and the tracker forwards them to explicit callbacks.

mod tracker;

pub use tracker::{LoadCallbacks, LoadState, LoadTracker, NoopCallbacks};

/// Asset name under which the furred model is tracked
pub const MODEL_ASSET: &str = "model";
