//! Fur animation
//!
//! A frame clock plus a wave animator that sways strand points around their
//! rest pose each frame.

mod clock;
mod wave;

pub use clock::FrameClock;
pub use wave::{StrandAnimator, WaveMode, WaveParams, WaveTarget};
