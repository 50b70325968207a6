//! Fur strand generation
//!
//! Each vertex of the selected mesh grows one strand: a short polyline that
//! leaves the surface along the vertex normal and droops under a gravity bias.
//! Strands are flattened into a [`StrandBuffer`] of independent line segments.

pub mod buffer;
pub mod color;
pub mod generator;

pub use buffer::StrandBuffer;
pub use color::{ColorMode, Rgb};
pub use generator::{
    DegenerateNormalPolicy, StrandBuild, StrandGenerator, StrandParams, MAX_SEGMENT_COUNT,
};
