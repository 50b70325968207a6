pub mod source;
pub mod selection;

pub use source::{SourceMesh, SourceVertex};
pub use selection::MeshSelection;
