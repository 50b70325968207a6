pub mod webgl;
pub mod shaders;
pub mod pipeline;

pub use webgl::WebGLContext;
pub use shaders::ShaderVariant;
pub use pipeline::RenderPipeline;
