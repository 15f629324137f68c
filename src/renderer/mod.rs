pub mod context;
pub mod depth;
pub mod framebuffer;
pub mod instances;
pub mod mesh;
pub mod mipmaps;
pub mod pipeline_builder;
pub mod primitives;
pub mod shader;
pub mod texture;
pub mod uniforms;
pub mod vertex;

pub use context::GpuContext;
pub use depth::Depth;
pub use framebuffer::{post_effect_layout, Framebuffer, PostEffect};
pub use instances::InstanceBuffer;
pub use mesh::Mesh;
pub use pipeline_builder::{pipeline_layout, PipelineBuilder};
pub use shader::{Shader, ShaderStage};
pub use texture::{Cubemap, Texture, TextureOptions};
pub use uniforms::{UniformBlock, UniformData, UniformLayout, UniformType};
pub use vertex::{ColorVertex, InstanceRaw, PointVertex, ScreenVertex, TexturedVertex, Vertex};
