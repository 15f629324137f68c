// scene/mod.rs

pub mod data;
pub mod gltf_import;
pub mod model;
pub mod obj;

pub use data::{
    MeshData, ModelData, SlotSource, TextureKind, TextureRef, TextureSlots, TextureSource,
};
pub use model::{Model, ModelMesh, TextureCache};
