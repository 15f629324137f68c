// scene/model.rs

use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::renderer::{GpuContext, Mesh, Texture, TextureOptions};
use crate::scene::data::{ModelData, SlotSource, TextureSlots, TextureSource};

/// GPU textures keyed by source, so meshes sharing an image share one texture.
pub struct TextureCache {
    textures: HashMap<String, Arc<Texture>>,
    white: Arc<Texture>,
    black: Arc<Texture>,
}

impl TextureCache {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            textures: HashMap::new(),
            white: Arc::new(Texture::white(device, queue)),
            black: Arc::new(Texture::black(device, queue)),
        }
    }

    pub fn get_or_load(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &TextureSource,
    ) -> Arc<Texture> {
        let key = source.key();
        if let Some(texture) = self.textures.get(&key) {
            return texture.clone();
        }

        let texture = match source {
            TextureSource::File(path) => {
                Texture::from_path_or_fallback(device, queue, path, TextureOptions::default())
            }
            TextureSource::Embedded { key, image } => {
                Texture::from_image(device, queue, image, TextureOptions::default(), Some(key))
            }
        };
        let texture = Arc::new(texture);
        self.textures.insert(key, texture.clone());
        texture
    }

    pub fn white(&self) -> Arc<Texture> {
        self.white.clone()
    }

    pub fn black(&self) -> Arc<Texture> {
        self.black.clone()
    }

    /// Number of distinct textures loaded so far.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

pub struct ModelMesh {
    pub name: String,
    pub mesh: Mesh,
    pub material: wgpu::BindGroup,
}

/// Meshes of an imported model, each with a diffuse + specular bind group.
pub struct Model {
    pub meshes: Vec<ModelMesh>,
    pub directory: PathBuf,
}

impl Model {
    /// Diffuse texture at binding 0, specular at 1, sampler at 2.
    pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        Texture::bind_group_layout(device, "Model Material", 2)
    }

    pub fn empty() -> Self {
        Self {
            meshes: Vec::new(),
            directory: PathBuf::from("."),
        }
    }

    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &ModelData,
        material_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let mut cache = TextureCache::new(device, queue);
        let model = Self::upload_with_cache(device, queue, data, material_layout, &mut cache);
        log::info!(
            "Uploaded {} meshes sharing {} textures",
            model.meshes.len(),
            cache.len()
        );
        model
    }

    pub fn upload_with_cache(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &ModelData,
        material_layout: &wgpu::BindGroupLayout,
        cache: &mut TextureCache,
    ) -> Self {
        let meshes = data
            .meshes
            .iter()
            .map(|mesh_data| {
                let slots = TextureSlots::resolve(&mesh_data.texture_kinds());
                let mut pick = |slot: SlotSource| match slot {
                    SlotSource::Texture(i) => {
                        cache.get_or_load(device, queue, &mesh_data.textures[i].source)
                    }
                    SlotSource::White => cache.white(),
                    SlotSource::Black => cache.black(),
                };
                let diffuse = pick(slots.diffuse);
                let specular = pick(slots.specular);

                let material = Texture::bind_group(
                    device,
                    material_layout,
                    &[diffuse.as_ref(), specular.as_ref()],
                    &mesh_data.name,
                );
                let indices = (!mesh_data.indices.is_empty()).then_some(&mesh_data.indices[..]);

                ModelMesh {
                    name: mesh_data.name.clone(),
                    mesh: Mesh::new(device, &mesh_data.name, &mesh_data.vertices, indices),
                    material,
                }
            })
            .collect();

        Self {
            meshes,
            directory: data.directory.clone(),
        }
    }

    pub fn load(
        gpu: &GpuContext,
        path: impl AsRef<Path>,
        material_layout: &wgpu::BindGroupLayout,
    ) -> Result<Self, String> {
        let data = ModelData::load(path)?;
        Ok(Self::upload(&gpu.device, &gpu.queue, &data, material_layout))
    }

    /// Like `load`, but a failure is logged and yields a model with no meshes.
    pub fn load_or_empty(
        gpu: &GpuContext,
        path: impl AsRef<Path>,
        material_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let path = path.as_ref();
        Self::load(gpu, path, material_layout).unwrap_or_else(|err| {
            log::error!("Model failed to load at path {:?}: {}", path, err);
            Self::empty()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Binds each mesh's material at `group` and draws it. The caller sets
    /// the pipeline, the other bind groups and any instance buffer.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, group: u32, instances: Range<u32>) {
        for model_mesh in &self.meshes {
            pass.set_bind_group(group, &model_mesh.material, &[]);
            model_mesh.mesh.draw(pass, instances.clone());
        }
    }
}
