// renderer/mipmaps.rs
//
// Fills mip levels 1.. of a colour texture by drawing each level from the one
// above it with a linear sampler.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::renderer::pipeline_builder::{pipeline_layout, PipelineBuilder};
use crate::renderer::texture::{linear_sampler, Texture};

/// Number of levels in a full chain down to 1x1.
pub fn level_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    u32::BITS - largest.leading_zeros()
}

/// Values built on first use of a key and shared afterwards.
struct KeyedCache<K, V> {
    entries: Mutex<HashMap<K, Arc<V>>>,
}

impl<K: Eq + Hash, V> Default for KeyedCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash, V> KeyedCache<K, V> {
    fn get_or_insert_with(&self, key: K, make: impl FnOnce() -> V) -> Arc<V> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(key).or_insert_with(|| Arc::new(make())))
    }
}

/// Pipeline and sampler that draw one mip level from the level above.
struct Blit {
    pipeline: wgpu::RenderPipeline,
    source_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl Blit {
    fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        log::debug!("Building mip blit pipeline for {:?}", format);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mip Blit"),
            source: wgpu::ShaderSource::Wgsl(include_str!("blit.wgsl").into()),
        });
        let source_layout = Texture::bind_group_layout(device, "Mip Source", 1);
        let layout = pipeline_layout(device, "Mip Blit", &[&source_layout]);
        // the full-screen triangle winds clockwise
        let pipeline = PipelineBuilder::new(device, &layout, &module)
            .with_label("Mip Blit")
            .with_color_target(format, None)
            .with_no_culling()
            .build();
        let sampler = linear_sampler(
            device,
            "Mip Source",
            wgpu::AddressMode::ClampToEdge,
            wgpu::FilterMode::Nearest,
        );

        Self {
            pipeline,
            source_layout,
            sampler,
        }
    }
}

/// One blit per device and target format.
fn blit_for(device: &wgpu::Device, format: wgpu::TextureFormat) -> Arc<Blit> {
    static BLITS: OnceLock<KeyedCache<(wgpu::Device, wgpu::TextureFormat), Blit>> =
        OnceLock::new();
    BLITS
        .get_or_init(KeyedCache::default)
        .get_or_insert_with((device.clone(), format), || Blit::new(device, format))
}

pub(crate) fn generate(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    format: wgpu::TextureFormat,
) {
    let levels = texture.mip_level_count();
    if levels <= 1 {
        return;
    }

    let blit = blit_for(device, format);

    let level_view = |level: u32, usage: wgpu::TextureUsages| {
        texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Mip Level"),
            format: Some(format),
            dimension: Some(wgpu::TextureViewDimension::D2),
            base_mip_level: level,
            mip_level_count: Some(1),
            array_layer_count: Some(1),
            usage: Some(usage),
            ..Default::default()
        })
    };

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Mip Chain"),
    });

    for level in 1..levels {
        let source = level_view(level - 1, wgpu::TextureUsages::TEXTURE_BINDING);
        let target = level_view(level, wgpu::TextureUsages::RENDER_ATTACHMENT);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mip Source"),
            layout: &blit.source_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&source),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&blit.sampler),
                },
            ],
        });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Mip Level"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&blit.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..3, 0..1);
    }

    queue.submit(Some(encoder.finish()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_chain_reaches_one_texel() {
        assert_eq!(level_count(1, 1), 1);
        assert_eq!(level_count(2, 2), 2);
        assert_eq!(level_count(512, 512), 10);
        assert_eq!(level_count(0, 0), 1);
    }

    #[test]
    fn cached_values_are_built_once_per_key() {
        let cache: KeyedCache<u32, String> = KeyedCache::default();
        let mut builds = 0;

        let first = cache.get_or_insert_with(1, || {
            builds += 1;
            "rgba8".to_string()
        });
        let again = cache.get_or_insert_with(1, || {
            builds += 1;
            "rebuilt".to_string()
        });
        let other = cache.get_or_insert_with(2, || {
            builds += 1;
            "bgra8".to_string()
        });

        assert_eq!(builds, 2);
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(*again, "rgba8");
        assert_eq!(*other, "bgra8");
    }

    #[test]
    fn longer_side_decides_the_chain() {
        assert_eq!(level_count(256, 128), 9);
        assert_eq!(level_count(128, 256), 9);
        assert_eq!(level_count(800, 600), 10);
        assert_eq!(level_count(1920, 1080), 11);
    }
}
