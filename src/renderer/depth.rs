use winit::dpi::PhysicalSize;

pub struct Depth {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub format: wgpu::TextureFormat,
}

impl Depth {
    /// Depth with an 8-bit stencil, matching a GL depth24/stencil8 attachment.
    pub const DEFAULT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

    pub fn new(
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            format,
        }
    }

    pub fn has_stencil(&self) -> bool {
        self.format.has_stencil_aspect()
    }

    /// Attachment that clears depth to the far plane and stencil to zero.
    pub fn clear_attachment(&self) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        wgpu::RenderPassDepthStencilAttachment {
            view: &self.view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: self.has_stencil().then_some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(0),
                store: wgpu::StoreOp::Store,
            }),
        }
    }
}

/// Turns a `[0, 1]` depth-buffer value from `perspective_rh` back into view distance.
pub fn linearize_depth(depth: f32, near: f32, far: f32) -> f32 {
    near * far / (far - depth * (far - near))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec4};

    #[test]
    fn default_format_carries_stencil() {
        assert!(Depth::DEFAULT_FORMAT.has_stencil_aspect());
        assert!(Depth::DEFAULT_FORMAT.has_depth_aspect());
    }

    #[test]
    fn linearize_depth_hits_the_planes() {
        assert!((linearize_depth(0.0, 0.1, 100.0) - 0.1).abs() < 1e-5);
        assert!((linearize_depth(1.0, 0.1, 100.0) - 100.0).abs() < 1e-2);
    }

    #[test]
    fn linearize_depth_inverts_perspective_projection() {
        let (near, far) = (0.1, 100.0);
        let proj = Mat4::perspective_rh(45f32.to_radians(), 1.0, near, far);

        for distance in [0.5f32, 2.0, 10.0, 42.0, 90.0] {
            let clip = proj * Vec4::new(0.0, 0.0, -distance, 1.0);
            let ndc_depth = clip.z / clip.w;
            assert!((0.0..=1.0).contains(&ndc_depth));

            let recovered = linearize_depth(ndc_depth, near, far);
            assert!(
                (recovered - distance).abs() / distance < 1e-3,
                "{distance} -> {recovered}"
            );
        }
    }
}
