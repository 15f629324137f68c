use winit::dpi::PhysicalSize;

use crate::renderer::uniforms::{UniformData, UniformLayout, UniformType};
use crate::renderer::{Depth, Texture};

/// Offscreen colour + depth/stencil target whose colour can be sampled by a
/// later pass.
pub struct Framebuffer {
    pub color: Texture,
    pub depth: Depth,
    pub bind_group: wgpu::BindGroup,
    format: wgpu::TextureFormat,
}

impl Framebuffer {
    /// `layout` must come from `Texture::bind_group_layout(device, _, 1)`.
    pub fn new(
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
        format: wgpu::TextureFormat,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let color = Texture::render_target(
            device,
            size.width,
            size.height,
            format,
            Some("Framebuffer Color"),
        );
        let depth = Depth::new(device, size, Depth::DEFAULT_FORMAT);
        let bind_group = Texture::bind_group(device, layout, &[&color], "Framebuffer");

        log::debug!(
            "Framebuffer {}x{} ({:?})",
            size.width.max(1),
            size.height.max(1),
            format
        );

        Self {
            color,
            depth,
            bind_group,
            format,
        }
    }

    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
        layout: &wgpu::BindGroupLayout,
    ) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        *self = Self::new(device, size, self.format, layout);
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.color.view
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

/// Full-screen effects applied when the offscreen image is drawn to the window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PostEffect {
    #[default]
    None,
    Inversion,
    Grayscale,
    Sharpen,
    Blur,
    EdgeDetect,
}

impl PostEffect {
    pub const ALL: [PostEffect; 6] = [
        PostEffect::None,
        PostEffect::Inversion,
        PostEffect::Grayscale,
        PostEffect::Sharpen,
        PostEffect::Blur,
        PostEffect::EdgeDetect,
    ];

    /// Sample distance, in uv units, between kernel taps.
    pub const KERNEL_OFFSET: f32 = 1.0 / 300.0;

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|e| *e == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// 0 passes through, 1 inverts, 2 is grayscale, 3 convolves with `kernel()`.
    pub fn mode(self) -> u32 {
        match self {
            PostEffect::None => 0,
            PostEffect::Inversion => 1,
            PostEffect::Grayscale => 2,
            PostEffect::Sharpen | PostEffect::Blur | PostEffect::EdgeDetect => 3,
        }
    }

    /// 3x3 kernel, row-major from the top-left tap.
    pub fn kernel(self) -> [f32; 9] {
        match self {
            PostEffect::Sharpen => [-1.0, -1.0, -1.0, -1.0, 9.0, -1.0, -1.0, -1.0, -1.0],
            PostEffect::Blur => [1.0, 2.0, 1.0, 2.0, 4.0, 2.0, 1.0, 2.0, 1.0].map(|w| w / 16.0),
            PostEffect::EdgeDetect => [1.0, 1.0, 1.0, 1.0, -8.0, 1.0, 1.0, 1.0, 1.0],
            _ => [0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
        }
    }

    pub fn write_uniforms(self, data: &mut UniformData) {
        data.set_u32("mode", self.mode());
        data.set_f32("offset", Self::KERNEL_OFFSET);
        for (i, weight) in self.kernel().into_iter().enumerate() {
            data.set_f32(&format!("kernel[{i}]"), weight);
        }
    }
}

/// `struct PostParams { mode: u32, offset: f32, kernel: array<vec4<f32>, 9> }`;
/// each kernel weight lives in the `.x` of its element.
pub fn post_effect_layout() -> UniformLayout {
    UniformLayout::builder()
        .field("mode", UniformType::U32)
        .field("offset", UniformType::F32)
        .array("kernel", UniformType::F32, 9)
        .build()
}
