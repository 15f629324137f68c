//! The textured rectangle moved to the bottom-right corner and spun around
//! its centre over time.

use glam::{Mat4, Vec3};
use render_lessons::renderer::{
    pipeline_layout, primitives, Mesh, PipelineBuilder, Shader, TexturedVertex, Texture,
    TextureOptions, UniformBlock, UniformLayout, UniformType,
};
use render_lessons::{FrameContext, Lesson, SetupContext, UpdateContext, CLEAR_TEAL};

struct Transformations {
    pipeline: wgpu::RenderPipeline,
    rectangle: Mesh,
    params: UniformBlock,
    material: wgpu::BindGroup,
}

/// Translate after rotating, so the rectangle spins in place.
fn spin_transform(time: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.5, -0.5, 0.0)) * Mat4::from_rotation_z(time)
}

impl Lesson for Transformations {
    const TITLE: &'static str = "Transformations";

    fn init(ctx: &mut SetupContext) -> Result<Self, String> {
        let (device, queue) = (&ctx.gpu.device, &ctx.gpu.queue);
        let shader = Shader::from_wgsl(device, "textures.wgsl", include_str!("shaders/textures.wgsl"))?;

        let mut params = UniformBlock::new(
            device,
            "Transform Params",
            UniformLayout::builder()
                .field("transform", UniformType::Mat4)
                .field("mix_value", UniformType::F32)
                .build(),
        );
        params.set_f32("mix_value", 0.2);

        let load = |name: &str| {
            Texture::from_path_or_fallback(
                device,
                queue,
                ctx.settings.asset(format!("textures/{name}")),
                TextureOptions::default(),
            )
        };
        let container = load("container.jpg");
        let face = load("awesomeface.png");

        let material_layout = Texture::bind_group_layout(device, "Transformations Material", 2);
        let material =
            Texture::bind_group(device, &material_layout, &[&container, &face], "Transformations");

        let layout = pipeline_layout(
            device,
            "Transformations Layout",
            &[params.bind_group_layout(), &material_layout],
        );
        let pipeline = PipelineBuilder::new(device, &layout, shader.module())
            .with_label("Transformations Pipeline")
            .with_vertex_buffer(TexturedVertex::layout())
            .with_color_target(ctx.gpu.surface_format(), Some(wgpu::BlendState::REPLACE))
            .with_no_culling()
            .build();

        let (vertices, indices) = primitives::textured_rectangle();

        Ok(Self {
            pipeline,
            rectangle: Mesh::new(device, "Textured Rectangle", &vertices, Some(&indices)),
            params,
            material,
        })
    }

    fn update(&mut self, ctx: &mut UpdateContext) {
        self.params
            .set_mat4("transform", spin_transform(ctx.clock.elapsed()));
        self.params.flush(&ctx.gpu.queue);
    }

    fn render(&mut self, ctx: &mut FrameContext) {
        let mut pass = ctx.begin_pass_without_depth("Transformations", CLEAR_TEAL);
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, self.params.bind_group(), &[]);
        pass.set_bind_group(1, &self.material, &[]);
        self.rectangle.draw(&mut pass, 0..1);
    }

    fn camera_controls(&self) -> bool {
        false
    }
}

fn main() {
    if let Err(err) = render_lessons::run::<Transformations>() {
        eprintln!("{}", err);
    }
}
