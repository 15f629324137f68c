//! A container texture mixed with a smiley on an indexed rectangle.
//! Up/Down change how much of the smiley shows through.

use glam::Mat4;
use render_lessons::renderer::{
    pipeline_layout, primitives, Mesh, PipelineBuilder, Shader, TexturedVertex, Texture,
    TextureOptions, UniformBlock, UniformLayout, UniformType,
};
use render_lessons::{FrameContext, Lesson, SetupContext, UpdateContext, CLEAR_TEAL};
use winit::keyboard::KeyCode;

const MIX_RATE: f32 = 0.5;

struct Textures {
    pipeline: wgpu::RenderPipeline,
    rectangle: Mesh,
    params: UniformBlock,
    material: wgpu::BindGroup,
    mix_value: f32,
}

impl Lesson for Textures {
    const TITLE: &'static str = "Textures";

    fn init(ctx: &mut SetupContext) -> Result<Self, String> {
        let (device, queue) = (&ctx.gpu.device, &ctx.gpu.queue);
        let shader = Shader::from_wgsl(device, "textures.wgsl", include_str!("shaders/textures.wgsl"))?;

        let mut params = UniformBlock::new(
            device,
            "Texture Params",
            UniformLayout::builder()
                .field("transform", UniformType::Mat4)
                .field("mix_value", UniformType::F32)
                .build(),
        );
        params.set_mat4("transform", Mat4::IDENTITY);

        let container = Texture::from_path_or_fallback(
            device,
            queue,
            ctx.settings.asset("textures/container.jpg"),
            TextureOptions::default(),
        );
        let face = Texture::from_path_or_fallback(
            device,
            queue,
            ctx.settings.asset("textures/awesomeface.png"),
            TextureOptions::default(),
        );
        let material_layout = Texture::bind_group_layout(device, "Textures Material", 2);
        let material = Texture::bind_group(device, &material_layout, &[&container, &face], "Textures");

        let layout = pipeline_layout(
            device,
            "Textures Layout",
            &[params.bind_group_layout(), &material_layout],
        );
        let pipeline = PipelineBuilder::new(device, &layout, shader.module())
            .with_label("Textures Pipeline")
            .with_vertex_buffer(TexturedVertex::layout())
            .with_color_target(ctx.gpu.surface_format(), Some(wgpu::BlendState::REPLACE))
            .with_no_culling()
            .build();

        let (vertices, indices) = primitives::textured_rectangle();

        log::info!("Up/Down change the texture mix");

        Ok(Self {
            pipeline,
            rectangle: Mesh::new(device, "Textured Rectangle", &vertices, Some(&indices)),
            params,
            material,
            mix_value: 0.2,
        })
    }

    fn update(&mut self, ctx: &mut UpdateContext) {
        let step = MIX_RATE * ctx.clock.delta();
        if ctx.input.is_held(KeyCode::ArrowUp) {
            self.mix_value += step;
        }
        if ctx.input.is_held(KeyCode::ArrowDown) {
            self.mix_value -= step;
        }
        self.mix_value = self.mix_value.clamp(0.0, 1.0);

        self.params.set_f32("mix_value", self.mix_value);
        self.params.flush(&ctx.gpu.queue);
    }

    fn render(&mut self, ctx: &mut FrameContext) {
        let mut pass = ctx.begin_pass_without_depth("Textures", CLEAR_TEAL);
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
    if let Err(err) = render_lessons::run::<Textures>() {
        eprintln!("{}", err);
    }
}
