//! Per-vertex colours interpolated across a triangle, tinted by a green
//! uniform that pulses with time. Left/Right slide the triangle.

use render_lessons::renderer::{
    pipeline_layout, primitives, ColorVertex, Mesh, PipelineBuilder, Shader, UniformBlock,
    UniformLayout, UniformType,
};
use render_lessons::{FrameContext, Lesson, SetupContext, UpdateContext, CLEAR_TEAL};
use winit::keyboard::KeyCode;

struct Shaders {
    pipeline: wgpu::RenderPipeline,
    triangle: Mesh,
    params: UniformBlock,
    x_offset: f32,
}

impl Lesson for Shaders {
    const TITLE: &'static str = "Shaders";

    fn init(ctx: &mut SetupContext) -> Result<Self, String> {
        let device = &ctx.gpu.device;
        let shader = Shader::from_wgsl(
            device,
            "vertex_color.wgsl",
            include_str!("shaders/vertex_color.wgsl"),
        )?;

        let params = UniformBlock::new(
            device,
            "Shader Params",
            UniformLayout::builder()
                .field("green", UniformType::F32)
                .field("x_offset", UniformType::F32)
                .build(),
        );

        let layout = pipeline_layout(device, "Shaders Layout", &[params.bind_group_layout()]);
        let pipeline = PipelineBuilder::new(device, &layout, shader.module())
            .with_label("Vertex Color Pipeline")
            .with_vertex_buffer(ColorVertex::layout())
            .with_color_target(ctx.gpu.surface_format(), Some(wgpu::BlendState::REPLACE))
            .with_no_culling()
            .build();

        Ok(Self {
            pipeline,
            triangle: Mesh::new(device, "Colored Triangle", &primitives::colored_triangle(), None),
            params,
            x_offset: 0.0,
        })
    }

    fn update(&mut self, ctx: &mut UpdateContext) {
        let dt = ctx.clock.delta();
        if ctx.input.is_held(KeyCode::ArrowLeft) {
            self.x_offset -= 0.5 * dt;
        }
        if ctx.input.is_held(KeyCode::ArrowRight) {
            self.x_offset += 0.5 * dt;
        }
        self.x_offset = self.x_offset.clamp(-0.5, 0.5);

        let green = ctx.clock.elapsed().sin() / 2.0 + 0.5;
        self.params.set_f32("green", green);
        self.params.set_f32("x_offset", self.x_offset);
        self.params.flush(&ctx.gpu.queue);
    }

    fn render(&mut self, ctx: &mut FrameContext) {
        let mut pass = ctx.begin_pass_without_depth("Shaders", CLEAR_TEAL);
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, self.params.bind_group(), &[]);
        self.triangle.draw(&mut pass, 0..1);
    }

    fn camera_controls(&self) -> bool {
        false
    }
}

fn main() {
    if let Err(err) = render_lessons::run::<Shaders>() {
        eprintln!("{}", err);
    }
}
