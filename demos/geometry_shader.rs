//! Four coloured points, each expanded into a little house with a white roof.
//! The expansion runs in the vertex stage: every point is one instance of a
//! five-vertex triangle strip.

use render_lessons::renderer::{
    pipeline_layout, primitives, Mesh, PipelineBuilder, PointVertex, Shader,
};
use render_lessons::{FrameContext, Lesson, SetupContext, CLEAR_DARK};

const HOUSE_CORNERS: u32 = 5;

struct GeometryShader {
    pipeline: wgpu::RenderPipeline,
    points: Mesh,
}

impl Lesson for GeometryShader {
    const TITLE: &'static str = "Geometry Shader";

    fn init(ctx: &mut SetupContext) -> Result<Self, String> {
        let device = &ctx.gpu.device;
        let shader = Shader::from_wgsl(device, "geometry.wgsl", include_str!("shaders/geometry.wgsl"))?;
        let layout = pipeline_layout(device, "Houses Layout", &[]);

        let pipeline = PipelineBuilder::new(device, &layout, shader.module())
            .with_label("Houses Pipeline")
            .with_vertex_buffer(PointVertex::layout())
            .with_color_target(ctx.gpu.surface_format(), Some(wgpu::BlendState::REPLACE))
            .with_topology(wgpu::PrimitiveTopology::TriangleStrip)
            .with_no_culling()
            .build();

        Ok(Self {
            pipeline,
            points: Mesh::new(device, "House Points", &primitives::house_points(), None),
        })
    }

    fn render(&mut self, ctx: &mut FrameContext) {
        let mut pass = ctx.begin_pass_without_depth("Geometry Shader", CLEAR_DARK);
        pass.set_pipeline(&self.pipeline);
        pass.set_vertex_buffer(0, self.points.vertex_buffer.slice(..));
        pass.draw(0..HOUSE_CORNERS, 0..self.points.vertex_count);
    }

    fn camera_controls(&self) -> bool {
        false
    }
}

fn main() {
    if let Err(err) = render_lessons::run::<GeometryShader>() {
        eprintln!("{}", err);
    }
}
