//! Two triangles in separate buffers, drawn by two pipelines that differ only
//! in their fragment entry point.

use render_lessons::renderer::vertex::position_layout;
use render_lessons::renderer::{pipeline_layout, primitives, Mesh, PipelineBuilder, Shader};
use render_lessons::{FrameContext, Lesson, SetupContext, CLEAR_TEAL};

struct TwoTriangles {
    orange: wgpu::RenderPipeline,
    yellow: wgpu::RenderPipeline,
    left: Mesh,
    right: Mesh,
}

impl Lesson for TwoTriangles {
    const TITLE: &'static str = "Two Triangles";

    fn init(ctx: &mut SetupContext) -> Result<Self, String> {
        let device = &ctx.gpu.device;
        let shader = Shader::from_wgsl(device, "flat.wgsl", include_str!("shaders/flat.wgsl"))?;
        let layout = pipeline_layout(device, "Two Triangles Layout", &[]);
        let format = ctx.gpu.surface_format();

        let build = |label: &'static str, fragment_entry: &'static str| {
            PipelineBuilder::new(device, &layout, shader.module())
                .with_label(label)
                .with_fragment_entry(fragment_entry)
                .with_vertex_buffer(position_layout())
                .with_color_target(format, Some(wgpu::BlendState::REPLACE))
                .with_no_culling()
                .build()
        };

        let (left, right) = primitives::two_triangles();

        Ok(Self {
            orange: build("Orange Pipeline", "fs_main"),
            yellow: build("Yellow Pipeline", "fs_yellow"),
            left: Mesh::new(device, "Left Triangle", &left, None),
            right: Mesh::new(device, "Right Triangle", &right, None),
        })
    }

    fn render(&mut self, ctx: &mut FrameContext) {
        let mut pass = ctx.begin_pass_without_depth("Two Triangles", CLEAR_TEAL);
        pass.set_pipeline(&self.orange);
        self.left.draw(&mut pass, 0..1);
        pass.set_pipeline(&self.yellow);
        self.right.draw(&mut pass, 0..1);
    }

    fn camera_controls(&self) -> bool {
        false
    }
}

fn main() {
    if let Err(err) = render_lessons::run::<TwoTriangles>() {
        eprintln!("{}", err);
    }
}
