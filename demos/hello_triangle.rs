//! An orange triangle straight from clip-space positions.
//! Space switches to an indexed rectangle.

use render_lessons::renderer::vertex::position_layout;
use render_lessons::renderer::{pipeline_layout, primitives, Mesh, PipelineBuilder, Shader};
use render_lessons::{FrameContext, Lesson, SetupContext, UpdateContext, CLEAR_TEAL};
use winit::keyboard::KeyCode;

struct HelloTriangle {
    pipeline: wgpu::RenderPipeline,
    triangle: Mesh,
    rectangle: Mesh,
    show_rectangle: bool,
}

impl Lesson for HelloTriangle {
    const TITLE: &'static str = "Hello Triangle";

    fn init(ctx: &mut SetupContext) -> Result<Self, String> {
        let device = &ctx.gpu.device;
        let shader = Shader::from_wgsl(device, "flat.wgsl", include_str!("shaders/flat.wgsl"))?;
        let layout = pipeline_layout(device, "Hello Triangle Layout", &[]);

        let pipeline = PipelineBuilder::new(device, &layout, shader.module())
            .with_label("Hello Triangle Pipeline")
            .with_vertex_buffer(position_layout())
            .with_color_target(ctx.gpu.surface_format(), Some(wgpu::BlendState::REPLACE))
            .with_no_culling()
            .build();

        let triangle = Mesh::new(device, "Triangle", &primitives::triangle(), None);
        let (corners, indices) = primitives::rectangle();
        let rectangle = Mesh::new(device, "Rectangle", &corners, Some(&indices));

        log::info!("Press Space to toggle between the triangle and the indexed rectangle");

        Ok(Self {
            pipeline,
            triangle,
            rectangle,
            show_rectangle: false,
        })
    }

    fn update(&mut self, ctx: &mut UpdateContext) {
        if ctx.input.just_pressed(KeyCode::Space) {
            self.show_rectangle = !self.show_rectangle;
        }
    }

    fn render(&mut self, ctx: &mut FrameContext) {
        let mut pass = ctx.begin_pass_without_depth("Hello Triangle", CLEAR_TEAL);
        pass.set_pipeline(&self.pipeline);
        let mesh = if self.show_rectangle {
            &self.rectangle
        } else {
            &self.triangle
        };
        mesh.draw(&mut pass, 0..1);
    }

    fn camera_controls(&self) -> bool {
        false
    }
}

fn main() {
    if let Err(err) = render_lessons::run::<HelloTriangle>() {
        eprintln!("{}", err);
    }
}
