//! One uniform block of projection and view matrices, written once per frame
//! and bound by four different pipelines, one colour each. Walk into a cube
//! to see its back faces drawn darker.

use glam::{Mat4, Vec3};
use render_lessons::renderer::uniforms::matrices_layout;
use render_lessons::renderer::{
    pipeline_layout, primitives, InstanceBuffer, InstanceRaw, Mesh, PipelineBuilder, Shader,
    UniformBlock, Vertex,
};
use render_lessons::{FrameContext, Lesson, SetupContext, UpdateContext, CLEAR_DARK};

const CUBES: [(&str, Vec3); 4] = [
    ("fs_red", Vec3::new(-0.75, 0.75, 0.0)),
    ("fs_green", Vec3::new(0.75, 0.75, 0.0)),
    ("fs_yellow", Vec3::new(-0.75, -0.75, 0.0)),
    ("fs_blue", Vec3::new(0.75, -0.75, 0.0)),
];

struct AdvancedGlsl {
    pipelines: Vec<wgpu::RenderPipeline>,
    cube: Mesh,
    instances: InstanceBuffer,
    matrices: UniformBlock,
}

impl Lesson for AdvancedGlsl {
    const TITLE: &'static str = "Advanced GLSL";

    fn init(ctx: &mut SetupContext) -> Result<Self, String> {
        let (device, queue) = (&ctx.gpu.device, &ctx.gpu.queue);
        let shader = Shader::from_wgsl(
            device,
            "advanced_glsl.wgsl",
            include_str!("shaders/advanced_glsl.wgsl"),
        )?;
        let matrices = UniformBlock::new(device, "Matrices", matrices_layout());

        let layout = pipeline_layout(device, "Matrices Layout", &[matrices.bind_group_layout()]);
        let pipelines = CUBES
            .iter()
            .map(|&(fragment_entry, _)| {
                PipelineBuilder::new(device, &layout, shader.module())
                    .with_label(fragment_entry)
                    .with_fragment_entry(fragment_entry)
                    .with_vertex_buffer(Vertex::layout())
                    .with_vertex_buffer(InstanceRaw::layout())
                    .with_color_target(ctx.gpu.surface_format(), Some(wgpu::BlendState::REPLACE))
                    .with_depth_stencil(ctx.gpu.depth.format, true, wgpu::CompareFunction::Less)
                    .with_no_culling()
                    .build()
            })
            .collect();

        let models: Vec<Mat4> = CUBES
            .iter()
            .map(|(_, position)| Mat4::from_translation(*position))
            .collect();

        Ok(Self {
            pipelines,
            cube: Mesh::new(device, "Cube", &primitives::cube(), None),
            instances: InstanceBuffer::with_models(device, queue, &models),
            matrices,
        })
    }

    fn update(&mut self, ctx: &mut UpdateContext) {
        let aspect = ctx.gpu.aspect_ratio();
        self.matrices
            .set_mat4("projection", ctx.camera.projection_matrix(aspect));
        self.matrices.set_mat4("view", ctx.camera.view_matrix());
        self.matrices.flush(&ctx.gpu.queue);
    }

    fn render(&mut self, ctx: &mut FrameContext) {
        let mut pass = ctx.begin_pass("Advanced GLSL", CLEAR_DARK);
        pass.set_bind_group(0, self.matrices.bind_group(), &[]);
        pass.set_vertex_buffer(1, self.instances.slice());
        for (slot, pipeline) in (0u32..).zip(&self.pipelines) {
            pass.set_pipeline(pipeline);
            self.cube.draw(&mut pass, slot..slot + 1);
        }
    }
}

fn main() {
    if let Err(err) = render_lessons::run::<AdvancedGlsl>() {
        eprintln!("{}", err);
    }
}
