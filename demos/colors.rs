//! A coral cube under a white lamp: ambient, diffuse and specular terms of
//! the Phong model. The lamp itself is a small unlit cube.

use glam::{Mat4, Vec3};
use render_lessons::renderer::{
    pipeline_layout, primitives, InstanceBuffer, InstanceRaw, Mesh, PipelineBuilder, Shader,
    UniformBlock, UniformLayout, UniformType, Vertex,
};
use render_lessons::{FrameContext, Lesson, SetupContext, UpdateContext, CLEAR_DARK};

const LIGHT_POS: Vec3 = Vec3::new(1.2, 1.0, 2.0);
const CORAL: Vec3 = Vec3::new(1.0, 0.5, 0.31);

struct Colors {
    lit: wgpu::RenderPipeline,
    lamp: wgpu::RenderPipeline,
    cube: Mesh,
    instances: InstanceBuffer,
    globals: UniformBlock,
}

impl Lesson for Colors {
    const TITLE: &'static str = "Colors";

    fn init(ctx: &mut SetupContext) -> Result<Self, String> {
        let (device, queue) = (&ctx.gpu.device, &ctx.gpu.queue);
        let shader = Shader::from_wgsl(device, "colors.wgsl", include_str!("shaders/colors.wgsl"))?;

        let mut globals = UniformBlock::new(
            device,
            "Colors Globals",
            UniformLayout::builder()
                .field("projection", UniformType::Mat4)
                .field("view", UniformType::Mat4)
                .field("view_pos", UniformType::Vec3)
                .field("light_pos", UniformType::Vec3)
                .field("light_color", UniformType::Vec3)
                .field("object_color", UniformType::Vec3)
                .build(),
        );
        globals.set_vec3("light_pos", LIGHT_POS);
        globals.set_vec3("light_color", Vec3::ONE);
        globals.set_vec3("object_color", CORAL);

        let layout = pipeline_layout(device, "Colors Layout", &[globals.bind_group_layout()]);
        let build = |label: &'static str, fragment_entry: &'static str| {
            PipelineBuilder::new(device, &layout, shader.module())
                .with_label(label)
                .with_fragment_entry(fragment_entry)
                .with_vertex_buffer(Vertex::layout())
                .with_vertex_buffer(InstanceRaw::layout())
                .with_color_target(ctx.gpu.surface_format(), Some(wgpu::BlendState::REPLACE))
                .with_depth_stencil(ctx.gpu.depth.format, true, wgpu::CompareFunction::Less)
                .build()
        };

        let models = [
            Mat4::IDENTITY,
            Mat4::from_translation(LIGHT_POS) * Mat4::from_scale(Vec3::splat(0.2)),
        ];

        Ok(Self {
            lit: build("Lit Object Pipeline", "fs_lit"),
            lamp: build("Lamp Pipeline", "fs_lamp"),
            cube: Mesh::new(device, "Cube", &primitives::cube(), None),
            instances: InstanceBuffer::with_models(device, queue, &models),
            globals,
        })
    }

    fn update(&mut self, ctx: &mut UpdateContext) {
        let aspect = ctx.gpu.aspect_ratio();
        self.globals
            .set_mat4("projection", ctx.camera.projection_matrix(aspect));
        self.globals.set_mat4("view", ctx.camera.view_matrix());
        self.globals.set_vec3("view_pos", ctx.camera.position);
        self.globals.flush(&ctx.gpu.queue);
    }

    fn render(&mut self, ctx: &mut FrameContext) {
        let mut pass = ctx.begin_pass("Colors", CLEAR_DARK);
        pass.set_bind_group(0, self.globals.bind_group(), &[]);
        pass.set_vertex_buffer(1, self.instances.slice());

        pass.set_pipeline(&self.lit);
        self.cube.draw(&mut pass, 0..1);

        pass.set_pipeline(&self.lamp);
        self.cube.draw(&mut pass, 1..2);
    }
}

fn main() {
    if let Err(err) = render_lessons::run::<Colors>() {
        eprintln!("{}", err);
    }
}
