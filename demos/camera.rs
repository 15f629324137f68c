//! Ten textured containers in a 3D scene with a free-flying camera:
//! WASD to move, mouse to look, scroll to zoom.

use glam::{Mat4, Quat, Vec3};
use render_lessons::renderer::{
    pipeline_layout, primitives, InstanceBuffer, InstanceRaw, Mesh, PipelineBuilder, Shader,
    Texture, TextureOptions, UniformBlock, UniformLayout, UniformType, Vertex,
};
use render_lessons::{FrameContext, Lesson, SetupContext, UpdateContext, CLEAR_TEAL};

struct CameraLesson {
    pipeline: wgpu::RenderPipeline,
    cube: Mesh,
    instances: InstanceBuffer,
    globals: UniformBlock,
    material: wgpu::BindGroup,
}

/// Container `i` sits at its slot, turned `20 * i` degrees about a fixed axis.
fn container_models() -> Vec<Mat4> {
    let axis = Vec3::new(1.0, 0.3, 0.5).normalize();
    primitives::cube_positions()
        .iter()
        .enumerate()
        .map(|(i, position)| {
            let rotation = Quat::from_axis_angle(axis, (20.0 * i as f32).to_radians());
            Mat4::from_rotation_translation(rotation, *position)
        })
        .collect()
}

impl Lesson for CameraLesson {
    const TITLE: &'static str = "Camera";

    fn init(ctx: &mut SetupContext) -> Result<Self, String> {
        let (device, queue) = (&ctx.gpu.device, &ctx.gpu.queue);
        let shader = Shader::from_wgsl(device, "camera.wgsl", include_str!("shaders/camera.wgsl"))?;

        let mut globals = UniformBlock::new(
            device,
            "Camera Globals",
            UniformLayout::builder()
                .field("projection", UniformType::Mat4)
                .field("view", UniformType::Mat4)
                .field("mix_value", UniformType::F32)
                .build(),
        );
        globals.set_f32("mix_value", 0.2);

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
        let material_layout = Texture::bind_group_layout(device, "Camera Material", 2);
        let material = Texture::bind_group(device, &material_layout, &[&container, &face], "Camera");

        let layout = pipeline_layout(
            device,
            "Camera Layout",
            &[globals.bind_group_layout(), &material_layout],
        );
        let pipeline = PipelineBuilder::new(device, &layout, shader.module())
            .with_label("Camera Pipeline")
            .with_vertex_buffer(Vertex::layout())
            .with_vertex_buffer(InstanceRaw::layout())
            .with_color_target(ctx.gpu.surface_format(), Some(wgpu::BlendState::REPLACE))
            .with_depth_stencil(ctx.gpu.depth.format, true, wgpu::CompareFunction::Less)
            .build();

        Ok(Self {
            pipeline,
            cube: Mesh::new(device, "Cube", &primitives::cube(), None),
            instances: InstanceBuffer::with_models(device, queue, &container_models()),
            globals,
            material,
        })
    }

    fn update(&mut self, ctx: &mut UpdateContext) {
        let aspect = ctx.gpu.aspect_ratio();
        self.globals
            .set_mat4("projection", ctx.camera.projection_matrix(aspect));
        self.globals.set_mat4("view", ctx.camera.view_matrix());
        self.globals.flush(&ctx.gpu.queue);
    }

    fn render(&mut self, ctx: &mut FrameContext) {
        let mut pass = ctx.begin_pass("Camera", CLEAR_TEAL);
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, self.globals.bind_group(), &[]);
        pass.set_bind_group(1, &self.material, &[]);
        pass.set_vertex_buffer(1, self.instances.slice());
        for i in 0..self.instances.len() {
            self.cube.draw(&mut pass, i..i + 1);
        }
    }
}

fn main() {
    if let Err(err) = render_lessons::run::<CameraLesson>() {
        eprintln!("{}", err);
    }
}
