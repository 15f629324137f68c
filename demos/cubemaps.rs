//! A skybox drawn last at the far plane, around a container that is either
//! textured, a mirror of the sky, or a block of glass. Tab cycles the three.

use glam::Mat4;
use render_lessons::renderer::vertex::position_layout;
use render_lessons::renderer::{
    pipeline_layout, primitives, Cubemap, InstanceBuffer, InstanceRaw, Mesh, PipelineBuilder,
    Shader, Texture, TextureOptions, UniformBlock, UniformLayout, UniformType, Vertex,
};
use render_lessons::{FrameContext, Lesson, SetupContext, UpdateContext, CLEAR_DARK};
use winit::keyboard::KeyCode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Surface {
    Textured,
    Reflective,
    Refractive,
}

impl Surface {
    fn next(self) -> Self {
        match self {
            Surface::Textured => Surface::Reflective,
            Surface::Reflective => Surface::Refractive,
            Surface::Refractive => Surface::Textured,
        }
    }

    fn mode(self) -> u32 {
        self as u32
    }
}

struct Cubemaps {
    cube_pipeline: wgpu::RenderPipeline,
    skybox_pipeline: wgpu::RenderPipeline,
    cube: Mesh,
    skybox: Mesh,
    instances: InstanceBuffer,
    globals: UniformBlock,
    container: wgpu::BindGroup,
    sky: wgpu::BindGroup,
    surface: Surface,
}

impl Lesson for Cubemaps {
    const TITLE: &'static str = "Cubemaps";

    fn init(ctx: &mut SetupContext) -> Result<Self, String> {
        let (device, queue) = (&ctx.gpu.device, &ctx.gpu.queue);
        let cube_shader =
            Shader::from_wgsl(device, "cubemaps.wgsl", include_str!("shaders/cubemaps.wgsl"))?;
        let skybox_shader =
            Shader::from_wgsl(device, "skybox.wgsl", include_str!("shaders/skybox.wgsl"))?;

        let globals = UniformBlock::new(
            device,
            "Cubemaps Globals",
            UniformLayout::builder()
                .field("projection", UniformType::Mat4)
                .field("view", UniformType::Mat4)
                .field("skybox_view", UniformType::Mat4)
                .field("camera_pos", UniformType::Vec3)
                .field("mode", UniformType::U32)
                .build(),
        );

        let faces = Cubemap::face_paths(ctx.settings.asset("textures/skybox"), "jpg");
        let cubemap = Cubemap::from_faces_or_fallback(device, queue, &faces);
        let cubemap_layout = Cubemap::bind_group_layout(device, "Skybox Layout");
        let sky = cubemap.bind_group(device, &cubemap_layout);

        let texture = Texture::from_path_or_fallback(
            device,
            queue,
            ctx.settings.asset("textures/container.jpg"),
            TextureOptions::default(),
        );
        let material_layout = Texture::bind_group_layout(device, "Cubemaps Material", 1);
        let container = Texture::bind_group(device, &material_layout, &[&texture], "Container");

        let format = ctx.gpu.surface_format();
        let depth_format = ctx.gpu.depth.format;

        let cube_layout = pipeline_layout(
            device,
            "Environment Cube Layout",
            &[globals.bind_group_layout(), &material_layout, &cubemap_layout],
        );
        let cube_pipeline = PipelineBuilder::new(device, &cube_layout, cube_shader.module())
            .with_label("Environment Cube Pipeline")
            .with_vertex_buffer(Vertex::layout())
            .with_vertex_buffer(InstanceRaw::layout())
            .with_color_target(format, Some(wgpu::BlendState::REPLACE))
            .with_depth_stencil(depth_format, true, wgpu::CompareFunction::Less)
            .build();

        let skybox_layout = pipeline_layout(
            device,
            "Skybox Layout",
            &[globals.bind_group_layout(), &cubemap_layout],
        );
        // the sky sits at depth 1.0, so it must pass against a cleared buffer
        let skybox_pipeline = PipelineBuilder::new(device, &skybox_layout, skybox_shader.module())
            .with_label("Skybox Pipeline")
            .with_vertex_buffer(position_layout())
            .with_color_target(format, Some(wgpu::BlendState::REPLACE))
            .with_depth_stencil(depth_format, false, wgpu::CompareFunction::LessEqual)
            .with_no_culling()
            .build();

        log::info!("Tab cycles texture, reflection and refraction");

        Ok(Self {
            cube_pipeline,
            skybox_pipeline,
            cube: Mesh::new(device, "Cube", &primitives::cube(), None),
            skybox: Mesh::new(device, "Skybox", &primitives::skybox(), None),
            instances: InstanceBuffer::with_models(device, queue, &[Mat4::IDENTITY]),
            globals,
            container,
            sky,
            surface: Surface::Textured,
        })
    }

    fn update(&mut self, ctx: &mut UpdateContext) {
        if ctx.input.just_pressed(KeyCode::Tab) {
            self.surface = self.surface.next();
            log::info!("Container surface: {:?}", self.surface);
        }

        let camera = &ctx.camera;
        let aspect = ctx.gpu.aspect_ratio();
        self.globals
            .set_mat4("projection", camera.projection_matrix(aspect));
        self.globals.set_mat4("view", camera.view_matrix());
        self.globals
            .set_mat4("skybox_view", camera.view_without_translation());
        self.globals.set_vec3("camera_pos", camera.position);
        self.globals.set_u32("mode", self.surface.mode());
        self.globals.flush(&ctx.gpu.queue);
    }

    fn render(&mut self, ctx: &mut FrameContext) {
        let mut pass = ctx.begin_pass("Cubemaps", CLEAR_DARK);
        pass.set_bind_group(0, self.globals.bind_group(), &[]);

        pass.set_pipeline(&self.cube_pipeline);
        pass.set_bind_group(1, &self.container, &[]);
        pass.set_bind_group(2, &self.sky, &[]);
        pass.set_vertex_buffer(1, self.instances.slice());
        self.cube.draw(&mut pass, 0..1);

        pass.set_pipeline(&self.skybox_pipeline);
        pass.set_bind_group(1, &self.sky, &[]);
        self.skybox.draw(&mut pass, 0..1);
    }
}

fn main() {
    if let Err(err) = render_lessons::run::<Cubemaps>() {
        eprintln!("{}", err);
    }
}
