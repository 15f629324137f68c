//! Two containers on a metal floor, rendered into an offscreen colour + depth
//! target and then drawn to the window as one textured quad. Tab cycles the
//! post effects: inversion, grayscale and three convolution kernels.

use glam::{Mat4, Vec3};
use render_lessons::renderer::uniforms::matrices_layout;
use render_lessons::renderer::{
    pipeline_layout, post_effect_layout, primitives, Framebuffer, InstanceBuffer, InstanceRaw,
    Mesh, PipelineBuilder, PostEffect, ScreenVertex, Shader, Texture, TextureOptions,
    UniformBlock, Vertex,
};
use render_lessons::{FrameContext, GpuContext, Lesson, SetupContext, UpdateContext, CLEAR_DARK};
use winit::keyboard::KeyCode;

const CLEAR_WHITE: wgpu::Color = wgpu::Color::WHITE;

struct Framebuffers {
    scene_pipeline: wgpu::RenderPipeline,
    screen_pipeline: wgpu::RenderPipeline,
    cube: Mesh,
    floor: Mesh,
    screen_quad: Mesh,
    instances: InstanceBuffer,
    globals: UniformBlock,
    post: UniformBlock,
    effect: PostEffect,
    container: wgpu::BindGroup,
    metal: wgpu::BindGroup,
    screen_layout: wgpu::BindGroupLayout,
    framebuffer: Framebuffer,
}

impl Lesson for Framebuffers {
    const TITLE: &'static str = "Framebuffers";

    fn init(ctx: &mut SetupContext) -> Result<Self, String> {
        let (device, queue) = (&ctx.gpu.device, &ctx.gpu.queue);
        let scene_shader =
            Shader::from_wgsl(device, "textured.wgsl", include_str!("shaders/textured.wgsl"))?;
        let screen_shader =
            Shader::from_wgsl(device, "screen.wgsl", include_str!("shaders/screen.wgsl"))?;

        let globals = UniformBlock::new(device, "Framebuffers Globals", matrices_layout());
        let mut post = UniformBlock::new(device, "Post Effect", post_effect_layout());
        let effect = PostEffect::default();
        effect.write_uniforms(&mut post);

        let material_layout = Texture::bind_group_layout(device, "Framebuffers Material", 1);
        let material = |name: &str| {
            let texture = Texture::from_path_or_fallback(
                device,
                queue,
                ctx.settings.asset(format!("textures/{name}")),
                TextureOptions::default(),
            );
            Texture::bind_group(device, &material_layout, &[&texture], name)
        };
        let container = material("container.jpg");
        let metal = material("metal.png");

        let format = ctx.gpu.surface_format();
        let screen_layout = Texture::bind_group_layout(device, "Screen Texture", 1);
        let framebuffer = Framebuffer::new(device, ctx.gpu.size, format, &screen_layout);

        let scene_layout = pipeline_layout(
            device,
            "Offscreen Scene Layout",
            &[globals.bind_group_layout(), &material_layout],
        );
        let scene_pipeline = PipelineBuilder::new(device, &scene_layout, scene_shader.module())
            .with_label("Offscreen Scene Pipeline")
            .with_vertex_buffer(Vertex::layout())
            .with_vertex_buffer(InstanceRaw::layout())
            .with_color_target(framebuffer.format(), Some(wgpu::BlendState::REPLACE))
            .with_depth_stencil(framebuffer.depth.format, true, wgpu::CompareFunction::Less)
            .build();

        let screen_pipeline_layout = pipeline_layout(
            device,
            "Screen Layout",
            &[post.bind_group_layout(), &screen_layout],
        );
        let screen_pipeline =
            PipelineBuilder::new(device, &screen_pipeline_layout, screen_shader.module())
                .with_label("Screen Pipeline")
                .with_vertex_buffer(ScreenVertex::layout())
                .with_color_target(format, Some(wgpu::BlendState::REPLACE))
                .with_no_culling()
                .build();

        let models = [
            Mat4::from_translation(Vec3::new(-1.0, 0.0, -1.0)),
            Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)),
            Mat4::IDENTITY,
        ];

        log::info!("Tab cycles the post-processing effect");

        Ok(Self {
            scene_pipeline,
            screen_pipeline,
            cube: Mesh::new(device, "Cube", &primitives::cube(), None),
            floor: Mesh::new(device, "Floor", &primitives::plane(5.0, 2.0), None),
            screen_quad: Mesh::new(device, "Screen Quad", &primitives::screen_quad(), None),
            instances: InstanceBuffer::with_models(device, queue, &models),
            globals,
            post,
            effect,
            container,
            metal,
            screen_layout,
            framebuffer,
        })
    }

    fn update(&mut self, ctx: &mut UpdateContext) {
        if ctx.input.just_pressed(KeyCode::Tab) {
            self.effect = self.effect.next();
            log::info!("Post effect: {:?}", self.effect);
        }
        self.effect.write_uniforms(&mut self.post);
        self.post.flush(&ctx.gpu.queue);

        let aspect = ctx.gpu.aspect_ratio();
        self.globals
            .set_mat4("projection", ctx.camera.projection_matrix(aspect));
        self.globals.set_mat4("view", ctx.camera.view_matrix());
        self.globals.flush(&ctx.gpu.queue);
    }

    fn render(&mut self, ctx: &mut FrameContext) {
        {
            let mut pass = ctx.begin_pass_on(
                "Offscreen Scene",
                self.framebuffer.view(),
                Some(&self.framebuffer.depth),
                CLEAR_DARK,
            );
            pass.set_pipeline(&self.scene_pipeline);
            pass.set_bind_group(0, self.globals.bind_group(), &[]);
            pass.set_vertex_buffer(1, self.instances.slice());

            pass.set_bind_group(1, &self.container, &[]);
            self.cube.draw(&mut pass, 0..1);
            self.cube.draw(&mut pass, 1..2);
            pass.set_bind_group(1, &self.metal, &[]);
            self.floor.draw(&mut pass, 2..3);
        }

        let mut pass = ctx.begin_pass_without_depth("Screen", CLEAR_WHITE);
        pass.set_pipeline(&self.screen_pipeline);
        pass.set_bind_group(0, self.post.bind_group(), &[]);
        pass.set_bind_group(1, &self.framebuffer.bind_group, &[]);
        self.screen_quad.draw(&mut pass, 0..1);
    }

    fn resized(&mut self, gpu: &GpuContext) {
        self.framebuffer
            .resize(&gpu.device, gpu.size, &self.screen_layout);
    }
}

fn main() {
    if let Err(err) = render_lessons::run::<Framebuffers>() {
        eprintln!("{}", err);
    }
}
