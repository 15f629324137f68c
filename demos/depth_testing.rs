//! Two marble cubes on a metal floor. 1 and 2 switch the depth comparison
//! between `Less` and `Always`; V shows linearised depth instead of colour.

use glam::{Mat4, Vec3};
use render_lessons::renderer::{
    pipeline_layout, primitives, InstanceBuffer, InstanceRaw, Mesh, PipelineBuilder, Shader,
    Texture, TextureOptions, UniformBlock, UniformLayout, UniformType, Vertex,
};
use render_lessons::{FrameContext, Lesson, SetupContext, UpdateContext, CLEAR_DARK};
use winit::keyboard::KeyCode;

struct DepthTesting {
    less: wgpu::RenderPipeline,
    always: wgpu::RenderPipeline,
    use_always: bool,
    visualize: bool,
    cube: Mesh,
    floor: Mesh,
    instances: InstanceBuffer,
    globals: UniformBlock,
    marble: wgpu::BindGroup,
    metal: wgpu::BindGroup,
}

impl Lesson for DepthTesting {
    const TITLE: &'static str = "Depth Testing";

    fn init(ctx: &mut SetupContext) -> Result<Self, String> {
        let (device, queue) = (&ctx.gpu.device, &ctx.gpu.queue);
        let shader = Shader::from_wgsl(
            device,
            "depth_testing.wgsl",
            include_str!("shaders/depth_testing.wgsl"),
        )?;

        let mut globals = UniformBlock::new(
            device,
            "Depth Testing Globals",
            UniformLayout::builder()
                .field("projection", UniformType::Mat4)
                .field("view", UniformType::Mat4)
                .field("near", UniformType::F32)
                .field("far", UniformType::F32)
                .field("visualize", UniformType::U32)
                .build(),
        );
        globals.set_f32("near", ctx.camera.near);
        globals.set_f32("far", ctx.camera.far);

        let material_layout = Texture::bind_group_layout(device, "Depth Testing Material", 1);
        let material = |name: &str| {
            let texture = Texture::from_path_or_fallback(
                device,
                queue,
                ctx.settings.asset(format!("textures/{name}")),
                TextureOptions::default(),
            );
            Texture::bind_group(device, &material_layout, &[&texture], name)
        };
        let marble = material("marble.jpg");
        let metal = material("metal.png");

        let layout = pipeline_layout(
            device,
            "Depth Testing Layout",
            &[globals.bind_group_layout(), &material_layout],
        );
        let format = ctx.gpu.surface_format();
        let depth_format = ctx.gpu.depth.format;
        let build = |label: &'static str, compare: wgpu::CompareFunction| {
            PipelineBuilder::new(device, &layout, shader.module())
                .with_label(label)
                .with_vertex_buffer(Vertex::layout())
                .with_vertex_buffer(InstanceRaw::layout())
                .with_color_target(format, Some(wgpu::BlendState::REPLACE))
                .with_depth_stencil(depth_format, true, compare)
                .build()
        };

        let models = [
            Mat4::from_translation(Vec3::new(-1.0, 0.0, -1.0)),
            Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)),
            Mat4::IDENTITY,
        ];

        log::info!("1: depth compare Less, 2: depth compare Always, V: visualise depth");

        Ok(Self {
            less: build("Depth Less Pipeline", wgpu::CompareFunction::Less),
            always: build("Depth Always Pipeline", wgpu::CompareFunction::Always),
            use_always: false,
            visualize: false,
            cube: Mesh::new(device, "Cube", &primitives::cube(), None),
            floor: Mesh::new(device, "Floor", &primitives::plane(5.0, 2.0), None),
            instances: InstanceBuffer::with_models(device, queue, &models),
            globals,
            marble,
            metal,
        })
    }

    fn update(&mut self, ctx: &mut UpdateContext) {
        if ctx.input.just_pressed(KeyCode::Digit1) {
            self.use_always = false;
        }
        if ctx.input.just_pressed(KeyCode::Digit2) {
            self.use_always = true;
        }
        if ctx.input.just_pressed(KeyCode::KeyV) {
            self.visualize = !self.visualize;
        }

        let aspect = ctx.gpu.aspect_ratio();
        self.globals
            .set_mat4("projection", ctx.camera.projection_matrix(aspect));
        self.globals.set_mat4("view", ctx.camera.view_matrix());
        self.globals.set_u32("visualize", self.visualize as u32);
        self.globals.flush(&ctx.gpu.queue);
    }

    fn render(&mut self, ctx: &mut FrameContext) {
        let mut pass = ctx.begin_pass("Depth Testing", CLEAR_DARK);
        let pipeline = if self.use_always {
            &self.always
        } else {
            &self.less
        };
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, self.globals.bind_group(), &[]);
        pass.set_vertex_buffer(1, self.instances.slice());

        pass.set_bind_group(1, &self.marble, &[]);
        self.cube.draw(&mut pass, 0..1);
        self.cube.draw(&mut pass, 1..2);

        pass.set_bind_group(1, &self.metal, &[]);
        self.floor.draw(&mut pass, 2..3);
    }
}

fn main() {
    if let Err(err) = render_lessons::run::<DepthTesting>() {
        eprintln!("{}", err);
    }
}
