//! The textured container with selectable face culling. C cycles through
//! back, front and no culling; F swaps which winding counts as the front.

use glam::{Mat4, Vec3};
use render_lessons::renderer::uniforms::matrices_layout;
use render_lessons::renderer::{
    pipeline_layout, primitives, InstanceBuffer, InstanceRaw, Mesh, PipelineBuilder, Shader,
    Texture, TextureOptions, UniformBlock, Vertex,
};
use render_lessons::{FrameContext, GpuContext, Lesson, SetupContext, UpdateContext, CLEAR_DARK};
use winit::keyboard::KeyCode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CullState {
    cull_mode: Option<wgpu::Face>,
    front_face: wgpu::FrontFace,
}

impl CullState {
    fn next_mode(self) -> Self {
        let cull_mode = match self.cull_mode {
            Some(wgpu::Face::Back) => Some(wgpu::Face::Front),
            Some(wgpu::Face::Front) => None,
            None => Some(wgpu::Face::Back),
        };
        Self { cull_mode, ..self }
    }

    fn flipped(self) -> Self {
        let front_face = match self.front_face {
            wgpu::FrontFace::Ccw => wgpu::FrontFace::Cw,
            wgpu::FrontFace::Cw => wgpu::FrontFace::Ccw,
        };
        Self { front_face, ..self }
    }
}

struct FaceCulling {
    shader: Shader,
    layout: wgpu::PipelineLayout,
    pipeline: wgpu::RenderPipeline,
    state: CullState,
    cube: Mesh,
    instances: InstanceBuffer,
    globals: UniformBlock,
    material: wgpu::BindGroup,
}

fn build_pipeline(
    gpu: &GpuContext,
    layout: &wgpu::PipelineLayout,
    shader: &Shader,
    state: CullState,
) -> wgpu::RenderPipeline {
    PipelineBuilder::new(&gpu.device, layout, shader.module())
        .with_label("Face Culling Pipeline")
        .with_vertex_buffer(Vertex::layout())
        .with_vertex_buffer(InstanceRaw::layout())
        .with_color_target(gpu.surface_format(), Some(wgpu::BlendState::REPLACE))
        .with_depth_stencil(gpu.depth.format, true, wgpu::CompareFunction::Less)
        .with_cull_mode(state.cull_mode)
        .with_front_face(state.front_face)
        .build()
}

impl Lesson for FaceCulling {
    const TITLE: &'static str = "Face Culling";

    fn init(ctx: &mut SetupContext) -> Result<Self, String> {
        let (device, queue) = (&ctx.gpu.device, &ctx.gpu.queue);
        let shader = Shader::from_wgsl(device, "textured.wgsl", include_str!("shaders/textured.wgsl"))?;
        let globals = UniformBlock::new(device, "Face Culling Globals", matrices_layout());

        let container = Texture::from_path_or_fallback(
            device,
            queue,
            ctx.settings.asset("textures/container.jpg"),
            TextureOptions::default(),
        );
        let material_layout = Texture::bind_group_layout(device, "Face Culling Material", 1);
        let material = Texture::bind_group(device, &material_layout, &[&container], "Container");

        let layout = pipeline_layout(
            device,
            "Face Culling Layout",
            &[globals.bind_group_layout(), &material_layout],
        );
        let state = CullState {
            cull_mode: Some(wgpu::Face::Back),
            front_face: wgpu::FrontFace::Ccw,
        };
        let pipeline = build_pipeline(ctx.gpu, &layout, &shader, state);

        log::info!("C: cycle cull mode, F: flip front face");

        Ok(Self {
            shader,
            layout,
            pipeline,
            state,
            cube: Mesh::new(device, "Cube", &primitives::cube(), None),
            instances: InstanceBuffer::new(device, 1),
            globals,
            material,
        })
    }

    fn update(&mut self, ctx: &mut UpdateContext) {
        let mut state = self.state;
        if ctx.input.just_pressed(KeyCode::KeyC) {
            state = state.next_mode();
        }
        if ctx.input.just_pressed(KeyCode::KeyF) {
            state = state.flipped();
        }
        if state != self.state {
            log::info!(
                "Culling {:?} faces, front is {:?}",
                state.cull_mode,
                state.front_face
            );
            self.pipeline = build_pipeline(ctx.gpu, &self.layout, &self.shader, state);
            self.state = state;
        }

        let spin = Mat4::from_axis_angle(Vec3::new(0.5, 1.0, 0.0).normalize(), ctx.clock.elapsed() * 0.5);
        self.instances.write(&ctx.gpu.device, &ctx.gpu.queue, &[spin]);

        let aspect = ctx.gpu.aspect_ratio();
        self.globals
            .set_mat4("projection", ctx.camera.projection_matrix(aspect));
        self.globals.set_mat4("view", ctx.camera.view_matrix());
        self.globals.flush(&ctx.gpu.queue);
    }

    fn render(&mut self, ctx: &mut FrameContext) {
        let mut pass = ctx.begin_pass("Face Culling", CLEAR_DARK);
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, self.globals.bind_group(), &[]);
        pass.set_bind_group(1, &self.material, &[]);
        pass.set_vertex_buffer(1, self.instances.slice());
        self.cube.draw(&mut pass, 0..1);
    }
}

fn main() {
    if let Err(err) = render_lessons::run::<FaceCulling>() {
        eprintln!("{}", err);
    }
}
