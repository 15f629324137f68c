//! A planet inside a ring of asteroids. All rock transforms live in one
//! instance buffer; N switches between one draw call per rock and a single
//! instanced draw. Ring size comes from the `instancing` settings.

use std::path::Path;

use glam::{Mat4, Vec3};
use render_lessons::instancing::AsteroidField;
use render_lessons::renderer::uniforms::matrices_layout;
use render_lessons::renderer::{
    pipeline_layout, primitives, InstanceBuffer, InstanceRaw, PipelineBuilder, Shader,
    UniformBlock, Vertex,
};
use render_lessons::scene::{MeshData, Model, ModelData};
use render_lessons::{FrameContext, GpuContext, Lesson, SetupContext, UpdateContext, CLEAR_DARK};
use winit::keyboard::KeyCode;

struct Instancing {
    pipeline: wgpu::RenderPipeline,
    planet: Model,
    rock: Model,
    instances: InstanceBuffer,
    globals: UniformBlock,
    field: AsteroidField,
    instanced: bool,
}

/// The model at `path`, or a plain sphere when it cannot be loaded.
fn model_or_sphere(gpu: &GpuContext, path: &Path, layout: &wgpu::BindGroupLayout) -> Model {
    let model = Model::load_or_empty(gpu, path, layout);
    if !model.is_empty() {
        return model;
    }

    let (vertices, indices) = primitives::sphere(32, 16);
    let sphere = ModelData {
        meshes: vec![MeshData {
            name: "sphere".to_string(),
            vertices,
            indices,
            textures: Vec::new(),
        }],
        directory: path.parent().unwrap_or(Path::new(".")).to_path_buf(),
    };
    log::warn!("Drawing a sphere in place of {:?}", path);
    Model::upload(&gpu.device, &gpu.queue, &sphere, layout)
}

impl Lesson for Instancing {
    const TITLE: &'static str = "Instancing";

    fn init(ctx: &mut SetupContext) -> Result<Self, String> {
        let device = &ctx.gpu.device;
        let shader =
            Shader::from_wgsl(device, "instancing.wgsl", include_str!("shaders/instancing.wgsl"))?;
        let globals = UniformBlock::new(device, "Instancing Globals", matrices_layout());

        let material_layout = Model::material_layout(device);
        let planet = model_or_sphere(
            ctx.gpu,
            &ctx.settings.asset("objects/planet/planet.obj"),
            &material_layout,
        );
        let rock = model_or_sphere(
            ctx.gpu,
            &ctx.settings.asset("objects/rock/rock.obj"),
            &material_layout,
        );

        let field = AsteroidField::from(ctx.settings.instancing);
        let planet_model =
            Mat4::from_translation(Vec3::new(0.0, -3.0, 0.0)) * Mat4::from_scale(Vec3::splat(4.0));
        let models: Vec<Mat4> = std::iter::once(planet_model)
            .chain(field.generate())
            .collect();
        log::info!("{} asteroids within radius {}", field.amount, field.radius);

        let layout = pipeline_layout(
            device,
            "Instancing Layout",
            &[globals.bind_group_layout(), &material_layout],
        );
        let pipeline = PipelineBuilder::new(device, &layout, shader.module())
            .with_label("Instancing Pipeline")
            .with_vertex_buffer(Vertex::layout())
            .with_vertex_buffer(InstanceRaw::layout())
            .with_color_target(ctx.gpu.surface_format(), Some(wgpu::BlendState::REPLACE))
            .with_depth_stencil(ctx.gpu.depth.format, true, wgpu::CompareFunction::Less)
            .build();

        ctx.camera.far = 1000.0;
        log::info!("N toggles between per-rock draws and one instanced draw");

        Ok(Self {
            pipeline,
            planet,
            rock,
            instances: InstanceBuffer::with_models(device, &ctx.gpu.queue, &models),
            globals,
            field,
            instanced: true,
        })
    }

    fn update(&mut self, ctx: &mut UpdateContext) {
        if ctx.input.just_pressed(KeyCode::KeyN) {
            self.instanced = !self.instanced;
            log::info!(
                "{}",
                if self.instanced {
                    "One instanced draw per mesh"
                } else {
                    "One draw call per rock"
                }
            );
        }

        let orbit = self.field.camera_orbit(ctx.clock.elapsed());
        ctx.camera
            .set_orbit(Vec3::ZERO, orbit.radius, orbit.height, orbit.angle);

        let aspect = ctx.gpu.aspect_ratio();
        self.globals
            .set_mat4("projection", ctx.camera.projection_matrix(aspect));
        self.globals.set_mat4("view", ctx.camera.view_matrix());
        self.globals.flush(&ctx.gpu.queue);
    }

    fn render(&mut self, ctx: &mut FrameContext) {
        let mut pass = ctx.begin_pass("Instancing", CLEAR_DARK);
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, self.globals.bind_group(), &[]);
        pass.set_vertex_buffer(1, self.instances.slice());

        // slot 0 is the planet, the rocks follow
        self.planet.draw(&mut pass, 1, 0..1);
        let rocks = 1..self.instances.len();
        if self.instanced {
            self.rock.draw(&mut pass, 1, rocks);
        } else {
            for slot in rocks {
                self.rock.draw(&mut pass, 1, slot..slot + 1);
            }
        }
    }

    fn camera_controls(&self) -> bool {
        false
    }
}

fn main() {
    if let Err(err) = render_lessons::run::<Instancing>() {
        eprintln!("{}", err);
    }
}
