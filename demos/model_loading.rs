//! Loads a model file (OBJ or glTF) given on the command line, defaulting to
//! the nanosuit, and draws it with its diffuse and specular maps.
//!
//! R recompiles `model.wgsl` from disk; a broken edit keeps the old program.
//! E toggles the exploded view, where every face drifts out along its normal.

use std::path::{Path, PathBuf};

use glam::{Mat4, Vec3};
use render_lessons::renderer::{
    pipeline_layout, InstanceBuffer, InstanceRaw, PipelineBuilder, Shader, ShaderStage,
    UniformBlock, UniformLayout, UniformType, Vertex,
};
use render_lessons::scene::{Model, ModelData, TextureCache};
use render_lessons::{FrameContext, GpuContext, Lesson, SetupContext, UpdateContext, CLEAR_DARK};
use winit::keyboard::KeyCode;

const SHADER_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/shaders/model.wgsl");
const EXPLODE_DISTANCE: f32 = 0.6;

struct ModelLoading {
    shader: Shader,
    layout: wgpu::PipelineLayout,
    pipeline: wgpu::RenderPipeline,
    model: Model,
    exploded: Model,
    show_exploded: bool,
    instances: InstanceBuffer,
    globals: UniformBlock,
}

fn build_pipeline(
    gpu: &GpuContext,
    layout: &wgpu::PipelineLayout,
    shader: &Shader,
) -> Result<wgpu::RenderPipeline, String> {
    shader.require_entry(ShaderStage::Vertex, "vs_main")?;
    shader.require_entry(ShaderStage::Fragment, "fs_main")?;
    PipelineBuilder::new(&gpu.device, layout, shader.module())
        .with_label("Model Pipeline")
        .with_vertex_buffer(Vertex::layout())
        .with_vertex_buffer(InstanceRaw::layout())
        .with_color_target(gpu.surface_format(), Some(wgpu::BlendState::ALPHA_BLENDING))
        .with_depth_stencil(gpu.depth.format, true, wgpu::CompareFunction::Less)
        .try_build()
}

/// Uploads the model twice: as authored, and split into loose faces.
fn load_models(
    gpu: &GpuContext,
    path: &Path,
    material_layout: &wgpu::BindGroupLayout,
) -> (Model, Model) {
    match ModelData::load(path) {
        Ok(data) => {
            let mut cache = TextureCache::new(&gpu.device, &gpu.queue);
            let model =
                Model::upload_with_cache(&gpu.device, &gpu.queue, &data, material_layout, &mut cache);
            let exploded = Model::upload_with_cache(
                &gpu.device,
                &gpu.queue,
                &data.exploded(),
                material_layout,
                &mut cache,
            );
            log::info!(
                "{} meshes, {} vertices, {} textures",
                model.meshes.len(),
                data.vertex_count(),
                cache.len()
            );
            (model, exploded)
        }
        Err(err) => {
            log::error!("Model failed to load at path {:?}: {}", path, err);
            (Model::empty(), Model::empty())
        }
    }
}

impl Lesson for ModelLoading {
    const TITLE: &'static str = "Model Loading";

    fn init(ctx: &mut SetupContext) -> Result<Self, String> {
        let device = &ctx.gpu.device;

        let path = std::env::args()
            .nth(1)
            .map(PathBuf::from)
            .unwrap_or_else(|| ctx.settings.asset("models/nanosuit/nanosuit.obj"));

        let shader = Shader::from_path(device, SHADER_PATH)?;

        let globals = UniformBlock::new(
            device,
            "Model Globals",
            UniformLayout::builder()
                .field("projection", UniformType::Mat4)
                .field("view", UniformType::Mat4)
                .field("view_pos", UniformType::Vec3)
                .field("time", UniformType::F32)
                .field("explode", UniformType::F32)
                .field("light_dir", UniformType::Vec3)
                .build(),
        );

        let material_layout = Model::material_layout(device);
        let (model, exploded) = load_models(ctx.gpu, &path, &material_layout);

        let layout = pipeline_layout(
            device,
            "Model Layout",
            &[globals.bind_group_layout(), &material_layout],
        );
        let pipeline = build_pipeline(ctx.gpu, &layout, &shader)?;

        ctx.camera.position = Vec3::new(0.0, 0.0, 3.0);
        log::info!("R reloads the shader, E toggles the exploded view");

        Ok(Self {
            shader,
            layout,
            pipeline,
            model,
            exploded,
            show_exploded: false,
            instances: InstanceBuffer::new(device, 1),
            globals,
        })
    }

    fn update(&mut self, ctx: &mut UpdateContext) {
        if ctx.input.just_pressed(KeyCode::KeyR) {
            let rebuilt = self
                .shader
                .reload(&ctx.gpu.device)
                .and_then(|()| build_pipeline(ctx.gpu, &self.layout, &self.shader));
            match rebuilt {
                Ok(pipeline) => self.pipeline = pipeline,
                Err(err) => log::error!("Shader reload failed, keeping previous pipeline: {}", err),
            }
        }
        if ctx.input.just_pressed(KeyCode::KeyE) {
            self.show_exploded = !self.show_exploded;
        }

        let time = ctx.clock.elapsed();
        let model = model_matrix(time);
        self.instances.write(&ctx.gpu.device, &ctx.gpu.queue, &[model]);

        let aspect = ctx.gpu.aspect_ratio();
        let explode = if self.show_exploded { EXPLODE_DISTANCE } else { 0.0 };
        self.globals
            .set_mat4("projection", ctx.camera.projection_matrix(aspect));
        self.globals.set_mat4("view", ctx.camera.view_matrix());
        self.globals.set_vec3("view_pos", ctx.camera.position);
        self.globals.set_f32("time", time);
        self.globals.set_f32("explode", explode);
        self.globals
            .set_vec3("light_dir", Vec3::new(-0.2, -1.0, -0.3));
        self.globals.flush(&ctx.gpu.queue);
    }

    fn render(&mut self, ctx: &mut FrameContext) {
        let mut pass = ctx.begin_pass("Model Loading", CLEAR_DARK);
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, self.globals.bind_group(), &[]);
        pass.set_vertex_buffer(1, self.instances.slice());

        let model = if self.show_exploded {
            &self.exploded
        } else {
            &self.model
        };
        model.draw(&mut pass, 1, 0..1);
    }
}

/// Turns one radian per second about the vertical axis, lowered and scaled
/// down so the nanosuit fits the default view.
fn model_matrix(time: f32) -> Mat4 {
    Mat4::from_rotation_y(time)
        * Mat4::from_translation(Vec3::new(0.0, -1.75, 0.0))
        * Mat4::from_scale(Vec3::splat(0.2))
}

fn main() {
    if let Err(err) = render_lessons::run::<ModelLoading>() {
        eprintln!("{}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_turns_one_radian_per_second() {
        let tip = |time: f32| model_matrix(time).transform_point3(Vec3::new(0.0, 0.0, 5.0));

        assert!(tip(0.0).abs_diff_eq(Vec3::new(0.0, -1.75, 1.0), 1e-5));
        let angle = tip(1.0).x.atan2(tip(1.0).z);
        assert!((angle - 1.0).abs() < 1e-5, "turned {angle} rad");
        assert!((tip(1.0).y + 1.75).abs() < 1e-5);
    }
}
