//! A flashlight: a spot light that follows the camera and fades out between
//! an inner and an outer cone, over the ten containers.

use glam::{Mat4, Quat, Vec3};
use render_lessons::lighting::{spot_light_layout, Attenuation, Phong, SpotLight};
use render_lessons::renderer::{
    pipeline_layout, primitives, InstanceBuffer, InstanceRaw, Mesh, PipelineBuilder, Shader,
    Texture, TextureOptions, UniformBlock, UniformLayout, UniformType, Vertex,
};
use render_lessons::{FrameContext, Lesson, SetupContext, UpdateContext, CLEAR_DARK};

struct LightCasters {
    pipeline: wgpu::RenderPipeline,
    cube: Mesh,
    instances: InstanceBuffer,
    globals: UniformBlock,
    material: wgpu::BindGroup,
}

fn flashlight(position: Vec3, direction: Vec3) -> SpotLight {
    SpotLight {
        position,
        direction,
        cut_off: 12.5,
        outer_cut_off: 17.5,
        color: Phong {
            ambient: Vec3::splat(0.1),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::ONE,
        },
        attenuation: Attenuation::new(1.0, 0.09, 0.032),
    }
}

impl Lesson for LightCasters {
    const TITLE: &'static str = "Light Casters";

    fn init(ctx: &mut SetupContext) -> Result<Self, String> {
        let (device, queue) = (&ctx.gpu.device, &ctx.gpu.queue);
        let shader = Shader::from_wgsl(
            device,
            "light_casters.wgsl",
            include_str!("shaders/light_casters.wgsl"),
        )?;

        let mut globals = UniformBlock::new(
            device,
            "Light Casters Globals",
            UniformLayout::builder()
                .field("projection", UniformType::Mat4)
                .field("view", UniformType::Mat4)
                .field("view_pos", UniformType::Vec3)
                .field("shininess", UniformType::F32)
                .struct_field("light", &spot_light_layout())
                .build(),
        );
        globals.set_f32("shininess", 32.0);

        let diffuse = Texture::from_path_or_fallback(
            device,
            queue,
            ctx.settings.asset("textures/container2.png"),
            TextureOptions::default(),
        );
        let specular = Texture::from_path_or_fallback(
            device,
            queue,
            ctx.settings.asset("textures/container2_specular.png"),
            TextureOptions::default(),
        );
        let material_layout = Texture::bind_group_layout(device, "Light Casters Material", 2);
        let material =
            Texture::bind_group(device, &material_layout, &[&diffuse, &specular], "Container");

        let layout = pipeline_layout(
            device,
            "Light Casters Layout",
            &[globals.bind_group_layout(), &material_layout],
        );
        let pipeline = PipelineBuilder::new(device, &layout, shader.module())
            .with_label("Flashlight Pipeline")
            .with_vertex_buffer(Vertex::layout())
            .with_vertex_buffer(InstanceRaw::layout())
            .with_color_target(ctx.gpu.surface_format(), Some(wgpu::BlendState::REPLACE))
            .with_depth_stencil(ctx.gpu.depth.format, true, wgpu::CompareFunction::Less)
            .build();

        let axis = Vec3::new(1.0, 0.3, 0.5).normalize();
        let models: Vec<Mat4> = primitives::cube_positions()
            .iter()
            .enumerate()
            .map(|(i, position)| {
                let rotation = Quat::from_axis_angle(axis, (20.0 * i as f32).to_radians());
                Mat4::from_rotation_translation(rotation, *position)
            })
            .collect();

        Ok(Self {
            pipeline,
            cube: Mesh::new(device, "Cube", &primitives::cube(), None),
            instances: InstanceBuffer::with_models(device, queue, &models),
            globals,
            material,
        })
    }

    fn update(&mut self, ctx: &mut UpdateContext) {
        let camera = &ctx.camera;
        let aspect = ctx.gpu.aspect_ratio();
        self.globals
            .set_mat4("projection", camera.projection_matrix(aspect));
        self.globals.set_mat4("view", camera.view_matrix());
        self.globals.set_vec3("view_pos", camera.position);
        flashlight(camera.position, camera.front).write(&mut self.globals, "light");
        self.globals.flush(&ctx.gpu.queue);
    }

    fn render(&mut self, ctx: &mut FrameContext) {
        let mut pass = ctx.begin_pass("Light Casters", CLEAR_DARK);
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
    if let Err(err) = render_lessons::run::<LightCasters>() {
        eprintln!("{}", err);
    }
}
