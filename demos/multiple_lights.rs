//! Every light caster at once: a directional sun, four point lamps and the
//! camera flashlight, over the ten containers.

use glam::{Mat4, Quat, Vec3};
use render_lessons::lighting::{
    dir_light_layout, multiple_lights_scene, point_light_layout, spot_light_layout, Attenuation,
    MultipleLights, Phong, SpotLight,
};
use render_lessons::renderer::{
    pipeline_layout, primitives, InstanceBuffer, InstanceRaw, Mesh, PipelineBuilder, Shader,
    Texture, TextureOptions, UniformBlock, UniformLayout, UniformType, Vertex,
};
use render_lessons::{FrameContext, Lesson, SetupContext, UpdateContext, CLEAR_DARK};

struct MultipleLightsLesson {
    lit: wgpu::RenderPipeline,
    lamp: wgpu::RenderPipeline,
    cube: Mesh,
    instances: InstanceBuffer,
    containers: u32,
    globals: UniformBlock,
    material: wgpu::BindGroup,
}

fn scene_models(lights: &MultipleLights) -> Vec<Mat4> {
    let axis = Vec3::new(1.0, 0.3, 0.5).normalize();
    let containers = primitives::cube_positions()
        .into_iter()
        .enumerate()
        .map(|(i, position)| {
            let rotation = Quat::from_axis_angle(axis, (20.0 * i as f32).to_radians());
            Mat4::from_rotation_translation(rotation, position)
        });
    let lamps = lights
        .points
        .iter()
        .map(|lamp| Mat4::from_translation(lamp.position) * Mat4::from_scale(Vec3::splat(0.2)));
    containers.chain(lamps).collect()
}

impl Lesson for MultipleLightsLesson {
    const TITLE: &'static str = "Multiple Lights";

    fn init(ctx: &mut SetupContext) -> Result<Self, String> {
        let (device, queue) = (&ctx.gpu.device, &ctx.gpu.queue);
        let shader = Shader::from_wgsl(
            device,
            "multiple_lights.wgsl",
            include_str!("shaders/multiple_lights.wgsl"),
        )?;

        let lights = multiple_lights_scene();

        let mut globals = UniformBlock::new(
            device,
            "Multiple Lights Globals",
            UniformLayout::builder()
                .field("projection", UniformType::Mat4)
                .field("view", UniformType::Mat4)
                .field("view_pos", UniformType::Vec3)
                .field("shininess", UniformType::F32)
                .struct_field("dir_light", &dir_light_layout())
                .struct_array("point_lights", &point_light_layout(), lights.points.len())
                .struct_field("spot_light", &spot_light_layout())
                .build(),
        );
        globals.set_f32("shininess", 32.0);
        lights.directional.write(&mut globals, "dir_light");
        for (i, lamp) in lights.points.iter().enumerate() {
            lamp.write(&mut globals, &format!("point_lights[{i}]"));
        }

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
        let material_layout = Texture::bind_group_layout(device, "Multiple Lights Material", 2);
        let material =
            Texture::bind_group(device, &material_layout, &[&diffuse, &specular], "Container");

        let layout = pipeline_layout(
            device,
            "Multiple Lights Layout",
            &[globals.bind_group_layout(), &material_layout],
        );
        let format = ctx.gpu.surface_format();
        let depth_format = ctx.gpu.depth.format;
        let build = |label: &'static str, fragment_entry: &'static str| {
            PipelineBuilder::new(device, &layout, shader.module())
                .with_label(label)
                .with_fragment_entry(fragment_entry)
                .with_vertex_buffer(Vertex::layout())
                .with_vertex_buffer(InstanceRaw::layout())
                .with_color_target(format, Some(wgpu::BlendState::REPLACE))
                .with_depth_stencil(depth_format, true, wgpu::CompareFunction::Less)
                .build()
        };

        Ok(Self {
            lit: build("Multiple Lights Pipeline", "fs_main"),
            lamp: build("Lamp Pipeline", "fs_lamp"),
            cube: Mesh::new(device, "Cube", &primitives::cube(), None),
            instances: InstanceBuffer::with_models(device, queue, &scene_models(&lights)),
            containers: primitives::cube_positions().len() as u32,
            globals,
            material,
        })
    }

    fn update(&mut self, ctx: &mut UpdateContext) {
        let camera = &ctx.camera;
        let flashlight = SpotLight {
            position: camera.position,
            direction: camera.front,
            cut_off: 12.5,
            outer_cut_off: 15.0,
            color: Phong {
                ambient: Vec3::ZERO,
                diffuse: Vec3::ONE,
                specular: Vec3::ONE,
            },
            attenuation: Attenuation::new(1.0, 0.09, 0.032),
        };

        let aspect = ctx.gpu.aspect_ratio();
        self.globals
            .set_mat4("projection", camera.projection_matrix(aspect));
        self.globals.set_mat4("view", camera.view_matrix());
        self.globals.set_vec3("view_pos", camera.position);
        flashlight.write(&mut self.globals, "spot_light");
        self.globals.flush(&ctx.gpu.queue);
    }

    fn render(&mut self, ctx: &mut FrameContext) {
        let mut pass = ctx.begin_pass("Multiple Lights", CLEAR_DARK);
        pass.set_bind_group(0, self.globals.bind_group(), &[]);
        pass.set_bind_group(1, &self.material, &[]);
        pass.set_vertex_buffer(1, self.instances.slice());

        pass.set_pipeline(&self.lit);
        for i in 0..self.containers {
            self.cube.draw(&mut pass, i..i + 1);
        }

        pass.set_pipeline(&self.lamp);
        self.cube.draw(&mut pass, self.containers..self.instances.len());
    }
}

fn main() {
    if let Err(err) = render_lessons::run::<MultipleLightsLesson>() {
        eprintln!("{}", err);
    }
}
