//! A wooden container with a steel rim: the diffuse map colours it, the
//! specular map decides where highlights appear. The lamp circles the box.

use glam::{Mat4, Vec3};
use render_lessons::lighting::{point_light_layout, Attenuation, Phong, PointLight};
use render_lessons::renderer::{
    pipeline_layout, primitives, InstanceBuffer, InstanceRaw, Mesh, PipelineBuilder, Shader,
    Texture, TextureOptions, UniformBlock, UniformLayout, UniformType, Vertex,
};
use render_lessons::{FrameContext, Lesson, SetupContext, UpdateContext, CLEAR_DARK};

const ORBIT_RADIUS: f32 = 1.8;

struct LightingMaps {
    lit: wgpu::RenderPipeline,
    lamp: wgpu::RenderPipeline,
    cube: Mesh,
    instances: InstanceBuffer,
    globals: UniformBlock,
    material: wgpu::BindGroup,
}

fn lamp_position(time: f32) -> Vec3 {
    Vec3::new(time.sin() * ORBIT_RADIUS, 1.0, time.cos() * ORBIT_RADIUS)
}

impl Lesson for LightingMaps {
    const TITLE: &'static str = "Lighting Maps";

    fn init(ctx: &mut SetupContext) -> Result<Self, String> {
        let (device, queue) = (&ctx.gpu.device, &ctx.gpu.queue);
        let shader = Shader::from_wgsl(
            device,
            "lighting_maps.wgsl",
            include_str!("shaders/lighting_maps.wgsl"),
        )?;

        let mut globals = UniformBlock::new(
            device,
            "Lighting Maps Globals",
            UniformLayout::builder()
                .field("projection", UniformType::Mat4)
                .field("view", UniformType::Mat4)
                .field("view_pos", UniformType::Vec3)
                .field("shininess", UniformType::F32)
                .struct_field("light", &point_light_layout())
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
        let material_layout = Texture::bind_group_layout(device, "Lighting Maps Material", 2);
        let material =
            Texture::bind_group(device, &material_layout, &[&diffuse, &specular], "Container");

        let layout = pipeline_layout(
            device,
            "Lighting Maps Layout",
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
            lit: build("Lighting Maps Pipeline", "fs_main"),
            lamp: build("Lamp Pipeline", "fs_lamp"),
            cube: Mesh::new(device, "Cube", &primitives::cube(), None),
            instances: InstanceBuffer::new(device, 2),
            globals,
            material,
        })
    }

    fn update(&mut self, ctx: &mut UpdateContext) {
        let light = PointLight {
            position: lamp_position(ctx.clock.elapsed()),
            color: Phong {
                ambient: Vec3::splat(0.2),
                diffuse: Vec3::splat(0.5),
                specular: Vec3::ONE,
            },
            attenuation: Attenuation::new(1.0, 0.0, 0.0),
        };

        let models = [
            Mat4::IDENTITY,
            Mat4::from_translation(light.position) * Mat4::from_scale(Vec3::splat(0.2)),
        ];
        self.instances.write(&ctx.gpu.device, &ctx.gpu.queue, &models);

        let aspect = ctx.gpu.aspect_ratio();
        self.globals
            .set_mat4("projection", ctx.camera.projection_matrix(aspect));
        self.globals.set_mat4("view", ctx.camera.view_matrix());
        self.globals.set_vec3("view_pos", ctx.camera.position);
        light.write(&mut self.globals, "light");
        self.globals.flush(&ctx.gpu.queue);
    }

    fn render(&mut self, ctx: &mut FrameContext) {
        let mut pass = ctx.begin_pass("Lighting Maps", CLEAR_DARK);
        pass.set_bind_group(0, self.globals.bind_group(), &[]);
        pass.set_bind_group(1, &self.material, &[]);
        pass.set_vertex_buffer(1, self.instances.slice());

        pass.set_pipeline(&self.lit);
        self.cube.draw(&mut pass, 0..1);

        pass.set_pipeline(&self.lamp);
        self.cube.draw(&mut pass, 1..2);
    }
}

fn main() {
    if let Err(err) = render_lessons::run::<LightingMaps>() {
        eprintln!("{}", err);
    }
}
