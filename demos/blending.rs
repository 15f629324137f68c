//! Transparency two ways. Grass is alpha-tested: fragments below a threshold
//! are discarded. Windows are alpha-blended and drawn farthest first.
//! Tab switches between grass and windows; S toggles the window sorting.

use glam::{Mat4, Vec3};
use render_lessons::renderer::{
    pipeline_layout, primitives, InstanceBuffer, InstanceRaw, Mesh, PipelineBuilder, Shader,
    Texture, TextureOptions, UniformBlock, Vertex,
};
use render_lessons::renderer::uniforms::matrices_layout;
use render_lessons::{FrameContext, Lesson, SetupContext, UpdateContext, CLEAR_DARK};
use winit::keyboard::KeyCode;

const VEGETATION: [Vec3; 5] = [
    Vec3::new(-1.5, 0.0, -0.48),
    Vec3::new(1.5, 0.0, 0.51),
    Vec3::new(0.0, 0.0, 0.7),
    Vec3::new(-0.3, 0.0, -2.3),
    Vec3::new(0.5, 0.0, -0.6),
];

// cubes, floor, then one slot per quad
const FLOOR_SLOT: u32 = 2;
const QUAD_SLOTS: u32 = 3;

struct Blending {
    opaque: wgpu::RenderPipeline,
    cutout: wgpu::RenderPipeline,
    blended: wgpu::RenderPipeline,
    cube: Mesh,
    floor: Mesh,
    quad: Mesh,
    instances: InstanceBuffer,
    globals: UniformBlock,
    marble: wgpu::BindGroup,
    metal: wgpu::BindGroup,
    grass: wgpu::BindGroup,
    window: wgpu::BindGroup,
    show_windows: bool,
    sort_windows: bool,
}

impl Lesson for Blending {
    const TITLE: &'static str = "Blending";

    fn init(ctx: &mut SetupContext) -> Result<Self, String> {
        let (device, queue) = (&ctx.gpu.device, &ctx.gpu.queue);
        let shader = Shader::from_wgsl(device, "textured.wgsl", include_str!("shaders/textured.wgsl"))?;
        let globals = UniformBlock::new(device, "Blending Globals", matrices_layout());

        let material_layout = Texture::bind_group_layout(device, "Blending Material", 1);
        let material = |name: &str, options: TextureOptions| {
            let texture = Texture::from_path_or_fallback(
                device,
                queue,
                ctx.settings.asset(format!("textures/{name}")),
                options,
            );
            Texture::bind_group(device, &material_layout, &[&texture], name)
        };
        let marble = material("marble.jpg", TextureOptions::default());
        let metal = material("metal.png", TextureOptions::default());
        // clamped so the transparent top row does not bleed into the bottom edge
        let grass = material("grass.png", TextureOptions::clamped());
        let window = material("blending_transparent_window.png", TextureOptions::clamped());

        let layout = pipeline_layout(
            device,
            "Blending Layout",
            &[globals.bind_group_layout(), &material_layout],
        );
        let format = ctx.gpu.surface_format();
        let depth_format = ctx.gpu.depth.format;
        let base = |label: &'static str| {
            PipelineBuilder::new(device, &layout, shader.module())
                .with_label(label)
                .with_vertex_buffer(Vertex::layout())
                .with_vertex_buffer(InstanceRaw::layout())
                .with_depth_stencil(depth_format, true, wgpu::CompareFunction::Less)
        };

        let opaque = base("Opaque Pipeline")
            .with_color_target(format, Some(wgpu::BlendState::REPLACE))
            .build();
        let cutout = base("Alpha Test Pipeline")
            .with_fragment_entry("fs_cutout")
            .with_color_target(format, Some(wgpu::BlendState::REPLACE))
            .with_no_culling()
            .build();
        let blended = base("Alpha Blend Pipeline")
            .with_color_target(format, Some(wgpu::BlendState::ALPHA_BLENDING))
            .with_no_culling()
            .build();

        log::info!("Tab: grass/windows, S: toggle back-to-front sorting");

        Ok(Self {
            opaque,
            cutout,
            blended,
            cube: Mesh::new(device, "Cube", &primitives::cube(), None),
            floor: Mesh::new(device, "Floor", &primitives::plane(5.0, 2.0), None),
            quad: Mesh::new(device, "Quad", &primitives::quad(), None),
            instances: InstanceBuffer::new(device, QUAD_SLOTS + VEGETATION.len() as u32),
            globals,
            marble,
            metal,
            grass,
            window,
            show_windows: true,
            sort_windows: true,
        })
    }

    fn update(&mut self, ctx: &mut UpdateContext) {
        if ctx.input.just_pressed(KeyCode::Tab) {
            self.show_windows = !self.show_windows;
        }
        if ctx.input.just_pressed(KeyCode::KeyS) {
            self.sort_windows = !self.sort_windows;
            log::info!("Window sorting {}", if self.sort_windows { "on" } else { "off" });
        }

        let quads = if self.show_windows && self.sort_windows {
            ctx.camera.sort_back_to_front(&VEGETATION)
        } else {
            VEGETATION.to_vec()
        };

        let mut models = vec![
            Mat4::from_translation(Vec3::new(-1.0, 0.0, -1.0)),
            Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)),
            Mat4::IDENTITY,
        ];
        models.extend(quads.into_iter().map(Mat4::from_translation));
        self.instances.write(&ctx.gpu.device, &ctx.gpu.queue, &models);

        let aspect = ctx.gpu.aspect_ratio();
        self.globals
            .set_mat4("projection", ctx.camera.projection_matrix(aspect));
        self.globals.set_mat4("view", ctx.camera.view_matrix());
        self.globals.flush(&ctx.gpu.queue);
    }

    fn render(&mut self, ctx: &mut FrameContext) {
        let mut pass = ctx.begin_pass("Blending", CLEAR_DARK);
        pass.set_bind_group(0, self.globals.bind_group(), &[]);
        pass.set_vertex_buffer(1, self.instances.slice());

        pass.set_pipeline(&self.opaque);
        pass.set_bind_group(1, &self.marble, &[]);
        self.cube.draw(&mut pass, 0..1);
        self.cube.draw(&mut pass, 1..2);
        pass.set_bind_group(1, &self.metal, &[]);
        self.floor.draw(&mut pass, FLOOR_SLOT..FLOOR_SLOT + 1);

        // transparent geometry last, once everything opaque is in the depth buffer
        if self.show_windows {
            pass.set_pipeline(&self.blended);
            pass.set_bind_group(1, &self.window, &[]);
        } else {
            pass.set_pipeline(&self.cutout);
            pass.set_bind_group(1, &self.grass, &[]);
        }
        for slot in QUAD_SLOTS..self.instances.len() {
            self.quad.draw(&mut pass, slot..slot + 1);
        }
    }
}

fn main() {
    if let Err(err) = render_lessons::run::<Blending>() {
        eprintln!("{}", err);
    }
}
