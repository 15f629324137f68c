// app.rs
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::*,
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use crate::camera::Camera;
use crate::input::InputState;
use crate::renderer::{Depth, GpuContext};
use crate::settings::LessonSettings;
use crate::time::FrameClock;

/// Background of the early lessons.
pub const CLEAR_TEAL: wgpu::Color = wgpu::Color {
    r: 0.2,
    g: 0.3,
    b: 0.3,
    a: 1.0,
};

/// Background of the lighting and advanced lessons.
pub const CLEAR_DARK: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.1,
    a: 1.0,
};

/// One tutorial program. `init` builds its GPU resources once the window
/// exists; `render` records a frame into the encoder it is handed.
pub trait Lesson: Sized + 'static {
    const TITLE: &'static str;

    fn init(ctx: &mut SetupContext) -> Result<Self, String>;

    fn update(&mut self, _ctx: &mut UpdateContext) {}

    fn render(&mut self, ctx: &mut FrameContext);

    fn resized(&mut self, _gpu: &GpuContext) {}

    /// Whether WASD, mouse and scroll drive the shared camera.
    fn camera_controls(&self) -> bool {
        true
    }
}

pub struct SetupContext<'a> {
    pub gpu: &'a GpuContext,
    pub camera: &'a mut Camera,
    pub settings: &'a LessonSettings,
}

pub struct UpdateContext<'a> {
    pub gpu: &'a GpuContext,
    pub camera: &'a mut Camera,
    pub input: &'a InputState,
    pub clock: &'a FrameClock,
    pub settings: &'a LessonSettings,
}

pub struct FrameContext<'a> {
    pub gpu: &'a GpuContext,
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub view: &'a wgpu::TextureView,
    pub camera: &'a Camera,
    pub clock: &'a FrameClock,
}

impl FrameContext<'_> {
    /// Pass on the window: colour cleared to `clear`, depth to 1, stencil to 0.
    pub fn begin_pass(&mut self, label: &str, clear: wgpu::Color) -> wgpu::RenderPass<'static> {
        let view = self.view;
        let depth = &self.gpu.depth;
        begin(self.encoder, label, view, Some(depth), clear)
    }

    /// Colour-only pass on the window, for pipelines without a depth test.
    pub fn begin_pass_without_depth(
        &mut self,
        label: &str,
        clear: wgpu::Color,
    ) -> wgpu::RenderPass<'static> {
        let view = self.view;
        begin(self.encoder, label, view, None, clear)
    }

    /// Same as `begin_pass` but onto an offscreen target.
    pub fn begin_pass_on(
        &mut self,
        label: &str,
        view: &wgpu::TextureView,
        depth: Option<&Depth>,
        clear: wgpu::Color,
    ) -> wgpu::RenderPass<'static> {
        begin(self.encoder, label, view, depth, clear)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.gpu.aspect_ratio()
    }
}

fn begin(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    view: &wgpu::TextureView,
    depth: Option<&Depth>,
    clear: wgpu::Color,
) -> wgpu::RenderPass<'static> {
    encoder
        .begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: depth.map(Depth::clear_attachment),
            timestamp_writes: None,
            occlusion_query_set: None,
        })
        // the lesson keeps reading the frame context while recording
        .forget_lifetime()
}

pub(crate) struct LessonApp<L: Lesson> {
    settings: LessonSettings,
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    lesson: Option<L>,
    camera: Camera,
    input: InputState,
    clock: FrameClock,
    cursor_captured: bool,
}

impl<L: Lesson> LessonApp<L> {
    pub(crate) fn new(settings: LessonSettings) -> Self {
        Self {
            settings,
            window: None,
            gpu: None,
            lesson: None,
            camera: Camera::default(),
            input: InputState::new(),
            clock: FrameClock::new(),
            cursor_captured: false,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), String> {
        let resolution = self.settings.resolution;
        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title(L::TITLE)
                    .with_inner_size(PhysicalSize::new(resolution.width, resolution.height)),
            )
            .map_err(|err| format!("Failed to create window: {}", err))?;
        let window = Arc::new(window);

        let gpu = pollster::block_on(GpuContext::new(window.clone(), &self.settings))?;

        let lesson = {
            let mut ctx = SetupContext {
                gpu: &gpu,
                camera: &mut self.camera,
                settings: &self.settings,
            };
            L::init(&mut ctx)?
        };

        if self.settings.capture_cursor && lesson.camera_controls() {
            self.cursor_captured = capture_cursor(&window);
        }

        window.request_redraw();
        self.clock = FrameClock::new();
        self.window = Some(window);
        self.gpu = Some(gpu);
        self.lesson = Some(lesson);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(gpu), Some(lesson)) = (self.gpu.as_ref(), self.lesson.as_mut()) else {
            return;
        };

        self.clock.tick();
        if lesson.camera_controls() {
            self.input.apply_to_camera(&mut self.camera, self.clock.delta());
        }

        lesson.update(&mut UpdateContext {
            gpu,
            camera: &mut self.camera,
            input: &self.input,
            clock: &self.clock,
            settings: &self.settings,
        });
        self.input.end_frame();

        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                gpu.reconfigure();
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory, exiting");
                event_loop.exit();
                return;
            }
            Err(err) => {
                log::warn!("Skipping frame: {}", err);
                return;
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(L::TITLE),
            });

        lesson.render(&mut FrameContext {
            gpu,
            encoder: &mut encoder,
            view: &view,
            camera: &self.camera,
            clock: &self.clock,
        });

        gpu.queue.submit(Some(encoder.finish()));
        frame.present();
    }
}

fn capture_cursor(window: &Window) -> bool {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Confined)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
    match grabbed {
        Ok(()) => {
            window.set_cursor_visible(false);
            true
        }
        Err(err) => {
            log::warn!("Cursor capture unavailable, using cursor positions: {}", err);
            false
        }
    }
}

impl<L: Lesson> ApplicationHandler for LessonApp<L> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            log::error!("{} failed to start: {}", L::TITLE, err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map(|w| w.id()) != Some(id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let (Some(gpu), Some(lesson)) = (self.gpu.as_mut(), self.lesson.as_mut()) {
                    gpu.resize(size);
                    lesson.resized(gpu);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape && state == ElementState::Pressed {
                    event_loop.exit();
                    return;
                }
                if !repeat {
                    self.input.key(code, state == ElementState::Pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if !self.cursor_captured {
                    self.input.cursor_moved(position.x, position.y);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / 20.0) as f32,
                };
                self.input.scroll(dy);
            }
            WindowEvent::Focused(false) => {
                self.input.release_all();
                self.input.mouse_look.reset();
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if self.cursor_captured {
                // raw motion grows downwards, pitch grows upwards
                self.input.mouse_motion(dx as f32, -dy as f32);
            }
        }
    }
}
