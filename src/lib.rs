pub mod app;
pub mod camera;
pub mod input;
pub mod instancing;
pub mod io;
pub mod lighting;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod time;

pub use app::{FrameContext, Lesson, SetupContext, UpdateContext, CLEAR_DARK, CLEAR_TEAL};
pub use camera::{Camera, CameraMovement};
pub use renderer::GpuContext;
pub use settings::LessonSettings;

use winit::event_loop::EventLoop;

pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}

/// Opens a window and drives `L` until the window closes or Escape is pressed.
pub fn run<L: Lesson>() -> Result<(), winit::error::EventLoopError> {
    init_logging();

    log::info!("Starting lesson: {}", L::TITLE);

    let settings = LessonSettings::load();
    let event_loop = EventLoop::new()?;
    let mut app = app::LessonApp::<L>::new(settings);

    let result = event_loop.run_app(&mut app);

    if let Err(ref err) = result {
        log::error!("Application error: {}", err);
    }

    log::info!("Lesson shutdown complete");

    result
}
