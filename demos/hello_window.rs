//! An empty window cleared to teal every frame.

use render_lessons::{FrameContext, Lesson, SetupContext, CLEAR_TEAL};

struct HelloWindow;

impl Lesson for HelloWindow {
    const TITLE: &'static str = "Hello Window";

    fn init(_ctx: &mut SetupContext) -> Result<Self, String> {
        Ok(Self)
    }

    fn render(&mut self, ctx: &mut FrameContext) {
        let _pass = ctx.begin_pass_without_depth("Clear", CLEAR_TEAL);
    }

    fn camera_controls(&self) -> bool {
        false
    }
}

fn main() {
    if let Err(err) = render_lessons::run::<HelloWindow>() {
        eprintln!("{}", err);
    }
}
