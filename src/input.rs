use bitflags::bitflags;
use glam::Vec2;
use winit::keyboard::KeyCode;

use crate::camera::{Camera, CameraMovement};

bitflags! {
    /// Movement keys currently held down.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct MovementKeys: u8 {
        const FORWARD = 1 << 0;
        const BACKWARD = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const UP = 1 << 4;
        const DOWN = 1 << 5;
    }
}

impl MovementKeys {
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::KeyW => Some(Self::FORWARD),
            KeyCode::KeyS => Some(Self::BACKWARD),
            KeyCode::KeyA => Some(Self::LEFT),
            KeyCode::KeyD => Some(Self::RIGHT),
            KeyCode::Space => Some(Self::UP),
            KeyCode::ShiftLeft => Some(Self::DOWN),
            _ => None,
        }
    }

    fn movements(self) -> impl Iterator<Item = CameraMovement> {
        [
            (Self::FORWARD, CameraMovement::Forward),
            (Self::BACKWARD, CameraMovement::Backward),
            (Self::LEFT, CameraMovement::Left),
            (Self::RIGHT, CameraMovement::Right),
            (Self::UP, CameraMovement::Up),
            (Self::DOWN, CameraMovement::Down),
        ]
        .into_iter()
        .filter(move |(flag, _)| self.contains(*flag))
        .map(|(_, movement)| movement)
    }
}

/// Turns absolute cursor positions into look offsets. The first sample only
/// primes the tracker so the view does not jump when the cursor enters the window.
#[derive(Clone, Copy, Debug, Default)]
pub struct MouseLook {
    last: Option<(f64, f64)>,
}

impl MouseLook {
    pub fn offset(&mut self, x: f64, y: f64) -> Vec2 {
        let offset = match self.last {
            // y is reversed: window coordinates grow downwards
            Some((last_x, last_y)) => Vec2::new((x - last_x) as f32, (last_y - y) as f32),
            None => Vec2::ZERO,
        };
        self.last = Some((x, y));
        offset
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Keyboard, mouse and scroll state gathered between two frames.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    movement: MovementKeys,
    held: Vec<KeyCode>,
    just_pressed: Vec<KeyCode>,
    mouse_delta: Vec2,
    scroll_delta: f32,
    pub mouse_look: MouseLook,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&mut self, key: KeyCode, pressed: bool) {
        if let Some(flag) = MovementKeys::from_key(key) {
            self.movement.set(flag, pressed);
        }

        if pressed {
            if !self.held.contains(&key) {
                self.held.push(key);
                self.just_pressed.push(key);
            }
        } else {
            self.held.retain(|held| *held != key);
        }
    }

    pub fn mouse_motion(&mut self, dx: f32, dy: f32) {
        self.mouse_delta += Vec2::new(dx, dy);
    }

    pub fn cursor_moved(&mut self, x: f64, y: f64) {
        let offset = self.mouse_look.offset(x, y);
        self.mouse_delta += offset;
    }

    pub fn scroll(&mut self, dy: f32) {
        self.scroll_delta += dy;
    }

    pub fn movement(&self) -> MovementKeys {
        self.movement
    }

    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// True only on the frame the key went down; key repeat does not retrigger.
    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    pub fn apply_to_camera(&self, camera: &mut Camera, delta_time: f32) {
        for movement in self.movement.movements() {
            camera.process_keyboard(movement, delta_time);
        }

        if self.mouse_delta != Vec2::ZERO {
            camera.process_mouse_movement(self.mouse_delta.x, self.mouse_delta.y, true);
        }

        if self.scroll_delta != 0.0 {
            camera.process_mouse_scroll(self.scroll_delta);
        }
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }

    /// Drops held keys, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.movement = MovementKeys::empty();
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn first_cursor_sample_yields_no_offset() {
        let mut look = MouseLook::default();
        assert_eq!(look.offset(400.0, 300.0), Vec2::ZERO);
        assert_eq!(look.offset(410.0, 290.0), Vec2::new(10.0, 10.0));
    }

    #[test]
    fn movement_keys_track_press_and_release() {
        let mut input = InputState::new();
        input.key(KeyCode::KeyW, true);
        input.key(KeyCode::KeyD, true);
        assert_eq!(input.movement(), MovementKeys::FORWARD | MovementKeys::RIGHT);

        input.key(KeyCode::KeyW, false);
        assert_eq!(input.movement(), MovementKeys::RIGHT);
    }

    #[test]
    fn just_pressed_lasts_one_frame_and_ignores_repeat() {
        let mut input = InputState::new();
        input.key(KeyCode::KeyR, true);
        assert!(input.just_pressed(KeyCode::KeyR));

        input.end_frame();
        input.key(KeyCode::KeyR, true);
        assert!(!input.just_pressed(KeyCode::KeyR));
        assert!(input.is_held(KeyCode::KeyR));

        input.key(KeyCode::KeyR, false);
        input.key(KeyCode::KeyR, true);
        assert!(input.just_pressed(KeyCode::KeyR));
    }

    #[test]
    fn held_keys_combine_in_one_frame() {
        let mut input = InputState::new();
        input.key(KeyCode::KeyW, true);
        input.key(KeyCode::KeyA, true);

        let mut camera = Camera::default();
        input.apply_to_camera(&mut camera, 1.0);

        assert!(camera
            .position
            .abs_diff_eq(Vec3::new(-2.5, 0.0, 0.5), 1e-4));
    }

    #[test]
    fn deltas_accumulate_until_end_of_frame() {
        let mut input = InputState::new();
        input.mouse_motion(3.0, -1.0);
        input.mouse_motion(2.0, 4.0);
        input.scroll(1.0);
        input.scroll(0.5);

        assert_eq!(input.mouse_delta(), Vec2::new(5.0, 3.0));
        assert_eq!(input.scroll_delta(), 1.5);

        input.end_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        assert_eq!(input.scroll_delta(), 0.0);
    }

    #[test]
    fn release_all_clears_movement() {
        let mut input = InputState::new();
        input.key(KeyCode::Space, true);
        input.release_all();
        assert!(input.movement().is_empty());
        assert!(!input.is_held(KeyCode::Space));
    }
}
