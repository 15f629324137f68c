use glam::{Mat4, Vec3};

const YAW: f32 = -90.0;
const PITCH: f32 = 0.0;
const SPEED: f32 = 2.5;
const SENSITIVITY: f32 = 0.1;
const ZOOM: f32 = 45.0;
const MIN_ZOOM: f32 = 1.0;
const PITCH_LIMIT: f32 = 89.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Euler-angle fly camera. Angles are in degrees; `zoom` is the vertical field of view.
///
/// When `target` is set the camera ignores its own orientation and looks at that
/// point instead, which is how orbiting lessons drive it.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub front: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    pub world_up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    pub zoom: f32,
    pub near: f32,
    pub far: f32,
    pub target: Option<Vec3>,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self::with_angles(position, Vec3::Y, YAW, PITCH)
    }

    pub fn with_angles(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: world_up,
            right: Vec3::X,
            world_up,
            yaw,
            pitch,
            movement_speed: SPEED,
            mouse_sensitivity: SENSITIVITY,
            zoom: ZOOM,
            near: 0.1,
            far: 100.0,
            target: None,
        };
        camera.update_vectors();
        camera
    }

    pub fn view_matrix(&self) -> Mat4 {
        match self.target {
            Some(target) => Mat4::look_at_rh(self.position, target, self.world_up),
            None => Mat4::look_at_rh(self.position, self.position + self.front, self.up),
        }
    }

    /// View matrix with the translation removed, for skyboxes.
    pub fn view_without_translation(&self) -> Mat4 {
        let mut view = self.view_matrix();
        view.w_axis = glam::Vec4::W;
        view
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect.max(1e-6), self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
            CameraMovement::Up => self.position += self.world_up * velocity,
            CameraMovement::Down => self.position -= self.world_up * velocity,
        }
    }

    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32, constrain_pitch: bool) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_vectors();
    }

    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(MIN_ZOOM, ZOOM);
    }

    /// Turns the camera towards `point`, keeping free-look mode.
    pub fn look_at(&mut self, point: Vec3) {
        let direction = (point - self.position).normalize_or_zero();
        if direction == Vec3::ZERO {
            return;
        }
        self.pitch = direction
            .y
            .asin()
            .to_degrees()
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.yaw = direction.z.atan2(direction.x).to_degrees();
        self.update_vectors();
    }

    /// Places the camera on a horizontal circle around `center` and locks it onto the center.
    pub fn set_orbit(&mut self, center: Vec3, radius: f32, height: f32, angle: f32) {
        self.position = center + Vec3::new(angle.sin() * radius, height, angle.cos() * radius);
        self.target = Some(center);
    }

    /// `points` ordered farthest first, the draw order for blended geometry.
    pub fn sort_back_to_front(&self, points: &[Vec3]) -> Vec<Vec3> {
        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| {
            let da = self.position.distance_squared(*a);
            let db = self.position.distance_squared(*b);
            db.total_cmp(&da)
        });
        sorted
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn default_camera_looks_down_negative_z() {
        let camera = Camera::default();
        assert!(camera.front.abs_diff_eq(Vec3::NEG_Z, EPS));
        assert!(camera.right.abs_diff_eq(Vec3::X, EPS));
        assert!(camera.up.abs_diff_eq(Vec3::Y, EPS));
    }

    #[test]
    fn keyboard_moves_by_speed_times_delta() {
        let mut camera = Camera::default();
        camera.process_keyboard(CameraMovement::Forward, 0.5);
        assert!(camera
            .position
            .abs_diff_eq(Vec3::new(0.0, 0.0, 3.0 - SPEED * 0.5), EPS));

        camera.process_keyboard(CameraMovement::Right, 1.0);
        assert!((camera.position.x - SPEED).abs() < EPS);
    }

    #[test]
    fn pitch_is_constrained() {
        let mut camera = Camera::default();
        camera.process_mouse_movement(0.0, 10_000.0, true);
        assert_eq!(camera.pitch, PITCH_LIMIT);

        camera.process_mouse_movement(0.0, -20_000.0, true);
        assert_eq!(camera.pitch, -PITCH_LIMIT);
    }

    #[test]
    fn unconstrained_pitch_is_left_alone() {
        let mut camera = Camera::default();
        camera.process_mouse_movement(0.0, 1_000.0, false);
        assert!((camera.pitch - 100.0).abs() < EPS);
    }

    #[test]
    fn mouse_offsets_are_scaled_by_sensitivity() {
        let mut camera = Camera::default();
        camera.process_mouse_movement(900.0, 0.0, true);
        assert!((camera.yaw - 0.0).abs() < EPS);
        assert!(camera.front.abs_diff_eq(Vec3::X, 1e-4));
    }

    #[test]
    fn scroll_zoom_is_clamped() {
        let mut camera = Camera::default();
        camera.process_mouse_scroll(10.0);
        assert_eq!(camera.zoom, 35.0);
        camera.process_mouse_scroll(100.0);
        assert_eq!(camera.zoom, MIN_ZOOM);
        camera.process_mouse_scroll(-100.0);
        assert_eq!(camera.zoom, ZOOM);
    }

    #[test]
    fn view_matrix_moves_world_opposite_to_camera() {
        let camera = Camera::default();
        let origin_in_view = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(origin_in_view.abs_diff_eq(Vec3::new(0.0, 0.0, -3.0), EPS));
    }

    #[test]
    fn orbit_mode_looks_at_center() {
        let mut camera = Camera::default();
        camera.set_orbit(Vec3::ZERO, 65.0, 30.0, 0.0);
        assert!(camera.position.abs_diff_eq(Vec3::new(0.0, 30.0, 65.0), EPS));

        let center_in_view = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(center_in_view.x.abs() < 1e-3);
        assert!(center_in_view.y.abs() < 1e-3);
        assert!(center_in_view.z < 0.0);
    }

    #[test]
    fn look_at_points_front_towards_target() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.look_at(Vec3::new(5.0, 0.0, 0.0));
        assert!(camera.front.abs_diff_eq(Vec3::X, 1e-4));
        assert!(camera.target.is_none());
    }

    #[test]
    fn skybox_view_has_no_translation() {
        let mut camera = Camera::new(Vec3::new(10.0, -4.0, 2.0));
        camera.process_mouse_movement(120.0, 35.0, true);
        let view = camera.view_without_translation();
        assert!(view.transform_point3(Vec3::ZERO).abs_diff_eq(Vec3::ZERO, EPS));
    }

    #[test]
    fn blended_points_sort_farthest_first() {
        let camera = Camera::default();
        let points = [
            Vec3::new(0.0, 0.0, 0.7),
            Vec3::new(-0.3, 0.0, -2.3),
            Vec3::new(1.5, 0.0, 0.51),
        ];
        let sorted = camera.sort_back_to_front(&points);
        assert_eq!(sorted, vec![points[1], points[2], points[0]]);
    }
}
