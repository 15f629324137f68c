//! Checks the camera and depth math the lesson shaders rely on.
//!
//! Conventions:
//! - Right-handed view space, the camera looks down -Z.
//! - Clip/NDC depth range is [0, 1]. Near -> 0, far -> 1.
//! - Screen-quad uvs have their origin at the top-left corner.

use glam::{Mat4, Vec2, Vec3, Vec4};
use render_lessons::renderer::primitives;
use render_lessons::Camera;

// same formula as `linearize_depth` in depth_testing.wgsl
fn linearize_depth(depth: f32, near: f32, far: f32) -> f32 {
    near * far / (far - depth * (far - near))
}

fn project(clip_from_world: Mat4, point: Vec3) -> Vec3 {
    let clip: Vec4 = clip_from_world * point.extend(1.0);
    clip.truncate() / clip.w
}

fn ndc_to_uv(ndc: Vec2) -> Vec2 {
    Vec2::new(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5)
}

#[test]
fn point_in_front_of_the_camera_lands_at_screen_center() {
    let camera = Camera::default();
    let ndc = project(camera.view_projection(16.0 / 9.0), Vec3::new(0.0, 0.0, -5.0));
    assert!(ndc.truncate().abs().max_element() < 1e-5, "{ndc:?}");
    assert!(ndc.z > 0.0 && ndc.z < 1.0, "depth {}", ndc.z);
}

#[test]
fn near_and_far_planes_map_to_depth_range() {
    let camera = Camera::new(Vec3::ZERO);
    let clip_from_world = camera.view_projection(1.0);

    let near = project(clip_from_world, Vec3::new(0.0, 0.0, -camera.near));
    let far = project(clip_from_world, Vec3::new(0.0, 0.0, -camera.far));

    assert!(near.z.abs() < 1e-5, "near -> {}", near.z);
    assert!((far.z - 1.0).abs() < 1e-4, "far -> {}", far.z);
}

#[test]
fn linearized_depth_recovers_view_distance() {
    let camera = Camera::new(Vec3::ZERO);
    let clip_from_world = camera.view_projection(4.0 / 3.0);

    for distance in [0.5_f32, 1.0, 7.5, 42.0, 99.0] {
        let depth = project(clip_from_world, Vec3::new(0.0, 0.0, -distance)).z;
        let linear = linearize_depth(depth, camera.near, camera.far);
        assert!(
            (linear - distance).abs() < distance * 1e-3,
            "distance {distance} -> depth {depth} -> {linear}"
        );
    }
}

#[test]
fn screen_quad_uvs_match_the_ndc_flip() {
    for vertex in primitives::screen_quad() {
        let expected = ndc_to_uv(Vec2::from(vertex.pos));
        assert!(
            (Vec2::from(vertex.uv) - expected).abs().max_element() < 1e-6,
            "{:?}",
            vertex.pos
        );
    }

    let top_left = primitives::screen_quad()[0];
    assert_eq!(top_left.pos, [-1.0, 1.0]);
    assert_eq!(top_left.uv, [0.0, 0.0]);
}

#[test]
fn skybox_view_ignores_camera_position() {
    let mut camera = Camera::default();
    let before = camera.view_without_translation();
    camera.position += Vec3::new(10.0, -3.0, 25.0);
    let after = camera.view_without_translation();

    assert!(before.abs_diff_eq(after, 1e-6));
    assert_eq!(after.w_axis, Vec4::W);
    // the full view matrix does move
    assert!(!camera.view_matrix().abs_diff_eq(after, 1e-3));
}

#[test]
fn zoom_narrows_the_field_of_view() {
    let mut camera = Camera::new(Vec3::ZERO);
    let point = Vec3::new(1.0, 0.0, -5.0);
    let wide = project(camera.view_projection(1.0), point).x;

    camera.process_mouse_scroll(30.0);
    let narrow = project(camera.view_projection(1.0), point).x;

    assert!(narrow > wide, "zoomed x {narrow} should exceed {wide}");
}
