use super::vertex::{v, ColorVertex, PointVertex, ScreenVertex, TexturedVertex, Vertex};
use glam::Vec3;
use std::f32::consts::PI;

pub fn triangle() -> Vec<[f32; 3]> {
    vec![[-0.5, -0.5, 0.0], [0.5, -0.5, 0.0], [0.0, 0.5, 0.0]]
}

/// Two triangles next to each other, drawn as separate meshes.
pub fn two_triangles() -> (Vec<[f32; 3]>, Vec<[f32; 3]>) {
    (
        vec![[-0.9, -0.5, 0.0], [0.0, -0.5, 0.0], [-0.45, 0.5, 0.0]],
        vec![[0.0, -0.5, 0.0], [0.9, -0.5, 0.0], [0.45, 0.5, 0.0]],
    )
}

/// Four corners and six indices.
pub fn rectangle() -> (Vec<[f32; 3]>, Vec<u32>) {
    (
        vec![
            [0.5, 0.5, 0.0],
            [0.5, -0.5, 0.0],
            [-0.5, -0.5, 0.0],
            [-0.5, 0.5, 0.0],
        ],
        vec![0, 1, 3, 1, 2, 3],
    )
}

pub fn colored_triangle() -> Vec<ColorVertex> {
    vec![
        ColorVertex {
            pos: [0.5, -0.5, 0.0],
            color: [1.0, 0.0, 0.0],
        },
        ColorVertex {
            pos: [-0.5, -0.5, 0.0],
            color: [0.0, 1.0, 0.0],
        },
        ColorVertex {
            pos: [0.0, 0.5, 0.0],
            color: [0.0, 0.0, 1.0],
        },
    ]
}

pub fn textured_rectangle() -> (Vec<TexturedVertex>, Vec<u32>) {
    let corner = |pos: [f32; 3], color: [f32; 3], uv: [f32; 2]| TexturedVertex { pos, color, uv };
    (
        vec![
            corner([0.5, 0.5, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0]),
            corner([0.5, -0.5, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0]),
            corner([-0.5, -0.5, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
            corner([-0.5, 0.5, 0.0], [1.0, 1.0, 0.0], [0.0, 0.0]),
        ],
        vec![0, 1, 3, 1, 2, 3],
    )
}

/// Unit cube centred on the origin, 36 vertices, counter-clockwise when seen from outside.
pub fn cube() -> Vec<Vertex> {
    // (normal, u, v) with u x v == normal
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut vertices = Vec::with_capacity(36);
    for (normal, u, v_axis) in faces {
        let center = normal * 0.5;
        let corners = [
            (center - u * 0.5 - v_axis * 0.5, [0.0, 1.0]),
            (center + u * 0.5 - v_axis * 0.5, [1.0, 1.0]),
            (center + u * 0.5 + v_axis * 0.5, [1.0, 0.0]),
            (center - u * 0.5 + v_axis * 0.5, [0.0, 0.0]),
        ];
        for i in [0, 1, 2, 0, 2, 3] {
            let (pos, uv) = corners[i];
            vertices.push(v(pos.to_array(), normal.to_array(), uv));
        }
    }
    vertices
}

/// Where the ten containers of the camera lessons sit.
pub fn cube_positions() -> [Vec3; 10] {
    [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(2.0, 5.0, -15.0),
        Vec3::new(-1.5, -2.2, -2.5),
        Vec3::new(-3.8, -2.0, -12.3),
        Vec3::new(2.4, -0.4, -3.5),
        Vec3::new(-1.7, 3.0, -7.5),
        Vec3::new(1.3, -2.0, -2.5),
        Vec3::new(1.5, 2.0, -2.5),
        Vec3::new(1.5, 0.2, -1.5),
        Vec3::new(-1.3, 1.0, -1.5),
    ]
}

/// Floor square at y = -0.5 facing up; `uv_repeat` tiles the texture.
pub fn plane(half_size: f32, uv_repeat: f32) -> Vec<Vertex> {
    let (s, r, y) = (half_size, uv_repeat, -0.5);
    let n = [0.0, 1.0, 0.0];
    vec![
        v([s, y, s], n, [r, 0.0]),
        v([s, y, -s], n, [r, r]),
        v([-s, y, -s], n, [0.0, r]),
        v([s, y, s], n, [r, 0.0]),
        v([-s, y, -s], n, [0.0, r]),
        v([-s, y, s], n, [0.0, 0.0]),
    ]
}

/// Upright unit quad in the xy-plane facing +z, for grass and windows.
pub fn quad() -> Vec<Vertex> {
    let n = [0.0, 0.0, 1.0];
    vec![
        v([-0.5, -0.5, 0.0], n, [0.0, 1.0]),
        v([0.5, -0.5, 0.0], n, [1.0, 1.0]),
        v([0.5, 0.5, 0.0], n, [1.0, 0.0]),
        v([-0.5, -0.5, 0.0], n, [0.0, 1.0]),
        v([0.5, 0.5, 0.0], n, [1.0, 0.0]),
        v([-0.5, 0.5, 0.0], n, [0.0, 0.0]),
    ]
}

/// Full-screen quad in clip space; uv origin is the top-left corner.
pub fn screen_quad() -> Vec<ScreenVertex> {
    let corner = |x: f32, y: f32| ScreenVertex {
        pos: [x, y],
        uv: [(x + 1.0) * 0.5, (1.0 - y) * 0.5],
    };
    vec![
        corner(-1.0, 1.0),
        corner(-1.0, -1.0),
        corner(1.0, -1.0),
        corner(-1.0, 1.0),
        corner(1.0, -1.0),
        corner(1.0, 1.0),
    ]
}

/// Cube of side 2 for sampling a cubemap by direction.
pub fn skybox() -> Vec<[f32; 3]> {
    cube()
        .into_iter()
        .map(|vertex| (Vec3::from(vertex.pos) * 2.0).to_array())
        .collect()
}

pub fn sphere(segments: u32, rings: u32) -> (Vec<Vertex>, Vec<u32>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for ring in 0..=rings {
        let phi = PI * ring as f32 / rings as f32;
        let y = phi.cos();
        let ring_radius = phi.sin();

        for segment in 0..=segments {
            let theta = 2.0 * PI * segment as f32 / segments as f32;
            let x = ring_radius * theta.cos();
            let z = ring_radius * theta.sin();

            let u = segment as f32 / segments as f32;
            let tex_v = ring as f32 / rings as f32;

            vertices.push(v([x, y, z], [x, y, z], [u, tex_v]));
        }
    }

    for ring in 0..rings {
        for segment in 0..segments {
            let current = ring * (segments + 1) + segment;
            let next = current + segments + 1;

            indices.extend_from_slice(&[current, current + 1, next]);
            indices.extend_from_slice(&[current + 1, next + 1, next]);
        }
    }

    (vertices, indices)
}

/// The four points that the geometry lesson turns into houses.
pub fn house_points() -> [PointVertex; 4] {
    [
        PointVertex {
            pos: [-0.5, 0.5],
            color: [1.0, 0.0, 0.0],
        },
        PointVertex {
            pos: [0.5, 0.5],
            color: [0.0, 1.0, 0.0],
        },
        PointVertex {
            pos: [0.5, -0.5],
            color: [0.0, 0.0, 1.0],
        },
        PointVertex {
            pos: [-0.5, -0.5],
            color: [1.0, 1.0, 0.0],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> Vec3 {
        let (a, b, c) = (Vec3::from(a), Vec3::from(b), Vec3::from(c));
        (b - a).cross(c - a)
    }

    #[test]
    fn cube_winding_faces_outward() {
        let cube = cube();
        assert_eq!(cube.len(), 36);
        for tri in cube.chunks_exact(3) {
            let geometric = face_normal(tri[0].pos, tri[1].pos, tri[2].pos);
            assert!(geometric.dot(Vec3::from(tri[0].normal)) > 0.0);
        }
    }

    #[test]
    fn cube_spans_unit_extent() {
        for vertex in cube() {
            for c in vertex.pos {
                assert_eq!(c.abs(), 0.5);
            }
        }
    }

    #[test]
    fn plane_and_quad_face_their_normals() {
        for mesh in [plane(5.0, 2.0), quad()] {
            for tri in mesh.chunks_exact(3) {
                let geometric = face_normal(tri[0].pos, tri[1].pos, tri[2].pos);
                assert!(geometric.dot(Vec3::from(tri[0].normal)) > 0.0);
            }
        }
    }

    #[test]
    fn sphere_winding_faces_outward() {
        let (vertices, indices) = sphere(16, 8);
        for tri in indices.chunks_exact(3) {
            let (a, b, c) = (
                vertices[tri[0] as usize].pos,
                vertices[tri[1] as usize].pos,
                vertices[tri[2] as usize].pos,
            );
            let geometric = face_normal(a, b, c);
            if geometric.length() < 1e-6 {
                continue; // collapsed triangles at the poles
            }
            let centroid = (Vec3::from(a) + Vec3::from(b) + Vec3::from(c)) / 3.0;
            assert!(geometric.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn screen_quad_maps_top_left_to_uv_origin() {
        let quad = screen_quad();
        assert_eq!(quad.len(), 6);
        let top_left = quad.iter().find(|q| q.pos == [-1.0, 1.0]).unwrap();
        assert_eq!(top_left.uv, [0.0, 0.0]);
        let bottom_right = quad.iter().find(|q| q.pos == [1.0, -1.0]).unwrap();
        assert_eq!(bottom_right.uv, [1.0, 1.0]);
    }

    #[test]
    fn rectangle_indices_stay_in_range() {
        let (corners, indices) = rectangle();
        assert!(indices.iter().all(|&i| (i as usize) < corners.len()));
        let (textured, textured_indices) = textured_rectangle();
        assert_eq!(textured.len(), corners.len());
        assert_eq!(textured_indices, indices);
    }
}
