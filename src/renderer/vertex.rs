use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};
use std::mem;

/// Position, normal and texture coordinate: the vertex used by models and lit geometry.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2
    ];

    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[inline]
pub fn v(pos: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Vertex {
    Vertex { pos, normal, uv }
}

pub const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

/// Layout for bare `[f32; 3]` positions.
pub fn position_layout<'a>() -> wgpu::VertexBufferLayout<'a> {
    wgpu::VertexBufferLayout {
        array_stride: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &POSITION_ATTRS,
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct ColorVertex {
    pub pos: [f32; 3],
    pub color: [f32; 3],
}

impl ColorVertex {
    pub const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3
    ];

    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ColorVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct TexturedVertex {
    pub pos: [f32; 3],
    pub color: [f32; 3],
    pub uv: [f32; 2],
}

impl TexturedVertex {
    pub const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2
    ];

    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<TexturedVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Clip-space position plus uv, for full-screen passes.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct ScreenVertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
}

impl ScreenVertex {
    pub const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32x2
    ];

    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ScreenVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// One coloured 2D point; stepped per instance so the vertex stage can expand it.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct PointVertex {
    pub pos: [f32; 2],
    pub color: [f32; 3],
}

impl PointVertex {
    pub const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32x3
    ];

    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<PointVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

/// Per-instance model matrix (locations 3-6) and normal matrix (locations 7-9).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 3]; 3],
}

impl InstanceRaw {
    pub const ATTRS: [wgpu::VertexAttribute; 7] = wgpu::vertex_attr_array![
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x3,
        8 => Float32x3,
        9 => Float32x3
    ];

    pub fn from_model(model: Mat4) -> Self {
        let normal = Mat3::from_mat4(model).inverse().transpose();
        Self {
            model: model.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
        }
    }

    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    #[test]
    fn vertex_stride_matches_struct_size() {
        assert_eq!(
            Vertex::layout().array_stride,
            std::mem::size_of::<Vertex>() as wgpu::BufferAddress
        );
        assert_eq!(mem::size_of::<Vertex>(), 32);
        assert_eq!(mem::size_of::<ColorVertex>(), 24);
        assert_eq!(mem::size_of::<TexturedVertex>(), 32);
        assert_eq!(mem::size_of::<ScreenVertex>(), 16);
        assert_eq!(mem::size_of::<PointVertex>(), 20);
    }

    #[test]
    fn instance_attributes_do_not_overlap_vertex_attributes() {
        let used: Vec<u32> = Vertex::ATTRS.iter().map(|a| a.shader_location).collect();
        for attr in InstanceRaw::ATTRS.iter() {
            assert!(!used.contains(&attr.shader_location));
        }
        assert_eq!(mem::size_of::<InstanceRaw>(), 64 + 36);
        assert_eq!(
            InstanceRaw::layout().step_mode,
            wgpu::VertexStepMode::Instance
        );
    }

    #[test]
    fn normal_matrix_of_rotation_is_the_rotation() {
        let rotation = Quat::from_axis_angle(Vec3::new(1.0, 0.3, 0.5).normalize(), 0.7);
        let model = Mat4::from_rotation_translation(rotation, Vec3::new(4.0, 5.0, 6.0));
        let raw = InstanceRaw::from_model(model);

        let normal = Mat3::from_cols_array_2d(&raw.normal);
        assert!(normal.abs_diff_eq(Mat3::from_quat(rotation), 1e-5));
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let raw = InstanceRaw::from_model(model);
        let normal = Mat3::from_cols_array_2d(&raw.normal);

        // a 45 degree surface normal stays perpendicular to the stretched surface
        let tangent = Vec3::new(1.0, -1.0, 0.0);
        let surface_normal = Vec3::new(1.0, 1.0, 0.0);
        let stretched_tangent = model.transform_vector3(tangent);
        let stretched_normal = normal * surface_normal;
        assert!(stretched_tangent.dot(stretched_normal).abs() < 1e-5);
    }
}
