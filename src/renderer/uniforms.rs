// renderer/uniforms.rs
//
// Uniform blocks addressed by member name. Offsets follow the WGSL rules for the
// uniform address space, so a block built here lines up byte for byte with the
// matching `var<uniform>` struct in a shader.

use std::collections::{HashMap, HashSet};
use std::ops::{Deref, DerefMut};

use glam::{Mat4, Vec2, Vec3, Vec4};
use wgpu::util::DeviceExt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformType {
    I32,
    U32,
    F32,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
}

impl UniformType {
    pub const fn align(self) -> u64 {
        match self {
            UniformType::I32 | UniformType::U32 | UniformType::F32 => 4,
            UniformType::Vec2 => 8,
            UniformType::Vec3 | UniformType::Vec4 | UniformType::Mat4 => 16,
        }
    }

    pub const fn size(self) -> u64 {
        match self {
            UniformType::I32 | UniformType::U32 | UniformType::F32 => 4,
            UniformType::Vec2 => 8,
            UniformType::Vec3 => 12,
            UniformType::Vec4 => 16,
            UniformType::Mat4 => 64,
        }
    }
}

const fn round_up(value: u64, align: u64) -> u64 {
    value.div_ceil(align) * align
}

#[derive(Clone, Debug, PartialEq)]
pub struct UniformField {
    pub name: String,
    pub offset: u64,
    pub ty: UniformType,
}

#[derive(Clone, Debug)]
pub struct UniformLayout {
    fields: Vec<UniformField>,
    index: HashMap<String, usize>,
    size: u64,
    align: u64,
}

impl UniformLayout {
    pub fn builder() -> UniformLayoutBuilder {
        UniformLayoutBuilder {
            fields: Vec::new(),
            offset: 0,
            align: 4,
        }
    }

    pub fn field(&self, name: &str) -> Option<&UniformField> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn fields(&self) -> &[UniformField] {
        &self.fields
    }

    /// Byte size, rounded up to 16 so the layout can be nested or bound directly.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn align(&self) -> u64 {
        self.align
    }
}

pub struct UniformLayoutBuilder {
    fields: Vec<UniformField>,
    offset: u64,
    align: u64,
}

impl UniformLayoutBuilder {
    pub fn field(mut self, name: &str, ty: UniformType) -> Self {
        let offset = round_up(self.offset, ty.align());
        self.push(name.to_string(), offset, ty);
        self.offset = offset + ty.size();
        self.align = self.align.max(ty.align());
        self
    }

    /// `array<T, len>`; elements are addressed as `name[i]`.
    pub fn array(mut self, name: &str, ty: UniformType, len: usize) -> Self {
        let stride = round_up(round_up(ty.size(), ty.align()), 16);
        let start = round_up(self.offset, 16);
        for i in 0..len {
            self.push(format!("{name}[{i}]"), start + i as u64 * stride, ty);
        }
        self.offset = start + len as u64 * stride;
        self.align = self.align.max(16);
        self
    }

    /// A nested struct; members are addressed as `name.member`.
    pub fn struct_field(mut self, name: &str, layout: &UniformLayout) -> Self {
        let start = round_up(self.offset, round_up(layout.align, 16));
        self.push_struct(name, start, layout);
        self.offset = start + layout.size;
        self.align = self.align.max(16);
        self
    }

    /// `array<S, len>`; members are addressed as `name[i].member`.
    pub fn struct_array(mut self, name: &str, layout: &UniformLayout, len: usize) -> Self {
        let stride = round_up(layout.size, 16);
        let start = round_up(self.offset, 16);
        for i in 0..len {
            self.push_struct(&format!("{name}[{i}]"), start + i as u64 * stride, layout);
        }
        self.offset = start + len as u64 * stride;
        self.align = self.align.max(16);
        self
    }

    pub fn build(self) -> UniformLayout {
        let index = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, field)| (field.name.clone(), i))
            .collect();

        UniformLayout {
            fields: self.fields,
            index,
            size: round_up(self.offset.max(1), self.align.max(16)),
            align: self.align,
        }
    }

    fn push_struct(&mut self, prefix: &str, start: u64, layout: &UniformLayout) {
        for member in &layout.fields {
            self.push(
                format!("{prefix}.{}", member.name),
                start + member.offset,
                member.ty,
            );
        }
    }

    fn push(&mut self, name: String, offset: u64, ty: UniformType) {
        self.fields.push(UniformField { name, offset, ty });
    }
}

/// CPU copy of a uniform block. Setters address members by name; a name the
/// layout does not know, or a value of the wrong type, is reported once and ignored.
#[derive(Clone, Debug)]
pub struct UniformData {
    layout: UniformLayout,
    bytes: Vec<u8>,
    dirty: bool,
    warned: HashSet<String>,
}

impl UniformData {
    pub fn new(layout: UniformLayout) -> Self {
        let bytes = vec![0; layout.size() as usize];
        Self {
            layout,
            bytes,
            dirty: true,
            warned: HashSet::new(),
        }
    }

    pub fn set_i32(&mut self, name: &str, value: i32) {
        self.write(name, UniformType::I32, bytemuck::bytes_of(&value));
    }

    pub fn set_u32(&mut self, name: &str, value: u32) {
        self.write(name, UniformType::U32, bytemuck::bytes_of(&value));
    }

    pub fn set_f32(&mut self, name: &str, value: f32) {
        self.write(name, UniformType::F32, bytemuck::bytes_of(&value));
    }

    pub fn set_vec2(&mut self, name: &str, value: Vec2) {
        self.write(name, UniformType::Vec2, bytemuck::bytes_of(&value.to_array()));
    }

    pub fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.write(name, UniformType::Vec3, bytemuck::bytes_of(&value.to_array()));
    }

    pub fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.write(name, UniformType::Vec4, bytemuck::bytes_of(&value.to_array()));
    }

    pub fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.write(
            name,
            UniformType::Mat4,
            bytemuck::bytes_of(&value.to_cols_array()),
        );
    }

    pub fn get_f32(&self, name: &str) -> Option<f32> {
        let field = self.layout.field(name)?;
        let start = field.offset as usize;
        Some(bytemuck::pod_read_unaligned(&self.bytes[start..start + 4]))
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether the data changed since the last call and clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    fn write(&mut self, name: &str, ty: UniformType, data: &[u8]) {
        let target = match self.layout.field(name) {
            Some(field) if field.ty == ty => Ok(field.offset as usize),
            Some(field) => Err(format!(
                "Uniform '{}' is {:?}, cannot assign {:?}",
                name, field.ty, ty
            )),
            None => Err(format!("No uniform named '{}'", name)),
        };

        match target {
            Ok(offset) => {
                let slot = &mut self.bytes[offset..offset + data.len()];
                if *slot != *data {
                    slot.copy_from_slice(data);
                    self.dirty = true;
                }
            }
            Err(message) => {
                if self.warned.insert(name.to_string()) {
                    log::warn!("{}", message);
                }
            }
        }
    }
}

/// A uniform buffer with its own bind group (binding 0, vertex and fragment stages).
pub struct UniformBlock {
    data: UniformData,
    buffer: wgpu::Buffer,
    bind_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl UniformBlock {
    pub fn new(device: &wgpu::Device, label: &str, layout: UniformLayout) -> Self {
        let mut data = UniformData::new(layout);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: data.bytes(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        data.take_dirty();

        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &bind_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            data,
            buffer,
            bind_layout,
            bind_group,
        }
    }

    /// Uploads the CPU copy if any setter changed it since the last flush.
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        if self.data.take_dirty() {
            queue.write_buffer(&self.buffer, 0, self.data.bytes());
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

impl Deref for UniformBlock {
    type Target = UniformData;

    fn deref(&self) -> &UniformData {
        &self.data
    }
}

impl DerefMut for UniformBlock {
    fn deref_mut(&mut self) -> &mut UniformData {
        &mut self.data
    }
}

/// `struct Matrices { projection: mat4x4<f32>, view: mat4x4<f32> }`, shared by
/// every pipeline that binds it.
pub fn matrices_layout() -> UniformLayout {
    UniformLayout::builder()
        .field("projection", UniformType::Mat4)
        .field("view", UniformType::Mat4)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset(layout: &UniformLayout, name: &str) -> u64 {
        layout.field(name).map(|f| f.offset).unwrap()
    }

    #[test]
    fn scalars_pack_after_vec3() {
        let layout = UniformLayout::builder()
            .field("a", UniformType::F32)
            .field("b", UniformType::Vec3)
            .field("c", UniformType::F32)
            .build();

        assert_eq!(offset(&layout, "a"), 0);
        assert_eq!(offset(&layout, "b"), 16);
        assert_eq!(offset(&layout, "c"), 28);
        assert_eq!(layout.size(), 32);
    }

    #[test]
    fn matrices_block_is_two_mat4() {
        let layout = matrices_layout();
        assert_eq!(offset(&layout, "projection"), 0);
        assert_eq!(offset(&layout, "view"), 64);
        assert_eq!(layout.size(), 128);
    }

    #[test]
    fn scalar_arrays_use_sixteen_byte_stride() {
        let layout = UniformLayout::builder()
            .field("count", UniformType::U32)
            .array("offsets", UniformType::Vec2, 3)
            .build();

        assert_eq!(offset(&layout, "offsets[0]"), 16);
        assert_eq!(offset(&layout, "offsets[1]"), 32);
        assert_eq!(offset(&layout, "offsets[2]"), 48);
        assert_eq!(layout.size(), 64);
    }

    #[test]
    fn struct_arrays_flatten_member_names() {
        let light = UniformLayout::builder()
            .field("position", UniformType::Vec3)
            .field("constant_term", UniformType::F32)
            .field("diffuse", UniformType::Vec3)
            .build();
        assert_eq!(light.size(), 32);

        let layout = UniformLayout::builder()
            .field("view_pos", UniformType::Vec3)
            .struct_array("lights", &light, 2)
            .field("shininess", UniformType::F32)
            .build();

        assert_eq!(offset(&layout, "lights[0].position"), 16);
        assert_eq!(offset(&layout, "lights[0].constant_term"), 28);
        assert_eq!(offset(&layout, "lights[1].position"), 48);
        assert_eq!(offset(&layout, "lights[1].diffuse"), 64);
        assert_eq!(offset(&layout, "shininess"), 80);
        assert_eq!(layout.size(), 96);
    }

    #[test]
    fn nested_struct_starts_on_sixteen_bytes() {
        let material = UniformLayout::builder()
            .field("shininess", UniformType::F32)
            .build();

        let layout = UniformLayout::builder()
            .field("time", UniformType::F32)
            .struct_field("material", &material)
            .field("mix", UniformType::F32)
            .build();

        assert_eq!(offset(&layout, "material.shininess"), 16);
        assert_eq!(offset(&layout, "mix"), 32);
    }

    #[test]
    fn setters_write_at_field_offsets() {
        let layout = UniformLayout::builder()
            .field("tint", UniformType::Vec3)
            .field("strength", UniformType::F32)
            .field("model", UniformType::Mat4)
            .build();
        let mut data = UniformData::new(layout);
        data.take_dirty();

        data.set_vec3("tint", Vec3::new(1.0, 0.5, 0.25));
        data.set_f32("strength", 2.0);
        data.set_mat4("model", Mat4::from_translation(Vec3::new(7.0, 8.0, 9.0)));

        let floats: Vec<f32> = data
            .bytes()
            .chunks_exact(4)
            .map(bytemuck::pod_read_unaligned)
            .collect();
        assert_eq!(&floats[0..4], &[1.0, 0.5, 0.25, 2.0]);
        assert_eq!(&floats[28..32], &[7.0, 8.0, 9.0, 1.0]);
        assert!(data.is_dirty());
    }

    #[test]
    fn unknown_names_and_type_mismatches_are_ignored() {
        let layout = UniformLayout::builder()
            .field("mix", UniformType::F32)
            .build();
        let mut data = UniformData::new(layout);
        data.take_dirty();

        data.set_f32("missing", 1.0);
        data.set_vec3("mix", Vec3::ONE);
        data.set_i32("mix", 3);

        assert!(!data.is_dirty());
        assert_eq!(data.get_f32("mix"), Some(0.0));
    }

    #[test]
    fn writing_the_same_value_keeps_block_clean() {
        let layout = UniformLayout::builder()
            .field("mix", UniformType::F32)
            .build();
        let mut data = UniformData::new(layout);
        data.set_f32("mix", 0.4);
        assert!(data.take_dirty());

        data.set_f32("mix", 0.4);
        assert!(!data.take_dirty());
        assert_eq!(data.get_f32("mix"), Some(0.4));
    }
}
