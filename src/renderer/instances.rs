use std::mem;

use glam::Mat4;

use crate::renderer::InstanceRaw;

/// Growable vertex buffer of per-instance transforms.
///
/// Every object drawn in a frame gets its own slot, so a single upload per
/// frame carries all model matrices and each draw picks its slot through the
/// instance range.
pub struct InstanceBuffer {
    buffer: wgpu::Buffer,
    capacity: u32,
    len: u32,
    scratch: Vec<InstanceRaw>,
}

impl InstanceBuffer {
    pub fn new(device: &wgpu::Device, capacity: u32) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Self::create_buffer(device, capacity),
            capacity,
            len: 0,
            scratch: Vec::with_capacity(capacity as usize),
        }
    }

    pub fn with_models(device: &wgpu::Device, queue: &wgpu::Queue, models: &[Mat4]) -> Self {
        let mut buffer = Self::new(device, models.len() as u32);
        buffer.write(device, queue, models);
        buffer
    }

    /// Replaces the contents, growing the buffer when needed.
    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, models: &[Mat4]) {
        self.scratch.clear();
        self.scratch
            .extend(models.iter().copied().map(InstanceRaw::from_model));

        let required = self.scratch.len() as u32;
        if required > self.capacity {
            self.grow(device, required);
        }

        if !self.scratch.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&self.scratch));
        }
        self.len = required;
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn slice(&self) -> wgpu::BufferSlice<'_> {
        self.buffer.slice(..)
    }

    fn grow(&mut self, device: &wgpu::Device, required: u32) {
        let new_capacity = grown_capacity(self.capacity, required);
        log::info!(
            "Growing instance buffer: {} -> {}",
            self.capacity,
            new_capacity
        );
        self.buffer = Self::create_buffer(device, new_capacity);
        self.capacity = new_capacity;
    }

    fn create_buffer(device: &wgpu::Device, capacity: u32) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("InstanceBuffer"),
            size: (capacity as usize * mem::size_of::<InstanceRaw>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }
}

fn grown_capacity(current: u32, required: u32) -> u32 {
    required.max(current * 2).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_at_least_doubles() {
        assert_eq!(grown_capacity(4, 5), 8);
        assert_eq!(grown_capacity(4, 20), 20);
        assert_eq!(grown_capacity(0, 0), 1);
    }
}
