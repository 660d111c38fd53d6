//! wgpu vertex buffer backing one LOD tier of one chunk

use crate::lod::{InstanceBuffer, InstanceSink, SinkFactory, TierIndex};

/// Bytes per instance: one column-major 4x4 f32 matrix
pub const INSTANCE_STRIDE: u64 = std::mem::size_of::<[f32; 16]>() as u64;

/// Byte size of a buffer holding `capacity` instances.
///
/// Never zero so empty chunks still get a valid binding.
pub fn instance_buffer_size(capacity: usize) -> u64 {
    capacity.max(1) as u64 * INSTANCE_STRIDE
}

/// Instance sink mirrored into a GPU vertex buffer.
///
/// Writes land in a CPU staging copy; [`flush`](Self::flush) uploads the
/// visible prefix when the contents changed since the last upload.
pub struct GpuInstanceBuffer {
    staging: InstanceBuffer,
    buffer: wgpu::Buffer,
}

impl GpuInstanceBuffer {
    /// Create a buffer with room for `capacity` instances
    pub fn new(device: &wgpu::Device, tier: TierIndex, capacity: usize) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("grass_instances_tier{}", tier)),
            size: instance_buffer_size(capacity),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            staging: InstanceBuffer::new(capacity),
            buffer,
        }
    }

    /// Vertex buffer to bind at the instance step rate
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn staging(&self) -> &InstanceBuffer {
        &self.staging
    }

    /// Upload the visible instances if dirty. Returns whether a write was queued.
    pub fn flush(&mut self, queue: &wgpu::Queue) -> bool {
        if !self.staging.take_dirty() {
            return false;
        }
        let bytes = self.staging.visible_bytes();
        if bytes.is_empty() {
            return false;
        }
        queue.write_buffer(&self.buffer, 0, bytes);
        true
    }
}

impl InstanceSink for GpuInstanceBuffer {
    fn capacity(&self) -> usize {
        self.staging.capacity()
    }

    #[inline]
    fn set_transform(&mut self, slot: usize, transform: &[f32; 16]) {
        self.staging.set_transform(slot, transform);
    }

    fn set_visible_count(&mut self, count: u32) {
        self.staging.set_visible_count(count);
    }

    fn visible_count(&self) -> u32 {
        self.staging.visible_count()
    }

    fn mark_dirty(&mut self) {
        self.staging.mark_dirty();
    }
}

/// Allocates [`GpuInstanceBuffer`]s on a device
pub struct GpuSinks<'a> {
    device: &'a wgpu::Device,
}

impl<'a> GpuSinks<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }
}

impl SinkFactory for GpuSinks<'_> {
    type Sink = GpuInstanceBuffer;

    fn allocate(&mut self, tier: TierIndex, capacity: usize) -> GpuInstanceBuffer {
        GpuInstanceBuffer::new(self.device, tier, capacity)
    }
}
