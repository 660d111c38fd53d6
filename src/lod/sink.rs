//! Per-tier instance buffers written by the compaction pass

use super::tier::TierIndex;

/// Renderer-facing instance storage for one tier of one chunk.
///
/// The chunk is the only writer: every frame it rewrites slots
/// `0..visible_count` with the transforms of the blades currently assigned
/// to the tier, then publishes the count and marks the sink dirty.
pub trait InstanceSink {
    /// Number of instance slots allocated
    fn capacity(&self) -> usize;

    /// Write a column-major 4x4 transform into `slot`.
    ///
    /// `slot` must be below [`capacity`](Self::capacity).
    fn set_transform(&mut self, slot: usize, transform: &[f32; 16]);

    /// Number of leading slots the renderer should draw
    fn set_visible_count(&mut self, count: u32);

    fn visible_count(&self) -> u32;

    /// Flag the contents for upload before the next draw
    fn mark_dirty(&mut self);
}

/// Allocates one sink per tier when a chunk is built.
pub trait SinkFactory {
    type Sink: InstanceSink;

    fn allocate(&mut self, tier: TierIndex, capacity: usize) -> Self::Sink;
}

/// CPU-side instance buffer.
///
/// Keeps the transforms in a contiguous `[f32; 16]` array so the visible
/// prefix can be handed to a GPU upload as raw bytes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstanceBuffer {
    transforms: Vec<[f32; 16]>,
    visible_count: u32,
    dirty: bool,
}

impl InstanceBuffer {
    /// Allocate `capacity` identity-initialised slots
    pub fn new(capacity: usize) -> Self {
        Self {
            transforms: vec![glam::Mat4::IDENTITY.to_cols_array(); capacity],
            visible_count: 0,
            dirty: false,
        }
    }

    /// All slots, including stale ones past the visible count
    pub fn transforms(&self) -> &[[f32; 16]] {
        &self.transforms
    }

    /// Slots `0..visible_count`
    pub fn visible_transforms(&self) -> &[[f32; 16]] {
        &self.transforms[..self.visible_count as usize]
    }

    /// Visible slots as bytes, ready for a buffer upload
    pub fn visible_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.visible_transforms())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag, returning whether it was set.
    ///
    /// Uploaders call this once they have consumed the contents.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

impl InstanceSink for InstanceBuffer {
    fn capacity(&self) -> usize {
        self.transforms.len()
    }

    #[inline]
    fn set_transform(&mut self, slot: usize, transform: &[f32; 16]) {
        self.transforms[slot] = *transform;
    }

    fn set_visible_count(&mut self, count: u32) {
        debug_assert!(count as usize <= self.transforms.len());
        self.visible_count = count;
    }

    fn visible_count(&self) -> u32 {
        self.visible_count
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

/// Factory producing [`InstanceBuffer`]s
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuSinks;

impl SinkFactory for CpuSinks {
    type Sink = InstanceBuffer;

    fn allocate(&mut self, _tier: TierIndex, capacity: usize) -> InstanceBuffer {
        InstanceBuffer::new(capacity)
    }
}
