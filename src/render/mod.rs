//! GPU-side instance storage for grass tiers

pub mod instance_buffer;

pub use instance_buffer::{GpuInstanceBuffer, GpuSinks, INSTANCE_STRIDE};
