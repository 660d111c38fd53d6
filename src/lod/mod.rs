//! Level of Detail (LOD) tiers and instanced draw sinks
//!
//! A tier pairs an opaque drawable handle with the camera distance beyond
//! which it becomes the preferred representation. Tiers are ordered from
//! nearest (highest detail) to farthest; the last tier doubles as the
//! forced low-detail tier for chunks outside the culling sphere.

pub mod tier;
pub mod sink;

pub use tier::{LodTier, LodTiers, TierIndex, MAX_TIERS};
pub use sink::{InstanceSink, SinkFactory, InstanceBuffer, CpuSinks};
