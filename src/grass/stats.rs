//! Per-frame LOD statistics

use crate::lod::InstanceSink;

use super::chunk::GrassChunk;

/// Summary of one group update
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LodStats {
    /// Chunks inside the culling sphere
    pub active_chunks: usize,
    /// Chunks forced to the lowest tier
    pub inactive_chunks: usize,
    /// Visible instances per tier, summed over all chunks
    pub tier_counts: Vec<u64>,
}

impl LodStats {
    pub fn new(tier_count: usize) -> Self {
        Self {
            active_chunks: 0,
            inactive_chunks: 0,
            tier_counts: vec![0; tier_count],
        }
    }

    /// Add one chunk's post-update counts
    pub fn record<H, S: InstanceSink>(&mut self, chunk: &GrassChunk<H, S>) {
        if chunk.is_active() {
            self.active_chunks += 1;
        } else {
            self.inactive_chunks += 1;
        }
        for (total, &count) in self.tier_counts.iter_mut().zip(chunk.visible_counts()) {
            *total += count as u64;
        }
    }

    pub fn total_blades(&self) -> u64 {
        self.tier_counts.iter().sum()
    }

    /// Number of tiers with at least one visible instance
    pub fn non_empty_tiers(&self) -> usize {
        self.tier_counts.iter().filter(|&&c| c > 0).count()
    }
}
