//! Distance thresholds for LOD tiers

use crate::core::{Error, Result};

/// Index of a tier inside a [`LodTiers`] list
pub type TierIndex = u8;

/// Maximum number of tiers addressable by a [`TierIndex`]
pub const MAX_TIERS: usize = TierIndex::MAX as usize + 1;

/// One detail level: what to draw and from which distance on
#[derive(Clone, Debug, PartialEq)]
pub struct LodTier<H> {
    /// Geometry/material handle owned by the renderer
    pub handle: H,
    /// Blades farther than this distance prefer this tier
    pub switch_distance: f32,
}

impl<H> LodTier<H> {
    pub fn new(handle: H, switch_distance: f32) -> Self {
        Self { handle, switch_distance }
    }
}

/// Validated, non-empty tier list with strictly ascending switch distances
#[derive(Clone, Debug)]
pub struct LodTiers<H> {
    tiers: Vec<LodTier<H>>,
}

impl<H> LodTiers<H> {
    /// Validate and wrap a tier list.
    ///
    /// Rejects an empty list, more than [`MAX_TIERS`] entries, non-finite or
    /// negative distances, and distances that do not strictly increase.
    pub fn new(tiers: Vec<LodTier<H>>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(Error::EmptyTiers);
        }
        if tiers.len() > MAX_TIERS {
            return Err(Error::TooManyTiers(tiers.len()));
        }

        let mut previous: Option<f32> = None;
        for (index, tier) in tiers.iter().enumerate() {
            let value = tier.switch_distance;
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidDistance { index, value });
            }
            if let Some(previous) = previous {
                if value <= previous {
                    return Err(Error::UnorderedTiers { index, previous, current: value });
                }
            }
            previous = Some(value);
        }

        Ok(Self { tiers })
    }

    /// Number of tiers (always at least one)
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn get(&self, index: TierIndex) -> Option<&LodTier<H>> {
        self.tiers.get(index as usize)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LodTier<H>> {
        self.tiers.iter()
    }

    /// Index of the farthest, lowest-detail tier
    pub fn last_index(&self) -> TierIndex {
        (self.tiers.len() - 1) as TierIndex
    }

    /// Switch distance of the farthest tier; the radius of the culling sphere
    pub fn max_distance(&self) -> f32 {
        self.tiers[self.tiers.len() - 1].switch_distance
    }

    /// Tier for a blade at `distance` from the camera.
    ///
    /// The highest-indexed tier whose switch distance is strictly below
    /// `distance`, or tier 0 when no threshold is exceeded.
    #[inline]
    pub fn classify(&self, distance: f32) -> TierIndex {
        let mut assigned = 0;
        for (index, tier) in self.tiers.iter().enumerate() {
            if tier.switch_distance < distance {
                assigned = index as TierIndex;
            }
        }
        assigned
    }
}

impl LodTiers<usize> {
    /// Tier list whose handles are simply the tier indices.
    ///
    /// Handy for headless tools and tests that only care about counts.
    pub fn from_distances(distances: &[f32]) -> Result<Self> {
        Self::new(
            distances
                .iter()
                .enumerate()
                .map(|(index, &d)| LodTier::new(index, d))
                .collect(),
        )
    }
}

impl<'a, H> IntoIterator for &'a LodTiers<H> {
    type Item = &'a LodTier<H>;
    type IntoIter = std::slice::Iter<'a, LodTier<H>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiers.iter()
    }
}
