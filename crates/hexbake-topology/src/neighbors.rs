//! Neighbor rings.
//!
//! The neighbors of a tile are grouped by distance: ring k holds the `6k`
//! coordinates at exactly k steps, in spiral walk order. Rings are pure
//! geometry and may reach outside any finite generated region.

use crate::{HexCoord, SpiralRing};

/// Ordered neighbor rings of one center, radius 1 first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NeighborRings {
    rings: Vec<Vec<HexCoord>>,
}

impl NeighborRings {
    /// Walk every ring from 1 to `range` around `center`.
    pub fn of(center: HexCoord, range: u32) -> Self {
        let rings = (1..=range)
            .map(|radius| SpiralRing::new(center, radius).collect())
            .collect();
        Self { rings }
    }

    /// Ring at `radius` (1-based).
    pub fn ring(&self, radius: u32) -> Option<&[HexCoord]> {
        let slot = (radius as usize).checked_sub(1)?;
        self.rings.get(slot).map(Vec::as_slice)
    }

    /// Number of rings held.
    pub fn range(&self) -> u32 {
        self.rings.len() as u32
    }

    /// Total coordinates across all rings: `3n(n+1)`.
    pub fn len(&self) -> usize {
        self.rings.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &[HexCoord]> {
        self.rings.iter().map(Vec::as_slice)
    }

    pub fn into_inner(self) -> Vec<Vec<HexCoord>> {
        self.rings
    }
}

/// Number of coordinates within `range` of a center, excluding the center.
#[inline]
pub const fn neighbors_within(range: u64) -> u64 {
    3 * range * (range + 1)
}

/// Count how many of the coordinates on ring `radius` around `coord` are
/// present according to `is_present`.
pub fn count_present_neighbors<F>(coord: HexCoord, radius: u32, is_present: F) -> usize
where
    F: Fn(HexCoord) -> bool,
{
    SpiralRing::new(coord, radius)
        .filter(|&n| is_present(n))
        .count()
}
