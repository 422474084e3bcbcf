//! Property tests for ring enumeration and spiral numbering.

use std::collections::HashSet;

use hexbake_topology::{
    coord_to_spiral, ring_start, spiral_to_coord, HexCoord, Layout, NeighborRings, SpiralIndex,
    SpiralRing,
};
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = HexCoord> {
    (-500i32..500, -500i32..500).prop_map(|(q, r)| HexCoord::new(q, r))
}

proptest! {
    #[test]
    fn ring_has_6r_distinct_coords_at_distance_r(center in coord(), radius in 1u32..40) {
        let ring: Vec<_> = SpiralRing::new(center, radius).collect();
        prop_assert_eq!(ring.len(), 6 * radius as usize);

        let unique: HashSet<_> = ring.iter().copied().collect();
        prop_assert_eq!(unique.len(), ring.len());

        for c in &ring {
            prop_assert_eq!(c.hex_distance(&center), radius);
        }
    }

    #[test]
    fn consecutive_ring_coords_are_adjacent(center in coord(), radius in 1u32..30) {
        let ring: Vec<_> = SpiralRing::new(center, radius).collect();
        for pair in ring.windows(2) {
            prop_assert_eq!(pair[0].hex_distance(&pair[1]), 1);
        }
        // The walk closes back on its start.
        prop_assert_eq!(ring[ring.len() - 1].hex_distance(&ring[0]), 1);
    }

    #[test]
    fn ring_is_translation_invariant(center in coord(), radius in 1u32..20) {
        let around_origin: Vec<_> = SpiralRing::new(HexCoord::ORIGIN, radius).collect();
        let around_center: Vec<_> = SpiralRing::new(center, radius).map(|c| c - center).collect();
        prop_assert_eq!(around_origin, around_center);
    }

    #[test]
    fn neighbor_rings_have_6k_entries(center in coord(), range in 0u32..12) {
        let rings = NeighborRings::of(center, range);
        prop_assert_eq!(rings.range(), range);
        for k in 1..=range {
            prop_assert_eq!(rings.ring(k).map(<[_]>::len), Some(6 * k as usize));
        }
    }

    #[test]
    fn spiral_index_roundtrip(index in 0u64..200_000) {
        let coord = spiral_to_coord(SpiralIndex(index));
        prop_assert_eq!(coord_to_spiral(coord), Some(SpiralIndex(index)));
    }

    #[test]
    fn accumulated_walk_matches_closed_form(radius in 1u32..60, size in 1.0f64..2000.0) {
        let layout = Layout::new(size);
        let mut ring = SpiralRing::new(HexCoord::ORIGIN, radius);
        let mut position = layout.axial_to_pixel(ring_start(HexCoord::ORIGIN, radius));
        let tolerance = size * 1e-9 * f64::from(radius) * 6.0;

        while let Some(step) = ring.next_step() {
            let expected = layout.axial_to_pixel(step.coord);
            prop_assert!(position.distance(&expected) <= tolerance.max(1e-6));
            position += layout.step(step.facing);
        }
    }
}
