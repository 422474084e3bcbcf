//! hexbake topology
//!
//! Axial hexagonal coordinates and the deterministic spiral order that the
//! rest of the workspace builds on.
//!
//! # Spiral order
//!
//! Tiles are numbered by walking rings outward from the origin. Each ring of
//! radius n starts at `n` times direction [`RING_START_DIRECTION`] and walks
//! `n` steps along each facing 0..5. Tile numbers, neighbor list order and
//! the row order of every emitted file all follow from this one walk, so it
//! must never change.
//!
//! # Layout
//!
//! [`Layout`] maps facings to planar unit vectors for flat-topped tiles.
//! Positions are meant to be accumulated step by step alongside the axial
//! walk; [`Layout::axial_to_pixel`] is the closed form used to check them.

mod hex;
mod layout;
mod neighbors;
mod spiral;

pub use hex::{HexCoord, DIRECTION_COUNT};
pub use layout::{Layout, Vec2};
pub use neighbors::{count_present_neighbors, neighbors_within, NeighborRings};
pub use spiral::{
    coord_to_spiral, ring_start, slots_in_ring, spiral_to_coord, total_slots_through, RingStep,
    Spiral, SpiralIndex, SpiralRing, RING_START_DIRECTION,
};

/// Corners per hexagon.
pub const CORNERS_PER_TILE: usize = 6;

// Every corner of a tile faces one neighbor edge.
const _: () = assert!(CORNERS_PER_TILE == DIRECTION_COUNT);
