//! Spiral ring enumeration.
//!
//! Every ring walk starts `radius` steps out along [`RING_START_DIRECTION`]
//! and then takes `radius` steps along each of the six facings in index
//! order. Concatenating rings 0, 1, 2, ... gives the spiral: the slot a
//! coordinate occupies in that sequence is its [`SpiralIndex`], which is also
//! the tile number assigned during generation.
//!
//! ```text
//!            (0,-1) (1,-1)
//!        (-1,0)  (0,0)  (1,0)
//!            (-1,1) (0,1)
//! ```
//!
//! Ring 1 around the origin is emitted as
//! `(-1,1) (0,1) (1,0) (1,-1) (0,-1) (-1,0)`.

use std::iter::FusedIterator;

use crate::hex::DIRECTION_COUNT;
use crate::HexCoord;

/// Facing whose scaled vector locates the first coordinate of every ring.
pub const RING_START_DIRECTION: usize = 4;

/// Slot of a coordinate in the spiral. Tile `i` of a bake sits at slot `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpiralIndex(pub u64);

impl SpiralIndex {
    pub const ORIGIN: Self = Self(0);

    #[inline]
    pub const fn new(index: u64) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Ring holding this slot: the smallest `n` with
    /// `total_slots_through(n) > self`.
    pub fn ring(&self) -> u64 {
        // sqrt(i / 3) lands on n or n - 1; back off one more for float error.
        let estimate = (self.0 as f64 / 3.0).sqrt() as u64;
        let mut ring = estimate.saturating_sub(1);
        while total_slots_through(ring) <= self.0 {
            ring += 1;
        }
        ring
    }

    /// Offset within the ring, `0..6n`; 0 for the origin.
    pub fn offset_in_ring(&self) -> u64 {
        self.ring()
            .checked_sub(1)
            .map_or(0, |inner| self.0 - total_slots_through(inner))
    }
}

impl From<u64> for SpiralIndex {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<SpiralIndex> for u64 {
    fn from(index: SpiralIndex) -> Self {
        index.0
    }
}

/// `6n` slots on ring `n`; the origin ring has one.
#[inline]
pub const fn slots_in_ring(ring: u64) -> u64 {
    if ring == 0 {
        1
    } else {
        6 * ring
    }
}

/// Slots on rings `0..=ring`: `1 + 3n(n+1)`.
#[inline]
pub const fn total_slots_through(ring: u64) -> u64 {
    1 + 3 * ring * (ring + 1)
}

/// One coordinate emitted by a ring walk, with the facing the walk was
/// heading when it emitted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingStep {
    pub coord: HexCoord,
    pub facing: usize,
}

/// Lazy walk over the `6 * radius` coordinates at exact distance `radius`
/// from `center`.
///
/// The walk is a plain value: copy it to checkpoint, call [`restart`] to
/// replay from the first coordinate. A radius of 0 yields nothing.
///
/// [`restart`]: SpiralRing::restart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiralRing {
    center: HexCoord,
    radius: u32,
    current: HexCoord,
    facing: usize,
    step: u32,
}

impl SpiralRing {
    pub fn new(center: HexCoord, radius: u32) -> Self {
        Self {
            center,
            radius,
            current: ring_start(center, radius),
            facing: 0,
            step: 0,
        }
    }

    pub fn center(&self) -> HexCoord {
        self.center
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Facing of the next coordinate to be emitted.
    pub fn facing(&self) -> usize {
        self.facing
    }

    /// Steps already taken along the current facing.
    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn is_finished(&self) -> bool {
        self.radius == 0 || self.facing >= DIRECTION_COUNT
    }

    /// Rewind to the first coordinate of the ring.
    pub fn restart(&mut self) {
        *self = Self::new(self.center, self.radius);
    }

    /// Emit the current coordinate and advance one step along the ring.
    pub fn next_step(&mut self) -> Option<RingStep> {
        if self.is_finished() {
            return None;
        }

        let emitted = RingStep {
            coord: self.current,
            facing: self.facing,
        };

        self.current = self.current.neighbor(self.facing);
        self.step += 1;
        if self.step == self.radius {
            self.step = 0;
            self.facing += 1;
        }

        Some(emitted)
    }

    fn remaining(&self) -> usize {
        if self.is_finished() {
            return 0;
        }
        let r = self.radius as usize;
        DIRECTION_COUNT * r - (self.facing * r + self.step as usize)
    }
}

impl Iterator for SpiralRing {
    type Item = HexCoord;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_step().map(|s| s.coord)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SpiralRing {}

impl FusedIterator for SpiralRing {}

/// First coordinate of the ring at `radius` around `center`.
#[inline]
pub fn ring_start(center: HexCoord, radius: u32) -> HexCoord {
    center + HexCoord::direction(RING_START_DIRECTION).scale(radius as i32)
}

/// Coordinates in spiral order: the origin, then every ring walk in turn.
///
/// Unbounded unless built with [`take_slots`](Self::take_slots) or
/// [`rings`](Self::rings).
#[derive(Debug, Clone, Default)]
pub struct Spiral {
    next: u64,
    end: Option<u64>,
}

impl Spiral {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first `count` slots.
    pub fn take_slots(count: u64) -> Self {
        Self {
            next: 0,
            end: Some(count),
        }
    }

    /// Slots of rings `first..=last`.
    pub fn rings(first: u64, last: u64) -> Self {
        Self {
            next: first.checked_sub(1).map_or(0, total_slots_through),
            end: Some(total_slots_through(last)),
        }
    }
}

impl Iterator for Spiral {
    type Item = HexCoord;

    fn next(&mut self) -> Option<HexCoord> {
        if self.end.is_some_and(|end| self.next >= end) {
            return None;
        }
        let coord = spiral_to_coord(SpiralIndex(self.next));
        self.next += 1;
        Some(coord)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.end.map_or((usize::MAX, None), |end| {
            let left = usize::try_from(end.saturating_sub(self.next)).unwrap_or(usize::MAX);
            (left, Some(left))
        })
    }
}

/// Corner of ring `ring` where facing `edge` begins.
fn edge_corner(ring: i32, edge: usize) -> HexCoord {
    let mut corner = ring_start(HexCoord::ORIGIN, ring as u32);
    for facing in 0..edge {
        corner = corner + HexCoord::direction(facing).scale(ring);
    }
    corner
}

/// Convert a spiral index to hexagonal coordinates.
///
/// Closed form of the ring walk: no stepping required.
pub fn spiral_to_coord(index: SpiralIndex) -> HexCoord {
    if index.0 == 0 {
        return HexCoord::ORIGIN;
    }

    let ring = index.ring();
    let offset = index.offset_in_ring();

    let edge = (offset / ring) as usize;
    let pos_on_edge = (offset % ring) as i32;

    edge_corner(ring as i32, edge) + HexCoord::direction(edge).scale(pos_on_edge)
}

/// Convert hexagonal coordinates to spiral index.
///
/// Inverse of [`spiral_to_coord`]. Returns `None` only if the coordinate is
/// too far out for the index to fit.
pub fn coord_to_spiral(coord: HexCoord) -> Option<SpiralIndex> {
    if coord == HexCoord::ORIGIN {
        return Some(SpiralIndex::ORIGIN);
    }

    let ring = coord.ring();
    let ring_i = i32::try_from(ring).ok()?;
    let base = total_slots_through(u64::from(ring) - 1);

    // Each edge is half-open: it owns its starting corner but not its end.
    for edge in 0..DIRECTION_COUNT {
        let corner = edge_corner(ring_i, edge);
        let pos = (coord - corner).ring();
        if pos < ring && corner + HexCoord::direction(edge).scale(pos as i32) == coord {
            return Some(SpiralIndex(base + edge as u64 * u64::from(ring) + u64::from(pos)));
        }
    }

    None
}
