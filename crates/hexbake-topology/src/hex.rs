//! Axial hex coordinates.
//!
//! `q` and `r` are stored; the cube axis `s = -q - r` is derived when needed.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Number of facings around a hexagon.
pub const DIRECTION_COUNT: usize = 6;

/// A cell on the hexagonal plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub const ORIGIN: Self = Self { q: 0, r: 0 };

    /// The six axial unit directions, in fixed rotational order.
    ///
    /// Every ring walk steps through these in index order, so the order here
    /// decides tile numbering and file row order.
    pub const DIRECTIONS: [Self; DIRECTION_COUNT] = [
        Self { q: 1, r: 0 },   // 0
        Self { q: 1, r: -1 },  // 1
        Self { q: 0, r: -1 },  // 2
        Self { q: -1, r: 0 },  // 3
        Self { q: -1, r: 1 },  // 4
        Self { q: 0, r: 1 },   // 5
    ];

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Derived cube axis.
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Unit vector for facing `d`. Facings wrap modulo 6.
    #[inline]
    pub const fn direction(d: usize) -> Self {
        Self::DIRECTIONS[d % DIRECTION_COUNT]
    }

    /// Component-wise scale.
    #[inline]
    pub const fn scale(self, factor: i32) -> Self {
        Self::new(self.q * factor, self.r * factor)
    }

    /// The adjacent coordinate in facing `d`.
    #[inline]
    pub fn neighbor(self, d: usize) -> Self {
        self + Self::direction(d)
    }

    /// Steps between two cells: the largest cube-axis difference.
    pub fn hex_distance(&self, other: &Self) -> u32 {
        let d = *self - *other;
        d.q.unsigned_abs()
            .max(d.r.unsigned_abs())
            .max(d.s().unsigned_abs())
    }

    /// Distance from the origin.
    pub fn ring(&self) -> u32 {
        self.hex_distance(&Self::ORIGIN)
    }

    /// Adjacent cells, in facing order.
    pub fn neighbors(&self) -> [Self; DIRECTION_COUNT] {
        Self::DIRECTIONS.map(|d| *self + d)
    }
}

impl Add for HexCoord {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl Sub for HexCoord {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.q - rhs.q, self.r - rhs.r)
    }
}

impl Neg for HexCoord {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.q, -self.r)
    }
}

impl Mul<i32> for HexCoord {
    type Output = Self;

    #[inline]
    fn mul(self, factor: i32) -> Self {
        self.scale(factor)
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_axes_sum_to_zero() {
        for c in [HexCoord::ORIGIN, HexCoord::new(1, -1), HexCoord::new(-3, 5)] {
            assert_eq!(c.q + c.r + c.s(), 0, "{}", c);
        }
    }

    #[test]
    fn distances() {
        assert_eq!(HexCoord::ORIGIN.ring(), 0);
        assert!(HexCoord::DIRECTIONS.iter().all(|d| d.ring() == 1));
        assert_eq!(HexCoord::new(2, 0).ring(), 2);
        assert_eq!(HexCoord::new(1, 1).ring(), 2);
        assert_eq!(HexCoord::new(-3, 1).ring(), 3);
        assert_eq!(HexCoord::new(4, -1).hex_distance(&HexCoord::new(1, 2)), 3);
    }

    #[test]
    fn neighbors_are_distinct_and_adjacent() {
        let center = HexCoord::new(-2, 7);
        let mut around = center.neighbors().to_vec();
        assert!(around.iter().all(|n| n.hex_distance(&center) == 1));
        around.sort();
        around.dedup();
        assert_eq!(around.len(), DIRECTION_COUNT);
    }

    #[test]
    fn opposite_directions_cancel() {
        for d in 0..DIRECTION_COUNT {
            assert_eq!(HexCoord::direction(d) + HexCoord::direction(d + 3), HexCoord::ORIGIN);
        }
    }

    #[test]
    fn direction_wraps() {
        assert_eq!(HexCoord::direction(6), HexCoord::direction(0));
        assert_eq!(HexCoord::direction(10), HexCoord::new(-1, 1));
    }

    #[test]
    fn neighbor_is_add_direction() {
        let a = HexCoord::new(3, -2);
        assert_eq!(a.neighbor(1), HexCoord::new(4, -3));
        assert_eq!(a.neighbor(4), a + HexCoord::direction(4));
    }

    #[test]
    fn arithmetic() {
        let a = HexCoord::new(1, 2);
        let b = HexCoord::new(4, -1);

        assert_eq!(a + b, HexCoord::new(5, 1));
        assert_eq!(a - b, HexCoord::new(-3, 3));
        assert_eq!(-b, HexCoord::new(-4, 1));
        assert_eq!(a * 3, HexCoord::new(3, 6));
        assert_eq!(HexCoord::direction(4).scale(2), HexCoord::new(-2, 2));
        assert_eq!(format!("{}", b), "(4, -1)");
    }
}
