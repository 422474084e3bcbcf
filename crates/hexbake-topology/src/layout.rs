//! Planar layout of flat-topped hexagonal tiles.
//!
//! Neighbor unit vector `i` points from a tile center to the center of its
//! neighbor in facing `i`; the vectors sit at `30° - 60°·i`, i.e. 30° off the
//! corner directions. Adjacent centers are `tile_height` apart.

use std::ops::{Add, AddAssign, Mul, Sub};

use crate::hex::DIRECTION_COUNT;
use crate::HexCoord;

/// A point on the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector at `degrees` counter-clockwise from +X.
    pub fn from_angle(degrees: f64) -> Self {
        let rad = degrees.to_radians();
        Self::new(rad.cos(), rad.sin())
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(&self, other: &Self) -> f64 {
        (*self - *other).length()
    }
}

impl Add for Vec2 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    #[inline]
    fn mul(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

/// Derived tile dimensions and direction tables for one tile size.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    tile_size: f64,
    tile_width: f64,
    tile_height: f64,
    neighbor_vectors: [Vec2; DIRECTION_COUNT],
}

impl Layout {
    /// `tile_size` is the center-to-corner radius.
    pub fn new(tile_size: f64) -> Self {
        let neighbor_vectors =
            std::array::from_fn(|i| Vec2::from_angle(30.0 - 60.0 * i as f64));

        Self {
            tile_size,
            tile_width: tile_size * 2.0,
            tile_height: tile_size * 3f64.sqrt(),
            neighbor_vectors,
        }
    }

    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    /// Corner-to-corner extent.
    pub fn tile_width(&self) -> f64 {
        self.tile_width
    }

    /// Edge-to-edge extent, and the spacing between adjacent centers.
    pub fn tile_height(&self) -> f64 {
        self.tile_height
    }

    pub fn neighbor_vectors(&self) -> &[Vec2; DIRECTION_COUNT] {
        &self.neighbor_vectors
    }

    /// Center-to-center offset for one step in facing `d`.
    #[inline]
    pub fn step(&self, d: usize) -> Vec2 {
        self.neighbor_vectors[d % DIRECTION_COUNT] * self.tile_height
    }

    /// Closed-form center of `coord`.
    ///
    /// Generation never uses this; positions there are accumulated along the
    /// ring walk. It exists for checking and for readers.
    pub fn axial_to_pixel(&self, coord: HexCoord) -> Vec2 {
        let size = self.tile_size;
        Vec2::new(
            1.5 * size * f64::from(coord.q),
            3f64.sqrt() * size * (f64::from(coord.q) / 2.0 + f64::from(coord.r)),
        )
    }
}
