//! Tile generation.
//!
//! The center grid is produced by walking spiral rings outward from the
//! origin; each tile's position is accumulated along that walk rather than
//! computed in closed form. Neighbor rings are then recorded per tile with
//! the same walk centered on the tile.

use std::collections::HashMap;

use hexbake_quantum::Quantum;
use hexbake_topology::{
    neighbors_within, HexCoord, Layout, SpiralRing, Vec2, DIRECTION_COUNT, RING_START_DIRECTION,
};
use tracing::debug;

use crate::error::{Error, Result};
use crate::workflow::StageStatus;

/// One grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub coord: HexCoord,
    /// Planar center.
    pub position: Vec2,
    /// `neighbor_rings[k - 1]` holds the `6k` coordinates at distance `k`,
    /// in spiral order. Some may lie outside the grid.
    pub neighbor_rings: Vec<Vec<HexCoord>>,
}

impl Tile {
    pub fn new(coord: HexCoord, position: Vec2) -> Self {
        Self {
            coord,
            position,
            neighbor_rings: Vec::new(),
        }
    }

    /// Ring at `radius`, 1-based.
    pub fn ring(&self, radius: usize) -> Option<&[HexCoord]> {
        radius
            .checked_sub(1)
            .and_then(|i| self.neighbor_rings.get(i))
            .map(Vec::as_slice)
    }
}

/// Coordinate to tile number.
#[derive(Debug, Clone, Default)]
pub struct TileIndex {
    map: HashMap<HexCoord, usize>,
}

impl TileIndex {
    /// Register `coord` as tile `index`. A coordinate may only appear once.
    pub fn insert(&mut self, coord: HexCoord, index: usize) -> Result<()> {
        if let Some(existing) = self.map.insert(coord, index) {
            return Err(Error::corrupt(format!(
                "coordinate {coord} generated twice (tiles {existing} and {index})"
            )));
        }
        Ok(())
    }

    pub fn get(&self, coord: HexCoord) -> Option<usize> {
        self.map.get(&coord).copied()
    }

    pub fn contains(&self, coord: HexCoord) -> bool {
        self.map.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

/// Ring walk of the center grid, carried across quanta together with the
/// position of the next tile it emits.
#[derive(Debug, Clone, Copy)]
struct CenterWalk {
    ring: SpiralRing,
    position: Vec2,
}

impl CenterWalk {
    fn start(layout: &Layout, radius: usize) -> Self {
        let start = layout.neighbor_vectors()[RING_START_DIRECTION];
        Self {
            ring: SpiralRing::new(HexCoord::ORIGIN, radius as u32),
            position: start * (radius as f64 * layout.tile_height()),
        }
    }
}

/// Builds the tile list and index stage by stage.
#[derive(Debug, Clone)]
pub struct GridBuilder {
    layout: Layout,
    grid_range: u32,
    neighbor_range: u32,
    tiles: Vec<Tile>,
    index: TileIndex,
    center_walk: Option<CenterWalk>,
    neighbor_walk: Option<SpiralRing>,
}

impl GridBuilder {
    /// Loop starts of the center walk: radius, facing, step.
    pub const CENTER_LOOP: [usize; 3] = [1, 0, 0];

    /// Loop starts of the neighbor walk: tile, radius, facing, step.
    pub const NEIGHBOR_LOOP: [usize; 4] = [0, 1, 0, 0];

    pub fn new(layout: Layout, grid_range: u32, neighbor_range: u32) -> Self {
        Self {
            layout,
            grid_range,
            neighbor_range,
            tiles: Vec::new(),
            index: TileIndex::default(),
            center_walk: None,
            neighbor_walk: None,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn grid_range(&self) -> u32 {
        self.grid_range
    }

    pub fn neighbor_range(&self) -> u32 {
        self.neighbor_range
    }

    /// Tiles in generation order; a tile's position in this slice is its
    /// tile number.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn index(&self) -> &TileIndex {
        &self.index
    }

    pub fn into_parts(self) -> (Vec<Tile>, TileIndex) {
        (self.tiles, self.index)
    }

    /// Ring steps of the center walk, i.e. every tile but the origin.
    pub fn center_steps(&self) -> u64 {
        neighbors_within(u64::from(self.grid_range))
    }

    /// Coordinates the neighbor walk will record over all tiles.
    pub fn neighbor_steps(&self) -> u64 {
        self.tiles.len() as u64 * neighbors_within(u64::from(self.neighbor_range))
    }

    /// Start the center grid over with only the origin tile.
    pub fn init_center(&mut self) -> Result<()> {
        self.tiles.clear();
        self.index.clear();
        self.center_walk = None;
        self.neighbor_walk = None;
        self.push_tile(HexCoord::ORIGIN, Vec2::ZERO)
    }

    /// Walk rings 1..=grid_range, appending one tile per step.
    pub fn generate_center(&mut self, q: &mut Quantum<'_>) -> Result<StageStatus> {
        let range = self.grid_range as usize;

        for radius in q.resume(0, 1)?..=range {
            let mut walk = match self.center_walk.take() {
                Some(walk) => walk,
                None => CenterWalk::start(&self.layout, radius),
            };
            if walk.ring.radius() as usize != radius {
                return Err(Error::corrupt(format!(
                    "center walk is on ring {} but the loop is on ring {radius}",
                    walk.ring.radius()
                )));
            }

            for facing in q.resume(1, 0)?..DIRECTION_COUNT {
                for step in q.resume(2, 0)?..radius {
                    if q.step(&[radius, facing, step])? {
                        self.center_walk = Some(walk);
                        return Ok(StageStatus::Yielded);
                    }

                    let emitted = advance(&mut walk.ring, facing, step)?;
                    self.push_tile(emitted, walk.position)?;
                    walk.position += self.layout.step(facing);
                }
            }

            if !walk.ring.is_finished() {
                return Err(Error::corrupt(format!("ring {radius} left unfinished")));
            }
        }

        debug!(tiles = self.tiles.len(), "center grid generated");
        Ok(StageStatus::Complete)
    }

    /// Drop any recorded neighbor rings.
    pub fn init_neighbors(&mut self) {
        for tile in &mut self.tiles {
            tile.neighbor_rings.clear();
        }
        self.neighbor_walk = None;
    }

    /// Record rings 1..=neighbor_range around every tile.
    pub fn generate_neighbors(&mut self, q: &mut Quantum<'_>) -> Result<StageStatus> {
        let range = self.neighbor_range as usize;

        for tile in q.resume(0, 0)?..self.tiles.len() {
            let center = self.tiles[tile].coord;

            for radius in q.resume(1, 1)?..=range {
                let rings = &mut self.tiles[tile].neighbor_rings;
                let mut walk = match self.neighbor_walk.take() {
                    Some(walk) => walk,
                    None => {
                        rings.push(Vec::with_capacity(DIRECTION_COUNT * radius));
                        SpiralRing::new(center, radius as u32)
                    }
                };
                if walk.center() != center
                    || walk.radius() as usize != radius
                    || rings.len() != radius
                {
                    return Err(Error::corrupt(format!(
                        "neighbor walk around {} r{} does not match tile {tile} ring {radius}",
                        walk.center(),
                        walk.radius()
                    )));
                }

                for facing in q.resume(2, 0)?..DIRECTION_COUNT {
                    for step in q.resume(3, 0)?..radius {
                        if q.step(&[tile, radius, facing, step])? {
                            self.neighbor_walk = Some(walk);
                            return Ok(StageStatus::Yielded);
                        }

                        let emitted = advance(&mut walk, facing, step)?;
                        rings[radius - 1].push(emitted);
                    }
                }
            }
        }

        debug!(tiles = self.tiles.len(), range, "neighbor rings recorded");
        Ok(StageStatus::Complete)
    }

    fn push_tile(&mut self, coord: HexCoord, position: Vec2) -> Result<()> {
        self.index.insert(coord, self.tiles.len())?;
        self.tiles.push(Tile::new(coord, position));
        Ok(())
    }
}

/// Take one step of `walk`, which must be at (`facing`, `step`).
fn advance(walk: &mut SpiralRing, facing: usize, step: usize) -> Result<HexCoord> {
    if walk.facing() != facing || walk.step() as usize != step {
        return Err(Error::corrupt(format!(
            "ring walk at facing {} step {} but the loop is at facing {facing} step {step}",
            walk.facing(),
            walk.step()
        )));
    }
    walk.next_step()
        .map(|s| s.coord)
        .ok_or_else(|| Error::corrupt(format!("ring walk around {} ran out", walk.center())))
}
