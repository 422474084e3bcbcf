//! Reading a baked grid back from disk.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use hexbake_topology::{coord_to_spiral, count_present_neighbors, HexCoord, SpiralIndex, Vec2};

use crate::config::OutputPaths;
use crate::error::{Error, Result};
use crate::format::{self, NeighborLayout, FIELD_DELIM, RING_DELIM};

/// Contents of the Params file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Params {
    pub tile_size: f64,
    pub grid_range: u32,
    pub neighbor_range: u32,
}

/// One row of the Tiles file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRecord {
    pub coord: HexCoord,
    pub position: Vec2,
}

/// A baked grid loaded from its dataset files.
#[derive(Debug, Clone)]
pub struct GridDataset {
    params: Params,
    tiles: Vec<TileRecord>,
    index: HashMap<HexCoord, usize>,
    /// `rings[tile][radius - 1]`
    rings: Vec<Vec<Vec<HexCoord>>>,
}

impl GridDataset {
    /// Load every dataset written with `layout` under `paths`.
    pub fn load(paths: &OutputPaths, layout: NeighborLayout) -> Result<Self> {
        let params = read_params(&paths.params_path())?;
        let (tiles, mut rings) = read_tiles(&paths.tiles_path(), layout)?;
        let index = read_index(&paths.tile_indices_path(), &tiles)?;

        match layout {
            NeighborLayout::PerRadius => {
                for radius in 1..=params.neighbor_range {
                    read_neighbor_file(&paths.neighbors_path(radius), &mut rings)?;
                }
            }
            NeighborLayout::Inline => {
                let expected = params.neighbor_range as usize;
                if let Some(tile) = rings.iter().position(|r| r.len() != expected) {
                    return Err(parse_error(
                        &paths.tiles_path(),
                        tile + 1,
                        format!("expected {expected} inline rings, found {}", rings[tile].len()),
                    ));
                }
            }
        }

        Ok(Self {
            params,
            tiles,
            index,
            rings,
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn tiles(&self) -> &[TileRecord] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn index_of(&self, coord: HexCoord) -> Option<usize> {
        self.index.get(&coord).copied()
    }

    pub fn position_of(&self, coord: HexCoord) -> Option<Vec2> {
        self.index_of(coord).map(|i| self.tiles[i].position)
    }

    /// Recorded ring `radius` (1-based) of tile `tile`, including
    /// coordinates outside the grid.
    pub fn neighbor_ring(&self, tile: usize, radius: u32) -> Option<&[HexCoord]> {
        let slot = (radius as usize).checked_sub(1)?;
        self.rings.get(tile)?.get(slot).map(Vec::as_slice)
    }

    /// Tile numbers of ring `radius` around `tile` that lie inside the
    /// grid, in ring order.
    pub fn neighbors_in_grid(&self, tile: usize, radius: u32) -> impl Iterator<Item = usize> + '_ {
        self.neighbor_ring(tile, radius)
            .unwrap_or_default()
            .iter()
            .filter_map(|&coord| self.index_of(coord))
    }

    /// Number of grid tiles on ring `radius` around any coordinate, which
    /// need not be a tile itself.
    pub fn tiles_around(&self, coord: HexCoord, radius: u32) -> usize {
        count_present_neighbors(coord, radius, |c| self.index.contains_key(&c))
    }

    /// Coordinate to position for every tile.
    pub fn positions(&self) -> HashMap<HexCoord, Vec2> {
        self.tiles.iter().map(|t| (t.coord, t.position)).collect()
    }
}

fn parse_error(path: &Path, line: usize, message: impl Into<String>) -> Error {
    Error::Parse {
        path: path.to_path_buf(),
        line,
        message: message.into(),
    }
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::FileOpenFailed {
        path: PathBuf::from(path),
        source,
    })
}

fn read_params(path: &Path) -> Result<Params> {
    let text = read_text(path)?;
    let line = text
        .lines()
        .next()
        .ok_or_else(|| parse_error(path, 1, "empty params file"))?;

    let fields: Vec<&str> = line.split(FIELD_DELIM).collect();
    let [tile_size, grid_range, neighbor_range] = fields.as_slice() else {
        return Err(parse_error(path, 1, format!("expected 3 fields, found {}", fields.len())));
    };

    let bad = |name: &str| parse_error(path, 1, format!("invalid {name}"));
    Ok(Params {
        tile_size: tile_size.parse().map_err(|_| bad("tile size"))?,
        grid_range: grid_range.parse().map_err(|_| bad("grid range"))?,
        neighbor_range: neighbor_range.parse().map_err(|_| bad("neighbor range"))?,
    })
}

type TileRows = (Vec<TileRecord>, Vec<Vec<Vec<HexCoord>>>);

fn read_tiles(path: &Path, layout: NeighborLayout) -> Result<TileRows> {
    let text = read_text(path)?;
    let mut tiles = Vec::new();
    let mut rings = Vec::new();

    for (n, line) in text.lines().enumerate() {
        let line_no = n + 1;
        let mut fields = line.split(FIELD_DELIM);

        let coord = fields
            .next()
            .and_then(format::parse_coord)
            .ok_or_else(|| parse_error(path, line_no, "invalid coordinate"))?;
        let position = fields
            .next()
            .and_then(format::parse_position)
            .ok_or_else(|| parse_error(path, line_no, "invalid position"))?;

        let tile_rings = match (layout, fields.next()) {
            (NeighborLayout::PerRadius, None) => Vec::new(),
            (NeighborLayout::Inline, Some(field)) => field
                .split(RING_DELIM)
                .map(format::parse_ring)
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| parse_error(path, line_no, "invalid inline ring"))?,
            (NeighborLayout::Inline, None) => {
                return Err(parse_error(path, line_no, "missing inline rings"));
            }
            (NeighborLayout::PerRadius, Some(_)) => {
                return Err(parse_error(path, line_no, "unexpected third field"));
            }
        };
        if fields.next().is_some() {
            return Err(parse_error(path, line_no, "too many fields"));
        }

        tiles.push(TileRecord { coord, position });
        rings.push(tile_rings);
    }

    Ok((tiles, rings))
}

fn read_index(path: &Path, tiles: &[TileRecord]) -> Result<HashMap<HexCoord, usize>> {
    let text = read_text(path)?;
    let mut index = HashMap::with_capacity(tiles.len());

    for (n, line) in text.lines().enumerate() {
        let line_no = n + 1;
        let (coord, i) = line
            .split_once(FIELD_DELIM)
            .ok_or_else(|| parse_error(path, line_no, "expected `q,r|i`"))?;
        let coord = format::parse_coord(coord)
            .ok_or_else(|| parse_error(path, line_no, "invalid coordinate"))?;
        let i: usize = i
            .parse()
            .map_err(|_| parse_error(path, line_no, "invalid tile number"))?;

        if tiles.get(i).map(|t| t.coord) != Some(coord) {
            return Err(parse_error(
                path,
                line_no,
                format!("index maps {coord} to tile {i}, which the tiles file disagrees with"),
            ));
        }
        if coord_to_spiral(coord) != Some(SpiralIndex(i as u64)) {
            return Err(parse_error(
                path,
                line_no,
                format!("tile {i} at {coord} is out of spiral order"),
            ));
        }
        if index.insert(coord, i).is_some() {
            return Err(parse_error(path, line_no, format!("duplicate coordinate {coord}")));
        }
    }

    if index.len() != tiles.len() {
        return Err(parse_error(
            path,
            text.lines().count(),
            format!("index covers {} of {} tiles", index.len(), tiles.len()),
        ));
    }
    Ok(index)
}

fn read_neighbor_file(path: &Path, rings: &mut [Vec<Vec<HexCoord>>]) -> Result<()> {
    let text = read_text(path)?;
    let mut rows = 0;

    for (n, line) in text.lines().enumerate() {
        let tile_rings = rings
            .get_mut(n)
            .ok_or_else(|| parse_error(path, n + 1, "more rows than tiles"))?;
        let ring = format::parse_ring(line)
            .ok_or_else(|| parse_error(path, n + 1, "invalid neighbor ring"))?;
        tile_rings.push(ring);
        rows += 1;
    }

    if rows != rings.len() {
        return Err(parse_error(
            path,
            rows,
            format!("expected {} rows, found {rows}", rings.len()),
        ));
    }
    Ok(())
}
