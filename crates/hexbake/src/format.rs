//! Row formats of the emitted datasets.
//!
//! Records end with `\n`. Fields are separated by `|`, sub-fields by `,`,
//! list items by a space, and inline neighbor rings by `:`.
//!
//! | Dataset   | Row                                         |
//! |-----------|---------------------------------------------|
//! | Tiles     | `q,r\|x,y` (inline: `q,r\|x,y\|ring:ring…`) |
//! | Index     | `q,r\|i`                                    |
//! | Neighbors | `q,r q,r …`                                 |
//! | Params    | `tileSize\|gridRange\|neighborRange`        |
//! | Vertices  | `x,y,z\|` × 12                              |
//! | Triangles | `i,` × 36                                   |

use std::fmt::Write as _;

use hexbake_topology::{HexCoord, Vec2};
use serde::{Deserialize, Serialize};

use crate::grid::Tile;
use crate::mesh::Vertex;

pub const FIELD_DELIM: char = '|';
pub const SUBFIELD_DELIM: char = ',';
pub const LIST_DELIM: char = ' ';
pub const RING_DELIM: char = ':';

/// Fractional digits kept for every float field.
pub const FLOAT_DIGITS: usize = 2;

/// Where a tile's neighbor rings are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborLayout {
    /// One file per radius, one row per tile.
    #[default]
    PerRadius,
    /// Appended to the tile row; no separate neighbor files.
    Inline,
}

impl NeighborLayout {
    /// Whether this layout writes per-radius neighbor files.
    pub fn writes_neighbor_files(self) -> bool {
        matches!(self, Self::PerRadius)
    }

    /// Format the tile row for this layout into `out`.
    pub fn write_tile_row(self, tile: &Tile, out: &mut String) {
        push_coord(out, tile.coord);
        out.push(FIELD_DELIM);
        push_position(out, tile.position);

        if self == Self::Inline {
            out.push(FIELD_DELIM);
            for (i, ring) in tile.neighbor_rings.iter().enumerate() {
                if i > 0 {
                    out.push(RING_DELIM);
                }
                push_ring(out, ring);
            }
        }
    }
}

/// Format `value` with at most `digits` fractional digits, trailing zeros
/// trimmed. Ties round away from zero.
pub fn format_float(value: f64, digits: usize) -> String {
    // `{:.N}` alone rounds ties to even.
    let scale = 10f64.powi(i32::try_from(digits).unwrap_or(i32::MAX));
    let scaled = value * scale;
    let rounded = if scaled.is_finite() {
        scaled.round() / scale
    } else {
        value
    };
    let mut text = format!("{:.*}", digits, rounded);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text.remove(0);
    }
    text
}

pub fn push_coord(out: &mut String, coord: HexCoord) {
    let _ = write!(out, "{}{}{}", coord.q, SUBFIELD_DELIM, coord.r);
}

pub fn push_position(out: &mut String, position: Vec2) {
    out.push_str(&format_float(position.x, FLOAT_DIGITS));
    out.push(SUBFIELD_DELIM);
    out.push_str(&format_float(position.y, FLOAT_DIGITS));
}

/// Space-separated coordinates of one ring.
pub fn push_ring(out: &mut String, ring: &[HexCoord]) {
    for (i, &coord) in ring.iter().enumerate() {
        if i > 0 {
            out.push(LIST_DELIM);
        }
        push_coord(out, coord);
    }
}

pub fn write_index_row(out: &mut String, coord: HexCoord, index: usize) {
    push_coord(out, coord);
    let _ = write!(out, "{FIELD_DELIM}{index}");
}

pub fn write_vertex_row(out: &mut String, vertices: &[Vertex]) {
    for vertex in vertices {
        for (i, &component) in vertex.iter().enumerate() {
            if i > 0 {
                out.push(SUBFIELD_DELIM);
            }
            out.push_str(&format_float(component, FLOAT_DIGITS));
        }
        out.push(FIELD_DELIM);
    }
}

pub fn write_triangle_row(out: &mut String, indices: &[u32]) {
    for index in indices {
        let _ = write!(out, "{index}{SUBFIELD_DELIM}");
    }
}

pub fn write_params_row(out: &mut String, tile_size: f64, grid_range: u32, neighbor_range: u32) {
    out.push_str(&format_float(tile_size, FLOAT_DIGITS));
    let _ = write!(out, "{FIELD_DELIM}{grid_range}{FIELD_DELIM}{neighbor_range}");
}

/// Parse `q,r`.
pub fn parse_coord(field: &str) -> Option<HexCoord> {
    let (q, r) = field.split_once(SUBFIELD_DELIM)?;
    Some(HexCoord::new(q.trim().parse().ok()?, r.trim().parse().ok()?))
}

/// Parse `x,y`.
pub fn parse_position(field: &str) -> Option<Vec2> {
    let (x, y) = field.split_once(SUBFIELD_DELIM)?;
    Some(Vec2::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

/// Parse a space-separated ring. An empty field is an empty ring.
pub fn parse_ring(field: &str) -> Option<Vec<HexCoord>> {
    field
        .split(LIST_DELIM)
        .filter(|item| !item.is_empty())
        .map(parse_coord)
        .collect()
}
