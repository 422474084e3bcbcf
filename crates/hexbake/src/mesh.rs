//! Render mesh for a baked grid.
//!
//! Each tile is a ring of 12 vertices: outer and inner corner pairs, the gap
//! between the two hexagons drawn as grid line.

use hexbake_quantum::Quantum;
use hexbake_topology::{Vec2, CORNERS_PER_TILE};
use tracing::debug;

use crate::error::{Error, Result};
use crate::grid::Tile;
use crate::workflow::StageStatus;

pub const VERTICES_PER_TILE: usize = 2 * CORNERS_PER_TILE;

/// Two triangles per tile edge.
pub const TRIANGLE_INDICES_PER_TILE: usize = 6 * CORNERS_PER_TILE;

pub type Vertex = [f64; 3];

/// Vertex and index buffers, both in tile order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<u32>,
}

impl MeshData {
    pub fn tile_vertices(&self, tile: usize) -> Option<&[Vertex]> {
        let start = tile.checked_mul(VERTICES_PER_TILE)?;
        self.vertices.get(start..start + VERTICES_PER_TILE)
    }

    pub fn tile_triangles(&self, tile: usize) -> Option<&[u32]> {
        let start = tile.checked_mul(TRIANGLE_INDICES_PER_TILE)?;
        self.triangles.get(start..start + TRIANGLE_INDICES_PER_TILE)
    }

    /// Tiles with a complete vertex row.
    pub fn vertex_rows(&self) -> usize {
        self.vertices.len() / VERTICES_PER_TILE
    }

    /// Tiles with a complete triangle row.
    pub fn triangle_rows(&self) -> usize {
        self.triangles.len() / TRIANGLE_INDICES_PER_TILE
    }
}

/// Builds [`MeshData`] a tile at a time.
#[derive(Debug, Clone, Default)]
pub struct MeshBuilder {
    /// Outer/inner corner offsets, interleaved.
    corners: Vec<Vec2>,
    /// Index pattern of tile 0.
    pattern: Vec<u32>,
    mesh: MeshData,
}

impl MeshBuilder {
    /// Loop starts of both mesh stages: tile.
    pub const TILE_LOOP: [usize; 1] = [0];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    pub fn into_mesh(self) -> MeshData {
        self.mesh
    }

    /// Compute corner offsets and clear any vertices built so far.
    pub fn init_vertices(&mut self, tile_size: f64, grid_line_ratio: f64) {
        let inner_size = tile_size * (1.0 - grid_line_ratio);
        self.corners = (0..CORNERS_PER_TILE)
            .flat_map(|i| {
                let corner = Vec2::from_angle(60.0 * i as f64);
                [corner * tile_size, corner * inner_size]
            })
            .collect();
        self.mesh.vertices.clear();
    }

    /// Compute the index pattern and clear any triangles built so far.
    pub fn init_triangles(&mut self) {
        let n = CORNERS_PER_TILE as u32;
        self.pattern = (0..n)
            .flat_map(|i| {
                let outer = 2 * i;
                let inner = outer + 1;
                let next_outer = 2 * ((i + 1) % n);
                let next_inner = next_outer + 1;
                [outer, inner, next_inner, outer, next_inner, next_outer]
            })
            .collect();
        self.mesh.triangles.clear();
    }

    pub fn build_vertices(&mut self, tiles: &[Tile], q: &mut Quantum<'_>) -> Result<StageStatus> {
        if self.corners.len() != VERTICES_PER_TILE {
            return Err(Error::corrupt("vertex stage entered before its corner table"));
        }

        for tile in q.resume(0, 0)?..tiles.len() {
            if q.step(&[tile])? {
                return Ok(StageStatus::Yielded);
            }
            expect_rows(
                "vertex",
                self.mesh.vertex_rows(),
                self.mesh.vertices.len(),
                VERTICES_PER_TILE,
                tile,
            )?;

            let center = tiles[tile].position;
            self.mesh.vertices.extend(self.corners.iter().map(|&offset| {
                let p = center + offset;
                [p.x, p.y, 0.0]
            }));
        }

        debug!(vertices = self.mesh.vertices.len(), "vertices built");
        Ok(StageStatus::Complete)
    }

    pub fn build_triangles(&mut self, tile_count: usize, q: &mut Quantum<'_>) -> Result<StageStatus> {
        if self.pattern.len() != TRIANGLE_INDICES_PER_TILE {
            return Err(Error::corrupt("triangle stage entered before its index pattern"));
        }

        for tile in q.resume(0, 0)?..tile_count {
            if q.step(&[tile])? {
                return Ok(StageStatus::Yielded);
            }
            expect_rows(
                "triangle",
                self.mesh.triangle_rows(),
                self.mesh.triangles.len(),
                TRIANGLE_INDICES_PER_TILE,
                tile,
            )?;

            let base = u32::try_from(tile * VERTICES_PER_TILE)
                .map_err(|_| Error::corrupt(format!("vertex index of tile {tile} overflows u32")))?;
            self.mesh.triangles.extend(self.pattern.iter().map(|i| base + i));
        }

        debug!(indices = self.mesh.triangles.len(), "triangles built");
        Ok(StageStatus::Complete)
    }
}

/// Tile `tile` may only be built once every earlier tile has been.
fn expect_rows(kind: &str, rows: usize, len: usize, per_row: usize, tile: usize) -> Result<()> {
    if rows != tile || len % per_row != 0 {
        return Err(Error::corrupt(format!(
            "{kind} buffer holds {len} entries, resuming at tile {tile}"
        )));
    }
    Ok(())
}
