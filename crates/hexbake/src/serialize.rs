//! Checkpointed dataset writers.
//!
//! A dataset may take several quanta to write. The quantum that starts at
//! row 0 truncates the file; every later one appends. Handles are opened at
//! the start of a quantum and flushed and closed before it returns, so no
//! handle outlives a yield.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use hexbake_quantum::Quantum;
use tracing::debug;

use crate::config::{BakeConfig, OutputPaths};
use crate::error::{Error, Result};
use crate::format::{self, NeighborLayout};
use crate::grid::Tile;
use crate::mesh::MeshData;
use crate::workflow::StageStatus;

/// One output file, open for the duration of a quantum.
struct DatasetFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl DatasetFile {
    fn open(path: &Path, truncate: bool) -> Result<Self> {
        let open_failed = |source| Error::FileOpenFailed {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(open_failed)?;
        }

        let mut options = OpenOptions::new();
        if truncate {
            options.write(true).create(true).truncate(true);
        } else {
            options.append(true).create(true);
        }
        let file = options.open(path).map_err(open_failed)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer
            .write_all(line.as_bytes())
            .and_then(|()| self.writer.write_all(b"\n"))
            .map_err(|source| Error::WriteFailed {
                path: self.path.clone(),
                source,
            })
    }

    fn finish(mut self) -> Result<()> {
        self.writer.flush().map_err(|source| Error::WriteFailed {
            path: self.path,
            source,
        })
    }
}

/// Writes every dataset of a bake.
#[derive(Debug, Clone)]
pub struct Serializer {
    paths: OutputPaths,
    layout: NeighborLayout,
}

impl Serializer {
    /// Loop starts of every single-loop writer: row.
    pub const ROW_LOOP: [usize; 1] = [0];

    /// Loop starts of the per-radius neighbor writer: radius, tile.
    pub const NEIGHBOR_LOOP: [usize; 2] = [1, 0];

    pub fn new(paths: OutputPaths, layout: NeighborLayout) -> Self {
        Self { paths, layout }
    }

    pub fn paths(&self) -> &OutputPaths {
        &self.paths
    }

    pub fn layout(&self) -> NeighborLayout {
        self.layout
    }

    pub fn write_tiles(&self, tiles: &[Tile], q: &mut Quantum<'_>) -> Result<StageStatus> {
        let layout = self.layout;
        write_rows(&self.paths.tiles_path(), tiles.len(), q, |i, line| {
            layout.write_tile_row(&tiles[i], line);
            Ok(())
        })
    }

    pub fn write_index(&self, tiles: &[Tile], q: &mut Quantum<'_>) -> Result<StageStatus> {
        write_rows(&self.paths.tile_indices_path(), tiles.len(), q, |i, line| {
            format::write_index_row(line, tiles[i].coord, i);
            Ok(())
        })
    }

    /// One file per radius, one row per tile.
    pub fn write_neighbors(
        &self,
        tiles: &[Tile],
        neighbor_range: u32,
        q: &mut Quantum<'_>,
    ) -> Result<StageStatus> {
        let mut line = String::new();

        for radius in q.resume(0, 1)?..=neighbor_range as usize {
            let start = q.resume(1, 0)?;
            if start >= tiles.len() && start > 0 {
                continue;
            }

            // Rows of earlier radii may already be on disk; a failed open
            // must be retried here, not from the last yield.
            q.checkpoint(&[radius, start])?;
            let path = self.paths.neighbors_path(radius as u32);
            let mut file = DatasetFile::open(&path, start == 0)?;
            for tile in start..tiles.len() {
                if q.step(&[radius, tile])? {
                    file.finish()?;
                    return Ok(StageStatus::Yielded);
                }

                let ring = tiles[tile].ring(radius).ok_or_else(|| {
                    Error::corrupt(format!("tile {tile} has no neighbor ring {radius}"))
                })?;
                line.clear();
                format::push_ring(&mut line, ring);
                file.write_line(&line)?;
            }
            file.finish()?;
            debug!(radius, path = %path.display(), "neighbor file written");
        }

        Ok(StageStatus::Complete)
    }

    pub fn write_vertices(&self, mesh: &MeshData, q: &mut Quantum<'_>) -> Result<StageStatus> {
        write_rows(&self.paths.vertices_path(), mesh.vertex_rows(), q, |i, line| {
            let row = mesh
                .tile_vertices(i)
                .ok_or_else(|| Error::corrupt(format!("no vertices for tile {i}")))?;
            format::write_vertex_row(line, row);
            Ok(())
        })
    }

    pub fn write_triangles(&self, mesh: &MeshData, q: &mut Quantum<'_>) -> Result<StageStatus> {
        write_rows(&self.paths.triangles_path(), mesh.triangle_rows(), q, |i, line| {
            let row = mesh
                .tile_triangles(i)
                .ok_or_else(|| Error::corrupt(format!("no triangles for tile {i}")))?;
            format::write_triangle_row(line, row);
            Ok(())
        })
    }

    /// Single line; never chunked.
    pub fn write_params(&self, config: &BakeConfig) -> Result<()> {
        let mut line = String::new();
        format::write_params_row(
            &mut line,
            config.tile_size,
            config.grid_range,
            config.neighbor_range,
        );

        let mut file = DatasetFile::open(&self.paths.params_path(), true)?;
        file.write_line(&line)?;
        file.finish()
    }
}

/// Write rows `0..rows` of one dataset, resuming at the saved row.
fn write_rows<F>(
    path: &Path,
    rows: usize,
    q: &mut Quantum<'_>,
    mut row: F,
) -> Result<StageStatus>
where
    F: FnMut(usize, &mut String) -> Result<()>,
{
    let start = q.resume(0, 0)?;
    if start >= rows && start > 0 {
        return Ok(StageStatus::Complete);
    }

    let mut file = DatasetFile::open(path, start == 0)?;
    let mut line = String::new();
    for i in start..rows {
        if q.step(&[i])? {
            file.finish()?;
            return Ok(StageStatus::Yielded);
        }
        line.clear();
        row(i, &mut line)?;
        file.write_line(&line)?;
    }
    file.finish()?;

    debug!(rows, path = %path.display(), "dataset written");
    Ok(StageStatus::Complete)
}
