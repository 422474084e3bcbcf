//! Bake configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```json
//! { "grid_range": 40, "neighbor_range": 6, "paths": { "root": "out" } }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use hexbake_quantum::QuantumConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::format::NeighborLayout;

/// Largest accepted grid or neighbor range.
///
/// Keeps every coordinate, tile count and row index well inside `i32`/`u32`.
pub const MAX_RANGE: u32 = 1 << 14;

/// Top-level settings for one bake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BakeConfig {
    /// Center-to-corner radius of a tile.
    pub tile_size: f64,

    /// Rings generated around the origin.
    pub grid_range: u32,

    /// Neighbor rings recorded per tile.
    pub neighbor_range: u32,

    /// Share of the tile radius drawn as grid line, 0..=1. Mesh only.
    pub grid_line_ratio: f64,

    /// Build and write the render mesh.
    pub mesh: bool,

    /// How neighbor rings are laid out on disk.
    pub neighbor_layout: NeighborLayout,

    /// Delay requested after Init and after each completed stage.
    pub default_resume_delay_ms: u64,

    /// Times an output open failure is retried before the bake fails.
    pub io_retry_limit: u32,

    pub quanta: StageQuanta,

    pub paths: OutputPaths,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            tile_size: 500.0,
            grid_range: 10,
            neighbor_range: 10,
            grid_line_ratio: 0.1,
            mesh: true,
            neighbor_layout: NeighborLayout::default(),
            default_resume_delay_ms: 10,
            io_retry_limit: 3,
            quanta: StageQuanta::default(),
            paths: OutputPaths::default(),
        }
    }
}

impl BakeConfig {
    /// Load a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| Error::ConfigLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn default_resume_delay(&self) -> Duration {
        Duration::from_millis(self.default_resume_delay_ms)
    }

    /// Check every numeric parameter against its documented range.
    pub fn validate(&self) -> Result<()> {
        if !self.tile_size.is_finite() || self.tile_size <= 0.0 {
            return Err(Error::config(format!(
                "tile_size must be a positive number, got {}",
                self.tile_size
            )));
        }
        check_range("grid_range", self.grid_range)?;
        check_range("neighbor_range", self.neighbor_range)?;
        if !(0.0..=1.0).contains(&self.grid_line_ratio) {
            return Err(Error::config(format!(
                "grid_line_ratio must be within 0..=1, got {}",
                self.grid_line_ratio
            )));
        }
        for (stage, quantum) in self.quanta.iter() {
            quantum
                .validate()
                .map_err(|e| Error::config(format!("quanta.{stage}: {e}")))?;
        }
        Ok(())
    }
}

fn check_range(name: &str, value: u32) -> Result<()> {
    if value == 0 || value > MAX_RANGE {
        return Err(Error::config(format!(
            "{name} must be within 1..={MAX_RANGE}, got {value}"
        )));
    }
    Ok(())
}

/// Quantum settings for every checkpointed stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StageQuanta {
    pub generate_center: QuantumConfig,
    pub generate_neighbors: QuantumConfig,
    pub build_vertices: QuantumConfig,
    pub build_triangles: QuantumConfig,
    pub serialize_tiles: QuantumConfig,
    pub serialize_neighbors: QuantumConfig,
    pub serialize_index: QuantumConfig,
    pub serialize_vertices: QuantumConfig,
    pub serialize_triangles: QuantumConfig,
}

impl StageQuanta {
    /// The same settings for every stage.
    #[must_use]
    pub fn uniform(quantum: QuantumConfig) -> Self {
        Self {
            generate_center: quantum,
            generate_neighbors: quantum,
            build_vertices: quantum,
            build_triangles: quantum,
            serialize_tiles: quantum,
            serialize_neighbors: quantum,
            serialize_index: quantum,
            serialize_vertices: quantum,
            serialize_triangles: quantum,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &QuantumConfig)> {
        [
            ("generate_center", &self.generate_center),
            ("generate_neighbors", &self.generate_neighbors),
            ("build_vertices", &self.build_vertices),
            ("build_triangles", &self.build_triangles),
            ("serialize_tiles", &self.serialize_tiles),
            ("serialize_neighbors", &self.serialize_neighbors),
            ("serialize_index", &self.serialize_index),
            ("serialize_vertices", &self.serialize_vertices),
            ("serialize_triangles", &self.serialize_triangles),
        ]
        .into_iter()
    }
}

/// Where each dataset is written. Relative paths resolve against `root`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputPaths {
    pub root: PathBuf,
    pub tiles: PathBuf,
    pub tile_indices: PathBuf,
    /// Template for the per-radius files: `Neighbors.data` becomes
    /// `Neighbors_1.data`, `Neighbors_2.data`, ...
    pub neighbors: PathBuf,
    pub vertices: PathBuf,
    pub triangles: PathBuf,
    pub params: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            tiles: PathBuf::from("Data/Tiles.data"),
            tile_indices: PathBuf::from("Data/TileIndices.data"),
            neighbors: PathBuf::from("Data/Neighbors.data"),
            vertices: PathBuf::from("Data/Vertices.data"),
            triangles: PathBuf::from("Data/Triangles.data"),
            params: PathBuf::from("Data/Params.data"),
        }
    }
}

impl OutputPaths {
    /// Default file names under `root`.
    pub fn under(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn tiles_path(&self) -> PathBuf {
        self.root.join(&self.tiles)
    }

    pub fn tile_indices_path(&self) -> PathBuf {
        self.root.join(&self.tile_indices)
    }

    pub fn neighbors_path(&self, radius: u32) -> PathBuf {
        let template = self.root.join(&self.neighbors);
        let stem = template
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Neighbors".to_string());
        let name = match template.extension() {
            Some(ext) => format!("{stem}_{radius}.{}", ext.to_string_lossy()),
            None => format!("{stem}_{radius}"),
        };
        template.with_file_name(name)
    }

    pub fn vertices_path(&self) -> PathBuf {
        self.root.join(&self.vertices)
    }

    pub fn triangles_path(&self) -> PathBuf {
        self.root.join(&self.triangles)
    }

    pub fn params_path(&self) -> PathBuf {
        self.root.join(&self.params)
    }
}
