//! hexbake - resumable hexagonal grid baker
//!
//! Generates a hexagonal tile grid in spiral order, records each tile's
//! neighbor rings, optionally builds a render mesh, and writes everything to
//! delimited text datasets. Every stage runs in bounded quanta so a host
//! with a per-call time budget can drive a bake of any size.
//!
//! # Architecture
//!
//! - **Grid**: center walk and per-tile neighbor rings
//! - **Mesh**: 12 vertices and 36 triangle indices per tile
//! - **Serialize**: checkpointed writers, one per dataset
//! - **Dataset**: reads a finished bake back
//! - **Workflow**: the stage machine the host ticks
//!
//! # Example
//!
//! ```no_run
//! use hexbake::{BakeConfig, Tick, Workflow};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut workflow = Workflow::new(BakeConfig::default());
//!     loop {
//!         match workflow.tick() {
//!             Tick::Continue => {}
//!             Tick::Yield(delay) => tokio::time::sleep(delay).await,
//!             Tick::Done => return Ok(()),
//!             Tick::Error => return Err(workflow.take_error().unwrap().into()),
//!         }
//!     }
//! }
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod format;
pub mod grid;
pub mod mesh;
pub mod serialize;
pub mod workflow;

pub use config::{BakeConfig, OutputPaths, StageQuanta};
pub use dataset::{GridDataset, Params, TileRecord};
pub use error::{Error, Result};
pub use format::NeighborLayout;
pub use grid::{GridBuilder, Tile, TileIndex};
pub use mesh::{MeshBuilder, MeshData, Vertex};
pub use serialize::Serializer;
pub use workflow::{CancelFlag, Progress, Stage, StageStatus, Tick, Workflow};

pub use hexbake_quantum::QuantumConfig;
