//! The bake state machine.
//!
//! A [`Workflow`] owns everything a bake produces and advances one quantum
//! per [`Workflow::tick`]. The host decides when to call again: immediately
//! after [`Tick::Continue`], after the given delay on [`Tick::Yield`].
//!
//! ```text
//! Init → GenerateCenter → GenerateNeighbors → [BuildVertices → BuildTriangles]
//!      → SerializeTiles → (SerializeNeighbors) → SerializeIndex
//!      → [SerializeVertices → SerializeTriangles] → SerializeParams → Done
//! ```
//!
//! Bracketed stages run only with the mesh enabled; SerializeNeighbors only
//! with the per-radius neighbor layout. Any stage may fall into `Error`,
//! which is terminal.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hexbake_quantum::{LoopCursor, Quantum, QuantumConfig};
use hexbake_topology::Layout;
use tracing::{debug, info, warn};

use crate::config::BakeConfig;
use crate::error::{Error, Result};
use crate::grid::{GridBuilder, Tile};
use crate::mesh::{MeshBuilder, MeshData};
use crate::serialize::Serializer;

/// Pipeline stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Init,
    GenerateCenter,
    GenerateNeighbors,
    BuildVertices,
    BuildTriangles,
    SerializeTiles,
    SerializeNeighbors,
    SerializeIndex,
    SerializeVertices,
    SerializeTriangles,
    SerializeParams,
    Done,
    Error,
}

impl Stage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::GenerateCenter => "generate_center",
            Self::GenerateNeighbors => "generate_neighbors",
            Self::BuildVertices => "build_vertices",
            Self::BuildTriangles => "build_triangles",
            Self::SerializeTiles => "serialize_tiles",
            Self::SerializeNeighbors => "serialize_neighbors",
            Self::SerializeIndex => "serialize_index",
            Self::SerializeVertices => "serialize_vertices",
            Self::SerializeTriangles => "serialize_triangles",
            Self::SerializeParams => "serialize_params",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }

    /// The stage that runs after `self` under `config`.
    pub fn next(self, config: &BakeConfig) -> Stage {
        let mut next = self.successor();
        while next.is_skipped(config) {
            next = next.successor();
        }
        next
    }

    fn successor(self) -> Stage {
        match self {
            Self::Init => Self::GenerateCenter,
            Self::GenerateCenter => Self::GenerateNeighbors,
            Self::GenerateNeighbors => Self::BuildVertices,
            Self::BuildVertices => Self::BuildTriangles,
            Self::BuildTriangles => Self::SerializeTiles,
            Self::SerializeTiles => Self::SerializeNeighbors,
            Self::SerializeNeighbors => Self::SerializeIndex,
            Self::SerializeIndex => Self::SerializeVertices,
            Self::SerializeVertices => Self::SerializeTriangles,
            Self::SerializeTriangles => Self::SerializeParams,
            Self::SerializeParams | Self::Done => Self::Done,
            Self::Error => Self::Error,
        }
    }

    fn is_skipped(self, config: &BakeConfig) -> bool {
        match self {
            Self::BuildVertices
            | Self::BuildTriangles
            | Self::SerializeVertices
            | Self::SerializeTriangles => !config.mesh,
            Self::SerializeNeighbors => !config.neighbor_layout.writes_neighbor_files(),
            _ => false,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the host should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// A stage finished; call again.
    Continue,
    /// The stage yielded; call again after the delay.
    Yield(Duration),
    Done,
    /// See [`Workflow::error`].
    Error,
}

/// Outcome of one quantum of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Complete,
    Yielded,
}

/// Work done in the current stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    current: u64,
    target: u64,
}

impl Progress {
    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    /// `current / target` in `0..=1`; 0 while there is no target.
    pub fn fraction(&self) -> f32 {
        if self.target == 0 {
            return 0.0;
        }
        (self.current as f64 / self.target as f64).clamp(0.0, 1.0) as f32
    }

    fn start(&mut self, target: u64) {
        self.current = 0;
        self.target = target;
    }

    fn advance_to(&mut self, current: u64) {
        self.current = self.current.max(current);
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Shared request to stop a bake at the next tick.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One bake, from configuration to written datasets.
#[derive(Debug)]
pub struct Workflow {
    config: BakeConfig,
    stage: Stage,
    /// Loop position of the current stage; dropped on every transition.
    cursor: Option<LoopCursor>,
    grid: Option<GridBuilder>,
    mesh: MeshBuilder,
    serializer: Serializer,
    progress: Progress,
    error: Option<Error>,
    cancel: CancelFlag,
    io_attempts: u32,
}

impl Workflow {
    pub fn new(config: BakeConfig) -> Self {
        let serializer = Serializer::new(config.paths.clone(), config.neighbor_layout);
        Self {
            config,
            stage: Stage::Init,
            cursor: None,
            grid: None,
            mesh: MeshBuilder::new(),
            serializer,
            progress: Progress::default(),
            error: None,
            cancel: CancelFlag::new(),
            io_attempts: 0,
        }
    }

    pub fn config(&self) -> &BakeConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Fraction of the current stage done, in `0..=1`.
    pub fn progress(&self) -> f32 {
        self.progress.fraction()
    }

    pub fn progress_counts(&self) -> Progress {
        self.progress
    }

    /// The error that stopped the bake.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    /// The grid, once Init has run.
    pub fn grid(&self) -> Option<&GridBuilder> {
        self.grid.as_ref()
    }

    pub fn tiles(&self) -> &[Tile] {
        match &self.grid {
            Some(grid) => grid.tiles(),
            None => &[],
        }
    }

    pub fn mesh(&self) -> &MeshData {
        self.mesh.mesh()
    }

    /// A handle that stops this bake when cancelled.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.stage.is_terminal()
    }

    /// Run one quantum of the current stage.
    pub fn tick(&mut self) -> Tick {
        match self.stage {
            Stage::Done => return Tick::Done,
            Stage::Error => return Tick::Error,
            _ => {}
        }
        if self.cancel.is_cancelled() {
            self.fail(Error::Cancelled);
            return Tick::Error;
        }

        let stage = self.stage;
        match self.run_stage(stage) {
            Ok(StageStatus::Complete) => {
                self.io_attempts = 0;
                self.complete(stage)
            }
            Ok(StageStatus::Yielded) => {
                self.io_attempts = 0;
                let delay = self
                    .cursor
                    .as_ref()
                    .map_or_else(|| self.config.default_resume_delay(), LoopCursor::resume_delay);
                debug!(
                    stage = %stage,
                    progress = self.progress.fraction(),
                    "quantum spent, yielding"
                );
                Tick::Yield(delay)
            }
            Err(e) if e.is_retryable() && self.io_attempts < self.config.io_retry_limit => {
                let delay = self.retry_delay();
                self.io_attempts += 1;
                warn!(
                    stage = %stage,
                    attempt = self.io_attempts,
                    limit = self.config.io_retry_limit,
                    ?delay,
                    error = %e,
                    "output unavailable, retrying"
                );
                Tick::Yield(delay)
            }
            Err(e) => {
                self.fail(e);
                Tick::Error
            }
        }
    }

    /// Tick until the bake ends, ignoring requested delays.
    pub fn run_to_end(&mut self) -> Tick {
        loop {
            match self.tick() {
                Tick::Continue | Tick::Yield(_) => {}
                end => return end,
            }
        }
    }

    fn retry_delay(&self) -> Duration {
        let base = self
            .cursor
            .as_ref()
            .map_or_else(|| self.config.default_resume_delay(), LoopCursor::resume_delay);
        base.saturating_mul(2u32.saturating_pow(self.io_attempts))
    }

    fn complete(&mut self, stage: Stage) -> Tick {
        let next = stage.next(&self.config);
        info!(stage = %stage, next = %next, "stage complete");

        self.stage = next;
        self.cursor = None;
        self.progress.reset();

        if next == Stage::Done {
            info!(tiles = self.tiles().len(), "bake complete");
            Tick::Done
        } else {
            Tick::Continue
        }
    }

    fn fail(&mut self, error: Error) {
        warn!(stage = %self.stage, error = %error, "bake failed");
        self.error = Some(error);
        self.stage = Stage::Error;
        self.cursor = None;
    }

    fn run_stage(&mut self, stage: Stage) -> Result<StageStatus> {
        let Self {
            config,
            cursor,
            grid,
            mesh,
            serializer,
            progress,
            ..
        } = self;
        let quanta = &config.quanta;

        match stage {
            Stage::Init => {
                config.validate()?;
                let layout = Layout::new(config.tile_size);
                debug!(
                    width = layout.tile_width(),
                    height = layout.tile_height(),
                    "tile layout"
                );
                *grid = Some(GridBuilder::new(layout, config.grid_range, config.neighbor_range));
                *mesh = MeshBuilder::new();
                Ok(StageStatus::Complete)
            }

            Stage::GenerateCenter => drive(
                cursor,
                quanta.generate_center,
                stage,
                &GridBuilder::CENTER_LOOP,
                progress,
                built(grid)?,
                |grid| {
                    grid.init_center()?;
                    Ok(grid.center_steps())
                },
                |grid, q| grid.generate_center(q),
            ),

            Stage::GenerateNeighbors => drive(
                cursor,
                quanta.generate_neighbors,
                stage,
                &GridBuilder::NEIGHBOR_LOOP,
                progress,
                built(grid)?,
                |grid| {
                    grid.init_neighbors();
                    Ok(grid.neighbor_steps())
                },
                |grid, q| grid.generate_neighbors(q),
            ),

            Stage::BuildVertices => {
                let tiles = built(grid)?.tiles();
                let (tile_size, ratio) = (config.tile_size, config.grid_line_ratio);
                drive(
                    cursor,
                    quanta.build_vertices,
                    stage,
                    &MeshBuilder::TILE_LOOP,
                    progress,
                    mesh,
                    |mesh| {
                        mesh.init_vertices(tile_size, ratio);
                        Ok(tiles.len() as u64)
                    },
                    |mesh, q| mesh.build_vertices(tiles, q),
                )
            }

            Stage::BuildTriangles => {
                let count = built(grid)?.tiles().len();
                drive(
                    cursor,
                    quanta.build_triangles,
                    stage,
                    &MeshBuilder::TILE_LOOP,
                    progress,
                    mesh,
                    |mesh| {
                        mesh.init_triangles();
                        Ok(count as u64)
                    },
                    |mesh, q| mesh.build_triangles(count, q),
                )
            }

            Stage::SerializeTiles => {
                let tiles = built(grid)?.tiles();
                drive(
                    cursor,
                    quanta.serialize_tiles,
                    stage,
                    &Serializer::ROW_LOOP,
                    progress,
                    serializer,
                    |_| Ok(tiles.len() as u64),
                    |out, q| out.write_tiles(tiles, q),
                )
            }

            Stage::SerializeNeighbors => {
                let grid = built(grid)?;
                let (tiles, range) = (grid.tiles(), grid.neighbor_range());
                drive(
                    cursor,
                    quanta.serialize_neighbors,
                    stage,
                    &Serializer::NEIGHBOR_LOOP,
                    progress,
                    serializer,
                    |_| Ok(tiles.len() as u64 * u64::from(range)),
                    |out, q| out.write_neighbors(tiles, range, q),
                )
            }

            Stage::SerializeIndex => {
                let tiles = built(grid)?.tiles();
                drive(
                    cursor,
                    quanta.serialize_index,
                    stage,
                    &Serializer::ROW_LOOP,
                    progress,
                    serializer,
                    |_| Ok(tiles.len() as u64),
                    |out, q| out.write_index(tiles, q),
                )
            }

            Stage::SerializeVertices => {
                let data = mesh.mesh();
                drive(
                    cursor,
                    quanta.serialize_vertices,
                    stage,
                    &Serializer::ROW_LOOP,
                    progress,
                    serializer,
                    |_| Ok(data.vertex_rows() as u64),
                    |out, q| out.write_vertices(data, q),
                )
            }

            Stage::SerializeTriangles => {
                let data = mesh.mesh();
                drive(
                    cursor,
                    quanta.serialize_triangles,
                    stage,
                    &Serializer::ROW_LOOP,
                    progress,
                    serializer,
                    |_| Ok(data.triangle_rows() as u64),
                    |out, q| out.write_triangles(data, q),
                )
            }

            Stage::SerializeParams => {
                progress.start(1);
                serializer.write_params(config)?;
                progress.advance_to(1);
                Ok(StageStatus::Complete)
            }

            Stage::Done | Stage::Error => Err(Error::corrupt(format!("{stage} has no handler"))),
        }
    }
}

fn built(grid: &mut Option<GridBuilder>) -> Result<&mut GridBuilder> {
    grid.as_mut()
        .ok_or_else(|| Error::corrupt("grid used before init"))
}

/// Run one quantum of a checkpointed stage.
///
/// `init` runs on the stage's first entry and returns its progress target.
#[allow(clippy::too_many_arguments)]
fn drive<S>(
    slot: &mut Option<LoopCursor>,
    quantum: QuantumConfig,
    stage: Stage,
    starts: &[usize],
    progress: &mut Progress,
    state: &mut S,
    init: impl FnOnce(&mut S) -> Result<u64>,
    body: impl FnOnce(&mut S, &mut Quantum<'_>) -> Result<StageStatus>,
) -> Result<StageStatus> {
    let cursor = match slot {
        Some(cursor) => cursor,
        None => slot.insert(LoopCursor::new(quantum)?),
    };

    if cursor.begin(stage.label(), starts)? {
        let target = init(state)?;
        progress.start(target);
        debug!(stage = %stage, target, "stage started");
    }

    let mut q = cursor.quantum();
    let status = body(state, &mut q)?;
    progress.advance_to(q.total());
    Ok(status)
}
