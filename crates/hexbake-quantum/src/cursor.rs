//! Loop cursor and per-call quantum handle.

use std::time::Duration;

use crate::error::{QuantumError, Result};
use crate::MAX_LOOP_DEPTH;

/// Label used in errors before any stage has begun.
const UNSTARTED: &str = "<unstarted>";

/// Budget and limits for one checkpointed stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QuantumConfig {
    /// Innermost iterations executed per quantum before yielding.
    pub item_limit: usize,

    /// Deepest loop nest this stage may run. At most [`MAX_LOOP_DEPTH`].
    pub max_depth: usize,

    /// How long the host should wait before the next quantum.
    pub resume_delay_ms: u64,
}

impl Default for QuantumConfig {
    fn default() -> Self {
        Self {
            item_limit: 3000,
            max_depth: MAX_LOOP_DEPTH,
            resume_delay_ms: 10,
        }
    }
}

impl QuantumConfig {
    /// A config whose quanta never yield.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            item_limit: usize::MAX,
            ..Default::default()
        }
    }

    /// A config yielding every `item_limit` iterations.
    #[must_use]
    pub fn with_limit(item_limit: usize) -> Self {
        Self {
            item_limit,
            ..Default::default()
        }
    }

    pub fn resume_delay(&self) -> Duration {
        Duration::from_millis(self.resume_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth > MAX_LOOP_DEPTH {
            return Err(QuantumError::UnsupportedMaxDepth(self.max_depth));
        }
        if self.item_limit == 0 {
            return Err(QuantumError::ZeroItemLimit);
        }
        Ok(())
    }
}

/// Resume position of one loop nest, kept between calls.
///
/// A stage calls [`begin`](Self::begin) on every entry, then opens a
/// [`Quantum`] and runs its loops through it. Each saved index always names
/// the next iteration to execute at its depth.
#[derive(Debug, Clone)]
pub struct LoopCursor {
    config: QuantumConfig,
    stage: Option<&'static str>,
    saved: Vec<usize>,
    /// Per depth: the saved index has not yet been handed out this call.
    armed: Vec<bool>,
    count: usize,
    total: u64,
    yielded: bool,
}

impl LoopCursor {
    pub fn new(config: QuantumConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            stage: None,
            saved: Vec::with_capacity(config.max_depth),
            armed: Vec::with_capacity(config.max_depth),
            count: 0,
            total: 0,
            yielded: false,
        })
    }

    /// Prepare the cursor for `stage`, whose loops start at `starts`.
    ///
    /// Returns `true` on the first entry, when the caller should compute its
    /// one-time values. Re-entering the same stage keeps the saved position.
    pub fn begin(&mut self, stage: &'static str, starts: &[usize]) -> Result<bool> {
        if starts.len() > self.config.max_depth {
            return Err(QuantumError::DepthExceeded {
                depth: starts.len(),
                max: self.config.max_depth,
            });
        }

        if self.stage == Some(stage) {
            if self.saved.len() != starts.len() {
                return Err(QuantumError::ArityMismatch {
                    stage,
                    expected: self.saved.len(),
                    actual: starts.len(),
                });
            }
            return Ok(false);
        }

        self.stage = Some(stage);
        self.saved.clear();
        self.saved.extend_from_slice(starts);
        self.armed.clear();
        self.armed.resize(starts.len(), false);
        self.count = 0;
        self.total = 0;
        self.yielded = false;
        Ok(true)
    }

    /// Open the budget for one call.
    pub fn quantum(&mut self) -> Quantum<'_> {
        self.count = 0;
        self.yielded = false;
        self.armed.fill(true);
        Quantum { cursor: self }
    }

    /// Forget the stage and its position.
    pub fn reset(&mut self) {
        self.stage = None;
        self.saved.clear();
        self.armed.clear();
        self.count = 0;
        self.total = 0;
        self.yielded = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.stage.is_some()
    }

    pub fn stage(&self) -> Option<&'static str> {
        self.stage
    }

    /// Saved per-depth indices, outermost first.
    pub fn saved(&self) -> &[usize] {
        &self.saved
    }

    /// Iterations executed since [`begin`](Self::begin) started the stage.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Whether the last quantum ended by yielding.
    pub fn yielded(&self) -> bool {
        self.yielded
    }

    pub fn config(&self) -> &QuantumConfig {
        &self.config
    }

    pub fn resume_delay(&self) -> Duration {
        self.config.resume_delay()
    }

    fn stage_label(&self) -> &'static str {
        self.stage.unwrap_or(UNSTARTED)
    }
}

/// One call's worth of loop budget.
///
/// Loops take their starting index from [`resume`](Self::resume) and call
/// [`step`](Self::step) at the top of every innermost iteration; when `step`
/// returns `true` the caller must stop and return without running the body.
#[derive(Debug)]
pub struct Quantum<'a> {
    cursor: &'a mut LoopCursor,
}

impl Quantum<'_> {
    /// Starting index for the loop at `depth`, whose natural start is
    /// `nominal`.
    ///
    /// The first entry at each depth after [`LoopCursor::quantum`] resumes
    /// from the saved index; every later entry restarts at `nominal`.
    pub fn resume(&mut self, depth: usize, nominal: usize) -> Result<usize> {
        let cursor = &mut *self.cursor;
        let arity = cursor.saved.len();
        if depth >= arity {
            return Err(QuantumError::DepthOutOfRange {
                stage: cursor.stage_label(),
                depth,
                arity,
            });
        }

        if cursor.armed[depth] {
            cursor.armed[depth] = false;
            return Ok(cursor.saved[depth].max(nominal));
        }

        // An ancestor advanced: nothing below it may resume either.
        for armed in &mut cursor.armed[depth + 1..] {
            *armed = false;
        }
        Ok(nominal)
    }

    /// Account for the innermost iteration at `indices`.
    ///
    /// Returns `true` once the budget is spent; `indices` are then saved as
    /// the resume point and the iteration must not run.
    pub fn step(&mut self, indices: &[usize]) -> Result<bool> {
        let cursor = &mut *self.cursor;
        if indices.len() != cursor.saved.len() {
            return Err(QuantumError::ArityMismatch {
                stage: cursor.stage_label(),
                expected: cursor.saved.len(),
                actual: indices.len(),
            });
        }

        if cursor.count >= cursor.config.item_limit {
            cursor.saved.copy_from_slice(indices);
            cursor.yielded = true;
            return Ok(true);
        }

        // The resume point has been reached; every saved index is spent.
        cursor.armed.fill(false);
        cursor.count += 1;
        cursor.total += 1;
        Ok(false)
    }

    /// Save `indices` as the resume point without spending budget or
    /// yielding.
    ///
    /// Used before a step that may fail partway through a quantum, so that a
    /// retried quantum restarts there and not at the previous yield.
    pub fn checkpoint(&mut self, indices: &[usize]) -> Result<()> {
        let cursor = &mut *self.cursor;
        if indices.len() != cursor.saved.len() {
            return Err(QuantumError::ArityMismatch {
                stage: cursor.stage_label(),
                expected: cursor.saved.len(),
                actual: indices.len(),
            });
        }
        cursor.saved.copy_from_slice(indices);
        Ok(())
    }

    pub fn yielded(&self) -> bool {
        self.cursor.yielded
    }

    /// Iterations executed in this quantum.
    pub fn executed(&self) -> usize {
        self.cursor.count
    }

    /// Iterations executed since the stage began.
    pub fn total(&self) -> u64 {
        self.cursor.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Triangular nest: i in 1..=4, j in 0..3, k in 0..i.
    fn run_nest(cursor: &mut LoopCursor, out: &mut Vec<(usize, usize, usize)>) -> Result<bool> {
        cursor.begin("nest", &[1, 0, 0])?;
        let mut q = cursor.quantum();
        for i in q.resume(0, 1)?..=4 {
            for j in q.resume(1, 0)?..3 {
                for k in q.resume(2, 0)?..i {
                    if q.step(&[i, j, k])? {
                        return Ok(false);
                    }
                    out.push((i, j, k));
                }
            }
        }
        Ok(true)
    }

    fn run_to_end(limit: usize) -> (Vec<(usize, usize, usize)>, usize) {
        let mut cursor = LoopCursor::new(QuantumConfig::with_limit(limit)).unwrap();
        let mut out = Vec::new();
        let mut calls = 1;
        while !run_nest(&mut cursor, &mut out).unwrap() {
            calls += 1;
        }
        (out, calls)
    }

    #[test]
    fn unbounded_runs_in_one_call() {
        let (out, calls) = run_to_end(usize::MAX);
        assert_eq!(calls, 1);
        // 3 * (1 + 2 + 3 + 4)
        assert_eq!(out.len(), 30);
    }

    #[test]
    fn chunked_matches_unbounded() {
        let (expected, _) = run_to_end(usize::MAX);
        for limit in [1, 2, 3, 5, 7, 29, 30, 31] {
            let (out, calls) = run_to_end(limit);
            assert_eq!(out, expected, "limit {}", limit);
            assert_eq!(calls, (30 + limit - 1) / limit, "limit {}", limit);
        }
    }

    #[test]
    fn saved_index_points_at_next_iteration() {
        let mut cursor = LoopCursor::new(QuantumConfig::with_limit(4)).unwrap();
        let mut out = Vec::new();
        assert!(!run_nest(&mut cursor, &mut out).unwrap());
        assert_eq!(out.last(), Some(&(2, 0, 0)));
        assert_eq!(cursor.saved(), &[2, 0, 1]);
        assert!(cursor.yielded());
        assert_eq!(cursor.total(), 4);
    }

    #[test]
    fn begin_is_idempotent_per_stage() {
        let mut cursor = LoopCursor::new(QuantumConfig::default()).unwrap();
        assert!(!cursor.is_initialized());
        assert!(cursor.begin("a", &[0, 0]).unwrap());
        assert!(!cursor.begin("a", &[0, 0]).unwrap());
        assert_eq!(cursor.stage(), Some("a"));

        assert!(cursor.begin("b", &[3]).unwrap());
        assert_eq!(cursor.saved(), &[3]);

        cursor.reset();
        assert!(!cursor.is_initialized());
    }

    #[test]
    fn saved_index_beyond_bound_runs_nothing() {
        let mut cursor = LoopCursor::new(QuantumConfig::default()).unwrap();
        cursor.begin("past-end", &[7]).unwrap();
        let mut q = cursor.quantum();
        let start = q.resume(0, 0).unwrap();
        assert_eq!((start..3).count(), 0);
    }

    #[test]
    fn saved_index_below_nominal_is_clamped() {
        let mut cursor = LoopCursor::new(QuantumConfig::default()).unwrap();
        cursor.begin("clamp", &[0]).unwrap();
        let mut q = cursor.quantum();
        assert_eq!(q.resume(0, 1).unwrap(), 1);
    }

    #[test]
    fn inner_levels_restart_after_empty_resumed_level() {
        let mut cursor = LoopCursor::new(QuantumConfig::default()).unwrap();
        cursor.begin("gap", &[0, 9, 2]).unwrap();
        let mut q = cursor.quantum();
        let mut visited = Vec::new();
        for i in q.resume(0, 0).unwrap()..2 {
            for j in q.resume(1, 0).unwrap()..3 {
                for k in q.resume(2, 0).unwrap()..3 {
                    assert!(!q.step(&[i, j, k]).unwrap());
                    visited.push((i, j, k));
                }
            }
        }
        assert_eq!(visited.len(), 9);
        assert_eq!(visited[0], (1, 0, 0));
    }

    #[test]
    fn saved_index_is_consumed_once() {
        let mut cursor = LoopCursor::new(QuantumConfig::with_limit(3)).unwrap();
        cursor.begin("once", &[0, 0]).unwrap();
        let mut first = Vec::new();
        {
            let mut q = cursor.quantum();
            'outer: for i in q.resume(0, 0).unwrap()..3 {
                for j in q.resume(1, 0).unwrap()..2 {
                    if q.step(&[i, j]).unwrap() {
                        break 'outer;
                    }
                    first.push((i, j));
                }
            }
        }
        assert_eq!(first, vec![(0, 0), (0, 1), (1, 0)]);
        assert_eq!(cursor.saved(), &[1, 1]);

        let mut q = cursor.quantum();
        let mut second = Vec::new();
        for i in q.resume(0, 0).unwrap()..3 {
            for j in q.resume(1, 0).unwrap()..2 {
                if q.step(&[i, j]).unwrap() {
                    break;
                }
                second.push((i, j));
            }
        }
        // (2, 0) proves the inner loop restarted at 0 rather than the stale 1.
        assert_eq!(second, vec![(1, 1), (2, 0), (2, 1)]);
    }

    #[test]
    fn checkpoint_moves_resume_point_of_failed_quantum() {
        let mut cursor = LoopCursor::new(QuantumConfig::default()).unwrap();
        cursor.begin("files", &[0, 0]).unwrap();
        let mut done = Vec::new();
        {
            let mut q = cursor.quantum();
            'files: for file in q.resume(0, 0).unwrap()..3 {
                let start = q.resume(1, 0).unwrap();
                q.checkpoint(&[file, start]).unwrap();
                if file == 1 {
                    // Opening file 1 fails; the quantum is abandoned.
                    break 'files;
                }
                for row in start..2 {
                    assert!(!q.step(&[file, row]).unwrap());
                    done.push((file, row));
                }
            }
            assert!(!q.yielded());
        }
        assert_eq!(cursor.saved(), &[1, 0]);

        let mut q = cursor.quantum();
        for file in q.resume(0, 0).unwrap()..3 {
            for row in q.resume(1, 0).unwrap()..2 {
                assert!(!q.step(&[file, row]).unwrap());
                done.push((file, row));
            }
        }
        assert_eq!(done, vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1)]);

        let err = cursor.quantum().checkpoint(&[0]).unwrap_err();
        assert!(matches!(err, QuantumError::ArityMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn rejects_unsupported_max_depth() {
        let config = QuantumConfig {
            max_depth: MAX_LOOP_DEPTH + 1,
            ..Default::default()
        };
        let err = LoopCursor::new(config).unwrap_err();
        assert_eq!(err, QuantumError::UnsupportedMaxDepth(MAX_LOOP_DEPTH + 1));
        assert!(err.is_config());
    }

    #[test]
    fn rejects_zero_limit() {
        let err = LoopCursor::new(QuantumConfig::with_limit(0)).unwrap_err();
        assert_eq!(err, QuantumError::ZeroItemLimit);
    }

    #[test]
    fn rejects_nest_deeper_than_configured() {
        let config = QuantumConfig {
            max_depth: 2,
            ..Default::default()
        };
        let mut cursor = LoopCursor::new(config).unwrap();
        let err = cursor.begin("deep", &[0, 0, 0]).unwrap_err();
        assert_eq!(err, QuantumError::DepthExceeded { depth: 3, max: 2 });
        assert!(err.is_config());
    }

    #[test]
    fn arity_mismatch_is_corruption() {
        let mut cursor = LoopCursor::new(QuantumConfig::default()).unwrap();
        cursor.begin("pair", &[0, 0]).unwrap();

        let err = cursor.quantum().step(&[0, 0, 0]).unwrap_err();
        assert!(matches!(err, QuantumError::ArityMismatch { expected: 2, actual: 3, .. }));
        assert!(!err.is_config());

        let err = cursor.begin("pair", &[0]).unwrap_err();
        assert!(matches!(err, QuantumError::ArityMismatch { .. }));

        let err = cursor.quantum().resume(2, 0).unwrap_err();
        assert!(matches!(err, QuantumError::DepthOutOfRange { depth: 2, arity: 2, .. }));
    }

    #[test]
    fn resume_before_begin_is_corruption() {
        let mut cursor = LoopCursor::new(QuantumConfig::default()).unwrap();
        let err = cursor.quantum().resume(0, 0).unwrap_err();
        assert!(matches!(err, QuantumError::DepthOutOfRange { stage: UNSTARTED, .. }));
    }
}
