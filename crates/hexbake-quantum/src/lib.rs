//! hexbake quantum
//!
//! Runs long nested loops a bounded slice at a time. A host that may only
//! spend a short time per invocation drives a stage repeatedly; each call
//! executes at most `item_limit` innermost iterations, records where it
//! stopped, and the next call continues from exactly that iteration.
//!
//! # Usage
//!
//! ```
//! use hexbake_quantum::{LoopCursor, QuantumConfig};
//!
//! let mut cursor = LoopCursor::new(QuantumConfig::with_limit(4)).unwrap();
//! let mut seen = Vec::new();
//!
//! loop {
//!     cursor.begin("pairs", &[0, 0]).unwrap();
//!     let mut q = cursor.quantum();
//!     let mut finished = true;
//!     'nest: for i in q.resume(0, 0).unwrap()..3 {
//!         for j in q.resume(1, 0).unwrap()..3 {
//!             if q.step(&[i, j]).unwrap() {
//!                 finished = false;
//!                 break 'nest;
//!             }
//!             seen.push((i, j));
//!         }
//!     }
//!     if finished {
//!         break;
//!     }
//! }
//!
//! assert_eq!(seen.len(), 9);
//! assert_eq!(seen[4], (1, 1));
//! ```
//!
//! # Resume rules
//!
//! - Each saved index names the next iteration to run, never one already run.
//! - A saved index is handed out once per call; after an outer loop advances,
//!   inner loops restart at their natural start.
//! - A saved index past its loop's bound simply produces an empty range.

mod cursor;
mod error;

pub use cursor::{LoopCursor, Quantum, QuantumConfig};
pub use error::{QuantumError, Result};

/// Deepest loop nest a cursor can track.
pub const MAX_LOOP_DEPTH: usize = 4;
