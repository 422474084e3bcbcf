//! Chunked execution must visit exactly what an uninterrupted run visits.

use hexbake_quantum::{LoopCursor, QuantumConfig, Result};
use proptest::prelude::*;

/// Four-level nest with a data-dependent innermost bound, shaped like a
/// per-tile ring walk: tile, radius, facing, step.
fn run(
    cursor: &mut LoopCursor,
    tiles: usize,
    range: usize,
    out: &mut Vec<[usize; 4]>,
) -> Result<bool> {
    cursor.begin("rings", &[0, 1, 0, 0])?;
    let mut q = cursor.quantum();
    for tile in q.resume(0, 0)?..tiles {
        for radius in q.resume(1, 1)?..=range {
            for facing in q.resume(2, 0)?..6 {
                for step in q.resume(3, 0)?..radius {
                    let at = [tile, radius, facing, step];
                    if q.step(&at)? {
                        return Ok(false);
                    }
                    out.push(at);
                }
            }
        }
    }
    Ok(true)
}

fn collect(limit: usize, tiles: usize, range: usize) -> (Vec<[usize; 4]>, u64) {
    let mut cursor = LoopCursor::new(QuantumConfig::with_limit(limit)).unwrap();
    let mut out = Vec::new();
    while !run(&mut cursor, tiles, range, &mut out).unwrap() {
        assert!(cursor.yielded());
    }
    (out, cursor.total())
}

proptest! {
    #[test]
    fn any_quantum_size_is_transparent(limit in 1usize..200, tiles in 0usize..8, range in 1usize..5) {
        let (expected, expected_total) = collect(usize::MAX, tiles, range);
        let (chunked, total) = collect(limit, tiles, range);
        prop_assert_eq!(expected.len(), tiles * 3 * range * (range + 1));
        prop_assert_eq!(chunked, expected);
        prop_assert_eq!(total, expected_total);
    }
}

#[test]
fn total_counts_across_quanta() {
    let mut cursor = LoopCursor::new(QuantumConfig::with_limit(5)).unwrap();
    let mut out = Vec::new();
    let mut totals = Vec::new();
    while !run(&mut cursor, 1, 2, &mut out).unwrap() {
        totals.push(cursor.total());
    }
    assert_eq!(totals, vec![5, 10, 15]);
    assert_eq!(cursor.total(), 18);
}
