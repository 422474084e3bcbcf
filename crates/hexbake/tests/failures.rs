//! Error paths: unwritable output, bad config, cancellation.

use std::fs;
use std::time::Duration;

use hexbake::{
    BakeConfig, Error, GridDataset, NeighborLayout, OutputPaths, QuantumConfig, Stage, Tick,
    Workflow,
};

fn small(root: &std::path::Path) -> BakeConfig {
    BakeConfig {
        grid_range: 1,
        neighbor_range: 1,
        mesh: false,
        io_retry_limit: 2,
        paths: OutputPaths::under(root),
        ..Default::default()
    }
}

/// Tick until the first dataset write is attempted.
fn tick_until_serializing(workflow: &mut Workflow) {
    while workflow.stage() != Stage::SerializeTiles {
        assert_eq!(workflow.tick(), Tick::Continue);
    }
}

#[test]
fn unwritable_output_fails_after_retries() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Data"), "a file where the directory should be").unwrap();

    let mut workflow = Workflow::new(small(dir.path()));
    tick_until_serializing(&mut workflow);

    assert_eq!(workflow.tick(), Tick::Yield(Duration::from_millis(10)));
    assert_eq!(workflow.tick(), Tick::Yield(Duration::from_millis(20)));
    assert_eq!(workflow.stage(), Stage::SerializeTiles);

    assert_eq!(workflow.tick(), Tick::Error);
    assert_eq!(workflow.stage(), Stage::Error);
    match workflow.error() {
        Some(Error::FileOpenFailed { path, .. }) => {
            assert_eq!(path, &workflow.config().paths.tiles_path());
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(workflow.tick(), Tick::Error);
}

#[test]
fn output_that_comes_back_is_retried() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("Data");
    fs::write(&blocker, "temporarily in the way").unwrap();

    let mut workflow = Workflow::new(small(dir.path()));
    tick_until_serializing(&mut workflow);
    assert!(matches!(workflow.tick(), Tick::Yield(_)));

    fs::remove_file(&blocker).unwrap();
    assert_eq!(workflow.run_to_end(), Tick::Done);
    let tiles = fs::read_to_string(workflow.config().paths.tiles_path()).unwrap();
    assert_eq!(tiles.lines().count(), 7);
}

#[test]
fn retried_neighbor_file_does_not_repeat_rows() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = small(dir.path());
    config.neighbor_range = 2;
    config.quanta.serialize_neighbors = QuantumConfig::with_limit(4);
    let paths = config.paths.clone();

    // Radius 2 cannot be opened until the directory in its way is gone.
    let blocker = paths.neighbors_path(2);
    fs::create_dir_all(&blocker).unwrap();

    let mut workflow = Workflow::new(config);
    while workflow.stage() != Stage::SerializeNeighbors {
        assert_eq!(workflow.tick(), Tick::Continue);
    }

    // Rows 0..4 of radius 1, then rows 4..7 before radius 2 fails to open.
    assert_eq!(workflow.tick(), Tick::Yield(Duration::from_millis(10)));
    assert_eq!(workflow.tick(), Tick::Yield(Duration::from_millis(10)));
    assert_eq!(workflow.stage(), Stage::SerializeNeighbors);

    fs::remove_dir(&blocker).unwrap();
    assert_eq!(workflow.run_to_end(), Tick::Done, "{:?}", workflow.error());

    for radius in 1..=2 {
        let text = fs::read_to_string(paths.neighbors_path(radius)).unwrap();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 7, "radius {}", radius);
        let r = radius as i32;
        for (row, tile) in rows.iter().zip(workflow.tiles()) {
            // Every ring starts `radius` steps along (-1, 1) from its tile.
            let first = format!("{},{} ", tile.coord.q - r, tile.coord.r + r);
            assert!(row.starts_with(&first), "radius {}: {}", radius, row);
            assert_eq!(row.split(' ').count(), 6 * radius as usize);
        }
    }
    let data = GridDataset::load(&paths, NeighborLayout::PerRadius).unwrap();
    assert_eq!(data.neighbor_ring(6, 2), workflow.tiles()[6].ring(2));
}

#[test]
fn invalid_quantum_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = small(dir.path());
    config.quanta.generate_neighbors = QuantumConfig {
        max_depth: 2,
        ..Default::default()
    };

    // Valid on its own, but too shallow for the four-level neighbor walk.
    let mut workflow = Workflow::new(config);
    assert_eq!(workflow.run_to_end(), Tick::Error);
    assert!(
        matches!(workflow.error(), Some(Error::ConfigInvalid(_))),
        "{:?}",
        workflow.error()
    );
    assert!(workflow.tiles().len() == 7);
}

#[test]
fn out_of_range_config_never_starts() {
    let mut workflow = Workflow::new(BakeConfig {
        tile_size: -1.0,
        ..Default::default()
    });
    assert_eq!(workflow.tick(), Tick::Error);
    assert!(matches!(workflow.take_error(), Some(Error::ConfigInvalid(_))));
    assert!(workflow.grid().is_none());
}

#[test]
fn cancel_mid_stage() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = small(dir.path());
    config.grid_range = 5;
    config.quanta.generate_center = QuantumConfig::with_limit(3);

    let mut workflow = Workflow::new(config);
    let cancel = workflow.cancel_flag();
    workflow.tick();
    assert!(matches!(workflow.tick(), Tick::Yield(_)));

    cancel.cancel();
    assert_eq!(workflow.tick(), Tick::Error);
    assert!(matches!(workflow.error(), Some(Error::Cancelled)));
    assert!(!workflow.config().paths.tiles_path().exists());
}
