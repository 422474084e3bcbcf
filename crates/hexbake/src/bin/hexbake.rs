//! hexbake binary
//!
//! Bakes a grid with the config given as the first argument or in
//! `HEXBAKE_CONFIG`, or the defaults when neither is set.

use std::time::{Duration, Instant};

use hexbake::{BakeConfig, Error, Tick, Workflow};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const REPORT_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hexbake=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::args()
        .nth(1)
        .or_else(|| std::env::var("HEXBAKE_CONFIG").ok())
    {
        Some(path) => {
            tracing::info!("Loading config from {}", path);
            BakeConfig::from_file(path)?
        }
        None => BakeConfig::default(),
    };

    tracing::info!(
        "Baking {} rings, {} neighbor rings per tile, into {}",
        config.grid_range,
        config.neighbor_range,
        config.paths.root.display()
    );

    let stage_delay = config.default_resume_delay();
    let mut workflow = Workflow::new(config);

    let cancel = workflow.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping at the next quantum");
            cancel.cancel();
        }
    });

    let started = Instant::now();
    let mut last_report = Instant::now();
    loop {
        match workflow.tick() {
            Tick::Continue => tokio::time::sleep(stage_delay).await,
            Tick::Yield(delay) => tokio::time::sleep(delay).await,
            Tick::Done => break,
            Tick::Error => {
                let err = workflow.take_error().unwrap_or(Error::Cancelled);
                tracing::error!("Bake failed in {:?}: {}", started.elapsed(), err);
                return Err(err.into());
            }
        }

        if last_report.elapsed() >= REPORT_INTERVAL {
            tracing::info!(
                "{}: {:.1}%",
                workflow.stage(),
                workflow.progress() * 100.0
            );
            last_report = Instant::now();
        }
    }

    tracing::info!(
        "Baked {} tiles in {:?}",
        workflow.tiles().len(),
        started.elapsed()
    );
    Ok(())
}
