//! Headless harness binary for Hive.
//!
//! Runs the colony controller against a simulated world so the whole
//! stack can be watched end to end without a game host.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `hive-config.yaml` (defaults when absent)
//! 2. Initialize structured logging (tracing)
//! 3. Create the starting world
//! 4. Build the controller over an in-memory store
//! 5. Run the configured number of ticks
//! 6. Log the final summary

mod error;
mod starter;

use std::path::Path;

use anyhow::Context as _;
use hive_core::{Hive, HiveConfig, InMemoryStore, LoggingConfig, TickSummary};
use hive_world::World as _;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "hive-config.yaml";

/// Application entry point for the harness.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, the starting
/// world cannot be laid out or a tick fails.
fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let config = load_config().context("loading configuration")?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        ticks = config.engine.ticks,
        summary_every = config.engine.summary_every,
        "hive-engine starting"
    );

    // 3. Create the starting world.
    let mut world = starter::create_starting_world()
        .map_err(EngineError::from)
        .context("creating starting world")?;

    // 4. Build the controller.
    let ticks = config.engine.ticks;
    let summary_every = config.engine.summary_every;
    let mut hive = Hive::new(config, InMemoryStore::new())
        .map_err(EngineError::from)
        .context("building the controller")?;

    // 5. Run the ticks.
    let mut last = None;
    for _ in 0..ticks {
        let summary = hive
            .run_tick(&mut world)
            .map_err(EngineError::from)
            .context("running a tick")?;
        if summary
            .tick
            .checked_rem(summary_every)
            .is_some_and(|r| r == 0)
        {
            log_summary(&summary);
        }
        world.advance();
        last = Some(summary);
    }

    // 6. Log the result.
    match last {
        Some(summary) => {
            log_summary(&summary);
            info!(
                workers = world.workers().len(),
                memory_colonies = hive.memory().terraformed_rooms.len(),
                "hive-engine shutdown complete"
            );
        }
        None => warn!("no tick was run"),
    }
    Ok(())
}

/// Load `hive-config.yaml`, or the defaults when the file is absent.
fn load_config() -> Result<HiveConfig, EngineError> {
    let path = Path::new(CONFIG_PATH);
    if path.exists() {
        Ok(HiveConfig::from_file(path)?)
    } else {
        Ok(HiveConfig::default())
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured
/// level.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

fn log_summary(summary: &TickSummary) {
    info!(
        tick = summary.tick,
        colonies = summary.colonies,
        requests = summary.requests,
        fabricated = summary.fabricated.len(),
        power_rooms = summary.power.len(),
        errors = summary.errors.len(),
        "tick summary"
    );
    for (room, desired) in &summary.desired {
        info!(
            colony = %room,
            gate = desired.gate,
            harvesters = desired.harvesters,
            logistics = desired.logistics,
            builders = desired.builders,
            chargers = desired.chargers,
            repairers = desired.repairers,
            defenders = desired.defenders,
            "desired population"
        );
    }
    for err in &summary.errors {
        warn!(error = %err, "tick error");
    }
    match serde_json::to_string(summary) {
        Ok(json) => debug!(summary = %json, "tick summary json"),
        Err(err) => warn!(error = %err, "summary not serializable"),
    }
}
