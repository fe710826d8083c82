//! Saltitantes binary: a stdin-driven session controller.
//!
//! Reads one command per line (`add`, `remove`, `start`, `stop`, `status`,
//! `new`, `quit`) and drives a [`SessionController`] whose physics and
//! logic tasks run in the background. Frames go to a [`LogSurface`] and
//! player statistics persist through a [`JsonStatsStore`].
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `SALTITANTES_CONFIG` or `saltitantes-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Load the player's statistics
//! 4. Create the session and its controller
//! 5. Run the command loop until `quit` or end of input
//! 6. Stop any running simulation and log the result

mod command;
mod error;
mod stats_store;
mod surface;
mod watch;

use std::path::PathBuf;

use rand::Rng;
use saltitantes_core::collaborators::Scoreboard;
use saltitantes_core::config::SimulationConfig;
use saltitantes_core::operator::RunSummary;
use saltitantes_core::runner::{self, SessionController};
use saltitantes_core::session::{Session, SessionStatus};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::command::Command;
use crate::error::EngineError;
use crate::stats_store::JsonStatsStore;
use crate::surface::LogSurface;
use crate::watch::{EndWatch, RunEvent};

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "saltitantes-config.yaml";

/// Log one frame per this many physics ticks.
const FRAME_LOG_EVERY: u64 = 100;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration or the stored statistics cannot be
/// loaded, or if reading stdin fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let (config, config_found) = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("saltitantes starting");
    if !config_found {
        info!("Config file not found, using defaults");
    }
    info!(
        width = config.panel.width,
        height = config.panel.height,
        fuse_distance = config.physics.fuse_distance,
        physics_tick_ms = config.physics.tick_interval_ms,
        logic_tick_ms = config.economy.logic_tick_interval_ms,
        win_threshold = config.economy.win_threshold,
        max_iterations = config.simulation.max_iterations,
        seed = ?config.simulation.seed,
        "Configuration loaded"
    );

    // 3. Load player statistics.
    let store = JsonStatsStore::new(&config.storage.stats_path);
    let stats = store.load(&config.storage.player)?;

    // 4. Create the session and controller.
    let max_x = config.panel.max_x();
    let session = Session::new(
        config,
        Box::new(Scoreboard::from_stats(stats)),
        Box::new(store),
    );
    info!(session = %session.id(), "Session created");
    let mut controller = SessionController::new(session, Box::new(LogSurface::new(FRAME_LOG_EVERY)));
    let control = controller.control();

    // 5. Command loop.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut watch = EndWatch::new();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("End of input");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(command) => match execute(&mut controller, command, max_x).await {
                        Some(event) => watch.record(event),
                        None => break,
                    },
                    Err(e) => println!("error: {e}"),
                }
            }
            _ = control.wait_until_stopped(), if watch.is_pending() => {}
        }
        if watch.take_finished(control.is_running()) {
            announce_end(control.summary().await);
            print_status(&controller.status().await);
        }
    }

    // 6. Shut down.
    if let Some(outcome) = controller.shutdown().await {
        info!(outcome = ?outcome, "Running simulation stopped at exit");
    }
    if let Some(summary) = control.summary().await {
        runner::log_run_end(&summary);
    }
    info!("saltitantes shutdown complete");
    Ok(())
}

/// Apply one command. Returns `None` when the loop should exit.
async fn execute(
    controller: &mut SessionController,
    command: Command,
    max_x: i32,
) -> Option<RunEvent> {
    let mut event = RunEvent::Unchanged;
    match command {
        Command::Add(x) => {
            let x = x.unwrap_or_else(|| random_x(max_x));
            match controller.add_creature(x).await {
                Some(id) => println!("added creature {id}"),
                None => println!("cannot add creatures to a stopped session (use `new`)"),
            }
        }
        Command::Remove(id) => {
            if controller.remove_creature(id).await {
                println!("removed creature {id}");
            } else {
                println!("cannot remove {id}");
            }
        }
        Command::Start(x) => {
            let x = x.unwrap_or_else(|| random_x(max_x));
            if controller.start(x).await {
                event = RunEvent::Started;
                println!("simulation started, guardian at x={x}");
            } else {
                println!("simulation can only start from an idle session");
            }
        }
        Command::Stop => match controller.stop().await {
            Some(outcome) => {
                event = RunEvent::Stopped;
                println!("simulation stopped: {outcome:?}");
            }
            None => println!("no simulation is running"),
        },
        Command::Status => print_status(&controller.status().await),
        Command::New => {
            if controller.reset().await {
                println!("new session ready");
            } else {
                println!("only a stopped session can be reset");
            }
        }
        Command::Quit => return None,
    }
    Some(event)
}

fn announce_end(summary: Option<RunSummary>) {
    let Some(summary) = summary else {
        println!("simulation over");
        return;
    };
    let outcome = summary
        .outcome
        .map_or_else(|| "none".to_owned(), |o| format!("{o:?}"));
    println!("simulation over after {} ticks: {outcome}", summary.ticks);
}

fn print_status(status: &SessionStatus) {
    match serde_json::to_string_pretty(status) {
        Ok(json) => println!("{json}"),
        Err(e) => warn!(error = %e, "Failed to serialize status"),
    }
}

/// Random spawn position on the panel.
fn random_x(max_x: i32) -> i32 {
    rand::rng().random_range(0..max_x.max(1))
}

/// Load configuration from `SALTITANTES_CONFIG`, falling back to
/// [`CONFIG_FILE`] and then to defaults.
///
/// Returns the config and whether a file was found.
fn load_config() -> Result<(SimulationConfig, bool), EngineError> {
    let path = std::env::var("SALTITANTES_CONFIG")
        .map_or_else(|_| PathBuf::from(CONFIG_FILE), PathBuf::from);
    if path.exists() {
        Ok((SimulationConfig::from_file(&path)?, true))
    } else {
        let mut config = SimulationConfig::default();
        config.storage.apply_env_overrides();
        config.validate()?;
        Ok((config, false))
    }
}
