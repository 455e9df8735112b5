//! # Ledge
//!
//! Headless runner for the Ledge platformer physics.
//!
//! Loads `ledge.toml` (or the file given as the first argument), builds a
//! world from a level file or a generated cave, and plays a scripted input
//! track through it at a fixed tick rate. `ledge --write-config` writes the
//! default configuration and exits.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod timing;

#[cfg(test)]
mod e2e_tests;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::EngineConfig;

/// Main entry point.
fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(flag) if flag == "--write-config" => {
            EngineConfig::default().save_to(config::CONFIG_FILE)?;
            println!("Wrote default configuration to {}", config::CONFIG_FILE);
            return Ok(());
        },
        Some(path) => EngineConfig::load_from(path),
        None => EngineConfig::load(),
    };

    let filter = EnvFilter::from_default_env().add_directive("ledge=info".parse()?);
    if config.log_json {
        tracing_subscriber::registry().with(fmt::layer().json()).with(filter).init();
    } else {
        tracing_subscriber::registry().with(fmt::layer()).with(filter).init();
    }

    info!("Ledge starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded:");
    info!("  Tick rate: {} Hz", config.tick_rate);
    info!("  Ticks: {}", config.ticks);
    match &config.level {
        Some(path) => info!("  Level: {}", path.display()),
        None => info!("  Level: generated (seed {})", config.seed),
    }

    let summary = app::run(&config)?;
    if let (Some(position), Some(state)) = (summary.final_position, summary.final_state) {
        info!("Player finished at ({:.1}, {:.1}) in state {:?}", position.x, position.y, state);
    }

    info!("Ledge shutdown complete");
    Ok(())
}
