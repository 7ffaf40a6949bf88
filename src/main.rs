//! Riposte - headless arena for the combat core
//!
//! Stages a scripted fight from the arena settings, runs it to completion and
//! prints the final report as JSON.
//!
//! Usage: `riposte [arena.toml]`, or `riposte --init` to write the default
//! settings to the config directory.

mod arena;
mod settings;

use std::ffi::OsStr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::arena::Arena;
use crate::settings::ArenaSettings;

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Starting Riposte arena...");

    let arg = std::env::args_os().nth(1);
    if arg.as_deref() == Some(OsStr::new("--init")) {
        return ArenaSettings::default().save();
    }

    let settings = match arg.map(PathBuf::from) {
        Some(path) => ArenaSettings::load_from(&path),
        None => ArenaSettings::load(),
    };
    let config = settings.combat_config();
    config.validate().context("Invalid combat config")?;

    let mut arena = Arena::new(&settings, config);
    let report = arena.run(settings.run.frames, settings.run.frame_time());
    info!(
        "{} hits, {} kills, {} props broken, {} pickups collected",
        report.hits, report.kills, report.props_broken, report.pickups_collected
    );

    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}
