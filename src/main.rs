use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use scacchi_engine::eval::PARAMS_FILE;
use scacchi_engine::Parameters;

fn main() -> Result<()> {
    // All diagnostics go to an append-only log file; stdout belongs to
    // the controller protocol.
    let log_name = format!("scacchi-{}.log", chrono::Local::now().format("%Y%m%dT%H%M%S"));
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_name)
        .with_context(|| format!("opening log file {log_name}"))?;
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file))
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "scacchi starting");

    // Evaluation parameters load once, before any search runs.
    match Parameters::load(Path::new(PARAMS_FILE))? {
        Some(tunables) => {
            Parameters::install(tunables);
            info!(file = PARAMS_FILE, "evaluation parameters loaded");
        }
        None => info!("no parameter file, using built-in defaults"),
    }

    scacchi_cecp::run()
}
