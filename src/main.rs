//! Particle fountain viewer.
//!
//! Usage: `flurry [CONFIG.toml]`. Without an argument the built-in defaults
//! are used. Set `RUST_LOG` to change the log level.

use std::process::ExitCode;

use flurry::{FlurryConfig, Simulation, SimulationError};

fn run() -> Result<(), SimulationError> {
    let config = match std::env::args_os().nth(1) {
        Some(path) => FlurryConfig::load(path)?,
        None => FlurryConfig::default(),
    };
    Simulation::new().with_config(config).run()
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
