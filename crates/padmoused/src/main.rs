mod api;
mod cli;
mod config;
mod daemon;
mod logging;
mod pointer;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use crossbeam_channel::bounded;

use crate::api::{default_runtime_dir, ApiTransport, UnixSocket};
use crate::cli::{Cli, Command};

fn run_daemon(config_path: Option<&Path>, stub: bool, runtime_dir: &Path) -> Result<(), String> {
    // Handle Ctrl+C to exit cleanly
    let (stop_tx, stop_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = stop_tx.try_send(());
    })
    .map_err(|e| format!("failed to set Ctrl+C handler: {e}"))?;

    let config = config::load_config(config_path).map_err(|e| e.to_string())?;
    daemon::run(&config, stub, runtime_dir, &stop_rx).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::setup(cli.verbose, cli.no_color) {
        print_error!("failed to set up logging: {e}");
        return ExitCode::FAILURE;
    }
    let runtime_dir = cli.runtime_dir.unwrap_or_else(default_runtime_dir);

    let result = match cli.command {
        Command::Run { config, stub } => run_daemon(config.as_deref(), stub, &runtime_dir),
        Command::Send { request } => UnixSocket::new(&runtime_dir)
            .send_event(request.to_command())
            .map_err(|e| e.to_string()),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error!("{e}");
            ExitCode::FAILURE
        }
    }
}
