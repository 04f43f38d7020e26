//! pandalhop - discover, submit and approve festival pandals from the terminal.
//!
//! A thin front end over `pandalhop-core`: every command builds the API client
//! from the user's config, runs one call, and prints the result.

mod commands;

use std::io;
use std::process::ExitCode;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pandalhop_core::config::Config;
use pandalhop_core::ApiError;

use commands::Command;

const USAGE: &str = "\
Usage: pandalhop <command> [args]

Account:
  login <email>               Log in (prompts for password)
  register <name> <email>     Create an account and log in
  logout                      Forget stored credentials
  status                      Show configuration and login state

Browse:
  pandals [lng lat radius]    Approved pandals, optionally near a point
  districts                   Districts with pandal counts
  food                        Food stops
  routes                      Curated routes
  route <id>                  Route detail with stops
  regions [country] [state]   Supported administrative regions

Contribute:
  pending                     Pandals awaiting approval
  create <file.json>          Submit a pandal described in a JSON file
  approve <id>                Vote to approve a pending pandal

Environment: PANDALHOP_API_URL, PANDALHOP_USE_MOCK_DATA, PANDALHOP_REFRESH_POLICY, RUST_LOG";

/// Initialize the tracing subscriber for logging
fn init_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let log_guard = init_tracing();
    let code = run_cli().await;
    // Flush buffered log lines before exiting
    drop(log_guard);
    code
}

async fn run_cli() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{}\n\n{}", message, USAGE);
            return ExitCode::from(2);
        }
    };

    if matches!(command, Command::Help) {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    let result = match Config::load() {
        Ok(config) => {
            info!(api = %config.api_base_url, mock = config.use_mock_data, "pandalhop starting");
            commands::run(command, config).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        // The caller's half of the refresh contract: an unrecoverable session
        // sends the user back to login.
        Err(e) if matches!(e.downcast_ref::<ApiError>(), Some(ApiError::AuthExpired)) => {
            eprintln!("Your session has expired. Run `pandalhop login <email>` to sign in again.");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
