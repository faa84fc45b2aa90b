//! fnscan CLI binary
//!
//! This is the main entry point for the fnscan command-line interface.
//! The CLI is a thin adapter over existing APIs - NO logic is implemented here.

use fnscan::cli::{CliErrorPayload, Commands, ScanArgs};
use fnscan::ingest::detect::Language;
use fnscan::ingest::registry::BackendRegistry;
use fnscan::{Orchestrator, ScanConfig, ScanError};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = fnscan::cli::parse_args();

    // Initialize logger if verbose; RUST_LOG still wins when set
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
            .init();
    } else {
        env_logger::init();
    }

    // Execute command
    let result = match cli.command {
        Commands::Scan(args) => execute_scan(&args),
        Commands::Languages => execute_languages(),
    };

    // Handle result
    match result {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            let payload = CliErrorPayload::from_error(&e);
            match serde_json::to_string(&payload) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("Error: {}", e),
            }
            ExitCode::from(1)
        }
    }
}

/// Execute the scan command.
///
/// Builds the registry once from the effective configuration, runs the
/// orchestrator and renders the result as pretty JSON.
fn execute_scan(args: &ScanArgs) -> Result<String, ScanError> {
    let config = args.load_config()?;
    let registry = Arc::new(BackendRegistry::with_defaults(&config));

    let result = Orchestrator::new(registry)
        .with_backend_timeout(config.backend_timeout())
        .run(&args.root, &args.base_path())?;

    Ok(serde_json::to_string_pretty(&result)?)
}

/// Execute the languages command.
fn execute_languages() -> Result<String, ScanError> {
    let registry = BackendRegistry::with_defaults(&ScanConfig::default());

    let lines: Vec<String> = Language::ALL
        .iter()
        .map(|language| {
            let family = registry
                .get(*language)
                .map(|backend| backend.family().as_str())
                .unwrap_or("none");
            format!(
                "{:<12} {:<14} {}",
                language.as_str(),
                family,
                language.extensions().join(", ")
            )
        })
        .collect();

    Ok(lines.join("\n"))
}
