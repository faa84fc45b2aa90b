//! Command-line interface for fnscan.
//!
//! This module handles argument parsing and user interface only.
//! NO extraction logic is performed here.

use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

/// fnscan: polyglot function extraction and fingerprinting.
#[derive(Parser, Debug)]
#[command(name = "fnscan")]
#[command(author, version, about, long_about = None)]
#[command(subcommand_required = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available fnscan commands.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Extract function records from a source tree and print them as JSON.
    Scan(ScanArgs),

    /// List language tags, their extensions and backend families.
    Languages,
}

/// Arguments of `fnscan scan`.
#[derive(clap::Args, Debug, Default)]
pub struct ScanArgs {
    /// Directory to scan.
    pub root: PathBuf,

    /// Directory file names are made relative to (defaults to ROOT).
    #[arg(long, value_name = "PATH")]
    pub base: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Minimum function length in lines.
    #[arg(long, value_name = "N")]
    pub min_lines: Option<usize>,

    /// Minimum function length in characters.
    #[arg(long, value_name = "N")]
    pub min_chars: Option<usize>,

    /// Hash identifiers as placeholders so renames keep fingerprints.
    #[arg(long)]
    pub abstract_identifiers: bool,

    /// External source-to-tree converter program.
    #[arg(long, value_name = "PROGRAM")]
    pub tool: Option<String>,

    /// Fail if backends take longer than this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl ScanArgs {
    /// Build the effective configuration: file (or defaults), then flags.
    pub fn load_config(&self) -> Result<ScanConfig> {
        let mut config = match &self.config {
            Some(path) => ScanConfig::from_json_file(path)?,
            None => ScanConfig::default(),
        };

        if let Some(min_lines) = self.min_lines {
            config.min_lines = min_lines;
        }
        if let Some(min_chars) = self.min_chars {
            config.min_chars = min_chars;
        }
        if self.abstract_identifiers {
            config.abstract_identifiers = true;
        }
        if let Some(tool) = &self.tool {
            config.external_tool.program = tool.clone();
        }
        if let Some(timeout) = self.timeout {
            config.backend_timeout_secs = Some(timeout);
        }

        config.validate()?;
        Ok(config)
    }

    /// Directory file names are relative to.
    pub fn base_path(&self) -> PathBuf {
        self.base.clone().unwrap_or_else(|| self.root.clone())
    }
}

/// Parse command-line arguments.
///
/// This function is the entry point for CLI argument parsing.
/// It returns the parsed Cli struct or exits on error.
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// JSON error payload for CLI responses.
#[derive(Serialize)]
pub struct CliErrorPayload {
    /// Status indicator ("error").
    pub status: &'static str,
    /// Machine-readable error category.
    pub error_kind: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl CliErrorPayload {
    /// Construct a payload from a fnscan error.
    pub fn from_error(error: &ScanError) -> Self {
        let error_kind = match error {
            ScanError::Io { .. } => "io",
            ScanError::Parse { .. } => "parse",
            ScanError::Grammar { .. } => "grammar",
            ScanError::Utf8(_) => "utf8",
            ScanError::Json(_) => "json",
            ScanError::ToolNotFound { .. } => "tool_not_found",
            ScanError::ExternalTool { .. } => "external_tool",
            ScanError::BackendFailed { .. } => "backend_failed",
            ScanError::BackendTimeout { .. } => "backend_timeout",
            ScanError::Config(_) => "config",
            ScanError::Other(_) => "other",
        };
        Self {
            status: "error",
            error_kind,
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan_flags() {
        let cli = Cli::try_parse_from([
            "fnscan",
            "scan",
            "src",
            "--min-lines",
            "4",
            "--abstract-identifiers",
            "--tool",
            "srcml-json",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);

        let Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        let config = args.load_config().unwrap();
        assert_eq!(config.min_lines, 4);
        assert!(config.abstract_identifiers);
        assert_eq!(config.external_tool.program, "srcml-json");
        assert_eq!(args.base_path(), PathBuf::from("src"));
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = ScanArgs {
            root: PathBuf::from("."),
            min_lines: Some(0),
            ..ScanArgs::default()
        };
        assert!(matches!(args.load_config(), Err(ScanError::Config(_))));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["fnscan"]).is_err());
    }

    #[test]
    fn test_error_payload_kind() {
        let payload = CliErrorPayload::from_error(&ScanError::Config("bad".to_string()));
        assert_eq!(payload.error_kind, "config");
        assert_eq!(payload.status, "error");
    }
}
