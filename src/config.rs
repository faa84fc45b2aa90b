//! Scan configuration.
//!
//! Loaded from an optional JSON file, then overridden by CLI flags.
//! Every field has a default, so `{}` is a valid configuration file.

use crate::error::{Result, ScanError};
use crate::ingest::ExtractOptions;
use crate::record::{FingerprintPolicy, SizeThreshold};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Program invoked by external-tool-driven backends when none is configured.
pub const DEFAULT_TOOL_PROGRAM: &str = "fnscan-normalize";

/// Top-level configuration for a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Functions spanning fewer lines produce no record.
    pub min_lines: usize,

    /// Functions with fewer characters produce no record.
    pub min_chars: usize,

    /// Hash identifiers as a placeholder so renames keep the fingerprint.
    pub abstract_identifiers: bool,

    /// Source-to-tree converter used for C, C++, Java and C#.
    pub external_tool: ExternalToolConfig,

    /// Deadline for all backends of one run, in seconds.
    pub backend_timeout_secs: Option<u64>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let threshold = SizeThreshold::default();
        Self {
            min_lines: threshold.min_lines,
            min_chars: threshold.min_chars,
            abstract_identifiers: false,
            external_tool: ExternalToolConfig::default(),
            backend_timeout_secs: None,
        }
    }
}

/// External normalization tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExternalToolConfig {
    /// Program name (resolved on PATH) or path.
    pub program: String,

    /// Arguments placed before `--language <discriminator>`.
    pub args: Vec<String>,
}

impl Default for ExternalToolConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_TOOL_PROGRAM.to_string(),
            args: Vec::new(),
        }
    }
}

impl ScanConfig {
    /// Load and validate a configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ScanConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot describe a meaningful scan.
    pub fn validate(&self) -> Result<()> {
        if self.min_lines == 0 {
            return Err(ScanError::Config(
                "min_lines must be at least 1".to_string(),
            ));
        }
        if self.external_tool.program.trim().is_empty() {
            return Err(ScanError::Config(
                "external_tool.program must not be empty".to_string(),
            ));
        }
        if self.backend_timeout_secs == Some(0) {
            return Err(ScanError::Config(
                "backend_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Size threshold shared by every backend.
    pub fn threshold(&self) -> SizeThreshold {
        SizeThreshold {
            min_lines: self.min_lines,
            min_chars: self.min_chars,
        }
    }

    /// Token normalization policy.
    pub fn fingerprint_policy(&self) -> FingerprintPolicy {
        FingerprintPolicy {
            abstract_identifiers: self.abstract_identifiers,
        }
    }

    /// Options handed to every backend at construction.
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            threshold: self.threshold(),
            policy: self.fingerprint_policy(),
        }
    }

    /// Run deadline, if configured.
    pub fn backend_timeout(&self) -> Option<Duration> {
        self.backend_timeout_secs.map(Duration::from_secs)
    }
}
