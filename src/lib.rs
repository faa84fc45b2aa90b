//! fnscan: polyglot function extraction for code-search indexes.
//!
//! This library walks a source tree, routes every file to the backend for
//! its language and returns one fingerprinted record per function found.
//! Grammar-driven backends parse with tree-sitter; external-tool-driven
//! backends delegate to a source-to-tree converter. The orchestrator treats
//! both identically.

#![warn(missing_docs)]
// env_logger is used by src/main.rs (binary), not this library
#![expect(unused_crate_dependencies)]

pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod record;

/// Re-export common error types for convenience.
pub use error::{Result, ScanError};

pub use config::ScanConfig;
pub use ingest::dispatch::{Orchestrator, RunResult, RunStats};
pub use ingest::registry::BackendRegistry;
pub use record::FunctionRecord;

use std::path::Path;
use std::sync::Arc;

/// fnscan version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Scan `root` with the built-in backends, naming files relative to `base_path`.
///
/// Builds a fresh registry from `config`; callers running many scans should
/// build a [`BackendRegistry`] once and reuse an [`Orchestrator`].
pub fn scan(root: &Path, base_path: &Path, config: &ScanConfig) -> Result<RunResult> {
    config.validate()?;
    let registry = Arc::new(BackendRegistry::with_defaults(config));
    Orchestrator::new(registry)
        .with_backend_timeout(config.backend_timeout())
        .run(root, base_path)
}
