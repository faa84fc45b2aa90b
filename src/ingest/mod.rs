//! Filesystem → backend → function record pipeline.
//!
//! A run walks the tree ([`walk`]), classifies each file ([`detect`]),
//! queues supported files into one [`FileBatch`] per language and hands each
//! batch to the backend registered for that language ([`registry`]). The
//! orchestrator in [`dispatch`] runs all backends concurrently and joins them.
//!
//! Two backend families implement [`Backend`]:
//! - [`grammar::GrammarBackend`] parses source text with a tree-sitter grammar.
//! - [`external::ExternalToolBackend`] delegates to an external
//!   source-to-tree converter and walks the tree it returns.

pub mod detect;
pub mod dispatch;
pub mod external;
pub mod grammar;
pub mod javascript;
pub mod python;
pub mod registry;
pub mod rust;
pub mod typescript;
pub mod walk;

use crate::error::{Result, ScanError};
use crate::record::{ExtractedFunction, FingerprintPolicy, FunctionRecord, SizeThreshold};
use detect::Language;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::PathBuf;

/// Implementation strategy of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendFamily {
    /// Parses source text with a language grammar.
    Grammar,
    /// Delegates to an external source-to-tree normalization tool.
    ExternalTool,
}

impl BackendFamily {
    /// Convert to string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendFamily::Grammar => "grammar",
            BackendFamily::ExternalTool => "external-tool",
        }
    }
}

/// Language-specific function extractor.
///
/// Backends are shared across runs and across threads. All per-run input
/// arrives through the [`FileBatch`] passed to [`Backend::parse`], which the
/// backend consumes, so nothing queued for one run can leak into the next.
pub trait Backend: Send + Sync {
    /// Language this instance extracts.
    fn language(&self) -> Language;

    /// Implementation strategy.
    fn family(&self) -> BackendFamily;

    /// Extract functions from every file in `batch`.
    ///
    /// A file that cannot be read or parsed contributes no records; the
    /// remaining files are still processed. An `Err` means the backend as a
    /// whole could not do its job and aborts the run.
    fn parse(&self, batch: FileBatch) -> Result<Vec<FunctionRecord>>;
}

/// Settings every backend applies identically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Minimum function size.
    pub threshold: SizeThreshold,
    /// Token normalization before hashing.
    pub policy: FingerprintPolicy,
}

/// A file waiting for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedFile {
    /// Name relative to the base path (`./dir/file.ext`, `./../sibling/file.ext`).
    pub relative_name: String,
    /// Location on disk, as found by the walk.
    pub path: PathBuf,
}

/// Ordered set of files queued for one backend.
#[derive(Debug, Clone)]
pub struct FileBatch {
    language: Language,
    files: Vec<QueuedFile>,
    seen: HashSet<String>,
}

impl FileBatch {
    /// Create an empty batch for `language`.
    pub fn new(language: Language) -> Self {
        Self {
            language,
            files: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Queue the file at `path` under `relative_name`.
    ///
    /// Performs no I/O; a name already queued is ignored.
    pub fn add_file(&mut self, relative_name: impl Into<String>, path: impl Into<PathBuf>) {
        let relative_name = relative_name.into();
        if self.seen.insert(relative_name.clone()) {
            self.files.push(QueuedFile {
                relative_name,
                path: path.into(),
            });
        }
    }

    /// Language of the queued files.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Queued files in insertion order.
    pub fn files(&self) -> &[QueuedFile] {
        &self.files
    }

    /// Number of queued files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Consume the batch.
    pub fn into_files(self) -> Vec<QueuedFile> {
        self.files
    }
}

/// Read a queued file's bytes.
pub fn read_source(file: &QueuedFile) -> Result<Vec<u8>> {
    std::fs::read(&file.path).map_err(|source| ScanError::Io {
        path: file.path.clone(),
        source,
    })
}

/// Run `extract` over every file of `batch` and assemble records.
///
/// Files are extracted in parallel; results are reassembled in queue order so
/// the output only depends on the batch and file contents. Per-file errors
/// are logged and skipped, backend-fatal errors abort the batch.
pub(crate) fn extract_batch<F>(
    batch: FileBatch,
    options: &ExtractOptions,
    extract: F,
) -> Result<Vec<FunctionRecord>>
where
    F: Fn(&QueuedFile, &[u8]) -> Result<Vec<ExtractedFunction>> + Sync,
{
    let language = batch.language();

    let outcomes: Vec<(QueuedFile, Result<Vec<ExtractedFunction>>)> = batch
        .into_files()
        .into_par_iter()
        .map(|file| {
            let outcome = read_source(&file).and_then(|source| extract(&file, &source));
            (file, outcome)
        })
        .collect();

    let mut records = Vec::new();
    for (file, outcome) in outcomes {
        match outcome {
            Ok(functions) => records.extend(functions.into_iter().filter_map(|function| {
                function.into_record(&file.relative_name, language, &options.threshold)
            })),
            Err(err) if err.is_backend_fatal() => return Err(err),
            Err(err) => {
                log::debug!(
                    "{} backend skipped {}: {}",
                    language,
                    file.relative_name,
                    err
                );
            }
        }
    }

    Ok(records)
}
