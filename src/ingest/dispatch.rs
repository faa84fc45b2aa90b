//! Run orchestration: walk, classify, route, fan out, join.
//!
//! Routing is sequential and completes before any backend starts. Every
//! registered backend then runs on its own thread with the batch built for
//! it (possibly empty), and the run waits for all of them. A single backend
//! failure fails the run; no partial result is returned.

use crate::error::{Result, ScanError};
use crate::ingest::detect::{classify_file, Language};
use crate::ingest::registry::BackendRegistry;
use crate::ingest::walk::walk_files;
use crate::ingest::FileBatch;
use crate::record::FunctionRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

/// Outcome of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    /// Every regular file found, root-relative, in walk order.
    pub filenames: Vec<String>,
    /// Records from all backends.
    pub records: Vec<FunctionRecord>,
    /// Routing and extraction counters.
    pub stats: RunStats,
}

/// Routing and extraction counters for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Files with an unrecognized extension.
    pub unsupported_files: usize,
    /// Files whose language has no registered backend.
    pub unregistered_files: usize,
    /// Files routed to a backend, per language.
    pub files_by_language: BTreeMap<Language, usize>,
    /// Records produced, per language.
    pub records_by_language: BTreeMap<Language, usize>,
}

type BackendOutcome = (Language, Result<Vec<FunctionRecord>>);

/// Drives one run over a shared [`BackendRegistry`].
pub struct Orchestrator {
    registry: Arc<BackendRegistry>,
    backend_timeout: Option<Duration>,
}

impl Orchestrator {
    /// Create an orchestrator over `registry`.
    pub fn new(registry: Arc<BackendRegistry>) -> Self {
        Self {
            registry,
            backend_timeout: None,
        }
    }

    /// Fail the run if backends have not all settled within `timeout`.
    pub fn with_backend_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.backend_timeout = timeout;
        self
    }

    /// Scan `root`, naming files relative to `base_path`.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::Io` if `root` cannot be resolved,
    /// `ScanError::BackendFailed` if any backend fails, and
    /// `ScanError::BackendTimeout` if the deadline passes first.
    pub fn run(&self, root: &Path, base_path: &Path) -> Result<RunResult> {
        let root = root.canonicalize().map_err(|source| ScanError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        // A base that does not exist yet still names files relative to it.
        let base_path = base_path
            .canonicalize()
            .or_else(|_| std::path::absolute(base_path))
            .unwrap_or_else(|_| base_path.to_path_buf());

        let mut result = RunResult::default();
        let batches = self.route(&root, &base_path, &mut result);

        let mut outcomes = self.fan_out(batches)?;

        // Fan-in: deterministic, first failing language wins.
        for language in self.registry.languages() {
            let records = match outcomes.remove(&language) {
                Some(Ok(records)) => records,
                Some(Err(source)) => {
                    return Err(ScanError::BackendFailed {
                        language,
                        source: Box::new(source),
                    })
                }
                None => {
                    return Err(ScanError::BackendFailed {
                        language,
                        source: Box::new(ScanError::Other(
                            "backend exited without reporting".to_string(),
                        )),
                    })
                }
            };
            if !records.is_empty() {
                result.stats.records_by_language.insert(language, records.len());
            }
            result.records.extend(records);
        }

        log::info!(
            "scanned {} files under {}: {} functions",
            result.filenames.len(),
            root.display(),
            result.records.len()
        );

        Ok(result)
    }

    /// Walk and classify, queueing supported files per language.
    fn route(
        &self,
        root: &Path,
        base_path: &Path,
        result: &mut RunResult,
    ) -> BTreeMap<Language, FileBatch> {
        let mut batches: BTreeMap<Language, FileBatch> = BTreeMap::new();

        for path in walk_files(root) {
            let (relative_name, language) = classify_file(&path, base_path);
            result.filenames.push(relative_name.clone());

            let Some(language) = language else {
                log::debug!("unsupported language, skipping {}", relative_name);
                result.stats.unsupported_files += 1;
                continue;
            };

            if self.registry.get(language).is_none() {
                log::debug!(
                    "no backend registered for {} (configuration gap), skipping {}",
                    language,
                    relative_name
                );
                result.stats.unregistered_files += 1;
                continue;
            }

            batches
                .entry(language)
                .or_insert_with(|| FileBatch::new(language))
                .add_file(relative_name, path);
            *result.stats.files_by_language.entry(language).or_default() += 1;
        }

        batches
    }

    /// Start every registered backend and collect what each reports.
    fn fan_out(
        &self,
        mut batches: BTreeMap<Language, FileBatch>,
    ) -> Result<BTreeMap<Language, Result<Vec<FunctionRecord>>>> {
        let (sender, receiver) = mpsc::channel::<BackendOutcome>();
        let mut handles = Vec::new();

        for (language, backend) in self.registry.iter() {
            let batch = batches
                .remove(&language)
                .unwrap_or_else(|| FileBatch::new(language));
            let backend = Arc::clone(backend);
            let sender = sender.clone();

            let handle = thread::Builder::new()
                .name(format!("fnscan-{}", language))
                .spawn(move || {
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| backend.parse(batch)))
                        .unwrap_or_else(|payload| Err(ScanError::Other(panic_message(&*payload))));
                    // The receiver is gone only after a timeout; nothing to report to.
                    let _ = sender.send((language, outcome));
                })
                .map_err(|source| ScanError::Io {
                    path: PathBuf::from(format!("<{} backend thread>", language)),
                    source,
                })?;
            handles.push(handle);
        }
        drop(sender);

        let expected = handles.len();
        let deadline = self.backend_timeout.map(|timeout| (Instant::now() + timeout, timeout));
        let mut outcomes = BTreeMap::new();

        while outcomes.len() < expected {
            let received = match deadline {
                Some((deadline, timeout)) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match receiver.recv_timeout(remaining) {
                        Ok(outcome) => outcome,
                        Err(mpsc::RecvTimeoutError::Timeout) => {
                            let pending = self
                                .registry
                                .languages()
                                .filter(|language| !outcomes.contains_key(language))
                                .collect();
                            return Err(ScanError::BackendTimeout {
                                languages: pending,
                                timeout,
                            });
                        }
                        Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match receiver.recv() {
                    Ok(outcome) => outcome,
                    Err(_) => break,
                },
            };
            let (language, outcome) = received;
            outcomes.insert(language, outcome);
        }

        // Every backend has reported (or died); reap the threads.
        for handle in handles {
            let _ = handle.join();
        }

        Ok(outcomes)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("backend panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("backend panicked: {}", message)
    } else {
        "backend panicked".to_string()
    }
}
