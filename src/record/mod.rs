//! Canonical function records.
//!
//! Every backend, whatever its parsing strategy, reduces a discovered
//! function to an [`ExtractedFunction`] and hands it to
//! [`ExtractedFunction::into_record`], which applies the minimum-size filter
//! and stamps the file name and language. Records are never mutated after
//! that point.

pub mod fingerprint;

pub use fingerprint::{FingerprintPolicy, Fingerprinter};

use crate::ingest::detect::Language;
use serde::{Deserialize, Serialize};

/// One discovered function or method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionRecord {
    /// Path relative to the scan root, always starting with `./`.
    pub file_name: String,

    /// Language of the backend that produced this record.
    pub language: Language,

    /// Source-level identifier of the function.
    pub name: String,

    /// First line of the function (1-based, inclusive).
    pub start_line: usize,

    /// Last line of the function (1-based, inclusive).
    pub end_line: usize,

    /// Lowercase hex SHA-256 of the function's normalized token stream.
    pub fingerprint: String,
}

impl FunctionRecord {
    /// Number of source lines the function spans.
    pub fn line_count(&self) -> usize {
        self.end_line + 1 - self.start_line
    }
}

/// Backend-neutral description of a function before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFunction {
    /// Source-level identifier.
    pub name: String,

    /// Start line (1-based).
    pub start_line: usize,

    /// End line (1-based, inclusive).
    pub end_line: usize,

    /// Characters of source text covered by the function.
    pub char_count: usize,

    /// Content fingerprint.
    pub fingerprint: String,
}

impl ExtractedFunction {
    /// Number of source lines the function spans.
    pub fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    /// Turn this function into a record, or drop it if it is below `threshold`.
    pub fn into_record(
        self,
        file_name: &str,
        language: Language,
        threshold: &SizeThreshold,
    ) -> Option<FunctionRecord> {
        if !threshold.admits(self.line_count(), self.char_count) {
            log::trace!(
                "dropping {}:{} ({} lines, {} chars) below size threshold",
                file_name,
                self.name,
                self.line_count(),
                self.char_count
            );
            return None;
        }

        Some(FunctionRecord {
            file_name: file_name.to_string(),
            language,
            name: self.name,
            start_line: self.start_line,
            end_line: self.end_line,
            fingerprint: self.fingerprint,
        })
    }
}

/// Minimum function size below which no record is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeThreshold {
    /// Minimum number of lines (inclusive).
    pub min_lines: usize,
    /// Minimum number of characters (inclusive).
    pub min_chars: usize,
}

impl Default for SizeThreshold {
    fn default() -> Self {
        Self {
            min_lines: 1,
            min_chars: 0,
        }
    }
}

impl SizeThreshold {
    /// Whether a function of this size yields a record.
    pub fn admits(&self, lines: usize, chars: usize) -> bool {
        lines >= self.min_lines && chars >= self.min_chars
    }
}
