//! Language detection from file extensions.
//!
//! Table-driven language detection. No heuristics, no guessing.
//! Unknown extensions return None, never infer from content.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::path::{Component, Path};

/// Language tags understood by fnscan.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Rust (.rs)
    Rust,
    /// Python (.py, .pyw, .pyi)
    Python,
    /// JavaScript (.js, .mjs, .cjs, .jsx)
    JavaScript,
    /// TypeScript (.ts, .mts, .cts, .tsx)
    TypeScript,
    /// C (.c, .h)
    C,
    /// C++ (.cpp, .cc, .cxx, .c++, .hpp, .hh, .hxx)
    Cpp,
    /// Java (.java)
    Java,
    /// C# (.cs)
    CSharp,
}

impl Language {
    /// Every language tag, in registry order.
    pub const ALL: [Language; 8] = [
        Language::Rust,
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::C,
        Language::Cpp,
        Language::Java,
        Language::CSharp,
    ];

    /// Convert language to string identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::CSharp => "csharp",
        }
    }

    /// Extensions (lowercase, without dot) mapped to this language.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Rust => &["rs"],
            Language::Python => &["py", "pyw", "pyi"],
            Language::JavaScript => &["js", "mjs", "cjs", "jsx"],
            Language::TypeScript => &["ts", "mts", "cts", "tsx"],
            Language::C => &["c", "h"],
            Language::Cpp => &["cpp", "cc", "cxx", "c++", "hpp", "hh", "hxx"],
            Language::Java => &["java"],
            Language::CSharp => &["cs"],
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect programming language from file path.
///
/// Uses table-driven extension mapping, compared case-insensitively.
/// Returns None for unknown extensions. Never guesses or infers from file
/// content.
///
/// # Examples
///
/// ```
/// # use fnscan::ingest::detect::{detect_language, Language};
/// # use std::path::Path;
/// assert_eq!(detect_language(Path::new("main.rs")), Some(Language::Rust));
/// assert_eq!(detect_language(Path::new("Script.PY")), Some(Language::Python));
/// assert_eq!(detect_language(Path::new("file.txt")), None);
/// ```
pub fn detect_language(path: &Path) -> Option<Language> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();

    Language::ALL
        .into_iter()
        .find(|language| language.extensions().contains(&extension.as_str()))
}

/// Classify a scanned file.
///
/// Returns the file name relative to `base_path`, always prefixed with `./`
/// and using `/` separators, together with its language tag (None when the
/// extension is not recognized). A file outside `base_path` is reached with
/// `..` segments. Never fails.
///
/// ```
/// # use fnscan::ingest::detect::{classify_file, Language};
/// # use std::path::Path;
/// let (name, language) = classify_file(Path::new("/repo/src/a.js"), Path::new("/repo"));
/// assert_eq!(name, "./src/a.js");
/// assert_eq!(language, Some(Language::JavaScript));
///
/// let (name, _) = classify_file(Path::new("/work/root/a.py"), Path::new("/work/other"));
/// assert_eq!(name, "./../root/a.py");
/// ```
pub fn classify_file(path: &Path, base_path: &Path) -> (String, Option<Language>) {
    (relative_name(path, base_path), detect_language(path))
}

fn relative_name(path: &Path, base_path: &Path) -> String {
    let path_parts: Vec<_> = path
        .components()
        .filter(|c| *c != Component::CurDir)
        .collect();
    let base_parts: Vec<_> = base_path
        .components()
        .filter(|c| *c != Component::CurDir)
        .collect();

    let shared = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    // No common root (another drive, or absolute against relative): the
    // path's own components are all there is to go on.
    let (ups, rest) = if shared == 0 && (path.has_root() || base_path.has_root()) {
        (0, &path_parts[..])
    } else {
        (base_parts.len() - shared, &path_parts[shared..])
    };

    let segments: Vec<Cow<'_, str>> = std::iter::repeat(Cow::Borrowed(".."))
        .take(ups)
        .chain(rest.iter().filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy()),
            Component::ParentDir => Some(Cow::Borrowed("..")),
            _ => None,
        }))
        .collect();

    format!("./{}", segments.join("/"))
}
