//! Grammar-driven backends.
//!
//! Each supported language contributes one extraction function that parses
//! source text with its tree-sitter grammar and reports the functions it
//! finds. [`GrammarBackend`] wraps such a function into a [`Backend`].
//! The helpers here keep span, size and fingerprint computation identical
//! across languages.

use crate::error::{Result, ScanError};
use crate::ingest::detect::Language;
use crate::ingest::{extract_batch, Backend, BackendFamily, ExtractOptions, FileBatch};
use crate::record::{ExtractedFunction, FingerprintPolicy, Fingerprinter, FunctionRecord};
use ropey::Rope;
use std::path::Path;

/// Signature of a per-language extraction function.
pub type ExtractFn = fn(&Path, &[u8], FingerprintPolicy) -> Result<Vec<ExtractedFunction>>;

/// Node kinds hashed as a single token instead of being descended into.
const ATOMIC_KINDS: &[&str] = &[
    "string",
    "string_literal",
    "raw_string_literal",
    "char_literal",
    "template_string",
    "regex",
];

/// Backend that parses files directly with a tree-sitter grammar.
pub struct GrammarBackend {
    language: Language,
    options: ExtractOptions,
    extract: ExtractFn,
}

impl GrammarBackend {
    /// Wrap an extraction function.
    pub fn new(language: Language, options: ExtractOptions, extract: ExtractFn) -> Self {
        Self {
            language,
            options,
            extract,
        }
    }

    /// Built-in grammar backend for `language`, if fnscan ships one.
    pub fn for_language(language: Language, options: ExtractOptions) -> Option<Self> {
        let extract: ExtractFn = match language {
            Language::Rust => crate::ingest::rust::extract_rust_functions,
            Language::Python => crate::ingest::python::extract_python_functions,
            Language::JavaScript => crate::ingest::javascript::extract_javascript_functions,
            Language::TypeScript => crate::ingest::typescript::extract_typescript_functions,
            _ => return None,
        };
        Some(Self::new(language, options, extract))
    }
}

impl Backend for GrammarBackend {
    fn language(&self) -> Language {
        self.language
    }

    fn family(&self) -> BackendFamily {
        BackendFamily::Grammar
    }

    fn parse(&self, batch: FileBatch) -> Result<Vec<FunctionRecord>> {
        let policy = self.options.policy;
        extract_batch(batch, &self.options, |file, source| {
            (self.extract)(&file.path, source, policy)
        })
    }
}

/// Parse `source` with `grammar`.
///
/// A grammar that cannot be loaded is a backend-level failure; a file that
/// is not valid UTF-8 or contains syntax errors is a per-file failure.
pub(crate) fn parse_source(
    path: &Path,
    source: &[u8],
    language: Language,
    grammar: &tree_sitter::Language,
) -> Result<(tree_sitter::Tree, Rope)> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(grammar)
        .map_err(|e| ScanError::Grammar {
            language,
            message: format!("{:?}", e),
        })?;

    let text = std::str::from_utf8(source)?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ScanError::Parse {
            file: path.to_path_buf(),
            message: "Parse failed - no tree returned".to_string(),
        })?;

    if tree.root_node().has_error() {
        return Err(ScanError::Parse {
            file: path.to_path_buf(),
            message: format!("{} syntax errors in file", language),
        });
    }

    Ok((tree, Rope::from_str(text)))
}

/// UTF-8 text of a node.
pub(crate) fn node_text(node: tree_sitter::Node, source: &[u8]) -> Option<String> {
    node.utf8_text(source).ok().map(str::to_string)
}

/// Build the backend-neutral description of a function node.
pub(crate) fn function_from_node(
    node: tree_sitter::Node,
    name: String,
    source: &[u8],
    rope: &Rope,
    policy: FingerprintPolicy,
) -> ExtractedFunction {
    let byte_start = node.start_byte();
    let byte_end = node.end_byte();

    // Last line is the line of the last byte, not of the position after it.
    let last_byte = byte_end.saturating_sub(1).max(byte_start);
    let start_line = rope.byte_to_line(byte_start);
    let end_line = rope.byte_to_line(last_byte);

    let char_count = rope.byte_to_char(byte_end) - rope.byte_to_char(byte_start);

    let mut fingerprinter = Fingerprinter::new(policy);
    feed_tokens(node, source, &mut fingerprinter);

    ExtractedFunction {
        name,
        start_line: start_line + 1,
        end_line: end_line + 1,
        char_count,
        fingerprint: fingerprinter.finish(),
    }
}

fn is_comment(kind: &str) -> bool {
    kind == "comment" || kind.ends_with("_comment")
}

/// Feed the leaf tokens below `node` in source order.
fn feed_tokens(node: tree_sitter::Node, source: &[u8], fingerprinter: &mut Fingerprinter) {
    walk_tree(node, |node| {
        let kind = node.kind();
        if is_comment(kind) {
            return false;
        }

        if node.child_count() == 0 || ATOMIC_KINDS.contains(&kind) {
            let text = node.utf8_text(source).unwrap_or_default();
            if node.is_named() && kind.ends_with("identifier") {
                fingerprinter.push_identifier(text);
            } else {
                fingerprinter.push_token(text);
            }
            return false;
        }

        true
    });
}

/// Visit `root` and every node below it in source order.
///
/// `visit` returns whether to descend into the node it was handed. Walks
/// with a cursor, so nesting depth is bounded by the heap, not the stack.
pub(crate) fn walk_tree<'tree>(
    root: tree_sitter::Node<'tree>,
    mut visit: impl FnMut(tree_sitter::Node<'tree>) -> bool,
) {
    let mut cursor = root.walk();
    let mut descend = visit(cursor.node());

    loop {
        if descend && cursor.goto_first_child() {
            descend = visit(cursor.node());
            continue;
        }

        // Climb until a sibling is found; the cursor never leaves `root`.
        loop {
            if cursor.goto_next_sibling() {
                descend = visit(cursor.node());
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python_functions(source: &str, policy: FingerprintPolicy) -> Vec<ExtractedFunction> {
        crate::ingest::python::extract_python_functions(
            Path::new("t.py"),
            source.as_bytes(),
            policy,
        )
        .unwrap()
    }

    #[test]
    fn test_fingerprint_ignores_layout_and_comments() {
        let compact = python_functions("def f(a):\n    return a + 1\n", FingerprintPolicy::default());
        let spaced = python_functions(
            "def f( a ):\n    # add one\n    return   a+1\n",
            FingerprintPolicy::default(),
        );
        assert_eq!(compact[0].fingerprint, spaced[0].fingerprint);
    }

    #[test]
    fn test_fingerprint_tracks_token_changes() {
        let a = python_functions("def f(a):\n    return a + 1\n", FingerprintPolicy::default());
        let b = python_functions("def f(a):\n    return a + 2\n", FingerprintPolicy::default());
        assert_ne!(a[0].fingerprint, b[0].fingerprint);
    }

    #[test]
    fn test_abstract_identifiers_policy() {
        let policy = FingerprintPolicy {
            abstract_identifiers: true,
        };
        let a = python_functions("def f(a):\n    return a + 1\n", policy);
        let b = python_functions("def g(x):\n    return x + 1\n", policy);
        assert_eq!(a[0].fingerprint, b[0].fingerprint);
        assert_ne!(a[0].name, b[0].name);
    }

    #[test]
    fn test_span_excludes_trailing_newline() {
        let functions = python_functions(
            "def f():\n    x = 1\n    return x\n\n\nprint(1)\n",
            FingerprintPolicy::default(),
        );
        assert_eq!(functions[0].start_line, 1);
        assert_eq!(functions[0].end_line, 3);
    }

    #[test]
    fn test_syntax_error_is_per_file() {
        let err = crate::ingest::python::extract_python_functions(
            Path::new("bad.py"),
            b"def broken(:\n    pass\n",
            FingerprintPolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ScanError::Parse { .. }));
        assert!(!err.is_backend_fatal());
    }

    #[test]
    fn test_invalid_utf8_is_per_file() {
        let err = crate::ingest::python::extract_python_functions(
            Path::new("bin.py"),
            &[0x64, 0x65, 0x66, 0xff, 0xfe],
            FingerprintPolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ScanError::Utf8(_)));
    }

    #[test]
    fn test_walk_tree_order_and_pruning() {
        let source = b"def f(a):\n    return a\n";
        let (tree, _) = parse_source(
            Path::new("t.py"),
            source,
            Language::Python,
            &tree_sitter_python::language(),
        )
        .unwrap();

        let mut kinds = Vec::new();
        walk_tree(tree.root_node(), |node| {
            kinds.push(node.kind());
            true
        });
        assert_eq!(kinds.first(), Some(&"module"));
        assert_eq!(kinds.iter().filter(|k| **k == "identifier").count(), 3);

        let mut identifiers = Vec::new();
        walk_tree(tree.root_node(), |node| {
            if node.kind() == "identifier" {
                identifiers.push(node.utf8_text(source).unwrap());
            }
            node.kind() != "parameters"
        });
        assert_eq!(identifiers, vec!["f", "a"]);
    }

    #[test]
    fn test_for_language_covers_grammar_languages() {
        let options = ExtractOptions::default();
        for language in [
            Language::Rust,
            Language::Python,
            Language::JavaScript,
            Language::TypeScript,
        ] {
            let backend = GrammarBackend::for_language(language, options).unwrap();
            assert_eq!(backend.language(), language);
            assert_eq!(backend.family(), BackendFamily::Grammar);
        }
        assert!(GrammarBackend::for_language(Language::Java, options).is_none());
    }
}
