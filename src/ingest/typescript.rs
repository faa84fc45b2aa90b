//! TypeScript-specific tree-sitter parsing logic.
//!
//! Uses the JavaScript function rules on the TypeScript grammar. Signatures
//! without bodies (overloads, interface members, abstract methods) are
//! separate node kinds and never count as functions.
//!
//! Automatically detects file extension to use the correct parser:
//! - `.tsx` files use `language_tsx()`
//! - everything else uses `language_typescript()`

use crate::error::Result;
use crate::ingest::detect::Language;
use crate::ingest::grammar::parse_source;
use crate::ingest::javascript::collect_functions;
use crate::record::{ExtractedFunction, FingerprintPolicy};
use std::path::Path;

/// Extract functions from a TypeScript or TSX source file.
pub fn extract_typescript_functions(
    path: &Path,
    source: &[u8],
    policy: FingerprintPolicy,
) -> Result<Vec<ExtractedFunction>> {
    let is_tsx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("tsx"));

    let grammar = if is_tsx {
        tree_sitter_typescript::language_tsx()
    } else {
        tree_sitter_typescript::language_typescript()
    };

    let (tree, rope) = parse_source(path, source, Language::TypeScript, &grammar)?;

    let mut functions = Vec::new();
    collect_functions(tree.root_node(), source, &rope, policy, &mut functions);

    Ok(functions)
}
