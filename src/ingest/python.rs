//! Python-specific tree-sitter parsing logic.
//!
//! Every `function_definition` is a function: module-level functions,
//! methods, and functions nested inside other functions. Decorators are not
//! part of the span.

use crate::error::Result;
use crate::ingest::detect::Language;
use crate::ingest::grammar::{function_from_node, node_text, parse_source, walk_tree};
use crate::record::{ExtractedFunction, FingerprintPolicy};
use ropey::Rope;
use std::path::Path;

/// Extract functions from a Python source file.
pub fn extract_python_functions(
    path: &Path,
    source: &[u8],
    policy: FingerprintPolicy,
) -> Result<Vec<ExtractedFunction>> {
    let (tree, rope) = parse_source(
        path,
        source,
        Language::Python,
        &tree_sitter_python::language(),
    )?;

    let mut functions = Vec::new();
    collect_functions(tree.root_node(), source, &rope, policy, &mut functions);

    Ok(functions)
}

fn collect_functions(
    root: tree_sitter::Node,
    source: &[u8],
    rope: &Rope,
    policy: FingerprintPolicy,
    functions: &mut Vec<ExtractedFunction>,
) {
    walk_tree(root, |node| {
        if node.kind() == "function_definition" {
            if let Some(name) = node
                .child_by_field_name("name")
                .and_then(|name_node| node_text(name_node, source))
            {
                functions.push(function_from_node(node, name, source, rope, policy));
            }
        }
        true
    });
}
