//! JavaScript-specific tree-sitter parsing logic.
//!
//! Function nodes: declarations, generator declarations, function and
//! generator expressions, arrow functions and method definitions. A function
//! without its own name takes the name of the binding it is assigned to
//! (variable declarator, assignment target, object key, class field), and
//! [`ANONYMOUS`] otherwise.
//!
//! TypeScript shares these rules; see [`crate::ingest::typescript`].

use crate::error::Result;
use crate::ingest::detect::Language;
use crate::ingest::grammar::{function_from_node, node_text, parse_source, walk_tree};
use crate::record::{ExtractedFunction, FingerprintPolicy};
use ropey::Rope;
use std::path::Path;

/// Name given to functions with neither a name nor a binding.
pub const ANONYMOUS: &str = "<anonymous>";

const FUNCTION_KINDS: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "function_expression",
    "function",
    "generator_function",
    "arrow_function",
    "method_definition",
];

/// Extract functions from a JavaScript source file.
pub fn extract_javascript_functions(
    path: &Path,
    source: &[u8],
    policy: FingerprintPolicy,
) -> Result<Vec<ExtractedFunction>> {
    let (tree, rope) = parse_source(
        path,
        source,
        Language::JavaScript,
        &tree_sitter_javascript::language(),
    )?;

    let mut functions = Vec::new();
    collect_functions(tree.root_node(), source, &rope, policy, &mut functions);

    Ok(functions)
}

/// Collect function nodes below `root` in source order.
pub(crate) fn collect_functions(
    root: tree_sitter::Node,
    source: &[u8],
    rope: &Rope,
    policy: FingerprintPolicy,
    functions: &mut Vec<ExtractedFunction>,
) {
    walk_tree(root, |node| {
        // `function` is also the keyword token; only the named node is a function.
        if node.is_named() && FUNCTION_KINDS.contains(&node.kind()) {
            let name = own_name(node, source)
                .or_else(|| binding_name(node, source))
                .unwrap_or_else(|| ANONYMOUS.to_string());
            functions.push(function_from_node(node, name, source, rope, policy));
        }
        true
    });
}

fn own_name(node: tree_sitter::Node, source: &[u8]) -> Option<String> {
    node.child_by_field_name("name")
        .and_then(|name_node| key_text(name_node, source))
}

fn binding_name(node: tree_sitter::Node, source: &[u8]) -> Option<String> {
    let parent = node.parent()?;
    let target = match parent.kind() {
        "variable_declarator" => parent.child_by_field_name("name"),
        "assignment_expression" => parent.child_by_field_name("left"),
        "pair" => parent.child_by_field_name("key"),
        "field_definition" => parent.child_by_field_name("property"),
        "public_field_definition" => parent.child_by_field_name("name"),
        _ => None,
    }?;

    // Only when the function is the bound value, not part of the target.
    if target.id() == node.id() {
        return None;
    }
    key_text(target, source)
}

/// Text of a name or key node; quoted keys (`"handler": ...`) lose their quotes.
fn key_text(node: tree_sitter::Node, source: &[u8]) -> Option<String> {
    let text = node_text(node, source)?;
    if node.kind() == "string" {
        return Some(text.trim_matches(|c| c == '"' || c == '\'').to_string());
    }
    Some(text)
}
