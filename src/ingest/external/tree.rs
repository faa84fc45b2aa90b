//! Language-agnostic exchange tree produced by the external converter.
//!
//! Only a handful of element tags carry meaning here; everything else is
//! walked generically:
//!
//! | tag | meaning |
//! |---|---|
//! | `function`, `constructor`, `destructor` | function boundary |
//! | `name` | identifier of the enclosing element |
//! | `block` | body |
//! | `comment` | ignored when fingerprinting |

use crate::ingest::javascript::ANONYMOUS;
use crate::record::{ExtractedFunction, FingerprintPolicy, Fingerprinter};
use serde::{Deserialize, Serialize};

/// Element tags that delimit a function.
pub const FUNCTION_TAGS: &[&str] = &["function", "constructor", "destructor"];

/// Element tag naming its parent.
pub const NAME_TAG: &str = "name";

/// Element tag of a function body.
pub const BLOCK_TAG: &str = "block";

/// Element tag skipped by fingerprints.
pub const COMMENT_TAG: &str = "comment";

/// One element of the exchange tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Element name.
    pub tag: String,

    /// Token text; only present on leaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// First source line (1-based).
    pub line: usize,

    /// Last source line (1-based); defaults to `line`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,

    /// Child elements in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create an interior element.
    pub fn element(tag: &str, line: usize, end_line: usize, children: Vec<TreeNode>) -> Self {
        Self {
            tag: tag.to_string(),
            text: None,
            line,
            end_line: Some(end_line),
            children,
        }
    }

    /// Create a leaf token.
    pub fn leaf(tag: &str, text: &str, line: usize) -> Self {
        Self {
            tag: tag.to_string(),
            text: Some(text.to_string()),
            line,
            end_line: None,
            children: Vec::new(),
        }
    }

    /// Last source line of the element.
    pub fn last_line(&self) -> usize {
        self.end_line.unwrap_or(self.line).max(self.line)
    }

    /// Whether this element delimits a function.
    pub fn is_function(&self) -> bool {
        FUNCTION_TAGS.contains(&self.tag.as_str())
    }

    /// Whether the element has a body; declarations without one are skipped.
    pub fn has_body(&self) -> bool {
        self.children.iter().any(|child| child.tag == BLOCK_TAG)
    }

    /// Concatenated leaf text, comments excluded.
    pub fn flat_text(&self) -> String {
        let mut text = String::new();
        self.append_text(&mut text);
        text
    }

    fn append_text(&self, out: &mut String) {
        if self.tag == COMMENT_TAG {
            return;
        }
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.append_text(out);
        }
    }

    /// Name of a function element: text of its first direct `name` child.
    pub fn function_name(&self) -> Option<String> {
        self.children
            .iter()
            .find(|child| child.tag == NAME_TAG)
            .map(TreeNode::flat_text)
            .filter(|name| !name.is_empty())
    }
}

/// Collect every function element below `root`, in document order.
///
/// `lines` are the source lines, used to measure each function's size.
pub fn collect_functions(
    root: &TreeNode,
    lines: &[&str],
    policy: FingerprintPolicy,
) -> Vec<ExtractedFunction> {
    let mut functions = Vec::new();
    visit(root, lines, policy, &mut functions);
    functions
}

fn visit(
    node: &TreeNode,
    lines: &[&str],
    policy: FingerprintPolicy,
    functions: &mut Vec<ExtractedFunction>,
) {
    if node.is_function() && node.has_body() {
        functions.push(describe(node, lines, policy));
    }
    for child in &node.children {
        visit(child, lines, policy, functions);
    }
}

fn describe(node: &TreeNode, lines: &[&str], policy: FingerprintPolicy) -> ExtractedFunction {
    let start_line = node.line.max(1);
    let end_line = node.last_line().max(start_line);

    let mut fingerprinter = Fingerprinter::new(policy);
    feed_tokens(node, false, &mut fingerprinter);

    ExtractedFunction {
        name: node.function_name().unwrap_or_else(|| ANONYMOUS.to_string()),
        start_line,
        end_line,
        char_count: span_chars(lines, start_line, end_line),
        fingerprint: fingerprinter.finish(),
    }
}

/// Characters on the spanned lines, outer whitespace trimmed.
fn span_chars(lines: &[&str], start_line: usize, end_line: usize) -> usize {
    let first = start_line - 1;
    if first >= lines.len() {
        return 0;
    }
    let last = end_line.min(lines.len());
    lines[first..last].join("\n").trim().chars().count()
}

fn feed_tokens(node: &TreeNode, in_name: bool, fingerprinter: &mut Fingerprinter) {
    if node.tag == COMMENT_TAG {
        return;
    }
    let in_name = in_name || node.tag == NAME_TAG;

    if let Some(text) = &node.text {
        let token = text.trim();
        if in_name {
            fingerprinter.push_identifier(token);
        } else {
            fingerprinter.push_token(token);
        }
    }
    for child in &node.children {
        feed_tokens(child, in_name, fingerprinter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(name: &str, body_token: &str, line: usize) -> TreeNode {
        TreeNode::element(
            "function",
            line,
            line + 2,
            vec![
                TreeNode::leaf("type", "int", line),
                TreeNode::element("name", line, line, vec![TreeNode::leaf("name", name, line)]),
                TreeNode::leaf("parameter_list", "()", line),
                TreeNode::element(
                    "block",
                    line,
                    line + 2,
                    vec![
                        TreeNode::leaf("operator", "{", line),
                        TreeNode::leaf("comment", "// note", line + 1),
                        TreeNode::leaf("return", body_token, line + 1),
                        TreeNode::leaf("operator", "}", line + 2),
                    ],
                ),
            ],
        )
    }

    #[test]
    fn test_collects_named_functions() {
        let unit = TreeNode::element(
            "unit",
            1,
            6,
            vec![method("first", "return 1;", 1), method("second", "return 2;", 4)],
        );
        let lines = vec!["int first() {", "  return 1;", "}", "int second() {", "  return 2;", "}"];

        let functions = collect_functions(&unit, &lines, FingerprintPolicy::default());
        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0].name, "first");
        assert_eq!((functions[0].start_line, functions[0].end_line), (1, 3));
        assert_eq!(functions[1].name, "second");
        assert_eq!(functions[0].char_count, "int first() {\n  return 1;\n}".len());
    }

    #[test]
    fn test_declarations_without_block_skipped() {
        let declaration = TreeNode::element(
            "function",
            1,
            1,
            vec![TreeNode::element("name", 1, 1, vec![TreeNode::leaf("name", "proto", 1)])],
        );
        let unit = TreeNode::element("unit", 1, 1, vec![declaration]);
        assert!(collect_functions(&unit, &["int proto();"], FingerprintPolicy::default()).is_empty());
    }

    #[test]
    fn test_comments_do_not_change_fingerprint() {
        let mut with_comment = method("f", "return 1;", 1);
        let plain = {
            let mut node = with_comment.clone();
            node.children[3].children.remove(1);
            node
        };
        let a = collect_functions(&plain, &[], FingerprintPolicy::default());
        let b = collect_functions(&with_comment, &[], FingerprintPolicy::default());
        assert_eq!(a[0].fingerprint, b[0].fingerprint);

        with_comment.children[3].children[2].text = Some("return 2;".to_string());
        let c = collect_functions(&with_comment, &[], FingerprintPolicy::default());
        assert_ne!(a[0].fingerprint, c[0].fingerprint);
    }

    #[test]
    fn test_abstracted_names() {
        let policy = FingerprintPolicy {
            abstract_identifiers: true,
        };
        let a = collect_functions(&method("alpha", "return 1;", 1), &[], policy);
        let b = collect_functions(&method("beta", "return 1;", 1), &[], policy);
        assert_eq!(a[0].fingerprint, b[0].fingerprint);
    }

    #[test]
    fn test_deserialize_defaults() {
        let node: TreeNode =
            serde_json::from_str(r#"{"tag": "unit", "line": 1}"#).unwrap();
        assert!(node.children.is_empty());
        assert_eq!(node.last_line(), 1);
    }

    #[test]
    fn test_unnamed_function() {
        let lambda = TreeNode::element(
            "function",
            2,
            2,
            vec![TreeNode::element("block", 2, 2, vec![TreeNode::leaf("op", "{}", 2)])],
        );
        let functions = collect_functions(&lambda, &["", "[] {}"], FingerprintPolicy::default());
        assert_eq!(functions[0].name, ANONYMOUS);
        assert_eq!(functions[0].char_count, 5);
    }
}
