use crate::dom_tree::{DomTree, NodeId, collapse_whitespace, is_block_tag};
use crate::parse::Document;

/// Elements whose text is never rendered on screen
const NON_RENDERED: &[&str] = &["script", "style", "noscript", "template", "head", "title"];

/// Approximate the rendered inner text of a page's `<body>`.
///
/// Markup is dropped entirely; block elements start new lines and at most one
/// blank line separates blocks. Used as the last-resort fallback, so it works
/// on a read-only copy and never fails: a page without a body yields the text
/// of the whole document, and an empty page yields an empty string.
///
/// # Example
///
/// ```rust
/// use contextprompt_core::{Document, formatters::text::inner_text};
///
/// let doc = Document::parse("<body><h1>Title</h1><p>First   line<br>second</p></body>").unwrap();
/// assert_eq!(inner_text(&doc), "Title\n\nFirst line\nsecond");
/// ```
pub fn inner_text(doc: &Document) -> String {
    let tree = DomTree::from_document(doc);
    let node = tree.body().unwrap_or_else(|| tree.root());
    node_text(&tree, node)
}

/// Rendered-text approximation of a subtree.
pub fn node_text(tree: &DomTree, id: NodeId) -> String {
    let mut raw = String::new();
    write_text(tree, id, &mut raw);
    normalize_lines(&raw)
}

enum TextStep {
    Enter(NodeId),
    BlockEnd,
}

fn write_text(tree: &DomTree, id: NodeId, out: &mut String) {
    let mut stack = vec![TextStep::Enter(id)];

    while let Some(step) = stack.pop() {
        let id = match step {
            TextStep::Enter(id) => id,
            TextStep::BlockEnd => {
                out.push_str("\n\n");
                continue;
            }
        };

        match tree.tag_name(id) {
            None => {
                if let Some(text) = tree.text(id) {
                    out.push_str(&collapse_whitespace(text));
                }
            }
            Some(tag) if NON_RENDERED.contains(&tag) => {}
            Some("br") => out.push('\n'),
            Some(tag) => {
                if is_block_tag(tag) {
                    out.push_str("\n\n");
                    stack.push(TextStep::BlockEnd);
                }
                stack.extend(tree.children(id).iter().rev().map(|child| TextStep::Enter(*child)));
            }
        }
    }
}

/// Trim every line and keep at most one blank line between runs of text
fn normalize_lines(raw: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in raw.lines().map(str::trim) {
        if line.is_empty() && lines.last().is_none_or(|last| last.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    lines.join("\n").trim().to_string()
}
