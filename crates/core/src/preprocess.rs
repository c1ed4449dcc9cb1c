use crate::dom_tree::{DomTree, NodeId, is_inline_tag};
use crate::parse::Document;
use crate::patterns::{HIDDEN_STYLE, POSITIVE_CANDIDATES, UNLIKELY_CANDIDATES};

use tracing::{debug, trace};

/// Tags that can never hold readable content.
pub const DENIED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "iframe", "frame", "frameset", "embed", "object", "applet", "video",
    "audio", "source", "track", "canvas", "svg", "math", "link", "meta",
];

/// Structural tags that the unlikely-candidate pass never removes.
const PROTECTED_TAGS: &[&str] = &["html", "body", "article", "main"];

/// Configuration for the sanitizer
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Whether to remove tags from [`DENIED_TAGS`]
    pub remove_denied_tags: bool,
    /// Whether to remove hidden elements
    pub remove_hidden: bool,
    /// Whether to remove short nodes with boilerplate-looking class/id
    pub remove_unlikely: bool,
    /// Nodes with at least this many characters survive the unlikely pass
    pub unlikely_max_chars: usize,
    /// Whether to turn inline-only divs into paragraphs
    pub promote_divs: bool,
    /// A div needs more than this many characters to be promoted
    pub promote_min_chars: usize,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            remove_denied_tags: true,
            remove_hidden: true,
            remove_unlikely: true,
            unlikely_max_chars: 300,
            promote_divs: true,
            promote_min_chars: 10,
        }
    }
}

/// Copy the page and return a sanitized tree. The document is left untouched.
pub fn preprocess_document(doc: &Document, config: &PreprocessConfig) -> DomTree {
    let mut tree = DomTree::from_document(doc);
    sanitize(&mut tree, config);
    tree
}

/// Run every enabled sanitizer step, in order, on an owned tree.
///
/// Each step is idempotent, so running this twice removes nothing new.
pub fn sanitize(tree: &mut DomTree, config: &PreprocessConfig) {
    let before = tree.node_count();

    if config.remove_denied_tags {
        remove_denied_tags(tree);
    }

    if config.remove_hidden {
        remove_hidden_elements(tree);
    }

    if config.remove_unlikely {
        remove_unlikely_candidates(tree, config.unlikely_max_chars);
    }

    if config.promote_divs {
        promote_inline_divs(tree, config.promote_min_chars);
    }

    debug!(before, after = tree.node_count(), "sanitized document copy");
}

/// Remove script, style, embedded media and frame tags
fn remove_denied_tags(tree: &mut DomTree) {
    let doomed: Vec<NodeId> = tree
        .element_descendants(tree.root())
        .into_iter()
        .filter(|id| tree.tag_name(*id).is_some_and(|tag| DENIED_TAGS.contains(&tag)))
        .collect();

    for id in doomed {
        tree.detach(id);
    }
}

/// Remove elements hidden by inline style, `hidden`, or `aria-hidden="true"`
fn remove_hidden_elements(tree: &mut DomTree) {
    let doomed: Vec<NodeId> = tree
        .element_descendants(tree.root())
        .into_iter()
        .filter(|id| is_hidden(tree, *id))
        .collect();

    for id in doomed {
        tree.detach(id);
    }
}

fn is_hidden(tree: &DomTree, id: NodeId) -> bool {
    if tree.attr(id, "hidden").is_some() {
        return true;
    }

    if tree
        .attr(id, "aria-hidden")
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    {
        return true;
    }

    tree.attr(id, "style").is_some_and(|style| HIDDEN_STYLE.is_match(style))
}

/// Remove short elements whose class/id looks like boilerplate.
///
/// Long nodes are kept even when they match, since genuine content sometimes
/// sits in an oddly named container. Nodes are visited children first, so a
/// node's length is measured after its own boilerplate has been pruned.
fn remove_unlikely_candidates(tree: &mut DomTree, max_chars: usize) {
    for id in tree.element_descendants(tree.root()).into_iter().rev() {
        let Some(tag) = tree.tag_name(id) else {
            continue;
        };
        if PROTECTED_TAGS.contains(&tag) {
            continue;
        }

        let match_string = tree.class_and_id(id);
        if match_string.trim().is_empty() {
            continue;
        }

        if !UNLIKELY_CANDIDATES.is_match(&match_string) || POSITIVE_CANDIDATES.is_match(&match_string) {
            continue;
        }

        let text_len = tree.text_content(id).trim().chars().count();
        if text_len >= max_chars {
            trace!(class_id = %match_string.trim(), text_len, "keeping long unlikely candidate");
            continue;
        }

        trace!(class_id = %match_string.trim(), text_len, "removing unlikely candidate");
        tree.detach(id);
    }
}

/// Rename divs that hold only inline content into paragraphs
fn promote_inline_divs(tree: &mut DomTree, min_chars: usize) {
    let divs: Vec<NodeId> = tree
        .element_descendants(tree.root())
        .into_iter()
        .filter(|id| tree.tag_name(*id) == Some("div"))
        .collect();

    for id in divs {
        let inline_only = tree
            .element_children(id)
            .all(|child| tree.tag_name(child).is_some_and(is_inline_tag));
        if !inline_only {
            continue;
        }

        if tree.text_content(id).trim().chars().count() > min_chars {
            tree.rename(id, "p");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::html_fragment;
    use proptest::prelude::*;

    fn sanitized(html: &str) -> DomTree {
        let doc = Document::parse(html).unwrap();
        preprocess_document(&doc, &PreprocessConfig::default())
    }

    #[test]
    fn test_remove_denied_tags() {
        let html = r#"
            <html>
                <head><script>alert('test');</script><style>body{color:red;}</style></head>
                <body>
                    <noscript>Enable JavaScript</noscript>
                    <iframe src="https://example.com"></iframe>
                    <svg><rect width="100" height="100"/></svg>
                    <video src="clip.mp4"></video>
                    <canvas id="chart"></canvas>
                    <p>Content</p>
                </body>
            </html>
        "#;

        let tree = sanitized(html);
        let out = tree.outer_html(tree.root());
        assert!(!out.contains("<script"));
        assert!(!out.contains("alert"), "Script content should be removed");
        assert!(!out.contains("color:red"), "Style content should be removed");
        assert!(!out.contains("Enable JavaScript"));
        assert!(!out.contains("<iframe"));
        assert!(!out.contains("<svg"));
        assert!(!out.contains("<video"));
        assert!(!out.contains("chart"));
        assert!(out.contains("<p>Content</p>"));
    }

    #[test]
    fn test_remove_hidden_elements() {
        let html = r#"
            <html>
                <body>
                    <div style="display:none">Hidden content</div>
                    <div style="visibility: hidden">Invisible content</div>
                    <div hidden>Attribute hidden</div>
                    <div aria-hidden="true">Aria hidden</div>
                    <div aria-hidden="false">Aria visible</div>
                    <div>Visible content</div>
                </body>
            </html>
        "#;

        let tree = sanitized(html);
        let text = tree.text_content(tree.root());
        assert!(!text.contains("Hidden content"));
        assert!(!text.contains("Invisible content"));
        assert!(!text.contains("Attribute hidden"));
        assert!(!text.contains("Aria hidden"));
        assert!(text.contains("Aria visible"));
        assert!(text.contains("Visible content"));
    }

    #[test]
    fn test_remove_unlikely_candidates_length_gate() {
        let long_text = "Sidebar prose that runs long. ".repeat(14);
        let html = format!(
            r#"<body>
                <div class="sidebar widget">{}</div>
                <div class="widget">ad</div>
                <div id="main-content">Main content</div>
            </body>"#,
            long_text
        );

        let tree = sanitized(&html);
        let out = tree.outer_html(tree.root());
        assert!(out.contains("sidebar widget"), "long boilerplate-named node survives");
        assert!(!out.contains(r#"class="widget""#), "short ad node is removed");
        assert!(out.contains("main-content"));
    }

    #[test]
    fn test_unlikely_length_measured_after_pruning_children() {
        let html = format!(
            r#"<body><div class="sidebar">{}<div class="widget">{}</div></div><p>Kept</p></body>"#,
            "a".repeat(250),
            "b".repeat(60)
        );

        let mut tree = sanitized(&html);
        assert!(tree.find_first(tree.root(), "div").is_none());
        let once = tree.outer_html(tree.root());
        sanitize(&mut tree, &PreprocessConfig::default());
        assert_eq!(once, tree.outer_html(tree.root()));
    }

    #[test]
    fn test_positive_keywords_protect() {
        let tree = sanitized(r#"<body><div class="comment-content">Short</div></body>"#);
        assert!(tree.text_content(tree.root()).contains("Short"));
    }

    #[test]
    fn test_protected_structural_tags() {
        let tree = sanitized(r#"<body class="nav-open"><main class="menu">Tiny</main></body>"#);
        assert!(tree.body().is_some());
        assert!(tree.find_first(tree.root(), "main").is_some());
    }

    #[test]
    fn test_promote_inline_divs() {
        let tree = sanitized(r#"<body><div>Plain text with a <a href="/x">link</a> inside.</div><div>short</div><div><p>Block child here</p></div></body>"#);
        let body = tree.body().unwrap();
        let tags: Vec<_> = tree.element_children(body).filter_map(|id| tree.tag_name(id)).collect();
        assert_eq!(tags, vec!["p", "div", "div"]);
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let html = r#"
            <body>
                <nav class="menu"><a href="/">Home</a></nav>
                <div style="display:none">gone</div>
                <div class="content"><div>Inline only paragraph text.</div><p>Para</p></div>
                <script>x()</script>
            </body>
        "#;
        let config = PreprocessConfig::default();
        let mut tree = sanitized(html);
        let first = tree.outer_html(tree.root());
        sanitize(&mut tree, &config);
        assert_eq!(first, tree.outer_html(tree.root()));
    }

    proptest! {
        #[test]
        fn prop_sanitize_is_idempotent(fragment in html_fragment()) {
            let config = PreprocessConfig::default();
            let mut tree = DomTree::from_html(&format!("<body>{}</body>", fragment));
            sanitize(&mut tree, &config);
            let once = tree.outer_html(tree.root());
            sanitize(&mut tree, &config);
            prop_assert_eq!(once, tree.outer_html(tree.root()));
        }
    }

    #[test]
    fn test_document_not_mutated() {
        let html = r#"<body><script>x()</script><div class="ad-break">Buy</div><p>Text</p></body>"#;
        let doc = Document::parse(html).unwrap();
        let before = doc.as_string();
        let count = doc.node_count();

        let _ = preprocess_document(&doc, &PreprocessConfig::default());

        assert_eq!(doc.as_string(), before);
        assert_eq!(doc.node_count(), count);
    }
}
