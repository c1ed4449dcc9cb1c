use crate::parse::{Document, Element};

use scraper::{ElementRef, Node};

/// Tags that start a new block when rendered.
pub const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "dialog", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "li",
    "main", "nav", "ol", "p", "pre", "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead", "tr",
    "ul",
];

/// Tags that flow inside a line of text.
pub const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "cite", "code", "data", "del", "dfn", "em", "i", "img", "ins", "kbd",
    "label", "mark", "q", "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var", "wbr",
];

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

pub fn is_block_tag(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

pub fn is_inline_tag(tag: &str) -> bool {
    INLINE_TAGS.contains(&tag)
}

/// Collapse every run of whitespace to a single space.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Index of a node inside its owning [`DomTree`].
///
/// Ids are stable for the lifetime of the tree, including after detaching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Payload of a node in the DOM tree
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// An element with its lowercase tag name and attributes in source order
    Element { tag: String, attrs: Vec<(String, String)> },
    /// A run of character data
    Text(String),
}

/// A node in the DOM tree
#[derive(Debug, Clone)]
pub struct DomNode {
    /// Element or text payload
    pub data: NodeData,
    /// Parent node ID (if any)
    pub parent: Option<NodeId>,
    /// Child node IDs in document order
    pub children: Vec<NodeId>,
}

/// An owned copy of a page, stored as an arena of nodes with parent/child indices.
///
/// All analysis that needs to remove or rename nodes happens here, so the live
/// [`Document`] is never touched. Detached nodes stay in the arena but are no
/// longer reachable from the root.
///
/// # Example
///
/// ```rust
/// use contextprompt_core::{Document, DomTree};
///
/// let doc = Document::parse("<body><div><p>Hello</p></div></body>").unwrap();
/// let mut tree = DomTree::from_document(&doc);
/// let div = tree.find_first(tree.root(), "div").unwrap();
/// tree.detach(div);
/// assert!(tree.find_first(tree.root(), "p").is_none());
/// assert_eq!(doc.select("p").unwrap().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<DomNode>,
    root: NodeId,
}

impl DomTree {
    /// Deep-copy a whole page, rooted at its `<html>` element.
    ///
    /// Comments, doctypes and processing instructions are not copied.
    pub fn from_document(doc: &Document) -> Self {
        Self::copy_from(doc.html().root_element())
    }

    /// Deep-copy a single element and its subtree.
    pub fn from_element(element: &Element<'_>) -> Self {
        Self::copy_from(element.element_ref())
    }

    /// Parse an HTML fragment or page and copy it.
    pub fn from_html(html: &str) -> Self {
        let html = scraper::Html::parse_document(html);
        Self::copy_from(html.root_element())
    }

    fn copy_from(source: ElementRef<'_>) -> Self {
        let mut tree = Self { nodes: Vec::new(), root: NodeId(0) };
        let root = tree.push(element_data(source), None);
        tree.root = root;

        let mut stack = vec![(source, root)];
        while let Some((element, id)) = stack.pop() {
            for child in element.children() {
                match child.value() {
                    Node::Element(_) => {
                        if let Some(child_element) = ElementRef::wrap(child) {
                            let child_id = tree.push(element_data(child_element), Some(id));
                            stack.push((child_element, child_id));
                        }
                    }
                    Node::Text(text) => {
                        tree.push(NodeData::Text(text.to_string()), Some(id));
                    }
                    _ => {}
                }
            }
        }

        tree
    }

    fn push(&mut self, data: NodeData, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(DomNode { data, parent, children: Vec::new() });
        if let Some(parent) = parent
            && let Some(node) = self.nodes.get_mut(parent.0)
        {
            node.children.push(id);
        }
        id
    }

    /// The root element of the copy.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `<body>` element, if present and still attached.
    pub fn body(&self) -> Option<NodeId> {
        if self.tag_name(self.root) == Some("body") {
            return Some(self.root);
        }
        self.find_first(self.root, "body")
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&DomNode> {
        self.nodes.get(id.0)
    }

    /// Tag name for element nodes, `None` for text.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.data {
            NodeData::Element { tag, .. } => Some(tag.as_str()),
            NodeData::Text(_) => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.tag_name(id).is_some()
    }

    /// Attribute value for element nodes.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.get(id)?.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            NodeData::Text(_) => None,
        }
    }

    /// The `class` and `id` attributes joined with a space.
    pub fn class_and_id(&self, id: NodeId) -> String {
        let class = self.attr(id, "class").unwrap_or_default();
        let node_id = self.attr(id, "id").unwrap_or_default();
        format!("{} {}", class, node_id)
    }

    /// Text payload for text nodes.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.data {
            NodeData::Text(text) => Some(text.as_str()),
            NodeData::Element { .. } => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|node| node.children.as_slice()).unwrap_or_default()
    }

    /// Direct children that are elements.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).iter().copied().filter(|child| self.is_element(*child))
    }

    /// All attached nodes under `id` (inclusive) in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            for child in self.children(current).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Element descendants of `id` (exclusive) in document order.
    pub fn element_descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .skip(1)
            .filter(|node| self.is_element(*node))
            .collect()
    }

    /// First element under `id` (exclusive) with the given tag.
    pub fn find_first(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.element_descendants(id)
            .into_iter()
            .find(|node| self.tag_name(*node) == Some(tag))
    }

    /// Concatenated text of every text node under `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(text) = self.text(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Number of attached nodes reachable from the root.
    pub fn node_count(&self) -> usize {
        self.descendants(self.root).len()
    }

    /// Remove `id` and its subtree from its parent. Returns `false` for the root
    /// or a node that is already detached.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        if let Some(parent_node) = self.nodes.get_mut(parent.0) {
            parent_node.children.retain(|child| *child != id);
        }
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.parent = None;
        }
        true
    }

    /// Change an element's tag name, keeping attributes and children.
    pub fn rename(&mut self, id: NodeId, new_tag: &str) {
        if let Some(node) = self.nodes.get_mut(id.0)
            && let NodeData::Element { tag, .. } = &mut node.data
        {
            *tag = new_tag.to_string();
        }
    }

    /// Serialize the subtree at `id` back to HTML.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let mut stack = vec![HtmlStep::Open(id)];

        while let Some(step) = stack.pop() {
            let id = match step {
                HtmlStep::Open(id) => id,
                HtmlStep::Close(tag) => {
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                    continue;
                }
            };
            let Some(node) = self.get(id) else {
                continue;
            };

            match &node.data {
                NodeData::Text(text) => escape_into(text, false, out),
                NodeData::Element { tag, attrs } => {
                    out.push('<');
                    out.push_str(tag);
                    for (key, value) in attrs {
                        out.push(' ');
                        out.push_str(key);
                        out.push_str("=\"");
                        escape_into(value, true, out);
                        out.push('"');
                    }
                    out.push('>');
                    if VOID_TAGS.contains(&tag.as_str()) {
                        continue;
                    }
                    stack.push(HtmlStep::Close(tag.as_str()));
                    stack.extend(node.children.iter().rev().map(|child| HtmlStep::Open(*child)));
                }
            }
        }
    }
}

/// Pending work while serializing a subtree
enum HtmlStep<'a> {
    Open(NodeId),
    Close(&'a str),
}

fn element_data(element: ElementRef<'_>) -> NodeData {
    let value = element.value();
    NodeData::Element {
        tag: value.name().to_lowercase(),
        attrs: value.attrs().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
    }
}

fn escape_into(text: &str, in_attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}
