use crate::dom_tree::{DomTree, NodeData, NodeId, collapse_whitespace, is_block_tag};
use crate::formatters::text::node_text;
use crate::parse::Element;

/// Subtrees that never produce output.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Element nesting past this depth is rendered as plain text.
const MAX_RENDER_DEPTH: usize = 192;

/// Configuration for Markdown conversion
#[derive(Debug, Clone, Default)]
pub struct MarkdownConfig {
    /// Drop `[Image: alt]` placeholders
    pub strip_images: bool,
    /// Emit link text only, never `[text](href)`
    pub strip_links: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct Context {
    depth: usize,
    list_depth: usize,
}

impl Context {
    fn child(self) -> Self {
        Self { depth: self.depth + 1, ..self }
    }
}

/// Markdown formatter over an owned DOM tree
pub struct MarkdownFormatter {
    config: MarkdownConfig,
}

impl MarkdownFormatter {
    pub fn new(config: MarkdownConfig) -> Self {
        Self { config }
    }

    /// Convert the subtree rooted at `id` to Markdown.
    pub fn convert(&self, tree: &DomTree, id: NodeId) -> String {
        let renderer = Renderer { tree, config: &self.config };
        finish(&renderer.render(id, Context::default()))
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new(MarkdownConfig::default())
    }
}

/// Convert a node of an owned tree to Markdown with the default configuration.
pub fn node_to_markdown(tree: &DomTree, id: NodeId) -> String {
    MarkdownFormatter::default().convert(tree, id)
}

/// Convert a live element to Markdown. The element is copied first.
pub fn element_to_markdown(element: &Element<'_>) -> String {
    let tree = DomTree::from_element(element);
    node_to_markdown(&tree, tree.root())
}

/// Parse an HTML string and convert its `<body>` to Markdown.
///
/// # Example
///
/// ```rust
/// use contextprompt_core::formatters::markdown::html_to_markdown;
///
/// let md = html_to_markdown("<h2>Setup</h2><p>Run <code>make</code> first.</p>");
/// assert_eq!(md, "## Setup\n\nRun `make` first.");
/// ```
pub fn html_to_markdown(html: &str) -> String {
    let tree = DomTree::from_html(html);
    let node = tree.body().unwrap_or_else(|| tree.root());
    node_to_markdown(&tree, node)
}

struct Renderer<'a> {
    tree: &'a DomTree,
    config: &'a MarkdownConfig,
}

impl Renderer<'_> {
    fn render(&self, id: NodeId, ctx: Context) -> String {
        let Some(node) = self.tree.get(id) else {
            return String::new();
        };

        let tag = match &node.data {
            NodeData::Text(text) => return collapse_whitespace(text),
            NodeData::Element { tag, .. } => tag.as_str(),
        };

        if ctx.depth >= MAX_RENDER_DEPTH {
            return block(&node_text(self.tree, id));
        }

        match tag {
            t if SKIPPED_TAGS.contains(&t) => String::new(),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => self.heading(id, tag, ctx),
            "p" => block(&self.render_children(id, ctx)),
            "br" => "\n".to_string(),
            "hr" => "\n\n---\n\n".to_string(),
            "pre" => self.code_block(id),
            "code" => self.inline_code(id, ctx),
            "ul" => self.list(id, false, ctx),
            "ol" => self.list(id, true, ctx),
            "blockquote" => self.blockquote(id, ctx),
            "strong" | "b" => wrap_inline(&self.render_children(id, ctx), "**", "**"),
            "em" | "i" => wrap_inline(&self.render_children(id, ctx), "*", "*"),
            "a" => self.link(id, ctx),
            "img" => self.image(id),
            "table" => self.table(id, ctx),
            "dt" | "summary" => emphasized_block(&self.render_children(id, ctx), "**"),
            "figcaption" => emphasized_block(&self.render_children(id, ctx), "*"),
            t if is_block_tag(t) => block(&self.render_children(id, ctx)),
            _ => self.render_children(id, ctx),
        }
    }

    fn render_children(&self, id: NodeId, ctx: Context) -> String {
        let mut out = String::new();
        for child in self.tree.children(id) {
            out.push_str(&self.render(*child, ctx.child()));
        }
        out
    }

    fn heading(&self, id: NodeId, tag: &str, ctx: Context) -> String {
        let level = tag[1..].parse::<usize>().unwrap_or(1);
        let text = collapse_whitespace(&self.render_children(id, ctx));
        let text = text.trim();
        if text.is_empty() {
            return String::new();
        }
        format!("\n\n{} {}\n\n", "#".repeat(level), text)
    }

    fn code_block(&self, id: NodeId) -> String {
        let content = self.tree.text_content(id);
        let code = content.trim_matches(['\n', '\r']);
        if code.trim().is_empty() {
            return String::new();
        }
        let language = self.code_language(id).unwrap_or_default();
        let fence = "`".repeat(longest_backtick_run(code).max(2) + 1);
        format!("\n\n{}{}\n{}\n{}\n\n", fence, language, code, fence)
    }

    /// `language-xxx` class on the `pre` or a descendant `code`
    fn code_language(&self, pre: NodeId) -> Option<&str> {
        std::iter::once(pre)
            .chain(
                self.tree
                    .element_descendants(pre)
                    .into_iter()
                    .filter(|id| self.tree.tag_name(*id) == Some("code")),
            )
            .filter_map(|id| self.tree.attr(id, "class"))
            .flat_map(str::split_whitespace)
            .find_map(|class| class.strip_prefix("language-"))
            .filter(|language| !language.is_empty())
    }

    fn inline_code(&self, id: NodeId, ctx: Context) -> String {
        let content = self.render_children(id, ctx);
        let code = content.trim();
        if code.is_empty() {
            return String::new();
        }
        match longest_backtick_run(code) {
            0 => format!("`{}`", code),
            run => {
                let fence = "`".repeat(run + 1);
                format!("{} {} {}", fence, code, fence)
            }
        }
    }

    fn list(&self, id: NodeId, ordered: bool, ctx: Context) -> String {
        let indent = "  ".repeat(ctx.list_depth);
        let item_ctx = Context { list_depth: ctx.list_depth + 1, ..ctx };
        let mut lines = Vec::new();
        let mut number = 0usize;

        for item in self.tree.element_children(id) {
            if self.tree.tag_name(item) != Some("li") {
                continue;
            }

            let content = self.render_children(item, item_ctx);
            let mut fences = FenceTracker::default();
            let mut nested_fence = false;
            let mut item_lines: Vec<String> = Vec::new();

            for line in content.lines() {
                let opening = !fences.is_open();
                if fences.step(line) {
                    // A fence already indented by a nested list keeps its columns.
                    if opening {
                        nested_fence = line.starts_with("  ");
                    }
                    if item_lines.is_empty() {
                        item_lines.push(line.trim_start().to_string());
                    } else if nested_fence || line.is_empty() {
                        item_lines.push(line.to_string());
                    } else {
                        item_lines.push(format!("{}  {}", indent, line));
                    }
                    continue;
                }

                let line = line.trim_end();
                if line.trim().is_empty() {
                    continue;
                }
                if item_lines.is_empty() {
                    item_lines.push(line.trim_start().to_string());
                } else if line.starts_with("  ") {
                    item_lines.push(line.to_string());
                } else {
                    item_lines.push(format!("{}  {}", indent, strip_collapse_artifact(line)));
                }
            }

            let mut item_lines = item_lines.into_iter();
            let Some(first) = item_lines.next() else {
                continue;
            };

            number += 1;
            let marker = if ordered { format!("{}. ", number) } else { "- ".to_string() };
            lines.push(format!("{}{}{}", indent, marker, first));
            lines.extend(item_lines);
        }

        if lines.is_empty() {
            return String::new();
        }
        format!("\n\n{}\n\n", lines.join("\n"))
    }

    fn blockquote(&self, id: NodeId, ctx: Context) -> String {
        let content = self.render_children(id, ctx);
        let lines = squeeze_blank_lines(content.trim());
        if lines.is_empty() {
            return String::new();
        }

        let quoted: Vec<String> = lines
            .into_iter()
            .map(|line| if line.is_empty() { ">".to_string() } else { format!("> {}", line) })
            .collect();
        format!("\n\n{}\n\n", quoted.join("\n"))
    }

    fn link(&self, id: NodeId, ctx: Context) -> String {
        let text = self.render_children(id, ctx);
        if self.config.strip_links {
            return text;
        }

        match self.tree.attr(id, "href").map(str::trim) {
            Some(href) if is_linkable_href(href) && !text.trim().is_empty() => {
                wrap_inline(&text, "[", &format!("]({})", href))
            }
            _ => text,
        }
    }

    fn image(&self, id: NodeId) -> String {
        if self.config.strip_images {
            return String::new();
        }
        match self.tree.attr(id, "alt").map(str::trim) {
            Some(alt) if !alt.is_empty() => format!("[Image: {}]", collapse_whitespace(alt)),
            _ => String::new(),
        }
    }

    fn table(&self, id: NodeId, ctx: Context) -> String {
        let mut lines = Vec::new();

        for row in self.table_rows(id) {
            let cells: Vec<String> = self
                .tree
                .element_children(row)
                .filter(|cell| matches!(self.tree.tag_name(*cell), Some("td" | "th")))
                .map(|cell| self.table_cell(cell, ctx))
                .collect();
            if cells.is_empty() {
                continue;
            }

            lines.push(format!("| {} |", cells.join(" | ")));
            if lines.len() == 1 {
                lines.push(format!("| {} |", vec!["---"; cells.len()].join(" | ")));
            }
        }

        if lines.is_empty() {
            return String::new();
        }
        format!("\n\n{}\n\n", lines.join("\n"))
    }

    /// Rows that belong to this table, not to tables nested in its cells
    fn table_rows(&self, table: NodeId) -> Vec<NodeId> {
        let mut rows = Vec::new();
        for child in self.tree.element_children(table) {
            match self.tree.tag_name(child) {
                Some("tr") => rows.push(child),
                Some("thead" | "tbody" | "tfoot") => rows.extend(
                    self.tree
                        .element_children(child)
                        .filter(|row| self.tree.tag_name(*row) == Some("tr")),
                ),
                _ => {}
            }
        }
        rows
    }

    fn table_cell(&self, cell: NodeId, ctx: Context) -> String {
        collapse_whitespace(&self.render_children(cell, ctx))
            .trim()
            .replace('|', "\\|")
    }
}

fn is_linkable_href(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    lower.starts_with("http") && !lower.starts_with('#') && !lower.starts_with("javascript:")
}

fn block(content: &str) -> String {
    let content = content.trim();
    if content.is_empty() {
        return String::new();
    }
    format!("\n\n{}\n\n", content)
}

fn emphasized_block(content: &str, marker: &str) -> String {
    let content = collapse_whitespace(content);
    let content = content.trim();
    if content.is_empty() {
        return String::new();
    }
    format!("\n\n{}{}{}\n\n", marker, content, marker)
}

/// Wrap inline content in markers, leaving surrounding whitespace outside them.
fn wrap_inline(content: &str, open: &str, close: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return content.to_string();
    }
    let lead = &content[..content.len() - content.trim_start().len()];
    let trail = &content[content.trim_end().len()..];
    format!("{}{}{}{}{}", lead, open, trimmed, close, trail)
}

/// Collapsed whitespace leaves a single leading space after a block break.
/// Generated indentation is always two spaces, so one space is safe to drop.
fn strip_collapse_artifact(line: &str) -> &str {
    match line.strip_prefix(' ') {
        Some(rest) if !rest.starts_with(' ') => rest,
        _ => line,
    }
}

/// Longest run of consecutive backticks in `text`.
fn longest_backtick_run(text: &str) -> usize {
    text.split(|c| c != '`').map(str::len).max().unwrap_or(0)
}

/// Follows code fences through rendered Markdown, one line at a time.
///
/// A fence closes only on a line holding exactly the marker that opened it, so
/// backtick lines inside code never flip the state.
#[derive(Debug, Default)]
struct FenceTracker {
    open: Option<String>,
}

impl FenceTracker {
    fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Feed the next line. Returns `true` for fence lines and code inside them.
    /// An opening run followed by more backticks is inline code, not a fence.
    fn step(&mut self, line: &str) -> bool {
        let trimmed = line.trim();
        if self.open.is_some() {
            if self.open.as_deref() == Some(trimmed) {
                self.open = None;
            }
            return true;
        }

        let run = trimmed.len() - trimmed.trim_start_matches('`').len();
        if run >= 3 && !trimmed[run..].contains('`') {
            self.open = Some("`".repeat(run));
            return true;
        }
        false
    }
}

/// Trim line ends and keep at most one blank line in a row. Fenced code is
/// passed through untouched.
fn squeeze_blank_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = Vec::new();
    let mut fences = FenceTracker::default();
    for line in text.lines() {
        if fences.step(line) {
            lines.push(line);
            continue;
        }
        let line = strip_collapse_artifact(line.trim_end());
        if line.is_empty() && lines.last().is_none_or(|last| last.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines
}

/// Final cleanup: per-line trailing whitespace and blank-line runs are
/// normalized outside code fences, then the whole string is trimmed.
fn finish(raw: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut fences = FenceTracker::default();
    let mut previous_blank = true;

    for line in raw.lines() {
        if fences.step(line) {
            out.push(line);
            previous_blank = false;
            continue;
        }

        let line = strip_collapse_artifact(line.trim_end());
        if line.is_empty() {
            if previous_blank {
                continue;
            }
            previous_blank = true;
        } else {
            previous_blank = false;
        }
        out.push(line);
    }

    out.join("\n").trim().to_string()
}
