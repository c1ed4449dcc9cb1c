//! Main content extraction API.
//!
//! [`Readability`] runs an ordered fallback chain over a parsed page and
//! always returns a Markdown string, possibly empty:
//!
//! 1. fast path: well-known content containers, serialized as-is
//! 2. robust path: sanitize a copy, score it, serialize the best node
//! 3. body fallback: the sanitized copy's `<body>`
//! 4. raw text: the page's rendered text
//!
//! The result is cut to the character budget of the configured
//! [`CaptureDepth`].
//!
//! # Example
//!
//! ```rust
//! use contextprompt_core::{CaptureDepth, Document, extract_main_content};
//!
//! let doc = Document::parse("<article><p>Sentence one. Sentence two.</p></article>").unwrap();
//! assert_eq!(extract_main_content(&doc, CaptureDepth::Standard), "Sentence one. Sentence two.");
//! ```

use std::fmt;

use tracing::{debug, warn};

use crate::dom_tree::DomTree;
use crate::extract::{ExtractConfig, extract_content};
use crate::formatters::markdown::{MarkdownConfig, MarkdownFormatter};
use crate::formatters::text::inner_text;
use crate::options::CaptureDepth;
use crate::parse::Document;
use crate::preprocess::{PreprocessConfig, preprocess_document};
use crate::scoring::ScoreConfig;
use crate::{CaptureError, Result};

/// Appended to main content cut at the depth budget.
pub const CONTENT_TRUNCATION_MARKER: &str = "\n\n...(content truncated)";

/// Content containers tried by the fast path, in priority order.
pub const FAST_PATH_SELECTORS: &[&str] = &[
    "article",
    "[role=\"main\"]",
    "main",
    ".post-content",
    ".article-content",
    ".entry-content",
    ".markdown-body",
    ".prose",
    ".content",
    "#content",
];

/// Share of the budget a paragraph boundary must lie beyond to be used as the cut.
const PARAGRAPH_CUT_RATIO: f64 = 0.8;

/// Configuration for the extraction chain.
///
/// # Example
///
/// ```rust
/// use contextprompt_core::{CaptureConfig, CaptureDepth};
///
/// let config = CaptureConfig::builder()
///     .depth(CaptureDepth::Deep)
///     .fast_path_min_chars(200)
///     .build();
/// assert_eq!(config.depth, CaptureDepth::Deep);
/// assert_eq!(config.robust_min_chars, 100);
/// ```
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Selects the content budget (default: standard).
    pub depth: CaptureDepth,

    /// Selectors tried by the fast path (default: [`FAST_PATH_SELECTORS`]).
    pub fast_path_selectors: Vec<String>,

    /// A fast-path match needs more trimmed text than this (default: 100).
    pub fast_path_min_chars: usize,

    /// The robust result needs more characters than this (default: 100).
    pub robust_min_chars: usize,

    /// The body fallback needs more characters than this (default: 50).
    pub body_min_chars: usize,

    pub preprocess: PreprocessConfig,
    pub scoring: ScoreConfig,
    pub extract: ExtractConfig,
    pub markdown: MarkdownConfig,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            depth: CaptureDepth::default(),
            fast_path_selectors: FAST_PATH_SELECTORS.iter().map(|s| s.to_string()).collect(),
            fast_path_min_chars: 100,
            robust_min_chars: 100,
            body_min_chars: 50,
            preprocess: PreprocessConfig::default(),
            scoring: ScoreConfig::default(),
            extract: ExtractConfig::default(),
            markdown: MarkdownConfig::default(),
        }
    }
}

impl CaptureConfig {
    /// Creates a new builder for CaptureConfig.
    pub fn builder() -> CaptureConfigBuilder {
        CaptureConfigBuilder::new()
    }
}

/// Builder for CaptureConfig.
pub struct CaptureConfigBuilder {
    config: CaptureConfig,
}

impl CaptureConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: CaptureConfig::default() }
    }

    /// Sets the capture depth.
    pub fn depth(mut self, value: CaptureDepth) -> Self {
        self.config.depth = value;
        self
    }

    /// Replaces the fast-path selector list.
    pub fn fast_path_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.fast_path_selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    pub fn fast_path_min_chars(mut self, value: usize) -> Self {
        self.config.fast_path_min_chars = value;
        self
    }

    pub fn robust_min_chars(mut self, value: usize) -> Self {
        self.config.robust_min_chars = value;
        self
    }

    pub fn body_min_chars(mut self, value: usize) -> Self {
        self.config.body_min_chars = value;
        self
    }

    /// Sets the sanitizer configuration.
    pub fn preprocess(mut self, value: PreprocessConfig) -> Self {
        self.config.preprocess = value;
        self
    }

    /// Sets the scoring configuration.
    pub fn scoring(mut self, value: ScoreConfig) -> Self {
        self.config.scoring = value;
        self
    }

    /// Sets the candidate selection configuration.
    pub fn extract(mut self, value: ExtractConfig) -> Self {
        self.config.extract = value;
        self
    }

    /// Sets the Markdown configuration.
    pub fn markdown(mut self, value: MarkdownConfig) -> Self {
        self.config.markdown = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> CaptureConfig {
        self.config
    }
}

impl Default for CaptureConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The stage of the chain that produced the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStage {
    FastPath,
    Robust,
    Body,
    RawText,
    /// Every stage came back empty
    Empty,
}

impl ExtractionStage {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionStage::FastPath => "fast-path",
            ExtractionStage::Robust => "robust",
            ExtractionStage::Body => "body",
            ExtractionStage::RawText => "raw-text",
            ExtractionStage::Empty => "empty",
        }
    }
}

impl fmt::Display for ExtractionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main content with the stage that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOutcome {
    pub content: String,
    pub stage: ExtractionStage,
    /// Whether the content was cut at the depth budget
    pub truncated: bool,
}

/// Main entry point for content extraction.
///
/// # Example
///
/// ```rust
/// use contextprompt_core::{Document, Readability};
///
/// let doc = Document::parse("<body></body>").unwrap();
/// assert_eq!(Readability::new().extract_main_content(&doc), "");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Readability {
    config: CaptureConfig,
}

impl Readability {
    /// Creates a new Readability instance with default settings.
    pub fn new() -> Self {
        Self { config: CaptureConfig::default() }
    }

    /// Creates a new Readability instance with a custom configuration.
    pub fn with_config(config: CaptureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Main content as Markdown, cut to the depth budget. Never fails.
    pub fn extract_main_content(&self, doc: &Document) -> String {
        self.extract(doc).content
    }

    /// Run the fallback chain and report which stage answered.
    pub fn extract(&self, doc: &Document) -> ExtractionOutcome {
        let (content, stage) = self.run_chain(doc);
        let budget = self.config.depth.limits().content_budget;
        let truncated = content.chars().count() > budget;
        let content = if truncated { truncate_content(&content, budget) } else { content };

        debug!(stage = %stage, chars = content.chars().count(), truncated, "main content extracted");
        ExtractionOutcome { content, stage, truncated }
    }

    fn run_chain(&self, doc: &Document) -> (String, ExtractionStage) {
        match self.fast_path(doc) {
            Ok(content) => return (content, ExtractionStage::FastPath),
            Err(e) => debug!(reason = %e, "fast path missed"),
        }

        // One sanitized copy serves both the robust path and the body fallback.
        let tree = preprocess_document(doc, &self.config.preprocess);

        match self.robust_path(&tree) {
            Ok(content) => return (content, ExtractionStage::Robust),
            Err(e) => debug!(reason = %e, "robust path rejected"),
        }

        match self.body_fallback(&tree) {
            Ok(content) => return (content, ExtractionStage::Body),
            Err(e) => debug!(reason = %e, "body fallback rejected"),
        }

        let text = inner_text(doc);
        if text.is_empty() { (text, ExtractionStage::Empty) } else { (text, ExtractionStage::RawText) }
    }

    /// First container match with enough text, serialized without sanitizing.
    fn fast_path(&self, doc: &Document) -> Result<String> {
        let formatter = MarkdownFormatter::new(self.config.markdown.clone());

        for selector in &self.config.fast_path_selectors {
            let elements = match doc.select(selector) {
                Ok(elements) => elements,
                Err(e) => {
                    warn!(selector = %selector, error = %e, "skipping fast-path selector");
                    continue;
                }
            };

            for element in elements {
                if element.text().trim().chars().count() <= self.config.fast_path_min_chars {
                    continue;
                }

                let tree = DomTree::from_element(&element);
                let markdown = formatter.convert(&tree, tree.root());
                if !markdown.is_empty() {
                    debug!(selector = %selector, "fast path hit");
                    return Ok(markdown);
                }
            }
        }

        Err(CaptureError::NoContent)
    }

    fn robust_path(&self, tree: &DomTree) -> Result<String> {
        let best = extract_content(tree, &self.config.extract, &self.config.scoring);
        debug!(
            tag = tree.tag_name(best.node).unwrap_or_default(),
            score = best.score,
            adjusted = best.adjusted_score,
            candidates = best.candidate_count,
            fallback = best.is_fallback,
            "robust path selected node"
        );

        let markdown = MarkdownFormatter::new(self.config.markdown.clone()).convert(tree, best.node);
        accept(markdown, self.config.robust_min_chars)
    }

    fn body_fallback(&self, tree: &DomTree) -> Result<String> {
        let body = tree.body().ok_or(CaptureError::NoContent)?;
        let markdown = MarkdownFormatter::new(self.config.markdown.clone()).convert(tree, body);
        accept(markdown, self.config.body_min_chars)
    }
}

fn accept(content: String, min_chars: usize) -> Result<String> {
    if content.chars().count() > min_chars { Ok(content) } else { Err(CaptureError::NoContent) }
}

/// Convenience function: extract main content with default settings at a depth.
pub fn extract_main_content(doc: &Document, depth: CaptureDepth) -> String {
    Readability::with_config(CaptureConfig::builder().depth(depth).build()).extract_main_content(doc)
}

/// Cut `content` to at most `budget` characters plus [`CONTENT_TRUNCATION_MARKER`].
///
/// The cut lands on the last paragraph boundary (`\n\n`) inside the budget
/// when that boundary lies beyond 80% of it; otherwise the text is hard-cut at
/// the budget. Content within budget is returned unchanged.
///
/// # Example
///
/// ```rust
/// use contextprompt_core::readability::truncate_content;
///
/// assert_eq!(truncate_content("short", 10), "short");
/// assert_eq!(truncate_content("abcdefghij", 4), "abcd\n\n...(content truncated)");
/// ```
pub fn truncate_content(content: &str, budget: usize) -> String {
    if content.chars().count() <= budget {
        return content.to_string();
    }

    let head_end = content.char_indices().nth(budget).map_or(content.len(), |(i, _)| i);
    let head = &content[..head_end];
    let min_cut = budget as f64 * PARAGRAPH_CUT_RATIO;

    let cut = match head.rfind("\n\n") {
        Some(index) if head[..index].chars().count() as f64 > min_cut => index,
        _ => head_end,
    };

    format!("{}{}", &content[..cut], CONTENT_TRUNCATION_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SENTENCE: &str = "This paragraph is long enough to count as real content, and it ends properly.";

    fn article_page() -> String {
        format!(
            r#"<html><head><title>T</title></head><body>
                <nav><a href="/">Home</a> <a href="/about">About</a></nav>
                <article><h1>Heading</h1><p>{s}</p><p>{s}</p></article>
                <footer>Copyright</footer>
            </body></html>"#,
            s = SENTENCE
        )
    }

    #[test]
    fn test_config_builder() {
        let config = CaptureConfig::builder()
            .depth(CaptureDepth::Light)
            .fast_path_selectors(["#main"])
            .fast_path_min_chars(10)
            .robust_min_chars(20)
            .body_min_chars(5)
            .markdown(MarkdownConfig { strip_images: true, strip_links: false })
            .build();

        assert_eq!(config.depth, CaptureDepth::Light);
        assert_eq!(config.fast_path_selectors, vec!["#main".to_string()]);
        assert_eq!(config.fast_path_min_chars, 10);
        assert_eq!(config.robust_min_chars, 20);
        assert_eq!(config.body_min_chars, 5);
        assert!(config.markdown.strip_images);
    }

    #[test]
    fn test_config_defaults() {
        let config = CaptureConfig::default();
        assert_eq!(config.depth, CaptureDepth::Standard);
        assert_eq!(config.fast_path_selectors.len(), FAST_PATH_SELECTORS.len());
        assert_eq!(config.fast_path_min_chars, 100);
        assert_eq!(config.robust_min_chars, 100);
        assert_eq!(config.body_min_chars, 50);
    }

    #[test]
    fn test_fast_path_article() {
        let doc = Document::parse(&article_page()).unwrap();
        let outcome = Readability::new().extract(&doc);

        assert_eq!(outcome.stage, ExtractionStage::FastPath);
        assert!(outcome.content.starts_with("# Heading\n\n"));
        assert!(!outcome.content.contains("Home"));
        assert!(!outcome.content.contains("Copyright"));
        assert!(!outcome.truncated);
    }

    #[test]
    fn test_fast_path_skips_short_match() {
        let html = format!(
            r#"<body><article>Tiny</article><div class="content"><p>{s}</p><p>{s}</p></div></body>"#,
            s = SENTENCE
        );
        let doc = Document::parse(&html).unwrap();
        let outcome = Readability::new().extract(&doc);

        assert_eq!(outcome.stage, ExtractionStage::FastPath);
        assert!(!outcome.content.contains("Tiny"));
        assert!(outcome.content.contains(SENTENCE));
    }

    #[test]
    fn test_invalid_fast_path_selector_is_skipped() {
        let config = CaptureConfig::builder().fast_path_selectors(["[[bad", "article"]).build();
        let doc = Document::parse(&article_page()).unwrap();
        let outcome = Readability::with_config(config).extract(&doc);
        assert_eq!(outcome.stage, ExtractionStage::FastPath);
    }

    #[test]
    fn test_robust_path() {
        let html = format!(
            r#"<body>
                <div class="menu"><a href="/a">One</a> <a href="/b">Two</a></div>
                <div class="story"><p>{s}</p><p>{s}</p><p>{s}</p></div>
            </body>"#,
            s = SENTENCE
        );
        let doc = Document::parse(&html).unwrap();
        let outcome = Readability::new().extract(&doc);

        assert_eq!(outcome.stage, ExtractionStage::Robust);
        assert!(outcome.content.contains(SENTENCE));
        assert!(!outcome.content.contains("One"));
    }

    #[test]
    fn test_body_fallback() {
        let html = "<body><p>This short paragraph has a few more than fifty characters.</p></body>";
        let doc = Document::parse(html).unwrap();
        let outcome = Readability::new().extract(&doc);

        assert_eq!(outcome.stage, ExtractionStage::Body);
        assert_eq!(outcome.content, "This short paragraph has a few more than fifty characters.");
    }

    #[test]
    fn test_raw_text_fallback() {
        let doc = Document::parse("<body><span>tiny</span></body>").unwrap();
        let outcome = Readability::new().extract(&doc);
        assert_eq!(outcome.stage, ExtractionStage::RawText);
        assert_eq!(outcome.content, "tiny");
    }

    #[test]
    fn test_short_article_reaches_same_text() {
        let doc = Document::parse("<article><p>Sentence one. Sentence two.</p></article>").unwrap();
        assert_eq!(Readability::new().extract_main_content(&doc), "Sentence one. Sentence two.");
    }

    #[test]
    fn test_empty_body() {
        let doc = Document::parse("<body></body>").unwrap();
        let outcome = Readability::new().extract(&doc);
        assert_eq!(outcome.stage, ExtractionStage::Empty);
        assert_eq!(outcome.content, "");
    }

    #[test]
    fn test_no_live_mutation() {
        let html = format!(
            r#"<body><div class="sidebar">Ad</div><div hidden>x</div><script>1</script>
               <div><span>{s}</span></div><div class="story"><p>{s}</p><p>{s}</p></div></body>"#,
            s = SENTENCE
        );
        let doc = Document::parse(&html).unwrap();
        let before_html = doc.as_string();
        let before_count = doc.node_count();

        for depth in CaptureDepth::ALL {
            let _ = extract_main_content(&doc, depth);
        }

        assert_eq!(doc.as_string(), before_html);
        assert_eq!(doc.node_count(), before_count);
    }

    #[test]
    fn test_depth_budget_applies() {
        let paragraphs: String = (0..400).map(|_| format!("<p>{}</p>", SENTENCE)).collect();
        let html = format!("<article>{}</article>", paragraphs);
        let doc = Document::parse(&html).unwrap();

        let outcome = Readability::with_config(CaptureConfig::builder().depth(CaptureDepth::Light).build()).extract(&doc);
        assert!(outcome.truncated);
        assert!(outcome.content.ends_with(CONTENT_TRUNCATION_MARKER));
        assert!(outcome.content.chars().count() <= 15_000 + CONTENT_TRUNCATION_MARKER.chars().count());
    }

    #[test]
    fn test_truncate_within_budget() {
        assert_eq!(truncate_content("exactly", 7), "exactly");
        assert_eq!(truncate_content("", 0), "");
    }

    #[test]
    fn test_truncate_at_late_paragraph_boundary() {
        let content = format!("{}\n\n{}", "a".repeat(90), "b".repeat(50));
        assert_eq!(truncate_content(&content, 100), format!("{}{}", "a".repeat(90), CONTENT_TRUNCATION_MARKER));
    }

    #[test]
    fn test_truncate_ignores_early_paragraph_boundary() {
        let content = format!("{}\n\n{}", "a".repeat(50), "b".repeat(100));
        let expected = format!("{}\n\n{}{}", "a".repeat(50), "b".repeat(48), CONTENT_TRUNCATION_MARKER);
        assert_eq!(truncate_content(&content, 100), expected);
    }

    #[test]
    fn test_truncate_counts_characters() {
        let content = "界".repeat(20);
        assert_eq!(truncate_content(&content, 5), format!("{}{}", "界".repeat(5), CONTENT_TRUNCATION_MARKER));
    }

    proptest! {
        #[test]
        fn prop_truncation_bound(content in "[a-z \\n]{0,300}", budget in 0usize..200) {
            let out = truncate_content(&content, budget);
            let marker = CONTENT_TRUNCATION_MARKER.chars().count();
            prop_assert!(out.chars().count() <= budget + marker);

            if content.chars().count() <= budget {
                prop_assert_eq!(&out, &content);
            } else {
                let kept = out.strip_suffix(CONTENT_TRUNCATION_MARKER).unwrap();
                prop_assert!(content.starts_with(kept));
            }
        }
    }
}
