//! Live page access.
//!
//! This module provides the [`Document`] and [`Element`] types. A `Document`
//! stands in for the rendered, on-screen page: it is parsed once and never
//! mutated afterwards. Every stage that needs to change structure works on an
//! owned [`DomTree`](crate::dom_tree::DomTree) copy instead.
//!
//! # Example
//!
//! ```rust
//! use contextprompt_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1>Title</h1>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! let paragraphs = doc.select("p.content").unwrap();
//! assert_eq!(paragraphs.len(), 1);
//! ```

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::{CaptureError, Result};

/// Represents a parsed, read-only HTML page.
///
/// # Example
///
/// ```rust
/// use contextprompt_core::parse::Document;
///
/// let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
/// let doc = Document::parse(html).unwrap();
/// assert_eq!(doc.title(), Some("Test".to_string()));
/// ```
pub struct Document {
    html: Html,
    url: Option<Url>,
}

impl Document {
    /// Parses HTML from a string with no page URL attached.
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { html, url: None })
    }

    /// Parses HTML and records the URL the page was rendered from.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::InvalidUrl`] if `url` cannot be parsed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use contextprompt_core::parse::Document;
    ///
    /// let doc = Document::parse_with_url("<p>hi</p>", "https://chatgpt.com/c/abc").unwrap();
    /// assert_eq!(doc.hostname(), Some("chatgpt.com"));
    /// ```
    pub fn parse_with_url(html: &str, url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| CaptureError::InvalidUrl(e.to_string()))?;
        let html = Html::parse_document(html);
        Ok(Self { html, url: Some(url) })
    }

    /// Gets the page URL, if one was provided.
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Gets the page hostname used for platform lookups.
    pub fn hostname(&self) -> Option<&str> {
        self.url.as_ref().and_then(|u| u.host_str())
    }

    /// Gets the raw HTML representation.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Gets the entire HTML as a string.
    pub fn as_string(&self) -> String {
        self.html.html()
    }

    /// Counts every node (elements, text, comments) in the page.
    pub fn node_count(&self) -> usize {
        self.html.tree.root().descendants().count()
    }

    /// Selects elements using a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use contextprompt_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html).unwrap();
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Selects the first element matching a CSS selector.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).next().map(|el| Element { element: el }))
    }

    /// Gets the content of the `<title>` element if present.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>())
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| CaptureError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// A wrapper around scraper's ElementRef on the live page.
///
/// # Example
///
/// ```rust
/// use contextprompt_core::parse::Document;
///
/// let html = r#"<a href="https://example.com">Link text</a>"#;
/// let doc = Document::parse(html).unwrap();
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the outer HTML of this element, including its own tags.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Gets the concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element.value().attr(name)
    }

    /// Gets the parent element, if the parent is an element.
    pub fn parent(&self) -> Option<Element<'a>> {
        self.element
            .parent()
            .and_then(ElementRef::wrap)
            .map(|element| Element { element })
    }

    pub(crate) fn element_ref(&self) -> ElementRef<'a> {
        self.element
    }
}
