use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::Document;

/// Title used when a page has neither `og:title` nor a `<title>`.
pub const UNTITLED_PAGE: &str = "Untitled Page";

/// Longest paragraph-derived description before it is cut.
const DESCRIPTION_MAX_CHARS: usize = 300;

/// Simple, single-selector page metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub og_data: BTreeMap<String, String>,
    pub structured_data: Vec<Value>,
}

impl Document {
    /// Extract title with priority fallback:
    /// 1. Open Graph `og:title`
    /// 2. `<title>` element
    /// 3. [`UNTITLED_PAGE`]
    pub fn extract_title(&self) -> String {
        if let Some(title) = self.get_meta_content("og:title") {
            return title;
        }

        if let Some(title) = self.title() {
            let title = title.trim();
            if !title.is_empty() {
                return title.to_string();
            }
        }

        UNTITLED_PAGE.to_string()
    }

    /// Extract description with priority fallback:
    /// 1. Open Graph `og:description`
    /// 2. Meta `description`
    /// 3. First content paragraph, cut at 300 characters with `...`
    /// 4. Empty string
    pub fn extract_description(&self) -> String {
        if let Some(desc) = self.get_meta_content("og:description") {
            return desc;
        }

        if let Some(desc) = self.get_meta_content("description") {
            return desc;
        }

        if let Ok(Some(first)) = self.select_first("article p, main p, .content p, p") {
            let text = first.text();
            let text = text.trim();
            if text.chars().count() > DESCRIPTION_MAX_CHARS {
                let cut: String = text.chars().take(DESCRIPTION_MAX_CHARS).collect();
                return format!("{}...", cut);
            }
            return text.to_string();
        }

        String::new()
    }

    /// Every `og:*` meta property, keyed without the `og:` prefix.
    ///
    /// A property that appears twice keeps its last value.
    pub fn extract_og_data(&self) -> BTreeMap<String, String> {
        let mut og_data = BTreeMap::new();
        if let Ok(elements) = self.select(r#"meta[property^="og:"]"#) {
            for el in elements {
                if let Some(property) = el.attr("property")
                    && let Some(key) = property.strip_prefix("og:")
                {
                    og_data.insert(key.to_string(), el.attr("content").unwrap_or_default().to_string());
                }
            }
        }
        og_data
    }

    /// Every parseable `application/ld+json` block, in document order.
    pub fn extract_structured_data(&self) -> Vec<Value> {
        let Ok(elements) = self.select(r#"script[type="application/ld+json"]"#) else {
            return Vec::new();
        };

        elements
            .iter()
            .filter_map(|el| match serde_json::from_str::<Value>(el.text().trim()) {
                Ok(value) => Some(value),
                Err(e) => {
                    trace!(error = %e, "skipping malformed JSON-LD block");
                    None
                }
            })
            .collect()
    }

    /// Extract all metadata at once
    pub fn extract_metadata(&self) -> PageMetadata {
        PageMetadata {
            title: self.extract_title(),
            description: self.extract_description(),
            og_data: self.extract_og_data(),
            structured_data: self.extract_structured_data(),
        }
    }

    /// Trimmed, non-empty meta content by `property` or `name` attribute
    fn get_meta_content(&self, attr: &str) -> Option<String> {
        for key in ["property", "name"] {
            let selector = format!("meta[{}=\"{}\"]", key, attr);
            if let Ok(Some(el)) = self.select_first(&selector)
                && let Some(content) = el.attr("content")
            {
                let content = content.trim();
                if !content.is_empty() {
                    return Some(content.to_string());
                }
            }
        }
        None
    }
}
