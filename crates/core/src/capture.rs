//! Capture request/response envelope.
//!
//! A caller sends `{ "action": "captureContext", "options": { "captureDepth": "standard" } }`
//! and always gets a response object back. Extraction itself cannot fail; the
//! only unsuccessful response is for an action this crate does not know.
//!
//! # Example
//!
//! ```rust
//! use contextprompt_core::{CaptureRequest, Document, capture::handle_request};
//!
//! let request: CaptureRequest =
//!     serde_json::from_str(r#"{"action":"captureContext","options":{"captureDepth":"light"}}"#).unwrap();
//! let doc = Document::parse_with_url("<body></body>", "https://example.com/").unwrap();
//! let response = handle_request(&doc, &request, None);
//!
//! assert!(response.success);
//! assert_eq!(response.context.unwrap().main_content, "");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, warn};

use crate::chat::{PlatformRegistry, extract_chat_with_registry};
use crate::options::CaptureDepth;
use crate::parse::Document;
use crate::readability::{CaptureConfig, Readability};

/// The only action this envelope answers.
pub const CAPTURE_CONTEXT_ACTION: &str = "captureContext";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOptions {
    #[serde(default)]
    pub capture_depth: CaptureDepth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRequest {
    pub action: String,
    #[serde(default)]
    pub options: CaptureOptions,
}

impl CaptureRequest {
    /// A `captureContext` request at the given depth.
    pub fn capture(depth: CaptureDepth) -> Self {
        Self { action: CAPTURE_CONTEXT_ACTION.to_string(), options: CaptureOptions { capture_depth: depth } }
    }
}

/// Everything captured from one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    pub title: String,
    pub url: String,
    pub selection: String,
    pub description: String,
    pub og_data: BTreeMap<String, String>,
    pub structured_data: Vec<Value>,
    /// Main content Markdown, empty when nothing was found
    pub main_content: String,
    pub is_private_link: bool,
    /// Formatted transcript, empty unless the host is a known chat platform
    pub chat_content: String,
    pub platform_name: Option<String>,
    pub capture_depth: CaptureDepth,
    /// RFC 3339, UTC
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<PageContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaptureResponse {
    fn ok(context: PageContext) -> Self {
        Self { success: true, context: Some(context), error: None }
    }

    fn failure(message: String) -> Self {
        Self { success: false, context: None, error: Some(message) }
    }
}

/// Answer a request using the built-in platform table.
pub fn handle_request(doc: &Document, request: &CaptureRequest, selection: Option<&str>) -> CaptureResponse {
    handle_request_with_registry(doc, PlatformRegistry::builtin(), request, selection)
}

/// Answer a request using a caller-supplied platform table.
pub fn handle_request_with_registry(
    doc: &Document, registry: &PlatformRegistry, request: &CaptureRequest, selection: Option<&str>,
) -> CaptureResponse {
    if request.action != CAPTURE_CONTEXT_ACTION {
        warn!(action = %request.action, "unknown capture action");
        return CaptureResponse::failure(format!("Unknown action: {}", request.action));
    }

    let context = capture_context_with_registry(doc, registry, request.options.capture_depth, selection);
    CaptureResponse::ok(context)
}

/// Capture a page using the built-in platform table.
pub fn capture_context(doc: &Document, depth: CaptureDepth, selection: Option<&str>) -> PageContext {
    capture_context_with_registry(doc, PlatformRegistry::builtin(), depth, selection)
}

/// Metadata, main content and, for known chat hosts, the transcript.
pub fn capture_context_with_registry(
    doc: &Document, registry: &PlatformRegistry, depth: CaptureDepth, selection: Option<&str>,
) -> PageContext {
    let metadata = doc.extract_metadata();
    let main_content = Readability::with_config(CaptureConfig::builder().depth(depth).build()).extract_main_content(doc);
    let transcript = extract_chat_with_registry(doc, registry, depth);

    let (chat_content, platform_name, is_private_link) = match transcript {
        Some(transcript) => (transcript.to_markdown(), Some(transcript.platform_name), transcript.is_private_link),
        None => (String::new(), None, false),
    };

    debug!(
        url = doc.url().map(|u| u.as_str()).unwrap_or_default(),
        main_chars = main_content.chars().count(),
        chat_chars = chat_content.chars().count(),
        platform = platform_name.as_deref().unwrap_or_default(),
        "captured page context"
    );

    PageContext {
        title: metadata.title,
        url: doc.url().map(|u| u.to_string()).unwrap_or_default(),
        selection: selection.map(str::trim).unwrap_or_default().to_string(),
        description: metadata.description,
        og_data: metadata.og_data,
        structured_data: metadata.structured_data,
        main_content,
        is_private_link,
        chat_content,
        platform_name,
        capture_depth: depth,
        timestamp: timestamp_now(),
    }
}

fn timestamp_now() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339).unwrap_or_else(|e| {
        warn!(error = %e, "failed to format timestamp");
        now.unix_timestamp().to_string()
    })
}
