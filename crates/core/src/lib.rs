pub mod capture;
pub mod chat;
pub mod dom_tree;
pub mod error;
pub mod extract;
pub mod formatters;
pub mod metadata;
pub mod options;
pub mod parse;
pub mod patterns;
pub mod preprocess;
pub mod readability;
pub mod scoring;

#[cfg(test)]
mod strategies;

pub use capture::{
    CaptureOptions, CaptureRequest, CaptureResponse, PageContext, capture_context, capture_context_with_registry,
    handle_request, handle_request_with_registry,
};
pub use chat::{ChatMessage, ChatRole, ChatTranscript, PlatformRegistry, extract_chat, extract_chat_content};
#[doc(hidden)]
pub use dom_tree::{DomNode, DomTree, NodeId};
pub use error::{CaptureError, Result};
#[doc(hidden)]
pub use extract::{ExtractConfig, ExtractedContent, extract_content};
pub use formatters::{MarkdownConfig, MarkdownFormatter, html_to_markdown, inner_text};
pub use metadata::PageMetadata;
pub use options::{CaptureDepth, DepthLimits};
pub use parse::{Document, Element};
#[doc(hidden)]
pub use preprocess::{PreprocessConfig, preprocess_document, sanitize};
pub use readability::{
    CaptureConfig, CaptureConfigBuilder, ExtractionOutcome, ExtractionStage, Readability, extract_main_content,
    truncate_content,
};
#[doc(hidden)]
pub use scoring::{ScoreConfig, adjusted_score, base_tag_score, class_id_weight, content_score, link_density};
