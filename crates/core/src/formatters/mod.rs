pub mod markdown;
pub mod text;

pub use markdown::{MarkdownConfig, MarkdownFormatter, element_to_markdown, html_to_markdown, node_to_markdown};
pub use text::{inner_text, node_text};
