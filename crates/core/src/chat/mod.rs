//! Chat transcript extraction for known AI-chat web apps.
//!
//! This path is independent of main-content extraction. The page hostname
//! picks a [`Platform`]; its message selectors are tried in priority order and
//! the first one that matches anything supplies the turns. Each turn is
//! serialized to Markdown, classified by role from its markup, capped per
//! [`CaptureDepth`], and only the most recent turns are kept.
//!
//! # Example
//!
//! ```rust
//! use contextprompt_core::{CaptureDepth, Document, chat::extract_chat};
//!
//! let html = r#"
//!     <div data-message-author-role="user"><p>How do I reverse a list?</p></div>
//!     <div data-message-author-role="assistant"><p>Call reverse() on it in place.</p></div>
//! "#;
//! let doc = Document::parse_with_url(html, "https://chatgpt.com/c/abc-123").unwrap();
//! let transcript = extract_chat(&doc, CaptureDepth::Standard).unwrap();
//!
//! assert_eq!(transcript.platform_name, "ChatGPT");
//! assert!(transcript.is_private_link);
//! assert_eq!(transcript.messages.len(), 2);
//! ```

pub mod platform;

pub use platform::{Platform, PlatformConfig, PlatformRegistry, PlatformTable};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::formatters::markdown::element_to_markdown;
use crate::options::CaptureDepth;
use crate::parse::{Document, Element};

/// Appended to a turn cut at the per-turn limit.
pub const TURN_TRUNCATION_MARKER: &str = "...(truncated)";

/// Turns with this many characters or fewer are dropped.
const MIN_TURN_CHARS: usize = 10;

const TURN_SEPARATOR: &str = "\n\n---\n\n";

/// Speaker of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    Unknown,
}

impl ChatRole {
    /// Label used in the formatted transcript
    pub fn label(self) -> &'static str {
        match self {
            ChatRole::User => "User",
            ChatRole::Assistant => "Assistant",
            ChatRole::Unknown => "Message",
        }
    }
}

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Turns captured from a recognized chat platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTranscript {
    pub platform_name: String,
    pub is_private_link: bool,
    pub messages: Vec<ChatMessage>,
}

impl ChatTranscript {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Render as `**Label**:` blocks separated by horizontal rules.
    pub fn to_markdown(&self) -> String {
        self.messages
            .iter()
            .map(|message| format!("**{}**:\n{}", message.role.label(), message.content))
            .collect::<Vec<_>>()
            .join(TURN_SEPARATOR)
    }
}

/// Extract a transcript using the built-in platform table.
///
/// Returns `None` when the page has no URL or its host is not a known platform.
pub fn extract_chat(doc: &Document, depth: CaptureDepth) -> Option<ChatTranscript> {
    extract_chat_with_registry(doc, PlatformRegistry::builtin(), depth)
}

/// Extract a transcript using a caller-supplied platform table.
pub fn extract_chat_with_registry(
    doc: &Document, registry: &PlatformRegistry, depth: CaptureDepth,
) -> Option<ChatTranscript> {
    let host = doc.hostname()?;
    let platform = registry.lookup(host)?;
    let is_private_link = doc.url().is_some_and(|url| platform.is_private_link(url));

    let limits = depth.limits();
    let turns = collect_turns(doc, platform);
    let found = turns.len();

    let keep_from = found.saturating_sub(limits.max_messages);
    let messages: Vec<ChatMessage> = turns
        .into_iter()
        .skip(keep_from)
        .map(|ChatMessage { role, content }| ChatMessage { role, content: truncate_turn(&content, limits.max_chars) })
        .collect();

    debug!(
        platform = platform.display_name(),
        found,
        kept = messages.len(),
        is_private_link,
        "extracted chat transcript"
    );

    Some(ChatTranscript { platform_name: platform.display_name().to_string(), is_private_link, messages })
}

/// Formatted transcript, or an empty string when nothing was captured.
pub fn extract_chat_content(doc: &Document, depth: CaptureDepth) -> String {
    extract_chat(doc, depth)
        .map(|transcript| transcript.to_markdown())
        .unwrap_or_default()
}

/// Turns from the first selector that matches anything, in document order
fn collect_turns(doc: &Document, platform: &Platform) -> Vec<ChatMessage> {
    for selector in platform.message_selectors() {
        let elements = match doc.select(selector) {
            Ok(elements) => elements,
            Err(e) => {
                warn!(platform = platform.display_name(), selector = %selector, error = %e, "skipping selector");
                continue;
            }
        };

        if elements.is_empty() {
            continue;
        }

        debug!(selector = %selector, matched = elements.len(), "chat selector matched");
        return elements
            .iter()
            .filter_map(|element| to_message(element, platform))
            .collect();
    }

    Vec::new()
}

fn to_message(element: &Element<'_>, platform: &Platform) -> Option<ChatMessage> {
    let content = element_to_markdown(element);
    if content.chars().count() <= MIN_TURN_CHARS {
        return None;
    }
    Some(ChatMessage { role: classify_role(element, platform), content })
}

/// Own markup first, then the parent's; user hints win within each.
fn classify_role(element: &Element<'_>, platform: &Platform) -> ChatRole {
    platform
        .classify(&element.outer_html().to_lowercase())
        .or_else(|| {
            element
                .parent()
                .and_then(|parent| platform.classify(&parent.outer_html().to_lowercase()))
        })
        .unwrap_or(ChatRole::Unknown)
}

fn truncate_turn(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let cut: String = content.chars().take(max_chars).collect();
    format!("{}{}", cut.trim_end(), TURN_TRUNCATION_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PLATFORMS: &str = r#"{"platforms":[{
        "hosts":["chat.example.com"],
        "displayName":"Example Chat",
        "messageSelectors":["[[broken", ".missing", ".turn", ".msg"],
        "userHints":["user-turn"],
        "assistantHints":["bot-turn"],
        "privateLinkPattern":"^/t/"
    }]}"#;

    fn registry() -> PlatformRegistry {
        PlatformRegistry::from_json(TEST_PLATFORMS).unwrap()
    }

    fn chatgpt_page(count: usize, body: &str) -> String {
        let mut html = String::from("<html><body><main>");
        for i in 0..count {
            let role = if i % 2 == 0 { "user" } else { "assistant" };
            html.push_str(&format!(
                r#"<div data-message-author-role="{}"><p>Message number {}. {}</p></div>"#,
                role, i, body
            ));
        }
        html.push_str("</main></body></html>");
        html
    }

    #[test]
    fn test_unknown_host_returns_none() {
        let doc = Document::parse_with_url(&chatgpt_page(2, "hello"), "https://example.com/c/1").unwrap();
        assert!(extract_chat(&doc, CaptureDepth::Standard).is_none());
        assert_eq!(extract_chat_content(&doc, CaptureDepth::Standard), "");
    }

    #[test]
    fn test_no_url_returns_none() {
        let doc = Document::parse(&chatgpt_page(2, "hello")).unwrap();
        assert!(extract_chat(&doc, CaptureDepth::Standard).is_none());
    }

    #[test]
    fn test_chatgpt_standard_depth_keeps_last_twenty() {
        let long = "word ".repeat(400);
        let doc = Document::parse_with_url(&chatgpt_page(25, &long), "https://chatgpt.com/c/abc").unwrap();
        let transcript = extract_chat(&doc, CaptureDepth::Standard).unwrap();

        assert_eq!(transcript.messages.len(), 20);
        assert!(transcript.messages[0].content.starts_with("Message number 5."));
        assert!(transcript.messages[19].content.starts_with("Message number 24."));
        assert_eq!(transcript.messages[0].role, ChatRole::Assistant);
        assert_eq!(transcript.messages[19].role, ChatRole::User);
        for message in &transcript.messages {
            assert!(message.content.chars().count() <= 1500 + TURN_TRUNCATION_MARKER.len());
            assert!(message.content.ends_with(TURN_TRUNCATION_MARKER));
        }
    }

    #[test]
    fn test_light_depth_limits() {
        let doc = Document::parse_with_url(&chatgpt_page(12, "short body"), "https://chatgpt.com/").unwrap();
        let transcript = extract_chat(&doc, CaptureDepth::Light).unwrap();
        assert_eq!(transcript.messages.len(), 10);
        assert!(!transcript.is_private_link);
        assert!(transcript.messages.iter().all(|m| !m.content.ends_with(TURN_TRUNCATION_MARKER)));
    }

    #[test]
    fn test_first_matching_selector_wins() {
        let html = r#"
            <div class="turn msg user-turn"><p>First turn content here</p></div>
            <div class="msg"><p>Only matched by the later selector</p></div>
            <div class="turn bot-turn"><p>Second turn content here</p></div>
        "#;
        let doc = Document::parse_with_url(html, "https://chat.example.com/t/9").unwrap();
        let transcript = extract_chat_with_registry(&doc, &registry(), CaptureDepth::Deep).unwrap();

        assert_eq!(transcript.platform_name, "Example Chat");
        assert!(transcript.is_private_link);
        assert_eq!(transcript.messages.len(), 2);
        assert_eq!(transcript.messages[0].role, ChatRole::User);
        assert_eq!(transcript.messages[1].role, ChatRole::Assistant);
    }

    #[test]
    fn test_role_precedence_and_parent_fallback() {
        let html = r#"
            <div class="turn user-turn bot-turn"><p>Both hints present here</p></div>
            <section class="bot-turn"><div class="turn"><p>Role comes from the parent</p></div></section>
            <article><div class="turn"><p>No role hints anywhere</p></div></article>
        "#;
        let doc = Document::parse_with_url(html, "https://chat.example.com/").unwrap();
        let transcript = extract_chat_with_registry(&doc, &registry(), CaptureDepth::Deep).unwrap();

        let roles: Vec<_> = transcript.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::User, ChatRole::Assistant, ChatRole::Unknown]);
    }

    #[test]
    fn test_short_turns_skipped_and_code_kept() {
        let html = r#"
            <div class="turn user-turn"><p>ok thanks</p></div>
            <div class="turn bot-turn"><p>Here you go:</p><pre><code class="language-python">print("hi")</code></pre></div>
        "#;
        let doc = Document::parse_with_url(html, "https://chat.example.com/").unwrap();
        let transcript = extract_chat_with_registry(&doc, &registry(), CaptureDepth::Standard).unwrap();

        assert_eq!(transcript.messages.len(), 1);
        assert_eq!(transcript.messages[0].content, "Here you go:\n\n```python\nprint(\"hi\")\n```");
    }

    #[test]
    fn test_known_host_without_messages() {
        let doc = Document::parse_with_url("<p>Nothing here</p>", "https://chat.example.com/").unwrap();
        let transcript = extract_chat_with_registry(&doc, &registry(), CaptureDepth::Standard).unwrap();
        assert!(transcript.is_empty());
        assert_eq!(transcript.to_markdown(), "");
    }

    #[test]
    fn test_transcript_format() {
        let transcript = ChatTranscript {
            platform_name: "ChatGPT".to_string(),
            is_private_link: false,
            messages: vec![
                ChatMessage { role: ChatRole::User, content: "Question?".to_string() },
                ChatMessage { role: ChatRole::Assistant, content: "Answer.".to_string() },
                ChatMessage { role: ChatRole::Unknown, content: "Note.".to_string() },
            ],
        };
        assert_eq!(
            transcript.to_markdown(),
            "**User**:\nQuestion?\n\n---\n\n**Assistant**:\nAnswer.\n\n---\n\n**Message**:\nNote."
        );
    }

    #[test]
    fn test_truncate_turn() {
        assert_eq!(truncate_turn("short", 10), "short");
        assert_eq!(truncate_turn("abcdefghij", 10), "abcdefghij");
        assert_eq!(truncate_turn("abcde fghij", 6), format!("abcde{}", TURN_TRUNCATION_MARKER));
        assert_eq!(truncate_turn("日本語のテキスト", 3), format!("日本語{}", TURN_TRUNCATION_MARKER));
    }
}
