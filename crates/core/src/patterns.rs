//! Keyword rules used by the sanitizer and the scorer.
//!
//! The class/id keyword lists are empirical, so they live in one versioned
//! table instead of being scattered through the algorithms. Each rule names a
//! pattern and what the pipeline does when a node's `class` + `id` string
//! matches it. Patterns are compiled once on first use.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

/// Bumped whenever a pattern or weight in [`KEYWORD_RULES`] changes.
pub const PATTERN_TABLE_VERSION: u32 = 1;

/// What a keyword rule does when it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    /// Sanitizer removes the node if it is short and not also positive.
    PruneIfShort,
    /// Scorer adds the weight to the node's base score.
    Boost,
    /// Scorer adds the (negative) weight to the node's base score.
    Penalize,
}

/// A single entry in the keyword table.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub name: &'static str,
    pub pattern: &'static str,
    pub action: RuleAction,
    pub weight: f64,
}

/// The keyword table, in the order the pipeline consults it.
pub const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        name: "unlikely",
        pattern: r"(?i)-ad-|ai2html|banner|breadcrumbs?|combx|comment|community|cookie|cover-wrap|disqus|extra|footer|gdpr|header|legends|menu|modal|nav|newsletter|pager|pagination|popup|promo|related|remark|replies|rss|share|shoutbox|sidebar|skyscraper|social|sponsor|subscribe|supplemental|ad-break|agegate|widget|yom-remote",
        action: RuleAction::PruneIfShort,
        weight: 0.0,
    },
    KeywordRule {
        name: "positive",
        pattern: r"(?i)article|body|content|entry|hentry|h-entry|main|markdown|page|post|prose|text|blog|story",
        action: RuleAction::Boost,
        weight: 25.0,
    },
    KeywordRule {
        name: "negative",
        pattern: r"(?i)-ad-|hidden|^hid$| hid$| hid |^hid |advert|banner|combx|comment|com-|contact|foot|footer|footnote|gdpr|masthead|media|menu|meta|nav|outbrain|promo|related|scroll|share|shoutbox|sidebar|skyscraper|social|sponsor|shopping|tags|tool|widget",
        action: RuleAction::Penalize,
        weight: -25.0,
    },
];

fn compile(action: RuleAction) -> Regex {
    let rule = KEYWORD_RULES
        .iter()
        .find(|rule| rule.action == action)
        .expect("keyword table has a rule for every action");
    Regex::new(rule.pattern).expect("keyword rule pattern compiles")
}

/// Class/id keywords that mark a node as probable boilerplate.
pub static UNLIKELY_CANDIDATES: LazyLock<Regex> = LazyLock::new(|| compile(RuleAction::PruneIfShort));

/// Class/id keywords that mark a node as probable main content.
pub static POSITIVE_CANDIDATES: LazyLock<Regex> = LazyLock::new(|| compile(RuleAction::Boost));

/// Class/id keywords that penalize a node during scoring.
pub static NEGATIVE_CANDIDATES: LazyLock<Regex> = LazyLock::new(|| compile(RuleAction::Penalize));

/// Inline styles that hide an element.
pub static HIDDEN_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)display\s*:\s*none|visibility\s*:\s*hidden").expect("HIDDEN_STYLE regex"));

/// Weight applied for a rule action, read from the table.
pub fn rule_weight(action: RuleAction) -> f64 {
    KEYWORD_RULES
        .iter()
        .find(|rule| rule.action == action)
        .map(|rule| rule.weight)
        .unwrap_or_default()
}

/// Latin and CJK sentence-ending punctuation.
pub fn is_sentence_end(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '。' | '！' | '？')
}

/// CJK ideographs, kana and hangul.
pub fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{30ff}'
        | '\u{3400}'..='\u{4dbf}'
        | '\u{4e00}'..='\u{9fff}'
        | '\u{f900}'..='\u{faff}'
        | '\u{ac00}'..='\u{d7af}')
}
