use crate::dom_tree::{DomTree, NodeId};
use crate::patterns::{NEGATIVE_CANDIDATES, POSITIVE_CANDIDATES, RuleAction, is_cjk, is_sentence_end, rule_weight};

/// Configuration for content scoring algorithm
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Candidates with fewer trimmed characters are skipped
    pub min_candidate_chars: usize,
    /// Div candidates with more direct block children are layout wrappers
    pub max_div_block_children: usize,
    /// Div candidates above this link density are skipped
    pub max_div_link_density: f64,
    /// Points per sentence-ending punctuation mark
    pub punctuation_weight: f64,
    /// Characters per point for the length bonus
    pub chars_per_point: usize,
    /// Cap on the length bonus
    pub max_length_bonus: f64,
    /// CJK character count above which the CJK bonus applies
    pub cjk_char_threshold: usize,
    /// Flat bonus for CJK-heavy text
    pub cjk_bonus: f64,
    /// Weight for positive class/ID patterns
    pub positive_weight: f64,
    /// Weight for negative class/ID patterns
    pub negative_weight: f64,
    /// Bonus given to `article`, `main` and `[role=main]` without a score entry
    pub semantic_anchor_bonus: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            min_candidate_chars: 25,
            max_div_block_children: 3,
            max_div_link_density: 0.5,
            punctuation_weight: 0.5,
            chars_per_point: 100,
            max_length_bonus: 3.0,
            cjk_char_threshold: 20,
            cjk_bonus: 2.0,
            positive_weight: rule_weight(RuleAction::Boost),
            negative_weight: rule_weight(RuleAction::Penalize),
            semantic_anchor_bonus: 20.0,
        }
    }
}

/// Calculate the base score for an element based on its tag name
///
/// Scores are assigned based on how likely a tag is to contain main content:
/// - ARTICLE: +30, MAIN: +25 (semantic content containers)
/// - SECTION: +10
/// - DIV: +5 (generic container)
/// - PRE, BLOCKQUOTE, TD, TH: +3 (content elements)
/// - FORM, NAV, ASIDE: -20
/// - HEADER, FOOTER: -15
pub fn base_tag_score(tag: &str) -> f64 {
    match tag {
        "article" => 30.0,
        "main" => 25.0,
        "section" => 10.0,
        "div" => 5.0,
        "pre" | "blockquote" => 3.0,
        "td" | "th" => 3.0,
        "form" | "nav" | "aside" => -20.0,
        "header" | "footer" => -15.0,
        _ => 0.0,
    }
}

/// Calculate the class/ID weight adjustment for a node
///
/// Positive and negative matches are additive, so a node matching both
/// patterns nets to zero.
pub fn class_id_weight(tree: &DomTree, id: NodeId, config: &ScoreConfig) -> f64 {
    let match_string = tree.class_and_id(id);
    if match_string.trim().is_empty() {
        return 0.0;
    }

    let mut weight = 0.0;
    if POSITIVE_CANDIDATES.is_match(&match_string) {
        weight += config.positive_weight;
    }
    if NEGATIVE_CANDIDATES.is_match(&match_string) {
        weight += config.negative_weight;
    }
    weight
}

/// Tag score plus class/ID weight, used to seed a node's running score
pub fn base_score(tree: &DomTree, id: NodeId, config: &ScoreConfig) -> f64 {
    let tag_score = tree.tag_name(id).map(base_tag_score).unwrap_or_default();
    tag_score + class_id_weight(tree, id, config)
}

/// Score a candidate's text
///
/// Starts at 1, adds [`ScoreConfig::punctuation_weight`] per sentence end,
/// one point per [`ScoreConfig::chars_per_point`] characters up to
/// [`ScoreConfig::max_length_bonus`], and [`ScoreConfig::cjk_bonus`] when the
/// text holds more than [`ScoreConfig::cjk_char_threshold`] CJK characters.
pub fn content_score(text: &str, config: &ScoreConfig) -> f64 {
    let text = text.trim();
    let mut score = 1.0;

    let sentence_ends = text.chars().filter(|c| is_sentence_end(*c)).count();
    score += sentence_ends as f64 * config.punctuation_weight;

    let per_point = config.chars_per_point.max(1);
    let length_bonus = ((text.chars().count() / per_point) as f64).min(config.max_length_bonus);
    score += length_bonus;

    let cjk_chars = text.chars().filter(|c| is_cjk(*c)).count();
    if cjk_chars > config.cjk_char_threshold {
        score += config.cjk_bonus;
    }

    score
}

/// Ratio of link text to total text, from raw character counts
///
/// Returns 0.0 for empty text and never exceeds 1.0.
pub fn link_density_of(link_chars: usize, total_chars: usize) -> f64 {
    if total_chars == 0 {
        return 0.0;
    }
    (link_chars as f64 / total_chars as f64).min(1.0)
}

/// Calculate the link density of a node
///
/// Link density is the ratio of anchor text characters to total text characters.
/// Returns a value from 0.0 (no links) to 1.0 (all text is in links).
pub fn link_density(tree: &DomTree, id: NodeId) -> f64 {
    let total = tree.text_content(id).trim().chars().count();

    // Nested anchors are invalid HTML; count only the outermost.
    let link_chars = tree
        .element_descendants(id)
        .into_iter()
        .filter(|node| tree.tag_name(*node) == Some("a"))
        .filter(|node| !has_anchor_ancestor_within(tree, *node, id))
        .map(|node| tree.text_content(node).trim().chars().count())
        .sum();

    link_density_of(link_chars, total)
}

fn has_anchor_ancestor_within(tree: &DomTree, node: NodeId, limit: NodeId) -> bool {
    let mut current = tree.parent(node);
    while let Some(parent) = current {
        if parent == limit {
            return false;
        }
        if tree.tag_name(parent) == Some("a") {
            return true;
        }
        current = tree.parent(parent);
    }
    false
}

/// Penalize a score by link density: `score * (1 - link_density)`
pub fn adjusted_score(score: f64, link_density: f64) -> f64 {
    score * (1.0 - link_density.clamp(0.0, 1.0))
}
