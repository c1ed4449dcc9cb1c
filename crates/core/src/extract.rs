use crate::dom_tree::{DomTree, NodeId, is_block_tag};
use crate::scoring::{ScoreConfig, adjusted_score, base_score, content_score, link_density};

use std::collections::HashMap;
use tracing::{debug, trace};

/// Configuration for best-node selection
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Tags whose text is scored and propagated to ancestors
    pub candidate_tags: Vec<&'static str>,
    /// Fraction of a candidate's score given to its grandparent
    pub grandparent_share: f64,
    /// Maximum candidates to score (0 = unlimited)
    pub max_candidates: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { candidate_tags: vec!["p", "pre", "td", "blockquote", "div"], grandparent_share: 0.5, max_candidates: 0 }
    }
}

/// Running scores keyed by node index.
///
/// Iteration follows insertion order, which is the order in which nodes were
/// first encountered while walking candidates in document order. Selection
/// relies on this to break ties reproducibly.
#[derive(Debug, Clone, Default)]
pub struct ScoreTable {
    order: Vec<NodeId>,
    scores: HashMap<NodeId, f64>,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> Option<f64> {
        self.scores.get(&id).copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.scores.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Add `amount` to the node's score, seeding it with `init()` on first use.
    pub fn add(&mut self, id: NodeId, init: impl FnOnce() -> f64, amount: f64) {
        let order = &mut self.order;
        let score = self.scores.entry(id).or_insert_with(|| {
            order.push(id);
            init()
        });
        *score += amount;
    }

    /// Entries in first-encountered order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.scores.get(id).map(|score| (*id, *score)))
    }
}

/// The node chosen as main content
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    /// The winning node in the scored tree
    pub node: NodeId,
    /// Its raw accumulated score
    pub score: f64,
    /// Its score after the link-density penalty
    pub adjusted_score: f64,
    /// Number of candidates that passed the filters
    pub candidate_count: usize,
    /// Whether selection fell back to body/root because nothing was scored
    pub is_fallback: bool,
}

/// Whether a node with the given trimmed text passes the candidate filters
fn qualifies(tree: &DomTree, id: NodeId, text: &str, config: &ScoreConfig) -> bool {
    if text.chars().count() < config.min_candidate_chars {
        return false;
    }

    if tree.tag_name(id) == Some("div") {
        let block_children = tree
            .element_children(id)
            .filter(|child| tree.tag_name(*child).is_some_and(is_block_tag))
            .count();
        if block_children > config.max_div_block_children {
            return false;
        }

        if link_density(tree, id) > config.max_div_link_density {
            return false;
        }
    }

    true
}

/// Score every qualifying candidate and propagate into parents and grandparents.
///
/// Returns the score table and the number of candidates that qualified.
pub fn score_candidates(tree: &DomTree, config: &ExtractConfig, score_config: &ScoreConfig) -> (ScoreTable, usize) {
    let mut table = ScoreTable::new();
    let max_candidates = if config.max_candidates == 0 { usize::MAX } else { config.max_candidates };
    let mut candidate_count = 0usize;

    for id in tree.element_descendants(tree.root()) {
        if candidate_count >= max_candidates {
            break;
        }

        let Some(tag) = tree.tag_name(id) else {
            continue;
        };
        if !config.candidate_tags.contains(&tag) {
            continue;
        }

        let text = tree.text_content(id);
        let text = text.trim();
        if !qualifies(tree, id, text, score_config) {
            continue;
        }

        candidate_count += 1;
        let score = content_score(text, score_config);
        trace!(node = id.index(), tag, score, "scored candidate");

        let Some(parent) = tree.parent(id) else {
            continue;
        };
        table.add(parent, || base_score(tree, parent, score_config), score);

        if let Some(grandparent) = tree.parent(parent) {
            table.add(
                grandparent,
                || base_score(tree, grandparent, score_config),
                score * config.grandparent_share,
            );
        }
    }

    inject_semantic_anchors(tree, &mut table, score_config);

    (table, candidate_count)
}

/// Give `article`, `main` and `[role=main]` an entry if scoring missed them
fn inject_semantic_anchors(tree: &DomTree, table: &mut ScoreTable, config: &ScoreConfig) {
    for id in tree.element_descendants(tree.root()) {
        let is_anchor = matches!(tree.tag_name(id), Some("article" | "main"))
            || tree
                .attr(id, "role")
                .is_some_and(|role| role.trim().eq_ignore_ascii_case("main"));

        if is_anchor && !table.contains(id) {
            table.add(id, || base_score(tree, id, config), config.semantic_anchor_bonus);
        }
    }
}

/// Pick the highest adjusted score; the first entry wins a tie.
fn select_top(tree: &DomTree, table: &ScoreTable) -> Option<(NodeId, f64, f64)> {
    let mut best: Option<(NodeId, f64, f64)> = None;

    for (id, score) in table.iter() {
        let adjusted = adjusted_score(score, link_density(tree, id));
        match best {
            Some((_, _, top)) if adjusted <= top => {}
            _ => best = Some((id, score, adjusted)),
        }
    }

    best
}

/// Find the single node most likely to hold the main content of a sanitized tree.
///
/// Falls back to `<body>`, then the root, when no node was scored.
pub fn extract_content(tree: &DomTree, config: &ExtractConfig, score_config: &ScoreConfig) -> ExtractedContent {
    let (table, candidate_count) = score_candidates(tree, config, score_config);

    match select_top(tree, &table) {
        Some((node, score, adjusted_score)) => {
            debug!(
                node = node.index(),
                tag = tree.tag_name(node).unwrap_or_default(),
                score,
                adjusted_score,
                candidate_count,
                scored = table.len(),
                "selected top candidate"
            );
            ExtractedContent { node, score, adjusted_score, candidate_count, is_fallback: false }
        }
        None => {
            let node = tree.body().unwrap_or_else(|| tree.root());
            debug!(candidate_count, "no scored nodes, falling back to body");
            ExtractedContent { node, score: 0.0, adjusted_score: 0.0, candidate_count, is_fallback: true }
        }
    }
}
