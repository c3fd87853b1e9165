//! Keyword-driven topic classification.
//!
//! Free text is scored against [`CATEGORY_KEYWORDS`] and the top one or two
//! categories are kept. Provider-supplied labels are reconciled against the
//! same taxonomy through the alias table and keyword fallback.

use std::collections::{BTreeMap, BTreeSet};

use crate::taxonomy::{ALIAS_LOOKUP, CANONICAL_CATEGORIES, CATEGORY_KEYWORDS};

/// At most this many categories are attached to an article.
pub const MAX_TOPICS: usize = 2;

pub type CategoryScores<'a> = BTreeMap<&'a str, usize>;

/// Counts distinct keyword hits per category (case-insensitive substring
/// presence). Categories without hits are left out.
pub fn score_categories(text: &str) -> CategoryScores<'static> {
    let text = text.to_lowercase();
    let mut scores = BTreeMap::new();
    for (category, keywords) in CATEGORY_KEYWORDS {
        let hits = keywords.iter().filter(|kw| text.contains(*kw)).count();
        if hits > 0 {
            scores.insert(*category, hits);
        }
    }
    scores
}

/// Keeps the leader plus any runner-up within one point of it, at most two.
/// Equal scores are ordered by name.
pub fn select_categories<'a>(scores: &CategoryScores<'a>) -> Vec<&'a str> {
    let mut ordered: Vec<(&'a str, usize)> = scores.iter().map(|(c, s)| (*c, *s)).collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let top = match ordered.first() {
        Some((_, score)) if *score > 0 => *score,
        _ => return Vec::new(),
    };

    let mut selected = Vec::with_capacity(MAX_TOPICS);
    for (category, score) in ordered {
        if score + 1 < top {
            break;
        }
        selected.push(category);
        if selected.len() == MAX_TOPICS {
            break;
        }
    }
    selected
}

/// Categories for a free-text blob such as title plus summary.
pub fn categorize_text(text: &str) -> Vec<&'static str> {
    select_categories(&score_categories(text))
}

/// Resolves a single provider label to a canonical category.
fn resolve_label(label: &str) -> Option<&'static str> {
    if let Some(target) = ALIAS_LOOKUP.get(label) {
        return Some(*target);
    }
    if let Some(category) = CANONICAL_CATEGORIES.get(label) {
        return Some(*category);
    }
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| label.contains(kw)))
        .map(|(category, _)| *category)
}

/// Reconciles provider topic labels with the taxonomy.
///
/// Falls back to scoring `fallback` when no label resolves. The result is
/// sorted alphabetically and cut to [`MAX_TOPICS`], so with more than two
/// resolved labels the alphabetically first ones win, not the strongest.
pub fn normalize_topics<S: AsRef<str>>(raw_topics: &[S], fallback: Option<&str>) -> Vec<String> {
    let mut resolved: BTreeSet<&'static str> = raw_topics
        .iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .filter_map(|t| resolve_label(&t))
        .collect();

    if resolved.is_empty() {
        if let Some(text) = fallback.filter(|t| !t.is_empty()) {
            resolved.extend(categorize_text(text));
        }
    }

    resolved
        .into_iter()
        .take(MAX_TOPICS)
        .map(str::to_string)
        .collect()
}
