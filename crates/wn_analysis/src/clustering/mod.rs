//! Near-duplicate headline clustering.
//!
//! Titles are reduced to token sets, compared pairwise with Jaccard
//! similarity, and every pair at or above the threshold is merged in a
//! [`UnionFind`]. Clusters are therefore connected components: A~B and B~C put
//! A, B and C together even when A~C falls below the threshold.
//!
//! The comparison is quadratic in the number of retained titles; callers bound
//! it with `limit`.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;
use wn_core::{NormalizedArticle, StoredArticle};

pub mod union_find;

pub use union_find::UnionFind;

/// Default number of most recent titles compared.
pub const DEFAULT_LIMIT: usize = 350;
/// Default minimum Jaccard similarity for two titles to be linked.
pub const DEFAULT_THRESHOLD: f64 = 0.35;

/// Tokens shorter than this many characters are ignored.
const MIN_TOKEN_CHARS: usize = 3;

/// Anything that can be clustered by its headline.
pub trait Headline {
    fn headline(&self) -> Option<&str>;
    fn published_at(&self) -> DateTime<Utc>;
}

impl Headline for StoredArticle {
    fn headline(&self) -> Option<&str> {
        Some(&self.title)
    }

    fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }
}

impl Headline for NormalizedArticle {
    fn headline(&self) -> Option<&str> {
        Some(&self.title)
    }

    fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }
}

/// A group of at least two articles with similar headlines, most recent first.
#[derive(Debug, Clone)]
pub struct Cluster<'a, T> {
    pub members: Vec<&'a T>,
}

impl<'a, T> Cluster<'a, T> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Lowercase word tokens of at least three characters.
pub fn token_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

/// Intersection over union; 0.0 when either side is empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count();
    if inter == 0 {
        return 0.0;
    }
    let union = a.len() + b.len() - inter;
    inter as f64 / union as f64
}

/// Groups the `limit` most recent titled items by headline similarity.
///
/// Singletons are dropped. Clusters come back ordered by their most recent
/// member; use [`sort_by_size`] for presentation order.
pub fn cluster_by_title<T: Headline>(items: &[T], limit: usize, threshold: f64) -> Vec<Cluster<'_, T>> {
    let mut subset: Vec<(&T, &str)> = items
        .iter()
        .filter_map(|item| item.headline().map(|title| (item, title)))
        .collect();
    subset.sort_by(|a, b| b.0.published_at().cmp(&a.0.published_at()));
    subset.truncate(limit);

    let tokens: Vec<HashSet<String>> = subset.iter().map(|(_, title)| token_set(title)).collect();
    let n = tokens.len();
    let mut uf = UnionFind::new(n);

    let mut edges = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            if jaccard(&tokens[i], &tokens[j]) >= threshold {
                uf.union(i, j);
                edges += 1;
            }
        }
    }

    // keyed by first member index so groups keep recency order
    let mut groups: BTreeMap<usize, Vec<&T>> = BTreeMap::new();
    let mut first_of_root: Vec<Option<usize>> = vec![None; n];
    for (idx, (item, _)) in subset.iter().enumerate() {
        let root = uf.find(idx);
        let key = *first_of_root[root].get_or_insert(idx);
        groups.entry(key).or_default().push(*item);
    }

    let clusters: Vec<Cluster<'_, T>> = groups
        .into_values()
        .filter(|members| members.len() > 1)
        .map(|members| Cluster { members })
        .collect();

    debug!(
        compared = n,
        edges,
        clusters = clusters.len(),
        threshold,
        "Clustered headlines"
    );
    clusters
}

/// Orders clusters largest first; equal sizes keep their relative order.
pub fn sort_by_size<T>(clusters: &mut [Cluster<'_, T>]) {
    clusters.sort_by(|a, b| b.len().cmp(&a.len()));
}
