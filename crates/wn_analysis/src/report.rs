//! Batch aggregates handed to the presentation layer.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use wn_core::StoredArticle;

use crate::clustering::{self, Cluster};
use crate::framing::count_frames;
use crate::taxonomy::frame_names;

/// Example titles shown per cluster.
const CLUSTER_EXAMPLES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicCount {
    pub topic: String,
    pub article_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameTotal {
    pub frame: &'static str,
    pub count: usize,
    /// Percentage of all frame hits in the batch.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyFrames {
    /// Monday of the week.
    pub week_start: NaiveDate,
    pub counts: BTreeMap<&'static str, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub cluster_size: usize,
    pub topic_hint: Option<String>,
    pub examples: Vec<String>,
    pub article_ids: Vec<String>,
}

/// Coverage volume of a country relative to the others in the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageTier {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryCount {
    pub source_country: String,
    pub article_count: usize,
    /// Percentage of the counted articles, one decimal.
    pub share: f64,
    pub coverage: CoverageTier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainCount {
    pub source_country: String,
    pub source_domain: String,
    pub article_count: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub cluster_limit: usize,
    pub threshold: f64,
    pub top_clusters: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            cluster_limit: clustering::DEFAULT_LIMIT,
            threshold: clustering::DEFAULT_THRESHOLD,
            top_clusters: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub article_count: usize,
    pub topics: Vec<TopicCount>,
    pub frames: Vec<FrameTotal>,
    pub weekly_frames: Vec<WeeklyFrames>,
    pub clusters: Vec<ClusterSummary>,
    pub countries: Vec<CountryCount>,
    pub domains: Vec<DomainCount>,
}

pub fn build_report(articles: &[StoredArticle], options: ReportOptions) -> Report {
    let mut clusters = clustering::cluster_by_title(articles, options.cluster_limit, options.threshold);
    clustering::sort_by_size(&mut clusters);
    clusters.truncate(options.top_clusters);

    Report {
        article_count: articles.len(),
        topics: topic_counts(articles),
        frames: frame_totals(articles),
        weekly_frames: weekly_frames(articles),
        clusters: cluster_summaries(&clusters),
        countries: country_counts(articles),
        domains: domain_counts(articles),
    }
}

/// Articles per topic, most written first. The "unknown" placeholder is left out.
pub fn topic_counts(articles: &[StoredArticle]) -> Vec<TopicCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for topic in articles.iter().flat_map(|a| a.topics.iter()) {
        if topic.eq_ignore_ascii_case("unknown") {
            continue;
        }
        *counts.entry(topic.as_str()).or_default() += 1;
    }
    let mut out: Vec<TopicCount> = counts
        .into_iter()
        .map(|(topic, article_count)| TopicCount {
            topic: topic.to_string(),
            article_count,
        })
        .collect();
    out.sort_by(|a, b| b.article_count.cmp(&a.article_count).then_with(|| a.topic.cmp(&b.topic)));
    out
}

/// Sums per-article frame flags over the batch.
pub fn frame_totals(articles: &[StoredArticle]) -> Vec<FrameTotal> {
    let mut sums: BTreeMap<&'static str, usize> = frame_names().map(|f| (f, 0)).collect();
    for article in articles {
        for (frame, flag) in count_frames(article.framing_text()) {
            *sums.entry(frame).or_default() += flag as usize;
        }
    }
    let total: usize = sums.values().sum();
    let mut out: Vec<FrameTotal> = sums
        .into_iter()
        .map(|(frame, count)| FrameTotal {
            frame,
            count,
            share: if total > 0 { count as f64 * 100.0 / total as f64 } else { 0.0 },
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.frame.cmp(b.frame)));
    out
}

/// Frame flags summed per calendar week, oldest week first.
pub fn weekly_frames(articles: &[StoredArticle]) -> Vec<WeeklyFrames> {
    let mut weeks: BTreeMap<NaiveDate, BTreeMap<&'static str, usize>> = BTreeMap::new();
    for article in articles {
        let week = week_start(article.published_at.date_naive());
        let counts = weeks
            .entry(week)
            .or_insert_with(|| frame_names().map(|f| (f, 0)).collect());
        for (frame, flag) in count_frames(article.framing_text()) {
            *counts.entry(frame).or_default() += flag as usize;
        }
    }
    weeks
        .into_iter()
        .map(|(week_start, counts)| WeeklyFrames { week_start, counts })
        .collect()
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn cluster_summaries(clusters: &[Cluster<'_, StoredArticle>]) -> Vec<ClusterSummary> {
    clusters
        .iter()
        .map(|cluster| ClusterSummary {
            cluster_size: cluster.len(),
            topic_hint: topic_hint(&cluster.members),
            examples: cluster
                .members
                .iter()
                .take(CLUSTER_EXAMPLES)
                .map(|m| m.title.clone())
                .collect(),
            article_ids: cluster.members.iter().map(|m| m.article_id.clone()).collect(),
        })
        .collect()
}

/// Most common topic among the members; ties go to the first seen.
fn topic_hint(members: &[&StoredArticle]) -> Option<String> {
    let mut seen: Vec<(&str, usize)> = Vec::new();
    for topic in members.iter().flat_map(|m| m.topics.iter()) {
        match seen.iter_mut().find(|(t, _)| *t == topic.as_str()) {
            Some((_, n)) => *n += 1,
            None => seen.push((topic.as_str(), 1)),
        }
    }
    let best = seen.iter().map(|(_, n)| *n).max()?;
    seen.into_iter()
        .find(|(_, n)| *n == best)
        .map(|(t, _)| t.to_string())
}

/// Articles per source country, largest first. Missing countries are skipped.
///
/// Countries at or above the 66th percentile of counts are high coverage,
/// those at or below the 33rd are low.
pub fn country_counts(articles: &[StoredArticle]) -> Vec<CountryCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for country in articles.iter().filter_map(|a| a.source_country.as_deref()) {
        *counts.entry(country).or_default() += 1;
    }
    let total: usize = counts.values().sum();
    let mut volumes: Vec<f64> = counts.values().map(|n| *n as f64).collect();
    volumes.sort_by(f64::total_cmp);
    let low_cut = quantile(&volumes, 0.33);
    let high_cut = quantile(&volumes, 0.66);

    let mut out: Vec<CountryCount> = counts
        .into_iter()
        .map(|(country, article_count)| {
            let n = article_count as f64;
            let coverage = if n >= high_cut {
                CoverageTier::High
            } else if n <= low_cut {
                CoverageTier::Low
            } else {
                CoverageTier::Medium
            };
            CountryCount {
                source_country: country.to_string(),
                article_count,
                share: (n * 1000.0 / total as f64).round() / 10.0,
                coverage,
            }
        })
        .collect();
    out.sort_by(|a, b| {
        b.article_count
            .cmp(&a.article_count)
            .then_with(|| a.source_country.cmp(&b.source_country))
    });
    out
}

/// Linear interpolation between the closest ranks of sorted `values`.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted {
        [] => 0.0,
        [only] => *only,
        _ => {
            let pos = q * (sorted.len() - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = (lower + 1).min(sorted.len() - 1);
            sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
        }
    }
}

/// Articles per (country, domain) pair, largest first. Rows missing either are skipped.
pub fn domain_counts(articles: &[StoredArticle]) -> Vec<DomainCount> {
    let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
    for article in articles {
        if let (Some(country), Some(domain)) = (article.source_country.as_deref(), article.source_domain.as_deref()) {
            *counts.entry((country, domain)).or_default() += 1;
        }
    }
    let mut out: Vec<DomainCount> = counts
        .into_iter()
        .map(|((country, domain), article_count)| DomainCount {
            source_country: country.to_string(),
            source_domain: domain.to_string(),
            article_count,
        })
        .collect();
    out.sort_by(|a, b| {
        b.article_count
            .cmp(&a.article_count)
            .then_with(|| a.source_country.cmp(&b.source_country))
            .then_with(|| a.source_domain.cmp(&b.source_domain))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use wn_core::Provider;

    fn article(id: &str, title: &str, body: &str, topics: &[&str], day: u32) -> StoredArticle {
        StoredArticle {
            article_id: id.to_string(),
            provider: Provider::EventRegistry,
            provider_id: None,
            url: format!("https://example.com/{id}"),
            title: title.to_string(),
            summary: None,
            body: Some(body.to_string()),
            image_url: None,
            // 2025-01-06 is a Monday
            published_at: Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).unwrap(),
            source_name: None,
            source_domain: None,
            source_country: Some("SE".to_string()),
            language: Some("English".to_string()),
            topics: topics.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn sample() -> Vec<StoredArticle> {
        vec![
            article("a", "Troops advance on frontline city", "The war widened.", &["politics"], 6),
            article("b", "Troops advance on frontline town", "Shelling and famine.", &["politics", "society"], 8),
            article("c", "Markets shrug off sanctions", "New economic sanctions.", &["business", "Unknown"], 14),
        ]
    }

    #[test]
    fn test_topic_counts_skip_unknown() {
        let counts = topic_counts(&sample());
        assert_eq!(counts[0], TopicCount { topic: "politics".to_string(), article_count: 2 });
        assert!(counts.iter().all(|c| c.topic != "Unknown"));
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn test_frame_totals_and_shares() {
        let totals = frame_totals(&sample());
        let war = totals.iter().find(|t| t.frame == "Conflict & War").unwrap();
        assert_eq!(war.count, 2);
        assert_eq!(totals[0].frame, "Conflict & War");
        let share_sum: f64 = totals.iter().map(|t| t.share).sum();
        assert!((share_sum - 100.0).abs() < 1e-9);
        assert_eq!(totals.len(), 6);
    }

    #[test]
    fn test_frame_totals_of_nothing() {
        let totals = frame_totals(&[]);
        assert!(totals.iter().all(|t| t.count == 0 && t.share == 0.0));
    }

    #[test]
    fn test_weekly_frames_bucket_by_monday() {
        let weekly = weekly_frames(&sample());
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[0].week_start, NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
        assert_eq!(weekly[0].counts["Conflict & War"], 2);
        assert_eq!(weekly[0].counts["Humanitarian Impact"], 1);
        assert_eq!(weekly[1].week_start, NaiveDate::from_ymd_opt(2025, 1, 13).unwrap());
        assert_eq!(weekly[1].counts["Sanctions & Pressure"], 1);
    }

    #[test]
    fn test_build_report_summarizes_clusters() {
        let report = build_report(&sample(), ReportOptions::default());
        assert_eq!(report.article_count, 3);
        assert_eq!(report.clusters.len(), 1);
        let cluster = &report.clusters[0];
        assert_eq!(cluster.cluster_size, 2);
        assert_eq!(cluster.topic_hint.as_deref(), Some("politics"));
        assert_eq!(cluster.examples[0], "Troops advance on frontline town");
        assert_eq!(report.countries[0].article_count, 3);
    }

    fn located(id: &str, country: Option<&str>, domain: Option<&str>) -> StoredArticle {
        let mut a = article(id, "Quiet day", "", &[], 6);
        a.source_country = country.map(str::to_string);
        a.source_domain = domain.map(str::to_string);
        a
    }

    #[test]
    fn test_country_shares_and_coverage_tiers() {
        let mut articles = Vec::new();
        for i in 0..6 {
            articles.push(located(&format!("us{i}"), Some("US"), None));
        }
        for i in 0..3 {
            articles.push(located(&format!("gb{i}"), Some("GB"), None));
        }
        articles.push(located("se0", Some("SE"), None));
        articles.push(located("none", None, None));

        let counts = country_counts(&articles);
        let summary: Vec<_> = counts
            .iter()
            .map(|c| (c.source_country.as_str(), c.article_count, c.share, c.coverage))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("US", 6, 60.0, CoverageTier::High),
                ("GB", 3, 30.0, CoverageTier::Medium),
                ("SE", 1, 10.0, CoverageTier::Low),
            ]
        );
    }

    #[test]
    fn test_single_country_is_high_coverage() {
        let counts = country_counts(&[located("a", Some("FR"), None)]);
        assert_eq!(counts[0].share, 100.0);
        assert_eq!(counts[0].coverage, CoverageTier::High);
        assert!(country_counts(&[]).is_empty());
    }

    #[test]
    fn test_domain_counts_need_country_and_domain() {
        let articles = vec![
            located("a", Some("GB"), Some("bbc.co.uk")),
            located("b", Some("GB"), Some("bbc.co.uk")),
            located("c", Some("GB"), Some("theguardian.com")),
            located("d", None, Some("example.com")),
            located("e", Some("US"), None),
        ];
        let counts = domain_counts(&articles);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].source_domain, "bbc.co.uk");
        assert_eq!(counts[0].article_count, 2);
        assert_eq!(counts[1].source_domain, "theguardian.com");
    }
}
