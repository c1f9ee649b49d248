//! Aggregate views over an observation table
//!
//! Everything here is recomputed from a borrowed slice and never cached, so a
//! summary always matches the table it was built from.

use crate::model::{Observation, Sentiment, Theme};
use serde::{Deserialize, Serialize};

/// Representative quotes kept per cluster
pub const DEFAULT_SAMPLE_QUOTES: usize = 3;

/// Per-theme rollup for visualization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub theme: Theme,
    pub observation_count: usize,
    /// 0-100
    pub percentage: f64,
    pub sentiment_negative: usize,
    pub sentiment_neutral: usize,
    pub sentiment_positive: usize,
    /// Up to `sample_size` negative observations, in table order
    pub sample_quotes: Vec<String>,
}

/// Count and share of one label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Share<T> {
    pub label: T,
    pub count: usize,
    pub percentage: f64,
}

/// Theme and sentiment breakdown of a whole table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Distribution {
    pub total: usize,
    pub themes: Vec<Share<Theme>>,
    pub sentiments: Vec<Share<Sentiment>>,
}

pub(crate) fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Counts per key, most frequent first; equal counts keep first-seen order
pub(crate) fn ranked_counts<K: Copy + PartialEq>(keys: impl Iterator<Item = K>) -> Vec<(K, usize)> {
    let mut counts: Vec<(K, usize)> = Vec::new();
    for key in keys {
        match counts.iter_mut().find(|(k, _)| *k == key) {
            Some((_, n)) => *n += 1,
            None => counts.push((key, 1)),
        }
    }
    // sort_by is stable
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

pub(crate) fn shares<K>(counts: Vec<(K, usize)>, total: usize) -> Vec<Share<K>> {
    counts
        .into_iter()
        .map(|(label, count)| Share {
            label,
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

impl Distribution {
    pub fn from_observations(observations: &[Observation]) -> Self {
        let total = observations.len();
        Self {
            total,
            themes: shares(ranked_counts(observations.iter().map(|o| o.theme)), total),
            sentiments: shares(ranked_counts(observations.iter().map(|o| o.sentiment)), total),
        }
    }

    pub fn theme_count(&self, theme: Theme) -> usize {
        self.themes
            .iter()
            .find(|s| s.label == theme)
            .map_or(0, |s| s.count)
    }

    pub fn sentiment_count(&self, sentiment: Sentiment) -> usize {
        self.sentiments
            .iter()
            .find(|s| s.label == sentiment)
            .map_or(0, |s| s.count)
    }
}

/// One summary per theme present in the table, largest cluster first.
///
/// Themes with equal counts stay in the order they first appear in the table.
pub fn cluster_summaries(observations: &[Observation], sample_size: usize) -> Vec<ClusterSummary> {
    let total = observations.len();

    ranked_counts(observations.iter().map(|o| o.theme))
        .into_iter()
        .map(|(theme, count)| {
            let members = || observations.iter().filter(move |o| o.theme == theme);
            let with_sentiment = |s: Sentiment| members().filter(|o| o.sentiment == s).count();

            ClusterSummary {
                theme,
                observation_count: count,
                percentage: percentage(count, total),
                sentiment_negative: with_sentiment(Sentiment::Negative),
                sentiment_neutral: with_sentiment(Sentiment::Neutral),
                sentiment_positive: with_sentiment(Sentiment::Positive),
                sample_quotes: members()
                    .filter(|o| o.sentiment == Sentiment::Negative)
                    .take(sample_size)
                    .map(|o| o.text.clone())
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(text: &str, theme: Theme, sentiment: Sentiment) -> Observation {
        Observation {
            text: text.to_string(),
            source_id: "interview_01".to_string(),
            theme,
            sentiment,
        }
    }

    fn table() -> Vec<Observation> {
        vec![
            obs("setup took me hours and hours", Theme::SetupFatigue, Sentiment::Negative),
            obs("too many buttons on every screen", Theme::FeatureOverwhelm, Sentiment::Neutral),
            obs("the blank screen was exhausting", Theme::SetupFatigue, Sentiment::Negative),
            obs("menus inside of other menus, awful", Theme::FeatureOverwhelm, Sentiment::Negative),
            obs("I tried a template and it helped", Theme::SetupFatigue, Sentiment::Positive),
            obs("configure this, configure that, ugh", Theme::SetupFatigue, Sentiment::Negative),
            obs("setup wizard was terrible honestly", Theme::SetupFatigue, Sentiment::Negative),
            obs("my notebook never judges me at all", Theme::Other, Sentiment::Negative),
        ]
    }

    #[test]
    fn test_clusters_ordered_by_count() {
        let clusters = cluster_summaries(&table(), DEFAULT_SAMPLE_QUOTES);
        let themes: Vec<Theme> = clusters.iter().map(|c| c.theme).collect();
        assert_eq!(
            themes,
            vec![Theme::SetupFatigue, Theme::FeatureOverwhelm, Theme::Other]
        );
        assert_eq!(clusters[0].observation_count, 5);
        assert!((clusters[0].percentage - 62.5).abs() < 1e-9);
    }

    #[test]
    fn test_sentiment_breakdown_sums_to_count() {
        for cluster in cluster_summaries(&table(), DEFAULT_SAMPLE_QUOTES) {
            assert_eq!(
                cluster.sentiment_negative + cluster.sentiment_neutral + cluster.sentiment_positive,
                cluster.observation_count
            );
        }
    }

    #[test]
    fn test_sample_quotes_are_first_negatives() {
        let clusters = cluster_summaries(&table(), DEFAULT_SAMPLE_QUOTES);
        assert_eq!(
            clusters[0].sample_quotes,
            vec![
                "setup took me hours and hours",
                "the blank screen was exhausting",
                "configure this, configure that, ugh",
            ]
        );
        assert_eq!(
            clusters[1].sample_quotes,
            vec!["menus inside of other menus, awful"]
        );

        let one = cluster_summaries(&table(), 1);
        assert_eq!(one[0].sample_quotes.len(), 1);
    }

    #[test]
    fn test_equal_counts_keep_first_appearance() {
        let rows = vec![
            obs("a context switch sentence here", Theme::ContextSwitching, Sentiment::Neutral),
            obs("a guilt sentence here for sure", Theme::ProductivityGuilt, Sentiment::Neutral),
        ];
        let clusters = cluster_summaries(&rows, 3);
        assert_eq!(clusters[0].theme, Theme::ContextSwitching);
        assert_eq!(clusters[1].theme, Theme::ProductivityGuilt);
    }

    #[test]
    fn test_distribution() {
        let dist = Distribution::from_observations(&table());
        assert_eq!(dist.total, 8);
        assert_eq!(dist.theme_count(Theme::SetupFatigue), 5);
        assert_eq!(dist.theme_count(Theme::ContextSwitching), 0);
        assert_eq!(dist.sentiments[0].label, Sentiment::Negative);
        assert_eq!(dist.sentiment_count(Sentiment::Negative), 6);
        let summed: f64 = dist.themes.iter().map(|s| s.percentage).sum();
        assert!((summed - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_table() {
        assert!(cluster_summaries(&[], DEFAULT_SAMPLE_QUOTES).is_empty());
        let dist = Distribution::from_observations(&[]);
        assert_eq!(dist, Distribution::default());
    }
}
