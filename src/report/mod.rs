//! Report generation

pub mod html;

use crate::export::table_digest;
use crate::model::{Observation, Sentiment};
use crate::summary::{cluster_summaries, ClusterSummary, DEFAULT_SAMPLE_QUOTES};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Headline numbers for the stat cards
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub observations: usize,
    pub transcripts: usize,
    pub themes: usize,
    pub negative: usize,
    pub negative_share: f64,
}

impl Summary {
    pub fn from_observations(observations: &[Observation]) -> Self {
        let transcripts: BTreeSet<&str> = observations.iter().map(|o| o.source_id.as_str()).collect();
        let themes: BTreeSet<_> = observations.iter().map(|o| o.theme).collect();
        let negative = observations
            .iter()
            .filter(|o| o.sentiment == Sentiment::Negative)
            .count();

        Self {
            observations: observations.len(),
            transcripts: transcripts.len(),
            themes: themes.len(),
            negative,
            negative_share: if observations.is_empty() {
                0.0
            } else {
                negative as f64 / observations.len() as f64 * 100.0
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub title: String,
    pub sample_quotes: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "Affinity Map".to_string(),
            sample_quotes: DEFAULT_SAMPLE_QUOTES,
        }
    }
}

/// Everything the HTML writer needs, computed once
pub struct ReportContext<'a> {
    pub options: &'a ReportOptions,
    pub summary: Summary,
    pub clusters: Vec<ClusterSummary>,
    pub observations: &'a [Observation],
    pub digest: String,
}

impl<'a> ReportContext<'a> {
    pub fn new(observations: &'a [Observation], options: &'a ReportOptions) -> Self {
        Self {
            options,
            summary: Summary::from_observations(observations),
            clusters: cluster_summaries(observations, options.sample_quotes),
            observations,
            digest: table_digest(observations),
        }
    }
}

/// Write an HTML report to `path`
pub fn generate<P: AsRef<Path>>(
    path: P,
    observations: &[Observation],
    options: &ReportOptions,
) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    html::write(&mut writer, &ReportContext::new(observations, options))?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Theme;

    fn obs(source: &str, theme: Theme, sentiment: Sentiment) -> Observation {
        Observation {
            text: "an observation long enough to keep".to_string(),
            source_id: source.to_string(),
            theme,
            sentiment,
        }
    }

    #[test]
    fn test_summary_counts() {
        let rows = vec![
            obs("interview_01", Theme::SetupFatigue, Sentiment::Negative),
            obs("interview_01", Theme::Other, Sentiment::Neutral),
            obs("interview_02", Theme::SetupFatigue, Sentiment::Positive),
            obs("interview_03", Theme::ToolHopping, Sentiment::Negative),
        ];
        let summary = Summary::from_observations(&rows);
        assert_eq!(summary.observations, 4);
        assert_eq!(summary.transcripts, 3);
        assert_eq!(summary.themes, 3);
        assert_eq!(summary.negative, 2);
        assert!((summary.negative_share - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_empty() {
        let summary = Summary::from_observations(&[]);
        assert_eq!(summary.observations, 0);
        assert_eq!(summary.negative_share, 0.0);
    }

    #[test]
    fn test_generate_writes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.html");
        let rows = vec![obs("interview_01", Theme::SetupFatigue, Sentiment::Negative)];
        generate(&path, &rows, &ReportOptions::default()).unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Setup Fatigue"));
    }
}
