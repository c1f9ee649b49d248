//! Research synthesis
//!
//! Rolls the observation table (plus interview metadata when available) up
//! into quantitative findings, qualitative themes and ranked key insights.

use crate::export::ExportError;
use crate::generator::{InterviewMetadata, Persona};
use crate::model::{Observation, Sentiment, Theme};
use crate::summary::{cluster_summaries, percentage, ranked_counts, shares, ClusterSummary, Share};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

/// How many interviews raised each theme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prevalence {
    pub theme: Theme,
    pub interviews: usize,
    /// 0-1
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantitativeFindings {
    /// Interviews in the metadata, or transcripts in the table without it
    pub sample_size: usize,
    pub avg_duration_minutes: Option<f64>,
    pub avg_tools_abandoned: Option<f64>,
    pub persona_distribution: Vec<Share<Persona>>,
    pub observation_count: usize,
    pub theme_distribution: Vec<Share<Theme>>,
    /// Named themes, highest rate first
    pub pain_point_prevalence: Vec<Prevalence>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Critical,
    High,
    Medium,
}

impl Priority {
    fn from_rate(rate: f64) -> Self {
        if rate >= 0.7 {
            Priority::Critical
        } else if rate >= 0.5 {
            Priority::High
        } else {
            Priority::Medium
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::Critical => "Critical",
            Priority::High => "High",
            Priority::Medium => "Medium",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyInsight {
    /// `INS001`, `INS002`, ... in rank order
    pub insight_id: String,
    pub theme: Theme,
    pub title: String,
    pub description: String,
    pub evidence: Vec<String>,
    pub implication: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisReport {
    pub quantitative_findings: QuantitativeFindings,
    pub qualitative_themes: Vec<ClusterSummary>,
    pub key_insights: Vec<KeyInsight>,
}

/// (title, description, implication) for a named theme
fn insight_text(theme: Theme) -> (&'static str, &'static str, &'static str) {
    match theme {
        Theme::FeatureOverwhelm => (
            "Feature Paradox: More Features, Less Use",
            "Participants with the most capable tools finish the fewest tasks.",
            "Disclose features gradually. A first session should show only the basics.",
        ),
        Theme::ProductivityGuilt => (
            "Guilt Drives Abandonment",
            "Tools that surface unfinished work make people feel inadequate and stay away.",
            "Highlight what got done. Drop overdue badges and alarm colors.",
        ),
        Theme::SetupFatigue => (
            "Setup Exhausts Users Before Any Real Work",
            "Hours of configuration and tutorials come before the first finished task.",
            "Get to a first task in minutes with guided onboarding and sensible defaults.",
        ),
        Theme::ContextSwitching => (
            "One Size Does Not Fit Every Context",
            "Work, study and personal tasks need different amounts of structure.",
            "Let people keep separate contexts without separate tools.",
        ),
        Theme::PrioritizationDifficulty => (
            "Long Lists Stall the First Step",
            "Faced with everything at once, participants cannot pick where to start.",
            "Show a handful of tasks at a time and suggest the next one.",
        ),
        Theme::ToolHopping => (
            "The Fresh Start Fallacy",
            "Switching tools feels like progress but repeats the same cycle.",
            "Retention work matters more than acquisition. Win back lapsed users gently.",
        ),
        Theme::SocialComparison => (
            "Power-User Comparison Breeds Anxiety",
            "Polished setups seen online make ordinary use feel like failure.",
            "Present simple use as the intended use, not a beginner tier.",
        ),
        Theme::LackOfFlexibility => (
            "Rigid Structure Pushes People Back to Paper",
            "Forced templates and fields clash with how participants think.",
            "Offer free-form capture next to structure, never instead of it.",
        ),
        Theme::Other => ("", "", ""),
    }
}

fn mean(values: impl Iterator<Item = u32>) -> Option<f64> {
    let (sum, n) = values.fold((0u64, 0u64), |(sum, n), v| (sum + u64::from(v), n + 1));
    (n > 0).then(|| sum as f64 / n as f64)
}

fn prevalence(observations: &[Observation], sample_size: usize) -> Vec<Prevalence> {
    let mut rows: Vec<Prevalence> = Theme::NAMED
        .iter()
        .map(|&theme| {
            let interviews: BTreeSet<&str> = observations
                .iter()
                .filter(|o| o.theme == theme)
                .map(|o| o.source_id.as_str())
                .collect();
            Prevalence {
                theme,
                interviews: interviews.len(),
                rate: percentage(interviews.len(), sample_size) / 100.0,
            }
        })
        .collect();
    // stable: equal rates keep canonical theme order
    rows.sort_by(|a, b| b.interviews.cmp(&a.interviews));
    rows
}

fn key_insights(
    observations: &[Observation],
    prevalence: &[Prevalence],
    sample_size: usize,
) -> Vec<KeyInsight> {
    prevalence
        .iter()
        .filter(|p| p.interviews > 0)
        .enumerate()
        .map(|(i, p)| {
            let members: Vec<&Observation> =
                observations.iter().filter(|o| o.theme == p.theme).collect();
            let negative: Vec<&&Observation> = members
                .iter()
                .filter(|o| o.sentiment == Sentiment::Negative)
                .collect();

            let mut evidence = vec![
                format!(
                    "{:.0}% of interviews raised it ({} of {})",
                    p.rate * 100.0,
                    p.interviews,
                    sample_size
                ),
                format!(
                    "{} observations, {:.0}% negative",
                    members.len(),
                    percentage(negative.len(), members.len())
                ),
            ];
            if let Some(quote) = negative.first() {
                evidence.push(format!("\"{}\"", quote.text));
            }

            let (title, description, implication) = insight_text(p.theme);
            KeyInsight {
                insight_id: format!("INS{:03}", i + 1),
                theme: p.theme,
                title: title.to_string(),
                description: description.to_string(),
                evidence,
                implication: implication.to_string(),
                priority: Priority::from_rate(p.rate),
            }
        })
        .collect()
}

/// Synthesize findings from a table and (possibly empty) interview metadata
pub fn synthesize(
    observations: &[Observation],
    metadata: &[InterviewMetadata],
    sample_quotes: usize,
) -> SynthesisReport {
    let transcripts: BTreeSet<&str> = observations.iter().map(|o| o.source_id.as_str()).collect();
    let sample_size = if metadata.is_empty() {
        transcripts.len()
    } else {
        metadata.len()
    };
    let pain_point_prevalence = prevalence(observations, sample_size);

    SynthesisReport {
        key_insights: key_insights(observations, &pain_point_prevalence, sample_size),
        quantitative_findings: QuantitativeFindings {
            sample_size,
            avg_duration_minutes: mean(metadata.iter().map(|m| m.duration_minutes)),
            avg_tools_abandoned: mean(metadata.iter().map(|m| m.tools_abandoned)),
            persona_distribution: shares(
                ranked_counts(metadata.iter().map(|m| m.persona)),
                metadata.len(),
            ),
            observation_count: observations.len(),
            theme_distribution: shares(
                ranked_counts(observations.iter().map(|o| o.theme)),
                observations.len(),
            ),
            pain_point_prevalence,
        },
        qualitative_themes: cluster_summaries(observations, sample_quotes),
    }
}

pub fn write_synthesis_json<P: AsRef<Path>>(
    path: P,
    report: &SynthesisReport,
) -> Result<(), ExportError> {
    fs::write(path, serde_json::to_string_pretty(report)?)?;
    Ok(())
}

/// Plain-text findings document
pub fn render_findings(report: &SynthesisReport) -> String {
    Findings(report).to_string()
}

struct Findings<'a>(&'a SynthesisReport);

impl fmt::Display for Findings<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(80);
        let thin = "-".repeat(80);
        let report = self.0;
        let q = &report.quantitative_findings;

        writeln!(f, "{rule}\nUSER RESEARCH FINDINGS\n{rule}\n")?;
        writeln!(f, "SUMMARY\n{thin}")?;
        writeln!(f, "Interviews:   {}", q.sample_size)?;
        writeln!(f, "Observations: {}", q.observation_count)?;
        if let Some(minutes) = q.avg_duration_minutes {
            writeln!(f, "Avg duration: {:.1} minutes", minutes)?;
        }
        if let Some(tools) = q.avg_tools_abandoned {
            writeln!(f, "Avg tools abandoned: {:.1}", tools)?;
        }
        for share in &q.persona_distribution {
            writeln!(f, "  {}: {} ({:.0}%)", share.label.name(), share.count, share.percentage)?;
        }

        writeln!(f, "\nKEY INSIGHTS\n{thin}")?;
        if report.key_insights.is_empty() {
            writeln!(f, "No named themes found.")?;
        }
        for (i, insight) in report.key_insights.iter().enumerate() {
            writeln!(f, "\n{}. {} [{}]", i + 1, insight.title, insight.priority)?;
            writeln!(f, "   {}", insight.description)?;
            for line in &insight.evidence {
                writeln!(f, "   - {}", line)?;
            }
            writeln!(f, "   Implication: {}", insight.implication)?;
        }

        writeln!(f, "\n\nTHEMES\n{thin}")?;
        for theme in &report.qualitative_themes {
            writeln!(
                f,
                "{:<28} {:>4}  {:>5.1}%",
                theme.theme.label(),
                theme.observation_count,
                theme.percentage
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn obs(source: &str, theme: Theme, sentiment: Sentiment) -> Observation {
        Observation {
            text: format!("{} said something about {}", source, theme),
            source_id: source.to_string(),
            theme,
            sentiment,
        }
    }

    fn meta(n: u32, persona: Persona, duration_minutes: u32) -> InterviewMetadata {
        InterviewMetadata {
            interview_id: format!("INT_{:03}", n),
            date: NaiveDate::from_ymd_opt(2025, 11, 10).unwrap(),
            duration_minutes,
            participant_id: format!("P{:03}", n),
            age: 22,
            occupation: persona.occupation().to_string(),
            persona,
            tools_abandoned: n + 1,
            current_tool: "None".to_string(),
            interview_method: "Video call".to_string(),
        }
    }

    fn rows() -> Vec<Observation> {
        vec![
            obs("interview_01", Theme::SetupFatigue, Sentiment::Negative),
            obs("interview_01", Theme::FeatureOverwhelm, Sentiment::Neutral),
            obs("interview_02", Theme::SetupFatigue, Sentiment::Neutral),
            obs("interview_03", Theme::SetupFatigue, Sentiment::Negative),
            obs("interview_03", Theme::Other, Sentiment::Neutral),
            obs("interview_04", Theme::ToolHopping, Sentiment::Positive),
        ]
    }

    #[test]
    fn test_prevalence_counts_interviews_not_rows() {
        let report = synthesize(&rows(), &[], 3);
        let q = &report.quantitative_findings;
        assert_eq!(q.sample_size, 4);
        assert_eq!(q.observation_count, 6);
        assert_eq!(q.avg_duration_minutes, None);
        assert!(q.persona_distribution.is_empty());

        let top = &q.pain_point_prevalence[0];
        assert_eq!(top.theme, Theme::SetupFatigue);
        assert_eq!(top.interviews, 3);
        assert!((top.rate - 0.75).abs() < 1e-9);
        assert_eq!(q.pain_point_prevalence.len(), Theme::NAMED.len());
        assert!(q.pain_point_prevalence.iter().all(|p| p.theme != Theme::Other));
    }

    #[test]
    fn test_key_insights_ranked_and_prioritized() {
        let report = synthesize(&rows(), &[], 3);
        let insights = &report.key_insights;

        // equal prevalence keeps canonical order: Feature Overwhelm before Tool Hopping
        let themes: Vec<Theme> = insights.iter().map(|i| i.theme).collect();
        assert_eq!(
            themes,
            vec![Theme::SetupFatigue, Theme::FeatureOverwhelm, Theme::ToolHopping]
        );
        let ids: Vec<&str> = insights.iter().map(|i| i.insight_id.as_str()).collect();
        assert_eq!(ids, vec!["INS001", "INS002", "INS003"]);

        assert_eq!(insights[0].priority, Priority::Critical);
        assert_eq!(insights[1].priority, Priority::Medium);
        assert_eq!(insights[0].evidence[0], "75% of interviews raised it (3 of 4)");
        assert_eq!(insights[0].evidence[1], "3 observations, 67% negative");
        assert!(insights[0].evidence[2].starts_with("\"interview_01 said"));
        // no negative rows, no quote
        assert_eq!(insights[2].evidence.len(), 2);
    }

    #[test]
    fn test_metadata_feeds_quantitative_findings() {
        let metadata = vec![
            meta(1, Persona::SerialAbandoner, 30),
            meta(2, Persona::SerialAbandoner, 40),
            meta(3, Persona::AnalogHoldout, 35),
            meta(4, Persona::OverwhelmedOptimizer, 45),
            meta(5, Persona::AnalogHoldout, 40),
        ];
        let report = synthesize(&rows(), &metadata, 3);
        let q = &report.quantitative_findings;
        assert_eq!(q.sample_size, 5);
        assert_eq!(q.avg_duration_minutes, Some(38.0));
        assert_eq!(q.avg_tools_abandoned, Some(4.0));
        assert_eq!(q.persona_distribution[0].label, Persona::SerialAbandoner);
        assert_eq!(q.persona_distribution[1].label, Persona::AnalogHoldout);
        assert!((q.pain_point_prevalence[0].rate - 0.6).abs() < 1e-9);
        assert_eq!(report.key_insights[0].priority, Priority::High);
    }

    #[test]
    fn test_qualitative_themes_match_clusters() {
        let report = synthesize(&rows(), &[], 2);
        assert_eq!(report.qualitative_themes, cluster_summaries(&rows(), 2));
    }

    #[test]
    fn test_empty_table() {
        let report = synthesize(&[], &[], 3);
        assert_eq!(report.quantitative_findings.sample_size, 0);
        assert!(report.key_insights.is_empty());
        assert!(report.qualitative_themes.is_empty());
        assert!(report
            .quantitative_findings
            .pain_point_prevalence
            .iter()
            .all(|p| p.rate == 0.0));
        assert!(render_findings(&report).contains("No named themes found."));
    }

    #[test]
    fn test_render_findings() {
        let text = render_findings(&synthesize(&rows(), &[], 3));
        assert!(text.starts_with(&"=".repeat(80)));
        assert!(text.contains("1. Setup Exhausts Users Before Any Real Work [Critical]"));
        assert!(text.contains("Interviews:   4"));
        assert!(text.contains("Setup Fatigue"));
    }

    #[test]
    fn test_write_synthesis_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("insights.json");
        let report = synthesize(&rows(), &[], 3);
        write_synthesis_json(&path, &report).unwrap();
        let parsed: SynthesisReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, report);
    }
}
