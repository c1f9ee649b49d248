//! Core data types for affinity mapping
//!
//! Themes and sentiments are closed sets. Every [`Observation`] carries both,
//! so an unclassified fragment is a [`Candidate`] instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pain-point category assigned to an observation.
///
/// Variant order is the canonical theme order. Theme tie-breaks and report
/// ordering both depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Theme {
    #[serde(rename = "Feature Overwhelm")]
    FeatureOverwhelm,
    #[serde(rename = "Productivity Guilt")]
    ProductivityGuilt,
    #[serde(rename = "Setup Fatigue")]
    SetupFatigue,
    #[serde(rename = "Context Switching")]
    ContextSwitching,
    #[serde(rename = "Prioritization Difficulty")]
    PrioritizationDifficulty,
    #[serde(rename = "Tool Hopping Behavior")]
    ToolHopping,
    #[serde(rename = "Social Comparison Anxiety")]
    SocialComparison,
    #[serde(rename = "Lack of Flexibility")]
    LackOfFlexibility,
    Other,
}

impl Theme {
    /// The eight named themes in canonical order (excludes `Other`)
    pub const NAMED: [Theme; 8] = [
        Theme::FeatureOverwhelm,
        Theme::ProductivityGuilt,
        Theme::SetupFatigue,
        Theme::ContextSwitching,
        Theme::PrioritizationDifficulty,
        Theme::ToolHopping,
        Theme::SocialComparison,
        Theme::LackOfFlexibility,
    ];

    /// Every theme, `Other` last
    pub const ALL: [Theme; 9] = [
        Theme::FeatureOverwhelm,
        Theme::ProductivityGuilt,
        Theme::SetupFatigue,
        Theme::ContextSwitching,
        Theme::PrioritizationDifficulty,
        Theme::ToolHopping,
        Theme::SocialComparison,
        Theme::LackOfFlexibility,
        Theme::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Theme::FeatureOverwhelm => "Feature Overwhelm",
            Theme::ProductivityGuilt => "Productivity Guilt",
            Theme::SetupFatigue => "Setup Fatigue",
            Theme::ContextSwitching => "Context Switching",
            Theme::PrioritizationDifficulty => "Prioritization Difficulty",
            Theme::ToolHopping => "Tool Hopping Behavior",
            Theme::SocialComparison => "Social Comparison Anxiety",
            Theme::LackOfFlexibility => "Lack of Flexibility",
            Theme::Other => "Other",
        }
    }

    /// Position in [`Theme::NAMED`], `None` for `Other`
    pub fn index(self) -> Option<usize> {
        Theme::NAMED.iter().position(|t| *t == self)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Theme {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .iter()
            .copied()
            .find(|t| t.label() == s)
            .ok_or_else(|| LabelError::UnknownTheme(s.to_string()))
    }
}

/// Coarse polarity of an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];

    pub fn label(self) -> &'static str {
        match self {
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Positive => "positive",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Sentiment {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            "positive" => Ok(Sentiment::Positive),
            other => Err(LabelError::UnknownSentiment(other.to_string())),
        }
    }
}

/// A label read from outside the crate that is not in the closed set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LabelError {
    #[error("unknown theme label: {0:?}")]
    UnknownTheme(String),
    #[error("unknown sentiment label: {0:?}")]
    UnknownSentiment(String),
}

/// Extracted sentence that has not been classified yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    pub source_id: String,
}

/// One classified, sentence-level unit of a transcript.
///
/// Serializes with the interchange field names (`interview_id` for the source).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub text: String,
    #[serde(rename = "interview_id")]
    pub source_id: String,
    pub theme: Theme,
    pub sentiment: Sentiment,
}

impl Observation {
    pub fn from_candidate(candidate: Candidate, theme: Theme, sentiment: Sentiment) -> Self {
        Self {
            text: candidate.text,
            source_id: candidate.source_id,
            theme,
            sentiment,
        }
    }
}

/// Raw transcript text and the id it is known by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub id: String,
    pub text: String,
}

impl Transcript {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Ordered transcripts processed in one pipeline run
pub type Corpus = Vec<Transcript>;
