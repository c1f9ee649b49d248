//! Sentence extraction from interview transcripts
//!
//! A transcript alternates role-prefixed turns:
//!
//! ```text
//! INTERVIEWER: Have you used any productivity tools before?
//!
//! PARTICIPANT: Oh yes, I've tried so many! I spend hours watching tutorials.
//! ...
//! END OF INTERVIEW
//! ```
//!
//! Only participant turns are content. Each turn is split into sentences and
//! short fragments ("Yeah.", "Sure!") are dropped.

use crate::model::Candidate;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Fragments shorter than this many characters are discarded
pub const DEFAULT_MIN_LENGTH: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("malformed transcript {id}: {reason}")]
    MalformedTranscript { id: String, reason: String },
    #[error("invalid turn pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("invalid extract config: {0}")]
    InvalidConfig(String),
}

/// Turn markers and the fragment length floor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    #[serde(default = "default_participant_marker")]
    pub participant_marker: String,
    #[serde(default = "default_interviewer_marker")]
    pub interviewer_marker: String,
    #[serde(default = "default_end_marker")]
    pub end_marker: String,
}

fn default_min_length() -> usize {
    DEFAULT_MIN_LENGTH
}

fn default_participant_marker() -> String {
    "PARTICIPANT: ".to_string()
}

fn default_interviewer_marker() -> String {
    "INTERVIEWER:".to_string()
}

fn default_end_marker() -> String {
    "END OF INTERVIEW".to_string()
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            participant_marker: default_participant_marker(),
            interviewer_marker: default_interviewer_marker(),
            end_marker: default_end_marker(),
        }
    }
}

/// Splits participant turns into observation candidates
#[derive(Debug, Clone)]
pub struct SentenceExtractor {
    config: ExtractConfig,
    turn_re: Regex,
    sentence_end_re: Regex,
}

impl SentenceExtractor {
    pub fn new(config: ExtractConfig) -> Result<Self, ExtractError> {
        if config.min_length == 0 {
            return Err(ExtractError::InvalidConfig(
                "min_length must be at least 1".to_string(),
            ));
        }
        for (name, marker) in [
            ("participant_marker", &config.participant_marker),
            ("interviewer_marker", &config.interviewer_marker),
            ("end_marker", &config.end_marker),
        ] {
            if marker.trim().is_empty() {
                return Err(ExtractError::InvalidConfig(format!("{} is empty", name)));
            }
        }

        // A turn runs until the next interviewer marker, the end marker, or end of text.
        let turn_re = Regex::new(&format!(
            r"(?s){}(.*?)(?:{}|{}|\z)",
            regex::escape(&config.participant_marker),
            regex::escape(&config.interviewer_marker),
            regex::escape(&config.end_marker),
        ))?;
        let sentence_end_re = Regex::new(r"[.!?]+")?;

        Ok(Self {
            config,
            turn_re,
            sentence_end_re,
        })
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Extract candidates from one transcript, in document order.
    ///
    /// Fails only when the text is blank or has no role markers at all. A
    /// transcript whose turns hold nothing but short fragments yields an
    /// empty list.
    pub fn extract(&self, source_id: &str, text: &str) -> Result<Vec<Candidate>, ExtractError> {
        if text.trim().is_empty() {
            return Err(ExtractError::MalformedTranscript {
                id: source_id.to_string(),
                reason: "transcript is empty".to_string(),
            });
        }

        let has_participant = text.contains(self.config.participant_marker.trim_end());
        let has_interviewer = text.contains(self.config.interviewer_marker.trim_end());
        if !has_participant && !has_interviewer {
            return Err(ExtractError::MalformedTranscript {
                id: source_id.to_string(),
                reason: "no interviewer or participant markers".to_string(),
            });
        }

        let mut candidates = Vec::new();
        for caps in self.turn_re.captures_iter(text) {
            let Some(turn) = caps.get(1) else { continue };
            for fragment in self.sentence_end_re.split(turn.as_str()) {
                let fragment = fragment.trim();
                if fragment.chars().count() >= self.config.min_length {
                    candidates.push(Candidate {
                        text: fragment.to_string(),
                        source_id: source_id.to_string(),
                    });
                }
            }
        }

        Ok(candidates)
    }
}

impl Default for SentenceExtractor {
    fn default() -> Self {
        // Markers are escaped, so the default patterns always compile.
        Self::new(ExtractConfig::default()).unwrap_or_else(|e| panic!("default extractor: {}", e))
    }
}
