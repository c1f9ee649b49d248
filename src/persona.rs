//! Persona profiles
//!
//! Joins the observation table with interview metadata so each persona gets
//! its own pain-point ranking and quotes.

use crate::export::ExportError;
use crate::generator::{InterviewMetadata, Persona};
use crate::model::{Observation, Sentiment, Theme};
use crate::summary::{percentage, ranked_counts};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_PERSONA_QUOTES: usize = 5;

/// Pain points listed per persona
pub const TOP_PAIN_POINTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PainPoint {
    pub theme: Theme,
    pub mentions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaProfile {
    pub persona: Persona,
    pub tagline: String,
    pub primary_pain: String,
    pub occupation: String,
    pub age_range: (u32, u32),
    /// Metadata ids (`INT_NNN`) of this persona's interviews
    pub interviews: Vec<String>,
    /// Rounded to one decimal; 0 when the persona has no interviews
    pub avg_age: f64,
    pub avg_tools_abandoned: f64,
    pub observation_count: usize,
    /// 0-100
    pub negative_share: f64,
    /// Named themes only, most mentioned first
    pub pain_points: Vec<PainPoint>,
    pub quotes: Vec<String>,
}

/// Number in `INT_007` or `interview_07`
///
/// Metadata and transcript files name the same interview differently; the
/// number is what they share.
pub fn interview_number(id: &str) -> Option<u32> {
    id.strip_prefix("INT_")
        .or_else(|| id.strip_prefix("interview_"))?
        .parse()
        .ok()
}

fn mean(values: impl Iterator<Item = u32>) -> f64 {
    let (sum, n) = values.fold((0u64, 0u64), |(sum, n), v| (sum + u64::from(v), n + 1));
    if n == 0 {
        0.0
    } else {
        (sum as f64 / n as f64 * 10.0).round() / 10.0
    }
}

/// Negative quotes when there are enough of them, otherwise any quotes
fn representative_quotes(observations: &[&Observation], n: usize) -> Vec<String> {
    let negative: Vec<&&Observation> = observations
        .iter()
        .filter(|o| o.sentiment == Sentiment::Negative)
        .collect();
    if negative.len() >= n {
        negative.iter().take(n).map(|o| o.text.clone()).collect()
    } else {
        observations.iter().take(n).map(|o| o.text.clone()).collect()
    }
}

/// One profile per persona, in [`Persona::ALL`] order.
///
/// Observations whose transcript has no metadata entry are left out.
pub fn build_personas(
    observations: &[Observation],
    metadata: &[InterviewMetadata],
    quote_count: usize,
) -> Vec<PersonaProfile> {
    let unmatched = observations
        .iter()
        .filter(|o| {
            let number = interview_number(&o.source_id);
            !metadata
                .iter()
                .any(|m| number.is_some() && interview_number(&m.interview_id) == number)
        })
        .count();
    if unmatched > 0 {
        debug!(unmatched, "observations without interview metadata");
    }

    Persona::ALL
        .iter()
        .map(|&persona| {
            let interviews: Vec<&InterviewMetadata> =
                metadata.iter().filter(|m| m.persona == persona).collect();
            let numbers: Vec<u32> = interviews
                .iter()
                .filter_map(|m| interview_number(&m.interview_id))
                .collect();
            let rows: Vec<&Observation> = observations
                .iter()
                .filter(|o| interview_number(&o.source_id).is_some_and(|n| numbers.contains(&n)))
                .collect();

            let negative = rows.iter().filter(|o| o.sentiment == Sentiment::Negative).count();
            let pain_points = ranked_counts(rows.iter().map(|o| o.theme).filter(|t| *t != Theme::Other))
                .into_iter()
                .take(TOP_PAIN_POINTS)
                .map(|(theme, mentions)| PainPoint { theme, mentions })
                .collect();

            PersonaProfile {
                persona,
                tagline: persona.behavior().to_string(),
                primary_pain: persona.primary_pain().to_string(),
                occupation: persona.occupation().to_string(),
                age_range: persona.age_range(),
                interviews: interviews.iter().map(|m| m.interview_id.clone()).collect(),
                avg_age: mean(interviews.iter().map(|m| m.age)),
                avg_tools_abandoned: mean(interviews.iter().map(|m| m.tools_abandoned)),
                observation_count: rows.len(),
                negative_share: percentage(negative, rows.len()),
                pain_points,
                quotes: representative_quotes(&rows, quote_count),
            }
        })
        .collect()
}

pub fn write_personas_json<P: AsRef<Path>>(
    path: P,
    personas: &[PersonaProfile],
) -> Result<(), ExportError> {
    fs::write(path, serde_json::to_string_pretty(personas)?)?;
    Ok(())
}
