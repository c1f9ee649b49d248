//! Affinity mapping pipeline
//!
//! Runs extraction, sentiment and theme classification over a corpus and
//! collects one flat table of observations, in transcript order and then
//! document order.

use crate::extract::{ExtractConfig, ExtractError, SentenceExtractor};
use crate::model::{Candidate, Observation, Transcript};
use crate::rules::KeywordRules;
use crate::sentiment::SentimentClassifier;
use crate::summary::{cluster_summaries, ClusterSummary, Distribution};
use crate::theme::ThemeClassifier;
use tracing::{debug, info, warn};

/// What to do with a transcript the extractor rejects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Log it, record it in [`AffinityTable::skipped`], keep going
    #[default]
    BestEffort,
    /// Abort the run on the first bad transcript
    Strict,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("pipeline setup failed: {0}")]
    Setup(#[from] ExtractError),
    #[error("transcript {id} rejected")]
    Transcript {
        id: String,
        #[source]
        source: ExtractError,
    },
}

/// A transcript that contributed no rows, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTranscript {
    pub id: String,
    pub reason: String,
}

/// Result of one pipeline run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AffinityTable {
    observations: Vec<Observation>,
    skipped: Vec<SkippedTranscript>,
    transcripts: usize,
}

impl AffinityTable {
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn into_observations(self) -> Vec<Observation> {
        self.observations
    }

    pub fn skipped(&self) -> &[SkippedTranscript] {
        &self.skipped
    }

    /// Transcripts seen, including skipped ones
    pub fn transcript_count(&self) -> usize {
        self.transcripts
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn distribution(&self) -> Distribution {
        Distribution::from_observations(&self.observations)
    }

    pub fn clusters(&self, sample_size: usize) -> Vec<ClusterSummary> {
        cluster_summaries(&self.observations, sample_size)
    }
}

#[derive(Debug, Clone)]
pub struct AffinityPipeline {
    extractor: SentenceExtractor,
    sentiment: SentimentClassifier,
    themes: ThemeClassifier,
    mode: FailureMode,
}

impl AffinityPipeline {
    pub fn new(rules: KeywordRules, extract: ExtractConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            extractor: SentenceExtractor::new(extract)?,
            sentiment: SentimentClassifier::new(rules.sentiment),
            themes: ThemeClassifier::new(rules.themes),
            mode: FailureMode::default(),
        })
    }

    pub fn with_mode(mut self, mode: FailureMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> FailureMode {
        self.mode
    }

    pub fn sentiment(&self) -> &SentimentClassifier {
        &self.sentiment
    }

    pub fn themes(&self) -> &ThemeClassifier {
        &self.themes
    }

    pub fn classify(&self, candidate: Candidate) -> Observation {
        let sentiment = self.sentiment.classify(&candidate.text);
        let theme = self.themes.classify(&candidate.text);
        Observation::from_candidate(candidate, theme, sentiment)
    }

    /// Classified observations of a single transcript
    pub fn process_transcript(&self, transcript: &Transcript) -> Result<Vec<Observation>, ExtractError> {
        let candidates = self.extractor.extract(&transcript.id, &transcript.text)?;
        Ok(candidates.into_iter().map(|c| self.classify(c)).collect())
    }

    pub fn run(&self, corpus: &[Transcript]) -> Result<AffinityTable, PipelineError> {
        let mut table = AffinityTable {
            transcripts: corpus.len(),
            ..AffinityTable::default()
        };

        for transcript in corpus {
            match self.process_transcript(transcript) {
                Ok(observations) => {
                    debug!(transcript = %transcript.id, observations = observations.len(), "processed transcript");
                    table.observations.extend(observations);
                }
                Err(err) if self.mode == FailureMode::BestEffort => {
                    warn!(transcript = %transcript.id, error = %err, "skipping transcript");
                    table.skipped.push(SkippedTranscript {
                        id: transcript.id.clone(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => {
                    return Err(PipelineError::Transcript {
                        id: transcript.id.clone(),
                        source: err,
                    });
                }
            }
        }

        let min_length = self.extractor.config().min_length;
        debug_assert!(table
            .observations
            .iter()
            .all(|o| o.text.chars().count() >= min_length));

        info!(
            transcripts = table.transcripts,
            observations = table.observations.len(),
            skipped = table.skipped.len(),
            "affinity mapping complete"
        );
        Ok(table)
    }
}

impl Default for AffinityPipeline {
    fn default() -> Self {
        Self {
            extractor: SentenceExtractor::default(),
            sentiment: SentimentClassifier::default(),
            themes: ThemeClassifier::default(),
            mode: FailureMode::default(),
        }
    }
}
