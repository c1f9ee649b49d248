//! Affinity - synthetic user-research toolkit
//!
//! Generate interview transcripts, cluster what participants said into
//! themes, and see the result as an affinity map.
//!
//! # Overview
//!
//! The core is the affinity-mapping pipeline: participant sentences are
//! pulled out of each transcript, scored for sentiment, and assigned to one
//! pain-point theme by keyword matching. The result is one flat table of
//! observations that everything else (summaries, CSV/JSON export, the HTML
//! report) is derived from.
//!
//! # Themes
//!
//! | Theme | Typical triggers |
//! |-------|------------------|
//! | Feature Overwhelm | too many, options, buttons, menus |
//! | Productivity Guilt | guilt, feel bad, overdue, failing |
//! | Setup Fatigue | setup, hours, tutorial, blank screen |
//! | Context Switching | work and personal, context, separate |
//! | Prioritization Difficulty | where to start, which one, urgent |
//! | Tool Hopping Behavior | tried, another one, gave up |
//! | Social Comparison Anxiety | everyone, youtube, supposed to |
//! | Lack of Flexibility | rigid, force, must, structure |
//!
//! Sentences matching none of them land in `Other`.
//!
//! # Quick Start
//!
//! ```
//! use affinity::{AffinityPipeline, Theme, Transcript};
//!
//! let corpus = vec![Transcript::new(
//!     "interview_01",
//!     "INTERVIEWER: How did it go?\nPARTICIPANT: I spent three hours on setup watching a tutorial.",
//! )];
//!
//! let table = AffinityPipeline::default().run(&corpus).unwrap();
//! assert_eq!(table.observations()[0].theme, Theme::SetupFatigue);
//!
//! for cluster in table.clusters(3) {
//!     println!("{}: {} ({:.1}%)", cluster.theme, cluster.observation_count, cluster.percentage);
//! }
//! ```

pub mod config;
pub mod corpus;
pub mod export;
pub mod extract;
pub mod generator;
pub mod insights;
pub mod model;
pub mod persona;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod sentiment;
pub mod summary;
pub mod theme;

pub use config::Config;
pub use corpus::{load_corpus, CorpusLoad};
pub use export::{
    read_observations_csv, write_clusters_json, write_observations_csv, ClusterReport,
};
pub use extract::{ExtractConfig, ExtractError, SentenceExtractor};
pub use generator::{read_metadata, InterviewGenerator, InterviewMetadata, Persona};
pub use insights::{synthesize, SynthesisReport};
pub use model::{Candidate, Corpus, LabelError, Observation, Sentiment, Theme, Transcript};
pub use persona::{build_personas, PersonaProfile};
pub use pipeline::{AffinityPipeline, AffinityTable, FailureMode, PipelineError};
pub use rules::{KeywordRules, SentimentLexicon, ThemeRules};
pub use sentiment::SentimentClassifier;
pub use summary::{cluster_summaries, ClusterSummary, Distribution};
pub use theme::ThemeClassifier;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify core types are re-exported from crate root
        let _ = AffinityPipeline::default();
        assert_eq!(Theme::NAMED.len(), 8);
    }
}
