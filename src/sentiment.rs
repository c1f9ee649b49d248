//! Keyword sentiment scoring

use crate::model::Sentiment;
use crate::rules::SentimentLexicon;

/// Labels text by comparing how many distinct negative and positive stems it contains.
///
/// Matching is by substring on lowercased text, so `overwhelm` also hits
/// "overwhelmed" and "overwhelming". A stem that appears twice still counts once.
#[derive(Debug, Clone, Default)]
pub struct SentimentClassifier {
    lexicon: SentimentLexicon,
}

impl SentimentClassifier {
    pub fn new(lexicon: SentimentLexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &SentimentLexicon {
        &self.lexicon
    }

    /// Number of distinct (negative, positive) stems found
    pub fn counts(&self, text: &str) -> (usize, usize) {
        let lower = text.to_lowercase();
        let hits = |stems: &[String]| stems.iter().filter(|s| lower.contains(s.as_str())).count();
        (hits(self.lexicon.negative()), hits(self.lexicon.positive()))
    }

    /// Ties, including no hits at all, are neutral
    pub fn classify(&self, text: &str) -> Sentiment {
        let (neg, pos) = self.counts(text);
        if neg > pos {
            Sentiment::Negative
        } else if pos > neg {
            Sentiment::Positive
        } else {
            Sentiment::Neutral
        }
    }
}
