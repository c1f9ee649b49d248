//! Keyword tables for the classifiers
//!
//! Tables are plain values handed to each classifier at construction, so an
//! alternate vocabulary is just a different `KeywordRules`. All keywords are
//! stored lowercase and matched as substrings of lowercased text.

use crate::model::Theme;

/// Negative stems of the reference lexicon
pub const NEGATIVE_STEMS: &[&str] = &[
    "overwhelm", "guilt", "frustrat", "confus", "stress", "anxious", "fail", "terrible",
    "exhaust", "burden", "judg", "bad", "worse",
];

/// Positive stems of the reference lexicon
pub const POSITIVE_STEMS: &[&str] = &[
    "love", "great", "help", "empower", "accomplish", "success", "excit", "perfect",
    "liberating", "better",
];

/// Reference triggers, indexed like [`Theme::NAMED`]
pub const THEME_TRIGGERS: [&[&str]; 8] = [
    // Feature Overwhelm
    &[
        "too many", "options", "features", "buttons", "complex", "hundred", "overwhelm", "menus",
        "settings",
    ],
    // Productivity Guilt
    &[
        "guilt", "feel bad", "failure", "judg", "terrible", "incomplete", "overdue", "failing",
        "inadequate",
    ],
    // Setup Fatigue
    &[
        "setup", "hours", "tutorial", "setting up", "configure", "blank screen", "empty",
        "template", "getting started",
    ],
    // Context Switching
    &[
        "work and personal", "different", "context", "switch", "separate", "work vs", "home vs",
    ],
    // Prioritization Difficulty
    &[
        "don't know what", "where to start", "which one", "prioritize", "focus", "urgent",
        "important",
    ],
    // Tool Hopping Behavior
    &[
        "tried", "switch", "looking for", "another one", "next tool", "abandoned", "gave up",
    ],
    // Social Comparison Anxiety
    &[
        "everyone", "youtube", "other people", "should", "supposed to", "better than",
        "instagram",
    ],
    // Lack of Flexibility
    &[
        "rigid", "force", "must", "structure", "template", "can't", "doesn't let", "won't allow",
    ],
];

fn normalize(keywords: impl IntoIterator<Item = impl AsRef<str>>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Negative and positive affect stems
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentimentLexicon {
    negative: Vec<String>,
    positive: Vec<String>,
}

impl SentimentLexicon {
    pub fn new(
        negative: impl IntoIterator<Item = impl AsRef<str>>,
        positive: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Self {
        Self {
            negative: normalize(negative),
            positive: normalize(positive),
        }
    }

    pub fn negative(&self) -> &[String] {
        &self.negative
    }

    pub fn positive(&self) -> &[String] {
        &self.positive
    }
}

impl Default for SentimentLexicon {
    fn default() -> Self {
        Self::new(NEGATIVE_STEMS, POSITIVE_STEMS)
    }
}

/// Trigger phrases for each named theme.
///
/// Stored by canonical position rather than in a map, which keeps iteration
/// (and therefore tie-breaking) in canonical order no matter how the rules
/// were built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeRules {
    triggers: [Vec<String>; 8],
}

impl ThemeRules {
    /// Rules with no triggers; every text classifies as `Other`
    pub fn empty() -> Self {
        Self {
            triggers: Default::default(),
        }
    }

    /// Replace the triggers of one theme. Setting triggers for `Other` is a no-op.
    pub fn with_triggers(
        mut self,
        theme: Theme,
        triggers: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Self {
        if let Some(idx) = theme.index() {
            self.triggers[idx] = normalize(triggers);
        }
        self
    }

    pub fn triggers(&self, theme: Theme) -> &[String] {
        match theme.index() {
            Some(idx) => &self.triggers[idx],
            None => &[],
        }
    }

    /// Themes and their triggers in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Theme, &[String])> {
        Theme::NAMED
            .iter()
            .zip(self.triggers.iter())
            .map(|(theme, triggers)| (*theme, triggers.as_slice()))
    }
}

impl Default for ThemeRules {
    fn default() -> Self {
        Theme::NAMED
            .iter()
            .zip(THEME_TRIGGERS.iter())
            .fold(Self::empty(), |rules, (theme, triggers)| {
                rules.with_triggers(*theme, triggers.iter())
            })
    }
}

/// Everything the classifiers need
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordRules {
    pub sentiment: SentimentLexicon,
    pub themes: ThemeRules,
}
