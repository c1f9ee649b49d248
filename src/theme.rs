//! Keyword theme classification

use crate::model::Theme;
use crate::rules::ThemeRules;

/// Assigns each text the theme whose triggers it matches most.
///
/// A theme's score is the number of its distinct triggers found as substrings
/// of the lowercased text. The highest score wins; on a tie the theme that
/// comes first in canonical order wins. No hits at all is [`Theme::Other`].
#[derive(Debug, Clone, Default)]
pub struct ThemeClassifier {
    rules: ThemeRules,
}

impl ThemeClassifier {
    pub fn new(rules: ThemeRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ThemeRules {
        &self.rules
    }

    /// Score for every named theme, in canonical order
    pub fn scores(&self, text: &str) -> Vec<(Theme, usize)> {
        let lower = text.to_lowercase();
        self.rules
            .iter()
            .map(|(theme, triggers)| {
                let score = triggers
                    .iter()
                    .filter(|t| lower.contains(t.as_str()))
                    .count();
                (theme, score)
            })
            .collect()
    }

    pub fn classify(&self, text: &str) -> Theme {
        let mut best = (Theme::Other, 0);
        for (theme, score) in self.scores(text) {
            // strictly greater, so the earlier theme keeps a tie
            if score > best.1 {
                best = (theme, score);
            }
        }
        best.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score_of(scores: &[(Theme, usize)], theme: Theme) -> usize {
        scores
            .iter()
            .find(|(t, _)| *t == theme)
            .map(|(_, s)| *s)
            .unwrap_or(0)
    }

    #[test]
    fn test_golden_cases() {
        let classifier = ThemeClassifier::default();
        assert_eq!(
            classifier.classify("I spent three hours on setup watching a tutorial"),
            Theme::SetupFatigue
        );
        assert_eq!(classifier.classify("My cat is orange"), Theme::Other);
    }

    #[test]
    fn test_overlapping_themes_pick_highest() {
        let classifier = ThemeClassifier::default();
        let text = "There are too many buttons and options, I don't know where to start";
        let scores = classifier.scores(text);

        assert_eq!(score_of(&scores, Theme::FeatureOverwhelm), 3);
        assert_eq!(score_of(&scores, Theme::PrioritizationDifficulty), 1);
        assert_eq!(classifier.classify(text), Theme::FeatureOverwhelm);
    }

    #[test]
    fn test_tie_goes_to_earlier_theme() {
        let classifier = ThemeClassifier::default();
        // one Feature Overwhelm trigger, one Prioritization Difficulty trigger
        let text = "So many menus, I can never decide what to focus on";
        let scores = classifier.scores(text);
        assert_eq!(score_of(&scores, Theme::FeatureOverwhelm), 1);
        assert_eq!(score_of(&scores, Theme::PrioritizationDifficulty), 1);
        assert_eq!(classifier.classify(text), Theme::FeatureOverwhelm);

        // "template" belongs to both Setup Fatigue and Lack of Flexibility
        assert_eq!(
            classifier.classify("Which template is the real one anyway"),
            Theme::SetupFatigue
        );
    }

    #[test]
    fn test_tie_order_ignores_construction_order() {
        let rules = ThemeRules::empty()
            .with_triggers(Theme::LackOfFlexibility, ["paper"])
            .with_triggers(Theme::ContextSwitching, ["paper"]);
        let classifier = ThemeClassifier::new(rules);
        assert_eq!(classifier.classify("I went back to paper"), Theme::ContextSwitching);
    }

    #[test]
    fn test_distinct_triggers_not_occurrences() {
        let classifier = ThemeClassifier::default();
        let text = "switch, switch, switch between work and personal notebooks";
        let scores = classifier.scores(text);
        // "switch" + "work and personal"
        assert_eq!(score_of(&scores, Theme::ContextSwitching), 2);
        // "switch" only once
        assert_eq!(score_of(&scores, Theme::ToolHopping), 1);
        assert_eq!(classifier.classify(text), Theme::ContextSwitching);
    }

    #[test]
    fn test_substring_false_positive_is_reproduced() {
        let classifier = ThemeClassifier::default();
        assert_eq!(classifier.classify("He grew a magnificent mustache"), Theme::LackOfFlexibility);
    }

    #[test]
    fn test_scores_cover_named_themes_in_order() {
        let scores = ThemeClassifier::default().scores("");
        let themes: Vec<Theme> = scores.iter().map(|(t, _)| *t).collect();
        assert_eq!(themes, Theme::NAMED.to_vec());
        assert!(scores.iter().all(|(_, s)| *s == 0));
    }

    #[test]
    fn test_empty_rules_are_other() {
        let classifier = ThemeClassifier::new(ThemeRules::empty());
        assert_eq!(classifier.classify("too many buttons"), Theme::Other);
    }
}
