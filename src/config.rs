//! Configuration file support for affinity
//!
//! Reads from .affinity/config.toml

use crate::extract::{ExtractConfig, SentenceExtractor};
use crate::model::Theme;
use crate::pipeline::FailureMode;
use crate::rules::{KeywordRules, SentimentLexicon, ThemeRules};
use crate::persona::DEFAULT_PERSONA_QUOTES;
use crate::summary::DEFAULT_SAMPLE_QUOTES;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("[themes] {0}")]
    Theme(#[from] crate::model::LabelError),
    #[error("[extract] {0}")]
    Extract(#[from] crate::extract::ExtractError),
}

/// Configuration structure
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Turn markers and fragment length floor
    #[serde(default)]
    pub extract: ExtractConfig,

    #[serde(default)]
    pub summary: SummaryConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Replacement sentiment stems
    #[serde(default)]
    pub sentiment: SentimentConfig,

    /// Replacement triggers, keyed by theme label
    /// (e.g. `"Setup Fatigue" = ["setup", "onboarding"]`)
    #[serde(default)]
    pub themes: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SummaryConfig {
    /// Negative quotes kept per cluster
    /// Default: 3
    #[serde(default = "default_sample_quotes")]
    pub sample_quotes: usize,

    /// Quotes kept per persona profile
    /// Default: 5
    #[serde(default = "default_persona_quotes")]
    pub persona_quotes: usize,
}

fn default_sample_quotes() -> usize {
    DEFAULT_SAMPLE_QUOTES
}

fn default_persona_quotes() -> usize {
    DEFAULT_PERSONA_QUOTES
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            sample_quotes: default_sample_quotes(),
            persona_quotes: default_persona_quotes(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Abort on the first malformed transcript instead of skipping it
    #[serde(default)]
    pub strict: bool,
}

/// Each list, when present, replaces the built-in one
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct SentimentConfig {
    #[serde(default)]
    pub negative: Option<Vec<String>>,
    #[serde(default)]
    pub positive: Option<Vec<String>>,
}

impl Config {
    /// Load config from .affinity/config.toml
    /// Returns default config if file doesn't exist
    pub fn load() -> Self {
        if let Some(path) = Self::find_config_path() {
            if let Ok(config) = Self::load_from(&path) {
                return config;
            }
            tracing::warn!(path = %path.display(), "ignoring unreadable config");
        }
        Self::default()
    }

    /// Load an explicit config file, surfacing any error
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&contents)?;
        // surface bad theme labels and markers at load time rather than at first use
        config.rules()?;
        SentenceExtractor::new(config.extract.clone())?;
        Ok(config)
    }

    /// Find config.toml by walking up directory tree
    fn find_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        let mut dir = current_dir.as_path();

        loop {
            let config_path = dir.join(".affinity").join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }

            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
        None
    }

    /// Built-in keyword tables with this config's overrides applied
    pub fn rules(&self) -> Result<KeywordRules, ConfigError> {
        let defaults = SentimentLexicon::default();
        let sentiment = SentimentLexicon::new(
            self.sentiment
                .negative
                .clone()
                .unwrap_or_else(|| defaults.negative().to_vec()),
            self.sentiment
                .positive
                .clone()
                .unwrap_or_else(|| defaults.positive().to_vec()),
        );

        let mut themes = ThemeRules::default();
        for (label, triggers) in &self.themes {
            let theme: Theme = label.parse()?;
            themes = themes.with_triggers(theme, triggers);
        }

        Ok(KeywordRules { sentiment, themes })
    }

    pub fn failure_mode(&self) -> FailureMode {
        if self.pipeline.strict {
            FailureMode::Strict
        } else {
            FailureMode::BestEffort
        }
    }
}
