//! Lexicon-based sentiment scoring for news articles.
//!
//! Scoring is delegated to the VADER analyzer (`vader_sentiment`), which
//! carries the full valence lexicon with its booster, negation,
//! capitalization, contrastive "but" and punctuation rules. This module
//! wraps it in typed scores: `neg`/`neu`/`pos` proportions and a
//! `compound` score in `[-1, 1]`.
//!
//! The analyzer is a process-wide singleton built on first use and never
//! mutated afterwards, so concurrent requests read it without locking.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;
use thiserror::Error;
use vader_sentiment::SentimentIntensityAnalyzer;

static ANALYZER: Lazy<SentimentAnalyzer> = Lazy::new(SentimentAnalyzer::new);

/// Shared analyzer instance.
pub fn analyzer() -> &'static SentimentAnalyzer {
    &ANALYZER
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

impl SentimentScores {
    fn from_polarity(scores: &HashMap<&str, f64>) -> Self {
        let read = |key: &str| scores.get(key).copied().unwrap_or_default();
        Self {
            neg: read("neg"),
            neu: read("neu"),
            pos: read("pos"),
            compound: read("compound"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SentimentError {
    #[error("no text to score")]
    EmptyText,
}

pub struct SentimentAnalyzer {
    inner: SentimentIntensityAnalyzer<'static>,
}

impl SentimentAnalyzer {
    fn new() -> Self {
        Self {
            inner: SentimentIntensityAnalyzer::new(),
        }
    }

    /// Scores `text`; text without a single alphanumeric character is
    /// rejected rather than reported as neutral.
    pub fn polarity_scores(&self, text: &str) -> Result<SentimentScores, SentimentError> {
        if !text.chars().any(char::is_alphanumeric) {
            return Err(SentimentError::EmptyText);
        }
        Ok(SentimentScores::from_polarity(
            &self.inner.polarity_scores(text),
        ))
    }
}

impl std::fmt::Debug for SentimentAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentAnalyzer").finish_non_exhaustive()
    }
}
