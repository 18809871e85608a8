//! Classifier adapter: turns a raw scorer result into a three-way label.

use std::sync::Arc;

use crate::error::ClassifierError;
use crate::model::SentimentLabel;
use crate::sentiment::{LexiconScorer, RawScore, SentimentScorer};

/// Compound scores strictly above this are positive.
pub const POSITIVE_THRESHOLD: f64 = 1.0;
/// Compound scores strictly below this are negative.
pub const NEGATIVE_THRESHOLD: f64 = -1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: SentimentLabel,
    /// Scorer's normalized value, unmodified.
    pub score: f64,
    pub raw: RawScore,
}

#[derive(Clone)]
pub struct Classifier {
    scorer: Arc<dyn SentimentScorer>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Arc::new(LexiconScorer::new()))
    }
}

impl Classifier {
    pub fn new(scorer: Arc<dyn SentimentScorer>) -> Self {
        Self { scorer }
    }

    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }

    /// Propagates scorer failures; the caller decides whether they are fatal.
    pub fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        let raw = self.scorer.score(text)?;
        Ok(Classification {
            label: label_for(raw.score),
            score: raw.normalized_score,
            raw,
        })
    }
}

/// Asymmetric band: (-1, 1] inclusive of both edges is neutral.
pub fn label_for(compound: f64) -> SentimentLabel {
    if compound > POSITIVE_THRESHOLD {
        SentimentLabel::Positive
    } else if compound < NEGATIVE_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}
