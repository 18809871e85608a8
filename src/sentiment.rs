//! Lexicon-based scoring primitive.
//!
//! Word valences (-5..=5) come from the embedded `sentiment_lexicon.json`.
//! A valence is inverted when a negator appears in the previous 1..=3 tokens.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ClassifierError;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Largest absolute valence in the lexicon; used to scale `normalized_score`.
const MAX_VALENCE: f64 = 5.0;

/// Raw output of a scoring primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScore {
    /// Unbounded compound score (sum of valences).
    pub score: f64,
    /// Scorer's own normalization, conventionally in [-1, 1].
    pub normalized_score: f64,
    pub tokens: usize,
    pub hits: usize,
}

/// Seam for the external scoring primitive.
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> Result<RawScore, ClassifierError>;
    /// Scorer name for diagnostics.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> Result<RawScore, ClassifierError> {
        if text.trim().is_empty() {
            return Err(ClassifierError::EmptyText);
        }

        // Collected so negation can look backwards.
        let tokens: Vec<String> = tokenize(text).collect();
        let mut sum: i32 = 0;
        let mut hits = 0usize;

        for i in 0..tokens.len() {
            let base = self.word_score(tokens[i].as_str());
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            sum += if negated { -base } else { base };
            hits += 1;
        }

        let normalized = if hits == 0 {
            0.0
        } else {
            (sum as f64 / hits as f64 / MAX_VALENCE).clamp(-1.0, 1.0)
        };

        Ok(RawScore {
            score: sum as f64,
            normalized_score: normalized,
            tokens: tokens.len(),
            hits,
        })
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

/// Lower-case word tokens; apostrophes inside a word are kept ("isn't").
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "don't"
            | "doesn't"
            | "didn't"
            | "without"
    )
}
