//! Configuration schema definitions

use crate::error::Result;
use crate::rate_limit::RateLimitConfig;
use crate::validation::Validator;
use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// Query limits and matching parameters
    #[serde(default)]
    pub search: SearchConfig,

    /// Search attempt throttling
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Fault report deduplication
    #[serde(default)]
    pub dedup: DedupConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigSchema {
    /// Check every value against its allowed range
    ///
    /// Values that are legal but likely mistakes are logged as warnings.
    pub fn validate(&self) -> Result<()> {
        let s = &self.search;
        let w = &s.weights;
        let result = Validator::new()
            .range("search.max_query_chars", s.max_query_chars, 1, 10_000)
            .range("search.min_query_chars", s.min_query_chars, 1, s.max_query_chars.max(1))
            .range("search.max_query_words", s.max_query_words, 1, 1_000)
            .range("search.max_results", s.max_results, 1, 1_000)
            .range("search.threshold", s.threshold, 0.0, 1.0)
            .range("search.weights.synonym_questions", w.synonym_questions, 0.0, 100.0)
            .range("search.weights.question_text", w.question_text, 0.0, 100.0)
            .range("search.weights.synonym_concepts", w.synonym_concepts, 0.0, 100.0)
            .custom("search.weights", || {
                (w.total() <= 0.0).then(|| "At least one weight must be positive".to_string())
            })
            .range("rate_limit.max_requests", self.rate_limit.max_requests, 1, 10_000)
            .range("rate_limit.window_ms", self.rate_limit.window_ms, 1, 3_600_000)
            .range("dedup.capacity", self.dedup.capacity, 1, 100_000)
            .warn_if(
                "search.threshold",
                s.threshold > 0.6,
                "Loose threshold, unrelated entries will match",
            )
            .warn_if(
                "search.weights",
                w.synonym_questions < w.synonym_concepts,
                "Concept matches outweigh synonym question matches",
            )
            .validate();

        for warning in result.warnings() {
            tracing::warn!(field = %warning.field, "{}", warning.message);
        }
        result.to_result()
    }
}

/// Query limits and matching parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Queries longer than this are truncated
    #[serde(default = "default_max_query_chars")]
    pub max_query_chars: usize,

    /// Queries shorter than this (after trimming) are rejected
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,

    /// Queries with more words keep only the first ones
    #[serde(default = "default_max_query_words")]
    pub max_query_words: usize,

    /// Result list cap
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Match threshold on a 0 (identical) to 1 (unrelated) scale
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Relative field weights
    #[serde(default)]
    pub weights: FieldWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_query_chars: default_max_query_chars(),
            min_query_chars: default_min_query_chars(),
            max_query_words: default_max_query_words(),
            max_results: default_max_results(),
            threshold: default_threshold(),
            weights: FieldWeights::default(),
        }
    }
}

fn default_max_query_chars() -> usize {
    300
}

fn default_min_query_chars() -> usize {
    1
}

fn default_max_query_words() -> usize {
    30
}

fn default_max_results() -> usize {
    25
}

fn default_threshold() -> f64 {
    0.4
}

/// Relative weights of the searched record fields
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldWeights {
    /// Alternate phrasings of the question
    #[serde(default = "default_synonym_questions_weight")]
    pub synonym_questions: f64,

    /// Canonical question text
    #[serde(default = "default_question_text_weight")]
    pub question_text: f64,

    /// Loosely related terms
    #[serde(default = "default_synonym_concepts_weight")]
    pub synonym_concepts: f64,
}

impl FieldWeights {
    /// Sum of all weights
    #[must_use]
    pub fn total(&self) -> f64 {
        self.synonym_questions + self.question_text + self.synonym_concepts
    }
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            synonym_questions: default_synonym_questions_weight(),
            question_text: default_question_text_weight(),
            synonym_concepts: default_synonym_concepts_weight(),
        }
    }
}

fn default_synonym_questions_weight() -> f64 {
    1.0
}

fn default_question_text_weight() -> f64 {
    0.4
}

fn default_synonym_concepts_weight() -> f64 {
    0.2
}

/// Fault report deduplication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Distinct signatures remembered per session
    #[serde(default = "default_dedup_capacity")]
    pub capacity: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            capacity: default_dedup_capacity(),
        }
    }
}

fn default_dedup_capacity() -> usize {
    50
}

/// Log output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit one JSON object per line instead of compact text
    #[serde(default)]
    pub json: bool,

    /// Include the event target in log lines
    #[serde(default)]
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            show_target: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
