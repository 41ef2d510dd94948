//! Weighted approximate matching.
//!
//! A field value scores `d / m`, where `m` is the query length in chars and
//! `d` the fewest single-character edits turning the query into *some*
//! substring of the value (position ignored). 0 is a literal occurrence,
//! 1 means nothing in common. Per-field scores combine as
//! `Π max(score, ε) ^ weight` over matching fields with weights normalized
//! to sum 1, so a perfect hit on a heavy field beats a perfect hit on a
//! light one and every extra matching field improves the total.

use crate::error::{Result, SearchError};
use crate::index::NormalizedIndexEntry;
use kinderfrage_core::config::FieldWeights;
use serde::Serialize;

/// Calculate the minimum edit distance between `pattern` and any substring
/// of `text`.
///
/// # Arguments
/// * `pattern` - Query characters
/// * `text` - Text to search in
///
/// # Returns
/// Number of single-character edits; at most `pattern.len()`
pub fn substring_distance(pattern: &[char], text: &str) -> usize {
    let m = pattern.len();
    if m == 0 {
        return 0;
    }

    // Column over the pattern for the text prefix consumed so far. Row 0 is
    // always 0: a match may start anywhere in the text.
    let mut prev: Vec<usize> = (0..=m).collect();
    let mut curr = vec![0; m + 1];
    let mut best = m;

    for t in text.chars() {
        curr[0] = 0;
        for i in 1..=m {
            let cost = usize::from(pattern[i - 1] != t);
            curr[i] = (prev[i - 1] + cost)
                .min(prev[i] + 1)
                .min(curr[i - 1] + 1);
        }
        best = best.min(curr[m]);
        if best == 0 {
            break;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    best
}

/// Searchable field of an index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    SynonymQuestions,
    QuestionText,
    SynonymConcepts,
}

/// Best score a single field achieved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldMatch {
    pub field: Field,
    /// 0 (literal) to `threshold`
    pub score: f64,
}

/// A candidate entry with its combined relevance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Position of the entry in the index (and the corpus)
    pub position: usize,
    /// Combined score, lower is better
    pub score: f64,
    /// Fields that passed the threshold
    pub fields: Vec<FieldMatch>,
}

/// Field-weighted fuzzy matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatcher {
    /// Normalized weights, in `Field` declaration order
    weights: [(Field, f64); 3],
    threshold: f64,
}

impl FuzzyMatcher {
    /// Build a matcher, rejecting negative/non-finite weights, an all-zero
    /// weight set, or a threshold outside `[0, 1]`.
    pub fn new(weights: FieldWeights, threshold: f64) -> Result<Self> {
        let raw = [
            (Field::SynonymQuestions, weights.synonym_questions),
            (Field::QuestionText, weights.question_text),
            (Field::SynonymConcepts, weights.synonym_concepts),
        ];
        if let Some((field, w)) = raw.iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
            return Err(SearchError::InvalidConfig(format!(
                "weight for {field:?} must be a non-negative number, got {w}"
            )));
        }
        let total: f64 = raw.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return Err(SearchError::InvalidConfig(
                "at least one field weight must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SearchError::InvalidConfig(format!(
                "threshold must be within [0, 1], got {threshold}"
            )));
        }

        Ok(Self {
            weights: raw.map(|(field, w)| (field, w / total)),
            threshold,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Normalized weight of a field
    pub fn weight(&self, field: Field) -> f64 {
        self.weights
            .iter()
            .find(|(f, _)| *f == field)
            .map_or(0.0, |(_, w)| *w)
    }

    /// Score every entry against `query`, best first.
    ///
    /// Ties keep index order. An empty query or index yields no matches.
    pub fn search(&self, query: &str, entries: &[NormalizedIndexEntry]) -> Vec<MatchResult> {
        let query = query.trim().to_lowercase();
        if query.is_empty() || entries.is_empty() {
            return Vec::new();
        }
        let pattern: Vec<char> = query.chars().collect();

        let mut results: Vec<MatchResult> = entries
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| self.score_entry(&query, &pattern, entry, position))
            .collect();

        // Stable, so equal scores keep index order
        results.sort_by(|a, b| a.score.total_cmp(&b.score));
        results
    }

    fn score_entry(
        &self,
        query: &str,
        pattern: &[char],
        entry: &NormalizedIndexEntry,
        position: usize,
    ) -> Option<MatchResult> {
        let mut fields = Vec::new();
        let mut total = 1.0_f64;

        for &(field, weight) in &self.weights {
            if weight == 0.0 {
                continue;
            }
            let best = match field {
                Field::SynonymQuestions => self.best_of(query, pattern, &entry.synonym_questions),
                Field::QuestionText => {
                    self.value_score(query, pattern, &entry.question_text)
                }
                Field::SynonymConcepts => self.best_of(query, pattern, &entry.synonym_concepts),
            };
            if let Some(score) = best {
                total *= score.max(f64::EPSILON).powf(weight);
                fields.push(FieldMatch { field, score });
            }
        }

        (!fields.is_empty()).then_some(MatchResult {
            position,
            score: total,
            fields,
        })
    }

    fn best_of(&self, query: &str, pattern: &[char], values: &[String]) -> Option<f64> {
        values
            .iter()
            .filter_map(|v| self.value_score(query, pattern, v))
            .min_by(f64::total_cmp)
    }

    fn value_score(&self, query: &str, pattern: &[char], value: &str) -> Option<f64> {
        if value.is_empty() {
            return None;
        }
        let distance = if value.contains(query) {
            0
        } else {
            substring_distance(pattern, value)
        };
        let score = distance as f64 / pattern.len() as f64;
        (score <= self.threshold).then_some(score)
    }
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        let weights = FieldWeights::default();
        let total = weights.total();
        Self {
            weights: [
                (Field::SynonymQuestions, weights.synonym_questions / total),
                (Field::QuestionText, weights.question_text / total),
                (Field::SynonymConcepts, weights.synonym_concepts / total),
            ],
            threshold: 0.4,
        }
    }
}
