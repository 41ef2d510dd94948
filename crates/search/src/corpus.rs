//! Static content corpus and its load-time validation.
//!
//! The corpus arrives as a JSON array of records using the content team's
//! field names (`QuestionIDIndex`, `QuestionIndex`, ...). Each entry is
//! checked on its own: a malformed entry is skipped and noted in the
//! [`LoadReport`], it never fails the whole load.

use crate::error::{Result, SearchError};
use kinderfrage_core::validation::validate_record_id;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One question/answer entry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentRecord {
    /// Stable identifier, `q` followed by 1-10 alphanumerics
    pub id: String,
    /// Canonical display string
    pub question_text: String,
    /// Alternate phrasings, the primary match signal
    pub synonym_questions: Vec<String>,
    /// Loosely related terms, the secondary match signal
    pub synonym_concepts: Vec<String>,
    /// Markdown answer, not searched
    pub answer_text: String,
    /// Display hint, not searched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_position: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "QuestionIDIndex")]
    id: String,
    #[serde(rename = "QuestionIndex")]
    question: String,
    #[serde(rename = "AnswerIndex")]
    answer: String,
    #[serde(rename = "SynonymQuestionsIndex", default)]
    synonym_questions: Vec<String>,
    #[serde(rename = "SynonymConceptsIndex", default)]
    synonym_concepts: Vec<String>,
    #[serde(rename = "imagePosition", default, deserialize_with = "display_hint")]
    image_position: Option<String>,
}

/// Strings pass through, numbers and booleans are kept as their JSON text,
/// anything else is dropped without rejecting the entry.
fn display_hint<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(hint)) => Some(hint),
        Some(hint @ (serde_json::Value::Number(_) | serde_json::Value::Bool(_))) => Some(hint.to_string()),
        _ => None,
    })
}

impl From<RawRecord> for ContentRecord {
    fn from(raw: RawRecord) -> Self {
        Self {
            id: raw.id.trim().to_string(),
            question_text: raw.question.trim().to_string(),
            synonym_questions: non_blank(raw.synonym_questions),
            synonym_concepts: non_blank(raw.synonym_concepts),
            answer_text: raw.answer,
            image_position: raw.image_position,
        }
    }
}

fn non_blank(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Why an entry was left out of the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Entry is `null`, a number, a string, ...
    NotAnObject,
    /// Missing required field or field of the wrong type
    InvalidShape(String),
    /// Identifier does not match the id pattern
    InvalidId(String),
    /// Identifier already used by an earlier entry
    DuplicateId(String),
    /// Question text is blank
    EmptyQuestion(String),
}

/// An entry that did not make it into the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    /// Zero-based position in the source array
    pub position: usize,
    /// Why it was skipped
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Outcome of a corpus load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Entries accepted into the corpus
    pub accepted: usize,
    /// Entries left out, in source order
    pub skipped: Vec<SkippedRecord>,
}

impl LoadReport {
    /// Whether every entry was accepted
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// The read-only collection of records searched.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    records: Vec<ContentRecord>,
}

impl Corpus {
    /// Build a corpus from already-typed records, applying the same checks
    /// as the JSON loader.
    pub fn from_records(records: impl IntoIterator<Item = ContentRecord>) -> (Self, LoadReport) {
        let mut builder = Builder::default();
        for (position, record) in records.into_iter().enumerate() {
            builder.admit(position, record);
        }
        builder.finish()
    }

    /// Parse a corpus from JSON text.
    ///
    /// Fails only when the text is not JSON or not an array; bad entries
    /// are skipped.
    pub fn from_json(json: &str) -> Result<(Self, LoadReport)> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Read and parse a corpus file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<(Self, LoadReport)> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Build a corpus from an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<(Self, LoadReport)> {
        let serde_json::Value::Array(entries) = value else {
            return Err(SearchError::CorpusShape(format!(
                "expected an array of records, found {}",
                json_kind(&value)
            )));
        };

        let mut builder = Builder::default();
        for (position, entry) in entries.into_iter().enumerate() {
            if !entry.is_object() {
                builder.skip(position, SkipReason::NotAnObject);
                continue;
            }
            match serde_json::from_value::<RawRecord>(entry) {
                Ok(raw) => builder.admit(position, raw.into()),
                Err(e) => builder.skip(position, SkipReason::InvalidShape(e.to_string())),
            }
        }

        let (corpus, report) = builder.finish();
        if !report.is_clean() {
            tracing::warn!(
                accepted = report.accepted,
                skipped = report.skipped.len(),
                "Corpus loaded with skipped entries"
            );
        }
        Ok((corpus, report))
    }

    /// All records in source order
    pub fn records(&self) -> &[ContentRecord] {
        &self.records
    }

    /// Record at a position
    pub fn get(&self, position: usize) -> Option<&ContentRecord> {
        self.records.get(position)
    }

    /// Record with a given id
    pub fn find(&self, id: &str) -> Option<&ContentRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Default)]
struct Builder {
    records: Vec<ContentRecord>,
    ids: HashSet<String>,
    report: LoadReport,
}

impl Builder {
    fn admit(&mut self, position: usize, record: ContentRecord) {
        if !validate_record_id(&record.id).is_valid() {
            return self.skip(position, SkipReason::InvalidId(record.id));
        }
        if record.question_text.trim().is_empty() {
            return self.skip(position, SkipReason::EmptyQuestion(record.id));
        }
        if !self.ids.insert(record.id.clone()) {
            return self.skip(position, SkipReason::DuplicateId(record.id));
        }
        self.records.push(record);
        self.report.accepted += 1;
    }

    fn skip(&mut self, position: usize, reason: SkipReason) {
        tracing::debug!(position, ?reason, "Skipping corpus entry");
        self.report.skipped.push(SkippedRecord { position, reason });
    }

    fn finish(self) -> (Corpus, LoadReport) {
        (Corpus { records: self.records }, self.report)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
