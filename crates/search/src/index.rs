//! Lower-cased copies of the searchable fields, built once per corpus.

use crate::corpus::{ContentRecord, Corpus};

/// Searchable view of one [`ContentRecord`], at the same position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedIndexEntry {
    pub question_text: String,
    pub synonym_questions: Vec<String>,
    pub synonym_concepts: Vec<String>,
}

impl NormalizedIndexEntry {
    pub fn from_record(record: &ContentRecord) -> Self {
        Self {
            question_text: normalize(&record.question_text),
            synonym_questions: record.synonym_questions.iter().map(|s| normalize(s)).collect(),
            synonym_concepts: record.synonym_concepts.iter().map(|s| normalize(s)).collect(),
        }
    }
}

/// Index entries in corpus order.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<NormalizedIndexEntry>,
}

impl SearchIndex {
    pub fn build(corpus: &Corpus) -> Self {
        let entries: Vec<_> = corpus
            .records()
            .iter()
            .map(NormalizedIndexEntry::from_record)
            .collect();
        tracing::debug!(entries = entries.len(), "Search index built");
        Self { entries }
    }

    pub fn entries(&self) -> &[NormalizedIndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lower-case and collapse runs of whitespace to one space.
pub(crate) fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
