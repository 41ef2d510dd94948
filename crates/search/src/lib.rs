//! Offline fuzzy search for the Kinderfrage content browser.
//!
//! This crate provides:
//! - Strict corpus loading with per-entry skipping
//! - Query sanitization and German stopword removal that keeps negations
//! - Field-weighted approximate substring matching
//! - Exact-synonym promotion and result capping
//! - A session engine with throttling and deduplicated fault reporting
//!
//! # Example
//!
//! ```
//! use kinderfrage_search::{SearchEngine, SearchSettings};
//!
//! let corpus = r#"[{
//!     "QuestionIDIndex": "q1",
//!     "QuestionIndex": "Warum weint mein Kind?",
//!     "AnswerIndex": "...",
//!     "SynonymQuestionsIndex": ["kind weint viel", "baby schreit"],
//!     "SynonymConceptsIndex": ["emotionen"]
//! }]"#;
//!
//! let engine = SearchEngine::from_json(corpus, SearchSettings::default());
//! let results = engine.search("mein Kind weint");
//! assert_eq!(results[0].id, "q1");
//! ```

mod corpus;
mod engine;
mod error;
mod fuzzy;
mod index;
mod preprocess;
mod rank;
mod sanitize;

pub use corpus::{ContentRecord, Corpus, LoadReport, SkipReason, SkippedRecord};
pub use engine::{Diagnostics, InitStatus, Limits, SearchEngine, SearchOutcome, SearchSettings};
pub use error::{Result, SearchError, SearchErrorCode};
pub use fuzzy::{substring_distance, Field, FieldMatch, FuzzyMatcher, MatchResult};
pub use index::{NormalizedIndexEntry, SearchIndex};
pub use preprocess::{preprocess, NEGATIONS, STOPWORDS};
pub use rank::Ranker;
pub use sanitize::{sanitize, Sanitizer};
