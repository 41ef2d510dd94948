//! Error types for the search crate.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while building or running the search.
///
/// None of these cross [`SearchEngine::search`](crate::SearchEngine::search);
/// they are reported and then collapsed to an empty result.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Matcher weights or threshold are unusable
    #[error("Invalid matcher configuration: {0}")]
    InvalidConfig(String),

    /// Corpus text is not valid JSON
    #[error("Corpus parsing error: {0}")]
    CorpusParse(#[from] serde_json::Error),

    /// Corpus JSON is valid but not an array of records
    #[error("Corpus shape error: {0}")]
    CorpusShape(String),

    /// Corpus file could not be read
    #[error("Corpus read error: {0}")]
    Io(#[from] std::io::Error),

    /// A pipeline stage panicked
    #[error("Internal failure during {stage}: {message}")]
    Internal {
        /// Pipeline stage that failed
        stage: &'static str,
        /// Panic payload, if it was a string
        message: String,
    },
}

/// Error code for integration with kinderfrage-core error handling.
/// Range: 11xxx for search errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchErrorCode {
    /// Matcher weights or threshold are unusable
    InvalidConfig = 11001,
    /// Corpus text is not valid JSON
    CorpusParse = 11002,
    /// Corpus JSON is not an array of records
    CorpusShape = 11003,
    /// Corpus file could not be read
    Io = 11004,
    /// A pipeline stage panicked
    Internal = 11005,
}

impl SearchError {
    /// Returns the error code for this error.
    pub fn code(&self) -> SearchErrorCode {
        match self {
            SearchError::InvalidConfig(_) => SearchErrorCode::InvalidConfig,
            SearchError::CorpusParse(_) => SearchErrorCode::CorpusParse,
            SearchError::CorpusShape(_) => SearchErrorCode::CorpusShape,
            SearchError::Io(_) => SearchErrorCode::Io,
            SearchError::Internal { .. } => SearchErrorCode::Internal,
        }
    }

    /// Deduplication key: identical faults share one signature per session.
    pub fn signature(&self, component: &str, operation: &str) -> String {
        format!("{component}:{operation}:{}", self.code() as u32)
    }

    pub(crate) fn from_panic(stage: &'static str, payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        SearchError::Internal { stage, message }
    }
}

impl From<SearchError> for kinderfrage_core::Error {
    fn from(err: SearchError) -> Self {
        use kinderfrage_core::{Error, ErrorCode};

        match err {
            SearchError::Io(e) => Error::from(e),
            SearchError::CorpusParse(e) => Error::from(e),
            SearchError::CorpusShape(message) => Error::corpus(message)
                .with_suggestion("The corpus must be a JSON array of question records"),
            SearchError::InvalidConfig(message) => {
                Error::new(ErrorCode::ConfigValidationError, message)
            }
            e @ SearchError::Internal { .. } => Error::new(ErrorCode::Internal, e.to_string()),
        }
    }
}
