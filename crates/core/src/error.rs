//! Errors with codes, context, and recovery suggestions
//!
//! Every [`Error`] carries an [`ErrorCode`] rendered as `E####`, grouped by
//! thousands: 1xxx general, 2xxx IO, 3xxx configuration, 4xxx corpus.
//! Search-pipeline faults have their own code range in `kinderfrage-search`
//! and convert into this type at the binary boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Stable numeric error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A bug or broken invariant
    Internal,
    /// Other IO failure
    IoError,
    /// Path does not exist
    FileNotFound,
    /// Path exists but cannot be read
    PermissionDenied,
    /// Configuration file unreadable
    ConfigError,
    /// Explicit configuration path does not exist
    ConfigNotFound,
    /// Configuration is not valid TOML for the schema
    ConfigParseError,
    /// Configuration parsed but a value is out of range
    ConfigValidationError,
    /// Corpus is valid JSON of the wrong shape
    CorpusError,
    /// Corpus is not valid JSON
    CorpusParseError,
}

impl ErrorCode {
    /// Numeric value, as shown after the `E`
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Internal => 1001,
            Self::IoError => 2000,
            Self::FileNotFound => 2001,
            Self::PermissionDenied => 2002,
            Self::ConfigError => 3000,
            Self::ConfigNotFound => 3001,
            Self::ConfigParseError => 3002,
            Self::ConfigValidationError => 3003,
            Self::CorpusError => 4000,
            Self::CorpusParseError => 4001,
        }
    }

    /// Group the code belongs to
    #[must_use]
    pub const fn category(self) -> &'static str {
        match self {
            Self::Internal => "General",
            Self::IoError | Self::FileNotFound | Self::PermissionDenied => "IO",
            Self::ConfigError
            | Self::ConfigNotFound
            | Self::ConfigParseError
            | Self::ConfigValidationError => "Configuration",
            Self::CorpusError | Self::CorpusParseError => "Corpus",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Coded error with optional context and a hint for the user
#[derive(Error, Debug)]
pub struct Error {
    /// What went wrong, for programmatic handling
    pub code: ErrorCode,
    /// One-line description
    pub message: String,
    /// Where it happened (file, stage)
    pub context: Option<String>,
    /// What the user can do about it
    pub suggestion: Option<String>,
    /// Underlying cause
    #[source]
    pub source: Option<BoxedSource>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(context) = &self.context {
            write!(f, " ({context})")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  hint: {suggestion}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Error with just a code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Replace the context
    #[must_use]
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self {
            context: Some(context.into()),
            ..self
        }
    }

    /// Replace the suggestion
    #[must_use]
    pub fn with_suggestion(self, suggestion: impl Into<String>) -> Self {
        Self {
            suggestion: Some(suggestion.into()),
            ..self
        }
    }

    /// Attach the underlying cause
    #[must_use]
    pub fn with_source(self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..self
        }
    }

    /// A required input file is missing
    pub fn file_not_found(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::new(ErrorCode::FileNotFound, format!("{} does not exist", path.display()))
            .with_suggestion("Pass the path of an existing corpus JSON file")
    }

    /// An explicitly requested configuration file is missing
    pub fn config_not_found(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file {} does not exist", path.display()),
        )
        .with_suggestion("Create .kinderfrage.toml or drop --config to use defaults")
    }

    /// The corpus parsed but is not usable
    pub fn corpus(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::CorpusError, message)
    }
}

/// Result with the core [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Self::new(code, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::new(
            ErrorCode::CorpusParseError,
            format!("Corpus is not valid JSON: {err}"),
        )
        .with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::new(ErrorCode::ConfigParseError, format!("Invalid TOML: {err}")).with_source(err)
    }
}

/// Context and suggestions on `Result`s that already carry an [`Error`]
pub trait ResultExt<T> {
    /// Set the error's context
    fn context(self, context: impl Into<String>) -> Result<T>;
    /// Set the error's suggestion
    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_suggestion(suggestion))
    }
}
