//! Core utilities for the Kinderfrage offline search
//!
//! This crate provides the session-scoped building blocks the search engine
//! is assembled from:
//!
//! - **Error handling**: Errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based configuration with validation
//! - **Validation**: Fluent field validation for config values and corpus ids
//! - **Rate limiting**: Fixed-window request throttling
//! - **Deduplication**: Bounded "already reported" memory for fault signatures
//!
//! # Example
//!
//! ```rust
//! use kinderfrage_core::dedup::SignatureDeduplicator;
//! use kinderfrage_core::rate_limit::{FixedWindowLimiter, RateLimitConfig};
//!
//! let limiter = FixedWindowLimiter::new(RateLimitConfig::default());
//! assert!(limiter.allow());
//!
//! let dedup = SignatureDeduplicator::new(50);
//! assert!(dedup.should_report("search:match:11003"));
//! assert!(!dedup.should_report("search:match:11003"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod dedup;
pub mod error;
pub mod rate_limit;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::dedup::SignatureDeduplicator;
    pub use crate::error::{Error, ErrorCode, Result, ResultExt};
    pub use crate::rate_limit::{FixedWindowLimiter, RateLimitConfig};
    pub use crate::validation::{ValidationResult, Validator};
}
