//! Telemetry for the Kinderfrage search
//!
//! Log output goes through `tracing`; hosts call [`init_with_config`] once at
//! startup. Search outcomes are counted in the process-wide [`metrics`]
//! registry, and internal faults are handed to a [`FaultReporter`].

use anyhow::Context;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

mod metrics;
mod report;

pub use metrics::{metrics, HistogramStats, MetricsRegistry, MetricsSnapshot, Timer};
pub use report::{report_best_effort, FaultRecord, FaultReporter, MemoryFaultReporter, TracingFaultReporter};

static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Identifier of this process's session, attached to fault reports and the
/// metrics export.
pub fn session_id() -> &'static str {
    &SESSION_ID
}

/// How log lines are rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub log_level: String,
    /// One JSON object per line instead of compact text
    pub json: bool,
    pub show_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
            show_target: false,
        }
    }
}

impl TelemetryConfig {
    /// Defaults with a different filter directive
    pub fn with_level(level: impl Into<String>) -> Self {
        Self {
            log_level: level.into(),
            ..Self::default()
        }
    }

    fn filter(&self) -> anyhow::Result<EnvFilter> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.log_level)
                .with_context(|| format!("Invalid log level '{}'", self.log_level)),
        }
    }
}

/// Install the global subscriber, writing to stderr.
///
/// Fails if the level directive does not parse or a subscriber is already
/// installed.
pub fn init_with_config(config: &TelemetryConfig) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(config.filter()?);

    let installed = if config.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(config.show_target),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_target(config.show_target),
            )
            .try_init()
    };
    installed.context("Failed to install tracing subscriber")?;

    tracing::debug!(
        session_id = %session_id(),
        version = env!("CARGO_PKG_VERSION"),
        "Logging initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_is_stable_uuid() {
        let id = session_id();
        assert!(Uuid::parse_str(id).is_ok());
        assert_eq!(id, session_id());
    }

    #[test]
    fn test_with_level() {
        let config = TelemetryConfig::with_level("kinderfrage_search=trace");
        assert_eq!(config.log_level, "kinderfrage_search=trace");
        assert!(!config.json);
    }

    #[test]
    fn test_bad_level_is_rejected() {
        // Only meaningful when RUST_LOG does not take precedence
        if std::env::var_os("RUST_LOG").is_none() {
            let config = TelemetryConfig::with_level("kinderfrage=loud");
            assert!(config.filter().is_err());
        }
    }
}
