//! The search entry point and its session state.
//!
//! One [`SearchEngine`] lives for one app session. The index is built on
//! first use (or through [`SearchEngine::warm`]); the throttle window and
//! the fault-signature memory persist until [`SearchEngine::reset`].

use crate::corpus::{ContentRecord, Corpus, LoadReport};
use crate::error::{Result, SearchError};
use crate::fuzzy::FuzzyMatcher;
use crate::index::SearchIndex;
use crate::preprocess::preprocess;
use crate::rank::Ranker;
use crate::sanitize::Sanitizer;
use kinderfrage_core::config::{ConfigSchema, DedupConfig, SearchConfig};
use kinderfrage_core::dedup::SignatureDeduplicator;
use kinderfrage_core::rate_limit::{FixedWindowLimiter, RateLimitConfig};
use kinderfrage_telemetry::{metrics, report_best_effort, FaultReporter, Timer, TracingFaultReporter};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

const COMPONENT: &str = "search";

/// Everything the engine needs from configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSettings {
    pub search: SearchConfig,
    pub rate_limit: RateLimitConfig,
    pub dedup: DedupConfig,
}

impl From<&ConfigSchema> for SearchSettings {
    fn from(schema: &ConfigSchema) -> Self {
        Self {
            search: schema.search.clone(),
            rate_limit: schema.rate_limit.clone(),
            dedup: schema.dedup.clone(),
        }
    }
}

/// Tagged result of one search call.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<'a> {
    /// Ranked records, never empty
    Hits(Vec<&'a ContentRecord>),
    /// Query rejected or nothing matched
    Empty,
    /// Too many attempts in the current window
    Throttled,
    /// Initialization or runtime failure, already reported
    Failed,
}

impl<'a> SearchOutcome<'a> {
    /// Collapse to the plain list the UI shows
    pub fn into_records(self) -> Vec<&'a ContentRecord> {
        match self {
            SearchOutcome::Hits(records) => records,
            SearchOutcome::Empty | SearchOutcome::Throttled | SearchOutcome::Failed => Vec::new(),
        }
    }

    fn metric(&self) -> &'static str {
        match self {
            SearchOutcome::Hits(_) => "search.hits",
            SearchOutcome::Empty => "search.empty",
            SearchOutcome::Throttled => "search.throttled",
            SearchOutcome::Failed => "search.failed",
        }
    }
}

/// Index build state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InitStatus {
    /// Not built yet; happens on the first search
    Pending,
    Ready,
    /// Build failed; every search is empty for this session
    Failed,
}

/// Configured limits, as reported by [`Diagnostics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Limits {
    pub max_query_chars: usize,
    pub min_query_chars: usize,
    pub max_query_words: usize,
    pub max_results: usize,
    pub threshold: f64,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_ms: u64,
    pub error_cache_capacity: usize,
}

/// Read-only operational snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    /// Records indexed; while the build is pending, the records waiting
    /// to be indexed
    pub index_size: usize,
    pub init_status: InitStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_error: Option<String>,
    pub skipped_records: usize,
    pub error_cache_size: usize,
    pub limits: Limits,
}

/// Pipeline stages run behind a panic guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Preprocess,
    Match,
}

impl Stage {
    fn name(self) -> &'static str {
        match self {
            Stage::Preprocess => "preprocess",
            Stage::Match => "match",
        }
    }
}

struct Ready {
    corpus: Corpus,
    index: SearchIndex,
    matcher: FuzzyMatcher,
}

impl Ready {
    fn build(corpus: Corpus, config: &SearchConfig) -> Result<Self> {
        let matcher = FuzzyMatcher::new(config.weights, config.threshold)?;
        let index = SearchIndex::build(&corpus);
        tracing::info!(records = index.len(), "Search index ready");
        Ok(Self {
            corpus,
            index,
            matcher,
        })
    }
}

/// Offline fuzzy search over one corpus.
pub struct SearchEngine {
    settings: SearchSettings,
    sanitizer: Sanitizer,
    ranker: Ranker,
    pending: Mutex<Option<Result<Corpus>>>,
    state: OnceCell<Result<Ready>>,
    load_report: LoadReport,
    limiter: FixedWindowLimiter,
    dedup: SignatureDeduplicator,
    reporter: Arc<dyn FaultReporter>,
    #[cfg(test)]
    faults: Mutex<Vec<Stage>>,
}

impl SearchEngine {
    /// Engine over an already-loaded corpus.
    pub fn new(corpus: Corpus, settings: SearchSettings) -> Self {
        Self::with_source(Ok(corpus), LoadReport::default(), settings)
    }

    /// Engine over JSON corpus text. Never fails: an unusable corpus leaves
    /// the engine in the failed state and every search comes back empty.
    pub fn from_json(json: &str, settings: SearchSettings) -> Self {
        match Corpus::from_json(json) {
            Ok((corpus, report)) => Self::with_source(Ok(corpus), report, settings),
            Err(e) => Self::with_source(Err(e), LoadReport::default(), settings),
        }
    }

    /// Engine over a corpus file, with the same failure handling as
    /// [`SearchEngine::from_json`].
    pub fn from_path(path: impl AsRef<std::path::Path>, settings: SearchSettings) -> Self {
        match Corpus::from_path(path) {
            Ok((corpus, report)) => Self::with_source(Ok(corpus), report, settings),
            Err(e) => Self::with_source(Err(e), LoadReport::default(), settings),
        }
    }

    fn with_source(source: Result<Corpus>, load_report: LoadReport, settings: SearchSettings) -> Self {
        Self {
            sanitizer: Sanitizer::from_config(&settings.search),
            ranker: Ranker::new(settings.search.max_results),
            limiter: FixedWindowLimiter::new(settings.rate_limit.clone()),
            dedup: SignatureDeduplicator::new(settings.dedup.capacity),
            pending: Mutex::new(Some(source)),
            state: OnceCell::new(),
            load_report,
            reporter: Arc::new(TracingFaultReporter),
            settings,
            #[cfg(test)]
            faults: Mutex::new(Vec::new()),
        }
    }

    /// Attach the report of a corpus loaded outside the engine, so
    /// [`SearchEngine::diagnostics`] counts its skipped entries.
    #[must_use]
    pub fn with_load_report(mut self, report: LoadReport) -> Self {
        self.load_report = report;
        self
    }

    /// Send fault reports to `reporter` instead of the log.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn FaultReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Build the index now rather than on the first search.
    ///
    /// Returns whether the engine is usable.
    pub fn warm(&self) -> bool {
        match self.ready() {
            Ok(_) => true,
            Err(e) => {
                self.report(e, "init");
                false
            }
        }
    }

    /// Ranked records for a raw user query; empty on rejection, throttling,
    /// failure, or no match.
    pub fn search(&self, raw: &str) -> Vec<&ContentRecord> {
        self.search_outcome(raw).into_records()
    }

    /// [`SearchEngine::search`] for untyped host input; anything but a JSON
    /// string is rejected.
    pub fn search_value(&self, raw: &serde_json::Value) -> Vec<&ContentRecord> {
        match raw.as_str() {
            Some(query) => self.search(query),
            None => Vec::new(),
        }
    }

    /// Run the pipeline and keep the outcome tag.
    pub fn search_outcome(&self, raw: &str) -> SearchOutcome<'_> {
        let timer = Timer::start("search.latency_ms");
        metrics().increment("search.requests");

        let outcome = self.run(raw);

        metrics().increment(outcome.metric());
        let elapsed = timer.stop();
        tracing::debug!(
            outcome = outcome.metric(),
            elapsed_us = elapsed.as_micros(),
            "Search finished"
        );
        outcome
    }

    fn run(&self, raw: &str) -> SearchOutcome<'_> {
        let Some(clean) = self.sanitizer.sanitize(raw) else {
            return SearchOutcome::Empty;
        };

        // A panicking preprocessor leaves the query unfiltered
        let query = self
            .guarded(Stage::Preprocess, || preprocess(&clean))
            .unwrap_or_else(|| clean.to_lowercase());
        if query.is_empty() {
            return SearchOutcome::Empty;
        }

        if !self.limiter.allow() {
            return SearchOutcome::Throttled;
        }

        let ready = match self.ready() {
            Ok(ready) => ready,
            Err(e) => {
                self.report(e, "init");
                return SearchOutcome::Failed;
            }
        };

        let ranked = self.guarded(Stage::Match, || {
            let matches = ready.matcher.search(&query, ready.index.entries());
            self.ranker.rank(&matches, &query, ready.index.entries())
        });
        let Some(positions) = ranked else {
            return SearchOutcome::Failed;
        };

        let records: Vec<&ContentRecord> = positions
            .into_iter()
            .filter_map(|position| ready.corpus.get(position))
            .collect();
        if records.is_empty() {
            SearchOutcome::Empty
        } else {
            SearchOutcome::Hits(records)
        }
    }

    /// Run one stage; a panic is reported under the stage's signature and
    /// comes back as `None`.
    fn guarded<T>(&self, stage: Stage, run: impl FnOnce() -> T) -> Option<T> {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.trip(stage);
            run()
        }));
        match result {
            Ok(value) => Some(value),
            Err(payload) => {
                self.report(&SearchError::from_panic(stage.name(), &*payload), stage.name());
                None
            }
        }
    }

    #[cfg(test)]
    fn trip(&self, stage: Stage) {
        let armed = self
            .faults
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&stage);
        if armed {
            panic!("{} fault", stage.name());
        }
    }

    #[cfg(not(test))]
    fn trip(&self, _stage: Stage) {}

    fn ready(&self) -> std::result::Result<&Ready, &SearchError> {
        self.state
            .get_or_init(|| {
                let source = self
                    .pending
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .take()
                    .unwrap_or_else(|| {
                        Err(SearchError::Internal {
                            stage: "init",
                            message: "corpus source already consumed".to_string(),
                        })
                    });
                source.and_then(|corpus| Ready::build(corpus, &self.settings.search))
            })
            .as_ref()
    }

    fn report(&self, error: &SearchError, operation: &str) {
        let signature = error.signature(COMPONENT, operation);
        if self.dedup.should_report(&signature) {
            report_best_effort(self.reporter.as_ref(), error, COMPONENT, operation);
        } else {
            tracing::trace!(%signature, "Fault already reported this session");
        }
    }

    /// Operational snapshot: index size, init status, error-cache size, and
    /// configured limits.
    pub fn diagnostics(&self) -> Diagnostics {
        let (index_size, init_status, init_error) = match self.state.get() {
            None => (self.pending_len(), InitStatus::Pending, None),
            Some(Ok(ready)) => (ready.index.len(), InitStatus::Ready, None),
            Some(Err(e)) => (0, InitStatus::Failed, Some(e.to_string())),
        };
        let search = &self.settings.search;

        Diagnostics {
            index_size,
            init_status,
            init_error,
            skipped_records: self.load_report.skipped.len(),
            error_cache_size: self.dedup.len(),
            limits: Limits {
                max_query_chars: search.max_query_chars,
                min_query_chars: search.min_query_chars,
                max_query_words: search.max_query_words,
                max_results: self.ranker.cap(),
                threshold: search.threshold,
                rate_limit_max_requests: self.settings.rate_limit.max_requests,
                rate_limit_window_ms: self.settings.rate_limit.window_ms,
                error_cache_capacity: self.dedup.capacity(),
            },
        }
    }

    fn pending_len(&self) -> usize {
        match self.pending.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            Some(Ok(corpus)) => corpus.len(),
            _ => 0,
        }
    }

    /// Entries skipped while loading the corpus.
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    /// Clear the fault-signature memory and the throttle window. The index
    /// is kept.
    pub fn reset(&self) {
        self.dedup.clear();
        self.limiter.reset();
        tracing::debug!("Search session state reset");
    }
}
