//! Error taxonomy shared by ingestion, the store, and the analytics engine.
//!
//! Per-record failures (`ItemEnrichment`) are logged and swallowed by the
//! ingest pipeline; everything else propagates to the caller untouched.

use thiserror::Error;

/// Failures surfaced by a `FeedbackStore` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed store contents: {0}")]
    Malformed(String),
}

/// Failures raised by the scoring primitive behind the classifier adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassifierError {
    #[error("text is empty")]
    EmptyText,
    #[error("scorer '{scorer}' failed: {reason}")]
    Scoring { scorer: &'static str, reason: String },
}

/// Crate-level error returned by ingestion and query operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or empty ingestion input. Nothing is committed.
    #[error("validation error: {0}")]
    Validation(String),

    /// A single record could not be enriched. Never escapes `import_batch`.
    #[error("enrichment failed for item {item}: {reason}")]
    ItemEnrichment { item: String, reason: String },

    /// Store access failed while running a named aggregation query.
    #[error("query '{query}' failed: {source}")]
    QueryExecution {
        query: &'static str,
        #[source]
        source: StoreError,
    },

    /// Store, classifier, or input file could not be reached.
    #[error("{dependency} unavailable: {reason}")]
    DependencyUnavailable {
        dependency: &'static str,
        reason: String,
    },

    /// Static configuration (pattern tables, config files) is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    pub(crate) fn query(query: &'static str, source: StoreError) -> Self {
        Error::QueryExecution { query, source }
    }

    pub(crate) fn unavailable(dependency: &'static str, reason: impl ToString) -> Self {
        Error::DependencyUnavailable {
            dependency,
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
