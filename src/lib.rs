// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analytics;
pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod ingest;
pub mod model;
pub mod sentiment;
pub mod store;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::analytics::AnalyticsEngine;
pub use crate::api::{router, AppState};
pub use crate::classifier::{Classification, Classifier};
pub use crate::error::{Error, StoreError};
pub use crate::ingest::{ImportReport, Ingestor};
pub use crate::model::{FeedbackRecord, RawFeedback, Sentiment, SentimentLabel};
pub use crate::store::{FeedbackStore, MemoryStore};

use std::sync::Arc;
use tracing::info;

/// Build the full application router from environment configuration.
/// The store is seeded from `FEEDBACK_STORE_PATH` when set.
pub fn app_from_env() -> anyhow::Result<(axum::Router, config::AppConfig, Arc<MemoryStore>)> {
    let cfg = config::AppConfig::from_env()?;
    let store = match &cfg.store_path {
        Some(p) => Arc::new(MemoryStore::load_json(p).map_err(|e| {
            Error::unavailable("feedback store", format!("{}: {e}", p.display()))
        })?),
        None => Arc::new(MemoryStore::new()),
    };
    let state = AppState::new(store.clone(), Classifier::default(), &cfg)?;
    info!(
        records = store.len()?,
        origins = cfg.allowed_origins.len(),
        own_brand = %cfg.analytics.own_brand,
        "application state ready"
    );
    Ok((router(state, &cfg.allowed_origins), cfg, store))
}
