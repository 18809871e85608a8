// src/ingest/mod.rs
//! Ingestion / enrichment pipeline: raw feedback → classified records → store.
//!
//! Items are enriched independently. An item that fails (empty text, scorer
//! error, unparseable date, wrong shape) is logged and dropped; the batch
//! carries on and commits the rest in a single bulk write.

pub mod file;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::classifier::Classifier;
use crate::error::{Error, Result};
use crate::model::{FeedbackRecord, RawFeedback, Sentiment};
use crate::store::FeedbackStore;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_items_total", "Raw feedback items received.");
        describe_counter!(
            "ingest_inserted_total",
            "Enriched records written to the store."
        );
        describe_counter!(
            "ingest_dropped_total",
            "Items dropped because enrichment failed."
        );
        describe_gauge!("ingest_last_run_ts", "Unix ts when a batch was last imported.");
    });
}

/// Outcome of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub inserted_count: usize,
    pub dropped: usize,
}

#[derive(Clone)]
pub struct Ingestor {
    classifier: Classifier,
    store: Arc<dyn FeedbackStore>,
}

impl Ingestor {
    pub fn new(classifier: Classifier, store: Arc<dyn FeedbackStore>) -> Self {
        ensure_metrics_described();
        Self { classifier, store }
    }

    pub async fn import_batch(&self, items: Vec<RawFeedback>) -> Result<ImportReport> {
        self.import_batch_at(items, Utc::now()).await
    }

    /// `now` is the date given to items that carry none.
    pub async fn import_batch_at(
        &self,
        items: Vec<RawFeedback>,
        now: DateTime<Utc>,
    ) -> Result<ImportReport> {
        if items.is_empty() {
            return Err(Error::Validation("feedback batch is empty".into()));
        }
        let received = items.len();
        self.enrich_and_commit(received, items.into_iter().enumerate().collect(), now)
            .await
    }

    /// Accepts an untyped payload; it must be a non-empty JSON array. Items
    /// that do not match the raw feedback shape are dropped like enrichment
    /// failures.
    pub async fn import_json(&self, payload: Value) -> Result<ImportReport> {
        let Value::Array(values) = payload else {
            return Err(Error::Validation("expected a JSON array of feedback items".into()));
        };
        if values.is_empty() {
            return Err(Error::Validation("feedback batch is empty".into()));
        }

        let received = values.len();
        let items = values
            .into_iter()
            .enumerate()
            .filter_map(|(i, v)| match serde_json::from_value::<RawFeedback>(v) {
                Ok(raw) => Some((i, raw)),
                Err(e) => {
                    let e = Error::ItemEnrichment {
                        item: format!("#{i}"),
                        reason: format!("invalid item: {e}"),
                    };
                    log_dropped(i, None, &e);
                    None
                }
            })
            .collect();
        self.enrich_and_commit(received, items, Utc::now()).await
    }

    /// `received` counts every submitted item, including those already
    /// rejected before enrichment.
    async fn enrich_and_commit(
        &self,
        received: usize,
        items: Vec<(usize, RawFeedback)>,
        now: DateTime<Utc>,
    ) -> Result<ImportReport> {
        let enriched: Vec<FeedbackRecord> = items
            .into_iter()
            .filter_map(|(i, raw)| match self.enrich(&raw, now) {
                Ok(r) => Some(r),
                Err(e) => {
                    log_dropped(i, Some(&anon_hash(&raw.text)), &e);
                    None
                }
            })
            .collect();
        self.commit(received, enriched, now).await
    }

    fn enrich(&self, raw: &RawFeedback, now: DateTime<Utc>) -> Result<FeedbackRecord> {
        let item = raw.id.clone().unwrap_or_else(|| "<no id>".to_string());
        let date = raw
            .parsed_date()
            .map_err(|reason| Error::ItemEnrichment {
                item: item.clone(),
                reason,
            })?
            .unwrap_or(now);
        let c = self
            .classifier
            .classify(&raw.text)
            .map_err(|e| Error::ItemEnrichment {
                item,
                reason: e.to_string(),
            })?;

        Ok(FeedbackRecord {
            id: raw.id.clone(),
            text: raw.text.clone(),
            date,
            category: raw.category.clone(),
            source: raw.source.clone(),
            model: raw.model.clone(),
            customer_id: raw.customer_id.clone(),
            sentiment: Sentiment::new(c.label, c.score),
            metadata: Some(json!({
                "sentimentRaw": c.raw,
                "scorer": self.classifier.scorer_name(),
            })),
        })
    }

    async fn commit(
        &self,
        received: usize,
        enriched: Vec<FeedbackRecord>,
        now: DateTime<Utc>,
    ) -> Result<ImportReport> {
        let dropped = received - enriched.len();
        let inserted = if enriched.is_empty() {
            0
        } else {
            self.store
                .bulk_insert(enriched)
                .await
                .map_err(|e| Error::unavailable(self.store.name(), e))?
        };

        counter!("ingest_items_total").increment(received as u64);
        counter!("ingest_inserted_total").increment(inserted as u64);
        counter!("ingest_dropped_total").increment(dropped as u64);
        gauge!("ingest_last_run_ts").set(now.timestamp() as f64);
        info!(received, inserted, dropped, "feedback batch imported");

        Ok(ImportReport {
            inserted_count: inserted,
            dropped,
        })
    }
}

/// Never log raw feedback text; only a short hash of it.
fn log_dropped(index: usize, text_id: Option<&str>, e: &Error) {
    warn!(index, text_id = text_id.unwrap_or("-"), error = %e, "dropping feedback item");
}

pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClassifierError, StoreError};
    use crate::model::{Field, SentimentLabel};
    use crate::sentiment::{LexiconScorer, RawScore, SentimentScorer};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use chrono::TimeZone;

    /// Fails on any text containing "boom"; otherwise defers to the lexicon.
    struct Flaky;

    impl SentimentScorer for Flaky {
        fn score(&self, text: &str) -> std::result::Result<RawScore, ClassifierError> {
            if text.contains("boom") {
                return Err(ClassifierError::Scoring {
                    scorer: "flaky",
                    reason: "exploded".into(),
                });
            }
            LexiconScorer::new().score(text)
        }
        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    struct DownStore;

    #[async_trait]
    impl FeedbackStore for DownStore {
        async fn scan(&self) -> std::result::Result<Vec<FeedbackRecord>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn filter_equals(
            &self,
            _field: Field,
            _value: &str,
        ) -> std::result::Result<Vec<FeedbackRecord>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn bulk_insert(
            &self,
            _records: Vec<FeedbackRecord>,
        ) -> std::result::Result<usize, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        fn name(&self) -> &'static str {
            "down"
        }
    }

    fn flaky(store: Arc<dyn FeedbackStore>) -> Ingestor {
        Ingestor::new(Classifier::new(Arc::new(Flaky)), store)
    }

    #[tokio::test]
    async fn failing_items_are_dropped_not_fatal() {
        let store = Arc::new(MemoryStore::new());
        let ing = flaky(store.clone());
        let items = vec![
            RawFeedback::new("great phone"),
            RawFeedback::new("boom"),
            RawFeedback::new(""),
            RawFeedback::new("awful battery"),
        ];
        let report = ing.import_batch(items).await.unwrap();
        assert_eq!(report, ImportReport { inserted_count: 2, dropped: 2 });
        assert_eq!(store.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn missing_date_defaults_to_now_and_labels_are_attached() {
        let store = Arc::new(MemoryStore::new());
        let ing = flaky(store.clone());
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap();
        let mut dated = RawFeedback::new("terrible, broken, useless");
        dated.date = Some(json!("2025-05-20T10:00:00Z"));
        dated.customer_id = Some("c-1".into());
        ing.import_batch_at(vec![RawFeedback::new("love it"), dated], now)
            .await
            .unwrap();

        let rs = store.scan().await.unwrap();
        assert_eq!(rs[0].date, now);
        assert_eq!(rs[0].label(), Some(SentimentLabel::Positive));
        assert_eq!(rs[1].day(), "2025-05-20");
        assert_eq!(rs[1].label(), Some(SentimentLabel::Negative));
        assert_eq!(rs[1].customer_id.as_deref(), Some("c-1"));
        let meta = rs[1].metadata.as_ref().unwrap();
        assert_eq!(meta["sentimentRaw"]["score"], -8.0);
    }

    #[tokio::test]
    async fn unparseable_date_drops_only_that_item() {
        let store = Arc::new(MemoryStore::new());
        let mut bad = RawFeedback::new("nice");
        bad.date = Some(json!("not a date"));
        let report = flaky(store.clone())
            .import_batch(vec![bad, RawFeedback::new("nice")])
            .await
            .unwrap();
        assert_eq!(report.inserted_count, 1);
    }

    #[tokio::test]
    async fn empty_batch_is_rejected() {
        let ing = flaky(Arc::new(MemoryStore::new()));
        assert!(matches!(
            ing.import_batch(vec![]).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            ing.import_json(json!([])).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            ing.import_json(json!({"text": "hi"})).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn json_items_with_wrong_shape_are_dropped() {
        let store = Arc::new(MemoryStore::new());
        let report = flaky(store.clone())
            .import_json(json!([
                {"text": "good"},
                {"category": "Camera"},
                42,
                {"text": "fine", "source": "Reddit"}
            ]))
            .await
            .unwrap();
        assert_eq!(report.inserted_count, 2);
        assert_eq!(report.dropped, 2);
    }

    #[tokio::test]
    async fn json_import_counts_shape_and_scoring_failures_together() {
        let store = Arc::new(MemoryStore::new());
        let report = flaky(store.clone())
            .import_json(json!([{"text": "boom"}, 42, {"text": "nice"}, {"text": ""}]))
            .await
            .unwrap();
        assert_eq!(report, ImportReport { inserted_count: 1, dropped: 3 });
        assert_eq!(store.scan().await.unwrap()[0].text, "nice");
    }

    #[tokio::test]
    async fn store_failure_fails_the_batch() {
        let err = flaky(Arc::new(DownStore))
            .import_batch(vec![RawFeedback::new("good")])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DependencyUnavailable { dependency: "down", .. }
        ));
    }

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("some feedback");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("some feedback"));
        assert_ne!(a, anon_hash("other feedback"));
    }
}
