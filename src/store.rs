//! # Feedback store
//! Query capability consumed by the analytics engine and the ingest pipeline.
//!
//! The store is append-only from this crate's point of view. Grouping is a
//! pure helper over scanned records so every store gets the same semantics.

use std::collections::HashMap;
use std::hash::Hash;
use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::info;

use crate::error::StoreError;
use crate::model::{FeedbackRecord, Field};

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Every stored record, in insertion order.
    async fn scan(&self) -> Result<Vec<FeedbackRecord>, StoreError>;

    /// Records whose `field` equals `value` exactly.
    async fn filter_equals(
        &self,
        field: Field,
        value: &str,
    ) -> Result<Vec<FeedbackRecord>, StoreError>;

    /// Appends all records in one write; returns how many were stored.
    async fn bulk_insert(&self, records: Vec<FeedbackRecord>) -> Result<usize, StoreError>;

    /// Store name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Groups `records` by `key_fn`, folding each group with `reducer` starting
/// from `A::default()`. Groups come back in first-seen order.
pub fn group_by<'a, K, A, KF, R>(
    records: impl IntoIterator<Item = &'a FeedbackRecord>,
    key_fn: KF,
    mut reducer: R,
) -> Vec<(K, A)>
where
    K: Eq + Hash + Clone,
    A: Default,
    KF: Fn(&FeedbackRecord) -> K,
    R: FnMut(&mut A, &FeedbackRecord),
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, A)> = Vec::new();

    for r in records {
        let key = key_fn(r);
        let slot = match index.get(&key) {
            Some(&i) => i,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, A::default()));
                groups.len() - 1
            }
        };
        reducer(&mut groups[slot].1, r);
    }

    groups
}

/// In-process store backed by a `Vec` behind a lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Vec<FeedbackRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<FeedbackRecord>) -> Self {
        Self {
            inner: RwLock::new(records),
        }
    }

    /// Load a snapshot: a JSON array of already-enriched records.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let records: Vec<FeedbackRecord> = serde_json::from_str(&data)
            .map_err(|e| StoreError::Malformed(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), records = records.len(), "loaded feedback snapshot");
        Ok(Self::with_records(records))
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<FeedbackRecord>>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn scan(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
        Ok(self.read()?.clone())
    }

    async fn filter_equals(
        &self,
        field: Field,
        value: &str,
    ) -> Result<Vec<FeedbackRecord>, StoreError> {
        Ok(self
            .read()?
            .iter()
            .filter(|r| field.value_of(r) == Some(value))
            .cloned()
            .collect())
    }

    async fn bulk_insert(&self, records: Vec<FeedbackRecord>) -> Result<usize, StoreError> {
        let n = records.len();
        let mut guard = self
            .inner
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?;
        guard.extend(records);
        Ok(n)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
