// src/ingest/file.rs
//! Bulk import from a JSON file of raw feedback (the dashboard's "import mock
//! feedback" action).

use std::path::Path;

use serde_json::Value;
use tracing::info;

use super::{ImportReport, Ingestor};
use crate::error::{Error, Result};

impl Ingestor {
    /// Reads a JSON array of raw feedback from `path` and imports it.
    /// An unreadable file is a dependency failure; a non-array or empty
    /// array is a validation failure.
    pub async fn import_file(&self, path: &Path) -> Result<ImportReport> {
        info!(path = %path.display(), "importing feedback file");
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::unavailable("feedback file", format!("{}: {e}", path.display())))?;
        let payload: Value = serde_json::from_str(&content).map_err(|e| {
            Error::Validation(format!("{} is not valid JSON: {e}", path.display()))
        })?;
        self.import_json(payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn ingestor(store: Arc<MemoryStore>) -> Ingestor {
        Ingestor::new(Classifier::default(), store)
    }

    #[tokio::test]
    async fn imports_array_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("mock.json");
        std::fs::write(
            &p,
            r#"[
                {"id": "1", "text": "Love the camera", "category": "Camera", "source": "Twitter"},
                {"id": "2", "text": "battery is terrible", "date": "2025-01-02"}
            ]"#,
        )
        .unwrap();
        let store = Arc::new(MemoryStore::new());
        let report = ingestor(store.clone()).import_file(&p).await.unwrap();
        assert_eq!(report.inserted_count, 2);
        assert_eq!(store.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn missing_file_is_dependency_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = ingestor(Arc::new(MemoryStore::new()))
            .import_file(&dir.path().join("nope.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DependencyUnavailable { .. }));
    }

    #[tokio::test]
    async fn object_file_is_validation_failure() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("obj.json");
        std::fs::write(&p, r#"{"items": []}"#).unwrap();
        let store = Arc::new(MemoryStore::new());
        let err = ingestor(store.clone()).import_file(&p).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(store.is_empty().unwrap());
    }
}
