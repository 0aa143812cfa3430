//! Local JSON document backend.
//!
//! One pretty-printed JSON array per entity type on disk, the layout the
//! original development datasets used.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::error::Result;
use crate::modules::storage::RecordStore;

/// File-backed store for one entity dataset.
///
/// A missing or malformed document serves the seed dataset instead of
/// erroring; the seed is only persisted once something is written.
pub struct JsonFileStore<T> {
    path: PathBuf,
    seed: Vec<T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>, seed: Vec<T>) -> Self {
        Self {
            path: path.into(),
            seed,
        }
    }
}

#[async_trait]
impl<T> RecordStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    async fn read_all(&self) -> Result<Vec<T>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(records) => Ok(records),
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Malformed JSON document, serving seed dataset"
                    );
                    Ok(self.seed.clone())
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(
                    path = %self.path.display(),
                    "JSON document missing, serving seed dataset"
                );
                Ok(self.seed.clone())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, records: &[T]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(records)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Rec {
        id: String,
    }

    fn rec(id: &str) -> Rec {
        Rec { id: id.to_string() }
    }

    #[tokio::test]
    async fn test_missing_document_serves_seed() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("recs.json"), vec![rec("seed")]);

        let records = store.read_all().await.unwrap();
        assert_eq!(records, vec![rec("seed")]);
        // the seed is not persisted by a read
        assert!(!dir.path().join("recs.json").exists());
    }

    #[tokio::test]
    async fn test_malformed_document_serves_seed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recs.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::new(&path, vec![rec("seed")]);
        let records = store.read_all().await.unwrap();
        assert_eq!(records, vec![rec("seed")]);
    }

    #[tokio::test]
    async fn test_write_then_read_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/recs.json"), vec![]);

        store.write_all(&[rec("a"), rec("b")]).await.unwrap();
        let records = store.read_all().await.unwrap();
        assert_eq!(records, vec![rec("a"), rec("b")]);
    }
}
