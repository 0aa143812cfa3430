//! Legacy blob backend.
//!
//! Each entity dataset is a single named JSON object in an S3-compatible
//! bucket. Writes are delete-then-recreate; there is no partial update.
//!
//! Uses rust-s3 crate for lightweight S3 operations.

use std::path::PathBuf;

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::config::BlobConfig;
use crate::core::error::{AppError, Result};
use crate::modules::storage::RecordStore;

/// 404-shaped object store errors mean "blob absent".
fn is_absent(error: &S3Error) -> bool {
    let text = error.to_string();
    text.contains("404") || text.contains("NoSuchKey")
}

/// Blob-backed store for one entity dataset.
///
/// On first read, an absent blob is seeded from the bundled default dataset
/// (or from the matching local JSON document, when one exists) and the seed
/// is persisted before being returned.
pub struct JsonBlobStore<T> {
    bucket: Box<Bucket>,
    key: String,
    seed: Vec<T>,
    seed_file: Option<PathBuf>,
}

impl<T> JsonBlobStore<T> {
    pub fn new(
        config: &BlobConfig,
        key: impl Into<String>,
        seed: Vec<T>,
        seed_file: Option<PathBuf>,
    ) -> Result<Self> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Storage(format!("Failed to create blob credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| AppError::Storage(format!("Failed to open blob bucket: {}", e)))?;

        // Use path-style URLs for MinIO (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        Ok(Self {
            bucket,
            key: key.into(),
            seed,
            seed_file,
        })
    }
}

impl<T> JsonBlobStore<T>
where
    T: DeserializeOwned + Clone,
{
    /// The records an absent blob is initialized with: the local JSON
    /// document when it exists and parses, the bundled seed otherwise.
    async fn seed_records(&self) -> Vec<T> {
        if let Some(path) = &self.seed_file {
            if let Ok(raw) = tokio::fs::read_to_string(path).await {
                match serde_json::from_str(&raw) {
                    Ok(records) => return records,
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Local seed document is malformed, using bundled seed"
                        );
                    }
                }
            }
        }
        self.seed.clone()
    }
}

#[async_trait]
impl<T> RecordStore<T> for JsonBlobStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    async fn read_all(&self) -> Result<Vec<T>> {
        match self.bucket.get_object(&self.key).await {
            Ok(response) => Ok(serde_json::from_slice(&response.to_vec())?),
            Err(e) if is_absent(&e) => {
                tracing::info!(key = %self.key, "Blob not found, initializing with seed dataset");
                let seed = self.seed_records().await;
                self.write_all(&seed).await?;
                Ok(seed)
            }
            Err(e) => Err(AppError::Storage(format!(
                "Failed to read blob '{}': {}",
                self.key, e
            ))),
        }
    }

    async fn write_all(&self, records: &[T]) -> Result<()> {
        // Delete the old object first; recreate it whole below.
        if let Err(e) = self.bucket.delete_object(&self.key).await {
            if !is_absent(&e) {
                tracing::warn!(
                    key = %self.key,
                    error = %e,
                    "Could not delete blob before rewrite"
                );
            }
        }

        let json = serde_json::to_string_pretty(records)?;
        self.bucket
            .put_object_with_content_type(&self.key, json.as_bytes(), "application/json")
            .await
            .map_err(|e| {
                AppError::Storage(format!("Failed to write blob '{}': {}", self.key, e))
            })?;

        Ok(())
    }
}
