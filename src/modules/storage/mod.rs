//! Storage adapter for the content datasets.
//!
//! Every entity type (categories, tutorials, admin users) is read and
//! written as a complete record set through [`RecordStore`]. Three
//! interchangeable backends implement the contract: local JSON documents,
//! JSON blobs in an S3-compatible bucket (legacy) and normalized Postgres
//! tables. The backend is chosen exactly once, in [`Stores::open`], from
//! the injected configuration.

mod blob;
mod json_file;
mod postgres;

pub use blob::JsonBlobStore;
pub use json_file::JsonFileStore;
pub use postgres::{PgAdminUserStore, PgCategoryStore, PgTutorialStore};

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::config::{Config, StorageBackend};
use crate::core::database;
use crate::core::error::{AppError, Result};
use crate::features::admin_users::models::AdminUser;
use crate::features::categories::models::Category;
use crate::features::tutorials::models::Tutorial;
use crate::shared::constants::{ADMIN_USERS_DOCUMENT, CATEGORIES_DOCUMENT, TUTORIALS_DOCUMENT};

/// Uniform read/write contract over one entity dataset.
///
/// `write_all` always receives the complete record set; no backend supports
/// partial updates, and none of them coordinate concurrent writers.
#[async_trait]
pub trait RecordStore<T>: Send + Sync {
    async fn read_all(&self) -> Result<Vec<T>>;
    async fn write_all(&self, records: &[T]) -> Result<()>;
}

/// Entity-facing names for the configured strategy objects.
pub type CategoryStore = Arc<dyn RecordStore<Category>>;
pub type TutorialStore = Arc<dyn RecordStore<Tutorial>>;
pub type AdminUserStore = Arc<dyn RecordStore<AdminUser>>;

/// Decorator that serves reads from `fallback` when `primary` fails.
///
/// Wired only outside production: a broken database connection degrades to
/// the local JSON documents instead of taking the reader site down. In
/// production the primary error propagates. Writes always go to the
/// primary.
pub struct ReadFallbackStore<T> {
    primary: Arc<dyn RecordStore<T>>,
    fallback: Arc<dyn RecordStore<T>>,
}

impl<T> ReadFallbackStore<T> {
    pub fn new(primary: Arc<dyn RecordStore<T>>, fallback: Arc<dyn RecordStore<T>>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> RecordStore<T> for ReadFallbackStore<T> {
    async fn read_all(&self) -> Result<Vec<T>> {
        match self.primary.read_all().await {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::warn!(error = %e, "Primary store read failed, serving local fallback");
                self.fallback.read_all().await
            }
        }
    }

    async fn write_all(&self, records: &[T]) -> Result<()> {
        self.primary.write_all(records).await
    }
}

/// The three configured entity stores.
pub struct Stores {
    pub categories: CategoryStore,
    pub tutorials: TutorialStore,
    pub admin_users: AdminUserStore,
}

impl Stores {
    /// Open the stores for the configured backend. This is the only place
    /// backend selection happens.
    pub async fn open(config: &Config) -> Result<Self> {
        let data_dir = &config.storage.data_dir;

        match config.storage.backend {
            StorageBackend::LocalFile => {
                tracing::info!(data_dir = %data_dir.display(), "Storage backend: local file");
                Ok(Self::local(data_dir))
            }
            StorageBackend::Blob => {
                let blob = config.storage.blob.as_ref().ok_or_else(|| {
                    AppError::Internal("Blob backend selected without blob configuration".into())
                })?;
                tracing::info!(bucket = %blob.bucket, "Storage backend: blob (legacy)");

                // Admin users predate the blob backend and stay on the
                // local file document.
                Ok(Self {
                    categories: Arc::new(JsonBlobStore::new(
                        blob,
                        CATEGORIES_DOCUMENT,
                        Category::default_dataset(),
                        Some(data_dir.join(CATEGORIES_DOCUMENT)),
                    )?),
                    tutorials: Arc::new(JsonBlobStore::new(
                        blob,
                        TUTORIALS_DOCUMENT,
                        Tutorial::default_dataset(),
                        Some(data_dir.join(TUTORIALS_DOCUMENT)),
                    )?),
                    admin_users: Arc::new(JsonFileStore::new(
                        data_dir.join(ADMIN_USERS_DOCUMENT),
                        AdminUser::default_dataset(),
                    )),
                })
            }
            StorageBackend::Postgres => {
                let db = config.storage.database.as_ref().ok_or_else(|| {
                    AppError::Internal(
                        "Postgres backend selected without database configuration".into(),
                    )
                })?;
                let pool = database::create_pool(db).await?;
                tracing::info!("Storage backend: postgres");

                let categories: CategoryStore = Arc::new(PgCategoryStore::new(pool.clone()));
                let tutorials: TutorialStore = Arc::new(PgTutorialStore::new(pool.clone()));
                let admin_users: AdminUserStore = Arc::new(PgAdminUserStore::new(pool));

                if config.environment.is_production() {
                    Ok(Self {
                        categories,
                        tutorials,
                        admin_users,
                    })
                } else {
                    let local = Self::local(data_dir);
                    Ok(Self {
                        categories: Arc::new(ReadFallbackStore::new(categories, local.categories)),
                        tutorials: Arc::new(ReadFallbackStore::new(tutorials, local.tutorials)),
                        admin_users: Arc::new(ReadFallbackStore::new(
                            admin_users,
                            local.admin_users,
                        )),
                    })
                }
            }
        }
    }

    /// Local JSON document stores rooted at `data_dir`.
    pub fn local(data_dir: &Path) -> Self {
        Self {
            categories: Arc::new(JsonFileStore::new(
                data_dir.join(CATEGORIES_DOCUMENT),
                Category::default_dataset(),
            )),
            tutorials: Arc::new(JsonFileStore::new(
                data_dir.join(TUTORIALS_DOCUMENT),
                Tutorial::default_dataset(),
            )),
            admin_users: Arc::new(JsonFileStore::new(
                data_dir.join(ADMIN_USERS_DOCUMENT),
                AdminUser::default_dataset(),
            )),
        }
    }
}
