use std::env;
use std::path::PathBuf;

/// Deployment environment, used only for failure-handling policy
/// (Postgres read errors fall back to the local file store outside production).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Persistence strategy, chosen once at startup.
///
/// `Postgres` is the authoritative backend when its configuration is present,
/// `LocalFile` is the development fallback, and `Blob` is retained for the
/// legacy deployments that stored the dataset as JSON objects in an
/// S3-compatible bucket. Blob is never inferred; it must be requested
/// explicitly via `STORAGE_BACKEND=blob`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    LocalFile,
    Blob,
    Postgres,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory holding the per-entity JSON documents in local file mode.
    /// Also used as the seed source and read-fallback for the other backends.
    pub data_dir: PathBuf,
    pub database: Option<DatabaseConfig>,
    pub blob: Option<BlobConfig>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// S3-compatible object store configuration for the legacy blob backend.
#[derive(Debug, Clone)]
pub struct BlobConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };

        Ok(Config {
            environment,
            storage: StorageConfig::from_env()?,
        })
    }

    /// Local-file configuration rooted at the given directory.
    /// Intended for tests and embedded development setups.
    pub fn local(data_dir: impl Into<PathBuf>) -> Self {
        Config {
            environment: Environment::Development,
            storage: StorageConfig {
                backend: StorageBackend::LocalFile,
                data_dir: data_dir.into(),
                database: None,
                blob: None,
            },
        }
    }
}

impl StorageConfig {
    const DEFAULT_DATA_DIR: &'static str = "./data";

    pub fn from_env() -> Result<Self, String> {
        let data_dir =
            PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| Self::DEFAULT_DATA_DIR.into()));

        let database = DatabaseConfig::from_env()?;
        let blob = BlobConfig::from_env();

        // Explicit STORAGE_BACKEND wins; otherwise the relational backend is
        // preferred whenever its connection configuration is present.
        let backend = match env::var("STORAGE_BACKEND").ok().as_deref() {
            Some("file") => StorageBackend::LocalFile,
            Some("blob") => StorageBackend::Blob,
            Some("postgres") => StorageBackend::Postgres,
            Some(other) => {
                return Err(format!(
                    "Invalid STORAGE_BACKEND '{}', expected file, blob or postgres",
                    other
                ))
            }
            None if database.is_some() => StorageBackend::Postgres,
            None => StorageBackend::LocalFile,
        };

        match backend {
            StorageBackend::Postgres if database.is_none() => {
                return Err("STORAGE_BACKEND=postgres requires DATABASE_URL".into());
            }
            StorageBackend::Blob if blob.is_none() => {
                return Err("STORAGE_BACKEND=blob requires BLOB_BUCKET".into());
            }
            _ => {}
        }

        Ok(Self {
            backend,
            data_dir,
            database,
            blob,
        })
    }
}

impl DatabaseConfig {
    // Conservative pool defaults for a small content site
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    /// Returns `None` when `DATABASE_URL` is not set; the relational backend
    /// is considered unconfigured in that case.
    pub fn from_env() -> Result<Option<Self>, String> {
        let url = match env::var("DATABASE_URL") {
            Ok(url) if !url.is_empty() => url,
            _ => return Ok(None),
        };

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Some(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        }))
    }
}

impl BlobConfig {
    /// Returns `None` when `BLOB_BUCKET` is not set; the blob backend is
    /// considered unconfigured in that case. Endpoint and credentials default
    /// to a local MinIO instance for development.
    pub fn from_env() -> Option<Self> {
        let bucket = env::var("BLOB_BUCKET").ok().filter(|s| !s.is_empty())?;

        let endpoint =
            env::var("BLOB_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());
        let access_key = env::var("BLOB_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string());
        let secret_key = env::var("BLOB_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string());
        let region = env::var("BLOB_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        Some(Self {
            endpoint,
            access_key,
            secret_key,
            bucket,
            region,
        })
    }
}
