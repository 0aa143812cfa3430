//! Content core for the Sinau tutorial/wiki site.
//!
//! Implements the data layer behind the reader site and the admin
//! back-office: a hierarchical category tree, the tutorial repository with
//! its legacy-media migration, admin account management and an ad-hoc
//! search helper. The HTTP layer lives elsewhere and consumes the services
//! exposed here.
//!
//! Persistence goes through the storage adapter in [`modules::storage`]:
//! local JSON documents for development, normalized Postgres tables when a
//! database is configured, and a legacy S3-compatible blob mode. Backends
//! are selected once at startup from an explicit [`core::config::Config`].
//!
//! ```no_run
//! use sinau_core::core::config::Config;
//! use sinau_core::features::categories::CategoryService;
//! use sinau_core::features::tutorials::TutorialService;
//! use sinau_core::modules::storage::Stores;
//!
//! # async fn wire() -> sinau_core::core::error::Result<()> {
//! let config = Config::from_env().map_err(sinau_core::core::error::AppError::Internal)?;
//! let stores = Stores::open(&config).await?;
//!
//! let categories = CategoryService::new(stores.categories);
//! let tutorials = TutorialService::new(stores.tutorials);
//!
//! let tree = categories.tree().await?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod features;
pub mod modules;
pub mod shared;

pub use crate::core::config::Config;
pub use crate::core::error::{AppError, Result};
pub use crate::modules::storage::Stores;
