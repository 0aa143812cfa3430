//! Tutorial content feature.
//!
//! Tutorials reference a category and carry an ordered media list. Records
//! written before the media list existed are migrated on read from the
//! legacy single `videoId` field.

pub mod dtos;
pub mod models;
pub mod services;

pub use services::TutorialService;
