use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::features::tutorials::models::{MediaItem, TutorialStatus};

/// Request DTO for creating a tutorial
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTutorialDto {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Auto-derived from `title` when absent.
    #[serde(default)]
    pub slug: Option<String>,

    #[serde(default)]
    pub content: String,

    /// Defaults to the sentinel default category.
    #[serde(default)]
    pub category_id: Option<String>,

    #[serde(default)]
    pub media: Vec<MediaItem>,

    #[serde(default)]
    pub order: Option<i32>,

    #[serde(default)]
    pub author: Option<String>,

    /// Defaults to draft; publishing stamps `published_at`.
    #[serde(default)]
    pub status: Option<TutorialStatus>,
}

/// Request DTO for partially updating a tutorial
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTutorialDto {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    pub slug: Option<String>,

    pub content: Option<String>,

    pub category_id: Option<String>,

    pub media: Option<Vec<MediaItem>>,

    pub order: Option<i32>,

    pub author: Option<String>,

    pub status: Option<TutorialStatus>,
}

/// Result of a view-count increment.
///
/// `persisted` is false when the write-back failed; the count is still the
/// best-known value so the reader page can show it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCount {
    pub views: i64,
    pub persisted: bool,
}
