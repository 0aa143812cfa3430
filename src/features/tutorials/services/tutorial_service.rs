use std::sync::Arc;

use chrono::Utc;
use rand::seq::SliceRandom;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::tutorials::dtos::{CreateTutorialDto, UpdateTutorialDto, ViewCount};
use crate::features::tutorials::models::{MediaItem, MediaKind, Tutorial, TutorialStatus};
use crate::modules::storage::RecordStore;
use crate::shared::constants::DEFAULT_CATEGORY_ID;
use crate::shared::validation::{slugify, SLUG_REGEX};

/// Reject media entries missing the reference their kind requires.
fn validate_media(media: &[MediaItem]) -> Result<()> {
    for item in media {
        match item.kind {
            MediaKind::Video if item.video_id.as_deref().map_or(true, str::is_empty) => {
                return Err(AppError::Validation(format!(
                    "Media entry '{}' is a video without a videoId",
                    item.id
                )));
            }
            MediaKind::Image if item.url.as_deref().map_or(true, str::is_empty) => {
                return Err(AppError::Validation(format!(
                    "Media entry '{}' is an image without a url",
                    item.id
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Tutorial repository: CRUD, slug lookup, related selection and the
/// best-effort view counter. Every read passes through the legacy-media
/// migration.
pub struct TutorialService {
    store: Arc<dyn RecordStore<Tutorial>>,
}

impl TutorialService {
    pub fn new(store: Arc<dyn RecordStore<Tutorial>>) -> Self {
        Self { store }
    }

    /// Full record set with the legacy `videoId` migration applied.
    async fn read_migrated(&self) -> Result<Vec<Tutorial>> {
        let mut tutorials = self.store.read_all().await?;
        for tutorial in &mut tutorials {
            tutorial.migrate_media();
        }
        Ok(tutorials)
    }

    /// Flat list ordered by sort key.
    pub async fn list(&self) -> Result<Vec<Tutorial>> {
        let mut tutorials = self.read_migrated().await?;
        tutorials.sort_by_key(|t| t.order);
        Ok(tutorials)
    }

    /// Look up by slug first, then by id. `None` means not found; the
    /// caller decides how to surface that.
    pub async fn get_by_slug(&self, identifier: &str) -> Result<Option<Tutorial>> {
        let tutorials = self.read_migrated().await?;
        Ok(tutorials
            .iter()
            .find(|t| t.slug == identifier)
            .or_else(|| tutorials.iter().find(|t| t.id == identifier))
            .cloned())
    }

    pub async fn create(&self, dto: CreateTutorialDto) -> Result<Tutorial> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        validate_media(&dto.media)?;

        let mut tutorials = self.read_migrated().await?;

        let slug = match dto.slug.filter(|s| !s.is_empty()) {
            Some(slug) => {
                if !SLUG_REGEX.is_match(&slug) {
                    return Err(AppError::Validation(format!("Invalid slug '{}'", slug)));
                }
                slug
            }
            None => slugify(&dto.title),
        };
        if slug.is_empty() {
            return Err(AppError::Validation(format!(
                "Cannot derive a slug from title '{}'",
                dto.title
            )));
        }
        if tutorials.iter().any(|t| t.slug == slug) {
            return Err(AppError::Validation(format!(
                "Slug '{}' is already in use",
                slug
            )));
        }

        let status = dto.status.unwrap_or(TutorialStatus::Draft);
        let now = Utc::now();
        let tutorial = Tutorial {
            id: Uuid::new_v4().to_string(),
            title: dto.title,
            slug,
            category_id: dto
                .category_id
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY_ID.to_string()),
            content: dto.content,
            media: dto.media,
            legacy_video_id: None,
            order: dto.order.unwrap_or(tutorials.len() as i32 + 1),
            author: dto.author,
            views: 0,
            status,
            published_at: (status == TutorialStatus::Published).then_some(now),
            created_at: now,
            updated_at: None,
        };

        tutorials.push(tutorial.clone());
        self.store.write_all(&tutorials).await?;

        tracing::info!(tutorial_id = %tutorial.id, slug = %tutorial.slug, "Tutorial created");
        Ok(tutorial)
    }

    /// Partial patch; publishing for the first time stamps `published_at`.
    pub async fn update(&self, id: &str, dto: UpdateTutorialDto) -> Result<Tutorial> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if let Some(media) = &dto.media {
            validate_media(media)?;
        }

        let mut tutorials = self.read_migrated().await?;
        let index = tutorials
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Tutorial '{}' not found", id)))?;

        if let Some(slug) = &dto.slug {
            if !SLUG_REGEX.is_match(slug) {
                return Err(AppError::Validation(format!("Invalid slug '{}'", slug)));
            }
            if tutorials.iter().any(|t| &t.slug == slug && t.id != id) {
                return Err(AppError::Validation(format!(
                    "Slug '{}' is already in use",
                    slug
                )));
            }
        }

        let tutorial = &mut tutorials[index];
        if let Some(title) = dto.title {
            tutorial.title = title;
        }
        if let Some(slug) = dto.slug {
            tutorial.slug = slug;
        }
        if let Some(content) = dto.content {
            tutorial.content = content;
        }
        if let Some(category_id) = dto.category_id {
            tutorial.category_id = category_id;
        }
        if let Some(media) = dto.media {
            tutorial.media = media;
        }
        if let Some(order) = dto.order {
            tutorial.order = order;
        }
        if let Some(author) = dto.author {
            tutorial.author = Some(author);
        }
        if let Some(status) = dto.status {
            if status == TutorialStatus::Published && tutorial.published_at.is_none() {
                tutorial.published_at = Some(Utc::now());
            }
            tutorial.status = status;
        }
        tutorial.updated_at = Some(Utc::now());
        let updated = tutorial.clone();

        self.store.write_all(&tutorials).await?;
        Ok(updated)
    }

    /// Remove a tutorial; the relational backend cascades its media rows.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut tutorials = self.read_migrated().await?;
        let before = tutorials.len();
        tutorials.retain(|t| t.id != id);
        if tutorials.len() == before {
            return Err(AppError::NotFound(format!("Tutorial '{}' not found", id)));
        }

        self.store.write_all(&tutorials).await?;
        tracing::info!(tutorial_id = %id, "Tutorial deleted");
        Ok(())
    }

    /// Best-effort view counter: a failed write-back degrades to a warning
    /// carrying the incremented count instead of failing the page load.
    pub async fn increment_views(&self, identifier: &str) -> Result<ViewCount> {
        let mut tutorials = self.read_migrated().await?;
        let tutorial = tutorials
            .iter_mut()
            .find(|t| t.slug == identifier || t.id == identifier)
            .ok_or_else(|| AppError::NotFound(format!("Tutorial '{}' not found", identifier)))?;

        tutorial.views += 1;
        let views = tutorial.views;

        match self.store.write_all(&tutorials).await {
            Ok(()) => Ok(ViewCount {
                views,
                persisted: true,
            }),
            Err(e) => {
                tracing::warn!(
                    tutorial = %identifier,
                    error = %e,
                    "View counted but write-back failed"
                );
                Ok(ViewCount {
                    views,
                    persisted: false,
                })
            }
        }
    }

    /// Related tutorials: same category first (stored order), then the rest
    /// in randomized order, truncated to `limit`.
    pub async fn related(
        &self,
        exclude_id: &str,
        category_id: &str,
        limit: usize,
    ) -> Result<Vec<Tutorial>> {
        let tutorials = self.read_migrated().await?;

        let mut same_category = Vec::new();
        let mut others = Vec::new();
        for tutorial in tutorials {
            if tutorial.id == exclude_id {
                continue;
            }
            if tutorial.category_id == category_id {
                same_category.push(tutorial);
            } else {
                others.push(tutorial);
            }
        }
        others.shuffle(&mut rand::thread_rng());

        Ok(same_category.into_iter().chain(others).take(limit).collect())
    }
}
