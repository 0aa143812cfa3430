//! Relational backend.
//!
//! Flat records map to snake_case rows; the tutorial media list is
//! normalized into a `tutorial_media` child table keyed by tutorial id with
//! an explicit `position` ordering column and cascade delete.
//!
//! `write_all` runs upsert + prune statements without a wrapping
//! transaction, so a crash mid-write can leave stale rows behind. That
//! matches the crash semantics of the file and blob backends.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::admin_users::models::AdminUser;
use crate::features::categories::models::Category;
use crate::features::tutorials::models::{MediaItem, MediaKind, Tutorial, TutorialStatus};
use crate::modules::storage::RecordStore;

// =============================================================================
// CATEGORIES
// =============================================================================

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: String,
    parent_id: Option<String>,
    name: String,
    slug: String,
    icon: String,
    display_order: i32,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            slug: row.slug,
            icon: row.icon,
            order: row.display_order,
            parent_id: row.parent_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct PgCategoryStore {
    pool: PgPool,
}

impl PgCategoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore<Category> for PgCategoryStore {
    async fn read_all(&self) -> Result<Vec<Category>> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            r#"
            SELECT id, parent_id, name, slug, icon, display_order, created_at, updated_at
            FROM categories
            ORDER BY display_order, name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read categories: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn write_all(&self, records: &[Category]) -> Result<()> {
        for category in records {
            sqlx::query(
                r#"
                INSERT INTO categories (id, parent_id, name, slug, icon, display_order, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (id) DO UPDATE SET
                    parent_id = EXCLUDED.parent_id,
                    name = EXCLUDED.name,
                    slug = EXCLUDED.slug,
                    icon = EXCLUDED.icon,
                    display_order = EXCLUDED.display_order,
                    updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(&category.id)
            .bind(&category.parent_id)
            .bind(&category.name)
            .bind(&category.slug)
            .bind(&category.icon)
            .bind(category.order)
            .bind(category.created_at)
            .bind(category.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to upsert category {}: {:?}", category.id, e);
                AppError::Database(e)
            })?;
        }

        let ids: Vec<String> = records.iter().map(|c| c.id.clone()).collect();
        sqlx::query("DELETE FROM categories WHERE id <> ALL($1)")
            .bind(&ids)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to prune categories: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }
}

// =============================================================================
// TUTORIALS
// =============================================================================

#[derive(sqlx::FromRow)]
struct TutorialRow {
    id: String,
    title: String,
    slug: String,
    category_id: String,
    content: String,
    display_order: i32,
    author: Option<String>,
    views: i64,
    status: String,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TutorialRow {
    fn into_record(self, media: Vec<MediaItem>) -> Result<Tutorial> {
        let status = TutorialStatus::parse(&self.status).ok_or_else(|| {
            AppError::Internal(format!("Unknown tutorial status '{}'", self.status))
        })?;

        Ok(Tutorial {
            id: self.id,
            title: self.title,
            slug: self.slug,
            category_id: self.category_id,
            content: self.content,
            media,
            legacy_video_id: None,
            order: self.display_order,
            author: self.author,
            views: self.views,
            status,
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MediaRow {
    id: String,
    tutorial_id: String,
    kind: String,
    video_id: Option<String>,
    url: Option<String>,
    title: Option<String>,
    caption: Option<String>,
}

impl MediaRow {
    fn into_item(self) -> Result<MediaItem> {
        let kind = MediaKind::parse(&self.kind)
            .ok_or_else(|| AppError::Internal(format!("Unknown media kind '{}'", self.kind)))?;

        Ok(MediaItem {
            id: self.id,
            kind,
            video_id: self.video_id,
            url: self.url,
            title: self.title,
            caption: self.caption,
        })
    }
}

pub struct PgTutorialStore {
    pool: PgPool,
}

impl PgTutorialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore<Tutorial> for PgTutorialStore {
    async fn read_all(&self) -> Result<Vec<Tutorial>> {
        let rows: Vec<TutorialRow> = sqlx::query_as(
            r#"
            SELECT id, title, slug, category_id, content, display_order,
                   author, views, status, published_at, created_at, updated_at
            FROM tutorials
            ORDER BY display_order, created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read tutorials: {:?}", e);
            AppError::Database(e)
        })?;

        let media_rows: Vec<MediaRow> = sqlx::query_as(
            r#"
            SELECT id, tutorial_id, kind, video_id, url, title, caption
            FROM tutorial_media
            ORDER BY tutorial_id, position
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read tutorial media: {:?}", e);
            AppError::Database(e)
        })?;

        let mut media_of: HashMap<String, Vec<MediaItem>> = HashMap::new();
        for row in media_rows {
            let tutorial_id = row.tutorial_id.clone();
            media_of
                .entry(tutorial_id)
                .or_default()
                .push(row.into_item()?);
        }

        rows.into_iter()
            .map(|row| {
                let media = media_of.remove(&row.id).unwrap_or_default();
                row.into_record(media)
            })
            .collect()
    }

    async fn write_all(&self, records: &[Tutorial]) -> Result<()> {
        for tutorial in records {
            sqlx::query(
                r#"
                INSERT INTO tutorials (id, title, slug, category_id, content, display_order,
                                       author, views, status, published_at, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                ON CONFLICT (id) DO UPDATE SET
                    title = EXCLUDED.title,
                    slug = EXCLUDED.slug,
                    category_id = EXCLUDED.category_id,
                    content = EXCLUDED.content,
                    display_order = EXCLUDED.display_order,
                    author = EXCLUDED.author,
                    views = EXCLUDED.views,
                    status = EXCLUDED.status,
                    published_at = EXCLUDED.published_at,
                    updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(&tutorial.id)
            .bind(&tutorial.title)
            .bind(&tutorial.slug)
            .bind(&tutorial.category_id)
            .bind(&tutorial.content)
            .bind(tutorial.order)
            .bind(&tutorial.author)
            .bind(tutorial.views)
            .bind(tutorial.status.as_str())
            .bind(tutorial.published_at)
            .bind(tutorial.created_at)
            .bind(tutorial.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to upsert tutorial {}: {:?}", tutorial.id, e);
                AppError::Database(e)
            })?;

            // Media rows are replaced whole; their order is the list order.
            sqlx::query("DELETE FROM tutorial_media WHERE tutorial_id = $1")
                .bind(&tutorial.id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to clear media for {}: {:?}", tutorial.id, e);
                    AppError::Database(e)
                })?;

            for (position, item) in tutorial.media.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO tutorial_media (id, tutorial_id, position, kind, video_id, url, title, caption)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    "#,
                )
                .bind(&item.id)
                .bind(&tutorial.id)
                .bind(position as i32)
                .bind(item.kind.as_str())
                .bind(&item.video_id)
                .bind(&item.url)
                .bind(&item.title)
                .bind(&item.caption)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to insert media for {}: {:?}", tutorial.id, e);
                    AppError::Database(e)
                })?;
            }
        }

        // Removed tutorials cascade-delete their media rows.
        let ids: Vec<String> = records.iter().map(|t| t.id.clone()).collect();
        sqlx::query("DELETE FROM tutorials WHERE id <> ALL($1)")
            .bind(&ids)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to prune tutorials: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }
}

// =============================================================================
// ADMIN USERS
// =============================================================================

#[derive(sqlx::FromRow)]
struct AdminUserRow {
    id: String,
    username: String,
    password: String,
    name: String,
}

impl From<AdminUserRow> for AdminUser {
    fn from(row: AdminUserRow) -> Self {
        AdminUser {
            id: row.id,
            username: row.username,
            password: row.password,
            name: row.name,
        }
    }
}

pub struct PgAdminUserStore {
    pool: PgPool,
}

impl PgAdminUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore<AdminUser> for PgAdminUserStore {
    async fn read_all(&self) -> Result<Vec<AdminUser>> {
        let rows: Vec<AdminUserRow> = sqlx::query_as(
            "SELECT id, username, password, name FROM admin_users ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read admin users: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows.into_iter().map(AdminUser::from).collect())
    }

    async fn write_all(&self, records: &[AdminUser]) -> Result<()> {
        for user in records {
            sqlx::query(
                r#"
                INSERT INTO admin_users (id, username, password, name)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO UPDATE SET
                    username = EXCLUDED.username,
                    password = EXCLUDED.password,
                    name = EXCLUDED.name
                "#,
            )
            .bind(&user.id)
            .bind(&user.username)
            .bind(&user.password)
            .bind(&user.name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to upsert admin user {}: {:?}", user.id, e);
                AppError::Database(e)
            })?;
        }

        let ids: Vec<String> = records.iter().map(|u| u.id.clone()).collect();
        sqlx::query("DELETE FROM admin_users WHERE id <> ALL($1)")
            .bind(&ids)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to prune admin users: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }
}
