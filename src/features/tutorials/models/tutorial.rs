use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::categories::models::seed_timestamp;
use crate::features::tutorials::models::MediaItem;
use crate::shared::constants::DEFAULT_CATEGORY_ID;

/// Publication state of a tutorial.
///
/// Records persisted before the field existed deserialize as `Published`:
/// everything on the legacy site was live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TutorialStatus {
    Draft,
    #[default]
    Published,
}

impl TutorialStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TutorialStatus::Draft => "draft",
            TutorialStatus::Published => "published",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(TutorialStatus::Draft),
            "published" => Some(TutorialStatus::Published),
            _ => None,
        }
    }
}

/// Flat tutorial record, shared by every storage backend.
///
/// Content is a markdown/HTML hybrid that may carry `[VIDEO:id]`,
/// `[IMAGE:url|caption]` and `[BUTTON:label|url]` embed tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tutorial {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default = "default_category_id")]
    pub category_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub media: Vec<MediaItem>,
    /// Legacy single-video field, folded into `media` on read.
    #[serde(default, rename = "videoId", skip_serializing_if = "Option::is_none")]
    pub legacy_video_id: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub status: TutorialStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_category_id() -> String {
    DEFAULT_CATEGORY_ID.to_string()
}

impl Tutorial {
    /// Fold the legacy `videoId` field into the media list.
    ///
    /// Idempotent: once the legacy field is taken the record never changes
    /// again, and records that already carry media only lose the stale
    /// legacy field.
    pub fn migrate_media(&mut self) {
        if let Some(video_id) = self.legacy_video_id.take() {
            if self.media.is_empty() && !video_id.is_empty() {
                self.media
                    .push(MediaItem::video(format!("media-{}-legacy", self.id), video_id));
            }
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == TutorialStatus::Published
    }

    /// Bundled default dataset used to seed empty backends. Deliberately a
    /// legacy-shaped record so the migration path stays exercised.
    pub fn default_dataset() -> Vec<Tutorial> {
        vec![Tutorial {
            id: "tutorial-1".to_string(),
            title: "Tutorial Pengeluaran Menggunakan Sigepeng".to_string(),
            slug: "tutor-pengeluaran".to_string(),
            category_id: DEFAULT_CATEGORY_ID.to_string(),
            content: "Tutorial Cara Mengeluarkan Barang Persediaan Menggunakan Metode [Sigepeng]"
                .to_string(),
            media: Vec::new(),
            legacy_video_id: Some("6YaAVDhljL4".to_string()),
            order: 1,
            author: None,
            views: 0,
            status: TutorialStatus::Published,
            published_at: None,
            created_at: seed_timestamp(),
            updated_at: None,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::tutorials::models::MediaKind;

    #[test]
    fn test_migration_synthesizes_single_video_entry() {
        let mut tutorial = Tutorial::default_dataset().remove(0);
        tutorial.migrate_media();

        assert_eq!(tutorial.legacy_video_id, None);
        assert_eq!(tutorial.media.len(), 1);
        assert_eq!(tutorial.media[0].kind, MediaKind::Video);
        assert_eq!(tutorial.media[0].video_id.as_deref(), Some("6YaAVDhljL4"));
    }

    #[test]
    fn test_migration_is_idempotent() {
        let mut once = Tutorial::default_dataset().remove(0);
        once.migrate_media();

        let mut twice = once.clone();
        twice.migrate_media();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_migration_keeps_existing_media_and_drops_legacy_field() {
        let mut tutorial = Tutorial::default_dataset().remove(0);
        tutorial.media = vec![MediaItem::video("media-x", "newer-video")];
        tutorial.migrate_media();

        assert_eq!(tutorial.media.len(), 1);
        assert_eq!(tutorial.media[0].video_id.as_deref(), Some("newer-video"));
        assert_eq!(tutorial.legacy_video_id, None);
    }

    #[test]
    fn test_legacy_json_deserializes_and_reserializes_without_video_id() {
        let json = r#"{
            "id": "tutorial-1",
            "title": "Tutorial Pengeluaran",
            "slug": "tutor-pengeluaran",
            "content": "isi",
            "videoId": "6YaAVDhljL4",
            "order": 1,
            "createdAt": "2024-12-29T00:00:00Z"
        }"#;
        let mut tutorial: Tutorial = serde_json::from_str(json).unwrap();
        assert_eq!(tutorial.category_id, DEFAULT_CATEGORY_ID);
        assert_eq!(tutorial.status, TutorialStatus::Published);

        tutorial.migrate_media();
        let out = serde_json::to_value(&tutorial).unwrap();
        assert!(out.get("videoId").is_none());
        assert_eq!(out["media"][0]["type"], "video");
    }
}
