use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::constants::{DEFAULT_CATEGORY_ID, DEFAULT_ICON, SUPPORTED_ICONS};

/// Flat category record, shared by every storage backend.
///
/// JSON field names stay camelCase to match the legacy on-disk documents;
/// the relational backend maps them to snake_case columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub order: i32,
    /// `None` = root category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

impl Category {
    /// Resolve the stored icon name against the supported set.
    ///
    /// Unknown names degrade to [`DEFAULT_ICON`] rather than erroring so the
    /// reader site stays up on partially-inconsistent admin data.
    pub fn resolved_icon(&self) -> &str {
        if SUPPORTED_ICONS.contains(&self.icon.as_str()) {
            &self.icon
        } else {
            tracing::warn!(
                category_id = %self.id,
                icon = %self.icon,
                "Unknown category icon, falling back to default"
            );
            DEFAULT_ICON
        }
    }

    /// Bundled default dataset used to seed empty backends.
    pub fn default_dataset() -> Vec<Category> {
        vec![Category {
            id: DEFAULT_CATEGORY_ID.to_string(),
            name: "Tutorial Umum".to_string(),
            slug: "tutorial-umum".to_string(),
            icon: "BookOpen".to_string(),
            order: 1,
            parent_id: None,
            created_at: seed_timestamp(),
            updated_at: None,
        }]
    }
}

/// Creation date stamped on the bundled seed records.
pub(crate) fn seed_timestamp() -> DateTime<Utc> {
    // Single-valued for UTC, .unwrap() cannot fail
    Utc.with_ymd_and_hms(2024, 12, 29, 0, 0, 0).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_icon_passes_known_names() {
        let mut category = Category::default_dataset().remove(0);
        category.icon = "Database".to_string();
        assert_eq!(category.resolved_icon(), "Database");
    }

    #[test]
    fn test_resolved_icon_falls_back_on_unknown() {
        let mut category = Category::default_dataset().remove(0);
        category.icon = "NotAnIcon".to_string();
        assert_eq!(category.resolved_icon(), DEFAULT_ICON);
    }

    #[test]
    fn test_camel_case_round_trip() {
        let json = r#"{
            "id": "category-1",
            "name": "Persediaan",
            "slug": "persediaan",
            "icon": "Package",
            "order": 2,
            "parentId": "category-default",
            "createdAt": "2024-12-29T00:00:00Z"
        }"#;
        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.parent_id.as_deref(), Some("category-default"));

        let out = serde_json::to_value(&category).unwrap();
        assert_eq!(out["parentId"], "category-default");
        assert!(out.get("updatedAt").is_none());
    }
}
