use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{CategoryNode, CreateCategoryDto, UpdateCategoryDto};
use crate::features::categories::models::Category;
use crate::modules::storage::RecordStore;
use crate::shared::constants::DEFAULT_ICON;
use crate::shared::validation::{slugify, SLUG_REGEX};

/// Ids of every category transitively below `category_id`.
///
/// Never contains the starting id; used for cycle prevention when a parent
/// assignment changes.
pub fn descendants_of(categories: &[Category], category_id: &str) -> Vec<String> {
    let mut descendants = Vec::new();
    collect_descendants(categories, category_id, &mut descendants);
    descendants
}

fn collect_descendants(categories: &[Category], parent_id: &str, acc: &mut Vec<String>) {
    for category in categories {
        if category.parent_id.as_deref() == Some(parent_id) && !acc.contains(&category.id) {
            acc.push(category.id.clone());
            collect_descendants(categories, &category.id, acc);
        }
    }
}

/// Root-to-leaf ancestor chain ending at `category_id`, for breadcrumbs.
///
/// The walk stops at a root, at a dangling parent reference (treated as a
/// root) or when the parent chain loops in corrupted data.
pub fn path_of(categories: &[Category], category_id: &str) -> Vec<Category> {
    let mut path = Vec::new();
    let mut visited = HashSet::new();
    let mut current = categories.iter().find(|c| c.id == category_id);

    while let Some(category) = current {
        if !visited.insert(category.id.clone()) {
            tracing::warn!(
                category_id = %category.id,
                "Cycle in category parent chain, truncating breadcrumb"
            );
            break;
        }
        path.insert(0, category.clone());
        current = category
            .parent_id
            .as_deref()
            .and_then(|parent_id| categories.iter().find(|c| c.id == parent_id));
    }

    path
}

/// Category tree engine: flat CRUD plus the recursive tree, breadcrumb and
/// descendant operations the reader navigation and the admin back-office
/// are built on.
pub struct CategoryService {
    store: Arc<dyn RecordStore<Category>>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn RecordStore<Category>>) -> Self {
        Self { store }
    }

    /// Flat list ordered by sibling sort key.
    pub async fn list(&self) -> Result<Vec<Category>> {
        let mut categories = self.store.read_all().await?;
        categories.sort_by_key(|c| c.order);
        Ok(categories)
    }

    /// Look up a single category by id or slug.
    pub async fn get(&self, identifier: &str) -> Result<Category> {
        let categories = self.store.read_all().await?;
        categories
            .into_iter()
            .find(|c| c.id == identifier || c.slug == identifier)
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", identifier)))
    }

    /// The navigation forest: every node carries its children ordered by
    /// sort key, roots are parentless (or orphaned) categories.
    pub async fn tree(&self) -> Result<Vec<CategoryNode>> {
        let categories = self.store.read_all().await?;
        Ok(CategoryNode::build_forest(categories))
    }

    /// Breadcrumb path (root first) for the given category.
    pub async fn path(&self, category_id: &str) -> Result<Vec<Category>> {
        let categories = self.store.read_all().await?;
        if !categories.iter().any(|c| c.id == category_id) {
            return Err(AppError::NotFound(format!(
                "Category '{}' not found",
                category_id
            )));
        }
        Ok(path_of(&categories, category_id))
    }

    /// Every category transitively below the given one.
    pub async fn descendant_ids(&self, category_id: &str) -> Result<Vec<String>> {
        let categories = self.store.read_all().await?;
        Ok(descendants_of(&categories, category_id))
    }

    pub async fn create(&self, dto: CreateCategoryDto) -> Result<Category> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let mut categories = self.store.read_all().await?;

        let slug = match dto.slug.filter(|s| !s.is_empty()) {
            Some(slug) => {
                if !SLUG_REGEX.is_match(&slug) {
                    return Err(AppError::Validation(format!("Invalid slug '{}'", slug)));
                }
                slug
            }
            None => slugify(&dto.name),
        };
        if slug.is_empty() {
            return Err(AppError::Validation(format!(
                "Cannot derive a slug from name '{}'",
                dto.name
            )));
        }
        if categories.iter().any(|c| c.slug == slug) {
            return Err(AppError::Validation(format!(
                "Slug '{}' is already in use",
                slug
            )));
        }

        if let Some(parent_id) = &dto.parent_id {
            if !categories.iter().any(|c| &c.id == parent_id) {
                return Err(AppError::Validation(format!(
                    "Parent category '{}' does not exist",
                    parent_id
                )));
            }
        }

        let category = Category {
            id: format!("category-{}", Utc::now().timestamp_millis()),
            name: dto.name,
            slug,
            icon: dto
                .icon
                .filter(|i| !i.is_empty())
                .unwrap_or_else(|| DEFAULT_ICON.to_string()),
            order: dto.order.unwrap_or(categories.len() as i32 + 1),
            parent_id: dto.parent_id,
            created_at: Utc::now(),
            updated_at: None,
        };

        categories.push(category.clone());
        self.store.write_all(&categories).await?;

        tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
        Ok(category)
    }

    /// Partial patch. A new parent assignment is rejected before persisting
    /// when it would make the category its own ancestor.
    pub async fn update(&self, id: &str, dto: UpdateCategoryDto) -> Result<Category> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let mut categories = self.store.read_all().await?;
        let index = categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", id)))?;

        if let Some(Some(new_parent)) = &dto.parent_id {
            if new_parent == id {
                return Err(AppError::Validation(
                    "A category cannot be its own parent".to_string(),
                ));
            }
            if descendants_of(&categories, id).contains(new_parent) {
                return Err(AppError::Validation(
                    "A category cannot be moved under one of its own descendants".to_string(),
                ));
            }
            if !categories.iter().any(|c| &c.id == new_parent) {
                return Err(AppError::Validation(format!(
                    "Parent category '{}' does not exist",
                    new_parent
                )));
            }
        }

        if let Some(slug) = &dto.slug {
            if !SLUG_REGEX.is_match(slug) {
                return Err(AppError::Validation(format!("Invalid slug '{}'", slug)));
            }
            if categories.iter().any(|c| &c.slug == slug && c.id != id) {
                return Err(AppError::Validation(format!(
                    "Slug '{}' is already in use",
                    slug
                )));
            }
        }

        let category = &mut categories[index];
        if let Some(name) = dto.name {
            category.name = name;
        }
        if let Some(slug) = dto.slug {
            category.slug = slug;
        }
        if let Some(icon) = dto.icon {
            category.icon = icon;
        }
        if let Some(order) = dto.order {
            category.order = order;
        }
        if let Some(parent_patch) = dto.parent_id {
            category.parent_id = parent_patch;
        }
        category.updated_at = Some(Utc::now());
        let updated = category.clone();

        self.store.write_all(&categories).await?;
        Ok(updated)
    }

    /// Remove a category. Categories with direct children are protected,
    /// independent of the deeper descendant set.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut categories = self.store.read_all().await?;

        if !categories.iter().any(|c| c.id == id) {
            return Err(AppError::NotFound(format!("Category '{}' not found", id)));
        }
        if categories.iter().any(|c| c.parent_id.as_deref() == Some(id)) {
            return Err(AppError::Conflict(
                "Cannot delete a category that still has child categories".to_string(),
            ));
        }

        categories.retain(|c| c.id != id);
        self.store.write_all(&categories).await?;

        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::JsonFileStore;
    use tempfile::TempDir;

    fn category(id: &str, order: i32, parent_id: Option<&str>) -> Category {
        Category {
            id: id.to_string(),
            name: format!("Kategori {}", id),
            slug: id.to_string(),
            icon: "Folder".to_string(),
            order,
            parent_id: parent_id.map(str::to_string),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn service_with(dir: &TempDir, categories: Vec<Category>) -> CategoryService {
        CategoryService::new(Arc::new(JsonFileStore::new(
            dir.path().join("categories.json"),
            categories,
        )))
    }

    #[test]
    fn test_forest_groups_children_and_sorts_siblings() {
        let categories = vec![
            category("root-b", 2, None),
            category("root-a", 1, None),
            category("child-2", 2, Some("root-a")),
            category("child-1", 1, Some("root-a")),
            category("grandchild", 1, Some("child-1")),
        ];

        let forest = CategoryNode::build_forest(categories);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].category.id, "root-a");
        assert_eq!(forest[1].category.id, "root-b");

        let children: Vec<&str> = forest[0]
            .children
            .iter()
            .map(|n| n.category.id.as_str())
            .collect();
        assert_eq!(children, vec!["child-1", "child-2"]);
        assert_eq!(forest[0].children[0].children[0].category.id, "grandchild");
    }

    #[test]
    fn test_forest_treats_orphan_as_root() {
        let categories = vec![
            category("root", 1, None),
            category("orphan", 2, Some("vanished")),
        ];

        let forest = CategoryNode::build_forest(categories);
        let roots: Vec<&str> = forest.iter().map(|n| n.category.id.as_str()).collect();
        assert_eq!(roots, vec!["root", "orphan"]);
    }

    #[test]
    fn test_descendants_never_contains_self() {
        let categories = vec![
            category("a", 1, None),
            category("b", 1, Some("a")),
            category("c", 1, Some("b")),
            category("d", 1, Some("a")),
        ];

        let descendants = descendants_of(&categories, "a");
        assert!(!descendants.contains(&"a".to_string()));
        assert_eq!(descendants.len(), 3);
        assert!(descendants.contains(&"b".to_string()));
        assert!(descendants.contains(&"c".to_string()));
        assert!(descendants.contains(&"d".to_string()));
    }

    #[test]
    fn test_path_walks_root_to_leaf() {
        let categories = vec![
            category("root", 1, None),
            category("mid", 1, Some("root")),
            category("leaf", 1, Some("mid")),
        ];

        let path: Vec<String> = path_of(&categories, "leaf")
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(path, vec!["root", "mid", "leaf"]);
    }

    #[test]
    fn test_path_dangling_parent_acts_as_root() {
        let categories = vec![
            category("leaf", 1, Some("vanished")),
        ];

        let path: Vec<String> = path_of(&categories, "leaf")
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(path, vec!["leaf"]);
    }

    #[tokio::test]
    async fn test_create_derives_slug_and_rejects_duplicates() {
        let dir = TempDir::new().unwrap();
        let service = service_with(&dir, vec![]);

        let created = service
            .create(CreateCategoryDto {
                name: "Tutorial Baru #1!".to_string(),
                slug: None,
                icon: None,
                order: None,
                parent_id: None,
            })
            .await
            .unwrap();
        assert_eq!(created.slug, "tutorial-baru-1");

        let duplicate = service
            .create(CreateCategoryDto {
                name: "Tutorial Baru #1!".to_string(),
                slug: None,
                icon: None,
                order: None,
                parent_id: None,
            })
            .await;
        assert!(matches!(duplicate, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_missing_parent() {
        let dir = TempDir::new().unwrap();
        let service = service_with(&dir, vec![]);

        let result = service
            .create(CreateCategoryDto {
                name: "Anak".to_string(),
                slug: None,
                icon: None,
                order: None,
                parent_id: Some("vanished".to_string()),
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_self_and_descendant_parents() {
        let dir = TempDir::new().unwrap();
        let service = service_with(
            &dir,
            vec![
                category("a", 1, None),
                category("b", 1, Some("a")),
                category("c", 1, Some("b")),
            ],
        );

        let own = service
            .update(
                "a",
                UpdateCategoryDto {
                    parent_id: Some(Some("a".to_string())),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(own, Err(AppError::Validation(_))));

        let descendant = service
            .update(
                "a",
                UpdateCategoryDto {
                    parent_id: Some(Some("c".to_string())),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(descendant, Err(AppError::Validation(_))));

        // a legal reparent still works
        let moved = service
            .update(
                "c",
                UpdateCategoryDto {
                    parent_id: Some(Some("a".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.parent_id.as_deref(), Some("a"));
        assert!(moved.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_explicit_null_moves_to_root() {
        let dir = TempDir::new().unwrap();
        let service = service_with(
            &dir,
            vec![category("a", 1, None), category("b", 1, Some("a"))],
        );

        let moved = service
            .update(
                "b",
                UpdateCategoryDto {
                    parent_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.parent_id, None);
    }

    #[tokio::test]
    async fn test_delete_guards_children_then_removes_exactly_one() {
        let dir = TempDir::new().unwrap();
        let service = service_with(
            &dir,
            vec![category("a", 1, None), category("b", 2, Some("a"))],
        );

        let blocked = service.delete("a").await;
        assert!(matches!(blocked, Err(AppError::Conflict(_))));

        service.delete("b").await.unwrap();
        let remaining = service.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "a");

        let missing = service.delete("b").await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
