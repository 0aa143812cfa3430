use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::features::categories::models::Category;

/// Request DTO for creating a category
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Auto-derived from `name` when absent.
    #[serde(default)]
    pub slug: Option<String>,

    #[serde(default)]
    pub icon: Option<String>,

    /// Sort key among siblings; defaults to the end of the list.
    #[serde(default)]
    pub order: Option<i32>,

    /// Parent category id; absent or null = root.
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Request DTO for partially updating a category.
///
/// `parent_id` distinguishes "field omitted" (no change) from an explicit
/// null (move to root), hence the nested `Option`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    pub slug: Option<String>,

    pub icon: Option<String>,

    pub order: Option<i32>,

    #[serde(default, deserialize_with = "deserialize_explicit_null")]
    pub parent_id: Option<Option<String>>,
}

fn deserialize_explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// A category augmented with its ordered children, forming one node of the
/// navigation forest.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// Build the forest from a flat category list.
    ///
    /// Grouping runs over an adjacency map keyed by parent id, rebuilt on
    /// every call. Roots are categories without a parent; a category whose
    /// parent id does not resolve is treated as a root as well (fails open,
    /// logged) so one bad reference cannot hide a whole subtree.
    pub fn build_forest(categories: Vec<Category>) -> Vec<CategoryNode> {
        let known_ids: HashSet<String> = categories.iter().map(|c| c.id.clone()).collect();

        let mut children_of: HashMap<Option<String>, Vec<Category>> = HashMap::new();
        for category in categories {
            let parent = match &category.parent_id {
                Some(parent_id) if known_ids.contains(parent_id) => Some(parent_id.clone()),
                Some(parent_id) => {
                    tracing::warn!(
                        category_id = %category.id,
                        parent_id = %parent_id,
                        "Category references a missing parent, treating as root"
                    );
                    None
                }
                None => None,
            };
            children_of.entry(parent).or_default().push(category);
        }

        Self::attach(&None, &mut children_of)
    }

    fn attach(
        parent: &Option<String>,
        children_of: &mut HashMap<Option<String>, Vec<Category>>,
    ) -> Vec<CategoryNode> {
        let mut siblings = children_of.remove(parent).unwrap_or_default();
        siblings.sort_by_key(|c| c.order);

        siblings
            .into_iter()
            .map(|category| {
                let children = Self::attach(&Some(category.id.clone()), children_of);
                CategoryNode { category, children }
            })
            .collect()
    }
}
