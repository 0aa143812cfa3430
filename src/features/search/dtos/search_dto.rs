use serde::Serialize;

/// Which field of a record matched the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    Name,
    Slug,
    Title,
    Content,
    Media,
}

/// One search result, tagged with the entity it came from.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchHit {
    Category(CategoryHit),
    Tutorial(TutorialHit),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryHit {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub icon: String,
    /// Breadcrumb of ancestor names, root first.
    pub path: String,
    pub matched_in: Vec<MatchField>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorialHit {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub category_id: String,
    pub category_name: String,
    pub url: String,
    pub matched_in: Vec<MatchField>,
    pub excerpt: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub results: Vec<SearchHit>,
    pub query: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
