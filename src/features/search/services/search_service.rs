use std::sync::Arc;

use crate::core::error::Result;
use crate::features::categories::models::Category;
use crate::features::categories::services::path_of;
use crate::features::search::dtos::{
    CategoryHit, MatchField, SearchHit, SearchResults, TutorialHit,
};
use crate::features::tutorials::models::Tutorial;
use crate::modules::storage::RecordStore;
use crate::shared::constants::{
    BREADCRUMB_SEPARATOR, EXCERPT_AFTER, EXCERPT_BEFORE, EXCERPT_FALLBACK_LEN,
    MIN_SEARCH_QUERY_LEN,
};
use crate::shared::validation::strip_markup;

/// Excerpt window around the first case-insensitive occurrence of `query`
/// inside content stripped of markup and embed tokens.
///
/// Keeps roughly [`EXCERPT_BEFORE`] characters before and [`EXCERPT_AFTER`]
/// after the match, with ellipsis markers at truncated edges. Without a
/// match (the query may have hit the title or media fields instead), the
/// first [`EXCERPT_FALLBACK_LEN`] characters are returned.
pub fn excerpt(content: &str, query: &str) -> String {
    let stripped = strip_markup(content);
    let chars: Vec<char> = stripped.chars().collect();
    let haystack: Vec<char> = chars
        .iter()
        .map(|c| c.to_lowercase().next().unwrap_or(*c))
        .collect();
    let needle: Vec<char> = query
        .chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect();

    match find_chars(&haystack, &needle) {
        Some(index) => {
            let start = index.saturating_sub(EXCERPT_BEFORE);
            let end = (index + needle.len() + EXCERPT_AFTER).min(chars.len());
            let window: String = chars[start..end].iter().collect();

            let mut excerpt = String::new();
            if start > 0 {
                excerpt.push_str("...");
            }
            excerpt.push_str(&window);
            if end < chars.len() {
                excerpt.push_str("...");
            }
            excerpt
        }
        None => {
            let head: String = chars.iter().take(EXCERPT_FALLBACK_LEN).collect();
            format!("{}...", head)
        }
    }
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Ad-hoc search: a case-insensitive substring scan over category
/// names/slugs and tutorial titles/content/media fields. No index; the
/// datasets are small enough that a linear pass per query is fine.
pub struct SearchService {
    categories: Arc<dyn RecordStore<Category>>,
    tutorials: Arc<dyn RecordStore<Tutorial>>,
}

impl SearchService {
    pub fn new(
        categories: Arc<dyn RecordStore<Category>>,
        tutorials: Arc<dyn RecordStore<Tutorial>>,
    ) -> Self {
        Self {
            categories,
            tutorials,
        }
    }

    pub async fn search(&self, query: &str) -> Result<SearchResults> {
        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_SEARCH_QUERY_LEN {
            return Ok(SearchResults {
                results: Vec::new(),
                query: trimmed.to_string(),
                count: 0,
                message: Some("Query too short".to_string()),
            });
        }
        let needle = trimmed.to_lowercase();

        let categories = self.categories.read_all().await?;
        let mut tutorials = self.tutorials.read_all().await?;
        for tutorial in &mut tutorials {
            tutorial.migrate_media();
        }

        let mut results = Vec::new();

        for category in &categories {
            let mut matched = Vec::new();
            if category.name.to_lowercase().contains(&needle) {
                matched.push(MatchField::Name);
            }
            if category.slug.to_lowercase().contains(&needle) {
                matched.push(MatchField::Slug);
            }
            if matched.is_empty() {
                continue;
            }

            let path = path_of(&categories, &category.id)
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(BREADCRUMB_SEPARATOR);

            results.push(SearchHit::Category(CategoryHit {
                id: category.id.clone(),
                title: category.name.clone(),
                slug: category.slug.clone(),
                icon: category.resolved_icon().to_string(),
                path,
                matched_in: matched,
            }));
        }

        for tutorial in &tutorials {
            let mut matched = Vec::new();
            if tutorial.title.to_lowercase().contains(&needle) {
                matched.push(MatchField::Title);
            }
            if tutorial.content.to_lowercase().contains(&needle) {
                matched.push(MatchField::Content);
            }
            let media_match = tutorial.media.iter().any(|m| {
                m.title
                    .as_deref()
                    .map_or(false, |t| t.to_lowercase().contains(&needle))
                    || m.caption
                        .as_deref()
                        .map_or(false, |c| c.to_lowercase().contains(&needle))
            });
            if media_match {
                matched.push(MatchField::Media);
            }
            if matched.is_empty() {
                continue;
            }

            let category_name = categories
                .iter()
                .find(|c| c.id == tutorial.category_id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "Uncategorized".to_string());

            results.push(SearchHit::Tutorial(TutorialHit {
                id: tutorial.id.clone(),
                title: tutorial.title.clone(),
                slug: tutorial.slug.clone(),
                category_id: tutorial.category_id.clone(),
                category_name,
                url: format!("/tutorial/{}", tutorial.slug),
                matched_in: matched,
                excerpt: excerpt(&tutorial.content, trimmed),
            }));
        }

        Ok(SearchResults {
            count: results.len(),
            results,
            query: trimmed.to_string(),
            message: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::tutorials::models::{MediaItem, MediaKind, TutorialStatus};
    use crate::modules::storage::JsonFileStore;
    use chrono::Utc;
    use tempfile::TempDir;

    fn category(id: &str, name: &str, parent_id: Option<&str>) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            slug: id.to_string(),
            icon: "Folder".to_string(),
            order: 1,
            parent_id: parent_id.map(str::to_string),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn tutorial(id: &str, title: &str, content: &str, category_id: &str) -> Tutorial {
        Tutorial {
            id: id.to_string(),
            title: title.to_string(),
            slug: id.to_string(),
            category_id: category_id.to_string(),
            content: content.to_string(),
            media: Vec::new(),
            legacy_video_id: None,
            order: 1,
            author: None,
            views: 0,
            status: TutorialStatus::Published,
            published_at: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn service_with(
        dir: &TempDir,
        categories: Vec<Category>,
        tutorials: Vec<Tutorial>,
    ) -> SearchService {
        SearchService::new(
            Arc::new(JsonFileStore::new(
                dir.path().join("categories.json"),
                categories,
            )),
            Arc::new(JsonFileStore::new(
                dir.path().join("tutorials.json"),
                tutorials,
            )),
        )
    }

    #[test]
    fn test_excerpt_window_has_ellipses_on_both_edges() {
        let content = format!(
            "{} mari kita bahas SIGEPENG secara detail {}",
            "pembuka ".repeat(10),
            "dan seterusnya ".repeat(10)
        );
        let excerpt = excerpt(&content, "sigepeng");

        assert!(excerpt.starts_with("..."));
        assert!(excerpt.ends_with("..."));
        assert!(excerpt.contains("SIGEPENG"));
    }

    #[test]
    fn test_excerpt_near_start_has_no_leading_ellipsis() {
        let excerpt = excerpt(
            &format!("SIGEPENG dibahas di sini {}", "dan seterusnya ".repeat(10)),
            "sigepeng",
        );
        assert!(excerpt.starts_with("SIGEPENG"));
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn test_excerpt_without_match_returns_head() {
        let content = "kalimat pembuka tanpa kata yang dicari".to_string() + &" isi".repeat(50);
        let excerpt = excerpt(&content, "sigepeng");
        assert!(excerpt.starts_with("kalimat pembuka"));
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn test_excerpt_searches_stripped_content() {
        // the query sits inside an embed token and must not match
        let excerpt = excerpt("[VIDEO:sigepeng] penjelasan lain", "sigepeng");
        assert!(excerpt.starts_with("penjelasan lain"));
    }

    #[tokio::test]
    async fn test_short_query_short_circuits() {
        let dir = TempDir::new().unwrap();
        let service = service_with(&dir, vec![], vec![]);

        let results = service.search("s").await.unwrap();
        assert_eq!(results.count, 0);
        assert!(results.message.is_some());
    }

    #[tokio::test]
    async fn test_category_hits_carry_breadcrumb_path() {
        let dir = TempDir::new().unwrap();
        let service = service_with(
            &dir,
            vec![
                category("cat-root", "Persediaan", None),
                category("cat-child", "Pengeluaran Barang", Some("cat-root")),
            ],
            vec![],
        );

        let results = service.search("pengeluaran").await.unwrap();
        assert_eq!(results.count, 1);
        match &results.results[0] {
            SearchHit::Category(hit) => {
                assert_eq!(hit.path, "Persediaan > Pengeluaran Barang");
                assert_eq!(hit.matched_in, vec![MatchField::Name]);
            }
            other => panic!("expected category hit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_tutorial_hits_tag_matched_fields() {
        let dir = TempDir::new().unwrap();
        let mut with_media = tutorial("t2", "Lain", "tanpa kata itu", "cat");
        with_media.media = vec![MediaItem {
            id: "m1".to_string(),
            kind: MediaKind::Video,
            video_id: Some("abc".to_string()),
            url: None,
            title: Some("Demo Sigepeng".to_string()),
            caption: None,
        }];

        let service = service_with(
            &dir,
            vec![category("cat", "Umum", None)],
            vec![
                tutorial("t1", "Tutorial Sigepeng", "mari bahas sigepeng", "cat"),
                with_media,
            ],
        );

        let results = service.search("sigepeng").await.unwrap();
        assert_eq!(results.count, 2);

        match &results.results[0] {
            SearchHit::Tutorial(hit) => {
                assert_eq!(
                    hit.matched_in,
                    vec![MatchField::Title, MatchField::Content]
                );
                assert_eq!(hit.category_name, "Umum");
                assert_eq!(hit.url, "/tutorial/t1");
            }
            other => panic!("expected tutorial hit, got {:?}", other),
        }
        match &results.results[1] {
            SearchHit::Tutorial(hit) => {
                assert_eq!(hit.matched_in, vec![MatchField::Media]);
            }
            other => panic!("expected tutorial hit, got {:?}", other),
        }
    }
}
