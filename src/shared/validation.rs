use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating explicitly supplied slugs
    /// Must be lowercase alphanumeric with hyphens
    /// - Valid: "tutor-pengeluaran", "faq", "cara-upload-2"
    /// - Invalid: "-slug", "slug-", "slug--name", "Slug", "slug_name"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    /// Regex for validating username fields
    /// Must start with letter or underscore and contain only alphanumeric characters and underscores
    /// - Valid: "john_doe", "user123", "_admin", "JohnDoe"
    /// - Invalid: "123user", "-user", "user-name", "user name"
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();

    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^a-z0-9-]").unwrap();

    /// Custom media embed tokens: [VIDEO:id], [IMAGE:url|caption], [BUTTON:label|url]
    static ref EMBED_TOKEN: Regex = Regex::new(r"\[(?:VIDEO|IMAGE|BUTTON):[^\]]*\]").unwrap();
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref MARKDOWN_MARKS: Regex = Regex::new(r"[#*_`~>\[\]]").unwrap();
}

/// Derive a URL-safe slug from a human-readable title: case-folded,
/// whitespace runs collapsed to single hyphens, everything outside
/// `[a-z0-9-]` stripped.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let hyphenated = WHITESPACE_RUN.replace_all(&lowered, "-");
    NON_SLUG_CHARS.replace_all(&hyphenated, "").into_owned()
}

/// Strip embed tokens, HTML tags and markdown punctuation from content,
/// collapsing the remaining whitespace. Used for search excerpts.
pub fn strip_markup(content: &str) -> String {
    let without_tokens = EMBED_TOKEN.replace_all(content, " ");
    let without_tags = HTML_TAG.replace_all(&without_tokens, " ");
    let without_marks = MARKDOWN_MARKS.replace_all(&without_tags, "");
    WHITESPACE_RUN
        .replace_all(&without_marks, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_regex_valid() {
        assert!(SLUG_REGEX.is_match("tutor-pengeluaran"));
        assert!(SLUG_REGEX.is_match("faq"));
        assert!(SLUG_REGEX.is_match("cara-upload-2"));
        assert!(SLUG_REGEX.is_match("a-b-c"));
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("-slug")); // starts with hyphen
        assert!(!SLUG_REGEX.is_match("slug-")); // ends with hyphen
        assert!(!SLUG_REGEX.is_match("slug--name")); // double hyphen
        assert!(!SLUG_REGEX.is_match("Slug")); // uppercase
        assert!(!SLUG_REGEX.is_match("slug_name")); // underscore
        assert!(!SLUG_REGEX.is_match("")); // empty
    }

    #[test]
    fn test_slugify_strips_and_hyphenates() {
        assert_eq!(slugify("Tutorial Baru #1!"), "tutorial-baru-1");
        assert_eq!(slugify("Cara   Upload    File"), "cara-upload-file");
        assert_eq!(slugify("FAQ"), "faq");
        assert_eq!(slugify("Metode (Sigepeng)"), "metode-sigepeng");
    }

    #[test]
    fn test_strip_markup_removes_embeds_and_tags() {
        let content = "## Intro\n[VIDEO:6YaAVDhljL4]\nMari kita <b>bahas</b> [IMAGE:https://x/y.png|diagram] sekarang";
        assert_eq!(strip_markup(content), "Intro Mari kita bahas sekarang");
    }

    #[test]
    fn test_strip_markup_plain_text_unchanged() {
        assert_eq!(strip_markup("tanpa markup"), "tanpa markup");
    }
}
