use std::sync::OnceLock;

use regex::Regex;
use reqwest::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownLink {
    pub title: String,
    pub url: String,
}

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\[([^\]]+)\]\((https?://[^)]+)\)").expect("link pattern is valid")
    })
}

/// Scans text for markdown-style `[title](url)` links.
pub fn extract_markdown_links(text: &str) -> Vec<MarkdownLink> {
    link_pattern()
        .captures_iter(text)
        .map(|caps| MarkdownLink {
            title: caps[1].to_string(),
            url: caps[2].to_string(),
        })
        .collect()
}

/// Replaces every markdown link with its bare title.
pub fn strip_link_markup(text: &str) -> String {
    link_pattern().replace_all(text, "$1").into_owned()
}

/// Extracts the product handle: the path segment following `products`.
/// `None` when the URL does not look like a product page.
pub fn product_handle(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
    let idx = segments.iter().position(|s| *s == "products")?;
    segments.get(idx + 1).map(|s| s.to_string())
}
