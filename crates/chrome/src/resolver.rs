//! URL and bookmark-keyword resolution for committed edit text.

use url::Url;

use crate::error::ChromeResult;

/// Maximum length of a query stored as a user-requested search term.
const MAX_STORED_QUERY_LEN: usize = 50;

/// Bookmark keyword store.
///
/// The lookup runs off the UI thread in the host; the coordinator
/// only sees the marshalled result.
pub trait BookmarkKeywords {
    /// Resolve a bookmark keyword to its URL template, if one exists.
    fn url_for_keyword(&self, keyword: &str) -> ChromeResult<Option<String>>;
}

/// How committed edit text was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionKind {
    /// Loaded directly as user-entered navigation. A downstream
    /// default-search-engine handler may still turn this into a
    /// search query.
    UserEntered,
    /// A bookmark keyword matched and its template was filled in.
    KeywordSearch,
}

/// The outcome of resolving committed edit text.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    /// URL to navigate to.
    pub url: String,
    /// How the URL was derived.
    pub kind: ResolutionKind,
}

/// Heuristic: does the text look like a search query rather than a
/// navigable URL? Text with an explicit scheme or a domain-shaped
/// single token is treated as a URL.
pub fn is_search_query(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }

    if has_scheme(text) {
        return false;
    }

    if text.contains(char::is_whitespace) {
        return true;
    }

    // A single token with a dot resembles a domain.
    !text.contains('.')
}

fn has_scheme(text: &str) -> bool {
    if text.starts_with("about:") {
        return true;
    }
    match Url::parse(text) {
        // `Url::parse` accepts single words with a colon ("foo:bar")
        // as scheme-relative URLs; require a known hierarchical form.
        Ok(url) => url.has_host() || matches!(url.scheme(), "file" | "data" | "javascript"),
        Err(_) => false,
    }
}

/// Resolve committed edit text against the bookmark keyword store.
///
/// Text that does not look like a search query loads directly. A
/// query is split on the first space into keyword and rest; a
/// matching bookmark template has its `%s` placeholder substituted
/// percent-encoded and its `%S` placeholder substituted raw. Lookup
/// failure falls back to a plain user-entered load.
pub fn resolve(text: &str, keywords: &dyn BookmarkKeywords) -> Resolution {
    if !is_search_query(text) {
        return Resolution {
            url: text.to_string(),
            kind: ResolutionKind::UserEntered,
        };
    }

    let (keyword, rest) = match text.find(' ') {
        Some(index) => (&text[..index], &text[index + 1..]),
        None => (text, ""),
    };

    let template = match keywords.url_for_keyword(keyword) {
        Ok(Some(template)) => template,
        Ok(None) => {
            return Resolution {
                url: text.to_string(),
                kind: ResolutionKind::UserEntered,
            };
        }
        Err(error) => {
            tracing::warn!(%error, keyword, "keyword lookup failed, loading as entered");
            return Resolution {
                url: text.to_string(),
                kind: ResolutionKind::UserEntered,
            };
        }
    };

    let url = template
        .replace("%s", &urlencoding::encode(rest))
        .replace("%S", rest);

    Resolution {
        url,
        kind: ResolutionKind::KeywordSearch,
    }
}

/// Whether a committed query should be stored as the tab's
/// user-requested search term. URLs and over-long suggestions are
/// filtered out.
pub fn should_store_query(query: &str) -> bool {
    if query.is_empty() || query.len() > MAX_STORED_QUERY_LEN {
        return false;
    }
    !["http://", "https://", "ftp://", "file://"]
        .iter()
        .any(|scheme| query.starts_with(scheme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChromeError;
    use std::collections::HashMap;

    struct MapKeywords(HashMap<String, String>);

    impl BookmarkKeywords for MapKeywords {
        fn url_for_keyword(&self, keyword: &str) -> ChromeResult<Option<String>> {
            Ok(self.0.get(keyword).cloned())
        }
    }

    struct FailingKeywords;

    impl BookmarkKeywords for FailingKeywords {
        fn url_for_keyword(&self, _keyword: &str) -> ChromeResult<Option<String>> {
            Err(ChromeError::keyword_lookup("store unreachable"))
        }
    }

    fn keywords() -> MapKeywords {
        let mut map = HashMap::new();
        map.insert(
            "fb".to_string(),
            "https://example.com/search?q=%s".to_string(),
        );
        map.insert(
            "raw".to_string(),
            "https://example.com/raw/%S".to_string(),
        );
        MapKeywords(map)
    }

    #[test]
    fn test_search_query_heuristic() {
        assert!(is_search_query("cute cats"));
        assert!(is_search_query("rust"));
        assert!(!is_search_query("example.com"));
        assert!(!is_search_query("https://example.com"));
        assert!(!is_search_query("about:home"));
        assert!(!is_search_query(""));
    }

    #[test]
    fn test_keyword_substitution_encodes_lowercase() {
        let resolution = resolve("fb search term", &keywords());
        assert_eq!(resolution.kind, ResolutionKind::KeywordSearch);
        assert_eq!(resolution.url, "https://example.com/search?q=search%20term");
    }

    #[test]
    fn test_keyword_substitution_raw_uppercase() {
        let resolution = resolve("raw a/b c", &keywords());
        assert_eq!(resolution.url, "https://example.com/raw/a/b c");
    }

    #[test]
    fn test_keyword_without_rest() {
        let resolution = resolve("fb", &keywords());
        assert_eq!(resolution.kind, ResolutionKind::KeywordSearch);
        assert_eq!(resolution.url, "https://example.com/search?q=");
    }

    #[test]
    fn test_url_bypasses_keyword_lookup() {
        let resolution = resolve("https://example.com", &FailingKeywords);
        assert_eq!(resolution.kind, ResolutionKind::UserEntered);
        assert_eq!(resolution.url, "https://example.com");
    }

    #[test]
    fn test_unknown_keyword_falls_back_to_plain_load() {
        let resolution = resolve("zz searchterm", &keywords());
        assert_eq!(resolution.kind, ResolutionKind::UserEntered);
        assert_eq!(resolution.url, "zz searchterm");
    }

    #[test]
    fn test_lookup_failure_falls_back_to_plain_load() {
        let resolution = resolve("fb searchterm", &FailingKeywords);
        assert_eq!(resolution.kind, ResolutionKind::UserEntered);
        assert_eq!(resolution.url, "fb searchterm");
    }

    #[test]
    fn test_stored_query_filter() {
        assert!(should_store_query("cute cats"));
        assert!(!should_store_query("https://example.com"));
        assert!(!should_store_query(&"x".repeat(51)));
        assert!(!should_store_query(""));
    }
}
