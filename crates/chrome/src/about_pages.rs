//! Internal `about:` page URLs.

/// URL of the home (start page) surface.
pub const ABOUT_HOME: &str = "about:home";

/// Query parameter selecting a specific home panel.
const PANEL_PARAM: &str = "panel=";

/// Check whether a URL displays the home panel.
pub fn is_about_home(url: &str) -> bool {
    url == ABOUT_HOME || url.starts_with("about:home?")
}

/// Extract the panel id from an `about:home?panel=<id>` URL.
pub fn panel_id_from_url(url: &str) -> Option<String> {
    if !is_about_home(url) {
        return None;
    }

    let query = url.split_once('?')?.1;
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix(PANEL_PARAM))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_about_home() {
        assert!(is_about_home("about:home"));
        assert!(is_about_home("about:home?panel=bookmarks"));
        assert!(!is_about_home("about:config"));
        assert!(!is_about_home("https://example.com"));
    }

    #[test]
    fn test_panel_id_from_url() {
        assert_eq!(
            panel_id_from_url("about:home?panel=bookmarks"),
            Some("bookmarks".to_string())
        );
        assert_eq!(panel_id_from_url("about:home"), None);
        assert_eq!(panel_id_from_url("about:home?panel="), None);
        assert_eq!(panel_id_from_url("https://example.com?panel=x"), None);
    }
}
