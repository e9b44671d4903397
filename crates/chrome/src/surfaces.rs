//! Surface visibility manager.
//!
//! At most one of {home panel, search panel, tabs panel} is visible
//! at a time, and web content visibility is the inverse of the first
//! two. Content is hidden outright rather than merely obscured so it
//! drops out of the accessibility tree and does not waste paint. The
//! tabs panel overlays content without hiding it, but removes it from
//! the accessibility tree while shown.

use crate::about_pages;

/// Height of one row in the tabs panel, in pixels.
const TABS_ROW_HEIGHT: f32 = 72.0;

/// Maximum rows the tabs panel grows to before scrolling internally.
const TABS_MAX_ROWS: usize = 6;

/// The chrome surfaces that can hold the foreground.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Surface {
    Content,
    Home,
    Search,
    Tabs,
}

/// Which tab population the tabs panel displays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TabsPanelKind {
    Normal,
    Private,
}

/// What to reveal when the search overlay is dismissed.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchRestore {
    /// Reveal web content (commit path: a page load follows).
    Content,
    /// Re-show the home panel at the given panel.
    Home(Option<String>),
}

/// The tab-switcher panel. Constructed lazily on first use and cached
/// thereafter; inflating it is expensive and most sessions never open
/// it.
#[derive(Debug)]
struct TabsPanel {
    kind: TabsPanelKind,
    measured_height: f32,
}

impl TabsPanel {
    fn new(kind: TabsPanelKind) -> Self {
        Self {
            kind,
            measured_height: 0.0,
        }
    }

    fn measure(&mut self, display_count: usize) {
        self.measured_height = TABS_ROW_HEIGHT * display_count.min(TABS_MAX_ROWS) as f32;
    }
}

/// Mutually-exclusive visibility controller for the chrome surfaces.
pub struct SurfaceManager {
    /// Web content visibility.
    content_visible: bool,
    /// Whether content is exposed to accessibility tools.
    content_accessible: bool,
    /// Home panel visibility.
    home_visible: bool,
    /// Whether the home panel's backing data source is loaded.
    home_loaded: bool,
    /// Currently loaded home panel.
    home_panel: Option<String>,
    /// Top padding of the home panel container.
    home_top_padding: f32,
    /// Search overlay visibility.
    search_visible: bool,
    /// Opaque window background while the search overlay is up, to
    /// avoid a flash of the surface beneath during IME transitions.
    window_opaque: bool,
    /// Cached tabs panel.
    tabs_panel: Option<TabsPanel>,
    /// Tabs panel visibility.
    tabs_visible: bool,
    /// Find-in-page bar visibility.
    find_bar_visible: bool,
    /// Input-assist popup visibility.
    input_assist_visible: bool,
    /// Whether transient notification popups may show.
    notifications_enabled: bool,
    /// Toolbar clearance needs recomputing: home panel uses padding,
    /// web content uses margin.
    toolbar_height_dirty: bool,
    /// Deferred content hide, keyed by animation generation.
    pending_hide_content: Option<u64>,
    /// Deferred search reveal, keyed by animation generation.
    pending_show_search: Option<u64>,
}

impl SurfaceManager {
    /// Create a manager with content in the foreground.
    pub fn new() -> Self {
        Self {
            content_visible: true,
            content_accessible: true,
            home_visible: false,
            home_loaded: false,
            home_panel: None,
            home_top_padding: 0.0,
            search_visible: false,
            window_opaque: false,
            tabs_panel: None,
            tabs_visible: false,
            find_bar_visible: false,
            input_assist_visible: false,
            notifications_enabled: true,
            toolbar_height_dirty: false,
            pending_hide_content: None,
            pending_show_search: None,
        }
    }

    /// The surface currently holding the foreground.
    pub fn foreground(&self) -> Surface {
        if self.tabs_visible {
            Surface::Tabs
        } else if self.search_visible {
            Surface::Search
        } else if self.home_visible {
            Surface::Home
        } else {
            Surface::Content
        }
    }

    pub fn is_content_visible(&self) -> bool {
        self.content_visible
    }

    pub fn is_content_accessible(&self) -> bool {
        self.content_accessible
    }

    pub fn is_home_visible(&self) -> bool {
        self.home_visible
    }

    pub fn is_home_loaded(&self) -> bool {
        self.home_loaded
    }

    /// Currently loaded home panel, if any.
    pub fn home_panel(&self) -> Option<&str> {
        self.home_panel.as_deref()
    }

    pub fn is_search_visible(&self) -> bool {
        self.search_visible
    }

    pub fn is_window_opaque(&self) -> bool {
        self.window_opaque
    }

    pub fn is_tabs_visible(&self) -> bool {
        self.tabs_visible
    }

    /// Kind the tabs panel is showing, if it was ever materialized.
    pub fn tabs_panel_kind(&self) -> Option<TabsPanelKind> {
        self.tabs_panel.as_ref().map(|panel| panel.kind)
    }

    /// Measured slide height of the tabs panel.
    pub fn tabs_panel_height(&self) -> f32 {
        self.tabs_panel
            .as_ref()
            .map_or(0.0, |panel| panel.measured_height)
    }

    pub fn is_find_bar_visible(&self) -> bool {
        self.find_bar_visible
    }

    /// Show or hide the find-in-page bar.
    pub fn set_find_bar_visible(&mut self, visible: bool) {
        self.find_bar_visible = visible;
    }

    pub fn is_input_assist_visible(&self) -> bool {
        self.input_assist_visible
    }

    /// Show or hide the input-assist popup.
    pub fn set_input_assist_visible(&mut self, visible: bool) {
        self.input_assist_visible = visible;
    }

    pub fn notifications_enabled(&self) -> bool {
        self.notifications_enabled
    }

    pub fn home_top_padding(&self) -> f32 {
        self.home_top_padding
    }

    /// Record the home container's top padding from a host relayout.
    pub fn set_home_top_padding(&mut self, padding: f32) {
        self.home_top_padding = padding;
    }

    /// Take the toolbar-height-refresh flag.
    pub fn take_toolbar_height_dirty(&mut self) -> bool {
        std::mem::take(&mut self.toolbar_height_dirty)
    }

    /// Show the home panel.
    ///
    /// If the panel is already showing, this only switches the loaded
    /// panel. When `animation` carries a generation, hiding web
    /// content is deferred until that animation's end callback;
    /// a faster transition started mid-animation invalidates the
    /// deferred hide.
    pub fn show_home(&mut self, panel_id: Option<String>, animation: Option<u64>) {
        if self.home_visible {
            if panel_id.is_some() && panel_id != self.home_panel {
                tracing::debug!(panel = ?panel_id, "switching home panel");
                self.home_panel = panel_id;
            }
            return;
        }

        // Dismiss popups that would float over the new surface.
        self.input_assist_visible = false;
        self.find_bar_visible = false;

        tracing::debug!(panel = ?panel_id, animated = animation.is_some(), "show home panel");
        self.home_visible = true;
        self.home_loaded = true;
        if panel_id.is_some() {
            self.home_panel = panel_id;
        }

        match animation {
            Some(generation) => self.pending_hide_content = Some(generation),
            None => self.content_visible = false,
        }
    }

    /// Hide the home panel.
    ///
    /// No-op if the panel is not visible or if `target_url` is itself
    /// a home-panel URL, which would otherwise cause a hide-then-show
    /// flicker for same-surface navigation.
    pub fn hide_home(&mut self, target_url: Option<&str>) {
        if !self.home_visible || target_url.is_some_and(about_pages::is_about_home) {
            return;
        }

        // Invalidate any deferred content hide from the entry animation.
        self.pending_hide_content = None;

        tracing::debug!("hide home panel");
        self.content_visible = true;
        self.home_visible = false;
        self.home_loaded = false;
        self.home_panel = None;
        self.toolbar_height_dirty = true;
    }

    /// Reveal the search overlay.
    ///
    /// The home container is obscured but stays loaded so dismissing
    /// the overlay can restore it without a reload.
    pub fn show_search(&mut self) {
        if self.search_visible {
            return;
        }

        tracing::debug!("show search overlay");
        self.pending_show_search = None;
        self.search_visible = true;
        // Prevent overdraw beneath the overlay.
        self.content_visible = false;
        self.home_visible = false;
        self.window_opaque = true;
    }

    /// Reveal the search overlay once the given animation completes.
    pub fn show_search_after_animation(&mut self, generation: u64) {
        self.pending_show_search = Some(generation);
    }

    /// Dismiss the search overlay, revealing `restore`.
    pub fn hide_search(&mut self, restore: SearchRestore) {
        if !self.search_visible {
            return;
        }

        tracing::debug!(?restore, "hide search overlay");
        self.pending_show_search = None;
        self.search_visible = false;
        self.window_opaque = false;

        match restore {
            SearchRestore::Home(panel_id) => {
                // The home container was only obscured; re-show it.
                self.home_visible = true;
                if panel_id.is_some() {
                    self.home_panel = panel_id;
                }
            }
            SearchRestore::Content => {
                self.content_visible = true;
                self.home_loaded = false;
                self.home_panel = None;
            }
        }
    }

    /// Show the tabs panel, measuring its slide height from the
    /// display count. The panel overlays content without hiding it.
    pub fn show_tabs(&mut self, kind: TabsPanelKind, display_count: usize) {
        if self.tabs_visible {
            return;
        }

        let panel = self.tabs_panel.get_or_insert_with(|| {
            tracing::debug!(?kind, "materializing tabs panel");
            TabsPanel::new(kind)
        });
        panel.kind = kind;
        panel.measure(display_count);

        tracing::debug!(?kind, height = panel.measured_height, "show tabs panel");
        self.find_bar_visible = false;
        self.notifications_enabled = false;
        self.tabs_visible = true;
        // Content stays visible beneath the panel but must not be
        // reachable through accessibility tools.
        self.content_accessible = false;

        // The panel is modal: obscure the editing surfaces below it.
        // Content keeps its current visibility; the panel overlays it.
        self.search_visible = false;
        self.window_opaque = false;
        self.home_visible = false;
    }

    /// Begin hiding the tabs panel.
    pub fn hide_tabs(&mut self) {
        if !self.tabs_visible {
            return;
        }

        tracing::debug!("hide tabs panel");
        self.tabs_visible = false;
        self.notifications_enabled = true;
    }

    /// Complete the tabs panel exit slide.
    pub fn finish_tabs_hide(&mut self) {
        if !self.tabs_visible {
            self.content_accessible = true;
        }
    }

    /// Run continuations deferred on a chrome animation, validating
    /// the generation so cancelled transitions stay cancelled.
    pub fn on_chrome_animation_end(&mut self, generation: u64) {
        if self.pending_hide_content == Some(generation) {
            self.pending_hide_content = None;
            self.content_visible = false;
        }
        if self.pending_show_search == Some(generation) {
            self.pending_show_search = None;
            self.show_search();
        }
    }

    /// Drop any continuation deferred on the chrome animation.
    pub fn cancel_deferred(&mut self) {
        self.pending_hide_content = None;
        self.pending_show_search = None;
    }

    /// Ensure web content is the foreground surface, unloading any
    /// obscured home panel. No-op while a modal or overlay surface is
    /// up.
    pub fn show_content(&mut self) {
        if self.home_visible {
            self.hide_home(None);
            return;
        }
        if self.search_visible || self.tabs_visible {
            return;
        }

        self.pending_hide_content = None;
        self.home_loaded = false;
        self.home_panel = None;
        self.content_visible = true;
    }

    /// Check the exclusivity contract: at most one secondary surface
    /// visible, and content visibility the inverse of the home and
    /// search overlays. The tabs panel is excepted because it
    /// overlays content without hiding it.
    pub fn check_invariants(&self) -> bool {
        let overlays = usize::from(self.home_visible)
            + usize::from(self.search_visible)
            + usize::from(self.tabs_visible);
        if overlays > 1 {
            return false;
        }
        if self.tabs_visible {
            return true;
        }
        if self.home_visible || self.search_visible {
            // A deferred hide may still be pending mid-animation.
            !self.content_visible || self.pending_hide_content.is_some()
        } else {
            self.content_visible
        }
    }
}

impl Default for SurfaceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_foreground_by_default() {
        let surfaces = SurfaceManager::new();
        assert_eq!(surfaces.foreground(), Surface::Content);
        assert!(surfaces.is_content_visible());
        assert!(surfaces.check_invariants());
    }

    #[test]
    fn test_show_home_hides_content() {
        let mut surfaces = SurfaceManager::new();
        surfaces.show_home(Some("bookmarks".to_string()), None);

        assert_eq!(surfaces.foreground(), Surface::Home);
        assert!(!surfaces.is_content_visible());
        assert_eq!(surfaces.home_panel(), Some("bookmarks"));
        assert!(surfaces.check_invariants());
    }

    #[test]
    fn test_show_home_twice_is_idempotent() {
        let mut surfaces = SurfaceManager::new();
        surfaces.show_home(Some("history".to_string()), None);
        surfaces.show_home(Some("history".to_string()), None);

        assert_eq!(surfaces.foreground(), Surface::Home);
        assert_eq!(surfaces.home_panel(), Some("history"));
        assert!(surfaces.check_invariants());
    }

    #[test]
    fn test_show_home_switches_panel_when_visible() {
        let mut surfaces = SurfaceManager::new();
        surfaces.show_home(Some("history".to_string()), None);
        surfaces.show_home(Some("bookmarks".to_string()), None);

        assert_eq!(surfaces.home_panel(), Some("bookmarks"));
    }

    #[test]
    fn test_deferred_content_hide_waits_for_animation() {
        let mut surfaces = SurfaceManager::new();
        surfaces.show_home(None, Some(7));

        // Content hide deferred until the animation end callback.
        assert!(surfaces.is_content_visible());

        surfaces.on_chrome_animation_end(7);
        assert!(!surfaces.is_content_visible());
        assert!(surfaces.check_invariants());
    }

    #[test]
    fn test_stale_animation_end_does_not_hide_content() {
        let mut surfaces = SurfaceManager::new();
        surfaces.show_home(None, Some(7));

        // A faster transition moved on before the end callback fired.
        surfaces.hide_home(None);
        surfaces.on_chrome_animation_end(7);

        assert!(surfaces.is_content_visible());
        assert_eq!(surfaces.foreground(), Surface::Content);
    }

    #[test]
    fn test_hide_home_noop_for_home_target() {
        let mut surfaces = SurfaceManager::new();
        surfaces.show_home(Some("bookmarks".to_string()), None);

        surfaces.hide_home(Some("about:home?panel=history"));
        assert_eq!(surfaces.foreground(), Surface::Home);

        surfaces.hide_home(Some("https://example.com"));
        assert_eq!(surfaces.foreground(), Surface::Content);
        assert!(!surfaces.is_home_loaded());
    }

    #[test]
    fn test_search_obscures_home_without_unloading() {
        let mut surfaces = SurfaceManager::new();
        surfaces.show_home(Some("bookmarks".to_string()), None);
        surfaces.show_search();

        assert_eq!(surfaces.foreground(), Surface::Search);
        assert!(!surfaces.is_home_visible());
        assert!(surfaces.is_home_loaded());
        assert!(surfaces.is_window_opaque());
        assert!(surfaces.check_invariants());

        surfaces.hide_search(SearchRestore::Home(None));
        assert_eq!(surfaces.foreground(), Surface::Home);
        assert_eq!(surfaces.home_panel(), Some("bookmarks"));
        assert!(!surfaces.is_window_opaque());
        assert!(surfaces.check_invariants());
    }

    #[test]
    fn test_hide_search_to_content_unloads_home() {
        let mut surfaces = SurfaceManager::new();
        surfaces.show_home(None, None);
        surfaces.show_search();

        surfaces.hide_search(SearchRestore::Content);
        assert_eq!(surfaces.foreground(), Surface::Content);
        assert!(!surfaces.is_home_loaded());
        assert!(surfaces.check_invariants());
    }

    #[test]
    fn test_tabs_panel_inflate_once() {
        let mut surfaces = SurfaceManager::new();
        assert_eq!(surfaces.tabs_panel_kind(), None);

        surfaces.show_tabs(TabsPanelKind::Normal, 3);
        assert_eq!(surfaces.tabs_panel_kind(), Some(TabsPanelKind::Normal));
        assert_eq!(surfaces.tabs_panel_height(), 3.0 * 72.0);

        surfaces.hide_tabs();
        surfaces.finish_tabs_hide();
        surfaces.show_tabs(TabsPanelKind::Private, 2);
        assert_eq!(surfaces.tabs_panel_kind(), Some(TabsPanelKind::Private));
    }

    #[test]
    fn test_tabs_panel_overlays_content() {
        let mut surfaces = SurfaceManager::new();
        surfaces.show_tabs(TabsPanelKind::Normal, 1);

        assert_eq!(surfaces.foreground(), Surface::Tabs);
        assert!(surfaces.is_content_visible());
        assert!(!surfaces.is_content_accessible());
        assert!(!surfaces.notifications_enabled());
        assert!(surfaces.check_invariants());

        surfaces.hide_tabs();
        surfaces.finish_tabs_hide();
        assert!(surfaces.is_content_accessible());
        assert!(surfaces.notifications_enabled());
    }

    #[test]
    fn test_show_content_after_tabs_over_home() {
        let mut surfaces = SurfaceManager::new();
        surfaces.show_home(None, None);
        surfaces.show_tabs(TabsPanelKind::Normal, 2);
        surfaces.hide_tabs();
        surfaces.finish_tabs_hide();

        surfaces.show_content();
        assert_eq!(surfaces.foreground(), Surface::Content);
        assert!(surfaces.is_content_visible());
        assert!(!surfaces.is_home_loaded());
        assert!(surfaces.check_invariants());
    }

    #[test]
    fn test_tabs_panel_height_caps_at_max_rows() {
        let mut surfaces = SurfaceManager::new();
        surfaces.show_tabs(TabsPanelKind::Normal, 40);
        assert_eq!(surfaces.tabs_panel_height(), 6.0 * 72.0);
    }
}
