//! Chrome coordinator configuration.
//!
//! The coordinator consumes these flags but does not own them; the
//! host resolves them from preferences, hardware detection and the
//! experiment service before constructing the coordinator.

/// Chrome configuration.
#[derive(Clone, Debug)]
pub struct ChromeConfig {
    /// Whether the toolbar may auto-hide on scroll.
    pub dynamic_toolbar: bool,
    /// Whether the device is a large-tablet form factor with a
    /// visible tab strip.
    pub tablet: bool,
    /// Whether the search-term-surfacing experiment is active.
    pub search_term_experiment: bool,
    /// Whether exiting editing mode re-selects the tab that was
    /// active when editing began. Disabled on tablets, where the tab
    /// strip already gives visual feedback for background-tab
    /// switches.
    pub restore_edit_target_on_exit: bool,
    /// Whether selecting a tab with no saved editing state cancels an
    /// active edit. Enabled on tablets, where per-tab editing state
    /// follows the tab strip selection.
    pub cancel_edit_on_tab_switch: bool,
    /// Toolbar height in pixels.
    pub toolbar_height: f32,
}

impl ChromeConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tablet configuration.
    pub fn tablet() -> Self {
        Self {
            tablet: true,
            restore_edit_target_on_exit: false,
            cancel_edit_on_tab_switch: true,
            ..Self::default()
        }
    }

    /// Set whether the toolbar auto-hides on scroll.
    pub fn with_dynamic_toolbar(mut self, enabled: bool) -> Self {
        self.dynamic_toolbar = enabled;
        self
    }

    /// Set the search-term experiment flag.
    pub fn with_search_term_experiment(mut self, enabled: bool) -> Self {
        self.search_term_experiment = enabled;
        self
    }

    /// Set whether exiting editing mode re-selects the editing tab.
    pub fn with_restore_edit_target(mut self, enabled: bool) -> Self {
        self.restore_edit_target_on_exit = enabled;
        self
    }

    /// Set the toolbar height.
    pub fn with_toolbar_height(mut self, height: f32) -> Self {
        self.toolbar_height = height;
        self
    }
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            dynamic_toolbar: true,
            tablet: false,
            search_term_experiment: false,
            restore_edit_target_on_exit: true,
            cancel_edit_on_tab_switch: false,
            toolbar_height: 56.0,
        }
    }
}
