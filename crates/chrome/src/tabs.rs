//! Tab model and tab lifecycle events.

use std::collections::HashMap;

use bitflags::bitflags;

use crate::snapshot::EditingSnapshot;

/// Tab identifier. Stable for the tab's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TabId(pub u64);

bitflags! {
    /// Flags for a navigation request.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct LoadFlags: u8 {
        /// Open in a new tab.
        const NEW_TAB = 1 << 0;
        /// Load in the background without selecting the tab.
        const BACKGROUND = 1 << 1;
        /// Load in a private tab.
        const PRIVATE = 1 << 2;
        /// The URL was entered by the user and may be trusted as such.
        const USER_ENTERED = 1 << 3;
    }
}

/// Tab lifecycle and navigation events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TabEventKind {
    Selected,
    Unselected,
    LocationChange,
    LoadStart,
    LoadStop,
    LoadError,
    PageShow,
    MenuUpdated,
    BookmarkAdded,
    BookmarkRemoved,
    ReadingListAdded,
    ReadingListRemoved,
    /// Session restore finished. The only event not tied to a tab.
    Restored,
}

/// A tab event as delivered to the coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TabEvent {
    /// The tab the event refers to. `None` only for `Restored`.
    pub tab: Option<TabId>,
    /// Event kind.
    pub kind: TabEventKind,
}

impl TabEvent {
    pub fn new(tab: TabId, kind: TabEventKind) -> Self {
        Self {
            tab: Some(tab),
            kind,
        }
    }

    pub fn restored() -> Self {
        Self {
            tab: None,
            kind: TabEventKind::Restored,
        }
    }
}

/// A navigation request issued to the navigation subsystem.
#[derive(Clone, Debug, PartialEq)]
pub struct Navigation {
    /// Target URL.
    pub url: String,
    /// Request flags.
    pub flags: LoadFlags,
}

/// Browser tab.
pub struct Tab {
    /// Tab ID.
    id: TabId,
    /// Current URL.
    url: String,
    /// Last search term the user typed that triggered a load.
    user_requested: String,
    /// External application that opened this tab, if any.
    application_id: Option<String>,
    /// Most recently shown home panel.
    most_recent_home_panel: Option<String>,
    /// Is a private tab.
    private: bool,
    /// Is currently in editing mode.
    editing: bool,
    /// Editing snapshot. Created lazily on first edit.
    editing_snapshot: Option<EditingSnapshot>,
    /// A favicon refresh was requested by a page-show event.
    favicon_refresh_requested: bool,
}

impl Tab {
    /// Create a new tab.
    pub fn new(id: TabId, url: &str, private: bool) -> Self {
        Self {
            id,
            url: url.to_string(),
            user_requested: String::new(),
            application_id: None,
            most_recent_home_panel: None,
            private,
            editing: false,
            editing_snapshot: None,
            favicon_refresh_requested: false,
        }
    }

    /// Get the tab ID.
    pub fn id(&self) -> TabId {
        self.id
    }

    /// Get the current URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Set the current URL.
    pub fn set_url(&mut self, url: &str) {
        self.url = url.to_string();
    }

    /// Get the last user-requested search term.
    pub fn user_requested(&self) -> &str {
        &self.user_requested
    }

    /// Set the last user-requested search term.
    pub fn set_user_requested(&mut self, term: &str) {
        self.user_requested = term.to_string();
    }

    /// Get the external application linkage.
    pub fn application_id(&self) -> Option<&str> {
        self.application_id.as_deref()
    }

    /// Set or clear the external application linkage.
    pub fn set_application_id(&mut self, id: Option<String>) {
        self.application_id = id;
    }

    /// Get the most recently shown home panel.
    pub fn most_recent_home_panel(&self) -> Option<&str> {
        self.most_recent_home_panel.as_deref()
    }

    /// Record the most recently shown home panel.
    pub fn set_most_recent_home_panel(&mut self, panel_id: Option<String>) {
        self.most_recent_home_panel = panel_id;
    }

    /// Check if this is a private tab.
    pub fn is_private(&self) -> bool {
        self.private
    }

    /// Check if this tab is in editing mode.
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Set the editing-mode flag.
    pub fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }

    /// Get the editing snapshot, if one was ever taken.
    pub fn editing_snapshot(&self) -> Option<&EditingSnapshot> {
        self.editing_snapshot.as_ref()
    }

    /// Get the editing snapshot, creating it on first use.
    pub fn editing_snapshot_mut(&mut self) -> &mut EditingSnapshot {
        self.editing_snapshot.get_or_insert_with(EditingSnapshot::default)
    }

    /// Clear any saved editing state.
    pub fn clear_editing_state(&mut self) {
        self.editing = false;
        if let Some(snapshot) = self.editing_snapshot.as_mut() {
            snapshot.clear();
        }
    }

    /// Request a favicon refresh.
    pub fn request_favicon_refresh(&mut self) {
        self.favicon_refresh_requested = true;
    }

    /// Check whether a favicon refresh is pending.
    pub fn favicon_refresh_requested(&self) -> bool {
        self.favicon_refresh_requested
    }
}

/// The tab collection.
///
/// Owns the tabs; the coordinator only references them. Selection
/// emits `Unselected` for the outgoing tab before `Selected` for the
/// incoming one, so snapshot writes for the previous tab always
/// complete before restoration reads for the new tab begin.
pub struct Tabs {
    /// All open tabs.
    tabs: HashMap<TabId, Tab>,
    /// Selected tab ID.
    selected: Option<TabId>,
    /// Tab ID counter.
    counter: u64,
    /// Last navigation request issued.
    last_navigation: Option<Navigation>,
}

impl Tabs {
    /// Create an empty tab collection.
    pub fn new() -> Self {
        Self {
            tabs: HashMap::new(),
            selected: None,
            counter: 0,
            last_navigation: None,
        }
    }

    /// Add a tab and select it.
    pub fn add_tab(&mut self, url: &str, private: bool) -> TabId {
        self.counter += 1;
        let id = TabId(self.counter);

        self.tabs.insert(id, Tab::new(id, url, private));
        self.selected = Some(id);

        id
    }

    /// Close a tab, returning the events to dispatch in order.
    ///
    /// Closing the selected tab selects the most recently opened
    /// remaining tab and emits `Selected` for it. The closed tab gets
    /// no `Unselected`: it no longer exists, so there is no editing
    /// state left to snapshot.
    pub fn close_tab(&mut self, id: TabId) -> Vec<TabEvent> {
        if self.tabs.remove(&id).is_none() || self.selected != Some(id) {
            return Vec::new();
        }

        self.selected = None;
        let successor = self.tabs.keys().max_by_key(|tab| tab.0).copied();
        match successor {
            Some(next) => self.select(next),
            None => Vec::new(),
        }
    }

    /// Select a tab, returning the events to dispatch in order.
    ///
    /// Returns an empty list if the tab is unknown or already
    /// selected.
    pub fn select(&mut self, id: TabId) -> Vec<TabEvent> {
        if !self.tabs.contains_key(&id) || self.selected == Some(id) {
            return Vec::new();
        }

        let previous = self.selected;
        self.selected = Some(id);

        let mut events = Vec::with_capacity(2);
        if let Some(prev) = previous {
            events.push(TabEvent::new(prev, TabEventKind::Unselected));
        }
        events.push(TabEvent::new(id, TabEventKind::Selected));
        events
    }

    /// Get a tab.
    pub fn get(&self, id: TabId) -> Option<&Tab> {
        self.tabs.get(&id)
    }

    /// Get a mutable tab.
    pub fn get_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.get_mut(&id)
    }

    /// Get the selected tab.
    pub fn selected(&self) -> Option<&Tab> {
        self.selected.and_then(|id| self.tabs.get(&id))
    }

    /// Get the selected tab mutably.
    pub fn selected_mut(&mut self) -> Option<&mut Tab> {
        self.selected.and_then(|id| self.tabs.get_mut(&id))
    }

    /// Get the selected tab ID.
    pub fn selected_id(&self) -> Option<TabId> {
        self.selected
    }

    /// Check whether the given tab is the selected one.
    pub fn is_selected(&self, id: TabId) -> bool {
        self.selected == Some(id)
    }

    /// Check whether a tab with the given ID exists.
    pub fn contains(&self, id: TabId) -> bool {
        self.tabs.contains_key(&id)
    }

    /// Number of tabs the switcher would display.
    pub fn display_count(&self) -> usize {
        self.tabs.len()
    }

    /// Load a URL in the selected tab, returning the resulting tab
    /// events in dispatch order.
    pub fn load_url(&mut self, url: &str, flags: LoadFlags) -> Vec<TabEvent> {
        self.last_navigation = Some(Navigation {
            url: url.to_string(),
            flags,
        });

        let id = if flags.contains(LoadFlags::NEW_TAB) {
            self.add_tab(url, flags.contains(LoadFlags::PRIVATE))
        } else {
            let Some(id) = self.selected else {
                tracing::warn!(url, "load_url with no selected tab");
                return Vec::new();
            };
            if let Some(tab) = self.tabs.get_mut(&id) {
                tab.set_url(url);
            }
            id
        };

        tracing::debug!(url, ?flags, tab = ?id, "load url");
        vec![
            TabEvent::new(id, TabEventKind::LoadStart),
            TabEvent::new(id, TabEventKind::LocationChange),
        ]
    }

    /// Last navigation request issued through this collection.
    pub fn last_navigation(&self) -> Option<&Navigation> {
        self.last_navigation.as_ref()
    }
}

impl Default for Tabs {
    fn default() -> Self {
        Self::new()
    }
}
