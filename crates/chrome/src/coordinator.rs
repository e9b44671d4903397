//! Chrome coordinator: the editing-mode state machine and the glue
//! between tab events, the surface manager and the toolbar policy.
//!
//! All operations run on the UI event loop. Cross-thread inputs (tab
//! events, keyword lookups) are marshalled by the host before they
//! reach this type. The tab collection is passed into each operation
//! rather than held as a process-wide singleton, so the state machine
//! is testable without a full host environment.

use std::collections::HashMap;

use crate::about_pages;
use crate::address_bar::AddressBar;
use crate::animation::{AnimationKind, Animations};
use crate::config::ChromeConfig;
use crate::error::{ChromeError, ChromeResult};
use crate::resolver::{self, BookmarkKeywords, Resolution, ResolutionKind};
use crate::snapshot::{EditingSnapshot, InstanceState};
use crate::surfaces::{SearchRestore, SurfaceManager, TabsPanelKind};
use crate::tabs::{LoadFlags, TabEvent, TabEventKind, TabId, Tabs};
use crate::toolbar::{DynamicToolbar, PinReason, VisibilityTransition};

/// Top-level chrome mode. Exactly one holds at any time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChromeMode {
    Browsing,
    Editing,
}

/// A transient notification the host should surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChromeNotification {
    BookmarkAdded,
    BookmarkRemoved,
    ReadingListAdded,
    ReadingListRemoved,
}

/// The chrome-visibility coordinator.
pub struct ChromeCoordinator {
    /// Configuration flags. Consumed, not owned.
    config: ChromeConfig,
    /// Current chrome mode.
    mode: ChromeMode,
    /// Toolbar visibility policy.
    toolbar: DynamicToolbar,
    /// Surface visibility manager.
    surfaces: SurfaceManager,
    /// Address bar edit surface.
    address_bar: AddressBar,
    /// Animation generation registry.
    animations: Animations,
    /// Pending tab-switch target: the tab active when editing began.
    /// Consumed exactly once when editing ends.
    pending_target: Option<TabId>,
    /// Holder for the most recent live editing state. Tab snapshots
    /// are copied from here, never moved, because multiple listeners
    /// may read the previous state after a transition fires.
    last_editing_state: EditingSnapshot,
    /// Committed edit text awaiting asynchronous resolution.
    pending_commit: Option<String>,
    /// The chrome menu needs rebuilding.
    menu_dirty: bool,
    /// Transient notification awaiting display.
    pending_notification: Option<ChromeNotification>,
}

impl ChromeCoordinator {
    /// Create a coordinator.
    pub fn new(config: ChromeConfig) -> Self {
        let toolbar = DynamicToolbar::new(config.dynamic_toolbar, config.toolbar_height);
        Self {
            config,
            mode: ChromeMode::Browsing,
            toolbar,
            surfaces: SurfaceManager::new(),
            address_bar: AddressBar::new(),
            animations: Animations::new(),
            pending_target: None,
            last_editing_state: EditingSnapshot::default(),
            pending_commit: None,
            menu_dirty: false,
            pending_notification: None,
        }
    }

    /// Get the current chrome mode.
    pub fn mode(&self) -> ChromeMode {
        self.mode
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChromeConfig {
        &self.config
    }

    /// Get the toolbar policy.
    pub fn toolbar(&self) -> &DynamicToolbar {
        &self.toolbar
    }

    /// Get the toolbar policy mutably (scroll and relayout plumbing).
    pub fn toolbar_mut(&mut self) -> &mut DynamicToolbar {
        &mut self.toolbar
    }

    /// Get the surface manager.
    pub fn surfaces(&self) -> &SurfaceManager {
        &self.surfaces
    }

    /// Get the address bar.
    pub fn address_bar(&self) -> &AddressBar {
        &self.address_bar
    }

    /// Get the address bar mutably (text input plumbing).
    pub fn address_bar_mut(&mut self) -> &mut AddressBar {
        &mut self.address_bar
    }

    /// Pending tab-switch target, if editing is active.
    pub fn pending_target(&self) -> Option<TabId> {
        self.pending_target
    }

    /// Take the menu-dirty flag.
    pub fn take_menu_dirty(&mut self) -> bool {
        std::mem::take(&mut self.menu_dirty)
    }

    /// Take the pending transient notification.
    pub fn take_notification(&mut self) -> Option<ChromeNotification> {
        self.pending_notification.take()
    }

    // ------------------------------------------------------------------
    // Editing mode
    // ------------------------------------------------------------------

    /// Enter editing mode.
    ///
    /// No-op if already editing or while the toolbar-expand animation
    /// from a previous transition is still in flight. Seed text is the
    /// caller-supplied URL, else the selected tab's last user search
    /// term, else its URL, else empty. The selected tab may be absent
    /// transiently at startup; everything degrades to empty text.
    pub fn enter_editing(&mut self, tabs: &mut Tabs, seed: Option<&str>) {
        if self.mode == ChromeMode::Editing
            || self.animations.is_running(AnimationKind::ToolbarExpand)
        {
            return;
        }

        let (seed_text, target, panel_id, is_user_search) = match tabs.selected() {
            Some(tab) => {
                // Home-panel URLs are an implementation detail; seed
                // an empty editor instead of exposing them.
                let text = seed
                    .map(str::to_string)
                    .or_else(|| non_empty(tab.user_requested()))
                    .or_else(|| {
                        non_empty(tab.url()).filter(|url| !about_pages::is_about_home(url))
                    })
                    .unwrap_or_default();
                (
                    text,
                    Some(tab.id()),
                    tab.most_recent_home_panel().map(str::to_string),
                    !tab.user_requested().is_empty(),
                )
            }
            None => (seed.unwrap_or("").to_string(), None, None, false),
        };

        tracing::debug!(seed = %seed_text, target = ?target, "enter editing mode");
        self.pending_target = target;
        self.mode = ChromeMode::Editing;
        self.address_bar.start_editing(&seed_text);
        if let Some(tab) = tabs.selected_mut() {
            tab.set_editing(true);
        }

        let generation = self.animations.begin(AnimationKind::ToolbarExpand);
        self.toolbar.set_visible(true, VisibilityTransition::Animate);

        if is_user_search && self.config.search_term_experiment {
            self.surfaces.show_search_after_animation(generation);
        } else {
            if self.toolbar.is_enabled() {
                self.toolbar.set_visible(true, VisibilityTransition::Immediate);
            }
            self.surfaces.show_home(panel_id, Some(generation));
        }
    }

    /// The toolbar-expand animation finished; run deferred surface
    /// changes if the completion is still current.
    pub fn on_editing_animation_end(&mut self) {
        if let Some(generation) = self.animations.complete(AnimationKind::ToolbarExpand) {
            self.surfaces.on_chrome_animation_end(generation);
        }
        self.toolbar.finish_animation();
    }

    /// Commit the edit. Hides the editing surfaces, resolves the
    /// pending tab-switch target and stages the committed text for
    /// asynchronous URL/keyword resolution. Returns `true` when a
    /// navigation is pending; the host must then marshal
    /// [`finish_commit`](Self::finish_commit) back onto the UI loop.
    pub fn commit_editing(&mut self, tabs: &mut Tabs) -> bool {
        if self.mode != ChromeMode::Editing {
            return false;
        }

        let text = self.address_bar.commit_edit();
        tracing::debug!(text = %text, "commit editing mode");

        self.mode = ChromeMode::Browsing;
        self.animations.cancel(AnimationKind::ToolbarExpand);
        self.clear_editing_flags(tabs);

        self.surfaces.hide_search(SearchRestore::Content);
        let target_url = non_empty(&text);
        self.surfaces.hide_home(target_url.as_deref());

        self.select_target_tab(tabs);

        // The user committed a URL by hand; back navigation should no
        // longer return to a launching external application.
        if let Some(tab) = tabs.selected_mut() {
            tab.set_application_id(None);
        }

        self.pending_commit = target_url;
        self.pending_commit.is_some()
    }

    /// Complete a staged commit with the keyword store result. The
    /// lookup itself runs off the UI thread; this continuation is
    /// marshalled back by the host. The commit is not finished until
    /// this navigates.
    pub fn finish_commit(
        &mut self,
        tabs: &mut Tabs,
        keywords: &dyn BookmarkKeywords,
    ) -> Option<Resolution> {
        let text = self.pending_commit.take()?;
        let resolution = resolver::resolve(&text, keywords);

        match resolution.kind {
            ResolutionKind::KeywordSearch => {
                tracing::info!(url = %resolution.url, "keyword search");
                if let Some(tab) = tabs.selected_mut() {
                    if resolver::should_store_query(&text) {
                        tab.set_user_requested(&text);
                    }
                }
            }
            ResolutionKind::UserEntered => {
                if let Some(tab) = tabs.selected_mut() {
                    if resolver::is_search_query(&text) && resolver::should_store_query(&text) {
                        tab.set_user_requested(&text);
                    } else {
                        tab.set_user_requested("");
                    }
                }
            }
        }

        let events = tabs.load_url(&resolution.url, LoadFlags::USER_ENTERED);
        self.dispatch(tabs, &events);
        Some(resolution)
    }

    /// Cancel the edit and restore the surface state that was present
    /// before editing began.
    pub fn cancel_editing(&mut self, tabs: &mut Tabs) {
        if self.mode != ChromeMode::Editing {
            return;
        }

        tracing::debug!("cancel editing mode");
        self.address_bar.cancel_edit();
        self.mode = ChromeMode::Browsing;
        self.animations.cancel(AnimationKind::ToolbarExpand);
        self.surfaces.cancel_deferred();
        self.clear_editing_flags(tabs);

        self.surfaces.hide_search(SearchRestore::Content);
        self.update_home_pager_for_tab(tabs);
        self.select_target_tab(tabs);
    }

    /// Resolve the pending tab-switch target.
    ///
    /// A background tab may have been selected while editing was
    /// active (e.g. by a popup); selecting the recorded target on exit
    /// undoes that. Suppressed by configuration on large tablets,
    /// where the tab strip makes the temporary selection visible.
    fn select_target_tab(&mut self, tabs: &mut Tabs) {
        let target = self.pending_target.take();

        if !self.config.restore_edit_target_on_exit {
            return;
        }

        if let Some(id) = target {
            if !tabs.is_selected(id) && tabs.contains(id) {
                tracing::debug!(tab = ?id, "re-selecting editing target tab");
                let events = tabs.select(id);
                self.dispatch(tabs, &events);
            }
        }
    }

    /// Clear saved editing state on the tabs involved in the edit so
    /// a later selection does not spuriously restore it.
    fn clear_editing_flags(&mut self, tabs: &mut Tabs) {
        let involved = [self.pending_target, tabs.selected_id()];
        for id in involved.into_iter().flatten() {
            if let Some(tab) = tabs.get_mut(id) {
                tab.clear_editing_state();
            }
        }
    }

    // ------------------------------------------------------------------
    // Tab events
    // ------------------------------------------------------------------

    /// Dispatch a tab event to the coordinator.
    ///
    /// `event.tab` may be `None` only for the global `Restored`
    /// event; anything else is a contract violation by the event
    /// source and is reported as an error rather than ignored.
    pub fn on_tab_event(&mut self, tabs: &mut Tabs, event: TabEvent) -> ChromeResult<()> {
        let Some(id) = event.tab else {
            if event.kind == TabEventKind::Restored {
                tracing::info!("session restored");
                self.update_home_pager_for_tab(tabs);
                return Ok(());
            }
            return Err(ChromeError::EventContract { kind: event.kind });
        };

        if !tabs.contains(id) {
            // The tab disappeared mid-flight; degrade to a no-op.
            tracing::trace!(tab = ?id, kind = ?event.kind, "event for missing tab");
            return Ok(());
        }

        self.handle_event(tabs, id, event.kind);
        Ok(())
    }

    fn handle_event(&mut self, tabs: &mut Tabs, id: TabId, kind: TabEventKind) {
        tracing::trace!(tab = ?id, ?kind, "tab event");
        match kind {
            TabEventKind::Selected => self.on_tab_selected(tabs, id),
            TabEventKind::Unselected => self.on_tab_unselected(tabs, id),
            TabEventKind::LocationChange => {
                if tabs.is_selected(id) {
                    if let Some(tab) = tabs.get(id) {
                        let url = tab.url().to_string();
                        self.address_bar.set_url(&url);
                    }
                    self.update_home_pager_for_tab(tabs);
                }
                self.toolbar.persist_temporary_visibility();
            }
            TabEventKind::LoadStart => {
                if tabs.is_selected(id) {
                    self.menu_dirty = true;
                    if self.toolbar.is_enabled() {
                        self.toolbar.set_visible(true, VisibilityTransition::Animate);
                    }
                }
            }
            TabEventKind::LoadStop | TabEventKind::LoadError | TabEventKind::MenuUpdated => {
                if tabs.is_selected(id) {
                    self.menu_dirty = true;
                }
            }
            TabEventKind::PageShow => {
                if let Some(tab) = tabs.get_mut(id) {
                    tab.request_favicon_refresh();
                }
            }
            TabEventKind::BookmarkAdded => {
                self.notify(ChromeNotification::BookmarkAdded);
            }
            TabEventKind::BookmarkRemoved => {
                self.notify(ChromeNotification::BookmarkRemoved);
            }
            TabEventKind::ReadingListAdded => {
                self.notify(ChromeNotification::ReadingListAdded);
            }
            TabEventKind::ReadingListRemoved => {
                self.notify(ChromeNotification::ReadingListRemoved);
            }
            TabEventKind::Restored => {
                tracing::info!("session restored");
            }
        }
    }

    fn on_tab_selected(&mut self, tabs: &mut Tabs, id: TabId) {
        if tabs.is_selected(id) {
            if self.toolbar.is_enabled() {
                self.toolbar.set_visible(true, VisibilityTransition::Animate);
            }
            if let Some(tab) = tabs.get(id) {
                let url = tab.url().to_string();
                self.address_bar.set_url(&url);
            }
        }

        let snapshot_active = tabs
            .get(id)
            .and_then(|tab| tab.editing_snapshot())
            .is_some_and(|snapshot| snapshot.active);

        if snapshot_active && tabs.is_selected(id) {
            self.restore_editing_state(tabs, id);
        } else if self.mode == ChromeMode::Editing {
            if self.config.cancel_edit_on_tab_switch {
                self.cancel_edit_for_switch(tabs, id);
            }
            // Otherwise editing survives a background-tab selection;
            // the pending target undoes it on exit.
        } else if tabs.is_selected(id) {
            self.update_home_pager_for_tab(tabs);
        }

        self.toolbar.persist_temporary_visibility();
    }

    fn on_tab_unselected(&mut self, tabs: &mut Tabs, id: TabId) {
        // This runs before the incoming tab's Selected handler, so
        // the live editing state has not been touched yet. Copy it
        // into the holder and from there into the tab's snapshot in
        // one synchronous step.
        let editing = tabs.get(id).is_some_and(|tab| tab.is_editing());
        if !editing {
            return;
        }

        self.save_editing_state();
        if let Some(tab) = tabs.get_mut(id) {
            tab.editing_snapshot_mut().copy_from(&self.last_editing_state);
        }
    }

    fn save_editing_state(&mut self) {
        self.address_bar.save_editing_state(&mut self.last_editing_state);
        self.last_editing_state.search_shown = self.surfaces.is_search_visible();
    }

    fn restore_editing_state(&mut self, tabs: &mut Tabs, id: TabId) {
        if self.mode != ChromeMode::Editing {
            self.enter_editing(tabs, None);
        }

        let Some(snapshot) = tabs.get(id).and_then(|tab| tab.editing_snapshot()).cloned()
        else {
            return;
        };
        self.last_editing_state.copy_from(&snapshot);

        tracing::debug!(tab = ?id, "restoring editing state");
        self.address_bar.restore_editing_state(&self.last_editing_state);
        if let Some(tab) = tabs.get_mut(id) {
            tab.set_editing(true);
        }

        // Replay the sub-surface that was visible when the tab was
        // left. Must follow the edit-text restore.
        if self.last_editing_state.search_shown {
            self.surfaces.show_search();
        } else {
            let panel_id = tabs
                .get(id)
                .and_then(|tab| tab.most_recent_home_panel())
                .map(str::to_string);
            self.surfaces.hide_search(SearchRestore::Home(panel_id.clone()));
            self.surfaces.show_home(panel_id, None);
        }
    }

    /// Tablet policy: selecting a tab with no saved editing state
    /// cancels the edit locally. The new selection is kept, so the
    /// pending target is dropped rather than consumed.
    fn cancel_edit_for_switch(&mut self, tabs: &mut Tabs, id: TabId) {
        tracing::debug!(tab = ?id, "tab switch cancels editing");
        self.address_bar.cancel_edit();
        self.mode = ChromeMode::Browsing;
        self.animations.cancel(AnimationKind::ToolbarExpand);
        self.surfaces.cancel_deferred();
        self.pending_target = None;

        if let Some(tab) = tabs.get_mut(id) {
            tab.clear_editing_state();
        }

        self.surfaces.hide_search(SearchRestore::Content);
        self.update_home_pager_for_tab(tabs);
    }

    /// Show or hide the home panel for the selected tab's URL.
    ///
    /// Editing mode and the tabs panel own the surfaces while they
    /// are up; visibility is reconciled when they exit.
    fn update_home_pager_for_tab(&mut self, tabs: &Tabs) {
        if self.mode == ChromeMode::Editing || self.surfaces.is_tabs_visible() {
            return;
        }

        let Some(tab) = tabs.selected() else {
            self.surfaces.show_content();
            return;
        };

        if about_pages::is_about_home(tab.url()) {
            let panel_id = about_pages::panel_id_from_url(tab.url())
                .or_else(|| tab.most_recent_home_panel().map(str::to_string));
            if self.toolbar.is_enabled() {
                self.toolbar.set_visible(true, VisibilityTransition::Animate);
            }
            self.surfaces.show_home(panel_id, None);
        } else {
            self.surfaces.show_content();
        }
    }

    /// The user picked a different panel inside the home pager.
    pub fn on_home_panel_selected(&mut self, tabs: &mut Tabs, panel_id: &str) {
        self.surfaces.show_home(Some(panel_id.to_string()), None);
        if let Some(tab) = tabs.selected_mut() {
            tab.set_most_recent_home_panel(Some(panel_id.to_string()));
        }
    }

    fn notify(&mut self, notification: ChromeNotification) {
        if self.surfaces.notifications_enabled() {
            self.pending_notification = Some(notification);
        }
    }

    fn dispatch(&mut self, tabs: &mut Tabs, events: &[TabEvent]) {
        for event in events {
            if let Some(id) = event.tab {
                if tabs.contains(id) {
                    self.handle_event(tabs, id, event.kind);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Tabs panel
    // ------------------------------------------------------------------

    /// Show the tab-switcher panel. No-op when there are no tabs to
    /// display.
    pub fn show_tabs(&mut self, tabs: &Tabs, kind: TabsPanelKind) {
        if tabs.display_count() == 0 || self.surfaces.is_tabs_visible() {
            return;
        }

        self.surfaces.show_tabs(kind, tabs.display_count());
        self.animations.begin(AnimationKind::TabsSlide);
        self.toolbar.set_pinned(true, PinReason::Relayout);
        self.toolbar.set_visible(true, VisibilityTransition::Animate);
    }

    /// Begin hiding the tab-switcher panel.
    pub fn hide_tabs(&mut self) {
        if !self.surfaces.is_tabs_visible() {
            return;
        }

        self.surfaces.hide_tabs();
        self.animations.begin(AnimationKind::TabsSlide);
        self.toolbar.set_pinned(false, PinReason::Relayout);
    }

    /// Hide the tabs panel if it is showing, e.g. because the user
    /// touched the content area. Returns whether it was showing.
    pub fn auto_hide_tabs(&mut self) -> bool {
        if self.surfaces.is_tabs_visible() {
            self.hide_tabs();
            true
        } else {
            false
        }
    }

    /// The tabs panel slide finished.
    pub fn on_tabs_animation_end(&mut self, tabs: &mut Tabs) {
        if self.animations.complete(AnimationKind::TabsSlide).is_none() {
            return;
        }

        if self.surfaces.is_tabs_visible() {
            // Cancel editing once the panel is fully open; cancelling
            // mid-slide causes visible glitches.
            self.cancel_editing(tabs);
        } else {
            self.surfaces.finish_tabs_hide();
            self.update_home_pager_for_tab(tabs);
        }
    }

    // ------------------------------------------------------------------
    // Toolbar plumbing
    // ------------------------------------------------------------------

    /// Forward a content scroll/pan gesture to the toolbar policy.
    /// Ignored while editing: the toolbar must stay expanded.
    pub fn on_content_scroll(&mut self, delta: f32) {
        if self.mode == ChromeMode::Editing {
            return;
        }
        self.toolbar.on_scroll(delta);
    }

    /// Enter or leave full-screen content mode.
    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.toolbar.set_pinned(fullscreen, PinReason::FullScreen);
    }

    /// An action mode (contextual selection toolbar) started or ended.
    pub fn set_action_mode_active(&mut self, active: bool) {
        self.toolbar.set_pinned(active, PinReason::ActionMode);
        if active {
            self.toolbar.set_visible(true, VisibilityTransition::Immediate);
        }
    }

    /// Accessibility (touch exploration) was enabled or disabled.
    pub fn set_accessibility_enabled(&mut self, enabled: bool) {
        self.toolbar.set_pinned(enabled, PinReason::Accessibility);
    }

    // ------------------------------------------------------------------
    // Instance state
    // ------------------------------------------------------------------

    /// Save persisted UI state into the host's instance-state bag.
    pub fn save_instance_state(&self, bag: &mut HashMap<String, String>) {
        let state = InstanceState {
            home_top_padding: self.surfaces.home_top_padding(),
            toolbar_visible: self.toolbar.is_visible(),
        };
        state.save(bag);
    }

    /// Restore persisted UI state from the host's instance-state bag.
    pub fn restore_instance_state(&mut self, bag: &HashMap<String, String>) {
        let state = InstanceState::restore(bag);
        self.surfaces.set_home_top_padding(state.home_top_padding);
        if self.toolbar.is_enabled() {
            self.toolbar
                .set_visible(state.toolbar_visible, VisibilityTransition::Immediate);
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
