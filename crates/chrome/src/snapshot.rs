//! Per-tab editing state and persisted chrome state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-tab snapshot of the address bar editing state.
///
/// Captured when editing is interrupted (e.g. by a tab switch) so the
/// edit can be restored when the tab is re-selected. Snapshots are
/// copied, not moved, between the "last editing state" holder and a
/// tab: multiple listeners may still read the previous snapshot after
/// a transition fires.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EditingSnapshot {
    /// Whether editing mode was active when the snapshot was taken.
    pub active: bool,
    /// In-progress edit text.
    pub text: String,
    /// Cursor position.
    pub cursor: usize,
    /// Selection range.
    pub selection: Option<(usize, usize)>,
    /// Whether the search-suggestions surface was visible.
    pub search_shown: bool,
}

impl EditingSnapshot {
    /// Copy another snapshot's fields into this one.
    pub fn copy_from(&mut self, other: &EditingSnapshot) {
        self.active = other.active;
        self.text = other.text.clone();
        self.cursor = other.cursor;
        self.selection = other.selection;
        self.search_shown = other.search_shown;
    }

    /// Reset to the inactive state.
    pub fn clear(&mut self) {
        *self = EditingSnapshot::default();
    }
}

/// Instance-state bag key for the home panel top padding.
pub const STATE_HOME_TOP_PADDING: &str = "chrome.home_top_padding";

/// Instance-state bag key for the toolbar visibility snapshot.
pub const STATE_TOOLBAR_VISIBLE: &str = "chrome.toolbar_visible";

/// Chrome state persisted across process restart.
///
/// Saved and restored opaquely through the host's instance-state
/// mechanism as a flat key-value bag with two keys.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstanceState {
    /// Top padding of the home panel container, in pixels.
    pub home_top_padding: f32,
    /// Whether the dynamic toolbar was visible.
    pub toolbar_visible: bool,
}

impl InstanceState {
    /// Write both keys into the host's state bag.
    pub fn save(&self, bag: &mut HashMap<String, String>) {
        bag.insert(
            STATE_HOME_TOP_PADDING.to_string(),
            self.home_top_padding.to_string(),
        );
        bag.insert(
            STATE_TOOLBAR_VISIBLE.to_string(),
            self.toolbar_visible.to_string(),
        );
    }

    /// Read the bag, falling back to defaults for missing or
    /// unparseable keys.
    pub fn restore(bag: &HashMap<String, String>) -> Self {
        let home_top_padding = bag
            .get(STATE_HOME_TOP_PADDING)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.0);
        let toolbar_visible = bag
            .get(STATE_TOOLBAR_VISIBLE)
            .and_then(|v| v.parse().ok())
            .unwrap_or(true);

        Self {
            home_top_padding,
            toolbar_visible,
        }
    }
}

impl Default for InstanceState {
    fn default() -> Self {
        Self {
            home_top_padding: 0.0,
            toolbar_visible: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_copy_from() {
        let mut snapshot = EditingSnapshot::default();
        let source = EditingSnapshot {
            active: true,
            text: "hello".to_string(),
            cursor: 5,
            selection: Some((0, 5)),
            search_shown: true,
        };

        snapshot.copy_from(&source);
        assert_eq!(snapshot, source);

        // The source must remain readable after the copy.
        assert_eq!(source.text, "hello");
    }

    #[test]
    fn test_snapshot_clear() {
        let mut snapshot = EditingSnapshot {
            active: true,
            text: "abc".to_string(),
            ..Default::default()
        };

        snapshot.clear();
        assert!(!snapshot.active);
        assert!(snapshot.text.is_empty());
    }

    #[test]
    fn test_snapshot_serializes() {
        let snapshot = EditingSnapshot {
            active: true,
            text: "hello".to_string(),
            cursor: 5,
            selection: None,
            search_shown: false,
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: EditingSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_instance_state_round_trip() {
        let state = InstanceState {
            home_top_padding: 42.5,
            toolbar_visible: false,
        };

        let mut bag = HashMap::new();
        state.save(&mut bag);
        assert_eq!(bag.len(), 2);

        assert_eq!(InstanceState::restore(&bag), state);
    }

    #[test]
    fn test_instance_state_defaults_on_empty_bag() {
        let state = InstanceState::restore(&HashMap::new());
        assert_eq!(state, InstanceState::default());
    }
}
