//! Address bar edit surface.

use crate::snapshot::EditingSnapshot;

/// Address bar.
///
/// Displays the current URL while browsing and becomes a text editor
/// in editing mode. The coordinator owns the Browsing/Editing
/// decision; this type only holds the text state.
pub struct AddressBar {
    /// Displayed URL.
    url: String,
    /// Input text while editing.
    input: String,
    /// Is in editing mode.
    editing: bool,
    /// Cursor position.
    cursor: usize,
    /// Selection range.
    selection: Option<(usize, usize)>,
}

impl AddressBar {
    /// Create a new address bar.
    pub fn new() -> Self {
        Self {
            url: String::new(),
            input: String::new(),
            editing: false,
            cursor: 0,
            selection: None,
        }
    }

    /// Get the displayed URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Set the displayed URL.
    pub fn set_url(&mut self, url: &str) {
        self.url = url.to_string();
        if !self.editing {
            self.input = url.to_string();
        }
    }

    /// Get the input text.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Check if in editing mode.
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Get cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Get selection.
    pub fn selection(&self) -> Option<(usize, usize)> {
        self.selection
    }

    /// Begin editing with the given seed text, selecting all of it.
    pub fn start_editing(&mut self, seed: &str) {
        self.editing = true;
        self.input = seed.to_string();
        self.cursor = self.input.len();
        self.selection = if self.input.is_empty() {
            None
        } else {
            Some((0, self.input.len()))
        };
    }

    /// Replace the input text.
    pub fn set_input(&mut self, input: &str) {
        self.input = input.to_string();
        self.cursor = self.input.len();
        self.selection = None;
    }

    /// Insert text at the cursor, replacing any selection.
    pub fn insert(&mut self, text: &str) {
        if let Some((start, end)) = self.selection.take() {
            self.input.replace_range(start..end, "");
            self.cursor = start;
        }
        self.input.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    /// Delete the selection or the character before the cursor.
    pub fn backspace(&mut self) {
        if let Some((start, end)) = self.selection.take() {
            self.input.replace_range(start..end, "");
            self.cursor = start;
        } else if self.cursor > 0 {
            // The cursor is a byte index; step back one whole char.
            let previous = self.input[..self.cursor]
                .char_indices()
                .next_back()
                .map_or(0, |(index, _)| index);
            self.input.replace_range(previous..self.cursor, "");
            self.cursor = previous;
        }
    }

    /// Commit the edit, returning the committed text.
    pub fn commit_edit(&mut self) -> String {
        let text = self.input.clone();
        self.editing = false;
        self.selection = None;
        text
    }

    /// Cancel the edit, reverting the input to the displayed URL.
    pub fn cancel_edit(&mut self) {
        self.editing = false;
        self.selection = None;
        self.input = self.url.clone();
    }

    /// Copy the live editing state into a snapshot.
    pub fn save_editing_state(&self, snapshot: &mut EditingSnapshot) {
        snapshot.active = self.editing;
        snapshot.text = self.input.clone();
        snapshot.cursor = self.cursor;
        snapshot.selection = self.selection;
    }

    /// Replay a snapshot into the edit surface.
    ///
    /// Positions from the snapshot are clamped onto char boundaries:
    /// the snapshot may have been persisted by an older build against
    /// different text.
    pub fn restore_editing_state(&mut self, snapshot: &EditingSnapshot) {
        self.editing = snapshot.active;
        self.input = snapshot.text.clone();
        self.cursor = clamp_to_boundary(&self.input, snapshot.cursor);
        self.selection = snapshot.selection.map(|(start, end)| {
            (
                clamp_to_boundary(&self.input, start),
                clamp_to_boundary(&self.input, end),
            )
        });
    }
}

/// Move a byte position back onto the nearest char boundary at or
/// before it.
fn clamp_to_boundary(text: &str, position: usize) -> usize {
    let mut position = position.min(text.len());
    while !text.is_char_boundary(position) {
        position -= 1;
    }
    position
}

impl Default for AddressBar {
    fn default() -> Self {
        Self::new()
    }
}
