//! Dynamic toolbar visibility policy.
//!
//! The toolbar may auto-hide on scroll. A pin registry of named
//! reasons forces it visible regardless of scroll gestures while any
//! reason is pinned. Dependent surfaces register listeners and are
//! notified on every offset change, including intermediate frames,
//! because the toolbar may be mid-drag under direct manipulation.

use std::collections::HashSet;

/// Toolbar visibility state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolbarVisibility {
    Visible,
    Hidden,
    /// Visible due to a temporary cause (scroll reveal) that should
    /// revert once the cause ends, unless persisted first.
    TransientlyVisible,
}

/// How a visibility change is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisibilityTransition {
    Immediate,
    Animate,
}

/// Reasons the toolbar can be pinned visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PinReason {
    FullScreen,
    ActionMode,
    Relayout,
    Accessibility,
}

/// Receives the toolbar's animated position so dependent screen
/// offsets (content surface, progress indicator, input-assist popup)
/// stay synchronized.
pub trait ToolbarListener {
    /// Called on every offset change. `offset` is 0.0 when fully
    /// shown and `-height` when fully hidden.
    fn toolbar_offset_changed(&mut self, offset: f32);
}

/// Dynamic toolbar state.
pub struct DynamicToolbar {
    /// Whether scroll-driven auto-hide is enabled.
    enabled: bool,
    /// Current visibility state.
    visibility: ToolbarVisibility,
    /// Pinned reasons. Non-empty forces the toolbar visible.
    pins: HashSet<PinReason>,
    /// Toolbar height in pixels.
    height: f32,
    /// Current vertical offset: 0 shown, -height hidden.
    offset: f32,
    /// In-flight visibility animation.
    animating: bool,
    /// Animation start offset.
    animation_from: f32,
    /// Animation target offset.
    animation_target: f32,
    /// Offset listeners.
    listeners: Vec<Box<dyn ToolbarListener>>,
}

impl DynamicToolbar {
    /// Create a toolbar policy.
    pub fn new(enabled: bool, height: f32) -> Self {
        Self {
            enabled,
            visibility: ToolbarVisibility::Visible,
            pins: HashSet::new(),
            height,
            offset: 0.0,
            animating: false,
            animation_from: 0.0,
            animation_target: 0.0,
            listeners: Vec::new(),
        }
    }

    /// Check whether auto-hide is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable auto-hide. Disabling forces the toolbar
    /// visible immediately.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.set_visible(true, VisibilityTransition::Immediate);
        }
    }

    /// Get the current visibility state.
    pub fn visibility(&self) -> ToolbarVisibility {
        self.visibility
    }

    /// Check whether the toolbar currently occupies the screen.
    pub fn is_visible(&self) -> bool {
        self.visibility != ToolbarVisibility::Hidden
    }

    /// Get the current offset.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Get the toolbar height.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Set the toolbar height after a relayout.
    pub fn set_height(&mut self, height: f32) {
        self.height = height;
        if self.visibility == ToolbarVisibility::Hidden {
            self.apply_offset(-height);
        }
    }

    /// Register a dependent-surface listener. The listener is synced
    /// to the current offset immediately.
    pub fn add_listener(&mut self, mut listener: Box<dyn ToolbarListener>) {
        listener.toolbar_offset_changed(self.offset);
        self.listeners.push(listener);
    }

    /// Check whether any reason is pinned.
    pub fn is_pinned(&self) -> bool {
        !self.pins.is_empty()
    }

    /// Add or remove a pin reason.
    ///
    /// Pinning forces the toolbar visible. When the registry becomes
    /// empty, a transient visibility is persisted and scroll events
    /// regain control.
    pub fn set_pinned(&mut self, pin: bool, reason: PinReason) {
        if pin {
            self.pins.insert(reason);
            tracing::debug!(?reason, "toolbar pinned");
            self.set_visible(true, VisibilityTransition::Immediate);
        } else {
            self.pins.remove(&reason);
            tracing::debug!(?reason, "toolbar unpinned");
            if self.pins.is_empty() {
                self.persist_temporary_visibility();
            }
        }
    }

    /// Show or hide the toolbar.
    ///
    /// Hide requests are ignored while pinned or while auto-hide is
    /// disabled.
    pub fn set_visible(&mut self, show: bool, transition: VisibilityTransition) {
        if !show && (self.is_pinned() || !self.enabled) {
            tracing::trace!("ignoring toolbar hide while pinned or static");
            return;
        }

        let target = if show { 0.0 } else { -self.height };
        self.visibility = if show {
            ToolbarVisibility::Visible
        } else {
            ToolbarVisibility::Hidden
        };

        match transition {
            VisibilityTransition::Immediate => {
                self.animating = false;
                self.apply_offset(target);
            }
            VisibilityTransition::Animate => {
                if self.offset == target {
                    // Already there. Repeated animated shows (page
                    // loads, tab selections) must not leave a phantom
                    // animation blocking scroll input.
                    self.animating = false;
                    return;
                }
                // Restarting replaces any in-flight visibility animation.
                self.animating = true;
                self.animation_from = self.offset;
                self.animation_target = target;
            }
        }
    }

    /// Advance an in-flight visibility animation. `fraction` runs
    /// from 0.0 to 1.0.
    pub fn animate_frame(&mut self, fraction: f32) {
        if !self.animating {
            return;
        }
        let fraction = fraction.clamp(0.0, 1.0);
        let offset =
            self.animation_from + (self.animation_target - self.animation_from) * fraction;
        self.apply_offset(offset);
    }

    /// Complete an in-flight visibility animation.
    pub fn finish_animation(&mut self) {
        if !self.animating {
            return;
        }
        self.animating = false;
        self.apply_offset(self.animation_target);
    }

    /// Check whether a visibility animation is in flight.
    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// React to a scroll/pan gesture. Positive deltas scroll content
    /// down and hide the toolbar.
    pub fn on_scroll(&mut self, delta: f32) {
        if !self.enabled || self.is_pinned() {
            return;
        }

        // Direct manipulation takes over from an in-flight visibility
        // animation, continuing from the current offset.
        self.animating = false;

        let offset = (self.offset - delta).clamp(-self.height, 0.0);
        self.apply_offset(offset);

        if offset <= -self.height {
            self.visibility = ToolbarVisibility::Hidden;
        } else if offset >= 0.0 && self.visibility == ToolbarVisibility::Hidden {
            // Revealed by the gesture, not by an explicit request.
            self.visibility = ToolbarVisibility::TransientlyVisible;
        }
    }

    /// Promote a transient visibility to a persistent one.
    pub fn persist_temporary_visibility(&mut self) {
        if self.visibility == ToolbarVisibility::TransientlyVisible {
            self.visibility = ToolbarVisibility::Visible;
        }
    }

    fn apply_offset(&mut self, offset: f32) {
        self.offset = offset;
        for listener in &mut self.listeners {
            listener.toolbar_offset_changed(offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RecordingListener(Rc<RefCell<Vec<f32>>>);

    impl ToolbarListener for RecordingListener {
        fn toolbar_offset_changed(&mut self, offset: f32) {
            self.0.borrow_mut().push(offset);
        }
    }

    #[test]
    fn test_hide_and_show() {
        let mut toolbar = DynamicToolbar::new(true, 56.0);
        assert_eq!(toolbar.visibility(), ToolbarVisibility::Visible);

        toolbar.set_visible(false, VisibilityTransition::Immediate);
        assert_eq!(toolbar.visibility(), ToolbarVisibility::Hidden);
        assert_eq!(toolbar.offset(), -56.0);

        toolbar.set_visible(true, VisibilityTransition::Immediate);
        assert_eq!(toolbar.visibility(), ToolbarVisibility::Visible);
        assert_eq!(toolbar.offset(), 0.0);
    }

    #[test]
    fn test_hide_ignored_when_disabled() {
        let mut toolbar = DynamicToolbar::new(false, 56.0);

        toolbar.set_visible(false, VisibilityTransition::Immediate);
        assert_eq!(toolbar.visibility(), ToolbarVisibility::Visible);
    }

    #[test]
    fn test_pin_stacking() {
        let mut toolbar = DynamicToolbar::new(true, 56.0);
        toolbar.set_pinned(true, PinReason::FullScreen);
        toolbar.set_pinned(true, PinReason::ActionMode);

        toolbar.set_visible(false, VisibilityTransition::Immediate);
        assert_eq!(toolbar.visibility(), ToolbarVisibility::Visible);

        toolbar.set_pinned(false, PinReason::FullScreen);
        toolbar.set_visible(false, VisibilityTransition::Immediate);
        assert_eq!(toolbar.visibility(), ToolbarVisibility::Visible);

        toolbar.set_pinned(false, PinReason::ActionMode);
        toolbar.set_visible(false, VisibilityTransition::Immediate);
        assert_eq!(toolbar.visibility(), ToolbarVisibility::Hidden);
    }

    #[test]
    fn test_scroll_ignored_while_pinned() {
        let mut toolbar = DynamicToolbar::new(true, 56.0);
        toolbar.set_pinned(true, PinReason::Accessibility);

        toolbar.on_scroll(100.0);
        assert_eq!(toolbar.offset(), 0.0);
        assert_eq!(toolbar.visibility(), ToolbarVisibility::Visible);
    }

    #[test]
    fn test_scroll_hides_and_reveals_transiently() {
        let mut toolbar = DynamicToolbar::new(true, 56.0);

        toolbar.on_scroll(100.0);
        assert_eq!(toolbar.visibility(), ToolbarVisibility::Hidden);
        assert_eq!(toolbar.offset(), -56.0);

        toolbar.on_scroll(-100.0);
        assert_eq!(toolbar.visibility(), ToolbarVisibility::TransientlyVisible);

        toolbar.persist_temporary_visibility();
        assert_eq!(toolbar.visibility(), ToolbarVisibility::Visible);
    }

    #[test]
    fn test_listeners_notified_per_frame() {
        let offsets = Rc::new(RefCell::new(Vec::new()));
        let mut toolbar = DynamicToolbar::new(true, 56.0);
        toolbar.add_listener(Box::new(RecordingListener(offsets.clone())));

        toolbar.set_visible(false, VisibilityTransition::Animate);
        toolbar.animate_frame(0.5);
        toolbar.finish_animation();

        // Initial sync, the intermediate frame, and the final frame.
        assert_eq!(*offsets.borrow(), vec![0.0, -28.0, -56.0]);
    }

    #[test]
    fn test_animated_show_at_target_keeps_scroll_alive() {
        let mut toolbar = DynamicToolbar::new(true, 56.0);

        // A page load re-requests the already-shown toolbar.
        toolbar.set_visible(true, VisibilityTransition::Animate);
        assert!(!toolbar.is_animating());

        toolbar.on_scroll(120.0);
        assert_eq!(toolbar.visibility(), ToolbarVisibility::Hidden);
        assert_eq!(toolbar.offset(), -56.0);
    }

    #[test]
    fn test_scroll_takes_over_running_animation() {
        let mut toolbar = DynamicToolbar::new(true, 56.0);
        toolbar.on_scroll(100.0);

        toolbar.set_visible(true, VisibilityTransition::Animate);
        assert!(toolbar.is_animating());

        toolbar.on_scroll(-10.0);
        assert!(!toolbar.is_animating());
        assert_eq!(toolbar.offset(), -46.0);
    }

    #[test]
    fn test_stale_animation_frames_after_finish() {
        let mut toolbar = DynamicToolbar::new(true, 56.0);
        toolbar.set_visible(false, VisibilityTransition::Animate);
        toolbar.finish_animation();

        toolbar.animate_frame(0.5);
        assert_eq!(toolbar.offset(), -56.0);
    }
}
