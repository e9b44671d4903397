//! Generation-token bookkeeping for chrome animations.
//!
//! Starting a new transition of the same animation kind cancels the
//! previous one: deferred continuations carry the generation they
//! were scheduled under and become no-ops when it is stale.

/// Kinds of chrome transition animations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationKind {
    /// Toolbar expand/contract when entering or leaving editing mode.
    ToolbarExpand,
    /// Tabs panel slide.
    TabsSlide,
}

impl AnimationKind {
    fn index(self) -> usize {
        match self {
            AnimationKind::ToolbarExpand => 0,
            AnimationKind::TabsSlide => 1,
        }
    }
}

const KIND_COUNT: usize = 2;

#[derive(Clone, Copy, Debug, Default)]
struct AnimationState {
    generation: u64,
    running: bool,
}

/// Per-kind animation registry.
#[derive(Debug, Default)]
pub struct Animations {
    states: [AnimationState; KIND_COUNT],
}

impl Animations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an animation of the given kind, cancelling any running
    /// animation of the same kind. Returns the new generation.
    pub fn begin(&mut self, kind: AnimationKind) -> u64 {
        let state = &mut self.states[kind.index()];
        if state.running {
            tracing::trace!(?kind, generation = state.generation, "cancel running animation");
        }
        state.generation += 1;
        state.running = true;
        state.generation
    }

    /// Mark the running animation of this kind complete, returning
    /// its generation. Returns `None` if nothing was running, e.g.
    /// because a stale completion callback fired after cancellation.
    pub fn complete(&mut self, kind: AnimationKind) -> Option<u64> {
        let state = &mut self.states[kind.index()];
        if !state.running {
            return None;
        }
        state.running = false;
        Some(state.generation)
    }

    /// Cancel a running animation without completing it.
    pub fn cancel(&mut self, kind: AnimationKind) {
        self.states[kind.index()].running = false;
    }

    /// Check whether an animation of this kind is in flight.
    pub fn is_running(&self, kind: AnimationKind) -> bool {
        self.states[kind.index()].running
    }
}
