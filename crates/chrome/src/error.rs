//! Coordinator error types.

use thiserror::Error;

use crate::tabs::{TabEventKind, TabId};

/// Main error type for the chrome coordinator.
#[derive(Error, Debug)]
pub enum ChromeError {
    /// An event that requires a tab arrived without one. This is a
    /// contract violation by the event source and is fatal to the
    /// caller rather than silently ignored.
    #[error("tab event {kind:?} must specify a tab")]
    EventContract { kind: TabEventKind },

    #[error("no tab with id {0:?}")]
    UnknownTab(TabId),

    #[error("bookmark keyword lookup failed: {0}")]
    KeywordLookup(String),
}

pub type ChromeResult<T> = Result<T, ChromeError>;

impl ChromeError {
    pub fn keyword_lookup(msg: impl Into<String>) -> Self {
        Self::KeywordLookup(msg.into())
    }
}
