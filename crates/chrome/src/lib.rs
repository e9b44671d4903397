//! Chrome-visibility coordinator for the mobile browser shell.
//!
//! This crate decides which chrome surface is visible, focused and
//! receiving input at any instant:
//! - Web content vs. the home (start page) panel
//! - The address bar editing overlay and its search-suggestions panel
//! - The modal tab-switcher panel
//! - The scroll-hiding dynamic toolbar
//!
//! Page rendering, navigation, bookmark storage and menu construction
//! are external collaborators; the coordinator only consumes their
//! signals and drives show/hide/focus state.

pub mod about_pages;
pub mod address_bar;
pub mod animation;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod resolver;
pub mod snapshot;
pub mod surfaces;
pub mod tabs;
pub mod toolbar;

pub use config::ChromeConfig;
pub use coordinator::{ChromeCoordinator, ChromeMode};
pub use error::{ChromeError, ChromeResult};
pub use surfaces::SurfaceManager;
pub use tabs::{Tab, TabId, Tabs};
pub use toolbar::DynamicToolbar;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
