//! Chrome shell - a scripted host session driving the chrome coordinator.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use parking_lot::Mutex;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use chrome::resolver::BookmarkKeywords;
use chrome::surfaces::TabsPanelKind;
use chrome::tabs::TabEvent;
use chrome::toolbar::ToolbarListener;
use chrome::{ChromeConfig, ChromeCoordinator, ChromeResult, Tabs};

/// Chrome shell - drives the browser chrome coordinator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Text to commit in the address bar
    #[arg(default_value = "fb cute cats")]
    input: String,

    /// Use the large-tablet chrome configuration
    #[arg(long)]
    tablet: bool,

    /// Disable the scroll-hiding dynamic toolbar
    #[arg(long)]
    static_toolbar: bool,

    /// Show the search overlay when editing a previous search term
    #[arg(long)]
    search_term_experiment: bool,

    /// JSON file mapping bookmark keywords to URL templates
    #[arg(long)]
    keywords: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Keyword store backed by an in-memory map, optionally loaded from a
/// JSON file.
struct KeywordStore(HashMap<String, String>);

impl KeywordStore {
    fn builtin() -> Self {
        let mut map = HashMap::new();
        map.insert(
            "fb".to_string(),
            "https://search.example.com/?q=%s".to_string(),
        );
        Self(map)
    }

    fn from_file(path: &str) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading keyword file {path}"))?;
        let map = serde_json::from_str(&data)
            .with_context(|| format!("parsing keyword file {path}"))?;
        Ok(Self(map))
    }
}

impl BookmarkKeywords for KeywordStore {
    fn url_for_keyword(&self, keyword: &str) -> ChromeResult<Option<String>> {
        Ok(self.0.get(keyword).cloned())
    }
}

/// Mirrors the toolbar offset into a slot the compositor thread of a
/// real host would read.
struct OffsetMirror(Arc<Mutex<f32>>);

impl ToolbarListener for OffsetMirror {
    fn toolbar_offset_changed(&mut self, offset: f32) {
        *self.0.lock() = offset;
    }
}

fn dispatch(chrome: &mut ChromeCoordinator, tabs: &mut Tabs, events: Vec<TabEvent>) -> Result<()> {
    for event in events {
        chrome.on_tab_event(tabs, event)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Chrome shell v{}", chrome::VERSION);

    let mut config = if args.tablet {
        ChromeConfig::tablet()
    } else {
        ChromeConfig::default()
    };
    if args.static_toolbar {
        config = config.with_dynamic_toolbar(false);
    }
    if args.search_term_experiment {
        config = config.with_search_term_experiment(true);
    }

    let mut chrome = ChromeCoordinator::new(config);
    let mut tabs = Tabs::new();

    let content_offset = Arc::new(Mutex::new(0.0_f32));
    chrome
        .toolbar_mut()
        .add_listener(Box::new(OffsetMirror(content_offset.clone())));

    // A fresh session starts on the home panel.
    tabs.add_tab("about:home", false);
    chrome.on_tab_event(&mut tabs, TabEvent::restored())?;
    info!(surface = ?chrome.surfaces().foreground(), "session restored");

    // The user taps the address bar and types.
    chrome.enter_editing(&mut tabs, None);
    chrome.on_editing_animation_end();
    chrome.address_bar_mut().set_input(&args.input);
    info!(input = %args.input, "editing");

    // Commit. The keyword store load is blocking I/O, so it runs off
    // the event loop before the commit finishes on it.
    if chrome.commit_editing(&mut tabs) {
        let keyword_path = args.keywords.clone();
        let store = tokio::task::spawn_blocking(move || match keyword_path {
            Some(path) => KeywordStore::from_file(&path),
            None => Ok(KeywordStore::builtin()),
        })
        .await??;

        if let Some(resolution) = chrome.finish_commit(&mut tabs, &store) {
            info!(url = %resolution.url, kind = ?resolution.kind, "navigating");
        }
    }

    // Scroll the page; the toolbar hides, then a reverse fling
    // reveals it again.
    chrome.on_content_scroll(120.0);
    info!(offset = *content_offset.lock(), "scrolled down");
    chrome.on_content_scroll(-120.0);
    info!(offset = *content_offset.lock(), "scrolled up");

    // Open and close the tab switcher.
    chrome.show_tabs(&tabs, TabsPanelKind::Normal);
    chrome.on_tabs_animation_end(&mut tabs);
    info!(
        height = chrome.surfaces().tabs_panel_height(),
        "tabs panel open"
    );
    chrome.hide_tabs();
    chrome.on_tabs_animation_end(&mut tabs);

    // Switch to a second tab and back.
    let first = tabs.selected_id().context("a tab is selected")?;
    let second = tabs.add_tab("https://example.com/news", false);
    let events = tabs.select(first);
    dispatch(&mut chrome, &mut tabs, events)?;
    let events = tabs.select(second);
    dispatch(&mut chrome, &mut tabs, events)?;

    info!(
        mode = ?chrome.mode(),
        surface = ?chrome.surfaces().foreground(),
        url = %chrome.address_bar().url(),
        "session finished"
    );
    debug_assert!(chrome.surfaces().check_invariants());

    Ok(())
}
