//! Application state

use std::time::Duration;

use tracing::{debug, info};

use crate::async_io::{QueryManager, QueryRequest};
use crate::config::Config;
use crate::query::{parent_path, DirectoryQueryClient};
use crate::ui::{ListLayout, Theme};

use super::explorer::{ExplorerEvent, ExplorerOptions, ExplorerState};

/// Most recent paths kept for `go_back`
const HISTORY_LIMIT: usize = 100;

/// A navigation waiting for its listing
#[derive(Debug)]
struct PendingNavigation {
    generation: u64,
    path: String,
    /// Entry to select once the listing arrives
    focus: Option<String>,
    /// What to do with the history once the listing arrives
    history: HistoryUpdate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryUpdate {
    Keep,
    /// Push the path being left
    Record,
    /// Drop the entry being returned to
    Pop,
}

/// Main application state
///
/// Owns the current path: the explorer only reports which directory the
/// user wants to enter, and the path changes once that listing arrives.
pub struct App {
    pub config: Config,
    pub theme: Theme,
    pub explorer: ExplorerState,
    queries: QueryManager,
    current_path: String,
    history: Vec<String>,
    pending: Option<PendingNavigation>,
    /// Where the list was last drawn, for mouse hit-testing
    pub list_layout: ListLayout,
    pub should_quit: bool,
}

impl App {
    /// Create the application and request the first listing
    pub fn new(config: Config, client: Box<dyn DirectoryQueryClient>, start_path: &str) -> Self {
        let theme = config.theme.build_theme();
        let queries = QueryManager::new(client);
        let options = ExplorerOptions {
            location_id: config.general.location_id,
            row_height: 1,
            overscan: config.display.overscan,
            double_click: Duration::from_millis(config.display.double_click_ms),
        };
        let explorer = ExplorerState::new(options, queries.client_state().clone());
        info!(client = queries.client_name(), start_path, "app started");

        let mut app = Self {
            config,
            theme,
            explorer,
            queries,
            current_path: start_path.to_string(),
            history: Vec::new(),
            pending: None,
            list_layout: ListLayout::default(),
            should_quit: false,
        };
        app.request(start_path.to_string(), None, HistoryUpdate::Keep);
        app
    }

    /// Check if a key event matches a configurable action.
    #[inline]
    pub fn key_matches(&self, action: &str, key: &crossterm::event::KeyEvent) -> bool {
        self.config.keybindings.matches(action, key)
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn client_name(&self) -> &str {
        self.queries.client_name()
    }

    fn request(&mut self, path: String, focus: Option<String>, history: HistoryUpdate) {
        let (generation, request) = self.explorer.begin_query(&path, self.config.limit());
        self.queries.send(QueryRequest { generation, request });
        self.pending = Some(PendingNavigation { generation, path, focus, history });
    }

    /// Enter a directory
    pub fn navigate(&mut self, path: &str) {
        self.request(path.to_string(), None, HistoryUpdate::Record);
    }

    /// Go to the parent directory, selecting the one we came from
    pub fn go_parent(&mut self) {
        let Some(parent) = parent_path(&self.current_path) else {
            debug!("already at root");
            return;
        };
        let focus = Some(self.current_path.clone());
        self.request(parent, focus, HistoryUpdate::Record);
    }

    /// Return to the previously shown directory. The history entry is only
    /// consumed once that listing arrives.
    pub fn go_back(&mut self) {
        let Some(previous) = self.history.last().cloned() else {
            return;
        };
        let focus = Some(self.current_path.clone());
        self.request(previous, focus, HistoryUpdate::Pop);
    }

    /// Reload the current directory, keeping the selection where possible
    pub fn refresh(&mut self) {
        self.request(self.current_path.clone(), None, HistoryUpdate::Keep);
    }

    /// React to a signal from the explorer
    pub fn handle_explorer_event(&mut self, event: ExplorerEvent) {
        match event {
            ExplorerEvent::Navigate(path) => self.navigate(&path),
        }
    }

    /// Install any finished listings. Returns true if the screen changed.
    pub fn poll_responses(&mut self) -> bool {
        let mut changed = false;
        while let Some(response) = self.queries.try_recv() {
            let succeeded = response.result.is_ok();
            if !self.explorer.apply_response(response.generation, &response.request, response.result) {
                continue;
            }
            changed = true;

            let generation = response.generation;
            let Some(pending) = self.pending.take_if(|p| p.generation == generation) else {
                continue;
            };
            if succeeded {
                self.commit(pending);
            }
        }
        changed
    }

    fn commit(&mut self, pending: PendingNavigation) {
        match pending.history {
            HistoryUpdate::Record if pending.path != self.current_path => {
                let left = std::mem::replace(&mut self.current_path, pending.path);
                self.history.push(left);
                if self.history.len() > HISTORY_LIMIT {
                    self.history.remove(0);
                }
            }
            HistoryUpdate::Pop => {
                self.history.pop();
                self.current_path = pending.path;
            }
            _ => self.current_path = pending.path,
        }

        if let Some(focus) = pending.focus {
            let index = self
                .explorer
                .snapshot()
                .and_then(|s| s.contents.iter().position(|e| e.materialized_path == focus));
            if index.is_some() {
                self.explorer.select(index);
            }
        }
        info!(path = %self.current_path, "directory shown");
    }
}
