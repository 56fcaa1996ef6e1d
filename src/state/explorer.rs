//! One explorer surface: snapshot, selection, viewport and rows

use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::fs::{DirectoryEntry, DirectorySnapshot};
use crate::query::{ClientState, DirectoryRequest, QueryResult};
use crate::ui::cell::{AssetResolver, CellContext, FileUrlResolver};
use crate::ui::row::{activation_target, ActivationTracker, RowRenderer, RowView};
use super::navigation::{KeyOutcome, KeyboardNavigationController, NavKey};
use super::selection::{clamp_selection, SelectionStore};
use super::viewport::ViewportEngine;

/// Signals the explorer sends to whoever owns the current path
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExplorerEvent {
    /// A directory row was activated
    Navigate(String),
}

/// Tunables for an explorer surface
#[derive(Clone, Debug)]
pub struct ExplorerOptions {
    pub location_id: i64,
    pub row_height: u64,
    pub overscan: usize,
    pub double_click: Duration,
}

/// State of one explorer surface
///
/// The explorer never lists directories itself. It hands out requests via
/// `begin_query` and installs whatever comes back through `apply_response`,
/// keeping the previous snapshot on screen in the meantime.
pub struct ExplorerState {
    location_id: i64,
    snapshot: Option<DirectorySnapshot>,
    selection: SelectionStore,
    viewport: ViewportEngine,
    rows: RowRenderer,
    navigation: KeyboardNavigationController,
    activation: ActivationTracker,
    client_state: ClientState,
    resolver: Box<dyn AssetResolver>,
    /// Generation of the most recently issued request
    generation: u64,
    loading: bool,
    last_error: Option<String>,
    /// Limit of the request that produced the current snapshot
    last_limit: usize,
}

impl std::fmt::Debug for ExplorerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorerState")
            .field("location_id", &self.location_id)
            .field("rows", &self.row_count())
            .field("selection", &self.selection.selected_index())
            .field("generation", &self.generation)
            .field("loading", &self.loading)
            .finish()
    }
}

impl ExplorerState {
    pub fn new(options: ExplorerOptions, client_state: ClientState) -> Self {
        Self {
            location_id: options.location_id,
            snapshot: None,
            selection: SelectionStore::new(),
            viewport: ViewportEngine::new(options.row_height, options.overscan),
            rows: RowRenderer::new(0),
            navigation: KeyboardNavigationController,
            activation: ActivationTracker::new(options.double_click),
            client_state,
            resolver: Box::new(FileUrlResolver),
            generation: 0,
            loading: false,
            last_error: None,
            last_limit: 0,
        }
    }

    /// Replace the thumbnail resolver
    pub fn with_resolver(mut self, resolver: Box<dyn AssetResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn location_id(&self) -> i64 {
        self.location_id
    }

    pub fn snapshot(&self) -> Option<&DirectorySnapshot> {
        self.snapshot.as_ref()
    }

    pub fn row_count(&self) -> usize {
        self.snapshot.as_ref().map_or(0, DirectorySnapshot::len)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the current snapshot was cut off by the request limit
    pub fn limit_reached(&self) -> bool {
        self.last_limit > 0 && self.row_count() >= self.last_limit
    }

    pub fn viewport(&self) -> &ViewportEngine {
        &self.viewport
    }

    pub fn rows(&self) -> &RowRenderer {
        &self.rows
    }

    /// Mutable access for host code that wants to subscribe to changes
    pub fn selection_mut(&mut self) -> &mut SelectionStore {
        &mut self.selection
    }

    /// Selection clamped to the displayed snapshot
    pub fn selected_index(&self) -> Option<usize> {
        clamp_selection(self.selection.selected_index(), self.row_count())
    }

    pub fn selected_entry(&self) -> Option<&DirectoryEntry> {
        let index = self.selected_index()?;
        self.snapshot.as_ref()?.entry_at(index)
    }

    /// Start a new query. The old snapshot stays visible until the answer
    /// arrives; any answer to an earlier request will be discarded.
    pub fn begin_query(&mut self, path: &str, limit: usize) -> (u64, DirectoryRequest) {
        self.generation += 1;
        self.loading = true;
        let request = DirectoryRequest::new(self.location_id, path, limit);
        debug!(generation = self.generation, path, limit = request.limit, "begin query");
        (self.generation, request)
    }

    /// Install a query result. Returns false if the response was stale.
    pub fn apply_response(&mut self, generation: u64, request: &DirectoryRequest, result: QueryResult<DirectorySnapshot>) -> bool {
        if generation != self.generation {
            debug!(generation, latest = self.generation, "discarding stale query response");
            return false;
        }
        self.loading = false;

        match result {
            Ok(snapshot) => {
                self.install_snapshot(snapshot);
                self.last_limit = request.limit;
                self.last_error = None;
            }
            Err(e) => {
                warn!(path = %request.path, error = %e, "directory query failed");
                self.last_error = Some(format!("Cannot list '{}': {}", request.path, e));
            }
        }
        true
    }

    fn install_snapshot(&mut self, snapshot: DirectorySnapshot) {
        let new_directory = self
            .snapshot
            .as_ref()
            .is_none_or(|old| old.directory.id != snapshot.directory.id);
        let row_count = snapshot.len();
        info!(
            directory = %snapshot.directory.name,
            entries = row_count,
            new_directory,
            "snapshot installed"
        );

        self.snapshot = Some(snapshot);
        self.rows.invalidate();
        self.activation.reset();
        self.viewport.set_row_count(row_count);

        if new_directory {
            self.selection.set_selected_index(None);
            self.viewport.scroll_to(0);
        } else {
            let stored = self.selection.selected_index();
            let clamped = clamp_selection(stored, row_count);
            if clamped != stored {
                debug!(from = ?stored, to = ?clamped, "selection clamped to new listing");
                self.selection.set_selected_index(clamped);
            }
        }
    }

    /// Container resized: height in viewport units, width in cells
    pub fn resize(&mut self, height: u64, width: u16) {
        self.viewport.set_container_height(height);
        self.rows.set_width(width);
    }

    /// Arrow key. Keys the controller ignores scroll the viewport instead.
    pub fn navigate_key(&mut self, key: NavKey) -> KeyOutcome {
        let row_count = self.row_count();
        let outcome = self.navigation.handle(key, &mut self.selection, &mut self.viewport, row_count);
        if outcome == KeyOutcome::Ignored {
            match key {
                NavKey::Up => self.viewport.scroll_by(-1),
                NavKey::Down => self.viewport.scroll_by(1),
            };
        }
        outcome
    }

    /// Scroll by whole rows without touching the selection
    pub fn scroll_rows(&mut self, rows: i64) -> bool {
        self.viewport.scroll_by(rows)
    }

    /// Scroll by whole pages
    pub fn scroll_pages(&mut self, pages: i64) -> bool {
        let rows = self.viewport.page_rows() as i64;
        self.viewport.scroll_by(pages.saturating_mul(rows))
    }

    /// Select a row directly (or clear with `None`), scrolling it into view
    pub fn select(&mut self, index: Option<usize>) {
        let index = index.filter(|&i| i < self.row_count());
        self.selection.set_selected_index(index);
        if let Some(i) = index {
            self.viewport.scroll_into_view(i);
        }
    }

    /// Select the first visible row, establishing a selection so the arrow
    /// keys take over
    pub fn select_first_visible(&mut self) {
        if let Some(window) = self.viewport.window() {
            self.select(Some(window.first_visible));
        }
    }

    /// Row click. Clicking the selected row deselects it; a second click on
    /// the same row within the double-click window activates it instead.
    pub fn click_row(&mut self, index: usize, now: Instant) -> Option<ExplorerEvent> {
        if index >= self.row_count() {
            return None;
        }
        if self.activation.click(index, now) {
            self.select(Some(index));
            return self.activate_row(index);
        }
        if self.selected_index() == Some(index) {
            self.select(None);
        } else {
            self.select(Some(index));
        }
        None
    }

    /// Activate the selected row (keyboard)
    pub fn activate_selected(&mut self) -> Option<ExplorerEvent> {
        let index = self.selected_index()?;
        self.activate_row(index)
    }

    fn activate_row(&self, index: usize) -> Option<ExplorerEvent> {
        let entry = self.snapshot.as_ref()?.entry_at(index)?;
        let path = activation_target(entry)?;
        info!(path = %path, "navigation requested");
        Some(ExplorerEvent::Navigate(path))
    }

    /// Row index under a container-relative offset (units from the top of
    /// the list area)
    pub fn row_at_offset(&self, offset: u64) -> Option<usize> {
        if offset >= self.viewport.container_height() {
            return None;
        }
        let index = ((self.viewport.scroll_offset() + offset) / self.viewport.row_height()) as usize;
        (index < self.row_count()).then_some(index)
    }

    /// Materialize the rows currently in the window plus overscan
    pub fn visible_rows(&mut self) -> Vec<(usize, Rc<RowView>)> {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return Vec::new();
        };
        let selected = clamp_selection(self.selection.selected_index(), snapshot.len());
        let ctx = CellContext {
            location_id: self.location_id,
            data_path: self.client_state.data_path.as_deref(),
            resolver: self.resolver.as_ref(),
        };

        let range = self.viewport.materialized_range();
        // Rows within one window length of the band stay cached for scrolling back
        let margin = range.len();
        let keep = range.start.saturating_sub(margin)..range.end.saturating_add(margin);
        let mut rows = Vec::with_capacity(range.len());
        for index in range {
            let Some(entry) = snapshot.entry_at(index) else {
                continue;
            };
            let row = self.rows.render(entry, index, selected == Some(index), &ctx);
            rows.push((index, row));
        }
        self.rows.evict_outside(keep);
        rows
    }

    /// Thumbnail data directory, if the client reported one
    pub fn data_path(&self) -> Option<&PathBuf> {
        self.client_state.data_path.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::DirectoryDescriptor;
    use crate::query::QueryError;

    fn options() -> ExplorerOptions {
        ExplorerOptions {
            location_id: 1,
            row_height: 1,
            overscan: 3,
            double_click: Duration::from_millis(500),
        }
    }

    fn snapshot(dir_id: i64, count: usize) -> DirectorySnapshot {
        let contents = (0..count)
            .map(|i| {
                if i % 5 == 0 {
                    DirectoryEntry::directory(i as i64 + 1, format!("dir{i}"), format!("/d{dir_id}/dir{i}"))
                } else {
                    DirectoryEntry::file(i as i64 + 1, format!("file{i}.txt"), format!("/d{dir_id}/file{i}.txt"), i as u64)
                }
            })
            .collect();
        DirectorySnapshot::new(DirectoryDescriptor { id: dir_id, name: format!("d{dir_id}") }, contents)
    }

    fn loaded(dir_id: i64, count: usize, height: u64) -> ExplorerState {
        let mut explorer = ExplorerState::new(options(), ClientState::default());
        explorer.resize(height, 60);
        let (generation, request) = explorer.begin_query("/", count.max(1));
        assert!(explorer.apply_response(generation, &request, Ok(snapshot(dir_id, count))));
        explorer
    }

    #[test]
    fn test_loading_keeps_previous_snapshot() {
        let mut explorer = ExplorerState::new(options(), ClientState::default());
        assert!(explorer.visible_rows().is_empty());

        let (generation, request) = explorer.begin_query("/", 10);
        assert!(explorer.is_loading());
        explorer.apply_response(generation, &request, Ok(snapshot(1, 10)));
        assert!(!explorer.is_loading());

        explorer.begin_query("/other", 10);
        assert!(explorer.is_loading());
        assert_eq!(explorer.row_count(), 10);
    }

    #[test]
    fn test_stale_responses_are_discarded() {
        let mut explorer = ExplorerState::new(options(), ClientState::default());
        let (slow_gen, slow_req) = explorer.begin_query("/slow", 10);
        let (fast_gen, fast_req) = explorer.begin_query("/fast", 10);

        assert!(explorer.apply_response(fast_gen, &fast_req, Ok(snapshot(2, 3))));
        assert!(!explorer.apply_response(slow_gen, &slow_req, Ok(snapshot(1, 9))));
        assert_eq!(explorer.snapshot().unwrap().directory.id, 2);
        assert_eq!(explorer.row_count(), 3);
    }

    #[test]
    fn test_failure_keeps_last_good_snapshot() {
        let mut explorer = loaded(1, 10, 5);
        let (generation, request) = explorer.begin_query("/gone", 10);
        explorer.apply_response(generation, &request, Err(QueryError::NotFound("/gone".into())));

        assert_eq!(explorer.row_count(), 10);
        assert!(!explorer.is_loading());
        assert!(explorer.last_error().unwrap().contains("/gone"));

        let (generation, request) = explorer.begin_query("/", 10);
        explorer.apply_response(generation, &request, Ok(snapshot(1, 10)));
        assert_eq!(explorer.last_error(), None);
    }

    #[test]
    fn test_navigation_to_smaller_directory_clamps_selection() {
        let mut explorer = loaded(1, 10, 5);
        explorer.select(Some(3));
        assert_eq!(explorer.selected_index(), Some(3));

        let (generation, request) = explorer.begin_query("/small", 10);
        explorer.apply_response(generation, &request, Ok(snapshot(2, 2)));
        let selected = explorer.selected_index();
        assert!(selected.is_none() || selected.unwrap() <= 1);
        assert!(explorer.selection_mut().selected_index().is_none_or(|i| i <= 1));
    }

    #[test]
    fn test_refresh_of_same_directory_clamps_selection() {
        let mut explorer = loaded(1, 10, 5);
        explorer.select(Some(8));

        let (generation, request) = explorer.begin_query("/", 10);
        explorer.apply_response(generation, &request, Ok(snapshot(1, 4)));
        assert_eq!(explorer.selected_index(), Some(3));
        assert_eq!(explorer.selection_mut().selected_index(), Some(3));
    }

    #[test]
    fn test_selection_read_is_clamped_defensively() {
        let mut explorer = loaded(1, 2, 5);
        explorer.selection_mut().set_selected_index(Some(40));
        assert_eq!(explorer.selected_index(), Some(1));
        assert_eq!(explorer.selected_entry().map(|e| e.id), Some(2));
        let rows = explorer.visible_rows();
        assert!(rows.iter().any(|(i, r)| *i == 1 && r.selected));
    }

    #[test]
    fn test_large_listing_materializes_window_only() {
        let mut explorer = loaded(1, 500, 20);
        let rows = explorer.visible_rows();
        assert_eq!(rows.len(), 23);
        assert_eq!(explorer.rows().materialized_count(), 23);

        explorer.select(Some(480));
        let rows = explorer.visible_rows();
        assert!(rows.iter().any(|(i, _)| *i == 480));
        assert!(rows.iter().all(|(i, _)| *i > 400));
        assert!(explorer.rows().materialized_count() < 60);
    }

    #[test]
    fn test_scrolling_reuses_rows() {
        let mut explorer = loaded(1, 100, 10);
        explorer.visible_rows();
        let built = explorer.rows().materialized_count();

        explorer.scroll_rows(1);
        explorer.visible_rows();
        // Only the row newly entering the overscan band is built
        assert_eq!(explorer.rows().materialized_count(), built + 1);
    }

    #[test]
    fn test_row_cache_stays_near_window() {
        let mut explorer = loaded(1, 500, 20);
        for _ in 0..48 {
            explorer.scroll_rows(10);
            explorer.visible_rows();
        }
        assert_eq!(explorer.viewport().scroll_offset(), 480);
        let band = explorer.viewport().materialized_range().len();
        assert!(explorer.rows().cached_rows() <= band * 3);
        assert!(explorer.rows().cached_rows() >= band);
    }

    #[test]
    fn test_arrow_without_selection_scrolls() {
        let mut explorer = loaded(1, 100, 10);
        assert_eq!(explorer.navigate_key(NavKey::Down), KeyOutcome::Ignored);
        assert_eq!(explorer.selected_index(), None);
        assert_eq!(explorer.viewport().scroll_offset(), 1);

        explorer.select_first_visible();
        assert_eq!(explorer.selected_index(), Some(1));
        assert_eq!(explorer.navigate_key(NavKey::Down), KeyOutcome::Handled);
        assert_eq!(explorer.selected_index(), Some(2));
        assert_eq!(explorer.viewport().scroll_offset(), 1);
    }

    #[test]
    fn test_click_toggles_selection() {
        let mut explorer = loaded(1, 10, 5);
        let t0 = Instant::now();
        assert_eq!(explorer.click_row(2, t0), None);
        assert_eq!(explorer.selected_index(), Some(2));

        assert_eq!(explorer.click_row(2, t0 + Duration::from_secs(2)), None);
        assert_eq!(explorer.selected_index(), None);

        assert_eq!(explorer.click_row(99, t0 + Duration::from_secs(4)), None);
        assert_eq!(explorer.selected_index(), None);
    }

    #[test]
    fn test_double_click_on_directory_emits_one_signal() {
        let mut explorer = loaded(1, 10, 5);
        let t0 = Instant::now();
        let events: Vec<_> = [
            explorer.click_row(5, t0),
            explorer.click_row(5, t0 + Duration::from_millis(100)),
        ]
        .into_iter()
        .flatten()
        .collect();
        assert_eq!(events, vec![ExplorerEvent::Navigate("/d1/dir5".to_string())]);
        assert_eq!(explorer.selected_index(), Some(5));
    }

    #[test]
    fn test_double_click_on_file_emits_nothing() {
        let mut explorer = loaded(1, 10, 5);
        let t0 = Instant::now();
        assert_eq!(explorer.click_row(1, t0), None);
        assert_eq!(explorer.click_row(1, t0 + Duration::from_millis(100)), None);
    }

    #[test]
    fn test_keyboard_activation() {
        let mut explorer = loaded(1, 10, 5);
        assert_eq!(explorer.activate_selected(), None);
        explorer.select(Some(0));
        assert_eq!(explorer.activate_selected(), Some(ExplorerEvent::Navigate("/d1/dir0".to_string())));
        explorer.select(Some(1));
        assert_eq!(explorer.activate_selected(), None);
    }

    #[test]
    fn test_row_at_offset() {
        let mut explorer = loaded(1, 30, 10);
        explorer.scroll_rows(5);
        assert_eq!(explorer.row_at_offset(0), Some(5));
        assert_eq!(explorer.row_at_offset(9), Some(14));
        assert_eq!(explorer.row_at_offset(10), None);

        let explorer = loaded(1, 3, 10);
        assert_eq!(explorer.row_at_offset(5), None);
    }

    #[test]
    fn test_limit_reached() {
        let explorer = loaded(1, 10, 5);
        assert!(explorer.limit_reached());

        let mut explorer = loaded(1, 3, 5);
        let (generation, request) = explorer.begin_query("/", 50);
        explorer.apply_response(generation, &request, Ok(snapshot(1, 3)));
        assert!(!explorer.limit_reached());
    }
}
