//! Row materialization with memoization

use std::collections::HashMap;
use std::ops::Range;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::fs::DirectoryEntry;
use super::cell::{column_widths, render_cell, CellContext, CellView, COLUMNS};

/// A fully materialized row
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowView {
    pub entry_id: i64,
    pub index: usize,
    pub cells: Vec<CellView>,
    /// Even rows carry the alternating background tint
    pub striped: bool,
    /// Selected rows are drawn with a border
    pub selected: bool,
    pub is_dir: bool,
    /// Untruncated name, for styling rules
    pub name: String,
}

/// Builds rows from entries, reusing a row while its entry and selection
/// flag are unchanged
///
/// The cache is keyed on `(entry.id, is_selected)`, not on the index, so a
/// row scrolled to a different screen position is not rebuilt. Ids are only
/// unique within one snapshot: call `invalidate()` whenever a new snapshot is
/// installed.
#[derive(Debug, Default)]
pub struct RowRenderer {
    cache: HashMap<(i64, bool), Rc<RowView>>,
    widths: Vec<u16>,
    /// Number of rows built since creation
    materialized: usize,
}

impl RowRenderer {
    pub fn new(total_width: u16) -> Self {
        Self {
            widths: column_widths(total_width),
            ..Self::default()
        }
    }

    /// Drop every cached row
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    /// Update the available width; cached rows are dropped if the column
    /// layout changes
    pub fn set_width(&mut self, total_width: u16) {
        let widths = column_widths(total_width);
        if widths != self.widths {
            self.widths = widths;
            self.invalidate();
        }
    }

    /// Current column widths, in column order
    pub fn widths(&self) -> &[u16] {
        &self.widths
    }

    /// How many rows have been built (cache misses)
    pub fn materialized_count(&self) -> usize {
        self.materialized
    }

    pub fn cached_rows(&self) -> usize {
        self.cache.len()
    }

    /// Drop cached rows built for indices outside `keep`
    pub fn evict_outside(&mut self, keep: Range<usize>) {
        self.cache.retain(|_, row| keep.contains(&row.index));
    }

    /// Return the row for `entry`, building it only on a cache miss
    pub fn render(&mut self, entry: &DirectoryEntry, index: usize, is_selected: bool, ctx: &CellContext) -> Rc<RowView> {
        let key = (entry.id, is_selected);
        if let Some(row) = self.cache.get(&key) {
            return Rc::clone(row);
        }

        let cells = COLUMNS
            .iter()
            .zip(self.widths.iter())
            .map(|(spec, &width)| render_cell(spec.kind, entry, width, ctx))
            .collect();

        let row = Rc::new(RowView {
            entry_id: entry.id,
            index,
            cells,
            striped: index % 2 == 0,
            selected: is_selected,
            is_dir: entry.is_dir,
            name: entry.name.clone(),
        });
        self.materialized += 1;
        self.cache.insert(key, Rc::clone(&row));
        row
    }
}

/// Navigation target requested by activating `entry`: only directories can
/// be entered
pub fn activation_target(entry: &DirectoryEntry) -> Option<String> {
    entry.is_dir.then(|| entry.materialized_path.clone())
}

/// Detects two clicks on the same row within a time window
#[derive(Debug, Clone)]
pub struct ActivationTracker {
    last_click: Option<(usize, Instant)>,
    threshold: Duration,
}

impl ActivationTracker {
    pub fn new(threshold: Duration) -> Self {
        Self { last_click: None, threshold }
    }

    /// Record a click; returns true if it completes a double-activation.
    /// The pair is consumed, so a third click starts over.
    pub fn click(&mut self, index: usize, now: Instant) -> bool {
        match self.last_click.take() {
            Some((last_index, at))
                if last_index == index && now.saturating_duration_since(at) <= self.threshold =>
            {
                true
            }
            _ => {
                self.last_click = Some((index, now));
                false
            }
        }
    }

    /// Forget any pending first click
    pub fn reset(&mut self) {
        self.last_click = None;
    }
}
