//! Windowing over a fixed-height row list
//!
//! Heights and offsets are in abstract units. A terminal host uses a row
//! height of 1 and measures the container in lines; a pixel host would use
//! pixels. Only rows inside the window plus a small overscan are ever
//! materialized.

use std::ops::Range;

/// Extra rows materialized above and below the visible window
pub const DEFAULT_OVERSCAN: usize = 3;

/// First and last row index intersecting the container
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ViewportWindow {
    pub first_visible: usize,
    pub last_visible: usize,
}

impl ViewportWindow {
    pub fn contains(&self, index: usize) -> bool {
        (self.first_visible..=self.last_visible).contains(&index)
    }

    pub fn len(&self) -> usize {
        self.last_visible - self.first_visible + 1
    }
}

#[derive(Clone, Debug)]
pub struct ViewportEngine {
    row_count: usize,
    row_height: u64,
    container_height: u64,
    scroll_offset: u64,
    overscan: usize,
}

impl ViewportEngine {
    /// Create an empty viewport. Row height is at least one unit.
    pub fn new(row_height: u64, overscan: usize) -> Self {
        Self {
            row_count: 0,
            row_height: row_height.max(1),
            container_height: 0,
            scroll_offset: 0,
            overscan,
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn row_height(&self) -> u64 {
        self.row_height
    }

    pub fn container_height(&self) -> u64 {
        self.container_height
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn overscan(&self) -> usize {
        self.overscan
    }

    /// Total scrollable extent
    pub fn content_height(&self) -> u64 {
        self.row_count as u64 * self.row_height
    }

    pub fn max_scroll_offset(&self) -> u64 {
        self.content_height().saturating_sub(self.container_height)
    }

    /// Number of whole rows that fit in the container (at least one)
    pub fn page_rows(&self) -> usize {
        ((self.container_height / self.row_height) as usize).max(1)
    }

    /// Set the number of rows. The scroll offset is kept unless the new
    /// content is too short for it, in which case it is clamped.
    pub fn set_row_count(&mut self, row_count: usize) {
        self.row_count = row_count;
        self.clamp_offset();
    }

    /// Set the container height, clamping the scroll offset the same way
    pub fn set_container_height(&mut self, height: u64) {
        self.container_height = height;
        self.clamp_offset();
    }

    fn clamp_offset(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset());
    }

    /// Scroll to an absolute offset; returns true if it moved
    pub fn scroll_to(&mut self, offset: u64) -> bool {
        let offset = offset.min(self.max_scroll_offset());
        let changed = offset != self.scroll_offset;
        self.scroll_offset = offset;
        changed
    }

    /// Scroll by whole rows (negative is up); returns true if it moved
    pub fn scroll_by(&mut self, rows: i64) -> bool {
        let delta = rows.unsigned_abs().saturating_mul(self.row_height);
        let target = if rows < 0 {
            self.scroll_offset.saturating_sub(delta)
        } else {
            self.scroll_offset.saturating_add(delta)
        };
        self.scroll_to(target)
    }

    /// Rows intersecting the container, `None` when nothing is visible
    pub fn window(&self) -> Option<ViewportWindow> {
        if self.row_count == 0 || self.container_height == 0 {
            return None;
        }
        let first = (self.scroll_offset / self.row_height) as usize;
        let bottom = self.scroll_offset + self.container_height - 1;
        let last = ((bottom / self.row_height) as usize).min(self.row_count - 1);
        Some(ViewportWindow {
            first_visible: first.min(self.row_count - 1),
            last_visible: last,
        })
    }

    /// Rows to materialize: the window plus overscan on both sides
    pub fn materialized_range(&self) -> Range<usize> {
        match self.window() {
            Some(w) => {
                let start = w.first_visible.saturating_sub(self.overscan);
                let end = (w.last_visible + 1 + self.overscan).min(self.row_count);
                start..end
            }
            None => 0..0,
        }
    }

    /// Whether every unit of `index` is inside the container
    pub fn is_fully_visible(&self, index: usize) -> bool {
        if index >= self.row_count {
            return false;
        }
        let top = index as u64 * self.row_height;
        top >= self.scroll_offset && top + self.row_height <= self.scroll_offset + self.container_height
    }

    /// Scroll the minimal distance that brings `index` fully into view.
    /// Returns true if the offset changed; already visible rows and
    /// out-of-range indices leave it alone.
    pub fn scroll_into_view(&mut self, index: usize) -> bool {
        if index >= self.row_count {
            return false;
        }
        let top = index as u64 * self.row_height;
        let bottom = top + self.row_height;
        let view_bottom = self.scroll_offset + self.container_height;

        let target = if top < self.scroll_offset {
            top
        } else if bottom > view_bottom {
            if self.row_height > self.container_height {
                top
            } else {
                bottom - self.container_height
            }
        } else {
            return false;
        };
        self.scroll_to(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(rows: usize, height: u64) -> ViewportEngine {
        let mut vp = ViewportEngine::new(1, DEFAULT_OVERSCAN);
        vp.set_container_height(height);
        vp.set_row_count(rows);
        vp
    }

    #[test]
    fn test_empty_list_materializes_nothing() {
        let vp = engine(0, 20);
        assert_eq!(vp.window(), None);
        assert!(vp.materialized_range().is_empty());

        let vp = engine(100, 0);
        assert!(vp.materialized_range().is_empty());
    }

    #[test]
    fn test_window_is_bounded_contiguous_subset() {
        for rows in [0usize, 1, 5, 19, 20, 21, 100, 5000] {
            for height in [0u64, 1, 7, 20, 64] {
                let mut vp = engine(rows, height);
                for offset in [0u64, 3, 50, 10_000] {
                    vp.scroll_to(offset);
                    let range = vp.materialized_range();
                    assert!(range.end <= rows);
                    assert!(range.start <= range.end);
                    assert!(range.len() <= height as usize + 1 + 2 * DEFAULT_OVERSCAN);
                    if rows > 0 && height > 0 {
                        assert!(!range.is_empty());
                    }
                }
            }
        }
    }

    #[test]
    fn test_large_directory_scenario() {
        let mut vp = engine(500, 20);
        let range = vp.materialized_range();
        assert_eq!(range, 0..23);
        assert_ne!(range.len(), 500);

        assert!(vp.scroll_into_view(480));
        let range = vp.materialized_range();
        assert!(range.contains(&480));
        assert!(range.start > 400);
        assert_eq!(vp.window(), Some(ViewportWindow { first_visible: 461, last_visible: 480 }));
        assert!(range.len() <= 20 + 2 * DEFAULT_OVERSCAN);
    }

    #[test]
    fn test_scroll_into_view_minimal_and_idempotent() {
        let mut vp = engine(100, 10);
        assert!(!vp.scroll_into_view(5));
        assert_eq!(vp.scroll_offset(), 0);

        assert!(vp.scroll_into_view(15));
        assert_eq!(vp.scroll_offset(), 6);
        assert!(!vp.scroll_into_view(15));
        assert_eq!(vp.scroll_offset(), 6);

        assert!(vp.scroll_into_view(2));
        assert_eq!(vp.scroll_offset(), 2);

        assert!(!vp.scroll_into_view(100));
        assert_eq!(vp.scroll_offset(), 2);
    }

    #[test]
    fn test_pixel_rows_partial_visibility() {
        let mut vp = ViewportEngine::new(30, 2);
        vp.set_container_height(100);
        vp.set_row_count(50);
        vp.scroll_to(45);

        let w = vp.window().unwrap();
        assert_eq!(w.first_visible, 1);
        assert_eq!(w.last_visible, 4);
        assert!(!vp.is_fully_visible(1));
        assert!(vp.is_fully_visible(2));

        // Row 1 is partly hidden at the top: scroll up to its top edge
        assert!(vp.scroll_into_view(1));
        assert_eq!(vp.scroll_offset(), 30);
        // Row 4 spans 120..150: bottom-align it
        assert!(vp.scroll_into_view(4));
        assert_eq!(vp.scroll_offset(), 50);
    }

    #[test]
    fn test_row_taller_than_container_aligns_top() {
        let mut vp = ViewportEngine::new(50, 0);
        vp.set_container_height(20);
        vp.set_row_count(10);
        assert!(vp.scroll_into_view(3));
        assert_eq!(vp.scroll_offset(), 150);
        assert!(!vp.scroll_into_view(3));
    }

    #[test]
    fn test_row_count_change_keeps_or_clamps_offset() {
        let mut vp = engine(500, 20);
        vp.scroll_to(100);

        vp.set_row_count(400);
        assert_eq!(vp.scroll_offset(), 100);

        vp.set_row_count(50);
        assert_eq!(vp.scroll_offset(), 30);

        vp.set_row_count(2);
        assert_eq!(vp.scroll_offset(), 0);
    }

    #[test]
    fn test_resize_clamps_offset() {
        let mut vp = engine(30, 10);
        vp.scroll_to(20);
        assert_eq!(vp.scroll_offset(), 20);
        vp.set_container_height(25);
        assert_eq!(vp.scroll_offset(), 5);
        assert_eq!(vp.page_rows(), 25);
    }

    #[test]
    fn test_scroll_by_rows() {
        let mut vp = engine(30, 10);
        assert!(!vp.scroll_by(-1));
        assert!(vp.scroll_by(3));
        assert_eq!(vp.scroll_offset(), 3);
        assert!(vp.scroll_by(100));
        assert_eq!(vp.scroll_offset(), 20);
        assert!(vp.scroll_by(-5));
        assert_eq!(vp.scroll_offset(), 15);
    }
}
