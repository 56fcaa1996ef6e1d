//! Arrow-key navigation of the selected row

use tracing::trace;

use super::selection::{clamp_selection, SelectionStore};
use super::viewport::ViewportEngine;

/// Directional keys the controller understands
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NavKey {
    Up,
    Down,
}

/// Whether the controller consumed a key
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyOutcome {
    /// Not ours: the host may apply its default behaviour (scrolling)
    Ignored,
    /// Consumed: the host must not scroll for this key
    Handled,
}

/// Moves the selection one row at a time
///
/// Nothing happens until a selection exists: the first arrow press on an
/// unselected list does not select row 0. Movement clamps at both ends.
/// Once a row is selected the controller owns vertical navigation and
/// reports every Up/Down as handled, including clamped presses.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyboardNavigationController;

impl KeyboardNavigationController {
    pub fn handle(
        &self,
        key: NavKey,
        selection: &mut SelectionStore,
        viewport: &mut ViewportEngine,
        row_count: usize,
    ) -> KeyOutcome {
        let stored = selection.selected_index();
        let current = clamp_selection(stored, row_count);

        let Some(index) = current else {
            if stored.is_some() {
                selection.set_selected_index(None);
            }
            return KeyOutcome::Ignored;
        };

        let next = match key {
            NavKey::Down if index + 1 < row_count => index + 1,
            NavKey::Up if index > 0 => index - 1,
            _ => index,
        };

        if Some(next) != stored {
            trace!(from = ?stored, to = next, "selection moved");
            selection.set_selected_index(Some(next));
            viewport.scroll_into_view(next);
        }
        KeyOutcome::Handled
    }
}
