//! Status bar widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::state::explorer::ExplorerState;
use super::Theme;

const SEPARATOR: &str = " │ ";

/// Status line: current path on the left, counts and selection on the right.
/// Errors replace the counts until the next successful load.
pub struct StatusBar<'a> {
    explorer: &'a ExplorerState,
    path: &'a str,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(explorer: &'a ExplorerState, path: &'a str, theme: &'a Theme) -> Self {
        Self { explorer, path, theme }
    }

    /// Right-hand summary: entry counts, limit marker, selection position
    pub fn summary(explorer: &ExplorerState) -> String {
        let Some(snapshot) = explorer.snapshot() else {
            return String::new();
        };
        let mut parts = vec![format!(
            "{} dirs, {} files",
            snapshot.dir_count(),
            snapshot.file_count()
        )];
        if explorer.limit_reached() {
            parts.push("limit reached".to_string());
        }
        if let Some(index) = explorer.selected_index() {
            parts.push(format!("{}/{}", index + 1, snapshot.len()));
        }
        parts.join(SEPARATOR)
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let style = Style::default().bg(self.theme.status_bg).fg(self.theme.status_fg);
        for x in area.x..area.x + area.width {
            buf[(x, area.y)].set_char(' ').set_style(style);
        }

        let (right, right_style) = if let Some(error) = self.explorer.last_error() {
            (
                format!(" {} ", error),
                Style::default().bg(self.theme.status_error_bg).fg(self.theme.status_error_fg),
            )
        } else if self.explorer.is_loading() {
            (
                " Loading… ".to_string(),
                style.fg(self.theme.status_loading).add_modifier(Modifier::BOLD),
            )
        } else {
            (format!(" {} ", Self::summary(self.explorer)), style)
        };

        // Right side wins when space is short; the path gets what remains
        let width = area.width as usize;
        let right = truncate_str(&right, width);
        let right_len = right.chars().count();
        let right_x = area.x + (width - right_len) as u16;
        buf.set_string(right_x, area.y, &right, right_style);

        let path_width = width.saturating_sub(right_len + 2);
        if path_width > 0 {
            let path = truncate_path(self.path, path_width);
            buf.set_string(area.x + 1, area.y, &path, style.add_modifier(Modifier::BOLD));
        }
    }
}

/// Truncate a string to max_width (keeps the start)
fn truncate_str(s: &str, max_width: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_width {
        s.to_string()
    } else if max_width == 0 {
        String::new()
    } else {
        let mut result: String = s.chars().take(max_width - 1).collect();
        result.push('…');
        result
    }
}

/// Truncate a path to max_width (keeps the end)
fn truncate_path(s: &str, max_width: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_width {
        s.to_string()
    } else if max_width <= 1 {
        "…".to_string()
    } else {
        let skip = char_count - max_width + 1;
        let mut result = String::from("…");
        result.extend(s.chars().skip(skip));
        result
    }
}
