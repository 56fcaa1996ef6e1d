//! Virtualized directory list widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, StatefulWidget, Widget},
};

use crate::state::explorer::ExplorerState;
use super::cell::{CellIcon, CellView, ColumnKind, COLUMNS};
use super::row::RowView;
use super::Theme;

/// Column at the left edge holding the selection marker
pub const GUTTER_WIDTH: u16 = 1;

const SELECTED_MARKER: char = '▌';

/// Height of the column header row
const HEADER_HEIGHT: u16 = 1;

/// Screen geometry of the row area, for mapping mouse positions to rows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListLayout {
    pub rows_area: Rect,
}

impl ListLayout {
    /// Compute where rows will be drawn inside `area`
    pub fn compute(area: Rect, show_header: bool) -> Self {
        let inner = Block::default().borders(Borders::ALL).inner(area);
        let header = if show_header { HEADER_HEIGHT.min(inner.height) } else { 0 };
        Self {
            rows_area: Rect {
                x: inner.x,
                y: inner.y + header,
                width: inner.width,
                height: inner.height.saturating_sub(header),
            },
        }
    }

    /// Offset from the top of the row area, if (column, row) lies inside it
    pub fn row_offset(&self, column: u16, row: u16) -> Option<u64> {
        let area = self.rows_area;
        let inside = column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        inside.then(|| (row - area.y) as u64)
    }
}

/// Widget rendering one explorer surface
pub struct FileListWidget<'a> {
    theme: &'a Theme,
    show_header: bool,
}

impl<'a> FileListWidget<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme, show_header: true }
    }

    pub fn show_header(mut self, show: bool) -> Self {
        self.show_header = show;
        self
    }

    fn title(state: &ExplorerState) -> String {
        match state.snapshot() {
            Some(snapshot) if !snapshot.directory.name.is_empty() => format!(" {} ", snapshot.directory.name),
            Some(_) => " / ".to_string(),
            None => String::new(),
        }
    }

    fn render_header(widths: &[u16], theme: &Theme, x: u16, y: u16, buf: &mut Buffer) {
        let style = Style::default()
            .fg(theme.header)
            .bg(theme.background)
            .add_modifier(Modifier::BOLD);

        let mut cx = x + GUTTER_WIDTH;
        for (spec, &width) in COLUMNS.iter().zip(widths) {
            let label = match spec.kind {
                ColumnKind::Size => format!("{:>w$} ", spec.label, w = width.saturating_sub(1) as usize),
                _ => spec.label.to_string(),
            };
            buf.set_stringn(cx, y, &label, width as usize, style);
            cx += width;
        }
    }

    fn render_row(row: &RowView, widths: &[u16], theme: &Theme, area: Rect, y: u16, buf: &mut Buffer) {
        let x = area.x;
        let bg = if row.selected {
            theme.selected_bg
        } else if row.striped {
            theme.stripe_bg
        } else {
            theme.background
        };
        let total = GUTTER_WIDTH + widths.iter().sum::<u16>();
        let right = (x + total).min(area.right());
        let base = Style::default().bg(bg);
        for cx in x..right {
            buf[(cx, y)].set_char(' ').set_style(base);
        }

        if row.selected && x < right {
            let marker = Style::default().fg(theme.selected_border).bg(theme.background);
            buf[(x, y)].set_char(SELECTED_MARKER).set_style(marker);
        }

        let has_thumbnail = row.cells.iter().any(|c| matches!(c.icon, Some(CellIcon::Thumbnail(_))));
        let (name_fg, suffix) = theme
            .find_highlight(&row.name, row.is_dir, has_thumbnail)
            .unwrap_or((if row.is_dir { theme.file_directory } else { theme.file_normal }, None));

        let mut text_style = base.fg(if row.selected { theme.selected_fg } else { name_fg });
        if row.is_dir {
            text_style = text_style.add_modifier(Modifier::BOLD);
        }

        let mut cx = x + GUTTER_WIDTH;
        for (cell, &width) in row.cells.iter().zip(widths) {
            if cx >= right {
                break;
            }
            let width = width.min(right - cx);
            Self::render_cell(cell, width, suffix, text_style, base, theme, cx, y, buf);
            cx += width;
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render_cell(
        cell: &CellView,
        width: u16,
        suffix: Option<&str>,
        name_style: Style,
        base: Style,
        theme: &Theme,
        x: u16,
        y: u16,
        buf: &mut Buffer,
    ) {
        if cell.is_empty() || width == 0 {
            return;
        }
        match cell.kind {
            ColumnKind::Name => {
                if let Some(icon) = &cell.icon {
                    buf[(x, y)].set_char(icon.glyph()).set_style(base.fg(theme.icon));
                }
                let mut text = cell.text.clone();
                if let Some(s) = suffix {
                    text.push_str(s);
                }
                let text_x = x + super::cell::ICON_WIDTH.min(width);
                let room = width.saturating_sub(super::cell::ICON_WIDTH) as usize;
                buf.set_stringn(text_x, y, &text, room, name_style);
            }
            ColumnKind::Size => {
                let text = format!("{:>w$} ", cell.text, w = width.saturating_sub(1) as usize);
                buf.set_stringn(x, y, &text, width as usize, base.fg(theme.file_size));
            }
            ColumnKind::Extension => {
                buf.set_stringn(x, y, &cell.text, width as usize, base.fg(theme.file_size));
            }
        }
    }

    fn render_placeholder(message: &str, theme: &Theme, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let width = message.chars().count() as u16;
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height / 2;
        let style = Style::default().fg(theme.status_loading).bg(theme.background);
        buf.set_stringn(x, y, message, area.width as usize, style);
    }
}

impl StatefulWidget for FileListWidget<'_> {
    type State = ExplorerState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let theme = self.theme;
        let border_style = Style::default().fg(theme.border).bg(theme.background);
        let title = Line::from(Span::styled(
            Self::title(state),
            Style::default().fg(theme.header).bg(theme.header_bg),
        ));
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(Style::default().bg(theme.background));

        let inner = block.inner(area);
        let layout = ListLayout::compute(area, self.show_header);
        let rows_area = layout.rows_area;

        // The viewport measures the container in rows
        state.resize(rows_area.height as u64, rows_area.width.saturating_sub(GUTTER_WIDTH));

        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let widths = state.rows().widths().to_vec();
        if self.show_header {
            Self::render_header(&widths, theme, inner.x, inner.y, buf);
        }

        let row_count = state.row_count();
        if row_count == 0 {
            let message = if state.is_loading() {
                "Loading…"
            } else if state.snapshot().is_some() {
                "Empty directory"
            } else {
                ""
            };
            Self::render_placeholder(message, theme, rows_area, buf);
            return;
        }

        let scroll = state.viewport().scroll_offset();
        let row_height = state.viewport().row_height();
        for (index, row) in state.visible_rows() {
            // Overscan rows are built but fall outside the drawable area
            let top = index as u64 * row_height;
            if top < scroll {
                continue;
            }
            let offset = top - scroll;
            if offset >= rows_area.height as u64 {
                continue;
            }
            Self::render_row(&row, &widths, theme, rows_area, rows_area.y + offset as u16, buf);
        }
    }
}
