//! Input handling
//!
//! Keys are matched against the configured bindings; mouse clicks are mapped
//! to rows through the layout recorded at the last draw.

use std::time::Instant;

use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};

use crate::state::app::App;
use crate::state::navigation::NavKey;

/// Rows scrolled per mouse wheel notch
const WHEEL_ROWS: i64 = 3;

/// Handle a key event
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if app.key_matches("quit", &key) || app.key_matches("quit_alt", &key) {
        app.should_quit = true;
    } else if app.key_matches("move_up", &key) {
        app.explorer.navigate_key(NavKey::Up);
    } else if app.key_matches("move_down", &key) {
        app.explorer.navigate_key(NavKey::Down);
    } else if app.key_matches("page_up", &key) {
        app.explorer.scroll_pages(-1);
    } else if app.key_matches("page_down", &key) {
        app.explorer.scroll_pages(1);
    } else if app.key_matches("activate", &key) {
        if let Some(event) = app.explorer.activate_selected() {
            app.handle_explorer_event(event);
        }
    } else if app.key_matches("go_parent", &key) {
        app.go_parent();
    } else if app.key_matches("go_back", &key) {
        app.go_back();
    } else if app.key_matches("select_first", &key) {
        app.explorer.select_first_visible();
    } else if app.key_matches("clear_selection", &key) {
        app.explorer.select(None);
    } else if app.key_matches("refresh", &key) {
        app.refresh();
    }
}

/// Handle a mouse event
pub fn handle_mouse(app: &mut App, mouse: MouseEvent, now: Instant) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let Some(offset) = app.list_layout.row_offset(mouse.column, mouse.row) else {
                return;
            };
            let Some(index) = app.explorer.row_at_offset(offset) else {
                return;
            };
            if let Some(event) = app.explorer.click_row(index, now) {
                app.handle_explorer_event(event);
            }
        }
        MouseEventKind::ScrollUp => {
            app.explorer.scroll_rows(-WHEEL_ROWS);
        }
        MouseEventKind::ScrollDown => {
            app.explorer.scroll_rows(WHEEL_ROWS);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::fs::{DirectoryDescriptor, DirectoryEntry, DirectorySnapshot};
    use crate::query::{ClientState, DirectoryQueryClient, DirectoryRequest, QueryResult};
    use crate::ui::ListLayout;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::layout::Rect;
    use std::time::Duration;

    /// Every directory holds 50 subdirectories
    struct WideClient;

    impl DirectoryQueryClient for WideClient {
        fn name(&self) -> &str {
            "wide"
        }

        fn query_directory(&mut self, request: &DirectoryRequest) -> QueryResult<DirectorySnapshot> {
            let base = request.path.trim_end_matches('/');
            let contents = (0..50)
                .map(|i| DirectoryEntry::directory(i + 1, format!("d{i:02}"), format!("{base}/d{i:02}")))
                .collect();
            let id = request.path.len() as i64;
            Ok(DirectorySnapshot::new(DirectoryDescriptor { id, name: request.path.clone() }, contents))
        }

        fn client_state(&self) -> ClientState {
            ClientState::default()
        }
    }

    fn settle(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.explorer.is_loading() && Instant::now() < deadline {
            app.poll_responses();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn app() -> App {
        let mut app = App::new(Config::default(), Box::new(WideClient), "/");
        settle(&mut app);
        app.list_layout = ListLayout::compute(Rect::new(0, 0, 60, 12), true);
        app.explorer.resize(app.list_layout.rows_area.height as u64, 57);
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Char('x')));
        assert!(!app.should_quit);
        handle_key(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_arrows_scroll_until_something_is_selected() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Down));
        assert_eq!(app.explorer.selected_index(), None);
        assert_eq!(app.explorer.viewport().scroll_offset(), 1);

        handle_key(&mut app, key(KeyCode::Char(' ')));
        assert_eq!(app.explorer.selected_index(), Some(1));
        handle_key(&mut app, key(KeyCode::Down));
        assert_eq!(app.explorer.selected_index(), Some(2));

        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.explorer.selected_index(), None);
    }

    #[test]
    fn test_enter_opens_selected_directory() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Char(' ')));
        handle_key(&mut app, key(KeyCode::Enter));
        settle(&mut app);
        assert_eq!(app.current_path(), "/d00");

        handle_key(&mut app, key(KeyCode::Backspace));
        settle(&mut app);
        assert_eq!(app.current_path(), "/");
        assert_eq!(app.explorer.selected_index(), Some(0));
    }

    #[test]
    fn test_mouse_click_and_double_click() {
        let mut app = app();
        let t0 = Instant::now();

        // Rows start below the border and header
        handle_mouse(&mut app, click(5, 4), t0);
        assert_eq!(app.explorer.selected_index(), Some(2));

        // A click on the border beside the selected row neither toggles it
        // nor breaks the pending double-click
        handle_mouse(&mut app, click(0, 4), t0 + Duration::from_millis(50));
        assert_eq!(app.explorer.selected_index(), Some(2));
        assert!(!app.explorer.is_loading());

        handle_mouse(&mut app, click(5, 4), t0 + Duration::from_millis(100));
        settle(&mut app);
        assert_eq!(app.current_path(), "/d02");
    }

    #[test]
    fn test_mouse_wheel_scrolls() {
        let mut app = app();
        let wheel = |kind| MouseEvent { kind, column: 5, row: 5, modifiers: KeyModifiers::NONE };
        handle_mouse(&mut app, wheel(MouseEventKind::ScrollDown), Instant::now());
        assert_eq!(app.explorer.viewport().scroll_offset(), 3);
        handle_mouse(&mut app, wheel(MouseEventKind::ScrollUp), Instant::now());
        assert_eq!(app.explorer.viewport().scroll_offset(), 0);
    }
}
