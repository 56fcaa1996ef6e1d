//! UI components

pub mod cell;
pub mod list;
pub mod row;
pub mod status;
pub mod theme;

pub use list::{FileListWidget, ListLayout};
pub use status::StatusBar;
pub use theme::Theme;
pub use theme::ThemeConfig;
