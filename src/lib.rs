//! Virtualized directory explorer
//!
//! The core (`state`, `ui::cell`, `ui::row`) turns directory snapshots into
//! a windowed, keyboard- and mouse-navigable list. `query` and `async_io`
//! fetch snapshots; `ui::list` and `ui::status` draw them with ratatui.

pub mod async_io;
pub mod config;
pub mod errors;
pub mod fs;
pub mod input;
pub mod logging;
pub mod query;
pub mod state;
pub mod ui;
