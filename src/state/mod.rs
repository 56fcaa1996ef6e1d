pub mod app;
pub mod explorer;
pub mod navigation;
pub mod selection;
pub mod viewport;

pub use app::App;
pub use explorer::{ExplorerEvent, ExplorerState};
