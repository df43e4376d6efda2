pub mod commands;
pub mod events;
pub mod types;

pub use commands::DomCommand;
pub use events::ClickEvent;
pub use types::{NodeId, PageMetrics, Rect};
