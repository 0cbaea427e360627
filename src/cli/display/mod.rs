//! Display framework for CLI output formatting.
//!
//! Shared table primitives and the queue watcher screen.

pub mod table;
pub mod widget;

pub use table::{list_table, render_section};
pub use widget::{error_banner, history_table, notice_banner, queue_table, WidgetView};
