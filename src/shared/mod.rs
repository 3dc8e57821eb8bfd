//! Messages and status snapshots shared between the widget and its embedder
//!
//! Commands flow in from the settings panel, notices flow out to whatever
//! shows them to the user.

pub mod messages;
pub mod state;

pub use messages::{Notice, WidgetCommand};
pub use state::{PlaybackSnapshot, SelectionSnapshot, WidgetStatus};
