//! a11y-overlay - reading aids and narration layered over host content
//!
//! A single mountable widget holding a panel of accessibility settings.
//! Typography and colour features become style variables, the reading
//! mask, reading guide and magnifier follow the pointer on their own
//! layers, and the page or a selection can be read aloud one sentence at
//! a time. Everything platform-specific is reached through the traits in
//! [`host`], so the same widget runs against a browser bridge or the
//! in-memory [`host::headless`] implementation.

pub mod app;
pub mod config;
pub mod error;
pub mod host;
pub mod overlay;
pub mod settings;
pub mod shared;
pub mod speech;

pub use app::Widget;
pub use config::AppConfig;
pub use error::NarrationError;
pub use host::{Host, HostEvent, NarrationLink};
pub use overlay::OverlayKind;
pub use settings::{Feature, FeatureValue, SettingsMap};
pub use shared::{Notice, WidgetCommand, WidgetStatus};
