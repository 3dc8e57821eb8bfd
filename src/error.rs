//! Error types

use thiserror::Error;

/// Narration failures. Each is reported to the user as a notice and leaves
/// playback idle; none escapes the widget.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NarrationError {
    #[error("Text-to-speech is not available in this environment")]
    Unavailable,
    #[error("There is nothing to read")]
    NothingToRead,
    #[error("Narration stopped: {0}")]
    Engine(String),
}
