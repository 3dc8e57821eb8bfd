//! Message types for communication between the settings panel and the widget

use crate::error::NarrationError;
use crate::settings::Feature;

/// User actions from the settings panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetCommand {
    /// Open the settings panel
    OpenPanel,
    /// Close the settings panel
    ClosePanel,
    /// Flip panel visibility
    TogglePanel,
    /// Advance a feature to its next value
    Toggle(Feature),
    /// Restore every feature to its default
    ResetAll,
    /// Select a selection-narration rate step
    SetSelectionRate(usize),
    /// Advance to the next selection-narration rate step
    CycleSelectionRate,
}

/// User-facing notices emitted by the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A narration action could not run or was aborted
    Narration(NarrationError),
    /// Page narration read its last sentence
    ReadingFinished,
    /// Page narration was cut off by selection narration
    ReadingInterrupted,
}

impl Notice {
    /// Text to show the user
    pub fn message(&self) -> String {
        match self {
            Notice::Narration(err) => err.to_string(),
            Notice::ReadingFinished => "Finished reading".to_string(),
            Notice::ReadingInterrupted => "Reading stopped to read the selection".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_messages() {
        assert_eq!(
            Notice::Narration(NarrationError::NothingToRead).message(),
            "There is nothing to read"
        );
        assert_eq!(
            Notice::Narration(NarrationError::Engine("boom".into())).message(),
            "Narration stopped: boom"
        );
    }
}
