//! Selection narration
//!
//! While enabled, every new text selection is read aloud at a user-chosen
//! rate. Independent of page narration: it keeps its own listener, rate and
//! utterance id.

use tracing::{debug, info};

use crate::host::{
    EventType, ListenerId, ListenerOwner, ListenerSpec, NarrationEngine, NarrationEvent,
    NarrationEventKind, Surface, UtteranceId, UtteranceRequest,
};
use crate::shared::SelectionSnapshot;
use crate::speech::voice::select_voice;

/// Rate steps offered for selection narration
pub const SELECTION_RATES: [f32; 6] = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

/// What a selection event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionAction {
    /// Disabled, or the selection was blank
    Ignored,
    /// Spoken without touching the engine's current output
    Spoken,
    /// The engine was cancelled before speaking, silencing whatever it was
    /// playing
    Replaced,
}

#[derive(Debug)]
pub struct SelectionReader {
    listener: Option<ListenerId>,
    rate_step: usize,
    utterance: Option<UtteranceId>,
    speaking: bool,
}

impl SelectionReader {
    pub fn new(rate_step: usize) -> Self {
        Self {
            listener: None,
            rate_step: rate_step.min(SELECTION_RATES.len() - 1),
            utterance: None,
            speaking: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.listener.is_some()
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    pub fn rate(&self) -> f32 {
        SELECTION_RATES[self.rate_step]
    }

    pub fn rate_step(&self) -> usize {
        self.rate_step
    }

    /// Select a rate step; out-of-range steps are clamped
    pub fn set_rate_step(&mut self, step: usize) -> f32 {
        self.rate_step = step.min(SELECTION_RATES.len() - 1);
        self.rate()
    }

    /// Move to the next rate step, wrapping after the fastest
    pub fn cycle_rate(&mut self) -> f32 {
        self.rate_step = (self.rate_step + 1) % SELECTION_RATES.len();
        self.rate()
    }

    /// Attach the selection listener. No-op if already enabled.
    pub fn enable(&mut self, surface: &dyn Surface) {
        if self.listener.is_some() {
            return;
        }
        self.listener = Some(surface.add_listener(ListenerSpec {
            owner: ListenerOwner::SelectionReader,
            event: EventType::SelectionChange,
        }));
        info!("Selection reader enabled");
    }

    /// Detach the listener and silence any selection utterance. Returns
    /// true if the engine was cancelled.
    pub fn disable(&mut self, surface: &dyn Surface, engine: Option<&dyn NarrationEngine>) -> bool {
        let Some(listener) = self.listener.take() else {
            return false;
        };
        surface.remove_listener(listener);
        let cancelled = match (self.speaking, engine) {
            (true, Some(engine)) => {
                engine.cancel();
                true
            }
            _ => false,
        };
        self.interrupt();
        info!("Selection reader disabled");
        cancelled
    }

    /// Forget the in-flight utterance after the engine was cancelled on
    /// behalf of page narration. Returns true if one was speaking.
    pub fn interrupt(&mut self) -> bool {
        let was_speaking = self.speaking;
        self.utterance = None;
        self.speaking = false;
        was_speaking
    }

    pub fn owns_listener(&self, listener: ListenerId) -> bool {
        self.listener == Some(listener)
    }

    /// Read a newly selected text
    pub fn on_selection(
        &mut self,
        text: &str,
        engine: &dyn NarrationEngine,
        language: Option<&str>,
    ) -> SelectionAction {
        if !self.is_enabled() {
            return SelectionAction::Ignored;
        }
        let text = text.trim();
        if text.is_empty() {
            return SelectionAction::Ignored;
        }
        let action = if self.speaking {
            engine.cancel();
            SelectionAction::Replaced
        } else {
            SelectionAction::Spoken
        };

        let id = UtteranceId::next();
        self.utterance = Some(id);
        self.speaking = true;
        debug!("Reading selection of {} chars", text.len());
        engine.speak(UtteranceRequest {
            id,
            text: text.to_string(),
            rate: self.rate(),
            voice: select_voice(&engine.voices(), language),
        });
        action
    }

    /// Apply an engine event. Returns false if it was not ours.
    pub fn handle_event(&mut self, event: &NarrationEvent) -> bool {
        if self.utterance != Some(event.utterance) {
            return false;
        }
        match &event.kind {
            NarrationEventKind::Started => self.speaking = true,
            NarrationEventKind::Ended | NarrationEventKind::Failed(_) => {
                self.speaking = false;
                self.utterance = None;
            }
        }
        true
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            enabled: self.is_enabled(),
            speaking: self.speaking,
            rate: self.rate(),
        }
    }
}
