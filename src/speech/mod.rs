//! Page Narration
//!
//! Reads the page (or the active selection) aloud one sentence at a time.
//! Playback is an explicit state machine driven by engine lifecycle
//! events; each event is matched against the utterance currently in
//! flight, so callbacks arriving after a stop or restart are dropped.

pub mod segment;
pub mod selection;
pub mod source;
pub mod voice;

pub use segment::SentenceQueue;
pub use selection::{SelectionAction, SelectionReader};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::NarrationError;
use crate::host::{NarrationEngine, NarrationEvent, NarrationEventKind, UtteranceId, UtteranceRequest};
use crate::shared::PlaybackSnapshot;
use voice::select_voice;

/// Page narration status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Speaking,
}

/// Settings read fresh before every utterance
#[derive(Debug, Clone, Copy)]
pub struct UtteranceParams<'a> {
    pub rate: f32,
    pub language: Option<&'a str>,
}

/// What an engine event did to playback
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// Event belonged to no live utterance
    Ignored,
    /// Sentence at this index started speaking
    Captioned(usize),
    /// Moved on to the sentence at this index
    Advanced(usize),
    /// Last sentence finished; playback is idle
    Finished,
    /// Engine error; remaining sentences dropped, playback is idle
    Failed(NarrationError),
}

/// Sentence-by-sentence page narrator
#[derive(Debug, Default)]
pub struct SpeechScheduler {
    queue: SentenceQueue,
    status: PlaybackStatus,
    current_index: usize,
    caption: Option<usize>,
    utterance: Option<UtteranceId>,
    rate: f32,
}

impl SpeechScheduler {
    pub fn new() -> Self {
        Self {
            rate: 1.0,
            ..Self::default()
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn is_speaking(&self) -> bool {
        self.status == PlaybackStatus::Speaking
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Index of the sentence currently being spoken
    pub fn caption(&self) -> Option<usize> {
        self.caption
    }

    pub fn caption_text(&self) -> Option<&str> {
        self.caption.and_then(|index| self.queue.get(index))
    }

    pub fn queue(&self) -> &SentenceQueue {
        &self.queue
    }

    /// Rate of the most recent utterance
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Start narrating `text`, cancelling whatever the engine is doing.
    /// Returns the number of sentences queued.
    pub fn start(
        &mut self,
        text: &str,
        engine: &dyn NarrationEngine,
        params: UtteranceParams<'_>,
    ) -> Result<usize, NarrationError> {
        let queue = SentenceQueue::split(text);
        if queue.is_empty() {
            return Err(NarrationError::NothingToRead);
        }

        engine.cancel();
        self.reset();
        self.queue = queue;
        self.status = PlaybackStatus::Speaking;
        info!("Narration started: {} sentences", self.queue.len());
        self.speak_current(engine, params);
        Ok(self.queue.len())
    }

    /// Stop immediately. Returns false if nothing was playing.
    pub fn stop(&mut self, engine: &dyn NarrationEngine) -> bool {
        if !self.is_speaking() {
            return false;
        }
        engine.cancel();
        self.reset();
        info!("Narration stopped");
        true
    }

    /// Drop playback after the engine was cancelled on behalf of selection
    /// narration. Returns false if nothing was playing.
    pub fn interrupt(&mut self) -> bool {
        if !self.is_speaking() {
            return false;
        }
        self.reset();
        info!("Narration interrupted");
        true
    }

    /// Apply an engine lifecycle event
    pub fn handle_event(
        &mut self,
        event: &NarrationEvent,
        engine: &dyn NarrationEngine,
        params: UtteranceParams<'_>,
    ) -> Progress {
        if !self.is_speaking() || self.utterance != Some(event.utterance) {
            return Progress::Ignored;
        }

        match &event.kind {
            NarrationEventKind::Started => {
                self.caption = Some(self.current_index);
                debug!("Speaking sentence {}", self.current_index);
                Progress::Captioned(self.current_index)
            }
            NarrationEventKind::Ended => {
                let next = self.current_index + 1;
                if next < self.queue.len() {
                    self.current_index = next;
                    self.speak_current(engine, params);
                    Progress::Advanced(next)
                } else {
                    self.reset();
                    info!("Narration finished");
                    Progress::Finished
                }
            }
            NarrationEventKind::Failed(message) => {
                warn!(
                    "Narration failed at sentence {}: {}",
                    self.current_index, message
                );
                self.reset();
                Progress::Failed(NarrationError::Engine(message.clone()))
            }
        }
    }

    /// Whether `utterance` is the one in flight
    pub fn owns(&self, utterance: UtteranceId) -> bool {
        self.utterance == Some(utterance)
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            status: self.status,
            current_index: self.current_index,
            caption: self.caption_text().map(str::to_string),
            rate: self.rate,
            queue_len: self.queue.len(),
        }
    }

    fn speak_current(&mut self, engine: &dyn NarrationEngine, params: UtteranceParams<'_>) {
        let Some(text) = self.queue.get(self.current_index) else {
            return;
        };
        let id = UtteranceId::next();
        let request = UtteranceRequest {
            id,
            text: text.to_string(),
            rate: params.rate,
            voice: select_voice(&engine.voices(), params.language),
        };
        self.utterance = Some(id);
        self.rate = params.rate;
        engine.speak(request);
    }

    fn reset(&mut self) {
        self.queue = SentenceQueue::default();
        self.status = PlaybackStatus::Idle;
        self.current_index = 0;
        self.caption = None;
        self.utterance = None;
    }
}
