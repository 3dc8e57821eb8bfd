//! Widget Coordinator
//!
//! The single mountable widget. Owns the settings map and every effect it
//! drives (overlays, style variables, page and selection narration),
//! routes host events and panel commands, and reports notices to the
//! embedder. Dropping the widget unmounts it.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::NarrationError;
use crate::host::{Host, HostEvent, NarrationLink, StyleSink, Surface};
use crate::overlay::OverlayManager;
use crate::settings::style;
use crate::settings::{Feature, FeatureValue, SettingChange, SettingsMap};
use crate::shared::{Notice, WidgetCommand, WidgetStatus};
use crate::speech::source::resolve_source;
use crate::speech::{Progress, SelectionAction, SelectionReader, SpeechScheduler, UtteranceParams};

/// Mounted accessibility widget
pub struct Widget {
    surface: Arc<dyn Surface>,
    styles: Arc<dyn StyleSink>,
    narration: Option<NarrationLink>,
    config: AppConfig,
    settings: SettingsMap,
    overlays: OverlayManager,
    speech: SpeechScheduler,
    selection: SelectionReader,
    panel_open: bool,
    notice_tx: Sender<Notice>,
    notice_rx: Receiver<Notice>,
}

impl Widget {
    /// Mount over `host`. Every feature starts at its default.
    pub fn mount(host: Host, config: AppConfig) -> Self {
        let overlays = OverlayManager::new(
            host.surface.clone(),
            host.frames.clone(),
            host.styles.clone(),
            config.overlay.clone(),
        );
        let (notice_tx, notice_rx) = unbounded();

        info!(
            "Widget mounted (narration {})",
            if host.narration.is_some() {
                "available"
            } else {
                "unavailable"
            }
        );

        Self {
            surface: host.surface,
            styles: host.styles,
            narration: host.narration,
            selection: SelectionReader::new(config.selection.default_rate_step),
            config,
            settings: SettingsMap::new(),
            overlays,
            speech: SpeechScheduler::new(),
            panel_open: false,
            notice_tx,
            notice_rx,
        }
    }

    /// Apply a panel command
    pub fn execute(&mut self, command: WidgetCommand) {
        match command {
            WidgetCommand::OpenPanel => self.open_panel(),
            WidgetCommand::ClosePanel => self.close_panel(),
            WidgetCommand::TogglePanel => {
                self.toggle_panel();
            }
            WidgetCommand::Toggle(feature) => {
                self.toggle(feature);
            }
            WidgetCommand::ResetAll => {
                self.reset_all();
            }
            WidgetCommand::SetSelectionRate(step) => {
                self.selection.set_rate_step(step);
            }
            WidgetCommand::CycleSelectionRate => {
                self.selection.cycle_rate();
            }
        }
    }

    pub fn open_panel(&mut self) {
        self.panel_open = true;
    }

    pub fn close_panel(&mut self) {
        self.panel_open = false;
    }

    /// Returns the new panel state
    pub fn toggle_panel(&mut self) -> bool {
        self.panel_open = !self.panel_open;
        self.panel_open
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn settings(&self) -> &SettingsMap {
        &self.settings
    }

    /// Advance `feature` and run its effect. Returns the resulting value,
    /// which stays at the old value if the effect could not start.
    pub fn toggle(&mut self, feature: Feature) -> FeatureValue {
        let change = self.settings.toggle(feature);
        debug!("{}: {} -> {}", feature.key(), change.from.as_str(), change.to.as_str());
        self.apply(change);
        self.settings.get(feature)
    }

    /// Restore every feature to its default in one update. Overlays are
    /// torn down before any other effect runs. Returns the features that
    /// changed.
    pub fn reset_all(&mut self) -> Vec<Feature> {
        let mut changes = self.settings.reset_all();
        changes.sort_by_key(|change| change.feature.overlay_kind().is_none());
        info!("Reset {} features", changes.len());

        let changed = changes.iter().map(|change| change.feature).collect();
        for change in changes {
            self.apply(change);
        }
        changed
    }

    /// Current selection narration rate
    pub fn selection_rate(&self) -> f32 {
        self.selection.rate()
    }

    /// Deliver one host event
    pub fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Pointer { listener, event } => {
                self.overlays.dispatch_pointer(listener, &event);
            }
            HostEvent::Frame(frame) => {
                if !self.overlays.dispatch_frame(frame) {
                    debug!("Ignoring frame {:?} with no pending update", frame);
                }
            }
            HostEvent::Selection { listener, text } => {
                if !self.selection.owns_listener(listener) {
                    debug!("Ignoring selection for stale listener {:?}", listener);
                    return;
                }
                let language = self.language();
                let Some(link) = self.narration.as_ref() else {
                    return;
                };
                let action =
                    self.selection
                        .on_selection(&text, link.engine.as_ref(), language.as_deref());
                if action == SelectionAction::Replaced {
                    self.interrupt_page();
                }
            }
        }
    }

    pub fn handle_events(&mut self, events: impl IntoIterator<Item = HostEvent>) {
        for event in events {
            self.handle_event(event);
        }
    }

    /// Drain narration engine events. Returns how many were processed.
    pub fn pump(&mut self) -> usize {
        let Some(link) = self.narration.clone() else {
            return 0;
        };

        let mut processed = 0;
        while let Ok(event) = link.events.try_recv() {
            processed += 1;
            if self.selection.handle_event(&event) {
                continue;
            }

            let language = self.language();
            let params = UtteranceParams {
                rate: self.reading_rate(),
                language: language.as_deref(),
            };
            match self.speech.handle_event(&event, link.engine.as_ref(), params) {
                Progress::Finished => {
                    self.settings.set(Feature::ReadAloud, FeatureValue::Off);
                    self.notify(Notice::ReadingFinished);
                }
                Progress::Failed(err) => {
                    self.settings.set(Feature::ReadAloud, FeatureValue::Off);
                    self.notify(Notice::Narration(err));
                }
                Progress::Ignored => {
                    debug!("Dropping stale narration event for {:?}", event.utterance);
                }
                Progress::Captioned(_) | Progress::Advanced(_) => {}
            }
        }
        processed
    }

    /// Index and text of the sentence being spoken
    pub fn caption(&self) -> Option<(usize, &str)> {
        let index = self.speech.caption()?;
        Some((index, self.speech.caption_text()?))
    }

    pub fn speech(&self) -> &SpeechScheduler {
        &self.speech
    }

    pub fn selection(&self) -> &SelectionReader {
        &self.selection
    }

    pub fn overlays(&self) -> &OverlayManager {
        &self.overlays
    }

    /// Receiver for user-facing notices
    pub fn notices(&self) -> Receiver<Notice> {
        self.notice_rx.clone()
    }

    pub fn status(&self) -> WidgetStatus {
        WidgetStatus {
            panel_open: self.panel_open,
            features: self.settings.iter().collect(),
            overlays: self.overlays.mounted(),
            playback: self.speech.snapshot(),
            selection: self.selection.snapshot(),
            narration_available: self.narration.is_some(),
        }
    }

    /// Unmount explicitly; equivalent to dropping the widget
    pub fn unmount(self) {}

    fn apply(&mut self, change: SettingChange) {
        let SettingChange { feature, to, .. } = change;

        if let Some(kind) = feature.overlay_kind() {
            if to.is_active() {
                self.overlays.mount(kind);
            } else {
                self.overlays.unmount(kind);
            }
            return;
        }

        match feature {
            Feature::ReadAloud if to.is_active() => self.start_reading(),
            Feature::ReadAloud => self.stop_reading(),
            Feature::SelectToSpeak if to.is_active() => {
                if self.narration.is_none() {
                    self.reject(Feature::SelectToSpeak, NarrationError::Unavailable);
                } else {
                    self.selection.enable(self.surface.as_ref());
                }
            }
            Feature::SelectToSpeak => {
                let engine = self.narration.as_ref().map(|link| link.engine.as_ref());
                if self.selection.disable(self.surface.as_ref(), engine) {
                    self.interrupt_page();
                }
            }
            // Read before every utterance
            Feature::ReadingSpeed => {}
            _ => {
                style::apply_style(feature, &self.settings, self.styles.as_ref());
            }
        }
    }

    fn start_reading(&mut self) {
        let Some(link) = self.narration.as_ref() else {
            self.reject(Feature::ReadAloud, NarrationError::Unavailable);
            return;
        };

        let text = resolve_source(self.surface.as_ref());
        let language = self.language();
        let params = UtteranceParams {
            rate: self.reading_rate(),
            language: language.as_deref(),
        };
        match self.speech.start(&text, link.engine.as_ref(), params) {
            Ok(_) => {
                // Starting cancelled the engine, selection audio included
                if self.selection.interrupt() {
                    debug!("Page narration replaced the selection utterance");
                }
            }
            Err(err) => self.reject(Feature::ReadAloud, err),
        }
    }

    fn stop_reading(&mut self) {
        let Some(link) = self.narration.as_ref() else {
            return;
        };
        if self.speech.stop(link.engine.as_ref()) && self.selection.interrupt() {
            debug!("Stopping page narration silenced the selection utterance");
        }
    }

    /// Selection narration cancelled the engine under page playback
    fn interrupt_page(&mut self) {
        if self.speech.interrupt() {
            self.settings.set(Feature::ReadAloud, FeatureValue::Off);
            self.notify(Notice::ReadingInterrupted);
        }
    }

    /// Put `feature` back to off and tell the user why
    fn reject(&mut self, feature: Feature, err: NarrationError) {
        self.settings.set(feature, FeatureValue::Off);
        self.notify(Notice::Narration(err));
    }

    fn notify(&self, notice: Notice) {
        match &notice {
            Notice::Narration(err) => warn!("{}", err),
            Notice::ReadingFinished => info!("Finished reading"),
            Notice::ReadingInterrupted => info!("Reading interrupted by selection narration"),
        }
        // Receiver lives in self, so the channel cannot be closed here
        let _ = self.notice_tx.send(notice);
    }

    fn reading_rate(&self) -> f32 {
        self.config
            .speech
            .rate_for(self.settings.get(Feature::ReadingSpeed))
    }

    fn language(&self) -> Option<String> {
        self.config
            .speech
            .language
            .clone()
            .or_else(|| self.surface.language())
    }
}

impl Drop for Widget {
    fn drop(&mut self) {
        self.overlays.unmount_all();
        let engine = self.narration.as_ref().map(|link| link.engine.as_ref());
        if let Some(engine) = engine {
            self.speech.stop(engine);
        }
        self.selection.disable(self.surface.as_ref(), engine);
        style::clear_all(self.styles.as_ref());
        info!("Widget unmounted");
    }
}
