//! Serializable widget status

use serde::Serialize;
use std::collections::BTreeMap;

use crate::overlay::OverlayKind;
use crate::settings::{Feature, FeatureValue};
use crate::speech::PlaybackStatus;

/// Page narration state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub status: PlaybackStatus,
    /// Sentence being spoken or about to be spoken
    pub current_index: usize,
    /// Text of the sentence the engine reported as started
    pub caption: Option<String>,
    pub rate: f32,
    pub queue_len: usize,
}

/// Selection narration state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionSnapshot {
    pub enabled: bool,
    pub speaking: bool,
    pub rate: f32,
}

/// Everything an embedder may want to display about the widget
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetStatus {
    pub panel_open: bool,
    pub features: BTreeMap<Feature, FeatureValue>,
    pub overlays: Vec<OverlayKind>,
    pub playback: PlaybackSnapshot,
    pub selection: SelectionSnapshot,
    pub narration_available: bool,
}

impl WidgetStatus {
    /// Features not at their default value
    pub fn active_features(&self) -> Vec<Feature> {
        self.features
            .iter()
            .filter(|(_, value)| value.is_active())
            .map(|(feature, _)| *feature)
            .collect()
    }
}
