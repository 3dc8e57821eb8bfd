//! Settings Store
//!
//! Current value of every feature in the panel. Values live only as long
//! as the mounted widget; nothing here is persisted.

pub mod style;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::overlay::OverlayKind;

/// Every feature exposed in the settings panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    FontSize,
    FontWeight,
    LetterSpacing,
    LineHeight,
    Contrast,
    Saturation,
    ReadingMask,
    ReadingGuide,
    Magnifier,
    StopAnimations,
    ReadingSpeed,
    ReadAloud,
    SelectToSpeak,
}

/// Value domain of a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueDomain {
    /// `off` / `on`
    Binary,
    /// `default` / `high` / `low`
    Level,
}

impl Feature {
    pub const ALL: [Feature; 13] = [
        Feature::FontSize,
        Feature::FontWeight,
        Feature::LetterSpacing,
        Feature::LineHeight,
        Feature::Contrast,
        Feature::Saturation,
        Feature::ReadingMask,
        Feature::ReadingGuide,
        Feature::Magnifier,
        Feature::StopAnimations,
        Feature::ReadingSpeed,
        Feature::ReadAloud,
        Feature::SelectToSpeak,
    ];

    /// Panel key
    pub fn key(&self) -> &'static str {
        match self {
            Feature::FontSize => "fontSize",
            Feature::FontWeight => "fontWeight",
            Feature::LetterSpacing => "letterSpacing",
            Feature::LineHeight => "lineHeight",
            Feature::Contrast => "contrast",
            Feature::Saturation => "saturation",
            Feature::ReadingMask => "readingMask",
            Feature::ReadingGuide => "readingGuide",
            Feature::Magnifier => "magnifier",
            Feature::StopAnimations => "stopAnimations",
            Feature::ReadingSpeed => "readingSpeed",
            Feature::ReadAloud => "readAloud",
            Feature::SelectToSpeak => "selectToSpeak",
        }
    }

    /// Look a feature up by its panel key
    pub fn from_key(key: &str) -> Option<Feature> {
        Feature::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn domain(&self) -> ValueDomain {
        match self {
            Feature::FontSize
            | Feature::LetterSpacing
            | Feature::LineHeight
            | Feature::Contrast
            | Feature::Saturation
            | Feature::ReadingSpeed => ValueDomain::Level,
            _ => ValueDomain::Binary,
        }
    }

    /// Overlay driven by this feature, if any
    pub fn overlay_kind(&self) -> Option<OverlayKind> {
        match self {
            Feature::ReadingMask => Some(OverlayKind::ReadingMask),
            Feature::ReadingGuide => Some(OverlayKind::ReadingGuide),
            Feature::Magnifier => Some(OverlayKind::Magnifier),
            Feature::StopAnimations => Some(OverlayKind::StopAnimations),
            _ => None,
        }
    }
}

/// Value of a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureValue {
    Off,
    On,
    Default,
    High,
    Low,
}

impl FeatureValue {
    /// Starting value for a domain
    pub fn initial(domain: ValueDomain) -> Self {
        match domain {
            ValueDomain::Binary => FeatureValue::Off,
            ValueDomain::Level => FeatureValue::Default,
        }
    }

    /// Next value in the toggle cycle
    pub fn next(self) -> Self {
        match self {
            FeatureValue::Off => FeatureValue::On,
            FeatureValue::On => FeatureValue::Off,
            FeatureValue::Default => FeatureValue::High,
            FeatureValue::High => FeatureValue::Low,
            FeatureValue::Low => FeatureValue::Default,
        }
    }

    /// Anything other than `off` / `default`
    pub fn is_active(self) -> bool {
        !matches!(self, FeatureValue::Off | FeatureValue::Default)
    }

    pub fn domain(self) -> ValueDomain {
        match self {
            FeatureValue::Off | FeatureValue::On => ValueDomain::Binary,
            _ => ValueDomain::Level,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureValue::Off => "off",
            FeatureValue::On => "on",
            FeatureValue::Default => "default",
            FeatureValue::High => "high",
            FeatureValue::Low => "low",
        }
    }
}

/// A single value transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingChange {
    pub feature: Feature,
    pub from: FeatureValue,
    pub to: FeatureValue,
}

/// Values of all features
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsMap {
    values: BTreeMap<Feature, FeatureValue>,
}

impl Default for SettingsMap {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsMap {
    /// Every feature at its default / off value
    pub fn new() -> Self {
        let values = Feature::ALL
            .into_iter()
            .map(|f| (f, FeatureValue::initial(f.domain())))
            .collect();
        Self { values }
    }

    pub fn get(&self, feature: Feature) -> FeatureValue {
        self.values
            .get(&feature)
            .copied()
            .unwrap_or_else(|| FeatureValue::initial(feature.domain()))
    }

    pub fn is_on(&self, feature: Feature) -> bool {
        self.get(feature).is_active()
    }

    /// Advance a feature to the next value in its cycle
    pub fn toggle(&mut self, feature: Feature) -> SettingChange {
        let from = self.get(feature);
        let to = from.next();
        self.values.insert(feature, to);
        SettingChange { feature, from, to }
    }

    /// Set a feature directly. Returns `None` if the value is unchanged or
    /// outside the feature's domain.
    pub fn set(&mut self, feature: Feature, value: FeatureValue) -> Option<SettingChange> {
        if value.domain() != feature.domain() {
            return None;
        }
        let from = self.get(feature);
        if from == value {
            return None;
        }
        self.values.insert(feature, value);
        Some(SettingChange {
            feature,
            from,
            to: value,
        })
    }

    /// Restore every feature at once. Returns only the features that changed.
    pub fn reset_all(&mut self) -> Vec<SettingChange> {
        let fresh = SettingsMap::new();
        let changes = Feature::ALL
            .into_iter()
            .filter_map(|f| {
                let from = self.get(f);
                let to = fresh.get(f);
                (from != to).then_some(SettingChange { feature: f, from, to })
            })
            .collect();
        *self = fresh;
        changes
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, FeatureValue)> + '_ {
        self.values.iter().map(|(f, v)| (*f, *v))
    }
}
