//! Style-variable effects
//!
//! Direct value-to-variable mappings for the typography and colour
//! features. These have no lifecycle beyond set/clear.

use crate::host::StyleSink;
use crate::settings::{Feature, FeatureValue, SettingsMap};

pub const FONT_SCALE_VAR: &str = "--a11y-font-scale";
pub const FONT_WEIGHT_VAR: &str = "--a11y-font-weight";
pub const LETTER_SPACING_VAR: &str = "--a11y-letter-spacing";
pub const LINE_HEIGHT_VAR: &str = "--a11y-line-height";
pub const FILTER_VAR: &str = "--a11y-filter";

fn level_value(value: FeatureValue, high: &'static str, low: &'static str) -> Option<&'static str> {
    match value {
        FeatureValue::High => Some(high),
        FeatureValue::Low => Some(low),
        _ => None,
    }
}

fn filter_value(settings: &SettingsMap) -> Option<String> {
    let contrast = level_value(settings.get(Feature::Contrast), "contrast(1.5)", "contrast(0.75)");
    let saturation = level_value(settings.get(Feature::Saturation), "saturate(2)", "saturate(0)");
    let parts: Vec<&str> = [contrast, saturation].into_iter().flatten().collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}

/// Style variable and value for a feature, given the whole map.
/// `None` value means the variable should be cleared.
pub fn style_for(feature: Feature, settings: &SettingsMap) -> Option<(&'static str, Option<String>)> {
    let value = settings.get(feature);
    let entry = match feature {
        Feature::FontSize => (FONT_SCALE_VAR, level_value(value, "1.25", "0.875").map(str::to_string)),
        Feature::LetterSpacing => (
            LETTER_SPACING_VAR,
            level_value(value, "0.12em", "0.02em").map(str::to_string),
        ),
        Feature::LineHeight => (LINE_HEIGHT_VAR, level_value(value, "2", "1.2").map(str::to_string)),
        Feature::FontWeight => (FONT_WEIGHT_VAR, value.is_active().then(|| "700".to_string())),
        Feature::Contrast | Feature::Saturation => (FILTER_VAR, filter_value(settings)),
        _ => return None,
    };
    Some(entry)
}

/// Push the style effect of `feature` to the sink. Returns false for
/// features without a style mapping.
pub fn apply_style(feature: Feature, settings: &SettingsMap, sink: &dyn StyleSink) -> bool {
    match style_for(feature, settings) {
        Some((name, Some(value))) => {
            sink.set_var(name, &value);
            true
        }
        Some((name, None)) => {
            sink.clear_var(name);
            true
        }
        None => false,
    }
}

/// Clear every style variable this module may have set
pub fn clear_all(sink: &dyn StyleSink) {
    for name in [
        FONT_SCALE_VAR,
        FONT_WEIGHT_VAR,
        LETTER_SPACING_VAR,
        LINE_HEIGHT_VAR,
        FILTER_VAR,
    ] {
        sink.clear_var(name);
    }
}
