//! Widget Configuration
//!
//! Tunable constants for overlays and narration, stored in TOML format.
//! Feature values chosen in the settings panel are never written here.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::overlay::paint::Rgba;
use crate::settings::FeatureValue;

/// Widget configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Overlay geometry and throttling
    pub overlay: OverlaySettings,
    /// Page narration settings
    pub speech: SpeechSettings,
    /// Selection narration settings
    pub selection: SelectionSettings,
}

/// Overlay-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Height of the clear band in the reading mask
    pub mask_band_height: f32,
    /// Opacity of the shaded area outside the band
    pub mask_opacity: f32,
    /// Minimum vertical movement before the mask is recomputed
    pub mask_threshold: f32,
    /// Reading guide line thickness
    pub guide_thickness: f32,
    /// Reading guide line colour
    pub guide_color: Rgba,
    /// Lens diameter
    pub magnifier_diameter: f32,
    /// Lens zoom factor
    pub magnifier_zoom: f32,
    /// Minimum movement on either axis before the lens is recomputed
    pub magnifier_threshold: f32,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            mask_band_height: 100.0,
            mask_opacity: 0.65,
            mask_threshold: 5.0,
            guide_thickness: 2.0,
            guide_color: Rgba::new(255, 0, 0, 1.0),
            magnifier_diameter: 200.0,
            magnifier_zoom: 1.5,
            magnifier_threshold: 10.0,
        }
    }
}

/// Page narration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    /// Preferred voice language; `None` uses the host's language
    pub language: Option<String>,
    /// Rate for `readingSpeed = low`
    pub low_rate: f32,
    /// Rate for `readingSpeed = default`
    pub default_rate: f32,
    /// Rate for `readingSpeed = high`
    pub high_rate: f32,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            language: None,
            low_rate: 0.7,
            default_rate: 1.0,
            high_rate: 1.5,
        }
    }
}

impl SpeechSettings {
    /// Utterance rate for a reading-speed value
    pub fn rate_for(&self, speed: FeatureValue) -> f32 {
        match speed {
            FeatureValue::Low => self.low_rate,
            FeatureValue::High => self.high_rate,
            _ => self.default_rate,
        }
    }
}

/// Selection narration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    /// Index into the selection rate steps used at mount
    pub default_rate_step: usize,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            default_rate_step: 2,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file, creating its directory if needed
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Default location of `config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("org", "a11y-overlay", "a11y-overlay")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        assert_eq!(config.overlay.mask_band_height, 100.0);
        assert!((config.overlay.mask_opacity - 0.65).abs() < 0.001);
        assert_eq!(config.overlay.mask_threshold, 5.0);
        assert_eq!(config.overlay.guide_thickness, 2.0);
        assert_eq!(config.overlay.magnifier_diameter, 200.0);
        assert_eq!(config.overlay.magnifier_zoom, 1.5);
        assert_eq!(config.overlay.magnifier_threshold, 10.0);

        assert!(config.speech.language.is_none());
        assert_eq!(config.selection.default_rate_step, 2);
    }

    #[test]
    fn test_rate_for_reading_speed() {
        let speech = SpeechSettings::default();
        assert_eq!(speech.rate_for(FeatureValue::Low), 0.7);
        assert_eq!(speech.rate_for(FeatureValue::Default), 1.0);
        assert_eq!(speech.rate_for(FeatureValue::High), 1.5);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
            [speech]
            language = "fr-FR"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.speech.language.as_deref(), Some("fr-FR"));
        assert_eq!(parsed.speech.high_rate, 1.5);
        assert_eq!(parsed.overlay.mask_band_height, 100.0);
    }

    #[test]
    fn test_save_and_load_config() {
        let mut config = AppConfig::default();
        config.overlay.magnifier_zoom = 2.0;
        config.speech.language = Some("de-DE".to_string());

        let temp_file = NamedTempFile::new().unwrap();
        save_config(&config, temp_file.path()).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert_eq!(loaded.overlay.magnifier_zoom, 2.0);
        assert_eq!(loaded.speech.language.as_deref(), Some("de-DE"));
        assert_eq!(loaded.overlay.guide_color, config.overlay.guide_color);
    }

    #[test]
    fn test_save_config_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a11y-overlay").join("config.toml");
        let mut config = AppConfig::default();
        config.selection.default_rate_step = 4;

        save_config(&config, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[overlay]"));
        assert!(content.contains("[selection]"));
        assert_eq!(load_config(&path).unwrap().selection.default_rate_step, 4);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }
}
