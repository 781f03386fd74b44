//! Configuration for the steering client

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use steer_shared::{ClassifierSettings, FrameSize, KeyBindings};

/// Client configuration, loaded from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Gesture thresholds
    pub classifier: ClassifierSettings,

    /// Size of the frames the detector reports on
    pub frame: FrameSize,

    /// Physical keys for each virtual key
    pub bindings: KeyBindings,
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse config")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize config")
    }

    pub fn validate(&self) -> Result<()> {
        let classifier = &self.classifier;
        if classifier.dead_zone_px.is_nan() || classifier.dead_zone_px <= 0.0 {
            bail!("Dead zone must be greater than 0 pixels");
        }
        let margins = [classifier.thumb_ip_margin, classifier.thumb_wrist_margin];
        if margins.iter().any(|m| m.is_nan() || *m < 0.0) {
            bail!("Thumbs-up margins must not be negative");
        }
        if !(1..=2).contains(&classifier.max_hands) {
            bail!("Max hands must be 1 or 2");
        }
        if self.frame.width == 0 || self.frame.height == 0 {
            bail!("Frame size must be non-zero");
        }
        if !self.bindings.is_distinct() {
            bail!("Each virtual key needs its own physical key");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steer_shared::KeyCode;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.classifier.dead_zone_px, 50.0);
        assert_eq!(config.frame, FrameSize::new(640, 480));
        assert_eq!(config.bindings, KeyBindings::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let config = Config::from_json(
            r#"{"classifier":{"dead_zone_px":80.0},"bindings":{"boost":"shift"}}"#,
        )?;
        assert_eq!(config.classifier.dead_zone_px, 80.0);
        assert_eq!(config.classifier.thumb_ip_margin, 0.04);
        assert_eq!(config.bindings.boost, KeyCode::Shift);
        assert_eq!(config.bindings.forward, KeyCode::Char('w'));
        assert_eq!(config.frame, FrameSize::default());
        Ok(())
    }

    #[test]
    fn test_round_trip_through_json() -> Result<()> {
        let config = Config {
            frame: FrameSize::new(1280, 720),
            ..Config::default()
        };
        assert_eq!(Config::from_json(&config.to_json()?)?, config);
        Ok(())
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.classifier.dead_zone_px = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.classifier.max_hands = 3;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.frame.height = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.bindings.left = KeyCode::Char('w');
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.classifier.thumb_wrist_margin = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_reports_missing_path() {
        assert!(Config::from_file("/nonexistent/steer.json").is_err());
    }
}
