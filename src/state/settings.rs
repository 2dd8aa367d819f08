use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::data_series::LineColor;
use crate::state::theme::Theme;
use crate::state::viewport::{DEFAULT_MAX, DEFAULT_MIN};

/// Number of uniform intervals each sampling pass divides the domain into.
pub const DEFAULT_NUMBER_OF_STEPS: usize = 100;

/// Debounce delay for pan/zoom driven recomputes.
pub const EVAL_DELAY_MILLIS: u64 = 200;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// User preferences for the plotter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    pub steps: usize,
    pub viewport_delay_ms: u64,
    pub initial_delay_ms: u64,
    pub default_min: f64,
    pub default_max: f64,
    /// Join samples with lines; when off only the sample points are drawn.
    pub interpolate: bool,
    pub real_line_color: LineColor,
    pub imag_line_color: LineColor,
    pub theme: Theme,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            steps: DEFAULT_NUMBER_OF_STEPS,
            viewport_delay_ms: EVAL_DELAY_MILLIS,
            initial_delay_ms: 0,
            default_min: DEFAULT_MIN,
            default_max: DEFAULT_MAX,
            interpolate: true,
            real_line_color: LineColor::White,
            imag_line_color: LineColor::Blue,
            theme: Theme::default(),
        }
    }
}

impl PlotSettings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: PlotSettings = serde_json::from_str(json)?;
        Ok(settings.validated())
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        tracing::info!("Loaded plot settings from {:?}", path);
        Ok(settings)
    }

    /// Load `path`, keeping `fallback` when the file is absent or unusable.
    pub fn load_or(path: &Path, fallback: Self) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(SettingsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings file at {:?} yet", path);
                fallback
            }
            Err(e) => {
                tracing::warn!("Ignoring settings file {:?}: {e}", path);
                fallback
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_json()?)?;
        tracing::info!("Saved plot settings to {:?}", path);
        Ok(())
    }

    /// Replace values that cannot drive a sampling pass with defaults.
    pub fn validated(mut self) -> Self {
        if self.steps == 0 {
            tracing::warn!("Step count 0 is not usable, using {DEFAULT_NUMBER_OF_STEPS}");
            self.steps = DEFAULT_NUMBER_OF_STEPS;
        }
        let range_ok = self.default_min.is_finite()
            && self.default_max.is_finite()
            && self.default_min < self.default_max;
        if !range_ok {
            tracing::warn!(
                "Default range [{}, {}] is not usable, using [{DEFAULT_MIN}, {DEFAULT_MAX}]",
                self.default_min,
                self.default_max
            );
            self.default_min = DEFAULT_MIN;
            self.default_max = DEFAULT_MAX;
        }
        self
    }

    pub fn viewport_delay(&self) -> Duration {
        Duration::from_millis(self.viewport_delay_ms)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings = PlotSettings::from_json(r#"{ "steps": 40, "interpolate": false }"#).unwrap();
        assert_eq!(settings.steps, 40);
        assert!(!settings.interpolate);
        assert_eq!(settings.viewport_delay_ms, EVAL_DELAY_MILLIS);
        assert_eq!(settings.real_line_color, LineColor::White);
        assert_eq!(settings.imag_line_color, LineColor::Blue);
    }

    #[test]
    fn unusable_values_are_replaced() {
        let settings =
            PlotSettings::from_json(r#"{ "steps": 0, "default_min": 5.0, "default_max": 1.0 }"#)
                .unwrap();
        assert_eq!(settings.steps, DEFAULT_NUMBER_OF_STEPS);
        assert_eq!(settings.default_min, DEFAULT_MIN);
        assert_eq!(settings.default_max, DEFAULT_MAX);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            PlotSettings::from_json("{ steps: }"),
            Err(SettingsError::Json(_))
        ));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = PlotSettings {
            steps: 250,
            imag_line_color: LineColor::Green,
            theme: Theme::Light,
            ..PlotSettings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(PlotSettings::load(&path).unwrap(), settings);
    }

    #[test]
    fn load_or_keeps_fallback_for_absent_or_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = PlotSettings {
            steps: 42,
            ..PlotSettings::default()
        };
        let absent = dir.path().join("absent.json");
        assert_eq!(PlotSettings::load_or(&absent, fallback.clone()), fallback);

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "not json").unwrap();
        assert_eq!(PlotSettings::load_or(&broken, fallback.clone()), fallback);

        let good = dir.path().join("good.json");
        std::fs::write(&good, r#"{ "steps": 7 }"#).unwrap();
        assert_eq!(PlotSettings::load_or(&good, fallback).steps, 7);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            PlotSettings::load(&dir.path().join("absent.json")),
            Err(SettingsError::Io(_))
        ));
    }
}
