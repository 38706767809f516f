//! Layered settings: defaults, an optional TOML file, then `RULWATCH_*` environment variables.
//!
//! ```toml
//! data_path = "05_Results/predictions_validation_FD001.csv"
//! refresh_secs = 2
//!
//! [thresholds]
//! warning = 80.0
//! critical = 50.0
//!
//! [columns]
//! unit = "unit_id"
//! ```
//!
//! Nested keys map to environment variables with a double underscore, e.g.
//! `RULWATCH_THRESHOLDS__WARNING=35`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::{Schema, Thresholds};

/// Threshold values and the range the interactive controls may move them in.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThresholdSettings {
    pub warning: f64,
    pub critical: f64,
    pub slider_min: f64,
    pub slider_max: f64,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        let t = Thresholds::default();
        Self {
            warning: t.warning,
            critical: t.critical,
            slider_min: 10.0,
            slider_max: 50.0,
        }
    }
}

impl ThresholdSettings {
    /// Range for the interactive controls, widened to contain the configured
    /// thresholds so neither starts pinned against a bound it cannot cross.
    pub fn slider_bounds(&self) -> (f64, f64) {
        (
            self.slider_min.min(self.critical),
            self.slider_max.max(self.warning),
        )
    }
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Predictions CSV to monitor.
    pub data_path: PathBuf,
    /// Polling interval for the predictions file, in seconds.
    pub refresh_secs: u64,
    pub thresholds: ThresholdSettings,
    pub columns: Schema,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("predictions.csv"),
            refresh_secs: 1,
            thresholds: ThresholdSettings::default(),
            columns: Schema::default(),
        }
    }
}

impl Settings {
    /// Load settings from an optional file layered under the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix("RULWATCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to read configuration")?;

        let settings: Settings =
            config.try_deserialize().context("invalid configuration values")?;
        settings.validated_thresholds()?;
        Ok(settings)
    }

    /// The configured thresholds, checked for `critical < warning`.
    pub fn validated_thresholds(&self) -> Result<Thresholds> {
        let ThresholdSettings {
            warning,
            critical,
            slider_min,
            slider_max,
        } = self.thresholds;
        if !(slider_min < slider_max) {
            anyhow::bail!("slider range [{slider_min}, {slider_max}] is empty");
        }
        Ok(Thresholds::new(warning, critical)?)
    }
}
