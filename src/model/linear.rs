//! Standardized linear regression pipeline loaded from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::explain::{Attribution, Contribution};
use super::RulModel;
use crate::error::{Result, RulError};

/// Per-feature standardization: `z = (x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// A fitted pipeline: standard scaler followed by a linear regressor.
///
/// ```json
/// {
///   "feature_names": ["sensor_2", "sensor_3"],
///   "scaler": { "mean": [642.0, 1590.0], "scale": [0.5, 6.1] },
///   "coefficients": [-12.5, -8.1],
///   "intercept": 105.0,
///   "clip_min": 0.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearPipeline {
    pub feature_names: Vec<String>,
    pub scaler: StandardScaler,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_max: Option<f64>,
}

impl LinearPipeline {
    /// Load and validate a pipeline from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let pipeline: Self = serde_json::from_str(content)?;
        pipeline.validate()?;
        Ok(pipeline)
    }

    fn validate(&self) -> Result<()> {
        let n = self.feature_names.len();
        if n == 0 {
            return Err(RulError::Inference("model has no features".into()));
        }
        if self.scaler.mean.len() != n || self.scaler.scale.len() != n || self.coefficients.len() != n
        {
            return Err(RulError::Inference(format!(
                "model shape mismatch: {} features, {} means, {} scales, {} coefficients",
                n,
                self.scaler.mean.len(),
                self.scaler.scale.len(),
                self.coefficients.len()
            )));
        }
        if let Some(i) = self.scaler.scale.iter().position(|s| !s.is_finite() || *s == 0.0) {
            return Err(RulError::Inference(format!(
                "scale for feature {} must be finite and non-zero",
                self.feature_names[i]
            )));
        }
        Ok(())
    }

    fn check_len(&self, features: &[f64]) -> Result<()> {
        if features.len() == self.feature_names.len() {
            Ok(())
        } else {
            Err(RulError::Inference(format!(
                "expected {} features, got {}",
                self.feature_names.len(),
                features.len()
            )))
        }
    }

    /// Contribution of each feature to the raw (unclipped) prediction.
    fn contributions<'a>(&'a self, features: &'a [f64]) -> impl Iterator<Item = f64> + 'a {
        let scaler = &self.scaler;
        features
            .iter()
            .zip(&self.coefficients)
            .enumerate()
            .map(move |(i, (x, coef))| coef * (x - scaler.mean[i]) / scaler.scale[i])
    }

    fn clip(&self, value: f64) -> f64 {
        let value = self.clip_min.map_or(value, |lo| value.max(lo));
        self.clip_max.map_or(value, |hi| value.min(hi))
    }
}

impl RulModel for LinearPipeline {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        self.check_len(features)?;
        let raw = self.intercept + self.contributions(features).sum::<f64>();
        if raw.is_finite() {
            Ok(self.clip(raw))
        } else {
            Err(RulError::Inference("prediction is not finite".into()))
        }
    }

    /// Exact Shapley values for a linear model with the scaler mean as the
    /// background: `phi_i = coef_i * (x_i - mean_i) / scale_i`.
    fn explain(&self, features: &[f64]) -> Result<Attribution> {
        self.check_len(features)?;
        let contributions = self
            .feature_names
            .iter()
            .zip(features)
            .zip(self.contributions(features))
            .map(|((name, &value), contribution)| Contribution {
                feature: name.clone(),
                value,
                contribution,
            })
            .collect();
        Ok(Attribution::new(self.intercept, contributions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"{
        "feature_names": ["sensor_2", "sensor_3"],
        "scaler": { "mean": [642.0, 1590.0], "scale": [0.5, 5.0] },
        "coefficients": [-10.0, -4.0],
        "intercept": 100.0,
        "clip_min": 0.0
    }"#;

    #[test]
    fn test_predict() {
        let model = LinearPipeline::parse(MODEL).unwrap();
        // z = [1.0, 2.0] -> 100 - 10 - 8
        let rul = model.predict(&[642.5, 1600.0]).unwrap();
        assert!((rul - 82.0).abs() < 1e-9);
    }

    #[test]
    fn test_predict_is_clipped() {
        let model = LinearPipeline::parse(MODEL).unwrap();
        assert_eq!(model.predict(&[700.0, 1600.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_wrong_feature_count() {
        let model = LinearPipeline::parse(MODEL).unwrap();
        assert!(matches!(model.predict(&[1.0]), Err(RulError::Inference(_))));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let bad = r#"{
            "feature_names": ["a", "b"],
            "scaler": { "mean": [0.0], "scale": [1.0] },
            "coefficients": [1.0, 2.0],
            "intercept": 0.0
        }"#;
        assert!(matches!(LinearPipeline::parse(bad), Err(RulError::Inference(_))));
    }

    #[test]
    fn test_zero_scale_rejected() {
        let bad = r#"{
            "feature_names": ["a"],
            "scaler": { "mean": [0.0], "scale": [0.0] },
            "coefficients": [1.0],
            "intercept": 0.0
        }"#;
        let err = LinearPipeline::parse(bad).unwrap_err();
        assert!(err.to_string().contains("feature a"));
    }

    #[test]
    fn test_attributions_sum_to_prediction() {
        let model = LinearPipeline::parse(MODEL).unwrap();
        let features = [642.5, 1600.0];
        let attribution = model.explain(&features).unwrap();
        assert_eq!(attribution.base_value, 100.0);
        assert!((attribution.output() - 82.0).abs() < 1e-9);
        assert_eq!(attribution.contributions[0].feature, "sensor_2");
        assert!((attribution.contributions[0].contribution + 10.0).abs() < 1e-9);
    }
}
