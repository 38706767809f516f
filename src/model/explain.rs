//! Feature attributions for a single prediction.

use serde::Serialize;

/// The contribution of one feature to a prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub feature: String,
    /// Raw feature value in the explained row.
    pub value: f64,
    /// Shift of the prediction away from the base value due to this feature.
    pub contribution: f64,
}

/// Additive explanation of a prediction: `base_value + sum(contributions)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribution {
    pub base_value: f64,
    /// Sorted by absolute contribution, largest first.
    pub contributions: Vec<Contribution>,
}

impl Attribution {
    pub fn new(base_value: f64, mut contributions: Vec<Contribution>) -> Self {
        contributions.sort_by(|a, b| {
            b.contribution
                .abs()
                .total_cmp(&a.contribution.abs())
                .then_with(|| a.feature.cmp(&b.feature))
        });
        Self {
            base_value,
            contributions,
        }
    }

    /// Model output reconstructed from the attribution (before any clipping).
    pub fn output(&self) -> f64 {
        self.base_value + self.contributions.iter().map(|c| c.contribution).sum::<f64>()
    }

    /// Largest absolute contribution, used to scale bars.
    pub fn max_magnitude(&self) -> f64 {
        self.contributions.first().map(|c| c.contribution.abs()).unwrap_or(0.0)
    }
}
