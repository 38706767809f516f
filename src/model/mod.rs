//! Model inference and explainability.
//!
//! The dashboard normally consumes precomputed predictions. When it is given
//! a validation feature table and a fitted model instead, this module computes
//! `predicted_RUL` per row and can explain a single prediction.

mod explain;
mod features;
mod linear;

pub use explain::{Attribution, Contribution};
pub use features::{FeatureRow, FeatureTable};
pub use linear::{LinearPipeline, StandardScaler};

use std::fmt::Debug;

use crate::data::{Dataset, Reading, UnitId};
use crate::error::{Result, RulError};

/// A regression model that predicts RUL from a feature vector.
///
/// Feature vectors are ordered as [`RulModel::feature_names`].
pub trait RulModel: Send + Debug {
    /// Names of the input features, in the order `predict` expects them.
    fn feature_names(&self) -> &[String];

    /// Predict the remaining useful life for one row.
    fn predict(&self, features: &[f64]) -> Result<f64>;

    /// Attribute a prediction to its input features.
    fn explain(&self, features: &[f64]) -> Result<Attribution>;
}

/// Run the model over every row of a feature table.
///
/// Columns the model does not name are dropped before inference. Any failure
/// is reported as an inference error.
pub fn predict_table(model: &dyn RulModel, table: &FeatureTable) -> Result<Dataset> {
    let names = model.feature_names();
    let projection = table.projection(names)?;

    let readings = table
        .rows()
        .iter()
        .map(|row| {
            let features = FeatureTable::project_row(row, &projection, names)?;
            let rul = model.predict(&features)?;
            Ok(Reading::new(row.unit.clone(), row.cycle, rul))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Dataset::from_readings(readings))
}

/// Explain the prediction for the latest cycle of a unit.
pub fn explain_latest(
    model: &dyn RulModel,
    table: &FeatureTable,
    unit: &UnitId,
) -> Result<(u32, Attribution)> {
    let row = table.latest_row(unit).ok_or_else(|| {
        RulError::Inference(format!("no validation rows for unit {}", unit))
    })?;
    let names = model.feature_names();
    let projection = table.projection(names)?;
    let features = FeatureTable::project_row(row, &projection, names)?;
    Ok((row.cycle, model.explain(&features)?))
}
