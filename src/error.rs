//! Error types for loading, selecting and classifying RUL data.

use thiserror::Error;

/// Errors that can occur while producing a unit's RUL assessment.
///
/// Every variant is terminal to the current render only: the TUI shows the
/// message and recovers on the next poll or user interaction.
#[derive(Debug, Error)]
pub enum RulError {
    /// Required column(s) are absent from the loaded table.
    #[error("Missing columns in CSV: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// The selected unit does not appear in the dataset.
    #[error("Unit {unit} not found in dataset")]
    NotFound { unit: String },

    /// The unit's series has no readings.
    #[error("No readings for unit {unit}")]
    EmptySeries { unit: String },

    /// Model inference or explanation failed.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Thresholds violate `critical < warning` or are not finite.
    #[error("Invalid thresholds: critical ({critical}) must be below warning ({warning})")]
    InvalidThresholds { warning: f64, critical: f64 },

    /// A cell could not be parsed into the expected type.
    #[error("Line {line}: invalid {column} value {value:?}")]
    Parse {
        line: u64,
        column: String,
        value: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Read error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RulError {
    /// Whether this error should be shown as a soft warning rather than an error.
    ///
    /// Inference and explanation failures degrade the page instead of halting it.
    pub fn is_soft(&self) -> bool {
        matches!(self, RulError::Inference(_))
    }
}

pub type Result<T, E = RulError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_names_columns() {
        let err = RulError::Schema {
            missing: vec!["predicted_RUL".to_string(), "time_in_cycles".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Missing columns in CSV: predicted_RUL, time_in_cycles"
        );
    }

    #[test]
    fn test_only_inference_is_soft() {
        assert!(RulError::Inference("boom".into()).is_soft());
        assert!(!RulError::NotFound { unit: "7".into() }.is_soft());
    }
}
