//! Inference data source.
//!
//! Computes predicted RUL by running a fitted model over a validation
//! feature table, then serves the result like a predictions file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::{info, warn};

use super::DataSource;
use crate::data::{Dataset, Schema, UnitId};
use crate::error::{Result, RulError};
use crate::model::{explain_latest, predict_table, Attribution, FeatureTable, LinearPipeline, RulModel};

/// A data source backed by a validation table and a JSON linear pipeline.
///
/// Both files are re-read when either changes.
#[derive(Debug)]
pub struct InferenceSource {
    validation_path: PathBuf,
    model_path: PathBuf,
    schema: Schema,
    description: String,
    table: Option<FeatureTable>,
    model: Option<Box<dyn RulModel>>,
    last_error: Option<RulError>,
    last_modified: Option<(Option<SystemTime>, Option<SystemTime>)>,
}

impl InferenceSource {
    pub fn new<P: AsRef<Path>, M: AsRef<Path>>(validation: P, model: M, schema: Schema) -> Self {
        let validation_path = validation.as_ref().to_path_buf();
        let model_path = model.as_ref().to_path_buf();
        let description = format!(
            "inference: {} ({})",
            validation_path.display(),
            model_path.display()
        );
        Self {
            validation_path,
            model_path,
            schema,
            description,
            table: None,
            model: None,
            last_error: None,
            last_modified: None,
        }
    }

    fn modified_times(&self) -> (Option<SystemTime>, Option<SystemTime>) {
        let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified()).ok();
        (modified(&self.validation_path), modified(&self.model_path))
    }

    fn run(&mut self) -> Result<Dataset> {
        // A model that cannot be read or parsed is an inference failure.
        let model = LinearPipeline::load(&self.model_path).map_err(|e| match e {
            RulError::Inference(_) => e,
            other => RulError::Inference(format!("cannot load model: {}", other)),
        })?;
        let table = FeatureTable::load(&self.validation_path, &self.schema)?;
        let dataset = predict_table(&model, &table)?;

        self.table = Some(table);
        self.model = Some(Box::new(model));
        Ok(dataset)
    }
}

impl DataSource for InferenceSource {
    fn poll(&mut self) -> Option<Arc<Dataset>> {
        let current = self.modified_times();
        if self.last_modified == Some(current) {
            return None;
        }
        self.last_modified = Some(current);

        match self.run() {
            Ok(dataset) => {
                info!(
                    rows = dataset.len(),
                    units = dataset.units().len(),
                    "computed predictions from validation data"
                );
                self.last_error = None;
                Some(Arc::new(dataset))
            }
            Err(e) => {
                warn!(error = %e, "inference failed");
                self.table = None;
                self.model = None;
                self.last_error = Some(e);
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&RulError> {
        self.last_error.as_ref()
    }

    fn invalidate(&mut self) {
        self.last_modified = None;
    }

    fn explain(&self, unit: &UnitId) -> Option<Result<(u32, Attribution)>> {
        match (&self.model, &self.table) {
            (Some(model), Some(table)) => Some(explain_latest(model.as_ref(), table, unit)),
            _ => Some(Err(RulError::Inference("no model loaded".into()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MODEL: &str = r#"{
        "feature_names": ["sensor_2"],
        "scaler": { "mean": [642.0], "scale": [1.0] },
        "coefficients": [-10.0],
        "intercept": 50.0,
        "clip_min": 0.0
    }"#;

    fn write(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_inference_source_predicts() {
        let validation = write(
            "unit_number,time_in_cycles,sensor_2\n1,1,641.0\n1,2,645.0\n2,1,640.0\n",
        );
        let model = write(MODEL);
        let mut source = InferenceSource::new(validation.path(), model.path(), Schema::default());

        let dataset = source.poll().unwrap();
        let values: Vec<f64> = dataset.readings().iter().map(|r| r.predicted_rul).collect();
        assert_eq!(values, vec![60.0, 20.0, 70.0]);
        assert!(source.poll().is_none());

        let (cycle, attribution) = source.explain(&UnitId::from(1)).unwrap().unwrap();
        assert_eq!(cycle, 2);
        assert_eq!(attribution.output(), 20.0);
    }

    #[test]
    fn test_missing_feature_is_soft_error() {
        let validation = write("unit_number,time_in_cycles,sensor_3\n1,1,1590.0\n");
        let model = write(MODEL);
        let mut source = InferenceSource::new(validation.path(), model.path(), Schema::default());

        assert!(source.poll().is_none());
        let err = source.error().unwrap();
        assert!(err.is_soft());
        assert!(err.to_string().contains("sensor_2"));
        assert!(source.explain(&UnitId::from(1)).unwrap().is_err());
    }

    #[test]
    fn test_unreadable_model_is_inference_error() {
        let validation = write("unit_number,time_in_cycles,sensor_2\n1,1,641.0\n");
        let model = write("not json");
        let mut source = InferenceSource::new(validation.path(), model.path(), Schema::default());

        assert!(source.poll().is_none());
        assert!(matches!(source.error(), Some(RulError::Inference(_))));
    }
}
