//! Validation feature table: raw sensor and operating-setting columns per unit and cycle.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::data::reading::{normalize_header, parse_cycle, parse_finite};
use crate::data::{Schema, UnitId};
use crate::error::{Result, RulError};

/// One validation row: the unit, its cycle and the numeric value of every
/// non-key column (`None` where a cell is empty or not a number).
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub unit: UnitId,
    pub cycle: u32,
    pub values: Vec<Option<f64>>,
}

/// A table of feature rows, without any predicted RUL.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn load(path: &Path, schema: &Schema) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file, schema)
    }

    /// Parse a validation CSV. Only the unit and cycle columns are required;
    /// every other column becomes a candidate feature.
    pub fn from_reader<R: Read>(reader: R, schema: &Schema) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(normalize_header).collect();

        let unit_idx = headers.iter().position(|h| h == &schema.unit);
        let cycle_idx = headers.iter().position(|h| h == &schema.cycle);
        let (unit_idx, cycle_idx) = match (unit_idx, cycle_idx) {
            (Some(u), Some(c)) => (u, c),
            (u, c) => {
                let missing = [(u, &schema.unit), (c, &schema.cycle)]
                    .into_iter()
                    .filter(|(idx, _)| idx.is_none())
                    .map(|(_, name)| name.clone())
                    .collect();
                return Err(RulError::Schema { missing });
            }
        };

        let feature_idx: Vec<usize> =
            (0..headers.len()).filter(|&i| i != unit_idx && i != cycle_idx).collect();
        let columns = feature_idx.iter().map(|&i| headers[i].clone()).collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let cell = |idx: usize| record.get(idx).unwrap_or("").trim();

            let unit = cell(unit_idx);
            if unit.is_empty() {
                return Err(RulError::Parse {
                    line,
                    column: schema.unit.clone(),
                    value: String::new(),
                });
            }
            let cycle = parse_cycle(cell(cycle_idx)).ok_or_else(|| RulError::Parse {
                line,
                column: schema.cycle.clone(),
                value: cell(cycle_idx).to_string(),
            })?;

            rows.push(FeatureRow {
                unit: UnitId::new(unit),
                cycle,
                values: feature_idx.iter().map(|&i| parse_finite(cell(i))).collect(),
            });
        }

        Ok(Self { columns, rows })
    }

    /// Names of the feature columns, in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Map the model's feature names onto column positions.
    ///
    /// Columns not named by the model are dropped. Fails with
    /// [`RulError::Inference`] listing every feature the table lacks.
    pub fn projection(&self, feature_names: &[String]) -> Result<Vec<usize>> {
        let mut missing = Vec::new();
        let mut indices = Vec::with_capacity(feature_names.len());
        for name in feature_names {
            match self.columns.iter().position(|c| c == name) {
                Some(idx) => indices.push(idx),
                None => missing.push(name.as_str()),
            }
        }
        if missing.is_empty() {
            Ok(indices)
        } else {
            Err(RulError::Inference(format!(
                "validation data lacks model features: {}",
                missing.join(", ")
            )))
        }
    }

    /// Extract the model's feature vector from a row.
    pub fn project_row(row: &FeatureRow, projection: &[usize], names: &[String]) -> Result<Vec<f64>> {
        projection
            .iter()
            .zip(names)
            .map(|(&idx, name)| {
                row.values.get(idx).copied().flatten().ok_or_else(|| {
                    RulError::Inference(format!(
                        "unit {} cycle {}: feature {} is not a number",
                        row.unit, row.cycle, name
                    ))
                })
            })
            .collect()
    }

    /// The row with the highest cycle for a unit.
    pub fn latest_row(&self, unit: &UnitId) -> Option<&FeatureRow> {
        self.rows.iter().filter(|r| &r.unit == unit).max_by_key(|r| r.cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "unit_number,time_in_cycles,op_setting_1,sensor_2,sensor_3\n\
                          1,1,0.5,641.8,1589.7\n\
                          1,2,0.4,642.1,\n\
                          2,1,0.6,642.5,1590.1\n";

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_feature_columns_exclude_keys() {
        let table = FeatureTable::from_reader(SAMPLE.as_bytes(), &Schema::default()).unwrap();
        assert_eq!(table.columns(), &["op_setting_1", "sensor_2", "sensor_3"]);
        assert_eq!(table.rows().len(), 3);
        assert_eq!(table.rows()[1].values[2], None);
    }

    #[test]
    fn test_projection_drops_unused_columns() {
        let table = FeatureTable::from_reader(SAMPLE.as_bytes(), &Schema::default()).unwrap();
        let names = names(&["sensor_2"]);
        let proj = table.projection(&names).unwrap();
        let row = FeatureTable::project_row(&table.rows()[0], &proj, &names).unwrap();
        assert_eq!(row, vec![641.8]);
    }

    #[test]
    fn test_projection_reports_missing_features() {
        let table = FeatureTable::from_reader(SAMPLE.as_bytes(), &Schema::default()).unwrap();
        let err = table.projection(&names(&["sensor_2", "sensor_9"])).unwrap_err();
        assert!(err.to_string().contains("sensor_9"));
        assert!(err.is_soft());
    }

    #[test]
    fn test_non_numeric_feature_is_inference_error() {
        let table = FeatureTable::from_reader(SAMPLE.as_bytes(), &Schema::default()).unwrap();
        let names = names(&["sensor_3"]);
        let proj = table.projection(&names).unwrap();
        let err = FeatureTable::project_row(&table.rows()[1], &proj, &names).unwrap_err();
        assert!(matches!(err, RulError::Inference(_)));
    }

    #[test]
    fn test_latest_row() {
        let table = FeatureTable::from_reader(SAMPLE.as_bytes(), &Schema::default()).unwrap();
        assert_eq!(table.latest_row(&UnitId::from(1)).map(|r| r.cycle), Some(2));
        assert!(table.latest_row(&UnitId::from(3)).is_none());
    }

    #[test]
    fn test_missing_key_column() {
        let csv = "unit_number,sensor_2\n1,641.8\n";
        let err = FeatureTable::from_reader(csv.as_bytes(), &Schema::default()).unwrap_err();
        assert!(matches!(err, RulError::Schema { missing } if missing == vec!["time_in_cycles"]));
    }
}
