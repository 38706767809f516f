//! Readings and the dataset loaded from a predictions CSV.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RulError};

/// Identifier of a monitored engine unit.
///
/// Ids are kept as text so both integer and string identifiers work. Two ids
/// that both parse as integers compare numerically, so unit 10 sorts after 9.
/// Integer ids sort before non-integer ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<u32> for UnitId {
    fn from(n: u32) -> Self {
        Self(n.to_string())
    }
}

impl Ord for UnitId {
    fn cmp(&self, other: &Self) -> Ordering {
        // Numeric ids first, then text ids.
        match (self.0.parse::<i64>(), other.0.parse::<i64>()) {
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for UnitId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One predicted-RUL row: a unit at a given operating cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub unit: UnitId,
    pub cycle: u32,
    pub predicted_rul: f64,
}

impl Reading {
    pub fn new(unit: impl Into<UnitId>, cycle: u32, predicted_rul: f64) -> Self {
        Self {
            unit: unit.into(),
            cycle,
            predicted_rul,
        }
    }
}

/// Column names of the canonical predictions schema.
///
/// The defaults match `unit_number, time_in_cycles, predicted_RUL`. They can be
/// remapped in configuration, but a loaded file is always matched against one
/// explicit set of names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schema {
    pub unit: String,
    pub cycle: String,
    pub predicted_rul: String,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            unit: "unit_number".to_string(),
            cycle: "time_in_cycles".to_string(),
            predicted_rul: "predicted_RUL".to_string(),
        }
    }
}

impl Schema {
    /// Resolve the positions of the required columns in a header row.
    ///
    /// Fails with [`RulError::Schema`] listing every column that is absent.
    pub fn locate(&self, headers: &csv::StringRecord) -> Result<(usize, usize, usize)> {
        let names: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |wanted: &str| names.iter().position(|n| n == wanted);

        let unit = find(&self.unit);
        let cycle = find(&self.cycle);
        let rul = find(&self.predicted_rul);

        match (unit, cycle, rul) {
            (Some(u), Some(c), Some(r)) => Ok((u, c, r)),
            _ => {
                let missing = [
                    (unit, &self.unit),
                    (cycle, &self.cycle),
                    (rul, &self.predicted_rul),
                ]
                .into_iter()
                .filter(|(idx, _)| idx.is_none())
                .map(|(_, name)| name.clone())
                .collect();
                Err(RulError::Schema { missing })
            }
        }
    }
}

/// Normalize a header cell: strip a leading byte-order mark and surrounding whitespace.
pub(crate) fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

/// Parse a cycle index. Integral floats such as `"72.0"` are accepted.
pub(crate) fn parse_cycle(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u32>() {
        return Some(n);
    }
    let f: f64 = raw.parse().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 {
        Some(f as u32)
    } else {
        None
    }
}

/// Parse a finite floating point cell.
pub(crate) fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// The full set of readings, in file order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    readings: Vec<Reading>,
    units: Vec<UnitId>,
}

impl Dataset {
    /// Build a dataset from readings, keeping their order.
    pub fn from_readings(readings: Vec<Reading>) -> Self {
        let mut seen = HashSet::new();
        let units = readings
            .iter()
            .filter(|r| seen.insert(r.unit.clone()))
            .map(|r| r.unit.clone())
            .collect();
        Self { readings, units }
    }

    /// Load a predictions CSV from disk.
    pub fn load(path: &Path, schema: &Schema) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file, schema)
    }

    /// Parse a predictions CSV from any reader.
    pub fn from_reader<R: Read>(reader: R, schema: &Schema) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let (unit_idx, cycle_idx, rul_idx) = schema.locate(rdr.headers()?)?;

        let mut readings = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let cell = |idx: usize| record.get(idx).unwrap_or("").trim();

            let unit = cell(unit_idx);
            if unit.is_empty() {
                return Err(RulError::Parse {
                    line,
                    column: schema.unit.clone(),
                    value: unit.to_string(),
                });
            }
            let cycle = parse_cycle(cell(cycle_idx)).ok_or_else(|| RulError::Parse {
                line,
                column: schema.cycle.clone(),
                value: cell(cycle_idx).to_string(),
            })?;
            let predicted_rul = parse_finite(cell(rul_idx)).ok_or_else(|| RulError::Parse {
                line,
                column: schema.predicted_rul.clone(),
                value: cell(rul_idx).to_string(),
            })?;

            readings.push(Reading::new(unit, cycle, predicted_rul));
        }

        Ok(Self::from_readings(readings))
    }

    /// All readings in file order.
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Distinct unit ids in order of first appearance.
    pub fn units(&self) -> &[UnitId] {
        &self.units
    }

    /// Distinct unit ids in ascending order.
    pub fn sorted_units(&self) -> Vec<UnitId> {
        let mut units = self.units.clone();
        units.sort();
        units
    }

    pub fn contains_unit(&self, unit: &UnitId) -> bool {
        self.units.contains(unit)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "unit_number,time_in_cycles,predicted_RUL\n\
                          2,1,90\n\
                          1,2,25.5\n\
                          1,1,40\n\
                          2,2,85\n";

    #[test]
    fn test_load_canonical_schema() {
        let ds = Dataset::from_reader(SAMPLE.as_bytes(), &Schema::default()).unwrap();
        assert_eq!(ds.len(), 4);
        assert_eq!(ds.units(), &[UnitId::from(2), UnitId::from(1)]);
        assert_eq!(ds.readings()[1], Reading::new(1, 2, 25.5));
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let csv = "unit_number,time_in_cycles,RUL\n1,1,40\n";
        let err = Dataset::from_reader(csv.as_bytes(), &Schema::default()).unwrap_err();
        match err {
            RulError::Schema { missing } => assert_eq!(missing, vec!["predicted_RUL"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_all_missing_columns_reported() {
        let csv = "a,b\n1,2\n";
        let err = Dataset::from_reader(csv.as_bytes(), &Schema::default()).unwrap_err();
        match err {
            RulError::Schema { missing } => assert_eq!(missing.len(), 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_headers_are_normalized() {
        let csv = "\u{feff} unit_number , time_in_cycles ,predicted_RUL\n1,1,40\n";
        let ds = Dataset::from_reader(csv.as_bytes(), &Schema::default()).unwrap();
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn test_remapped_schema() {
        let schema = Schema {
            unit: "unit_id".into(),
            cycle: "time_cycles".into(),
            predicted_rul: "predicted_rul".into(),
        };
        let csv = "unit_id,time_cycles,predicted_rul\nA7,3,12.5\n";
        let ds = Dataset::from_reader(csv.as_bytes(), &schema).unwrap();
        assert_eq!(ds.readings()[0], Reading::new("A7", 3, 12.5));
    }

    #[test]
    fn test_integral_float_cycle_accepted() {
        let csv = "unit_number,time_in_cycles,predicted_RUL\n1,72.0,10\n";
        let ds = Dataset::from_reader(csv.as_bytes(), &Schema::default()).unwrap();
        assert_eq!(ds.readings()[0].cycle, 72);
    }

    #[test]
    fn test_non_finite_rul_rejected() {
        let csv = "unit_number,time_in_cycles,predicted_RUL\n1,1,NaN\n";
        let err = Dataset::from_reader(csv.as_bytes(), &Schema::default()).unwrap_err();
        match err {
            RulError::Parse { line, column, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, "predicted_RUL");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_negative_rul_is_not_validated() {
        let csv = "unit_number,time_in_cycles,predicted_RUL\n1,1,-3.5\n";
        let ds = Dataset::from_reader(csv.as_bytes(), &Schema::default()).unwrap();
        assert_eq!(ds.readings()[0].predicted_rul, -3.5);
    }

    #[test]
    fn test_unit_ids_sort_numerically() {
        let mut ids = vec![UnitId::from(10), UnitId::from(9), UnitId::from("B"), UnitId::from(100)];
        ids.sort();
        assert_eq!(
            ids,
            vec![UnitId::from(9), UnitId::from(10), UnitId::from(100), UnitId::from("B")]
        );
    }
}
