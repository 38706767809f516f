//! Unit selection: filter the dataset down to one unit's readings.

use crate::error::{Result, RulError};

use super::reading::{Dataset, Reading, UnitId};

/// The readings of one unit, ordered by cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitSeries {
    unit: UnitId,
    readings: Vec<Reading>,
}

impl UnitSeries {
    /// Build a series from readings of a single unit, sorting them by cycle.
    ///
    /// The sort is stable: readings sharing a cycle stay in input order.
    pub fn new(unit: UnitId, mut readings: Vec<Reading>) -> Self {
        readings.sort_by_key(|r| r.cycle);
        Self { unit, readings }
    }

    pub fn unit(&self) -> &UnitId {
        &self.unit
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// The reading at the highest cycle.
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.last()
    }

    /// Predicted RUL values in cycle order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.readings.iter().map(|r| r.predicted_rul)
    }
}

/// Select the readings of `unit`, sorted ascending by cycle.
///
/// Duplicate (unit, cycle) rows are kept, in the order they appear in the
/// dataset. Fails with [`RulError::NotFound`] if the unit is not in the dataset.
pub fn select(dataset: &Dataset, unit: &UnitId) -> Result<UnitSeries> {
    if !dataset.contains_unit(unit) {
        return Err(RulError::NotFound {
            unit: unit.to_string(),
        });
    }

    let readings = dataset.readings().iter().filter(|r| &r.unit == unit).cloned().collect();
    Ok(UnitSeries::new(unit.clone(), readings))
}
