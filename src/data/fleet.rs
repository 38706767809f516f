//! Fleet overview: one classified summary per unit.
//!
//! This module turns a loaded [`Dataset`] into per-unit summaries with a
//! status computed against the current thresholds.

use std::sync::Arc;
use std::time::Instant;

use tracing::warn;

use super::evaluator::{classify, first_breach, Assessment, Status, Thresholds};
use super::reading::{Dataset, Reading, UnitId};
use super::selector::{select, UnitSeries};
use crate::error::{Result, RulError};

/// Number of trailing readings kept for the trend sparkline.
const TREND_POINTS: usize = 8;

/// Summary of one unit's predicted RUL.
#[derive(Debug, Clone)]
pub struct UnitSummary {
    pub unit: UnitId,
    pub cycles: usize,
    pub latest: Reading,
    pub assessment: Assessment,
    pub warning_breach: Option<u32>,
    pub critical_breach: Option<u32>,
    /// The last few predicted RUL values, oldest first.
    pub trend: Vec<f64>,
}

impl UnitSummary {
    /// Summarize a unit series. Fails if the series is empty.
    pub fn from_series(series: &UnitSeries, thresholds: &Thresholds) -> Result<Self> {
        let assessment = classify(series, thresholds)?;
        let Some(latest) = series.latest().cloned() else {
            return Err(RulError::EmptySeries {
                unit: series.unit().to_string(),
            });
        };
        let skip = series.len().saturating_sub(TREND_POINTS);

        Ok(Self {
            unit: series.unit().clone(),
            cycles: series.len(),
            latest,
            assessment,
            warning_breach: first_breach(series, thresholds.warning),
            critical_breach: first_breach(series, thresholds.critical),
            trend: series.values().skip(skip).collect(),
        })
    }

    pub fn status(&self) -> Status {
        self.assessment.status
    }
}

/// Complete classified fleet ready for display.
#[derive(Debug, Clone)]
pub struct FleetData {
    pub dataset: Arc<Dataset>,
    /// Units sorted by status (critical first), then by id.
    pub units: Vec<UnitSummary>,
    pub thresholds: Thresholds,
    pub last_updated: Instant,
}

impl FleetData {
    /// Classify every unit in the dataset.
    pub fn from_dataset(dataset: Arc<Dataset>, thresholds: &Thresholds) -> Self {
        let mut units: Vec<UnitSummary> = dataset
            .units()
            .iter()
            .filter_map(|unit| {
                let summary =
                    select(&dataset, unit).and_then(|s| UnitSummary::from_series(&s, thresholds));
                match summary {
                    Ok(summary) => Some(summary),
                    Err(e) => {
                        warn!(unit = %unit, error = %e, "skipping unit");
                        None
                    }
                }
            })
            .collect();

        units.sort_by(|a, b| b.status().cmp(&a.status()).then_with(|| a.unit.cmp(&b.unit)));

        Self {
            dataset,
            units,
            thresholds: *thresholds,
            last_updated: Instant::now(),
        }
    }

    /// Re-classify the same dataset against new thresholds.
    pub fn reclassify(&self, thresholds: &Thresholds) -> Self {
        Self::from_dataset(Arc::clone(&self.dataset), thresholds)
    }

    /// Select the ordered series for one unit.
    pub fn series(&self, unit: &UnitId) -> Result<UnitSeries> {
        select(&self.dataset, unit)
    }

    pub fn summary(&self, unit: &UnitId) -> Option<&UnitSummary> {
        self.units.iter().find(|u| &u.unit == unit)
    }

    /// Count units by status: (stable, warning, critical).
    pub fn status_counts(&self) -> (usize, usize, usize) {
        self.units.iter().fold((0, 0, 0), |(s, w, c), u| match u.status() {
            Status::Stable => (s + 1, w, c),
            Status::Warning => (s, w + 1, c),
            Status::Critical => (s, w, c + 1),
        })
    }

    /// Worst status across the fleet.
    pub fn worst_status(&self) -> Status {
        self.units.iter().map(|u| u.status()).max().unwrap_or(Status::Stable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fleet() -> FleetData {
        let dataset = Dataset::from_readings(vec![
            Reading::new(1, 1, 40.0),
            Reading::new(1, 2, 25.0),
            Reading::new(1, 3, 15.0),
            Reading::new(2, 1, 90.0),
            Reading::new(2, 2, 85.0),
            Reading::new(2, 3, 82.0),
            Reading::new(3, 1, 35.0),
            Reading::new(3, 2, 28.0),
        ]);
        FleetData::from_dataset(Arc::new(dataset), &Thresholds::new(30.0, 20.0).unwrap())
    }

    #[test]
    fn test_units_sorted_critical_first() {
        let fleet = fleet();
        let order: Vec<&str> = fleet.units.iter().map(|u| u.unit.as_str()).collect();
        assert_eq!(order, vec!["1", "3", "2"]);
        assert_eq!(fleet.status_counts(), (1, 1, 1));
        assert_eq!(fleet.worst_status(), Status::Critical);
    }

    #[test]
    fn test_unit_summary_fields() {
        let fleet = fleet();
        let unit1 = fleet.summary(&UnitId::from(1)).unwrap();
        assert_eq!(unit1.cycles, 3);
        assert_eq!(unit1.latest.cycle, 3);
        assert_eq!(unit1.assessment.min_rul, 15.0);
        assert_eq!(unit1.warning_breach, Some(2));
        assert_eq!(unit1.critical_breach, Some(3));
        assert_eq!(unit1.trend, vec![40.0, 25.0, 15.0]);
    }

    #[test]
    fn test_reclassify_with_new_thresholds() {
        let fleet = fleet().reclassify(&Thresholds::new(10.0, 5.0).unwrap());
        assert_eq!(fleet.worst_status(), Status::Stable);
    }
}
