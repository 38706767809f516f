//! Threshold evaluation of a unit's predicted RUL.
//!
//! A unit is classified from the minimum predicted RUL over its series. The
//! comparison is strict: a value equal to a threshold is not below it.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RulError};

use super::selector::UnitSeries;

/// Warning and critical RUL thresholds, in cycles.
///
/// Invariant: `critical < warning`. Use [`Thresholds::new`] to build a
/// validated pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum RUL below which maintenance should be planned.
    pub warning: f64,
    /// Minimum RUL below which maintenance is recommended soon.
    pub critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning: 30.0,
            critical: 20.0,
        }
    }
}

impl Thresholds {
    /// Create a threshold pair, checking `critical < warning`.
    pub fn new(warning: f64, critical: f64) -> Result<Self> {
        let thresholds = Self { warning, critical };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Check that both values are finite and `critical < warning`.
    pub fn validate(&self) -> Result<()> {
        if self.warning.is_finite() && self.critical.is_finite() && self.critical < self.warning {
            Ok(())
        } else {
            Err(RulError::InvalidThresholds {
                warning: self.warning,
                critical: self.critical,
            })
        }
    }

    /// Classify a single RUL value.
    pub fn classify_value(&self, rul: f64) -> Status {
        if rul < self.critical {
            Status::Critical
        } else if rul < self.warning {
            Status::Warning
        } else {
            Status::Stable
        }
    }
}

/// Risk band of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    Stable,
    Warning,
    Critical,
}

impl Status {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Status::Stable => "OK",
            Status::Warning => "WARN",
            Status::Critical => "CRIT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Stable => "Stable",
            Status::Warning => "Warning",
            Status::Critical => "Critical",
        }
    }

    /// Banner severity used when alerting on this status.
    pub fn severity(&self) -> Severity {
        match self {
            Status::Stable => Severity::Info,
            Status::Warning => Severity::Warning,
            Status::Critical => Severity::Error,
        }
    }
}

/// Severity of a status banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Result of classifying a unit series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assessment {
    /// Minimum predicted RUL over the series.
    pub min_rul: f64,
    /// Cycle of the first reading at the minimum.
    pub min_cycle: u32,
    pub status: Status,
}

impl Assessment {
    /// Maintenance alert text for this assessment.
    pub fn alert_message(&self, thresholds: &Thresholds) -> String {
        match self.status {
            Status::Critical => format!(
                "Maintenance recommended soon: Predicted RUL drops below {} cycles.",
                thresholds.critical
            ),
            Status::Warning => format!(
                "RUL below warning threshold ({}). Plan maintenance soon.",
                thresholds.warning
            ),
            Status::Stable => format!(
                "RUL above warning threshold ({}). No action needed.",
                thresholds.warning
            ),
        }
    }
}

/// Classify a unit series by its minimum predicted RUL.
///
/// Fails with [`RulError::EmptySeries`] when the series has no readings.
pub fn classify(series: &UnitSeries, thresholds: &Thresholds) -> Result<Assessment> {
    let mut min: Option<(f64, u32)> = None;
    for reading in series.readings() {
        match min {
            Some((value, _)) if reading.predicted_rul >= value => {}
            _ => min = Some((reading.predicted_rul, reading.cycle)),
        }
    }

    let (min_rul, min_cycle) = min.ok_or_else(|| RulError::EmptySeries {
        unit: series.unit().to_string(),
    })?;

    Ok(Assessment {
        min_rul,
        min_cycle,
        status: thresholds.classify_value(min_rul),
    })
}

/// The first cycle whose predicted RUL is strictly below `threshold`.
pub fn first_breach(series: &UnitSeries, threshold: f64) -> Option<u32> {
    series.readings().iter().find(|r| r.predicted_rul < threshold).map(|r| r.cycle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reading::{Reading, UnitId};

    fn series(values: &[(u32, f64)]) -> UnitSeries {
        let readings = values.iter().map(|&(c, v)| Reading::new(1, c, v)).collect();
        UnitSeries::new(UnitId::from(1), readings)
    }

    #[test]
    fn test_classify_minimum_and_status() {
        let t = Thresholds::default();
        let a = classify(&series(&[(1, 40.0), (2, 25.0), (3, 15.0)]), &t).unwrap();
        assert_eq!(a.min_rul, 15.0);
        assert_eq!(a.min_cycle, 3);
        assert_eq!(a.status, Status::Critical);

        let a = classify(&series(&[(1, 90.0), (2, 85.0), (3, 82.0)]), &t).unwrap();
        assert_eq!(a.min_rul, 82.0);
        assert_eq!(a.status, Status::Stable);

        let a = classify(&series(&[(1, 40.0), (2, 29.9)]), &t).unwrap();
        assert_eq!(a.status, Status::Warning);
    }

    #[test]
    fn test_boundaries_are_strict() {
        let t = Thresholds::new(30.0, 20.0).unwrap();
        assert_eq!(classify(&series(&[(1, 20.0)]), &t).unwrap().status, Status::Warning);
        assert_eq!(classify(&series(&[(1, 30.0)]), &t).unwrap().status, Status::Stable);
    }

    #[test]
    fn test_min_cycle_is_first_occurrence() {
        let t = Thresholds::default();
        let a = classify(&series(&[(1, 10.0), (2, 50.0), (3, 10.0)]), &t).unwrap();
        assert_eq!(a.min_cycle, 1);
    }

    #[test]
    fn test_empty_series() {
        let err = classify(&series(&[]), &Thresholds::default()).unwrap_err();
        assert!(matches!(err, RulError::EmptySeries { .. }));
    }

    #[test]
    fn test_first_breach() {
        let s = series(&[(1, 100.0), (2, 45.0), (3, 60.0)]);
        assert_eq!(first_breach(&s, 50.0), Some(2));
        assert_eq!(first_breach(&s, 45.0), None);
        assert_eq!(first_breach(&s, 10.0), None);
    }

    #[test]
    fn test_thresholds_invariant() {
        assert!(Thresholds::new(30.0, 20.0).is_ok());
        assert!(Thresholds::new(20.0, 20.0).is_err());
        assert!(Thresholds::new(20.0, 30.0).is_err());
        assert!(Thresholds::new(f64::NAN, 20.0).is_err());
    }

    #[test]
    fn test_alert_messages() {
        let t = Thresholds::default();
        let critical = Assessment {
            min_rul: 15.0,
            min_cycle: 3,
            status: Status::Critical,
        };
        assert_eq!(
            critical.alert_message(&t),
            "Maintenance recommended soon: Predicted RUL drops below 20 cycles."
        );
        assert_eq!(critical.status.severity(), Severity::Error);
    }
}
