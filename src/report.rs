//! JSON export of the classified fleet.

use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::data::{FleetData, Status, Thresholds};

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub total_units: usize,
    pub stable: usize,
    pub warning: usize,
    pub critical: usize,
}

#[derive(Debug, Serialize)]
pub struct UnitReport {
    pub unit: String,
    pub cycles: usize,
    pub latest_cycle: u32,
    pub latest_rul: f64,
    pub min_rul: f64,
    pub min_cycle: u32,
    pub status: Status,
    pub first_warning_cycle: Option<u32>,
    pub first_critical_cycle: Option<u32>,
    pub alert: String,
}

/// Snapshot of every unit's assessment.
#[derive(Debug, Serialize)]
pub struct FleetReport {
    pub thresholds: Thresholds,
    pub summary: ReportSummary,
    pub units: Vec<UnitReport>,
}

impl FleetReport {
    pub fn from_fleet(fleet: &FleetData) -> Self {
        let (stable, warning, critical) = fleet.status_counts();
        let units = fleet
            .units
            .iter()
            .map(|u| UnitReport {
                unit: u.unit.to_string(),
                cycles: u.cycles,
                latest_cycle: u.latest.cycle,
                latest_rul: u.latest.predicted_rul,
                min_rul: u.assessment.min_rul,
                min_cycle: u.assessment.min_cycle,
                status: u.status(),
                first_warning_cycle: u.warning_breach,
                first_critical_cycle: u.critical_breach,
                alert: u.assessment.alert_message(&fleet.thresholds),
            })
            .collect();

        Self {
            thresholds: fleet.thresholds,
            summary: ReportSummary {
                total_units: fleet.units.len(),
                stable,
                warning,
                critical,
            },
            units,
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dataset, Reading};
    use std::sync::Arc;

    #[test]
    fn test_report_contents() {
        let dataset = Dataset::from_readings(vec![
            Reading::new(1, 1, 40.0),
            Reading::new(1, 2, 25.0),
            Reading::new(1, 3, 15.0),
            Reading::new(2, 1, 90.0),
        ]);
        let fleet = FleetData::from_dataset(Arc::new(dataset), &Thresholds::default());
        let report = FleetReport::from_fleet(&fleet);

        assert_eq!(report.summary.total_units, 2);
        assert_eq!(report.summary.critical, 1);
        assert_eq!(report.units[0].unit, "1");
        assert_eq!(report.units[0].first_critical_cycle, Some(3));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.write(&path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["units"][0]["status"], "Critical");
        assert_eq!(value["thresholds"]["warning"], 30.0);
    }
}
