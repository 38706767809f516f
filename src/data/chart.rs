//! Plot data for the RUL trend chart.

use super::evaluator::Thresholds;
use super::selector::UnitSeries;

/// Headroom added above the highest plotted value.
const Y_HEADROOM: f64 = 1.1;

/// Points and axis bounds for one unit's trend chart.
///
/// The chart has a single line of predicted RUL against cycle and two flat
/// reference lines at the warning and critical thresholds. The y axis always
/// starts at 0.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendChart {
    pub rul: Vec<(f64, f64)>,
    pub warning: Vec<(f64, f64)>,
    pub critical: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl TrendChart {
    pub fn build(series: &UnitSeries, thresholds: &Thresholds) -> Self {
        let rul: Vec<(f64, f64)> =
            series.readings().iter().map(|r| (r.cycle as f64, r.predicted_rul)).collect();

        let (x_min, x_max) = match (rul.first(), rul.last()) {
            (Some(first), Some(last)) if last.0 > first.0 => (first.0, last.0),
            (Some(first), _) => (first.0, first.0 + 1.0),
            _ => (0.0, 1.0),
        };

        let y_top = rul
            .iter()
            .map(|p| p.1)
            .fold(thresholds.warning, f64::max)
            .max(1.0)
            * Y_HEADROOM;

        Self {
            warning: vec![(x_min, thresholds.warning), (x_max, thresholds.warning)],
            critical: vec![(x_min, thresholds.critical), (x_max, thresholds.critical)],
            rul,
            x_bounds: [x_min, x_max],
            y_bounds: [0.0, y_top],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reading::{Reading, UnitId};

    fn series() -> UnitSeries {
        UnitSeries::new(
            UnitId::from(1),
            vec![Reading::new(1, 5, 40.0), Reading::new(1, 6, 25.0), Reading::new(1, 7, 15.0)],
        )
    }

    #[test]
    fn test_chart_lines_and_bounds() {
        let chart = TrendChart::build(&series(), &Thresholds::default());
        assert_eq!(chart.rul, vec![(5.0, 40.0), (6.0, 25.0), (7.0, 15.0)]);
        assert_eq!(chart.warning, vec![(5.0, 30.0), (7.0, 30.0)]);
        assert_eq!(chart.critical, vec![(5.0, 20.0), (7.0, 20.0)]);
        assert_eq!(chart.x_bounds, [5.0, 7.0]);
        assert_eq!(chart.y_bounds[0], 0.0);
        assert!(chart.y_bounds[1] >= 40.0);
    }

    #[test]
    fn test_threshold_lines_stay_visible_for_high_rul() {
        let s = UnitSeries::new(UnitId::from(2), vec![Reading::new(2, 1, 5.0)]);
        let chart = TrendChart::build(&s, &Thresholds::new(80.0, 50.0).unwrap());
        assert!(chart.y_bounds[1] >= 80.0);
        assert_eq!(chart.x_bounds, [1.0, 2.0]);
    }
}
