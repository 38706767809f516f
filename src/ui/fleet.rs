//! Fleet view rendering.
//!
//! Displays a table of all units with their minimum and latest predicted RUL,
//! first threshold breaches, a sparkline trend and the resulting status.

use std::cmp::Ordering;

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::UnitSummary;

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Column to sort by in the Fleet view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    /// Sort by status, then minimum RUL.
    #[default]
    Status,
    /// Sort by unit id.
    Unit,
    /// Sort by number of cycles observed.
    Cycles,
    /// Sort by the latest predicted RUL.
    LatestRul,
    /// Sort by the minimum predicted RUL.
    MinRul,
}

impl SortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            SortColumn::Status => SortColumn::Unit,
            SortColumn::Unit => SortColumn::Cycles,
            SortColumn::Cycles => SortColumn::LatestRul,
            SortColumn::LatestRul => SortColumn::MinRul,
            SortColumn::MinRul => SortColumn::Status,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortColumn::Status => "status",
            SortColumn::Unit => "unit",
            SortColumn::Cycles => "cycles",
            SortColumn::LatestRul => "latest",
            SortColumn::MinRul => "min",
        }
    }
}

/// Render the Fleet view showing all units in a sortable table.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.data.is_none() {
        render_no_data(frame, app, area);
        return;
    }

    let units = app.visible_units();
    let total = app.data.as_ref().map_or(0, |d| d.units.len());

    let header = Row::new(vec![
        Cell::from(format_header("Unit", SortColumn::Unit, app)),
        Cell::from(format_header("Cycles", SortColumn::Cycles, app)),
        Cell::from(format_header("Latest", SortColumn::LatestRul, app)),
        Cell::from(format_header("Min RUL", SortColumn::MinRul, app)),
        Cell::from("Warn@"),
        Cell::from("Crit@"),
        Cell::from("Trend"),
        Cell::from(format_header("Status", SortColumn::Status, app)),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = units
        .iter()
        .map(|u| {
            let status_style = app.theme.status_style(u.status());
            let latest_style = app.theme.status_style(app.thresholds.classify_value(u.latest.predicted_rul));

            Row::new(vec![
                Cell::from(u.unit.to_string()),
                Cell::from(u.cycles.to_string()),
                Cell::from(format_rul(u.latest.predicted_rul)).style(latest_style),
                Cell::from(format_rul(u.assessment.min_rul)).style(status_style),
                Cell::from(format_cycle(u.warning_breach)),
                Cell::from(format_cycle(u.critical_breach)),
                Cell::from(render_sparkline(&u.trend)),
                Cell::from(u.status().symbol()).style(status_style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2), // Unit
        Constraint::Fill(1), // Cycles
        Constraint::Fill(1), // Latest
        Constraint::Fill(1), // Min RUL
        Constraint::Fill(1), // Warn@
        Constraint::Fill(1), // Crit@
        Constraint::Min(8),  // Trend
        Constraint::Min(6),  // Status
    ];

    let selected_visual_index = app.selected_index.min(units.len().saturating_sub(1));
    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !units.is_empty() {
        format!(" [{}/{}]", selected_visual_index + 1, units.len())
    } else {
        String::new()
    };

    let title = format!(
        " Units ({}/{}) [s:sort {}{}]{}{} ",
        units.len(),
        total,
        app.sort_column.label(),
        sort_dir,
        filter_info,
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(app.highlighted_index());

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_no_data(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Units ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let message = if app.load_error.is_some() {
        "No data to display. Fix the input and press r to reload."
    } else {
        "Loading..."
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", message),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn format_header(name: &str, col: SortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

/// Sort units by the given column and direction.
pub fn sort_units_by(units: &mut [&UnitSummary], column: SortColumn, ascending: bool) {
    units.sort_by(|a, b| {
        let primary = match column {
            SortColumn::Status => a
                .status()
                .cmp(&b.status())
                // Within a band, lower RUL is more urgent
                .then_with(|| b.assessment.min_rul.total_cmp(&a.assessment.min_rul)),
            SortColumn::Unit => a.unit.cmp(&b.unit),
            SortColumn::Cycles => a.cycles.cmp(&b.cycles),
            SortColumn::LatestRul => a.latest.predicted_rul.total_cmp(&b.latest.predicted_rul),
            SortColumn::MinRul => a.assessment.min_rul.total_cmp(&b.assessment.min_rul),
        };

        let primary = if ascending { primary } else { primary.reverse() };

        // Secondary sort by unit id for stability
        if primary == Ordering::Equal {
            a.unit.cmp(&b.unit)
        } else {
            primary
        }
    });
}

/// Scale values onto the 8 sparkline levels.
fn render_sparkline(values: &[f64]) -> String {
    if values.len() < 2 {
        return "        ".to_string();
    }

    let max = values.iter().copied().fold(f64::MIN, f64::max);
    let min = values.iter().copied().fold(f64::MAX, f64::min);
    let range = (max - min).max(f64::EPSILON);

    values
        .iter()
        .map(|&v| {
            let level = ((v - min) / range * 7.0).round() as usize;
            SPARKLINE_CHARS[level.min(7)]
        })
        .collect()
}

fn format_rul(rul: f64) -> String {
    format!("{:.1}", rul)
}

fn format_cycle(cycle: Option<u32>) -> String {
    cycle.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FleetData, Reading, Thresholds, UnitId};
    use crate::data::Dataset;
    use std::sync::Arc;

    fn fleet() -> FleetData {
        let dataset = Dataset::from_readings(vec![
            Reading::new(1, 1, 25.0),
            Reading::new(2, 1, 90.0),
            Reading::new(2, 2, 80.0),
            Reading::new(3, 1, 22.0),
            Reading::new(10, 1, 5.0),
        ]);
        FleetData::from_dataset(Arc::new(dataset), &Thresholds::default())
    }

    fn ids(units: &[&UnitSummary]) -> Vec<String> {
        units.iter().map(|u| u.unit.to_string()).collect()
    }

    #[test]
    fn test_sort_by_status_descending_puts_most_urgent_first() {
        let fleet = fleet();
        let mut units: Vec<&UnitSummary> = fleet.units.iter().collect();
        sort_units_by(&mut units, SortColumn::Status, false);
        assert_eq!(ids(&units), vec!["10", "3", "1", "2"]);
    }

    #[test]
    fn test_sort_by_unit_is_numeric() {
        let fleet = fleet();
        let mut units: Vec<&UnitSummary> = fleet.units.iter().collect();
        sort_units_by(&mut units, SortColumn::Unit, true);
        assert_eq!(ids(&units), vec!["1", "2", "3", "10"]);
        assert_eq!(units[0].unit, UnitId::from(1));
    }

    #[test]
    fn test_sparkline() {
        assert_eq!(render_sparkline(&[10.0]), "        ");
        assert_eq!(render_sparkline(&[0.0, 7.0]), "▁█");
        assert_eq!(render_sparkline(&[5.0, 5.0, 5.0]), "▁▁▁");
    }
}
