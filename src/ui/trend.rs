//! Trend view rendering.
//!
//! Draws the selected unit's predicted RUL over cycles with the warning and
//! critical threshold lines, under the maintenance alert banner.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Dataset as ChartDataset, GraphType, LegendPosition, Paragraph,
    },
    Frame,
};

use crate::app::{App, Banner, UnitView};
use crate::data::TrendChart;

/// Render the Trend view for the selected unit.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let view = match app.unit_view() {
        Some(Ok(view)) => view,
        Some(Err(e)) => {
            render_message(frame, app, area, &Banner::from_error(&e));
            return;
        }
        None => {
            let message = if app.data.is_some() {
                "No unit selected"
            } else {
                "No data loaded"
            };
            render_message(
                frame,
                app,
                area,
                &Banner::new(crate::data::Severity::Info, message),
            );
            return;
        }
    };

    let chunks = Layout::vertical([
        Constraint::Length(3), // Alert banner
        Constraint::Length(1), // Stats
        Constraint::Min(6),    // Chart
    ])
    .split(area);

    crate::ui::common::render_banner(frame, app, chunks[0], &view.alert);
    render_stats(frame, app, chunks[1], &view);
    render_chart(frame, app, chunks[2], &view);
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect, view: &UnitView) {
    let latest = view.series.latest();
    let line = Line::from(vec![
        Span::styled(
            format!(" Unit {} ", view.series.unit()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("│ {} cycles │ min ", view.series.len())),
        Span::styled(
            format!("{:.1}", view.assessment.min_rul),
            app.theme.status_style(view.assessment.status),
        ),
        Span::raw(format!(" @ cycle {} │ latest ", view.assessment.min_cycle)),
        Span::raw(
            latest
                .map(|r| format!("{:.1} @ cycle {}", r.predicted_rul, r.cycle))
                .unwrap_or_else(|| "-".to_string()),
        ),
        Span::raw(" │ "),
        Span::styled(
            view.assessment.status.label(),
            app.theme.status_style(view.assessment.status),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_chart(frame: &mut Frame, app: &App, area: Rect, view: &UnitView) {
    let TrendChart {
        rul,
        warning,
        critical,
        x_bounds,
        y_bounds,
    } = &view.chart;

    let datasets = vec![
        ChartDataset::default()
            .name("Predicted RUL")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.rul_line))
            .data(rul),
        ChartDataset::default()
            .name(format!("Warning ({})", app.thresholds.warning))
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.warning))
            .data(warning),
        ChartDataset::default()
            .name(format!("Critical ({})", app.thresholds.critical))
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.critical))
            .data(critical),
    ];

    let x_labels = vec![
        format!("{:.0}", x_bounds[0]),
        format!("{:.0}", (x_bounds[0] + x_bounds[1]) / 2.0),
        format!("{:.0}", x_bounds[1]),
    ];
    let y_labels = vec![
        "0".to_string(),
        format!("{:.0}", y_bounds[1] / 2.0),
        format!("{:.0}", y_bounds[1]),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(" Predicted RUL ")
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .x_axis(
            Axis::default()
                .title("Cycle")
                .style(Style::default().fg(app.theme.border))
                .bounds(*x_bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("RUL")
                .style(Style::default().fg(app.theme.border))
                .bounds(*y_bounds)
                .labels(y_labels),
        )
        .legend_position(Some(LegendPosition::TopRight));

    frame.render_widget(chart, area);
}

fn render_message(frame: &mut Frame, app: &App, area: Rect, banner: &Banner) {
    let chunks = Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).split(area);
    crate::ui::common::render_banner(frame, app, chunks[0], banner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThresholdSettings;
    use crate::data::{Dataset, Reading, Thresholds, UnitId};
    use crate::source::ChannelSource;
    use crate::ui::Theme;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn app() -> App {
        let (tx, source) = ChannelSource::create("test");
        tx.send(Arc::new(Dataset::from_readings(vec![
            Reading::new(1, 1, 40.0),
            Reading::new(1, 2, 25.0),
            Reading::new(1, 3, 15.0),
        ])))
        .unwrap();
        let mut app = App::with_theme(
            Box::new(source),
            Thresholds::default(),
            ThresholdSettings::default(),
            Theme::dark(),
        );
        app.reload_data();
        app
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_renders_alert_and_chart() {
        let app = app();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                render(f, &app, area)
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Maintenance recommended soon"));
        assert!(text.contains("Predicted RUL"));
        assert!(text.contains("Critical"));
    }

    #[test]
    fn test_renders_not_found_banner() {
        let mut app = app();
        app.select_unit(UnitId::from(9));
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                render(f, &app, area)
            })
            .unwrap();

        assert!(buffer_text(&terminal).contains("Unit 9 not found"));
    }
}
