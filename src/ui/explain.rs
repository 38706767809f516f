//! Explain view rendering.
//!
//! Shows how each input feature moved the selected unit's latest prediction
//! away from the model's base value.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::{App, Banner};
use crate::data::Severity;
use crate::model::Attribution;

/// Width of the widest contribution bar, in cells.
const BAR_WIDTH: usize = 24;

/// Render the attribution table for the selected unit.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Length(3), Constraint::Min(4)]).split(area);

    match app.explain_selected() {
        None => {
            let banner = Banner::new(
                Severity::Info,
                "Explanations need a model: start with --validation and --model",
            );
            crate::ui::common::render_banner(frame, app, chunks[0], &banner);
        }
        Some(Err(e)) => {
            crate::ui::common::render_banner(frame, app, chunks[0], &Banner::from_error(&e));
        }
        Some(Ok((cycle, attribution))) => {
            let unit = app.selected_unit.as_ref().map(|u| u.to_string()).unwrap_or_default();
            let summary = Banner::new(
                Severity::Info,
                format!(
                    "Unit {} cycle {}: base {:.1} → predicted {:.1}",
                    unit,
                    cycle,
                    attribution.base_value,
                    attribution.output()
                ),
            );
            crate::ui::common::render_banner(frame, app, chunks[0], &summary);
            render_table(frame, app, chunks[1], &attribution);
        }
    }
}

fn render_table(frame: &mut Frame, app: &App, area: Rect, attribution: &Attribution) {
    let header = Row::new(vec![
        Cell::from("Feature"),
        Cell::from("Value"),
        Cell::from("Contribution"),
        Cell::from("Effect"),
    ])
    .height(1)
    .style(app.theme.header);

    let max = attribution.max_magnitude();
    let rows: Vec<Row> = attribution
        .contributions
        .iter()
        .map(|c| {
            // Negative contributions shorten the predicted life.
            let style = if c.contribution < 0.0 {
                Style::default().fg(app.theme.critical)
            } else {
                Style::default().fg(app.theme.stable)
            };
            Row::new(vec![
                Cell::from(c.feature.clone()),
                Cell::from(format!("{:.3}", c.value)),
                Cell::from(format!("{:+.2}", c.contribution)).style(style),
                Cell::from(bar(c.contribution, max)).style(style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Length(BAR_WIDTH as u16 + 2),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(format!(" Attributions ({}) ", attribution.contributions.len()))
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );
    frame.render_widget(table, area);

    if attribution.contributions.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "  No features",
            Style::default().add_modifier(Modifier::DIM),
        )));
        frame.render_widget(empty, area);
    }
}

/// Horizontal bar proportional to `value / max`.
fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 {
        return String::new();
    }
    let len = ((value.abs() / max) * BAR_WIDTH as f64).round() as usize;
    let glyph = if value < 0.0 { "◀" } else { "▶" };
    glyph.repeat(len.clamp(1, BAR_WIDTH))
}
