//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, alert banner, status bar,
//! and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, Banner, View};
use crate::data::Severity;

/// Render the header bar with the fleet overview.
///
/// Displays: worst status indicator, unit counts by status, active thresholds.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        let line = Line::from(vec![
            Span::styled(" RULWATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("│ {}", app.source_description())),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let (stable, warning, critical) = data.status_counts();
    let worst = data.worst_status();

    let line = Line::from(vec![
        Span::styled(" ● ", app.theme.status_style(worst)),
        Span::styled("RULWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(format!("{}", stable), Style::default().fg(app.theme.stable)),
        Span::raw(" ok "),
        count_span(warning, Style::default().fg(app.theme.warning)),
        Span::raw(" warn "),
        count_span(
            critical,
            Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" crit │ "),
        Span::styled(
            format!("{}", data.units.len()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" units │ "),
        Span::styled(
            format!("warn<{}", app.thresholds.warning),
            Style::default().fg(app.theme.warning),
        ),
        Span::raw(" "),
        Span::styled(
            format!("crit<{}", app.thresholds.critical),
            Style::default().fg(app.theme.critical),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn count_span(count: usize, style: Style) -> Span<'static> {
    if count > 0 {
        Span::styled(count.to_string(), style)
    } else {
        Span::styled("0", Style::default().add_modifier(Modifier::DIM))
    }
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![
        Line::from(" 1:Fleet "),
        Line::from(" 2:Trend "),
        Line::from(" 3:Explain "),
    ];

    let selected = match app.current_view {
        View::Fleet => 0,
        View::Trend => 1,
        View::Explain => 2,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render an alert banner styled by its severity.
pub fn render_banner(frame: &mut Frame, app: &App, area: Rect, banner: &Banner) {
    let style = app.theme.severity_style(banner.severity);
    let title = match banner.severity {
        Severity::Info => " Info ",
        Severity::Warning => " Warning ",
        Severity::Error => " Alert ",
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(style);

    let paragraph = Paragraph::new(Span::styled(banner.message.clone(), style))
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

/// Render the status bar at the bottom.
///
/// Shows: selected unit, time since last update, available controls.
/// Also displays temporary status messages and load errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(ref banner) = app.load_error {
        let line = Line::from(vec![
            Span::styled(
                format!(" {} ", banner.message),
                app.theme.severity_style(banner.severity),
            ),
            Span::styled(
                "| r:reload q:quit",
                Style::default().add_modifier(Modifier::DIM),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let status = if let Some(ref data) = app.data {
        let elapsed = data.last_updated.elapsed();
        let unit = app
            .selected_unit
            .as_ref()
            .map(|u| format!("Unit {}", u))
            .unwrap_or_else(|| "No unit".to_string());

        let controls = match app.current_view {
            View::Fleet if app.filter_active => "Type to search | Enter:apply Esc:cancel",
            View::Fleet => "/:search s:sort Enter:trend +/-:warn ]/[:crit ?:help q:quit",
            View::Trend => "n/p:unit +/-:warn ]/[:crit Esc:back ?:help q:quit",
            View::Explain => "n/p:unit Esc:back ?:help q:quit",
        };

        format!(
            " {} | Updated {:.1}s ago | {}",
            unit,
            elapsed.as_secs_f64(),
            controls,
        )
    } else {
        " Loading... | q:quit".to_string()
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  1/2/3       Fleet / Trend / Explain"),
        Line::from("  Tab         Switch views"),
        Line::from("  ↑/↓ j/k     Navigate units"),
        Line::from("  n/p         Next/previous unit"),
        Line::from("  PgUp/PgDn   Jump 10 units"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Open trend"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Thresholds"),
        Line::from(format!(
            "  +/-         Warning ({}..{})",
            app.slider_range.0, app.slider_range.1
        )),
        Line::from("  ]/[         Critical"),
        Line::from(""),
        section(" Fleet"),
        Line::from("  /         Start filter/search"),
        Line::from("  c         Clear filter"),
        Line::from("  s         Cycle sort column"),
        Line::from("  S         Toggle sort direction"),
        Line::from(""),
        section(" General"),
        Line::from("  r         Reload data"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 44u16.min(area.width.saturating_sub(4));
    let help_height = 32u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThresholdSettings;
    use crate::data::{Dataset, Reading, Thresholds};
    use crate::source::ChannelSource;
    use crate::ui::Theme;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn loaded_app() -> App {
        let (tx, source) = ChannelSource::create("test");
        tx.send(Arc::new(Dataset::from_readings(vec![
            Reading::new(1, 1, 15.0),
            Reading::new(2, 1, 25.0),
            Reading::new(3, 1, 80.0),
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

    fn render_text(app: &App, draw: fn(&mut Frame, &App, Rect)) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 3)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                draw(f, app, area)
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_header_counts() {
        let text = render_text(&loaded_app(), render_header);
        assert!(text.contains("1 ok 1 warn 1 crit"));
        assert!(text.contains("3 units"));
        assert!(text.contains("warn<30"));
    }

    #[test]
    fn test_tabs_list_views() {
        let text = render_text(&loaded_app(), render_tabs);
        assert!(text.contains("1:Fleet"));
        assert!(text.contains("3:Explain"));
    }

    #[test]
    fn test_banner_shows_message() {
        let app = loaded_app();
        let mut terminal = Terminal::new(TestBackend::new(60, 3)).unwrap();
        let banner = Banner::new(Severity::Warning, "Inference failed: boom");
        terminal
            .draw(|f| {
                let area = f.area();
                render_banner(f, &app, area, &banner)
            })
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Warning"));
        assert!(text.contains("Inference failed: boom"));
    }
}
