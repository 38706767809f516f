use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};

/// Default file written by the export key.
pub const EXPORT_PATH: &str = "rul_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.filter_active {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Char('1') => app.set_view(View::Fleet),
        KeyCode::Char('2') => app.set_view(View::Trend),
        KeyCode::Char('3') => app.set_view(View::Explain),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),

        // Unit selection
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('p') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('n') => app.select_next(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Enter => app.enter_detail(),
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        // Thresholds
        KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_warning(1.0),
        KeyCode::Char('-') => app.adjust_warning(-1.0),
        KeyCode::Char(']') => app.adjust_critical(1.0),
        KeyCode::Char('[') => app.adjust_critical(-1.0),

        KeyCode::Char('r') => app.force_reload(),
        KeyCode::Char('?') => app.toggle_help(),

        // Sorting and filtering apply to the Fleet table
        KeyCode::Char('s') if app.current_view == View::Fleet => app.cycle_sort(),
        KeyCode::Char('S') if app.current_view == View::Fleet => app.toggle_sort_direction(),
        KeyCode::Char('/') => {
            app.set_view(View::Fleet);
            app.start_filter();
        }
        KeyCode::Char('c') => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        KeyCode::Char('e') => export(app, Path::new(EXPORT_PATH)),

        _ => {}
    }
}

fn export(app: &mut App, path: &Path) {
    match app.export_state(path) {
        Ok(()) => app.set_status_message(format!("Exported to {}", path.display())),
        Err(e) => app.set_status_message(format!("Export failed: {}", e)),
    }
}

/// Handle key input while filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.cancel_filter(),

        // Keep text but exit input mode
        KeyCode::Esc => app.cancel_filter(),

        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_filter();
        }

        KeyCode::Backspace => {
            app.filter_pop();
            if app.filter_text.is_empty() {
                app.filter_active = false;
            }
        }

        KeyCode::Char(c) => app.filter_push(c),

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Rows below the Fleet table header select a unit
            if clicked_row > content_start_row && app.current_view == View::Fleet {
                let item_row = (clicked_row - content_start_row - 1) as usize;
                if item_row < app.visible_units().len() {
                    app.select_index(item_row);
                }
            }

            // Tab bar (row 1): " 1:Fleet " | " 2:Trend " | " 3:Explain "
            if clicked_row == 1 {
                let col = mouse.column;
                if col < 10 {
                    app.set_view(View::Fleet);
                } else if col < 20 {
                    app.set_view(View::Trend);
                } else if col < 32 {
                    app.set_view(View::Explain);
                }
            }
        }

        MouseEventKind::Down(MouseButton::Right) => app.go_back(),

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThresholdSettings;
    use crate::data::{Dataset, Reading, Thresholds, UnitId};
    use crate::source::ChannelSource;
    use crate::ui::Theme;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use std::sync::Arc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn app() -> App {
        let (tx, source) = ChannelSource::create("test");
        tx.send(Arc::new(Dataset::from_readings(vec![
            Reading::new(1, 1, 15.0),
            Reading::new(2, 1, 25.0),
            Reading::new(12, 1, 80.0),
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

    #[test]
    fn test_quit() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn test_view_keys() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('3')));
        assert_eq!(app.current_view, View::Explain);
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.current_view, View::Fleet);
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert_eq!(app.current_view, View::Trend);
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert_eq!(app.current_view, View::Fleet);
    }

    #[test]
    fn test_next_unit_key() {
        let mut app = app();
        assert_eq!(app.selected_unit, Some(UnitId::from(1)));
        handle_key_event(&mut app, key(KeyCode::Char('n')));
        assert_eq!(app.selected_unit, Some(UnitId::from(2)));
        handle_key_event(&mut app, key(KeyCode::Char('p')));
        assert_eq!(app.selected_unit, Some(UnitId::from(1)));
    }

    #[test]
    fn test_threshold_keys() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('+')));
        assert_eq!(app.thresholds.warning, 31.0);
        handle_key_event(&mut app, key(KeyCode::Char('[')));
        assert_eq!(app.thresholds.critical, 19.0);
        handle_key_event(&mut app, key(KeyCode::Char('-')));
        assert_eq!(app.thresholds.warning, 30.0);
        handle_key_event(&mut app, key(KeyCode::Char(']')));
        assert_eq!(app.thresholds.critical, 20.0);
    }

    #[test]
    fn test_filter_input() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        assert!(app.filter_active);
        handle_key_event(&mut app, key(KeyCode::Char('1')));
        handle_key_event(&mut app, key(KeyCode::Char('2')));
        assert_eq!(app.filter_text, "12");
        // 'q' is text while filtering
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.running);
        handle_key_event(&mut app, key(KeyCode::Backspace));
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(!app.filter_active);
        assert_eq!(app.visible_units().len(), 1);
        assert_eq!(app.selected_unit, Some(UnitId::from(12)));

        handle_key_event(&mut app, key(KeyCode::Char('c')));
        assert_eq!(app.visible_units().len(), 3);
    }

    #[test]
    fn test_help_consumes_next_key() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);
    }

    #[test]
    fn test_mouse_click_selects_row() {
        let mut app = app();
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 5,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse_event(&mut app, click, 3);
        assert_eq!(app.selected_index, 1);
        assert_eq!(app.selected_unit, Some(UnitId::from(2)));
    }
}
