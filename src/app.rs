//! Application state and navigation logic.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, info};

use crate::config::ThresholdSettings;
use crate::data::{
    Assessment, FleetData, Severity, Thresholds, TrendChart, UnitId, UnitSeries, UnitSummary,
};
use crate::error::RulError;
use crate::model::Attribution;
use crate::report::FleetReport;
use crate::source::DataSource;
use crate::ui::fleet::SortColumn;
use crate::ui::Theme;

/// How long a temporary status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Step applied by the threshold controls.
const THRESHOLD_STEP: f64 = 1.0;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Overview of all units with their status.
    Fleet,
    /// Predicted RUL chart and alert for the selected unit.
    Trend,
    /// Feature attributions for the selected unit's latest prediction.
    Explain,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Fleet => View::Trend,
            View::Trend => View::Explain,
            View::Explain => View::Fleet,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Fleet => View::Explain,
            View::Trend => View::Fleet,
            View::Explain => View::Trend,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Fleet => "Fleet",
            View::Trend => "Trend",
            View::Explain => "Explain",
        }
    }
}

/// A message shown in the alert banner.
#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub severity: Severity,
    pub message: String,
}

impl Banner {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    /// Banner for an error: inference failures are warnings, everything else is an error.
    pub fn from_error(err: &RulError) -> Self {
        let severity = if err.is_soft() {
            Severity::Warning
        } else {
            Severity::Error
        };
        Self::new(severity, err.to_string())
    }
}

/// Everything needed to draw the selected unit.
#[derive(Debug, Clone)]
pub struct UnitView {
    pub series: UnitSeries,
    pub assessment: Assessment,
    pub chart: TrendChart,
    pub alert: Banner,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub data: Option<FleetData>,
    pub load_error: Option<Banner>,
    pub thresholds: Thresholds,
    pub slider_range: (f64, f64),

    // Selection: visual index into the filtered/sorted unit list, plus the
    // unit it points at so the selection survives reloads and re-sorting.
    pub selected_index: usize,
    pub selected_unit: Option<UnitId>,

    // Sorting (Fleet view)
    pub sort_column: SortColumn,
    pub sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App with the given data source and threshold settings.
    pub fn new(source: Box<dyn DataSource>, settings: ThresholdSettings) -> Result<Self> {
        let thresholds = Thresholds::new(settings.warning, settings.critical)?;
        Ok(Self::with_theme(source, thresholds, settings, Theme::auto_detect()))
    }

    /// Create a new App with an explicit theme.
    pub fn with_theme(
        source: Box<dyn DataSource>,
        thresholds: Thresholds,
        settings: ThresholdSettings,
        theme: Theme,
    ) -> Self {
        Self {
            running: true,
            current_view: View::Fleet,
            show_help: false,
            source,
            data: None,
            load_error: None,
            thresholds,
            slider_range: settings.slider_bounds(),
            selected_index: 0,
            selected_unit: None,
            sort_column: SortColumn::default(),
            sort_ascending: false, // Critical first
            filter_text: String::new(),
            filter_active: false,
            theme,
            status_message: None,
        }
    }

    /// Pre-select a unit; it takes effect once data is loaded.
    pub fn select_unit(&mut self, unit: UnitId) {
        self.selected_unit = Some(unit);
        self.sync_index_to_unit();
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Poll the data source for new data.
    ///
    /// Returns true if a new dataset was received. Load errors are kept in
    /// `load_error` and halt rendering of unit data until the next good load.
    pub fn reload_data(&mut self) -> bool {
        if let Some(dataset) = self.source.poll() {
            let data = FleetData::from_dataset(dataset, &self.thresholds);
            debug!(units = data.units.len(), "fleet reclassified");
            self.data = Some(data);
            self.load_error = None;
            self.sync_index_to_unit();
            return true;
        }

        if let Some(err) = self.source.error() {
            self.load_error = Some(Banner::from_error(err));
            // A hard error invalidates what was shown; soft errors keep it.
            if !err.is_soft() {
                self.data = None;
            }
        }
        false
    }

    /// Drop any cached data in the source and reload.
    pub fn force_reload(&mut self) {
        info!(source = self.source.description(), "manual reload");
        self.source.invalidate();
        if self.reload_data() {
            self.set_status_message("Reloaded".to_string());
        }
    }

    /// Units after filtering and sorting, as displayed in the Fleet view.
    pub fn visible_units(&self) -> Vec<&UnitSummary> {
        let Some(ref data) = self.data else {
            return Vec::new();
        };
        let mut units: Vec<&UnitSummary> =
            data.units.iter().filter(|u| self.matches_filter(u.unit.as_str())).collect();
        crate::ui::fleet::sort_units_by(&mut units, self.sort_column, self.sort_ascending);
        units
    }

    /// Recompute the visual index from the pinned unit, or pin the unit at the index.
    fn sync_index_to_unit(&mut self) {
        let visible: Vec<UnitId> = self.visible_units().iter().map(|u| u.unit.clone()).collect();
        if visible.is_empty() {
            self.selected_index = 0;
            return;
        }

        if let Some(ref unit) = self.selected_unit {
            if let Some(pos) = visible.iter().position(|u| u == unit) {
                self.selected_index = pos;
                return;
            }
            // With no filter a missing unit is absent from the dataset itself.
            // Keep it pinned so the Trend view reports NotFound, and park the
            // index so the Fleet view highlights nothing.
            if self.filter_text.is_empty() && self.data.is_some() {
                self.selected_index = 0;
                return;
            }
        }

        self.selected_index = self.selected_index.min(visible.len() - 1);
        self.selected_unit = Some(visible[self.selected_index].clone());
    }

    /// Row to highlight in the Fleet view, if the pinned unit is visible.
    pub fn highlighted_index(&self) -> Option<usize> {
        let unit = self.selected_unit.as_ref()?;
        let visible = self.visible_units();
        (visible.get(self.selected_index)?.unit == *unit).then_some(self.selected_index)
    }

    /// Select the unit at a visual index, clamped to the visible list.
    pub fn select_index(&mut self, index: usize) {
        let visible: Vec<UnitId> = self.visible_units().iter().map(|u| u.unit.clone()).collect();
        if visible.is_empty() {
            return;
        }
        self.selected_index = index.min(visible.len() - 1);
        self.selected_unit = Some(visible[self.selected_index].clone());
    }

    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    pub fn select_next_n(&mut self, n: usize) {
        self.select_index(self.selected_index.saturating_add(n));
    }

    pub fn select_prev_n(&mut self, n: usize) {
        self.select_index(self.selected_index.saturating_sub(n));
    }

    pub fn select_first(&mut self) {
        self.select_index(0);
    }

    pub fn select_last(&mut self) {
        self.select_index(usize::MAX);
    }

    /// Build the series, assessment and chart for the selected unit.
    ///
    /// Recomputed on every call; nothing is cached between selections.
    pub fn unit_view(&self) -> Option<Result<UnitView, RulError>> {
        let data = self.data.as_ref()?;
        let unit = self.selected_unit.as_ref()?;
        Some(Self::build_unit_view(data, unit, &self.thresholds))
    }

    fn build_unit_view(
        data: &FleetData,
        unit: &UnitId,
        thresholds: &Thresholds,
    ) -> Result<UnitView, RulError> {
        let series = data.series(unit)?;
        let assessment = crate::data::classify(&series, thresholds)?;
        let chart = TrendChart::build(&series, thresholds);
        let alert = Banner::new(
            assessment.status.severity(),
            assessment.alert_message(thresholds),
        );
        Ok(UnitView {
            series,
            assessment,
            chart,
            alert,
        })
    }

    /// Explain the selected unit's latest prediction, if the source has a model.
    pub fn explain_selected(&self) -> Option<Result<(u32, Attribution), RulError>> {
        let unit = self.selected_unit.as_ref()?;
        self.source.explain(unit)
    }

    /// Move the warning threshold by `steps` increments.
    pub fn adjust_warning(&mut self, steps: f64) {
        let (lo, hi) = self.slider_range;
        let warning = (self.thresholds.warning + steps * THRESHOLD_STEP).clamp(lo, hi);
        self.apply_thresholds(warning, self.thresholds.critical);
    }

    /// Move the critical threshold by `steps` increments.
    pub fn adjust_critical(&mut self, steps: f64) {
        let (lo, hi) = self.slider_range;
        let critical = (self.thresholds.critical + steps * THRESHOLD_STEP).clamp(lo, hi);
        self.apply_thresholds(self.thresholds.warning, critical);
    }

    fn apply_thresholds(&mut self, warning: f64, critical: f64) {
        match Thresholds::new(warning, critical) {
            Ok(thresholds) if thresholds == self.thresholds => {}
            Ok(thresholds) => {
                self.thresholds = thresholds;
                self.data = self.data.as_ref().map(|data| data.reclassify(&thresholds));
                self.sync_index_to_unit();
                self.set_status_message(format!(
                    "Thresholds: warning {} / critical {}",
                    warning, critical
                ));
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Open the Trend view for the selected unit.
    pub fn enter_detail(&mut self) {
        if self.current_view == View::Fleet && self.selected_unit.is_some() {
            self.current_view = View::Trend;
        }
    }

    /// Navigate back: close help first, then return to the Fleet view.
    pub fn go_back(&mut self) {
        if self.show_help {
            self.show_help = false;
        } else {
            self.current_view = View::Fleet;
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn cycle_sort(&mut self) {
        self.sort_column = self.sort_column.next();
        self.sync_index_to_unit();
    }

    pub fn toggle_sort_direction(&mut self) {
        self.sort_ascending = !self.sort_ascending;
        self.sync_index_to_unit();
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
        self.sync_index_to_unit();
    }

    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.sync_index_to_unit();
    }

    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
        self.sync_index_to_unit();
    }

    /// Check if a unit id matches the current filter.
    pub fn matches_filter(&self, unit: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        unit.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current fleet assessment to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(ref data) = self.data else {
            anyhow::bail!("No data to export");
        };
        FleetReport::from_fleet(data).write(path)
    }
}
