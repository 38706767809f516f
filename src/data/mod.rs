//! Data models and processing for predicted RUL.
//!
//! This module handles the transformation of a loaded predictions table into
//! per-unit series, threshold assessments and chart data.
//!
//! ## Submodules
//!
//! - [`reading`]: Readings, unit ids, the canonical CSV [`Schema`] and the loaded [`Dataset`]
//! - [`selector`]: Filtering a dataset down to one unit's ordered [`UnitSeries`]
//! - [`evaluator`]: [`Thresholds`], [`Status`] classification and first-breach queries
//! - [`fleet`]: Per-unit summaries for the fleet overview ([`FleetData`])
//! - [`chart`]: Plot data for the trend chart ([`TrendChart`])
//!
//! ## Data Flow
//!
//! ```text
//! predictions.csv
//!        │
//!        ▼
//! Dataset::load()  ── SchemaError if columns are missing
//!        │
//!        ▼
//! select(dataset, unit) ── NotFound
//!        │
//!        ├──▶ classify(series, thresholds) ── EmptySeries
//!        │
//!        └──▶ TrendChart::build(series, thresholds)
//! ```

pub mod chart;
pub mod evaluator;
pub mod fleet;
pub mod reading;
pub mod selector;

pub use chart::TrendChart;
pub use evaluator::{classify, first_breach, Assessment, Severity, Status, Thresholds};
pub use fleet::{FleetData, UnitSummary};
pub use reading::{Dataset, Reading, Schema, UnitId};
pub use selector::{select, UnitSeries};
