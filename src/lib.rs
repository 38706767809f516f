//! # rulwatch
//!
//! A terminal dashboard and library for monitoring the predicted Remaining
//! Useful Life (RUL) of a fleet of engine units.
//!
//! Predictions come either from a CSV produced by an offline model
//! (`unit_number`, `time_in_cycles`, `predicted_RUL`) or from running a fitted
//! linear pipeline over a validation feature table. Each unit's series is
//! classified against a warning and a critical threshold and drawn as a trend
//! chart with an alert banner.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(assess)  │    │(render) │    │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐    ┌──────────┐                                │
//! │  │ source  │───▶│  model   │  FileSource | InferenceSource  │
//! │  │ (input) │    │(predict) │  | ChannelSource               │
//! │  └─────────┘    └──────────┘                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, unit selection, threshold controls
//! - **[`source`]**: Data source abstraction ([`DataSource`] trait) with implementations
//!   for predictions files, model inference and channel-based input
//! - **[`data`]**: Readings, per-unit series, threshold classification and chart data
//! - **[`model`]**: Linear pipeline inference and per-feature attributions
//! - **[`ui`]**: Terminal rendering using ratatui - fleet table, trend chart,
//!   attribution view, and theme support
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Monitor a predictions file
//! rulwatch --file predictions.csv --warning 30 --critical 20
//!
//! # Run a fitted model over a validation table
//! rulwatch --validation validation.csv --model pipeline.json
//!
//! # Write a fleet report and exit
//! rulwatch --file predictions.csv --export report.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use rulwatch::{classify, select, Dataset, Schema, Status, Thresholds, UnitId};
//!
//! let csv = "unit_number,time_in_cycles,predicted_RUL\n1,1,40\n1,2,25\n1,3,15\n";
//! let dataset = Dataset::from_reader(csv.as_bytes(), &Schema::default()).unwrap();
//!
//! let series = select(&dataset, &UnitId::from(1)).unwrap();
//! let assessment = classify(&series, &Thresholds::default()).unwrap();
//! assert_eq!(assessment.min_rul, 15.0);
//! assert_eq!(assessment.status, Status::Critical);
//! ```
//!
//! ### Feeding the dashboard from another process
//!
//! ```no_run
//! use std::sync::Arc;
//! use rulwatch::{App, ChannelSource, Dataset, Reading, ThresholdSettings};
//!
//! let (tx, source) = ChannelSource::create("model-server");
//! let app = App::new(Box::new(source), ThresholdSettings::default()).unwrap();
//!
//! tx.send(Arc::new(Dataset::from_readings(vec![Reading::new(1, 1, 42.0)])))
//!     .unwrap();
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod model;
pub mod report;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, Banner, View};
pub use config::{Settings, ThresholdSettings};
pub use data::{
    classify, first_breach, select, Assessment, Dataset, FleetData, Reading, Schema, Severity,
    Status, Thresholds, TrendChart, UnitId, UnitSeries, UnitSummary,
};
pub use error::RulError;
pub use model::{Attribution, FeatureTable, LinearPipeline, RulModel};
pub use source::{
    ChannelSource, DataSource, DatasetCache, DatasetSender, FileSource, InferenceSource,
};
