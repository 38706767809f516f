//! Data source abstraction for receiving predicted-RUL datasets.
//!
//! This module provides a trait-based abstraction for receiving datasets
//! from various sources (a predictions CSV, model inference over a validation
//! table, or an in-memory channel fed by an embedding process).

mod cache;
mod channel;
mod file;
mod inference;

pub use cache::DatasetCache;
pub use channel::{ChannelSource, ChannelUpdate, DatasetSender};
pub use file::FileSource;
pub use inference::InferenceSource;

use std::fmt::Debug;
use std::sync::Arc;

use crate::data::{Dataset, UnitId};
use crate::error::{Result, RulError};
use crate::model::Attribution;

/// Trait for receiving datasets from various sources.
///
/// # Example
///
/// ```
/// use rulwatch::{DataSource, FileSource, Schema};
///
/// let mut source = FileSource::new("predictions.csv", Schema::default());
/// if let Some(dataset) = source.poll() {
///     println!("Got {} units", dataset.units().len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest dataset.
    ///
    /// Returns `Some(dataset)` if new data is available, `None` otherwise.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<Arc<Dataset>>;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;

    /// The error from the last poll, if it failed.
    fn error(&self) -> Option<&RulError>;

    /// Forget cached state so the next poll reloads from scratch.
    fn invalidate(&mut self) {}

    /// Explain the latest prediction for a unit.
    ///
    /// Returns `None` when the source has no model to explain.
    fn explain(&self, _unit: &UnitId) -> Option<Result<(u32, Attribution)>> {
        None
    }
}
