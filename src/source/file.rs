//! File-based data source.
//!
//! Polls a predictions CSV and reloads it when the file changes.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::{info, warn};

use super::{DataSource, DatasetCache};
use crate::data::{Dataset, Schema};
use crate::error::RulError;

/// A data source that reads predicted RUL from a CSV file.
///
/// The source tracks the file's modification time and only returns new data
/// when the file has been updated. A file that failed to load is not read
/// again until it changes or the source is invalidated.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    cache: DatasetCache,
    last_error: Option<RulError>,
    last_modified: Option<SystemTime>,
    attempted: bool,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P, schema: Schema) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            cache: DatasetCache::new(schema),
            last_error: None,
            last_modified: None,
            attempted: false,
        }
    }

    /// Returns the path being monitored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get_modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<Arc<Dataset>> {
        let current_modified = self.get_modified_time();

        let file_changed = match (&self.last_modified, &current_modified) {
            _ if !self.attempted => true,
            (None, Some(_)) => true,
            (Some(_), None) => false, // File disappeared, keep showing the last data
            (None, None) => false,
            (Some(last), Some(current)) => current > last,
        };

        if !file_changed {
            return None;
        }

        self.attempted = true;
        self.last_modified = current_modified;
        match self.cache.load(&self.path) {
            Ok(dataset) => {
                info!(
                    path = %self.path.display(),
                    rows = dataset.len(),
                    units = dataset.units().len(),
                    "loaded predictions"
                );
                self.last_error = None;
                Some(dataset)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to load predictions");
                self.last_error = Some(e);
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&RulError> {
        self.last_error.as_ref()
    }

    fn invalidate(&mut self) {
        self.cache.invalidate(&self.path);
        self.last_modified = None;
        self.attempted = false;
    }
}
