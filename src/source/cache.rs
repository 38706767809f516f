//! Memoized dataset loading keyed on file path.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::debug;

use crate::data::{Dataset, Schema};
use crate::error::Result;

#[derive(Debug)]
struct CacheEntry {
    modified: SystemTime,
    dataset: Arc<Dataset>,
}

/// Caches loaded datasets by path.
///
/// An entry is reused while the file's modification time is unchanged, so
/// repeated loads of the same file return the same `Arc`. Files whose
/// modification time cannot be read are never cached.
#[derive(Debug, Default)]
pub struct DatasetCache {
    schema: Schema,
    entries: HashMap<PathBuf, CacheEntry>,
}

impl DatasetCache {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            entries: HashMap::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Load the dataset at `path`, reusing the cached copy if the file is unchanged.
    pub fn load(&mut self, path: &Path) -> Result<Arc<Dataset>> {
        let modified = fs::metadata(path).and_then(|m| m.modified()).ok();

        if let (Some(modified), Some(entry)) = (modified, self.entries.get(path)) {
            if entry.modified == modified {
                debug!(path = %path.display(), "dataset cache hit");
                return Ok(Arc::clone(&entry.dataset));
            }
        }

        self.entries.remove(path);
        let dataset = Arc::new(Dataset::load(path, &self.schema)?);
        debug!(path = %path.display(), rows = dataset.len(), "dataset loaded");

        if let Some(modified) = modified {
            self.entries.insert(
                path.to_path_buf(),
                CacheEntry {
                    modified,
                    dataset: Arc::clone(&dataset),
                },
            );
        }
        Ok(dataset)
    }

    /// Drop the cached entry for a path.
    pub fn invalidate(&mut self, path: &Path) {
        self.entries.remove(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RulError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_unchanged_file_hits_cache() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "unit_number,time_in_cycles,predicted_RUL\n1,1,40").unwrap();
        file.flush().unwrap();

        let mut cache = DatasetCache::new(Schema::default());
        let first = cache.load(file.path()).unwrap();
        let second = cache.load(file.path()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "unit_number,time_in_cycles,predicted_RUL\n1,1,40").unwrap();
        file.flush().unwrap();

        let mut cache = DatasetCache::new(Schema::default());
        let first = cache.load(file.path()).unwrap();
        cache.invalidate(file.path());
        let second = cache.load(file.path()).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.readings(), second.readings());
    }

    #[test]
    fn test_schema_error_not_cached() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "unit_number,time_in_cycles\n1,1").unwrap();
        file.flush().unwrap();

        let mut cache = DatasetCache::new(Schema::default());
        let err = cache.load(file.path()).unwrap_err();
        assert!(matches!(err, RulError::Schema { .. }));
        assert!(cache.entries.is_empty());
    }
}
