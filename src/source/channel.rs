//! Channel-based data source.
//!
//! Receives datasets, or the error that stopped one being produced, over a
//! tokio watch channel. The binary feeds it from a thread reading a
//! predictions CSV on stdin (`--file -`); an embedding process can push its
//! own predictions the same way instead of writing a file.

use std::io::Read;
use std::sync::Arc;
use std::thread;

use tokio::sync::watch;
use tracing::{info, warn};

use super::DataSource;
use crate::data::{Dataset, Schema};
use crate::error::RulError;

/// A dataset, or the error that prevented producing one.
pub type ChannelUpdate = std::result::Result<Arc<Dataset>, Arc<RulError>>;

/// Returned when every [`ChannelSource`] has been dropped.
pub type SendError = watch::error::SendError<Option<ChannelUpdate>>;

/// Sending half paired with a [`ChannelSource`].
#[derive(Debug)]
pub struct DatasetSender {
    inner: watch::Sender<Option<ChannelUpdate>>,
}

impl DatasetSender {
    /// Publish a new dataset, replacing whatever was sent before.
    pub fn send(&self, dataset: Arc<Dataset>) -> Result<(), SendError> {
        self.inner.send(Some(Ok(dataset)))
    }

    /// Publish a load failure; the source reports it from `error()`.
    pub fn fail(&self, error: RulError) -> Result<(), SendError> {
        self.inner.send(Some(Err(Arc::new(error))))
    }
}

/// A data source that receives datasets via a channel.
///
/// Nothing is delivered until the sender publishes something.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use rulwatch::{ChannelSource, DataSource, Dataset, Reading};
///
/// let (tx, mut source) = ChannelSource::create("predictor");
/// assert!(source.poll().is_none());
/// tx.send(Arc::new(Dataset::from_readings(vec![Reading::new(1, 1, 42.0)]))).unwrap();
/// assert_eq!(source.poll().unwrap().len(), 1);
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Option<ChannelUpdate>>,
    description: String,
    last_error: Option<Arc<RulError>>,
}

impl ChannelSource {
    /// Create a channel pair for sending datasets to a ChannelSource.
    pub fn create(source_description: &str) -> (DatasetSender, Self) {
        let (tx, rx) = watch::channel(None);
        let source = Self {
            receiver: rx,
            description: format!("channel: {}", source_description),
            last_error: None,
        };
        (DatasetSender { inner: tx }, source)
    }

    /// Parse a predictions CSV from `reader` on a background thread.
    ///
    /// The source reports "Loading" until the reader hits EOF, then serves the
    /// dataset or the parse error.
    pub fn spawn_reader<R>(reader: R, schema: Schema, source_description: &str) -> Self
    where
        R: Read + Send + 'static,
    {
        let (tx, source) = Self::create(source_description);
        thread::spawn(move || {
            let sent = match Dataset::from_reader(reader, &schema) {
                Ok(dataset) => {
                    info!(rows = dataset.len(), "read predictions from stream");
                    tx.send(Arc::new(dataset))
                }
                Err(e) => {
                    warn!(error = %e, "failed to read predictions from stream");
                    tx.fail(e)
                }
            };
            if sent.is_err() {
                warn!("channel source dropped before predictions arrived");
            }
        });
        source
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<Arc<Dataset>> {
        // `Ref::has_changed` still reports an unseen value after the sender
        // has been dropped, unlike `Receiver::has_changed`.
        let update = {
            let current = self.receiver.borrow_and_update();
            if !current.has_changed() {
                return None;
            }
            current.clone()?
        };

        match update {
            Ok(dataset) => {
                self.last_error = None;
                Some(dataset)
            }
            Err(e) => {
                self.last_error = Some(e);
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&RulError> {
        self.last_error.as_deref()
    }

    fn invalidate(&mut self) {
        if self.receiver.borrow().is_some() {
            self.receiver.mark_changed();
        }
    }
}
