//! Traits at the seam between the pool and a speech model.
//!
//! A [`Loader`] is shared by every worker of a pool and produces one
//! [`Synthesizer`] per worker. The synthesizer is owned by its worker task and
//! is only ever driven by one request at a time.

use crate::{ModelConfig, message::Event};
use bytes::Bytes;
use core::future::Future;
use tokio::sync::mpsc;

/// Boxed error returned by backends.
///
/// Backend errors cross the worker boundary as their `Display` text.
pub type BoxError = Box<dyn core::error::Error + Send + Sync>;

/// Loads a model instance for one worker.
pub trait Loader: Send + Sync + 'static {
    type Synthesizer: Synthesizer;

    /// Loads the model described by `config`.
    ///
    /// Implementations may call [`ProgressReporter::report`] any number of
    /// times while loading. Progress is best effort and carries no ordering
    /// across workers.
    fn load(
        &self,
        worker_id: usize,
        config: &ModelConfig,
        progress: ProgressReporter,
    ) -> impl Future<Output = Result<Self::Synthesizer, BoxError>> + Send;
}

/// Generates an audio payload for one unit of text.
pub trait Synthesizer: Send + 'static {
    fn synthesize(
        &mut self,
        text: &str,
        voice: &str,
    ) -> impl Future<Output = Result<Bytes, BoxError>> + Send;
}

/// Handle a [`Loader`] uses to publish download/load progress.
///
/// Reporting never blocks, so it is safe to call from synchronous progress
/// callbacks of third-party model loaders.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    events: mpsc::UnboundedSender<Event>,
}

impl ProgressReporter {
    pub(crate) const fn new(events: mpsc::UnboundedSender<Event>) -> Self {
        Self { events }
    }

    pub fn report(&self, loaded: u64, total: u64) {
        // The owner stops listening once initialization has finished.
        let _ = self.events.send(Event::Progress { loaded, total });
    }
}
