//! Worker task lifecycle.
//!
//! Each worker is a long-running Tokio task that owns at most one
//! [`Synthesizer`]. It processes [`Command`]s strictly one at a time in
//! submission order and reports every outcome as an [`Event`]. The worker
//! exits when its command channel closes, when its owner stops listening for
//! events, or when its cancellation token fires. In the last case any
//! in-flight load or generation is dropped immediately.

use crate::{
    Loader, ProgressReporter, Synthesizer,
    message::{Command, Event, NOT_INITIALIZED},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Asynchronous task representing a single worker's lifecycle.
///
/// # Arguments
/// - `worker_id`: Identifier used for logging and passed to the loader.
/// - `loader`: Shared model loader.
/// - `rx`: Channel receiver for [`Command`]s.
/// - `events`: Channel sender for [`Event`]s back to the owner.
/// - `shutdown_token`: Cancelled when the owning session terminates.
pub(crate) async fn worker_loop<L: Loader>(
    worker_id: usize,
    loader: Arc<L>,
    rx: mpsc::Receiver<Command>,
    events: mpsc::UnboundedSender<Event>,
    shutdown_token: CancellationToken,
) {
    #[cfg(feature = "tracing")]
    tracing::debug!("Worker {} started", worker_id);

    tokio::select! {
        biased;
        () = shutdown_token.cancelled() => {
            #[cfg(feature = "tracing")]
            tracing::debug!("Worker {} shutdown via cancellation token", worker_id);
        }
        () = serve(worker_id, loader, rx, events) => {
            #[cfg(feature = "tracing")]
            tracing::debug!("Worker {} channel closed", worker_id);
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("Worker {} stopped", worker_id);
}

async fn serve<L: Loader>(
    worker_id: usize,
    loader: Arc<L>,
    mut rx: mpsc::Receiver<Command>,
    events: mpsc::UnboundedSender<Event>,
) {
    let mut synthesizer: Option<L::Synthesizer> = None;

    while let Some(command) = rx.recv().await {
        let event = match command {
            Command::Init { config } => {
                let progress = ProgressReporter::new(events.clone());
                match loader.load(worker_id, &config, progress).await {
                    Ok(loaded) => {
                        synthesizer = Some(loaded);
                        Event::Ready
                    }
                    Err(e) => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!("Worker {} failed to load model: {}", worker_id, e);
                        Event::Error {
                            message: e.to_string(),
                        }
                    }
                }
            }
            Command::Generate { id, text, voice } => {
                let result = match synthesizer.as_mut() {
                    Some(synthesizer) => synthesizer
                        .synthesize(&text, &voice)
                        .await
                        .map_err(|e| e.to_string()),
                    None => Err(NOT_INITIALIZED.to_owned()),
                };
                #[cfg(feature = "tracing")]
                {
                    if let Err(e) = &result {
                        tracing::debug!("Worker {} request {} failed: {}", worker_id, id, e);
                    }
                }
                Event::Generated { id, result }
            }
        };

        if events.send(event).is_err() {
            break;
        }
    }
}
