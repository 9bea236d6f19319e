//! Owner-side handle for a single worker.
//!
//! A [`Session`] spawns one worker task and talks to it only through
//! messages. Every generate call is tagged with a request id drawn from a
//! per-session counter that starts at 1 and is never reused, and the caller is
//! suspended until the [`Event::Generated`] carrying that id arrives. A router
//! task matches completions to callers, so the correlation holds regardless of
//! the order in which results come back.

use crate::{
    Error, Loader, ModelConfig, Result,
    message::{Command, Event},
    worker::worker_loop,
};
use bytes::Bytes;
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Model load progress reported by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub worker_id: usize,
    pub loaded: u64,
    pub total: u64,
}

/// Lifecycle of a worker as seen by its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Spawned, model not requested yet.
    Uninitialized,
    /// Model load in progress.
    Initializing,
    /// Accepting requests, none outstanding.
    Ready,
    /// Accepting requests, at least one outstanding.
    Busy,
    /// Stopped for good.
    Terminated,
}

type Reply = oneshot::Sender<Result<Bytes>>;

#[derive(Debug)]
struct Inner {
    // Never `Busy`; that is derived from `pending`.
    state: WorkerState,
    next_id: u64,
    pending: HashMap<u64, Reply>,
}

/// Handle to one worker task.
pub struct Session {
    worker_id: usize,
    commands: mpsc::Sender<Command>,
    events: Mutex<Option<mpsc::UnboundedReceiver<Event>>>,
    inner: Arc<Mutex<Inner>>,
    shutdown_token: CancellationToken,
}

impl Session {
    /// Spawns a worker task backed by `loader`.
    ///
    /// The worker does nothing until [`Session::initialize`] is called.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn spawn<L: Loader>(worker_id: usize, loader: Arc<L>, request_buffer_size: usize) -> Self {
        Self::spawn_with_token(worker_id, loader, request_buffer_size, CancellationToken::new())
    }

    pub(crate) fn spawn_with_token<L: Loader>(
        worker_id: usize,
        loader: Arc<L>,
        request_buffer_size: usize,
        shutdown_token: CancellationToken,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(request_buffer_size.max(1));
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        tokio::spawn(worker_loop(
            worker_id,
            loader,
            command_rx,
            event_tx,
            shutdown_token.clone(),
        ));

        Self {
            worker_id,
            commands: command_tx,
            events: Mutex::new(Some(event_rx)),
            inner: Arc::new(Mutex::new(Inner {
                state: WorkerState::Uninitialized,
                next_id: 1,
                pending: HashMap::new(),
            })),
            shutdown_token,
        }
    }

    pub const fn worker_id(&self) -> usize {
        self.worker_id
    }

    pub fn state(&self) -> WorkerState {
        let inner = self.inner.lock();
        match inner.state {
            WorkerState::Ready if !inner.pending.is_empty() => WorkerState::Busy,
            state => state,
        }
    }

    /// Loads the worker's model and waits until it reports ready.
    ///
    /// `on_progress` is invoked for every progress report the worker emits
    /// before it becomes ready. A load failure terminates the session.
    ///
    /// # Errors
    ///
    /// - [`Error::WorkerInit`] if the model failed to load or the worker
    ///   exited.
    /// - [`Error::InvalidRequest`] if the session was already initialized.
    /// - [`Error::NotInitialized`] if the session was terminated.
    pub async fn initialize<F>(&self, config: ModelConfig, on_progress: F) -> Result<()>
    where
        F: Fn(LoadProgress),
    {
        {
            let mut inner = self.inner.lock();
            match inner.state {
                WorkerState::Uninitialized => inner.state = WorkerState::Initializing,
                WorkerState::Terminated => return Err(Error::NotInitialized),
                _ => {
                    return Err(Error::InvalidRequest {
                        reason: format!("Worker {} is already initialized", self.worker_id),
                    });
                }
            }
        }

        let Some(mut events) = self.events.lock().take() else {
            return Err(self.fail_init("event channel already taken"));
        };

        if self.commands.send(Command::Init { config }).await.is_err() {
            return Err(self.fail_init("worker exited before initialization"));
        }

        loop {
            let event = tokio::select! {
                biased;
                () = self.shutdown_token.cancelled() => return Err(Error::NotInitialized),
                event = events.recv() => event,
            };

            match event {
                Some(Event::Progress { loaded, total }) => on_progress(LoadProgress {
                    worker_id: self.worker_id,
                    loaded,
                    total,
                }),
                Some(Event::Ready) => break,
                Some(Event::Error { message }) => return Err(self.fail_init(message)),
                // Nothing has been requested yet.
                Some(Event::Generated { .. }) => {}
                None => return Err(self.fail_init("worker exited during initialization")),
            }
        }

        {
            let mut inner = self.inner.lock();
            if inner.state == WorkerState::Terminated {
                return Err(Error::NotInitialized);
            }
            inner.state = WorkerState::Ready;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Worker {} ready", self.worker_id);

        tokio::spawn(route_events(
            self.worker_id,
            events,
            Arc::clone(&self.inner),
            self.shutdown_token.clone(),
        ));

        Ok(())
    }

    /// Generates audio for `text` on this session's worker.
    ///
    /// The worker handles requests one at a time in submission order.
    ///
    /// # Errors
    ///
    /// - [`Error::NotInitialized`] if the session is not ready or is
    ///   terminated while the request is outstanding.
    /// - [`Error::Generation`] if the backend failed.
    /// - [`Error::ChannelError`] if the worker exited unexpectedly.
    pub async fn generate(&self, text: &str, voice: &str) -> Result<Bytes> {
        let (tx, rx) = oneshot::channel();
        let id = {
            let mut inner = self.inner.lock();
            if inner.state != WorkerState::Ready {
                return Err(Error::NotInitialized);
            }
            let id = inner.next_id;
            inner.next_id += 1;
            inner.pending.insert(id, tx);
            id
        };
        let _pending = PendingGuard {
            inner: &self.inner,
            id,
        };

        let command = Command::Generate {
            id,
            text: text.to_owned(),
            voice: voice.to_owned(),
        };
        if self.commands.send(command).await.is_err() {
            return Err(self.closed_error());
        }

        match rx.await {
            Ok(result) => result,
            Err(_) => Err(self.closed_error()),
        }
    }

    /// Stops the worker and fails every outstanding request.
    ///
    /// Idempotent; the session cannot be initialized again afterwards.
    pub fn terminate(&self) {
        self.shutdown_token.cancel();
        let mut inner = self.inner.lock();
        inner.state = WorkerState::Terminated;
        // Dropping the reply senders wakes every suspended caller.
        inner.pending.clear();
    }

    fn fail_init(&self, reason: impl Into<String>) -> Error {
        self.terminate();
        Error::WorkerInit {
            worker_id: self.worker_id,
            reason: reason.into(),
        }
    }

    fn closed_error(&self) -> Error {
        if self.shutdown_token.is_cancelled() || self.inner.lock().state == WorkerState::Terminated {
            Error::NotInitialized
        } else {
            Error::ChannelError {
                context: format!("Worker {} channel closed", self.worker_id),
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown_token.cancel();
    }
}

/// Removes a request's reply slot when its caller stops waiting.
struct PendingGuard<'a> {
    inner: &'a Mutex<Inner>,
    id: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.inner.lock().pending.remove(&self.id);
    }
}

/// Completes pending requests as the worker reports them.
async fn route_events(
    _worker_id: usize,
    mut events: mpsc::UnboundedReceiver<Event>,
    inner: Arc<Mutex<Inner>>,
    shutdown_token: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            biased;
            () = shutdown_token.cancelled() => break,
            event = events.recv() => event,
        };

        match event {
            Some(Event::Generated { id, result }) => {
                let reply = inner.lock().pending.remove(&id);
                match reply {
                    Some(reply) => {
                        // The caller may have given up; that is not an error.
                        let _ = reply.send(result.map_err(|reason| Error::Generation { reason }));
                    }
                    None => {
                        #[cfg(feature = "tracing")]
                        tracing::trace!("Worker {} reply for unknown request {}", _worker_id, id);
                    }
                }
            }
            Some(_) => {}
            None => break,
        }
    }

    inner.lock().pending.clear();

    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {} event router stopped", _worker_id);
}
