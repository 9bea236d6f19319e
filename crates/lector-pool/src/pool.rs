//! Fixed-size pool of generation workers.
//!
//! This module defines the [`TaskPool`] struct, which owns a set of
//! [`Session`]s and distributes batches of text across them. A batch is not
//! partitioned up front: every worker runs its own pull loop over a shared
//! atomic cursor, so a fast worker naturally takes more units than a slow one,
//! and no index is ever handed out twice or skipped.
//!
//! Shutdown is coordinated through a shared [`CancellationToken`] whose child
//! tokens are held by every session.

use crate::{Error, LoadProgress, Loader, ModelConfig, Result, Session, WorkerState};
use bytes::Bytes;
use core::sync::atomic::{AtomicUsize, Ordering};
use futures::future::try_join_all;
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};
use tokio_util::sync::CancellationToken;

/// A pool of generation workers.
///
/// Lifecycle: [`TaskPool::new`] creates an empty pool, [`TaskPool::initialize`]
/// brings up every worker, [`TaskPool::generate_batch`] and
/// [`TaskPool::generate`] may then be called any number of times, and
/// [`TaskPool::terminate`] releases all workers. A terminated pool rejects
/// every request until it is initialized again with a fresh set of workers.
pub struct TaskPool {
    sessions: Vec<Session>,
    next_worker: AtomicUsize,
    shutdown_token: CancellationToken,
}

impl Default for TaskPool {
    fn default() -> Self {
        Self::new()
    }
}

/// State shared by the pull loops of one batch.
struct Collected<F> {
    results: HashMap<String, Bytes>,
    completed: usize,
    on_progress: F,
}

impl TaskPool {
    /// Creates a pool with no workers.
    pub fn new() -> Self {
        Self {
            sessions: Vec::new(),
            next_worker: AtomicUsize::new(0),
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Tears down any current workers and starts `worker_count` new ones.
    ///
    /// All workers load concurrently. Succeeds only once every worker is
    /// ready; if any worker fails, every worker started by this call is
    /// terminated and the first failure is returned. `on_progress` may be
    /// called by any worker at any time while loading.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRequest`] if `worker_count` is zero.
    /// - [`Error::WorkerInit`] if any worker failed to load its model.
    pub async fn initialize<L, F>(
        &mut self,
        worker_count: usize,
        loader: L,
        config: ModelConfig,
        on_progress: F,
    ) -> Result<()>
    where
        L: Loader,
        F: Fn(LoadProgress) + Sync,
    {
        self.terminate();
        self.sessions.clear();

        if worker_count == 0 {
            return Err(Error::InvalidRequest {
                reason: "Worker count must be greater than 0".to_string(),
            });
        }

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Initializing generation pool with {} workers ({}, {}, {})",
            worker_count,
            config.model_id,
            config.dtype,
            config.device
        );

        let shutdown_token = CancellationToken::new();
        let loader = Arc::new(loader);
        let sessions: Vec<Session> = (0..worker_count)
            .map(|worker_id| {
                Session::spawn_with_token(
                    worker_id,
                    Arc::clone(&loader),
                    config.request_buffer_size,
                    shutdown_token.child_token(),
                )
            })
            .collect();

        let on_progress = &on_progress;
        let startup = sessions
            .iter()
            .map(|session| session.initialize(config.clone(), on_progress));

        if let Err(e) = try_join_all(startup).await {
            #[cfg(feature = "tracing")]
            tracing::warn!("Generation pool failed to start: {}", e);
            shutdown_token.cancel();
            sessions.iter().for_each(Session::terminate);
            return Err(e);
        }

        self.sessions = sessions;
        self.shutdown_token = shutdown_token;
        self.next_worker.store(0, Ordering::Relaxed);

        #[cfg(feature = "tracing")]
        tracing::info!("Generation pool ready");

        Ok(())
    }

    pub fn worker_count(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if the pool has workers and has not been terminated.
    pub fn is_ready(&self) -> bool {
        !self.sessions.is_empty() && !self.shutdown_token.is_cancelled()
    }

    pub fn worker_states(&self) -> Vec<WorkerState> {
        self.sessions.iter().map(Session::state).collect()
    }

    /// Generates every unit of `units` across the pool.
    ///
    /// `on_progress` is called once per completed unit with the number of
    /// units completed so far: `1, 2, ..., units.len()`. Results are keyed by
    /// unit text, so repeated texts collapse into one entry holding whichever
    /// completion finished last.
    ///
    /// # Errors
    ///
    /// - [`Error::NotInitialized`] if the pool has no workers or is terminated
    ///   before or during the batch.
    /// - The first [`Error::Generation`] raised by any unit. Results gathered
    ///   so far are discarded.
    pub async fn generate_batch<F>(
        &self,
        units: &[String],
        voice: &str,
        on_progress: F,
    ) -> Result<HashMap<String, Bytes>>
    where
        F: FnMut(usize) + Send,
    {
        self.ensure_ready()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Dispatching {} units across {} workers",
            units.len(),
            self.sessions.len()
        );

        let cursor = AtomicUsize::new(0);
        let collected = Mutex::new(Collected {
            results: HashMap::with_capacity(units.len()),
            completed: 0,
            on_progress,
        });

        let loops = self
            .sessions
            .iter()
            .map(|session| self.pull_loop(session, units, voice, &cursor, &collected));
        try_join_all(loops).await?;

        Ok(collected.into_inner().results)
    }

    async fn pull_loop<F>(
        &self,
        session: &Session,
        units: &[String],
        voice: &str,
        cursor: &AtomicUsize,
        collected: &Mutex<Collected<F>>,
    ) -> Result<()>
    where
        F: FnMut(usize),
    {
        loop {
            if self.shutdown_token.is_cancelled() {
                return Err(Error::NotInitialized);
            }

            let index = cursor.fetch_add(1, Ordering::AcqRel);
            let Some(text) = units.get(index) else {
                return Ok(());
            };

            let payload = session.generate(text, voice).await?;

            // Insertion, counting and reporting happen under one lock so the
            // reported counts are strictly increasing by one.
            let mut guard = collected.lock();
            let state = &mut *guard;
            state.results.insert(text.clone(), payload);
            state.completed += 1;
            (state.on_progress)(state.completed);
        }
    }

    /// Generates one unit on the next worker in round-robin order.
    ///
    /// # Errors
    ///
    /// See [`Session::generate`].
    pub async fn generate(&self, text: &str, voice: &str) -> Result<Bytes> {
        self.ensure_ready()?;
        let index = self.next_worker.fetch_add(1, Ordering::Relaxed) % self.sessions.len();
        self.sessions[index].generate(text, voice).await
    }

    /// Stops every worker and fails all outstanding requests.
    ///
    /// Synchronous and idempotent. Terminating an empty pool is a no-op.
    pub fn terminate(&self) {
        if self.shutdown_token.is_cancelled() && self.sessions.is_empty() {
            return;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Terminating {} workers", self.sessions.len());

        self.shutdown_token.cancel();
        self.sessions.iter().for_each(Session::terminate);
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        self.terminate();
    }
}
