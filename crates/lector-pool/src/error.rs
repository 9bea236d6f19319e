//! Error types for the generation pool.
//!
//! This module defines the central `Error` enum, which captures every failure
//! a caller of [`Session`](crate::Session) or [`TaskPool`](crate::TaskPool)
//! can observe. Errors are always delivered to the caller that issued the
//! request; nothing is retried.
//!
//! ## Error Cases
//! - `NotInitialized`: A request arrived before initialization completed, or
//!   after the pool was terminated.
//! - `WorkerInit`: A worker failed to load its model during initialization.
//! - `Generation`: The backend failed to generate one unit of text.
//! - `ChannelError`: An internal communication failure between the owner and a
//!   worker task.
//! - `InvalidRequest`: The request was malformed (e.g. zero workers).

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the generation pool.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// No ready worker is available: the pool or session was never
    /// initialized, or it has been terminated.
    #[error("Generation pool is not initialized")]
    NotInitialized,

    /// A worker reported an error while loading its model.
    #[error("Worker {worker_id} failed to initialize: {reason}")]
    WorkerInit { worker_id: usize, reason: String },

    /// The backend failed to generate audio for a unit of text.
    #[error("Generation failed: {reason}")]
    Generation { reason: String },

    /// Internal channel send/receive failure (e.g., closed channel).
    #[error("Channel error: {context}")]
    ChannelError { context: String },

    /// The request was invalid or exceeded constraints.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },
}
