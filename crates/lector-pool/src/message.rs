//! Messages exchanged between a [`Session`](crate::Session) and its worker
//! task.
//!
//! The owner sends [`Command`]s over a bounded MPSC channel and the worker
//! answers with [`Event`]s over an unbounded one. Generation requests carry a
//! per-session request id that the matching [`Event::Generated`] echoes back.

use crate::ModelConfig;
use bytes::Bytes;

/// Reply text of a generate request that reached a worker before its model
/// finished loading.
pub(crate) const NOT_INITIALIZED: &str = "Not initialized";

/// A message sent from the owner to a worker.
#[derive(Debug)]
pub(crate) enum Command {
    /// Load the model described by `config`.
    Init { config: ModelConfig },

    /// Generate audio for `text` in `voice`; answered by
    /// [`Event::Generated`] with the same `id`.
    Generate {
        id: u64,
        text: String,
        voice: String,
    },
}

/// A message sent from a worker to its owner.
#[derive(Debug)]
pub(crate) enum Event {
    /// Model load progress, best effort.
    Progress { loaded: u64, total: u64 },

    /// The model loaded and the worker accepts generate requests.
    Ready,

    /// The model failed to load.
    Error { message: String },

    /// Outcome of the generate request tagged `id`.
    Generated {
        id: u64,
        result: Result<Bytes, String>,
    },
}
