//! # `lector-pool`: concurrent speech generation workers
//!
//! `lector-pool` runs a fixed number of speech generation workers as Tokio
//! tasks and spreads batches of sentences across them.
//!
//! ## Highlights
//!
//! - **Message-passing workers**: each worker owns its model instance and
//!   talks to its owner only through request/response messages.
//! - **Request correlation**: every request carries a per-session id, so
//!   completions are always delivered to the caller that issued them.
//! - **Work stealing**: batch units are pulled from a shared atomic cursor;
//!   faster workers simply pull more often.
//! - **All-or-nothing startup**: a pool is usable only once every worker has
//!   loaded its model.
//! - **Coarse cancellation**: [`TaskPool::terminate`] stops every worker and
//!   fails every outstanding request.
//!
//! ## Example
//!
//! ```
//! use bytes::Bytes;
//! use lector_pool::{BoxError, Loader, ModelConfig, ProgressReporter, Synthesizer, TaskPool};
//!
//! struct Echo;
//!
//! impl Synthesizer for Echo {
//!     async fn synthesize(&mut self, text: &str, _voice: &str) -> Result<Bytes, BoxError> {
//!         Ok(Bytes::copy_from_slice(text.as_bytes()))
//!     }
//! }
//!
//! struct EchoLoader;
//!
//! impl Loader for EchoLoader {
//!     type Synthesizer = Echo;
//!
//!     async fn load(
//!         &self,
//!         _worker_id: usize,
//!         _config: &ModelConfig,
//!         progress: ProgressReporter,
//!     ) -> Result<Echo, BoxError> {
//!         progress.report(1, 1);
//!         Ok(Echo)
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> lector_pool::Result<()> {
//! let mut pool = TaskPool::new();
//! pool.initialize(2, EchoLoader, ModelConfig::default(), |_| {}).await?;
//!
//! let units = vec!["One.".to_string(), "Two.".to_string()];
//! let audio = pool.generate_batch(&units, "af_heart", |_done| {}).await?;
//! assert_eq!(audio["Two."], Bytes::from_static(b"Two."));
//!
//! pool.terminate();
//! # Ok(())
//! # }
//! ```

mod backend;
mod config;
mod error;
mod message;
mod pool;
mod session;
mod worker;


pub use crate::backend::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::pool::*;
pub use crate::session::*;
