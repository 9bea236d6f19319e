//! Command-line front end: configuration, the command-backed speech backend,
//! the batch reading loop and telemetry.
//!
//! ## Structure
//!
//! - [`config`] - CLI arguments and their validated form.
//! - [`command`] - [`lector_pool::Loader`] that runs an external program.
//! - [`driver`] - Selects, generates and writes batches.
//! - [`telemetry`] - Log subscriber, OpenTelemetry providers and metric helpers.

pub mod command;
pub mod config;
pub mod driver;
pub mod telemetry;
