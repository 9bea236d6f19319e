//! # `lector`: sentence addressing for long-form text-to-speech
//!
//! `lector` flattens a document made of paragraphs and sentences into a single
//! ordered sequence of [`Address`]es and selects contiguous windows
//! ([`Batch`]es) of that sequence for speech generation.
//!
//! The crate owns no runtime state. Everything here is a pure function over
//! caller-supplied data, so a batch computed for a given document snapshot is
//! always the same batch.
//!
//! ## Example
//!
//! ```
//! use lector::{Address, Document, WindowPolicy, flatten, select_batch};
//!
//! let doc = Document::from_text("One. Two. Three.\n\nFour. Five.");
//! let seq = flatten(&doc);
//! assert_eq!(seq.len(), 5);
//!
//! let batch = select_batch(Address::new(1, 0), &seq, 3, WindowPolicy::Centered, false);
//! assert_eq!(
//!     batch.as_slice(),
//!     &[Address::new(0, 2), Address::new(1, 0), Address::new(1, 1)]
//! );
//! assert_eq!(doc.batch_text(&batch), "Three. Four. Five.");
//! ```
//!
//! ## Modules
//!
//! - [`Address`] and [`AddressableSequence`] - the flattened address space.
//! - [`Document`] and [`split_sentences`] - the paragraph/sentence model.
//! - [`select_batch`], [`next_batch_start`], [`batch_text`] - windowing.
//! - [`Voice`], [`Dtype`], [`Device`] - voice and model metadata tables.

mod address;
mod document;
mod voice;
mod window;

pub use crate::address::*;
pub use crate::document::*;
pub use crate::voice::*;
pub use crate::window::*;
