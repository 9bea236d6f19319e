//! Batch selection over an [`AddressableSequence`].
//!
//! A [`Batch`] is a contiguous run of addresses taken from a sequence
//! snapshot. Two policies decide where the run sits relative to the target:
//!
//! - [`WindowPolicy::Centered`] splits the extra slots around the target,
//!   favouring the following side when `size - 1` is odd.
//! - [`WindowPolicy::ForwardOnly`] starts the run at the target.
//!
//! Clamping at the document boundaries is independent at each end. A window
//! that hits the start of the document is not extended at its end to make up
//! the difference, so batches near either boundary may be shorter than the
//! configured size.

use crate::{Address, AddressableSequence, Document};

#[cfg(test)]
mod tests;

/// Placement of a batch relative to its target address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum WindowPolicy {
    #[default]
    Centered,
    ForwardOnly,
}

/// A contiguous, ordered run of addresses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Batch {
    addresses: Vec<Address>,
}

impl Batch {
    fn from_slice(addresses: &[Address]) -> Self {
        Self {
            addresses: addresses.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn first(&self) -> Option<Address> {
        self.addresses.first().copied()
    }

    pub fn last(&self) -> Option<Address> {
        self.addresses.last().copied()
    }

    pub fn contains(&self, address: Address) -> bool {
        self.addresses.contains(&address)
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.addresses
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Address> + '_ {
        self.addresses.iter().copied()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Address;
    type IntoIter = core::slice::Iter<'a, Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.addresses.iter()
    }
}

/// Selects the batch of at most `size` addresses around `target`.
///
/// If `target` is not part of `sequence` the result is a single-element batch
/// holding `target` itself. `force_forward` overrides a centered policy, which
/// callers use when auto-advancing into the next batch.
///
/// A `size` of zero is treated as one.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(sequence)))]
pub fn select_batch(
    target: Address,
    sequence: &AddressableSequence,
    size: usize,
    policy: WindowPolicy,
    force_forward: bool,
) -> Batch {
    let Some(index) = sequence.index_of(target) else {
        #[cfg(feature = "tracing")]
        tracing::trace!("Address {target} not in sequence, using single-address batch");
        return Batch {
            addresses: vec![target],
        };
    };

    let size = size.max(1);
    let addresses = sequence.as_slice();

    let range = if force_forward || policy == WindowPolicy::ForwardOnly {
        index..addresses.len().min(index.saturating_add(size))
    } else {
        let before = (size - 1) / 2;
        let after = size - 1 - before;
        let start = index.saturating_sub(before);
        let end = (addresses.len() - 1).min(index.saturating_add(after));
        start..end + 1
    };

    Batch::from_slice(&addresses[range])
}

/// Returns the address following the last element of `batch`.
///
/// Returns `None` when `batch` is empty or ends on the final address of
/// `sequence`. A batch whose last address is not part of `sequence` continues
/// from the start of the sequence.
pub fn next_batch_start(batch: &Batch, sequence: &AddressableSequence) -> Option<Address> {
    let last = batch.last()?;
    let next = sequence.index_of(last).map_or(0, |i| i + 1);
    sequence.get(next)
}

/// Joins the sentence text of every address in `batch` with single spaces.
///
/// Addresses that do not resolve in `document` contribute an empty string.
pub fn batch_text(batch: &Batch, document: &Document) -> String {
    batch
        .iter()
        .map(|a| document.sentence(a).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(" ")
}
