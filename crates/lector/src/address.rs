use crate::Document;
use core::fmt;

/// Identifies one sentence within one paragraph.
///
/// Addresses order lexicographically by `(paragraph, sentence)`, which is
/// document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address {
    /// Zero-based paragraph index.
    pub paragraph: usize,
    /// Zero-based sentence index within the paragraph.
    pub sentence: usize,
}

impl Address {
    pub const fn new(paragraph: usize, sentence: usize) -> Self {
        Self {
            paragraph,
            sentence,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.paragraph, self.sentence)
    }
}

impl From<(usize, usize)> for Address {
    fn from((paragraph, sentence): (usize, usize)) -> Self {
        Self::new(paragraph, sentence)
    }
}

/// Every sentence address of a document, in document order.
///
/// The sequence is strictly increasing and contains no duplicates. It can only
/// be built from a paragraph structure, never from an arbitrary list, so that
/// invariant always holds and lookups can binary search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AddressableSequence {
    addresses: Vec<Address>,
}

impl AddressableSequence {
    /// Builds the sequence from per-paragraph sentence counts.
    ///
    /// Paragraphs with a count of zero contribute no addresses.
    pub fn from_sentence_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let counts = counts.into_iter();
        let mut addresses = Vec::with_capacity(counts.size_hint().0);
        for (paragraph, count) in counts.enumerate() {
            addresses.extend((0..count).map(|sentence| Address::new(paragraph, sentence)));
        }
        Self { addresses }
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Address> {
        self.addresses.get(index).copied()
    }

    pub fn first(&self) -> Option<Address> {
        self.addresses.first().copied()
    }

    pub fn last(&self) -> Option<Address> {
        self.addresses.last().copied()
    }

    /// Returns the position of `address` in the sequence, if present.
    pub fn index_of(&self, address: Address) -> Option<usize> {
        self.addresses.binary_search(&address).ok()
    }

    pub fn contains(&self, address: Address) -> bool {
        self.index_of(address).is_some()
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.addresses
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Address> + '_ {
        self.addresses.iter().copied()
    }
}

impl<'a> IntoIterator for &'a AddressableSequence {
    type Item = &'a Address;
    type IntoIter = core::slice::Iter<'a, Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.addresses.iter()
    }
}

/// Flattens a document into its [`AddressableSequence`].
///
/// Runs in time linear in the total sentence count.
pub fn flatten(document: &Document) -> AddressableSequence {
    AddressableSequence::from_sentence_counts(
        document.paragraphs().iter().map(|p| p.sentences().len()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Paragraph;

    #[test]
    fn flatten_is_paragraph_major() {
        let seq = AddressableSequence::from_sentence_counts([3, 2]);
        let expected = [(0, 0), (0, 1), (0, 2), (1, 0), (1, 1)].map(Address::from);
        assert_eq!(seq.as_slice(), &expected);
    }

    #[test]
    fn flatten_skips_empty_paragraphs() {
        let doc = Document::from_paragraphs(vec![
            Paragraph::new(Vec::<String>::new()),
            Paragraph::new(["a.", "b."]),
            Paragraph::new(Vec::<String>::new()),
            Paragraph::new(["c."]),
        ]);
        let seq = flatten(&doc);
        assert_eq!(
            seq.as_slice(),
            &[Address::new(1, 0), Address::new(1, 1), Address::new(3, 0)]
        );
    }

    #[test]
    fn flatten_length_matches_sentence_count_and_is_strictly_ordered() {
        let counts = [0, 7, 1, 0, 0, 12, 3, 9, 0, 4];
        let seq = AddressableSequence::from_sentence_counts(counts);
        assert_eq!(seq.len(), counts.iter().sum::<usize>());
        assert!(seq.as_slice().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn empty_document_has_empty_sequence() {
        let seq = flatten(&Document::default());
        assert!(seq.is_empty());
        assert_eq!(seq.first(), None);
        assert_eq!(seq.last(), None);
    }

    #[test]
    fn index_of_finds_present_and_rejects_absent() {
        let seq = AddressableSequence::from_sentence_counts([2, 0, 3]);
        assert_eq!(seq.index_of(Address::new(0, 0)), Some(0));
        assert_eq!(seq.index_of(Address::new(2, 2)), Some(4));
        assert_eq!(seq.index_of(Address::new(1, 0)), None);
        assert_eq!(seq.index_of(Address::new(0, 2)), None);
        assert!(!seq.contains(Address::new(9, 9)));
    }

    #[test]
    fn addresses_order_lexicographically() {
        assert!(Address::new(0, 9) < Address::new(1, 0));
        assert!(Address::new(1, 0) < Address::new(1, 1));
        assert_eq!(Address::new(2, 3).to_string(), "(2, 3)");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn address_serializes_as_struct() {
        let json = serde_json::to_string(&Address::new(1, 2)).unwrap();
        assert_eq!(json, r#"{"paragraph":1,"sentence":2}"#);
    }
}
