//! Paragraph and sentence model of a loaded document.
//!
//! A [`Document`] is the structure the addressing layer consumes: an ordered
//! list of [`Paragraph`]s, each an ordered list of sentence strings. How the
//! text was obtained (PDF extraction, plain text, OCR) is not this crate's
//! concern.

use crate::{Address, AddressableSequence, Batch};

/// An ordered list of sentences.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Paragraph {
    sentences: Vec<String>,
}

impl Paragraph {
    pub fn new<I, S>(sentences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sentences: sentences.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds a paragraph by segmenting `text` with [`split_sentences`].
    pub fn from_text(text: &str) -> Self {
        Self {
            sentences: split_sentences(text),
        }
    }

    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

/// An ordered list of paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    paragraphs: Vec<Paragraph>,
}

impl Document {
    pub fn from_paragraphs(paragraphs: Vec<Paragraph>) -> Self {
        Self { paragraphs }
    }

    /// Parses plain text into paragraphs separated by blank lines.
    ///
    /// Line breaks inside a paragraph are treated as spaces before sentence
    /// segmentation. Blocks that contain only whitespace are dropped.
    pub fn from_text(text: &str) -> Self {
        let mut paragraphs = Vec::new();
        let mut block = String::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                push_block(&mut paragraphs, &mut block);
                continue;
            }
            if !block.is_empty() {
                block.push(' ');
            }
            block.push_str(line);
        }
        push_block(&mut paragraphs, &mut block);

        Self { paragraphs }
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// Total number of sentences across all paragraphs.
    pub fn sentence_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.sentences.len()).sum()
    }

    /// Resolves an address to its sentence text.
    pub fn sentence(&self, address: Address) -> Option<&str> {
        self.paragraphs
            .get(address.paragraph)?
            .sentences
            .get(address.sentence)
            .map(String::as_str)
    }

    /// See [`crate::flatten`].
    pub fn addresses(&self) -> AddressableSequence {
        crate::flatten(self)
    }

    /// See [`crate::batch_text`].
    pub fn batch_text(&self, batch: &Batch) -> String {
        crate::batch_text(batch, self)
    }

    /// Resolves each address of `batch` to an owned sentence, in batch order.
    ///
    /// Addresses that do not resolve produce empty strings, mirroring
    /// [`crate::batch_text`].
    pub fn batch_sentences(&self, batch: &Batch) -> Vec<String> {
        batch
            .iter()
            .map(|a| self.sentence(a).unwrap_or_default().to_owned())
            .collect()
    }
}

fn push_block(paragraphs: &mut Vec<Paragraph>, block: &mut String) {
    if block.is_empty() {
        return;
    }
    let paragraph = Paragraph::from_text(block);
    block.clear();
    if !paragraph.is_empty() {
        paragraphs.push(paragraph);
    }
}

const fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Splits text into sentences.
///
/// A sentence runs up to and including a run of `.`, `!` or `?`. Pieces are
/// trimmed and empty pieces dropped. Trailing text without terminating
/// punctuation becomes the final sentence.
///
/// ```
/// assert_eq!(
///     lector::split_sentences("Wait... what?! Fine  "),
///     vec!["Wait...", "what?!", "Fine"]
/// );
/// ```
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !is_terminator(c) {
            continue;
        }
        while chars.next_if(|&(_, c)| is_terminator(c)).is_some() {}
        let end = chars.peek().map_or(text.len(), |&(i, _)| i);
        push_trimmed(&mut sentences, &text[start..end]);
        start = end;
    }
    push_trimmed(&mut sentences, &text[start..]);

    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        sentences.push(piece.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_on_terminators() {
        assert_eq!(
            split_sentences("Hi. There!  Ok? "),
            vec!["Hi.", "There!", "Ok?"]
        );
    }

    #[test]
    fn split_keeps_trailing_fragment() {
        assert_eq!(split_sentences("One. two"), vec!["One.", "two"]);
        assert_eq!(split_sentences("no punctuation"), vec!["no punctuation"]);
    }

    #[test]
    fn split_drops_whitespace_but_keeps_lone_punctuation() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n\t ").is_empty());
        assert_eq!(split_sentences("A. . B."), vec!["A.", ".", "B."]);
    }

    #[test]
    fn split_groups_punctuation_runs() {
        assert_eq!(split_sentences("Really?!? Yes..."), vec!["Really?!?", "Yes..."]);
    }

    #[test]
    fn split_handles_multibyte_text() {
        assert_eq!(
            split_sentences("Ça va? Très bien. Merci"),
            vec!["Ça va?", "Très bien.", "Merci"]
        );
    }

    #[test]
    fn from_text_splits_paragraphs_on_blank_lines() {
        let doc = Document::from_text("First one. Second\nline.\n\n\n  \nThird!\n");
        assert_eq!(doc.paragraphs().len(), 2);
        assert_eq!(doc.paragraphs()[0].sentences(), ["First one.", "Second line."]);
        assert_eq!(doc.paragraphs()[1].sentences(), ["Third!"]);
        assert_eq!(doc.sentence_count(), 3);
    }

    #[test]
    fn from_text_of_blank_input_is_empty() {
        assert_eq!(Document::from_text("\n \n\n"), Document::default());
    }

    #[test]
    fn sentence_lookup_out_of_range_is_none() {
        let doc = Document::from_text("A. B.\n\nC.");
        assert_eq!(doc.sentence(Address::new(0, 1)), Some("B."));
        assert_eq!(doc.sentence(Address::new(1, 0)), Some("C."));
        assert_eq!(doc.sentence(Address::new(1, 1)), None);
        assert_eq!(doc.sentence(Address::new(5, 0)), None);
    }
}
