use super::*;
use crate::Paragraph;

fn seq(counts: &[usize]) -> AddressableSequence {
    AddressableSequence::from_sentence_counts(counts.iter().copied())
}

fn addrs(pairs: &[(usize, usize)]) -> Vec<Address> {
    pairs.iter().copied().map(Address::from).collect()
}

#[test]
fn centered_batch_spans_paragraph_boundary() {
    let seq = seq(&[3, 2]);
    let batch = select_batch(Address::new(1, 0), &seq, 3, WindowPolicy::Centered, false);
    assert_eq!(batch.as_slice(), addrs(&[(0, 2), (1, 0), (1, 1)]).as_slice());
}

#[test]
fn centered_even_size_favours_following_side() {
    let seq = seq(&[10]);
    let batch = select_batch(Address::new(0, 5), &seq, 4, WindowPolicy::Centered, false);
    assert_eq!(
        batch.as_slice(),
        addrs(&[(0, 4), (0, 5), (0, 6), (0, 7)]).as_slice()
    );
}

#[test]
fn centered_clamps_each_end_independently() {
    let seq = seq(&[10]);

    let head = select_batch(Address::new(0, 0), &seq, 5, WindowPolicy::Centered, false);
    assert_eq!(head.as_slice(), addrs(&[(0, 0), (0, 1), (0, 2)]).as_slice());

    let tail = select_batch(Address::new(0, 9), &seq, 5, WindowPolicy::Centered, false);
    assert_eq!(tail.as_slice(), addrs(&[(0, 7), (0, 8), (0, 9)]).as_slice());
}

#[test]
fn centered_contains_target_and_is_bounded() {
    let seq = seq(&[4, 0, 7, 1, 5]);
    for size in 1..=9 {
        let before = (size - 1) / 2;
        let after = size - 1 - before;
        for (i, target) in seq.iter().enumerate() {
            let batch = select_batch(target, &seq, size, WindowPolicy::Centered, false);
            assert!(batch.contains(target));
            assert!(batch.len() <= size);
            if i >= before && i + after < seq.len() {
                assert_eq!(batch.len(), size.min(seq.len()));
            }
        }
    }
}

#[test]
fn forward_only_starts_at_target() {
    let seq = seq(&[3, 3]);
    for target in seq.iter() {
        let batch = select_batch(target, &seq, 4, WindowPolicy::ForwardOnly, false);
        assert_eq!(batch.first(), Some(target));
        assert!(batch.iter().all(|a| a >= target));
    }
}

#[test]
fn forward_only_truncates_at_end() {
    let seq = seq(&[3, 2]);
    let batch = select_batch(Address::new(1, 0), &seq, 5, WindowPolicy::ForwardOnly, false);
    assert_eq!(batch.as_slice(), addrs(&[(1, 0), (1, 1)]).as_slice());
}

#[test]
fn force_forward_overrides_centered() {
    let seq = seq(&[6]);
    let batch = select_batch(Address::new(0, 3), &seq, 3, WindowPolicy::Centered, true);
    assert_eq!(batch.as_slice(), addrs(&[(0, 3), (0, 4), (0, 5)]).as_slice());
}

#[test]
fn batches_are_contiguous_slices_of_the_sequence() {
    let seq = seq(&[2, 5, 0, 3]);
    for policy in [WindowPolicy::Centered, WindowPolicy::ForwardOnly] {
        for target in seq.iter() {
            let batch = select_batch(target, &seq, 4, policy, false);
            let start = seq.index_of(batch.first().unwrap()).unwrap();
            assert_eq!(
                batch.as_slice(),
                &seq.as_slice()[start..start + batch.len()]
            );
        }
    }
}

#[test]
fn absent_target_falls_back_to_single_address() {
    let seq = seq(&[2]);
    let stray = Address::new(7, 3);
    for policy in [WindowPolicy::Centered, WindowPolicy::ForwardOnly] {
        let batch = select_batch(stray, &seq, 5, policy, false);
        assert_eq!(batch.as_slice(), &[stray]);
    }
    let empty = AddressableSequence::default();
    let batch = select_batch(Address::new(0, 0), &empty, 3, WindowPolicy::Centered, false);
    assert_eq!(batch.as_slice(), &[Address::new(0, 0)]);
}

#[test]
fn zero_size_is_treated_as_one() {
    let seq = seq(&[3]);
    let batch = select_batch(Address::new(0, 1), &seq, 0, WindowPolicy::Centered, false);
    assert_eq!(batch.as_slice(), &[Address::new(0, 1)]);
}

#[test]
fn next_batch_start_follows_last_address() {
    let seq = seq(&[3, 2]);
    let batch = select_batch(Address::new(0, 0), &seq, 3, WindowPolicy::ForwardOnly, false);
    assert_eq!(next_batch_start(&batch, &seq), Some(Address::new(1, 0)));
}

#[test]
fn next_batch_start_is_none_at_end_or_for_empty_batch() {
    let seq = seq(&[3, 2]);
    let batch = select_batch(Address::new(1, 0), &seq, 3, WindowPolicy::ForwardOnly, false);
    assert_eq!(next_batch_start(&batch, &seq), None);
    assert_eq!(next_batch_start(&Batch::default(), &seq), None);
}

#[test]
fn next_batch_start_matches_index_successor() {
    let seq = seq(&[1, 4, 2]);
    for (i, target) in seq.iter().enumerate() {
        let batch = select_batch(target, &seq, 1, WindowPolicy::ForwardOnly, false);
        let next = next_batch_start(&batch, &seq);
        if i + 1 == seq.len() {
            assert_eq!(next, None);
        } else {
            assert_eq!(next, seq.get(i + 1));
        }
    }
}

#[test]
fn next_batch_start_for_stale_batch_restarts_sequence() {
    let seq = seq(&[2]);
    let stale = select_batch(Address::new(4, 4), &seq, 3, WindowPolicy::Centered, false);
    assert_eq!(next_batch_start(&stale, &seq), Some(Address::new(0, 0)));
    assert_eq!(
        next_batch_start(&stale, &AddressableSequence::default()),
        None
    );
}

#[test]
fn auto_advance_covers_document_exactly_once() {
    let seq = seq(&[3, 0, 4, 1]);
    let mut visited = Vec::new();
    let mut cursor = seq.first();
    while let Some(start) = cursor {
        let batch = select_batch(start, &seq, 3, WindowPolicy::Centered, true);
        visited.extend(batch.iter());
        cursor = next_batch_start(&batch, &seq);
    }
    assert_eq!(visited.as_slice(), seq.as_slice());
}

#[test]
fn batch_text_joins_with_single_space() {
    let doc = Document::from_paragraphs(vec![
        Paragraph::new(["One.", "Two."]),
        Paragraph::new(["Three."]),
    ]);
    let seq = flatten_doc(&doc);
    let batch = select_batch(Address::new(0, 1), &seq, 3, WindowPolicy::Centered, false);
    assert_eq!(batch_text(&batch, &doc), "One. Two. Three.");
    assert_eq!(doc.batch_text(&batch), "One. Two. Three.");
}

#[test]
fn batch_text_resolves_missing_addresses_to_empty() {
    let doc = Document::from_paragraphs(vec![Paragraph::new(["Only."])]);
    let stray = select_batch(Address::new(3, 0), &seq(&[1]), 2, WindowPolicy::Centered, false);
    assert_eq!(batch_text(&stray, &doc), "");

    let other = Document::from_paragraphs(vec![Paragraph::new(["A.", "B.", "C."])]);
    let batch = select_batch(Address::new(0, 1), &flatten_doc(&other), 3, WindowPolicy::Centered, false);
    assert_eq!(batch_text(&batch, &doc), "Only.  ");
    assert_eq!(doc.batch_sentences(&batch), vec!["Only.", "", ""]);
}

fn flatten_doc(doc: &Document) -> AddressableSequence {
    crate::flatten(doc)
}
