use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use lector::{
    Address, AddressableSequence, WindowPolicy, next_batch_start, select_batch,
};

// Paragraph shape of a long book: 4096 paragraphs of 1..=16 sentences.
const PARAGRAPHS: usize = 4096;

fn sentence_counts() -> impl Iterator<Item = usize> {
    (0..PARAGRAPHS).map(|p| p % 16 + 1)
}

fn bench_flatten(c: &mut Criterion) {
    let total: usize = sentence_counts().sum();
    let mut group = c.benchmark_group("flatten");
    group.throughput(Throughput::Elements(total as u64));
    group.bench_function(format!("sentences/{total}"), |b| {
        b.iter(|| black_box(AddressableSequence::from_sentence_counts(sentence_counts())));
    });
    group.finish();
}

fn bench_select(c: &mut Criterion) {
    let seq = AddressableSequence::from_sentence_counts(sentence_counts());
    let middle = seq.get(seq.len() / 2).unwrap_or_default();

    let mut group = c.benchmark_group("select_batch");
    for size in [1, 5, 25] {
        for policy in [WindowPolicy::Centered, WindowPolicy::ForwardOnly] {
            group.bench_function(format!("{policy:?}/size/{size}"), |b| {
                b.iter(|| black_box(select_batch(black_box(middle), &seq, size, policy, false)));
            });
        }
    }
    group.bench_function("miss", |b| {
        let stray = Address::new(PARAGRAPHS + 1, 0);
        b.iter(|| black_box(select_batch(black_box(stray), &seq, 5, WindowPolicy::Centered, false)));
    });
    group.finish();
}

fn bench_advance(c: &mut Criterion) {
    let seq = AddressableSequence::from_sentence_counts(sentence_counts());
    let mut group = c.benchmark_group("auto_advance");
    group.throughput(Throughput::Elements(seq.len() as u64));
    group.bench_function("full_document/size/5", |b| {
        b.iter(|| {
            let mut cursor = seq.first();
            let mut batches = 0_usize;
            while let Some(start) = cursor {
                let batch = select_batch(start, &seq, 5, WindowPolicy::ForwardOnly, true);
                cursor = next_batch_start(&batch, &seq);
                batches += 1;
            }
            black_box(batches)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_flatten, bench_select, bench_advance);
criterion_main!(benches);
