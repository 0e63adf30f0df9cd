use criterion::{criterion_group, criterion_main, Criterion};
use nereval::{evaluate, evaluate_conf, EvaluatorConfigBuilder, Span};
use pprof::criterion::{Output, PProfProfiler};

const TAGS: [&str; 4] = ["PER", "LOC", "ORG", "MISC"];
const N_DOCUMENTS: usize = 20_000;

/// Builds a deterministic corpus. Every document holds a few entities and the predictions go
/// through every scenario: exact matches, shifted boundaries, wrong labels, missed and spurious
/// entities.
fn build_corpus() -> (Vec<Vec<Span>>, Vec<Vec<Span>>) {
    let mut y_true = Vec::with_capacity(N_DOCUMENTS);
    let mut y_pred = Vec::with_capacity(N_DOCUMENTS);
    for doc in 0..N_DOCUMENTS {
        let n_entities = 3 + doc % 5;
        let mut true_doc = Vec::with_capacity(n_entities);
        let mut pred_doc = Vec::with_capacity(n_entities + 1);
        for i in 0..n_entities {
            let start = i * 6 + doc % 3;
            let end = start + (doc + i) % 3;
            let label = TAGS[(doc + i) % TAGS.len()];
            let other_label = TAGS[(doc + i + 1) % TAGS.len()];
            true_doc.push(Span::new(start, end, label));
            match (doc * 7 + i) % 6 {
                0 | 1 => pred_doc.push(Span::new(start, end, label)),
                2 => pred_doc.push(Span::new(start, end, other_label)),
                3 => pred_doc.push(Span::new(start, end + 1, label)),
                4 => pred_doc.push(Span::new(start + 1, end + 2, other_label)),
                _ => (),
            }
        }
        if doc % 4 == 0 {
            pred_doc.push(Span::new(n_entities * 6 + 2, n_entities * 6 + 3, "PER"));
        }
        y_true.push(true_doc);
        y_pred.push(pred_doc);
    }
    (y_true, y_pred)
}

fn benchmark_sequential_evaluation(c: &mut Criterion) {
    let (y_true, y_pred) = build_corpus();
    c.bench_function("full_corpus_sequential", |b| {
        b.iter(|| evaluate(&y_true, &y_pred, &TAGS).unwrap())
    });
}

fn benchmark_parallel_evaluation(c: &mut Criterion) {
    let (y_true, y_pred) = build_corpus();
    let config = EvaluatorConfigBuilder::default().parallel(true).build();
    c.bench_function("full_corpus_parallel", |b| {
        b.iter(|| evaluate_conf(&y_true, &y_pred, &TAGS, config).unwrap())
    });
}

criterion_group!(
    name=evaluation_benches;
    config = Criterion::default().sample_size(50).with_profiler(PProfProfiler::new(3000, Output::Flamegraph(None)));
    targets =
    benchmark_sequential_evaluation,
    benchmark_parallel_evaluation,
);
criterion_main!(evaluation_benches);
