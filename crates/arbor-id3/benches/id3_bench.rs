//! Criterion benchmarks for arbor-id3: ID3 induction and evaluation.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use arbor_id3::{Dataset, Id3Config, Value};

fn make_categorical(n_rows: usize, n_features: usize, cardinality: i64, seed: u64) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut columns: Vec<String> = (0..n_features).map(|f| format!("f{f}")).collect();
    columns.push("label".to_string());
    let rows = (0..n_rows)
        .map(|_| {
            let mut row: Vec<Value> = (0..n_features)
                .map(|_| Value::Bucket(rng.gen_range(0..cardinality)))
                .collect();
            let class = match (&row[0], &row[1]) {
                (Value::Bucket(a), Value::Bucket(b)) => (a * 2 + b) % 4,
                _ => 0,
            };
            row.push(Value::Bucket(class));
            row
        })
        .collect();
    Dataset::new(columns, rows).unwrap()
}

fn bench_id3_fit(c: &mut Criterion) {
    let ds = make_categorical(2_000, 12, 5, 42);
    let cfg = Id3Config::new();

    c.bench_function("id3_fit_2000x12_card5", |b| {
        b.iter(|| cfg.fit(&ds).unwrap());
    });
}

fn bench_id3_evaluate(c: &mut Criterion) {
    let train = make_categorical(2_000, 12, 5, 42);
    let test = make_categorical(1_000, 12, 5, 43);
    let tree = Id3Config::new().fit(&train).unwrap();

    c.bench_function("id3_evaluate_1000x12", |b| {
        b.iter(|| tree.evaluate(&test));
    });
}

criterion_group!(benches, bench_id3_fit, bench_id3_evaluate);
criterion_main!(benches);
