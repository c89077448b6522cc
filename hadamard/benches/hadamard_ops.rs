use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hadamard::{build_matrix, pack_signed, CodeWord};
use std::hint::black_box;

fn build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_matrix");
    for order in [4, 8, 10, 12] {
        group.bench_with_input(BenchmarkId::from_parameter(order), &order, |b, &order| {
            b.iter(|| build_matrix(black_box(order)))
        });
    }
    group.finish();
}

fn extract(c: &mut Criterion) {
    let m = build_matrix(12);
    let mut group = c.benchmark_group("extract_code");
    for order in [3, 8, 12] {
        let index = (1 << order) - 1;
        group.bench_with_input(BenchmarkId::new("code_words", order), &order, |b, &order| {
            b.iter(|| {
                m.code_words(black_box(order), black_box(index))
                    .unwrap()
                    .collect::<CodeWord>()
            })
        });

        let row: Vec<i8> = m.signed_row(index).into_iter().take(1 << order).collect();
        group.bench_with_input(BenchmarkId::new("pack_signed", order), &row, |b, row| {
            b.iter(|| pack_signed(black_box(row).iter().copied()).collect::<CodeWord>())
        });
    }
    group.finish();
}

criterion_group!(benches, build, extract);
criterion_main!(benches);
