use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lazylinq::*;

fn bench_streaming_operators(c: &mut Criterion) {
    let mut group = c.benchmark_group("streaming_operators");

    for size in [1_000, 10_000, 100_000].iter() {
        group.bench_with_input(BenchmarkId::new("filter_select", size), size, |b, &size| {
            let query = from_iter(0..size)
                .select(|x: i32| black_box(x * 2))
                .filter(|x| black_box(x % 4 == 0));
            b.iter(|| black_box(query.count().unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("distinct", size), size, |b, &size| {
            let query = from_iter(0..size).select(|x: i32| x % 1_000).distinct();
            b.iter(|| black_box(query.count().unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("take_while", size), size, |b, &size| {
            let half = size / 2;
            let query = from_iter(0..size).take_while(move |x| *x < half);
            b.iter(|| black_box(query.count().unwrap()));
        });
    }

    group.finish();
}

fn bench_buffering_operators(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffering_operators");

    for size in [1_000, 10_000, 100_000].iter() {
        let data: Vec<(u32, u32)> = (0..*size).map(|i| (i * 7919 % 97, i)).collect();

        group.bench_with_input(BenchmarkId::new("order_by_then_by", size), &data, |b, data| {
            let query = from_vec(data.clone())
                .order_by(|p| p.0)
                .then_by_descending(|p| p.1);
            b.iter(|| black_box(query.to_vec().unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("group_by", size), &data, |b, data| {
            let query = from_vec(data.clone()).group_by(|p| p.0, |p| p.1);
            b.iter(|| black_box(query.count().unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("join", size), &data, |b, data| {
            let keys = from_iter(0..97u32);
            let query = keys.join(from_vec(data.clone()), |k| *k, |p| p.0, |k, p| k + p.1);
            b.iter(|| black_box(query.count().unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_streaming_operators, bench_buffering_operators);
criterion_main!(benches);
