use std::io;

use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkId, Criterion,
    Throughput,
};

use csvclean::{Cleaner, CleanerBuilder};

fn sample(rows: usize) -> Vec<u8> {
    let mut data = vec![];
    for i in 0..rows {
        data.extend_from_slice(
            format!("{},\"\",\"{} \"\"quoted\"\"\",plain\r\n", i, i).as_bytes(),
        );
    }
    data
}

fn bench_clean(c: &mut Criterion) {
    let data = sample(20_000);
    let mut group = c.benchmark_group("clean");
    group.throughput(Throughput::Bytes(data.len() as u64));
    for &cap in &[64, 8 * 1024, 64 * 1024] {
        let cleaner = CleanerBuilder::new().buffer_capacity(cap).build();
        group.bench_with_input(BenchmarkId::from_parameter(cap), &cap, |b, _| {
            b.iter(|| {
                let summary =
                    cleaner.clean(black_box(&data[..]), io::sink()).unwrap();
                assert_eq!(summary.records(), 20_000);
            })
        });
    }
    group.finish();
}

fn bench_clean_bytes(c: &mut Criterion) {
    let data = sample(20_000);
    let cleaner = Cleaner::new();
    let mut group = c.benchmark_group("clean_bytes");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("default", |b| {
        b.iter(|| cleaner.clean_bytes(black_box(&data)).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_clean, bench_clean_bytes);
criterion_main!(benches);
