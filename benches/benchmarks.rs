use count3s::{
    thread::{Lanes, Schedule},
    variant::Variant,
    workload::Sequence,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::num::NonZeroUsize;

pub fn criterion_benchmark(c: &mut Criterion) {
    let num_lanes = std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN);
    for schedule in [Schedule::Block, Schedule::Cyclic] {
        let lanes = Lanes::new(num_lanes, schedule).unwrap();
        for size_pow2 in [10, 16, 20, 24] {
            let size = 1usize << size_pow2;
            let sequence = Sequence::generate(size, 42, &lanes).unwrap();
            for variant in Variant::ALL {
                let mut group = c.benchmark_group(format!("{}/{schedule}", variant.name()));
                group.throughput(Throughput::Elements(size as u64));
                group.bench_with_input(BenchmarkId::from_parameter(size), &sequence, |b, sequence| {
                    b.iter(|| variant.count(sequence.as_slice(), pessimize::hide(3u8), &lanes));
                });
            }
        }

        // Private counters should stay within reach of the runtime reduction
        let size = 1usize << 24;
        let sequence = Sequence::generate(size, 42, &lanes).unwrap();
        let mut group = c.benchmark_group(format!("lock_free/{schedule}"));
        group.throughput(Throughput::Elements(size as u64));
        for variant in [Variant::Sequential, Variant::Reduction, Variant::PrivateCounters] {
            group.bench_function(variant.name(), |b| {
                b.iter(|| variant.count(sequence.as_slice(), pessimize::hide(3u8), &lanes));
            });
        }
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
