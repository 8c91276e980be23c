//! Benchmarks for the per-frame CPU work: tick and upload.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flurry::{EmitterConfig, HostBuffers, ParticleSystem};

const FRAME: f32 = 1.0 / 60.0;

/// A system whose store is close to its steady-state occupancy.
fn warmed_system(capacity: usize) -> ParticleSystem {
    let config = EmitterConfig::new()
        .with_max_particles(capacity)
        .with_spawn_rate(capacity as f32 / 5.0);
    let mut system = ParticleSystem::with_seed(config, 0xF1u64).unwrap();
    for _ in 0..120 {
        system.tick(FRAME);
    }
    system
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    group.sample_size(20);

    for capacity in [10_000, 100_000, 1_000_000] {
        group.throughput(Throughput::Elements(capacity as u64));
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, &capacity| {
            let mut system = warmed_system(capacity);
            b.iter(|| black_box(system.tick(FRAME)))
        });
    }

    group.finish();
}

fn bench_upload(c: &mut Criterion) {
    let mut group = c.benchmark_group("upload");

    for capacity in [10_000, 100_000, 1_000_000] {
        group.throughput(Throughput::Elements(capacity as u64));
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, &capacity| {
            let system = warmed_system(capacity);
            let mut buffers = HostBuffers::new(capacity);
            b.iter(|| {
                system.upload(&mut buffers);
                black_box(&buffers);
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tick, bench_upload);
criterion_main!(benches);
