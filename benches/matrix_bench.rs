use criterion::{Criterion, criterion_group, criterion_main};
use reach_matrix::core::config::MatrixSettings;
use reach_matrix::core::planner::plan_execution;
use reach_matrix::core::profile::ProfileBlock;
use reach_matrix::core::resolver::resolve;
use reach_matrix::generate_matrix;
use std::hint::black_box;

fn bench_generate_and_resolve(c: &mut Criterion) {
    c.bench_function("generate_and_resolve", |b| {
        b.iter(|| {
            for config in generate_matrix() {
                black_box(resolve(black_box(&config)));
            }
        });
    });
}

fn bench_render_profiles(c: &mut Criterion) {
    let settings = MatrixSettings::default();
    let matrix = generate_matrix();

    c.bench_function("render_profiles", |b| {
        b.iter(|| {
            for config in &matrix {
                let block = ProfileBlock::for_configuration(config, &settings).unwrap();
                black_box(block.render().unwrap());
            }
        });
    });
}

fn bench_plan_sharded(c: &mut Criterion) {
    c.bench_function("plan_sharded", |b| {
        b.iter(|| {
            for index in 0..4 {
                black_box(plan_execution(generate_matrix(), &[], Some(4), Some(index)).unwrap());
            }
        });
    });
}

criterion_group!(
    benches,
    bench_generate_and_resolve,
    bench_render_profiles,
    bench_plan_sharded
);
criterion_main!(benches);
