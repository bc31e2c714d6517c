use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use rand::{SeedableRng, rngs::StdRng};
use vsearch_experiment::{ExperimentConfig, SearchDesign};

fn design(max_per_quadrant: Option<usize>) -> SearchDesign {
    SearchDesign::new(ExperimentConfig {
        trials_per_block: 100,
        max_per_quadrant,
        ..ExperimentConfig::default()
    })
    .expect("valid design")
}

pub fn bench_build_block(c: &mut Criterion) {
    let mut g = c.benchmark_group("build_block");
    g.sample_size(40);

    for (name, cap) in [("uncapped", None), ("capped_5", Some(5))] {
        let design = design(cap);
        g.bench_function(name, |b| {
            b.iter_batched(
                || StdRng::seed_from_u64(42),
                |mut rng| black_box(design.assembler().build_block(&mut rng)),
                BatchSize::SmallInput,
            )
        });
    }

    g.finish();
}

pub fn bench_largest_trial(c: &mut Criterion) {
    let design = design(None);
    let mut rng = StdRng::seed_from_u64(7);
    c.bench_function("build_trial_18", |b| {
        b.iter(|| black_box(design.builder().build_trial(18, &mut rng)))
    });
}

criterion_group!(benches, bench_build_block, bench_largest_trial);
criterion_main!(benches);
