use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use vicsek_common::{Domain, Obstacle};
use vicsek_engine::{initialize, step, BruteForceNeighbors, NeighborQuery, NoiseSource, UniformGrid};

fn bench_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("vicsek_step");
    for &particles in &[400_usize, 1600, 6400] {
        // Keep unit density as the box grows.
        let box_size = (particles as f64).sqrt();
        let third = box_size / 3.0;
        let domain = Domain::new(
            box_size,
            particles,
            1.0,
            0.5,
            1.0,
            0.15,
            Obstacle::new(third, 2.0 * third, third, 2.0 * third),
        )
        .expect("valid bench domain");
        let initial = initialize(&domain, 0xBEEF).expect("placement");
        let noise = NoiseSource::new(0xBEEF);

        let searches: Vec<(&str, Box<dyn Fn() -> Box<dyn NeighborQuery>>)> = vec![
            ("brute_force", Box::new(|| Box::new(BruteForceNeighbors::new(1.0)) as Box<dyn NeighborQuery>)),
            ("grid", Box::new(move || Box::new(UniformGrid::new(box_size, 1.0)) as Box<dyn NeighborQuery>)),
        ];
        for (name, make_query) in &searches {
            group.bench_function(format!("{}_{}", name, particles), |b| {
                b.iter_batched(
                    || (initial.clone(), make_query()),
                    |(state, mut query)| step(&domain, &state, query.as_mut(), &noise),
                    BatchSize::SmallInput,
                )
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_steps);
criterion_main!(benches);
