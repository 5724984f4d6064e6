use criterion::{black_box, criterion_group, criterion_main, Criterion};

use std::time::Duration;

use hybridcvrp::config::Config;
use hybridcvrp::models::matrix::Matrix;
use hybridcvrp::models::primitives::{IntType, NodeId};
use hybridcvrp::models::problem::Problem;
use hybridcvrp::solver::driver::solve;
use hybridcvrp::solver::listener::LoggingListener;
use hybridcvrp::utils::Random;

/// A small grid instance (depot plus `n` customers on a square grid, demand
/// 5 each, capacity 10) used as a fixed-size stand-in for a real instance
/// file so this benchmark has no dependency on an on-disk dataset.
fn grid_problem(n: usize) -> Problem {
    let side = (n as f64).sqrt().ceil().max(1.0) as usize;
    let coords: Vec<(f64, f64)> = (0..=n).map(|i| ((i % side) as f64, (i / side) as f64)).collect();
    let mut dm = Matrix::<IntType>::new(n + 1, n + 1);
    for i in 0..=n {
        for j in 0..=n {
            let (xi, yi) = coords[i];
            let (xj, yj) = coords[j];
            dm.set(i, j, ((xi - xj).powi(2) + (yi - yj).powi(2)).sqrt().round() as IntType);
        }
    }
    let mut demands = vec![0; n + 1];
    for demand in demands.iter_mut().skip(1) {
        *demand = 5;
    }
    Problem::new((n + 1) as NodeId, 10, demands, dm)
}

fn code(_lol: usize) {
    let problem = grid_problem(100);
    let mut config = Config::default();
    config.deterministic = true;
    config.seed = 1;
    config.time_limit = 1;

    let random = Random::from_seed(config.seed);
    let mut listener = LoggingListener::default();
    let _ = solve(&problem, &config, &random, &mut listener);
}

pub fn bench(c: &mut Criterion) {
    c.bench_function("Metaheuristic", |b| b.iter(|| code(black_box(0))));
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(50).measurement_time(Duration::from_secs(60));
    targets = bench
}
criterion_main!(benches);
