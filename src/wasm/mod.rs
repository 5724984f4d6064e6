use wasm_bindgen::prelude::*;

use crate::config::Config;
use crate::models::matrix::Matrix;
use crate::models::primitives::{IntType, NodeId};
use crate::models::problem::Problem;
use crate::solver::driver::solve;
use crate::solver::listener::Listener;
use crate::utils::Random;

struct NullListener;
impl Listener for NullListener {}

/// Collects the node coordinates and demands one `add_node` call at a time
/// (index 0 is implicitly the depot), then runs the driver to completion
/// and hands back the solution as JSON.
#[wasm_bindgen]
pub struct Solver {
    config: Config,
    capacity: IntType,
    demands: Vec<IntType>,
    xs: Vec<f64>,
    ys: Vec<f64>,
}

#[wasm_bindgen]
impl Solver {
    pub fn new() -> Self {
        console_error_panic_hook::set_once();
        Self {
            config: Config::default(),
            capacity: 0,
            demands: vec![0],
            xs: vec![0.0],
            ys: vec![0.0],
        }
    }

    pub fn clear(&mut self) {
        self.demands = vec![0];
        self.xs = vec![0.0];
        self.ys = vec![0.0];
    }

    pub fn add_node(&mut self, demand: i32, x: f64, y: f64) {
        self.demands.push(demand as IntType);
        self.xs.push(x);
        self.ys.push(y);
    }

    pub fn set_capacity(&mut self, capacity: i32) {
        self.capacity = capacity as IntType;
    }

    pub fn update_time_limit(&mut self, value: i32) {
        self.config.time_limit = value as u64;
    }

    pub fn update_seed(&mut self, value: u32) {
        self.config.deterministic = true;
        self.config.seed = value as u64;
    }

    pub fn update_blink_rate(&mut self, value: f64) {
        self.config.blink_rate = value;
    }

    /// Builds the problem from the accumulated nodes, runs the driver to
    /// completion (bounded by the configured time limit) and returns the
    /// solution as the same JSON array-of-routes format the CLI writes.
    pub fn solve(&self) -> String {
        let num_customers = self.demands.len();
        let mut distance_matrix = Matrix::<IntType>::new(num_customers, num_customers);
        for i in 0..num_customers {
            for j in 0..num_customers {
                let dx = self.xs[i] - self.xs[j];
                let dy = self.ys[i] - self.ys[j];
                distance_matrix.set(i, j, dx.hypot(dy).round() as IntType);
            }
        }
        let problem = Problem::new(num_customers as NodeId, self.capacity, self.demands.clone(), distance_matrix);

        let random = if self.config.deterministic {
            Random::from_seed(self.config.seed)
        } else {
            Random::new()
        };
        let mut listener = NullListener;
        let (solution, _objective) = solve(&problem, &self.config, &random, &mut listener);
        solution.to_json()
    }
}
