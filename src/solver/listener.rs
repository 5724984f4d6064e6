use std::time::Duration;

use crate::models::primitives::IntType;
use crate::solver::solution::Solution;

/// Callbacks the driver fires around a run: once at the very start, every
/// time a new best solution is found, and once at the very end. Kept as a
/// trait (rather than a fixed struct of channels) so alternative front ends
/// — the CLI, the WASM binding, a benchmark harness — can each observe a run
/// without the driver knowing about any of them.
pub trait Listener {
    fn on_start(&mut self) {}
    fn on_updated(&mut self, _elapsed: Duration, _solution: &Solution, _objective: IntType) {}
    fn on_end(&mut self, _elapsed: Duration, _solution: &Solution, _objective: IntType) {}
}

/// Logs progress through the `log` facade, the way the rest of the crate
/// reports on itself.
#[derive(Default)]
pub struct LoggingListener;

impl Listener for LoggingListener {
    fn on_start(&mut self) {
        log::info!("solver started");
    }

    fn on_updated(&mut self, elapsed: Duration, _solution: &Solution, objective: IntType) {
        log::info!("time: {:?}, new best objective: {}", elapsed, objective);
    }

    fn on_end(&mut self, elapsed: Duration, _solution: &Solution, objective: IntType) {
        log::info!("time: {:?}, finished, best objective: {}", elapsed, objective);
    }
}
