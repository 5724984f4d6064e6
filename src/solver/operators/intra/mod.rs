mod exchange;
pub use self::exchange::Exchange;

mod or_opt;
pub use self::or_opt::OrOpt;

use crate::solver::state::SearchState;

/// A local search move confined to a single route.
pub trait IntraOperator {
    fn name(&self) -> &'static str;

    /// Attempts one improving move within `route`; applies it and returns
    /// true on success, leaving the route otherwise untouched on failure.
    fn apply(&self, state: &mut SearchState, route: usize) -> bool;
}

pub fn default_intra_operators() -> Vec<Box<dyn IntraOperator>> {
    vec![
        Box::new(Exchange),
        Box::new(OrOpt::new(1)),
        Box::new(OrOpt::new(2)),
        Box::new(OrOpt::new(3)),
    ]
}
