mod relocate;
pub use self::relocate::Relocate;

mod swap;
pub use self::swap::Swap;

mod cross;
pub use self::cross::Cross;

mod swap_star;
pub use self::swap_star::SwapStar;

mod sd_swap_one_one;
pub use self::sd_swap_one_one::SdSwapOneOne;

mod sd_swap_star;
pub use self::sd_swap_star::SdSwapStar;

mod sd_swap_two_one;
pub use self::sd_swap_two_one::SdSwapTwoOne;

use crate::solver::state::SearchState;

/// A local search move spanning two routes.
///
/// Every operator owns its own `InterRouteCache` matrix; the
/// `reset_cache`/`add_route`/`remove_route`/`move_route` methods let the
/// RVND driver broadcast route-churn events to all operators uniformly
/// through the registry without needing to know each operator's cached
/// move-record type.
pub trait InterOperator {
    fn name(&self) -> &'static str;

    /// Scans every ordered (or unordered, per-operator) pair of routes
    /// among `routes` for an improving move, applies the best one found,
    /// and returns the routes it touched so the caller can refresh their
    /// bookkeeping. Returns an empty vec if no improving move exists.
    fn apply(&mut self, state: &mut SearchState, routes: &[usize]) -> Vec<usize>;

    /// Rebuilds this operator's cache matrix for `num_routes` routes, all
    /// entries invalidated.
    fn reset_cache(&mut self, num_routes: usize);

    /// A route was appended at external index `route`; invalidate every
    /// pairing with it.
    fn add_route(&mut self, route: usize);

    /// The route at external index `route` no longer exists; free its
    /// cache slot.
    fn remove_route(&mut self, route: usize);

    /// The bookkeeping for `src` is now addressed as `dest` (route
    /// compaction after removals); no cached deltas are invalidated by a
    /// pure rename.
    fn move_route(&mut self, dest: usize, src: usize);
}

pub fn default_inter_operators() -> Vec<Box<dyn InterOperator>> {
    vec![
        Box::new(Relocate::default()),
        Box::new(Swap::new(1, 0)),
        Box::new(Swap::new(2, 0)),
        Box::new(Swap::new(1, 1)),
        Box::new(Swap::new(2, 1)),
        Box::new(Swap::new(2, 2)),
        Box::new(Cross::default()),
        Box::new(SwapStar::default()),
        Box::new(SdSwapOneOne::default()),
        Box::new(SdSwapTwoOne::default()),
        Box::new(SdSwapStar::default()),
    ]
}
