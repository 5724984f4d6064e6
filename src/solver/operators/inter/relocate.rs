use crate::models::primitives::{IntType, NodeId, DEPOT};
use crate::solver::cache::inter_route::InterRouteCache;
use crate::solver::operators::inter::InterOperator;
use crate::solver::route_head_guard::RouteHeadGuard;
use crate::solver::state::{calc_delta, SearchState};

#[derive(Debug, Clone, Default)]
pub struct RelocateMove {
    node_x: NodeId,
    predecessor_y: NodeId,
    successor_y: NodeId,
}

/// Moves a single customer from one route to the cheapest slot in another
/// route, using that route's star cache instead of rescanning it.
#[derive(Default)]
pub struct Relocate {
    cache: InterRouteCache<RelocateMove>,
}

impl Relocate {
    fn best_between(
        state: &mut SearchState,
        route_x: usize,
        route_y: usize,
    ) -> Option<(IntType, RelocateMove)> {
        state.star_caches.preprocess(state.problem, state.random, state.solution, state.context, route_y);

        let mut best: Option<(IntType, RelocateMove)> = None;
        let head = state.context.head(route_x);
        if head == DEPOT {
            return None;
        }
        let mut node_x = head;
        loop {
            let demand = state.solution.load(node_x);
            if state.context.load(route_y) + demand <= state.problem.capacity {
                let removal = calc_delta(state.problem, state.solution, node_x);
                let customer = state.solution.customer(node_x);
                let insertion = state.star_caches.get(route_y, customer).find_best();
                let delta = insertion.delta.value - removal;
                if best.as_ref().map_or(true, |(d, _)| delta < *d) {
                    best = Some((
                        delta,
                        RelocateMove {
                            node_x,
                            predecessor_y: insertion.predecessor,
                            successor_y: insertion.successor,
                        },
                    ));
                }
            }
            let next = state.solution.successor(node_x);
            if next == DEPOT {
                break;
            }
            node_x = next;
        }
        best
    }

    fn apply_move(state: &mut SearchState, route_x: usize, route_y: usize, mv: &RelocateMove) {
        // The two guards share the single `successor(DEPOT)` scratch slot, so
        // they must never be open at the same time: each route's relink is
        // bracketed by its own open/close pair before the other route's
        // guard touches the slot.
        let guard_x = RouteHeadGuard::open(state.solution, state.context, route_x);
        let predecessor_x = state.solution.predecessor(mv.node_x);
        let successor_x = state.solution.successor(mv.node_x);
        state.solution.link(predecessor_x, successor_x);
        guard_x.close(state.solution, state.context);
        state.context.update_route_context(state.solution, route_x, DEPOT);

        let guard_y = RouteHeadGuard::open(state.solution, state.context, route_y);
        state.solution.link(mv.predecessor_y, mv.node_x);
        state.solution.link(mv.node_x, mv.successor_y);
        guard_y.close(state.solution, state.context);
        state.context.update_route_context(state.solution, route_y, DEPOT);
    }
}

impl InterOperator for Relocate {
    fn name(&self) -> &'static str {
        "relocate"
    }

    fn apply(&mut self, state: &mut SearchState, routes: &[usize]) -> Vec<usize> {
        let mut best: Option<(IntType, usize, usize, RelocateMove)> = None;
        for &route_x in routes {
            for &route_y in routes {
                if route_x == route_y {
                    continue;
                }
                let entry = self.cache.get(route_x, route_y);
                if entry.try_reuse() {
                    if entry.delta.value < 0 {
                        let mv = entry.data.clone();
                        if best.as_ref().map_or(true, |(d, ..)| entry.delta.value < *d) {
                            best = Some((entry.delta.value, route_x, route_y, mv));
                        }
                    }
                    continue;
                }
                if let Some((delta, mv)) = Self::best_between(state, route_x, route_y) {
                    let entry = self.cache.get(route_x, route_y);
                    entry.delta.value = delta;
                    entry.delta.counter = 1;
                    entry.data = mv.clone();
                    if delta < 0 && best.as_ref().map_or(true, |(d, ..)| delta < *d) {
                        best = Some((delta, route_x, route_y, mv));
                    }
                }
            }
        }

        if let Some((_, route_x, route_y, mv)) = best {
            Self::apply_move(state, route_x, route_y, &mv);
            vec![route_x, route_y]
        } else {
            Vec::new()
        }
    }

    fn reset_cache(&mut self, num_routes: usize) {
        self.cache.reset(num_routes);
    }

    fn add_route(&mut self, route: usize) {
        self.cache.add_route(route);
    }

    fn remove_route(&mut self, route: usize) {
        self.cache.remove_route(route);
    }

    fn move_route(&mut self, dest: usize, src: usize) {
        self.cache.move_route(dest, src);
    }
}
