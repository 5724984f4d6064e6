use crate::models::primitives::{IntType, NodeId, DEPOT};
use crate::solver::cache::inter_route::InterRouteCache;
use crate::solver::operators::inter::InterOperator;
use crate::solver::route_head_guard::RouteHeadGuard;
use crate::solver::state::{calc_delta, SearchState};

#[derive(Debug, Clone, Copy, Default)]
pub struct SwapStarMove {
    node_x: NodeId,
    node_y: NodeId,
    predecessor_x: NodeId,
    successor_x: NodeId,
    predecessor_y: NodeId,
    successor_y: NodeId,
}

/// Exchanges two customers between routes, each re-entering not at the
/// other's vacated slot but at its own cheapest slot in the target route
/// (per the target route's star cache) if that is cheaper than the direct
/// swap.
#[derive(Default)]
pub struct SwapStar {
    cache: InterRouteCache<SwapStarMove>,
}

impl SwapStar {
    fn best_between(state: &mut SearchState, route_x: usize, route_y: usize) -> Option<(IntType, SwapStarMove)> {
        state.star_caches.preprocess(state.problem, state.random, state.solution, state.context, route_x);
        state.star_caches.preprocess(state.problem, state.random, state.solution, state.context, route_y);

        let problem = state.problem;
        let load_x = state.context.load(route_x);
        let load_y = state.context.load(route_y);

        let mut nodes_x = Vec::new();
        if let Some(head) = Some(state.context.head(route_x)).filter(|&h| h != DEPOT) {
            let mut node = head;
            loop {
                nodes_x.push(node);
                let next = state.solution.successor(node);
                if next == DEPOT {
                    break;
                }
                node = next;
            }
        }
        let mut nodes_y = Vec::new();
        if let Some(head) = Some(state.context.head(route_y)).filter(|&h| h != DEPOT) {
            let mut node = head;
            loop {
                nodes_y.push(node);
                let next = state.solution.successor(node);
                if next == DEPOT {
                    break;
                }
                node = next;
            }
        }

        let mut best: Option<(IntType, SwapStarMove)> = None;

        for &node_x in &nodes_x {
            let demand_x = state.solution.load(node_x);
            for &node_y in &nodes_y {
                let demand_y = state.solution.load(node_y);
                if load_y - demand_y + demand_x > problem.capacity {
                    continue;
                }
                if load_x - demand_x + demand_y > problem.capacity {
                    continue;
                }

                let removal_x = calc_delta(problem, state.solution, node_x);
                let removal_y = calc_delta(problem, state.solution, node_y);

                let predecessor_x = state.solution.predecessor(node_x);
                let successor_x = state.solution.successor(node_x);
                let predecessor_y = state.solution.predecessor(node_y);
                let successor_y = state.solution.successor(node_y);

                let customer_x = state.solution.customer(node_x);
                let customer_y = state.solution.customer(node_y);

                // node_y reinserted into route_x: either at node_x's
                // vacated slot, or wherever route_x's star cache likes
                // best (excluding node_x itself).
                let direct_y = problem.distance(customer_y, state.solution.customer(predecessor_x))
                    + problem.distance(customer_y, state.solution.customer(successor_x))
                    - problem.distance(state.solution.customer(predecessor_x), state.solution.customer(successor_x));
                let cached_y = state.star_caches.get(route_x, customer_y).find_best_without_node(node_x);
                let (delta_y, py, sy) = match cached_y {
                    Some(insertion) if insertion.delta.value < direct_y => {
                        (insertion.delta.value, insertion.predecessor, insertion.successor)
                    }
                    _ => (direct_y, predecessor_x, successor_x),
                };

                let direct_x = problem.distance(customer_x, state.solution.customer(predecessor_y))
                    + problem.distance(customer_x, state.solution.customer(successor_y))
                    - problem.distance(state.solution.customer(predecessor_y), state.solution.customer(successor_y));
                let cached_x = state.star_caches.get(route_y, customer_x).find_best_without_node(node_y);
                let (delta_x, px, sx) = match cached_x {
                    Some(insertion) if insertion.delta.value < direct_x => {
                        (insertion.delta.value, insertion.predecessor, insertion.successor)
                    }
                    _ => (direct_x, predecessor_y, successor_y),
                };

                let delta = delta_x + delta_y - removal_x - removal_y;
                if best.as_ref().map_or(true, |(d, _)| delta < *d) {
                    best = Some((
                        delta,
                        SwapStarMove {
                            node_x,
                            node_y,
                            predecessor_x: px,
                            successor_x: sx,
                            predecessor_y: py,
                            successor_y: sy,
                        },
                    ));
                }
            }
        }
        best
    }

    fn apply_move(state: &mut SearchState, route_x: usize, route_y: usize, mv: &SwapStarMove) {
        let old_predecessor_x = state.solution.predecessor(mv.node_x);
        let old_successor_x = state.solution.successor(mv.node_x);
        let old_predecessor_y = state.solution.predecessor(mv.node_y);
        let old_successor_y = state.solution.successor(mv.node_y);

        // The two guards share the single `successor(DEPOT)` scratch slot, so
        // they must never be open at the same time: route_x's vacate-then-
        // reinsert is bracketed by its own open/close pair before route_y's
        // guard touches the slot. `mv.predecessor_y`/`mv.successor_y` are the
        // slot for node_y within route_x; `mv.predecessor_x`/`mv.successor_x`
        // are the slot for node_x within route_y.
        let guard_x = RouteHeadGuard::open(state.solution, state.context, route_x);
        state.solution.link(old_predecessor_x, old_successor_x);
        state.solution.link(mv.predecessor_y, mv.node_y);
        state.solution.link(mv.node_y, mv.successor_y);
        guard_x.close(state.solution, state.context);
        state.context.update_route_context(state.solution, route_x, DEPOT);

        let guard_y = RouteHeadGuard::open(state.solution, state.context, route_y);
        state.solution.link(old_predecessor_y, old_successor_y);
        state.solution.link(mv.predecessor_x, mv.node_x);
        state.solution.link(mv.node_x, mv.successor_x);
        guard_y.close(state.solution, state.context);
        state.context.update_route_context(state.solution, route_y, DEPOT);
    }
}

impl InterOperator for SwapStar {
    fn name(&self) -> &'static str {
        "swap_star"
    }

    fn apply(&mut self, state: &mut SearchState, routes: &[usize]) -> Vec<usize> {
        let mut best: Option<(IntType, usize, usize, SwapStarMove)> = None;
        for &route_x in routes {
            for &route_y in routes {
                if route_y <= route_x {
                    continue;
                }
                let entry = self.cache.get(route_x, route_y);
                if entry.try_reuse() {
                    if entry.delta.value < 0 {
                        let mv = entry.data;
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
                    entry.data = mv;
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
