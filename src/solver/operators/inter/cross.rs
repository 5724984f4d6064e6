use crate::models::primitives::{IntType, NodeId, DEPOT};
use crate::solver::cache::inter_route::InterRouteCache;
use crate::solver::operators::inter::InterOperator;
use crate::solver::state::SearchState;

#[derive(Debug, Clone, Copy, Default)]
pub struct CrossMove {
    reversed: bool,
    left_x: NodeId,
    right_x: NodeId,
    left_y: NodeId,
    right_y: NodeId,
}

/// Exchanges the tails of two routes at a cut point on each: everything
/// after `left_x` on route_x is swapped with everything after `left_y` on
/// route_y (2-opt* across a pair of routes), optionally reversing one tail.
#[derive(Default)]
pub struct Cross {
    cache: InterRouteCache<CrossMove>,
}

impl Cross {
    fn route_nodes(state: &SearchState, route: usize) -> Vec<NodeId> {
        let mut nodes = vec![DEPOT];
        let head = state.context.head(route);
        if head != DEPOT {
            let mut node = head;
            loop {
                nodes.push(node);
                let next = state.solution.successor(node);
                if next == DEPOT {
                    break;
                }
                node = next;
            }
        }
        nodes
    }

    fn prefix_loads(state: &SearchState, nodes: &[NodeId]) -> Vec<IntType> {
        let mut loads = Vec::with_capacity(nodes.len());
        let mut acc = 0;
        for &node in nodes {
            loads.push(acc);
            if node != DEPOT {
                acc += state.solution.load(node);
            }
        }
        loads
    }

    fn best_between(state: &SearchState, route_x: usize, route_y: usize) -> Option<(IntType, CrossMove)> {
        let problem = state.problem;
        let solution = state.solution;
        let nodes_x = Self::route_nodes(state, route_x);
        let nodes_y = Self::route_nodes(state, route_y);
        let loads_x = Self::prefix_loads(state, &nodes_x);
        let loads_y = Self::prefix_loads(state, &nodes_y);
        let total_x = state.context.load(route_x);
        let total_y = state.context.load(route_y);

        let mut best: Option<(IntType, CrossMove)> = None;

        for (ix, &left_x) in nodes_x.iter().enumerate() {
            let right_x = if ix + 1 < nodes_x.len() { nodes_x[ix + 1] } else { DEPOT };
            if right_x == DEPOT {
                continue;
            }
            let prefix_load_x = loads_x[ix];
            let suffix_load_x = total_x - prefix_load_x;

            for (iy, &left_y) in nodes_y.iter().enumerate() {
                let right_y = if iy + 1 < nodes_y.len() { nodes_y[iy + 1] } else { DEPOT };
                if right_y == DEPOT {
                    continue;
                }
                let prefix_load_y = loads_y[iy];
                let suffix_load_y = total_y - prefix_load_y;

                let old_edges = problem.distance(solution.customer(left_x), solution.customer(right_x))
                    + problem.distance(solution.customer(left_y), solution.customer(right_y));

                // forward: left_x joins right_y's old tail start, left_y joins right_x's.
                if prefix_load_x + suffix_load_y <= problem.capacity
                    && prefix_load_y + suffix_load_x <= problem.capacity
                {
                    let new_edges = problem.distance(solution.customer(left_x), solution.customer(right_y))
                        + problem.distance(solution.customer(left_y), solution.customer(right_x));
                    let delta = new_edges - old_edges;
                    if best.as_ref().map_or(true, |(d, _)| delta < *d) {
                        best = Some((
                            delta,
                            CrossMove {
                                reversed: false,
                                left_x,
                                right_x,
                                left_y,
                                right_y,
                            },
                        ));
                    }
                }

                // reversed: one tail is spliced in reversed so endpoints match directly.
                if prefix_load_x + suffix_load_y <= problem.capacity
                    && prefix_load_y + suffix_load_x <= problem.capacity
                {
                    let new_edges = problem.distance(solution.customer(left_x), solution.customer(left_y))
                        + problem.distance(solution.customer(right_x), solution.customer(right_y));
                    let delta = new_edges - old_edges;
                    if best.as_ref().map_or(true, |(d, _)| delta < *d) {
                        best = Some((
                            delta,
                            CrossMove {
                                reversed: true,
                                left_x,
                                right_x,
                                left_y,
                                right_y,
                            },
                        ));
                    }
                }
            }
        }
        best
    }

    fn apply_move(state: &mut SearchState, route_x: usize, route_y: usize, mv: &CrossMove) {
        let solution = &mut *state.solution;
        if !mv.reversed {
            solution.link(mv.left_x, mv.right_y);
            solution.link(mv.left_y, mv.right_x);
        } else {
            // To land on exactly the edges the delta was costed against,
            // (left_x,left_y) and (right_x,right_y), reverse route_y's
            // prefix (head_y..left_y) in place behind left_x, and reverse
            // route_x's suffix (right_x..tail_x) in place ahead of right_y
            // -- not both routes' suffixes, which would instead wire up
            // (left_y,tail_x) and (left_x,tail_y).
            let head_y = {
                let mut node = mv.left_y;
                loop {
                    let prev = solution.predecessor(node);
                    if prev == DEPOT {
                        break node;
                    }
                    node = prev;
                }
            };
            let tail_x = {
                let mut node = mv.right_x;
                loop {
                    let next = solution.successor(node);
                    if next == DEPOT {
                        break node;
                    }
                    node = next;
                }
            };
            solution.reversed_link(head_y, mv.left_y, mv.left_x, DEPOT);
            solution.reversed_link(mv.right_x, tail_x, DEPOT, mv.right_y);
        }

        state.context.calc_route_context(state.solution);
        let _ = (route_x, route_y);
    }
}

impl InterOperator for Cross {
    fn name(&self) -> &'static str {
        "cross"
    }

    fn apply(&mut self, state: &mut SearchState, routes: &[usize]) -> Vec<usize> {
        let mut best: Option<(IntType, usize, usize, CrossMove)> = None;
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
