use crate::models::primitives::{IntType, NodeId, DEPOT};
use crate::solver::cache::inter_route::InterRouteCache;
use crate::solver::operators::inter::InterOperator;
use crate::solver::route_head_guard::RouteHeadGuard;
use crate::solver::state::{calc_delta, SearchState};

/// Split-delivery SwapStar: like [`super::SdSwapOneOne`], but both
/// re-entry points are picked from the target route's star cache (best-3
/// insertion, excluding the node being replaced) instead of the two
/// adjacent slots.
#[derive(Debug, Clone, Copy, Default)]
pub struct SdSwapStarMove {
    heavy_node: NodeId,
    heavy_new_load: IntType,
    light_node: NodeId,
    light_insert_predecessor: NodeId,
    light_insert_successor: NodeId,
    heavy_copy_load: IntType,
    heavy_copy_predecessor: NodeId,
    heavy_copy_successor: NodeId,
    heavy_on_second: bool,
}

#[derive(Default)]
pub struct SdSwapStar {
    cache: InterRouteCache<SdSwapStarMove>,
}

impl SdSwapStar {
    fn best_between(
        state: &mut SearchState,
        route_heavy: usize,
        route_light: usize,
        heavy_on_second: bool,
    ) -> Option<(IntType, SdSwapStarMove)> {
        state.star_caches.preprocess(state.problem, state.random, state.solution, state.context, route_heavy);
        state.star_caches.preprocess(state.problem, state.random, state.solution, state.context, route_light);

        let problem = state.problem;
        let mut heavy_nodes = Vec::new();
        let heavy_head = state.context.head(route_heavy);
        if heavy_head != DEPOT {
            let mut node = heavy_head;
            loop {
                heavy_nodes.push(node);
                let next = state.solution.successor(node);
                if next == DEPOT {
                    break;
                }
                node = next;
            }
        }
        let mut light_nodes = Vec::new();
        let light_head = state.context.head(route_light);
        if light_head != DEPOT {
            let mut node = light_head;
            loop {
                light_nodes.push(node);
                let next = state.solution.successor(node);
                if next == DEPOT {
                    break;
                }
                node = next;
            }
        }

        let mut best: Option<(IntType, SdSwapStarMove)> = None;

        for &heavy_node in &heavy_nodes {
            let heavy_load = state.solution.load(heavy_node);
            for &light_node in &light_nodes {
                let light_load = state.solution.load(light_node);
                if light_load >= heavy_load {
                    continue;
                }

                let removal_light = calc_delta(problem, state.solution, light_node);
                let customer_heavy = state.solution.customer(heavy_node);
                let customer_light = state.solution.customer(light_node);

                let light_predecessor = state.solution.predecessor(light_node);
                let light_successor = state.solution.successor(light_node);
                let heavy_predecessor = state.solution.predecessor(heavy_node);
                let heavy_successor = state.solution.successor(heavy_node);

                let direct_light = problem.distance(customer_light, state.solution.customer(heavy_predecessor))
                    + problem.distance(customer_light, state.solution.customer(heavy_successor))
                    - problem.distance(state.solution.customer(heavy_predecessor), state.solution.customer(heavy_successor));
                let cached_light = state.star_caches.get(route_heavy, customer_light).find_best_without_node(heavy_node);
                let (light_cost, lp, ls) = match cached_light {
                    Some(insertion) if insertion.delta.value < direct_light => {
                        (insertion.delta.value, insertion.predecessor, insertion.successor)
                    }
                    _ => (direct_light, heavy_predecessor, heavy_successor),
                };

                let direct_heavy_copy = problem.distance(customer_heavy, state.solution.customer(light_predecessor))
                    + problem.distance(customer_heavy, state.solution.customer(light_successor))
                    - problem.distance(state.solution.customer(light_predecessor), state.solution.customer(light_successor));
                let cached_heavy_copy = state.star_caches.get(route_light, customer_heavy).find_best_without_node(light_node);
                let (heavy_copy_cost, hp, hs) = match cached_heavy_copy {
                    Some(insertion) if insertion.delta.value < direct_heavy_copy => {
                        (insertion.delta.value, insertion.predecessor, insertion.successor)
                    }
                    _ => (direct_heavy_copy, light_predecessor, light_successor),
                };

                let delta = light_cost + heavy_copy_cost - removal_light;
                if best.as_ref().map_or(true, |(d, _)| delta < *d) {
                    best = Some((
                        delta,
                        SdSwapStarMove {
                            heavy_node,
                            heavy_new_load: heavy_load - light_load,
                            light_node,
                            light_insert_predecessor: lp,
                            light_insert_successor: ls,
                            heavy_copy_load: light_load,
                            heavy_copy_predecessor: hp,
                            heavy_copy_successor: hs,
                            heavy_on_second,
                        },
                    ));
                }
            }
        }
        best
    }

    fn apply_move(state: &mut SearchState, route_heavy: usize, route_light: usize, mv: &SdSwapStarMove) {
        state.solution.set_load(mv.heavy_node, mv.heavy_new_load);
        let heavy_customer = state.solution.customer(mv.heavy_node);

        // The two guards share the single `successor(DEPOT)` scratch slot, so
        // they must never be open at the same time: route_light's vacate
        // (light_node leaving) plus the heavy-copy insertion happen under
        // their own guard before route_heavy's guard (light_node arriving)
        // touches the slot.
        let guard_light = RouteHeadGuard::open(state.solution, state.context, route_light);
        let light_predecessor = state.solution.predecessor(mv.light_node);
        let light_successor = state.solution.successor(mv.light_node);
        state.solution.link(light_predecessor, light_successor);
        state
            .solution
            .insert(heavy_customer, mv.heavy_copy_load, mv.heavy_copy_predecessor, mv.heavy_copy_successor);
        guard_light.close(state.solution, state.context);
        state.context.update_route_context(state.solution, route_light, DEPOT);

        let guard_heavy = RouteHeadGuard::open(state.solution, state.context, route_heavy);
        state.solution.link(mv.light_insert_predecessor, mv.light_node);
        state.solution.link(mv.light_node, mv.light_insert_successor);
        guard_heavy.close(state.solution, state.context);
        state.context.update_route_context(state.solution, route_heavy, DEPOT);
    }
}

impl InterOperator for SdSwapStar {
    fn name(&self) -> &'static str {
        "sd_swap_star"
    }

    fn apply(&mut self, state: &mut SearchState, routes: &[usize]) -> Vec<usize> {
        let mut best: Option<(IntType, usize, usize, SdSwapStarMove)> = None;
        for &route_a in routes {
            for &route_b in routes {
                if route_b <= route_a {
                    continue;
                }
                let entry = self.cache.get(route_a, route_b);
                if entry.try_reuse() {
                    if entry.delta.value < 0 {
                        let mv = entry.data;
                        if best.as_ref().map_or(true, |(d, ..)| entry.delta.value < *d) {
                            best = Some((entry.delta.value, route_a, route_b, mv));
                        }
                    }
                    continue;
                }

                let forward = Self::best_between(state, route_a, route_b, false);
                let backward = Self::best_between(state, route_b, route_a, true);
                let chosen = match (forward, backward) {
                    (Some(f), Some(b)) => Some(if f.0 <= b.0 { f } else { b }),
                    (Some(f), None) => Some(f),
                    (None, Some(b)) => Some(b),
                    (None, None) => None,
                };

                if let Some((delta, mv)) = chosen {
                    let entry = self.cache.get(route_a, route_b);
                    entry.delta.value = delta;
                    entry.delta.counter = 1;
                    entry.data = mv;
                    if delta < 0 && best.as_ref().map_or(true, |(d, ..)| delta < *d) {
                        best = Some((delta, route_a, route_b, mv));
                    }
                }
            }
        }

        if let Some((_, route_a, route_b, mv)) = best {
            let (route_heavy, route_light) = if mv.heavy_on_second { (route_b, route_a) } else { (route_a, route_b) };
            Self::apply_move(state, route_heavy, route_light, &mv);
            vec![route_heavy, route_light]
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
