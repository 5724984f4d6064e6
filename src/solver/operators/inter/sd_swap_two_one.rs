use crate::models::primitives::IntType;
use crate::solver::cache::inter_route::InterRouteCache;
use crate::solver::operators::inter::sd_swap_one_one::{apply_move, best_between, SdSwapMove};
use crate::solver::operators::inter::InterOperator;
use crate::solver::state::SearchState;

/// Same split-exchange as [`super::SdSwapOneOne`], but the heavy side is a
/// 2-node consecutive segment: its second node is folded into the first
/// before the load-reduction/relocation exchange proceeds identically.
#[derive(Default)]
pub struct SdSwapTwoOne {
    cache: InterRouteCache<SdSwapMove>,
}

impl InterOperator for SdSwapTwoOne {
    fn name(&self) -> &'static str {
        "sd_swap_two_one"
    }

    fn apply(&mut self, state: &mut SearchState, routes: &[usize]) -> Vec<usize> {
        let mut best: Option<(IntType, usize, usize, SdSwapMove)> = None;
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

                let forward = best_between(state, 2, route_a, route_b, false);
                let backward = best_between(state, 2, route_b, route_a, true);
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
            apply_move(state, route_heavy, route_light, &mv);
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
