use std::collections::HashSet;

use crate::models::primitives::DEPOT;
use crate::models::problem::Problem;
use crate::solver::cache::CacheRegistry;
use crate::solver::operators::inter::InterOperator;
use crate::solver::operators::intra::IntraOperator;
use crate::solver::repair::repair_route;
use crate::solver::route_context::RouteContext;
use crate::solver::solution::Solution;
use crate::solver::state::SearchState;
use crate::utils::Random;

/// Repairs `route`, then repeatedly draws a random permutation of the intra
/// operators and applies the first one that improves; stops as soon as a
/// whole permutation produces no improving move.
pub fn intra_route_search(
    problem: &Problem,
    random: &Random,
    solution: &mut Solution,
    context: &mut RouteContext,
    star_caches: &mut crate::solver::cache::star::StarCaches,
    operators: &[Box<dyn IntraOperator>],
    route: usize,
) {
    repair_route(problem, random, solution, context, route);

    loop {
        let mut order: Vec<usize> = (0..operators.len()).collect();
        random.shuffle(&mut order);

        let mut improved = false;
        for &i in &order {
            let mut state = SearchState {
                problem,
                solution,
                context,
                star_caches,
                random,
            };
            if operators[i].apply(&mut state, route) {
                improved = true;
                break;
            }
        }
        if !improved {
            break;
        }
    }
}

/// Removes the cache bookkeeping for every route in `touched`, compacts the
/// surviving routes down to contiguous indices, then reinstalls whichever
/// touched routes are still non-empty at fresh indices appended at the end.
/// Returns the (possibly empty) list of reinstalled route indices.
fn compact_routes(context: &mut RouteContext, registry: &mut CacheRegistry, operators: &mut [Box<dyn InterOperator>], mut touched: Vec<usize>) -> Vec<usize> {
    touched.sort_unstable();
    touched.dedup();

    let snapshots: Vec<_> = touched.iter().map(|&route| (context.head(route), context.tail(route), context.load(route))).collect();

    for &route in &touched {
        registry.remove_route(operators, route);
    }

    let old_num_routes = context.num_routes();
    let touched_set: HashSet<usize> = touched.iter().copied().collect();
    let mut write = 0;
    for read in 0..old_num_routes {
        if touched_set.contains(&read) {
            continue;
        }
        if write != read {
            context.move_route_context(write, read);
            registry.move_route(operators, write, read);
        }
        write += 1;
    }
    context.set_num_routes(write);

    let mut reinstalled = Vec::new();
    for (head, tail, load) in snapshots {
        if head != DEPOT {
            let new_index = context.add_route(head, tail, load);
            registry.add_route(operators, new_index);
            reinstalled.push(new_index);
        }
    }
    reinstalled
}

/// Resets the cache registry, then repeatedly draws a random permutation of
/// the inter operators and applies the first one that touches any routes;
/// whenever that happens the affected routes are compacted out of and back
/// into the route table (keeping cache matrices dense and contiguous) and
/// any route reinstalled this way gets its own intra-route search. Stops as
/// soon as a whole permutation produces no touching op.
pub fn run_rvnd(
    problem: &Problem,
    random: &Random,
    solution: &mut Solution,
    context: &mut RouteContext,
    registry: &mut CacheRegistry,
    inter_operators: &mut [Box<dyn InterOperator>],
    intra_operators: &[Box<dyn IntraOperator>],
) {
    registry.reset(inter_operators, context.num_routes(), problem.num_customers as usize);

    loop {
        let mut order: Vec<usize> = (0..inter_operators.len()).collect();
        random.shuffle(&mut order);

        let mut improved = false;
        for &i in &order {
            let all_routes: Vec<usize> = (0..context.num_routes()).collect();
            let touched = {
                let mut state = SearchState {
                    problem,
                    solution,
                    context,
                    star_caches: &mut registry.star,
                    random,
                };
                inter_operators[i].apply(&mut state, &all_routes)
            };

            if !touched.is_empty() {
                let reinstalled = compact_routes(context, registry, inter_operators, touched);
                for route in reinstalled {
                    intra_route_search(problem, random, solution, context, &mut registry.star, intra_operators, route);
                }
                improved = true;
                break;
            }
        }

        if !improved {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::matrix::Matrix;
    use crate::models::primitives::IntType;
    use crate::solver::operators::inter::default_inter_operators;
    use crate::solver::operators::intra::default_intra_operators;

    fn line_problem(n: usize, capacity: IntType) -> Problem {
        let mut dm = Matrix::<IntType>::new(n, n);
        for i in 0..n {
            for j in 0..n {
                dm.set(i, j, (i as IntType - j as IntType).abs());
            }
        }
        Problem::new(n as crate::models::primitives::NodeId, capacity, vec![0; n], dm)
    }

    #[test]
    fn rvnd_keeps_all_demand_served_after_churn() {
        let problem = line_problem(6, 100);
        let mut solution = Solution::new();
        let a = solution.insert(1, 1, DEPOT, DEPOT);
        solution.link(DEPOT, a);
        solution.link(a, DEPOT);
        let b = solution.insert(3, 1, DEPOT, DEPOT);
        let c = solution.insert(2, 1, b, DEPOT);
        solution.link(DEPOT, b);
        solution.link(b, c);
        solution.link(c, DEPOT);

        let mut context = RouteContext::new();
        context.calc_route_context(&solution);
        let random = Random::from_seed(7);
        let mut registry = CacheRegistry::default();
        let mut inter_operators = default_inter_operators();
        let intra_operators = default_intra_operators();

        run_rvnd(&problem, &random, &mut solution, &mut context, &mut registry, &mut inter_operators, &intra_operators);

        let mut served = vec![0; 6];
        for route in 0..context.num_routes() {
            let head = context.head(route);
            if head == DEPOT {
                continue;
            }
            let mut node = head;
            loop {
                served[solution.customer(node) as usize] += solution.load(node);
                let next = solution.successor(node);
                if next == DEPOT {
                    break;
                }
                node = next;
            }
        }
        assert_eq!(served, vec![0, 1, 1, 1, 0, 0]);
    }
}
