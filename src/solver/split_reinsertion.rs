use crate::models::primitives::{IntType, NodeId, DEPOT};
use crate::models::problem::Problem;
use crate::solver::insertion::{calc_best_insertion, BestInsertion};
use crate::solver::route_context::RouteContext;
use crate::solver::solution::Solution;
use crate::utils::Random;

struct Move {
    insertion: BestInsertion,
    residual: IntType,
}

/// Fractionally reinserts a customer's full `demand` across whichever
/// routes have spare capacity, cheapest cost-per-unit-load first, skipping
/// a move with probability `blink_rate` (as long as enough capacity remains
/// in the moves still to come) for search diversification.
pub fn split_reinsertion(
    problem: &Problem,
    random: &Random,
    solution: &mut Solution,
    context: &mut RouteContext,
    customer: NodeId,
    mut demand: IntType,
    blink_rate: f64,
) {
    let mut moves = Vec::with_capacity(context.num_routes());
    let mut sum_residual: IntType = 0;

    for route in 0..context.num_routes() {
        let residual = demand.min(problem.capacity - context.load(route));
        if residual > 0 {
            let insertion = calc_best_insertion(problem, random, solution, context, route, customer);
            moves.push(Move { insertion, residual });
            sum_residual += residual;
        }
    }

    debug_assert!(
        sum_residual >= demand,
        "residual capacity across all routes does not cover split reinsertion demand"
    );
    if sum_residual < demand {
        return;
    }

    // Ascending cost-per-unit-load, compared as cross-multiplication to
    // avoid division: cost_i/residual_i < cost_j/residual_j.
    moves.sort_by(|a, b| {
        let lhs = a.insertion.delta.value * b.residual;
        let rhs = b.insertion.delta.value * a.residual;
        lhs.cmp(&rhs)
    });

    for mv in &moves {
        sum_residual -= mv.residual;
        if sum_residual >= demand && random.real() < blink_rate {
            continue;
        }
        let load = demand.min(mv.residual);
        let node = solution.insert(customer, load, mv.insertion.predecessor, mv.insertion.successor);
        if mv.insertion.predecessor == DEPOT {
            context.set_head(mv.insertion.route, node);
        }
        context.update_route_context(solution, mv.insertion.route, mv.insertion.predecessor);
        demand -= load;
        if demand == 0 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::matrix::Matrix;

    fn line_problem(n: usize, capacity: IntType) -> Problem {
        let mut dm = Matrix::<IntType>::new(n, n);
        for i in 0..n {
            for j in 0..n {
                dm.set(i, j, (i as IntType - j as IntType).abs());
            }
        }
        Problem::new(n as NodeId, capacity, vec![0; n], dm)
    }

    #[test]
    fn reinserts_across_two_routes_when_one_alone_cannot_hold_it() {
        let problem = line_problem(5, 5);
        let mut solution = Solution::new();
        // Route A: single node, customer 1, load 3 (2 residual capacity).
        let a = solution.insert(1, 3, DEPOT, DEPOT);
        // Route B: single node, customer 4, load 2 (3 residual capacity).
        let b = solution.insert(4, 2, DEPOT, DEPOT);
        let _ = (a, b);

        let mut context = RouteContext::new();
        context.calc_route_context(&solution);
        let random = Random::from_seed(3);

        split_reinsertion(&problem, &random, &mut solution, &mut context, 2, 4, 0.0);

        let total_load_of_customer: IntType = solution
            .node_indices()
            .iter()
            .filter(|&&n| solution.customer(n) == 2)
            .map(|&n| solution.load(n))
            .sum();
        assert_eq!(total_load_of_customer, 4);
    }
}
