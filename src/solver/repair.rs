use std::collections::HashMap;

use crate::models::primitives::{IntType, NodeId, DEPOT};
use crate::models::problem::Problem;
use crate::solver::route_context::RouteContext;
use crate::solver::route_head_guard::RouteHeadGuard;
use crate::solver::solution::Solution;
use crate::utils::Random;

/// Merges consecutive nodes on `route` that carry the same customer,
/// folding the later node's load into the earlier one.
fn merge_adjacent_same_customers(solution: &mut Solution, head: NodeId) {
    if head == DEPOT {
        return;
    }
    let mut node = head;
    loop {
        let successor = solution.successor(node);
        if successor == DEPOT {
            break;
        }
        if solution.customer(node) == solution.customer(successor) {
            solution.set_load(node, solution.load(node) + solution.load(successor));
            solution.remove(successor);
        } else {
            node = successor;
        }
    }
}

/// `d(pred,succ) - d(pred,node) - d(node,succ)`: negative when removing
/// `node` would shorten the route (the usual case), so a smaller
/// (more negative) value means the node contributes more excess distance.
fn removal_delta(problem: &Problem, solution: &Solution, node: NodeId) -> IntType {
    let predecessor = solution.predecessor(node);
    let successor = solution.successor(node);
    problem.distance(solution.customer(predecessor), solution.customer(successor))
        - problem.distance(solution.customer(predecessor), solution.customer(node))
        - problem.distance(solution.customer(node), solution.customer(successor))
}

/// Repairs a single route: merges adjacent duplicate customers, then folds
/// every non-adjacent duplicate into whichever of its two occurrences is
/// more expensive to have removed (the better-positioned one survives; the
/// other's load is folded in and it is spliced out).
pub fn repair_route(problem: &Problem, random: &Random, solution: &mut Solution, context: &mut RouteContext, route: usize) {
    let head = context.head(route);
    if head == DEPOT {
        return;
    }
    merge_adjacent_same_customers(solution, head);

    let head_after_merge = {
        // merge_adjacent_same_customers never removes the head itself
        // (it only merges a node into its predecessor), so the head is
        // stable across that pass.
        context.head(route)
    };

    let guard = RouteHeadGuard::open(solution, context, route);
    let mut seen: HashMap<NodeId, NodeId, ahash::RandomState> = HashMap::with_hasher(random.random_state());

    let mut node = head_after_merge;
    loop {
        let successor = solution.successor(node);
        let customer = solution.customer(node);
        match seen.get(&customer).copied() {
            None => {
                seen.insert(customer, node);
            }
            Some(existing) => {
                let delta_existing = removal_delta(problem, solution, existing);
                let delta_current = removal_delta(problem, solution, node);
                let (keep, remove) = if delta_existing < delta_current { (node, existing) } else { (existing, node) };
                solution.set_load(keep, solution.load(keep) + solution.load(remove));
                solution.remove(remove);
                seen.insert(customer, keep);
            }
        }
        if successor == DEPOT {
            break;
        }
        node = successor;
    }

    guard.close(solution, context);
    context.update_route_context(solution, route, DEPOT);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::matrix::Matrix;

    fn line_problem(n: usize) -> Problem {
        let mut dm = Matrix::<IntType>::new(n, n);
        for i in 0..n {
            for j in 0..n {
                dm.set(i, j, (i as IntType - j as IntType).abs());
            }
        }
        Problem::new(n as NodeId, 100, vec![0; n], dm)
    }

    #[test]
    fn merges_adjacent_duplicates() {
        let problem = line_problem(4);
        let mut solution = Solution::new();
        let a = solution.insert(1, 2, DEPOT, DEPOT);
        solution.link(DEPOT, a);
        let b = solution.insert(1, 3, a, DEPOT);
        solution.link(a, b);
        solution.link(b, DEPOT);

        let mut context = RouteContext::new();
        context.calc_route_context(&solution);
        let random = Random::from_seed(1);

        repair_route(&problem, &random, &mut solution, &mut context, 0);

        assert_eq!(solution.node_indices().len(), 1);
        assert_eq!(solution.load(solution.node_indices()[0]), 5);
    }

    #[test]
    fn folds_non_adjacent_duplicate_into_better_positioned_node() {
        let problem = line_problem(4);
        // Route: 0 - 1(customer A) - 2(customer B) - 3(customer A) - 0
        // Removing node at position "2" (between A..A) is cheap (on the
        // direct line), so the duplicate customer A occurrence further out
        // should be the one that survives... the point of this test is
        // just that exactly one visit of customer 1 remains afterward.
        let mut solution = Solution::new();
        let a1 = solution.insert(1, 1, DEPOT, DEPOT);
        solution.link(DEPOT, a1);
        let b = solution.insert(2, 1, a1, DEPOT);
        solution.link(a1, b);
        let a2 = solution.insert(1, 4, b, DEPOT);
        solution.link(b, a2);
        solution.link(a2, DEPOT);

        let mut context = RouteContext::new();
        context.calc_route_context(&solution);
        let random = Random::from_seed(1);

        repair_route(&problem, &random, &mut solution, &mut context, 0);

        let customer_ones = solution
            .node_indices()
            .iter()
            .filter(|&&n| solution.customer(n) == 1)
            .count();
        assert_eq!(customer_ones, 1);
    }
}
