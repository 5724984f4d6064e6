use crate::models::primitives::{IntType, NodeId, DEPOT};
use crate::models::problem::Problem;
use crate::solver::delta::Delta;
use crate::solver::route_context::RouteContext;
use crate::solver::solution::Solution;
use crate::utils::Random;

/// The cheapest place found to insert a customer on some route, found by a
/// direct O(route length) scan (as opposed to the amortized star cache,
/// which is only built for routes an operator revisits repeatedly).
#[derive(Debug, Clone, Copy)]
pub struct BestInsertion {
    pub predecessor: NodeId,
    pub successor: NodeId,
    pub route: usize,
    pub delta: Delta<IntType>,
}

fn insertion_cost(problem: &Problem, customer: NodeId, predecessor_customer: NodeId, successor_customer: NodeId) -> IntType {
    problem.distance(customer, predecessor_customer) + problem.distance(customer, successor_customer)
        - problem.distance(predecessor_customer, successor_customer)
}

/// Scans every edge of `route` (including the depot-adjacent ones at both
/// ends) for where `customer` is cheapest to insert.
pub fn calc_best_insertion(
    problem: &Problem,
    random: &Random,
    solution: &Solution,
    context: &RouteContext,
    route: usize,
    customer: NodeId,
) -> BestInsertion {
    let head = context.head(route);
    let head_cost = insertion_cost(problem, customer, 0, solution.customer(head));
    let mut best = BestInsertion {
        predecessor: DEPOT,
        successor: head,
        route,
        delta: Delta::new(head_cost, 1),
    };

    if head == DEPOT {
        // Empty route: the only possible insertion is the sole node of a
        // fresh route; solution.successor(DEPOT) is scratch and must not be
        // read outside a RouteHeadGuard, so there is nothing left to scan.
        return best;
    }

    let mut node = head;
    loop {
        let successor = solution.successor(node);
        let cost = insertion_cost(problem, customer, solution.customer(node), solution.customer(successor));
        if best.delta.update(random, cost) {
            best.predecessor = node;
            best.successor = successor;
        }
        if successor == DEPOT {
            break;
        }
        node = successor;
    }
    best
}
