use crate::models::problem::Problem;
use crate::solver::cache::star::StarCaches;
use crate::solver::route_context::RouteContext;
use crate::solver::solution::Solution;
use crate::utils::Random;

/// Everything an operator needs to evaluate and apply moves: the static
/// problem data, the mutable solution/route bookkeeping, the shared
/// per-route star cache, and the source of randomness for reservoir
/// tie-breaking.
pub struct SearchState<'a> {
    pub problem: &'a Problem,
    pub solution: &'a mut Solution,
    pub context: &'a mut RouteContext,
    pub star_caches: &'a mut StarCaches,
    pub random: &'a Random,
}

pub fn calc_delta(problem: &Problem, solution: &Solution, node: crate::models::primitives::NodeId) -> crate::models::primitives::IntType {
    let predecessor = solution.predecessor(node);
    let successor = solution.successor(node);
    let customer = solution.customer(node);
    problem.distance(customer, solution.customer(predecessor))
        + problem.distance(customer, solution.customer(successor))
        - problem.distance(solution.customer(predecessor), solution.customer(successor))
}
