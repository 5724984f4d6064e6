use crate::models::primitives::{IntType, NodeId, DEPOT};
use crate::models::problem::Problem;
use crate::solver::route_context::RouteContext;
use crate::solver::solution::Solution;
use crate::utils::Random;

struct SeedRoute {
    head: NodeId,
    tail: NodeId,
    load: IntType,
}

/// Builds the initial solution: every customer's demand is split into
/// chunks of at most `Q`, each chunk seeds its own single-node route, and
/// routes are then folded together by the savings criterion (replace the
/// two depot-adjacent edges of a tail/head pair with one direct edge)
/// whenever that is both capacity-feasible and an improvement, until no
/// further merge qualifies.
pub fn construct(problem: &Problem, random: &Random) -> (Solution, RouteContext) {
    let mut solution = Solution::new();

    let mut chunks: Vec<(NodeId, IntType)> = Vec::new();
    for customer in 1..problem.num_customers {
        let mut remaining = problem.demand(customer);
        while remaining > 0 {
            let load = remaining.min(problem.capacity);
            chunks.push((customer, load));
            remaining -= load;
        }
    }
    random.shuffle(&mut chunks);

    let mut routes: Vec<SeedRoute> = Vec::with_capacity(chunks.len());
    for (customer, load) in chunks {
        let node = solution.insert(customer, load, DEPOT, DEPOT);
        routes.push(SeedRoute { head: node, tail: node, load });
    }

    loop {
        let mut best: Option<(IntType, usize, usize)> = None;
        for i in 0..routes.len() {
            for j in 0..routes.len() {
                if i == j {
                    continue;
                }
                if routes[i].load + routes[j].load > problem.capacity {
                    continue;
                }
                let tail_customer = solution.customer(routes[i].tail);
                let head_customer = solution.customer(routes[j].head);
                let delta = problem.distance(tail_customer, head_customer)
                    - problem.distance(0, tail_customer)
                    - problem.distance(0, head_customer);
                if best.as_ref().map_or(true, |&(d, ..)| delta < d) {
                    best = Some((delta, i, j));
                }
            }
        }

        match best {
            Some((delta, i, j)) if delta < 0 => {
                solution.link(routes[i].tail, routes[j].head);
                let merged = SeedRoute {
                    head: routes[i].head,
                    tail: routes[j].tail,
                    load: routes[i].load + routes[j].load,
                };
                let (lo, hi) = if i < j { (i, j) } else { (j, i) };
                routes.remove(hi);
                routes.remove(lo);
                routes.push(merged);
            }
            _ => break,
        }
    }

    debug_assert!(
        routes.len() as NodeId >= problem.fleet_lower_bound(),
        "construction produced fewer routes than the fleet lower bound"
    );

    let mut context = RouteContext::new();
    context.calc_route_context(&solution);
    (solution, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::matrix::Matrix;

    #[test]
    fn construct_serves_all_demand() {
        let mut dm = Matrix::<IntType>::new(4, 4);
        let coords = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 1.0)];
        for i in 0..4 {
            for j in 0..4 {
                let (xi, yi) = coords[i];
                let (xj, yj) = coords[j];
                dm.set(i, j, ((xi - xj).powi(2) + (yi - yj).powi(2)).sqrt().round() as IntType);
            }
        }
        let problem = Problem::new(4, 10, vec![0, 4, 3, 5], dm);
        let random = Random::from_seed(42);

        let (solution, context) = construct(&problem, &random);

        let mut served = vec![0; 4];
        for &node in solution.node_indices() {
            served[solution.customer(node) as usize] += solution.load(node);
        }
        for customer in 1..4 {
            assert_eq!(served[customer], problem.demand(customer as NodeId));
        }
        for route in 0..context.num_routes() {
            assert!(context.load(route) <= problem.capacity);
        }
    }

    #[test]
    fn splits_demand_exceeding_capacity_into_chunks() {
        let mut dm = Matrix::<IntType>::new(2, 2);
        dm.set(0, 1, 5);
        dm.set(1, 0, 5);
        let problem = Problem::new(2, 10, vec![0, 25], dm);
        let random = Random::from_seed(1);

        let (solution, context) = construct(&problem, &random);

        let total: IntType = solution.node_indices().iter().map(|&n| solution.load(n)).sum();
        assert_eq!(total, 25);
        assert!(context.num_routes() >= 3);
    }
}
