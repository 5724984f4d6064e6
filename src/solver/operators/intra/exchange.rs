use crate::models::primitives::DEPOT;
use crate::solver::operators::intra::IntraOperator;
use crate::solver::state::SearchState;

/// Exchanges the positions of two non-adjacent customers on the same
/// route.
pub struct Exchange;

fn delta_for(state: &SearchState, a: crate::models::primitives::NodeId, b: crate::models::primitives::NodeId) -> crate::models::primitives::IntType {
    let problem = state.problem;
    let solution = &state.solution;
    let pa = solution.predecessor(a);
    let sa = solution.successor(a);
    let pb = solution.predecessor(b);
    let sb = solution.successor(b);
    let ca = solution.customer(a);
    let cb = solution.customer(b);

    let old = problem.distance(solution.customer(pa), ca)
        + problem.distance(ca, solution.customer(sa))
        + problem.distance(solution.customer(pb), cb)
        + problem.distance(cb, solution.customer(sb));

    let new = if sa == b {
        // adjacent case: a immediately precedes b
        problem.distance(solution.customer(pa), cb)
            + problem.distance(cb, ca)
            + problem.distance(ca, solution.customer(sb))
    } else {
        problem.distance(solution.customer(pa), cb)
            + problem.distance(cb, solution.customer(sa))
            + problem.distance(solution.customer(pb), ca)
            + problem.distance(ca, solution.customer(sb))
    };
    new - old
}

fn apply_exchange(state: &mut SearchState, route: usize, a: crate::models::primitives::NodeId, b: crate::models::primitives::NodeId) {
    let solution = &mut *state.solution;
    let pa = solution.predecessor(a);
    let sa = solution.successor(a);
    let pb = solution.predecessor(b);
    let sb = solution.successor(b);

    if sa == b {
        solution.link(pa, b);
        solution.link(b, a);
        solution.link(a, sb);
    } else {
        solution.link(pa, b);
        solution.link(b, sa);
        solution.link(pb, a);
        solution.link(a, sb);
    }

    let head = state.context.head(route);
    let new_head = if head == a {
        b
    } else if head == b {
        a
    } else {
        head
    };
    state.context.set_head(route, new_head);
    state.context.update_route_context(state.solution, route, crate::models::primitives::DEPOT);
}

impl IntraOperator for Exchange {
    fn name(&self) -> &'static str {
        "exchange"
    }

    fn apply(&self, state: &mut SearchState, route: usize) -> bool {
        let head = state.context.head(route);
        if head == DEPOT {
            return false;
        }
        let mut nodes = Vec::new();
        let mut node = head;
        loop {
            nodes.push(node);
            let next = state.solution.successor(node);
            if next == DEPOT {
                break;
            }
            node = next;
        }

        let mut best: Option<(crate::models::primitives::IntType, usize, usize)> = None;
        for i in 0..nodes.len() {
            // b must be at least two positions after a (one node between).
            for j in (i + 2)..nodes.len() {
                let delta = delta_for(state, nodes[i], nodes[j]);
                if best.as_ref().map_or(true, |&(d, ..)| delta < d) {
                    best = Some((delta, i, j));
                }
            }
        }

        match best {
            Some((delta, i, j)) if delta < 0 => {
                apply_exchange(state, route, nodes[i], nodes[j]);
                true
            }
            _ => false,
        }
    }
}
