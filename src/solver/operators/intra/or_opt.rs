use crate::models::primitives::{IntType, NodeId, DEPOT};
use crate::solver::operators::intra::IntraOperator;
use crate::solver::state::SearchState;

/// Relocates a segment of `length` consecutive customers to a different
/// position in the same route, optionally reversed.
pub struct OrOpt {
    length: usize,
}

impl OrOpt {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

struct Candidate {
    head: NodeId,
    tail: NodeId,
    predecessor: NodeId,
    successor: NodeId,
    insert_predecessor: NodeId,
    insert_successor: NodeId,
    reversed: bool,
    delta: IntType,
}

impl IntraOperator for OrOpt {
    fn name(&self) -> &'static str {
        match self.length {
            1 => "or_opt_1",
            2 => "or_opt_2",
            _ => "or_opt_3",
        }
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
        if nodes.len() <= self.length {
            return false;
        }

        let problem = state.problem;
        let solution = &state.solution;
        let mut best: Option<Candidate> = None;

        for start in 0..=(nodes.len() - self.length) {
            let seg_head = nodes[start];
            let seg_tail = nodes[start + self.length - 1];
            let predecessor = solution.predecessor(seg_head);
            let successor = solution.successor(seg_tail);
            if predecessor == DEPOT && successor == DEPOT {
                continue; // whole route, nothing to gain
            }

            let removed = problem.distance(solution.customer(predecessor), solution.customer(seg_head))
                + problem.distance(solution.customer(seg_tail), solution.customer(successor));
            let bridge = problem.distance(solution.customer(predecessor), solution.customer(successor));
            let removal_gain = bridge - removed;

            for i in 0..nodes.len() {
                if i >= start && i < start + self.length {
                    continue;
                }
                let insert_predecessor = nodes[i];
                let insert_successor = if i + 1 < nodes.len() { nodes[i + 1] } else { DEPOT };
                if insert_predecessor == predecessor && insert_successor == successor {
                    continue;
                }
                // Skip insertion points that fall inside the segment being removed.
                if i + 1 >= start && i + 1 <= start + self.length && i < start + self.length {
                    continue;
                }

                let insert_base = problem.distance(
                    solution.customer(insert_predecessor),
                    solution.customer(insert_successor),
                );

                let forward = problem.distance(solution.customer(insert_predecessor), solution.customer(seg_head))
                    + problem.distance(solution.customer(seg_tail), solution.customer(insert_successor))
                    - insert_base;
                let forward_delta = removal_gain + forward;

                if best.as_ref().map_or(true, |b| forward_delta < b.delta) {
                    best = Some(Candidate {
                        head: seg_head,
                        tail: seg_tail,
                        predecessor,
                        successor,
                        insert_predecessor,
                        insert_successor,
                        reversed: false,
                        delta: forward_delta,
                    });
                }

                if self.length > 1 {
                    let reversed = problem.distance(solution.customer(insert_predecessor), solution.customer(seg_tail))
                        + problem.distance(solution.customer(seg_head), solution.customer(insert_successor))
                        - insert_base;
                    let reversed_delta = removal_gain + reversed;
                    if best.as_ref().map_or(true, |b| reversed_delta < b.delta) {
                        best = Some(Candidate {
                            head: seg_head,
                            tail: seg_tail,
                            predecessor,
                            successor,
                            insert_predecessor,
                            insert_successor,
                            reversed: true,
                            delta: reversed_delta,
                        });
                    }
                }
            }
        }

        match best {
            Some(candidate) if candidate.delta < 0 => {
                apply_or_opt(state, route, &candidate);
                true
            }
            _ => false,
        }
    }
}

fn apply_or_opt(state: &mut SearchState, route: usize, candidate: &Candidate) {
    let solution = &mut *state.solution;
    solution.link(candidate.predecessor, candidate.successor);

    if candidate.reversed {
        solution.reversed_link(
            candidate.head,
            candidate.tail,
            candidate.insert_predecessor,
            candidate.insert_successor,
        );
    } else {
        solution.link(candidate.insert_predecessor, candidate.head);
        solution.link(candidate.tail, candidate.insert_successor);
    }

    let mut head = state.context.head(route);
    if candidate.predecessor == DEPOT {
        head = candidate.successor;
    }
    if candidate.insert_predecessor == DEPOT {
        head = if candidate.reversed { candidate.tail } else { candidate.head };
    }
    state.context.set_head(route, head);
    state.context.update_route_context(state.solution, route, DEPOT);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::matrix::Matrix;
    use crate::models::problem::Problem;
    use crate::solver::cache::star::StarCaches;
    use crate::solver::route_context::RouteContext;
    use crate::solver::solution::Solution;
    use crate::utils::Random;

    #[test]
    fn or_opt_1_relocates_single_customer() {
        // Depot at 0, customers 1..4 on a line so moving 3 next to 1 helps.
        let mut dm = Matrix::<IntType>::new(4, 4);
        let coords = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 5.0)];
        for i in 0..4 {
            for j in 0..4 {
                let (xi, yi) = coords[i];
                let (xj, yj) = coords[j];
                dm.set(i, j, ((xi - xj).powi(2) + (yi - yj).powi(2)).sqrt().round() as IntType);
            }
        }
        let problem = Problem::new(4, 100, vec![0, 1, 1, 1], dm);

        let mut solution = Solution::new();
        let n1 = solution.insert(1, 1, DEPOT, DEPOT);
        solution.link(DEPOT, n1);
        let n3 = solution.insert(3, 1, n1, DEPOT);
        solution.link(n1, n3);
        let n2 = solution.insert(2, 1, n3, DEPOT);
        solution.link(n3, n2);
        solution.link(n2, DEPOT);

        let mut context = RouteContext::new();
        context.calc_route_context(&solution);
        let mut star_caches = StarCaches::default();
        star_caches.reset(1, 4);
        let random = Random::from_seed(7);

        let mut state = SearchState {
            problem: &problem,
            solution: &mut solution,
            context: &mut context,
            star_caches: &mut star_caches,
            random: &random,
        };

        let op = OrOpt::new(1);
        let applied = op.apply(&mut state, 0);
        assert!(applied);
    }
}
