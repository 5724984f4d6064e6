use crate::models::matrix::Matrix;
use crate::models::primitives::{IntType, NodeId, DEPOT};
use crate::solver::solution::Solution;

/// Applies an in-place Floyd-Warshall relaxation to a distance matrix
/// (intermediate index `k` starting at 1, the depot excluded as an
/// intermediate), recording which customer the shortcut passed through so a
/// solution built against the relaxed matrix can later be expanded back to
/// the physical path it represents.
pub struct DistanceMatrixOptimizer {
    previous_node_indices: Matrix<NodeId>,
}

impl DistanceMatrixOptimizer {
    pub fn new(distance_matrix: &mut Matrix<IntType>) -> Self {
        let num_customers = distance_matrix.rows();
        let mut previous_node_indices = Matrix::<NodeId>::new(num_customers, num_customers);

        for k in 1..num_customers {
            for i in 0..num_customers {
                for j in 0..num_customers {
                    let distance = distance_matrix.get(i, k) + distance_matrix.get(k, j);
                    if *distance_matrix.get(i, j) > distance {
                        distance_matrix.set(i, j, distance);
                        previous_node_indices.set(i, j, k as NodeId);
                    }
                }
            }
        }

        Self { previous_node_indices }
    }

    fn restore_edge(&self, solution: &mut Solution, i: NodeId, j: NodeId) {
        let customer = *self.previous_node_indices.get(solution.customer(i) as usize, solution.customer(j) as usize);
        if customer != DEPOT {
            let k = solution.insert(customer, 0, i, j);
            self.restore_edge(solution, i, k);
            self.restore_edge(solution, k, j);
        }
    }

    /// Walks every route and reinserts, at zero load, any customer visit
    /// that the relaxation above shortcut past, without changing the
    /// objective (the relaxed edge and the expanded chain have equal cost).
    pub fn restore(&self, solution: &mut Solution) {
        for head in solution.route_heads() {
            let mut predecessor = DEPOT;
            let mut node = head;
            loop {
                self.restore_edge(solution, predecessor, node);
                predecessor = node;
                let next = solution.successor(node);
                if next == DEPOT {
                    break;
                }
                node = next;
            }
            self.restore_edge(solution, predecessor, DEPOT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relaxes_a_shortcut_through_an_intermediate_customer_and_restores_it() {
        // depot 0, customers 1, 2, 3, laid out so the direct 1-3 edge is
        // longer than going through customer 2.
        let mut dm = Matrix::<IntType>::new(4, 4);
        dm.set(0, 1, 5);
        dm.set(1, 0, 5);
        dm.set(0, 3, 5);
        dm.set(3, 0, 5);
        dm.set(1, 3, 10);
        dm.set(3, 1, 10);
        dm.set(1, 2, 1);
        dm.set(2, 1, 1);
        dm.set(2, 3, 1);
        dm.set(3, 2, 1);

        let optimizer = DistanceMatrixOptimizer::new(&mut dm);
        assert_eq!(*dm.get(1, 3), 2);
        assert_eq!(*dm.get(3, 1), 2);

        // A route built against the relaxed matrix skips customer 2 entirely.
        let mut solution = Solution::new();
        let a = solution.insert(1, 3, DEPOT, DEPOT);
        solution.link(DEPOT, a);
        let b = solution.insert(3, 2, a, DEPOT);
        solution.link(a, b);
        solution.link(b, DEPOT);

        optimizer.restore(&mut solution);

        let mut node = solution.route_heads()[0];
        let mut customers = vec![solution.customer(node)];
        loop {
            let next = solution.successor(node);
            if next == DEPOT {
                break;
            }
            customers.push(solution.customer(next));
            node = next;
        }
        assert_eq!(customers, vec![1, 2, 3]);
        assert_eq!(solution.load(solution.route_heads()[0]), 3);
    }
}
