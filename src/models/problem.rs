use serde::{Deserialize, Serialize};

use crate::models::matrix::Matrix;
use crate::models::primitives::{IntType, NodeId};

/// A CVRP instance with customer count including the depot at index 0, a
/// symmetric integer distance matrix and a shared vehicle capacity.
#[derive(Clone, Debug)]
pub struct Problem {
    /// Number of customers including the depot at index 0.
    pub num_customers: NodeId,
    pub capacity: IntType,
    pub demands: Vec<IntType>,
    pub distance_matrix: Matrix<IntType>,
}

impl Problem {
    pub fn new(
        num_customers: NodeId,
        capacity: IntType,
        demands: Vec<IntType>,
        distance_matrix: Matrix<IntType>,
    ) -> Self {
        Self {
            num_customers,
            capacity,
            demands,
            distance_matrix,
        }
    }

    pub fn distance(&self, a: NodeId, b: NodeId) -> IntType {
        *self.distance_matrix.get(a as usize, b as usize)
    }

    pub fn demand(&self, customer: NodeId) -> IntType {
        self.demands[customer as usize]
    }

    pub fn total_demand(&self) -> IntType {
        self.demands.iter().skip(1).sum()
    }

    /// Lower bound on the number of vehicles/routes needed: ceil(total demand / capacity).
    pub fn fleet_lower_bound(&self) -> NodeId {
        let total = self.total_demand();
        (((total + self.capacity - 1) / self.capacity).max(1)) as NodeId
    }
}

/// Serializable snapshot used only for config echoing / debugging; the
/// in-memory `Problem` itself is not (de)serialized directly since the
/// distance matrix is derived, not configured.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProblemSummary {
    pub num_customers: NodeId,
    pub capacity: IntType,
}

impl From<&Problem> for ProblemSummary {
    fn from(problem: &Problem) -> Self {
        Self {
            num_customers: problem.num_customers,
            capacity: problem.capacity,
        }
    }
}
