use std::collections::{HashMap, HashSet};

use crate::models::primitives::{NodeId, DEPOT};
use crate::models::problem::Problem;
use crate::solver::route_context::RouteContext;
use crate::solver::solution::Solution;
use crate::utils::Random;

/// Selects a set of customers (by customer id, already de-duplicated) to be
/// stripped out of the current solution and fractionally reinserted by
/// `split_reinsertion`. The caller is responsible for removing every
/// node-slot occurrence of every returned customer, since one customer may
/// have several split-delivery occurrences across different routes.
pub trait RuinMethod {
    fn ruin(&self, problem: &Problem, random: &Random, solution: &Solution, context: &RouteContext) -> Vec<NodeId>;
}

/// Draws one of several configured perturbation sizes uniformly, then
/// samples that many customer ids uniformly without replacement.
pub struct RandomRuin {
    sizes: Vec<usize>,
}

impl RandomRuin {
    pub fn new(sizes: Vec<usize>) -> anyhow::Result<Self> {
        if sizes.is_empty() {
            anyhow::bail!("RandomRuin requires at least one configured perturbation size");
        }
        Ok(Self { sizes })
    }
}

impl RuinMethod for RandomRuin {
    fn ruin(&self, problem: &Problem, random: &Random, _solution: &Solution, _context: &RouteContext) -> Vec<NodeId> {
        let available = (problem.num_customers as usize).saturating_sub(1);
        let size = self.sizes[random.range_usize(0, self.sizes.len())].min(available);
        let customers: Vec<NodeId> = (1..problem.num_customers).collect();
        random.sample_from_vec(customers, size)
    }
}

/// Slack Induction by String Removals: ruins `num_strings` whole or
/// partial routes clustered around a random seed customer, each as a
/// contiguous "string" (optionally with a preserved inner segment kept in
/// place, the "split string" variant).
pub struct SisrsRuin {
    avg_customers: f64,
    max_len: usize,
    split_rate: f64,
    preserved_prob: f64,
}

impl SisrsRuin {
    pub fn new(avg_customers: f64, max_len: usize, split_rate: f64, preserved_prob: f64) -> Self {
        Self {
            avg_customers,
            max_len,
            split_rate,
            preserved_prob,
        }
    }

    /// Decides the removal window for a string anchored at `node_position`
    /// on a route of length `route_len`, given the sampled base
    /// `ruin_len`. Returns (window_start, window_len, preserved_start,
    /// preserved_len), where `preserved_start`/`preserved_len` are relative
    /// to `window_start` and describe a sub-range kept rather than removed.
    fn plan_window(&self, random: &Random, route_len: usize, node_position: usize, ruin_len: usize) -> (usize, usize, usize, usize) {
        let use_split = ruin_len >= 2 && ruin_len < route_len && random.real() < self.split_rate;
        if !use_split {
            let min_start = node_position.saturating_sub(ruin_len.saturating_sub(1));
            let max_start = (route_len - ruin_len).min(node_position);
            let start = if min_start < max_start {
                random.range_usize(min_start, max_start + 1)
            } else {
                min_start
            };
            return (start, ruin_len, 0, 0);
        }

        let m_max = route_len - ruin_len;
        let mut preserved_len = 1;
        if m_max > 0 {
            while preserved_len < m_max && random.real() > self.preserved_prob {
                preserved_len += 1;
            }
        } else {
            preserved_len = 0;
        }

        let window_len = ruin_len + preserved_len;
        let min_start = node_position.saturating_sub(window_len.saturating_sub(1));
        let max_start = (route_len - window_len).min(node_position);
        let start = if min_start < max_start {
            random.range_usize(min_start, max_start + 1)
        } else {
            min_start
        };

        let preserved_start = if preserved_len > 0 { random.range_usize(0, ruin_len) } else { 0 };

        (start, window_len, preserved_start, preserved_len)
    }
}

impl RuinMethod for SisrsRuin {
    fn ruin(&self, problem: &Problem, random: &Random, solution: &Solution, context: &RouteContext) -> Vec<NodeId> {
        let num_routes = context.num_routes();
        if num_routes == 0 || problem.num_customers <= 1 {
            return Vec::new();
        }

        let l_bar = (problem.num_customers as f64 - 1.0) / num_routes as f64;
        let l_s_max = l_bar.min(self.max_len as f64);
        let k_s_max = 4.0 * self.avg_customers / (1.0 + self.max_len as f64) - 1.0;
        let num_strings = (random.real() * k_s_max).floor() as usize + 1;

        let seed_customer = random.range_usize(0, problem.num_customers as usize) as NodeId;

        let mut sequences: Vec<Vec<NodeId>> = Vec::with_capacity(num_routes);
        for route in 0..num_routes {
            let mut sequence = Vec::new();
            let head = context.head(route);
            if head != DEPOT {
                let mut node = head;
                loop {
                    sequence.push(node);
                    let next = solution.successor(node);
                    if next == DEPOT {
                        break;
                    }
                    node = next;
                }
            }
            sequences.push(sequence);
        }

        let mut position: HashMap<NodeId, (usize, usize), ahash::RandomState> = HashMap::with_hasher(random.random_state());
        for (route, sequence) in sequences.iter().enumerate() {
            for (index, &node) in sequence.iter().enumerate() {
                position.insert(node, (route, index));
            }
        }

        let mut ordered: Vec<NodeId> = solution.node_indices().to_vec();
        ordered.sort_by_key(|&node| problem.distance(seed_customer, solution.customer(node)));

        let mut ruined_routes: HashSet<usize, ahash::RandomState> = HashSet::with_hasher(random.random_state());
        let mut result = Vec::new();

        for &node in &ordered {
            if ruined_routes.len() >= num_strings {
                break;
            }
            let Some(&(route, node_position)) = position.get(&node) else {
                continue;
            };
            if ruined_routes.contains(&route) {
                continue;
            }
            let route_len = sequences[route].len();
            if route_len == 0 {
                continue;
            }

            let ruin_len = ((random.real() * route_len.min(l_s_max as usize).max(1) as f64).floor() as usize + 1).min(route_len);
            let (window_start, window_len, preserved_start, preserved_len) = self.plan_window(random, route_len, node_position, ruin_len);

            for offset in 0..window_len {
                if preserved_len > 0 && offset >= preserved_start && offset < preserved_start + preserved_len {
                    continue;
                }
                let node_in_window = sequences[route][window_start + offset];
                result.push(solution.customer(node_in_window));
            }

            ruined_routes.insert(route);
        }

        result.sort_unstable();
        result.dedup();
        random.shuffle(&mut result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ruin_rejects_empty_size_configuration() {
        assert!(RandomRuin::new(Vec::new()).is_err());
    }

    #[test]
    fn random_ruin_samples_requested_size() {
        use crate::models::matrix::Matrix;
        use crate::models::primitives::IntType;

        let dm = Matrix::<IntType>::new(5, 5);
        let problem = Problem::new(5, 10, vec![0; 5], dm);
        let solution = Solution::new();
        let context = RouteContext::new();
        let random = Random::from_seed(9);

        let ruin = RandomRuin::new(vec![2]).unwrap();
        let selected = ruin.ruin(&problem, &random, &solution, &context);
        assert_eq!(selected.len(), 2);
        let unique: HashSet<NodeId> = selected.into_iter().collect();
        assert_eq!(unique.len(), 2);
    }

    #[test]
    fn sisrs_ruin_touches_no_more_than_available_routes() {
        use crate::models::matrix::Matrix;
        use crate::models::primitives::IntType;

        let mut dm = Matrix::<IntType>::new(5, 5);
        for i in 0..5 {
            for j in 0..5 {
                dm.set(i, j, (i as IntType - j as IntType).abs());
            }
        }
        let problem = Problem::new(5, 10, vec![0, 1, 1, 1, 1], dm);

        let mut solution = Solution::new();
        let a = solution.insert(1, 1, DEPOT, DEPOT);
        let b = solution.insert(2, 1, a, DEPOT);
        solution.link(a, b);
        let c = solution.insert(3, 1, DEPOT, DEPOT);
        let d = solution.insert(4, 1, c, DEPOT);
        solution.link(c, d);

        let mut context = RouteContext::new();
        context.calc_route_context(&solution);
        let random = Random::from_seed(11);

        let ruin = SisrsRuin::new(2.0, 2, 0.5, 0.5);
        let selected = ruin.ruin(&problem, &random, &solution, &context);
        assert!(selected.iter().all(|&c| (1..5).contains(&c)));
    }
}
