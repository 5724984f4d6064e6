use crate::constants::STAR_CACHE_SIZE;
use crate::models::primitives::{IntType, NodeId, DEPOT};
use crate::models::problem::Problem;
use crate::solver::delta::Delta;
use crate::solver::route_context::RouteContext;
use crate::solver::solution::Solution;
use crate::utils::Random;

/// A single candidate insertion slot: the cost delta of inserting some
/// customer between `predecessor` and `successor`.
#[derive(Debug, Clone, Copy)]
pub struct Insertion {
    pub delta: Delta<IntType>,
    pub predecessor: NodeId,
    pub successor: NodeId,
}

impl Default for Insertion {
    fn default() -> Self {
        Self {
            delta: Delta::new(IntType::MAX, -1),
            predecessor: DEPOT,
            successor: DEPOT,
        }
    }
}

/// The best `STAR_CACHE_SIZE` insertion slots for one customer into one
/// route, ranked ascending by delta with reservoir tie-breaking at each
/// rank.
#[derive(Debug, Clone, Copy)]
pub struct BestInsertion {
    insertions: [Insertion; STAR_CACHE_SIZE],
}

impl Default for BestInsertion {
    fn default() -> Self {
        Self {
            insertions: [Insertion::default(); STAR_CACHE_SIZE],
        }
    }
}

impl BestInsertion {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Offers a candidate insertion, shifting worse-ranked slots down and
    /// reservoir-sampling among equal-cost candidates at a rank.
    pub fn add(&mut self, random: &Random, delta: IntType, predecessor: NodeId, successor: NodeId) {
        for i in 0..STAR_CACHE_SIZE {
            let slot = &mut self.insertions[i];
            if slot.delta.counter == -1 {
                slot.delta = Delta::new(delta, 1);
                slot.predecessor = predecessor;
                slot.successor = successor;
                return;
            }
            if delta < slot.delta.value {
                for j in (i + 1..STAR_CACHE_SIZE).rev() {
                    self.insertions[j] = self.insertions[j - 1];
                }
                let slot = &mut self.insertions[i];
                slot.delta = Delta::new(delta, 1);
                slot.predecessor = predecessor;
                slot.successor = successor;
                return;
            }
            if delta == slot.delta.value {
                slot.delta.counter += 1;
                if random.range_usize(0, slot.delta.counter as usize) == 0 {
                    slot.predecessor = predecessor;
                    slot.successor = successor;
                }
                return;
            }
        }
    }

    pub fn find_best(&self) -> &Insertion {
        &self.insertions[0]
    }

    /// The best-ranked insertion whose predecessor and successor both
    /// differ from `node` (used when `node` is about to be removed from
    /// this route and the cached slots might reference it).
    pub fn find_best_without_node(&self, node: NodeId) -> Option<&Insertion> {
        self.insertions
            .iter()
            .find(|slot| slot.delta.counter > 0 && slot.predecessor != node && slot.successor != node)
    }
}

fn insertion_delta(problem: &Problem, customer: NodeId, predecessor: NodeId, successor: NodeId) -> IntType {
    problem.distance(customer, predecessor) + problem.distance(customer, successor)
        - problem.distance(predecessor, successor)
}

/// Per-route best-insertion cache for every customer: `Get(route,
/// customer)` is consulted by SwapStar-family operators to find where a
/// node vacated from elsewhere would best re-enter a route without
/// rescanning the whole route.
#[derive(Debug, Clone, Default)]
pub struct StarCaches {
    /// routes[route][customer] = cached best insertions, empty until
    /// `preprocess` is called for that route this cycle.
    routes: Vec<Vec<BestInsertion>>,
    /// Snapshot of each route's node sequence (by customer), used to
    /// detect whether the route actually changed since the last
    /// preprocess.
    snapshots: Vec<Vec<NodeId>>,
    preprocessed: Vec<bool>,
    num_customers: usize,
}

impl StarCaches {
    pub fn reset(&mut self, num_routes: usize, num_customers: usize) {
        self.num_customers = num_customers;
        self.routes = vec![vec![BestInsertion::default(); num_customers]; num_routes];
        self.snapshots = vec![Vec::new(); num_routes];
        self.preprocessed = vec![false; num_routes];
    }

    pub fn add_route(&mut self, route: usize) {
        if route >= self.routes.len() {
            self.routes.resize(route + 1, vec![BestInsertion::default(); self.num_customers]);
            self.snapshots.resize(route + 1, Vec::new());
            self.preprocessed.resize(route + 1, false);
        }
        self.preprocessed[route] = false;
        self.snapshots[route].clear();
    }

    pub fn remove_route(&mut self, route: usize) {
        if route < self.preprocessed.len() {
            self.preprocessed[route] = false;
        }
    }

    pub fn move_route(&mut self, dest: usize, src: usize) {
        if dest == src {
            return;
        }
        self.ensure_len(dest.max(src) + 1);
        self.routes[dest] = std::mem::take(&mut self.routes[src]);
        self.snapshots[dest] = std::mem::take(&mut self.snapshots[src]);
        self.preprocessed[dest] = self.preprocessed[src];
    }

    fn ensure_len(&mut self, len: usize) {
        if self.routes.len() < len {
            self.routes.resize(len, vec![BestInsertion::default(); self.num_customers]);
            self.snapshots.resize(len, Vec::new());
            self.preprocessed.resize(len, false);
        }
    }

    fn live_sequence(&self, solution: &Solution, context: &RouteContext, route: usize) -> Vec<NodeId> {
        let mut sequence = Vec::new();
        if context.num_routes() <= route {
            return sequence;
        }
        let head = context.head(route);
        if head == DEPOT {
            return sequence;
        }
        let mut node = head;
        loop {
            sequence.push(solution.customer(node));
            let next = solution.successor(node);
            if next == DEPOT {
                break;
            }
            node = next;
        }
        sequence
    }

    /// Rebuilds the cache for `route` unless the route's customer sequence
    /// is unchanged since the last preprocess (a no-op fast path so
    /// repeated operator passes in the same RVND round don't redo this
    /// work).
    pub fn preprocess(
        &mut self,
        problem: &Problem,
        random: &Random,
        solution: &Solution,
        context: &RouteContext,
        route: usize,
    ) {
        self.ensure_len(route + 1);
        let live = self.live_sequence(solution, context, route);
        if self.preprocessed[route] && self.snapshots[route] == live {
            return;
        }

        for entry in &mut self.routes[route] {
            entry.reset();
        }

        if !live.is_empty() {
            // Walk consecutive node pairs along the route, from (depot,
            // head) through (tail, depot); customer(DEPOT) is always 0, so
            // the depot endpoints need no special-casing.
            let head = context.head(route);
            let mut predecessor = DEPOT;
            let mut current = head;
            loop {
                let predecessor_customer = solution.customer(predecessor);
                let current_customer = solution.customer(current);
                for customer in 1..self.num_customers as NodeId {
                    let delta = insertion_delta(problem, customer, predecessor_customer, current_customer);
                    self.routes[route][customer as usize].add(random, delta, predecessor, current);
                }
                if current == DEPOT {
                    break;
                }
                predecessor = current;
                current = solution.successor(current);
            }
        }

        self.snapshots[route] = live;
        self.preprocessed[route] = true;
    }

    pub fn get(&self, route: usize, customer: NodeId) -> &BestInsertion {
        &self.routes[route][customer as usize]
    }
}
