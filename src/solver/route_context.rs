use crate::models::primitives::{IntType, NodeId, DEPOT};
use crate::solver::solution::Solution;

#[derive(Debug, Clone, Copy, Default)]
struct RouteData {
    head: NodeId,
    tail: NodeId,
    load: IntType,
}

/// Per-route head/tail/total-load, plus a per-node running load prefix
/// (the load carried by the vehicle from the route head through that node,
/// inclusive), kept consistent with the `Solution` by explicit
/// recompute/update calls rather than automatically.
#[derive(Debug, Clone, Default)]
pub struct RouteContext {
    routes: Vec<RouteData>,
    /// pre_loads[node] = total load of the route from the head through
    /// (including) `node`; `pre_loads[tail[r]] == load[r]` for every route.
    pre_loads: Vec<IntType>,
}

impl RouteContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    pub fn set_num_routes(&mut self, num_routes: usize) {
        self.routes.truncate(num_routes);
    }

    pub fn head(&self, route: usize) -> NodeId {
        self.routes[route].head
    }

    pub fn tail(&self, route: usize) -> NodeId {
        self.routes[route].tail
    }

    pub fn load(&self, route: usize) -> IntType {
        self.routes[route].load
    }

    pub fn set_head(&mut self, route: usize, head: NodeId) {
        self.routes[route].head = head;
    }

    pub fn add_load(&mut self, route: usize, delta: IntType) {
        self.routes[route].load += delta;
    }

    /// Running load of the route from the head through (including) `node`.
    pub fn pre_load(&self, node: NodeId) -> IntType {
        self.pre_loads.get(node as usize).copied().unwrap_or(0)
    }

    fn ensure_pre_loads(&mut self, max_node: NodeId) {
        if self.pre_loads.len() <= max_node as usize {
            self.pre_loads.resize(max_node as usize + 1, 0);
        }
    }

    /// Appends a new route made of a single node (used right after
    /// Construction seeds a route, or after RVND reinstalls a perturbed
    /// route).
    pub fn add_route(&mut self, head: NodeId, tail: NodeId, load: IntType) -> usize {
        self.routes.push(RouteData { head, tail, load });
        self.routes.len() - 1
    }

    /// Rebuilds head/tail/load/pre-load for every route currently present
    /// in `solution`, replacing all route bookkeeping from scratch.
    pub fn calc_route_context(&mut self, solution: &Solution) {
        self.routes.clear();
        self.ensure_pre_loads(solution.max_node_index());

        for head in solution.route_heads() {
            let mut load = 0;
            let mut node = head;
            let mut tail = head;
            loop {
                load += solution.load(node);
                self.pre_loads[node as usize] = load;
                tail = node;
                let next = solution.successor(node);
                if next == DEPOT {
                    break;
                }
                node = next;
            }
            self.routes.push(RouteData { head, tail, load });
        }
    }

    /// Recomputes tail/load/pre-loads for a single route, walking forward
    /// from the successor of `from` (pass the depot to recompute the whole
    /// route from its head). `from` itself must already carry a correct
    /// pre-load (untouched by whatever edit triggered this call); its
    /// inclusive pre-load is the accumulator the walk resumes from.
    pub fn update_route_context(&mut self, solution: &Solution, route: usize, from: NodeId) {
        self.ensure_pre_loads(solution.max_node_index());

        let (start, mut load) = if from == DEPOT {
            (self.routes[route].head, 0)
        } else {
            (solution.successor(from), self.pre_loads[from as usize])
        };

        let mut node = start;
        let mut tail = start;
        loop {
            load += solution.load(node);
            self.pre_loads[node as usize] = load;
            tail = node;
            let next = solution.successor(node);
            if next == DEPOT {
                break;
            }
            node = next;
        }
        self.routes[route].tail = tail;
        self.routes[route].load = load;
    }

    /// Moves the bookkeeping for `src` into slot `dest` (used while
    /// compacting the route table after routes are removed).
    pub fn move_route_context(&mut self, dest: usize, src: usize) {
        if dest == src {
            return;
        }
        let data = self.routes[src];
        if dest >= self.routes.len() {
            self.routes.resize(dest + 1, RouteData::default());
        }
        self.routes[dest] = data;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calc_route_context_computes_loads_and_tail() {
        let mut solution = Solution::new();
        let a = solution.insert(1, 5, DEPOT, DEPOT);
        solution.link(DEPOT, a);
        let b = solution.insert(2, 3, a, DEPOT);
        solution.link(a, b);
        solution.link(b, DEPOT);

        let mut ctx = RouteContext::new();
        ctx.calc_route_context(&solution);
        assert_eq!(ctx.num_routes(), 1);
        assert_eq!(ctx.head(0), a);
        assert_eq!(ctx.tail(0), b);
        assert_eq!(ctx.load(0), 8);
        assert_eq!(ctx.pre_load(a), 5);
        assert_eq!(ctx.pre_load(b), 8);
        assert_eq!(ctx.pre_load(ctx.tail(0)), ctx.load(0));
    }

    #[test]
    fn update_route_context_resumes_from_an_unmoved_predecessor() {
        let mut solution = Solution::new();
        let a = solution.insert(1, 5, DEPOT, DEPOT);
        solution.link(DEPOT, a);
        let b = solution.insert(2, 3, a, DEPOT);
        solution.link(a, b);
        solution.link(b, DEPOT);

        let mut ctx = RouteContext::new();
        ctx.calc_route_context(&solution);

        let c = solution.insert(3, 2, b, DEPOT);
        solution.link(b, c);
        solution.link(c, DEPOT);
        ctx.update_route_context(&solution, 0, b);

        assert_eq!(ctx.tail(0), c);
        assert_eq!(ctx.load(0), 10);
        assert_eq!(ctx.pre_load(a), 5);
        assert_eq!(ctx.pre_load(b), 8);
        assert_eq!(ctx.pre_load(c), 10);
    }
}
