use crate::models::primitives::{IntType, NodeId, DEPOT};
use crate::solver::cache::inter_route::InterRouteCache;
use crate::solver::operators::inter::InterOperator;
use crate::solver::state::SearchState;

/// Segment descriptor: a contiguous run of `len` nodes on a route,
/// identified by its boundary nodes so it can be spliced out/in.
#[derive(Debug, Clone, Copy)]
struct Segment {
    head: NodeId,
    tail: NodeId,
    predecessor: NodeId,
    successor: NodeId,
    demand: IntType,
}

fn segments(state: &SearchState, route: usize, len: usize) -> Vec<Segment> {
    let mut nodes = Vec::new();
    let head = state.context.head(route);
    if head == DEPOT {
        return Vec::new();
    }
    let mut node = head;
    loop {
        nodes.push(node);
        let next = state.solution.successor(node);
        if next == DEPOT {
            break;
        }
        node = next;
    }
    if nodes.len() < len.max(1) {
        return Vec::new();
    }
    let mut out = Vec::new();
    for start in 0..=(nodes.len() - len.max(1)) {
        let seg_head = nodes[start];
        let seg_tail = nodes[start + len.max(1) - 1];
        let demand: IntType = nodes[start..start + len.max(1)]
            .iter()
            .map(|&n| state.solution.load(n))
            .sum();
        out.push(Segment {
            head: seg_head,
            tail: seg_tail,
            predecessor: state.solution.predecessor(seg_head),
            successor: state.solution.successor(seg_tail),
            demand,
        });
    }
    out
}

#[derive(Debug, Clone, Default)]
pub struct SwapMove {
    seg_x: Option<SegmentSnapshot>,
    seg_y: Option<SegmentSnapshot>,
    insert_predecessor: NodeId,
    insert_successor: NodeId,
    reverse_x: bool,
    reverse_y: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct SegmentSnapshot {
    head: NodeId,
    tail: NodeId,
    predecessor: NodeId,
    successor: NodeId,
}

impl From<Segment> for SegmentSnapshot {
    fn from(s: Segment) -> Self {
        Self {
            head: s.head,
            tail: s.tail,
            predecessor: s.predecessor,
            successor: s.successor,
        }
    }
}

/// Exchanges a segment of `len_x` consecutive customers on one route for a
/// segment of `len_y` on another (or, when `len_y == 0`, relocates the
/// `len_x` segment into the other route without taking anything back).
pub struct Swap {
    len_x: usize,
    len_y: usize,
    cache: InterRouteCache<SwapMove>,
}

impl Swap {
    pub fn new(len_x: usize, len_y: usize) -> Self {
        Self {
            len_x,
            len_y,
            cache: InterRouteCache::default(),
        }
    }

    fn edge_cost(problem: &crate::models::problem::Problem, solution: &crate::solver::solution::Solution, a: NodeId, b: NodeId) -> IntType {
        problem.distance(solution.customer(a), solution.customer(b))
    }

    fn best_between(&self, state: &SearchState, route_x: usize, route_y: usize) -> Option<(IntType, SwapMove)> {
        let problem = state.problem;
        let solution = state.solution;
        let segs_x = segments(state, route_x, self.len_x);
        let mut best: Option<(IntType, SwapMove)> = None;

        if self.len_y == 0 {
            // shift: relocate segment x into route_y at every boundary.
            let mut y_nodes = vec![DEPOT];
            if let Some(head) = Some(state.context.head(route_y)).filter(|&h| h != DEPOT) {
                let mut node = head;
                loop {
                    y_nodes.push(node);
                    let next = solution.successor(node);
                    if next == DEPOT {
                        break;
                    }
                    node = next;
                }
            }
            y_nodes.push(DEPOT);

            for seg in &segs_x {
                if state.context.load(route_y) + seg.demand > problem.capacity {
                    continue;
                }
                let removed = Self::edge_cost(problem, solution, seg.predecessor, seg.head)
                    + Self::edge_cost(problem, solution, seg.tail, seg.successor);
                let bridge = Self::edge_cost(problem, solution, seg.predecessor, seg.successor);
                let removal_gain = bridge - removed;

                for window in y_nodes.windows(2) {
                    let (insert_predecessor, insert_successor) = (window[0], window[1]);
                    let base = Self::edge_cost(problem, solution, insert_predecessor, insert_successor);
                    for reverse_x in [false, true] {
                        if reverse_x && self.len_x < 2 {
                            continue;
                        }
                        let (first, last) = if reverse_x { (seg.tail, seg.head) } else { (seg.head, seg.tail) };
                        let insertion = Self::edge_cost(problem, solution, insert_predecessor, first)
                            + Self::edge_cost(problem, solution, last, insert_successor)
                            - base;
                        let delta = removal_gain + insertion;
                        if best.as_ref().map_or(true, |(d, _)| delta < *d) {
                            best = Some((
                                delta,
                                SwapMove {
                                    seg_x: Some((*seg).into()),
                                    seg_y: None,
                                    insert_predecessor,
                                    insert_successor,
                                    reverse_x,
                                    reverse_y: false,
                                },
                            ));
                        }
                    }
                }
            }
            return best;
        }

        let segs_y = segments(state, route_y, self.len_y);
        for seg_x in &segs_x {
            for seg_y in &segs_y {
                // segments must not overlap when route_x == route_y
                if route_x == route_y {
                    let xs = [seg_x.head, seg_x.tail];
                    if xs.contains(&seg_y.head) || xs.contains(&seg_y.tail) {
                        continue;
                    }
                }
                let load_x_after = state.context.load(route_x) - seg_x.demand + seg_y.demand;
                let load_y_after = state.context.load(route_y) - seg_y.demand + seg_x.demand;
                if load_x_after > problem.capacity || load_y_after > problem.capacity {
                    continue;
                }

                let removed = Self::edge_cost(problem, solution, seg_x.predecessor, seg_x.head)
                    + Self::edge_cost(problem, solution, seg_x.tail, seg_x.successor)
                    + Self::edge_cost(problem, solution, seg_y.predecessor, seg_y.head)
                    + Self::edge_cost(problem, solution, seg_y.tail, seg_y.successor);

                for reverse_x in [false, true] {
                    if reverse_x && self.len_x < 2 {
                        continue;
                    }
                    for reverse_y in [false, true] {
                        if reverse_y && self.len_y < 2 {
                            continue;
                        }
                        let (xf, xl) = if reverse_x { (seg_x.tail, seg_x.head) } else { (seg_x.head, seg_x.tail) };
                        let (yf, yl) = if reverse_y { (seg_y.tail, seg_y.head) } else { (seg_y.head, seg_y.tail) };
                        let added = Self::edge_cost(problem, solution, seg_x.predecessor, yf)
                            + Self::edge_cost(problem, solution, yl, seg_x.successor)
                            + Self::edge_cost(problem, solution, seg_y.predecessor, xf)
                            + Self::edge_cost(problem, solution, xl, seg_y.successor);
                        let delta = added - removed;
                        if best.as_ref().map_or(true, |(d, _)| delta < *d) {
                            best = Some((
                                delta,
                                SwapMove {
                                    seg_x: Some((*seg_x).into()),
                                    seg_y: Some((*seg_y).into()),
                                    insert_predecessor: DEPOT,
                                    insert_successor: DEPOT,
                                    reverse_x,
                                    reverse_y,
                                },
                            ));
                        }
                    }
                }
            }
        }
        best
    }

    fn apply_move(state: &mut SearchState, route_x: usize, route_y: usize, mv: &SwapMove) {
        let solution = &mut *state.solution;
        let seg_x = mv.seg_x.expect("swap move always carries segment x");

        if let Some(seg_y) = mv.seg_y {
            solution.link(seg_x.predecessor, seg_x.successor);
            solution.link(seg_y.predecessor, seg_y.successor);
            if mv.reverse_y {
                solution.reversed_link(seg_y.head, seg_y.tail, seg_x.predecessor, seg_x.successor);
            } else {
                solution.link(seg_x.predecessor, seg_y.head);
                solution.link(seg_y.tail, seg_x.successor);
            }
            if mv.reverse_x {
                solution.reversed_link(seg_x.head, seg_x.tail, seg_y.predecessor, seg_y.successor);
            } else {
                solution.link(seg_y.predecessor, seg_x.head);
                solution.link(seg_x.tail, seg_y.successor);
            }
        } else {
            solution.link(seg_x.predecessor, seg_x.successor);
            if mv.reverse_x {
                solution.reversed_link(seg_x.head, seg_x.tail, mv.insert_predecessor, mv.insert_successor);
            } else {
                solution.link(mv.insert_predecessor, seg_x.head);
                solution.link(seg_x.tail, mv.insert_successor);
            }
        }

        // A segment swap/shift can move the head of either route; a full
        // recompute is simplest and this runs only on an accepted move.
        state.context.calc_route_context(state.solution);
        let _ = (route_x, route_y);
    }
}

impl InterOperator for Swap {
    fn name(&self) -> &'static str {
        "swap"
    }

    fn apply(&mut self, state: &mut SearchState, routes: &[usize]) -> Vec<usize> {
        let mut best: Option<(IntType, usize, usize, SwapMove)> = None;
        for &route_x in routes {
            for &route_y in routes {
                if route_x == route_y {
                    continue;
                }
                // A symmetric segment length pairing (same length each
                // side) only needs one direction per unordered pair.
                if self.len_x == self.len_y && route_y <= route_x {
                    continue;
                }

                let entry = self.cache.get(route_x, route_y);
                if entry.try_reuse() {
                    if entry.delta.value < 0 {
                        let mv = entry.data.clone();
                        if best.as_ref().map_or(true, |(d, ..)| entry.delta.value < *d) {
                            best = Some((entry.delta.value, route_x, route_y, mv));
                        }
                    }
                    continue;
                }
                if let Some((delta, mv)) = self.best_between(state, route_x, route_y) {
                    let entry = self.cache.get(route_x, route_y);
                    entry.delta.value = delta;
                    entry.delta.counter = 1;
                    entry.data = mv.clone();
                    if delta < 0 && best.as_ref().map_or(true, |(d, ..)| delta < *d) {
                        best = Some((delta, route_x, route_y, mv));
                    }
                }
            }
        }

        if let Some((_, route_x, route_y, mv)) = best {
            Self::apply_move(state, route_x, route_y, &mv);
            vec![route_x, route_y]
        } else {
            Vec::new()
        }
    }

    fn reset_cache(&mut self, num_routes: usize) {
        self.cache.reset(num_routes);
    }

    fn add_route(&mut self, route: usize) {
        self.cache.add_route(route);
    }

    fn remove_route(&mut self, route: usize) {
        self.cache.remove_route(route);
    }

    fn move_route(&mut self, dest: usize, src: usize) {
        self.cache.move_route(dest, src);
    }
}
