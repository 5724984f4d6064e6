use crate::models::primitives::IntType;
use crate::solver::delta::Delta;

/// One cached best-move record for an ordered pair of routes: the best
/// delta found so far plus the move details needed to reapply it without
/// recomputation, and whether a recompute is still owed.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub invalidated: bool,
    pub delta: Delta<IntType>,
    pub data: T,
}

impl<T: Default> Default for CacheEntry<T> {
    fn default() -> Self {
        Self {
            invalidated: true,
            delta: Delta::default(),
            data: T::default(),
        }
    }
}

impl<T> CacheEntry<T> {
    /// If the entry is already valid, returns true (nothing to do). If it
    /// needs recomputation, marks it valid, resets its delta, and returns
    /// false so the caller knows to recompute.
    pub fn try_reuse(&mut self) -> bool {
        if !self.invalidated {
            return true;
        }
        self.invalidated = false;
        self.delta = Delta::default();
        false
    }
}

/// A matrix of per-ordered-route-pair `CacheEntry<T>` with a stable slot
/// renaming so that removing/adding routes doesn't require reshuffling
/// every other route's cached data: routes are mapped through an
/// indirection table, and a removed route's slot is recycled by a later
/// `add_route` rather than immediately cleared.
#[derive(Debug, Clone, Default)]
pub struct InterRouteCache<T> {
    matrix: Vec<Vec<CacheEntry<T>>>,
    route_index_mappings: Vec<usize>,
    route_pool: Vec<usize>,
    unused_indices: Vec<usize>,
    max_index: usize,
}

impl<T: Default + Clone> InterRouteCache<T> {
    pub fn reset(&mut self, num_routes: usize) {
        self.matrix = vec![vec![CacheEntry::default(); num_routes]; num_routes];
        self.route_index_mappings = (0..num_routes).collect();
        self.route_pool = (0..num_routes).collect();
        self.unused_indices.clear();
        self.max_index = num_routes;
    }

    fn invalidate_pair(&mut self, a: usize, b: usize) {
        self.matrix[a][b].invalidated = true;
        self.matrix[b][a].invalidated = true;
    }

    pub fn add_route(&mut self, route: usize) {
        let index = if let Some(reused) = self.unused_indices.pop() {
            reused
        } else {
            let index = self.max_index;
            self.max_index += 1;
            for row in &mut self.matrix {
                row.push(CacheEntry::default());
            }
            self.matrix.push(vec![CacheEntry::default(); self.max_index]);
            index
        };
        if self.route_index_mappings.len() <= route {
            self.route_index_mappings.resize(route + 1, 0);
        }
        self.route_index_mappings[route] = index;
        for &other in &self.route_pool.clone() {
            self.invalidate_pair(index, other);
        }
        self.route_pool.push(index);
    }

    pub fn remove_route(&mut self, route: usize) {
        let index = self.route_index_mappings[route];
        self.route_pool.retain(|&r| r != index);
        self.unused_indices.push(index);
    }

    pub fn move_route(&mut self, dest: usize, src: usize) {
        if self.route_index_mappings.len() <= dest {
            self.route_index_mappings.resize(dest + 1, 0);
        }
        self.route_index_mappings[dest] = self.route_index_mappings[src];
    }

    pub fn get(&mut self, route_a: usize, route_b: usize) -> &mut CacheEntry<T> {
        let a = self.route_index_mappings[route_a];
        let b = self.route_index_mappings[route_b];
        &mut self.matrix[a][b]
    }
}
