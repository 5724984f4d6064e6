use crate::models::primitives::DEPOT;
use crate::solver::route_context::RouteContext;
use crate::solver::solution::Solution;

/// Scratch-space token for rewriting a route's head end.
///
/// `open` scribbles the route's current head into the depot's successor
/// slot so operators can relink the head end through ordinary
/// `link`/`reversed_link` calls without special-casing "is this the first
/// node". `close` reads the depot's successor back out and installs it as
/// the route's new head. The two calls bracket a scope the way the
/// teacher's C++ destructor-based guard does, but as an explicit pair
/// rather than a `Drop` impl: a `Drop` guard would need to borrow both
/// `Solution` and `RouteContext` for its lifetime, which conflicts with the
/// operator code that needs to mutate `Solution` freely inside the scope.
pub struct RouteHeadGuard {
    route: usize,
}

impl RouteHeadGuard {
    pub fn open(solution: &mut Solution, context: &RouteContext, route: usize) -> Self {
        let head = context.head(route);
        solution.set_successor(DEPOT, head);
        Self { route }
    }

    pub fn close(self, solution: &Solution, context: &mut RouteContext) {
        let head = solution.successor(DEPOT);
        context.set_head(self.route, head);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_installs_new_head_on_close() {
        let mut solution = Solution::new();
        let a = solution.insert(1, 1, DEPOT, DEPOT);
        solution.link(DEPOT, a);
        solution.link(a, DEPOT);
        let mut context = RouteContext::new();
        context.calc_route_context(&solution);

        let b = solution.insert(2, 1, DEPOT, a);
        let guard = RouteHeadGuard::open(&mut solution, &context, 0);
        solution.link(DEPOT, b);
        solution.link(b, a);
        guard.close(&solution, &mut context);
        assert_eq!(context.head(0), b);
    }
}
