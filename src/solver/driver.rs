use std::time::Duration;

use crate::config::{AcceptanceRuleKind, Config};
use crate::models::primitives::{IntType, NodeId, DEPOT};
use crate::models::problem::Problem;
use crate::solver::acceptance::{AcceptanceRule, HillClimbing, HillClimbingWithEqual, Lahc, SimulatedAnnealing};
use crate::solver::cache::CacheRegistry;
use crate::solver::construction::construct;
use crate::solver::customer_sorter::CustomerSorter;
use crate::solver::listener::Listener;
use crate::solver::operators::inter::default_inter_operators;
use crate::solver::operators::intra::default_intra_operators;
use crate::solver::route_context::RouteContext;
use crate::solver::route_head_guard::RouteHeadGuard;
use crate::solver::ruin::{RandomRuin, RuinMethod, SisrsRuin};
use crate::solver::rvnd::{intra_route_search, run_rvnd};
use crate::solver::solution::Solution;
use crate::solver::split_reinsertion::split_reinsertion;
use crate::utils::Random;

fn instantiate_acceptance_rule(config: &Config, initial_objective: IntType) -> Box<dyn AcceptanceRule> {
    match config.acceptance_rule {
        AcceptanceRuleKind::HillClimbing => Box::new(HillClimbing::new(initial_objective)),
        AcceptanceRuleKind::HillClimbingWithEqual => Box::new(HillClimbingWithEqual::new(initial_objective)),
        AcceptanceRuleKind::Lahc => Box::new(Lahc::new(initial_objective, config.lahc_length)),
        AcceptanceRuleKind::SimulatedAnnealing => Box::new(SimulatedAnnealing::new(initial_objective, config.sa_initial_temperature, config.sa_decay)),
    }
}

fn build_ruin_methods(config: &Config) -> Vec<Box<dyn RuinMethod>> {
    let mut methods: Vec<Box<dyn RuinMethod>> = Vec::new();
    if config.use_random_ruin {
        match RandomRuin::new(config.random_ruin_sizes.clone()) {
            Ok(ruin) => methods.push(Box::new(ruin)),
            Err(error) => log::warn!("skipping RandomRuin: {error}"),
        }
    }
    if config.use_sisrs_ruin {
        methods.push(Box::new(SisrsRuin::new(
            config.sisrs_avg_customers,
            config.sisrs_max_len,
            config.sisrs_split_rate,
            config.sisrs_preserved_prob,
        )));
    }
    assert!(!methods.is_empty(), "no ruin method is enabled in the config");
    methods
}

/// Removes every node-slot occurrence of `customer` from every route,
/// keeping head and route context consistent.
fn remove_all_occurrences(solution: &mut Solution, context: &mut RouteContext, customer: NodeId) {
    for route in 0..context.num_routes() {
        let head = context.head(route);
        if head == DEPOT {
            continue;
        }
        let mut to_remove = Vec::new();
        let mut node = head;
        loop {
            if solution.customer(node) == customer {
                to_remove.push(node);
            }
            let next = solution.successor(node);
            if next == DEPOT {
                break;
            }
            node = next;
        }
        if to_remove.is_empty() {
            continue;
        }

        let guard = RouteHeadGuard::open(solution, context, route);
        for node in to_remove {
            solution.remove(node);
        }
        guard.close(solution, context);
        context.update_route_context(solution, route, DEPOT);
    }
}

fn perturb(problem: &Problem, random: &Random, solution: &mut Solution, context: &mut RouteContext, ruin_methods: &[Box<dyn RuinMethod>], sorter: &CustomerSorter, blink_rate: f64) {
    context.calc_route_context(solution);
    let ruin_method = &ruin_methods[random.range_usize(0, ruin_methods.len())];
    let mut customers = ruin_method.ruin(problem, random, solution, context);
    sorter.sort(problem, random, &mut customers);

    for customer in customers {
        let demand = problem.demand(customer);
        remove_all_occurrences(solution, context, customer);
        split_reinsertion(problem, random, solution, context, customer, demand, blink_rate);
    }
}

/// Runs the outer restart loop until `config.time_limit` elapses (or
/// `config.max_iterations` restarts have happened), returning the best
/// solution found and its objective.
pub fn solve(problem: &Problem, config: &Config, random: &Random, listener: &mut dyn Listener) -> (Solution, IntType) {
    let time_limit = Duration::from_secs(config.time_limit);
    let start = instant::Instant::now();
    listener.on_start();

    let ruin_methods = build_ruin_methods(config);
    let sorter = CustomerSorter::new(config.sorter_random_weight, config.sorter_demand_weight, config.sorter_far_weight, config.sorter_close_weight);
    let intra_operators = default_intra_operators();

    let stagnation_bound = config.stagnation_cap.min(problem.num_customers as u64 * problem.fleet_lower_bound() as u64);

    let mut best_solution: Option<Solution> = None;
    let mut best_objective = IntType::MAX;
    let mut outer_iterations: u64 = 0;

    while start.elapsed() < time_limit {
        if let Some(max) = config.max_iterations {
            if outer_iterations >= max {
                break;
            }
        }
        outer_iterations += 1;

        let (mut accepted_solution, mut accepted_context) = construct(problem, random);
        let mut current_objective = accepted_solution.calc_objective(problem);
        let mut acceptance = instantiate_acceptance_rule(config, current_objective);
        let mut inter_operators = default_inter_operators();
        let mut registry = CacheRegistry::default();
        let mut stagnation: u64 = 0;

        if current_objective < best_objective {
            best_objective = current_objective;
            best_solution = Some(accepted_solution.clone());
            listener.on_updated(start.elapsed(), &accepted_solution, best_objective);
        }

        while stagnation < stagnation_bound && start.elapsed() < time_limit {
            let mut working_solution = accepted_solution.clone();
            let mut working_context = accepted_context.clone();
            working_context.calc_route_context(&working_solution);

            for route in 0..working_context.num_routes() {
                intra_route_search(problem, random, &mut working_solution, &mut working_context, &mut registry.star, &intra_operators, route);
            }
            run_rvnd(problem, random, &mut working_solution, &mut working_context, &mut registry, &mut inter_operators, &intra_operators);

            let new_objective = working_solution.calc_objective(problem);

            let mut stagnated = true;
            if new_objective < current_objective {
                stagnated = false;
            }
            if new_objective < best_objective {
                best_objective = new_objective;
                best_solution = Some(working_solution.clone());
                listener.on_updated(start.elapsed(), &working_solution, best_objective);
            }

            if acceptance.accept(random, new_objective) {
                current_objective = new_objective;
                accepted_solution = working_solution;
                accepted_context = working_context;
            }

            if stagnated {
                stagnation += 1;
            } else {
                stagnation = 0;
            }

            perturb(problem, random, &mut accepted_solution, &mut accepted_context, &ruin_methods, &sorter, config.blink_rate);
        }
    }

    let best_solution = best_solution.expect("at least one outer restart always runs while time remains");
    listener.on_end(start.elapsed(), &best_solution, best_objective);
    (best_solution, best_objective)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::matrix::Matrix;
    use crate::solver::listener::LoggingListener;

    fn line_problem(n: usize, capacity: IntType) -> Problem {
        let mut dm = Matrix::<IntType>::new(n, n);
        for i in 0..n {
            for j in 0..n {
                dm.set(i, j, (i as IntType - j as IntType).abs());
            }
        }
        Problem::new(n as NodeId, capacity, vec![0; n], dm)
    }

    #[test]
    fn solve_serves_all_demand_within_a_short_time_budget() {
        let problem = line_problem(8, 10);
        let mut config = Config::default();
        config.time_limit = 1;
        config.deterministic = true;
        config.seed = 5;
        let random = Random::from_seed(5);
        let mut listener = LoggingListener::default();

        let (solution, objective) = solve(&problem, &config, &random, &mut listener);
        assert!(objective >= 0);

        let mut served = vec![0; 8];
        for &node in solution.node_indices() {
            served[solution.customer(node) as usize] += solution.load(node);
        }
        for customer in 1..8 {
            assert_eq!(served[customer], problem.demand(customer as NodeId));
        }
    }
}
