use crate::models::primitives::IntType;
use crate::utils::Random;

/// Decides whether the outer loop's current solution is replaced by a
/// freshly produced candidate. Holds its own notion of "the solution
/// currently held", since a rule such as LAHC accepts/rejects relative to
/// history it privately tracks, not just the immediately preceding value.
pub trait AcceptanceRule {
    fn accept(&mut self, random: &Random, new_objective: IntType) -> bool;
}

/// Accepts only strict improvements.
pub struct HillClimbing {
    current: IntType,
}

impl HillClimbing {
    pub fn new(initial_objective: IntType) -> Self {
        Self { current: initial_objective }
    }
}

impl AcceptanceRule for HillClimbing {
    fn accept(&mut self, _random: &Random, new_objective: IntType) -> bool {
        if new_objective < self.current {
            self.current = new_objective;
            true
        } else {
            false
        }
    }
}

/// Accepts improvements and ties.
pub struct HillClimbingWithEqual {
    current: IntType,
}

impl HillClimbingWithEqual {
    pub fn new(initial_objective: IntType) -> Self {
        Self { current: initial_objective }
    }
}

impl AcceptanceRule for HillClimbingWithEqual {
    fn accept(&mut self, _random: &Random, new_objective: IntType) -> bool {
        if new_objective <= self.current {
            self.current = new_objective;
            true
        } else {
            false
        }
    }
}

/// Late-Acceptance Hill-Climbing: accepts a candidate that beats the
/// current value or that beats the value accepted `length` iterations ago,
/// tracked in a ring buffer initialised to +infinity.
pub struct Lahc {
    current: IntType,
    history: Vec<IntType>,
    position: usize,
}

impl Lahc {
    pub fn new(initial_objective: IntType, length: usize) -> Self {
        assert!(length > 0, "LAHC history length must be positive");
        Self {
            current: initial_objective,
            history: vec![IntType::MAX; length],
            position: 0,
        }
    }
}

impl AcceptanceRule for Lahc {
    fn accept(&mut self, _random: &Random, new_objective: IntType) -> bool {
        let accepted = new_objective <= self.current || new_objective < self.history[self.position];
        if accepted {
            self.current = new_objective;
        }
        if self.current < self.history[self.position] {
            self.history[self.position] = self.current;
        }
        self.position = (self.position + 1) % self.history.len();
        accepted
    }
}

/// Simulated Annealing: always accepts improvements and ties, otherwise
/// accepts a worsening move with probability `exp((old-new)/temperature)`;
/// the temperature decays geometrically after every call.
pub struct SimulatedAnnealing {
    current: IntType,
    temperature: f64,
    decay: f64,
}

impl SimulatedAnnealing {
    pub fn new(initial_objective: IntType, initial_temperature: f64, decay: f64) -> Self {
        Self {
            current: initial_objective,
            temperature: initial_temperature,
            decay,
        }
    }
}

impl AcceptanceRule for SimulatedAnnealing {
    fn accept(&mut self, random: &Random, new_objective: IntType) -> bool {
        let accepted = new_objective <= self.current
            || random.real() < (((self.current - new_objective) as f64) / self.temperature).exp();
        if accepted {
            self.current = new_objective;
        }
        self.temperature *= self.decay;
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hill_climbing_rejects_equal_and_worse() {
        let random = Random::from_seed(1);
        let mut rule = HillClimbing::new(100);
        assert!(!rule.accept(&random, 100));
        assert!(!rule.accept(&random, 101));
        assert!(rule.accept(&random, 99));
    }

    #[test]
    fn hill_climbing_with_equal_accepts_ties() {
        let random = Random::from_seed(1);
        let mut rule = HillClimbingWithEqual::new(100);
        assert!(rule.accept(&random, 100));
    }

    #[test]
    fn lahc_accepts_against_stale_history_entry() {
        let random = Random::from_seed(1);
        let mut rule = Lahc::new(100, 3);
        // First 3 calls compare against +infinity in the buffer, so a
        // worsening move is still accepted until the buffer wraps.
        assert!(rule.accept(&random, 110));
        assert!(rule.accept(&random, 120));
        assert!(rule.accept(&random, 130));
    }

    #[test]
    fn simulated_annealing_always_accepts_improvement() {
        let random = Random::from_seed(1);
        let mut rule = SimulatedAnnealing::new(100, 10.0, 0.99);
        assert!(rule.accept(&random, 50));
    }
}
