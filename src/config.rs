use std::fs::File;
use std::io::BufReader;

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::models::FloatType;

/// Selects which of the four acceptance rules (ambient §4.9) the outer loop
/// instantiates fresh at every restart.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceRuleKind {
    HillClimbing,
    HillClimbingWithEqual,
    Lahc,
    SimulatedAnnealing,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    // General
    pub problem_instance: String,
    pub output_path: String,
    pub time_limit: u64,
    pub max_iterations: Option<u64>,
    pub stagnation_cap: u64,

    // Randomization
    pub deterministic: bool,
    pub seed: u64,

    // Perturbation
    pub blink_rate: FloatType,

    // Customer sorter weights
    pub sorter_random_weight: FloatType,
    pub sorter_demand_weight: FloatType,
    pub sorter_far_weight: FloatType,
    pub sorter_close_weight: FloatType,

    // Ruin methods
    pub use_random_ruin: bool,
    pub random_ruin_sizes: Vec<usize>,
    pub use_sisrs_ruin: bool,
    pub sisrs_avg_customers: FloatType,
    pub sisrs_max_len: usize,
    pub sisrs_split_rate: FloatType,
    pub sisrs_preserved_prob: FloatType,

    // Acceptance
    pub acceptance_rule: AcceptanceRuleKind,
    pub lahc_length: usize,
    pub sa_initial_temperature: FloatType,
    pub sa_decay: FloatType,
}

impl Config {
    pub fn default() -> Self {
        Self {
            // General
            problem_instance: String::new(),
            output_path: String::from("output.sol"),
            time_limit: 60,
            max_iterations: None,
            stagnation_cap: crate::constants::MAX_STAGNATION_CAP,

            // Randomization
            deterministic: false,
            seed: 1,

            // Perturbation
            blink_rate: 0.01,

            // Customer sorter weights
            sorter_random_weight: 1.0,
            sorter_demand_weight: 1.0,
            sorter_far_weight: 1.0,
            sorter_close_weight: 1.0,

            // Ruin methods
            use_random_ruin: true,
            random_ruin_sizes: vec![5, 10, 15, 20],
            use_sisrs_ruin: true,
            sisrs_avg_customers: 10.0,
            sisrs_max_len: 10,
            sisrs_split_rate: 0.5,
            sisrs_preserved_prob: 0.5,

            // Acceptance
            acceptance_rule: AcceptanceRuleKind::Lahc,
            lahc_length: 50,
            sa_initial_temperature: 100.0,
            sa_decay: 0.999,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Overlays the handful of settings the CLI can override directly,
    /// without going through the YAML patch path.
    pub fn update_from_args(&mut self, args: &crate::cli::Args) {
        if let Some(output_path) = &args.output_path {
            self.output_path = output_path.clone();
        }
        if let Some(time_limit) = args.time_limit {
            self.time_limit = time_limit;
        }
        if let Some(max_iterations) = args.max_iterations {
            self.max_iterations = Some(max_iterations);
        }
        if let Some(seed) = args.seed {
            self.deterministic = true;
            self.seed = seed;
        }
    }

    fn read_yaml_file(filepath: &str) -> Result<Value> {
        let file = File::open(filepath).with_context(|| format!("cannot open config file {filepath}"))?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader).with_context(|| format!("failed to parse config file {filepath}"))
    }

    pub fn load_yaml_file(filepath: &str) -> Result<Self> {
        let mut config = Self::default();
        config.patch(&Self::read_yaml_file(filepath)?);
        Ok(config)
    }

    pub fn patch_from_yaml_file(&mut self, filepath: &str) -> Result<()> {
        self.patch(&Self::read_yaml_file(filepath)?);
        Ok(())
    }

    /// Serializes the current config to a YAML mapping, overwrites every key
    /// present in `values`, then deserializes the result back. Lets a patch
    /// file override a handful of fields without repeating the rest.
    pub fn patch(&mut self, values: &Value) {
        let mut config_value = serde_yaml::to_value(&*self).expect("failed to serialize config");
        match (&mut config_value, values) {
            (Value::Mapping(config_map), Value::Mapping(patch_map)) => {
                for (key, value) in patch_map {
                    config_map.insert(key.clone(), value.clone());
                }
            }
            _ => panic!("cannot patch Config as YAML value is not a mapping"),
        }
        *self = serde_yaml::from_value(config_value).expect("failed to deserialize patched config");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_overrides_only_named_fields() {
        let mut config = Config::default();
        let patch: Value = serde_yaml::from_str("time_limit: 120\nseed: 42\n").unwrap();
        config.patch(&patch);
        assert_eq!(config.time_limit, 120);
        assert_eq!(config.seed, 42);
        assert_eq!(config.blink_rate, Config::default().blink_rate);
    }
}
