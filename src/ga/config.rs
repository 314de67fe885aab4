//! GA run configuration.

use serde::{Deserialize, Serialize};

use super::operators::GeneticOperators;
use crate::models::SchedulingGrid;
use crate::validation::{validate_config, ValidationResult};

/// Options for one GA run.
///
/// Defaults: population 100, crossover 0.8, mutation 0.01, 100 generations,
/// a single day of ten slots with no capacity limit, OS-seeded randomness.
///
/// # Example
/// ```
/// use exam_schedule::ga::GaConfig;
/// use exam_schedule::models::SchedulingGrid;
///
/// let config = GaConfig::default()
///     .with_population_size(50)
///     .with_max_generations(200)
///     .with_grid(SchedulingGrid::new(5, 4).with_daily_capacity(6.0))
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Chromosomes per generation (≥ 2).
    pub population_size: usize,
    /// Probability of recombining a selected parent pair, in [0, 1].
    pub crossover_rate: f64,
    /// Probability of mutating each child, in [0, 1].
    pub mutation_rate: f64,
    /// Generation steps after the initial population is scored.
    pub max_generations: usize,
    /// Grid exams are placed on.
    pub grid: SchedulingGrid,
    /// RNG seed. `None` = seeded from the OS.
    pub seed: Option<u64>,
    /// Score each generation on the rayon pool. Without the `parallel`
    /// cargo feature this falls back to sequential scoring (a warning is
    /// logged when the driver is built).
    pub parallel: bool,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            crossover_rate: 0.8,
            mutation_rate: 0.01,
            max_generations: 100,
            grid: SchedulingGrid::default(),
            seed: None,
            parallel: false,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the number of generation steps.
    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the scheduling grid.
    pub fn with_grid(mut self, grid: SchedulingGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Fixes the RNG seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel fitness evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Crossover and mutation operators at the configured rates.
    pub fn operators(&self) -> GeneticOperators {
        GeneticOperators::new(self.crossover_rate, self.mutation_rate)
    }

    /// Checks every option; reports all problems at once.
    pub fn validate(&self) -> ValidationResult {
        validate_config(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = GaConfig::default()
            .with_population_size(20)
            .with_crossover_rate(0.6)
            .with_mutation_rate(0.1)
            .with_max_generations(10)
            .with_seed(7)
            .with_parallel(true);

        assert_eq!(config.population_size, 20);
        assert_eq!(config.max_generations, 10);
        assert_eq!(config.seed, Some(7));
        assert!(config.parallel);
        assert_eq!(config.operators(), GeneticOperators::new(0.6, 0.1));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GaConfig = serde_json::from_str(
            r#"{"population_size": 30, "grid": {"days": 3, "slots_per_day": 2}}"#,
        )
        .unwrap();

        assert_eq!(config.population_size, 30);
        assert_eq!(config.crossover_rate, 0.8);
        assert_eq!(config.grid, SchedulingGrid::new(3, 2));
        assert!(config.seed.is_none());
    }
}
