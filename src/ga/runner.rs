//! Generational GA driver.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized → Initialized → Evaluating
//!     → (Selecting → Recombining → Mutating → Replaced → Evaluating)*
//!     → Terminated
//! ```
//!
//! Each generation step selects parent pairs by roulette wheel, recombines
//! and mutates them until the next population is full, truncates it to
//! exactly `population_size`, replaces the current population and scores
//! it. The run stops after exactly `max_generations` steps; there is no
//! fitness-based early exit.
//!
//! # Randomness
//! One seeded [`SmallRng`] is threaded through every stochastic call in a
//! fixed order, so equal seeds, configs and problems give equal runs.

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;

use super::operators::{roulette_select, GeneticOperators};
use super::{
    ExamChromosome, FitnessEvaluator, GaConfig, GenerationStats, Population, RunStatistics,
    ViolationCounter,
};
use crate::error::GaError;
use crate::models::{ExamProblem, Slot};

/// Driver lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GaState {
    /// Constructed; no population yet.
    Uninitialized,
    /// Population seeded but not scored.
    Initialized,
    /// Current population scored and recorded.
    Evaluating,
    /// Picking parents for the next population.
    Selecting,
    /// Applying crossover.
    Recombining,
    /// Applying mutation.
    Mutating,
    /// Next population installed, not yet scored.
    Replaced,
    /// Run finished; results available.
    Terminated,
}

/// Outcome of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct GaResult {
    /// Best chromosome seen in any generation.
    pub best: ExamChromosome,
    /// Its fitness.
    pub best_fitness: f64,
    /// Generation in which it was first found.
    pub best_generation: usize,
    /// Per-generation statistics, `history[g]` for generation `g`.
    pub history: Vec<GenerationStats>,
    /// Generation steps executed (excludes the initial scoring).
    pub generations: usize,
}

impl GaResult {
    /// Exam ID → slot mapping of the best chromosome.
    pub fn assignments<'a>(&'a self, problem: &'a ExamProblem) -> Vec<(&'a str, Slot)> {
        problem
            .exams()
            .iter()
            .zip(self.best.genes())
            .map(|(exam, slot)| (exam.id.as_str(), *slot))
            .collect()
    }

    /// Whether the best schedule has no violations at all.
    pub fn is_conflict_free(&self) -> bool {
        self.best_fitness >= 1.0
    }
}

/// Runs the genetic algorithm over one exam problem.
///
/// # Example
/// ```
/// use exam_schedule::ga::{GaConfig, GaDriver};
/// use exam_schedule::models::{ConflictPair, Exam, ExamProblem, SchedulingGrid};
///
/// let problem = ExamProblem::new(
///     vec![Exam::new("A", 2.0), Exam::new("B", 2.0)],
///     vec![ConflictPair::new("A", "B")],
/// ).unwrap();
/// let config = GaConfig::default()
///     .with_population_size(10)
///     .with_max_generations(20)
///     .with_grid(SchedulingGrid::slots_only(2))
///     .with_seed(42);
///
/// let result = GaDriver::new(problem, config).unwrap().run().unwrap();
/// assert_eq!(result.history.len(), 21);
/// ```
#[derive(Debug)]
pub struct GaDriver {
    problem: ExamProblem,
    config: GaConfig,
    evaluator: FitnessEvaluator,
    operators: GeneticOperators,
    rng: SmallRng,
    population: Population,
    stats: RunStatistics,
    generation: usize,
    state: GaState,
}

impl GaDriver {
    /// Creates a driver, validating the configuration up front.
    ///
    /// The evaluator gets the counters the problem calls for
    /// (see [`FitnessEvaluator::for_problem`]).
    pub fn new(problem: ExamProblem, config: GaConfig) -> Result<Self, GaError> {
        config.validate()?;

        if config.population_size % 2 == 1 {
            warn!(
                "population_size {} is odd; each generation's surplus child is dropped",
                config.population_size
            );
        }
        if config.parallel && !cfg!(feature = "parallel") {
            warn!("parallel scoring requested without the `parallel` feature; scoring sequentially");
        }
        if let Some(capacity) = config.grid.daily_capacity {
            let available = capacity * f64::from(config.grid.days);
            if problem.total_duration() > available {
                warn!(
                    "exams need {:.1} units but the grid offers {:.1}; capacity violations are unavoidable",
                    problem.total_duration(),
                    available
                );
            }
        }

        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };

        Ok(Self {
            evaluator: FitnessEvaluator::for_problem(&problem, &config.grid),
            operators: config.operators(),
            problem,
            config,
            rng,
            population: Population::default(),
            stats: RunStatistics::new(),
            generation: 0,
            state: GaState::Uninitialized,
        })
    }

    /// Adds a violation counter on top of the derived ones.
    pub fn with_counter<C: ViolationCounter + 'static>(mut self, counter: C) -> Self {
        self.evaluator = self.evaluator.with_counter(counter);
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> GaState {
        self.state
    }

    /// Current generation number.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Current population.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Statistics recorded so far.
    pub fn statistics(&self) -> &RunStatistics {
        &self.stats
    }

    /// The evaluator in use.
    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    /// The problem being solved.
    pub fn problem(&self) -> &ExamProblem {
        &self.problem
    }

    fn expect_state(&self, allowed: &[GaState], expected: &'static str) -> Result<(), GaError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(GaError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }

    /// Seeds generation 0.
    pub fn initialize(&mut self) -> Result<(), GaError> {
        self.expect_state(&[GaState::Uninitialized], "Uninitialized")?;
        self.population = Population::random(
            self.config.population_size,
            self.problem.exam_count(),
            &self.config.grid,
            &mut self.rng,
        );
        self.generation = 0;
        self.state = GaState::Initialized;
        Ok(())
    }

    /// Scores the current population and records its statistics.
    pub fn evaluate(&mut self) -> Result<(), GaError> {
        self.expect_state(&[GaState::Initialized, GaState::Replaced], "Initialized or Replaced")?;
        self.state = GaState::Evaluating;
        self.population
            .evaluate_all(&self.evaluator, &self.problem, self.config.parallel)?;

        let improved = self.stats.record(self.generation, &self.population)?;
        if let Some(row) = self.stats.latest() {
            debug!(
                "generation {}: best {:.4}, avg {:.4}, conflict rate {:.4}",
                row.generation, row.best_fitness, row.average_fitness, row.conflict_rate
            );
            if improved {
                debug!("new best-ever fitness {:.4} at generation {}", row.best_fitness, row.generation);
            }
        }
        Ok(())
    }

    /// Breeds and installs the next population (unscored).
    pub fn breed(&mut self) -> Result<(), GaError> {
        self.expect_state(&[GaState::Evaluating], "Evaluating")?;

        let size = self.config.population_size;
        let grid = &self.config.grid;
        let mut next = Vec::with_capacity(size + 1);
        while next.len() < size {
            self.state = GaState::Selecting;
            let p1 = roulette_select(self.population.members(), &mut self.rng)?;
            let p2 = roulette_select(self.population.members(), &mut self.rng)?;

            self.state = GaState::Recombining;
            let (c1, c2) = self.operators.crossover(p1, p2, &mut self.rng)?;

            self.state = GaState::Mutating;
            next.push(self.operators.mutate(&c1, grid, &mut self.rng));
            next.push(self.operators.mutate(&c2, grid, &mut self.rng));
        }
        next.truncate(size);

        self.population = Population::from_members(next);
        self.generation += 1;
        self.state = GaState::Replaced;
        Ok(())
    }

    /// One full generation step: breed, then score.
    pub fn step(&mut self) -> Result<(), GaError> {
        self.breed()?;
        self.evaluate()
    }

    /// Runs the whole search and returns its result.
    ///
    /// Picks up wherever the driver stands: seeds and scores the current
    /// population if needed, then steps until `max_generations` generations
    /// have been produced.
    pub fn run(&mut self) -> Result<GaResult, GaError> {
        info!(
            "starting GA: {} exams, population {}, {} generations",
            self.problem.exam_count(),
            self.config.population_size,
            self.config.max_generations
        );

        if self.state == GaState::Uninitialized {
            self.initialize()?;
        }
        if matches!(self.state, GaState::Initialized | GaState::Replaced) {
            self.evaluate()?;
        }
        while self.generation < self.config.max_generations {
            self.step()?;
        }
        self.state = GaState::Terminated;

        let result = self.result()?;
        info!(
            "GA finished: best fitness {:.4} (generation {})",
            result.best_fitness, result.best_generation
        );
        Ok(result)
    }

    /// Result snapshot once the run has terminated.
    pub fn result(&self) -> Result<GaResult, GaError> {
        self.expect_state(&[GaState::Terminated], "Terminated")?;
        let best = self.stats.best().cloned().ok_or(GaError::EmptyPopulation)?;
        Ok(GaResult {
            best_fitness: best.fitness().unwrap_or(0.0),
            best,
            best_generation: self.stats.best_generation(),
            history: self.stats.history().to_vec(),
            generations: self.generation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConflictPair, Exam, SchedulingGrid};

    fn small_problem() -> ExamProblem {
        ExamProblem::new(
            vec![
                Exam::new("A", 1.0).with_teacher("T1"),
                Exam::new("B", 1.0).with_teacher("T1"),
                Exam::new("C", 1.0),
                Exam::new("D", 1.0),
            ],
            vec![ConflictPair::new("C", "D")],
        )
        .unwrap()
    }

    fn small_config() -> GaConfig {
        GaConfig::default()
            .with_population_size(12)
            .with_max_generations(15)
            .with_grid(SchedulingGrid::new(1, 3))
            .with_seed(42)
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let err = GaDriver::new(small_problem(), small_config().with_mutation_rate(2.0)).unwrap_err();
        assert!(matches!(err, GaError::Configuration(_)));
    }

    #[test]
    fn test_state_transitions() {
        let mut driver = GaDriver::new(small_problem(), small_config()).unwrap();
        assert_eq!(driver.state(), GaState::Uninitialized);

        driver.initialize().unwrap();
        assert_eq!(driver.state(), GaState::Initialized);
        assert!(driver.population().members().iter().all(|c| !c.is_scored()));

        driver.evaluate().unwrap();
        assert_eq!(driver.state(), GaState::Evaluating);
        assert_eq!(driver.statistics().history().len(), 1);

        driver.breed().unwrap();
        assert_eq!(driver.state(), GaState::Replaced);
        assert_eq!(driver.generation(), 1);

        driver.evaluate().unwrap();
        assert_eq!(driver.statistics().history().len(), 2);
    }

    #[test]
    fn test_out_of_order_calls_rejected() {
        let mut driver = GaDriver::new(small_problem(), small_config()).unwrap();
        assert!(matches!(driver.evaluate(), Err(GaError::InvalidState { .. })));
        assert!(matches!(driver.breed(), Err(GaError::InvalidState { .. })));
        assert!(matches!(driver.result(), Err(GaError::InvalidState { .. })));

        driver.initialize().unwrap();
        assert!(matches!(
            driver.initialize(),
            Err(GaError::InvalidState {
                actual: GaState::Initialized,
                ..
            })
        ));
    }

    #[test]
    fn test_run_history_length() {
        let mut driver = GaDriver::new(small_problem(), small_config()).unwrap();
        let result = driver.run().unwrap();

        assert_eq!(driver.state(), GaState::Terminated);
        assert_eq!(result.generations, 15);
        assert_eq!(result.history.len(), 16);
        for (g, row) in result.history.iter().enumerate() {
            assert_eq!(row.generation, g);
            assert!((row.conflict_rate - (1.0 - row.best_fitness)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zero_generations() {
        let mut driver =
            GaDriver::new(small_problem(), small_config().with_max_generations(0)).unwrap();
        let result = driver.run().unwrap();
        assert_eq!(result.generations, 0);
        assert_eq!(result.history.len(), 1);
        assert_eq!(result.best_generation, 0);
    }

    #[test]
    fn test_odd_population_truncated() {
        let config = small_config().with_population_size(7);
        let mut driver = GaDriver::new(small_problem(), config).unwrap();
        driver.initialize().unwrap();
        driver.evaluate().unwrap();
        for _ in 0..5 {
            driver.step().unwrap();
            assert_eq!(driver.population().len(), 7);
        }
    }

    #[test]
    fn test_assignments_follow_exam_order() {
        let problem = small_problem();
        let mut driver = GaDriver::new(problem.clone(), small_config()).unwrap();
        let result = driver.run().unwrap();
        let assignments = result.assignments(&problem);

        let ids: Vec<&str> = assignments.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec!["A", "B", "C", "D"]);
        for (idx, (_, slot)) in assignments.iter().enumerate() {
            assert_eq!(Some(*slot), result.best.gene(idx));
        }
    }

    #[test]
    fn test_best_matches_evaluator() {
        let problem = small_problem();
        let mut driver = GaDriver::new(problem.clone(), small_config()).unwrap();
        let result = driver.run().unwrap();
        let fitness = driver.evaluator().evaluate(&problem, &result.best).unwrap();
        assert_eq!(fitness, result.best_fitness);
    }

    #[test]
    fn test_parallel_flag_gives_same_run() {
        // Without the `parallel` feature the flag falls back to sequential scoring
        let config = small_config()
            .with_population_size(9)
            .with_grid(SchedulingGrid::new(2, 2).with_daily_capacity(2.0));
        let sequential = GaDriver::new(small_problem(), config.clone().with_parallel(false))
            .unwrap()
            .run()
            .unwrap();
        let parallel = GaDriver::new(small_problem(), config.with_parallel(true))
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(sequential.history, parallel.history);
        assert_eq!(sequential.best.genes(), parallel.best.genes());
        assert_eq!(sequential.best_generation, parallel.best_generation);
    }

    #[test]
    fn test_overfull_grid_still_runs() {
        // 4 units of exams on one day of capacity 1.5
        let config = small_config().with_grid(SchedulingGrid::new(1, 3).with_daily_capacity(1.5));
        let result = GaDriver::new(small_problem(), config).unwrap().run().unwrap();
        assert!(result.best_fitness < 1.0);
        assert_eq!(result.history.len(), 16);
    }

    #[test]
    fn test_extra_counter() {
        #[derive(Debug)]
        struct NoFirstSlot;
        impl ViolationCounter for NoFirstSlot {
            fn name(&self) -> &'static str {
                "no-first-slot"
            }
            fn count(&self, _p: &ExamProblem, _g: &SchedulingGrid, genes: &[Slot]) -> usize {
                genes.iter().filter(|s| s.slot == 1).count()
            }
        }

        let driver = GaDriver::new(small_problem(), small_config())
            .unwrap()
            .with_counter(NoFirstSlot);
        assert_eq!(
            driver.evaluator().counter_names(),
            vec!["direct", "teacher", "no-first-slot"]
        );
    }
}
