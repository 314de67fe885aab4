//! Population and run statistics.
//!
//! A [`Population`] is one generation of chromosomes in a fixed order.
//! [`RunStatistics`] accumulates one [`GenerationStats`] row per
//! generation and keeps the best chromosome seen in any of them.
//!
//! # Tie-breaking
//! Both the per-generation best and the best-ever incumbent prefer the
//! earliest-found chromosome: a candidate must be strictly fitter to win.

use rand::Rng;
use serde::Serialize;

use super::{ExamChromosome, FitnessEvaluator};
use crate::error::GaError;
use crate::models::{ExamProblem, SchedulingGrid};

/// One generation of candidate schedules.
#[derive(Debug, Clone, Default)]
pub struct Population {
    members: Vec<ExamChromosome>,
}

impl Population {
    /// Seeds `size` chromosomes, each gene drawn uniformly from the grid.
    pub fn random<R: Rng>(
        size: usize,
        exam_count: usize,
        grid: &SchedulingGrid,
        rng: &mut R,
    ) -> Self {
        let members = (0..size)
            .map(|_| ExamChromosome::random(exam_count, grid, rng))
            .collect();
        Self { members }
    }

    /// Wraps existing chromosomes.
    pub fn from_members(members: Vec<ExamChromosome>) -> Self {
        Self { members }
    }

    /// Chromosomes in population order.
    pub fn members(&self) -> &[ExamChromosome] {
        &self.members
    }

    /// Number of chromosomes.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Scores every member.
    ///
    /// With the `parallel` feature and `parallel = true`, members are scored
    /// on the rayon pool. Scoring consumes no randomness, so the outcome is
    /// identical either way.
    pub fn evaluate_all(
        &mut self,
        evaluator: &FitnessEvaluator,
        problem: &ExamProblem,
        parallel: bool,
    ) -> Result<(), GaError> {
        score_members(&mut self.members, evaluator, problem, parallel)
    }

    /// Index of the fittest scored member; earliest wins ties.
    pub fn best_index(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, chromosome) in self.members.iter().enumerate() {
            let Some(fitness) = chromosome.fitness() else {
                continue;
            };
            if best.map_or(true, |(_, f)| fitness > f) {
                best = Some((idx, fitness));
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Fittest scored member; earliest wins ties.
    pub fn best(&self) -> Option<&ExamChromosome> {
        self.best_index().map(|idx| &self.members[idx])
    }

    /// Mean fitness; unscored members count as 0.
    pub fn average_fitness(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.members.iter().filter_map(|c| c.fitness()).sum();
        sum / self.members.len() as f64
    }
}

#[cfg(feature = "parallel")]
fn score_members(
    members: &mut [ExamChromosome],
    evaluator: &FitnessEvaluator,
    problem: &ExamProblem,
    parallel: bool,
) -> Result<(), GaError> {
    use rayon::prelude::*;

    if parallel {
        members
            .par_iter_mut()
            .try_for_each(|c| evaluator.score(problem, c).map(|_| ()))
    } else {
        members
            .iter_mut()
            .try_for_each(|c| evaluator.score(problem, c).map(|_| ()))
    }
}

#[cfg(not(feature = "parallel"))]
fn score_members(
    members: &mut [ExamChromosome],
    evaluator: &FitnessEvaluator,
    problem: &ExamProblem,
    _parallel: bool,
) -> Result<(), GaError> {
    members
        .iter_mut()
        .try_for_each(|c| evaluator.score(problem, c).map(|_| ()))
}

/// Statistics for one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationStats {
    /// Generation number (0 = initial population).
    pub generation: usize,
    /// Best fitness within this generation.
    pub best_fitness: f64,
    /// Mean fitness of this generation.
    pub average_fitness: f64,
    /// `1 - best_fitness`.
    pub conflict_rate: f64,
    /// Best fitness seen in any generation up to and including this one.
    pub best_ever_fitness: f64,
}

/// Run history plus the best-ever chromosome.
///
/// Updated only by the GA driver at generation boundaries.
#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    history: Vec<GenerationStats>,
    best: Option<ExamChromosome>,
    best_generation: usize,
}

impl RunStatistics {
    /// Creates empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a scored generation.
    ///
    /// Returns `true` if this generation produced a new best-ever chromosome.
    ///
    /// # Errors
    /// [`GaError::EmptyPopulation`] if no member has been scored.
    pub fn record(&mut self, generation: usize, population: &Population) -> Result<bool, GaError> {
        let best_idx = population.best_index().ok_or(GaError::EmptyPopulation)?;
        let champion = &population.members()[best_idx];
        let best_fitness = champion.fitness().unwrap_or(0.0);

        let improved = self.best_fitness().map_or(true, |incumbent| best_fitness > incumbent);
        if improved {
            self.best = Some(champion.clone());
            self.best_generation = generation;
        }

        self.history.push(GenerationStats {
            generation,
            best_fitness,
            average_fitness: population.average_fitness(),
            conflict_rate: 1.0 - best_fitness,
            best_ever_fitness: self.best_fitness().unwrap_or(best_fitness),
        });
        Ok(improved)
    }

    /// Per-generation statistics, indexed by generation number.
    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    /// Most recent generation's statistics.
    pub fn latest(&self) -> Option<&GenerationStats> {
        self.history.last()
    }

    /// Best chromosome seen so far.
    pub fn best(&self) -> Option<&ExamChromosome> {
        self.best.as_ref()
    }

    /// Fitness of the best chromosome seen so far.
    pub fn best_fitness(&self) -> Option<f64> {
        self.best.as_ref().and_then(|c| c.fitness())
    }

    /// Generation in which the best chromosome was first found.
    pub fn best_generation(&self) -> usize {
        self.best_generation
    }
}
