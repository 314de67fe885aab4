//! Selection and variation operators.
//!
//! - [`roulette_select`]: fitness-proportionate parent selection
//! - [`single_point_crossover`]: prefix/suffix exchange at one cut
//! - [`point_mutation`]: redraw one gene from the grid
//!
//! Every operator takes its random source explicitly and returns newly
//! owned chromosomes; inputs are never modified.
//!
//! # Usage
//!
//! ```
//! use exam_schedule::ga::operators::GeneticOperators;
//!
//! let ops = GeneticOperators::new(0.8, 0.01);
//! assert_eq!(ops.crossover_rate, 0.8);
//! ```

use rand::Rng;

use super::ExamChromosome;
use crate::error::GaError;
use crate::models::SchedulingGrid;

/// Bernoulli trial: `true` with probability `rate`. 0 never fires, 1 always does.
fn coin<R: Rng>(rate: f64, rng: &mut R) -> bool {
    rng.random::<f64>() < rate
}

/// Index of a fitness-proportionate pick.
///
/// Draws `r ∈ [0, Σf)` and returns the first index whose cumulative
/// fitness reaches `r`. A single-member population returns 0 without
/// drawing.
///
/// # Errors
/// [`GaError::EmptyPopulation`] if the population is empty, contains an
/// unscored individual, or its fitness sum is not positive.
pub fn roulette_index<R: Rng>(population: &[ExamChromosome], rng: &mut R) -> Result<usize, GaError> {
    match population.len() {
        0 => return Err(GaError::EmptyPopulation),
        1 => return Ok(0),
        _ => {}
    }

    let mut total = 0.0;
    for chromosome in population {
        total += chromosome.fitness().ok_or(GaError::EmptyPopulation)?;
    }
    if !(total.is_finite() && total > 0.0) {
        return Err(GaError::EmptyPopulation);
    }

    let pick = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (idx, chromosome) in population.iter().enumerate() {
        cumulative += chromosome.fitness().unwrap_or(0.0);
        if cumulative >= pick {
            return Ok(idx);
        }
    }
    // Float rounding can leave the running sum just short of `pick`.
    Ok(population.len() - 1)
}

/// Roulette-wheel selection. See [`roulette_index`].
pub fn roulette_select<'a, R: Rng>(
    population: &'a [ExamChromosome],
    rng: &mut R,
) -> Result<&'a ExamChromosome, GaError> {
    roulette_index(population, rng).map(|idx| &population[idx])
}

/// Single-point crossover at a fixed cut.
///
/// `child1 = p1[..cut] + p2[cut..]`, `child2 = p2[..cut] + p1[cut..]`.
/// Parents must have equal length and `cut ≤ len`.
pub fn crossover_at(
    p1: &ExamChromosome,
    p2: &ExamChromosome,
    cut: usize,
) -> (ExamChromosome, ExamChromosome) {
    let (a, b) = (p1.genes(), p2.genes());
    let child1 = a[..cut].iter().chain(&b[cut..]).copied().collect();
    let child2 = b[..cut].iter().chain(&a[cut..]).copied().collect();
    (ExamChromosome::new(child1), ExamChromosome::new(child2))
}

/// Single-point crossover gated by `rate`.
///
/// With probability `rate` a cut is drawn uniformly from `[0, len - 1]`
/// and [`crossover_at`] applied; otherwise the children are copies of the
/// parents.
///
/// # Errors
/// [`GaError::InvariantViolation`] if the parents differ in length or are empty.
pub fn single_point_crossover<R: Rng>(
    p1: &ExamChromosome,
    p2: &ExamChromosome,
    rate: f64,
    rng: &mut R,
) -> Result<(ExamChromosome, ExamChromosome), GaError> {
    if p1.len() != p2.len() || p1.is_empty() {
        return Err(GaError::InvariantViolation(format!(
            "crossover parents must be non-empty and equal length, got {} and {}",
            p1.len(),
            p2.len()
        )));
    }

    if coin(rate, rng) {
        let cut = rng.random_range(0..p1.len());
        Ok(crossover_at(p1, p2, cut))
    } else {
        Ok((p1.clone(), p2.clone()))
    }
}

/// Point mutation gated by `rate`.
///
/// With probability `rate` one position is chosen uniformly and replaced
/// by a fresh draw from the grid (which may equal the old value).
/// Otherwise returns an identical copy.
pub fn point_mutation<R: Rng>(
    chromosome: &ExamChromosome,
    rate: f64,
    grid: &SchedulingGrid,
    rng: &mut R,
) -> ExamChromosome {
    if chromosome.is_empty() || !coin(rate, rng) {
        return chromosome.clone();
    }
    let pos = rng.random_range(0..chromosome.len());
    let slot = grid.random_slot(rng);
    chromosome.with_gene(pos, slot)
}

/// Crossover and mutation rates bundled for the generational loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneticOperators {
    /// Probability of recombining a parent pair.
    pub crossover_rate: f64,
    /// Probability of mutating each child.
    pub mutation_rate: f64,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self::new(0.8, 0.01)
    }
}

impl GeneticOperators {
    /// Creates operators with the given rates.
    pub fn new(crossover_rate: f64, mutation_rate: f64) -> Self {
        Self {
            crossover_rate,
            mutation_rate,
        }
    }

    /// Performs crossover using the configured rate.
    pub fn crossover<R: Rng>(
        &self,
        p1: &ExamChromosome,
        p2: &ExamChromosome,
        rng: &mut R,
    ) -> Result<(ExamChromosome, ExamChromosome), GaError> {
        single_point_crossover(p1, p2, self.crossover_rate, rng)
    }

    /// Performs mutation using the configured rate.
    pub fn mutate<R: Rng>(
        &self,
        chromosome: &ExamChromosome,
        grid: &SchedulingGrid,
        rng: &mut R,
    ) -> ExamChromosome {
        point_mutation(chromosome, self.mutation_rate, grid, rng)
    }
}
