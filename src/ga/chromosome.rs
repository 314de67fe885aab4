//! Slot-vector chromosome for exam scheduling.
//!
//! # Encoding
//!
//! One gene per exam, in [`ExamProblem`](crate::models::ExamProblem) order.
//! Each gene is the [`Slot`] (day, slot) the exam is placed in.
//!
//! Genes are owned exclusively: operators build new chromosomes instead of
//! editing ones still held by a population, and a new chromosome always
//! starts unscored.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GaError;
use crate::models::{SchedulingGrid, Slot};

/// Candidate timetable.
///
/// Higher fitness = better schedule (maximization, range (0, 1]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamChromosome {
    genes: Vec<Slot>,
    #[serde(skip)]
    fitness: Option<f64>,
}

impl ExamChromosome {
    /// Creates an unscored chromosome from explicit genes.
    pub fn new(genes: Vec<Slot>) -> Self {
        Self {
            genes,
            fitness: None,
        }
    }

    /// Creates a chromosome with every gene drawn uniformly from the grid.
    pub fn random<R: Rng>(exam_count: usize, grid: &SchedulingGrid, rng: &mut R) -> Self {
        let genes = (0..exam_count).map(|_| grid.random_slot(rng)).collect();
        Self::new(genes)
    }

    /// Genes in exam order.
    pub fn genes(&self) -> &[Slot] {
        &self.genes
    }

    /// Slot of the exam at `index`.
    pub fn gene(&self, index: usize) -> Option<Slot> {
        self.genes.get(index).copied()
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Whether the chromosome has no genes.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Cached fitness, `None` until evaluated.
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Whether a fitness has been computed for the current genes.
    pub fn is_scored(&self) -> bool {
        self.fitness.is_some()
    }

    pub(crate) fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Returns a copy with one gene replaced. The copy is unscored.
    pub fn with_gene(&self, index: usize, slot: Slot) -> Self {
        let mut genes = self.genes.clone();
        genes[index] = slot;
        Self::new(genes)
    }

    /// Checks the length and grid invariants.
    pub fn check(&self, exam_count: usize, grid: &SchedulingGrid) -> Result<(), GaError> {
        if self.genes.len() != exam_count {
            return Err(GaError::InvariantViolation(format!(
                "chromosome has {} genes, expected {}",
                self.genes.len(),
                exam_count
            )));
        }
        if let Some((pos, slot)) = self
            .genes
            .iter()
            .enumerate()
            .find(|(_, slot)| !grid.contains(**slot))
        {
            return Err(GaError::InvariantViolation(format!(
                "gene {pos} assigned to {slot}, outside the {}x{} grid",
                grid.days, grid.slots_per_day
            )));
        }
        Ok(())
    }
}
