//! Genetic-algorithm engine for exam timetabling.
//!
//! # Encoding
//!
//! One gene per exam: the (day, slot) it is placed in. Genes follow the
//! exam order of the [`ExamProblem`](crate::models::ExamProblem).
//!
//! # Loop
//!
//! Seed a random population, score it, then repeatedly select parents by
//! roulette wheel, apply single-point crossover and point mutation, and
//! replace the population wholesale. The best chromosome of any
//! generation is kept in [`RunStatistics`].
//!
//! # Submodules
//!
//! - [`fitness`]: pluggable violation counters and the evaluator
//! - [`operators`]: selection, crossover, mutation

mod chromosome;
mod config;
pub mod fitness;
pub mod operators;
mod population;
mod runner;

pub use chromosome::ExamChromosome;
pub use config::GaConfig;
pub use fitness::{
    CapacityViolations, CohortConflicts, DirectConflicts, FitnessEvaluator, TeacherConflicts,
    ViolationCounter,
};
pub use operators::GeneticOperators;
pub use population::{GenerationStats, Population, RunStatistics};
pub use runner::{GaDriver, GaResult, GaState};
