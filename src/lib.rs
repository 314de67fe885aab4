//! Exam timetabling with a genetic algorithm.
//!
//! Places exams on a days × slots grid so that conflicting exams never
//! share a slot and no day exceeds its duration capacity. The search is a
//! generational GA: roulette-wheel selection, single-point crossover and
//! point mutation over one (day, slot) gene per exam.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Exam`, `ConflictPair`, `SchedulingGrid`,
//!   `Slot`, `ExamProblem`
//! - **`ga`**: Chromosome, fitness evaluation, operators, population
//!   statistics and the `GaDriver` generational loop
//! - **`kpi`**: Readable timetable and violation breakdown for a chromosome
//! - **`validation`**: Input and configuration checks
//! - **`error`**: `GaError`
//!
//! # Scope
//!
//! Reading exam descriptions and rendering results are left to callers;
//! every input and output type is serde-serializable.
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization, and Machine Learning"

pub mod error;
pub mod ga;
pub mod kpi;
pub mod models;
pub mod validation;

pub use error::GaError;
