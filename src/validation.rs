//! Input validation for exam-scheduling problems.
//!
//! Checks structural integrity of exams, conflict declarations, the grid,
//! and GA options before any generation runs. Detects:
//! - Empty exam lists and duplicate IDs
//! - Non-positive or non-finite durations
//! - Conflict declarations referencing unknown exams, or an exam twice
//! - Degenerate grids and capacities
//! - Out-of-range GA options
//!
//! Every check runs; all problems found are reported together.

use std::collections::HashSet;

use crate::ga::GaConfig;
use crate::models::{ConflictPair, Exam, SchedulingGrid};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// No exams to schedule.
    EmptyExamList,
    /// Two exams share the same ID.
    DuplicateId,
    /// Exam duration is zero, negative, or not finite.
    InvalidDuration,
    /// A conflict declaration names an exam that doesn't exist.
    UnknownExamReference,
    /// A conflict declaration names the same exam twice.
    SelfConflict,
    /// Grid has zero days or zero slots.
    InvalidGrid,
    /// Daily capacity is not a positive number.
    InvalidCapacity,
    /// Population size below 2.
    InvalidPopulationSize,
    /// Crossover or mutation rate outside [0, 1].
    InvalidRate,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn into_result(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates exams and their explicit conflict declarations.
///
/// Checks:
/// 1. At least one exam
/// 2. No duplicate exam IDs
/// 3. Every duration is finite and > 0
/// 4. Conflict pairs reference existing exams
/// 5. Conflict pairs name two distinct exams
pub fn validate_exams(exams: &[Exam], conflicts: &[ConflictPair]) -> ValidationResult {
    let mut errors = Vec::new();

    if exams.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyExamList,
            "No exams to schedule",
        ));
    }

    let mut exam_ids = HashSet::new();
    for exam in exams {
        if !exam_ids.insert(exam.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate exam ID: {}", exam.id),
            ));
        }
        if !(exam.duration.is_finite() && exam.duration > 0.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDuration,
                format!("Exam '{}' has invalid duration {}", exam.id, exam.duration),
            ));
        }
    }

    for pair in conflicts {
        for id in [&pair.first, &pair.second] {
            if !exam_ids.contains(id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownExamReference,
                    format!(
                        "Conflict ({}, {}) references unknown exam '{}'",
                        pair.first, pair.second, id
                    ),
                ));
            }
        }
        if pair.first == pair.second {
            errors.push(ValidationError::new(
                ValidationErrorKind::SelfConflict,
                format!("Exam '{}' declared in conflict with itself", pair.first),
            ));
        }
    }

    into_result(errors)
}

/// Validates grid dimensions and capacity.
pub fn validate_grid(grid: &SchedulingGrid) -> ValidationResult {
    let mut errors = Vec::new();

    if grid.days == 0 || grid.slots_per_day == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidGrid,
            format!(
                "Grid needs at least one day and one slot, got {} x {}",
                grid.days, grid.slots_per_day
            ),
        ));
    }
    if let Some(capacity) = grid.daily_capacity {
        if !(capacity.is_finite() && capacity > 0.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCapacity,
                format!("Daily capacity must be a positive number, got {capacity}"),
            ));
        }
    }

    into_result(errors)
}

/// Validates GA options, including the grid they carry.
///
/// Checks:
/// 1. `population_size ≥ 2`
/// 2. `crossover_rate` and `mutation_rate` in [0, 1]
/// 3. Grid has ≥ 1 day and ≥ 1 slot per day
/// 4. Daily capacity, when set, is finite and > 0
pub fn validate_config(config: &GaConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.population_size < 2 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidPopulationSize,
            format!("population_size must be at least 2, got {}", config.population_size),
        ));
    }

    for (name, rate) in [
        ("crossover_rate", config.crossover_rate),
        ("mutation_rate", config.mutation_rate),
    ] {
        if !(0.0..=1.0).contains(&rate) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidRate,
                format!("{name} must be within [0, 1], got {rate}"),
            ));
        }
    }

    if let Err(grid_errors) = validate_grid(&config.grid) {
        errors.extend(grid_errors);
    }
    into_result(errors)
}
