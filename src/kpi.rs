//! Timetable quality metrics (KPIs).
//!
//! Decodes a chromosome into a readable timetable and summarizes it.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Violations | Count per active counter, and total |
//! | Fitness | `1 / (1 + total violations)` |
//! | Day load | Sum of exam durations per day |
//! | Overbooked days | Days whose load exceeds the daily capacity |
//! | Slot utilization | Distinct cells used / cells available |

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::GaError;
use crate::ga::fitness::fitness_from_violations;
use crate::ga::{ExamChromosome, FitnessEvaluator};
use crate::models::{ExamProblem, Slot};

/// One exam's placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExamAssignment {
    /// Exam ID.
    pub exam_id: String,
    /// Assigned cell.
    pub slot: Slot,
    /// Exam duration.
    pub duration: f64,
}

/// Timetable performance indicators.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleKpi {
    /// Placements in exam order.
    pub assignments: Vec<ExamAssignment>,
    /// Violations per counter name.
    pub violations_by_kind: BTreeMap<&'static str, usize>,
    /// Sum of all violations.
    pub total_violations: usize,
    /// Fitness implied by `total_violations`.
    pub fitness: f64,
    /// Total exam duration per day (only days in use).
    pub load_by_day: BTreeMap<u32, f64>,
    /// Days whose load exceeds the grid capacity (empty when unlimited).
    pub overbooked_days: Vec<u32>,
    /// Fraction of grid cells holding at least one exam (0.0..1.0).
    pub slot_utilization: f64,
}

impl ScheduleKpi {
    /// Computes KPIs for a chromosome.
    ///
    /// # Errors
    /// [`GaError::InvariantViolation`] if the chromosome doesn't fit the
    /// problem or the evaluator's grid.
    pub fn calculate(
        problem: &ExamProblem,
        evaluator: &FitnessEvaluator,
        chromosome: &ExamChromosome,
    ) -> Result<Self, GaError> {
        let breakdown = evaluator.breakdown(problem, chromosome)?;
        let total_violations: usize = breakdown.iter().map(|(_, n)| n).sum();
        let violations_by_kind = breakdown.into_iter().collect();

        let assignments: Vec<ExamAssignment> = problem
            .exams()
            .iter()
            .zip(chromosome.genes())
            .map(|(exam, slot)| ExamAssignment {
                exam_id: exam.id.clone(),
                slot: *slot,
                duration: exam.duration,
            })
            .collect();

        let mut load_by_day: BTreeMap<u32, f64> = BTreeMap::new();
        for a in &assignments {
            *load_by_day.entry(a.slot.day).or_insert(0.0) += a.duration;
        }

        let grid = evaluator.grid();
        let overbooked_days = match grid.daily_capacity {
            Some(capacity) => load_by_day
                .iter()
                .filter(|(_, &load)| load > capacity)
                .map(|(&day, _)| day)
                .collect(),
            None => Vec::new(),
        };

        let used: BTreeSet<Slot> = assignments.iter().map(|a| a.slot).collect();
        let slot_utilization = used.len() as f64 / grid.cell_count() as f64;

        Ok(Self {
            assignments,
            violations_by_kind,
            total_violations,
            fitness: fitness_from_violations(total_violations),
            load_by_day,
            overbooked_days,
            slot_utilization,
        })
    }

    /// Exam IDs placed in a cell, in exam order.
    pub fn exams_in(&self, slot: Slot) -> Vec<&str> {
        self.assignments
            .iter()
            .filter(|a| a.slot == slot)
            .map(|a| a.exam_id.as_str())
            .collect()
    }

    /// Timetable grouped by cell, day-major.
    pub fn by_slot(&self) -> BTreeMap<Slot, Vec<&str>> {
        let mut table: BTreeMap<Slot, Vec<&str>> = BTreeMap::new();
        for a in &self.assignments {
            table.entry(a.slot).or_default().push(a.exam_id.as_str());
        }
        table
    }

    /// Whether no constraint is violated.
    pub fn is_feasible(&self) -> bool {
        self.total_violations == 0
    }

    /// Whether the timetable stays within the given violation budget.
    pub fn meets_threshold(&self, max_violations: usize) -> bool {
        self.total_violations <= max_violations
    }
}
