//! Validated exam-scheduling problem.
//!
//! Bundles the ordered exam list with its explicit conflict declarations.
//! The exam order is the gene order of every chromosome; conflict pairs
//! are resolved to exam indices once, at construction. Deserializing goes
//! through the same validation as [`ExamProblem::new`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{ConflictPair, Exam};
use crate::error::GaError;
use crate::validation::validate_exams;

/// Immutable domain model consumed by the GA engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ProblemDef")]
pub struct ExamProblem {
    exams: Vec<Exam>,
    conflicts: Vec<ConflictPair>,
    #[serde(skip)]
    conflict_indices: Vec<(usize, usize)>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

/// Wire form of [`ExamProblem`] before validation.
#[derive(Deserialize)]
struct ProblemDef {
    exams: Vec<Exam>,
    #[serde(default)]
    conflicts: Vec<ConflictPair>,
}

impl TryFrom<ProblemDef> for ExamProblem {
    type Error = GaError;

    fn try_from(def: ProblemDef) -> Result<Self, Self::Error> {
        Self::new(def.exams, def.conflicts)
    }
}

impl ExamProblem {
    /// Creates a problem from exams and explicit conflict declarations.
    ///
    /// Fails with [`GaError::Configuration`] when the exam list is empty,
    /// IDs repeat, a duration is not positive, or a conflict references
    /// an unknown exam.
    pub fn new(exams: Vec<Exam>, conflicts: Vec<ConflictPair>) -> Result<Self, GaError> {
        validate_exams(&exams, &conflicts)?;

        let index: HashMap<String, usize> = exams
            .iter()
            .enumerate()
            .map(|(i, exam)| (exam.id.clone(), i))
            .collect();

        // Validation guarantees both lookups succeed.
        let conflict_indices = conflicts
            .iter()
            .filter_map(|pair| Some((*index.get(&pair.first)?, *index.get(&pair.second)?)))
            .collect();

        Ok(Self {
            exams,
            conflicts,
            conflict_indices,
            index,
        })
    }

    /// Creates a problem whose conflicts are derived only from exam attributes.
    pub fn without_conflicts(exams: Vec<Exam>) -> Result<Self, GaError> {
        Self::new(exams, Vec::new())
    }

    /// Exams in gene order.
    pub fn exams(&self) -> &[Exam] {
        &self.exams
    }

    /// Number of exams (= chromosome length).
    pub fn exam_count(&self) -> usize {
        self.exams.len()
    }

    /// Explicit conflict declarations as given.
    pub fn conflicts(&self) -> &[ConflictPair] {
        &self.conflicts
    }

    /// Explicit conflicts as exam-index pairs.
    pub fn conflict_pairs(&self) -> &[(usize, usize)] {
        &self.conflict_indices
    }

    /// Gene index of an exam.
    pub fn index_of(&self, exam_id: &str) -> Option<usize> {
        self.index.get(exam_id).copied()
    }

    /// Whether any exam names a teacher.
    pub fn has_teachers(&self) -> bool {
        self.exams.iter().any(|e| e.teacher.is_some())
    }

    /// Whether any exam lists students.
    pub fn has_students(&self) -> bool {
        self.exams.iter().any(|e| !e.students.is_empty())
    }

    /// Sum of all exam durations.
    pub fn total_duration(&self) -> f64 {
        self.exams.iter().map(|e| e.duration).sum()
    }
}
