//! Exam model.
//!
//! An exam is the unit being placed on the timetable. Besides its duration
//! it may carry the attributes that derive conflicts implicitly: the
//! teacher running it and the students (or cohorts) sitting it.

use serde::{Deserialize, Serialize};

/// An exam to be scheduled.
///
/// # Duration
/// Durations are abstract units (hours, slot-units); the consumer decides.
/// They are compared against [`SchedulingGrid::daily_capacity`](super::SchedulingGrid).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    /// Unique exam identifier.
    pub id: String,
    /// Exam duration (> 0).
    pub duration: f64,
    /// Student or cohort identifiers sitting this exam.
    #[serde(default)]
    pub students: Vec<String>,
    /// Teacher running this exam. `None` = no teacher constraint.
    #[serde(default)]
    pub teacher: Option<String>,
}

impl Exam {
    /// Creates a new exam with the given ID and duration.
    pub fn new(id: impl Into<String>, duration: f64) -> Self {
        Self {
            id: id.into(),
            duration,
            students: Vec::new(),
            teacher: None,
        }
    }

    /// Sets the owning teacher.
    pub fn with_teacher(mut self, teacher: impl Into<String>) -> Self {
        self.teacher = Some(teacher.into());
        self
    }

    /// Adds a single student.
    pub fn with_student(mut self, student: impl Into<String>) -> Self {
        self.students.push(student.into());
        self
    }

    /// Replaces the student list.
    pub fn with_students<I, S>(mut self, students: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.students = students.into_iter().map(Into::into).collect();
        self
    }

    /// Whether both exams are run by the same teacher.
    pub fn shares_teacher(&self, other: &Exam) -> bool {
        match (&self.teacher, &other.teacher) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Whether at least one student sits both exams.
    pub fn shares_student(&self, other: &Exam) -> bool {
        self.students.iter().any(|s| other.students.contains(s))
    }
}

/// An explicitly declared pair of exams that must not share a slot.
///
/// Unordered: `(A, B)` and `(B, A)` describe the same constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConflictPair {
    /// First exam ID.
    pub first: String,
    /// Second exam ID.
    pub second: String,
}

impl ConflictPair {
    /// Creates a conflict declaration between two exams.
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }
}
