//! Exam-scheduling domain models.
//!
//! Immutable inputs to the GA engine: exams, explicit conflict
//! declarations, and the grid they are placed on.
//!
//! # Conflict Sources
//!
//! | Source | Declared by | Counted when |
//! |--------|-------------|--------------|
//! | Direct | `ConflictPair` | both exams share a (day, slot) |
//! | Teacher | `Exam::teacher` | same-slot exams share a teacher |
//! | Cohort | `Exam::students` | same-slot exams share a student |
//! | Capacity | `SchedulingGrid::daily_capacity` | a day's duration exceeds capacity |

mod exam;
mod grid;
mod problem;

pub use exam::{ConflictPair, Exam};
pub use grid::{CapacityPolicy, SchedulingGrid, Slot};
pub use problem::ExamProblem;
