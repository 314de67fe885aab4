//! Fitness evaluation.
//!
//! A chromosome's fitness is `1 / (1 + v)` where `v` is the total number
//! of violations reported by the evaluator's [`ViolationCounter`]s. The
//! mapping is strictly positive, so every individual stays selectable,
//! and equals 1 only for a violation-free schedule.
//!
//! # Counters
//!
//! | Counter | Unit of violation |
//! |---------|-------------------|
//! | [`DirectConflicts`] | declared pair in the same (day, slot) |
//! | [`TeacherConflicts`] | same-slot pair with the same teacher |
//! | [`CohortConflicts`] | same-slot pair with a shared student |
//! | [`CapacityViolations`] | see [`CapacityPolicy`] |

use std::collections::HashMap;
use std::fmt;

use super::ExamChromosome;
use crate::error::GaError;
use crate::models::{CapacityPolicy, Exam, ExamProblem, SchedulingGrid, Slot};

/// Strategy for counting one kind of constraint violation.
///
/// Implementations must be pure functions of their inputs; the evaluator
/// may call them from several threads at once.
pub trait ViolationCounter: fmt::Debug + Send + Sync {
    /// Short name used in reports.
    fn name(&self) -> &'static str;

    /// Counts violations of this kind. `genes` has already been checked
    /// against the problem length and the grid.
    fn count(&self, problem: &ExamProblem, grid: &SchedulingGrid, genes: &[Slot]) -> usize;
}

/// Declared conflict pairs placed in the same (day, slot).
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectConflicts;

impl ViolationCounter for DirectConflicts {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn count(&self, problem: &ExamProblem, _grid: &SchedulingGrid, genes: &[Slot]) -> usize {
        problem
            .conflict_pairs()
            .iter()
            .filter(|&&(a, b)| genes[a] == genes[b])
            .count()
    }
}

/// Same-slot exams run by the same teacher.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeacherConflicts;

impl ViolationCounter for TeacherConflicts {
    fn name(&self) -> &'static str {
        "teacher"
    }

    fn count(&self, problem: &ExamProblem, _grid: &SchedulingGrid, genes: &[Slot]) -> usize {
        count_same_slot_pairs(problem.exams(), genes, Exam::shares_teacher)
    }
}

/// Same-slot exams sharing at least one student.
#[derive(Debug, Clone, Copy, Default)]
pub struct CohortConflicts;

impl ViolationCounter for CohortConflicts {
    fn name(&self) -> &'static str {
        "cohort"
    }

    fn count(&self, problem: &ExamProblem, _grid: &SchedulingGrid, genes: &[Slot]) -> usize {
        count_same_slot_pairs(problem.exams(), genes, Exam::shares_student)
    }
}

/// Days whose scheduled exam duration exceeds the grid's daily capacity.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapacityViolations;

impl ViolationCounter for CapacityViolations {
    fn name(&self) -> &'static str {
        "capacity"
    }

    fn count(&self, problem: &ExamProblem, grid: &SchedulingGrid, genes: &[Slot]) -> usize {
        let Some(capacity) = grid.daily_capacity else {
            return 0;
        };

        let mut load: HashMap<u32, f64> = HashMap::new();
        match grid.capacity_policy {
            CapacityPolicy::Incremental => {
                let mut violations = 0;
                for (exam, slot) in problem.exams().iter().zip(genes) {
                    let day_load = load.entry(slot.day).or_insert(0.0);
                    if *day_load + exam.duration > capacity {
                        violations += 1;
                    }
                    // Overbooked exams still occupy the day.
                    *day_load += exam.duration;
                }
                violations
            }
            CapacityPolicy::DailyTotal => {
                for (exam, slot) in problem.exams().iter().zip(genes) {
                    *load.entry(slot.day).or_insert(0.0) += exam.duration;
                }
                load.values().filter(|&&total| total > capacity).count()
            }
        }
    }
}

/// Counts pairs `i < j` with `genes[i] == genes[j]` for which `conflicts` holds.
fn count_same_slot_pairs<F>(exams: &[Exam], genes: &[Slot], conflicts: F) -> usize
where
    F: Fn(&Exam, &Exam) -> bool,
{
    let mut by_slot: HashMap<Slot, Vec<usize>> = HashMap::new();
    for (idx, slot) in genes.iter().enumerate() {
        by_slot.entry(*slot).or_default().push(idx);
    }

    let mut violations = 0;
    for members in by_slot.values().filter(|m| m.len() > 1) {
        for (k, &i) in members.iter().enumerate() {
            for &j in &members[k + 1..] {
                if conflicts(&exams[i], &exams[j]) {
                    violations += 1;
                }
            }
        }
    }
    violations
}

/// Converts a violation count into a fitness in (0, 1].
pub fn fitness_from_violations(violations: usize) -> f64 {
    1.0 / (1.0 + violations as f64)
}

/// Scores chromosomes against a problem and grid.
#[derive(Debug)]
pub struct FitnessEvaluator {
    grid: SchedulingGrid,
    counters: Vec<Box<dyn ViolationCounter>>,
}

impl FitnessEvaluator {
    /// Creates an evaluator with no counters; every valid chromosome scores 1.
    pub fn new(grid: SchedulingGrid) -> Self {
        Self {
            grid,
            counters: Vec::new(),
        }
    }

    /// Creates an evaluator with the counters the problem's data calls for.
    ///
    /// - [`DirectConflicts`] if conflict pairs were declared
    /// - [`TeacherConflicts`] if any exam names a teacher
    /// - [`CohortConflicts`] if any exam lists students
    /// - [`CapacityViolations`] if the grid sets a daily capacity
    pub fn for_problem(problem: &ExamProblem, grid: &SchedulingGrid) -> Self {
        let mut evaluator = Self::new(grid.clone());
        if !problem.conflict_pairs().is_empty() {
            evaluator = evaluator.with_counter(DirectConflicts);
        }
        if problem.has_teachers() {
            evaluator = evaluator.with_counter(TeacherConflicts);
        }
        if problem.has_students() {
            evaluator = evaluator.with_counter(CohortConflicts);
        }
        if grid.daily_capacity.is_some() {
            evaluator = evaluator.with_counter(CapacityViolations);
        }
        evaluator
    }

    /// Adds a violation counter.
    pub fn with_counter<C: ViolationCounter + 'static>(mut self, counter: C) -> Self {
        self.counters.push(Box::new(counter));
        self
    }

    /// The grid chromosomes are checked against.
    pub fn grid(&self) -> &SchedulingGrid {
        &self.grid
    }

    /// Names of the active counters, in evaluation order.
    pub fn counter_names(&self) -> Vec<&'static str> {
        self.counters.iter().map(|c| c.name()).collect()
    }

    /// Violations per counter.
    pub fn breakdown(
        &self,
        problem: &ExamProblem,
        chromosome: &ExamChromosome,
    ) -> Result<Vec<(&'static str, usize)>, GaError> {
        chromosome.check(problem.exam_count(), &self.grid)?;
        Ok(self
            .counters
            .iter()
            .map(|c| (c.name(), c.count(problem, &self.grid, chromosome.genes())))
            .collect())
    }

    /// Total violations across all counters.
    pub fn count_violations(
        &self,
        problem: &ExamProblem,
        chromosome: &ExamChromosome,
    ) -> Result<usize, GaError> {
        Ok(self
            .breakdown(problem, chromosome)?
            .iter()
            .map(|(_, n)| n)
            .sum())
    }

    /// Fitness of a chromosome, without caching it.
    pub fn evaluate(
        &self,
        problem: &ExamProblem,
        chromosome: &ExamChromosome,
    ) -> Result<f64, GaError> {
        self.count_violations(problem, chromosome)
            .map(fitness_from_violations)
    }

    /// Evaluates and caches the fitness on the chromosome.
    pub fn score(
        &self,
        problem: &ExamProblem,
        chromosome: &mut ExamChromosome,
    ) -> Result<f64, GaError> {
        let fitness = self.evaluate(problem, chromosome)?;
        chromosome.set_fitness(fitness);
        Ok(fitness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConflictPair;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn genes(slots: &[(u32, u32)]) -> ExamChromosome {
        ExamChromosome::new(slots.iter().map(|&(d, s)| Slot::new(d, s)).collect())
    }

    fn conflict_problem() -> ExamProblem {
        ExamProblem::new(
            vec![Exam::new("A", 1.0), Exam::new("B", 1.0), Exam::new("C", 1.0)],
            vec![ConflictPair::new("A", "B"), ConflictPair::new("B", "C")],
        )
        .unwrap()
    }

    #[test]
    fn test_direct_conflicts() {
        let problem = conflict_problem();
        let grid = SchedulingGrid::slots_only(3);
        let eval = FitnessEvaluator::for_problem(&problem, &grid);
        assert_eq!(eval.counter_names(), vec!["direct"]);

        assert_eq!(eval.count_violations(&problem, &genes(&[(1, 1), (1, 2), (1, 3)])).unwrap(), 0);
        assert_eq!(eval.count_violations(&problem, &genes(&[(1, 1), (1, 1), (1, 3)])).unwrap(), 1);
        assert_eq!(eval.count_violations(&problem, &genes(&[(1, 2), (1, 2), (1, 2)])).unwrap(), 2);
    }

    #[test]
    fn test_direct_conflict_needs_same_day() {
        let problem = conflict_problem();
        let grid = SchedulingGrid::new(2, 1);
        let eval = FitnessEvaluator::for_problem(&problem, &grid);
        // Same slot index on different days is not a collision
        assert_eq!(eval.count_violations(&problem, &genes(&[(1, 1), (2, 1), (1, 1)])).unwrap(), 0);
    }

    #[test]
    fn test_teacher_conflicts() {
        let problem = ExamProblem::without_conflicts(vec![
            Exam::new("A", 1.0).with_teacher("T1"),
            Exam::new("B", 1.0).with_teacher("T1"),
            Exam::new("C", 1.0).with_teacher("T2"),
        ])
        .unwrap();
        let grid = SchedulingGrid::slots_only(2);
        let eval = FitnessEvaluator::for_problem(&problem, &grid);
        assert_eq!(eval.counter_names(), vec!["teacher"]);

        // A and B collide; C shares the slot but has another teacher
        assert_eq!(eval.count_violations(&problem, &genes(&[(1, 1), (1, 1), (1, 1)])).unwrap(), 1);
        assert_eq!(eval.count_violations(&problem, &genes(&[(1, 1), (1, 2), (1, 1)])).unwrap(), 0);
    }

    #[test]
    fn test_cohort_conflicts() {
        let problem = ExamProblem::without_conflicts(vec![
            Exam::new("A", 1.0).with_students(["s1", "s2"]),
            Exam::new("B", 1.0).with_students(["s2"]),
            Exam::new("C", 1.0).with_students(["s1"]),
            Exam::new("D", 1.0).with_students(["s9"]),
        ])
        .unwrap();
        let grid = SchedulingGrid::slots_only(4);
        let eval = FitnessEvaluator::for_problem(&problem, &grid);

        // Pairs in one slot: AB, AC share students; BC, AD, BD, CD don't
        let all_same = genes(&[(1, 1), (1, 1), (1, 1), (1, 1)]);
        assert_eq!(eval.count_violations(&problem, &all_same).unwrap(), 2);
    }

    #[test]
    fn test_capacity_incremental() {
        let problem = ExamProblem::without_conflicts(vec![
            Exam::new("A", 3.0),
            Exam::new("B", 3.0),
            Exam::new("C", 3.0),
        ])
        .unwrap();
        let grid = SchedulingGrid::new(2, 3).with_daily_capacity(4.0);
        let eval = FitnessEvaluator::for_problem(&problem, &grid);
        assert_eq!(eval.counter_names(), vec!["capacity"]);

        // Day 1: 3 ok, 6 > 4 (violation), 9 > 4 (violation)
        assert_eq!(eval.count_violations(&problem, &genes(&[(1, 1), (1, 2), (1, 3)])).unwrap(), 2);
        // Day 1: 3, 6 (violation); day 2: 3
        assert_eq!(eval.count_violations(&problem, &genes(&[(1, 1), (1, 2), (2, 1)])).unwrap(), 1);
    }

    #[test]
    fn test_capacity_daily_total() {
        let problem = ExamProblem::without_conflicts(vec![
            Exam::new("A", 3.0),
            Exam::new("B", 3.0),
            Exam::new("C", 3.0),
        ])
        .unwrap();
        let grid = SchedulingGrid::new(2, 3)
            .with_daily_capacity(4.0)
            .with_capacity_policy(CapacityPolicy::DailyTotal);
        let eval = FitnessEvaluator::for_problem(&problem, &grid);

        // One overfull day counts once regardless of how many exams it holds
        assert_eq!(eval.count_violations(&problem, &genes(&[(1, 1), (1, 2), (1, 3)])).unwrap(), 1);
        assert_eq!(eval.count_violations(&problem, &genes(&[(1, 1), (2, 2), (2, 3)])).unwrap(), 1);
    }

    #[test]
    fn test_capacity_exact_fit_is_allowed() {
        let problem =
            ExamProblem::without_conflicts(vec![Exam::new("A", 2.0), Exam::new("B", 2.0)]).unwrap();
        let grid = SchedulingGrid::new(1, 2).with_daily_capacity(4.0);
        let eval = FitnessEvaluator::for_problem(&problem, &grid);
        assert_eq!(eval.evaluate(&problem, &genes(&[(1, 1), (1, 2)])).unwrap(), 1.0);
    }

    #[test]
    fn test_fitness_formula() {
        assert_eq!(fitness_from_violations(0), 1.0);
        assert_eq!(fitness_from_violations(1), 0.5);
        assert_eq!(fitness_from_violations(3), 0.25);
    }

    #[test]
    fn test_fitness_bounds_random() {
        let problem = ExamProblem::new(
            (0..8)
                .map(|i| {
                    Exam::new(format!("E{i}"), 2.0)
                        .with_teacher(format!("T{}", i % 3))
                        .with_student(format!("s{}", i % 2))
                })
                .collect(),
            vec![ConflictPair::new("E0", "E1"), ConflictPair::new("E2", "E5")],
        )
        .unwrap();
        let grid = SchedulingGrid::new(2, 2).with_daily_capacity(5.0);
        let eval = FitnessEvaluator::for_problem(&problem, &grid);
        assert_eq!(eval.counter_names().len(), 4);

        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..200 {
            let ch = ExamChromosome::random(8, &grid, &mut rng);
            let fitness = eval.evaluate(&problem, &ch).unwrap();
            let violations = eval.count_violations(&problem, &ch).unwrap();
            assert!(fitness > 0.0 && fitness <= 1.0);
            assert_eq!(fitness == 1.0, violations == 0);
        }
    }

    #[test]
    fn test_score_caches_fitness() {
        let problem = conflict_problem();
        let grid = SchedulingGrid::slots_only(3);
        let eval = FitnessEvaluator::for_problem(&problem, &grid);
        let mut ch = genes(&[(1, 1), (1, 1), (1, 3)]);

        assert_eq!(eval.score(&problem, &mut ch).unwrap(), 0.5);
        assert_eq!(ch.fitness(), Some(0.5));
    }

    #[test]
    fn test_malformed_chromosome_rejected() {
        let problem = conflict_problem();
        let grid = SchedulingGrid::slots_only(3);
        let eval = FitnessEvaluator::for_problem(&problem, &grid);

        let short = genes(&[(1, 1)]);
        assert!(matches!(
            eval.evaluate(&problem, &short),
            Err(GaError::InvariantViolation(_))
        ));

        let outside = genes(&[(1, 1), (2, 1), (1, 1)]);
        assert!(matches!(
            eval.evaluate(&problem, &outside),
            Err(GaError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_breakdown_per_counter() {
        let problem = ExamProblem::new(
            vec![
                Exam::new("A", 3.0).with_teacher("T1"),
                Exam::new("B", 3.0).with_teacher("T1"),
            ],
            vec![ConflictPair::new("A", "B")],
        )
        .unwrap();
        let grid = SchedulingGrid::new(1, 2).with_daily_capacity(5.0);
        let eval = FitnessEvaluator::for_problem(&problem, &grid);

        let breakdown = eval.breakdown(&problem, &genes(&[(1, 1), (1, 1)])).unwrap();
        assert_eq!(breakdown, vec![("direct", 1), ("teacher", 1), ("capacity", 1)]);
        assert_eq!(eval.evaluate(&problem, &genes(&[(1, 1), (1, 1)])).unwrap(), 0.25);
    }

    #[test]
    fn test_empty_evaluator_scores_one() {
        let problem = conflict_problem();
        let grid = SchedulingGrid::slots_only(1);
        let eval = FitnessEvaluator::new(grid);
        assert_eq!(eval.evaluate(&problem, &genes(&[(1, 1), (1, 1), (1, 1)])).unwrap(), 1.0);
    }
}
