//! Scheduling grid: days × slots-per-day with an optional daily capacity.
//!
//! # Coordinates
//! Cells are 1-based: `day ∈ [1, days]`, `slot ∈ [1, slots_per_day]`.
//! A grid without a day dimension is simply `days = 1`.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// One cell of the grid, i.e. one gene value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    /// Day index (1-based).
    pub day: u32,
    /// Slot index within the day (1-based).
    pub slot: u32,
}

impl Slot {
    /// Creates a slot at `(day, slot)`.
    pub fn new(day: u32, slot: u32) -> Self {
        Self { day, slot }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}S{}", self.day, self.slot)
    }
}

/// How daily capacity violations are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CapacityPolicy {
    /// Accumulate durations day by day in exam order; every exam whose
    /// addition pushes its day over capacity counts one violation.
    #[default]
    Incremental,
    /// Compare each day's true total once; one violation per overfull day.
    DailyTotal,
}

/// The timetable shape exams are placed on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingGrid {
    /// Number of days (≥ 1).
    pub days: u32,
    /// Number of slots per day (≥ 1).
    pub slots_per_day: u32,
    /// Maximum cumulative exam duration per day. `None` = unlimited.
    pub daily_capacity: Option<f64>,
    /// Counting rule for capacity violations.
    pub capacity_policy: CapacityPolicy,
}

impl Default for SchedulingGrid {
    /// Single day with ten slots and no capacity limit.
    fn default() -> Self {
        Self::slots_only(10)
    }
}

impl SchedulingGrid {
    /// Creates a grid with `days × slots_per_day` cells and no capacity limit.
    pub fn new(days: u32, slots_per_day: u32) -> Self {
        Self {
            days,
            slots_per_day,
            daily_capacity: None,
            capacity_policy: CapacityPolicy::default(),
        }
    }

    /// Creates a grid with no day dimension (`days = 1`).
    pub fn slots_only(slots: u32) -> Self {
        Self::new(1, slots)
    }

    /// Sets the per-day capacity.
    pub fn with_daily_capacity(mut self, capacity: f64) -> Self {
        self.daily_capacity = Some(capacity);
        self
    }

    /// Sets the capacity counting rule.
    pub fn with_capacity_policy(mut self, policy: CapacityPolicy) -> Self {
        self.capacity_policy = policy;
        self
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> u64 {
        u64::from(self.days) * u64::from(self.slots_per_day)
    }

    /// Whether the slot lies inside this grid.
    pub fn contains(&self, slot: Slot) -> bool {
        (1..=self.days).contains(&slot.day) && (1..=self.slots_per_day).contains(&slot.slot)
    }

    /// Draws a uniformly random cell: day first, then slot.
    ///
    /// The grid must have at least one day and one slot.
    pub fn random_slot<R: Rng>(&self, rng: &mut R) -> Slot {
        let day = rng.random_range(1..=self.days);
        let slot = rng.random_range(1..=self.slots_per_day);
        Slot { day, slot }
    }

    /// Iterates over every cell, day-major.
    pub fn cells(&self) -> impl Iterator<Item = Slot> + '_ {
        (1..=self.days).flat_map(move |day| (1..=self.slots_per_day).map(move |slot| Slot { day, slot }))
    }
}
