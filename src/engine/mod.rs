//! Progression engine - next-session prescriptions
//!
//! Features:
//! - Progressive overload from the last session's top working set
//! - Warm-up weight per equipment class
//! - Exercise denylist (injury constraint)
//! - Weekly volume and day planning on top of the above
//!
//! Everything here is a pure function of the catalog entry and the history slice
//! passed in; nothing is cached between calls.

pub mod planner;
pub mod progression;
pub mod rules;
pub mod volume;
pub mod warmup;

pub use planner::{Focus, PlannedExercise, Planner};
pub use progression::last_session;
pub use rules::{Equipment, ProgressionRules};
pub use volume::{WeeklyVolume, DEFAULT_WEEKLY_GOAL};

use crate::exercises::ExerciseDefinition;
use crate::history::WorkoutLogEntry;

/// Prescribed working set for the next session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prescription {
    pub weight: f64,
    pub reps: u32,
    /// True when the weight went up compared to the last session
    pub is_increase: bool,
}

/// Next working weight and rep target using the default rules
pub fn compute_progression(exercise: &ExerciseDefinition, history: &[WorkoutLogEntry]) -> Prescription {
    ProgressionRules::default().progression(exercise, history)
}

/// Warm-up weight for `target_weight` using the default rules
pub fn compute_warmup(target_weight: f64, exercise: &ExerciseDefinition) -> f64 {
    ProgressionRules::default().warmup(target_weight, exercise)
}

/// False for exercises on the default denylist (pull-ups, chin-ups)
pub fn is_exercise_allowed(exercise: &ExerciseDefinition) -> bool {
    ProgressionRules::default().is_allowed(exercise)
}
