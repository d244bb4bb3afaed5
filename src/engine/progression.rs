//! Next-session prescription from the most recent session of an exercise

use std::cmp::Reverse;

use tracing::debug;

use super::rules::{round_to_step, ProgressionRules};
use super::Prescription;
use crate::exercises::ExerciseDefinition;
use crate::history::WorkoutLogEntry;

/// Most recent entry containing the exercise.
///
/// Ties on timestamp resolve to the entry that comes first in `history`
/// (the sort is stable).
pub fn last_session<'a>(history: &'a [WorkoutLogEntry], exercise_id: &str) -> Option<&'a WorkoutLogEntry> {
    let mut sorted: Vec<&WorkoutLogEntry> = history.iter().collect();
    sorted.sort_by_key(|log| Reverse(log.timestamp));
    sorted.into_iter().find(|log| log.contains(exercise_id))
}

impl ProgressionRules {
    pub fn progression(&self, exercise: &ExerciseDefinition, history: &[WorkoutLogEntry]) -> Prescription {
        let cold_start = Prescription {
            weight: exercise.default_weight,
            reps: self.cold_start_reps,
            is_increase: false,
        };

        let Some(group) = last_session(history, &exercise.id).and_then(|log| log.sets_for(&exercise.id)) else {
            debug!(exercise = %exercise.id, "no history, cold start");
            return cold_start;
        };

        let basis = group.progression_basis();
        if basis.is_empty() {
            return cold_start;
        }

        let max_weight = basis.iter().map(|s| s.weight).fold(f64::NEG_INFINITY, f64::max);
        let reps_at_max = basis
            .iter()
            .filter(|s| s.weight == max_weight)
            .map(|s| s.reps)
            .max()
            .unwrap_or(0);

        let prescription = if reps_at_max > self.rep_threshold {
            let (increase, rounding) = self.increase_steps(self.equipment(exercise));
            Prescription {
                weight: round_to_step(max_weight + increase, rounding),
                reps: self.increase_reps,
                is_increase: true,
            }
        } else {
            Prescription {
                weight: max_weight,
                reps: reps_at_max.saturating_add(1).min(self.rep_cap),
                is_increase: false,
            }
        };

        debug!(
            exercise = %exercise.id,
            max_weight,
            reps_at_max,
            weight = prescription.weight,
            reps = prescription.reps,
            increase = prescription.is_increase,
            "progression computed"
        );
        prescription
    }
}
