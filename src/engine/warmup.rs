//! Warm-up set weight

use super::rules::{round_to_step, ProgressionRules};
use crate::exercises::ExerciseDefinition;

impl ProgressionRules {
    /// Warm-up weight for a working weight: a share of it rounded to the
    /// equipment increment, never below one increment.
    pub fn warmup(&self, target_weight: f64, exercise: &ExerciseDefinition) -> f64 {
        let step = self.warmup_rounding(self.equipment(exercise));
        let raw = target_weight * self.warmup_ratio;
        round_to_step(raw, step).max(step)
    }
}
