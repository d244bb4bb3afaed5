//! Active training session - prescribed sets the user edits before saving

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::engine::{PlannedExercise, ProgressionRules};
use crate::exercises::{find_exercise, ExerciseDefinition};
use crate::history::{format_duration, ExerciseSets, SetEntry, WorkoutLogEntry};

/// Working sets seeded for an exercise when no count was planned
pub const DEFAULT_WORKING_SETS: u32 = 2;
/// Reps prescribed for the warm-up set
pub const WARMUP_REPS: u32 = 12;
const WORKING_RPE: f64 = 8.0;

/// Session in progress
#[derive(Debug, Clone, Default)]
pub struct ActiveSession {
    /// Start time, epoch millis
    pub start: Option<i64>,
    pub exercises: BTreeMap<String, ExerciseSets>,
    /// Planned working set counts per exercise, consumed by seeding
    planned: BTreeMap<String, u32>,
}

impl ActiveSession {
    pub fn start(at_millis: i64) -> Self {
        Self {
            start: Some(at_millis),
            ..Self::default()
        }
    }

    pub fn is_running(&self) -> bool {
        self.start.is_some()
    }

    fn next_order(&self) -> u32 {
        self.exercises.values().map(|e| e.order).max().unwrap_or(0) + 1
    }

    /// Add an exercise with no sets; no-op if already present
    pub fn add_exercise(&mut self, exercise_id: &str) {
        if self.exercises.contains_key(exercise_id) {
            return;
        }
        let order = self.next_order();
        self.exercises.insert(exercise_id.to_string(), ExerciseSets::new(order));
    }

    /// Add planned exercises, remembering how many working sets each should get
    pub fn add_plan(&mut self, plan: &[PlannedExercise]) {
        for slot in plan {
            self.add_exercise(&slot.exercise_id);
            *self.planned.entry(slot.exercise_id.clone()).or_insert(0) += slot.sets;
        }
    }

    /// Drop an exercise and close the gap it leaves in the display order
    pub fn remove_exercise(&mut self, exercise_id: &str) -> bool {
        self.planned.remove(exercise_id);
        let removed = self.exercises.remove(exercise_id).is_some();
        if removed {
            self.renumber();
        }
        removed
    }

    /// Reassign display orders as 1..=n keeping the current sequence
    fn renumber(&mut self) {
        let ids: Vec<String> = self.ordered_ids().into_iter().map(String::from).collect();
        for (rank, id) in ids.iter().enumerate() {
            if let Some(group) = self.exercises.get_mut(id) {
                group.order = rank as u32 + 1;
            }
        }
    }

    /// Fill every exercise without sets with a warm-up set and the prescribed
    /// working sets. Exercises unknown to the catalog are left empty.
    pub fn seed_prescriptions(
        &mut self,
        catalog: &[ExerciseDefinition],
        history: &[WorkoutLogEntry],
        rules: &ProgressionRules,
    ) {
        for (id, group) in self.exercises.iter_mut() {
            if !group.sets.is_empty() {
                continue;
            }
            let Some(exercise) = find_exercise(catalog, id) else {
                warn!(exercise = %id, "not in catalog, leaving sets empty");
                continue;
            };

            let prescription = rules.progression(exercise, history);
            let warmup = rules.warmup(prescription.weight, exercise);
            let working = self.planned.get(id).copied().unwrap_or(DEFAULT_WORKING_SETS);

            group.sets.push(SetEntry::warmup(warmup, WARMUP_REPS).with_rpe(0.0));
            for _ in 0..working {
                group
                    .sets
                    .push(SetEntry::working(prescription.weight, prescription.reps).with_rpe(WORKING_RPE));
            }
            if group.setting.is_none() {
                group.setting = exercise.setting.clone();
            }
            debug!(exercise = %id, warmup, weight = prescription.weight, reps = prescription.reps, "seeded");
        }
    }

    fn group_mut(&mut self, exercise_id: &str) -> Result<&mut ExerciseSets> {
        self.exercises
            .get_mut(exercise_id)
            .with_context(|| format!("exercise {} is not in the session", exercise_id))
    }

    fn set_mut(&mut self, exercise_id: &str, index: usize) -> Result<&mut SetEntry> {
        self.group_mut(exercise_id)?
            .sets
            .get_mut(index)
            .with_context(|| format!("no set #{} for {}", index + 1, exercise_id))
    }

    /// Append a working set copying the last set's weight and reps
    pub fn add_set(&mut self, exercise_id: &str) -> Result<()> {
        let group = self.group_mut(exercise_id)?;
        let (weight, reps) = group.sets.last().map(|s| (s.weight, s.reps)).unwrap_or((0.0, 0));
        group.sets.push(SetEntry::working(weight, reps).with_rpe(WORKING_RPE));
        Ok(())
    }

    pub fn remove_set(&mut self, exercise_id: &str, index: usize) -> Result<SetEntry> {
        let group = self.group_mut(exercise_id)?;
        anyhow::ensure!(index < group.sets.len(), "no set #{} for {}", index + 1, exercise_id);
        Ok(group.sets.remove(index))
    }

    pub fn update_set(&mut self, exercise_id: &str, index: usize, weight: f64, reps: u32) -> Result<()> {
        let set = self.set_mut(exercise_id, index)?;
        set.weight = weight;
        set.reps = reps;
        Ok(())
    }

    /// Switch a set between working and warm-up
    pub fn toggle_kind(&mut self, exercise_id: &str, index: usize) -> Result<()> {
        let set = self.set_mut(exercise_id, index)?;
        set.kind = set.kind.toggled();
        Ok(())
    }

    pub fn toggle_completed(&mut self, exercise_id: &str, index: usize) -> Result<()> {
        let set = self.set_mut(exercise_id, index)?;
        set.completed = Some(!set.completed.unwrap_or(false));
        Ok(())
    }

    /// Swap display order with the neighbour in `direction` (-1 up, 1 down).
    /// Returns false when there is no neighbour.
    pub fn move_exercise(&mut self, exercise_id: &str, direction: i32) -> bool {
        if direction == 0 {
            return false;
        }
        // Imported or hand-built sessions may carry sparse or repeated orders
        self.renumber();
        let Some(current) = self.exercises.get(exercise_id).map(|e| e.order) else {
            return false;
        };
        let target = current as i64 + direction.signum() as i64;
        let swap_id = self
            .exercises
            .iter()
            .find(|(_, e)| e.order as i64 == target)
            .map(|(id, _)| id.clone());

        match swap_id {
            Some(swap_id) => {
                if let Some(other) = self.exercises.get_mut(&swap_id) {
                    other.order = current;
                }
                if let Some(this) = self.exercises.get_mut(exercise_id) {
                    this.order = target as u32;
                }
                true
            }
            None => false,
        }
    }

    /// Exercise ids in display order
    pub fn ordered_ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.exercises.iter().collect();
        ids.sort_by_key(|(_, e)| e.order);
        ids.into_iter().map(|(id, _)| id.as_str()).collect()
    }

    /// Close the session into a log entry stamped with its start time.
    /// The caller appends it to history.
    pub fn finish(self, now_millis: i64, note: impl Into<String>) -> WorkoutLogEntry {
        let start = self.start.unwrap_or(now_millis);
        WorkoutLogEntry {
            timestamp: start,
            duration: format_duration(now_millis - start),
            note: note.into(),
            exercises: self.exercises,
        }
    }
}
