//! Day workout planner based on open weekly volume

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::rules::ProgressionRules;
use super::volume::{WeeklyVolume, DEFAULT_WEEKLY_GOAL};
use crate::exercises::{ExerciseDefinition, MuscleGroup};

/// Max sets assigned to one exercise before moving to the next in the pool
const MAX_SETS_PER_EXERCISE: u32 = 3;

/// Session focus chosen for a day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Push,
    Pull,
    Legs,
    Arms,
}

impl Focus {
    /// Muscle groups trained with this focus, in fill order
    pub fn groups(&self) -> &'static [MuscleGroup] {
        match self {
            Focus::Push => &[MuscleGroup::Chest, MuscleGroup::Shoulders, MuscleGroup::Arms],
            Focus::Pull => &[MuscleGroup::Back, MuscleGroup::Arms],
            Focus::Legs => &[MuscleGroup::Legs, MuscleGroup::Arms],
            Focus::Arms => &[MuscleGroup::Arms],
        }
    }
}

impl fmt::Display for Focus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Focus::Push => "push",
            Focus::Pull => "pull",
            Focus::Legs => "legs",
            Focus::Arms => "arms",
        };
        f.write_str(name)
    }
}

impl FromStr for Focus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        // Label matching is loose: "Legs/Arms" plans legs
        if lower.contains("push") {
            Ok(Focus::Push)
        } else if lower.contains("pull") {
            Ok(Focus::Pull)
        } else if lower.contains("leg") || lower.contains("beine") {
            Ok(Focus::Legs)
        } else if lower.contains("arm") {
            Ok(Focus::Arms)
        } else {
            anyhow::bail!("unknown focus: {} (expected push, pull, legs or arms)", s)
        }
    }
}

/// Exercise slot in a generated plan
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedExercise {
    pub exercise_id: String,
    pub group: MuscleGroup,
    pub sets: u32,
}

/// Sets to schedule today for one group.
///
/// Spreads the remaining weekly goal over roughly every second day left in the week.
pub fn sets_for_today(goal: u32, done: u32, day_index: u32) -> u32 {
    let remaining = goal.saturating_sub(done);
    let sessions_left = 7u32.saturating_sub(day_index.min(6)) as f64;
    let divisor = (sessions_left / 2.0).max(1.0);
    (remaining as f64 / divisor).ceil() as u32
}

/// Day planner over a catalog
pub struct Planner<'a> {
    catalog: &'a [ExerciseDefinition],
    rules: &'a ProgressionRules,
    goals: HashMap<MuscleGroup, u32>,
}

impl<'a> Planner<'a> {
    pub fn new(catalog: &'a [ExerciseDefinition], rules: &'a ProgressionRules) -> Self {
        Self {
            catalog,
            rules,
            goals: HashMap::new(),
        }
    }

    /// Override the weekly set goal of a group
    pub fn with_goal(mut self, group: MuscleGroup, sets: u32) -> Self {
        self.goals.insert(group, sets);
        self
    }

    fn goal(&self, group: MuscleGroup) -> u32 {
        self.goals.get(&group).copied().unwrap_or(DEFAULT_WEEKLY_GOAL)
    }

    /// Allowed exercises of a group, lowest priority value first
    fn pool(&self, group: MuscleGroup) -> Vec<&'a ExerciseDefinition> {
        let mut pool: Vec<_> = self
            .catalog
            .iter()
            .filter(|e| e.category == group && self.rules.is_allowed(e))
            .collect();
        pool.sort_by_key(|e| e.priority_or_default());
        pool
    }

    /// Plan a session for `day_index` (0 = Monday)
    pub fn plan_day(&self, day_index: u32, focus: Focus, volume: &WeeklyVolume) -> Vec<PlannedExercise> {
        let mut plan: Vec<PlannedExercise> = Vec::new();

        for &group in focus.groups() {
            let target = sets_for_today(self.goal(group), volume.done(group), day_index);
            let mut added = 0;

            for exercise in self.pool(group) {
                if added >= target {
                    break;
                }
                let needed = MAX_SETS_PER_EXERCISE.min(target - added);
                match plan.iter_mut().find(|p| p.exercise_id == exercise.id) {
                    Some(slot) => slot.sets += needed,
                    None => plan.push(PlannedExercise {
                        exercise_id: exercise.id.clone(),
                        group,
                        sets: needed,
                    }),
                }
                added += needed;
            }
        }

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercises::default_catalog;

    #[test]
    fn test_focus_from_str() {
        assert_eq!("Push".parse::<Focus>().unwrap(), Focus::Push);
        assert_eq!("Legs/Arms".parse::<Focus>().unwrap(), Focus::Legs);
        assert_eq!("arms".parse::<Focus>().unwrap(), Focus::Arms);
        assert!("cardio".parse::<Focus>().is_err());
    }

    #[test]
    fn test_sets_for_today() {
        // Monday: 7 sessions left -> 20 / 3.5 = 5.7 -> 6
        assert_eq!(sets_for_today(20, 0, 0), 6);
        // Sunday: divisor floors at 1
        assert_eq!(sets_for_today(20, 14, 6), 6);
        // Goal met
        assert_eq!(sets_for_today(20, 25, 2), 0);
    }

    #[test]
    fn test_plan_pull_monday() {
        let catalog = default_catalog();
        let rules = ProgressionRules::default();
        let planner = Planner::new(&catalog, &rules);
        let plan = planner.plan_day(0, Focus::Pull, &WeeklyVolume::default());

        // Back: 6 sets over lat pulldown and cable row, pull-up is excluded
        assert_eq!(
            plan[0],
            PlannedExercise { exercise_id: "lat_pulldown".to_string(), group: MuscleGroup::Back, sets: 3 }
        );
        assert_eq!(plan[1].exercise_id, "cable_row");
        assert_eq!(plan[1].sets, 3);
        assert!(plan.iter().all(|p| p.exercise_id != "pull_up"));

        // Arms follow
        let arm_sets: u32 = plan.iter().filter(|p| p.group == MuscleGroup::Arms).map(|p| p.sets).sum();
        assert_eq!(arm_sets, 6);
    }

    #[test]
    fn test_plan_respects_goal_and_pool_size() {
        let catalog = default_catalog();
        let rules = ProgressionRules::default();
        let planner = Planner::new(&catalog, &rules).with_goal(MuscleGroup::Arms, 40);
        let plan = planner.plan_day(6, Focus::Arms, &WeeklyVolume::default());

        // 40 sets wanted but only two arm exercises at 3 sets each
        let total: u32 = plan.iter().map(|p| p.sets).sum();
        assert_eq!(total, 6);
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn test_plan_partial_last_exercise() {
        let catalog = default_catalog();
        let rules = ProgressionRules::default();
        let planner = Planner::new(&catalog, &rules).with_goal(MuscleGroup::Legs, 4);
        let plan = planner.plan_day(6, Focus::Legs, &WeeklyVolume::default());

        let legs: Vec<_> = plan.iter().filter(|p| p.group == MuscleGroup::Legs).collect();
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].sets, 3);
        assert_eq!(legs[1].sets, 1);
    }
}
