//! Weekly working-set volume per muscle group

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, Local, NaiveTime, Offset, TimeZone};

use crate::exercises::{find_exercise, ExerciseDefinition, MuscleGroup};
use crate::history::WorkoutLogEntry;

/// Weekly set goal used when none is configured
pub const DEFAULT_WEEKLY_GOAL: u32 = 20;

/// Monday 00:00 in the zone of `now` for the week containing `now`, as epoch millis.
///
/// When a DST jump skips Monday midnight the week starts at the first instant
/// after the jump (01:00 local for the usual one-hour gap).
pub fn week_start_millis<Tz: TimeZone>(now: DateTime<Tz>) -> i64 {
    let tz = now.timezone();
    let monday = now.date_naive() - Duration::days(now.weekday().num_days_from_monday() as i64);
    let midnight = monday.and_time(NaiveTime::MIN);

    let start = tz
        .from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest());
    match start {
        Some(dt) => dt.timestamp_millis(),
        None => {
            let offset_secs = now.offset().fix().local_minus_utc() as i64;
            midnight.and_utc().timestamp_millis() - offset_secs * 1000
        }
    }
}

/// Working sets per muscle group since the start of the week
#[derive(Debug, Clone, Default)]
pub struct WeeklyVolume {
    sets: HashMap<MuscleGroup, u32>,
}

impl WeeklyVolume {
    /// Count working sets from this week's sessions. Tennis and exercises
    /// missing from the catalog are skipped.
    pub fn from_history(
        history: &[WorkoutLogEntry],
        catalog: &[ExerciseDefinition],
        now: DateTime<Local>,
    ) -> Self {
        let since = week_start_millis(now);
        let mut sets: HashMap<MuscleGroup, u32> = HashMap::new();

        for log in history.iter().filter(|l| l.timestamp >= since) {
            for (exercise_id, group) in &log.exercises {
                let exercise = match find_exercise(catalog, exercise_id) {
                    Some(ex) => ex,
                    None => continue,
                };
                if exercise.category == MuscleGroup::Tennis {
                    continue;
                }
                *sets.entry(exercise.category).or_insert(0) += group.working_count() as u32;
            }
        }

        Self { sets }
    }

    /// Sets done this week for a group
    pub fn done(&self, group: MuscleGroup) -> u32 {
        self.sets.get(&group).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.sets.values().sum()
    }

    /// Per-group report against goals, most remaining first
    pub fn report(&self, goals: &HashMap<MuscleGroup, u32>) -> Vec<(MuscleGroup, u32, u32)> {
        let mut rows: Vec<_> = MuscleGroup::strength()
            .map(|g| {
                let goal = goals.get(&g).copied().unwrap_or(DEFAULT_WEEKLY_GOAL);
                (g, self.done(g), goal)
            })
            .collect();
        rows.sort_by_key(|(_, done, goal)| std::cmp::Reverse(goal.saturating_sub(*done)));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, LocalResult, NaiveDate, NaiveDateTime, Utc};

    use crate::exercises::default_catalog;
    use crate::history::{ExerciseSets, SetEntry};

    fn now() -> DateTime<Local> {
        // Wednesday
        Local.with_ymd_and_hms(2025, 3, 12, 18, 30, 0).unwrap()
    }

    fn log_at(at: DateTime<Local>, exercise_id: &str, sets: Vec<SetEntry>) -> WorkoutLogEntry {
        let mut log = WorkoutLogEntry::new(at.timestamp_millis());
        log.exercises.insert(
            exercise_id.to_string(),
            ExerciseSets { sets, order: 1, setting: None },
        );
        log
    }

    #[test]
    fn test_week_start_is_monday_midnight() {
        let start = Local.timestamp_millis_opt(week_start_millis(now())).unwrap();
        assert_eq!(start.weekday(), chrono::Weekday::Mon);
        assert_eq!(start.date_naive().day(), 10);
        assert_eq!(start.time(), NaiveTime::MIN);
    }

    /// UTC-4 until Monday 2025-03-10 00:00 local, when clocks jump to 01:00 (UTC-3)
    #[derive(Debug, Clone, Copy)]
    struct MidnightJump;

    impl MidnightJump {
        fn jump() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap().and_hms_opt(4, 0, 0).unwrap()
        }

        fn before() -> FixedOffset {
            FixedOffset::west_opt(4 * 3600).unwrap()
        }

        fn after() -> FixedOffset {
            FixedOffset::west_opt(3 * 3600).unwrap()
        }
    }

    impl TimeZone for MidnightJump {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            MidnightJump
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let as_before = *local - Self::before();
            let as_after = *local - Self::after();
            match (as_before < Self::jump(), as_after >= Self::jump()) {
                (true, true) => LocalResult::Ambiguous(Self::before(), Self::after()),
                (true, false) => LocalResult::Single(Self::before()),
                (false, true) => LocalResult::Single(Self::after()),
                (false, false) => LocalResult::None,
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::jump() { Self::before() } else { Self::after() }
        }
    }

    #[test]
    fn test_week_start_in_fixed_zone() {
        let zone = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = zone.with_ymd_and_hms(2025, 3, 12, 18, 30, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2025, 3, 9, 22, 0, 0).unwrap();
        assert_eq!(week_start_millis(now), expected.timestamp_millis());
    }

    #[test]
    fn test_week_start_after_skipped_midnight() {
        let midnight = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap().and_time(NaiveTime::MIN);
        assert!(MidnightJump.from_local_datetime(&midnight).earliest().is_none());
        assert!(MidnightJump.from_local_datetime(&(midnight + Duration::hours(1))).single().is_some());

        let now = MidnightJump.with_ymd_and_hms(2025, 3, 12, 18, 30, 0).unwrap();
        // 01:00 local at UTC-3 is the jump instant itself
        let expected = Utc.with_ymd_and_hms(2025, 3, 10, 4, 0, 0).unwrap();
        assert_eq!(week_start_millis(now), expected.timestamp_millis());
    }

    #[test]
    fn test_counts_working_sets_this_week() {
        let catalog = default_catalog();
        let monday = Local.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let last_week = Local.with_ymd_and_hms(2025, 3, 8, 9, 0, 0).unwrap();
        let history = vec![
            log_at(
                monday,
                "cable_row",
                vec![SetEntry::warmup(30.0, 12), SetEntry::working(50.0, 10), SetEntry::working(50.0, 9)],
            ),
            log_at(monday, "leg_press", vec![SetEntry::working(80.0, 10)]),
            log_at(last_week, "cable_row", vec![SetEntry::working(50.0, 10)]),
        ];

        let volume = WeeklyVolume::from_history(&history, &catalog, now());
        assert_eq!(volume.done(MuscleGroup::Back), 2);
        assert_eq!(volume.done(MuscleGroup::Legs), 1);
        assert_eq!(volume.done(MuscleGroup::Chest), 0);
        assert_eq!(volume.total(), 3);
    }

    #[test]
    fn test_skips_tennis_and_unknown() {
        let catalog = default_catalog();
        let history = vec![
            log_at(now(), "tennis_1", vec![SetEntry::working(0.0, 1)]),
            log_at(now(), "mystery", vec![SetEntry::working(10.0, 10)]),
        ];
        let volume = WeeklyVolume::from_history(&history, &catalog, now());
        assert_eq!(volume.total(), 0);
    }

    #[test]
    fn test_report_orders_by_remaining() {
        let catalog = default_catalog();
        let history = vec![log_at(
            now(),
            "leg_press",
            (0..15).map(|_| SetEntry::working(80.0, 10)).collect(),
        )];
        let volume = WeeklyVolume::from_history(&history, &catalog, now());
        let report = volume.report(&HashMap::new());
        assert_eq!(report.len(), 5);
        assert_eq!(report.last().unwrap().0, MuscleGroup::Legs);
        assert_eq!(report.last().unwrap().1, 15);
    }
}
