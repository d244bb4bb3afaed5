//! Workout history records
//!
//! A history is just a slice of [`WorkoutLogEntry`]; order of storage is irrelevant,
//! consumers sort by timestamp when they need recency.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::exercises::MachineSetting;

/// Kind of a performed set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SetKind {
    /// Counted toward progression and weekly volume
    #[default]
    #[serde(rename = "A")]
    Working,
    #[serde(rename = "W")]
    Warmup,
}

impl SetKind {
    pub fn toggled(self) -> Self {
        match self {
            SetKind::Working => SetKind::Warmup,
            SetKind::Warmup => SetKind::Working,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SetKind::Working => "work",
            SetKind::Warmup => "warm",
        }
    }
}

/// Numeric field as written by form inputs: a number, a numeric string,
/// `null` (a cleared input) or something unusable. Non-finite values count as absent.
pub(crate) fn loose_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    let number = value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    });
    Ok(number.filter(|n| n.is_finite()))
}

/// Missing weight is 0; negative weight is kept as logged
fn loose_weight<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(loose_number(deserializer)?.unwrap_or(0.0))
}

/// Missing reps are 0; fractions round to the nearest rep, negatives clamp to 0
fn loose_reps<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(loose_number(deserializer)?
        .map(|r| r.round().clamp(0.0, u32::MAX as f64) as u32)
        .unwrap_or(0))
}

/// One performed or prescribed set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetEntry {
    #[serde(rename = "w", default, deserialize_with = "loose_weight")]
    pub weight: f64,
    #[serde(rename = "r", default, deserialize_with = "loose_reps")]
    pub reps: u32,
    #[serde(default, deserialize_with = "loose_number", skip_serializing_if = "Option::is_none")]
    pub rpe: Option<f64>,
    /// Missing kinds in stored history are treated as working sets
    #[serde(rename = "type", default)]
    pub kind: SetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl SetEntry {
    pub fn working(weight: f64, reps: u32) -> Self {
        Self {
            weight,
            reps,
            rpe: None,
            kind: SetKind::Working,
            completed: None,
        }
    }

    pub fn warmup(weight: f64, reps: u32) -> Self {
        Self {
            kind: SetKind::Warmup,
            ..Self::working(weight, reps)
        }
    }

    pub fn with_rpe(mut self, rpe: f64) -> Self {
        self.rpe = Some(rpe);
        self
    }

    pub fn is_working(&self) -> bool {
        self.kind == SetKind::Working
    }
}

/// Sets logged for a single exercise within a session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExerciseSets {
    pub sets: Vec<SetEntry>,
    #[serde(default)]
    pub order: u32,
    /// Machine setting snapshot at the time of the workout
    #[serde(rename = "h", default, skip_serializing_if = "Option::is_none")]
    pub setting: Option<MachineSetting>,
}

impl ExerciseSets {
    pub fn new(order: u32) -> Self {
        Self {
            sets: Vec::new(),
            order,
            setting: None,
        }
    }

    /// Working sets, or the full sequence when no set is marked working
    pub fn progression_basis(&self) -> Vec<&SetEntry> {
        let working: Vec<_> = self.sets.iter().filter(|s| s.is_working()).collect();
        if working.is_empty() {
            self.sets.iter().collect()
        } else {
            working
        }
    }

    pub fn working_count(&self) -> usize {
        self.sets.iter().filter(|s| s.is_working()).count()
    }
}

/// One completed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLogEntry {
    /// Epoch milliseconds; identity and ordering key
    #[serde(rename = "d")]
    pub timestamp: i64,
    /// Duration as "HH:MM:SS"
    #[serde(rename = "t", default)]
    pub duration: String,
    #[serde(default)]
    pub note: String,
    #[serde(rename = "s", default)]
    pub exercises: BTreeMap<String, ExerciseSets>,
}

impl WorkoutLogEntry {
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            duration: String::new(),
            note: String::new(),
            exercises: BTreeMap::new(),
        }
    }

    /// True if the entry has at least one set for the exercise
    pub fn contains(&self, exercise_id: &str) -> bool {
        self.sets_for(exercise_id).is_some()
    }

    /// Non-empty set group for an exercise
    pub fn sets_for(&self, exercise_id: &str) -> Option<&ExerciseSets> {
        self.exercises.get(exercise_id).filter(|e| !e.sets.is_empty())
    }

    pub fn date(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.timestamp).single()
    }

    /// Exercise ids in display order
    pub fn ordered_exercises(&self) -> Vec<(&str, &ExerciseSets)> {
        let mut items: Vec<_> = self.exercises.iter().map(|(id, s)| (id.as_str(), s)).collect();
        items.sort_by_key(|(_, s)| s.order);
        items
    }
}

/// Tennis match format, logged as its own catalog exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TennisMatch {
    Singles,
    Doubles,
}

impl TennisMatch {
    pub fn exercise_id(&self) -> &'static str {
        match self {
            TennisMatch::Singles => "tennis_1",
            TennisMatch::Doubles => "tennis_2",
        }
    }
}

impl FromStr for TennisMatch {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "singles" | "single" | "einzel" | "1" => Ok(TennisMatch::Singles),
            "doubles" | "double" | "doppel" | "2" => Ok(TennisMatch::Doubles),
            _ => anyhow::bail!("unknown match format: {} (expected singles or doubles)", s),
        }
    }
}

impl WorkoutLogEntry {
    /// A tennis match: one placeholder 0x0 working set under the format's exercise id
    pub fn tennis(timestamp: i64, format: TennisMatch, duration: impl Into<String>, note: impl Into<String>) -> Self {
        let mut group = ExerciseSets::new(1);
        group.sets.push(SetEntry::working(0.0, 0));

        let mut log = Self::new(timestamp);
        log.duration = duration.into();
        log.note = note.into();
        log.exercises.insert(format.exercise_id().to_string(), group);
        log
    }
}

/// Format a millisecond duration as "HH:MM:SS"
pub fn format_duration(millis: i64) -> String {
    let secs = millis.max(0) / 1000;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_kind_wire_format() {
        let set: SetEntry = serde_json::from_str(r#"{"w":40,"r":10,"type":"W"}"#).unwrap();
        assert_eq!(set.kind, SetKind::Warmup);
        assert_eq!(set.weight, 40.0);

        let json = serde_json::to_string(&SetEntry::working(50.0, 8)).unwrap();
        assert!(json.contains(r#""type":"A""#), "json: {}", json);
    }

    #[test]
    fn test_missing_kind_is_working() {
        let set: SetEntry = serde_json::from_str(r#"{"w":40,"r":10}"#).unwrap();
        assert_eq!(set.kind, SetKind::Working);
    }

    #[test]
    fn test_cleared_inputs_read_as_zero() {
        let set: SetEntry = serde_json::from_str(r#"{"w":null,"r":null,"rpe":null,"type":"A"}"#).unwrap();
        assert_eq!(set.weight, 0.0);
        assert_eq!(set.reps, 0);
        assert_eq!(set.rpe, None);

        let set: SetEntry = serde_json::from_str(r#"{"type":"W"}"#).unwrap();
        assert_eq!((set.weight, set.reps), (0.0, 0));
    }

    #[test]
    fn test_loose_set_numbers() {
        let set: SetEntry = serde_json::from_str(r#"{"w":"52.5","r":10.6,"rpe":"x"}"#).unwrap();
        assert_eq!(set.weight, 52.5);
        assert_eq!(set.reps, 11);
        assert_eq!(set.rpe, None);

        // Negative weight is kept (assisted machines), negative reps clamp
        let set: SetEntry = serde_json::from_str(r#"{"w":-10,"r":-3,"rpe":7.5}"#).unwrap();
        assert_eq!(set.weight, -10.0);
        assert_eq!(set.reps, 0);
        assert_eq!(set.rpe, Some(7.5));
    }

    #[test]
    fn test_contains_requires_sets() {
        let mut log = WorkoutLogEntry::new(1_000);
        log.exercises.insert("row".to_string(), ExerciseSets::new(1));
        assert!(!log.contains("row"));

        log.exercises.get_mut("row").unwrap().sets.push(SetEntry::working(50.0, 10));
        assert!(log.contains("row"));
        assert!(!log.contains("press"));
    }

    #[test]
    fn test_progression_basis_prefers_working() {
        let group = ExerciseSets {
            sets: vec![SetEntry::warmup(30.0, 12), SetEntry::working(50.0, 10)],
            order: 1,
            setting: None,
        };
        let basis = group.progression_basis();
        assert_eq!(basis.len(), 1);
        assert_eq!(basis[0].weight, 50.0);
        assert_eq!(group.working_count(), 1);
    }

    #[test]
    fn test_progression_basis_falls_back_to_all() {
        let group = ExerciseSets {
            sets: vec![SetEntry::warmup(30.0, 12), SetEntry::warmup(35.0, 10)],
            order: 1,
            setting: None,
        };
        assert_eq!(group.progression_basis().len(), 2);
        assert_eq!(group.working_count(), 0);
    }

    #[test]
    fn test_ordered_exercises() {
        let mut log = WorkoutLogEntry::new(0);
        log.exercises.insert("a".to_string(), ExerciseSets::new(2));
        log.exercises.insert("b".to_string(), ExerciseSets::new(1));
        let ids: Vec<_> = log.ordered_exercises().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_tennis_entry_shape() {
        let log = WorkoutLogEntry::tennis(5_000, "doppel".parse().unwrap(), "01:30:00", "won 6:4");
        assert_eq!(log.duration, "01:30:00");
        assert_eq!(log.note, "won 6:4");
        assert_eq!(log.exercises.len(), 1);

        let group = log.sets_for("tennis_2").unwrap();
        assert_eq!(group.order, 1);
        assert_eq!(group.sets, vec![SetEntry::working(0.0, 0)]);

        let json = serde_json::to_string(&log).unwrap();
        assert!(json.contains(r#""tennis_2":{"sets":[{"w":0.0,"r":0,"type":"A"}],"order":1}"#), "json: {}", json);
        assert!("squash".parse::<TennisMatch>().is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(3_723_000), "01:02:03");
        assert_eq!(format_duration(-5), "00:00:00");
    }
}
