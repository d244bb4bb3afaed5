//! Exercise definitions - the exercise catalog

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Muscle groups used for weekly volume goals
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MuscleGroup {
    #[serde(rename = "Brust", alias = "chest")]
    Chest,
    #[serde(rename = "Rücken", alias = "back")]
    Back,
    #[serde(rename = "Schultern", alias = "shoulders")]
    Shoulders,
    #[serde(rename = "Arme", alias = "arms")]
    Arms,
    #[serde(rename = "Beine", alias = "legs")]
    Legs,
    #[serde(rename = "Tennis", alias = "tennis")]
    Tennis,
}

impl MuscleGroup {
    pub fn name(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "chest",
            MuscleGroup::Back => "back",
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Arms => "arms",
            MuscleGroup::Legs => "legs",
            MuscleGroup::Tennis => "tennis",
        }
    }

    /// All muscle groups for iteration
    pub fn all() -> &'static [MuscleGroup] {
        &[
            MuscleGroup::Chest,
            MuscleGroup::Back,
            MuscleGroup::Shoulders,
            MuscleGroup::Arms,
            MuscleGroup::Legs,
            MuscleGroup::Tennis,
        ]
    }

    /// Groups that count toward strength volume (everything but tennis)
    pub fn strength() -> impl Iterator<Item = MuscleGroup> {
        Self::all().iter().copied().filter(|g| *g != MuscleGroup::Tennis)
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MuscleGroup {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        MuscleGroup::all()
            .iter()
            .copied()
            .find(|g| g.name() == lower)
            .ok_or_else(|| anyhow::anyhow!("unknown muscle group: {}", s))
    }
}

/// Movement pattern, used by the day planner's focus labels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExerciseType {
    #[serde(rename = "push")]
    Push,
    #[serde(rename = "pull")]
    Pull,
    #[serde(rename = "beine", alias = "legs")]
    Legs,
    #[serde(rename = "arme", alias = "arms")]
    Arms,
    #[serde(rename = "cardio")]
    Cardio,
}

/// Handle or seat position on a machine. Stored either as a number or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MachineSetting {
    Position(f64),
    Label(String),
}

impl fmt::Display for MachineSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineSetting::Position(p) => write!(f, "{}", p),
            MachineSetting::Label(l) => f.write_str(l),
        }
    }
}

/// Catalog entry. Field names on the wire match the backup document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDefinition {
    pub id: String,
    #[serde(rename = "n")]
    pub name: String,
    #[serde(rename = "c")]
    pub category: MuscleGroup,
    #[serde(rename = "t")]
    pub kind: ExerciseType,
    #[serde(rename = "defW")]
    pub default_weight: f64,
    #[serde(rename = "h", default, skip_serializing_if = "Option::is_none")]
    pub setting: Option<MachineSetting>,
    #[serde(rename = "prio", default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
}

impl ExerciseDefinition {
    /// Planner ordering key, unset priorities go last
    pub fn priority_or_default(&self) -> u32 {
        self.priority.unwrap_or(99)
    }
}

struct SeedExercise {
    id: &'static str,
    name: &'static str,
    category: MuscleGroup,
    kind: ExerciseType,
    default_weight: f64,
    priority: Option<u32>,
}

impl From<&SeedExercise> for ExerciseDefinition {
    fn from(seed: &SeedExercise) -> Self {
        Self {
            id: seed.id.to_string(),
            name: seed.name.to_string(),
            category: seed.category,
            kind: seed.kind,
            default_weight: seed.default_weight,
            setting: None,
            priority: seed.priority,
        }
    }
}

/// Built-in catalog, written to a fresh database on first open
const DEFAULT_EXERCISES: &[SeedExercise] = &[
    // Chest
    SeedExercise {
        id: "bench_press",
        name: "Bench Press",
        category: MuscleGroup::Chest,
        kind: ExerciseType::Push,
        default_weight: 40.0,
        priority: Some(1),
    },
    SeedExercise {
        id: "cable_fly",
        name: "Cable Fly",
        category: MuscleGroup::Chest,
        kind: ExerciseType::Push,
        default_weight: 13.5,
        priority: Some(2),
    },
    SeedExercise {
        id: "dips",
        name: "Dips",
        category: MuscleGroup::Chest,
        kind: ExerciseType::Push,
        default_weight: 0.0,
        priority: Some(3),
    },
    // Back
    SeedExercise {
        id: "lat_pulldown",
        name: "Lat Pulldown",
        category: MuscleGroup::Back,
        kind: ExerciseType::Pull,
        default_weight: 45.0,
        priority: Some(1),
    },
    SeedExercise {
        id: "cable_row",
        name: "Cable Row",
        category: MuscleGroup::Back,
        kind: ExerciseType::Pull,
        default_weight: 45.0,
        priority: Some(2),
    },
    SeedExercise {
        id: "pull_up",
        name: "Pull-Up",
        category: MuscleGroup::Back,
        kind: ExerciseType::Pull,
        default_weight: 0.0,
        priority: Some(3),
    },
    // Shoulders
    SeedExercise {
        id: "shoulder_press",
        name: "Machine Shoulder Press",
        category: MuscleGroup::Shoulders,
        kind: ExerciseType::Push,
        default_weight: 27.0,
        priority: Some(1),
    },
    SeedExercise {
        id: "lateral_raise",
        name: "Cable Lateral Raise",
        category: MuscleGroup::Shoulders,
        kind: ExerciseType::Push,
        default_weight: 4.5,
        priority: Some(2),
    },
    SeedExercise {
        id: "face_pull",
        name: "Face Pull",
        category: MuscleGroup::Shoulders,
        kind: ExerciseType::Pull,
        default_weight: 18.0,
        priority: None,
    },
    // Arms
    SeedExercise {
        id: "triceps_pushdown",
        name: "Triceps Pushdown",
        category: MuscleGroup::Arms,
        kind: ExerciseType::Arms,
        default_weight: 22.5,
        priority: Some(1),
    },
    SeedExercise {
        id: "cable_curl",
        name: "Cable Curl",
        category: MuscleGroup::Arms,
        kind: ExerciseType::Arms,
        default_weight: 18.0,
        priority: Some(2),
    },
    // Legs
    SeedExercise {
        id: "leg_press",
        name: "Leg Press",
        category: MuscleGroup::Legs,
        kind: ExerciseType::Legs,
        default_weight: 80.0,
        priority: Some(1),
    },
    SeedExercise {
        id: "leg_curl",
        name: "Leg Curl",
        category: MuscleGroup::Legs,
        kind: ExerciseType::Legs,
        default_weight: 31.5,
        priority: Some(2),
    },
    SeedExercise {
        id: "leg_extension",
        name: "Leg Extension",
        category: MuscleGroup::Legs,
        kind: ExerciseType::Legs,
        default_weight: 36.0,
        priority: Some(3),
    },
    // Tennis
    SeedExercise {
        id: "tennis_1",
        name: "Tennis Singles",
        category: MuscleGroup::Tennis,
        kind: ExerciseType::Cardio,
        default_weight: 0.0,
        priority: None,
    },
    SeedExercise {
        id: "tennis_2",
        name: "Tennis Doubles",
        category: MuscleGroup::Tennis,
        kind: ExerciseType::Cardio,
        default_weight: 0.0,
        priority: None,
    },
];

pub fn default_catalog() -> Vec<ExerciseDefinition> {
    DEFAULT_EXERCISES.iter().map(ExerciseDefinition::from).collect()
}

pub fn find_exercise<'a>(catalog: &'a [ExerciseDefinition], id: &str) -> Option<&'a ExerciseDefinition> {
    catalog.iter().find(|e| e.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_ids_unique() {
        let catalog = default_catalog();
        let mut ids: Vec<_> = catalog.iter().map(|e| e.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_find_exercise() {
        let catalog = default_catalog();
        let ex = find_exercise(&catalog, "leg_press").unwrap();
        assert_eq!(ex.name, "Leg Press");
        assert_eq!(ex.default_weight, 80.0);
        assert!(find_exercise(&catalog, "nope").is_none());
    }

    #[test]
    fn test_muscle_group_from_str() {
        assert_eq!("Chest".parse::<MuscleGroup>().unwrap(), MuscleGroup::Chest);
        assert_eq!(" legs ".parse::<MuscleGroup>().unwrap(), MuscleGroup::Legs);
        assert!("neck".parse::<MuscleGroup>().is_err());
    }

    #[test]
    fn test_strength_groups_skip_tennis() {
        let groups: Vec<_> = MuscleGroup::strength().collect();
        assert_eq!(groups.len(), 5);
        assert!(!groups.contains(&MuscleGroup::Tennis));
    }

    #[test]
    fn test_definition_backup_format() {
        let json = r#"{"id":"row","n":"Cable Row","c":"Rücken","t":"pull","defW":45,"h":"3","prio":2}"#;
        let ex: ExerciseDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(ex.category, MuscleGroup::Back);
        assert_eq!(ex.kind, ExerciseType::Pull);
        assert_eq!(ex.setting, Some(MachineSetting::Label("3".to_string())));
        assert_eq!(ex.priority_or_default(), 2);

        let json = r#"{"id":"press","n":"Leg Press","c":"legs","t":"beine","defW":80,"h":4}"#;
        let ex: ExerciseDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(ex.category, MuscleGroup::Legs);
        assert_eq!(ex.setting, Some(MachineSetting::Position(4.0)));
        assert_eq!(ex.priority_or_default(), 99);
    }
}
