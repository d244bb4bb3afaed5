//! Tunable constants of the progression engine

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::exercises::ExerciseDefinition;

/// Equipment class derived from the exercise name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equipment {
    /// Barbell/bodyweight compound lifts loaded with plates
    FreeCompound,
    /// Everything else, loaded from a weight stack
    Machine,
}

/// Progression and warm-up configuration.
///
/// `Default` carries the standard values; a JSON file may override any subset of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionRules {
    /// Increase weight once reps at the top weight exceed this
    pub rep_threshold: u32,
    /// Reps prescribed when there is no history
    pub cold_start_reps: u32,
    /// Reps prescribed right after a weight increase
    pub increase_reps: u32,
    /// Upper bound for the +1 rep target while holding weight
    pub rep_cap: u32,

    /// Lower-case name fragments identifying free-weight compound lifts
    pub compound_keywords: Vec<String>,
    pub compound_increase: f64,
    pub compound_rounding: f64,
    pub machine_increase: f64,
    pub machine_rounding: f64,

    /// Fraction of the working weight used for the warm-up set
    pub warmup_ratio: f64,
    pub warmup_compound_rounding: f64,
    pub warmup_machine_rounding: f64,

    /// Lower-case name fragments of exercises that must never be offered (tennis elbow)
    pub excluded_keywords: Vec<String>,
}

impl Default for ProgressionRules {
    fn default() -> Self {
        Self {
            rep_threshold: 12,
            cold_start_reps: 10,
            increase_reps: 8,
            rep_cap: 12,
            compound_keywords: to_strings(&[
                "bench press",
                "bankdrücken",
                "dips",
                "pull-up",
                "chin-up",
                "klimm",
            ]),
            compound_increase: 2.0,
            compound_rounding: 0.5,
            machine_increase: 4.5,
            machine_rounding: 4.5,
            warmup_ratio: 0.60,
            warmup_compound_rounding: 2.5,
            warmup_machine_rounding: 4.5,
            excluded_keywords: to_strings(&["pull-up", "pull up", "chin-up", "chin up", "klimmzüge"]),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn name_matches(name: &str, keywords: &[String]) -> bool {
    let lower = name.to_lowercase();
    keywords.iter().any(|k| lower.contains(&k.to_lowercase()))
}

impl ProgressionRules {
    /// Load rules from a JSON file; absent fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading rules file {}", path.display()))?;
        let rules = serde_json::from_str(&raw)
            .with_context(|| format!("parsing rules file {}", path.display()))?;
        Ok(rules)
    }

    /// Classify by case-insensitive keyword match on the display name
    pub fn equipment(&self, exercise: &ExerciseDefinition) -> Equipment {
        if name_matches(&exercise.name, &self.compound_keywords) {
            Equipment::FreeCompound
        } else {
            Equipment::Machine
        }
    }

    /// (increase step, rounding step) applied when overload triggers
    pub fn increase_steps(&self, equipment: Equipment) -> (f64, f64) {
        match equipment {
            Equipment::FreeCompound => (self.compound_increase, self.compound_rounding),
            Equipment::Machine => (self.machine_increase, self.machine_rounding),
        }
    }

    pub fn warmup_rounding(&self, equipment: Equipment) -> f64 {
        match equipment {
            Equipment::FreeCompound => self.warmup_compound_rounding,
            Equipment::Machine => self.warmup_machine_rounding,
        }
    }

    /// Denylist check used by exercise selection
    pub fn is_allowed(&self, exercise: &ExerciseDefinition) -> bool {
        !name_matches(&exercise.name, &self.excluded_keywords)
    }
}

/// Round to the nearest multiple of `step`; a non-positive step leaves the value as is
pub fn round_to_step(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}
