//! Body metrics - daily body weight and step count

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::history::loose_number;

fn loose_steps<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(loose_number(deserializer)?.map(|s| s.round().clamp(0.0, u32::MAX as f64) as u32))
}

/// One day's body metrics. A day has at most one entry; logging again overwrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyLog {
    #[serde(rename = "d")]
    pub date: NaiveDate,
    /// Body weight in kg. The web app writes raw input text, so strings are accepted.
    #[serde(rename = "w", default, deserialize_with = "loose_number", skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(rename = "s", default, deserialize_with = "loose_steps", skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
}

impl BodyLog {
    pub fn new(date: NaiveDate, weight: Option<f64>, steps: Option<u32>) -> Self {
        Self { date, weight, steps }
    }

    /// True when neither metric was recorded
    pub fn is_empty(&self) -> bool {
        self.weight.is_none() && self.steps.is_none()
    }
}
