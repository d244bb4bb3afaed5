//! liftlog - Personal strength training log
//!
//! Logs sessions, prescribes the next working weight by progressive overload
//! and plans days against weekly set goals. Tennis matches and daily body
//! metrics are kept alongside.

pub mod body;
pub mod db;
pub mod engine;
pub mod exercises;
pub mod history;
pub mod session;

pub use db::Database;
pub use engine::{compute_progression, compute_warmup, is_exercise_allowed, Prescription, ProgressionRules};
