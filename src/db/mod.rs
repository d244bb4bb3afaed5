//! Database module - SQLite storage for the catalog, workout history, body logs and goals

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::body::BodyLog;
use crate::exercises::{default_catalog, ExerciseDefinition, MachineSetting, MuscleGroup};
use crate::history::{ExerciseSets, SetEntry, SetKind, WorkoutLogEntry};

/// Backup document as exchanged with the web app: catalog keyed by id, history,
/// body metrics and weekly set goals. Other top-level fields (plans, profile) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupDocument {
    #[serde(default)]
    pub db: BTreeMap<String, ExerciseDefinition>,
    #[serde(rename = "h", default)]
    pub history: Vec<WorkoutLogEntry>,
    #[serde(rename = "bodyLogs", default)]
    pub body_logs: Vec<BodyLog>,
    #[serde(default)]
    pub goals: BTreeMap<MuscleGroup, u32>,
}

impl BackupDocument {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("parsing backup document")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serializing backup document")
    }
}

/// Counts reported by an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub exercises: usize,
    pub workouts_added: usize,
    pub workouts_skipped: usize,
    pub body_logs: usize,
    pub goals: usize,
}

fn kind_code(kind: SetKind) -> &'static str {
    match kind {
        SetKind::Working => "A",
        SetKind::Warmup => "W",
    }
}

fn kind_from_code(code: Option<String>) -> SetKind {
    match code.as_deref() {
        Some("W") => SetKind::Warmup,
        _ => SetKind::Working,
    }
}

fn to_json_column<T: Serialize>(value: &Option<T>) -> Result<Option<String>> {
    value.as_ref().map(serde_json::to_string).transpose().map_err(Into::into)
}

fn from_json_column<T: DeserializeOwned>(raw: Option<String>) -> Option<T> {
    raw.and_then(|s| serde_json::from_str(&s).ok())
}

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database. A fresh database gets the default catalog.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("opening database {}", path.display()))?;
        let db = Self { conn };
        db.init_schema()?;
        db.seed_catalog()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS exercises (
                id TEXT PRIMARY KEY,
                definition TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS workouts (
                timestamp INTEGER PRIMARY KEY,
                duration TEXT NOT NULL DEFAULT '',
                note TEXT NOT NULL DEFAULT ''
            );
            CREATE TABLE IF NOT EXISTS sets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                workout INTEGER NOT NULL REFERENCES workouts(timestamp) ON DELETE CASCADE,
                exercise TEXT NOT NULL,
                exercise_order INTEGER NOT NULL,
                setting TEXT,
                position INTEGER NOT NULL,
                weight REAL NOT NULL,
                reps INTEGER NOT NULL,
                rpe REAL,
                kind TEXT,
                completed INTEGER
            );
            CREATE INDEX IF NOT EXISTS sets_workout ON sets(workout);
            CREATE TABLE IF NOT EXISTS body_logs (
                date TEXT PRIMARY KEY,
                weight REAL,
                steps INTEGER
            );
            CREATE TABLE IF NOT EXISTS goals (
                muscle_group TEXT PRIMARY KEY,
                sets INTEGER NOT NULL
            );",
        )?;
        Ok(())
    }

    fn seed_catalog(&self) -> Result<()> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM exercises", [], |row| row.get(0))?;
        if count == 0 {
            for exercise in default_catalog() {
                self.upsert_exercise(&exercise)?;
            }
            info!("Seeded catalog with default exercises");
        }
        Ok(())
    }

    /// Insert or replace a catalog entry
    pub fn upsert_exercise(&self, exercise: &ExerciseDefinition) -> Result<()> {
        self.conn.execute(
            "INSERT INTO exercises (id, definition) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET definition = excluded.definition",
            params![exercise.id, serde_json::to_string(exercise)?],
        )?;
        Ok(())
    }

    /// Get the whole catalog ordered by id
    pub fn get_exercises(&self) -> Result<Vec<ExerciseDefinition>> {
        let mut stmt = self.conn.prepare("SELECT id, definition FROM exercises ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, raw)| {
                serde_json::from_str(&raw).with_context(|| format!("corrupt catalog entry {}", id))
            })
            .collect()
    }

    /// Add a completed workout. Timestamps are unique; a duplicate is rejected.
    pub fn add_workout(&mut self, workout: &WorkoutLogEntry) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO workouts (timestamp, duration, note) VALUES (?1, ?2, ?3)",
            params![workout.timestamp, workout.duration, workout.note],
        )
        .with_context(|| format!("storing workout {}", workout.timestamp))?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO sets (workout, exercise, exercise_order, setting, position, weight, reps, rpe, kind, completed)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for (exercise_id, group) in &workout.exercises {
                let setting = to_json_column(&group.setting)?;
                for (position, set) in group.sets.iter().enumerate() {
                    stmt.execute(params![
                        workout.timestamp,
                        exercise_id,
                        group.order,
                        setting,
                        position as i64,
                        set.weight,
                        set.reps,
                        set.rpe,
                        kind_code(set.kind),
                        set.completed,
                    ])?;
                }
            }
        }

        tx.commit()?;
        debug!(timestamp = workout.timestamp, exercises = workout.exercises.len(), "workout stored");
        Ok(())
    }

    pub fn has_workout(&self, timestamp: i64) -> Result<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM workouts WHERE timestamp = ?1", [timestamp], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// Delete a workout and its sets. Returns false when nothing matched.
    pub fn delete_workout(&self, timestamp: i64) -> Result<bool> {
        let deleted = self.conn.execute("DELETE FROM workouts WHERE timestamp = ?1", [timestamp])?;
        Ok(deleted > 0)
    }

    /// Get all workouts, newest first
    pub fn get_workouts(&self) -> Result<Vec<WorkoutLogEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT timestamp, duration, note FROM workouts ORDER BY timestamp DESC")?;
        let mut workouts = stmt
            .query_map([], |row| {
                Ok(WorkoutLogEntry {
                    timestamp: row.get(0)?,
                    duration: row.get(1)?,
                    note: row.get(2)?,
                    exercises: BTreeMap::new(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT workout, exercise, exercise_order, setting, weight, reps, rpe, kind, completed
             FROM sets ORDER BY workout, exercise, position",
        )?;
        let rows = stmt.query_map([], |row| {
            let setting: Option<String> = row.get(3)?;
            let set = SetEntry {
                weight: row.get(4)?,
                reps: row.get(5)?,
                rpe: row.get(6)?,
                kind: kind_from_code(row.get(7)?),
                completed: row.get(8)?,
            };
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, u32>(2)?, setting, set))
        })?;

        for row in rows {
            let (timestamp, exercise_id, order, setting, set) = row?;
            let Some(workout) = workouts.iter_mut().find(|w| w.timestamp == timestamp) else {
                continue;
            };
            let group = workout.exercises.entry(exercise_id).or_insert_with(|| ExerciseSets {
                sets: Vec::new(),
                order,
                setting: from_json_column::<MachineSetting>(setting),
            });
            group.sets.push(set);
        }

        Ok(workouts)
    }

    /// Record body metrics for a day, replacing that day's previous entry
    pub fn upsert_body_log(&self, log: &BodyLog) -> Result<()> {
        self.conn.execute(
            "INSERT INTO body_logs (date, weight, steps) VALUES (?1, ?2, ?3)
             ON CONFLICT(date) DO UPDATE SET weight = excluded.weight, steps = excluded.steps",
            params![log.date.to_string(), log.weight, log.steps],
        )?;
        Ok(())
    }

    /// Body metrics, newest day first
    pub fn get_body_logs(&self) -> Result<Vec<BodyLog>> {
        let mut stmt = self
            .conn
            .prepare("SELECT date, weight, steps FROM body_logs ORDER BY date DESC")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<f64>>(1)?, row.get::<_, Option<u32>>(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(date, weight, steps)| {
                let date = date.parse::<NaiveDate>().with_context(|| format!("corrupt body log date {}", date))?;
                Ok(BodyLog::new(date, weight, steps))
            })
            .collect()
    }

    /// Set the weekly working-set goal of a muscle group
    pub fn set_goal(&self, group: MuscleGroup, sets: u32) -> Result<()> {
        self.conn.execute(
            "INSERT INTO goals (muscle_group, sets) VALUES (?1, ?2)
             ON CONFLICT(muscle_group) DO UPDATE SET sets = excluded.sets",
            params![group.name(), sets],
        )?;
        debug!(group = %group, sets, "weekly goal stored");
        Ok(())
    }

    /// Configured weekly goals. Groups without an entry use the default goal.
    pub fn get_goals(&self) -> Result<HashMap<MuscleGroup, u32>> {
        let mut stmt = self.conn.prepare("SELECT muscle_group, sets FROM goals")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(group, sets)| Ok((group.parse::<MuscleGroup>()?, sets)))
            .collect()
    }

    /// Merge a backup document: catalog entries, body logs and goals are upserted,
    /// workouts with timestamps already present are skipped.
    pub fn import(&mut self, doc: &BackupDocument) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();

        for (key, exercise) in &doc.db {
            if key != &exercise.id {
                debug!(key = %key, id = %exercise.id, "catalog key differs from id, using id");
            }
            self.upsert_exercise(exercise)?;
            summary.exercises += 1;
        }

        let mut seen: HashSet<i64> = HashSet::new();
        for workout in &doc.history {
            if !seen.insert(workout.timestamp) || self.has_workout(workout.timestamp)? {
                summary.workouts_skipped += 1;
                continue;
            }
            self.add_workout(workout)?;
            summary.workouts_added += 1;
        }

        for log in &doc.body_logs {
            self.upsert_body_log(log)?;
            summary.body_logs += 1;
        }

        for (&group, &sets) in &doc.goals {
            self.set_goal(group, sets)?;
            summary.goals += 1;
        }

        info!(
            "Imported {} exercises, {} workouts ({} skipped), {} body logs, {} goals",
            summary.exercises, summary.workouts_added, summary.workouts_skipped, summary.body_logs, summary.goals
        );
        Ok(summary)
    }

    /// Snapshot the whole store as a backup document
    pub fn export(&self) -> Result<BackupDocument> {
        let db = self
            .get_exercises()?
            .into_iter()
            .map(|e| (e.id.clone(), e))
            .collect();
        Ok(BackupDocument {
            db,
            history: self.get_workouts()?,
            body_logs: self.get_body_logs()?,
            goals: self.get_goals()?.into_iter().collect(),
        })
    }
}
