//! liftlog - Personal strength training log

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Datelike, Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::info;

use liftlog::body::BodyLog;
use liftlog::db::{BackupDocument, Database};
use liftlog::engine::{Focus, Planner, ProgressionRules, WeeklyVolume, DEFAULT_WEEKLY_GOAL};
use liftlog::exercises::{find_exercise, ExerciseDefinition, MuscleGroup};
use liftlog::history::{ExerciseSets, SetEntry, TennisMatch, WorkoutLogEntry};
use liftlog::session::ActiveSession;

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(author, version, about = "Personal strength training log with progressive overload")]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "LIFTLOG_DB", default_value = "liftlog.db", global = true)]
    db: PathBuf,

    /// JSON file overriding progression rules
    #[arg(long, env = "LIFTLOG_RULES", global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the next prescription for an exercise
    Next {
        /// Exercise id (see `catalog`)
        exercise: String,
    },

    /// Build a session with prescribed sets
    Train {
        /// Exercise ids in the order to train them
        #[arg(required = true)]
        exercises: Vec<String>,

        /// Store the session as completed
        #[arg(long)]
        save: bool,
    },

    /// Plan a day from open weekly volume
    Plan {
        /// push, pull, legs or arms
        focus: String,

        /// Weekday index, 0 = Monday (default: today)
        #[arg(short, long)]
        day: Option<u32>,

        /// Weekly set goal for this run only, e.g. --goal chest=16
        #[arg(short, long, value_parser = parse_goal)]
        goal: Vec<(MuscleGroup, u32)>,

        /// Store the planned session as completed
        #[arg(long)]
        save: bool,
    },

    /// Log a session for one exercise
    Log {
        /// Exercise id
        exercise: String,

        /// Working weight
        #[arg(short, long)]
        weight: f64,

        /// Reps per working set
        #[arg(short, long)]
        reps: u32,

        /// Number of working sets
        #[arg(short, long, default_value = "2")]
        sets: u32,

        /// Warm-up weight (adds one 12-rep warm-up set)
        #[arg(long)]
        warmup: Option<f64>,

        /// Optional notes
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// Log a tennis match
    Tennis {
        /// singles or doubles
        format: TennisMatch,

        /// Match duration as HH:MM:SS
        #[arg(short, long, default_value = "01:00:00")]
        duration: String,

        /// Optional notes
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// Record body weight and steps for a day, or list entries when no value is given
    Body {
        /// Body weight in kg
        #[arg(short, long)]
        weight: Option<f64>,

        /// Step count
        #[arg(short, long)]
        steps: Option<u32>,

        /// Day as YYYY-MM-DD (default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Number of entries to list
        #[arg(short, long, default_value = "14")]
        limit: usize,
    },

    /// Set weekly set goals, e.g. `goal chest=16 back=20`, or list them
    Goal {
        #[arg(value_parser = parse_goal)]
        goals: Vec<(MuscleGroup, u32)>,
    },

    /// List training history
    List {
        /// Number of records to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Delete a workout by its timestamp
    Delete {
        timestamp: i64,
    },

    /// Working sets per muscle group this week
    Volume,

    /// List catalog exercises
    Catalog {
        /// Include excluded exercises
        #[arg(long)]
        all: bool,
    },

    /// Import a JSON backup document
    Import {
        file: PathBuf,
    },

    /// Export catalog, history, body logs and goals as a JSON backup document
    Export {
        file: PathBuf,
    },
}

fn parse_goal(raw: &str) -> Result<(MuscleGroup, u32)> {
    let (group, sets) = raw
        .split_once('=')
        .with_context(|| format!("expected GROUP=SETS, got {}", raw))?;
    Ok((group.parse()?, sets.trim().parse()?))
}

fn load_rules(path: Option<&PathBuf>) -> Result<ProgressionRules> {
    match path {
        Some(path) => {
            info!("Loading rules from {}", path.display());
            ProgressionRules::from_file(path)
        }
        None => Ok(ProgressionRules::default()),
    }
}

fn lookup<'a>(catalog: &'a [ExerciseDefinition], id: &str) -> Result<&'a ExerciseDefinition> {
    match find_exercise(catalog, id) {
        Some(ex) => Ok(ex),
        None => bail!("unknown exercise '{}', see `liftlog catalog`", id),
    }
}

fn print_session(session: &ActiveSession, catalog: &[ExerciseDefinition]) {
    for id in session.ordered_ids() {
        let name = find_exercise(catalog, id).map(|e| e.name.as_str()).unwrap_or(id);
        println!("{}", name);
        for (i, set) in session.exercises[id].sets.iter().enumerate() {
            println!("  {}. [{}] {}kg x {}", i + 1, set.kind.label(), set.weight, set.reps);
        }
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let rules = load_rules(cli.rules.as_ref())?;
    let mut db = Database::open(&cli.db)?;

    match cli.command {
        Commands::Next { exercise } => {
            let catalog = db.get_exercises()?;
            let history = db.get_workouts()?;
            let ex = lookup(&catalog, &exercise)?;

            let prescription = rules.progression(ex, &history);
            let warmup = rules.warmup(prescription.weight, ex);

            println!("{}", ex.name);
            println!("Warm-up: {}kg x 12", warmup);
            println!(
                "Target:  {}kg x {}{}",
                prescription.weight,
                prescription.reps,
                if prescription.is_increase { "  (weight up!)" } else { "" }
            );
            if !rules.is_allowed(ex) {
                println!("Note: excluded from planning (tennis elbow)");
            }
        }

        Commands::Train { exercises, save } => {
            let catalog = db.get_exercises()?;
            let history = db.get_workouts()?;
            let mut session = ActiveSession::start(Utc::now().timestamp_millis());
            for id in &exercises {
                lookup(&catalog, id)?;
                session.add_exercise(id);
            }
            session.seed_prescriptions(&catalog, &history, &rules);
            print_session(&session, &catalog);

            if save {
                let log = session.finish(Utc::now().timestamp_millis(), "");
                db.add_workout(&log)?;
                println!("Saved session {}", log.timestamp);
            }
        }

        Commands::Plan { focus, day, goal, save } => {
            let focus: Focus = focus.parse()?;
            let now = Local::now();
            let day = day.unwrap_or_else(|| now.weekday().num_days_from_monday());
            if day > 6 {
                bail!("day must be 0 (Monday) to 6 (Sunday), got {}", day);
            }

            let catalog = db.get_exercises()?;
            let history = db.get_workouts()?;
            let volume = WeeklyVolume::from_history(&history, &catalog, now);

            let mut goals = db.get_goals()?;
            goals.extend(goal);
            let planner = goals
                .into_iter()
                .fold(Planner::new(&catalog, &rules), |p, (group, sets)| p.with_goal(group, sets));
            let plan = planner.plan_day(day, focus, &volume);
            if plan.is_empty() {
                println!("Weekly goals for {} already met, nothing to plan", focus);
                return Ok(());
            }

            let mut session = ActiveSession::start(Utc::now().timestamp_millis());
            session.add_plan(&plan);
            session.seed_prescriptions(&catalog, &history, &rules);
            println!("{} day plan:", focus);
            print_session(&session, &catalog);

            if save {
                let log = session.finish(Utc::now().timestamp_millis(), format!("{} plan", focus));
                db.add_workout(&log)?;
                println!("Saved session {}", log.timestamp);
            }
        }

        Commands::Log { exercise, weight, reps, sets, warmup, notes } => {
            let catalog = db.get_exercises()?;
            lookup(&catalog, &exercise)?;

            let mut group = ExerciseSets::new(1);
            if let Some(w) = warmup {
                group.sets.push(SetEntry::warmup(w, 12));
            }
            group.sets.extend((0..sets).map(|_| SetEntry::working(weight, reps)));

            let mut log = WorkoutLogEntry::new(Utc::now().timestamp_millis());
            log.note = notes;
            log.exercises.insert(exercise.clone(), group);
            db.add_workout(&log)?;
            println!("Logged: {} - {}x{} @ {}kg (id: {})", exercise, sets, reps, weight, log.timestamp);
        }

        Commands::Tennis { format, duration, notes } => {
            let log = WorkoutLogEntry::tennis(Utc::now().timestamp_millis(), format, duration, notes);
            db.add_workout(&log)?;
            println!("Logged tennis match {} ({}, id: {})", format.exercise_id(), log.duration, log.timestamp);
        }

        Commands::Body { weight, steps, date, limit } => {
            if weight.is_some() || steps.is_some() {
                let date = date.unwrap_or_else(|| Local::now().date_naive());
                db.upsert_body_log(&BodyLog::new(date, weight, steps))?;
                println!("Saved body log for {}", date);
            } else {
                println!("Body log:");
                println!("{:-<40}", "");
                for log in db.get_body_logs()?.iter().take(limit) {
                    let weight = log.weight.map(|w| format!("{} kg", w)).unwrap_or_default();
                    let steps = log.steps.map(|s| format!("{} steps", s)).unwrap_or_default();
                    println!("{} {:>10} {:>14}", log.date, weight, steps);
                }
            }
        }

        Commands::Goal { goals } => {
            for &(group, sets) in &goals {
                db.set_goal(group, sets)?;
            }
            let stored = db.get_goals()?;
            for group in MuscleGroup::strength() {
                let (sets, flag) = match stored.get(&group) {
                    Some(sets) => (*sets, ""),
                    None => (DEFAULT_WEEKLY_GOAL, " (default)"),
                };
                println!("{:10} {:>3} sets/week{}", group.name(), sets, flag);
            }
        }

        Commands::List { limit } => {
            let catalog = db.get_exercises()?;
            let workouts = db.get_workouts()?;
            println!("Recent workouts:");
            println!("{:-<60}", "");
            for w in workouts.iter().take(limit) {
                let date = w
                    .date()
                    .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| w.timestamp.to_string());
                println!("{} | {} | {} | {}", date, w.timestamp, w.duration, if w.note.is_empty() { "-" } else { w.note.as_str() });
                for (id, group) in w.ordered_exercises() {
                    let name = find_exercise(&catalog, id).map(|e| e.name.as_str()).unwrap_or(id);
                    let sets: Vec<_> = group
                        .sets
                        .iter()
                        .filter(|s| s.is_working())
                        .map(|s| format!("{}x{}", s.weight, s.reps))
                        .collect();
                    println!("    {:24} {}", name, sets.join(", "));
                }
            }
        }

        Commands::Delete { timestamp } => {
            if db.delete_workout(timestamp)? {
                println!("Deleted workout {}", timestamp);
            } else {
                bail!("no workout with timestamp {}", timestamp);
            }
        }

        Commands::Volume => {
            let catalog = db.get_exercises()?;
            let history = db.get_workouts()?;
            let volume = WeeklyVolume::from_history(&history, &catalog, Local::now());

            println!("Working sets this week");
            println!("{:-<40}", "");
            for (group, done, goal) in volume.report(&db.get_goals()?) {
                println!("{:10} {:>3} / {}", group.name(), done, goal);
            }
        }

        Commands::Catalog { all } => {
            let catalog = db.get_exercises()?;
            for ex in catalog.iter().filter(|e| all || rules.is_allowed(e)) {
                let flag = if rules.is_allowed(ex) { "" } else { " (excluded)" };
                println!(
                    "{:20} {:28} {:10} {:>6}kg{}",
                    ex.id,
                    ex.name,
                    ex.category.name(),
                    ex.default_weight,
                    flag
                );
            }
        }

        Commands::Import { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let doc = BackupDocument::from_json(&raw)?;
            let summary = db.import(&doc)?;
            println!(
                "Imported {} exercises, {} workouts ({} already present), {} body logs, {} goals",
                summary.exercises, summary.workouts_added, summary.workouts_skipped, summary.body_logs, summary.goals
            );
        }

        Commands::Export { file } => {
            let doc = db.export()?;
            std::fs::write(&file, doc.to_json()?)
                .with_context(|| format!("writing {}", file.display()))?;
            println!("Exported {} workouts to {}", doc.history.len(), file.display());
        }
    }

    Ok(())
}
