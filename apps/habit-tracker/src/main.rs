//! Habit Tracker - Track recurring habits with streaks.

mod app;
mod config;
mod db;
mod models;
mod output;

use anyhow::Context;
use app::{App, HabitUpdate};
use clap::{Parser, Subcommand, ValueEnum};
use config::Config;
use db::Database;
use habit_schedule::{calendar, Clock, DaySet, FixedClock, Recurrence, SystemClock};
use models::HabitId;
use output::DateStyle;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "habit-tracker",
    about = "Track recurring habits and their streaks",
    version
)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Database file (default: platform data dir)
    #[arg(long, global = true, env = "HABIT_TRACKER_DB")]
    db: Option<PathBuf>,

    /// Config file (default: platform config dir)
    #[arg(long, global = true, env = "HABIT_TRACKER_CONFIG")]
    config: Option<PathBuf>,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_date_arg)]
    today: Option<chrono::NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Habit(HabitCommand),

    /// Show the effective configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

/// Commands that work on the habit database.
#[derive(Subcommand)]
enum HabitCommand {
    /// Create a habit
    Add {
        title: String,
        #[arg(long, short, value_enum, default_value_t = Frequency::Daily)]
        frequency: Frequency,
        /// Weekdays for specific_days, 0=Sunday .. 6=Saturday (e.g. 1,3,5)
        #[arg(long, short)]
        days: Option<String>,
    },

    /// Change a habit's title or schedule
    Edit {
        id: HabitId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, short, value_enum)]
        frequency: Option<Frequency>,
        #[arg(long, short)]
        days: Option<String>,
    },

    /// List habits
    List {
        /// Include archived habits
        #[arg(long)]
        all: bool,
    },

    /// Show a habit and its recent completions
    Show { id: HabitId },

    /// Mark a habit done
    Check {
        id: HabitId,
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<chrono::NaiveDate>,
    },

    /// Remove a completion
    Uncheck {
        id: HabitId,
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<chrono::NaiveDate>,
    },

    /// Hide a habit from lists and summaries
    Archive { id: HabitId },

    /// Bring back an archived habit
    Restore { id: HabitId },

    /// Delete a habit and its history
    Remove { id: HabitId },

    /// Habits due today
    Due,

    /// Current and best streaks
    Streaks,

    /// Today's summary
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
enum Frequency {
    Daily,
    Weekly,
    SpecificDays,
}

fn parse_date_arg(s: &str) -> Result<chrono::NaiveDate, String> {
    calendar::parse_date(s).map_err(|e| e.to_string())
}

fn recurrence_from_args(frequency: Frequency, days: Option<&str>) -> anyhow::Result<Recurrence> {
    let recurrence = match frequency {
        Frequency::Daily => Recurrence::Daily,
        Frequency::Weekly => Recurrence::Weekly,
        Frequency::SpecificDays => Recurrence::SpecificDays {
            days: DaySet::parse_list(days.unwrap_or_default())?,
        },
    };
    Ok(recurrence)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let command = match cli.command {
        Commands::Habit(command) => command,
        Commands::Config { init } => {
            return show_config(cli.config, &config, init, cli.json);
        }
    };

    let db_path = cli
        .db
        .clone()
        .or_else(|| config.db_path())
        .unwrap_or_else(|| "habits.db".into());
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let db = Database::open(&db_path)
        .with_context(|| format!("opening {}", db_path.display()))?;

    match cli.today {
        Some(today) => run(command, cli.json, App::new(db, config, FixedClock(today))),
        None => run(command, cli.json, App::new(db, config, SystemClock)),
    }
}

fn show_config(
    path: Option<PathBuf>,
    config: &Config,
    init: bool,
    json: bool,
) -> anyhow::Result<()> {
    let path = path
        .or_else(Config::config_path)
        .context("no config directory available")?;
    if init {
        if path.exists() {
            anyhow::bail!("{} already exists", path.display());
        }
        Config::default().save(&path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }
    if json {
        output::print_json(config)?;
    } else {
        println!("# {}", path.display());
        print!("{}", toml::to_string_pretty(config)?);
    }
    Ok(())
}

fn run<C: Clock>(command: HabitCommand, json: bool, app: App<C>) -> anyhow::Result<()> {
    let style = DateStyle(&app.config.display.date_format);

    match command {
        HabitCommand::Add {
            title,
            frequency,
            days,
        } => {
            let recurrence = recurrence_from_args(frequency, days.as_deref())?;
            let habit = app.add(&title, recurrence)?;
            if json {
                output::print_json(&habit)?;
            } else {
                println!("Added {} ({})", habit.title, habit.id);
            }
        }
        HabitCommand::Edit {
            id,
            title,
            frequency,
            days,
        } => {
            let recurrence = match (frequency, days.as_deref()) {
                (Some(f), days) => Some(recurrence_from_args(f, days)?),
                (None, Some(days)) => Some(recurrence_from_args(Frequency::SpecificDays, Some(days))?),
                (None, None) => None,
            };
            let habit = app.edit(id, HabitUpdate { title, recurrence })?;
            if json {
                output::print_json(&habit)?;
            } else {
                println!("Updated {} ({})", habit.title, habit.recurrence);
            }
        }
        HabitCommand::List { all } => {
            let habits = app.list(all)?;
            if json {
                output::print_json(&habits)?;
            } else if habits.is_empty() {
                println!("No habits");
            } else {
                println!("{}", output::habits_table(&habits, &style));
            }
        }
        HabitCommand::Show { id } => {
            let detail = app.show(id)?;
            if json {
                output::print_json(&detail)?;
            } else {
                println!("{}", output::habit_detail(&detail, &style));
            }
        }
        HabitCommand::Check { id, date } => {
            let completion = app.check(id, date)?;
            if json {
                output::print_json(&completion)?;
            } else {
                println!("Checked {} for {}", id, style.date(completion.date));
            }
        }
        HabitCommand::Uncheck { id, date } => {
            let habit = app.uncheck(id, date)?;
            if json {
                output::print_json(&habit)?;
            } else {
                println!(
                    "Unchecked {}; streak now {} (best {})",
                    habit.title, habit.current_streak, habit.best_streak
                );
            }
        }
        HabitCommand::Archive { id } => {
            let habit = app.archive(id)?;
            if json {
                output::print_json(&habit)?;
            } else {
                println!("Archived {}", habit.title);
            }
        }
        HabitCommand::Restore { id } => {
            let habit = app.restore(id)?;
            if json {
                output::print_json(&habit)?;
            } else {
                println!("Restored {}", habit.title);
            }
        }
        HabitCommand::Remove { id } => {
            app.remove(id)?;
            if json {
                output::print_json(&serde_json::json!({ "removed": id }))?;
            } else {
                println!("Removed {}", id);
            }
        }
        HabitCommand::Due => {
            let due = app.due_today()?;
            if json {
                output::print_json(&due)?;
            } else if due.is_empty() {
                println!("Nothing due today");
            } else {
                println!("{}", output::due_table(&due));
            }
        }
        HabitCommand::Streaks => {
            let streaks = app.streaks()?;
            if json {
                output::print_json(&streaks)?;
            } else {
                println!("{}", output::streaks_table(&streaks));
            }
        }
        HabitCommand::Status => {
            let status = app.status()?;
            if json {
                output::print_json(&status)?;
            } else {
                println!("{}", output::status_summary(&status));
            }
        }
    }

    Ok(())
}
