//! Study Tracker - Main entry point
//!
//! Command line interface for logging study sessions and viewing them on the
//! Jalali calendar.

use std::io::Write as _;
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::signal;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use study_tracker::analytics::{SessionAggregator, StudyDayIndex};
use study_tracker::calendar::{JalaliDate, JalaliMonth};
use study_tracker::config::Config;
use study_tracker::db::Database;
use study_tracker::display;
use study_tracker::error::{Error, Result};
use study_tracker::store::SessionStore;
use study_tracker::timer::{parse_duration, SessionTimer};
use study_tracker::types::Seconds;

#[derive(Parser)]
#[command(name = "study-tracker")]
#[command(author, version, about = "Study time tracking on the Jalali calendar")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage subjects
    Subject {
        #[command(subcommand)]
        action: SubjectCommand,
    },

    /// Record a finished session
    Log {
        /// Subject name
        subject: String,

        /// Length of the session in minutes (decimals allowed)
        minutes: f64,

        /// When the session took place (YYYY-MM-DD HH:MM[:SS], default now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Run a countdown and record the time studied
    Timer {
        /// Subject name
        subject: String,

        /// Countdown length, e.g. 25m or 1h30m
        #[arg(short, long)]
        duration: Option<String>,
    },

    /// Show recent sessions of a subject
    History {
        /// Subject name
        subject: String,

        /// Number of sessions to show
        #[arg(short, long)]
        last: Option<usize>,
    },

    /// Show the sessions of one day
    Day {
        /// YYYY-MM-DD or Jalali YYYY/MM/DD (default today)
        date: Option<String>,
    },

    /// Show the Saturday-first week containing a date
    Week {
        /// YYYY-MM-DD or Jalali YYYY/MM/DD (default today)
        date: Option<String>,
    },

    /// Show a Jalali month
    Month {
        /// Jalali year (default current)
        #[arg(requires = "month")]
        year: Option<i32>,

        /// Jalali month, 1-12
        month: Option<u32>,
    },

    /// Show a month grid with study days highlighted
    Calendar {
        /// Jalali year (default current)
        #[arg(requires = "month")]
        year: Option<i32>,

        /// Jalali month, 1-12
        month: Option<u32>,

        /// Months to move from the chosen month (negative goes back)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        offset: i32,
    },

    /// Show or edit configuration
    Config {
        /// Print current configuration
        #[arg(long)]
        show: bool,

        /// Create default configuration file
        #[arg(long)]
        init: bool,
    },

    /// Database operations
    Db {
        /// Show database path and stats
        #[arg(long)]
        info: bool,
    },
}

#[derive(Subcommand)]
enum SubjectCommand {
    /// Add a subject
    Add {
        name: String,

        /// Target study time in minutes
        #[arg(short, long, default_value = "0")]
        target: i64,
    },

    /// Remove a subject and all of its sessions
    Remove { name: String },

    /// Change a subject's target
    Target {
        name: String,

        /// New target in minutes
        minutes: i64,
    },

    /// List subjects with their progress
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load and validate configuration
    let config = if let Some(ref path) = cli.config {
        Config::load_from(path)?
    } else {
        Config::load()?
    };
    config.validate()?;

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(&config.general.log_level)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let json = cli.json;
    match cli.command {
        Some(Commands::Subject { action }) => run_subject(&config, action, json),
        Some(Commands::Log {
            subject,
            minutes,
            at,
        }) => run_log(&config, &subject, minutes, at.as_deref()),
        Some(Commands::Timer { subject, duration }) => {
            run_timer(&config, &subject, duration.as_deref()).await
        }
        Some(Commands::History { subject, last }) => {
            let last = last.unwrap_or(config.display.history_length);
            run_history(&config, &subject, last, json)
        }
        Some(Commands::Day { date }) => run_day(&config, date.as_deref(), json),
        Some(Commands::Week { date }) => run_week(&config, date.as_deref(), json),
        Some(Commands::Month { year, month }) => run_month(&config, year, month, json),
        Some(Commands::Calendar {
            year,
            month,
            offset,
        }) => run_calendar(&config, year, month, offset, json),

        Some(Commands::Config { show, init }) => {
            if init {
                let default_config = Config::default();
                default_config.save()?;
                println!(
                    "Created default configuration at {}",
                    Config::config_path()?.display()
                );
            } else if show {
                let contents = toml::to_string_pretty(&config)?;
                println!("{contents}");
            } else {
                println!("Configuration path: {}", Config::config_path()?.display());
            }
            Ok(())
        }

        Some(Commands::Db { info }) => {
            if info {
                let db = open_database(&config)?;
                println!("Database path: {}", config.database_path()?.display());
                println!("Subjects:       {}", db.list_subjects()?.len());
                println!("Total sessions: {}", db.session_count()?);
            }
            Ok(())
        }

        None => {
            // Default: this week
            run_week(&config, None, json)
        }
    }
}

fn open_database(config: &Config) -> Result<Database> {
    let data_dir = config.data_dir()?;
    Database::open(&config.database, &data_dir)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parse a Gregorian `YYYY-MM-DD` or Jalali `YYYY/MM/DD` date, defaulting to today.
fn parse_date(input: Option<&str>) -> Result<NaiveDate> {
    let Some(raw) = input else {
        return Ok(Local::now().date_naive());
    };
    if raw.contains('/') {
        return JalaliDate::parse(raw)?.to_gregorian();
    }
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
        Error::invalid_date(format!(
            "expected YYYY-MM-DD or YYYY/MM/DD, got '{raw}': {e}"
        ))
    })
}

fn parse_timestamp(input: Option<&str>) -> Result<NaiveDateTime> {
    let Some(raw) = input else {
        return Ok(Local::now().naive_local());
    };
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))
        .map_err(|e| {
            Error::invalid_date(format!(
                "expected YYYY-MM-DD HH:MM[:SS], got '{raw}': {e}"
            ))
        })
}

fn resolve_month(year: Option<i32>, month: Option<u32>) -> Result<JalaliMonth> {
    match (year, month) {
        (Some(year), Some(month)) => JalaliMonth::new(year, month),
        _ => Ok(JalaliMonth::current()),
    }
}

/// Move `offset` months from the requested month, keeping within the
/// navigable range and warning when the result had to be clamped.
fn navigate(requested: JalaliMonth, offset: i32) -> JalaliMonth {
    let navigation = requested.offset(offset, JalaliDate::today().year);
    if navigation.is_clamped() {
        warn!(
            from = %requested,
            offset,
            to = %navigation.month(),
            "Navigation reached the calendar boundary"
        );
    }
    navigation.month()
}

fn run_subject(config: &Config, action: SubjectCommand, json: bool) -> Result<()> {
    let db = open_database(config)?;

    match action {
        SubjectCommand::Add { name, target } => {
            let id = db.add_subject(&name, target)?;
            println!("Subject '{}' ready (id {id})", name.trim());
        }
        SubjectCommand::Remove { name } => {
            let subject = db.subject_by_name(&name)?;
            db.delete_subject(subject.id)?;
            println!("Removed '{}' and its sessions", subject.name);
        }
        SubjectCommand::Target { name, minutes } => {
            let subject = db.subject_by_name(&name)?;
            db.update_target(subject.id, minutes)?;
            println!("Target for '{}' set to {minutes} min", subject.name);
        }
        SubjectCommand::List => {
            let subjects = db.list_subjects()?;
            if json {
                return print_json(&subjects);
            }
            display::display_subjects(&subjects, config.display.show_bars);
        }
    }
    Ok(())
}

fn run_log(config: &Config, subject: &str, minutes: f64, at: Option<&str>) -> Result<()> {
    let duration = Seconds::from_minutes_f64(minutes).ok_or_else(|| {
        Error::invalid_input(format!("Minutes must be a non-negative number, got {minutes}"))
    })?;
    let timestamp = parse_timestamp(at)?;

    let db = open_database(config)?;
    let subject = db.subject_by_name(subject)?;
    db.add_session(subject.id, duration, timestamp)?;

    println!(
        "Logged {} min of {} on {} {}",
        duration.to_minutes_string(),
        subject.name,
        JalaliDate::from_gregorian(timestamp.date()),
        timestamp.format("%H:%M")
    );
    Ok(())
}

async fn run_timer(config: &Config, subject: &str, duration: Option<&str>) -> Result<()> {
    let length = match duration {
        Some(raw) => parse_duration(raw)?,
        None => Duration::from_secs(config.timer.default_minutes * 60),
    };

    let db = open_database(config)?;
    let subject = db.subject_by_name(subject)?;
    let timer = SessionTimer::new(length);

    println!(
        "Studying {} for {} (Ctrl+C to stop early)",
        subject.name,
        humantime::format_duration(timer.duration())
    );

    let cancel = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let outcome = timer
        .run(cancel, |remaining| {
            let secs = remaining.as_secs();
            print!("\r  {:02}:{:02} remaining ", secs / 60, secs % 60);
            let _ = std::io::stdout().flush();
        })
        .await;
    println!();

    match outcome.record(&db, subject.id)? {
        Some(seconds) => {
            let verb = if outcome.completed { "Finished" } else { "Stopped" };
            println!(
                "{verb}: recorded {} min of {}",
                seconds.to_minutes_string(),
                subject.name
            );
        }
        None => println!("Stopped before a full second passed, nothing recorded"),
    }
    Ok(())
}

fn run_history(config: &Config, name: &str, last: usize, json: bool) -> Result<()> {
    let db = open_database(config)?;
    let subject = db.subject_by_name(name)?;
    let sessions = db.list_sessions_for_subject(subject.id)?;

    if json {
        let skip = sessions.len().saturating_sub(last);
        return print_json(&sessions[skip..]);
    }
    display::display_history(&subject, &sessions, last);
    Ok(())
}

fn run_day(config: &Config, date: Option<&str>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let db = open_database(config)?;
    let report = SessionAggregator::new(&db).day(date)?;

    if json {
        return print_json(&report);
    }
    display::display_day_report(&report, config.display.show_bars);
    Ok(())
}

fn run_week(config: &Config, date: Option<&str>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let db = open_database(config)?;
    let summary = SessionAggregator::new(&db).week(date)?;

    if json {
        return print_json(&summary);
    }
    display::display_summary(&summary, config.display.show_bars);
    Ok(())
}

fn run_month(config: &Config, year: Option<i32>, month: Option<u32>, json: bool) -> Result<()> {
    let month = navigate(resolve_month(year, month)?, 0);
    let db = open_database(config)?;
    let summary = SessionAggregator::new(&db).month(month)?;

    if json {
        return print_json(&summary);
    }
    display::display_summary(&summary, config.display.show_bars);
    Ok(())
}

fn run_calendar(
    config: &Config,
    year: Option<i32>,
    month: Option<u32>,
    offset: i32,
    json: bool,
) -> Result<()> {
    let month = navigate(resolve_month(year, month)?, offset);

    let db = open_database(config)?;
    let study_days = StudyDayIndex::new(&db).for_month(month)?;
    let summary = SessionAggregator::new(&db).month(month)?;

    if json {
        return print_json(&serde_json::json!({
            "study_days": study_days,
            "summary": summary,
        }));
    }
    println!();
    println!("{}", display::render_month_grid(month, &study_days)?);
    println!("\n  Study days: {}", study_days.len());
    display::display_summary(&summary, config.display.show_bars);
    Ok(())
}
