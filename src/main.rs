//! # studyplan
//!
//! A terminal study planner. Schedule tasks on calendar dates, tag them with
//! a priority and a complexity, attach an optional countdown timer, and mark
//! them done when finished.
//!
//! ## Usage
//!
//! **Adding Tasks**
//! ```bash
//! # Due today, default priority (Medium) and complexity (5)
//! studyplan add "Read chapter 4"
//!
//! # Scheduled, with a 45 minute timer
//! studyplan add "Grant proposal" --date 2025-07-31 --priority High --complexity 7 \
//!     --start "2025-07-31 09:00" --minutes 45 --timer
//! ```
//!
//! **Viewing Tasks**
//! ```bash
//! # Ongoing tasks, sorted by due date
//! studyplan list
//!
//! # Only high priority, ordered by complexity, plus the completed list
//! studyplan list --priority high --sort complexity --completed
//!
//! # Everything on one day
//! studyplan day 2025-07-31
//! ```
//!
//! **Completing Tasks**
//! ```bash
//! studyplan complete 2025-07-31 "Grant proposal"
//! ```
//!
//! **Timers**
//! ```bash
//! studyplan timers   # one-shot status
//! studyplan watch    # prints "Time's up" once per timer
//! ```
//!
//! ## Data Storage
//!
//! Tasks are saved in your local data directory:
//! *   Linux: `~/.local/share/studyplan/tasks.json`
//! *   macOS: `~/Library/Application Support/studyplan/tasks.json`
//! *   Windows: `%LOCALAPPDATA%\studyplan\tasks.json`
//!
//! Use `--backend sqlite` (or `STUDYPLAN_BACKEND=sqlite`) to store them in
//! `tasks.db` instead, and `--db <PATH>` (or `STUDYPLAN_DB`) to pick the file.
//! Set `RUST_LOG=studyplan=debug` for diagnostics on stderr.
//!
//! ## Exit Status
//!
//! *   `0`: success
//! *   `1`: storage error (unreadable file, failed write)
//! *   `2`: bad arguments, reported by the argument parser
//! *   `3`: request refused (rejected task, no such ongoing task)

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{NaiveDate, NaiveDateTime};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::EnvFilter;

use studyplan::commands::*;
use studyplan::config::{Backend, Config};
use studyplan::models::{self, DEFAULT_COMPLEXITY, DEFAULT_PRIORITY};
use studyplan::view::{PriorityFilter, SortKey};
use studyplan::{NewTask, TaskStore};

/// Exit status for a request that was understood but refused.
const REFUSED_EXIT: u8 = 3;

#[derive(Parser)]
#[command(name = "studyplan", version)]
#[command(about = "Personal study and task planner", long_about = None)]
struct Cli {
    /// Path to the task database file
    #[arg(long, global = true, env = "STUDYPLAN_DB")]
    db: Option<PathBuf>,

    /// Storage backend
    #[arg(long, global = true, value_enum, env = "STUDYPLAN_BACKEND", default_value_t = Backend::Json)]
    backend: Backend,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Scheduled date in YYYY-MM-DD (defaults to today)
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// High, Medium or Low
        #[arg(short, long, default_value = DEFAULT_PRIORITY)]
        priority: String,
        /// Effort from 1 to 10
        #[arg(short, long, default_value_t = DEFAULT_COMPLEXITY, allow_negative_numbers = true)]
        complexity: i32,
        /// Category label
        #[arg(long)]
        category: Option<String>,
        /// Free-form notes
        #[arg(short, long, default_value = "")]
        notes: String,
        /// Timer start as "YYYY-MM-DD HH:MM" (defaults to now)
        #[arg(short, long, value_parser = parse_start)]
        start: Option<NaiveDateTime>,
        /// Timer length in minutes (1-240)
        #[arg(short, long, default_value_t = 30, value_parser = clap::value_parser!(i64).range(1..=240))]
        minutes: i64,
        /// Enable the countdown timer
        #[arg(short, long)]
        timer: bool,
    },
    /// List ongoing tasks
    List {
        /// Show only this priority (All, High, Medium, Low)
        #[arg(short, long, default_value = "All")]
        priority: PriorityFilter,
        /// Sort order
        #[arg(short, long, value_enum, default_value_t = SortKey::DueDate)]
        sort: SortKey,
        /// Also list completed tasks
        #[arg(short, long)]
        completed: bool,
    },
    /// Show the tasks scheduled on one date
    Day {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
    /// Mark a task as complete
    Complete {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
        title: String,
    },
    /// Show the state of every timer
    Timers,
    /// Wait for timers and announce when each runs out.
    /// Timers that already ran out before watching starts are not announced.
    Watch {
        /// Poll interval in seconds
        #[arg(short, long, default_value_t = 1)]
        interval: u64,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("studyplan=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "studyplan", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(REFUSED_EXIT),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Runs one command. `Ok(false)` means the request was understood but
/// refused (rejected input, unknown task).
fn run(cli: Cli) -> studyplan::Result<bool> {
    let config = Config::resolve(cli.db, cli.backend);
    let mut store = TaskStore::load(config.open()?)?;

    match cli.command {
        Commands::Add { title, date, priority, complexity, category, notes, start, minutes, timer } => {
            let mut new = NewTask::new(title, date.unwrap_or_else(models::today), priority, complexity);
            new.category = category;
            new.notes = notes;
            new.start_time = start;
            new.duration = Some(chrono::Duration::minutes(minutes));
            new.timer_enabled = timer;
            cmd_add(&mut store, new, false)
        }
        Commands::List { priority, sort, completed } => {
            cmd_list(&store, &priority, sort, completed);
            Ok(true)
        }
        Commands::Day { date } => {
            cmd_day(&store, date);
            Ok(true)
        }
        Commands::Complete { date, title } => cmd_complete(&mut store, date, &title, false),
        Commands::Timers => {
            cmd_timers(&store);
            Ok(true)
        }
        Commands::Watch { interval } => {
            cmd_watch(store.repository(), interval)?;
            Ok(true)
        }
        Commands::Completions { .. } => Ok(true),
    }
}
