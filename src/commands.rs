use std::thread;
use std::time::Duration as StdDuration;

use chrono::{NaiveDate, NaiveDateTime};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::error::Result;
use crate::models::{self, Task};
use crate::planner::{NewTask, TaskStore};
use crate::storage::TaskRepository;
use crate::timer::{format_remaining, timer_phase, TimerPhase, TimerWatch};
use crate::view::{project, PriorityFilter, SortKey};

/// Parses a `YYYY-MM-DD` date argument.
pub fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{}': {}. Use YYYY-MM-DD.", s, e))
}

/// Parses a `YYYY-MM-DD HH:MM` start time argument.
pub fn parse_start(s: &str) -> std::result::Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M")
        .map_err(|e| format!("invalid start time '{}': {}. Use \"YYYY-MM-DD HH:MM\".", s, e))
}

/// Adds a task, reporting why it was rejected if validation fails.
pub fn cmd_add<R: TaskRepository>(store: &mut TaskStore<R>, new: NewTask, silent: bool) -> Result<bool> {
    let reason = new.check(models::today()).err();
    let title = new.title.clone();
    let date = new.date;
    let added = store.add_task_with(new)?;
    if !silent {
        match (added, reason) {
            (true, _) => println!("Task '{}' added on {}.", title, date),
            (false, Some(r)) => eprintln!("Task not added: {}.", r),
            (false, None) => eprintln!("Task not added."),
        }
    }
    Ok(added)
}

/// Marks the first ongoing task with the given title on `date` as done.
pub fn cmd_complete<R: TaskRepository>(store: &mut TaskStore<R>, date: NaiveDate, title: &str, silent: bool) -> Result<bool> {
    let done = store.mark_completed(date, title)?;
    if !silent {
        if done {
            println!("Task '{}' on {} marked as complete.", title, date);
        } else {
            eprintln!("No ongoing task '{}' on {}.", title, date);
        }
    }
    Ok(done)
}

/// Builds the table used for the ongoing task list.
pub fn task_table(tasks: &[&Task]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Cx").add_attribute(Attribute::Bold),
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Notes").add_attribute(Attribute::Bold),
            Cell::new("Created").add_attribute(Attribute::Bold),
            Cell::new("Starts At").add_attribute(Attribute::Bold),
            Cell::new("Min").add_attribute(Attribute::Bold),
        ]);

    for t in tasks {
        let priority_color = match t.priority.as_str() {
            "High" => Color::Red,
            "Medium" => Color::Yellow,
            "Low" => Color::Green,
            _ => Color::Reset,
        };
        table.add_row(vec![
            Cell::new(t.title()),
            Cell::new(t.date().format("%b %d, %Y")),
            Cell::new(&t.priority).fg(priority_color),
            Cell::new(t.complexity),
            Cell::new(&t.category),
            Cell::new(&t.notes),
            Cell::new(t.created_at().format("%Y-%m-%d %H:%M")),
            Cell::new(t.start_time.format("%b %d, %Y %H:%M")),
            Cell::new(t.duration.num_minutes()),
        ]);
    }
    table
}

/// Builds the two-column table used for completed tasks.
pub fn completed_table(tasks: &[&Task]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec![
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
        ]);
    for t in tasks {
        table.add_row(vec![
            Cell::new(t.title()).fg(Color::Grey),
            Cell::new(t.date().format("%b %d, %Y")).fg(Color::Grey),
        ]);
    }
    table
}

/// Prints the ongoing tasks filtered by priority and sorted by `sort`.
pub fn cmd_list<R: TaskRepository>(store: &TaskStore<R>, filter: &PriorityFilter, sort: SortKey, show_completed: bool) {
    let ongoing = store.ongoing_tasks();
    let shown = project(ongoing, filter, sort);
    if shown.is_empty() {
        println!("No ongoing tasks.");
    } else {
        println!("Ongoing tasks (priority: {}):", filter);
        println!("{}", task_table(&shown));
    }

    if show_completed {
        let completed = store.completed_tasks();
        if completed.is_empty() {
            println!("No completed tasks.");
        } else {
            println!("Completed tasks:");
            println!("{}", completed_table(&completed));
        }
    }
}

/// Prints every task scheduled on `date`.
pub fn cmd_day<R: TaskRepository>(store: &TaskStore<R>, date: NaiveDate) {
    let tasks = store.tasks_for_date(date);
    if tasks.is_empty() {
        println!("No tasks on {}.", date);
        return;
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Task", "Priority", "Cx", "Status"]);
    for t in tasks {
        let (status, color) = if t.is_completed() {
            ("Done", Color::Green)
        } else {
            ("Ongoing", Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(t.title()),
            Cell::new(&t.priority),
            Cell::new(t.complexity),
            Cell::new(status).fg(color),
        ]);
    }
    println!("Tasks for {}:", date.format("%b %d, %Y"));
    println!("{table}");
}

/// Describes a timer phase for display.
pub fn describe_phase(phase: TimerPhase) -> String {
    match phase {
        TimerPhase::Disabled => "No timer".to_string(),
        TimerPhase::Pending { starts_in } => format!("Starts in {}", format_remaining(starts_in)),
        TimerPhase::Running { remaining } => format!("Running, {} left", format_remaining(remaining)),
        TimerPhase::Elapsed => "Time's up".to_string(),
    }
}

/// Prints the timer phase of every ongoing task with a timer.
pub fn cmd_timers<R: TaskRepository>(store: &TaskStore<R>) {
    let now = models::now();
    let timed: Vec<&Task> = store.ongoing_tasks().into_iter().filter(|t| t.timer_enabled).collect();
    if timed.is_empty() {
        println!("No timers set.");
        return;
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Task", "Starts At", "Min", "Status"]);
    for t in timed {
        let phase = timer_phase(t, now);
        let color = match phase {
            TimerPhase::Running { .. } => Color::Yellow,
            TimerPhase::Elapsed => Color::Red,
            _ => Color::Reset,
        };
        table.add_row(vec![
            Cell::new(t.title()),
            Cell::new(t.start_time.format("%b %d, %Y %H:%M")),
            Cell::new(t.duration.num_minutes()),
            Cell::new(describe_phase(phase)).fg(color),
        ]);
    }
    println!("{table}");
}

/// Reloads every task from the repository and returns the ones whose
/// timer ran out since the previous tick.
pub fn watch_tick<R: TaskRepository + ?Sized>(repo: &R, watch: &mut TimerWatch, now: NaiveDateTime) -> Result<Vec<Task>> {
    let tasks = repo.load_all()?;
    Ok(watch.poll(&tasks, now).into_iter().cloned().collect())
}

/// Polls the timers every `interval_secs` and prints a notice the first
/// time each one runs out. Tasks are re-read from the repository on every
/// tick, so changes made by other commands are picked up. Timers that had
/// already run out when watching started are not announced.
///
/// Runs until the process is stopped or the repository fails.
pub fn cmd_watch<R: TaskRepository + ?Sized>(repo: &R, interval_secs: u64) -> Result<()> {
    let mut watch = TimerWatch::new();
    watch.skip_elapsed(&repo.load_all()?, models::now());
    println!("Watching timers (Ctrl-C to stop)...");
    loop {
        for t in watch_tick(repo, &mut watch, models::now())? {
            println!("Time's up for: {}", t.title());
        }
        thread::sleep(StdDuration::from_secs(interval_secs.max(1)));
    }
}
