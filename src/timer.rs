use std::collections::HashSet;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::info;

use crate::models::Task;

/// Where a task's countdown stands at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    /// The task has no timer.
    Disabled,
    /// The countdown has not started yet.
    Pending { starts_in: Duration },
    /// The countdown is running.
    Running { remaining: Duration },
    /// The countdown has reached zero.
    Elapsed,
}

/// Computes the timer phase from the task's start time, duration and `now`.
///
/// Holds no state, so polling at any cadence gives the same answer. A
/// duration reaching past the end of the calendar never elapses; a negative
/// one reaching before its start has elapsed already.
pub fn timer_phase(task: &Task, now: NaiveDateTime) -> TimerPhase {
    if !task.timer_enabled {
        return TimerPhase::Disabled;
    }
    let end = match task.end_time() {
        Some(end) => end,
        None if task.duration < Duration::zero() => NaiveDateTime::MIN,
        None => NaiveDateTime::MAX,
    };
    if now < task.start_time {
        TimerPhase::Pending {
            starts_in: task.start_time - now,
        }
    } else if now < end {
        TimerPhase::Running {
            remaining: end - now,
        }
    } else {
        TimerPhase::Elapsed
    }
}

/// Seconds from `now` until the task's start time. Negative once the start
/// has passed, meaning the countdown should begin immediately.
pub fn compute_delay_seconds(task: &Task, now: NaiveDateTime) -> i64 {
    (task.start_time - now).num_seconds()
}

/// Formats a span as `MM:SS`, minutes not wrapping at the hour.
pub fn format_remaining(d: Duration) -> String {
    let secs = d.num_seconds().max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Tracks which timers already produced their "time's up" notice.
///
/// A notice is keyed by title, date and start time, so rescheduling a task's
/// start makes it eligible again.
#[derive(Debug, Default)]
pub struct TimerWatch {
    notified: HashSet<(String, NaiveDate, NaiveDateTime)>,
}

impl TimerWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every timer that has already elapsed at `now` as notified,
    /// without reporting it. Used when a watcher starts so that timers
    /// which ran out earlier are not announced late.
    pub fn skip_elapsed<'a, I>(&mut self, tasks: I, now: NaiveDateTime)
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let skipped = self.poll(tasks, now).len();
        if skipped > 0 {
            info!(skipped, "ignoring timers that elapsed before watching");
        }
    }

    /// Returns the tasks whose countdown has elapsed and that were not
    /// returned by an earlier poll. Completed tasks are skipped.
    pub fn poll<'a, I>(&mut self, tasks: I, now: NaiveDateTime) -> Vec<&'a Task>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let mut due = Vec::new();
        for task in tasks {
            if task.is_completed() || timer_phase(task, now) != TimerPhase::Elapsed {
                continue;
            }
            let key = (task.title().to_string(), task.date(), task.start_time);
            if self.notified.insert(key) {
                info!(title = task.title(), date = %task.date(), "timer elapsed");
                due.push(task);
            }
        }
        due
    }
}
