use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{self, is_valid_priority, Task};
use crate::storage::TaskRepository;
use crate::timer;

/// Why `add_task` turned an input down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    BlankTitle,
    PastDate,
    UnknownPriority,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::BlankTitle => f.write_str("title must not be blank"),
            Rejection::PastDate => f.write_str("date is in the past"),
            Rejection::UnknownPriority => f.write_str("priority must be High, Medium or Low"),
        }
    }
}

/// Input for creating a task, including optional timer settings.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub date: NaiveDate,
    pub priority: String,
    pub complexity: i32,
    pub category: Option<String>,
    pub notes: String,
    /// Defaults to the creation instant.
    pub start_time: Option<NaiveDateTime>,
    /// Defaults to 30 minutes.
    pub duration: Option<Duration>,
    pub timer_enabled: bool,
}

impl NewTask {
    pub fn new(
        title: impl Into<String>,
        date: NaiveDate,
        priority: impl Into<String>,
        complexity: i32,
    ) -> Self {
        NewTask {
            title: title.into(),
            date,
            priority: priority.into(),
            complexity,
            category: None,
            notes: String::new(),
            start_time: None,
            duration: None,
            timer_enabled: false,
        }
    }

    /// Checks the input against `today`. Complexity is never checked.
    pub fn check(&self, today: NaiveDate) -> std::result::Result<(), Rejection> {
        if self.title.trim().is_empty() {
            return Err(Rejection::BlankTitle);
        }
        if self.date < today {
            return Err(Rejection::PastDate);
        }
        if !is_valid_priority(&self.priority) {
            return Err(Rejection::UnknownPriority);
        }
        Ok(())
    }

    fn into_task(self) -> Task {
        let mut t = Task::new(self.title, self.date);
        t.priority = self.priority;
        t.complexity = self.complexity;
        if let Some(c) = self.category {
            t.category = c;
        }
        t.notes = self.notes;
        if let Some(s) = self.start_time {
            t.start_time = s;
        }
        if let Some(d) = self.duration {
            t.duration = d;
        }
        t.timer_enabled = self.timer_enabled;
        t
    }
}

/// In-memory task index, written through to a repository on every change.
///
/// Tasks are grouped by date; within a date they keep insertion order.
/// The store never removes a task.
pub struct TaskStore<R: TaskRepository> {
    repo: R,
    by_date: BTreeMap<NaiveDate, Vec<Task>>,
}

impl<R: TaskRepository> TaskStore<R> {
    /// Seeds a store with everything the repository holds.
    pub fn load(repo: R) -> Result<Self> {
        let tasks = repo.load_all()?;
        let mut store = TaskStore {
            repo,
            by_date: BTreeMap::new(),
        };
        for t in tasks {
            store.index(t);
        }
        info!(count = store.len(), "task store loaded");
        Ok(store)
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    fn index(&mut self, task: Task) {
        self.by_date.entry(task.date()).or_default().push(task);
    }

    /// Validates and adds a task with default metadata.
    ///
    /// Returns `Ok(false)` without touching the store when the title is
    /// blank, the date is before today or the priority is not one of
    /// High/Medium/Low. Errors come only from the repository.
    pub fn add_task(
        &mut self,
        title: &str,
        date: NaiveDate,
        priority: &str,
        complexity: i32,
    ) -> Result<bool> {
        self.add_task_with(NewTask::new(title, date, priority, complexity))
    }

    /// Like [`add_task`](Self::add_task), also taking category, notes and
    /// timer settings.
    ///
    /// The task stays in memory even when the repository write fails; the
    /// error is still returned.
    pub fn add_task_with(&mut self, new: NewTask) -> Result<bool> {
        if let Err(reason) = new.check(models::today()) {
            debug!(title = %new.title, date = %new.date, %reason, "task rejected");
            return Ok(false);
        }
        let task = new.into_task();
        let date = task.date();
        let tasks = self.by_date.entry(date).or_default();
        tasks.push(task);
        if let Some(t) = tasks.last() {
            debug!(title = t.title(), %date, "task added");
            self.repo.save(t)?;
        }
        Ok(true)
    }

    /// Tasks scheduled on `date`, in insertion order. Empty when none.
    pub fn tasks_for_date(&self, date: NaiveDate) -> &[Task] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every task, ordered by date then insertion.
    pub fn all_tasks(&self) -> impl Iterator<Item = &Task> {
        self.by_date.values().flatten()
    }

    pub fn ongoing_tasks(&self) -> Vec<&Task> {
        self.all_tasks().filter(|t| !t.is_completed()).collect()
    }

    pub fn completed_tasks(&self) -> Vec<&Task> {
        self.all_tasks().filter(|t| t.is_completed()).collect()
    }

    pub fn len(&self) -> usize {
        self.by_date.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Marks the first ongoing task on `date` titled `title` as completed
    /// and persists it.
    ///
    /// Returns `Ok(false)` when no such ongoing task exists. On a failed
    /// write the task stays completed in memory.
    pub fn mark_completed(&mut self, date: NaiveDate, title: &str) -> Result<bool> {
        let Some(task) = self
            .by_date
            .get_mut(&date)
            .and_then(|ts| ts.iter_mut().find(|t| !t.is_completed() && t.title() == title))
        else {
            return Ok(false);
        };
        task.set_completed(true);
        info!(title, %date, "task completed");
        self.repo.update(task)?;
        Ok(true)
    }
}

/// Seconds until the task's start time, measured against the current clock.
pub fn compute_delay_seconds(task: &Task) -> i64 {
    timer::compute_delay_seconds(task, models::now())
}
