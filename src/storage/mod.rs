//! Persistence backends for tasks.
//!
//! The planner only talks to [`TaskRepository`]. Three backends implement it:
//! an in-memory list, a JSON file and an SQLite database.

mod json;
mod sqlite;

use std::cell::RefCell;

use crate::error::Result;
use crate::models::Task;

pub use json::JsonRepository;
pub use sqlite::SqliteRepository;

/// Durable store for tasks.
///
/// Records are addressed by the pair (title, date). Two tasks sharing both
/// cannot be told apart by `update`, which touches the first match only.
pub trait TaskRepository {
    /// Returns every persisted task, in no particular order.
    fn load_all(&self) -> Result<Vec<Task>>;

    /// Persists a newly created task.
    fn save(&self, task: &Task) -> Result<()>;

    /// Persists changes to an existing task, matched by title and date.
    fn update(&self, task: &Task) -> Result<()>;
}

impl<R: TaskRepository + ?Sized> TaskRepository for Box<R> {
    fn load_all(&self) -> Result<Vec<Task>> {
        (**self).load_all()
    }

    fn save(&self, task: &Task) -> Result<()> {
        (**self).save(task)
    }

    fn update(&self, task: &Task) -> Result<()> {
        (**self).update(task)
    }
}

/// Finds the first record addressed by the task's (title, date) key.
pub(crate) fn position_of(tasks: &[Task], task: &Task) -> Option<usize> {
    tasks
        .iter()
        .position(|t| t.title() == task.title() && t.date() == task.date())
}

/// Volatile backend, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tasks: RefCell<Vec<Task>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with `tasks`.
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: RefCell::new(tasks),
        }
    }

    /// Snapshot of the stored records.
    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.borrow().clone()
    }
}

impl TaskRepository for MemoryRepository {
    fn load_all(&self) -> Result<Vec<Task>> {
        Ok(self.snapshot())
    }

    fn save(&self, task: &Task) -> Result<()> {
        self.tasks.borrow_mut().push(task.clone());
        Ok(())
    }

    fn update(&self, task: &Task) -> Result<()> {
        let mut tasks = self.tasks.borrow_mut();
        if let Some(i) = position_of(&tasks, task) {
            tasks[i] = task.clone();
        }
        Ok(())
    }
}
