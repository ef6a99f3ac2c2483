use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use tracing::{debug, warn};

use super::TaskRepository;
use crate::error::{PlannerError, Result};
use crate::models::{self, Task};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    title         TEXT NOT NULL,
    date          TEXT NOT NULL,
    completed     INTEGER NOT NULL DEFAULT 0,
    priority      TEXT,
    complexity    INTEGER,
    category      TEXT,
    notes         TEXT,
    created_at    TEXT,
    start_time    TEXT,
    duration_secs INTEGER,
    timer_enabled INTEGER
)";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// SQLite-backed task repository.
///
/// Rows written by older versions may carry NULL in every column besides
/// title, date and completed; those load with the usual task defaults.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

/// Raw column values of one row, before decoding.
struct StoredRow {
    title: String,
    date: String,
    completed: bool,
    priority: Option<String>,
    complexity: Option<i32>,
    category: Option<String>,
    notes: Option<String>,
    created_at: Option<String>,
    start_time: Option<String>,
    duration_secs: Option<i64>,
    timer_enabled: Option<bool>,
}

impl SqliteRepository {
    /// Opens (or creates) the database file and applies the schema.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::with_connection(Connection::open(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| PlannerError::Lock(e.to_string()))
    }

    #[cfg(test)]
    fn execute_raw(&self, sql: &str) -> Result<()> {
        self.lock()?.execute_batch(sql)?;
        Ok(())
    }
}

impl TaskRepository for SqliteRepository {
    fn load_all(&self) -> Result<Vec<Task>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT title, date, completed, priority, complexity, category, notes, \
             created_at, start_time, duration_secs, timer_enabled FROM tasks ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StoredRow {
                title: row.get(0)?,
                date: row.get(1)?,
                completed: row.get(2)?,
                priority: row.get(3)?,
                complexity: row.get(4)?,
                category: row.get(5)?,
                notes: row.get(6)?,
                created_at: row.get(7)?,
                start_time: row.get(8)?,
                duration_secs: row.get(9)?,
                timer_enabled: row.get(10)?,
            })
        })?;

        let mut tasks = Vec::new();
        for r in rows {
            tasks.push(row_to_task(r?)?);
        }
        debug!(count = tasks.len(), "loaded tasks from sqlite");
        Ok(tasks)
    }

    fn save(&self, task: &Task) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO tasks (title, date, completed, priority, complexity, category, notes, \
             created_at, start_time, duration_secs, timer_enabled) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                task.title(),
                task.date().to_string(),
                task.is_completed(),
                task.priority,
                task.complexity,
                task.category,
                task.notes,
                format_timestamp(task.created_at()),
                format_timestamp(task.start_time),
                task.duration.num_seconds(),
                task.timer_enabled,
            ],
        )?;
        Ok(())
    }

    fn update(&self, task: &Task) -> Result<()> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE tasks SET completed = ?3, priority = ?4, complexity = ?5, category = ?6, \
             notes = ?7, start_time = ?8, duration_secs = ?9, timer_enabled = ?10 \
             WHERE id = (SELECT id FROM tasks WHERE title = ?1 AND date = ?2 ORDER BY id LIMIT 1)",
            params![
                task.title(),
                task.date().to_string(),
                task.is_completed(),
                task.priority,
                task.complexity,
                task.category,
                task.notes,
                format_timestamp(task.start_time),
                task.duration.num_seconds(),
                task.timer_enabled,
            ],
        )?;
        if changed == 0 {
            warn!(title = task.title(), date = %task.date(), "no stored task to update");
        }
        Ok(())
    }
}

fn format_timestamp(t: NaiveDateTime) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|e| PlannerError::Corrupt(format!("timestamp '{s}': {e}")))
}

fn row_to_task(row: StoredRow) -> Result<Task> {
    let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
        .map_err(|e| PlannerError::Corrupt(format!("date '{}': {e}", row.date)))?;
    let created_at = match row.created_at.as_deref() {
        Some(s) => parse_timestamp(s)?,
        None => models::now(),
    };

    let mut task = Task::restore(row.title, date, row.completed, created_at);
    if let Some(p) = row.priority {
        task.priority = p;
    }
    if let Some(c) = row.complexity {
        task.complexity = c;
    }
    if let Some(c) = row.category {
        task.category = c;
    }
    if let Some(n) = row.notes {
        task.notes = n;
    }
    task.start_time = match row.start_time.as_deref() {
        Some(s) => parse_timestamp(s)?,
        None => models::now(),
    };
    if let Some(secs) = row.duration_secs {
        task.duration = Duration::try_seconds(secs)
            .ok_or_else(|| PlannerError::Corrupt(format!("duration {secs}s")))?;
    }
    task.timer_enabled = row.timer_enabled.unwrap_or(false);
    Ok(task)
}
