use std::path::PathBuf;

use clap::ValueEnum;
use tracing::debug;

use crate::error::Result;
use crate::storage::{JsonRepository, SqliteRepository, TaskRepository};

/// Storage technology behind the task repository.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Json,
    Sqlite,
}

impl Backend {
    fn file_name(self) -> &'static str {
        match self {
            Backend::Json => "tasks.json",
            Backend::Sqlite => "tasks.db",
        }
    }
}

/// Where and how tasks are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend: Backend,
    pub db_path: PathBuf,
}

impl Config {
    /// Resolves the database location.
    ///
    /// An explicit path wins (the CLI fills it from `--db` or `STUDYPLAN_DB`).
    /// Otherwise the file lives in `<data_local_dir>/studyplan/`, or the
    /// current directory when the platform has no data directory.
    ///
    /// Nothing is created here; the repository makes the parent directory
    /// when it first writes.
    pub fn resolve(db: Option<PathBuf>, backend: Backend) -> Config {
        let db_path = db.unwrap_or_else(|| {
            let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
            p.push("studyplan");
            p.push(backend.file_name());
            p
        });
        Config { backend, db_path }
    }

    /// Opens the configured repository.
    pub fn open(&self) -> Result<Box<dyn TaskRepository>> {
        debug!(backend = ?self.backend, path = %self.db_path.display(), "opening repository");
        Ok(match self.backend {
            Backend::Json => Box::new(JsonRepository::new(&self.db_path)),
            Backend::Sqlite => Box::new(SqliteRepository::open(&self.db_path)?),
        })
    }
}
