/// Errors raised when a task repository cannot complete a load, save or update.
///
/// Input validation never produces one of these: a rejected `add_task` is
/// reported as `Ok(false)`.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// File system error from the JSON backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The JSON task file could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite backend error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored record holds a value that cannot be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// The connection mutex was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    Lock(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, PlannerError>;
