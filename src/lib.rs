//! Core of the `studyplan` task planner: the task model, a date-indexed
//! store with write-through persistence, list projections and countdown
//! timer logic.

pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod planner;
pub mod storage;
pub mod timer;
pub mod view;

pub use error::{PlannerError, Result};
pub use models::Task;
pub use planner::{NewTask, Rejection, TaskStore};
pub use storage::TaskRepository;
