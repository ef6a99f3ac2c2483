//! Filtering and sorting of task lists for display.
//!
//! Projections are recomputed from scratch on every call.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

use crate::models::{Task, PRIORITIES};

/// Which priority to show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(String),
}

impl PriorityFilter {
    /// True when the task passes the filter. Priority text is compared
    /// ignoring ASCII case.
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Only(p) => task.priority.eq_ignore_ascii_case(p),
        }
    }
}

impl FromStr for PriorityFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            Ok(PriorityFilter::All)
        } else {
            Ok(PriorityFilter::Only(s.to_string()))
        }
    }
}

impl fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityFilter::All => f.write_str("All"),
            PriorityFilter::Only(p) => f.write_str(p),
        }
    }
}

/// Available orderings for the ongoing task list.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    DueDate,
    Priority,
    Complexity,
}

/// Rank of a priority label: High=0, Medium=1, Low=2.
///
/// Unknown labels rank -1 and therefore sort ahead of every known one.
/// Matching is exact, unlike the filter.
pub fn priority_rank(priority: &str) -> i32 {
    PRIORITIES
        .iter()
        .position(|p| *p == priority)
        .map(|i| i as i32)
        .unwrap_or(-1)
}

/// Compares two tasks under the given key.
pub fn compare(a: &Task, b: &Task, key: SortKey) -> Ordering {
    match key {
        SortKey::DueDate => a.date().cmp(&b.date()),
        SortKey::Priority => priority_rank(&a.priority).cmp(&priority_rank(&b.priority)),
        SortKey::Complexity => a.complexity.cmp(&b.complexity),
    }
}

/// Filters `tasks` by priority and sorts the survivors by `key`.
///
/// The sort is stable: tasks with equal keys keep their input order.
pub fn project<'a, I>(tasks: I, filter: &PriorityFilter, key: SortKey) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut out: Vec<&Task> = tasks.into_iter().filter(|t| filter.matches(t)).collect();
    out.sort_by(|a, b| compare(a, b, key));
    out
}
