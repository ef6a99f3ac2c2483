use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Accepted priority labels, highest first.
pub const PRIORITIES: [&str; 3] = ["High", "Medium", "Low"];

pub const DEFAULT_PRIORITY: &str = "Medium";
pub const DEFAULT_COMPLEXITY: i32 = 5;
pub const DEFAULT_CATEGORY: &str = "General";
/// Default timer length: 30 minutes.
pub const DEFAULT_DURATION_SECS: i64 = 30 * 60;

/// Returns true when `priority` is exactly one of [`PRIORITIES`].
pub fn is_valid_priority(priority: &str) -> bool {
    PRIORITIES.contains(&priority)
}

/// Current local wall-clock time.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Current local date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// A single scheduled task.
///
/// `title`, `date`, `created_at` and `completed` are only reachable through
/// accessors: the first three never change after construction and completion
/// is sticky. The remaining fields are plain data and may be set to anything,
/// including out-of-range complexities and unknown priority labels.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    title: String,
    /// The calendar date the task is scheduled on.
    date: NaiveDate,
    #[serde(default)]
    completed: bool,
    /// One of "High", "Medium", "Low" when created through the store.
    #[serde(default = "default_priority")]
    pub priority: String,
    /// Effort estimate, nominally 1-10.
    #[serde(default = "default_complexity")]
    pub complexity: i32,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "now")]
    created_at: NaiveDateTime,
    /// Instant at which the countdown timer starts.
    #[serde(default = "now")]
    pub start_time: NaiveDateTime,
    /// Countdown length, persisted as whole seconds.
    #[serde(default = "default_duration", with = "duration_secs")]
    pub duration: Duration,
    #[serde(default)]
    pub timer_enabled: bool,
}

fn default_priority() -> String {
    DEFAULT_PRIORITY.to_string()
}

fn default_complexity() -> i32 {
    DEFAULT_COMPLEXITY
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_duration() -> Duration {
    Duration::seconds(DEFAULT_DURATION_SECS)
}

impl Task {
    /// Creates an ongoing task with default metadata.
    ///
    /// Neither the title nor the date is checked here; `TaskStore::add_task`
    /// is where input gets validated.
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Task {
        let created = now();
        Task {
            title: title.into(),
            date,
            completed: false,
            priority: default_priority(),
            complexity: DEFAULT_COMPLEXITY,
            category: default_category(),
            notes: String::new(),
            created_at: created,
            start_time: created,
            duration: default_duration(),
            timer_enabled: false,
        }
    }

    /// Rebuilds a task from stored values. Optional fields keep their defaults
    /// and are filled in by the caller.
    pub(crate) fn restore(
        title: String,
        date: NaiveDate,
        completed: bool,
        created_at: NaiveDateTime,
    ) -> Task {
        let mut task = Task::new(title, date);
        task.completed = completed;
        task.created_at = created_at;
        task
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    /// Moves the task from ongoing to completed.
    ///
    /// Completion is terminal: once set, passing `false` has no effect.
    pub fn set_completed(&mut self, completed: bool) {
        if !self.completed && completed {
            self.completed = true;
        }
    }

    /// Instant at which the countdown ends, or `None` when it falls outside
    /// the representable calendar range.
    pub fn end_time(&self) -> Option<NaiveDateTime> {
        self.start_time.checked_add_signed(self.duration)
    }
}

/// Serializes a `chrono::Duration` as an integer number of seconds.
pub(crate) mod duration_secs {
    use chrono::Duration;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(d.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = i64::deserialize(d)?;
        Duration::try_seconds(secs)
            .ok_or_else(|| D::Error::custom(format!("duration out of range: {secs}s")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 26).unwrap()
    }

    #[test]
    fn new_task_has_defaults() {
        let t = Task::new("Read chapter 3", date());
        assert_eq!(t.title(), "Read chapter 3");
        assert_eq!(t.date(), date());
        assert!(!t.is_completed());
        assert_eq!(t.priority, "Medium");
        assert_eq!(t.complexity, 5);
        assert_eq!(t.category, "General");
        assert_eq!(t.notes, "");
        assert_eq!(t.duration, Duration::minutes(30));
        assert!(!t.timer_enabled);
        assert_eq!(t.start_time, t.created_at());
    }

    #[test]
    fn completion_is_sticky() {
        let mut t = Task::new("Essay", date());
        t.set_completed(false);
        assert!(!t.is_completed());
        t.set_completed(true);
        t.set_completed(true);
        assert!(t.is_completed());
        t.set_completed(false);
        assert!(t.is_completed());
    }

    #[test]
    fn setters_are_not_validated() {
        let mut t = Task::new("", date());
        assert_eq!(t.title(), "");
        t.complexity = -1;
        t.priority = "Urgent".into();
        t.duration = Duration::seconds(59);
        assert_eq!(t.complexity, -1);
        assert_eq!(t.priority, "Urgent");
        assert_eq!(t.duration, Duration::seconds(59));
        t.complexity = 11;
        t.duration = Duration::minutes(241);
        assert_eq!(t.complexity, 11);
        assert_eq!(t.duration, Duration::minutes(241));
    }

    #[test]
    fn priority_check_is_exact() {
        assert!(is_valid_priority("High"));
        assert!(is_valid_priority("Low"));
        assert!(!is_valid_priority("high"));
        assert!(!is_valid_priority("Urgent"));
        assert!(!is_valid_priority(""));
    }

    #[test]
    fn end_time_adds_duration() {
        let mut t = Task::new("Lab", date());
        t.duration = Duration::minutes(45);
        assert_eq!(t.end_time().unwrap() - t.start_time, Duration::minutes(45));
    }

    #[test]
    fn end_time_out_of_range_is_none() {
        let mut t = Task::new("Marathon", date());
        t.duration = Duration::seconds(1_000_000_000_000_000);
        assert_eq!(t.end_time(), None);
        t.duration = Duration::seconds(-1_000_000_000_000_000);
        assert_eq!(t.end_time(), None);
    }

    #[test]
    fn serializes_persisted_field_names() {
        let mut t = Task::new("Quiz", date());
        t.duration = Duration::seconds(90);
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["date"], "2025-07-26");
        assert_eq!(v["duration"], 90);
        assert_eq!(v["timerEnabled"], false);
        assert!(v.get("createdAt").is_some());
        assert!(v.get("startTime").is_some());
    }

    #[test]
    fn legacy_record_gets_defaults() {
        let json = r#"{"title":"Old","date":"2024-01-02","completed":true}"#;
        let t: Task = serde_json::from_str(json).unwrap();
        assert!(t.is_completed());
        assert_eq!(t.priority, "Medium");
        assert_eq!(t.complexity, 5);
        assert_eq!(t.category, "General");
        assert_eq!(t.notes, "");
        assert_eq!(t.duration, Duration::seconds(1800));
        assert!(!t.timer_enabled);
    }
}
