use chrono::{Duration, NaiveDate};
use studyplan::models::{now, today, Task};
use studyplan::planner::{compute_delay_seconds, TaskStore};
use studyplan::storage::{MemoryRepository, TaskRepository};
use studyplan::view::{project, PriorityFilter, SortKey};
use studyplan::PlannerError;

fn fresh_store() -> TaskStore<MemoryRepository> {
    TaskStore::load(MemoryRepository::new()).unwrap()
}

fn in_days(n: i64) -> NaiveDate {
    today() + Duration::days(n)
}

#[test]
fn test_valid_inputs_are_added() {
    let mut store = fresh_store();
    let cases = [
        ("Essay draft", in_days(0), "High", 1),
        ("Lab report", in_days(1), "Medium", 10),
        ("Past paper", in_days(30), "Low", 0),
        ("Odd complexity", in_days(2), "Low", -4),
    ];
    for (title, date, priority, complexity) in cases {
        let before = store.tasks_for_date(date).len();
        assert!(store.add_task(title, date, priority, complexity).unwrap(), "{title}");
        let tasks = store.tasks_for_date(date);
        assert_eq!(tasks.len(), before + 1);
        let added = tasks.last().unwrap();
        assert_eq!(added.title(), title);
        assert_eq!(added.priority, priority);
        assert_eq!(added.complexity, complexity);
    }
    assert_eq!(store.repository().snapshot().len(), cases.len());
}

#[test]
fn test_invalid_inputs_are_rejected() {
    let mut store = fresh_store();
    let cases = [
        ("", in_days(1), "High"),
        ("   ", in_days(1), "High"),
        ("Past", in_days(-1), "High"),
        ("Long past", in_days(-400), "Low"),
        ("Bad priority", in_days(1), "Urgent"),
        ("Lowercase priority", in_days(1), "high"),
        ("", in_days(-1), "None"),
    ];
    for (title, date, priority) in cases {
        let before = store.tasks_for_date(date).len();
        assert!(!store.add_task(title, date, priority, 5).unwrap(), "{title:?}");
        assert_eq!(store.tasks_for_date(date).len(), before);
    }
    assert!(store.is_empty());
    assert!(store.repository().snapshot().is_empty());
}

#[test]
fn test_yesterday_is_rejected() {
    let mut store = fresh_store();
    assert!(!store.add_task("x", in_days(-1), "Low", 2).unwrap());
    assert!(store.tasks_for_date(in_days(-1)).is_empty());
    assert!(store.ongoing_tasks().is_empty());
}

#[test]
fn test_grant_proposal_lifecycle() {
    let mut store = fresh_store();
    let date = in_days(14);
    assert!(store.add_task("Grant proposal", date, "High", 7).unwrap());

    let ongoing = store.ongoing_tasks();
    assert_eq!(ongoing.len(), 1);
    assert_eq!(ongoing[0].title(), "Grant proposal");
    assert!(store.completed_tasks().is_empty());

    assert!(store.mark_completed(date, "Grant proposal").unwrap());
    assert!(store.ongoing_tasks().is_empty());
    let completed = store.completed_tasks();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].title(), "Grant proposal");

    // written through
    let stored = store.repository().snapshot();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].is_completed());
}

#[test]
fn test_partition_covers_every_task_once() {
    let mut store = fresh_store();
    for i in 0..6 {
        store
            .add_task(&format!("Task {i}"), in_days(i % 3), "Medium", 5)
            .unwrap();
    }
    store.mark_completed(in_days(0), "Task 0").unwrap();
    store.mark_completed(in_days(2), "Task 5").unwrap();

    let ongoing = store.ongoing_tasks();
    let completed = store.completed_tasks();
    assert_eq!(ongoing.len() + completed.len(), store.len());
    for t in store.all_tasks() {
        let in_ongoing = ongoing.iter().any(|o| std::ptr::eq(*o, t));
        let in_completed = completed.iter().any(|c| std::ptr::eq(*c, t));
        assert!(in_ongoing ^ in_completed);
        assert_eq!(in_completed, t.is_completed());
    }
}

#[test]
fn test_missing_date_is_empty() {
    let store = fresh_store();
    assert!(store.tasks_for_date(in_days(5)).is_empty());
}

#[test]
fn test_store_loads_from_repository() {
    let mut old = Task::new("Archived", NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    old.set_completed(true);
    let upcoming = Task::new("Upcoming", in_days(3));
    let repo = MemoryRepository::with_tasks(vec![upcoming, old]);

    let store = TaskStore::load(repo).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.tasks_for_date(in_days(3))[0].title(), "Upcoming");
    assert_eq!(store.completed_tasks()[0].title(), "Archived");
}

#[test]
fn test_priority_projection_over_ongoing_tasks() {
    let mut store = fresh_store();
    for (title, priority) in [("a", "Low"), ("b", "High"), ("c", "Medium"), ("d", "High")] {
        store.add_task(title, in_days(1), priority, 5).unwrap();
    }
    let sorted = project(store.ongoing_tasks(), &PriorityFilter::All, SortKey::Priority);
    let prios: Vec<&str> = sorted.iter().map(|t| t.priority.as_str()).collect();
    assert_eq!(prios, ["High", "High", "Medium", "Low"]);

    let low_only = project(store.ongoing_tasks(), &"low".parse().unwrap(), SortKey::DueDate);
    assert_eq!(low_only.len(), 1);
    assert_eq!(low_only[0].title(), "a");
}

#[test]
fn test_completed_tasks_leave_projection() {
    let mut store = fresh_store();
    store.add_task("keep", in_days(2), "High", 3).unwrap();
    store.add_task("done", in_days(1), "High", 3).unwrap();
    store.mark_completed(in_days(1), "done").unwrap();

    let shown = project(store.ongoing_tasks(), &PriorityFilter::All, SortKey::DueDate);
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].title(), "keep");
}

#[test]
fn test_delay_for_start_in_ninety_seconds() {
    let mut t = Task::new("Timed", today());
    t.start_time = now() + Duration::seconds(90);
    let delay = compute_delay_seconds(&t);
    assert!((89..=90).contains(&delay), "delay was {delay}");
}

/// Accepts loads, refuses every write.
struct ReadOnlyRepository;

impl TaskRepository for ReadOnlyRepository {
    fn load_all(&self) -> studyplan::Result<Vec<Task>> {
        Ok(Vec::new())
    }

    fn save(&self, _task: &Task) -> studyplan::Result<()> {
        Err(PlannerError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        )))
    }

    fn update(&self, _task: &Task) -> studyplan::Result<()> {
        Err(PlannerError::Lock("read-only".into()))
    }
}

#[test]
fn test_failed_write_keeps_memory_state() {
    let mut store = TaskStore::load(ReadOnlyRepository).unwrap();
    let date = in_days(1);

    assert!(store.add_task("Unsaved", date, "Medium", 5).is_err());
    assert_eq!(store.tasks_for_date(date).len(), 1);

    assert!(store.mark_completed(date, "Unsaved").is_err());
    assert!(store.tasks_for_date(date)[0].is_completed());
}

#[test]
fn test_rejected_input_never_reaches_repository() {
    let mut store = TaskStore::load(ReadOnlyRepository).unwrap();
    assert!(!store.add_task("", in_days(1), "Medium", 5).unwrap());
}
