use std::fs;

use chrono::NaiveDate;
use taskdeck::{Category, Error, JsonFileStore, NewTask, TaskList, TaskStore};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn save_then_load_round_trips() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = JsonFileStore::in_dir(dir.path());

    let mut list = TaskList::open(store.clone())?;
    list.add_task(NewTask::new("Buy milk", Category::Shopping, date(2024, 1, 5)))?;
    let id = list
        .add_task(
            NewTask::new("Write report", Category::Work, date(2024, 2, 1))
                .with_description("quarterly"),
        )?
        .expect("added");
    list.toggle_completion(&id)?;

    let loaded = store.load()?;
    assert_eq!(loaded, list.tasks());
    Ok(())
}

#[test]
fn save_is_idempotent_and_last_write_wins() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = JsonFileStore::in_dir(dir.path());
    let mut list = TaskList::open(store.clone())?;
    list.add_task(NewTask::new("one", Category::Other, date(2024, 1, 1)))?;

    store.save(list.tasks())?;
    let first = fs::read_to_string(store.path())?;
    store.save(list.tasks())?;
    assert_eq!(fs::read_to_string(store.path())?, first);

    store.save(&[])?;
    assert!(store.load()?.is_empty());
    Ok(())
}

#[test]
fn persisted_layout_uses_expected_field_names() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = JsonFileStore::in_dir(dir.path());
    let mut list = TaskList::open(store.clone())?;
    list.add_task(NewTask::new("Buy milk", Category::Shopping, date(2024, 1, 5)))?;

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(store.path())?)?;
    let task = &value[0];
    assert_eq!(task["title"], "Buy milk");
    assert_eq!(task["category"], "shopping");
    assert_eq!(task["completed"], false);
    assert_eq!(task["dueDate"], "2024-01-05");
    assert!(task["createdAt"].is_string());
    assert!(task["id"].is_string());
    assert!(task.get("description").is_none());
    Ok(())
}

#[test]
fn loads_list_written_by_the_mobile_app() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = JsonFileStore::in_dir(dir.path());
    fs::write(
        store.path(),
        r#"[
  {"id":"1","title":"Test Task 1","completed":false,"category":"work",
   "dueDate":"2024-03-01T16:00:00.000Z","createdAt":"2024-02-28T09:12:45.123Z"},
  {"id":"2","title":"Test Task 2","completed":true,"category":"personal",
   "dueDate":"2024-03-02T16:00:00.000Z","createdAt":"2024-02-28T09:12:45.123Z"}
]"#,
    )?;

    let list = TaskList::open(store)?;
    assert_eq!(list.tasks().len(), 2);
    let due = chrono::DateTime::parse_from_rfc3339("2024-03-01T16:00:00.000Z")?
        .with_timezone(&chrono::Local)
        .date_naive();
    assert_eq!(list.tasks()[0].due_date, due);
    assert_eq!(list.counts().completed, 1);
    Ok(())
}

#[test]
fn corrupt_file_fails_strict_open_and_is_preserved() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = JsonFileStore::in_dir(dir.path());
    fs::write(store.path(), "this is not json")?;

    let err = TaskList::open(store.clone()).expect_err("corrupt file must not load");
    assert_eq!(err.exit_code(), 4);
    let backup = match err {
        Error::CorruptStore { backup, .. } => backup,
        other => panic!("expected CorruptStore, got {other:?}"),
    };
    assert_eq!(fs::read_to_string(backup)?, "this is not json");
    Ok(())
}

#[test]
fn recovering_open_continues_empty_and_keeps_backup() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = JsonFileStore::in_dir(dir.path());
    fs::write(store.path(), r#"[{"id":"1","category":"chores"}]"#)?;

    let (mut list, backup) = TaskList::open_recovering(store.clone())?;
    assert!(list.is_empty());
    let backup = backup.expect("backup location reported");

    list.add_task(NewTask::new("fresh start", Category::Other, date(2024, 1, 1)))?;
    assert_eq!(store.load()?.len(), 1);
    assert_eq!(
        fs::read_to_string(backup)?,
        r#"[{"id":"1","category":"chores"}]"#
    );
    Ok(())
}

#[test]
fn unwritable_location_surfaces_save_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = JsonFileStore::new(dir.path().join("sub").join("tasks.json"));
    let mut list = TaskList::open(store)?;

    // a regular file where the parent directory should be created
    fs::write(dir.path().join("sub"), "")?;

    let result = list.add_task(NewTask::new("x", Category::Other, date(2024, 1, 1)));
    assert!(matches!(result, Err(Error::Io(_))));
    assert!(list.is_empty());
    Ok(())
}

#[test]
fn repeated_ids_are_refused_and_preserved() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = JsonFileStore::in_dir(dir.path());
    let raw = r#"[
  {"id":"1","title":"first","completed":false,"category":"work",
   "dueDate":"2024-03-01","createdAt":"2024-02-28T09:12:45.123Z"},
  {"id":"1","title":"second","completed":false,"category":"work",
   "dueDate":"2024-03-02","createdAt":"2024-02-28T09:12:45.123Z"}
]"#;
    fs::write(store.path(), raw)?;

    let err = TaskList::open(store.clone()).expect_err("duplicate ids must not load");
    assert!(err.to_string().contains("duplicate task id"));

    let (list, backup) = TaskList::open_recovering(store)?;
    assert!(list.is_empty());
    assert_eq!(fs::read_to_string(backup.expect("backup kept"))?, raw);
    Ok(())
}
