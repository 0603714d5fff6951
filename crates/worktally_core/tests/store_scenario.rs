use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use uuid::Uuid;
use worktally_core::{
    EntityKind, EntityStore, NewCompany, NewProject, NewTask, NewTimeEntry, Priority,
    StoreError, TaskListQuery, TimeEntryListQuery, WorkStatus,
};

#[test]
fn end_to_end_cascading_scenario() {
    let store = EntityStore::open_in_memory().unwrap();

    let company = store.create_company(NewCompany::named("Acme")).unwrap();
    assert_eq!(company.created_at, company.updated_at);

    let bad = store.create_project(NewProject {
        company_id: Some(Uuid::new_v4()),
        ..NewProject::new("Site", WorkStatus::Incoming, Priority::Low)
    });
    assert!(matches!(bad, Err(StoreError::Reference { .. })));

    let project = store
        .create_project(NewProject {
            company_id: Some(company.id),
            ..NewProject::new("Site", WorkStatus::Incoming, Priority::Low)
        })
        .unwrap();
    let task = store
        .create_task(NewTask::new("Design", WorkStatus::Incoming).in_project(project.id))
        .unwrap();
    let entry = store
        .create_time_entry(NewTimeEntry::new(task.id, "u1", 3600))
        .unwrap();
    assert_eq!(entry.duration, 3600);

    store.delete_project(project.id).unwrap();

    assert!(matches!(
        store.get_task(task.id),
        Err(StoreError::NotFound { entity: EntityKind::Task, id }) if id == task.id
    ));
    assert!(matches!(
        store.get_time_entry(entry.id),
        Err(StoreError::NotFound { .. })
    ));
    assert_eq!(store.get_company(company.id).unwrap(), company);
}

#[test]
fn records_survive_reopening_a_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("worktally.db");

    let (company, task) = {
        let store = EntityStore::open(&path).unwrap();
        let company = store.create_company(NewCompany::named("Acme")).unwrap();
        let task = store
            .create_task(NewTask::new("Design", WorkStatus::InProgress))
            .unwrap();
        (company, task)
    };

    let reopened = EntityStore::open(&path).unwrap();
    assert_eq!(reopened.get_company(company.id).unwrap(), company);
    assert_eq!(reopened.get_task(task.id).unwrap(), task);
}

#[test]
fn concurrent_writers_never_collide() {
    let store = Arc::new(EntityStore::open_in_memory().unwrap());
    let task = store
        .create_task(NewTask::new("Shared", WorkStatus::InProgress))
        .unwrap();
    let task_id = task.id;

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                (0..25)
                    .map(|_| {
                        store
                            .create_time_entry(NewTimeEntry::new(
                                task_id,
                                format!("u{worker}"),
                                60,
                            ))
                            .unwrap()
                            .id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let ids: HashSet<_> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    assert_eq!(ids.len(), 100);

    let listed = store
        .list_time_entries(&TimeEntryListQuery {
            task_id: Some(task.id),
            ..TimeEntryListQuery::default()
        })
        .unwrap();
    assert_eq!(listed.len(), 100);
    assert_eq!(store.task_total_seconds(task.id).unwrap(), 6000);
}

#[test]
fn json_boundary_uses_exact_literals_and_iso_timestamps() {
    let store = EntityStore::open_in_memory().unwrap();
    let project = store
        .create_project(NewProject::new("Site", WorkStatus::InProgress, Priority::High))
        .unwrap();

    let json = serde_json::to_value(&project).unwrap();
    assert_eq!(json["status"], "In Progress");
    assert_eq!(json["priority"], "High");
    assert_eq!(json["company_id"], serde_json::Value::Null);
    let created_at = json["created_at"].as_str().unwrap();
    assert!(created_at.ends_with('Z'));
    assert!(created_at.contains('T'));

    let input: NewTask = serde_json::from_value(serde_json::json!({
        "name": "Design",
        "status": "Incoming",
        "project_id": project.id.to_string(),
    }))
    .unwrap();
    let task = store.create_task(input).unwrap();
    let listed = store
        .list_tasks(&TaskListQuery {
            project_id: Some(project.id),
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(listed, vec![task]);
}
