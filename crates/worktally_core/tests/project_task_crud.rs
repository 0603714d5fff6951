use uuid::Uuid;
use worktally_core::{
    EntityKind, EntityStore, NewCompany, NewProject, NewTask, Priority, ProjectListQuery,
    ProjectPatch, StoreError, TaskListQuery, TaskPatch, ValidationError, WorkStatus,
};

fn project_input(name: &str) -> NewProject {
    NewProject::new(name, WorkStatus::Incoming, Priority::Low)
}

#[test]
fn project_with_dangling_company_is_rejected() {
    let store = EntityStore::open_in_memory().unwrap();
    let bad_id = Uuid::new_v4();

    let err = store
        .create_project(NewProject {
            company_id: Some(bad_id),
            ..project_input("Site")
        })
        .unwrap_err();
    match err {
        StoreError::Reference { entity, field, id } => {
            assert_eq!(entity, EntityKind::Company);
            assert_eq!(field, "company_id");
            assert_eq!(id, bad_id);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.stats().unwrap().projects, 0);
}

#[test]
fn project_roundtrip_keeps_enum_literals() {
    let store = EntityStore::open_in_memory().unwrap();
    let company = store.create_company(NewCompany::named("Acme")).unwrap();

    let project = store
        .create_project(NewProject {
            description: Some("Marketing site".to_string()),
            company_id: Some(company.id),
            ..NewProject::new("Site", WorkStatus::InProgress, Priority::High)
        })
        .unwrap();

    let loaded = store.get_project(project.id).unwrap();
    assert_eq!(loaded, project);
    assert_eq!(loaded.status, WorkStatus::InProgress);
    assert_eq!(loaded.priority, Priority::High);
    assert!(!loaded.is_archived);
}

#[test]
fn project_update_checks_new_company_reference() {
    let store = EntityStore::open_in_memory().unwrap();
    let project = store.create_project(project_input("Site")).unwrap();

    let err = store
        .update_project(
            project.id,
            ProjectPatch {
                company_id: Some(Some(Uuid::new_v4())),
                ..ProjectPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Reference { .. }));

    let company = store.create_company(NewCompany::named("Acme")).unwrap();
    let updated = store
        .update_project(
            project.id,
            ProjectPatch {
                company_id: Some(Some(company.id)),
                status: Some(WorkStatus::Completed),
                is_archived: Some(true),
                ..ProjectPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.company_id, Some(company.id));
    assert_eq!(updated.status, WorkStatus::Completed);
    assert!(updated.is_archived);
    assert!(updated.updated_at > project.updated_at);
    assert_eq!(updated.created_at, project.created_at);
}

#[test]
fn out_of_set_status_literal_is_a_validation_error() {
    let err = "Done".parse::<WorkStatus>().unwrap_err();
    assert_eq!(
        err,
        ValidationError::InvalidEnumValue {
            field: "status",
            value: "Done".to_string(),
        }
    );
    assert!("Urgent".parse::<Priority>().is_err());
}

#[test]
fn project_list_filters_by_company_status_and_archive_flag() {
    let store = EntityStore::open_in_memory().unwrap();
    let acme = store.create_company(NewCompany::named("Acme")).unwrap();
    let globex = store.create_company(NewCompany::named("Globex")).unwrap();

    let site = store
        .create_project(NewProject {
            company_id: Some(acme.id),
            ..project_input("Site")
        })
        .unwrap();
    let app = store
        .create_project(NewProject {
            company_id: Some(acme.id),
            is_archived: true,
            ..NewProject::new("App", WorkStatus::Invoiced, Priority::Medium)
        })
        .unwrap();
    store
        .create_project(NewProject {
            company_id: Some(globex.id),
            ..project_input("Audit")
        })
        .unwrap();

    let for_acme = store
        .list_projects(&ProjectListQuery {
            company_id: Some(acme.id),
            ..ProjectListQuery::default()
        })
        .unwrap();
    assert_eq!(
        for_acme.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![site.id, app.id]
    );

    let invoiced = store
        .list_projects(&ProjectListQuery {
            status: Some(WorkStatus::Invoiced),
            ..ProjectListQuery::default()
        })
        .unwrap();
    assert_eq!(invoiced.len(), 1);
    assert_eq!(invoiced[0].id, app.id);

    let active = store
        .list_projects(&ProjectListQuery {
            company_id: Some(acme.id),
            archived: Some(false),
            ..ProjectListQuery::default()
        })
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, site.id);

    let high = store
        .list_projects(&ProjectListQuery {
            priority: Some(Priority::High),
            ..ProjectListQuery::default()
        })
        .unwrap();
    assert!(high.is_empty());
}

#[test]
fn task_with_dangling_project_is_rejected() {
    let store = EntityStore::open_in_memory().unwrap();

    let err = store
        .create_task(NewTask::new("Design", WorkStatus::Incoming).in_project(Uuid::new_v4()))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Reference {
            entity: EntityKind::Project,
            field: "project_id",
            ..
        }
    ));
}

#[test]
fn task_without_project_is_allowed() {
    let store = EntityStore::open_in_memory().unwrap();

    let task = store
        .create_task(NewTask {
            platform: Some("Upwork".to_string()),
            hourly_rate: Some(45.5),
            ..NewTask::new("Standalone", WorkStatus::Incoming)
        })
        .unwrap();
    let loaded = store.get_task(task.id).unwrap();
    assert_eq!(loaded.project_id, None);
    assert_eq!(loaded.hourly_rate, Some(45.5));
    assert_eq!(loaded.platform.as_deref(), Some("Upwork"));
}

#[test]
fn task_rejects_negative_rate() {
    let store = EntityStore::open_in_memory().unwrap();

    let err = store
        .create_task(NewTask {
            hourly_rate: Some(-10.0),
            ..NewTask::new("Design", WorkStatus::Incoming)
        })
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::InvalidRate { .. })
    ));
}

#[test]
fn task_list_by_project_returns_exact_matches_in_insertion_order() {
    let store = EntityStore::open_in_memory().unwrap();
    let site = store.create_project(project_input("Site")).unwrap();
    let app = store.create_project(project_input("App")).unwrap();

    let first = store
        .create_task(NewTask::new("Wireframes", WorkStatus::Incoming).in_project(site.id))
        .unwrap();
    store
        .create_task(NewTask::new("Backend", WorkStatus::Incoming).in_project(app.id))
        .unwrap();
    let second = store
        .create_task(NewTask::new("Copy", WorkStatus::InProgress).in_project(site.id))
        .unwrap();
    store
        .create_task(NewTask::new("Loose", WorkStatus::Incoming))
        .unwrap();
    let third = store
        .create_task(NewTask::new("Assets", WorkStatus::Incoming).in_project(site.id))
        .unwrap();

    let listed: Vec<_> = store
        .list_tasks(&TaskListQuery {
            project_id: Some(site.id),
            ..TaskListQuery::default()
        })
        .unwrap()
        .into_iter()
        .map(|task| task.id)
        .collect();
    assert_eq!(listed, vec![first.id, second.id, third.id]);

    let in_progress = store
        .list_tasks(&TaskListQuery {
            project_id: Some(site.id),
            status: Some(WorkStatus::InProgress),
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(in_progress.len(), 1);
    assert_eq!(in_progress[0].id, second.id);
}

#[test]
fn task_update_can_detach_from_project() {
    let store = EntityStore::open_in_memory().unwrap();
    let site = store.create_project(project_input("Site")).unwrap();
    let task = store
        .create_task(NewTask::new("Design", WorkStatus::Incoming).in_project(site.id))
        .unwrap();

    let updated = store
        .update_task(
            task.id,
            TaskPatch {
                project_id: Some(None),
                status: Some(WorkStatus::Completed),
                ..TaskPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.project_id, None);
    assert_eq!(updated.status, WorkStatus::Completed);
    assert_eq!(updated.id, task.id);
    assert_eq!(updated.created_at, task.created_at);
    assert!(updated.updated_at > task.updated_at);
}

#[test]
fn task_update_rejects_dangling_project_and_keeps_record() {
    let store = EntityStore::open_in_memory().unwrap();
    let site = store.create_project(project_input("Site")).unwrap();
    let task = store
        .create_task(NewTask::new("Design", WorkStatus::Incoming).in_project(site.id))
        .unwrap();

    let missing = Uuid::new_v4();
    let err = store
        .update_task(
            task.id,
            TaskPatch {
                project_id: Some(Some(missing)),
                name: Some("Renamed".to_string()),
                ..TaskPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Reference {
            entity: EntityKind::Project,
            field: "project_id",
            id,
        } if id == missing
    ));
    assert_eq!(store.get_task(task.id).unwrap(), task);
}

#[test]
fn unknown_project_and_task_ids_return_not_found() {
    let store = EntityStore::open_in_memory().unwrap();
    let missing = Uuid::new_v4();

    assert!(matches!(
        store.update_project(missing, ProjectPatch::default()),
        Err(StoreError::NotFound { entity: EntityKind::Project, id }) if id == missing
    ));
    assert!(matches!(
        store.delete_project(missing),
        Err(StoreError::NotFound { entity: EntityKind::Project, .. })
    ));
    assert!(matches!(
        store.update_task(missing, TaskPatch::default()),
        Err(StoreError::NotFound { entity: EntityKind::Task, id }) if id == missing
    ));
    assert!(matches!(
        store.delete_task(missing),
        Err(StoreError::NotFound { entity: EntityKind::Task, .. })
    ));
}
