use chrono::{TimeZone, Utc};
use std::collections::HashSet;
use uuid::Uuid;
use worktally_core::db::open_db_in_memory;
use worktally_core::{
    CompanyListQuery, CompanyPatch, EntityKind, EntityStore, MonotonicClock, NewCompany,
    SortKey, StoreError, ValidationError,
};

#[test]
fn create_assigns_id_and_equal_timestamps() {
    let store = EntityStore::open_in_memory().unwrap();

    let company = store.create_company(NewCompany::named("Acme")).unwrap();
    assert_eq!(company.name, "Acme");
    assert_eq!(company.created_at, company.updated_at);

    let loaded = store.get_company(company.id).unwrap();
    assert_eq!(loaded, company);
}

#[test]
fn create_assigns_unique_ids() {
    let store = EntityStore::open_in_memory().unwrap();

    let ids: HashSet<_> = (0..25)
        .map(|index| {
            store
                .create_company(NewCompany::named(format!("Client {index}")))
                .unwrap()
                .id
        })
        .collect();
    assert_eq!(ids.len(), 25);
}

#[test]
fn create_rejects_blank_name_and_bad_email() {
    let store = EntityStore::open_in_memory().unwrap();

    let err = store.create_company(NewCompany::named("  ")).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::BlankField {
            entity: EntityKind::Company,
            field: "name",
        })
    ));

    let err = store
        .create_company(NewCompany {
            email: Some("nobody".to_string()),
            ..NewCompany::named("Acme")
        })
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::InvalidEmail(_))
    ));

    assert_eq!(store.stats().unwrap().companies, 0);
}

#[test]
fn update_merges_fields_and_keeps_identity() {
    let store = EntityStore::open_in_memory().unwrap();
    let created = store
        .create_company(NewCompany {
            phone: Some("555-0100".to_string()),
            hourly_rate: Some(80.0),
            ..NewCompany::named("Acme")
        })
        .unwrap();

    let updated = store
        .update_company(
            created.id,
            CompanyPatch {
                name: Some("Acme Corp".to_string()),
                hourly_rate: Some(None),
                ..CompanyPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.name, "Acme Corp");
    assert_eq!(updated.phone.as_deref(), Some("555-0100"));
    assert_eq!(updated.hourly_rate, None);

    assert_eq!(store.get_company(created.id).unwrap(), updated);
}

#[test]
fn update_strictly_advances_updated_at_with_frozen_clock() {
    let frozen = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let store = EntityStore::with_clock(
        open_db_in_memory().unwrap(),
        MonotonicClock::with_source(move || frozen),
    )
    .unwrap();

    let created = store.create_company(NewCompany::named("Acme")).unwrap();
    let first = store
        .update_company(created.id, CompanyPatch::default())
        .unwrap();
    let second = store
        .update_company(created.id, CompanyPatch::default())
        .unwrap();

    assert_eq!(created.created_at, frozen);
    assert!(first.updated_at > created.updated_at);
    assert!(second.updated_at > first.updated_at);
    assert_eq!(second.created_at, created.created_at);
}

#[test]
fn invalid_update_leaves_record_unchanged() {
    let store = EntityStore::open_in_memory().unwrap();
    let created = store.create_company(NewCompany::named("Acme")).unwrap();

    let err = store
        .update_company(
            created.id,
            CompanyPatch {
                name: Some(String::new()),
                ..CompanyPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.get_company(created.id).unwrap(), created);
}

#[test]
fn unknown_ids_return_not_found() {
    let store = EntityStore::open_in_memory().unwrap();
    let missing = Uuid::new_v4();

    assert!(matches!(
        store.get_company(missing),
        Err(StoreError::NotFound { entity: EntityKind::Company, id }) if id == missing
    ));
    assert!(matches!(
        store.update_company(missing, CompanyPatch::default()),
        Err(StoreError::NotFound { .. })
    ));
    assert!(matches!(
        store.delete_company(missing),
        Err(StoreError::NotFound { .. })
    ));
}

#[test]
fn list_defaults_to_insertion_order_and_supports_name_sort() {
    let store = EntityStore::open_in_memory().unwrap();
    let zeta = store.create_company(NewCompany::named("Zeta")).unwrap();
    let alpha = store.create_company(NewCompany::named("alpha")).unwrap();
    let beta = store.create_company(NewCompany::named("Beta")).unwrap();

    let inserted: Vec<_> = store
        .list_companies(&CompanyListQuery::default())
        .unwrap()
        .into_iter()
        .map(|company| company.id)
        .collect();
    assert_eq!(inserted, vec![zeta.id, alpha.id, beta.id]);

    let by_name: Vec<_> = store
        .list_companies(&CompanyListQuery {
            sort: SortKey::Name,
            ..CompanyListQuery::default()
        })
        .unwrap()
        .into_iter()
        .map(|company| company.id)
        .collect();
    assert_eq!(by_name, vec![alpha.id, beta.id, zeta.id]);
}

#[test]
fn recently_updated_sort_puts_latest_write_first() {
    let store = EntityStore::open_in_memory().unwrap();
    let first = store.create_company(NewCompany::named("First")).unwrap();
    let second = store.create_company(NewCompany::named("Second")).unwrap();
    store
        .update_company(first.id, CompanyPatch::default())
        .unwrap();

    let listed = store
        .list_companies(&CompanyListQuery {
            sort: SortKey::RecentlyUpdated,
            ..CompanyListQuery::default()
        })
        .unwrap();
    assert_eq!(listed[0].id, first.id);
    assert_eq!(listed[1].id, second.id);
}

#[test]
fn list_pagination_with_limit_and_offset() {
    let store = EntityStore::open_in_memory().unwrap();
    let created: Vec<_> = ["a", "b", "c", "d"]
        .into_iter()
        .map(|name| store.create_company(NewCompany::named(name)).unwrap().id)
        .collect();

    let page: Vec<_> = store
        .list_companies(&CompanyListQuery {
            limit: Some(2),
            offset: 1,
            ..CompanyListQuery::default()
        })
        .unwrap()
        .into_iter()
        .map(|company| company.id)
        .collect();
    assert_eq!(page, vec![created[1], created[2]]);

    let tail = store
        .list_companies(&CompanyListQuery {
            offset: 3,
            ..CompanyListQuery::default()
        })
        .unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].id, created[3]);
}
