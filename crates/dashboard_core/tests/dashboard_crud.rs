use dashboard_core::db::migrations::latest_version;
use dashboard_core::db::{open_db, open_db_in_memory};
use dashboard_core::{
    Dashboard, DashboardRepository, DashboardService, DashboardServiceError, RepoError,
    SqliteDashboardRepository, User,
};
use rusqlite::Connection;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

#[test]
fn list_is_empty_for_user_without_dashboards() {
    let conn = setup();
    let service = DashboardService::new(SqliteDashboardRepository::try_new(&conn).unwrap());

    let dashboards = service.list_dashboards(&User::new(1)).unwrap();
    assert!(dashboards.is_empty());
}

#[test]
fn create_rename_remove_lifecycle_is_scoped_to_owner() {
    let conn = setup();
    let service = DashboardService::new(SqliteDashboardRepository::try_new(&conn).unwrap());
    let user1 = User::new(1);
    let user2 = User::new(2);

    let created = service.create_dashboard(&user1, "cool dashboard").unwrap();
    assert_eq!(created, Dashboard::empty(1, 1, "cool dashboard"));
    assert_eq!(service.list_dashboards(&user1).unwrap(), vec![created.clone()]);
    assert!(service.list_dashboards(&user2).unwrap().is_empty());

    for target in [1, 55] {
        let err = service.rename_dashboard(&user2, target, "kek").unwrap_err();
        assert_eq!(err.to_string(), "dashboard does not exist");
    }

    let renamed = service.rename_dashboard(&user1, 1, "kek").unwrap();
    assert_eq!(renamed, Dashboard::empty(1, 1, "kek"));
    assert_eq!(
        service.list_dashboards(&user1).unwrap(),
        vec![Dashboard::empty(1, 1, "kek")]
    );

    for target in [1, 55] {
        let err = service.remove_dashboard(&user2, target).unwrap_err();
        assert!(matches!(err, DashboardServiceError::DashboardNotFound(id) if id == target));
        assert_eq!(err.to_string(), "dashboard does not exist");
    }
    assert_eq!(service.list_dashboards(&user1).unwrap().len(), 1);

    let removed = service.remove_dashboard(&user1, 1).unwrap();
    assert_eq!(removed, Dashboard::empty(1, 1, "kek"));
    assert!(service.list_dashboards(&user1).unwrap().is_empty());

    let err = service.remove_dashboard(&user1, 1).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn list_returns_dashboards_in_creation_order_without_name_uniqueness() {
    let conn = setup();
    let service = DashboardService::new(SqliteDashboardRepository::try_new(&conn).unwrap());
    let user = User::new(1);

    let first = service.create_dashboard(&user, "same").unwrap();
    let other = service.create_dashboard(&User::new(2), "same").unwrap();
    let second = service.create_dashboard(&user, "same").unwrap();

    let ids: Vec<_> = service
        .list_dashboards(&user)
        .unwrap()
        .into_iter()
        .map(|dashboard| dashboard.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id]);
    assert!(!ids.contains(&other.id));
}

#[test]
fn rename_by_other_user_leaves_name_unchanged() {
    let conn = setup();
    let service = DashboardService::new(SqliteDashboardRepository::try_new(&conn).unwrap());
    let owner = User::new(1);

    let created = service.create_dashboard(&owner, "mine").unwrap();
    service
        .rename_dashboard(&User::new(2), created.id, "stolen")
        .unwrap_err();

    let loaded = service.get_dashboard(&owner, created.id).unwrap();
    assert_eq!(loaded.name, "mine");
}

#[test]
fn get_dashboard_hides_foreign_dashboards() {
    let conn = setup();
    let service = DashboardService::new(SqliteDashboardRepository::try_new(&conn).unwrap());

    let created = service.create_dashboard(&User::new(1), "private").unwrap();
    let err = service.get_dashboard(&User::new(2), created.id).unwrap_err();
    assert!(matches!(err, DashboardServiceError::DashboardNotFound(_)));
}

#[test]
fn create_succeeds_for_any_identity_on_fresh_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("fresh.sqlite3")).unwrap();
    let service = DashboardService::new(SqliteDashboardRepository::try_new(&conn).unwrap());
    let caller = User::new(4_242);

    let created = service.create_dashboard(&caller, "cool dashboard").unwrap();
    assert_eq!(created, Dashboard::empty(1, 4_242, "cool dashboard"));
    assert_eq!(service.list_dashboards(&caller).unwrap(), vec![created]);

    let empty_name = service.create_dashboard(&caller, "").unwrap();
    assert_eq!(empty_name.name, "");
}

#[test]
fn repository_rename_reports_not_found_for_foreign_owner() {
    let conn = setup();
    let repo = SqliteDashboardRepository::try_new(&conn).unwrap();

    let created = repo.create_dashboard(1, "d").unwrap();
    let err = repo.rename_dashboard(2, created.id, "x").unwrap_err();
    assert!(matches!(err, RepoError::DashboardNotFound(id) if id == created.id));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteDashboardRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_tables() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteDashboardRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("dashboards"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE dashboards (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteDashboardRepository::try_new(&conn),
        Err(RepoError::MissingRequiredColumn {
            table: "dashboards",
            column: "user_id"
        })
    ));
}
