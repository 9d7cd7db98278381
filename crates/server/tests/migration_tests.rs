//! Schema migration across the three logical stores.

use oidc_authority::migrate::{LogicalStore, migrate, migrate_all};
use sea_orm::{ConnectionTrait, Database, DbBackend, Statement};

async fn table_names(db: &sea_orm::DatabaseConnection) -> Vec<String> {
    db.query_all(Statement::from_string(
        DbBackend::Sqlite,
        "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
    ))
    .await
    .expect("list tables")
    .into_iter()
    .map(|row| row.try_get::<String>("", "name").expect("name column"))
    .collect()
}

#[tokio::test]
async fn test_each_store_has_its_own_tracking_table() {
    let db = Database::connect("sqlite::memory:").await.expect("connect");
    migrate_all(&db).await.expect("migrate");

    let tables = table_names(&db).await;
    for expected in [
        "seaql_migrations_identity",
        "seaql_migrations_configuration",
        "seaql_migrations_operational",
        "roles",
        "users",
        "user_roles",
        "clients",
        "identity_resources",
        "api_resources",
        "api_scopes",
        "persisted_grants",
        "device_codes",
    ] {
        assert!(tables.iter().any(|t| t == expected), "missing table {expected}");
    }
}

#[tokio::test]
async fn test_stores_migrate_independently() {
    let db = Database::connect("sqlite::memory:").await.expect("connect");

    assert_eq!(migrate(&db, LogicalStore::Configuration).await.unwrap(), 1);
    let tables = table_names(&db).await;
    assert!(tables.iter().any(|t| t == "clients"));
    assert!(!tables.iter().any(|t| t == "roles"));

    assert_eq!(migrate(&db, LogicalStore::Identity).await.unwrap(), 1);
    assert_eq!(migrate(&db, LogicalStore::Operational).await.unwrap(), 2);
    assert_eq!(migrate(&db, LogicalStore::Configuration).await.unwrap(), 0);
}
