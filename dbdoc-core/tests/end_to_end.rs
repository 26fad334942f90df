//! End-to-end snapshot construction over canned catalogs.
//!
//! Every test drives the public adapter contract through a
//! `FixtureExecutor`, so no database is required.

use dbdoc_core::adapters::postgres::queries;
use dbdoc_core::{
    DbDocError, Engine, FixtureExecutor, IntrospectionConfig, PostgresAdapter, Schema,
    SchemaAdapter, SchemaDocument, catalog_row, create_adapter,
};

/// `users(id int pk, email varchar(255) not null, created_at date default now())`
/// plus a unique index on `email`.
fn users_catalog() -> FixtureExecutor {
    FixtureExecutor::new()
        .with_rows(
            &queries::COLUMNS,
            vec![
                catalog_row!["users", "id", "int4", 4, true, false, -1],
                catalog_row!["users", "email", "varchar", -1, true, false, 259],
                catalog_row!["users", "created_at", "date", 4, true, true, -1],
            ],
        )
        .with_rows(
            &queries::DEFAULTS,
            vec![catalog_row!["users", "created_at", "now()"]],
        )
        .with_rows(&queries::PRIMARY_KEYS, vec![catalog_row!["users", "1"]])
        .with_rows(
            &queries::INDEXES,
            vec![
                catalog_row!["users", "users_email_idx", "2", true],
                catalog_row!["users", "users_pkey", "1", true],
            ],
        )
        .with_rows(
            &queries::ATTRIBUTE_NAMES,
            vec![
                catalog_row!["users", 1, "id"],
                catalog_row!["users", 2, "email"],
                catalog_row!["users", 3, "created_at"],
            ],
        )
}

fn shape(schema: &Schema) -> Vec<(String, Vec<String>, Vec<(String, Vec<String>, bool)>)> {
    schema
        .tables()
        .into_iter()
        .map(|table| {
            (
                table.name().to_string(),
                table.column_names().into_iter().map(str::to_string).collect(),
                table
                    .indexes()
                    .into_iter()
                    .map(|index| {
                        (
                            index.name().to_string(),
                            index.column_names().to_vec(),
                            index.unique(),
                        )
                    })
                    .collect(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_users_scenario() {
    let conn = users_catalog();
    let adapter = create_adapter(Engine::PostgreSQL, IntrospectionConfig::default());

    let schema = adapter.open(&conn, "app").await.unwrap();
    let users = schema.table("users").unwrap();

    assert_eq!(users.column_names(), vec!["id", "email", "created_at"]);
    assert_eq!(users.primary_key_description().as_deref(), Some("id"));

    let email = users.column("email").unwrap();
    assert!(!email.nullable());
    assert_eq!(email.length(), Some("255"));

    let index = users.index("users_email_idx").unwrap();
    assert!(index.unique());
    assert_eq!(index.column_names(), ["email"]);
    assert_eq!(index.table_name(), "users");

    let created_at = users.column("created_at").unwrap();
    assert!(created_at.has_default());
    assert!(!created_at.default_value().unwrap_or_default().is_empty());
    assert!(!created_at.nullable());
    assert!(created_at.references().is_none());
}

#[tokio::test]
async fn test_absent_lookups() {
    let conn = users_catalog();
    let schema = PostgresAdapter::default().open(&conn, "app").await.unwrap();
    let users = schema.table("users").unwrap();

    assert!(schema.table("nonexistent").is_none());
    assert!(users.column("nonexistent").is_none());
    assert!(users.index("nonexistent").is_none());
}

#[tokio::test]
async fn test_snapshots_are_idempotent() {
    let conn = users_catalog();
    let adapter = PostgresAdapter::default();

    let first = adapter.open(&conn, "app").await.unwrap();
    let second = adapter.open(&conn, "app").await.unwrap();

    assert_eq!(shape(&first), shape(&second));
    assert_eq!(first.maps(), second.maps());
}

#[tokio::test]
async fn test_indexes_iterate_sorted() {
    let conn = users_catalog();
    let schema = PostgresAdapter::default().open(&conn, "app").await.unwrap();

    let names: Vec<&str> = schema
        .table("users")
        .unwrap()
        .indexes()
        .iter()
        .map(|index| index.name())
        .collect();

    assert_eq!(names, vec!["users_email_idx", "users_pkey"]);
}

#[tokio::test]
async fn test_connectivity_failure_aborts_construction() {
    for query in [
        queries::COLUMNS,
        queries::FOREIGN_KEY_TRIGGERS,
        queries::DEFAULTS,
        queries::PRIMARY_KEYS,
        queries::INDEXES,
    ] {
        let conn = users_catalog().failing(&query);

        let error = PostgresAdapter::default()
            .open(&conn, "app")
            .await
            .unwrap_err();

        assert!(
            matches!(error, DbDocError::Connectivity { .. }),
            "query {} should abort construction",
            query.name
        );
        assert!(error.to_string().contains(query.name));
    }
}

#[tokio::test]
async fn test_dangling_references_become_warnings() {
    let conn = users_catalog().with_rows(
        &queries::FOREIGN_KEY_TRIGGERS,
        vec![catalog_row![
            "RI_ConstraintTrigger_1",
            "ghosts",
            "fk\\000ghosts\\000users\\000UNSPECIFIED\\000user_id\\000id\\000"
        ]],
    );

    let schema = PostgresAdapter::default().open(&conn, "app").await.unwrap();

    assert_eq!(schema.warnings().len(), 1);
    assert!(schema.warnings()[0].contains("ghosts"));
    assert!(schema.table("ghosts").is_none());
}

#[tokio::test]
async fn test_document_export_applies_filter() {
    let conn = users_catalog();
    let schema = PostgresAdapter::default().open(&conn, "app").await.unwrap();
    let filter = vec!["users".to_string(), "orders".to_string()];

    let document = SchemaDocument::from_schema(&schema, Some(&filter));

    assert_eq!(document.tables.len(), 1);
    assert_eq!(document.warnings.len(), 1);

    let json = document.to_json_pretty().unwrap();
    let parsed: SchemaDocument = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, document);
}
