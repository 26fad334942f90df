//! Unit tests for the Postgres adapter.

use super::*;
use crate::adapters::config::ForeignKeyPolicy;
use crate::catalog_row;
use crate::executor::{CatalogValue, FixtureExecutor};

fn users_catalog() -> FixtureExecutor {
    FixtureExecutor::new()
        .with_rows(
            &queries::COLUMNS,
            vec![
                catalog_row!["users", "id", "int4", 4, true, false, -1],
                catalog_row!["users", "email", "varchar", -1, "t", "f", 259],
                catalog_row!["users", "created_at", "date", 4, 1, 1, -1],
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
                catalog_row!["users", "users_pkey", "1", true],
                catalog_row!["users", "users_email_idx", "2", true],
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

fn trigger_blob(fields: &[&str]) -> String {
    fields.join("\\000")
}

#[tokio::test]
async fn test_columns_are_normalized() {
    let conn = users_catalog();
    let adapter = PostgresAdapter::default();

    let columns = adapter.fetch_columns(&conn).await.unwrap();

    assert_eq!(columns.len(), 3);
    assert!(!columns[0].nullable);
    assert!(!columns[1].nullable);
    assert_eq!(columns[1].length.as_deref(), Some("255"));
    assert!(!columns[2].nullable);
    assert!(columns[2].has_default);
}

#[tokio::test]
async fn test_unrecognized_not_null_code_is_fatal() {
    let conn = FixtureExecutor::new().with_rows(
        &queries::COLUMNS,
        vec![catalog_row!["users", "id", "int4", 4, "maybe", false, -1]],
    );

    let error = PostgresAdapter::default()
        .fetch_columns(&conn)
        .await
        .unwrap_err();

    assert!(error.is_catalog_shape());
    assert!(error.to_string().contains("postgres.columns"));
}

#[tokio::test]
async fn test_primary_key_follows_indkey_order() {
    let conn = FixtureExecutor::new()
        .with_rows(
            &queries::PRIMARY_KEYS,
            vec![catalog_row!["line_items", "2 1"]],
        )
        .with_rows(
            &queries::ATTRIBUTE_NAMES,
            vec![
                catalog_row!["line_items", 1, "line_no"],
                catalog_row!["line_items", 2, "order_id"],
            ],
        );

    let keys = PostgresAdapter::default()
        .fetch_primary_keys(&conn)
        .await
        .unwrap();
    let columns: Vec<&str> = keys.iter().map(|k| k.column.as_str()).collect();

    assert_eq!(columns, vec!["order_id", "line_no"]);
}

#[tokio::test]
async fn test_no_primary_keys_skips_attribute_lookup() {
    let conn = FixtureExecutor::new();

    let keys = PostgresAdapter::default()
        .fetch_primary_keys(&conn)
        .await
        .unwrap();

    assert!(keys.is_empty());
    assert_eq!(conn.calls(), vec![queries::PRIMARY_KEYS.name]);
}

#[tokio::test]
async fn test_batched_index_columns_keep_ordinal_order() {
    let conn = FixtureExecutor::new()
        .with_rows(
            &queries::INDEXES,
            vec![catalog_row!["people", "people_name_idx", "3 2", "f"]],
        )
        .with_rows(
            &queries::ATTRIBUTE_NAMES,
            vec![
                catalog_row!["people", 1, "id"],
                catalog_row!["people", 2, "first_name"],
                catalog_row!["people", 3, "last_name"],
            ],
        );

    let indexes = PostgresAdapter::default()
        .fetch_indexes(&conn)
        .await
        .unwrap();

    assert_eq!(indexes.len(), 1);
    assert_eq!(indexes[0].columns, vec!["last_name", "first_name"]);
    assert!(!indexes[0].unique);
}

#[tokio::test]
async fn test_per_index_queries_are_parameterized() {
    let conn = FixtureExecutor::new()
        .with_rows(
            &queries::INDEXES,
            vec![
                catalog_row!["people", "people_name_idx", "3 2", false],
                catalog_row!["people", "people's idx", "1", true],
            ],
        )
        .with_parameterized_rows(
            &queries::INDEX_MEMBER_COLUMNS,
            &["people", "people_name_idx"],
            vec![catalog_row![2, "first_name"], catalog_row![3, "last_name"]],
        )
        .with_parameterized_rows(
            &queries::INDEX_MEMBER_COLUMNS,
            &["people", "people's idx"],
            vec![catalog_row![1, "id"]],
        );
    let config = IntrospectionConfig::new()
        .with_index_columns(IndexColumnStrategy::PerIndex)
        .with_index_query_concurrency(2);

    let indexes = PostgresAdapter::new(config)
        .fetch_indexes(&conn)
        .await
        .unwrap();

    assert_eq!(indexes[0].columns, vec!["last_name", "first_name"]);
    assert_eq!(indexes[1].columns, vec!["id"]);
    assert!(indexes[1].unique);
    assert!(!conn.calls().contains(&queries::ATTRIBUTE_NAMES.name.to_string()));
}

#[tokio::test]
async fn test_trigger_foreign_keys() {
    let conn = FixtureExecutor::new().with_rows(
        &queries::FOREIGN_KEY_TRIGGERS,
        vec![catalog_row![
            "RI_ConstraintTrigger_16410",
            "orders",
            trigger_blob(&["fk1", "orders", "customers", "x", "cust_id", "cust_pk", ""])
        ]],
    );

    let scan = PostgresAdapter::default()
        .fetch_foreign_keys(&conn)
        .await
        .unwrap();

    assert_eq!(scan.keys.len(), 1);
    assert_eq!(scan.keys[0].column, "cust_id");
    assert_eq!(scan.keys[0].target.referenced_key, "cust_pk");
    assert!(scan.skipped.is_empty());
}

#[tokio::test]
async fn test_lenient_policy_reports_skipped_blobs() {
    let conn = FixtureExecutor::new().with_rows(
        &queries::FOREIGN_KEY_TRIGGERS,
        vec![catalog_row![
            "RI_ConstraintTrigger_16410",
            "orders",
            trigger_blob(&["fk1", "orders", "customers", "x", "cust_id", "cust_pk"])
        ]],
    );
    let adapter = PostgresAdapter::new(
        IntrospectionConfig::new().with_foreign_key_policy(ForeignKeyPolicy::Lenient),
    );

    let scan = adapter.fetch_foreign_keys(&conn).await.unwrap();

    assert!(scan.keys.is_empty());
    assert_eq!(scan.skipped.len(), 1);
}

#[tokio::test]
async fn test_constraint_discovery_bypasses_triggers() {
    let conn = FixtureExecutor::new()
        .with_rows(
            &queries::FOREIGN_KEY_CONSTRAINTS,
            vec![catalog_row!["orders", "cust_id", "customers", "id"]],
        )
        .failing(&queries::FOREIGN_KEY_TRIGGERS);
    let adapter = PostgresAdapter::default()
        .with_foreign_key_discovery(ForeignKeyDiscovery::Constraints);

    let scan = adapter.fetch_foreign_keys(&conn).await.unwrap();

    assert_eq!(scan.keys[0].target.referenced_table, "customers");
    assert_eq!(conn.calls(), vec![queries::FOREIGN_KEY_CONSTRAINTS.name]);
}

#[tokio::test]
async fn test_defaults_keep_null_expressions() {
    let conn = FixtureExecutor::new().with_rows(
        &queries::DEFAULTS,
        vec![
            catalog_row!["users", "created_at", "now()"],
            catalog_row!["users", "legacy", CatalogValue::Null],
        ],
    );

    let defaults = PostgresAdapter::default()
        .fetch_defaults(&conn)
        .await
        .unwrap();

    assert_eq!(defaults[0].expression.as_deref(), Some("now()"));
    assert_eq!(defaults[1].expression, None);
}

#[tokio::test]
async fn test_open_builds_users_snapshot() {
    let conn = users_catalog();

    let schema = PostgresAdapter::default().open(&conn, "app").await.unwrap();
    let users = schema.table("users").unwrap();

    assert_eq!(schema.name(), "app");
    assert_eq!(schema.engine(), Engine::PostgreSQL);
    assert_eq!(users.column_names(), vec!["id", "email", "created_at"]);
    assert_eq!(users.primary_key_description().as_deref(), Some("id"));

    let index = users.index("users_email_idx").unwrap();
    assert!(index.unique());
    assert_eq!(index.column_names(), ["email"]);
    assert!(schema.warnings().is_empty());
}
