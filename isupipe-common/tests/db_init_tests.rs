//! Integration tests for database initialization and session storage

use isupipe_common::db::{create_schema, create_session, find_session, init_database};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should open in-memory database")
}

#[tokio::test]
async fn test_database_created_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("isupipe.db");

    let pool = init_database(&db_path, 4).await;

    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("isupipe.db");

    let first = init_database(&db_path, 2).await.unwrap();
    sqlx::query("INSERT INTO tags (name) VALUES ('kept')")
        .execute(&first)
        .await
        .unwrap();
    first.close().await;

    let second = init_database(&db_path, 2).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags")
        .fetch_one(&second)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_schema_is_idempotent() {
    let pool = memory_pool().await;

    create_schema(&pool).await.unwrap();
    create_schema(&pool).await.unwrap();

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for expected in [
        "icons",
        "livecomment_reports",
        "livecomments",
        "livestream_tags",
        "livestream_viewers_history",
        "livestreams",
        "reactions",
        "sessions",
        "tags",
        "themes",
        "users",
    ] {
        assert!(tables.iter().any(|t| t == expected), "missing table {}", expected);
    }
}

#[tokio::test]
async fn test_session_round_trip() {
    let pool = memory_pool().await;
    create_schema(&pool).await.unwrap();
    sqlx::query("INSERT INTO users (id, name) VALUES (7, 'streamer')")
        .execute(&pool)
        .await
        .unwrap();

    let session = create_session(&pool, 7, 3600).await.unwrap();
    let found = find_session(&pool, &session.id).await.unwrap();

    assert_eq!(found, Some(session.clone()));
    assert!(!session.is_expired_at(isupipe_common::time::unix_now()));
}

#[tokio::test]
async fn test_unknown_session_is_none() {
    let pool = memory_pool().await;
    create_schema(&pool).await.unwrap();

    assert_eq!(find_session(&pool, "nope").await.unwrap(), None);
}

#[tokio::test]
async fn test_every_pooled_connection_has_wal_and_busy_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("isupipe.db"), 4)
        .await
        .expect("Should open database");

    // Hold two connections at once so the second is not the first reused
    let mut first = pool.acquire().await.unwrap();
    let mut second = pool.acquire().await.unwrap();

    for conn in [&mut first, &mut second] {
        let timeout: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(timeout, 5000);

        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");

        let foreign_keys: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(foreign_keys, 1);
    }
}
