//! Livestream lookups

use isupipe_common::db::LivestreamModel;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

const LIVESTREAM_COLUMNS: &str =
    "id, user_id, title, description, playlist_url, thumbnail_url, start_at, end_at";

pub async fn find_livestream(
    conn: &mut SqliteConnection,
    id: i64,
) -> sqlx::Result<Option<LivestreamModel>> {
    sqlx::query_as::<_, LivestreamModel>(&format!(
        "SELECT {} FROM livestreams WHERE id = ?",
        LIVESTREAM_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn list_livestream_ids(conn: &mut SqliteConnection) -> sqlx::Result<Vec<i64>> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM livestreams")
        .fetch_all(&mut *conn)
        .await
}

/// Livestreams whose id is in `ids`; unknown ids are silently absent
pub async fn livestreams_by_ids(
    conn: &mut SqliteConnection,
    ids: &[i64],
) -> sqlx::Result<Vec<LivestreamModel>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {} FROM livestreams WHERE id IN (",
        LIVESTREAM_COLUMNS
    ));
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    builder
        .build_query_as::<LivestreamModel>()
        .fetch_all(&mut *conn)
        .await
}

/// Tag ids attached to a livestream, in attachment order
pub async fn tag_ids_for_livestream(
    conn: &mut SqliteConnection,
    livestream_id: i64,
) -> sqlx::Result<Vec<i64>> {
    sqlx::query_scalar::<_, i64>(
        "SELECT tag_id FROM livestream_tags WHERE livestream_id = ? ORDER BY id",
    )
    .bind(livestream_id)
    .fetch_all(&mut *conn)
    .await
}
