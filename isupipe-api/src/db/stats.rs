//! Aggregate queries feeding the statistics endpoints
//!
//! Grouped queries return `(entity id, value)` pairs only for entities that
//! have at least one contributing row; callers treat absent entities as 0.

use std::collections::HashMap;

use sqlx::SqliteConnection;

/// Reactions received on each user's livestreams, keyed by user id
pub async fn reaction_counts_by_user(
    conn: &mut SqliteConnection,
) -> sqlx::Result<HashMap<i64, i64>> {
    grouped(
        conn,
        "SELECT l.user_id, COUNT(*) FROM livestreams l
         INNER JOIN reactions r ON r.livestream_id = l.id
         GROUP BY l.user_id",
    )
    .await
}

/// Tips received on each user's livestreams, keyed by user id
pub async fn tip_totals_by_user(conn: &mut SqliteConnection) -> sqlx::Result<HashMap<i64, i64>> {
    grouped(
        conn,
        "SELECT l.user_id, IFNULL(SUM(lc.tip), 0) FROM livestreams l
         INNER JOIN livecomments lc ON lc.livestream_id = l.id
         GROUP BY l.user_id",
    )
    .await
}

/// Reactions per livestream
pub async fn reaction_counts_by_livestream(
    conn: &mut SqliteConnection,
) -> sqlx::Result<HashMap<i64, i64>> {
    grouped(
        conn,
        "SELECT livestream_id, COUNT(*) FROM reactions GROUP BY livestream_id",
    )
    .await
}

/// Tips per livestream
pub async fn tip_totals_by_livestream(
    conn: &mut SqliteConnection,
) -> sqlx::Result<HashMap<i64, i64>> {
    grouped(
        conn,
        "SELECT livestream_id, IFNULL(SUM(tip), 0) FROM livecomments GROUP BY livestream_id",
    )
    .await
}

async fn grouped(conn: &mut SqliteConnection, sql: &str) -> sqlx::Result<HashMap<i64, i64>> {
    let rows = sqlx::query_as::<_, (i64, i64)>(sql)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows.into_iter().collect())
}

/// Per-creator totals across all of a user's livestreams
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatorTotals {
    pub total_reactions: i64,
    pub total_livecomments: i64,
    pub total_tip: i64,
    pub viewers_count: i64,
}

pub async fn creator_totals(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> sqlx::Result<CreatorTotals> {
    let total_reactions: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM livestreams l
         INNER JOIN reactions r ON r.livestream_id = l.id
         WHERE l.user_id = ?",
    )
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;

    let (total_livecomments, total_tip): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(lc.id), IFNULL(SUM(lc.tip), 0) FROM livestreams l
         INNER JOIN livecomments lc ON lc.livestream_id = l.id
         WHERE l.user_id = ?",
    )
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;

    let viewers_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM livestreams l
         INNER JOIN livestream_viewers_history h ON h.livestream_id = l.id
         WHERE l.user_id = ?",
    )
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(CreatorTotals {
        total_reactions,
        total_livecomments,
        total_tip,
        viewers_count,
    })
}

/// Most used emoji on the user's livestreams
///
/// Ties go to the lexicographically greatest emoji name.
pub async fn favorite_emoji(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> sqlx::Result<Option<String>> {
    sqlx::query_scalar::<_, String>(
        "SELECT r.emoji_name FROM livestreams l
         INNER JOIN reactions r ON r.livestream_id = l.id
         WHERE l.user_id = ?
         GROUP BY r.emoji_name
         ORDER BY COUNT(*) DESC, r.emoji_name DESC
         LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await
}

/// Point aggregates for one livestream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LivestreamTotals {
    pub viewers_count: i64,
    pub total_reactions: i64,
    pub total_reports: i64,
    pub max_tip: i64,
}

pub async fn livestream_totals(
    conn: &mut SqliteConnection,
    livestream_id: i64,
) -> sqlx::Result<LivestreamTotals> {
    let viewers_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM livestream_viewers_history WHERE livestream_id = ?",
    )
    .bind(livestream_id)
    .fetch_one(&mut *conn)
    .await?;

    let total_reactions: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM reactions WHERE livestream_id = ?")
            .bind(livestream_id)
            .fetch_one(&mut *conn)
            .await?;

    let total_reports: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM livecomment_reports WHERE livestream_id = ?")
            .bind(livestream_id)
            .fetch_one(&mut *conn)
            .await?;

    let max_tip: i64 =
        sqlx::query_scalar("SELECT IFNULL(MAX(tip), 0) FROM livecomments WHERE livestream_id = ?")
            .bind(livestream_id)
            .fetch_one(&mut *conn)
            .await?;

    Ok(LivestreamTotals {
        viewers_count,
        total_reactions,
        total_reports,
        max_tip,
    })
}
