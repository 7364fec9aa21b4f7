//! Reaction reads and writes

use isupipe_common::db::ReactionModel;
use sqlx::SqliteConnection;

/// Reactions on a livestream, newest first, optionally limited
pub async fn list_reactions(
    conn: &mut SqliteConnection,
    livestream_id: i64,
    limit: Option<i64>,
) -> sqlx::Result<Vec<ReactionModel>> {
    // SQLite treats a negative LIMIT as "no limit"
    sqlx::query_as::<_, ReactionModel>(
        "SELECT id, emoji_name, user_id, livestream_id, created_at FROM reactions
         WHERE livestream_id = ?
         ORDER BY created_at DESC, id DESC
         LIMIT ?",
    )
    .bind(livestream_id)
    .bind(limit.unwrap_or(-1))
    .fetch_all(&mut *conn)
    .await
}

/// Insert a reaction and return the stored row
pub async fn insert_reaction(
    conn: &mut SqliteConnection,
    user_id: i64,
    livestream_id: i64,
    emoji_name: &str,
    created_at: i64,
) -> sqlx::Result<ReactionModel> {
    let result = sqlx::query(
        "INSERT INTO reactions (user_id, livestream_id, emoji_name, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(livestream_id)
    .bind(emoji_name)
    .bind(created_at)
    .execute(&mut *conn)
    .await?;

    Ok(ReactionModel {
        id: result.last_insert_rowid(),
        emoji_name: emoji_name.to_string(),
        user_id,
        livestream_id,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{exec, memory_db};

    #[tokio::test]
    async fn test_newest_first_with_limit() {
        let pool = memory_db().await;
        exec(&pool, "INSERT INTO users (id, name) VALUES (1, 'a')").await;
        exec(
            &pool,
            "INSERT INTO livestreams (id, user_id, title, start_at, end_at) VALUES (1, 1, 't', 0, 1)",
        )
        .await;

        let mut conn = pool.acquire().await.unwrap();
        for (emoji, at) in [(":a:", 10), (":b:", 30), (":c:", 20)] {
            insert_reaction(&mut conn, 1, 1, emoji, at).await.unwrap();
        }

        let all = list_reactions(&mut conn, 1, None).await.unwrap();
        let emojis: Vec<&str> = all.iter().map(|r| r.emoji_name.as_str()).collect();
        assert_eq!(emojis, vec![":b:", ":c:", ":a:"]);

        let limited = list_reactions(&mut conn, 1, Some(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].emoji_name, ":b:");

        assert!(list_reactions(&mut conn, 2, None).await.unwrap().is_empty());
    }
}
