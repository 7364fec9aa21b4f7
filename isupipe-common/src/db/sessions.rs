//! Login session storage
//!
//! Sessions are issued by the login service and read by the API gate.
//! Both share the `sessions` table.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::time::unix_now;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: i64,
    /// Unix epoch seconds
    pub expires_at: i64,
}

impl Session {
    /// A session is expired once `now` reaches `expires_at`
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

/// Create a session for `user_id` valid for `ttl_secs` seconds
pub async fn create_session(pool: &SqlitePool, user_id: i64, ttl_secs: i64) -> Result<Session> {
    let session = Session {
        id: generate_session_id(),
        user_id,
        expires_at: unix_now() + ttl_secs,
    };

    sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES (?, ?, ?)")
        .bind(&session.id)
        .bind(session.user_id)
        .bind(session.expires_at)
        .execute(pool)
        .await?;

    Ok(session)
}

/// Look up a session by id (expired sessions are returned too)
pub async fn find_session(pool: &SqlitePool, id: &str) -> Result<Option<Session>> {
    let session = sqlx::query_as::<_, Session>(
        "SELECT id, user_id, expires_at FROM sessions WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

/// 128 random bits, hex encoded
fn generate_session_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
