//! User, theme and icon lookups

use isupipe_common::db::{ThemeModel, UserModel};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

const USER_COLUMNS: &str = "id, name, display_name, description";

pub async fn find_user_by_id(
    conn: &mut SqliteConnection,
    id: i64,
) -> sqlx::Result<Option<UserModel>> {
    sqlx::query_as::<_, UserModel>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn find_user_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> sqlx::Result<Option<UserModel>> {
    sqlx::query_as::<_, UserModel>(&format!("SELECT {} FROM users WHERE name = ?", USER_COLUMNS))
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn list_users(conn: &mut SqliteConnection) -> sqlx::Result<Vec<UserModel>> {
    sqlx::query_as::<_, UserModel>(&format!("SELECT {} FROM users", USER_COLUMNS))
        .fetch_all(&mut *conn)
        .await
}

/// Users whose id is in `ids`; unknown ids are silently absent
pub async fn users_by_ids(
    conn: &mut SqliteConnection,
    ids: &[i64],
) -> sqlx::Result<Vec<UserModel>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {} FROM users WHERE id IN (", USER_COLUMNS));
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    builder
        .build_query_as::<UserModel>()
        .fetch_all(&mut *conn)
        .await
}

pub async fn find_theme_by_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> sqlx::Result<Option<ThemeModel>> {
    sqlx::query_as::<_, ThemeModel>("SELECT id, user_id, dark_mode FROM themes WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
}

/// Most recently stored icon image for the user
pub async fn find_icon_image(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> sqlx::Result<Option<Vec<u8>>> {
    sqlx::query_scalar::<_, Vec<u8>>(
        "SELECT image FROM icons WHERE user_id = ? ORDER BY id DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await
}
