//! Tag listing, tag cache reload, and streamer theme

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::{ApiError, ApiResult};
use crate::assemble::Theme;
use crate::db::users;
use crate::AppState;
use isupipe_common::Tag;

#[derive(Debug, Serialize, Deserialize)]
pub struct TagsResponse {
    pub tags: Vec<Tag>,
}

/// POST /api/initialize
///
/// Reloads the tag cache from the database and returns the loaded tags.
/// If the reload fails the previous cache contents keep serving.
pub async fn initialize(State(state): State<AppState>) -> ApiResult<Json<TagsResponse>> {
    let count = state.tags.reload(&state.db).await?;
    info!("Initialize: tag cache reloaded ({} tags)", count);

    Ok(Json(TagsResponse {
        tags: state.tags.all(),
    }))
}

/// GET /api/tag
///
/// Served entirely from the tag cache, ordered by id.
pub async fn get_tags(State(state): State<AppState>) -> Json<TagsResponse> {
    Json(TagsResponse {
        tags: state.tags.all(),
    })
}

/// GET /api/user/:username/theme
pub async fn get_streamer_theme(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<Theme>> {
    let mut tx = state.db.begin().await?;

    let user = users::find_user_by_name(&mut tx, &username)
        .await?
        .ok_or_else(|| ApiError::NotFound("not found user that has the given username".to_string()))?;

    let theme = users::find_theme_by_user(&mut tx, user.id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("theme not found for user {}", user.id)))?;

    tx.commit().await?;

    Ok(Json(Theme {
        id: theme.id,
        dark_mode: theme.dark_mode,
    }))
}
