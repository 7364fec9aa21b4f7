//! Livestream reactions: listing and posting

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use isupipe_common::time::unix_now;
use serde::Deserialize;
use tracing::debug;

use super::auth::SessionUser;
use super::error::{ApiError, ApiResult};
use super::parse_id;
use crate::assemble::{fill_reaction, fill_reactions, Reaction};
use crate::db::{livestreams, reactions};
use crate::AppState;

/// Query parameters for reaction listing
#[derive(Debug, Deserialize)]
pub struct ReactionQuery {
    /// Maximum number of reactions (kept raw so a bad value maps to 400)
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostReactionRequest {
    pub emoji_name: String,
}

fn parse_limit(raw: Option<&str>) -> ApiResult<Option<i64>> {
    match raw {
        None | Some("") => Ok(None),
        Some(value) => match value.parse::<i64>() {
            Ok(limit) if limit >= 0 => Ok(Some(limit)),
            _ => Err(ApiError::BadRequest(
                "limit query parameter must be integer".to_string(),
            )),
        },
    }
}

/// GET /api/livestream/:livestream_id/reaction
///
/// Newest first. An unknown livestream yields an empty list.
pub async fn get_reactions(
    State(state): State<AppState>,
    Path(livestream_id): Path<String>,
    query: Result<Query<ReactionQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Reaction>>> {
    let livestream_id = parse_id(&livestream_id, "livestream_id")?;
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let limit = parse_limit(query.limit.as_deref())?;

    let mut tx = state.db.begin().await?;

    let models = reactions::list_reactions(&mut tx, livestream_id, limit).await?;
    let filled = fill_reactions(&mut tx, &state.tags, models).await?;

    tx.commit().await?;

    Ok(Json(filled))
}

/// POST /api/livestream/:livestream_id/reaction
///
/// Body: `{"emoji_name": "..."}`. Responds 201 with the stored reaction.
///
/// The write lock is taken at BEGIN: under WAL a deferred transaction that
/// reads first cannot upgrade while another writer holds the lock.
pub async fn post_reaction(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Path(livestream_id): Path<String>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Reaction>)> {
    let livestream_id = parse_id(&livestream_id, "livestream_id")?;

    let request: PostReactionRequest = serde_json::from_slice(&body).map_err(|_| {
        ApiError::BadRequest("failed to decode the request body as json".to_string())
    })?;

    let mut tx = state.db.begin_with("BEGIN IMMEDIATE").await?;

    if livestreams::find_livestream(&mut tx, livestream_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("livestream not found".to_string()));
    }

    let model = reactions::insert_reaction(
        &mut tx,
        session.user_id,
        livestream_id,
        &request.emoji_name,
        unix_now(),
    )
    .await?;
    debug!(
        "User {} reacted {} on livestream {}",
        session.user_id, model.emoji_name, livestream_id
    );

    let reaction = fill_reaction(&mut tx, &state.tags, model).await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(reaction)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None).unwrap(), None);
        assert_eq!(parse_limit(Some("")).unwrap(), None);
        assert_eq!(parse_limit(Some("0")).unwrap(), Some(0));
        assert_eq!(parse_limit(Some("25")).unwrap(), Some(25));
        assert!(matches!(parse_limit(Some("ten")), Err(ApiError::BadRequest(_))));
        assert!(matches!(parse_limit(Some("-1")), Err(ApiError::BadRequest(_))));
    }
}
