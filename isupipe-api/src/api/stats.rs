//! Creator and livestream statistics
//!
//! Both endpoints rank the target among all peers by
//! `score = reactions received + tips received`, highest score = rank 1.

use axum::{
    extract::{Path, State},
    Json,
};
use isupipe_common::ranking::{rank_of, ScoreEntry};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{ApiError, ApiResult};
use super::parse_id;
use crate::db::{livestreams, stats, users};
use crate::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatistics {
    pub rank: i64,
    pub viewers_count: i64,
    pub total_reactions: i64,
    pub total_livecomments: i64,
    pub total_tip: i64,
    pub favorite_emoji: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivestreamStatistics {
    pub rank: i64,
    pub viewers_count: i64,
    pub total_reactions: i64,
    pub total_reports: i64,
    pub max_tip: i64,
}

/// GET /api/user/:username/statistics
pub async fn get_user_statistics(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<UserStatistics>> {
    let mut tx = state.db.begin().await?;

    let user = users::find_user_by_name(&mut tx, &username)
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest("not found user that has the given username".to_string())
        })?;

    let all_users = users::list_users(&mut tx).await?;
    let reactions = stats::reaction_counts_by_user(&mut tx).await?;
    let tips = stats::tip_totals_by_user(&mut tx).await?;

    let entries: Vec<ScoreEntry<String>> = all_users
        .into_iter()
        .map(|u| {
            let score = reactions.get(&u.id).copied().unwrap_or(0)
                + tips.get(&u.id).copied().unwrap_or(0);
            ScoreEntry::new(u.name, score)
        })
        .collect();
    let rank = rank_of(entries, username.as_str())?;

    let totals = stats::creator_totals(&mut tx, user.id).await?;
    let favorite_emoji = stats::favorite_emoji(&mut tx, user.id)
        .await?
        .unwrap_or_default();

    tx.commit().await?;

    debug!("User {} statistics: rank {}", username, rank);

    Ok(Json(UserStatistics {
        rank,
        viewers_count: totals.viewers_count,
        total_reactions: totals.total_reactions,
        total_livecomments: totals.total_livecomments,
        total_tip: totals.total_tip,
        favorite_emoji,
    }))
}

/// GET /api/livestream/:livestream_id/statistics
pub async fn get_livestream_statistics(
    State(state): State<AppState>,
    Path(livestream_id): Path<String>,
) -> ApiResult<Json<LivestreamStatistics>> {
    let livestream_id = parse_id(&livestream_id, "livestream_id")?;

    let mut tx = state.db.begin().await?;

    if livestreams::find_livestream(&mut tx, livestream_id)
        .await?
        .is_none()
    {
        return Err(ApiError::BadRequest(
            "cannot get stats of not found livestream".to_string(),
        ));
    }

    let ids = livestreams::list_livestream_ids(&mut tx).await?;
    let reactions = stats::reaction_counts_by_livestream(&mut tx).await?;
    let tips = stats::tip_totals_by_livestream(&mut tx).await?;

    let entries: Vec<ScoreEntry<i64>> = ids
        .into_iter()
        .map(|id| {
            let score =
                reactions.get(&id).copied().unwrap_or(0) + tips.get(&id).copied().unwrap_or(0);
            ScoreEntry::new(id, score)
        })
        .collect();
    let rank = rank_of(entries, &livestream_id)?;

    let totals = stats::livestream_totals(&mut tx, livestream_id).await?;

    tx.commit().await?;

    debug!("Livestream {} statistics: rank {}", livestream_id, rank);

    Ok(Json(LivestreamStatistics {
        rank,
        viewers_count: totals.viewers_count,
        total_reactions: totals.total_reactions,
        total_reports: totals.total_reports,
        max_tip: totals.max_tip,
    }))
}
