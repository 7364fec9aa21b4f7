//! Response assembly: expands row models into the JSON records clients see
//!
//! A reaction embeds its user and livestream; a livestream embeds its owner
//! and tags. Tags are resolved through the in-memory [`TagCache`].

use std::collections::HashMap;

use isupipe_common::db::{LivestreamModel, ReactionModel, UserModel};
use isupipe_common::{Tag, TagCache};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::SqliteConnection;

use crate::api::{ApiError, ApiResult};
use crate::db::{livestreams, users};

/// SHA-256 of the stock image served to users without an icon
pub const FALLBACK_ICON_HASH: &str =
    "d9f8294e9d895f81ce62e73dc7d5dff862a4fa40bd4e0fecf53f7526a8edcac0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub id: i64,
    pub dark_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub theme: Theme,
    pub icon_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Livestream {
    pub id: i64,
    pub owner: User,
    pub title: String,
    pub description: String,
    pub playlist_url: String,
    pub thumbnail_url: String,
    pub tags: Vec<Tag>,
    pub start_at: i64,
    pub end_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: i64,
    pub emoji_name: String,
    pub user: User,
    pub livestream: Livestream,
    pub created_at: i64,
}

/// Lowercase hex SHA-256 of an icon image
pub fn icon_hash(image: &[u8]) -> String {
    Sha256::digest(image)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

pub async fn fill_user(conn: &mut SqliteConnection, user: UserModel) -> ApiResult<User> {
    let theme = users::find_theme_by_user(conn, user.id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("theme not found for user {}", user.id)))?;

    let icon_hash = match users::find_icon_image(conn, user.id).await? {
        Some(image) => icon_hash(&image),
        None => FALLBACK_ICON_HASH.to_string(),
    };

    Ok(User {
        id: user.id,
        name: user.name,
        display_name: user.display_name,
        description: user.description,
        theme: Theme {
            id: theme.id,
            dark_mode: theme.dark_mode,
        },
        icon_hash,
    })
}

pub async fn fill_livestream(
    conn: &mut SqliteConnection,
    tag_cache: &TagCache,
    livestream: LivestreamModel,
) -> ApiResult<Livestream> {
    let owner_model = users::find_user_by_id(conn, livestream.user_id)
        .await?
        .ok_or_else(|| {
            ApiError::Internal(format!("owner not found for livestream {}", livestream.id))
        })?;
    let owner = fill_user(conn, owner_model).await?;

    let tags = resolve_tags(conn, tag_cache, livestream.id).await?;

    Ok(Livestream {
        id: livestream.id,
        owner,
        title: livestream.title,
        description: livestream.description,
        playlist_url: livestream.playlist_url,
        thumbnail_url: livestream.thumbnail_url,
        tags,
        start_at: livestream.start_at,
        end_at: livestream.end_at,
    })
}

async fn resolve_tags(
    conn: &mut SqliteConnection,
    tag_cache: &TagCache,
    livestream_id: i64,
) -> ApiResult<Vec<Tag>> {
    livestreams::tag_ids_for_livestream(conn, livestream_id)
        .await?
        .into_iter()
        .map(|tag_id| {
            tag_cache
                .lookup_by_id(tag_id)
                .ok_or_else(|| ApiError::Internal(format!("tag {} missing from cache", tag_id)))
        })
        .collect()
}

pub async fn fill_reaction(
    conn: &mut SqliteConnection,
    tag_cache: &TagCache,
    reaction: ReactionModel,
) -> ApiResult<Reaction> {
    let user_model = users::find_user_by_id(conn, reaction.user_id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("user not found for id {}", reaction.user_id)))?;
    let user = fill_user(conn, user_model).await?;

    let livestream_model = livestreams::find_livestream(conn, reaction.livestream_id)
        .await?
        .ok_or_else(|| {
            ApiError::Internal(format!(
                "livestream not found for id {}",
                reaction.livestream_id
            ))
        })?;
    let livestream = fill_livestream(conn, tag_cache, livestream_model).await?;

    Ok(Reaction {
        id: reaction.id,
        emoji_name: reaction.emoji_name,
        user,
        livestream,
        created_at: reaction.created_at,
    })
}

/// Assemble many reactions, fetching their users and livestreams in one
/// query each
///
/// Output order follows input order. A reaction whose user or livestream
/// row is missing fails the whole batch.
pub async fn fill_reactions(
    conn: &mut SqliteConnection,
    tag_cache: &TagCache,
    reactions: Vec<ReactionModel>,
) -> ApiResult<Vec<Reaction>> {
    if reactions.is_empty() {
        return Ok(Vec::new());
    }

    let user_ids = distinct(reactions.iter().map(|r| r.user_id));
    let livestream_ids = distinct(reactions.iter().map(|r| r.livestream_id));

    let user_models: HashMap<i64, UserModel> = users::users_by_ids(conn, &user_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let livestream_models: HashMap<i64, LivestreamModel> =
        livestreams::livestreams_by_ids(conn, &livestream_ids)
            .await?
            .into_iter()
            .map(|l| (l.id, l))
            .collect();

    let mut filled = Vec::with_capacity(reactions.len());
    for reaction in reactions {
        let user_model = user_models.get(&reaction.user_id).cloned().ok_or_else(|| {
            ApiError::Internal(format!("user not found for id {}", reaction.user_id))
        })?;
        let user = fill_user(conn, user_model).await?;

        let livestream_model = livestream_models
            .get(&reaction.livestream_id)
            .cloned()
            .ok_or_else(|| {
                ApiError::Internal(format!(
                    "livestream not found for id {}",
                    reaction.livestream_id
                ))
            })?;
        let livestream = fill_livestream(conn, tag_cache, livestream_model).await?;

        filled.push(Reaction {
            id: reaction.id,
            emoji_name: reaction.emoji_name,
            user,
            livestream,
            created_at: reaction.created_at,
        });
    }

    Ok(filled)
}

fn distinct(ids: impl Iterator<Item = i64>) -> Vec<i64> {
    let mut ids: Vec<i64> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
