//! HTTP API handlers for isupipe-api

pub mod auth;
pub mod buildinfo;
pub mod error;
pub mod health;
pub mod reactions;
pub mod stats;
pub mod tags;

pub use auth::{session_middleware, SessionUser};
pub use buildinfo::get_build_info;
pub use error::{ApiError, ApiResult};
pub use health::health_routes;
pub use reactions::{get_reactions, post_reaction};
pub use stats::{get_livestream_statistics, get_user_statistics};
pub use tags::{get_streamer_theme, get_tags, initialize};

/// Parse a numeric path segment, rejecting anything that is not an integer
pub(crate) fn parse_id(raw: &str, name: &str) -> ApiResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::BadRequest(format!("{} in path must be integer", name)))
}
