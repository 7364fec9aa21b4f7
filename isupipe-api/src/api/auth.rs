//! Session gate for protected routes
//!
//! Resolves the session cookie to a user id via the `sessions` table and
//! hands it to handlers as a [`SessionUser`] request extension.

use axum::{
    extract::{Request, State},
    http::{header::COOKIE, HeaderMap},
    middleware::Next,
    response::Response,
};
use isupipe_common::db::find_session;
use isupipe_common::time::unix_now;
use tracing::warn;

use super::error::ApiError;
use crate::AppState;

/// Authenticated identity of the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: i64,
}

/// Session middleware
///
/// Returns 401 Unauthorized if the cookie is missing, unknown or expired.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session_id = session_id_from_headers(request.headers(), &state.session_cookie)
        .ok_or_else(|| ApiError::Unauthorized("failed to get session".to_string()))?;

    let session = find_session(&state.db, &session_id)
        .await?
        .ok_or_else(|| {
            warn!("Rejected unknown session id");
            ApiError::Unauthorized("failed to get session".to_string())
        })?;

    if session.is_expired_at(unix_now()) {
        warn!("Rejected expired session for user {}", session.user_id);
        return Err(ApiError::Unauthorized("session has expired".to_string()));
    }

    request.extensions_mut().insert(SessionUser {
        user_id: session.user_id,
    });

    Ok(next.run(request).await)
}

/// Find `cookie_name` among all `Cookie` headers
fn session_id_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
