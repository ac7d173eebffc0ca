// ============================
// crates/backend-lib/src/handlers/mod.rs
// ============================
//! HTTP request handlers.
//!
//! The session is carried in an HttpOnly cookie holding the opaque token.
//! Handlers receive the raw token via the infallible [`SessionToken`]
//! extractor and resolve it explicitly; there is no ambient request state.

pub mod auth;
pub mod recipes;

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use serde_json::Value;

use crate::auth::AuthService;
use crate::error::AppError;
use crate::models::User;
use crate::storage::Storage;
use crate::AppState;

/// Cookie that carries the opaque session token
pub const SESSION_COOKIE: &str = "session";

pub(crate) const MISSING_FIELDS: &str = "Missing required fields";

/// The session token from the request cookies, if any. Extraction never
/// fails; each operation decides what a missing token means.
pub struct SessionToken(pub Option<String>);

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Infallible> {
        let token = parts
            .headers
            .get(header::COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(session_cookie_value);
        Ok(Self(token))
    }
}

fn session_cookie_value(header: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// Set-Cookie value binding the session token to the client
pub(crate) fn session_cookie(token: &str, max_age_secs: u64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

/// Set-Cookie value that removes the session cookie
pub(crate) fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Pull a required string field out of the JSON payload
pub(crate) fn required_str<'a>(
    data: &'a Value,
    key: &str,
    missing_msg: &str,
) -> Result<&'a str, AppError> {
    data.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::BadRequest(missing_msg.to_string()))
}

pub(crate) fn optional_str(data: &Value, key: &str) -> Option<String> {
    data.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Resolve the ambient session to its user. A missing or expired token is
/// unauthorized; so is a session pointing at a user that no longer exists.
pub(crate) async fn current_user<S: Storage>(
    state: &AppState<S>,
    token: &SessionToken,
) -> Result<User, AppError> {
    let token = token.0.as_deref().ok_or(AppError::Unauthorized)?;
    let session = state
        .auth
        .get_session(token)
        .await
        .ok_or(AppError::Unauthorized)?;
    state
        .storage
        .find_user_by_id(session.user_id)
        .await?
        .ok_or(AppError::Unauthorized)
}
