// ============================
// crates/backend-lib/src/handlers/auth.rs
// ============================
//! Signup, login, session check, and logout.
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use serde_json::Value;
use tracing::{debug, warn};
use zeroize::Zeroize;

use super::{
    clear_session_cookie, optional_str, required_str, session_cookie, SessionToken,
    MISSING_FIELDS,
};
use crate::auth::AuthService;
use crate::error::AppError;
use crate::metrics as keys;
use crate::models::NewUser;
use crate::storage::Storage;
use crate::AppState;

const MISSING_CREDENTIALS: &str = "Missing username or password";

/// `POST /signup` — create a user and open a session for it
pub async fn signup<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(data): Json<Value>,
) -> Result<Response, AppError> {
    let username = required_str(&data, "username", MISSING_FIELDS)?;
    let mut password = required_str(&data, "password", MISSING_FIELDS)?.to_string();
    let image_url = optional_str(&data, "image_url");
    let bio = optional_str(&data, "bio");

    // NewUser::new wipes the plaintext on success; wipe it ourselves on the
    // validation path
    let new_user = match NewUser::new(username, &mut password, image_url, bio) {
        Ok(new_user) => new_user,
        Err(e) => {
            password.zeroize();
            if let AppError::Validation(v) = &e {
                warn!(field = v.field(), "signup rejected");
            }
            return Err(e);
        },
    };

    let user = state.storage.insert_user(new_user).await?;
    let token = state.auth.begin_session(user.id).await;

    counter!(keys::USER_SIGNUP).increment(1);
    debug!(user_id = user.id, "user signed up");

    Ok((
        StatusCode::CREATED,
        [(
            header::SET_COOKIE,
            session_cookie(&token, state.settings.session_ttl_secs),
        )],
        Json(user.to_body()),
    )
        .into_response())
}

/// `POST /login` — verify credentials and open a session
pub async fn login<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(data): Json<Value>,
) -> Result<Response, AppError> {
    let username = required_str(&data, "username", MISSING_CREDENTIALS)?;
    let mut password = required_str(&data, "password", MISSING_CREDENTIALS)?.to_string();

    let user = state.storage.find_user_by_username(username).await?;

    let authenticated = match &user {
        Some(user) => user
            .authenticate(&password)
            .map_err(|e| AppError::Internal(e.to_string()))?,
        None => false,
    };
    password.zeroize();

    // one generic failure for unknown username and wrong password alike
    let Some(user) = user.filter(|_| authenticated) else {
        return Err(AppError::InvalidCredentials);
    };

    let token = state.auth.begin_session(user.id).await;

    counter!(keys::USER_LOGIN).increment(1);
    debug!(user_id = user.id, "user logged in");

    Ok((
        StatusCode::OK,
        [(
            header::SET_COOKIE,
            session_cookie(&token, state.settings.session_ttl_secs),
        )],
        Json(user.to_body()),
    )
        .into_response())
}

/// `GET /check_session` — who is the current session bound to?
///
/// A session whose user has vanished from storage is reported as 404, unlike
/// the other authenticated operations which treat it as anonymous.
pub async fn check_session<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    token: SessionToken,
) -> Result<Response, AppError> {
    let token = token.0.as_deref().ok_or(AppError::Unauthorized)?;
    let session = state
        .auth
        .get_session(token)
        .await
        .ok_or(AppError::Unauthorized)?;

    let user = state
        .storage
        .find_user_by_id(session.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok((StatusCode::OK, Json(user.to_body())).into_response())
}

/// `DELETE /logout` — destroy the session. Logging out while anonymous is
/// an authorization failure, not a success.
pub async fn logout<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    token: SessionToken,
) -> Result<Response, AppError> {
    let token = token.0.as_deref().ok_or(AppError::Unauthorized)?;

    if !state.auth.end_session(token).await {
        return Err(AppError::Unauthorized);
    }

    counter!(keys::USER_LOGOUT).increment(1);
    debug!("session destroyed");

    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_session_cookie())],
    )
        .into_response())
}
