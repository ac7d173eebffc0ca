// ============================
// crates/backend-lib/src/router.rs
// ============================
//! HTTP router assembly.
use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{auth, recipes};
use crate::storage::Storage;
use crate::AppState;

/// Create the application router
pub fn create_router<S: Storage + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/signup", post(auth::signup::<S>))
        .route("/check_session", get(auth::check_session::<S>))
        .route("/login", post(auth::login::<S>))
        .route("/logout", delete(auth::logout::<S>))
        .route("/recipes", get(recipes::index::<S>).post(recipes::create::<S>))
        .layer(TraceLayer::new_for_http())
        // browser clients send the session cookie cross-origin in development
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}
