// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core library for the `RecipeShare` session-authenticated REST backend.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod router;
pub mod storage;
pub mod validation;

use std::sync::Arc;

use crate::auth::{AuthService, DefaultAuth, SessionManager};
use crate::config::Settings;

/// Application state shared across all handlers
pub struct AppState<S> {
    /// Authentication service (session lifecycle)
    pub auth: Arc<dyn AuthService>,
    /// Settings
    pub settings: Arc<Settings>,
    /// Storage backend
    pub storage: S,
}

impl<S> AppState<S> {
    /// Create application state. Spawns the session cleanup task, so this
    /// must run inside a Tokio runtime.
    pub fn new(storage: S, settings: Settings) -> Self {
        let sessions = SessionManager::new(settings.session_ttl());

        Self {
            auth: Arc::new(DefaultAuth::new(sessions)),
            settings: Arc::new(settings),
            storage,
        }
    }
}
