use async_trait::async_trait;

use super::Session;

/// Seam between the request handlers and the session machinery. Handlers
/// hold this as a trait object so tests can substitute their own.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Bind a fresh opaque token to `user_id` and return the token
    async fn begin_session(&self, user_id: i64) -> String;
    /// Resolve a token to its live session, if any
    async fn get_session(&self, token: &str) -> Option<Session>;
    /// Tear down a session. Returns `false` when no live session existed.
    async fn end_session(&self, token: &str) -> bool;
}
