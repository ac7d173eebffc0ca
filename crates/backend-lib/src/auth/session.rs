// ============================
// crates/backend-lib/src/auth/session.rs
// ============================
//! Session token handling and management.
//!
//! A session binds an opaque client-held token to an authenticated user id.
//! Sessions are created on signup/login, destroyed on logout, and expired by
//! TTL; an expired entry is treated exactly like a missing one.
use crate::auth::token_generator::generate_secure_token;
use crate::metrics as keys;
use dashmap::DashMap;
use metrics::{counter, gauge};
use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

/// Session TTL used when none is configured (7 days)
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

/// How often the background sweep runs
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Session information
#[derive(Clone, Debug)]
pub struct Session {
    pub user_id: i64,
    pub created_at: SystemTime,
    pub expires_at: SystemTime,
}

/// Session manager for handling authentication tokens
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<DashMap<String, Session>>,
    ttl: Duration,
}

impl SessionManager {
    /// Create a new session manager and spawn its cleanup sweep. Must be
    /// called from within a Tokio runtime.
    pub fn new(ttl: Duration) -> Self {
        let manager = SessionManager {
            sessions: Arc::new(DashMap::new()),
            ttl,
        };

        let sweep = manager.clone();
        tokio::spawn(async move {
            sweep.cleanup_task().await;
        });

        manager
    }

    /// Create a new session for `user_id` and return its token
    pub fn create_session(&self, user_id: i64) -> String {
        let token = generate_secure_token();
        let now = SystemTime::now();
        self.sessions.insert(
            token.clone(),
            Session {
                user_id,
                created_at: now,
                expires_at: now + self.ttl,
            },
        );

        counter!(keys::SESSION_CREATED).increment(1);
        gauge!(keys::SESSION_ACTIVE).set(self.sessions.len() as f64);

        token
    }

    /// Get the live session for a token. Expired entries are dropped here
    /// rather than waiting for the sweep.
    pub fn get_session(&self, token: &str) -> Option<Session> {
        let session = match self.sessions.get(token) {
            Some(entry) => entry.value().clone(),
            None => return None,
        };

        if SystemTime::now() < session.expires_at {
            Some(session)
        } else {
            self.sessions.remove(token);
            counter!(keys::SESSION_EXPIRED).increment(1);
            gauge!(keys::SESSION_ACTIVE).set(self.sessions.len() as f64);
            None
        }
    }

    /// Destroy a session. Returns `false` when no live session existed:
    /// logging out of an anonymous context is an authorization failure,
    /// not a silent no-op.
    pub fn destroy_session(&self, token: &str) -> bool {
        match self.sessions.remove(token) {
            Some((_, session)) if SystemTime::now() < session.expires_at => {
                counter!(keys::SESSION_DESTROYED).increment(1);
                gauge!(keys::SESSION_ACTIVE).set(self.sessions.len() as f64);
                true
            },
            _ => false,
        }
    }

    /// Remove every expired session, returning how many were dropped.
    /// Counted inside the retain pass; the map may grow concurrently, so
    /// comparing lengths before and after would misreport.
    fn sweep_expired(&self) -> u64 {
        let now = SystemTime::now();
        let mut removed = 0u64;
        self.sessions.retain(|_, session| {
            if now < session.expires_at {
                true
            } else {
                removed += 1;
                false
            }
        });
        removed
    }

    /// Periodically remove expired sessions
    async fn cleanup_task(&self) {
        loop {
            tokio::time::sleep(CLEANUP_INTERVAL).await;

            let removed = self.sweep_expired();
            if removed > 0 {
                counter!(keys::SESSION_EXPIRED).increment(removed);
                gauge!(keys::SESSION_ACTIVE).set(self.sessions.len() as f64);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_round_trip() {
        let manager = SessionManager::new(DEFAULT_SESSION_TTL);

        let token = manager.create_session(7);
        let session = manager.get_session(&token).expect("session should exist");
        assert_eq!(session.user_id, 7);

        assert!(manager.destroy_session(&token));
        assert!(manager.get_session(&token).is_none());
    }

    #[tokio::test]
    async fn test_destroying_twice_fails() {
        let manager = SessionManager::new(DEFAULT_SESSION_TTL);

        let token = manager.create_session(1);
        assert!(manager.destroy_session(&token));
        assert!(!manager.destroy_session(&token));
    }

    #[tokio::test]
    async fn test_unknown_token_is_anonymous() {
        let manager = SessionManager::new(DEFAULT_SESSION_TTL);

        assert!(manager.get_session("no-such-token").is_none());
        assert!(!manager.destroy_session("no-such-token"));
    }

    #[tokio::test]
    async fn test_expired_session_is_gone() {
        let manager = SessionManager::new(Duration::ZERO);

        let token = manager.create_session(3);
        assert!(manager.get_session(&token).is_none());
        // and destroying it is still an error
        assert!(!manager.destroy_session(&token));
    }

    #[tokio::test]
    async fn test_sweep_counts_only_what_it_removed() {
        let manager = SessionManager::new(Duration::ZERO);
        manager.create_session(1);
        manager.create_session(2);
        manager.create_session(3);

        assert_eq!(manager.sweep_expired(), 3);
        assert_eq!(manager.sessions.len(), 0);
        // a second sweep has nothing left to count
        assert_eq!(manager.sweep_expired(), 0);

        let manager = SessionManager::new(DEFAULT_SESSION_TTL);
        let token = manager.create_session(4);
        assert_eq!(manager.sweep_expired(), 0);
        assert!(manager.get_session(&token).is_some());
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let manager = SessionManager::new(DEFAULT_SESSION_TTL);

        let token_a = manager.create_session(1);
        let token_b = manager.create_session(2);

        assert!(manager.destroy_session(&token_a));
        let session = manager.get_session(&token_b).expect("b should survive");
        assert_eq!(session.user_id, 2);
    }
}
