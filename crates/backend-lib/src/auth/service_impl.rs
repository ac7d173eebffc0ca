use async_trait::async_trait;

use crate::auth::{AuthService, Session, SessionManager};

/// Default [`AuthService`] backed by the in-process [`SessionManager`]
pub struct DefaultAuth {
    sm: SessionManager,
}

impl DefaultAuth {
    pub fn new(sm: SessionManager) -> Self {
        Self { sm }
    }
}

#[async_trait]
impl AuthService for DefaultAuth {
    async fn begin_session(&self, user_id: i64) -> String {
        self.sm.create_session(user_id)
    }

    async fn get_session(&self, token: &str) -> Option<Session> {
        self.sm.get_session(token)
    }

    async fn end_session(&self, token: &str) -> bool {
        self.sm.destroy_session(token)
    }
}
