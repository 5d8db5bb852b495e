//! services/client/src/adapters/session.rs
//!
//! A local implementation of the `SessionProvider` port. Custom tokens are taken
//! as the identity itself; anonymous sessions get a fresh random id.

use async_trait::async_trait;
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;
use wellness_core::domain::Session;
use wellness_core::ports::{PortError, PortResult, SessionProvider};

#[derive(Default)]
pub struct LocalSessionProvider {
    current: Mutex<Option<Session>>,
}

impl LocalSessionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn establish(&self, session: Session) -> Session {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = Some(session.clone());
        session
    }
}

#[async_trait]
impl SessionProvider for LocalSessionProvider {
    async fn sign_in_with_token(&self, token: &str) -> PortResult<Session> {
        let token = token.trim();
        // The token becomes a path segment.
        if token.is_empty() || token.contains('/') {
            debug!("Rejected custom sign-in token.");
            return Err(PortError::Unauthorized);
        }
        Ok(self.establish(Session { id: token.to_string(), anonymous: false }))
    }

    async fn sign_in_anonymously(&self) -> PortResult<Session> {
        Ok(self.establish(Session { id: Uuid::new_v4().to_string(), anonymous: true }))
    }

    async fn sign_out(&self) -> PortResult<()> {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).take();
        Ok(())
    }

    fn current(&self) -> Option<Session> {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
