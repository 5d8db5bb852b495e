//! services/client/src/app.rs
//!
//! The session lifecycle and view navigation of the client.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use wellness_core::domain::Session;

use crate::error::{SyncError, SyncResult};
use crate::state::AppState;
use crate::views::{ActiveView, View};

/// Owns the current session and the controller of the view on screen.
///
/// Every view opened during a session descends from the session scope, so
/// signing out cancels whatever a view left behind.
pub struct WellnessClient {
    state: Arc<AppState>,
    session: Option<Session>,
    session_scope: CancellationToken,
    current: ActiveView,
}

impl WellnessClient {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            session: None,
            session_scope: CancellationToken::new(),
            current: ActiveView::Auth,
        }
    }

    /// Signs in with the configured token, falling back to an anonymous
    /// session when there is none or it is rejected, then opens the dashboard.
    pub async fn sign_in(&mut self) -> SyncResult<Session> {
        if self.session.is_some() {
            self.end_session().await;
        }

        let sessions = self.state.sessions.clone();
        let session = match self.state.config.initial_auth_token.as_deref() {
            Some(token) => match sessions.sign_in_with_token(token).await {
                Ok(session) => session,
                Err(e) => {
                    warn!("Token sign-in failed, falling back to anonymous: {}", e);
                    sessions.sign_in_anonymously().await?
                }
            },
            None => sessions.sign_in_anonymously().await?,
        };
        info!("Signed in as {} (anonymous: {}).", session.id, session.anonymous);

        self.session = Some(session.clone());
        self.session_scope = CancellationToken::new();
        self.navigate(View::Dashboard).await?;
        Ok(session)
    }

    /// Tears down every subscription of the session and returns to the sign-in view.
    pub async fn sign_out(&mut self) -> SyncResult<()> {
        self.end_session().await;
        self.state.sessions.sign_out().await?;
        info!("Signed out.");
        Ok(())
    }

    async fn end_session(&mut self) {
        let previous = std::mem::replace(&mut self.current, ActiveView::Auth);
        previous.close().await;
        self.session_scope.cancel();
        self.session = None;
    }

    /// Closes the current view, then opens `view`.
    ///
    /// Fails with `AuthUnavailable`, leaving the current view in place, when
    /// `view` needs a session and none is established.
    pub async fn navigate(&mut self, view: View) -> SyncResult<()> {
        if view.requires_session() && self.session.is_none() {
            return Err(SyncError::AuthUnavailable);
        }
        let previous = std::mem::replace(&mut self.current, ActiveView::Auth);
        previous.close().await;
        self.current = ActiveView::open(
            view,
            &self.state,
            self.session.as_ref(),
            self.session_scope.child_token(),
        )
        .await?;
        Ok(())
    }

    pub fn current(&self) -> &ActiveView {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut ActiveView {
        &mut self.current
    }

    pub fn view(&self) -> View {
        self.current.kind()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Cancelled when the session ends.
    pub fn session_scope(&self) -> &CancellationToken {
        &self.session_scope
    }
}
