//! services/client/src/views/mod.rs
//!
//! The screens of the application and the controllers behind them.

pub mod blogs;
pub mod chat;
pub mod consultations;
pub mod coping;
pub mod crisis;
pub mod dashboard;
pub mod goals;
pub mod mood;

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use wellness_core::domain::Session;

use crate::error::{SyncError, SyncResult};
use crate::state::AppState;

pub use blogs::BlogsView;
pub use chat::ChatView;
pub use consultations::ConsultationsView;
pub use coping::CopingView;
pub use dashboard::DashboardView;
pub use goals::GoalsView;
pub use mood::MoodTrackerView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Auth,
    Dashboard,
    Chatbot,
    Blogs,
    Consultations,
    MoodTracker,
    CopingTools,
    Goals,
    Crisis,
}

impl View {
    /// The navigation menu, in display order.
    pub const NAVIGATION: [View; 8] = [
        View::Dashboard,
        View::Chatbot,
        View::MoodTracker,
        View::Blogs,
        View::Consultations,
        View::CopingTools,
        View::Goals,
        View::Crisis,
    ];

    pub fn label(self) -> &'static str {
        match self {
            View::Auth => "Sign In",
            View::Dashboard => "Dashboard",
            View::Chatbot => "AI Chat",
            View::Blogs => "Articles",
            View::Consultations => "Consultations",
            View::MoodTracker => "Mood Tracker",
            View::CopingTools => "Coping Tools",
            View::Goals => "Goals",
            View::Crisis => "Crisis Resources",
        }
    }

    /// Whether the view reads session-scoped data.
    pub fn requires_session(self) -> bool {
        !matches!(self, View::Auth | View::Crisis)
    }
}

/// The controller of the view on screen.
pub enum ActiveView {
    Auth,
    Dashboard(DashboardView),
    Chatbot(ChatView),
    Blogs(BlogsView),
    Consultations(ConsultationsView),
    MoodTracker(MoodTrackerView),
    CopingTools(CopingView),
    Goals(GoalsView),
    Crisis,
}

impl ActiveView {
    /// Opens the controller for `view`. Its subscriptions descend from `scope`.
    pub async fn open(
        view: View,
        app: &Arc<AppState>,
        session: Option<&Session>,
        scope: CancellationToken,
    ) -> SyncResult<Self> {
        debug!("Opening view '{}'.", view.label());
        let app = app.clone();
        let active = match (view, session.cloned()) {
            (View::Auth, _) => ActiveView::Auth,
            (View::Crisis, _) => ActiveView::Crisis,
            (_, None) => return Err(SyncError::AuthUnavailable),
            (View::Dashboard, Some(s)) => ActiveView::Dashboard(DashboardView::open(app, s, scope).await),
            (View::Chatbot, Some(s)) => ActiveView::Chatbot(ChatView::open(app, s, scope).await),
            (View::Blogs, Some(s)) => ActiveView::Blogs(BlogsView::open(app, s, scope).await),
            (View::Consultations, Some(s)) => {
                ActiveView::Consultations(ConsultationsView::open(app, s, scope).await)
            }
            (View::MoodTracker, Some(s)) => {
                ActiveView::MoodTracker(MoodTrackerView::open(app, s, scope).await)
            }
            (View::CopingTools, Some(s)) => ActiveView::CopingTools(CopingView::open(app, s, scope).await),
            (View::Goals, Some(s)) => ActiveView::Goals(GoalsView::open(app, s, scope).await),
        };
        Ok(active)
    }

    pub fn kind(&self) -> View {
        match self {
            ActiveView::Auth => View::Auth,
            ActiveView::Dashboard(_) => View::Dashboard,
            ActiveView::Chatbot(_) => View::Chatbot,
            ActiveView::Blogs(_) => View::Blogs,
            ActiveView::Consultations(_) => View::Consultations,
            ActiveView::MoodTracker(_) => View::MoodTracker,
            ActiveView::CopingTools(_) => View::CopingTools,
            ActiveView::Goals(_) => View::Goals,
            ActiveView::Crisis => View::Crisis,
        }
    }

    /// Tears down every subscription the controller owns and waits for them.
    pub async fn close(self) {
        match self {
            ActiveView::Auth | ActiveView::Crisis => {}
            ActiveView::Dashboard(v) => v.close().await,
            ActiveView::Chatbot(v) => v.close().await,
            ActiveView::Blogs(v) => v.close().await,
            ActiveView::Consultations(v) => v.close().await,
            ActiveView::MoodTracker(v) => v.close().await,
            ActiveView::CopingTools(v) => v.close().await,
            ActiveView::Goals(v) => v.close().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_auth_and_crisis_work_without_a_session() {
        let open: Vec<_> = View::NAVIGATION.iter().filter(|v| !v.requires_session()).collect();
        assert_eq!(open, [&View::Crisis]);
        assert!(!View::Auth.requires_session());
    }
}
