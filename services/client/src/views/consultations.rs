//! services/client/src/views/consultations.rs
//!
//! Booked consultations and the message thread of the one currently open.
//!
//! The thread subscription is keyed by `(session, consultation_messages)` and
//! filtered by `consultationId`. Opening another consultation re-keys it: the
//! previous subscription is joined before the new one starts, and the new
//! thread gets a fresh view, so nothing from the old thread can reach it.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use wellness_core::domain::{Consultation, ConsultationMessage, Session, ThreadSender};
use wellness_core::ports::{Collection, FieldFilter};

use crate::engine::{LiveView, SubscriptionKey, SubscriptionManager, SubscriptionState};
use crate::records::{ConsultationMessageRecord, ConsultationRecord};
use crate::state::AppState;

struct OpenThread {
    consultation_id: String,
    key: SubscriptionKey,
    messages: LiveView<ConsultationMessage>,
    /// Parent of every pending reply timer for this thread.
    token: CancellationToken,
    pending: Vec<JoinHandle<bool>>,
}

pub struct ConsultationsView {
    app: Arc<AppState>,
    session: Session,
    consultations: LiveView<Consultation>,
    thread: Option<OpenThread>,
    subscriptions: SubscriptionManager,
}

impl ConsultationsView {
    pub async fn open(app: Arc<AppState>, session: Session, scope: CancellationToken) -> Self {
        let mut subscriptions =
            SubscriptionManager::new(app.store.clone(), app.config.app_id.clone(), scope);
        let consultations = LiveView::new();
        subscriptions.subscribe(&session, None, consultations.clone(), None).await;
        Self { app, session, consultations, thread: None, subscriptions }
    }

    pub fn consultations(&self) -> &LiveView<Consultation> {
        &self.consultations
    }

    /// Books a session with the default therapist and slot.
    pub async fn book(&self) -> Option<String> {
        let path = self.app.path(&self.session, Collection::Consultations);
        let record = ConsultationRecord::booking(self.app.clock.now());
        let id = self.app.writes().create(&path, &record).await;
        if let Some(id) = &id {
            info!("Booked consultation {}.", id);
        }
        id
    }

    /// Opens the message thread of `consultation_id` and returns its view.
    ///
    /// Reopening the thread that is already open returns the same view, unless
    /// its subscription has ended, in which case the thread is opened afresh.
    pub async fn open_thread(&mut self, consultation_id: &str) -> LiveView<ConsultationMessage> {
        if let Some(thread) = &self.thread {
            let live = self.subscriptions.state(&thread.key) != SubscriptionState::Unsubscribed;
            if thread.consultation_id == consultation_id && live {
                return thread.messages.clone();
            }
            thread.token.cancel();
        }

        let messages = LiveView::new();
        let filter = FieldFilter::eq("consultationId", consultation_id);
        let key = self
            .subscriptions
            .subscribe(&self.session, Some(filter), messages.clone(), None)
            .await;
        debug!("Opened thread for consultation {}.", consultation_id);

        self.thread = Some(OpenThread {
            consultation_id: consultation_id.to_string(),
            key,
            messages: messages.clone(),
            token: self.subscriptions.scope().child_token(),
            pending: Vec::new(),
        });
        messages
    }

    /// Closes the open thread and cancels its pending replies.
    pub async fn close_thread(&mut self) {
        if let Some(thread) = self.thread.take() {
            thread.token.cancel();
            self.subscriptions.unsubscribe(&thread.key).await;
            debug!("Closed thread for consultation {}.", thread.consultation_id);
        }
    }

    pub fn open_consultation(&self) -> Option<&str> {
        self.thread.as_ref().map(|t| t.consultation_id.as_str())
    }

    pub fn messages(&self) -> Option<LiveView<ConsultationMessage>> {
        self.thread.as_ref().map(|t| t.messages.clone())
    }

    /// Posts a user message into the open thread and schedules the counterpart
    /// reply. Returns `false` without writing when no thread is open or the
    /// text is blank.
    pub async fn send(&mut self, text: &str) -> bool {
        let text = text.trim();
        let Some(thread) = self.thread.as_mut() else {
            return false;
        };
        if text.is_empty() {
            return false;
        }

        let path = self.app.path(&self.session, Collection::ConsultationMessages);
        let writes = self.app.writes();
        let record = ConsultationMessageRecord::new(
            &thread.consultation_id,
            text,
            ThreadSender::User,
            self.app.clock.now(),
        );
        if writes.create(&path, &record).await.is_none() {
            return false;
        }

        thread.pending.retain(|h| !h.is_finished());
        let reply = self.app.responder.schedule_counterpart_reply(
            writes,
            path,
            thread.consultation_id.clone(),
            self.app.clock.clone(),
            thread.token.child_token(),
        );
        thread.pending.push(reply);
        true
    }

    /// Hands over the reply timers of the open thread. Each resolves to whether
    /// its reply was written.
    pub fn take_pending_replies(&mut self) -> Vec<JoinHandle<bool>> {
        self.thread.as_mut().map(|t| std::mem::take(&mut t.pending)).unwrap_or_default()
    }

    pub fn subscriptions(&self) -> &SubscriptionManager {
        &self.subscriptions
    }

    pub async fn close(mut self) {
        self.close_thread().await;
        self.subscriptions.shutdown().await;
    }
}
