//! services/client/src/views/chat.rs
//!
//! The conversation with the scripted assistant.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use wellness_core::domain::{ChatMessage, ChatSender, Session};
use wellness_core::ports::Collection;

use crate::engine::{LiveView, SubscriptionManager};
use crate::records::ChatMessageRecord;
use crate::state::AppState;

pub struct ChatView {
    app: Arc<AppState>,
    session: Session,
    messages: LiveView<ChatMessage>,
    sending: AtomicBool,
    subscriptions: SubscriptionManager,
}

/// Clears the sending flag however `send` returns.
struct SendingGuard<'a>(&'a AtomicBool);

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ChatView {
    pub async fn open(app: Arc<AppState>, session: Session, scope: CancellationToken) -> Self {
        let mut subscriptions =
            SubscriptionManager::new(app.store.clone(), app.config.app_id.clone(), scope);
        let messages = LiveView::new();
        subscriptions.subscribe(&session, None, messages.clone(), None).await;
        Self { app, session, messages, sending: AtomicBool::new(false), subscriptions }
    }

    pub fn messages(&self) -> &LiveView<ChatMessage> {
        &self.messages
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// Sends a user message and, once it is accepted, writes the assistant's reply.
    ///
    /// Returns `false` without writing when the text is blank or a previous send
    /// is still in flight, and `false` when the user message was rejected.
    pub async fn send(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        if self.sending.swap(true, Ordering::AcqRel) {
            debug!("Chat send ignored: a previous message is still in flight.");
            return false;
        }
        let _sending = SendingGuard(&self.sending);

        let path = self.app.path(&self.session, Collection::ChatMessages);
        let writes = self.app.writes();
        let user = ChatMessageRecord::new(text, ChatSender::User, self.app.clock.now());
        if writes.create(&path, &user).await.is_none() {
            return false;
        }

        let reply = ChatMessageRecord::new(
            self.app.responder.chat_reply(),
            ChatSender::Assistant,
            self.app.clock.now(),
        );
        writes.create(&path, &reply).await;
        true
    }

    pub async fn close(mut self) {
        self.subscriptions.shutdown().await;
    }
}
