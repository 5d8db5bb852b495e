//! services/client/src/engine/responder.rs
//!
//! Stands in for the remote participant of the chat and consultation flows.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use wellness_core::domain::ThreadSender;
use wellness_core::ports::CollectionPath;

use crate::engine::clock::Clock;
use crate::engine::writes::WriteQueue;
use crate::records::ConsultationMessageRecord;

pub const CHAT_REPLIES: [&str; 6] = [
    "I understand you're going through something. Can you tell me more about how you're feeling?",
    "It's completely normal to feel this way. You're being very brave by reaching out.",
    "Have you tried any coping techniques that have helped you in the past?",
    "Remember that it's okay to take things one day at a time. You don't have to have everything figured out right now.",
    "What's one small thing that brought you joy today, even if it was brief?",
    "Your feelings are valid, and I'm here to listen without judgment.",
];

pub const COUNTERPART_REPLY: &str =
    "Thank you for sharing that with me. How are you feeling about this situation?";

pub const JOURNAL_PROMPTS: [&str; 5] = [
    "What made you smile today?",
    "What's on your mind right now?",
    "What are you grateful for today?",
    "What would you like to improve about today?",
    "How did you take care of yourself today?",
];

/// Picks scripted replies and schedules the delayed therapist answer.
///
/// A fixed seed makes the picks reproducible.
pub struct Responder {
    rng: Mutex<StdRng>,
    reply_delay: Duration,
}

impl Responder {
    pub fn new(seed: Option<u64>, reply_delay: Duration) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng: Mutex::new(rng), reply_delay }
    }

    fn pick(&self, options: &[&'static str]) -> &'static str {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        options.choose(&mut *rng).copied().unwrap_or_default()
    }

    pub fn chat_reply(&self) -> &'static str {
        self.pick(&CHAT_REPLIES)
    }

    pub fn journal_prompt(&self) -> &'static str {
        self.pick(&JOURNAL_PROMPTS)
    }

    pub fn reply_delay(&self) -> Duration {
        self.reply_delay
    }

    /// Writes the counterpart reply into `consultation_id`'s thread once the
    /// reply delay has elapsed, unless `token` is cancelled first.
    ///
    /// The consultation id is captured by value, so the reply can only ever land
    /// in the thread it answers. The task yields whether a reply was written.
    pub fn schedule_counterpart_reply(
        &self,
        writes: WriteQueue,
        path: CollectionPath,
        consultation_id: String,
        clock: Arc<Clock>,
        token: CancellationToken,
    ) -> JoinHandle<bool> {
        let delay = self.reply_delay;
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("Pending reply for consultation {} cancelled.", consultation_id);
                    return false;
                }
                _ = tokio::time::sleep(delay) => {}
            }
            if token.is_cancelled() {
                return false;
            }
            let record = ConsultationMessageRecord::new(
                &consultation_id,
                COUNTERPART_REPLY,
                ThreadSender::Counterpart,
                clock.now(),
            );
            let written = writes.create(&path, &record).await.is_some();
            if written {
                info!("Counterpart replied in consultation {}.", consultation_id);
            }
            written
        })
    }
}
