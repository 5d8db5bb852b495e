//! crates/wellness_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any document store or serialization format.

use chrono::{DateTime, NaiveDate, Utc};

/// The authenticated or anonymous identity that scopes private collections.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Session {
    pub id: String,
    pub anonymous: bool,
}

//=========================================================================================
// Moods & Journal
//=========================================================================================

/// The fixed set of moods a user can log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Happy,
    Calm,
    Anxious,
    Stressed,
    Sad,
}

impl Mood {
    pub const ALL: [Mood; 5] = [Mood::Happy, Mood::Calm, Mood::Anxious, Mood::Stressed, Mood::Sad];

    /// The 1-5 score stored alongside the mood. Anxious and stressed share a score.
    pub fn score(self) -> u8 {
        match self {
            Mood::Happy => 5,
            Mood::Calm => 4,
            Mood::Anxious => 2,
            Mood::Stressed => 2,
            Mood::Sad => 1,
        }
    }

    /// The identifier used in stored documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Calm => "calm",
            Mood::Anxious => "anxious",
            Mood::Stressed => "stressed",
            Mood::Sad => "sad",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Calm => "Calm",
            Mood::Anxious => "Anxious",
            Mood::Stressed => "Stressed",
            Mood::Sad => "Sad",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Mood::ALL.into_iter().find(|m| m.as_str() == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoodEntry {
    pub id: String,
    pub mood: Mood,
    pub mood_score: u8,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub id: String,
    pub content: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GratitudeEntry {
    pub id: String,
    pub content: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

//=========================================================================================
// Goals
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    /// The value `completed` takes after one toggle.
    pub fn toggled(&self) -> bool {
        !self.completed
    }
}

/// Completed versus total goals, as shown on the dashboard and the goals page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GoalProgress {
    pub completed: usize,
    pub total: usize,
}

impl GoalProgress {
    pub fn from_goals(goals: &[Goal]) -> Self {
        Self {
            completed: goals.iter().filter(|g| g.completed).count(),
            total: goals.len(),
        }
    }

    /// `completed / total`, or 0 when there are no goals.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

//=========================================================================================
// Chat & Consultations
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatSender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub sender: ChatSender,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsultationStatus {
    Scheduled,
    Active,
    Closed,
}

/// A booked session with a therapist. Selecting one opens its message thread.
#[derive(Debug, Clone, PartialEq)]
pub struct Consultation {
    pub id: String,
    pub therapist_name: String,
    pub status: ConsultationStatus,
    pub date: DateTime<Utc>,
    pub time: String,
    pub kind: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadSender {
    User,
    Counterpart,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsultationMessage {
    pub id: String,
    pub consultation_id: String,
    pub content: String,
    pub sender: ThreadSender,
    pub timestamp: DateTime<Utc>,
}

//=========================================================================================
// Articles (shared, not session-scoped)
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub author: String,
    pub date: NaiveDate,
    pub read_time: String,
}
