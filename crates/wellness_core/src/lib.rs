pub mod domain;
pub mod ports;

pub use domain::{
    Article, ChatMessage, ChatSender, Consultation, ConsultationMessage, ConsultationStatus,
    GratitudeEntry, Goal, GoalProgress, JournalEntry, Mood, MoodEntry, Session, ThreadSender,
};
pub use ports::{
    Collection, CollectionPath, Direction, Document, DocumentStore, FieldFilter, OrderBy,
    PortError, PortResult, Query, SessionProvider, Snapshot, SnapshotStream,
};
