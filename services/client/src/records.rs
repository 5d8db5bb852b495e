//! services/client/src/records.rs
//!
//! The "impure" document record structs. Each one mirrors the JSON payload stored
//! in a collection and converts to and from the pure domain types of the core crate.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use wellness_core::domain::{
    Article, ChatMessage, ChatSender, Consultation, ConsultationMessage, ConsultationStatus,
    GratitudeEntry, Goal, JournalEntry, Mood, MoodEntry, ThreadSender,
};
use wellness_core::ports::{Collection, Direction, Document};

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("document {id} could not be decoded: {reason}")]
    Decode { id: String, reason: String },
    #[error("payload could not be encoded: {0}")]
    Encode(String),
}

/// A domain entity that lives in one collection and renders in a fixed order.
pub trait Record: Sized + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    /// The ordering key. Entries sharing a key keep their snapshot order.
    type Key: Ord;

    fn from_document(doc: &Document) -> Result<Self, RecordError>;

    fn id(&self) -> &str;

    fn sort_key(&self) -> Self::Key;

    fn direction() -> Direction {
        Self::COLLECTION.ordering().direction
    }
}

fn decode<T: DeserializeOwned>(doc: &Document) -> Result<T, RecordError> {
    serde_json::from_value(doc.data.clone()).map_err(|e| RecordError::Decode {
        id: doc.id.clone(),
        reason: e.to_string(),
    })
}

/// A record that can be written as a document payload.
pub trait Payload: Serialize {
    fn to_payload(&self) -> Result<Value, RecordError> {
        serde_json::to_value(self).map_err(|e| RecordError::Encode(e.to_string()))
    }
}

/// Instants are written with a fixed microsecond precision so that their string
/// form sorts the same way the instants do.
mod rfc3339_micros {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(instant: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_instant(*instant))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(d)
    }
}

/// Renders an instant the way record payloads store it.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

//=========================================================================================
// Moods, Journal, Gratitude
//=========================================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodRecord {
    pub mood: String,
    #[serde(default)]
    pub mood_score: Option<u8>,
    pub date: NaiveDate,
    #[serde(alias = "timestamp", with = "rfc3339_micros")]
    pub created_at: DateTime<Utc>,
}

impl MoodRecord {
    pub fn new(mood: Mood, now: DateTime<Utc>) -> Self {
        Self {
            mood: mood.as_str().to_string(),
            mood_score: Some(mood.score()),
            date: now.date_naive(),
            created_at: now,
        }
    }
}

impl Payload for MoodRecord {}

impl Record for MoodEntry {
    const COLLECTION: Collection = Collection::Moods;
    type Key = (NaiveDate, DateTime<Utc>);

    fn from_document(doc: &Document) -> Result<Self, RecordError> {
        let record: MoodRecord = decode(doc)?;
        let mood = Mood::from_name(&record.mood).ok_or_else(|| RecordError::Decode {
            id: doc.id.clone(),
            reason: format!("unknown mood '{}'", record.mood),
        })?;
        Ok(MoodEntry {
            id: doc.id.clone(),
            mood,
            mood_score: record.mood_score.unwrap_or_else(|| mood.score()),
            date: record.date,
            created_at: record.created_at,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_key(&self) -> Self::Key {
        (self.date, self.created_at)
    }
}

/// Shared shape of journal and gratitude entries.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatedTextRecord {
    pub content: String,
    pub date: NaiveDate,
    #[serde(alias = "timestamp", with = "rfc3339_micros")]
    pub created_at: DateTime<Utc>,
}

impl DatedTextRecord {
    pub fn new(content: &str, now: DateTime<Utc>) -> Self {
        Self {
            content: content.to_string(),
            date: now.date_naive(),
            created_at: now,
        }
    }
}

impl Payload for DatedTextRecord {}

impl Record for JournalEntry {
    const COLLECTION: Collection = Collection::JournalEntries;
    type Key = (NaiveDate, DateTime<Utc>);

    fn from_document(doc: &Document) -> Result<Self, RecordError> {
        let record: DatedTextRecord = decode(doc)?;
        Ok(JournalEntry {
            id: doc.id.clone(),
            content: record.content,
            date: record.date,
            created_at: record.created_at,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_key(&self) -> Self::Key {
        (self.date, self.created_at)
    }
}

impl Record for GratitudeEntry {
    const COLLECTION: Collection = Collection::GratitudeEntries;
    type Key = (NaiveDate, DateTime<Utc>);

    fn from_document(doc: &Document) -> Result<Self, RecordError> {
        let record: DatedTextRecord = decode(doc)?;
        Ok(GratitudeEntry {
            id: doc.id.clone(),
            content: record.content,
            date: record.date,
            created_at: record.created_at,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_key(&self) -> Self::Key {
        (self.date, self.created_at)
    }
}

//=========================================================================================
// Goals
//=========================================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRecord {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(with = "rfc3339_micros")]
    pub created_at: DateTime<Utc>,
}

impl GoalRecord {
    pub fn new(title: &str, now: DateTime<Utc>) -> Self {
        Self { title: title.to_string(), completed: false, created_at: now }
    }
}

impl Payload for GoalRecord {}

/// The partial update that sets a goal's completion flag.
pub fn goal_completion_patch(completed: bool) -> Value {
    serde_json::json!({ "completed": completed })
}

impl Record for Goal {
    const COLLECTION: Collection = Collection::Goals;
    type Key = DateTime<Utc>;

    fn from_document(doc: &Document) -> Result<Self, RecordError> {
        let record: GoalRecord = decode(doc)?;
        Ok(Goal {
            id: doc.id.clone(),
            title: record.title,
            completed: record.completed,
            created_at: record.created_at,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_key(&self) -> Self::Key {
        self.created_at
    }
}

//=========================================================================================
// Chat
//=========================================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSenderRecord {
    User,
    #[serde(alias = "ai")]
    Assistant,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessageRecord {
    pub content: String,
    pub sender: ChatSenderRecord,
    #[serde(with = "rfc3339_micros")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessageRecord {
    pub fn new(content: &str, sender: ChatSender, now: DateTime<Utc>) -> Self {
        let sender = match sender {
            ChatSender::User => ChatSenderRecord::User,
            ChatSender::Assistant => ChatSenderRecord::Assistant,
        };
        Self { content: content.to_string(), sender, timestamp: now }
    }
}

impl Payload for ChatMessageRecord {}

impl Record for ChatMessage {
    const COLLECTION: Collection = Collection::ChatMessages;
    type Key = DateTime<Utc>;

    fn from_document(doc: &Document) -> Result<Self, RecordError> {
        let record: ChatMessageRecord = decode(doc)?;
        Ok(ChatMessage {
            id: doc.id.clone(),
            content: record.content,
            sender: match record.sender {
                ChatSenderRecord::User => ChatSender::User,
                ChatSenderRecord::Assistant => ChatSender::Assistant,
            },
            timestamp: record.timestamp,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_key(&self) -> Self::Key {
        self.timestamp
    }
}

//=========================================================================================
// Consultations
//=========================================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsultationStatusRecord {
    Scheduled,
    Active,
    Closed,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationRecord {
    pub therapist_name: String,
    pub status: ConsultationStatusRecord,
    #[serde(with = "rfc3339_micros")]
    pub date: DateTime<Utc>,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ConsultationRecord {
    /// A fresh booking with the default therapist and slot.
    pub fn booking(now: DateTime<Utc>) -> Self {
        Self {
            therapist_name: "Dr. Alex Morgan".to_string(),
            status: ConsultationStatusRecord::Scheduled,
            date: now,
            time: "2:00 PM".to_string(),
            kind: "Private Session".to_string(),
        }
    }
}

impl Payload for ConsultationRecord {}

impl Record for Consultation {
    const COLLECTION: Collection = Collection::Consultations;
    type Key = DateTime<Utc>;

    fn from_document(doc: &Document) -> Result<Self, RecordError> {
        let record: ConsultationRecord = decode(doc)?;
        Ok(Consultation {
            id: doc.id.clone(),
            therapist_name: record.therapist_name,
            status: match record.status {
                ConsultationStatusRecord::Scheduled => ConsultationStatus::Scheduled,
                ConsultationStatusRecord::Active => ConsultationStatus::Active,
                ConsultationStatusRecord::Closed => ConsultationStatus::Closed,
            },
            date: record.date,
            time: record.time,
            kind: record.kind,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_key(&self) -> Self::Key {
        self.date
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadSenderRecord {
    User,
    #[serde(alias = "therapist")]
    Counterpart,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationMessageRecord {
    pub consultation_id: String,
    pub content: String,
    pub sender: ThreadSenderRecord,
    #[serde(with = "rfc3339_micros")]
    pub timestamp: DateTime<Utc>,
}

impl ConsultationMessageRecord {
    pub fn new(
        consultation_id: &str,
        content: &str,
        sender: ThreadSender,
        now: DateTime<Utc>,
    ) -> Self {
        let sender = match sender {
            ThreadSender::User => ThreadSenderRecord::User,
            ThreadSender::Counterpart => ThreadSenderRecord::Counterpart,
        };
        Self {
            consultation_id: consultation_id.to_string(),
            content: content.to_string(),
            sender,
            timestamp: now,
        }
    }
}

impl Payload for ConsultationMessageRecord {}

impl Record for ConsultationMessage {
    const COLLECTION: Collection = Collection::ConsultationMessages;
    type Key = DateTime<Utc>;

    fn from_document(doc: &Document) -> Result<Self, RecordError> {
        let record: ConsultationMessageRecord = decode(doc)?;
        Ok(ConsultationMessage {
            id: doc.id.clone(),
            consultation_id: record.consultation_id,
            content: record.content,
            sender: match record.sender {
                ThreadSenderRecord::User => ThreadSender::User,
                ThreadSenderRecord::Counterpart => ThreadSender::Counterpart,
            },
            timestamp: record.timestamp,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_key(&self) -> Self::Key {
        self.timestamp
    }
}

//=========================================================================================
// Articles
//=========================================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub author: String,
    pub date: NaiveDate,
    pub read_time: String,
}

impl Payload for ArticleRecord {}

impl Record for Article {
    const COLLECTION: Collection = Collection::Articles;
    type Key = NaiveDate;

    fn from_document(doc: &Document) -> Result<Self, RecordError> {
        let record: ArticleRecord = decode(doc)?;
        Ok(Article {
            id: doc.id.clone(),
            title: record.title,
            summary: record.summary,
            content: record.content,
            author: record.author,
            date: record.date,
            read_time: record.read_time,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_key(&self) -> Self::Key {
        self.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, data: Value) -> Document {
        Document { id: id.to_string(), data }
    }

    #[test]
    fn mood_payload_carries_score_and_calendar_day() {
        let now = "2026-03-04T10:15:30.5Z".parse::<DateTime<Utc>>().unwrap();
        let payload = MoodRecord::new(Mood::Anxious, now).to_payload().unwrap();

        assert_eq!(payload["mood"], "anxious");
        assert_eq!(payload["moodScore"], 2);
        assert_eq!(payload["date"], "2026-03-04");
        assert_eq!(payload["createdAt"], "2026-03-04T10:15:30.500000Z");
    }

    #[test]
    fn legacy_documents_decode() {
        let mood = MoodEntry::from_document(&doc(
            "m1",
            json!({ "mood": "calm", "moodScore": 4, "date": "2024-01-02",
                    "timestamp": "2024-01-02T08:00:00.000Z" }),
        ))
        .unwrap();
        assert_eq!(mood.mood, Mood::Calm);
        assert_eq!(mood.id, "m1");

        let chat = ChatMessage::from_document(&doc(
            "c1",
            json!({ "content": "hi", "sender": "ai", "timestamp": "2024-01-02T08:00:00Z" }),
        ))
        .unwrap();
        assert_eq!(chat.sender, ChatSender::Assistant);

        let reply = ConsultationMessage::from_document(&doc(
            "t1",
            json!({ "consultationId": "k1", "content": "ok", "sender": "therapist",
                    "timestamp": "2024-01-02T08:00:00Z" }),
        ))
        .unwrap();
        assert_eq!(reply.sender, ThreadSender::Counterpart);
        assert_eq!(reply.consultation_id, "k1");
    }

    #[test]
    fn unknown_mood_is_a_decode_error() {
        let err = MoodEntry::from_document(&doc(
            "bad",
            json!({ "mood": "elated", "date": "2024-01-02", "createdAt": "2024-01-02T08:00:00Z" }),
        ))
        .unwrap_err();
        assert!(matches!(err, RecordError::Decode { id, .. } if id == "bad"));
    }

    #[test]
    fn booking_uses_wire_field_names() {
        let now = Utc::now();
        let payload = ConsultationRecord::booking(now).to_payload().unwrap();
        assert_eq!(payload["therapistName"], "Dr. Alex Morgan");
        assert_eq!(payload["status"], "scheduled");
        assert_eq!(payload["type"], "Private Session");
        assert_eq!(payload["time"], "2:00 PM");
    }
}
