use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::api::models::Message;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseData {
    pub id: String,
}

/// Payload of a webhook event, tagged as `{"type": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    NewMessage(Message),
    CloseConversation(CloseData),
}

/// An event posted to `/webhook/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(flatten)]
    pub kind: EventKind,
    #[serde(serialize_with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
}

fn iso_millis<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl WebhookEvent {
    pub fn new_message(message: Message) -> Self {
        Self { kind: EventKind::NewMessage(message), timestamp: Utc::now() }
    }

    pub fn close_conversation(id: &str) -> Self {
        Self {
            kind: EventKind::CloseConversation(CloseData { id: id.to_string() }),
            timestamp: Utc::now(),
        }
    }

    /// Id of the conversation this event targets.
    pub fn conversation_id(&self) -> &str {
        match &self.kind {
            EventKind::NewMessage(m) => &m.conversation_id,
            EventKind::CloseConversation(c) => &c.id,
        }
    }
}
