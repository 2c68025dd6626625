use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::InkColors;

/// Unique identifier of a feed message
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A message as delivered by the feed
///
/// Immutable once ingested. `received_at` defaults to the moment the record was
/// parsed when the feed does not carry a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: MessageId,
    #[serde(default)]
    pub author: String,
    #[serde(alias = "message", default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(alias = "timestamp", default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl IncomingMessage {
    pub fn new(id: impl Into<MessageId>, author: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), author: author.into(), text: text.into(), thumbnail: None, received_at: Utc::now() }
    }

    /// Line typed when the page first comes up
    pub fn boot(text: impl Into<String>) -> Self {
        Self::new("init", "System", text)
    }

    /// Message injected by the debug key
    pub fn debug_probe() -> Self {
        let id = format!("debug-{}", Utc::now().timestamp_millis());
        Self::new(id, "System", "Debug Message check 123...")
    }

    pub fn with_received_at(mut self, received_at: DateTime<Utc>) -> Self {
        self.received_at = received_at;
        self
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// A line on the page
///
/// While open, `text` is the revealed prefix of the message. Once closed it never
/// changes again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub id: MessageId,
    pub author: String,
    pub text: String,
    pub ink: InkColors,
    /// Set when the line was cut at the right edge
    #[serde(default)]
    pub truncated: bool,
}

impl Line {
    /// Open a new, empty line for `message` stamped with the current ink
    pub fn open(message: &IncomingMessage, ink: &InkColors) -> Self {
        Self {
            id: message.id.clone(),
            author: message.author.clone(),
            text: String::new(),
            ink: ink.clone(),
            truncated: false,
        }
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incoming_message_accepts_message_alias() {
        let json = r#"{"id":"m1","author":"ana","message":"hi there","timestamp":"2024-05-01T12:00:00Z"}"#;
        let msg: IncomingMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id.as_str(), "m1");
        assert_eq!(msg.text, "hi there");
        assert_eq!(msg.received_at.to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }

    #[test]
    fn test_incoming_message_defaults_timestamp() {
        let before = Utc::now();
        let msg: IncomingMessage = serde_json::from_str(r#"{"id":"m2","text":"x"}"#).unwrap();
        assert!(msg.received_at >= before);
        assert_eq!(msg.author, "");
        assert!(msg.thumbnail.is_none());
    }

    #[test]
    fn test_incoming_message_requires_id() {
        assert!(serde_json::from_str::<IncomingMessage>(r#"{"text":"x"}"#).is_err());
    }

    #[test]
    fn test_char_count_is_unicode_aware() {
        let msg = IncomingMessage::new("u", "a", "héllo ✎");
        assert_eq!(msg.char_count(), 7);
    }

    #[test]
    fn test_boot_and_debug_messages() {
        let boot = IncomingMessage::boot("SYSTEM ONLINE");
        assert_eq!(boot.id.as_str(), "init");
        assert_eq!(boot.author, "System");

        let debug = IncomingMessage::debug_probe();
        assert!(debug.id.as_str().starts_with("debug-"));
        assert_eq!(debug.text, "Debug Message check 123...");
    }

    #[test]
    fn test_line_open_stamps_ink() {
        let msg = IncomingMessage::new("a", "bob", "HELLO");
        let ink = InkColors::new("#ff0000", "#00ff00");
        let line = Line::open(&msg, &ink);
        assert_eq!(line.id, msg.id);
        assert_eq!(line.text, "");
        assert_eq!(line.ink, ink);
        assert!(!line.truncated);
    }
}
