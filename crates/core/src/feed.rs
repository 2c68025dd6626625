//! Newline-delimited JSON feed records.
//!
//! ```text
//! {"type":"new_message","id":"m1","author":"ana","message":"hello","timestamp":"2024-05-01T12:00:00Z"}
//! {"type":"stats_update","viewers":1520,"subscribers":48213}
//! {"type":"status","connected":true}
//! {"type":"ink","wet":"#ff4fd8","dry":"#c084fc"}
//! ```

use serde::{Deserialize, Serialize};

use crate::config::InkColors;
use crate::error::{Error, Result};
use crate::message::IncomingMessage;

/// Viewer and subscriber counters pushed by the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsUpdate {
    #[serde(default)]
    pub viewers: u64,
    #[serde(default)]
    pub subscribers: u64,
}

/// One record of the feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedEvent {
    NewMessage(IncomingMessage),
    StatsUpdate(StatsUpdate),
    Status { connected: bool },
    /// Ink for lines opened after this record
    Ink { wet: String, dry: String },
}

impl FeedEvent {
    /// Parse one feed line; blank lines yield `None`
    pub fn parse_line(line: &str) -> Result<Option<Self>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let event: FeedEvent = serde_json::from_str(trimmed)?;
        match &event {
            FeedEvent::NewMessage(message) if message.id.as_str().is_empty() => {
                return Err(Error::Validation("message id must not be empty".to_string()));
            }
            FeedEvent::Ink { wet, dry } => {
                InkColors::new(wet.as_str(), dry.as_str()).validate().map_err(|e| Error::Validation(e.to_string()))?;
            }
            _ => {}
        }
        Ok(Some(event))
    }

    /// The ink carried by an `ink` record
    pub fn ink(&self) -> Option<InkColors> {
        match self {
            FeedEvent::Ink { wet, dry } => Some(InkColors::new(wet.as_str(), dry.as_str())),
            _ => None,
        }
    }
}

/// Format a counter with thousands separators
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
