use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub alert_id: String,
    pub message: String,
    pub timestamp: NaiveDateTime,
    pub acknowledged: bool,
}

/// One payload pushed over the live channel.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveMessage {
    Notification(Notification),
    Raw(String),
}

impl LiveMessage {
    pub fn parse(payload: &str) -> Self {
        match serde_json::from_str::<Notification>(payload) {
            Ok(n) => LiveMessage::Notification(n),
            Err(_) => LiveMessage::Raw(payload.to_string()),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            LiveMessage::Notification(n) => &n.message,
            LiveMessage::Raw(s) => s,
        }
    }
}

impl fmt::Display for LiveMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
