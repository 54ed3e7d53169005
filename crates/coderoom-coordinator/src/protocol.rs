//! Event contract between the transport layer and the coordinator.
//!
//! Frames are JSON objects tagged by `"type"`. Tag and field names match the
//! browser client's socket events, so they must not be renamed.

use coderoom_common::ConnectionId;
use serde::{Deserialize, Serialize};

/// Inbound events a client may send after connecting.
///
/// `roomId` on relay events is accepted for compatibility but never trusted;
/// the sender's session is always resolved from the connection registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "join", rename_all = "camelCase")]
    Join { room_id: String, user_name: String },

    #[serde(rename = "leaveRoom")]
    LeaveRoom,

    #[serde(rename = "codeChange", rename_all = "camelCase")]
    CodeChange {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_id: Option<String>,
        code: String,
    },

    #[serde(rename = "languageChange", rename_all = "camelCase")]
    LanguageChange {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_id: Option<String>,
        language: String,
    },

    #[serde(rename = "typing", rename_all = "camelCase")]
    Typing {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_id: Option<String>,
        user_name: String,
    },
}

impl ClientEvent {
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Wire name of the event, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientEvent::Join { .. } => "join",
            ClientEvent::LeaveRoom => "leaveRoom",
            ClientEvent::CodeChange { .. } => "codeChange",
            ClientEvent::LanguageChange { .. } => "languageChange",
            ClientEvent::Typing { .. } => "typing",
        }
    }
}

/// Outbound notifications queued to a connection's outbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notification {
    /// Sent once, right after the connection is registered.
    #[serde(rename = "connected", rename_all = "camelCase")]
    Connected { connection_id: ConnectionId },

    /// Roster of the session after a join or leave settled.
    #[serde(rename = "userJoined")]
    RosterChanged { users: Vec<String> },

    #[serde(rename = "codeUpdate")]
    ContentUpdated { code: String },

    #[serde(rename = "languageUpdate")]
    LanguageUpdated { language: String },

    /// Receivers clear the indicator themselves after a quiet window.
    #[serde(rename = "userTyping")]
    TypingNotice { user: String },

    #[serde(rename = "error")]
    Error { message: String },
}

impl Notification {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notification::Error {
            message: message.into(),
        }
    }
}
