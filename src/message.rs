use serde::{Deserialize, Serialize};

use crate::backend::Backend;

/// Shown in place of a reply when the relay returns an empty array or
/// a final row without a message.
pub const NO_RESPONSE: &str = "(no response)";

/// One row of the relay's wire format. Every endpoint, the history
/// fetch included, answers with a JSON array of these. History rows
/// carry no role and malformed rows may carry no message, so both
/// fields are optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Who a history entry belongs to. Backend replies keep the backend
/// that produced them rather than collapsing into one assistant role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Gpt,
    Gemini,
}

impl Role {
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "gpt" => Some(Role::Gpt),
            "gemini" => Some(Role::Gemini),
            _ => None,
        }
    }
}

impl From<Backend> for Role {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Gpt => Role::Gpt,
            Backend::Gemini => Role::Gemini,
        }
    }
}

/// Reply payloads come in two shapes and the distinction is decided
/// here, once, so the renderer never re-inspects raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text(String),
    CaptionedImage { caption: String, url: String },
}

impl MessageContent {
    /// Image replies arrive as `caption\nurl`; the "http" substring is
    /// the relay's only marker for that shape. The first line is the
    /// caption, the second the URL, anything after is dropped. A
    /// marked reply without a second line gets an empty URL.
    pub fn from_raw(raw: &str) -> Self {
        if raw.contains("http") {
            let mut segments = raw.splitn(3, '\n');
            let caption = segments.next().unwrap_or_default().to_string();
            let url = segments.next().unwrap_or_default().to_string();
            MessageContent::CaptionedImage { caption, url }
        } else {
            MessageContent::Text(raw.to_string())
        }
    }
}

/// One turn of the conversation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    /// The user's own half of an exchange, recorded verbatim at
    /// submission time.
    pub fn user(text: &str) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.to_string()),
        }
    }
}

/// Fold a raw reply array into the single history entry it stands for.
/// The relay appends to a running log and returns the whole log, so
/// only the last row is the actual reply. `selection` is the backend
/// that was active when the send was dispatched; a selection change
/// mid-flight does not re-attribute the reply.
pub fn normalize_reply(reply: &[WireMessage], selection: Backend) -> ChatMessage {
    let raw = reply
        .last()
        .and_then(|row| row.message.as_deref())
        .unwrap_or(NO_RESPONSE);
    ChatMessage {
        role: selection.into(),
        content: MessageContent::from_raw(raw),
    }
}

/// Map the startup history fetch into displayable entries. Rows with
/// no message are dropped; the relay strips roles from history rows,
/// so unattributed rows read as the user's.
pub fn hydrate_history(rows: &[WireMessage]) -> Vec<ChatMessage> {
    rows.iter()
        .filter_map(|row| {
            let raw = row.message.as_deref()?;
            let role = row
                .role
                .as_deref()
                .and_then(Role::from_wire)
                .unwrap_or(Role::User);
            Some(ChatMessage {
                role,
                content: MessageContent::from_raw(raw),
            })
        })
        .collect()
}
