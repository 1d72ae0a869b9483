//! Chat assistant messages.
//!
//! The chat endpoint returns assistant messages split into parts. Text parts carry prose; tool
//! invocation parts carry the arguments and, once finished, the result of a tool the assistant
//! called on the server side. The dashboard renders both but never executes tools itself.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// Lifecycle of a tool invocation within a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ToolState {
    PartialCall,
    Call,
    Result,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocation {
    pub tool_call_id: String,
    pub tool_name: String,
    #[serde(default)]
    pub args: Value,
    pub state: ToolState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// One part of a message.
///
/// Parts of any other type (reasoning, step markers, sources) are kept verbatim so the history
/// sent back on the next turn matches what the assistant produced.
#[derive(Debug, Clone, PartialEq)]
pub enum MessagePart {
    Text { text: String },
    ToolInvocation { tool_invocation: ToolInvocation },
    Other(Value),
}

const TEXT_PART: &str = "text";
const TOOL_INVOCATION_PART: &str = "tool-invocation";

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum KnownPart {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    ToolInvocation { tool_invocation: ToolInvocation },
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum KnownPartRef<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    ToolInvocation { tool_invocation: &'a ToolInvocation },
}

impl Serialize for MessagePart {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MessagePart::Text { text } => KnownPartRef::Text { text }.serialize(serializer),
            MessagePart::ToolInvocation { tool_invocation } => {
                KnownPartRef::ToolInvocation { tool_invocation }.serialize(serializer)
            }
            MessagePart::Other(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for MessagePart {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let known = matches!(
            raw.get("type").and_then(Value::as_str),
            Some(TEXT_PART) | Some(TOOL_INVOCATION_PART)
        );
        if !known {
            return Ok(MessagePart::Other(raw));
        }
        let part = serde_json::from_value(raw).map_err(serde::de::Error::custom)?;
        Ok(match part {
            KnownPart::Text { text } => MessagePart::Text { text },
            KnownPart::ToolInvocation { tool_invocation } => {
                MessagePart::ToolInvocation { tool_invocation }
            }
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<MessagePart>,
}

impl ChatMessage {
    /// A new user message with a random id.
    pub fn user(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            role: ChatRole::User,
            parts: vec![MessagePart::Text {
                text: content.clone(),
            }],
            content,
        }
    }

    /// Tool invocations in the order they appear.
    pub fn tool_invocations(&self) -> impl Iterator<Item = &ToolInvocation> {
        self.parts.iter().filter_map(|part| match part {
            MessagePart::ToolInvocation { tool_invocation } => Some(tool_invocation),
            _ => None,
        })
    }

    /// Concatenated text parts, or `content` when the message has no text parts.
    pub fn text(&self) -> String {
        let texts: Vec<&str> = self
            .parts
            .iter()
            .filter_map(|part| match part {
                MessagePart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        if texts.is_empty() {
            self.content.clone()
        } else {
            texts.join("\n")
        }
    }
}

/// Body of `POST /chat`: the whole conversation so far.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatReq {
    pub messages: Vec<ChatMessage>,
}

/// Response of `POST /chat`: the assistant's reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRes {
    pub message: ChatMessage,
}
