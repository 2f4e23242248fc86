//! Web chat widget wire format: `{reply}` on success, `{error}` with 500 on failure.

use axum::http::StatusCode;
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};

use super::{BusinessContext, ChannelReply};
use crate::llm::{ChatMessage, CompletionResult};

/// Reply used when the provider answers without text.
pub const EMPTY_REPLY: &str = "…";
/// Error shown to widget users. The underlying cause is never sent.
pub const CHAT_FAILURE: &str = "Fallo en el chat";

/// `POST /api/chat` body.
///
/// `messages: null` is an empty history. A `business` that is not an object
/// with a string `name` is treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub messages: Vec<ChatMessage>,
    #[serde(default, deserialize_with = "lenient_business")]
    pub business: Option<BusinessContext>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ChatMessage>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ChatMessage>>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_business<'de, D>(deserializer: D) -> Result<Option<BusinessContext>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

pub fn render(result: CompletionResult) -> ChannelReply {
    match result {
        Ok(reply) => {
            let reply = if reply.is_empty() {
                EMPTY_REPLY.to_string()
            } else {
                reply
            };
            ChannelReply::Json {
                status: StatusCode::OK,
                body: json!({ "reply": reply }),
            }
        }
        Err(_) => failure(),
    }
}

/// The generic failure payload, also used for unreadable request bodies.
pub fn failure() -> ChannelReply {
    ChannelReply::Json {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: json!({ "error": CHAT_FAILURE }),
    }
}
