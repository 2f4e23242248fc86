//! Channel abstraction: prompt style, sampling and wire format per surface.

pub mod prompt;
pub mod web;
pub mod whatsapp;

use std::fmt;

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::llm::{CompletionResult, SamplingParams};

/// Conversational surfaces served by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    WebWidget,
    WhatsApp,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::WebWidget => "web",
            ChannelKind::WhatsApp => "whatsapp",
        }
    }

    /// Fixed sampling parameters, chosen to bound latency and cost.
    pub fn sampling(&self) -> SamplingParams {
        match self {
            ChannelKind::WebWidget => SamplingParams {
                temperature: 0.6,
                max_tokens: 300,
            },
            ChannelKind::WhatsApp => SamplingParams {
                temperature: 0.6,
                max_tokens: 250,
            },
        }
    }

    /// Convert a completion outcome into this channel's wire payload.
    pub fn render(&self, result: CompletionResult) -> ChannelReply {
        match self {
            ChannelKind::WebWidget => web::render(result),
            ChannelKind::WhatsApp => whatsapp::render(result),
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business the web widget is embedded for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BusinessContext {
    #[serde(default)]
    pub name: Option<String>,
}

/// A rendered channel payload, ready to hand to the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelReply {
    Json {
        status: StatusCode,
        body: serde_json::Value,
    },
    /// TwiML document; always sent as `200 text/xml`.
    Twiml(String),
}

impl ChannelReply {
    pub fn status(&self) -> StatusCode {
        match self {
            ChannelReply::Json { status, .. } => *status,
            ChannelReply::Twiml(_) => StatusCode::OK,
        }
    }
}

impl IntoResponse for ChannelReply {
    fn into_response(self) -> Response {
        match self {
            ChannelReply::Json { status, body } => (status, axum::Json(body)).into_response(),
            ChannelReply::Twiml(xml) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/xml")],
                xml,
            )
                .into_response(),
        }
    }
}
