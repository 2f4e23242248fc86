//! Request orchestrator — prompt → completion → channel rendering, one shot
//! per inbound request.
//!
//! Holds only injected, read-only collaborators. Nothing is shared between
//! requests, so concurrent requests on different channels cannot affect
//! each other.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::channels::prompt::build_system_prompt;
use crate::channels::web::ChatRequest;
use crate::channels::whatsapp::WhatsAppInbound;
use crate::channels::{BusinessContext, ChannelKind, ChannelReply};
use crate::leads::{LANDING_ORIGIN, Lead, LeadNotifier};
use crate::llm::{ChatMessage, CompletionClient, LlmProvider};

pub struct RequestOrchestrator {
    completion: CompletionClient,
    notifier: Arc<dyn LeadNotifier>,
}

impl RequestOrchestrator {
    pub fn new(llm: Arc<dyn LlmProvider>, notifier: Arc<dyn LeadNotifier>) -> Self {
        Self {
            completion: CompletionClient::new(llm),
            notifier,
        }
    }

    /// Web widget turn: the caller's full history plus optional business.
    pub async fn handle_chat(&self, request: ChatRequest) -> ChannelReply {
        self.converse(
            ChannelKind::WebWidget,
            request.business.as_ref(),
            request.messages,
        )
        .await
    }

    /// WhatsApp turn: the inbound text is the single user message.
    pub async fn handle_whatsapp(&self, inbound: WhatsAppInbound) -> ChannelReply {
        let span = info_span!("whatsapp_inbound", from = inbound.from.as_deref().unwrap_or("-"));
        let history = vec![ChatMessage::user(inbound.text())];
        self.converse(ChannelKind::WhatsApp, None, history)
            .instrument(span)
            .await
    }

    /// Build the channel prompt, call the provider once, render the outcome.
    pub async fn converse(
        &self,
        kind: ChannelKind,
        business: Option<&BusinessContext>,
        history: Vec<ChatMessage>,
    ) -> ChannelReply {
        let request_id = Uuid::new_v4();
        let span = info_span!("converse", %request_id, channel = %kind);

        async {
            info!(messages = history.len(), "Relaying conversation turn");
            let system_prompt = build_system_prompt(kind, business);
            let result = self
                .completion
                .complete(&system_prompt, history, kind.sampling())
                .await;
            let reply = kind.render(result);
            info!(status = %reply.status(), "Channel reply rendered");
            reply
        }
        .instrument(span)
        .await
    }

    /// Landing form lead: build, forward best-effort, always acknowledge.
    pub async fn capture_lead(&self, payload: Value) -> Value {
        let lead = Lead::from_payload(payload, LANDING_ORIGIN);
        info!(
            has_name = lead.name().is_some(),
            has_email = lead.email().is_some(),
            has_phone = lead.phone().is_some(),
            "Lead captured"
        );
        self.notifier.notify(&lead).await;
        json!({ "ok": true })
    }
}
