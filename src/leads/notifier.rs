//! Lead notifier — best-effort forwarding of captured leads.
//!
//! The caller never sees the outcome. Delivery problems are logged here and
//! nowhere else.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, error, info, warn};

use super::model::Lead;
use crate::config::LeadConfig;
use crate::error::{ConfigError, NotifyError};

/// Forwards a captured lead somewhere a human will see it.
#[async_trait]
pub trait LeadNotifier: Send + Sync {
    /// Fire-and-forget delivery. Must not panic and has no observable result.
    async fn notify(&self, lead: &Lead);
}

/// Used when no notification target is configured.
pub struct DisabledNotifier;

#[async_trait]
impl LeadNotifier for DisabledNotifier {
    async fn notify(&self, lead: &Lead) {
        debug!(origin = lead.origin(), "Lead notification target not configured, skipping");
    }
}

/// Forwards leads through a FormSubmit-style email webhook:
/// `POST {base}/ajax/{address}` with the lead as JSON.
pub struct EmailWebhookNotifier {
    target: String,
    endpoint: Url,
    client: reqwest::Client,
}

impl EmailWebhookNotifier {
    pub fn new(admin_email: &str, webhook_base: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            target: admin_email.to_string(),
            endpoint: webhook_endpoint(webhook_base, admin_email)?,
            client: reqwest::Client::new(),
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// One delivery attempt. Returns the webhook's JSON answer, if any.
    pub async fn deliver(&self, lead: &Lead) -> Result<Option<serde_json::Value>, NotifyError> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(lead)
            .send()
            .await
            .map_err(|e| self.failed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                target: self.target.clone(),
                status: status.as_u16(),
                body,
            });
        }

        // The webhook answer is informational only.
        Ok(resp.json::<serde_json::Value>().await.ok())
    }

    fn failed(&self, reason: String) -> NotifyError {
        NotifyError::DeliveryFailed {
            target: self.target.clone(),
            reason,
        }
    }
}

#[async_trait]
impl LeadNotifier for EmailWebhookNotifier {
    async fn notify(&self, lead: &Lead) {
        match self.deliver(lead).await {
            Ok(answer) => info!(
                origin = lead.origin(),
                answer = ?answer,
                "Lead forwarded"
            ),
            Err(e @ NotifyError::Rejected { .. }) => {
                warn!(origin = lead.origin(), error = %e, "Lead webhook rejected notification")
            }
            Err(e) => error!(origin = lead.origin(), error = %e, "Error sending lead"),
        }
    }
}

/// Pick the notifier for the configured lead target.
pub fn notifier_from_config(config: &LeadConfig) -> Result<Arc<dyn LeadNotifier>, ConfigError> {
    Ok(match config.admin_email.as_deref() {
        Some(email) => Arc::new(EmailWebhookNotifier::new(email, &config.webhook_base)?),
        None => Arc::new(DisabledNotifier),
    })
}

/// `{base}/ajax/{address}`, with the address encoded as one path segment.
fn webhook_endpoint(base: &str, email: &str) -> Result<Url, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: "LEAD_WEBHOOK_BASE".to_string(),
        message,
    };

    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| invalid(format!("{base} cannot carry a path")))?
        .pop_if_empty()
        .push("ajax")
        .push(email);
    Ok(url)
}
