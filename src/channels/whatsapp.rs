//! WhatsApp webhook wire format: a TwiML envelope with exactly one `<Message>`.
//!
//! Every outcome renders as XML with status 200 so the messaging provider
//! neither retries nor drops the conversation.

use serde::Deserialize;

use super::ChannelReply;
use crate::llm::CompletionResult;

/// Sent when the model answers with nothing.
pub const INTRO_PROMPT: &str = "Soy tu asistente virtual. Puedo ayudarte 24/7. ¿Cómo te llamas?";
/// Sent when the provider fails.
pub const APOLOGY: &str = "Ahora mismo no puedo responder, lo siento.";

/// Form fields posted by the messaging provider's webhook.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WhatsAppInbound {
    #[serde(rename = "Body", default)]
    pub body: Option<String>,
    #[serde(rename = "From", default)]
    pub from: Option<String>,
}

impl WhatsAppInbound {
    /// The user's text, trimmed. Missing body is treated as empty.
    pub fn text(&self) -> &str {
        self.body.as_deref().map(str::trim).unwrap_or("")
    }
}

pub fn render(result: CompletionResult) -> ChannelReply {
    let text = match &result {
        Ok(reply) if reply.trim().is_empty() => INTRO_PROMPT,
        Ok(reply) => reply.as_str(),
        Err(_) => APOLOGY,
    };
    ChannelReply::Twiml(twiml_message(text))
}

/// Wrap `text` in a single-message TwiML response.
pub fn twiml_message(text: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Response>\n<Message>{}</Message>\n</Response>",
        xml_escape(text)
    )
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // Control characters other than tab/newline/CR are not legal in XML 1.0.
            c if c.is_control() && !matches!(c, '\t' | '\n' | '\r') => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;

    fn xml(reply: ChannelReply) -> String {
        match reply {
            ChannelReply::Twiml(xml) => xml,
            other => panic!("expected TwiML, got {other:?}"),
        }
    }

    #[test]
    fn success_wraps_reply_in_single_message() {
        let body = xml(render(Ok("Hola, ¿en qué te ayudo?".into())));
        assert!(body.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(body.contains("<Message>Hola, ¿en qué te ayudo?</Message>"));
        assert_eq!(body.matches("<Message>").count(), 1);
        assert_eq!(body.matches("</Message>").count(), 1);
    }

    #[test]
    fn empty_reply_uses_intro_prompt() {
        let body = xml(render(Ok(String::new())));
        assert!(body.contains(INTRO_PROMPT));

        let body = xml(render(Ok("  \n ".into())));
        assert!(body.contains(INTRO_PROMPT));
    }

    #[test]
    fn failure_uses_apology() {
        let body = xml(render(Err(LlmError::MissingCredentials {
            provider: "openai".into(),
        })));
        assert!(body.contains(&format!("<Message>{APOLOGY}</Message>")));
        assert!(!body.contains("openai"));
    }

    #[test]
    fn reply_markup_is_escaped() {
        let body = xml(render(Ok("<b>Tom & Jerry</b> say \"hi\"".into())));
        assert!(body.contains("&lt;b&gt;Tom &amp; Jerry&lt;/b&gt; say &quot;hi&quot;"));
        assert_eq!(body.matches("<Message>").count(), 1);
    }

    #[test]
    fn escape_drops_illegal_control_chars() {
        assert_eq!(xml_escape("a\u{0}b\tc\n"), "ab\tc\n");
    }

    #[test]
    fn inbound_text_is_trimmed() {
        let inbound = WhatsAppInbound {
            body: Some("  hola  ".into()),
            from: Some("whatsapp:+34600000000".into()),
        };
        assert_eq!(inbound.text(), "hola");
        assert_eq!(WhatsAppInbound::default().text(), "");
    }
}
