//! System prompts per channel.

use super::{BusinessContext, ChannelKind};

/// Business name used when the widget does not send one.
pub const DEFAULT_BUSINESS_NAME: &str = "Mi Negocio";

/// Build the system instruction for a channel.
///
/// Only the web widget is parameterized by business; WhatsApp requests carry
/// no business context and `business` is ignored for them.
pub fn build_system_prompt(kind: ChannelKind, business: Option<&BusinessContext>) -> String {
    match kind {
        ChannelKind::WebWidget => web_system_prompt(business_name(business)),
        ChannelKind::WhatsApp => whatsapp_system_prompt().to_string(),
    }
}

fn business_name(business: Option<&BusinessContext>) -> &str {
    business
        .and_then(|b| b.name.as_deref())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_BUSINESS_NAME)
}

fn web_system_prompt(business: &str) -> String {
    format!(
        "Eres un asistente de ventas para la empresa {business}.\n\
         Respondes claro y breve, captas datos (nombre, teléfono, email) y ofreces agendar una llamada.\n\
         Si la pregunta no es del negocio, pides reformular."
    )
}

fn whatsapp_system_prompt() -> &'static str {
    "Eres un agente de WhatsApp amable. Pide nombre y teléfono si falta, y ofrece agendar."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn web_prompt_uses_business_name() {
        let business = BusinessContext {
            name: Some("Acme".into()),
        };
        let prompt = build_system_prompt(ChannelKind::WebWidget, Some(&business));
        assert!(prompt.contains("la empresa Acme."));
        assert!(prompt.contains("nombre, teléfono, email"));
        assert!(prompt.contains("agendar una llamada"));
        assert!(prompt.contains("pides reformular"));
    }

    #[test]
    fn web_prompt_defaults_business_name() {
        let absent = build_system_prompt(ChannelKind::WebWidget, None);
        assert!(absent.contains("la empresa Mi Negocio."));

        let nameless = build_system_prompt(
            ChannelKind::WebWidget,
            Some(&BusinessContext { name: None }),
        );
        assert_eq!(nameless, absent);

        let blank = build_system_prompt(
            ChannelKind::WebWidget,
            Some(&BusinessContext {
                name: Some("   ".into()),
            }),
        );
        assert_eq!(blank, absent);
    }

    #[test]
    fn whatsapp_prompt_ignores_business() {
        let business = BusinessContext {
            name: Some("Acme".into()),
        };
        let prompt = build_system_prompt(ChannelKind::WhatsApp, Some(&business));
        assert!(!prompt.contains("Acme"));
        assert!(prompt.contains("WhatsApp"));
        assert!(prompt.contains("nombre y teléfono"));
        assert_eq!(prompt, build_system_prompt(ChannelKind::WhatsApp, None));
    }
}
