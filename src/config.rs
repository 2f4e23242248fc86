//! Configuration types.
//!
//! Everything is read once at process start. Handlers never look at the
//! environment; they receive what they need through injected state.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default completion model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default OpenAI-compatible API base.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Default base URL of the lead forwarding webhook.
pub const DEFAULT_LEAD_WEBHOOK_BASE: &str = "https://formsubmit.co";
/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Completion provider settings.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API key. `None` is allowed; requests then fail with missing credentials.
    pub api_key: Option<SecretString>,
    pub model: String,
    pub base_url: String,
}

/// Where captured leads are forwarded.
#[derive(Debug, Clone)]
pub struct LeadConfig {
    /// Address that receives lead notifications. `None` disables forwarding.
    pub admin_email: Option<String>,
    pub webhook_base: String,
}

/// Messaging provider account credentials for the WhatsApp webhook.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: SecretString,
}

/// Full relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub provider: ProviderConfig,
    pub leads: LeadConfig,
    /// Present only when both account SID and auth token are set.
    pub twilio: Option<TwilioConfig>,
    /// Allowed cross-origin sources. Empty or `*` means any origin.
    pub cors_origins: Vec<String>,
    pub port: u16,
    /// Directory served as static fallback, if it should be served at all.
    pub static_dir: Option<PathBuf>,
}

impl RelayConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = ProviderConfig {
            api_key: non_empty("OPENAI_API_KEY").map(SecretString::from),
            model: non_empty("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: non_empty("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
        };

        let leads = LeadConfig {
            admin_email: non_empty("ADMIN_EMAIL"),
            webhook_base: non_empty("LEAD_WEBHOOK_BASE")
                .unwrap_or_else(|| DEFAULT_LEAD_WEBHOOK_BASE.to_string()),
        };

        let twilio = match (non_empty("TWILIO_ACCOUNT_SID"), non_empty("TWILIO_AUTH_TOKEN")) {
            (Some(account_sid), Some(token)) => Some(TwilioConfig {
                account_sid,
                auth_token: SecretString::from(token),
            }),
            _ => None,
        };

        let cors_origins: Vec<String> = lookup("CORS_ORIGIN")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let port = match non_empty("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "PORT".to_string(),
                    message: format!("{raw:?}: {e}"),
                })?,
            None => DEFAULT_PORT,
        };

        let static_dir = match lookup("STATIC_DIR") {
            Some(dir) if dir.trim().is_empty() => None,
            Some(dir) => Some(PathBuf::from(dir)),
            None => Some(PathBuf::from("public")),
        };

        Ok(Self {
            provider,
            leads,
            twilio,
            cors_origins,
            port,
            static_dir,
        })
    }

    /// Whether the completion provider key is configured.
    pub fn has_provider_key(&self) -> bool {
        self.provider.api_key.is_some()
    }
}

/// Optional surfaces, resolved once at startup and passed to router composition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Mount `POST /webhooks/whatsapp`.
    pub whatsapp: bool,
}

impl FeatureFlags {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            whatsapp: config.twilio.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<RelayConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RelayConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();
        assert!(!config.has_provider_key());
        assert_eq!(config.provider.model, DEFAULT_MODEL);
        assert_eq!(config.provider.base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(config.leads.admin_email, None);
        assert_eq!(config.leads.webhook_base, DEFAULT_LEAD_WEBHOOK_BASE);
        assert!(config.twilio.is_none());
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.static_dir, Some(PathBuf::from("public")));
        assert!(!FeatureFlags::from_config(&config).whatsapp);
    }

    #[test]
    fn reads_provider_and_lead_settings() {
        let config = config_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("ADMIN_EMAIL", "owner@example.com"),
            ("PORT", "8081"),
        ])
        .unwrap();
        assert_eq!(
            config.provider.api_key.as_ref().unwrap().expose_secret(),
            "sk-test"
        );
        assert_eq!(config.provider.model, "gpt-4o");
        assert_eq!(config.leads.admin_email.as_deref(), Some("owner@example.com"));
        assert_eq!(config.port, 8081);
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = config_from(&[("OPENAI_API_KEY", "  ")]).unwrap();
        assert!(!config.has_provider_key());
    }

    #[test]
    fn whatsapp_flag_needs_both_twilio_credentials() {
        let only_sid = config_from(&[("TWILIO_ACCOUNT_SID", "AC123")]).unwrap();
        assert!(!FeatureFlags::from_config(&only_sid).whatsapp);

        let only_token = config_from(&[("TWILIO_AUTH_TOKEN", "secret")]).unwrap();
        assert!(!FeatureFlags::from_config(&only_token).whatsapp);

        let both = config_from(&[
            ("TWILIO_ACCOUNT_SID", "AC123"),
            ("TWILIO_AUTH_TOKEN", "secret"),
        ])
        .unwrap();
        assert!(FeatureFlags::from_config(&both).whatsapp);
        assert_eq!(both.twilio.unwrap().account_sid, "AC123");
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let config = config_from(&[(
            "CORS_ORIGIN",
            "https://a.example, https://b.example ,,",
        )])
        .unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "PORT"));
    }

    #[test]
    fn empty_static_dir_disables_static_files() {
        let config = config_from(&[("STATIC_DIR", "")]).unwrap();
        assert_eq!(config.static_dir, None);
    }
}
