//! Error types for the relay.

/// Top-level error type for the relay.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Completion provider errors.
///
/// All of these are caught at the completion boundary and turned into a
/// channel fallback; none of them reach the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} unavailable: {reason}")]
    ProviderUnavailable { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Missing API key for provider {provider}")]
    MissingCredentials { provider: String },
}

/// Lead notification errors. Logged by the notifier, never surfaced.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Lead delivery to {target} failed: {reason}")]
    DeliveryFailed { target: String, reason: String },

    #[error("Lead webhook for {target} answered HTTP {status}: {body}")]
    Rejected {
        target: String,
        status: u16,
        body: String,
    },
}

/// Result type alias for the relay.
pub type Result<T> = std::result::Result<T, Error>;
