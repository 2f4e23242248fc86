use std::sync::Arc;

use chat_relay::config::{FeatureFlags, RelayConfig};
use chat_relay::leads::notifier_from_config;
use chat_relay::llm::create_provider;
use chat_relay::relay::{RequestOrchestrator, RouterOptions, relay_routes};

#[tokio::main]
async fn main() -> chat_relay::error::Result<()> {
    // Load .env if present; real environment variables take precedence.
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = RelayConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if !config.has_provider_key() {
        tracing::warn!(
            "OPENAI_API_KEY is not set; /api/chat and the WhatsApp webhook will answer with their fallbacks until it is configured"
        );
    }

    let flags = FeatureFlags::from_config(&config);

    eprintln!("💬 Chat Relay v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.provider.model);
    eprintln!("   Chat API: http://0.0.0.0:{}/api/chat", config.port);
    eprintln!("   Lead API: http://0.0.0.0:{}/api/lead", config.port);
    eprintln!(
        "   WhatsApp: {}",
        if flags.whatsapp {
            format!("enabled (http://0.0.0.0:{}/webhooks/whatsapp)", config.port)
        } else {
            "disabled (TWILIO_ACCOUNT_SID / TWILIO_AUTH_TOKEN not set)".to_string()
        }
    );
    eprintln!(
        "   Leads: {}",
        match &config.leads.admin_email {
            Some(email) => format!("forwarded to {}", email),
            None => "not forwarded (ADMIN_EMAIL not set)".to_string(),
        }
    );
    eprintln!(
        "   CORS: {}",
        if config.cors_origins.is_empty() {
            "any origin".to_string()
        } else {
            config.cors_origins.join(", ")
        }
    );
    if let Some(dir) = &config.static_dir {
        eprintln!("   Static: {}", dir.display());
    }
    eprintln!();

    let llm = create_provider(&config.provider);
    let notifier = notifier_from_config(&config.leads)?;
    let orchestrator = Arc::new(RequestOrchestrator::new(llm, notifier));

    let app = relay_routes(orchestrator, &RouterOptions::from_config(&config));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Relay listening");
    axum::serve(listener, app).await?;

    Ok(())
}
