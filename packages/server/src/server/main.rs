// Main entry point for the roll number login server

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;
use rollcall_core::common::SystemClock;
use rollcall_core::domains::auth::{OtpStore, TokenService};
use rollcall_core::domains::records::RecordTable;
use rollcall_core::kernel::{BaseNotifier, LogNotifier, ServerDeps, TwilioAdapter};
use rollcall_core::server::{build_app, HttpOptions};
use rollcall_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use twilio::{TwilioOptions, TwilioService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rollcall_core=debug,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting roll number login server");

    // Load environment variables
    dotenvy::dotenv().ok();

    tracing::info!("Environment variables:");
    for name in &[
        "PORT", "DATA_FILE", "SHEET_NAME", "TOKEN_ISSUER", "DEBUG_OTP",
        "TRUST_FORWARDED_FOR", "TWILIO_ACCOUNT_SID", "TWILIO_PHONE_NUMBER",
    ] {
        mask_env(name);
    }
    for name in &["SECRET_KEY", "TWILIO_AUTH_TOKEN"] {
        secret_env(name);
    }

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        port = config.port,
        data_file = %config.data_file.display(),
        otp_ttl_seconds = config.otp_ttl_seconds,
        token_ttl_seconds = config.token_ttl_seconds,
        otp_max_attempts = config.otp_max_attempts,
        sms_enabled = config.twilio.is_some(),
        trust_forwarded_for = config.trust_forwarded_for,
        "Configuration loaded"
    );
    if config.debug_otp {
        tracing::warn!("DEBUG_OTP is enabled: codes are echoed in responses");
    }

    // Load the record table
    let table = RecordTable::load(&config.data_file, config.sheet_name.as_deref())
        .await
        .with_context(|| format!("Failed to load records from {}", config.data_file.display()))?;

    // SMS delivery
    let notifier: Arc<dyn BaseNotifier> = match &config.twilio {
        Some(twilio) => Arc::new(TwilioAdapter::new(Arc::new(TwilioService::new(
            TwilioOptions {
                account_sid: twilio.account_sid.clone(),
                auth_token: twilio.auth_token.clone(),
                from_number: twilio.from_number.clone(),
            },
        )))),
        None => {
            tracing::warn!("Twilio credentials not set, SMS delivery disabled");
            Arc::new(LogNotifier)
        }
    };

    let clock = Arc::new(SystemClock);
    let otp_store = Arc::new(OtpStore::new(
        Duration::seconds(config.otp_ttl_seconds),
        config.otp_max_attempts,
        clock.clone(),
    ));
    let token_service = Arc::new(TokenService::new(
        &config.secret_key,
        config.token_issuer.clone(),
        Duration::seconds(config.token_ttl_seconds),
        clock,
    ));

    let deps = Arc::new(ServerDeps::new(
        Arc::new(table),
        notifier,
        otp_store,
        token_service,
        config.debug_otp,
        config.default_country_code.clone(),
    ));

    // Build application
    let app = build_app(
        deps,
        &HttpOptions {
            allowed_origins: config.allowed_origins.clone(),
            trust_forwarded_for: config.trust_forwarded_for,
        },
    );

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/api/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}

/// Log a variable with everything past its first four characters masked
fn mask_env(name: &str) {
    match std::env::var(name) {
        Ok(val) if val.is_empty() => tracing::info!("  {}: (empty)", name),
        Ok(val) => {
            let len = val.chars().count();
            let shown: String = val.chars().take(4).collect();
            tracing::info!(
                "  {}: {}{}  ({} chars)",
                name,
                shown,
                "*".repeat(len.saturating_sub(4)),
                len
            );
        }
        Err(_) => tracing::warn!("  {}: NOT SET", name),
    }
}

/// Log only whether a secret is set and its length
fn secret_env(name: &str) {
    match std::env::var(name) {
        Ok(val) => tracing::info!("  {}: {}", name, describe_secret(Some(&val))),
        Err(_) => tracing::warn!("  {}: {}", name, describe_secret(None)),
    }
}

fn describe_secret(value: Option<&str>) -> String {
    match value {
        None => "NOT SET".to_string(),
        Some("") => "(empty)".to_string(),
        Some(val) => format!("SET  ({} chars)", val.chars().count()),
    }
}
