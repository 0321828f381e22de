use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;
use twilio::TwilioService;

use crate::domains::auth::models::mask_phone;
use crate::domains::auth::{OtpStore, TokenService};
use crate::kernel::{BaseNotifier, BaseRecordLookup};

// =============================================================================
// TwilioService Adapter (implements BaseNotifier trait)
// =============================================================================

/// Wrapper around TwilioService that implements BaseNotifier trait
pub struct TwilioAdapter(pub Arc<TwilioService>);

impl TwilioAdapter {
    pub fn new(service: Arc<TwilioService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BaseNotifier for TwilioAdapter {
    async fn send_sms(&self, to: &str, body: &str) -> Result<()> {
        let message = self
            .0
            .send_message(to, body)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        info!(sid = %message.sid, status = %message.status, "Twilio accepted message");
        Ok(())
    }
}

// =============================================================================
// Disabled SMS delivery
// =============================================================================

/// Notifier used when Twilio credentials are not configured
pub struct LogNotifier;

#[async_trait]
impl BaseNotifier for LogNotifier {
    async fn send_sms(&self, to: &str, _body: &str) -> Result<()> {
        info!(to = %mask_phone(to), "SMS delivery disabled, message not sent");
        Ok(())
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to actions (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub records: Arc<dyn BaseRecordLookup>,
    pub notifier: Arc<dyn BaseNotifier>,
    pub otp_store: Arc<OtpStore>,
    pub token_service: Arc<TokenService>,
    /// Echo generated codes in responses. Never enable in production.
    pub debug_otp: bool,
    /// Prefix for SMS destinations given without a country code
    pub default_country_code: String,
}

impl ServerDeps {
    pub fn new(
        records: Arc<dyn BaseRecordLookup>,
        notifier: Arc<dyn BaseNotifier>,
        otp_store: Arc<OtpStore>,
        token_service: Arc<TokenService>,
        debug_otp: bool,
        default_country_code: String,
    ) -> Self {
        Self {
            records,
            notifier,
            otp_store,
            token_service,
            debug_otp,
            default_country_code,
        }
    }
}
