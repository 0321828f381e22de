use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use dotenvy::dotenv;

use crate::domains::auth::{DEFAULT_MAX_ATTEMPTS, DEFAULT_OTP_TTL_SECS, DEFAULT_TOKEN_TTL_SECS};

/// Twilio credentials for SMS delivery
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// `.xlsx`/`.xls`/`.ods` workbook or a JSON array of row objects
    pub data_file: PathBuf,
    /// Worksheet to read; `None` reads the first sheet
    pub sheet_name: Option<String>,
    pub secret_key: String,
    pub token_issuer: String,
    pub otp_ttl_seconds: i64,
    pub token_ttl_seconds: i64,
    pub otp_max_attempts: u32,
    /// Echo generated codes in responses (local testing only)
    pub debug_otp: bool,
    pub default_country_code: String,
    pub allowed_origins: Vec<String>,
    /// Key the rate limiter on X-Forwarded-For / X-Real-IP instead of the peer
    /// address. Only safe behind a proxy that overwrites these headers.
    pub trust_forwarded_for: bool,
    /// `None` disables SMS delivery
    pub twilio: Option<TwilioConfig>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let otp_ttl_seconds: i64 = parse_var(&var, "OTP_TTL_SECONDS", DEFAULT_OTP_TTL_SECS)?;
        let token_ttl_seconds: i64 = parse_var(&var, "TOKEN_TTL_SECONDS", DEFAULT_TOKEN_TTL_SECS)?;
        if otp_ttl_seconds <= 0 {
            bail!("OTP_TTL_SECONDS must be positive");
        }
        if token_ttl_seconds <= 0 {
            bail!("TOKEN_TTL_SECONDS must be positive");
        }

        let otp_max_attempts: u32 = parse_var(&var, "OTP_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        if otp_max_attempts == 0 {
            bail!("OTP_MAX_ATTEMPTS must be at least 1");
        }

        let twilio = match (
            var("TWILIO_ACCOUNT_SID"),
            var("TWILIO_AUTH_TOKEN"),
            var("TWILIO_PHONE_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(TwilioConfig {
                account_sid,
                auth_token,
                from_number,
            }),
            _ => None,
        };

        Ok(Self {
            port: parse_var(&var, "PORT", 5000)?,
            data_file: var("DATA_FILE")
                .unwrap_or_else(|| "student_data.xlsx".to_string())
                .into(),
            sheet_name: var("SHEET_NAME").map(|v| v.trim().to_string()),
            secret_key: var("SECRET_KEY").context("SECRET_KEY must be set")?,
            token_issuer: var("TOKEN_ISSUER").unwrap_or_else(|| "rollcall".to_string()),
            otp_ttl_seconds,
            token_ttl_seconds,
            otp_max_attempts,
            debug_otp: flag(&var, "DEBUG_OTP"),
            default_country_code: var("DEFAULT_COUNTRY_CODE").unwrap_or_else(|| "+91".to_string()),
            allowed_origins: var("ALLOWED_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            trust_forwarded_for: flag(&var, "TRUST_FORWARDED_FOR"),
            twilio,
        })
    }
}

/// `true`/`false` in any case; anything else is off
fn flag<F>(var: &F, name: &str) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    var(name)
        .map(|v| v.trim().to_lowercase().parse::<bool>().unwrap_or(false))
        .unwrap_or(false)
}

fn parse_var<T, F>(var: &F, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", name)),
        None => Ok(default),
    }
}
