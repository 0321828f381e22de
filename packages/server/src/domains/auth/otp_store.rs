//! Ephemeral store for pending OTP challenges.
//!
//! Lifecycle per key: Absent -> Pending -> {Consumed | Expired | Locked}.
//! Every state transition happens under a single lock, so concurrent
//! verifications of the same challenge observe each other's attempt counts.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use tracing::debug;

use super::models::CorrelationKey;
use crate::common::Clock;

pub const DEFAULT_OTP_TTL_SECS: i64 = 300;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Store size at which `create` sweeps out expired challenges
const PURGE_THRESHOLD: usize = 1024;

/// A pending challenge
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub attempts: u32,
}

/// Result of presenting a code for a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    Success,
    WrongCode,
    Expired,
    NotFound,
    TooManyAttempts,
}

pub struct OtpStore {
    entries: Mutex<HashMap<CorrelationKey, OtpChallenge>>,
    ttl: Duration,
    max_attempts: u32,
    clock: Arc<dyn Clock>,
}

impl OtpStore {
    pub fn new(ttl: Duration, max_attempts: u32, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_attempts: max_attempts.max(1),
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Issue a fresh code for `key`, replacing any pending challenge.
    pub async fn create(&self, key: CorrelationKey) -> String {
        let code = generate_code();
        let now = self.clock.now();
        let challenge = OtpChallenge {
            code: code.clone(),
            expires_at: now + self.ttl,
            attempts: 0,
        };

        let mut entries = self.entries.lock().await;
        if entries.len() >= PURGE_THRESHOLD {
            purge(&mut entries, now);
        }
        if entries.insert(key, challenge).is_some() {
            debug!("Replaced pending OTP challenge");
        }
        code
    }

    /// Check `supplied` against the pending challenge for `key`.
    ///
    /// The attempt is counted before the comparison, so the final permitted
    /// wrong guess locks the challenge itself.
    pub async fn consume(&self, key: &CorrelationKey, supplied: &str) -> ConsumeOutcome {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;

        let Some(challenge) = entries.get_mut(key) else {
            return ConsumeOutcome::NotFound;
        };

        if now > challenge.expires_at {
            entries.remove(key);
            return ConsumeOutcome::Expired;
        }

        challenge.attempts += 1;
        if codes_match(&challenge.code, supplied) {
            entries.remove(key);
            return ConsumeOutcome::Success;
        }

        if challenge.attempts >= self.max_attempts {
            entries.remove(key);
            ConsumeOutcome::TooManyAttempts
        } else {
            ConsumeOutcome::WrongCode
        }
    }

    /// Drop every expired challenge, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        purge(&mut entries, now)
    }

    /// Attempts recorded against a pending challenge
    pub async fn attempts(&self, key: &CorrelationKey) -> Option<u32> {
        self.entries.lock().await.get(key).map(|c| c.attempts)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

fn purge(entries: &mut HashMap<CorrelationKey, OtpChallenge>, now: DateTime<Utc>) -> usize {
    let before = entries.len();
    entries.retain(|_, challenge| challenge.expires_at >= now);
    let removed = before - entries.len();
    if removed > 0 {
        debug!(removed, "Purged expired OTP challenges");
    }
    removed
}

/// Uniformly random six-digit code; leading zeros allowed.
fn generate_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000u32))
}

fn codes_match(expected: &str, supplied: &str) -> bool {
    expected.len() == supplied.len() && bool::from(expected.as_bytes().ct_eq(supplied.as_bytes()))
}
