// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

use super::{BaseNotifier, BaseRecordLookup, ServerDeps};
use crate::common::Clock;
use crate::domains::auth::{OtpStore, TokenService, DEFAULT_MAX_ATTEMPTS};

// =============================================================================
// Manual Clock
// =============================================================================

/// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap() = to;
    }
}

impl Default for ManualClock {
    /// Starts at 2026-01-01T00:00:00Z
    fn default() -> Self {
        Self::new(DateTime::from_timestamp(1_767_225_600, 0).unwrap_or_default())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// =============================================================================
// Mock Notifier
// =============================================================================

/// A message captured by a mock notifier
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub to: String,
    pub body: String,
}

pub struct MockNotifier {
    sent: Arc<Mutex<Vec<SentMessage>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get all messages sent so far
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Check if a message was sent to a destination
    pub fn was_sent_to(&self, to: &str) -> bool {
        self.sent.lock().unwrap().iter().any(|m| m.to == to)
    }

    /// Wait until at least `count` messages were delivered.
    ///
    /// Delivery runs on a spawned task, so tests need to yield before asserting.
    pub async fn wait_for_messages(&self, count: usize) -> Vec<SentMessage> {
        for _ in 0..200 {
            let sent = self.sent();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        self.sent()
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseNotifier for MockNotifier {
    async fn send_sms(&self, to: &str, body: &str) -> Result<()> {
        self.sent.lock().unwrap().push(SentMessage {
            to: to.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

// =============================================================================
// Failing Notifier
// =============================================================================

/// Notifier whose every delivery fails
pub struct FailingNotifier {
    attempts: Arc<Mutex<usize>>,
}

impl FailingNotifier {
    pub fn new() -> Self {
        Self {
            attempts: Arc::new(Mutex::new(0)),
        }
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

impl Default for FailingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseNotifier for FailingNotifier {
    async fn send_sms(&self, _to: &str, _body: &str) -> Result<()> {
        *self.attempts.lock().unwrap() += 1;
        anyhow::bail!("SMS gateway unavailable")
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Builds ServerDeps wired to mocks and a manual clock
pub struct TestDependencies {
    pub notifier: Arc<MockNotifier>,
    pub clock: Arc<ManualClock>,
    pub secret: String,
    pub otp_ttl: Duration,
    pub token_ttl: Duration,
    pub max_attempts: u32,
    pub debug_otp: bool,
    pub default_country_code: String,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            notifier: Arc::new(MockNotifier::new()),
            clock: Arc::new(ManualClock::default()),
            secret: "test_secret_key".to_string(),
            otp_ttl: Duration::seconds(300),
            token_ttl: Duration::seconds(1800),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            debug_otp: true,
            default_country_code: "+91".to_string(),
        }
    }

    pub fn with_debug_otp(mut self, enabled: bool) -> Self {
        self.debug_otp = enabled;
        self
    }

    pub fn with_otp_ttl(mut self, ttl: Duration) -> Self {
        self.otp_ttl = ttl;
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// ServerDeps delivering through the mock notifier
    pub fn server_deps(&self, records: Arc<dyn BaseRecordLookup>) -> ServerDeps {
        self.server_deps_with_notifier(records, self.notifier.clone())
    }

    pub fn server_deps_with_notifier(
        &self,
        records: Arc<dyn BaseRecordLookup>,
        notifier: Arc<dyn BaseNotifier>,
    ) -> ServerDeps {
        ServerDeps::new(
            records,
            notifier,
            Arc::new(OtpStore::new(
                self.otp_ttl,
                self.max_attempts,
                self.clock.clone(),
            )),
            Arc::new(TokenService::new(
                &self.secret,
                "test_issuer".to_string(),
                self.token_ttl,
                self.clock.clone(),
            )),
            self.debug_otp,
            self.default_country_code.clone(),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
