// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (challenge issuance, verification) lives in domain actions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseNotifier, BaseRecordLookup)

use anyhow::Result;
use async_trait::async_trait;

use crate::domains::records::{Record, RecordSourceError};

// =============================================================================
// Notifier Trait (Infrastructure - SMS delivery)
// =============================================================================

#[async_trait]
pub trait BaseNotifier: Send + Sync {
    /// Deliver a text message to a phone number
    async fn send_sms(&self, to: &str, body: &str) -> Result<()>;
}

// =============================================================================
// Record Lookup Trait (Infrastructure - tabular record source)
// =============================================================================

#[async_trait]
pub trait BaseRecordLookup: Send + Sync {
    /// Find the record for a roll number, `None` if there is no such row
    async fn find_record(&self, identifier: &str) -> Result<Option<Record>, RecordSourceError>;

    /// Names of the phone-like fields of `record`
    fn phone_fields(&self, record: &Record) -> Vec<String>;

    /// (rows, columns) of the underlying source
    fn shape(&self) -> (usize, usize);
}
