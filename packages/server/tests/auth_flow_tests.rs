//! Integration tests for the roll number + phone OTP login flow.
//!
//! Tests all critical auth paths:
//! - Challenge issuance and SMS delivery
//! - Phone matching against the record
//! - Verification, lockout and expiry
//! - Session tokens and own-record access

mod common;

use std::sync::Arc;

use chrono::Duration;
use common::{
    table_without_phone_column, TestHarness, CLAIMED_MOBILE, ROLL, STORED_MOBILE,
};
use rollcall_core::domains::auth::actions::{
    authenticate, fetch_record, request_challenge, verify_challenge, ChallengeRequest,
    ChallengeResponse,
};
use rollcall_core::domains::auth::AuthError;
use rollcall_core::kernel::test_dependencies::FailingNotifier;
use rollcall_core::kernel::TestDependencies;
use test_context::test_context;

// ============================================================================
// Test Helpers
// ============================================================================

fn challenge(identifier: &str, phone: &str) -> ChallengeRequest {
    ChallengeRequest {
        identifier: identifier.to_string(),
        phone: phone.to_string(),
        country_code: None,
    }
}

fn response(identifier: &str, phone: &str, code: &str) -> ChallengeResponse {
    ChallengeResponse {
        identifier: identifier.to_string(),
        phone: phone.to_string(),
        code: code.to_string(),
    }
}

/// A six-digit code guaranteed to differ from `code`
fn wrong_code(code: &str) -> &'static str {
    if code == "000000" {
        "111111"
    } else {
        "000000"
    }
}

/// Pull the six-digit code out of an SMS body
fn code_from_sms(body: &str) -> String {
    body.split(|c: char| !c.is_ascii_digit())
        .find(|part| part.len() == 6)
        .expect("SMS body contains a six-digit code")
        .to_string()
}

async fn issue_code(ctx: &TestHarness) -> String {
    request_challenge(challenge(ROLL, CLAIMED_MOBILE), &ctx.deps)
        .await
        .unwrap()
        .dev_code
        .expect("debug mode echoes the code")
}

// ============================================================================
// Challenge Issuance Tests
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_full_login_flow(ctx: &TestHarness) {
    let issued = request_challenge(challenge(ROLL, CLAIMED_MOBILE), &ctx.deps)
        .await
        .unwrap();
    assert_eq!(issued.message, "OTP sent successfully");
    let code = issued.dev_code.expect("debug mode echoes the code");
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    // SMS goes out to the claimed number with its own '+' prefix
    let sent = ctx.notifier().wait_for_messages(1).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "+919876543210");
    assert_eq!(
        sent[0].body,
        format!(
            "Your OTP for student login is: {}. It will expire in 5 minutes.",
            code
        )
    );

    // Verification accepts the same number in a different format
    let session = verify_challenge(response(" a101 ", STORED_MOBILE, &code), &ctx.deps)
        .await
        .unwrap();

    let roll = authenticate(&session.token, &ctx.deps).unwrap();
    assert_eq!(roll, "a101");

    let own = fetch_record(&roll, &ctx.deps).await.unwrap();
    assert_eq!(own.data.text("Name"), "Asha Verma");
    assert_eq!(own.data.text("University Roll No."), "A101");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_numeric_phone_cell_with_country_code(ctx: &TestHarness) {
    let issued = request_challenge(challenge("B202", "9123456789"), &ctx.deps)
        .await
        .unwrap();
    assert!(issued.dev_code.is_some());

    let sent = ctx.notifier().wait_for_messages(1).await;
    assert_eq!(sent[0].to, "+919123456789");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_secondary_phone_field_matches(ctx: &TestHarness) {
    let result = request_challenge(challenge("B202", "99887-76655"), &ctx.deps).await;
    assert!(result.is_ok());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_explicit_country_code(ctx: &TestHarness) {
    let request = ChallengeRequest {
        country_code: Some("+1".to_string()),
        ..challenge(ROLL, STORED_MOBILE)
    };
    request_challenge(request, &ctx.deps).await.unwrap();

    let sent = ctx.notifier().wait_for_messages(1).await;
    assert_eq!(sent[0].to, "+19876543210");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_missing_fields_rejected(ctx: &TestHarness) {
    let result = request_challenge(challenge(ROLL, "  "), &ctx.deps).await;
    assert!(matches!(result, Err(AuthError::Validation(_))));

    let result = verify_challenge(response(ROLL, STORED_MOBILE, ""), &ctx.deps).await;
    assert!(matches!(result, Err(AuthError::Validation(_))));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_unknown_roll_is_not_found(ctx: &TestHarness) {
    let result = request_challenge(challenge("Z999", STORED_MOBILE), &ctx.deps).await;
    match result {
        Err(AuthError::RecordNotFound(roll)) => assert_eq!(roll, "Z999"),
        other => panic!("expected RecordNotFound, got {:?}", other),
    }
    assert!(ctx.deps.otp_store.is_empty().await);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_short_phone_rejected(ctx: &TestHarness) {
    let result = request_challenge(challenge(ROLL, "000000"), &ctx.deps).await;
    assert!(matches!(result, Err(AuthError::PhoneTooShort)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_phone_mismatch_rejected(ctx: &TestHarness) {
    let result = request_challenge(challenge(ROLL, "9999999999"), &ctx.deps).await;
    assert!(matches!(result, Err(AuthError::PhoneMismatch)));

    // A record without any phone on file never matches
    let result = request_challenge(challenge("C303", STORED_MOBILE), &ctx.deps).await;
    assert!(matches!(result, Err(AuthError::PhoneMismatch)));

    assert!(ctx.deps.otp_store.is_empty().await);
    assert!(ctx.notifier().sent().is_empty());
}

#[tokio::test]
async fn test_table_without_phone_column_is_configuration_error() {
    let test_deps = TestDependencies::new();
    let deps = test_deps.server_deps(Arc::new(table_without_phone_column()));

    let result = request_challenge(challenge(ROLL, STORED_MOBILE), &deps).await;
    assert!(matches!(result, Err(AuthError::Configuration(_))));
}

#[tokio::test]
async fn test_delivery_failure_keeps_challenge() {
    let test_deps = TestDependencies::new();
    let notifier = Arc::new(FailingNotifier::new());
    let deps = test_deps.server_deps_with_notifier(
        Arc::new(common::roster_table()),
        notifier.clone(),
    );

    let code = request_challenge(challenge(ROLL, STORED_MOBILE), &deps)
        .await
        .unwrap()
        .dev_code
        .unwrap();

    for _ in 0..200 {
        if notifier.attempts() > 0 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    assert_eq!(notifier.attempts(), 1);

    let session = verify_challenge(response(ROLL, STORED_MOBILE, &code), &deps).await;
    assert!(session.is_ok());
}

#[tokio::test]
async fn test_debug_off_hides_code() {
    let ctx = TestHarness::new(TestDependencies::new().with_debug_otp(false));

    let issued = request_challenge(challenge(ROLL, STORED_MOBILE), &ctx.deps)
        .await
        .unwrap();
    assert!(issued.dev_code.is_none());

    let sent = ctx.notifier().wait_for_messages(1).await;
    let code = code_from_sms(&sent[0].body);

    let session = verify_challenge(response(ROLL, STORED_MOBILE, &code), &ctx.deps).await;
    assert!(session.is_ok());
}

// ============================================================================
// Verification Tests
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_code_is_single_use(ctx: &TestHarness) {
    let code = issue_code(ctx).await;

    verify_challenge(response(ROLL, STORED_MOBILE, &code), &ctx.deps)
        .await
        .unwrap();

    let replay = verify_challenge(response(ROLL, STORED_MOBILE, &code), &ctx.deps).await;
    assert!(matches!(replay, Err(AuthError::ChallengeExpired)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_never_requested_looks_expired(ctx: &TestHarness) {
    let result = verify_challenge(response("Z999", STORED_MOBILE, "123456"), &ctx.deps).await;
    assert!(matches!(result, Err(AuthError::ChallengeExpired)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_code_bound_to_phone(ctx: &TestHarness) {
    let code = issue_code(ctx).await;

    let result = verify_challenge(response(ROLL, "9123456789", &code), &ctx.deps).await;
    assert!(matches!(result, Err(AuthError::ChallengeExpired)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_lockout_after_max_attempts(ctx: &TestHarness) {
    let code = issue_code(ctx).await;
    let wrong = wrong_code(&code);
    let max = ctx.deps.otp_store.max_attempts();

    for _ in 1..max {
        let result = verify_challenge(response(ROLL, STORED_MOBILE, wrong), &ctx.deps).await;
        assert!(matches!(result, Err(AuthError::InvalidCode)));
    }

    let result = verify_challenge(response(ROLL, STORED_MOBILE, wrong), &ctx.deps).await;
    assert!(matches!(result, Err(AuthError::RateLimited)));

    // The locked challenge is gone, even for the right code
    let result = verify_challenge(response(ROLL, STORED_MOBILE, &code), &ctx.deps).await;
    assert!(matches!(result, Err(AuthError::ChallengeExpired)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_correct_code_after_wrong_guess(ctx: &TestHarness) {
    let code = issue_code(ctx).await;

    let wrong = wrong_code(&code);
    let result = verify_challenge(response(ROLL, STORED_MOBILE, wrong), &ctx.deps).await;
    assert!(matches!(result, Err(AuthError::InvalidCode)));

    let result = verify_challenge(response(ROLL, STORED_MOBILE, &code), &ctx.deps).await;
    assert!(result.is_ok());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_new_request_replaces_code(ctx: &TestHarness) {
    let first = issue_code(ctx).await;
    let second = issue_code(ctx).await;
    assert_eq!(ctx.deps.otp_store.len().await, 1);

    if first != second {
        let result = verify_challenge(response(ROLL, STORED_MOBILE, &first), &ctx.deps).await;
        assert!(matches!(result, Err(AuthError::InvalidCode)));
    }

    let result = verify_challenge(response(ROLL, STORED_MOBILE, &second), &ctx.deps).await;
    assert!(result.is_ok());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_expired_challenge(ctx: &TestHarness) {
    let code = issue_code(ctx).await;

    ctx.clock().advance(Duration::seconds(301));

    let result = verify_challenge(response(ROLL, STORED_MOBILE, &code), &ctx.deps).await;
    assert!(matches!(result, Err(AuthError::ChallengeExpired)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_challenge_valid_at_ttl(ctx: &TestHarness) {
    let code = issue_code(ctx).await;

    ctx.clock().advance(Duration::seconds(300));

    let result = verify_challenge(response(ROLL, STORED_MOBILE, &code), &ctx.deps).await;
    assert!(result.is_ok());
}

// ============================================================================
// Session Token Tests
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_session_token_expires(ctx: &TestHarness) {
    let code = issue_code(ctx).await;
    let session = verify_challenge(response(ROLL, STORED_MOBILE, &code), &ctx.deps)
        .await
        .unwrap();

    ctx.clock().advance(Duration::seconds(1800));
    assert!(authenticate(&session.token, &ctx.deps).is_ok());

    ctx.clock().advance(Duration::seconds(1));
    let result = authenticate(&session.token, &ctx.deps);
    assert!(matches!(result, Err(AuthError::TokenInvalid)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_token_from_other_secret_rejected(ctx: &TestHarness) {
    let mut other = TestDependencies::new();
    other.secret = "some_other_secret".to_string();
    let other_deps = other.server_deps(Arc::new(common::roster_table()));
    let forged = other_deps.token_service.issue(ROLL).unwrap();

    let result = authenticate(&forged, &ctx.deps);
    assert!(matches!(result, Err(AuthError::TokenInvalid)));
}
