//! Test harness wiring the auth flow to mocks and a manual clock.

use std::sync::Arc;

use axum::Router;
use rollcall_core::kernel::test_dependencies::{ManualClock, MockNotifier};
use rollcall_core::kernel::{ServerDeps, TestDependencies};
use rollcall_core::server::{build_app, HttpOptions};
use test_context::AsyncTestContext;

use super::roster_table;

/// Test harness that owns one set of dependencies.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let issued = request_challenge(..., &ctx.deps).await;
/// }
/// ```
pub struct TestHarness {
    pub test_deps: TestDependencies,
    pub deps: Arc<ServerDeps>,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        init_tracing();
        Self::new(TestDependencies::new())
    }

    async fn teardown(self) {
        // Everything is in memory
    }
}

impl TestHarness {
    /// Harness over the roster fixture.
    pub fn new(test_deps: TestDependencies) -> Self {
        let deps = Arc::new(test_deps.server_deps(Arc::new(roster_table())));
        Self { test_deps, deps }
    }

    pub fn notifier(&self) -> &MockNotifier {
        &self.test_deps.notifier
    }

    pub fn clock(&self) -> &ManualClock {
        &self.test_deps.clock
    }

    /// HTTP application over this harness's dependencies with default options.
    ///
    /// Requests need a `ConnectInfo<SocketAddr>` extension for the OTP rate limiter.
    pub fn app(&self) -> Router {
        build_app(self.deps.clone(), &HttpOptions::default())
    }
}

/// Respect RUST_LOG in tests: RUST_LOG=debug cargo test -- --nocapture
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
