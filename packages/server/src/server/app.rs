//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::kernel::ServerDeps;
use crate::server::middleware::{jwt_auth_middleware, rate_limit_error, ClientIpKeyExtractor};
use crate::server::routes::{
    health_handler, me_handler, request_otp_handler, verify_otp_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

/// HTTP-level settings
#[derive(Debug, Clone, Default)]
pub struct HttpOptions {
    /// Empty allows any origin
    pub allowed_origins: Vec<String>,
    /// Rate-limit on forwarding headers instead of the peer address
    pub trust_forwarded_for: bool,
}

/// Build the Axum application router
///
/// The router needs `ConnectInfo<SocketAddr>` (see `into_make_service_with_connect_info`)
/// so the OTP rate limiter can key on the peer address.
pub fn build_app(deps: Arc<ServerDeps>, options: &HttpOptions) -> Router {
    let app_state = AppState { deps: deps.clone() };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin(&options.allowed_origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // OTP endpoints: burst of 20 per client IP, one slot back every 10 seconds
    let rate_limit_config = Arc::new(
        GovernorConfigBuilder::default()
            .error_handler(rate_limit_error)
            .key_extractor(ClientIpKeyExtractor::new(options.trust_forwarded_for))
            .per_second(10)
            .burst_size(20)
            .use_headers()
            .finish()
            .expect("Rate limiter configuration is valid and should never fail"),
    );

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    let auth_routes = Router::new()
        .route("/api/request-otp", post(request_otp_handler))
        .route("/api/verify-otp", post(verify_otp_handler))
        .layer(rate_limit_layer);

    Router::new()
        .merge(auth_routes)
        .route("/api/me", get(me_handler))
        // Health check (no rate limit)
        .route("/api/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(deps.clone(), req, next)
        }))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn allow_origin(allowed_origins: &[String]) -> AllowOrigin {
    if allowed_origins.is_empty() {
        return Any.into();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    AllowOrigin::list(origins)
}
