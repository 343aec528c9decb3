use axum::{
    Router,
    extract::FromRef,
    http::{HeaderName, HeaderValue, request::Parts},
    middleware::from_fn_with_state,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// The request-abuse-prevention core: rate limiter, origin guard, admin gate, auth transition.
pub mod guards;

// Request-handling layer that composes the guards per endpoint.
pub mod auth;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod seed;
pub mod routes;

use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use guards::RateLimiter;
pub use repository::{MemoryRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for every route, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::email_check, handlers::get_page, handlers::redeem_page,
        handlers::get_my_grants, handlers::get_admin_stats, handlers::sweep_rate_limits
    ),
    components(
        schemas(
            guards::EmailCheckTransition, guards::NextStep, guards::MessageKey,
            models::EmailCheckRequest, models::PageSummary, models::RedeemRequest,
            models::RedeemResponse, models::AccessGrant, models::AdminDashboardStats,
            models::SweepResponse,
        )
    ),
    tags(
        (name = "pagegate", description = "Private pages behind abuse-resistant guards")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single container shared by every request: persistence, the rate limiter's
/// counter store, and the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    /// The only shared mutable state of the guard core.
    pub limiter: Arc<RateLimiter>,
    pub config: AppConfig,
}

impl AppState {
    /// Builds a state with a fresh limiter on the system clock.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        Self {
            repo,
            limiter: Arc::new(RateLimiter::new()),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for Arc<RateLimiter> {
    fn from_ref(app_state: &AppState) -> Arc<RateLimiter> {
        app_state.limiter.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routes and their guards. Order of evaluation for a request:
///
/// 1. request id, tracing, CORS
/// 2. `origin_guard`: mutating requests without an allow-listed `Origin` stop here (403)
/// 3. `admin_gate` for `/admin/*` (401 / 403)
/// 4. handler extractors (`AuthUser`, body) and the handler, which applies rate limits
pub fn create_router(state: AppState) -> Router {
    let allowed_hosts = Arc::new(state.config.allowed_hosts.clone());
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .ok()
                    .and_then(guards::origin::origin_host)
                    .is_some_and(|host| allowed_hosts.contains(&host))
            },
        ));

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(authenticated::authenticated_routes())
        .nest(
            "/admin",
            admin::admin_routes().route_layer(from_fn_with_state(
                state.clone(),
                middleware::admin_gate,
            )),
        )
        // Outermost application layer: runs before routing-specific layers and extractors.
        .layer(from_fn_with_state(
            state.clone(),
            middleware::origin_guard,
        ))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for `TraceLayer`, carrying the request id so every log line of one request
/// can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
