use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session. The email check is mutating (it may queue a
/// sign-in link), so it still passes through the origin guard.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        .route("/health", get(|| async { "ok" }))
        // POST /auth/email-check
        // Always answers with the same sign-in transition.
        .route("/auth/email-check", post(handlers::email_check))
        // GET /pages/{slug}
        // Title only; the body needs a redeemed code.
        .route("/pages/{slug}", get(handlers::get_page))
}
