use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Every handler here takes an `AuthUser`, so an unauthenticated request is rejected
/// with 401 before the handler body runs.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /pages/{slug}/redeem
        // Rate limited per user: `redeem:<user id>`.
        .route("/pages/{slug}/redeem", post(handlers::redeem_page))
        // GET /me/grants
        .route("/me/grants", get(handlers::get_my_grants))
}
