use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Admin Router Module
///
/// Maintenance endpoints, nested under `/admin`. `create_router` wraps this router in
/// the `admin_gate` layer; the handlers themselves do no access checks.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/stats
        .route("/stats", get(handlers::get_admin_stats))
        // POST /admin/maintenance/rate-limits/sweep
        // Evicts stale rate-limit counters on demand.
        .route(
            "/maintenance/rate-limits/sweep",
            post(handlers::sweep_rate_limits),
        )
}
