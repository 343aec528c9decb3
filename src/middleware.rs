use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};

use crate::{
    auth::AuthUser,
    config::AppConfig,
    guards::{can_use_privileged_endpoint, is_allowed_origin},
};

/// origin_guard
///
/// Applied to every route, outside the handlers, so a rejected request never reaches
/// an extractor or a repository call. Reads pass straight through.
///
/// Rejection: `403 Forbidden` with an empty body.
pub async fn origin_guard(
    State(config): State<AppConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());

    if is_allowed_origin(request.method(), origin, &config.allowed_hosts) {
        return Ok(next.run(request).await);
    }

    tracing::warn!(
        method = %request.method(),
        path = %request.uri().path(),
        has_origin = origin.is_some(),
        "Rejected mutating request from untrusted origin"
    );
    Err(StatusCode::FORBIDDEN)
}

/// admin_gate
///
/// Guards the `/admin` routes. The caller must authenticate (`AuthUser`, else 401) and,
/// in production, appear in `ADMIN_USER_IDS` (else 403). IDs are compared in their
/// hyphenated lower-case UUID form.
pub async fn admin_gate(
    State(config): State<AppConfig>,
    AuthUser { id }: AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let allowed = can_use_privileged_endpoint(
        &id.to_string(),
        config.env.as_str(),
        config.admin_user_ids.as_deref(),
    );

    if allowed {
        Ok(next.run(request).await)
    } else {
        tracing::warn!(user_id = %id, "Rejected privileged request from non-admin");
        Err(StatusCode::FORBIDDEN)
    }
}
