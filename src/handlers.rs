use crate::{
    AppState,
    auth::AuthUser,
    guards::{EmailCheckTransition, RateLimitDecision, next_transition},
    models::{
        AccessGrant, AdminDashboardStats, EmailCheckRequest, PageSummary, RedeemRequest,
        RedeemResponse, SweepResponse,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

// --- Rate-limit helpers ---

/// rate_limited
///
/// The 429 response for a denied rate-limit check. Carries only a `Retry-After` header:
/// the body is empty so the response says nothing beyond the category of the denial.
fn rate_limited(decision: RateLimitDecision) -> Response {
    // Round up so a client honouring the header never retries inside the window.
    let retry_after = decision.reset_after.as_secs()
        + u64::from(decision.reset_after.subsec_nanos() > 0);
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, retry_after.max(1).to_string())],
    )
        .into_response()
}

// --- Handlers ---

/// email_check
///
/// [Public Route] First step of the login flow. Looks the email up (queueing a sign-in
/// link when the account exists) and then always answers with the same transition.
///
/// *Anti-enumeration*: the lookup result is discarded, never branched on. The response
/// body is `next_transition()` for registered and unregistered emails alike.
///
/// *Throttling*: keyed per normalized email, so one address cannot be used to flood its
/// owner's inbox. A 429 is returned for every address alike and reveals nothing.
#[utoipa::path(
    post,
    path = "/auth/email-check",
    request_body = EmailCheckRequest,
    responses(
        (status = 200, description = "Proceed to sign-in", body = EmailCheckTransition),
        (status = 403, description = "Origin not allowed"),
        (status = 429, description = "Too many attempts")
    )
)]
pub async fn email_check(
    State(state): State<AppState>,
    Json(payload): Json<EmailCheckRequest>,
) -> Result<Json<EmailCheckTransition>, Response> {
    let email = payload.email.trim().to_ascii_lowercase();
    let rule = state.config.email_check_rate;

    let decision = state
        .limiter
        .check(&format!("email-check:{email}"), rule.limit, rule.window);
    if !decision.ok {
        tracing::warn!("Email check rate limit exceeded");
        return Err(rate_limited(decision));
    }

    let _ = state.repo.request_sign_in_link(&email).await;

    Ok(Json(next_transition()))
}

/// get_page
///
/// [Public Route] Returns the title of a private page so the client can render the
/// code prompt. The body stays locked until a code is redeemed.
#[utoipa::path(
    get,
    path = "/pages/{slug}",
    params(("slug" = String, Path, description = "Page slug")),
    responses(
        (status = 200, description = "Found", body = PageSummary),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PageSummary>, StatusCode> {
    match state.repo.get_page_by_slug(&slug).await {
        Some(page) => Ok(Json(PageSummary::from(&page))),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// redeem_page
///
/// [Authenticated Route] Redeems a private page's access code.
///
/// *Throttling*: every attempt counts against `redeem:<user id>`, including attempts
/// made while already limited, so guessing codes stays blocked for the whole window.
/// A limited caller gets 429, never 403.
///
/// *Probing*: a wrong code and an unknown page both answer 404.
#[utoipa::path(
    post,
    path = "/pages/{slug}/redeem",
    params(("slug" = String, Path, description = "Page slug")),
    request_body = RedeemRequest,
    responses(
        (status = 200, description = "Unlocked", body = RedeemResponse),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Origin not allowed"),
        (status = 404, description = "Unknown page or wrong code"),
        (status = 429, description = "Too many attempts")
    )
)]
pub async fn redeem_page(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<RedeemRequest>,
) -> Result<Json<RedeemResponse>, Response> {
    let rule = state.config.redeem_rate;
    let decision = state
        .limiter
        .check(&format!("redeem:{user_id}"), rule.limit, rule.window);
    if !decision.ok {
        tracing::warn!(%user_id, "Redeem rate limit exceeded");
        return Err(rate_limited(decision));
    }

    match state
        .repo
        .redeem_access_code(&slug, user_id, &payload.code)
        .await
    {
        Some((page, grant)) => {
            tracing::info!(%user_id, page_id = %page.id, "Access code redeemed");
            Ok(Json(RedeemResponse {
                page: PageSummary::from(&page),
                body: page.body,
                grant,
            }))
        }
        None => Err(StatusCode::NOT_FOUND.into_response()),
    }
}

/// get_my_grants
///
/// [Authenticated Route] Lists the pages the caller has unlocked, oldest first.
#[utoipa::path(
    get,
    path = "/me/grants",
    responses((status = 200, description = "My Grants", body = [AccessGrant]))
)]
pub async fn get_my_grants(
    AuthUser { id }: AuthUser,
    State(state): State<AppState>,
) -> Json<Vec<AccessGrant>> {
    Json(state.repo.get_my_grants(id).await)
}

/// get_admin_stats
///
/// [Admin Route] Dashboard counters. Access is decided by the admin gate layer.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses(
        (status = 200, description = "Stats", body = AdminDashboardStats),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn get_admin_stats(State(state): State<AppState>) -> Json<AdminDashboardStats> {
    let mut stats = state.repo.get_stats().await;
    stats.tracked_rate_limit_keys = state.limiter.tracked_keys() as i64;
    Json(stats)
}

/// sweep_rate_limits
///
/// [Admin Route] Evicts rate-limit counters older than the longest configured window.
/// Same effect as one tick of the background sweeper.
#[utoipa::path(
    post,
    path = "/admin/maintenance/rate-limits/sweep",
    responses(
        (status = 200, description = "Swept", body = SweepResponse),
        (status = 403, description = "Not an admin or origin not allowed")
    )
)]
pub async fn sweep_rate_limits(State(state): State<AppState>) -> Json<SweepResponse> {
    let evicted = state
        .limiter
        .sweep_expired(state.config.longest_rate_window());
    tracing::info!(evicted, "Manual rate-limit sweep");
    Json(SweepResponse {
        evicted: evicted as i64,
        remaining: state.limiter.tracked_keys() as i64,
    })
}
