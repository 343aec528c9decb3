use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas ---

/// User
///
/// A registered account. The `id` mirrors the Supabase `auth.users.id`, which is also the
/// `sub` claim of the user's JWT and the identity matched against the admin allow-list.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
}

/// PrivatePage
///
/// A page whose content is only released to users who redeem its access code.
/// Internal: the access code must never be serialized to a client, so this type is not
/// `Serialize`. Responses use `PageSummary` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivatePage {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub access_code: String,
    pub created_at: DateTime<Utc>,
}

/// PageSummary
///
/// Public view of a private page (GET /pages/{slug}). Omits both the body and the code.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[ts(export)]
pub struct PageSummary {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
}

impl From<&PrivatePage> for PageSummary {
    fn from(page: &PrivatePage) -> Self {
        Self {
            id: page.id,
            slug: page.slug.clone(),
            title: page.title.clone(),
        }
    }
}

/// AccessGrant
///
/// Record of a successful redemption. Returned to the redeeming user together with the
/// page body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[ts(export)]
pub struct AccessGrant {
    pub page_id: Uuid,
    pub user_id: Uuid,
    #[ts(type = "string")]
    pub granted_at: DateTime<Utc>,
}

// --- Request Payloads ---

/// RedeemRequest
///
/// Input payload for POST /pages/{slug}/redeem.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RedeemRequest {
    #[schema(example = "H7K2-PQ9X")]
    pub code: String,
}

/// EmailCheckRequest
///
/// Input payload for POST /auth/email-check.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct EmailCheckRequest {
    #[schema(example = "someone@example.com")]
    pub email: String,
}

// --- Response Payloads ---

/// RedeemResponse
///
/// The unlocked page content plus the grant that was recorded.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RedeemResponse {
    pub page: PageSummary,
    pub body: String,
    pub grant: AccessGrant,
}

/// AdminDashboardStats
///
/// Output schema for GET /admin/stats.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq, Eq)]
#[ts(export)]
pub struct AdminDashboardStats {
    pub total_users: i64,
    pub total_pages: i64,
    pub total_grants: i64,
    /// Sign-in links queued by the email-check flow and not yet delivered.
    pub pending_sign_in_links: i64,
    /// Keys currently holding a rate-limit counter.
    pub tracked_rate_limit_keys: i64,
}

/// SweepResponse
///
/// Output of POST /admin/maintenance/rate-limits/sweep.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq, Eq)]
#[ts(export)]
pub struct SweepResponse {
    pub evicted: i64,
    pub remaining: i64,
}
