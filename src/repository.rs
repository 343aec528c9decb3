use crate::models::{AccessGrant, AdminDashboardStats, PrivatePage, User};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Repository Trait
///
/// The abstract contract for persistence. Handlers and the `AuthUser` extractor only see
/// this trait, so the hosted database can be swapped for the in-memory implementation
/// below (or a test mock) without touching them.
///
/// **Send + Sync + async_trait** are required to share the trait object
/// (`Arc<dyn Repository>`) across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- User/Auth ---
    async fn get_user(&self, id: Uuid) -> Option<User>;
    async fn create_user(&self, user: User) -> User;
    /// Queues a sign-in link when `email` belongs to a registered account and no link for
    /// it is already pending. Returns whether the account is registered. Callers on the
    /// email-check path must discard this value rather than branch on it.
    async fn request_sign_in_link(&self, email: &str) -> bool;

    // --- Private Pages ---
    async fn create_page(&self, page: PrivatePage) -> PrivatePage;
    async fn get_page_by_slug(&self, slug: &str) -> Option<PrivatePage>;
    /// Records an access grant when `code` matches the page's access code.
    /// Redeeming an already-granted page returns the existing grant.
    /// Returns `None` for an unknown page and for a wrong code alike.
    async fn redeem_access_code(
        &self,
        slug: &str,
        user_id: Uuid,
        code: &str,
    ) -> Option<(PrivatePage, AccessGrant)>;
    async fn get_my_grants(&self, user_id: Uuid) -> Vec<AccessGrant>;

    // --- Admin ---
    async fn get_stats(&self) -> AdminDashboardStats;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// Upper bound on undelivered sign-in links. The oldest link is dropped to make room.
pub const SIGN_IN_OUTBOX_CAPACITY: usize = 1024;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    pages: HashMap<String, PrivatePage>,
    grants: HashMap<(Uuid, Uuid), AccessGrant>,
    sign_in_outbox: VecDeque<String>,
}

/// MemoryRepository
///
/// In-process implementation of `Repository`. State lives for the process lifetime.
#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emails with a queued sign-in link, oldest first.
    pub async fn queued_sign_in_links(&self) -> Vec<String> {
        self.tables
            .read()
            .await
            .sign_in_outbox
            .iter()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn get_user(&self, id: Uuid) -> Option<User> {
        self.tables.read().await.users.get(&id).cloned()
    }

    async fn create_user(&self, user: User) -> User {
        let mut tables = self.tables.write().await;
        tables.users.insert(user.id, user.clone());
        user
    }

    async fn request_sign_in_link(&self, email: &str) -> bool {
        let email = email.trim().to_ascii_lowercase();
        let mut tables = self.tables.write().await;
        let registered = tables
            .users
            .values()
            .any(|user| user.email.eq_ignore_ascii_case(&email));
        // One pending link per address; repeated checks do not grow the outbox.
        if registered && !tables.sign_in_outbox.contains(&email) {
            if tables.sign_in_outbox.len() >= SIGN_IN_OUTBOX_CAPACITY {
                tables.sign_in_outbox.pop_front();
            }
            tables.sign_in_outbox.push_back(email);
        }
        registered
    }

    async fn create_page(&self, page: PrivatePage) -> PrivatePage {
        let mut tables = self.tables.write().await;
        tables.pages.insert(page.slug.clone(), page.clone());
        page
    }

    async fn get_page_by_slug(&self, slug: &str) -> Option<PrivatePage> {
        self.tables.read().await.pages.get(slug).cloned()
    }

    async fn redeem_access_code(
        &self,
        slug: &str,
        user_id: Uuid,
        code: &str,
    ) -> Option<(PrivatePage, AccessGrant)> {
        let mut tables = self.tables.write().await;
        let page = tables.pages.get(slug)?.clone();
        if !codes_match(&page.access_code, code.trim()) {
            return None;
        }

        let grant = tables
            .grants
            .entry((page.id, user_id))
            .or_insert_with(|| AccessGrant {
                page_id: page.id,
                user_id,
                granted_at: Utc::now(),
            })
            .clone();
        Some((page, grant))
    }

    async fn get_my_grants(&self, user_id: Uuid) -> Vec<AccessGrant> {
        let tables = self.tables.read().await;
        let mut grants: Vec<AccessGrant> = tables
            .grants
            .values()
            .filter(|grant| grant.user_id == user_id)
            .cloned()
            .collect();
        grants.sort_by_key(|grant| grant.granted_at);
        grants
    }

    async fn get_stats(&self) -> AdminDashboardStats {
        let tables = self.tables.read().await;
        AdminDashboardStats {
            total_users: tables.users.len() as i64,
            total_pages: tables.pages.len() as i64,
            total_grants: tables.grants.len() as i64,
            pending_sign_in_links: tables.sign_in_outbox.len() as i64,
            tracked_rate_limit_keys: 0,
        }
    }
}

// Compares without short-circuiting on the first differing byte.
fn codes_match(expected: &str, given: &str) -> bool {
    let (expected, given) = (expected.as_bytes(), given.as_bytes());
    if expected.len() != given.len() {
        return false;
    }
    expected
        .iter()
        .zip(given)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
