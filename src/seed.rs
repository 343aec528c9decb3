use std::{fs, path::Path};

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{PrivatePage, User},
    repository::Repository,
};

/// SeedError
///
/// Raised when the seed file named by `SEED_FILE` cannot be read or parsed.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse seed file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// SeedPage
///
/// A private page as written in the seed file. The id is generated when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedPage {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub access_code: String,
}

impl From<SeedPage> for PrivatePage {
    fn from(page: SeedPage) -> Self {
        Self {
            id: page.id.unwrap_or_else(Uuid::new_v4),
            slug: page.slug,
            title: page.title,
            body: page.body,
            access_code: page.access_code,
            created_at: Utc::now(),
        }
    }
}

/// SeedData
///
/// Users and pages loaded into the repository at startup. The in-memory repository
/// starts empty, so without a seed every request would fail authentication or 404.
///
/// ```json
/// {
///   "users": [{ "id": "5f0c...", "email": "alice@example.com" }],
///   "pages": [{ "slug": "roadmap", "title": "Roadmap", "body": "...", "access_code": "ROAD-MAP" }]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub pages: Vec<SeedPage>,
}

impl SeedData {
    pub fn from_json(path: &Path, raw: &str) -> Result<Self, SeedError> {
        serde_json::from_str(raw).map_err(|source| SeedError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, SeedError> {
        let raw = fs::read_to_string(path).map_err(|source| SeedError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(path, &raw)
    }

    /// apply
    ///
    /// Inserts every user and page through the repository seam. Returns the number of
    /// users and pages written.
    pub async fn apply(self, repo: &dyn Repository) -> (usize, usize) {
        let (users, pages) = (self.users.len(), self.pages.len());
        for user in self.users {
            repo.create_user(user).await;
        }
        for page in self.pages {
            repo.create_page(page.into()).await;
        }
        (users, pages)
    }
}
