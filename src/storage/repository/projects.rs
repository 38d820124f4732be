// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Project repository contract.
//!
//! A project owns authorization requests and supplies the base redirect URL
//! used when a request has no redirect override. Projects authenticate with
//! an API key; only its SHA-256 digest is stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::super::{RepositoryError, RepositoryResult};
use crate::models::ProjectId;

/// A project that issues authorization requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: ProjectId,
    /// Absolute http(s) URL; default redirects are built under it.
    pub base_redirect_url: String,
    pub created_at: DateTime<Utc>,
}

/// Error returned for a base redirect URL that is not an absolute http(s) URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid base redirect URL `{0}`")]
pub struct InvalidBaseRedirectUrl(pub String);

impl Project {
    pub fn new(
        id: ProjectId,
        base_redirect_url: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, InvalidBaseRedirectUrl> {
        let base_redirect_url = base_redirect_url.into();
        match url::Url::parse(&base_redirect_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Self {
                id,
                base_redirect_url,
                created_at,
            }),
            _ => Err(InvalidBaseRedirectUrl(base_redirect_url)),
        }
    }
}

/// Storage contract for projects and their API keys.
pub trait ProjectRepository: Send + Sync {
    /// Insert or update a project and register `api_key` for it.
    ///
    /// Fails with `DuplicateApiKey` if the key belongs to another project.
    fn store_project(&self, project: &Project, api_key: &str) -> RepositoryResult<()>;

    fn get_project(&self, id: ProjectId) -> RepositoryResult<Option<Project>>;

    fn get_project_by_api_key(&self, api_key: &str) -> RepositoryResult<Option<Project>>;
}

/// Lowercase hex SHA-256 digest of an API key.
pub fn hash_api_key(api_key: &str) -> String {
    alloy::hex::encode(Sha256::digest(api_key.as_bytes()))
}

/// Stable project id for an API key, so re-seeding the same key at startup
/// finds the existing project.
pub fn project_id_for_api_key(api_key: &str) -> ProjectId {
    ProjectId(Uuid::new_v5(&Uuid::NAMESPACE_OID, hash_api_key(api_key).as_bytes()))
}

/// Failure to register the startup project.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    InvalidUrl(#[from] InvalidBaseRedirectUrl),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Register the project owning `api_key`, keeping its original creation time
/// if it already exists. Safe to call on every startup.
pub fn seed_project(
    repo: &dyn ProjectRepository,
    api_key: &str,
    base_redirect_url: &str,
    now: DateTime<Utc>,
) -> Result<Project, SeedError> {
    let id = project_id_for_api_key(api_key);
    let created_at = repo.get_project(id)?.map(|p| p.created_at).unwrap_or(now);
    let project = Project::new(id, base_redirect_url, created_at)?;
    repo.store_project(&project, api_key)?;
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryRepository;

    #[test]
    fn accepts_http_and_https_base_urls() {
        let id = ProjectId(Uuid::new_v4());
        assert!(Project::new(id, "https://example.com/", Utc::now()).is_ok());
        assert!(Project::new(id, "http://localhost:3000", Utc::now()).is_ok());
    }

    #[test]
    fn rejects_invalid_base_urls() {
        let id = ProjectId(Uuid::new_v4());
        assert!(Project::new(id, "base-redirect-url", Utc::now()).is_err());
        assert!(Project::new(id, "ftp://example.com", Utc::now()).is_err());
        assert!(Project::new(id, "", Utc::now()).is_err());
    }

    #[test]
    fn api_key_hash_is_hex_sha256() {
        let digest = hash_api_key("api-key");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(digest, hash_api_key("api-key-2"));
    }

    #[test]
    fn project_id_is_stable_per_key() {
        assert_eq!(project_id_for_api_key("k"), project_id_for_api_key("k"));
        assert_ne!(project_id_for_api_key("k"), project_id_for_api_key("other"));
    }

    #[test]
    fn seeding_is_idempotent() {
        let repo = InMemoryRepository::new();
        let first_seen = Utc::now() - chrono::Duration::days(1);

        let first = seed_project(&repo, "seed-key", "https://example.com", first_seen).unwrap();
        let second = seed_project(&repo, "seed-key", "https://example.org", Utc::now()).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.created_at, first_seen);
        assert_eq!(
            repo.get_project_by_api_key("seed-key").unwrap().unwrap().base_redirect_url,
            "https://example.org"
        );
    }

    #[test]
    fn seeding_rejects_bad_url() {
        let repo = InMemoryRepository::new();
        assert!(matches!(
            seed_project(&repo, "seed-key", "not a url", Utc::now()),
            Err(SeedError::InvalidUrl(_))
        ));
    }
}
