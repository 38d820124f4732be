// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory repository backend.
//!
//! Used by tests and by `AppState::default()`. Each attach runs its
//! check-and-set under one write lock, matching the redb backend's
//! single-writer semantics.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use super::repository::{
    hash_api_key, AuthorizationRequestRepository, Project, ProjectRepository,
    StoredAuthorizationRequest,
};
use super::{RepositoryError, RepositoryResult};
use crate::authorization::AuthorizationRequest;
use crate::models::{AuthorizationRequestId, ProjectId, SignedMessage, WalletAddress};

#[derive(Default)]
pub struct InMemoryRepository {
    requests: RwLock<HashMap<AuthorizationRequestId, StoredAuthorizationRequest>>,
    projects: RwLock<ProjectTables>,
}

#[derive(Default)]
struct ProjectTables {
    projects: HashMap<ProjectId, Project>,
    /// API key digest → project id
    api_keys: HashMap<String, ProjectId>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuthorizationRequestRepository for InMemoryRepository {
    fn store(&self, request: &AuthorizationRequest) -> RepositoryResult<()> {
        let mut requests = self.requests.write().map_err(|_| RepositoryError::LockPoisoned)?;
        if requests.contains_key(&request.id) {
            return Err(RepositoryError::DuplicateId(request.id));
        }
        requests.insert(request.id, StoredAuthorizationRequest::from(request));
        Ok(())
    }

    fn get_by_id(&self, id: AuthorizationRequestId) -> RepositoryResult<Option<AuthorizationRequest>> {
        let requests = self.requests.read().map_err(|_| RepositoryError::LockPoisoned)?;
        requests
            .get(&id)
            .cloned()
            .map(AuthorizationRequest::try_from)
            .transpose()
    }

    fn list_by_project(&self, project_id: ProjectId) -> RepositoryResult<Vec<AuthorizationRequest>> {
        let requests = self.requests.read().map_err(|_| RepositoryError::LockPoisoned)?;
        let mut matching: Vec<_> = requests
            .values()
            .filter(|record| record.project_id == project_id)
            .cloned()
            .collect();
        matching.sort_by_key(|record| (record.created_at, record.id.0));
        matching.into_iter().map(AuthorizationRequest::try_from).collect()
    }

    fn attach_signature(
        &self,
        id: AuthorizationRequestId,
        wallet_address: WalletAddress,
        signed_message: &SignedMessage,
    ) -> RepositoryResult<()> {
        let mut requests = self.requests.write().map_err(|_| RepositoryError::LockPoisoned)?;
        let record = requests.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        record.attach_signature(wallet_address, signed_message)
    }

    fn delete_expired(&self, cutoff: DateTime<Utc>) -> RepositoryResult<usize> {
        let mut requests = self.requests.write().map_err(|_| RepositoryError::LockPoisoned)?;
        let before = requests.len();
        requests.retain(|_, record| !record.is_expired(cutoff));
        Ok(before - requests.len())
    }
}

impl ProjectRepository for InMemoryRepository {
    fn store_project(&self, project: &Project, api_key: &str) -> RepositoryResult<()> {
        let digest = hash_api_key(api_key);
        let mut tables = self.projects.write().map_err(|_| RepositoryError::LockPoisoned)?;
        if tables.api_keys.get(&digest).is_some_and(|owner| *owner != project.id) {
            return Err(RepositoryError::DuplicateApiKey);
        }
        tables.api_keys.insert(digest, project.id);
        tables.projects.insert(project.id, project.clone());
        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> RepositoryResult<Option<Project>> {
        let tables = self.projects.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(tables.projects.get(&id).cloned())
    }

    fn get_project_by_api_key(&self, api_key: &str) -> RepositoryResult<Option<Project>> {
        let tables = self.projects.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(tables
            .api_keys
            .get(&hash_api_key(api_key))
            .and_then(|id| tables.projects.get(id))
            .cloned())
    }
}
