// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::authorization::AuthorizationRequestService;
use crate::storage::{AuthDatabase, InMemoryRepository, ProjectRepository};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AuthorizationRequestService>,
    pub projects: Arc<dyn ProjectRepository>,
    /// Present when backed by redb; probed by the readiness check.
    pub db: Option<Arc<AuthDatabase>>,
}

impl AppState {
    /// State backed by the redb database.
    pub fn new(db: Arc<AuthDatabase>) -> Self {
        let service = AuthorizationRequestService::new(db.clone(), db.clone());
        Self {
            service: Arc::new(service),
            projects: db.clone(),
            db: Some(db),
        }
    }

    /// State backed by an in-memory repository.
    pub fn in_memory(repo: Arc<InMemoryRepository>) -> Self {
        Self {
            service: Arc::new(AuthorizationRequestService::new(repo.clone(), repo.clone())),
            projects: repo,
            db: None,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory(Arc::new(InMemoryRepository::new()))
    }
}
