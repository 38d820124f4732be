// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization service errors.

use crate::models::{AuthorizationRequestId, ProjectId};
use crate::storage::RepositoryError;

/// Errors surfaced by the authorization service.
///
/// None of these are transient; callers decide what to do next.
#[derive(Debug, thiserror::Error)]
pub enum AuthorizationError {
    /// Caller-supplied template has bad placeholder syntax. Never persisted.
    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    #[error("authorization request not found: {0}")]
    RequestNotFound(AuthorizationRequestId),

    /// A signature was already attached; the stored one is unchanged.
    #[error("signed message already attached to authorization request {0}")]
    AlreadySet(AuthorizationRequestId),

    #[error("authorization request {0} already exists")]
    DuplicateId(AuthorizationRequestId),

    #[error("storage error: {0}")]
    Storage(RepositoryError),
}

impl From<RepositoryError> for AuthorizationError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(id) => AuthorizationError::RequestNotFound(id),
            RepositoryError::AlreadySet(id) => AuthorizationError::AlreadySet(id),
            RepositoryError::DuplicateId(id) => AuthorizationError::DuplicateId(id),
            other => AuthorizationError::Storage(other),
        }
    }
}
