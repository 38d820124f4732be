// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for project API keys.
//!
//! ```rust,ignore
//! async fn my_handler(ApiKey(project): ApiKey) -> impl IntoResponse {
//!     // project is the Project owning the key
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::AuthError;
use crate::models::ProjectId;
use crate::state::AppState;
use crate::storage::Project;

/// Header carrying the project API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Extractor resolving the `X-API-KEY` header to its project.
pub struct ApiKey(pub Project);

impl ApiKey {
    /// Reject access to any project other than the key's own.
    pub fn require_project(&self, project_id: ProjectId) -> Result<(), AuthError> {
        if self.0.id == project_id {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

impl FromRequestParts<AppState> for ApiKey {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(API_KEY_HEADER)
            .ok_or(AuthError::MissingApiKey)?
            .to_str()
            .map_err(|_| AuthError::InvalidApiKey)?
            .trim();

        if key.is_empty() {
            return Err(AuthError::MissingApiKey);
        }

        let project = state
            .projects
            .get_project_by_api_key(key)
            .map_err(|e| {
                tracing::error!(error = %e, "API key lookup failed");
                AuthError::InternalError("key lookup failed".to_string())
            })?
            .ok_or(AuthError::InvalidApiKey)?;

        Ok(ApiKey(project))
    }
}
