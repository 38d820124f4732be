// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization request repository contract and persisted record.
//!
//! The persisted shape keeps `actual_wallet_address` and `signed_message`
//! as two nullable columns for interoperability. Converting back into the
//! domain type rejects a record where only one of them is set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::{RepositoryError, RepositoryResult};
use crate::authorization::{AttachedSignature, AuthorizationRequest};
use crate::models::{
    AuthorizationRequestId, ProjectId, ScreenConfig, SignedMessage, WalletAddress,
};

/// Storage contract for authorization requests.
///
/// `attach_signature` is the only mutation of an existing record. Backends
/// must implement it as one conditional update ("set both fields only if
/// both are null"), so that of several concurrent callers exactly one wins.
pub trait AuthorizationRequestRepository: Send + Sync {
    /// Insert a new request. Fails with `DuplicateId` if the id is taken.
    fn store(&self, request: &AuthorizationRequest) -> RepositoryResult<()>;

    fn get_by_id(&self, id: AuthorizationRequestId) -> RepositoryResult<Option<AuthorizationRequest>>;

    /// All requests of a project, oldest first (ties broken by id).
    fn list_by_project(&self, project_id: ProjectId) -> RepositoryResult<Vec<AuthorizationRequest>>;

    /// Attach wallet address and signature if none is attached yet.
    ///
    /// Fails with `NotFound` for an unknown id and `AlreadySet` if a previous
    /// attach succeeded; the stored values are then left untouched.
    fn attach_signature(
        &self,
        id: AuthorizationRequestId,
        wallet_address: WalletAddress,
        signed_message: &SignedMessage,
    ) -> RepositoryResult<()>;

    /// Delete requests not marked `store_indefinitely` created before `cutoff`.
    /// Returns the number of deleted requests.
    fn delete_expired(&self, cutoff: DateTime<Utc>) -> RepositoryResult<usize>;
}

/// Authorization request as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredAuthorizationRequest {
    pub id: AuthorizationRequestId,
    pub project_id: ProjectId,
    pub redirect_url: String,
    pub message_to_sign_override: Option<String>,
    pub store_indefinitely: bool,
    pub requested_wallet_address: Option<WalletAddress>,
    pub actual_wallet_address: Option<WalletAddress>,
    pub signed_message: Option<SignedMessage>,
    pub arbitrary_data: Option<serde_json::Value>,
    pub screen_config: ScreenConfig,
    pub created_at: DateTime<Utc>,
}

impl StoredAuthorizationRequest {
    /// Set wallet address and signature if both are still empty.
    pub fn attach_signature(
        &mut self,
        wallet_address: WalletAddress,
        signed_message: &SignedMessage,
    ) -> RepositoryResult<()> {
        if self.actual_wallet_address.is_some() || self.signed_message.is_some() {
            return Err(RepositoryError::AlreadySet(self.id));
        }
        self.actual_wallet_address = Some(wallet_address);
        self.signed_message = Some(signed_message.clone());
        Ok(())
    }

    /// Whether the retention sweeper may delete this record.
    pub fn is_expired(&self, cutoff: DateTime<Utc>) -> bool {
        !self.store_indefinitely && self.created_at < cutoff
    }
}

impl From<&AuthorizationRequest> for StoredAuthorizationRequest {
    fn from(request: &AuthorizationRequest) -> Self {
        Self {
            id: request.id,
            project_id: request.project_id,
            redirect_url: request.redirect_url.clone(),
            message_to_sign_override: request.message_to_sign_override.clone(),
            store_indefinitely: request.store_indefinitely,
            requested_wallet_address: request.requested_wallet_address,
            actual_wallet_address: request.actual_wallet_address(),
            signed_message: request.signed_message().cloned(),
            arbitrary_data: request.arbitrary_data.clone(),
            screen_config: request.screen_config.clone(),
            created_at: request.created_at,
        }
    }
}

impl TryFrom<StoredAuthorizationRequest> for AuthorizationRequest {
    type Error = RepositoryError;

    fn try_from(stored: StoredAuthorizationRequest) -> Result<Self, Self::Error> {
        let signature = match (stored.actual_wallet_address, stored.signed_message) {
            (Some(wallet_address), Some(signed_message)) => Some(AttachedSignature {
                wallet_address,
                signed_message,
            }),
            (None, None) => None,
            _ => {
                return Err(RepositoryError::Corrupted {
                    id: stored.id.to_string(),
                    reason: "wallet address and signed message must be set together".to_string(),
                })
            }
        };

        Ok(AuthorizationRequest {
            id: stored.id,
            project_id: stored.project_id,
            redirect_url: stored.redirect_url,
            message_to_sign_override: stored.message_to_sign_override,
            store_indefinitely: stored.store_indefinitely,
            requested_wallet_address: stored.requested_wallet_address,
            signature,
            arbitrary_data: stored.arbitrary_data,
            screen_config: stored.screen_config,
            created_at: stored.created_at,
        })
    }
}
