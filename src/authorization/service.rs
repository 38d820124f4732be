// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization request service.
//!
//! Orchestrates the builder, the repositories and the verifier. HTTP
//! handlers call into this; it knows nothing about transport.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{
    with_status, AttachedSignature, AuthorizationError, Clock, CreateAuthorizationParams, EthereumSignatureVerifier,
    RandomUuidProvider, RequestBuilder, SignatureVerifier, SystemClock, UuidProvider, WithStatus,
};
use crate::models::{AuthorizationRequestId, AuthorizationStatus, ProjectId, SignedMessage, WalletAddress};
use crate::storage::{AuthorizationRequestRepository, ProjectRepository};

pub struct AuthorizationRequestService {
    requests: Arc<dyn AuthorizationRequestRepository>,
    projects: Arc<dyn ProjectRepository>,
    verifier: Arc<dyn SignatureVerifier>,
    uuids: Arc<dyn UuidProvider>,
    clock: Arc<dyn Clock>,
}

impl AuthorizationRequestService {
    /// Service with random ids, the wall clock and EIP-191 verification.
    pub fn new(
        requests: Arc<dyn AuthorizationRequestRepository>,
        projects: Arc<dyn ProjectRepository>,
    ) -> Self {
        Self {
            requests,
            projects,
            verifier: Arc::new(EthereumSignatureVerifier),
            uuids: Arc::new(RandomUuidProvider),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn SignatureVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn with_uuid_provider(mut self, uuids: Arc<dyn UuidProvider>) -> Self {
        self.uuids = uuids;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Create and persist a new request for `project_id`. Always `PENDING`.
    pub fn create(
        &self,
        project_id: ProjectId,
        params: CreateAuthorizationParams,
    ) -> Result<WithStatus, AuthorizationError> {
        let project = self
            .projects
            .get_project(project_id)?
            .ok_or(AuthorizationError::ProjectNotFound(project_id))?;

        let request = RequestBuilder::new(self.uuids.as_ref(), self.clock.as_ref())
            .build(&project, params)?;
        self.requests.store(&request)?;

        info!(
            request_id = %request.id,
            project_id = %project_id,
            store_indefinitely = request.store_indefinitely,
            "Created authorization request"
        );

        Ok(WithStatus {
            request,
            status: AuthorizationStatus::Pending,
        })
    }

    /// Fetch a request and derive its status. Never mutates storage.
    pub fn get(&self, id: AuthorizationRequestId) -> Result<WithStatus, AuthorizationError> {
        let request = self
            .requests
            .get_by_id(id)?
            .ok_or(AuthorizationError::RequestNotFound(id))?;
        let result = with_status(request, self.verifier.as_ref());
        debug!(request_id = %id, status = ?result.status, "Fetched authorization request");
        Ok(result)
    }

    /// All requests of a project, oldest first, each with its derived status.
    pub fn list_by_project(&self, project_id: ProjectId) -> Result<Vec<WithStatus>, AuthorizationError> {
        let requests = self.requests.list_by_project(project_id)?;
        debug!(project_id = %project_id, count = requests.len(), "Listed authorization requests");
        Ok(requests
            .into_iter()
            .map(|request| with_status(request, self.verifier.as_ref()))
            .collect())
    }

    /// Attach a wallet address and signature.
    ///
    /// Succeeds whenever the slot was empty, whatever the signature is worth;
    /// verification only shows up in the returned status.
    pub fn attach(
        &self,
        id: AuthorizationRequestId,
        wallet_address: WalletAddress,
        signed_message: SignedMessage,
    ) -> Result<WithStatus, AuthorizationError> {
        let mut request = self
            .requests
            .get_by_id(id)?
            .ok_or(AuthorizationError::RequestNotFound(id))?;
        self.requests
            .attach_signature(id, wallet_address, &signed_message)?;

        // Committed; the record may already be swept, so no re-read.
        request.signature = Some(AttachedSignature {
            wallet_address,
            signed_message,
        });
        let result = with_status(request, self.verifier.as_ref());
        info!(
            request_id = %id,
            wallet_address = %wallet_address,
            status = ?result.status,
            "Attached signed message to authorization request"
        );
        Ok(result)
    }

    /// Delete non-indefinite requests created before `cutoff`.
    pub fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<usize, AuthorizationError> {
        let deleted = self.requests.delete_expired(cutoff)?;
        if deleted > 0 {
            info!(deleted, cutoff = %cutoff, "Purged expired authorization requests");
        }
        Ok(deleted)
    }
}
