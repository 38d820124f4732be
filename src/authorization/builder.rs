// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Construction of new authorization requests.
//!
//! The builder validates caller-supplied templates, draws a fresh id from a
//! [`UuidProvider`], resolves the redirect URL and message templates against
//! that id and stamps the request with the [`Clock`]. It performs no I/O;
//! persisting the result is the caller's job.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{template, AuthorizationError, AuthorizationRequest};
use crate::models::{AuthorizationRequestId, ScreenConfig, WalletAddress};
use crate::storage::Project;

/// Source of request identifiers.
pub trait UuidProvider: Send + Sync {
    fn new_uuid(&self) -> Uuid;
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomUuidProvider;

impl UuidProvider for RandomUuidProvider {
    fn new_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Source of creation timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Caller-supplied parameters for a new authorization request.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateAuthorizationParams {
    pub redirect_url: Option<String>,
    pub message_to_sign: Option<String>,
    pub store_indefinitely: bool,
    pub requested_wallet_address: Option<WalletAddress>,
    pub arbitrary_data: Option<serde_json::Value>,
    pub screen_config: ScreenConfig,
}

impl Default for CreateAuthorizationParams {
    fn default() -> Self {
        Self {
            redirect_url: None,
            message_to_sign: None,
            store_indefinitely: true,
            requested_wallet_address: None,
            arbitrary_data: None,
            screen_config: ScreenConfig::default(),
        }
    }
}

/// Default redirect target for a project: `<base>/request-authorization/<id>/action`.
pub fn default_redirect_url(base_redirect_url: &str, id: AuthorizationRequestId) -> String {
    format!(
        "{}/request-authorization/{id}/action",
        base_redirect_url.trim_end_matches('/')
    )
}

/// Builds fully resolved [`AuthorizationRequest`]s.
pub struct RequestBuilder<'a> {
    uuids: &'a dyn UuidProvider,
    clock: &'a dyn Clock,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(uuids: &'a dyn UuidProvider, clock: &'a dyn Clock) -> Self {
        Self { uuids, clock }
    }

    /// Build a request for `project`.
    ///
    /// Templates are validated before an id is drawn, so an `InvalidTemplate`
    /// error consumes nothing.
    pub fn build(
        &self,
        project: &Project,
        params: CreateAuthorizationParams,
    ) -> Result<AuthorizationRequest, AuthorizationError> {
        if let Some(url) = &params.redirect_url {
            template::validate(url)?;
        }
        if let Some(message) = &params.message_to_sign {
            template::validate(message)?;
        }

        let id = AuthorizationRequestId(self.uuids.new_uuid());

        let redirect_url = match &params.redirect_url {
            Some(url) => template::resolve(url, id),
            None => default_redirect_url(&project.base_redirect_url, id),
        };
        let message_to_sign_override = params
            .message_to_sign
            .as_deref()
            .map(|message| template::resolve(message, id));

        Ok(AuthorizationRequest {
            id,
            project_id: project.id,
            redirect_url,
            message_to_sign_override,
            store_indefinitely: params.store_indefinitely,
            requested_wallet_address: params.requested_wallet_address,
            signature: None,
            arbitrary_data: params.arbitrary_data,
            screen_config: params.screen_config,
            created_at: self.clock.now(),
        })
    }
}
