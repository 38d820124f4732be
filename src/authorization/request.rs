// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The authorization request entity.

use chrono::{DateTime, Utc};

use crate::models::{
    AuthorizationRequestId, AuthorizationRequestResponse, AuthorizationStatus, ProjectId,
    ScreenConfig, SignedMessage, WalletAddress,
};

/// Prefix of the message to sign when the creator supplied no override.
pub const DEFAULT_MESSAGE_PREFIX: &str = "Authorization message ID to sign: ";

/// Wallet address and signature, attached together exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedSignature {
    pub wallet_address: WalletAddress,
    pub signed_message: SignedMessage,
}

/// A fully resolved authorization request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizationRequest {
    pub id: AuthorizationRequestId,
    pub project_id: ProjectId,
    pub redirect_url: String,
    /// Resolved override; `None` means the default message.
    pub message_to_sign_override: Option<String>,
    pub store_indefinitely: bool,
    pub requested_wallet_address: Option<WalletAddress>,
    /// `None` until the attach operation succeeds.
    pub signature: Option<AttachedSignature>,
    pub arbitrary_data: Option<serde_json::Value>,
    pub screen_config: ScreenConfig,
    pub created_at: DateTime<Utc>,
}

impl AuthorizationRequest {
    /// The exact text the wallet is asked to sign.
    pub fn message_to_sign(&self) -> String {
        match &self.message_to_sign_override {
            Some(message) => message.clone(),
            None => format!("{DEFAULT_MESSAGE_PREFIX}{}", self.id),
        }
    }

    pub fn actual_wallet_address(&self) -> Option<WalletAddress> {
        self.signature.as_ref().map(|s| s.wallet_address)
    }

    pub fn signed_message(&self) -> Option<&SignedMessage> {
        self.signature.as_ref().map(|s| &s.signed_message)
    }
}

/// An authorization request together with its derived status.
#[derive(Debug, Clone, PartialEq)]
pub struct WithStatus {
    pub request: AuthorizationRequest,
    pub status: AuthorizationStatus,
}

impl From<WithStatus> for AuthorizationRequestResponse {
    fn from(value: WithStatus) -> Self {
        let WithStatus { request, status } = value;
        let message_to_sign = request.message_to_sign();
        let wallet_address = request
            .requested_wallet_address
            .or_else(|| request.actual_wallet_address());

        AuthorizationRequestResponse {
            id: request.id,
            project_id: request.project_id,
            status,
            redirect_url: request.redirect_url,
            wallet_address,
            arbitrary_data: request.arbitrary_data,
            screen_config: request.screen_config,
            message_to_sign,
            signed_message: request.signature.map(|s| s.signed_message),
            created_at: request.created_at,
        }
    }
}
