// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the value types shared by the domain, storage and
//! REST layers, plus the request and response bodies of the HTTP API. All
//! API types derive `Serialize`, `Deserialize`, and `ToSchema` for automatic
//! JSON handling and OpenAPI documentation.
//!
//! ## Wallet Address Type
//!
//! The [`WalletAddress`] newtype wraps a parsed 20-byte Ethereum-style
//! address. Parsing accepts any hex casing with or without the `0x` prefix;
//! the canonical form is lowercase with the prefix, so equality is case
//! insensitive.
//!
//! ## Model Categories
//!
//! - **Identifiers**: authorization request and project ids
//! - **Signature values**: wallet addresses, signed messages, status
//! - **Authorization requests**: create/attach bodies and responses

use std::str::FromStr;

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// =============================================================================
// Validation Limits
// =============================================================================

/// Maximum length of free-form string fields (redirect URL, message, screen texts).
pub const MAX_STRING_LENGTH: usize = 256;

/// Maximum length of an attached signed message.
pub const MAX_SIGNED_MESSAGE_LENGTH: usize = 1024;

/// Maximum serialized length of `arbitrary_data`.
pub const MAX_ARBITRARY_DATA_CHARS: usize = 5000;

// =============================================================================
// Identifiers
// =============================================================================

/// Identifier of an authorization request. Doubles as the access token for
/// the unauthenticated fetch and attach endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct AuthorizationRequestId(pub Uuid);

/// Identifier of a project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct ProjectId(pub Uuid);

impl std::fmt::Display for AuthorizationRequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Wallet Address Type
// =============================================================================

/// Error returned when a string is not a valid wallet address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("value must be a valid Ethereum address")]
pub struct InvalidWalletAddress;

/// Ethereum-compatible wallet address.
///
/// Format: `0x` followed by 40 hexadecimal characters (20 bytes).
///
/// # Example
///
/// ```rust,ignore
/// let addr: WalletAddress = "0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12".parse()?;
/// assert_eq!(addr.to_string(), "0x742d35cc6634c0532925a3b844bc9e7595f4ab12");
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "0x865f603f42ca1231e5b5f90e15663b0fe19f0b21")]
pub struct WalletAddress(Address);

impl WalletAddress {
    /// The raw 20-byte address.
    pub fn address(&self) -> Address {
        self.0
    }
}

impl From<Address> for WalletAddress {
    fn from(value: Address) -> Self {
        WalletAddress(value)
    }
}

impl FromStr for WalletAddress {
    type Err = InvalidWalletAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix("0x").unwrap_or(s);
        if hex.len() != 40 {
            return Err(InvalidWalletAddress);
        }
        Address::from_str(hex)
            .map(WalletAddress)
            .map_err(|_| InvalidWalletAddress)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = InvalidWalletAddress;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", alloy::hex::encode(self.0.as_slice()))
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.to_string()
    }
}

// =============================================================================
// Signed Message
// =============================================================================

/// Signature blob attached by the end user, kept exactly as submitted.
///
/// It is not parsed on attach: a malformed value is stored and later yields
/// a `FAILED` status.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SignedMessage(pub String);

impl SignedMessage {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SignedMessage {
    fn from(value: &str) -> Self {
        SignedMessage(value.to_string())
    }
}

impl From<String> for SignedMessage {
    fn from(value: String) -> Self {
        SignedMessage(value)
    }
}

// =============================================================================
// Status & Screen Config
// =============================================================================

/// Derived status of an authorization request. Never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizationStatus {
    Pending,
    Success,
    Failed,
}

/// Texts shown by the frontend before and after the wallet action.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ScreenConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_action_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_action_message: Option<String>,
}

// =============================================================================
// Authorization Request Models
// =============================================================================

/// Request to create a new authorization request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateAuthorizationRequest {
    /// Wallet that must sign. Any wallet is accepted when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    /// Redirect URL template; `${id}` is replaced with the request id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    /// Message-to-sign template; `${id}` is replaced with the request id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_to_sign: Option<String>,
    /// Keep the request after it has been completed. Defaults to `true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_indefinitely: Option<bool>,
    /// Opaque data returned unchanged with the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub arbitrary_data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_config: Option<ScreenConfig>,
}

/// Request to attach a wallet address and signature to an authorization request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttachSignedMessageRequest {
    pub wallet_address: String,
    pub signed_message: String,
}

/// Authorization request as returned by the API, with derived status.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AuthorizationRequestResponse {
    pub id: AuthorizationRequestId,
    pub project_id: ProjectId,
    pub status: AuthorizationStatus,
    pub redirect_url: String,
    /// Requested wallet address if one was set, otherwise the attached one.
    pub wallet_address: Option<WalletAddress>,
    #[schema(value_type = Option<Object>)]
    pub arbitrary_data: Option<serde_json::Value>,
    pub screen_config: ScreenConfig,
    pub message_to_sign: String,
    pub signed_message: Option<SignedMessage>,
    pub created_at: DateTime<Utc>,
}

/// List of authorization requests belonging to a project.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AuthorizationRequestsResponse {
    pub requests: Vec<AuthorizationRequestResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_address_is_case_insensitive() {
        let upper: WalletAddress = "0x865f603F42ca1231e5B5F90e15663b0FE19F0b21".parse().unwrap();
        let lower: WalletAddress = "865f603f42ca1231e5b5f90e15663b0fe19f0b21".parse().unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.to_string(), "0x865f603f42ca1231e5b5f90e15663b0fe19f0b21");
    }

    #[test]
    fn wallet_address_rejects_invalid_values() {
        assert!("invalid".parse::<WalletAddress>().is_err());
        assert!("".parse::<WalletAddress>().is_err());
        assert!("0x865f603f42ca1231e5b5f90e15663b0fe19f0b2".parse::<WalletAddress>().is_err());
        assert!("0x865f603f42ca1231e5b5f90e15663b0fe19f0b21b".parse::<WalletAddress>().is_err());
        assert!("0xzz5f603f42ca1231e5b5f90e15663b0fe19f0b21".parse::<WalletAddress>().is_err());
    }

    #[test]
    fn wallet_address_serializes_as_lowercase_string() {
        let addr: WalletAddress = "0x865f603F42ca1231e5B5F90e15663b0FE19F0b21".parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, r#""0x865f603f42ca1231e5b5f90e15663b0fe19f0b21""#);

        let back: WalletAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
        assert!(serde_json::from_str::<WalletAddress>(r#""nope""#).is_err());
    }

    #[test]
    fn status_uses_screaming_case() {
        assert_eq!(
            serde_json::to_string(&AuthorizationStatus::Pending).unwrap(),
            r#""PENDING""#
        );
        assert_eq!(
            serde_json::to_string(&AuthorizationStatus::Success).unwrap(),
            r#""SUCCESS""#
        );
        assert_eq!(
            serde_json::to_string(&AuthorizationStatus::Failed).unwrap(),
            r#""FAILED""#
        );
    }

    #[test]
    fn empty_screen_config_serializes_to_empty_object() {
        assert_eq!(serde_json::to_string(&ScreenConfig::default()).unwrap(), "{}");
    }
}
