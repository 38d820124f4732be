// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Authorization Core
//!
//! A project creates an authorization request, the end user's wallet signs
//! the request's message, and the signature is attached to the request.
//! Every read derives `PENDING`, `SUCCESS` or `FAILED` from the stored fields.
//!
//! ## Modules
//!
//! - [`builder`]: id generation, template resolution, defaults
//! - [`template`]: `${id}` placeholder validation and substitution
//! - [`verifier`]: EIP-191 signature recovery
//! - [`status`]: derived state machine
//! - [`service`]: orchestration over the repositories

pub mod builder;
pub mod error;
pub mod request;
pub mod service;
pub mod status;
pub mod template;
pub mod verifier;

pub use builder::{
    default_redirect_url, Clock, CreateAuthorizationParams, RandomUuidProvider, RequestBuilder,
    SystemClock, UuidProvider,
};
pub use error::AuthorizationError;
pub use request::{AttachedSignature, AuthorizationRequest, WithStatus, DEFAULT_MESSAGE_PREFIX};
pub use service::AuthorizationRequestService;
pub use status::{derive_status, with_status};
pub use verifier::{
    EthereumSignatureVerifier, SignatureVerifier, VerificationFailure, VerifiedAddress,
};
