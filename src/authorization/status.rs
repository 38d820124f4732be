// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Status derivation.
//!
//! Status is never stored. It is recomputed from the signature fields on
//! every read, so it cannot drift from the raw data:
//!
//! | signature | verification | requested address | status |
//! |-----------|--------------|-------------------|--------|
//! | none      | -            | -                 | `PENDING` |
//! | present   | fails        | -                 | `FAILED` |
//! | present   | ok           | none or equal     | `SUCCESS` |
//! | present   | ok           | different         | `FAILED` |

use super::{AuthorizationRequest, SignatureVerifier, WithStatus};
use crate::models::AuthorizationStatus;

/// Derive the status of `request`. Pure; never touches storage.
pub fn derive_status(
    request: &AuthorizationRequest,
    verifier: &dyn SignatureVerifier,
) -> AuthorizationStatus {
    let Some(signature) = &request.signature else {
        return AuthorizationStatus::Pending;
    };

    let message = request.message_to_sign();
    let verified = match verifier.verify(&signature.signed_message, &message, &signature.wallet_address) {
        Ok(verified) => verified,
        Err(failure) => {
            tracing::debug!(request_id = %request.id, %failure, "Signature verification failed");
            return AuthorizationStatus::Failed;
        }
    };

    match request.requested_wallet_address {
        Some(requested) if requested != verified.0 => AuthorizationStatus::Failed,
        _ => AuthorizationStatus::Success,
    }
}

/// Pair `request` with its derived status.
pub fn with_status(request: AuthorizationRequest, verifier: &dyn SignatureVerifier) -> WithStatus {
    let status = derive_status(&request, verifier);
    WithStatus { request, status }
}
