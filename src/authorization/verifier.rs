// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signature verification for wallet authorization.
//!
//! Wallets sign with Ethereum `personal_sign` (EIP-191): the message is
//! prefixed with `"\x19Ethereum Signed Message:\n" + len`, hashed with
//! keccak256 and signed with secp256k1. The 65-byte `r || s || v` signature
//! lets us recover the signer's public key and therefore its address, which
//! is then compared to the address the client claims to have used.

use alloy::primitives::Signature;

use crate::models::{SignedMessage, WalletAddress};

/// Length of a recoverable secp256k1 signature (`r || s || v`).
pub const SIGNATURE_LENGTH: usize = 65;

/// Address recovered from a signature that matched the claimed address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedAddress(pub WalletAddress);

/// Why a signature did not verify.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationFailure {
    /// Not decodable, wrong length, bad recovery id or failed recovery.
    #[error("malformed signature: {0}")]
    Malformed(String),
    /// Recovery succeeded but produced a different address.
    #[error("signature was produced by {recovered}, not {claimed}")]
    Mismatch {
        recovered: WalletAddress,
        claimed: WalletAddress,
    },
}

/// Verifies that `signed_message` is a signature over `message` by `claimed`.
///
/// Implementations must be pure: the same inputs always give the same
/// result, since status is re-derived on every read.
pub trait SignatureVerifier: Send + Sync {
    fn verify(
        &self,
        signed_message: &SignedMessage,
        message: &str,
        claimed: &WalletAddress,
    ) -> Result<VerifiedAddress, VerificationFailure>;
}

/// EIP-191 `personal_sign` verifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct EthereumSignatureVerifier;

impl EthereumSignatureVerifier {
    /// Recover the address that signed `message`.
    pub fn recover(
        signed_message: &SignedMessage,
        message: &str,
    ) -> Result<WalletAddress, VerificationFailure> {
        let raw = signed_message.as_str();
        let hex = raw.strip_prefix("0x").unwrap_or(raw);
        let bytes = alloy::hex::decode(hex)
            .map_err(|e| VerificationFailure::Malformed(format!("invalid hex: {e}")))?;

        if bytes.len() != SIGNATURE_LENGTH {
            return Err(VerificationFailure::Malformed(format!(
                "signature must be {SIGNATURE_LENGTH} bytes, got {}",
                bytes.len()
            )));
        }

        // personal_sign only; from_raw alone would also take EIP-155 values (>= 35)
        let v = bytes[SIGNATURE_LENGTH - 1];
        if !matches!(v, 0 | 1 | 27 | 28) {
            return Err(VerificationFailure::Malformed(format!(
                "unsupported recovery id {v}"
            )));
        }
        let signature = Signature::from_raw(&bytes)
            .map_err(|e| VerificationFailure::Malformed(format!("invalid signature: {e}")))?;

        signature
            .recover_address_from_msg(message.as_bytes())
            .map(WalletAddress::from)
            .map_err(|e| VerificationFailure::Malformed(format!("recovery failed: {e}")))
    }
}

impl SignatureVerifier for EthereumSignatureVerifier {
    fn verify(
        &self,
        signed_message: &SignedMessage,
        message: &str,
        claimed: &WalletAddress,
    ) -> Result<VerifiedAddress, VerificationFailure> {
        let recovered = Self::recover(signed_message, message)?;
        if &recovered != claimed {
            return Err(VerificationFailure::Mismatch {
                recovered,
                claimed: *claimed,
            });
        }
        Ok(VerifiedAddress(recovered))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloy::signers::{local::PrivateKeySigner, SignerSync};

    // Signed with MetaMask.
    const MESSAGE: &str = "Verification message ID to sign: 7d86b0ac-a9a6-40fc-ac6d-2a29ca687f73";
    const WALLET_ADDRESS: &str = "0x865f603F42ca1231e5B5F90e15663b0FE19F0b21";
    const VALID_SIGNATURE: &str = "0xfc90c8aa9f2164234b8826144d8ecfc287b5d7c168d0e9d284baf76dbef55c4c\
        5761cf46e34b7cdb72cc97f1fb1c19f315ee7a430dd6111fa6c693b41c96c5501c";
    // Same message, signed by another MetaMask account.
    const OTHER_SIGNATURE: &str = "0x653d99ce15acbfe1cb0c967ecac59781a6d5192b2c50d3ae89c8fdc14c60e37e\
        24704719abb1d34572335861ff48d0d22adaf5145339de09afc8820d82fba77b1b";

    pub(crate) const KEY_A: &str =
        "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    pub(crate) const KEY_B: &str =
        "8da4ef21b864d2cc526dbdb2a120bd2874c36c9d0a1fb7f8c63d7f7a8b41de8f";

    pub(crate) fn signer(key: &str) -> PrivateKeySigner {
        key.parse().unwrap()
    }

    pub(crate) fn address_of(signer: &PrivateKeySigner) -> WalletAddress {
        WalletAddress::from(signer.address())
    }

    /// Produce a `0x`-prefixed EIP-191 signature over `message`.
    pub(crate) fn sign(signer: &PrivateKeySigner, message: &str) -> SignedMessage {
        let signature = signer.sign_message_sync(message.as_bytes()).unwrap();
        SignedMessage(format!("0x{}", alloy::hex::encode(signature.as_bytes())))
    }

    fn wallet() -> WalletAddress {
        WALLET_ADDRESS.parse().unwrap()
    }

    #[test]
    fn metamask_signature_matches() {
        let result = EthereumSignatureVerifier.verify(&VALID_SIGNATURE.into(), MESSAGE, &wallet());
        assert_eq!(result, Ok(VerifiedAddress(wallet())));
    }

    #[test]
    fn signature_from_other_account_mismatches() {
        let result = EthereumSignatureVerifier.verify(&OTHER_SIGNATURE.into(), MESSAGE, &wallet());
        match result {
            Err(VerificationFailure::Mismatch { recovered, claimed }) => {
                assert_ne!(recovered, wallet());
                assert_eq!(claimed, wallet());
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn signature_over_other_message_mismatches() {
        let result = EthereumSignatureVerifier.verify(
            &VALID_SIGNATURE.into(),
            "Verification message ID to sign: something else",
            &wallet(),
        );
        assert!(matches!(result, Err(VerificationFailure::Mismatch { .. })));
    }

    #[test]
    fn too_short_signature_is_malformed() {
        let result = EthereumSignatureVerifier.verify(&"0x".into(), MESSAGE, &wallet());
        assert!(matches!(result, Err(VerificationFailure::Malformed(_))));
    }

    #[test]
    fn non_hex_signature_is_malformed() {
        let garbage = SignedMessage("x".repeat(132));
        let result = EthereumSignatureVerifier.verify(&garbage, MESSAGE, &wallet());
        assert!(matches!(result, Err(VerificationFailure::Malformed(_))));

        let result = EthereumSignatureVerifier.verify(&"signed-message".into(), MESSAGE, &wallet());
        assert!(matches!(result, Err(VerificationFailure::Malformed(_))));
    }

    #[test]
    fn invalid_recovery_id_is_malformed() {
        let mut bytes = alloy::hex::decode(&VALID_SIGNATURE[2..]).unwrap();
        bytes[64] = 5;
        let tampered = SignedMessage(format!("0x{}", alloy::hex::encode(bytes)));
        let result = EthereumSignatureVerifier.verify(&tampered, MESSAGE, &wallet());
        assert!(matches!(result, Err(VerificationFailure::Malformed(_))));
    }

    #[test]
    fn eip155_recovery_id_is_malformed() {
        let signer = signer(KEY_A);
        let signature = sign(&signer, "hello");
        let mut bytes = alloy::hex::decode(&signature.as_str()[2..]).unwrap();
        for v in [35u8, 36, 37, 38] {
            bytes[64] = v;
            let tampered = SignedMessage(format!("0x{}", alloy::hex::encode(&bytes)));
            let result = EthereumSignatureVerifier.verify(&tampered, "hello", &address_of(&signer));
            assert!(
                matches!(result, Err(VerificationFailure::Malformed(_))),
                "v = {v} must be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn legacy_and_raw_recovery_ids_are_accepted() {
        let signer = signer(KEY_A);
        let signature = sign(&signer, "hello");
        let mut bytes = alloy::hex::decode(&signature.as_str()[2..]).unwrap();
        bytes[64] -= 27;
        let raw_v = SignedMessage(format!("0x{}", alloy::hex::encode(&bytes)));
        assert!(EthereumSignatureVerifier
            .verify(&raw_v, "hello", &address_of(&signer))
            .is_ok());
    }

    #[test]
    fn locally_signed_message_round_trips() {
        let signer = signer(KEY_A);
        let message = "Authorization message ID to sign: 2d3e9c1b-5f6a-4e0b-9c8d-7a6b5c4d3e2f";
        let signature = sign(&signer, message);

        let result = EthereumSignatureVerifier.verify(&signature, message, &address_of(&signer));
        assert_eq!(result, Ok(VerifiedAddress(address_of(&signer))));

        // Without the 0x prefix too.
        let bare = SignedMessage(signature.as_str()[2..].to_string());
        assert!(EthereumSignatureVerifier
            .verify(&bare, message, &address_of(&signer))
            .is_ok());
    }

    #[test]
    fn verification_is_deterministic() {
        let signer = signer(KEY_B);
        let signature = sign(&signer, MESSAGE);
        let first = EthereumSignatureVerifier.verify(&signature, MESSAGE, &wallet());
        let second = EthereumSignatureVerifier.verify(&signature, MESSAGE, &wallet());
        assert_eq!(first, second);
        assert!(matches!(first, Err(VerificationFailure::Mismatch { .. })));
    }
}
