// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Encryption / Decryption Façade
//!
//! - `encrypt` needs only a connection (it connects on demand). Keys are
//!   bound to the policy, so no wallet signature is involved.
//! - `decrypt` needs a connection and a fresh session, so every call
//!   prompts the wallet once.
//!
//! Network failures are reduced to [`VaultError`]; an unmet policy surfaces
//! as `DecryptionDenied`, never as a transport error.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{VaultError, VaultResult};
use crate::network::{DecryptRequest, EncryptRequest, NetworkError};
use crate::policy::AccessControlPolicy;
use crate::session::SessionManager;

/// Ciphertext plus the integrity digest of its plaintext. Both are needed to
/// decrypt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedPayload {
    pub ciphertext: String,
    pub data_to_encrypt_hash: String,
}

impl EncryptedPayload {
    /// JSON form stored on chain: `{"ciphertext":..,"dataToEncryptHash":..}`.
    pub fn to_json(&self) -> VaultResult<String> {
        serde_json::to_string(self).map_err(|e| VaultError::EncryptionError(e.to_string()))
    }

    /// Parse a stored payload. A payload missing either field cannot be
    /// decrypted and is reported as an integrity failure.
    pub fn from_json(json: &str) -> VaultResult<Self> {
        let payload: EncryptedPayload = serde_json::from_str(json).map_err(|e| {
            tracing::warn!(error = %e, "Stored payload is not a valid encrypted payload");
            VaultError::IntegrityMismatch
        })?;
        if payload.ciphertext.is_empty() || payload.data_to_encrypt_hash.is_empty() {
            return Err(VaultError::IntegrityMismatch);
        }
        Ok(payload)
    }
}

/// Lowercase hex SHA-256 of the plaintext bytes.
pub fn data_to_encrypt_hash(plaintext: &str) -> String {
    alloy::hex::encode(Sha256::digest(plaintext.as_bytes()))
}

/// Policy-bound encryption through the session manager's network client.
pub struct LitCrypto {
    sessions: SessionManager,
}

impl LitCrypto {
    pub fn new(sessions: SessionManager) -> Self {
        Self { sessions }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Encrypt `plaintext` so that only wallets satisfying `policy` can
    /// decrypt it. Each call uses fresh randomness.
    pub async fn encrypt(
        &self,
        plaintext: &str,
        policy: &AccessControlPolicy,
    ) -> VaultResult<EncryptedPayload> {
        policy.validate()?;
        self.sessions.connect().await?;
        let backend = self.sessions.client().connected_backend().await?;

        let response = match backend
            .encrypt_string(EncryptRequest { policy, plaintext })
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.sessions.client().observe(&e).await;
                tracing::warn!(error = %e, "Encryption failed");
                return Err(match e {
                    NetworkError::NotConnected => VaultError::NotConnected,
                    other => VaultError::EncryptionError(other.to_string()),
                });
            }
        };

        tracing::debug!(
            policy_hash = %policy.hash_of_conditions(),
            "Encrypted payload"
        );
        Ok(EncryptedPayload {
            ciphertext: response.ciphertext,
            data_to_encrypt_hash: response.data_to_encrypt_hash,
        })
    }

    /// Decrypt with a freshly issued session.
    pub async fn decrypt(
        &self,
        ciphertext: &str,
        data_to_encrypt_hash: &str,
        policy: &AccessControlPolicy,
    ) -> VaultResult<String> {
        policy.validate()?;
        if ciphertext.is_empty() || data_to_encrypt_hash.is_empty() {
            return Err(VaultError::IntegrityMismatch);
        }

        let backend = self.sessions.client().connected_backend().await?;
        let session = self.sessions.get_session_signatures().await?;

        let plaintext = match backend
            .decrypt_to_string(DecryptRequest {
                policy,
                ciphertext,
                data_to_encrypt_hash,
                chain: self.sessions.chain(),
                session: session.sigs(),
            })
            .await
        {
            Ok(plaintext) => plaintext,
            Err(e) => {
                self.sessions.client().observe(&e).await;
                let error = decrypt_error(e);
                tracing::warn!(
                    address = %session.wallet_address,
                    error_code = error.error_code(),
                    "Decryption failed"
                );
                return Err(error);
            }
        };

        if !data_to_encrypt_hash_matches(&plaintext, data_to_encrypt_hash) {
            return Err(VaultError::IntegrityMismatch);
        }

        tracing::debug!(address = %session.wallet_address, "Decrypted payload");
        Ok(plaintext)
    }

    pub async fn decrypt_payload(
        &self,
        payload: &EncryptedPayload,
        policy: &AccessControlPolicy,
    ) -> VaultResult<String> {
        self.decrypt(&payload.ciphertext, &payload.data_to_encrypt_hash, policy)
            .await
    }
}

fn data_to_encrypt_hash_matches(plaintext: &str, expected: &str) -> bool {
    let expected = expected.trim().trim_start_matches("0x");
    data_to_encrypt_hash(plaintext).eq_ignore_ascii_case(expected)
}

fn decrypt_error(error: NetworkError) -> VaultError {
    match error {
        NetworkError::AccessDenied(reason) => VaultError::DecryptionDenied(reason),
        NetworkError::IntegrityMismatch => VaultError::IntegrityMismatch,
        NetworkError::NotConnected => VaultError::NotConnected,
        NetworkError::SessionRejected(reason) => VaultError::SessionIssuanceError(reason),
        NetworkError::AuthCallback(e) => VaultError::SessionIssuanceError(e.to_string()),
        NetworkError::Transport(reason) => VaultError::ConnectionError(reason),
        NetworkError::BlockhashUnavailable => {
            VaultError::FreshnessFetchError("latest blockhash unavailable".to_string())
        }
        NetworkError::Encryption(reason) | NetworkError::Decryption(reason) => {
            VaultError::EncryptionError(reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use base64ct::{Base64, Encoding};

    use super::*;
    use crate::network::ConnectionState;
    use crate::policy::{default_policy, AccessControlCondition, Chain, Comparator};
    use crate::testing::{Harness, MockWallet, WalletBehavior};

    #[tokio::test]
    async fn round_trip_recovers_plaintext() {
        let harness = Harness::funded();
        let policy = default_policy();

        let payload = harness.crypto.encrypt("hunter2", &policy).await.unwrap();
        let plaintext = harness.crypto.decrypt_payload(&payload, &policy).await.unwrap();
        assert_eq!(plaintext, "hunter2");
    }

    #[tokio::test]
    async fn encrypt_connects_without_prompting_wallet() {
        let harness = Harness::funded();
        assert_eq!(
            harness.crypto.sessions().client().state().await,
            ConnectionState::Disconnected
        );

        harness.crypto.encrypt("secret", &default_policy()).await.unwrap();
        assert_eq!(
            harness.crypto.sessions().client().state().await,
            ConnectionState::Connected
        );
        assert_eq!(harness.wallet.prompts(), 0);
    }

    #[tokio::test]
    async fn repeated_encryption_is_fresh_yet_decryptable() {
        let harness = Harness::funded();
        let policy = default_policy();

        let a = harness.crypto.encrypt("same secret", &policy).await.unwrap();
        let b = harness.crypto.encrypt("same secret", &policy).await.unwrap();
        assert_ne!(a.ciphertext, b.ciphertext);
        assert_eq!(a.data_to_encrypt_hash, b.data_to_encrypt_hash);

        assert_eq!(harness.crypto.decrypt_payload(&a, &policy).await.unwrap(), "same secret");
        assert_eq!(harness.crypto.decrypt_payload(&b, &policy).await.unwrap(), "same secret");
    }

    #[tokio::test]
    async fn tampered_hash_is_an_integrity_mismatch() {
        let harness = Harness::funded();
        let policy = default_policy();
        let payload = harness.crypto.encrypt("secret", &policy).await.unwrap();

        let forged_hash = data_to_encrypt_hash("other secret");
        let err = harness
            .crypto
            .decrypt(&payload.ciphertext, &forged_hash, &policy)
            .await
            .unwrap_err();
        assert_eq!(err, VaultError::IntegrityMismatch);
    }

    #[tokio::test]
    async fn tampered_ciphertext_is_an_integrity_mismatch() {
        let harness = Harness::funded();
        let policy = default_policy();
        let payload = harness.crypto.encrypt("secret", &policy).await.unwrap();

        let mut bytes = Base64::decode_vec(&payload.ciphertext).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let flipped = Base64::encode_string(&bytes);

        let err = harness
            .crypto
            .decrypt(&flipped, &payload.data_to_encrypt_hash, &policy)
            .await
            .unwrap_err();
        assert_eq!(err, VaultError::IntegrityMismatch);

        let err = harness
            .crypto
            .decrypt("not base64!", &payload.data_to_encrypt_hash, &policy)
            .await
            .unwrap_err();
        assert_eq!(err, VaultError::IntegrityMismatch);
    }

    #[tokio::test]
    async fn insufficient_balance_is_denied_not_a_transport_error() {
        let harness = Harness::with_wallet(MockWallet::new(WalletBehavior::Approve));
        harness.fund(harness.wallet.wallet_address(), "999999999999");
        let policy = default_policy();
        let payload = harness.crypto.encrypt("secret", &policy).await.unwrap();

        let err = harness.crypto.decrypt_payload(&payload, &policy).await.unwrap_err();
        assert!(matches!(err, VaultError::DecryptionDenied(_)));
        assert!(err.is_authorization_failure());
        assert!(!matches!(err, VaultError::ConnectionError(_)));
    }

    #[tokio::test]
    async fn ciphertext_is_bound_to_its_policy() {
        let harness = Harness::funded();
        let payload = harness.crypto.encrypt("secret", &default_policy()).await.unwrap();

        let looser = AccessControlPolicy::new(vec![AccessControlCondition::native_balance(
            Chain::Ethereum,
            Comparator::Gte,
            "0",
        )])
        .unwrap();
        let err = harness.crypto.decrypt_payload(&payload, &looser).await.unwrap_err();
        assert_eq!(err, VaultError::IntegrityMismatch);
    }

    #[tokio::test]
    async fn decrypt_requires_connection() {
        let harness = Harness::funded();
        let payload = EncryptedPayload {
            ciphertext: "AAAA".to_string(),
            data_to_encrypt_hash: data_to_encrypt_hash("x"),
        };

        let err = harness
            .crypto
            .decrypt_payload(&payload, &default_policy())
            .await
            .unwrap_err();
        assert_eq!(err, VaultError::NotConnected);
        assert_eq!(harness.wallet.prompts(), 0);
    }

    #[tokio::test]
    async fn unreachable_network_fails_encrypt_with_connection_error() {
        let harness = Harness::funded();
        harness.network.set_reachable(false);

        let err = harness.crypto.encrypt("secret", &default_policy()).await.unwrap_err();
        assert!(matches!(err, VaultError::ConnectionError(_)));
        assert_eq!(
            harness.crypto.sessions().client().state().await,
            ConnectionState::Disconnected
        );
    }

    #[tokio::test]
    async fn rejected_prompt_surfaces_during_decrypt() {
        let harness = Harness::with_wallet(MockWallet::new(WalletBehavior::RejectSignature));
        harness.fund(harness.wallet.wallet_address(), "1000000000000");
        let policy = default_policy();
        let payload = harness.crypto.encrypt("secret", &policy).await.unwrap();

        let err = harness.crypto.decrypt_payload(&payload, &policy).await.unwrap_err();
        assert!(matches!(err, VaultError::UserRejectedSignature(_)));
    }

    #[test]
    fn payload_json_uses_wire_field_names() {
        let payload = EncryptedPayload {
            ciphertext: "abc".to_string(),
            data_to_encrypt_hash: "def".to_string(),
        };
        let json = payload.to_json().unwrap();
        assert_eq!(json, r#"{"ciphertext":"abc","dataToEncryptHash":"def"}"#);
        assert_eq!(EncryptedPayload::from_json(&json).unwrap(), payload);
    }

    #[test]
    fn payload_needs_both_fields() {
        assert_eq!(
            EncryptedPayload::from_json(r#"{"ciphertext":"abc"}"#).unwrap_err(),
            VaultError::IntegrityMismatch
        );
        assert_eq!(
            EncryptedPayload::from_json(r#"{"ciphertext":"","dataToEncryptHash":"def"}"#)
                .unwrap_err(),
            VaultError::IntegrityMismatch
        );
    }
}
