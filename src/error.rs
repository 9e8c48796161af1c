// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Public error taxonomy.
//!
//! Every public operation either succeeds or reports exactly one of these
//! kinds. Lower layers (`NetworkError`, `WalletError`, `StoreError`) are
//! reduced to this enum before reaching the caller.

/// Errors surfaced by the vault client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VaultError {
    #[error("Invalid access-control policy: {0}")]
    InvalidPolicy(String),

    #[error("No wallet provider available")]
    NoWalletProvider,

    #[error("Signature request rejected by the user: {0}")]
    UserRejectedSignature(String),

    #[error("Failed to fetch latest blockhash: {0}")]
    FreshnessFetchError(String),

    #[error("Session issuance failed: {0}")]
    SessionIssuanceError(String),

    #[error("Failed to connect to the encryption network: {0}")]
    ConnectionError(String),

    #[error("Encryption network not connected")]
    NotConnected,

    #[error("Encryption failed: {0}")]
    EncryptionError(String),

    #[error("Access policy not satisfied: {0}")]
    DecryptionDenied(String),

    #[error("Ciphertext does not match its integrity hash")]
    IntegrityMismatch,

    #[error("Vault storage error: {0}")]
    AdapterError(String),
}

impl VaultError {
    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            VaultError::InvalidPolicy(_) => "invalid_policy",
            VaultError::NoWalletProvider => "no_wallet_provider",
            VaultError::UserRejectedSignature(_) => "user_rejected_signature",
            VaultError::FreshnessFetchError(_) => "freshness_fetch_error",
            VaultError::SessionIssuanceError(_) => "session_issuance_error",
            VaultError::ConnectionError(_) => "connection_error",
            VaultError::NotConnected => "not_connected",
            VaultError::EncryptionError(_) => "encryption_error",
            VaultError::DecryptionDenied(_) => "decryption_denied",
            VaultError::IntegrityMismatch => "integrity_mismatch",
            VaultError::AdapterError(_) => "adapter_error",
        }
    }

    /// True when the wallet does not meet the access policy. Retrying will
    /// not help until the on-chain state changes.
    pub fn is_authorization_failure(&self) -> bool {
        matches!(self, VaultError::DecryptionDenied(_))
    }

    /// True for transport-level failures a caller may simply retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            VaultError::ConnectionError(_)
                | VaultError::FreshnessFetchError(_)
                | VaultError::NotConnected
                | VaultError::EncryptionError(_)
        )
    }
}

/// Result alias for vault client operations.
pub type VaultResult<T> = Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(VaultError::NotConnected.error_code(), "not_connected");
        assert_eq!(
            VaultError::DecryptionDenied("balance".into()).error_code(),
            "decryption_denied"
        );
        assert_eq!(VaultError::IntegrityMismatch.error_code(), "integrity_mismatch");
    }

    #[test]
    fn denial_is_distinct_from_transport_errors() {
        let denied = VaultError::DecryptionDenied("insufficient balance".into());
        let transport = VaultError::ConnectionError("timeout".into());

        assert!(denied.is_authorization_failure());
        assert!(!denied.is_transient());
        assert!(!transport.is_authorization_failure());
        assert!(transport.is_transient());
    }

    #[test]
    fn display_includes_detail() {
        let err = VaultError::AdapterError("entry 7 not found".into());
        assert_eq!(err.to_string(), "Vault storage error: entry 7 not found");
    }
}
