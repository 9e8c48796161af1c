// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Vault Persistence Adapter
//!
//! Opaque storage of encrypted payloads keyed by `(owner, entry id)`.
//!
//! The vault never sees plaintext: payloads are the JSON form of
//! [`EncryptedPayload`](crate::crypto::EncryptedPayload). Each store handle
//! acts on behalf of one owner (the transaction sender for on-chain stores).
//! Mutations emit exactly one [`VaultEvent`].

pub mod contract;
pub mod memory;
pub mod watcher;

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::Serialize;

use crate::error::VaultError;

pub use contract::ContractVault;
pub use memory::InMemoryVault;
pub use watcher::{EntryEventWatcher, EventSource};

/// Per-owner entry identifier.
pub type EntryId = u64;

/// Which mutation produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VaultEventKind {
    EntryCreated,
    EntryUpdated,
    EntryDeleted,
}

/// Mutation notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultEvent {
    pub kind: VaultEventKind,
    pub owner: Address,
    pub entry_id: EntryId,
}

/// Storage backend errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("entry {0} not found")]
    NotFound(EntryId),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("transaction failed: {0}")]
    Transaction(String),

    #[error("vault not configured: {0}")]
    NotConfigured(&'static str),
}

impl From<StoreError> for VaultError {
    fn from(error: StoreError) -> Self {
        VaultError::AdapterError(error.to_string())
    }
}

/// Encrypted-payload storage acting for [`VaultStore::owner`].
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Account whose entries this handle reads and writes.
    fn owner(&self) -> Address;

    /// Store a new payload and return its id.
    async fn create_entry(&self, payload: &str) -> Result<EntryId, StoreError>;

    /// Replace the payload of an existing entry.
    async fn update_entry(&self, entry_id: EntryId, payload: &str) -> Result<(), StoreError>;

    async fn delete_entry(&self, entry_id: EntryId) -> Result<(), StoreError>;

    async fn get_entry(&self, entry_id: EntryId) -> Result<String, StoreError>;

    /// Number of entry ids ever allocated to `owner`.
    async fn get_user_entry_count(&self, owner: Address) -> Result<u64, StoreError>;
}

fn check_payload(payload: &str) -> Result<(), StoreError> {
    if payload.trim().is_empty() {
        return Err(StoreError::InvalidPayload("payload is empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_become_adapter_errors() {
        let err: VaultError = StoreError::NotFound(7).into();
        assert_eq!(err, VaultError::AdapterError("entry 7 not found".to_string()));
        assert_eq!(err.error_code(), "adapter_error");
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert!(check_payload("  ").is_err());
        assert!(check_payload("{}").is_ok());
    }

    #[test]
    fn event_serializes_with_wire_names() {
        let event = VaultEvent {
            kind: VaultEventKind::EntryCreated,
            owner: Address::ZERO,
            entry_id: 3,
        };
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["kind"], "EntryCreated");
        assert_eq!(json["entryId"], 3);
    }

    #[test]
    fn contract_vault_feeds_the_watcher() {
        use std::sync::Arc;

        use crate::config::ClientConfig;
        use crate::testing::ALICE_KEY;
        use crate::wallet::LocalWallet;

        let config = ClientConfig {
            vault_contract: Some(Address::repeat_byte(0x55)),
            vault_rpc_url: Some("http://127.0.0.1:8545".parse().unwrap()),
            ..ClientConfig::default()
        };
        let signer = LocalWallet::from_hex(ALICE_KEY).unwrap().signer().clone();
        let source: Arc<dyn EventSource> =
            Arc::new(ContractVault::from_config(&config, signer).unwrap());
        let (tx, _rx) = tokio::sync::mpsc::channel(1);
        let _watcher = EntryEventWatcher::new(source, tx, 0);
    }
}
