// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Credential Vault Service
//!
//! Ties the encryption façade to a vault store:
//!
//! - **store**: serialize, encrypt under the policy, persist the payload JSON
//! - **view**: fetch the payload, decrypt with a fresh session, deserialize
//!
//! The store only ever sees ciphertext. Viewing prompts the wallet once per
//! call.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::crypto::{EncryptedPayload, LitCrypto};
use crate::error::{VaultError, VaultResult};
use crate::policy::{default_policy, AccessControlPolicy};
use crate::vault::{EntryId, StoreError, VaultStore};

/// A saved login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub website: String,
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(
        website: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            website: website.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("website", &self.website)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub struct VaultService {
    crypto: LitCrypto,
    store: Arc<dyn VaultStore>,
    policy: AccessControlPolicy,
}

impl VaultService {
    /// Service encrypting under the default balance policy.
    pub fn new(crypto: LitCrypto, store: Arc<dyn VaultStore>) -> Self {
        Self::with_policy(crypto, store, default_policy())
    }

    pub fn with_policy(
        crypto: LitCrypto,
        store: Arc<dyn VaultStore>,
        policy: AccessControlPolicy,
    ) -> Self {
        Self {
            crypto,
            store,
            policy,
        }
    }

    pub fn crypto(&self) -> &LitCrypto {
        &self.crypto
    }

    pub fn policy(&self) -> &AccessControlPolicy {
        &self.policy
    }

    /// Encrypt and persist an arbitrary string.
    pub async fn store_secret(&self, plaintext: &str) -> VaultResult<EntryId> {
        let payload = self.crypto.encrypt(plaintext, &self.policy).await?;
        let entry_id = self.store.create_entry(&payload.to_json()?).await?;
        tracing::info!(owner = %self.store.owner(), entry_id, "Secret stored");
        Ok(entry_id)
    }

    /// Fetch and decrypt a stored string.
    pub async fn view_secret(&self, entry_id: EntryId) -> VaultResult<String> {
        let raw = self.store.get_entry(entry_id).await?;
        let payload = EncryptedPayload::from_json(&raw)?;
        self.crypto.decrypt_payload(&payload, &self.policy).await
    }

    pub async fn store_credential(&self, credential: &Credential) -> VaultResult<EntryId> {
        self.store_secret(&credential_json(credential)?).await
    }

    pub async fn update_credential(
        &self,
        entry_id: EntryId,
        credential: &Credential,
    ) -> VaultResult<()> {
        let payload = self
            .crypto
            .encrypt(&credential_json(credential)?, &self.policy)
            .await?;
        self.store.update_entry(entry_id, &payload.to_json()?).await?;
        tracing::info!(owner = %self.store.owner(), entry_id, "Credential updated");
        Ok(())
    }

    pub async fn view_credential(&self, entry_id: EntryId) -> VaultResult<Credential> {
        let plaintext = self.view_secret(entry_id).await?;
        serde_json::from_str(&plaintext).map_err(|_| {
            VaultError::AdapterError(format!("entry {entry_id} does not hold a credential"))
        })
    }

    pub async fn delete_credential(&self, entry_id: EntryId) -> VaultResult<()> {
        self.store.delete_entry(entry_id).await?;
        tracing::info!(owner = %self.store.owner(), entry_id, "Credential deleted");
        Ok(())
    }

    /// Number of entry ids allocated to the store's owner, deleted ones
    /// included.
    pub async fn entry_count(&self) -> VaultResult<u64> {
        Ok(self.store.get_user_entry_count(self.store.owner()).await?)
    }

    /// Ids of entries that still exist. Reads payloads but decrypts nothing.
    pub async fn entry_ids(&self) -> VaultResult<Vec<EntryId>> {
        let count = self.entry_count().await?;
        let mut live = Vec::new();
        for entry_id in 0..count {
            match self.store.get_entry(entry_id).await {
                Ok(_) => live.push(entry_id),
                Err(StoreError::NotFound(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(live)
    }
}

fn credential_json(credential: &Credential) -> VaultResult<String> {
    serde_json::to_string(credential).map_err(|e| VaultError::EncryptionError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientConfig, NetworkSecret};
    use crate::testing::{Harness, MockWallet, WalletBehavior, BOB_KEY};
    use crate::vault::{InMemoryVault, VaultEventKind};

    fn service(harness: Harness, vault: &InMemoryVault) -> VaultService {
        VaultService::new(harness.crypto, Arc::new(vault.clone()))
    }

    #[tokio::test]
    async fn stored_string_comes_back_verbatim() {
        let harness = Harness::funded();
        let vault = InMemoryVault::new(harness.wallet.wallet_address());
        let wallet = harness.wallet.clone();
        let service = service(harness, &vault);

        let secret = r#"{"website":"example.com","username":"a","password":"b"}"#;
        let entry_id = service.store_secret(secret).await.unwrap();

        let stored = vault.get_entry(entry_id).await.unwrap();
        assert!(!stored.contains("example.com"));
        assert_eq!(wallet.prompts(), 0);

        assert_eq!(service.view_secret(entry_id).await.unwrap(), secret);
        assert_eq!(wallet.prompts(), 1);
    }

    #[tokio::test]
    async fn credential_lifecycle() {
        let harness = Harness::funded();
        let vault = InMemoryVault::new(harness.wallet.wallet_address());
        let mut events = vault.subscribe();
        let service = service(harness, &vault);

        let original = Credential::new("example.com", "alice", "hunter2");
        let entry_id = service.store_credential(&original).await.unwrap();
        assert_eq!(service.view_credential(entry_id).await.unwrap(), original);

        let changed = Credential::new("example.com", "alice", "correct horse");
        service.update_credential(entry_id, &changed).await.unwrap();
        assert_eq!(service.view_credential(entry_id).await.unwrap(), changed);

        service.delete_credential(entry_id).await.unwrap();
        assert!(matches!(
            service.view_credential(entry_id).await,
            Err(VaultError::AdapterError(_))
        ));
        assert_eq!(service.entry_count().await.unwrap(), 1);

        let kinds: Vec<_> = [
            events.recv().await.unwrap().kind,
            events.recv().await.unwrap().kind,
            events.recv().await.unwrap().kind,
        ]
        .to_vec();
        assert_eq!(
            kinds,
            vec![
                VaultEventKind::EntryCreated,
                VaultEventKind::EntryUpdated,
                VaultEventKind::EntryDeleted
            ]
        );
    }

    #[tokio::test]
    async fn entry_ids_skip_deleted_entries() {
        let harness = Harness::funded();
        let vault = InMemoryVault::new(harness.wallet.wallet_address());
        let service = service(harness, &vault);

        for site in ["a.example", "b.example", "c.example"] {
            service
                .store_credential(&Credential::new(site, "u", "p"))
                .await
                .unwrap();
        }
        service.delete_credential(1).await.unwrap();

        assert_eq!(service.entry_ids().await.unwrap(), vec![0, 2]);
        assert_eq!(service.entry_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn unfunded_wallet_cannot_view() {
        let harness = Harness::with_wallet(MockWallet::with_key(WalletBehavior::Approve, BOB_KEY));
        let vault = InMemoryVault::new(harness.wallet.wallet_address());
        let service = service(harness, &vault);

        let entry_id = service
            .store_credential(&Credential::new("example.com", "bob", "pw"))
            .await
            .unwrap();
        let err = service.view_credential(entry_id).await.unwrap_err();
        assert!(matches!(err, VaultError::DecryptionDenied(_)));
    }

    #[tokio::test]
    async fn corrupted_entry_is_an_integrity_failure() {
        let harness = Harness::funded();
        let vault = InMemoryVault::new(harness.wallet.wallet_address());
        vault.create_entry("not a payload").await.unwrap();
        let service = service(harness, &vault);

        assert_eq!(
            service.view_secret(0).await.unwrap_err(),
            VaultError::IntegrityMismatch
        );
    }

    #[tokio::test]
    async fn entries_outlive_the_network_with_a_fixed_secret() {
        let config = ClientConfig {
            network_secret: Some(NetworkSecret::new([0x42; 32])),
            ..ClientConfig::default()
        };
        let first = Harness::funded_with_config(&config);
        let vault = InMemoryVault::new(first.wallet.wallet_address());
        let entry_id = service(first, &vault)
            .store_secret("kept across restarts")
            .await
            .unwrap();

        let restarted = service(Harness::funded_with_config(&config), &vault);
        assert_eq!(
            restarted.view_secret(entry_id).await.unwrap(),
            "kept across restarts"
        );

        let fresh = service(Harness::funded(), &vault);
        assert_eq!(
            fresh.view_secret(entry_id).await.unwrap_err(),
            VaultError::IntegrityMismatch
        );
    }

    #[test]
    fn debug_output_hides_password() {
        let credential = Credential::new("example.com", "alice", "hunter2");
        let debug = format!("{credential:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }
}
