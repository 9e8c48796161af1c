// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `VaultStorage` contract binding.
//!
//! Entries are keyed by `(msg.sender, entryId)`, so the handle's owner is the
//! address of the signing key. Mutations are sent as transactions through a
//! wallet-filled provider and wait for their receipt.

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, U256},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::{Filter, Log, TransactionReceipt},
    signers::local::PrivateKeySigner,
    sol,
    sol_types::SolEvent,
};
use async_trait::async_trait;
use url::Url;

use super::watcher::EventSource;
use super::{check_payload, EntryId, StoreError, VaultEvent, VaultEventKind, VaultStore};
use crate::config::ClientConfig;

sol! {
    #[sol(rpc)]
    interface IVaultStorage {
        event EntryCreated(address indexed user, uint256 entryId);
        event EntryUpdated(address indexed user, uint256 entryId);
        event EntryDeleted(address indexed user, uint256 entryId);

        function createEntry(string calldata encryptedData) external returns (uint256);
        function updateEntry(uint256 entryId, string calldata encryptedData) external;
        function deleteEntry(uint256 entryId) external;
        function getEntry(uint256 entryId) external view returns (string memory);
        function getUserEntryCount(address user) external view returns (uint256);
    }
}

/// HTTP provider that signs with the owner's key.
type SigningProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

/// On-chain vault acting for the signer's address.
pub struct ContractVault {
    address: Address,
    owner: Address,
    provider: SigningProvider,
}

impl ContractVault {
    pub fn new(address: Address, rpc_url: Url, signer: PrivateKeySigner) -> Self {
        let owner = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(rpc_url);
        Self::with_provider(address, owner, provider)
    }

    fn with_provider(address: Address, owner: Address, provider: SigningProvider) -> Self {
        Self {
            address,
            owner,
            provider,
        }
    }

    /// Build from `VAULT_CONTRACT_ADDRESS` and `VAULT_RPC_URL`.
    pub fn from_config(config: &ClientConfig, signer: PrivateKeySigner) -> Result<Self, StoreError> {
        let address = config
            .vault_contract
            .ok_or(StoreError::NotConfigured("VAULT_CONTRACT_ADDRESS"))?;
        let rpc_url = config
            .vault_rpc_url
            .clone()
            .ok_or(StoreError::NotConfigured("VAULT_RPC_URL"))?;
        Ok(Self::new(address, rpc_url, signer))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn contract(&self) -> IVaultStorage::IVaultStorageInstance<SigningProvider> {
        IVaultStorage::new(self.address, self.provider.clone())
    }

    /// Vault events of the handle's owner in `from_block..=to_block`.
    async fn query_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<VaultEvent>, StoreError> {
        let filter = Filter::new()
            .address(self.address)
            .event_signature(vec![
                IVaultStorage::EntryCreated::SIGNATURE_HASH,
                IVaultStorage::EntryUpdated::SIGNATURE_HASH,
                IVaultStorage::EntryDeleted::SIGNATURE_HASH,
            ])
            .topic1(self.owner.into_word())
            .from_block(from_block)
            .to_block(to_block);

        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|e| StoreError::Rpc(e.to_string()))?;

        let mut events = Vec::with_capacity(logs.len());
        for log in &logs {
            match decode_event(log) {
                Some(event) => events.push(event),
                None => tracing::warn!(
                    tx_hash = ?log.transaction_hash,
                    "Skipping undecodable vault log"
                ),
            }
        }
        Ok(events)
    }

    async fn confirm(
        &self,
        pending: alloy::providers::PendingTransactionBuilder<Ethereum>,
    ) -> Result<TransactionReceipt, StoreError> {
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| StoreError::Transaction(format!("Failed to get receipt: {e}")))?;
        if !receipt.status() {
            return Err(StoreError::Transaction(format!(
                "transaction {:?} reverted",
                receipt.transaction_hash
            )));
        }
        Ok(receipt)
    }
}

fn entry_id(raw: U256) -> Result<EntryId, StoreError> {
    EntryId::try_from(raw).map_err(|_| StoreError::Rpc(format!("entry id {raw} out of range")))
}

fn decode_event(log: &Log) -> Option<VaultEvent> {
    let signature = *log.topics().first()?;
    let (kind, owner, raw_id) = if signature == IVaultStorage::EntryCreated::SIGNATURE_HASH {
        let event = log.log_decode::<IVaultStorage::EntryCreated>().ok()?.inner.data;
        (VaultEventKind::EntryCreated, event.user, event.entryId)
    } else if signature == IVaultStorage::EntryUpdated::SIGNATURE_HASH {
        let event = log.log_decode::<IVaultStorage::EntryUpdated>().ok()?.inner.data;
        (VaultEventKind::EntryUpdated, event.user, event.entryId)
    } else if signature == IVaultStorage::EntryDeleted::SIGNATURE_HASH {
        let event = log.log_decode::<IVaultStorage::EntryDeleted>().ok()?.inner.data;
        (VaultEventKind::EntryDeleted, event.user, event.entryId)
    } else {
        return None;
    };
    Some(VaultEvent {
        kind,
        owner,
        entry_id: entry_id(raw_id).ok()?,
    })
}

#[async_trait]
impl VaultStore for ContractVault {
    fn owner(&self) -> Address {
        self.owner
    }

    async fn create_entry(&self, payload: &str) -> Result<EntryId, StoreError> {
        check_payload(payload)?;
        let pending = self
            .contract()
            .createEntry(payload.to_string())
            .send()
            .await
            .map_err(|e| StoreError::Transaction(format!("Failed to send: {e}")))?;
        let receipt = self.confirm(pending).await?;

        let created = receipt
            .inner
            .logs()
            .iter()
            .filter(|log| log.address() == self.address)
            .find_map(|log| log.log_decode::<IVaultStorage::EntryCreated>().ok())
            .ok_or_else(|| {
                StoreError::Transaction("receipt carries no EntryCreated event".to_string())
            })?;

        let entry_id = entry_id(created.inner.data.entryId)?;
        tracing::info!(
            owner = %self.owner,
            entry_id,
            tx_hash = ?receipt.transaction_hash,
            "Vault entry created"
        );
        Ok(entry_id)
    }

    async fn update_entry(&self, entry_id: EntryId, payload: &str) -> Result<(), StoreError> {
        check_payload(payload)?;
        let pending = self
            .contract()
            .updateEntry(U256::from(entry_id), payload.to_string())
            .send()
            .await
            .map_err(|e| StoreError::Transaction(format!("Failed to send: {e}")))?;
        let receipt = self.confirm(pending).await?;
        tracing::info!(
            owner = %self.owner,
            entry_id,
            tx_hash = ?receipt.transaction_hash,
            "Vault entry updated"
        );
        Ok(())
    }

    async fn delete_entry(&self, entry_id: EntryId) -> Result<(), StoreError> {
        let pending = self
            .contract()
            .deleteEntry(U256::from(entry_id))
            .send()
            .await
            .map_err(|e| StoreError::Transaction(format!("Failed to send: {e}")))?;
        let receipt = self.confirm(pending).await?;
        tracing::info!(
            owner = %self.owner,
            entry_id,
            tx_hash = ?receipt.transaction_hash,
            "Vault entry deleted"
        );
        Ok(())
    }

    async fn get_entry(&self, entry_id: EntryId) -> Result<String, StoreError> {
        let payload: String = self
            .contract()
            .getEntry(U256::from(entry_id))
            .from(self.owner)
            .call()
            .await
            .map_err(|e| StoreError::Rpc(e.to_string()))?;
        if payload.is_empty() {
            return Err(StoreError::NotFound(entry_id));
        }
        Ok(payload)
    }

    async fn get_user_entry_count(&self, owner: Address) -> Result<u64, StoreError> {
        let count: U256 = self
            .contract()
            .getUserEntryCount(owner)
            .call()
            .await
            .map_err(|e| StoreError::Rpc(e.to_string()))?;
        u64::try_from(count).map_err(|_| StoreError::Rpc(format!("entry count {count} out of range")))
    }
}

#[async_trait]
impl EventSource for ContractVault {
    async fn head_block(&self) -> Result<u64, StoreError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| StoreError::Rpc(e.to_string()))
    }

    async fn events_between(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<VaultEvent>, StoreError> {
        self.query_events(from_block, to_block).await
    }
}
