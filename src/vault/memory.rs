// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory vault with the same id and event semantics as the contract.
//!
//! Handles created with [`InMemoryVault::as_owner`] share one ledger and one
//! event channel, so several accounts can be exercised against a single
//! store.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};

use super::{check_payload, EntryId, StoreError, VaultEvent, VaultEventKind, VaultStore};

/// Buffered events per subscriber before lagging.
const EVENT_CAPACITY: usize = 256;

/// Slots per owner, indexed by entry id. `None` marks a deleted entry.
type Ledger = HashMap<Address, Vec<Option<String>>>;

#[derive(Clone)]
pub struct InMemoryVault {
    owner: Address,
    ledger: Arc<Mutex<Ledger>>,
    events: broadcast::Sender<VaultEvent>,
}

impl InMemoryVault {
    pub fn new(owner: Address) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            owner,
            ledger: Arc::new(Mutex::new(HashMap::new())),
            events,
        }
    }

    /// Handle on the same ledger acting for another account.
    pub fn as_owner(&self, owner: Address) -> Self {
        Self {
            owner,
            ledger: Arc::clone(&self.ledger),
            events: self.events.clone(),
        }
    }

    /// Receive every event emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<VaultEvent> {
        self.events.subscribe()
    }

    fn emit(&self, kind: VaultEventKind, entry_id: EntryId) {
        // No subscribers is fine.
        let _ = self.events.send(VaultEvent {
            kind,
            owner: self.owner,
            entry_id,
        });
        tracing::debug!(owner = %self.owner, entry_id, ?kind, "Vault event");
    }
}

impl std::fmt::Debug for InMemoryVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVault")
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

fn live_slot(
    ledger: &mut Ledger,
    owner: Address,
    entry_id: EntryId,
) -> Result<&mut Option<String>, StoreError> {
    let index = usize::try_from(entry_id).map_err(|_| StoreError::NotFound(entry_id))?;
    ledger
        .get_mut(&owner)
        .and_then(|slots| slots.get_mut(index))
        .filter(|slot| slot.is_some())
        .ok_or(StoreError::NotFound(entry_id))
}

#[async_trait]
impl VaultStore for InMemoryVault {
    fn owner(&self) -> Address {
        self.owner
    }

    async fn create_entry(&self, payload: &str) -> Result<EntryId, StoreError> {
        check_payload(payload)?;
        let mut ledger = self.ledger.lock().await;
        let slots = ledger.entry(self.owner).or_default();
        let entry_id = slots.len() as EntryId;
        slots.push(Some(payload.to_string()));
        self.emit(VaultEventKind::EntryCreated, entry_id);
        Ok(entry_id)
    }

    async fn update_entry(&self, entry_id: EntryId, payload: &str) -> Result<(), StoreError> {
        check_payload(payload)?;
        let mut ledger = self.ledger.lock().await;
        *live_slot(&mut ledger, self.owner, entry_id)? = Some(payload.to_string());
        self.emit(VaultEventKind::EntryUpdated, entry_id);
        Ok(())
    }

    async fn delete_entry(&self, entry_id: EntryId) -> Result<(), StoreError> {
        let mut ledger = self.ledger.lock().await;
        *live_slot(&mut ledger, self.owner, entry_id)? = None;
        self.emit(VaultEventKind::EntryDeleted, entry_id);
        Ok(())
    }

    async fn get_entry(&self, entry_id: EntryId) -> Result<String, StoreError> {
        let mut ledger = self.ledger.lock().await;
        live_slot(&mut ledger, self.owner, entry_id)?
            .clone()
            .ok_or(StoreError::NotFound(entry_id))
    }

    async fn get_user_entry_count(&self, owner: Address) -> Result<u64, StoreError> {
        let ledger = self.ledger.lock().await;
        Ok(ledger.get(&owner).map_or(0, |slots| slots.len() as u64))
    }
}
