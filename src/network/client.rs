// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Owned connection to the encryption network.
//!
//! ```text
//! Disconnected ──connect()──▶ Connecting ──ok──▶ Connected
//!      ▲                          │                  │
//!      └──────────err─────────────┘◀──disconnect()───┘
//! ```

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use super::{EncryptionNetwork, NetworkError};
use crate::error::VaultError;

/// Lifecycle state of a [`NetworkClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Connection handle shared by the session manager and the crypto façade.
#[derive(Clone)]
pub struct NetworkClient {
    backend: Arc<dyn EncryptionNetwork>,
    state: Arc<RwLock<ConnectionState>>,
    /// Serializes state transitions so concurrent `connect()` calls perform a
    /// single handshake.
    transition: Arc<Mutex<()>>,
}

impl NetworkClient {
    pub fn new(backend: Arc<dyn EncryptionNetwork>) -> Self {
        Self {
            backend,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            transition: Arc::new(Mutex::new(())),
        }
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    pub async fn is_connected(&self) -> bool {
        self.state().await == ConnectionState::Connected
    }

    /// Connect to the network. A no-op when already connected.
    pub async fn connect(&self) -> Result<(), VaultError> {
        let _guard = self.transition.lock().await;

        if *self.state.read().await == ConnectionState::Connected {
            return Ok(());
        }

        *self.state.write().await = ConnectionState::Connecting;
        tracing::info!(network = %self.backend.network(), "Connecting to encryption network");

        match self.backend.connect().await {
            Ok(()) => {
                *self.state.write().await = ConnectionState::Connected;
                tracing::info!(network = %self.backend.network(), "Encryption network connected");
                Ok(())
            }
            Err(e) => {
                *self.state.write().await = ConnectionState::Disconnected;
                tracing::warn!(error = %e, "Failed to connect to encryption network");
                Err(VaultError::ConnectionError(e.to_string()))
            }
        }
    }

    /// Tear the connection down.
    pub async fn disconnect(&self) {
        let _guard = self.transition.lock().await;
        if *self.state.read().await == ConnectionState::Disconnected {
            return;
        }
        self.backend.disconnect().await;
        *self.state.write().await = ConnectionState::Disconnected;
        tracing::info!("Encryption network disconnected");
    }

    /// Backend handle, only when connected.
    pub async fn connected_backend(&self) -> Result<Arc<dyn EncryptionNetwork>, VaultError> {
        if self.is_connected().await {
            Ok(Arc::clone(&self.backend))
        } else {
            Err(VaultError::NotConnected)
        }
    }

    /// Mark the client disconnected after the backend reports it lost the
    /// connection mid-call.
    pub(crate) async fn observe(&self, error: &NetworkError) {
        if !matches!(error, NetworkError::NotConnected) {
            return;
        }
        let _guard = self.transition.lock().await;
        *self.state.write().await = ConnectionState::Disconnected;
        tracing::warn!("Encryption network dropped the connection");
    }
}

impl std::fmt::Debug for NetworkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkClient")
            .field("network", &self.backend.network())
            .finish_non_exhaustive()
    }
}
