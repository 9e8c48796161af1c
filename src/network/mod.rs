// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Encryption Network Integration
//!
//! This module provides:
//! - The [`EncryptionNetwork`] boundary (connect, blockhash, encrypt, decrypt,
//!   session issuance)
//! - [`NetworkClient`], the owned connection with its three-state lifecycle
//! - [`LocalNetwork`], an in-process network for development and tests
//! - [`ChainStateReader`] backends used to evaluate conditions

pub mod chain_state;
pub mod client;
pub mod local;
pub mod types;

use async_trait::async_trait;

pub use chain_state::{ChainStateError, ChainStateReader, RpcChainState, StaticChainState};
pub use client::{ConnectionState, NetworkClient};
pub use local::LocalNetwork;
pub use types::*;

/// Produces a wallet-signed [`AuthSig`] when the network asks for one.
#[async_trait]
pub trait AuthNeededCallback: Send + Sync {
    async fn authenticate(&self, params: AuthCallbackParams) -> Result<AuthSig, AuthCallbackError>;
}

/// Operations the client needs from an encryption network.
#[async_trait]
pub trait EncryptionNetwork: Send + Sync {
    /// Which Lit network this backend talks to.
    fn network(&self) -> LitNetwork;

    /// Open the connection (handshake with the nodes).
    async fn connect(&self) -> Result<(), NetworkError>;

    /// Drop the connection.
    async fn disconnect(&self);

    /// Latest blockhash, used as the challenge nonce.
    async fn latest_blockhash(&self) -> Result<String, NetworkError>;

    async fn encrypt_string(
        &self,
        request: EncryptRequest<'_>,
    ) -> Result<EncryptResponse, NetworkError>;

    async fn decrypt_to_string(&self, request: DecryptRequest<'_>) -> Result<String, NetworkError>;

    /// Issue session credentials. The network invokes `callback` to obtain
    /// the wallet signature over its challenge.
    async fn get_session_sigs(
        &self,
        request: SessionSigsRequest,
        callback: &dyn AuthNeededCallback,
    ) -> Result<SessionSigs, NetworkError>;
}
