// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Network Session Manager
//!
//! Owns the [`NetworkClient`] and turns a wallet signature into a scoped,
//! short-lived decryption session.
//!
//! ## Session Flow
//!
//! 1. Require a connected client (`NotConnected`) and a wallet
//!    (`NoWalletProvider`)
//! 2. Ask the wallet for its address
//! 3. Fetch the latest blockhash as the challenge nonce
//! 4. Build a SIWE + ReCap challenge for `(lit-accesscontrolcondition://*,
//!    decryption)` and have the wallet sign it
//! 5. Submit the signature and receive the network's session grant
//!
//! Sessions are never cached: each call performs the full round trip and
//! prompts the wallet again.

pub mod siwe;

use std::collections::BTreeSet;
use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::ClientConfig;
use crate::error::VaultError;
use crate::network::{
    AuthCallbackError, AuthCallbackParams, AuthNeededCallback, AuthSig, NetworkClient,
    NetworkError, ResourceAbilityRequest, SessionSigs, SessionSigsRequest,
};
use crate::policy::Chain;
use crate::wallet::{WalletError, WalletSigner};

use siwe::SiweMessage;

/// How the auth signature was produced.
pub const DERIVED_VIA: &str = "web3.eth.personal.sign";

/// Ephemeral, in-memory decryption session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub wallet_address: Address,
    pub expiration: DateTime<Utc>,
    pub scoped_abilities: BTreeSet<ResourceAbilityRequest>,
    pub auth_signature: AuthSig,
    sigs: SessionSigs,
}

impl Session {
    fn from_sigs(sigs: SessionSigs) -> Self {
        Self {
            wallet_address: sigs.address,
            expiration: sigs.expiration,
            scoped_abilities: sigs.capabilities.iter().cloned().collect(),
            auth_signature: sigs.auth_sig.clone(),
            sigs,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expiration
    }

    /// Network credentials to attach to a decrypt request.
    pub fn sigs(&self) -> &SessionSigs {
        &self.sigs
    }
}

/// Signs the network's challenge with the injected wallet.
struct ChallengeSigner {
    wallet: Arc<dyn WalletSigner>,
    address: Address,
    nonce: String,
    domain: String,
    chain_id: u64,
}

#[async_trait]
impl AuthNeededCallback for ChallengeSigner {
    async fn authenticate(&self, params: AuthCallbackParams) -> Result<AuthSig, AuthCallbackError> {
        if params.uri.is_empty() {
            return Err(AuthCallbackError::MissingParameter("uri"));
        }
        if params.resource_ability_requests.is_empty() {
            return Err(AuthCallbackError::MissingParameter("resourceAbilityRequests"));
        }

        let message = SiweMessage::with_recaps(
            self.domain.clone(),
            params.uri,
            self.address,
            self.chain_id,
            self.nonce.clone(),
            params.expiration,
            &params.resource_ability_requests,
        )
        .map_err(|e| AuthCallbackError::Challenge(e.to_string()))?;
        let to_sign = message.to_string();

        let sig = self
            .wallet
            .sign_message(&to_sign)
            .await
            .map_err(|e| match e {
                WalletError::Rejected(reason) => AuthCallbackError::UserRejected(reason),
                WalletError::Unavailable(reason) => AuthCallbackError::WalletUnavailable(reason),
                other => AuthCallbackError::Challenge(other.to_string()),
            })?;

        Ok(AuthSig {
            sig,
            derived_via: DERIVED_VIA.to_string(),
            signed_message: to_sign,
            address: self.address.to_checksum(None),
        })
    }
}

/// Connection lifecycle plus session issuance.
pub struct SessionManager {
    client: NetworkClient,
    wallet: Option<Arc<dyn WalletSigner>>,
    chain: Chain,
    domain: String,
    session_ttl: chrono::Duration,
}

impl SessionManager {
    pub fn new(
        client: NetworkClient,
        wallet: Option<Arc<dyn WalletSigner>>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            client,
            wallet,
            chain: config.chain,
            domain: config.session_domain.clone(),
            session_ttl: config.session_ttl_chrono(),
        }
    }

    pub fn client(&self) -> &NetworkClient {
        &self.client
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet.is_some()
    }

    /// Connect the underlying client; idempotent.
    pub async fn connect(&self) -> Result<(), VaultError> {
        self.client.connect().await
    }

    pub async fn disconnect(&self) {
        self.client.disconnect().await
    }

    /// Obtain a fresh session for the wallet. Does not change connection
    /// state and performs no caching.
    pub async fn get_session_signatures(&self) -> Result<Session, VaultError> {
        let backend = self.client.connected_backend().await?;
        let wallet = self.wallet.as_ref().ok_or(VaultError::NoWalletProvider)?;

        let address = wallet.address().await.map_err(|e| match e {
            WalletError::Rejected(reason) => VaultError::UserRejectedSignature(reason),
            WalletError::Unavailable(_) => VaultError::NoWalletProvider,
            other => VaultError::SessionIssuanceError(other.to_string()),
        })?;

        let nonce = match backend.latest_blockhash().await {
            Ok(hash) if !hash.is_empty() => hash,
            Ok(_) => {
                return Err(VaultError::FreshnessFetchError(
                    "network returned an empty blockhash".to_string(),
                ))
            }
            Err(e) => {
                self.client.observe(&e).await;
                return Err(match e {
                    NetworkError::NotConnected => VaultError::NotConnected,
                    other => VaultError::FreshnessFetchError(other.to_string()),
                });
            }
        };

        let callback = ChallengeSigner {
            wallet: Arc::clone(wallet),
            address,
            nonce,
            domain: self.domain.clone(),
            chain_id: self.chain.chain_id(),
        };
        let request = SessionSigsRequest {
            chain: self.chain,
            expiration: Utc::now() + self.session_ttl,
            resource_ability_requests: vec![ResourceAbilityRequest::wildcard_decryption()],
        };

        let sigs = match backend.get_session_sigs(request, &callback).await {
            Ok(sigs) => sigs,
            Err(e) => {
                self.client.observe(&e).await;
                tracing::warn!(%address, error = %e, "Failed to obtain session signatures");
                return Err(session_error(e));
            }
        };

        tracing::info!(
            %address,
            expiration = %sigs.expiration,
            "Session signatures issued"
        );
        Ok(Session::from_sigs(sigs))
    }
}

fn session_error(error: NetworkError) -> VaultError {
    match error {
        NetworkError::AuthCallback(AuthCallbackError::UserRejected(reason)) => {
            VaultError::UserRejectedSignature(reason)
        }
        NetworkError::AuthCallback(AuthCallbackError::WalletUnavailable(_)) => {
            VaultError::NoWalletProvider
        }
        NetworkError::NotConnected => VaultError::NotConnected,
        NetworkError::BlockhashUnavailable => {
            VaultError::FreshnessFetchError("latest blockhash unavailable".to_string())
        }
        other => VaultError::SessionIssuanceError(other.to_string()),
    }
}
