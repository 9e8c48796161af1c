// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Development driver: stores one credential and reads it back.
//!
//! Runs against the in-process network. When `VAULT_CONTRACT_ADDRESS` and
//! `VAULT_RPC_URL` are set the payload is written to the contract, otherwise
//! to an in-memory vault. Conditions are evaluated over
//! `LIT_CONDITION_RPC_URL` when set, otherwise against a wallet funded at the
//! policy threshold.

use std::sync::Arc;

use alloy::primitives::U256;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use litvault::config::{ConfigError, LIT_WALLET_KEY_ENV};
use litvault::logging::init_tracing;
use litvault::network::{
    ChainStateError, ChainStateReader, EncryptionNetwork, RpcChainState, StaticChainState,
};
use litvault::policy::DEFAULT_MIN_BALANCE_WEI;
use litvault::vault::{EntryEventWatcher, EventSource};
use litvault::{
    default_policy, ClientConfig, ContractVault, Credential, InMemoryVault, LitCrypto,
    LocalNetwork, LocalWallet, NetworkClient, SessionManager, VaultError, VaultService,
    VaultStore, WalletSigner,
};

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("condition RPC: {0}")]
    ChainState(#[from] ChainStateError),

    #[error(transparent)]
    Vault(#[from] VaultError),
}

#[tokio::main]
async fn main() {
    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };
    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => {}
        Err(DemoError::Vault(e)) => {
            tracing::error!(error = %e, error_code = e.error_code(), "Vault demo failed");
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!(error = %e, "Vault demo misconfigured");
            std::process::exit(2);
        }
    }
}

async fn run(config: ClientConfig) -> Result<(), DemoError> {
    let wallet = match std::env::var(LIT_WALLET_KEY_ENV) {
        Ok(hex) => LocalWallet::from_hex(&hex),
        Err(_) => LocalWallet::generate(),
    }
    .map_err(|e| {
        tracing::error!(error = %e, "Wallet unavailable");
        VaultError::NoWalletProvider
    })?;
    let owner = wallet.signer_address();

    let policy = default_policy();
    let chain_state: Arc<dyn ChainStateReader> = match &config.condition_rpc_url {
        Some(url) => {
            tracing::info!(chain = %policy.primary_chain(), "Evaluating conditions over RPC");
            let rpc = RpcChainState::new().with_endpoint(policy.primary_chain(), url.as_str())?;
            Arc::new(rpc) as Arc<dyn ChainStateReader>
        }
        None => {
            let threshold: U256 = DEFAULT_MIN_BALANCE_WEI
                .parse()
                .map_err(|_| VaultError::InvalidPolicy("default threshold".to_string()))?;
            Arc::new(StaticChainState::new().with_native_balance(
                policy.primary_chain(),
                owner,
                threshold,
            )) as Arc<dyn ChainStateReader>
        }
    };
    let network: Arc<dyn EncryptionNetwork> =
        Arc::new(LocalNetwork::from_config(chain_state, &config)?);

    let shutdown = CancellationToken::new();
    let store: Arc<dyn VaultStore> = if config.uses_contract_vault() {
        let contract = Arc::new(
            ContractVault::from_config(&config, wallet.signer().clone())
                .map_err(VaultError::from)?,
        );
        let head = contract.head_block().await.map_err(VaultError::from)?;
        spawn_watcher(contract.clone(), head, shutdown.clone());
        tracing::info!(contract = %contract.address(), %owner, "Using VaultStorage contract");
        contract as Arc<dyn VaultStore>
    } else {
        tracing::info!(%owner, "Using in-memory vault");
        Arc::new(InMemoryVault::new(owner)) as Arc<dyn VaultStore>
    };

    let signer: Arc<dyn WalletSigner> = Arc::new(wallet);
    let sessions = SessionManager::new(NetworkClient::new(network), Some(signer), &config);
    let service = VaultService::with_policy(LitCrypto::new(sessions), store, policy);

    let credential = Credential::new("example.com", "demo", "correct horse battery staple");
    let entry_id = service.store_credential(&credential).await?;
    let restored = service.view_credential(entry_id).await?;
    let entries = service.entry_count().await?;
    tracing::info!(
        entry_id,
        website = %restored.website,
        username = %restored.username,
        matches = restored == credential,
        entries,
        "Credential round trip complete"
    );

    service.crypto().sessions().disconnect().await;
    shutdown.cancel();
    Ok(())
}

fn spawn_watcher(source: Arc<dyn EventSource>, start_block: u64, shutdown: CancellationToken) {
    let (tx, mut rx) = mpsc::channel(64);
    tokio::spawn(EntryEventWatcher::new(source, tx, start_block).run(shutdown));
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            tracing::info!(kind = ?event.kind, entry_id = event.entry_id, "Vault event");
        }
    });
}
