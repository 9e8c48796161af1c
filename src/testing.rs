// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Test doubles shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::crypto::LitCrypto;
use crate::network::{LocalNetwork, NetworkClient, StaticChainState};
use crate::policy::{Chain, DEFAULT_MIN_BALANCE_WEI};
use crate::session::SessionManager;
use crate::wallet::{LocalWallet, WalletError, WalletSigner};

pub const ALICE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const BOB_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

/// How a [`MockWallet`] answers prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletBehavior {
    Approve,
    RejectAccounts,
    RejectSignature,
    /// Reports Alice's address but signs with Bob's key.
    SignWithOtherKey,
}

/// Wallet that counts signature prompts.
pub struct MockWallet {
    behavior: WalletBehavior,
    identity: LocalWallet,
    impostor: LocalWallet,
    prompts: AtomicUsize,
}

impl MockWallet {
    pub fn new(behavior: WalletBehavior) -> Self {
        Self::with_key(behavior, ALICE_KEY)
    }

    pub fn with_key(behavior: WalletBehavior, key: &str) -> Self {
        Self {
            behavior,
            identity: LocalWallet::from_hex(key).expect("valid test key"),
            impostor: LocalWallet::from_hex(BOB_KEY).expect("valid test key"),
            prompts: AtomicUsize::new(0),
        }
    }

    pub fn wallet_address(&self) -> Address {
        self.identity.signer_address()
    }

    /// Number of signature prompts shown so far.
    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletSigner for MockWallet {
    async fn address(&self) -> Result<Address, WalletError> {
        match self.behavior {
            WalletBehavior::RejectAccounts => {
                Err(WalletError::Rejected("user denied account access".to_string()))
            }
            _ => Ok(self.identity.signer_address()),
        }
    }

    async fn sign_message(&self, message: &str) -> Result<String, WalletError> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            WalletBehavior::Approve | WalletBehavior::RejectAccounts => {
                self.identity.sign_message(message).await
            }
            WalletBehavior::RejectSignature => {
                Err(WalletError::Rejected("user closed the prompt".to_string()))
            }
            WalletBehavior::SignWithOtherKey => self.impostor.sign_message(message).await,
        }
    }
}

/// Wired-up façade over a local network.
pub struct Harness {
    pub crypto: LitCrypto,
    pub network: Arc<LocalNetwork>,
    pub chain_state: Arc<StaticChainState>,
    pub wallet: Arc<MockWallet>,
}

impl Harness {
    /// Alice's wallet, funded exactly at the default policy threshold.
    pub fn funded() -> Self {
        let harness = Self::with_wallet(MockWallet::new(WalletBehavior::Approve));
        harness.fund(harness.wallet.wallet_address(), DEFAULT_MIN_BALANCE_WEI);
        harness
    }

    pub fn with_wallet(wallet: MockWallet) -> Self {
        let chain_state = Arc::new(StaticChainState::new());
        let network = LocalNetwork::new(chain_state.clone());
        Self::assemble(wallet, chain_state, network, &ClientConfig::default())
    }

    /// Funded Alice over a network built from `config`.
    pub fn funded_with_config(config: &ClientConfig) -> Self {
        let chain_state = Arc::new(StaticChainState::new());
        let network =
            LocalNetwork::from_config(chain_state.clone(), config).expect("dev network config");
        let harness = Self::assemble(
            MockWallet::new(WalletBehavior::Approve),
            chain_state,
            network,
            config,
        );
        harness.fund(harness.wallet.wallet_address(), DEFAULT_MIN_BALANCE_WEI);
        harness
    }

    fn assemble(
        wallet: MockWallet,
        chain_state: Arc<StaticChainState>,
        network: LocalNetwork,
        config: &ClientConfig,
    ) -> Self {
        let network = Arc::new(network);
        let wallet = Arc::new(wallet);
        let sessions = SessionManager::new(
            NetworkClient::new(network.clone()),
            Some(wallet.clone() as Arc<dyn WalletSigner>),
            config,
        );
        Self {
            crypto: LitCrypto::new(sessions),
            network,
            chain_state,
            wallet,
        }
    }

    pub fn fund(&self, account: Address, wei: &str) {
        let amount = wei.parse::<U256>().expect("valid amount");
        self.chain_state
            .set_native_balance(Chain::Ethereum, account, amount);
    }
}
